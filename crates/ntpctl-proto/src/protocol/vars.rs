// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Text payloads of mode 6 variable reads.
//!
//! `READVAR` requests carry a comma-separated list of variable names and the
//! daemon answers with `name=value` pairs separated by commas and `\r\n`.
//! Values may be quoted. The tokenizer follows the rules `ntpq` applies to the
//! same text.

use std::net::IpAddr;

use crate::error::ParseError;

/// Longest variable name accepted by [`Variables`].
pub const MAX_NAME_LEN: usize = 256;

/// Longest variable value accepted by [`Variables`].
pub const MAX_VALUE_LEN: usize = 2048;

/// One `name[=value]` entry of a variable list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Variable<'a> {
    /// Variable name, with surrounding blanks removed.
    pub name: &'a str,
    /// Value, unquoted and with trailing blanks removed. `None` for a bare name.
    pub value: Option<&'a str>,
}

/// Iterator over the variables in a `READVAR` response.
///
/// Iteration stops early at text that cannot be tokenized, such as an
/// oversized name or value or garbage after a closing quote.
#[derive(Clone, Debug)]
pub struct Variables<'a> {
    rest: &'a str,
}

/// Tokenize a `READVAR` response.
pub fn variables(text: &str) -> Variables<'_> {
    Variables { rest: text }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

impl<'a> Iterator for Variables<'a> {
    type Item = Variable<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        // Line breaks separate entries just like commas.
        let text = self
            .rest
            .trim_start_matches(|c: char| c == ',' || c == '\r' || c == '\n' || is_blank(c));
        if text.is_empty() {
            self.rest = text;
            return None;
        }

        let name_end = text.find([',', '=', '\r', '\n']).unwrap_or(text.len());
        let name = text[..name_end].trim_end_matches(is_blank);
        if name.len() >= MAX_NAME_LEN {
            self.rest = "";
            return None;
        }

        let after_name = &text[name_end..];
        if !after_name.starts_with('=') {
            // End of text, ',' or a line break: a bare name.
            let mut chars = after_name.chars();
            chars.next();
            self.rest = chars.as_str();
            return Some(Variable { name, value: None });
        }

        let value_text = after_name[1..].trim_start_matches(is_blank);
        let (raw, rest) = if let Some(quoted) = value_text.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            }
        } else {
            let end = value_text.find([',', '\r']).unwrap_or(value_text.len());
            value_text.split_at(end)
        };

        if raw.len() >= MAX_VALUE_LEN || !(rest.is_empty() || rest.starts_with([',', '\r'])) {
            self.rest = "";
            return None;
        }

        self.rest = rest.strip_prefix(',').unwrap_or(rest);
        Some(Variable {
            name,
            value: Some(raw.trim_end_matches(is_blank)),
        })
    }
}

/// Build the comma-separated request text for a list of variable names.
///
/// Names that would push the text past `max_len` bytes are left out, along
/// with every name after them.
pub fn make_query_data(names: &[&str], max_len: usize) -> String {
    let mut data = String::new();
    for name in names {
        let needed = name.len() + usize::from(!data.is_empty());
        if data.len() + needed > max_len {
            break;
        }
        if !data.is_empty() {
            data.push(',');
        }
        data.push_str(name);
    }
    data
}

/// Parse an address as printed by ntpd.
///
/// Accepted forms are `a.b.c.d`, `a.b.c.d:port`, `[v6]:port` and a bare IPv6
/// address. Any port is discarded.
pub fn parse_address(field: &'static str, text: &str) -> Result<IpAddr, ParseError> {
    let text = text.trim();
    let host = if let Some(bracketed) = text.strip_prefix('[') {
        match bracketed.find(']') {
            Some(end) => &bracketed[..end],
            None => return Err(ParseError::InvalidText { field }),
        }
    } else {
        match text.matches(':').count() {
            // Exactly one colon is an IPv4 address with a port.
            1 => text.split(':').next().unwrap_or(text),
            _ => text,
        }
    };
    host.parse().map_err(|_| ParseError::InvalidText { field })
}

/// Parse an unsigned integer variable.
pub fn parse_u32(field: &'static str, text: &str) -> Result<u32, ParseError> {
    text.trim()
        .parse()
        .map_err(|_| ParseError::InvalidText { field })
}

/// Parse a decimal floating point variable.
pub fn parse_f64(field: &'static str, text: &str) -> Result<f64, ParseError> {
    text.trim()
        .parse()
        .map_err(|_| ParseError::InvalidText { field })
}
