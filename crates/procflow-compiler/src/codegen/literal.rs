// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Literal escaping and typed literal values.
//!
//! Text destined for generated source is escaped into a Rust string literal
//! once, at lowering time, and carried through the construction program in
//! its escaped form. Parsing the escaped literal back yields the original
//! text exactly.

use proc_macro2::{TokenStream, TokenTree};
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

/// Error produced when text cannot be rendered as a string literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct LiteralEscapeError {
    /// Why the escaped form was rejected.
    pub reason: String,
}

/// A Rust string literal, quotes included, known to lex as a single
/// literal token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EscapedStr(String);

impl EscapedStr {
    /// The literal's source text, including the surrounding quotes.
    pub fn as_source(&self) -> &str {
        &self.0
    }

    /// Lex the literal into tokens for splicing into generated code.
    pub fn to_tokens(&self) -> Result<TokenStream, LiteralEscapeError> {
        TokenStream::from_str(&self.0).map_err(|e| LiteralEscapeError {
            reason: format!("escaped literal does not lex: {}", e),
        })
    }
}

impl std::fmt::Display for EscapedStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape `text` into a Rust string literal.
///
/// Quotes, backslashes and the usual whitespace escapes use their short
/// forms. Every other control or invisible formatting character
/// (including bidirectional overrides) is written as `\u{..}` so that
/// generated files stay readable and diff cleanly.
///
/// The escaped form is lexed before it is returned; anything that does not
/// come back as exactly one string literal token is rejected.
pub fn escape(text: &str) -> Result<EscapedStr, LiteralEscapeError> {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if needs_unicode_escape(c) => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');

    verify_single_string_literal(&out)?;
    Ok(EscapedStr(out))
}

fn needs_unicode_escape(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            // Bidirectional formatting characters
            '\u{061c}'
                | '\u{200e}'
                | '\u{200f}'
                | '\u{202a}'..='\u{202e}'
                | '\u{2066}'..='\u{2069}'
                // Zero-width and separator characters
                | '\u{200b}'..='\u{200d}'
                | '\u{2028}'
                | '\u{2029}'
                | '\u{feff}'
        )
}

fn verify_single_string_literal(source: &str) -> Result<(), LiteralEscapeError> {
    let tokens = TokenStream::from_str(source).map_err(|e| LiteralEscapeError {
        reason: format!("escaped literal does not lex: {}", e),
    })?;
    let mut iter = tokens.into_iter();
    match (iter.next(), iter.next()) {
        (Some(TokenTree::Literal(lit)), None)
            if source.starts_with('"') && lit.to_string() == source =>
        {
            Ok(())
        }
        _ => Err(LiteralEscapeError {
            reason: "escaped text is not a single string literal".to_string(),
        }),
    }
}

/// A typed value emitted into the construction program.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Literal {
    /// Escaped text
    Str(EscapedStr),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Null,
    /// Array or object, serialized to JSON text and escaped
    Json(EscapedStr),
    /// Enum-valued field, rendered as `Type::Variant` from the runtime crate
    Variant {
        ty: &'static str,
        variant: &'static str,
    },
}

impl Literal {
    /// Escaped text literal.
    pub fn text(text: &str) -> Result<Self, LiteralEscapeError> {
        escape(text).map(Literal::Str)
    }

    /// Typed literal for a JSON value: numbers and booleans keep their type,
    /// strings are escaped, arrays and objects are carried as escaped JSON.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, LiteralEscapeError> {
        Ok(match value {
            serde_json::Value::Null => Literal::Null,
            serde_json::Value::Bool(b) => Literal::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Literal::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Literal::UInt(u)
                } else if let Some(f) = n.as_f64() {
                    Literal::Float(f)
                } else {
                    return Err(LiteralEscapeError {
                        reason: format!("number {} has no finite representation", n),
                    });
                }
            }
            serde_json::Value::String(s) => Literal::Str(escape(s)?),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                let json = serde_json::to_string(value).map_err(|e| LiteralEscapeError {
                    reason: e.to_string(),
                })?;
                Literal::Json(escape(&json)?)
            }
        })
    }
}
