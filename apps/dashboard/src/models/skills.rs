//! The `identified_skills` attribute and its normalization into tokens.
//!
//! Upstream has delivered this field in two shapes over time: a native JSON
//! array of strings, and a string holding a list literal such as
//! `"['Python', 'SQL']"`. Both are stored exactly as delivered and decoded
//! here on demand.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentifiedSkills {
    List(Vec<String>),
    Encoded(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot decode skills list at byte {position}: {reason}")]
pub struct SkillsParseError {
    pub position: usize,
    pub reason: &'static str,
}

impl IdentifiedSkills {
    /// Returns the distinct, trimmed, non-empty skill tokens in first-seen order.
    pub fn tokens(&self) -> Result<Vec<String>, SkillsParseError> {
        let raw = match self {
            IdentifiedSkills::List(items) => items.clone(),
            IdentifiedSkills::Encoded(text) => parse_list_literal(text)?,
        };

        let mut tokens: Vec<String> = Vec::with_capacity(raw.len());
        for item in raw {
            let item = item.trim();
            if item.is_empty() || tokens.iter().any(|t| t == item) {
                continue;
            }
            tokens.push(item.to_string());
        }
        Ok(tokens)
    }
}

/// Parses a bracketed list of quoted strings: `['a', "b",]`.
/// Single or double quotes, backslash escapes, optional trailing comma.
/// Anything else is rejected rather than guessed at.
pub fn parse_list_literal(text: &str) -> Result<Vec<String>, SkillsParseError> {
    let mut chars = text.char_indices().peekable();
    let fail = |position: usize, reason: &'static str| SkillsParseError { position, reason };

    skip_whitespace(&mut chars);
    match chars.next() {
        Some((_, '[')) => {}
        Some((i, _)) => return Err(fail(i, "expected '['")),
        None => return Err(fail(0, "empty input")),
    }

    let mut items = Vec::new();
    loop {
        skip_whitespace(&mut chars);
        match chars.next() {
            Some((_, ']')) => break,
            Some((_, quote @ ('\'' | '"'))) => {
                items.push(read_quoted(&mut chars, quote, text.len())?);
                skip_whitespace(&mut chars);
                match chars.next() {
                    Some((_, ',')) => continue,
                    Some((_, ']')) => break,
                    Some((i, _)) => return Err(fail(i, "expected ',' or ']'")),
                    None => return Err(fail(text.len(), "unterminated list")),
                }
            }
            Some((i, _)) => return Err(fail(i, "expected quoted item")),
            None => return Err(fail(text.len(), "unterminated list")),
        }
    }

    skip_whitespace(&mut chars);
    if let Some((i, _)) = chars.next() {
        return Err(fail(i, "trailing characters after list"));
    }
    Ok(items)
}

type CharCursor<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

fn skip_whitespace(chars: &mut CharCursor<'_>) {
    while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
}

fn read_quoted(
    chars: &mut CharCursor<'_>,
    quote: char,
    end: usize,
) -> Result<String, SkillsParseError> {
    let mut out = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => out.push(read_escape(chars, i)?),
            c if c == quote => return Ok(out),
            c => out.push(c),
        }
    }
    Err(SkillsParseError {
        position: end,
        reason: "unterminated string",
    })
}

/// Decodes the escape following a backslash at byte `start`.
/// `\xNN`, `\uNNNN` and `\UNNNNNNNN` are hex code points.
fn read_escape(chars: &mut CharCursor<'_>, start: usize) -> Result<char, SkillsParseError> {
    let unsupported = SkillsParseError {
        position: start,
        reason: "unsupported escape",
    };
    let digits = match chars.next() {
        Some((_, c @ ('\\' | '\'' | '"'))) => return Ok(c),
        Some((_, 'n')) => return Ok('\n'),
        Some((_, 't')) => return Ok('\t'),
        Some((_, 'r')) => return Ok('\r'),
        Some((_, 'x')) => 2,
        Some((_, 'u')) => 4,
        Some((_, 'U')) => 8,
        Some(_) => return Err(unsupported),
        None => {
            return Err(SkillsParseError {
                position: start,
                reason: "dangling escape",
            })
        }
    };

    let mut code = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next_if(|(_, c)| c.is_ascii_hexdigit())
            .and_then(|(_, c)| c.to_digit(16))
            .ok_or(SkillsParseError {
                position: start,
                reason: "truncated hex escape",
            })?;
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or(SkillsParseError {
        position: start,
        reason: "invalid code point",
    })
}
