//! Extraction of structured metadata from raw comments.
//!
//! A comment whose text starts with the [METADATA_SIGIL] `&` carries
//! key/value data rather than free text. Two bodies are understood:
//!
//! - comma separated pairs, as written by BEAST and FigTree:
//!   `[&rate=0.5,height_95%_HPD={1.2,3.4},name="a b",flag]`
//! - NHX pairs: `[&&NHX:S=human:D=N:B=95]`
//!
//! Values are typed: quoted text is a string, `{...}` is a list (or a nested
//! mapping when every item is `key=value`), `true`/`false` are booleans,
//! then integers, floats, and anything else a bare string. A key without
//! `=` is the flag `true`.

use crate::model::annotation::{AnnotationSet, AnnotationValue};
use std::collections::BTreeMap;
use thiserror::Error;

/// Leading marker of a metadata comment.
pub const METADATA_SIGIL: char = '&';

/// A metadata comment that could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} in metadata comment [{comment}]")]
pub struct MetadataError {
    comment: String,
    message: String,
}

impl MetadataError {
    fn new(comment: &str, message: impl Into<String>) -> Self {
        Self {
            comment: comment.to_string(),
            message: message.into(),
        }
    }

    /// The offending comment, without brackets.
    pub fn comment(&self) -> &str {
        &self.comment
    }
}

/// Whether `comment` is a metadata comment.
pub fn is_metadata_comment(comment: &str) -> bool {
    comment.starts_with(METADATA_SIGIL)
}

/// Parses a single metadata comment (including its sigil) into key/value pairs.
///
/// # Errors
/// If the comment lacks the sigil, has unbalanced braces, an unterminated
/// quoted string, or an empty key.
///
/// # Example
/// ```
/// use phyloread::model::metadata::parse_metadata_comment;
/// use phyloread::model::AnnotationValue;
///
/// let set = parse_metadata_comment("&rate=0.5,clade={A,B},label=\"x y\"").unwrap();
/// assert_eq!(set.get("rate"), Some(&AnnotationValue::Float(0.5)));
/// assert_eq!(set.get("clade").unwrap().as_list().unwrap().len(), 2);
/// assert_eq!(set.get("label").unwrap().as_str(), Some("x y"));
/// ```
pub fn parse_metadata_comment(comment: &str) -> Result<AnnotationSet, MetadataError> {
    let body = comment
        .strip_prefix(METADATA_SIGIL)
        .ok_or_else(|| MetadataError::new(comment, "missing '&' sigil"))?;

    let nhx = body
        .strip_prefix("&NHX")
        .or_else(|| body.strip_prefix("NHX:").map(|rest| &body[body.len() - rest.len() - 1..]));
    let (pairs_text, separator) = match nhx {
        Some(rest) => (rest, ':'),
        None => (body, ','),
    };

    let mut annotations = AnnotationSet::new();
    let fail = |message: String| MetadataError::new(comment, message);
    for item in split_top_level(pairs_text, separator).map_err(fail)? {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (name, value) = parse_pair(item).map_err(fail)?;
        annotations.insert(name, value);
    }
    Ok(annotations)
}

/// Splits `comments` into the free-text comments, in original order, and the
/// annotations carried by the metadata comments.
///
/// # Errors
/// The first metadata comment that fails to parse.
pub fn extract_metadata(
    comments: Vec<String>,
) -> Result<(Vec<String>, AnnotationSet), MetadataError> {
    let mut remaining = comments;
    let mut annotations = AnnotationSet::new();
    extract_metadata_into(&mut remaining, &mut annotations)?;
    Ok((remaining, annotations))
}

/// In-place variant of [extract_metadata]: metadata comments are removed from
/// `comments` and merged into `annotations`.
///
/// Nothing is modified if any metadata comment is malformed.
///
/// # Returns
/// The number of metadata comments consumed.
pub fn extract_metadata_into(
    comments: &mut Vec<String>,
    annotations: &mut AnnotationSet,
) -> Result<usize, MetadataError> {
    let parsed = comments
        .iter()
        .filter(|c| is_metadata_comment(c))
        .map(|c| parse_metadata_comment(c))
        .collect::<Result<Vec<_>, _>>()?;

    let consumed = parsed.len();
    comments.retain(|c| !is_metadata_comment(c));
    for set in parsed {
        annotations.merge(set);
    }
    Ok(consumed)
}

// ============================================================================
// Grammar (private)
// ============================================================================
fn parse_pair(item: &str) -> Result<(String, AnnotationValue), String> {
    match top_level_positions(item, '=')?.first() {
        Some(&eq) => {
            let name = item[..eq].trim();
            if name.is_empty() {
                return Err(format!("empty key in '{item}'"));
            }
            Ok((name.to_string(), parse_value(&item[eq + 1..])?))
        }
        None => Ok((item.to_string(), AnnotationValue::Bool(true))),
    }
}

fn parse_value(text: &str) -> Result<AnnotationValue, String> {
    let text = text.trim();

    if let Some(inner) = text.strip_prefix('{') {
        let inner = inner
            .strip_suffix('}')
            .ok_or_else(|| format!("unbalanced braces in '{text}'"))?;
        if inner.trim().is_empty() {
            return Ok(AnnotationValue::List(Vec::new()));
        }
        let items = split_top_level(inner, ',')?;
        let is_mapping = items
            .iter()
            .all(|item| top_level_positions(item, '=').is_ok_and(|p| !p.is_empty()));
        if is_mapping {
            let mut entries = BTreeMap::new();
            for item in items {
                let (name, value) = parse_pair(item.trim())?;
                entries.insert(name, value);
            }
            return Ok(AnnotationValue::Map(entries));
        }
        return items
            .into_iter()
            .map(parse_value)
            .collect::<Result<Vec<_>, _>>()
            .map(AnnotationValue::List);
    }

    for quote in ['"', '\''] {
        if text.starts_with(quote) {
            return unquote(text, quote).map(AnnotationValue::String);
        }
    }

    if text.eq_ignore_ascii_case("true") {
        return Ok(AnnotationValue::Bool(true));
    }
    if text.eq_ignore_ascii_case("false") {
        return Ok(AnnotationValue::Bool(false));
    }
    if let Ok(v) = text.parse::<i64>() {
        return Ok(AnnotationValue::Int(v));
    }
    if let Ok(v) = text.parse::<f64>() {
        return Ok(AnnotationValue::Float(v));
    }
    Ok(AnnotationValue::String(text.to_string()))
}

/// The content of a string quoted with `quote`, in which a doubled quote
/// stands for one.
fn unquote(text: &str, quote: char) -> Result<String, String> {
    let mut value = String::new();
    let mut chars = text.chars().skip(1).peekable();
    while let Some(c) = chars.next() {
        if c != quote {
            value.push(c);
        } else if chars.next_if_eq(&quote).is_some() {
            value.push(quote);
        } else if chars.peek().is_none() {
            return Ok(value);
        } else {
            return Err(format!("text after closing quote in {text}"));
        }
    }
    Err(format!("unterminated quoted string {text}"))
}

/// Splits `text` at every `separator` outside braces and quotes.
fn split_top_level(text: &str, separator: char) -> Result<Vec<&str>, String> {
    let positions = top_level_positions(text, separator)?;
    let mut parts = Vec::with_capacity(positions.len() + 1);
    let mut start = 0;
    for pos in positions {
        parts.push(&text[start..pos]);
        start = pos + separator.len_utf8();
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// Byte positions of `separator` outside braces and quotes.
///
/// A quote only opens a string where a value can start (at the beginning,
/// or after `=`, `,`, `:` or `{`), so apostrophes inside bare words are text.
fn top_level_positions(text: &str, separator: char) -> Result<Vec<usize>, String> {
    let mut positions = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if let Some(open) = quote {
            if c == open && chars.next_if(|&(_, next)| next == open).is_none() {
                quote = None;
                prev = Some(c);
            }
            continue;
        }
        match c {
            '"' | '\'' if matches!(prev, None | Some('=' | ',' | ':' | '{')) => quote = Some(c),
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return Err(format!("unbalanced braces in '{text}'"));
                }
                depth -= 1;
            }
            c if c == separator && depth == 0 => positions.push(i),
            _ => {}
        }
        if !c.is_whitespace() {
            prev = Some(c);
        }
    }

    if quote.is_some() {
        return Err(format!("unterminated quoted string in '{text}'"));
    }
    if depth != 0 {
        return Err(format!("unbalanced braces in '{text}'"));
    }
    Ok(positions)
}
