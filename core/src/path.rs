//! Dotted/indexed paths into a JSON tree.
//!
//! Supported syntax: `name`, `address.geo.lat`, `items[0]`, `[0].name` for a
//! root array, chained `matrix[1][0]`, negative indices counting from the end
//! (`tags[-1]`). `$` or an empty path addresses the root and a leading `$.`
//! is accepted and ignored.

use serde_json::Value;
use thiserror::Error;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty segment at offset {0}")]
    EmptySegment(usize),

    #[error("unclosed `[` at offset {0}")]
    UnclosedBracket(usize),

    #[error("`{0}` is not an integer index")]
    InvalidIndex(String),

    #[error("expected `.` or `[` after `]` at offset {0}")]
    UnexpectedAfterIndex(usize),

    #[error("expected `.` or `[` after `$`")]
    UnexpectedAfterRoot,
}

/// Split a path into segments.
pub fn parse(path: &str) -> Result<Vec<Segment>, PathError> {
    let trimmed = path.trim();
    let body = match trimmed.strip_prefix('$') {
        Some("") => "",
        Some(rest) if rest.starts_with('[') => rest,
        Some(rest) => rest.strip_prefix('.').ok_or(PathError::UnexpectedAfterRoot)?,
        None => trimmed,
    };

    let mut segments = Vec::new();
    let mut field = String::new();
    let mut after_index = false;
    let mut last_was_dot = false;
    let mut chars = body.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '.' => {
                if !field.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut field)));
                } else if !after_index {
                    return Err(PathError::EmptySegment(offset));
                }
                after_index = false;
                last_was_dot = true;
            }
            '[' => {
                if !field.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut field)));
                } else if last_was_dot {
                    return Err(PathError::EmptySegment(offset));
                }
                let mut index = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == ']' {
                        closed = true;
                        break;
                    }
                    index.push(inner);
                }
                if !closed {
                    return Err(PathError::UnclosedBracket(offset));
                }
                let index = index.trim();
                let parsed = index
                    .parse::<i64>()
                    .map_err(|_| PathError::InvalidIndex(index.to_string()))?;
                segments.push(Segment::Index(parsed));
                after_index = true;
                last_was_dot = false;
            }
            _ => {
                if after_index {
                    return Err(PathError::UnexpectedAfterIndex(offset));
                }
                field.push(ch);
                last_was_dot = false;
            }
        }
    }

    if last_was_dot {
        return Err(PathError::EmptySegment(body.len()));
    }
    if !field.is_empty() {
        segments.push(Segment::Field(field));
    }
    Ok(segments)
}

/// Resolve `path` against `root`.
///
/// `Ok(None)` means the path is well-formed but does not exist in this tree:
/// a missing key, an out-of-range index, or a step into a scalar.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Result<Option<&'a Value>, PathError> {
    let segments = parse(path)?;
    Ok(walk(root, &segments))
}

fn walk<'a>(root: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = match (segment, current) {
            (Segment::Field(name), Value::Object(map)) => map.get(name)?,
            (Segment::Index(index), Value::Array(items)) => {
                let position = if *index < 0 {
                    let back = usize::try_from(index.unsigned_abs()).ok()?;
                    items.len().checked_sub(back)?
                } else {
                    usize::try_from(*index).ok()?
                };
                items.get(position)?
            }
            _ => return None,
        };
    }
    Some(current)
}
