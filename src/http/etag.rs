//! Entity tags and the `If-Match` / `If-None-Match` list syntax (RFC 7232 §2.3).

use std::fmt;

/// An entity tag, e.g. `"xyzzy"` or `W/"xyzzy"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag {
    pub weak: bool,
    pub tag: String,
}

impl ETag {
    pub fn strong(tag: impl Into<String>) -> Self {
        Self {
            weak: false,
            tag: tag.into(),
        }
    }

    pub fn weak(tag: impl Into<String>) -> Self {
        Self {
            weak: true,
            tag: tag.into(),
        }
    }

    /// Interprets a resource-supplied validator. Quoted and `W/`-prefixed
    /// forms are honoured; a bare string becomes a strong tag.
    pub fn from_resource(value: &str) -> Self {
        parse_one(value.trim()).unwrap_or_else(|| ETag::strong(value.trim()))
    }

    /// Strong comparison: both strong and character-for-character equal.
    pub fn strong_eq(&self, other: &ETag) -> bool {
        !self.weak && !other.weak && self.tag == other.tag
    }

    /// Weak comparison: opaque tags equal, weakness ignored.
    pub fn weak_eq(&self, other: &ETag) -> bool {
        self.tag == other.tag
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            write!(f, "W/\"{}\"", self.tag)
        } else {
            write!(f, "\"{}\"", self.tag)
        }
    }
}

/// The value of an `If-Match` or `If-None-Match` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ETagCondition {
    Any,
    Tags(Vec<ETag>),
}

impl ETagCondition {
    /// Parses a header value.
    ///
    /// Bare, unquoted tokens are tolerated as strong tags. Unbalanced quotes,
    /// an empty list or a `*` mixed with tags are rejected with a message
    /// suitable for a 400 response.
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value == "*" {
            return Ok(ETagCondition::Any);
        }

        let mut tags = Vec::new();
        for item in split_list(value)? {
            if item.is_empty() {
                continue;
            }
            if item == "*" {
                return Err(format!("invalid entity-tag list {value:?}: '*' must stand alone"));
            }
            match parse_one(item) {
                Some(tag) => tags.push(tag),
                None if is_bare_token(item) => tags.push(ETag::strong(item)),
                None => return Err(format!("invalid entity-tag {item:?}")),
            }
        }

        if tags.is_empty() {
            return Err(format!("empty entity-tag list {value:?}"));
        }
        Ok(ETagCondition::Tags(tags))
    }
}

fn parse_one(item: &str) -> Option<ETag> {
    let (weak, rest) = match item.strip_prefix("W/") {
        Some(rest) => (true, rest),
        None => (false, item),
    };
    let inner = rest.strip_prefix('"')?.strip_suffix('"')?;
    if inner.contains('"') {
        return None;
    }
    Some(ETag {
        weak,
        tag: inner.to_string(),
    })
}

fn is_bare_token(item: &str) -> bool {
    !item.contains('"') && !item.chars().any(char::is_whitespace)
}

/// Splits on commas that sit outside quoted strings.
fn split_list(value: &str) -> Result<Vec<&str>, String> {
    let mut items = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                items.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(format!("unterminated quoted entity-tag in {value:?}"));
    }
    items.push(value[start..].trim());
    Ok(items)
}
