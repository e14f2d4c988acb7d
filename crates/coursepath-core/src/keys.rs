//! Course and usage keys.
//!
//! Keys are opaque identifiers handed out by the content store. Coursepath
//! only validates their outer shape (`<scheme>:<rest>`) and, where the key
//! encodes one, extracts the block type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Check the `<scheme>:<rest>` shape shared by course and usage keys.
fn validate(raw: &str) -> bool {
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return false;
    }
    match raw.split_once(':') {
        Some((scheme, rest)) => !scheme.is_empty() && !rest.is_empty(),
        None => false,
    }
}

/// Identifier of a course (e.g. `course-v1:edX+DemoX+2015`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseKey(String);

impl CourseKey {
    /// Parse and validate a course key.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if validate(&raw) {
            Ok(Self(raw))
        } else {
            Err(Error::invalid_key(format!("Invalid course_id: {raw}.")))
        }
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a content block within a course.
///
/// Two formats are understood for block type extraction:
///
/// - `block-v1:Org+Course+Run+type@chapter+block@intro`
/// - `i4x://Org/Course/chapter/intro`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UsageKey(String);

impl UsageKey {
    /// Parse and validate a usage key.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if validate(&raw) {
            Ok(Self(raw))
        } else {
            Err(Error::invalid_key(format!("Invalid usage_id: {raw}.")))
        }
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The block type encoded in the key, if any.
    pub fn block_type(&self) -> Option<&str> {
        if let Some(idx) = self.0.find("type@") {
            let rest = &self.0[idx + "type@".len()..];
            let end = rest.find('+').unwrap_or(rest.len());
            return Some(&rest[..end]).filter(|t| !t.is_empty());
        }
        if let Some(rest) = self.0.strip_prefix("i4x://") {
            return rest.split('/').nth(2).filter(|t| !t.is_empty());
        }
        None
    }
}

macro_rules! string_key_impls {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::parse(value)
            }
        }

        impl From<$ty> for String {
            fn from(key: $ty) -> Self {
                key.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_key_impls!(CourseKey);
string_key_impls!(UsageKey);
