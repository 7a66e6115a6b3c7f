//! Row model and query parameters
//!
//! Results are untyped: a row is an ordered list of column values and the
//! caller interprets its shape from the query it issued.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// One result row
pub type Row = Vec<Value>;

/// All rows returned by a command, in server order
pub type Rows = Vec<Row>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as a signed integer when it fits
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{:?}", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Parameters bound to a command
///
/// Positional parameters fill `?` placeholders in order. Named parameters
/// fill `:name` placeholders, which are rewritten to `?` before the command
/// reaches the driver.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    #[default]
    None,
    Positional(Vec<Value>),
    Named(BTreeMap<String, Value>),
}

/// A named placeholder without a supplied value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No value supplied for parameter ':{0}'")]
pub struct MissingParameter(pub String);

impl Params {
    /// Builds positional parameters
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Builds named parameters
    pub fn named<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Params::Named(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Params::None => true,
            Params::Positional(values) => values.is_empty(),
            Params::Named(values) => values.is_empty(),
        }
    }

    /// Resolves the command text and the values to bind, in bind order
    ///
    /// # Errors
    ///
    /// Returns `MissingParameter` when a `:name` placeholder has no value.
    pub fn bind<'a>(
        &'a self,
        command: &'a str,
    ) -> Result<(Cow<'a, str>, Vec<&'a Value>), MissingParameter> {
        match self {
            Params::None => Ok((Cow::Borrowed(command), Vec::new())),
            Params::Positional(values) => Ok((Cow::Borrowed(command), values.iter().collect())),
            Params::Named(values) => {
                let (sql, names) = rewrite_named(command);
                let bound = names
                    .into_iter()
                    .map(|name| values.get(&name).ok_or(MissingParameter(name)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((Cow::Owned(sql), bound))
            }
        }
    }
}

/// Replaces `:name` placeholders outside quoted text with `?`
///
/// Returns the rewritten command and the placeholder names in order of
/// appearance. A doubled colon (`::`) is left untouched.
pub fn rewrite_named(command: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(command.len());
    let mut names = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' && q != '`' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            ':' if chars.peek() == Some(&':') => {
                out.push(':');
                out.push(':');
                chars.next();
            }
            ':' if chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') =>
            {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '_' {
                        name.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                names.push(name);
                out.push('?');
            }
            _ => out.push(c),
        }
    }

    (out, names)
}
