//! Mapping of declared SQL column types onto Arrow types.
//!
//! Tables created elsewhere describe their columns with declarations such as
//! `INTEGER`, `REAL` or `TEXT(1023)`. Before such a table can be loaded into
//! Arrow batches each declaration needs an Arrow [`DataType`].

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{DescriptivesError, Result};

/// A parsed column type declaration: base name plus optional width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredType {
    pub base: String,
    pub width: Option<usize>,
}

impl DeclaredType {
    /// Maps the declaration onto an Arrow type.
    ///
    /// `TEXT` must carry a width; unknown base names are rejected.
    pub fn to_arrow_type(&self) -> Result<DataType> {
        match self.base.as_str() {
            "INTEGER" => Ok(DataType::Int64),
            "NUMERIC" | "REAL" => Ok(DataType::Float64),
            "TEXT" => match self.width {
                Some(_) => Ok(DataType::Utf8),
                None => Err(DescriptivesError::invalid_argument(
                    "TEXT column declared without a width",
                )),
            },
            "DATETIME" => Ok(DataType::Timestamp(TimeUnit::Millisecond, None)),
            _ => Err(DescriptivesError::invalid_argument(format!(
                "no Arrow type for declared column type {self}"
            ))),
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.width {
            Some(width) => write!(f, "{}({width})", self.base),
            None => write!(f, "{}", self.base),
        }
    }
}

impl FromStr for DeclaredType {
    type Err = DescriptivesError;

    fn from_str(declaration: &str) -> Result<Self> {
        parse_declared_type(declaration)
    }
}

/// Parses `NAME` or `NAME(width)`.
pub fn parse_declared_type(declaration: &str) -> Result<DeclaredType> {
    let declaration = declaration.trim();
    let malformed = || {
        DescriptivesError::invalid_argument(format!(
            "malformed column type declaration '{declaration}'"
        ))
    };

    let (base, width) = match declaration.split_once('(') {
        Some((base, rest)) => {
            let digits = rest.strip_suffix(')').ok_or_else(malformed)?;
            let width = digits.trim().parse::<usize>().map_err(|_| malformed())?;
            (base.trim(), Some(width))
        }
        None if declaration.contains(')') => return Err(malformed()),
        None => (declaration, None),
    };

    if base.is_empty() || !base.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        return Err(malformed());
    }

    Ok(DeclaredType {
        base: base.to_ascii_uppercase(),
        width,
    })
}

/// Shortcut for `parse_declared_type(declaration)?.to_arrow_type()`.
pub fn arrow_type_for(declaration: &str) -> Result<DataType> {
    parse_declared_type(declaration)?.to_arrow_type()
}

/// Metadata key under which [`declared_schema`] stores each column's title.
pub const TITLE_METADATA_KEY: &str = "title";

/// Builds an Arrow schema from `(name, declaration)` pairs in table order.
///
/// Every field is nullable and carries its [`column_title`] in the field
/// metadata under [`TITLE_METADATA_KEY`].
pub fn declared_schema<'a>(
    columns: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<Schema> {
    let fields = columns
        .into_iter()
        .map(|(name, declaration)| {
            let data_type = arrow_type_for(declaration)?;
            let metadata =
                HashMap::from([(TITLE_METADATA_KEY.to_string(), column_title(name))]);
            Ok(Field::new(name, data_type, true).with_metadata(metadata))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Schema::new(fields))
}

/// Human-readable title for a column name.
///
/// Words split on `_` are title-cased, except words ending in `ID`
/// (case-insensitive) which are upper-cased: `user_id` → `User ID`.
pub fn column_title(name: &str) -> String {
    let words: Vec<String> = name
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let upper = word.to_uppercase();
            if upper.ends_with("ID") {
                upper
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            }
        })
        .collect();

    if words.is_empty() {
        "FIELD".to_string()
    } else {
        words.join(" ")
    }
}
