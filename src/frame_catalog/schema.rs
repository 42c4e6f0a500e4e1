//! Column types, typed cell values and frame schemas.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::FrameCatalogError;

/// Primitive column type of a frame. Serialized as its lowercase name and
/// deserialized through [`FromStr`], so aliases and any casing are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DataType {
    Str,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Str => "str",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Bool => "bool",
        }
    }

    /// Parse one raw cell of a delimited file into a typed value.
    ///
    /// An empty (or all-whitespace) cell is `Value::Null` for every type.
    /// Non-finite floats (`nan`, `inf`) are invalid since JSON cannot carry them.
    pub fn parse_value(&self, column: &str, raw: &str) -> Result<Value, FrameCatalogError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }

        let invalid = || FrameCatalogError::InvalidValue {
            column: column.to_string(),
            data_type: self.as_str().to_string(),
            raw: raw.to_string(),
        };

        match self {
            DataType::Str => Ok(Value::Str(raw.to_string())),
            DataType::Int32 => trimmed.parse().map(Value::Int32).map_err(|_| invalid()),
            DataType::Int64 => trimmed.parse().map(Value::Int64).map_err(|_| invalid()),
            DataType::Float32 => match trimmed.parse::<f32>() {
                Ok(v) if v.is_finite() => Ok(Value::Float32(v)),
                _ => Err(invalid()),
            },
            DataType::Float64 => match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Value::Float64(v)),
                _ => Err(invalid()),
            },
            DataType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = FrameCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "str" | "string" => Ok(DataType::Str),
            "int32" | "i32" => Ok(DataType::Int32),
            "int64" | "i64" => Ok(DataType::Int64),
            "float32" | "f32" => Ok(DataType::Float32),
            "float64" | "f64" => Ok(DataType::Float64),
            "bool" => Ok(DataType::Bool),
            other => Err(FrameCatalogError::InvalidSchema {
                message: format!("unknown column type `{}`", other),
            }),
        }
    }
}

impl TryFrom<String> for DataType {
    type Error = FrameCatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single typed cell. Serializes as a plain JSON scalar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Str(String),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Column {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of columns, fixed when a frame is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameSchema {
    columns: Vec<Column>,
}

impl FrameSchema {
    pub fn new(columns: Vec<Column>) -> Self {
        FrameSchema { columns }
    }

    /// Build a schema from `(name, type)` pairs
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, DataType)>) -> Self {
        FrameSchema {
            columns: pairs
                .into_iter()
                .map(|(name, data_type)| Column::new(name, data_type))
                .collect(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn validate(&self) -> Result<(), FrameCatalogError> {
        if self.columns.is_empty() {
            return Err(FrameCatalogError::InvalidSchema {
                message: "schema must contain at least one column".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(FrameCatalogError::InvalidSchema {
                    message: "column names cannot be empty".to_string(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(FrameCatalogError::InvalidSchema {
                    message: format!("duplicate column name `{}`", column.name),
                });
            }
        }
        Ok(())
    }
}

/// Compact `name:type,name:type` syntax used on the command line
impl FromStr for FrameSchema {
    type Err = FrameCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut columns = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, data_type) =
                part.split_once(':')
                    .ok_or_else(|| FrameCatalogError::InvalidSchema {
                        message: format!("expected `name:type`, got `{}`", part),
                    })?;
            columns.push(Column::new(name.trim(), data_type.parse()?));
        }

        let schema = FrameSchema { columns };
        schema.validate()?;
        Ok(schema)
    }
}
