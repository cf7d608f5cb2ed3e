use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ExprError, ExprResult};
use crate::func::named::Shape;
use crate::record::{MapRecord, RecordValue};

/// Declared shape of every named record variable the compiler may reference.
///
/// Serialized as a flat JSON object: `{"met": "scalar", "jets_pt": "vector"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Schema {
    variables: BTreeMap<String, Shape>,
}

impl Schema {
    /// Empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declaration.
    pub fn with(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.declare(name, shape);
        self
    }

    /// Declare (or redeclare) a variable.
    pub fn declare(&mut self, name: impl Into<String>, shape: Shape) {
        self.variables.insert(name.into(), shape);
    }

    /// Shape of a declared variable.
    pub fn shape_of(&self, name: &str) -> Option<Shape> {
        self.variables.get(name).copied()
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether no variables are declared.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Derive a schema from the values present in one record.
    pub fn infer(record: &MapRecord) -> Self {
        let variables = record
            .iter()
            .map(|(name, v)| {
                let shape = match v {
                    RecordValue::Scalar(_) => Shape::Scalar,
                    RecordValue::Vector(_) => Shape::Vector,
                };
                (name.to_owned(), shape)
            })
            .collect();
        Self { variables }
    }

    /// Parse a schema from JSON text and validate variable names.
    pub fn from_json_str(s: &str) -> ExprResult<Self> {
        let schema: Self = serde_json::from_str(s)
            .map_err(|e| ExprError::config(format!("invalid schema json: {e}")))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Read and parse a schema file.
    pub fn from_path(path: &Path) -> ExprResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read schema '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Every name must be a plain identifier so the compiler can reference it.
    pub fn validate(&self) -> ExprResult<()> {
        for name in self.variables.keys() {
            if !is_identifier(name) {
                return Err(ExprError::config(format!(
                    "schema variable '{name}' is not a valid identifier"
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "../tests/unit/schema.rs"]
mod tests;
