//! Decoded namelist values.

use super::schema::{field_index, FieldKind, NAMELIST_SCHEMA};
use crate::error::{FarError, Result};

/// A single namelist value.
#[derive(Debug, Clone, PartialEq)]
pub enum NamelistValue {
    /// Integer scalar.
    Int(i64),
    /// Real scalar.
    Float(f64),
    /// Fortran logical.
    Bool(bool),
    /// Trimmed text.
    Text(String),
    /// Integer vector.
    IntVector(Vec<i64>),
    /// Real vector.
    FloatVector(Vec<f64>),
}

impl NamelistValue {
    /// Whether the value has the shape a schema kind asks for.
    pub fn matches(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (NamelistValue::Int(_), FieldKind::Int)
                | (NamelistValue::Float(_), FieldKind::Float)
                | (NamelistValue::Bool(_), FieldKind::Bool)
                | (NamelistValue::Text(_), FieldKind::Text)
                | (NamelistValue::IntVector(_), FieldKind::IntVector(_))
                | (NamelistValue::FloatVector(_), FieldKind::FloatVector(_))
        )
    }
}

/// Schema-ordered namelist record. Unset fields are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamelistRecord {
    values: Vec<Option<NamelistValue>>,
}

impl Default for NamelistRecord {
    fn default() -> Self {
        Self::empty()
    }
}

impl NamelistRecord {
    /// A record with every field unset.
    pub fn empty() -> Self {
        Self {
            values: vec![None; NAMELIST_SCHEMA.len()],
        }
    }

    /// Value at a schema position.
    pub(crate) fn at(&self, index: usize) -> Option<&NamelistValue> {
        self.values.get(index).and_then(|value| value.as_ref())
    }

    pub(crate) fn set_at(&mut self, index: usize, value: NamelistValue) {
        self.values[index] = Some(value);
    }

    /// Value of a field by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&NamelistValue> {
        field_index(name).and_then(|index| self.at(index))
    }

    /// Set a field, checking the value against the schema.
    pub fn set(&mut self, name: &str, value: NamelistValue) -> Result<()> {
        let index = field_index(name).ok_or_else(|| FarError::FieldType {
            name: name.to_string(),
            expected: "a known namelist field".to_string(),
        })?;
        let spec = &NAMELIST_SCHEMA[index];
        if !value.matches(spec.kind) {
            return Err(FarError::FieldType {
                name: spec.name.to_string(),
                expected: spec.kind.name().to_string(),
            });
        }
        self.values[index] = Some(value);
        Ok(())
    }

    /// Iterate over `(name, value)` in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&NamelistValue>)> + '_ {
        NAMELIST_SCHEMA
            .iter()
            .zip(self.values.iter())
            .map(|(spec, value)| (spec.name, value.as_ref()))
    }

    /// Number of fields holding a value.
    pub fn filled(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }

    /// Integer field.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            NamelistValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Real field.
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            NamelistValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Logical field.
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            NamelistValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            NamelistValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Integer vector field.
    pub fn int_vector(&self, name: &str) -> Option<&[i64]> {
        match self.get(name)? {
            NamelistValue::IntVector(value) => Some(value.as_slice()),
            _ => None,
        }
    }

    /// Real vector field.
    pub fn float_vector(&self, name: &str) -> Option<&[f64]> {
        match self.get(name)? {
            NamelistValue::FloatVector(value) => Some(value.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_rejects_wrong_kind() {
        let mut record = NamelistRecord::empty();
        let err = record
            .set("ldim", NamelistValue::Float(2.0))
            .unwrap_err();
        assert!(matches!(err, FarError::FieldType { .. }));
        record.set("LDIM", NamelistValue::Int(2)).unwrap();
        assert_eq!(record.int("ldim"), Some(2));
        assert_eq!(record.filled(), 1);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut record = NamelistRecord::empty();
        assert!(record.set("not_a_field", NamelistValue::Int(1)).is_err());
    }
}
