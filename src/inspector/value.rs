//! Field values and the accessor traits the inspector binds against
//!
//! Instead of runtime reflection, every bindable type implements
//! [`Inspectable`]: a small table of named fields that can be read as a
//! [`Value`] and written back. An [`InspectorContext`] owns the objects and
//! resolves the lightweight target keys stored in controls.

use cgmath::Vector3;

use crate::error::InspectorError;

/// A field value as seen by the inspector
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f32),
    /// One option out of an enumerated set of strings
    Choice(String),
    Text(String),
    Color([f32; 3]),
}

impl Value {
    /// Short kind name used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Choice(_) => "choice",
            Value::Text(_) => "text",
            Value::Color(_) => "color",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// The kind of a field, which decides the control used to render it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    Bool,
    Number,
    Choice(&'static [&'static str]),
    Text,
    Color,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::Choice(_) => "choice",
            ValueKind::Text => "text",
            ValueKind::Color => "color",
        }
    }

    /// Whether a control exists for this kind
    pub fn is_bindable(&self) -> bool {
        matches!(self, ValueKind::Bool | ValueKind::Number | ValueKind::Choice(_))
    }

    pub(crate) fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueKind::Bool, Value::Bool(_)) => true,
            (ValueKind::Number, Value::Number(_)) => true,
            (ValueKind::Choice(options), Value::Choice(choice)) => {
                options.iter().any(|option| *option == choice.as_str())
            }
            (ValueKind::Text, Value::Text(_)) => true,
            (ValueKind::Color, Value::Color(_)) => true,
            _ => false,
        }
    }
}

/// An object exposing named, typed fields to the inspector
pub trait Inspectable {
    /// Type name shown when the object has nothing better to show
    fn type_name(&self) -> &'static str;

    /// Reads a field, or `None` if the object has no such field
    fn field(&self, name: &str) -> Option<Value>;

    /// Writes a field in place
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), InspectorError>;

    /// Kind of a field. Types with enumerated string fields override this to
    /// report their option list.
    fn field_kind(&self, name: &str) -> Option<ValueKind> {
        self.field(name).map(|value| match value {
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::Choice(_) => ValueKind::Choice(&[]),
            Value::Text(_) => ValueKind::Text,
            Value::Color(_) => ValueKind::Color,
        })
    }
}

/// Owner of inspectable objects, addressed through copyable target keys
///
/// Controls only ever store a `Target`; every read and write resolves it again,
/// so a control never holds on to the object itself.
pub trait InspectorContext {
    type Target: Copy + std::fmt::Debug + PartialEq;

    fn resolve(&self, target: Self::Target) -> Option<&dyn Inspectable>;

    fn resolve_mut(&mut self, target: Self::Target) -> Option<&mut dyn Inspectable>;
}

/// Builds the error returned when a write carries the wrong kind of value
pub fn type_mismatch(field: &str, expected: &'static str, actual: &Value) -> InspectorError {
    InspectorError::TypeMismatch {
        field: field.to_string(),
        expected,
        actual: actual.kind_name(),
    }
}

/// Builds the error returned when a write names a field that does not exist
pub fn missing_field(target: &str, field: &str) -> InspectorError {
    InspectorError::InvalidField {
        target: target.to_string(),
        field: field.to_string(),
        reason: crate::error::InvalidFieldReason::Missing,
    }
}

impl Inspectable for Vector3<f32> {
    fn type_name(&self) -> &'static str {
        "Vector3"
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "x" => Some(Value::Number(self.x)),
            "y" => Some(Value::Number(self.y)),
            "z" => Some(Value::Number(self.z)),
            _ => None,
        }
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), InspectorError> {
        let component = match name {
            "x" => &mut self.x,
            "y" => &mut self.y,
            "z" => &mut self.z,
            _ => return Err(missing_field("Vector3", name)),
        };
        *component = value
            .as_number()
            .ok_or_else(|| type_mismatch(name, "number", &value))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_fields() {
        let mut v: Vector3<f32> = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(v.field("y"), Some(Value::Number(2.0)));
        assert_eq!(v.field("w"), None);

        v.set_field("z", Value::Number(-4.0)).unwrap();
        assert_eq!(v.z, -4.0);
    }

    #[test]
    fn test_vector_rejects_wrong_kind() {
        let mut v: Vector3<f32> = Vector3::new(1.0, 2.0, 3.0);
        let err = v.set_field("x", Value::Bool(true)).unwrap_err();
        assert!(matches!(err, InspectorError::TypeMismatch { expected: "number", .. }));
        assert_eq!(v.x, 1.0);
    }

    #[test]
    fn test_kind_accepts_only_listed_choices() {
        let kind = ValueKind::Choice(&["low", "high"]);
        assert!(kind.accepts(&Value::Choice("high".into())));
        assert!(!kind.accepts(&Value::Choice("medium".into())));
        assert!(!ValueKind::Text.is_bindable());
        assert!(ValueKind::Bool.is_bindable());
    }
}
