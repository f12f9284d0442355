//! Control descriptors
//!
//! A [`ControlSpec`] is the immutable description of one control: which field
//! of which target it edits, plus optional range, step, label and visibility.
//! Every configuration call returns a new spec and leaves the receiver
//! untouched, so a rejected call can never half-apply.

use crate::error::InspectorError;

use super::value::{Value, ValueKind};

/// Decimals shown for numbers when the control has no step
const DEFAULT_DECIMALS: usize = 3;

/// Upper bound on decimals derived from a step
const MAX_DECIMALS: usize = 6;

/// Immutable descriptor binding a control to `target.field`
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSpec<K> {
    target: K,
    field: String,
    kind: ValueKind,
    range: Option<(f32, f32)>,
    step: Option<f32>,
    label: Option<String>,
    visible: bool,
}

impl<K: Copy> ControlSpec<K> {
    pub(crate) fn new(target: K, field: &str, kind: ValueKind) -> Self {
        Self {
            target,
            field: field.to_string(),
            kind,
            range: None,
            step: None,
            label: None,
            visible: true,
        }
    }

    /// Restricts a numeric control to `[min, max]`
    ///
    /// Fails on non-numeric controls, on non-finite bounds and when
    /// `min > max`.
    pub fn with_range(&self, min: f32, max: f32) -> Result<Self, InspectorError> {
        self.require_number("range")?;
        if !min.is_finite() || !max.is_finite() {
            return Err(self.unsupported("range", "bounds must be finite".to_string()));
        }
        if min > max {
            return Err(self.unsupported("range", format!("min {} exceeds max {}", min, max)));
        }

        Ok(Self {
            range: Some((min, max)),
            ..self.clone()
        })
    }

    /// Quantizes a numeric control to multiples of `step`
    pub fn with_step(&self, step: f32) -> Result<Self, InspectorError> {
        self.require_number("step")?;
        if !step.is_finite() || step <= 0.0 {
            return Err(self.unsupported("step", format!("step must be > 0, got {}", step)));
        }

        Ok(Self {
            step: Some(step),
            ..self.clone()
        })
    }

    /// Overrides the displayed name; the bound field is unchanged
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..self.clone()
        }
    }

    /// Returns a copy that starts hidden
    pub fn hidden(&self) -> Self {
        Self {
            visible: false,
            ..self.clone()
        }
    }

    pub fn target(&self) -> K {
        self.target
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn range(&self) -> Option<(f32, f32)> {
        self.range
    }

    pub fn step(&self) -> Option<f32> {
        self.step
    }

    /// Displayed name: the label if one was set, else the field name
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Number of decimals the widget shows
    pub fn decimals(&self) -> usize {
        self.step.map(step_decimals).unwrap_or(DEFAULT_DECIMALS)
    }

    /// Applies step snapping, then range clamping
    pub fn constrain(&self, value: f32) -> f32 {
        let snapped = match self.step {
            Some(step) => snap(value, step, self.decimals()),
            None => value,
        };
        match self.range {
            Some((min, max)) => snapped.clamp(min, max),
            None => snapped,
        }
    }

    /// Text the widget shows for `value`
    pub fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => format!("{:.*}", self.decimals(), number),
            Value::Choice(choice) => choice.clone(),
            Value::Text(text) => text.clone(),
            Value::Color([r, g, b]) => format!(
                "#{:02x}{:02x}{:02x}",
                to_byte(*r),
                to_byte(*g),
                to_byte(*b)
            ),
        }
    }

    /// printf-style format handed to imgui sliders
    pub(crate) fn display_format(&self) -> String {
        format!("%.{}f", self.decimals())
    }

    fn require_number(&self, option: &'static str) -> Result<(), InspectorError> {
        match self.kind {
            ValueKind::Number => Ok(()),
            other => Err(self.unsupported(
                option,
                format!("only numeric controls accept it, this one is {}", other.name()),
            )),
        }
    }

    fn unsupported(&self, option: &'static str, reason: String) -> InspectorError {
        InspectorError::UnsupportedConfiguration {
            control: self.label().to_string(),
            option,
            reason,
        }
    }
}

fn step_decimals(step: f32) -> usize {
    let text = step.to_string();
    match text.split_once('.') {
        Some((_, fraction)) => fraction.len().min(MAX_DECIMALS),
        None => 0,
    }
}

fn snap(value: f32, step: f32, decimals: usize) -> f32 {
    let step = step as f64;
    let snapped = (value as f64 / step).round() * step;
    // Strip the binary noise left by the multiplication
    let scale = 10f64.powi(decimals as i32);
    ((snapped * scale).round() / scale) as f32
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
