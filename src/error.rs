//! Error types for the Lantern demo
//!
//! [`InspectorError`] covers everything the property inspector can reject at
//! bind, configure or write time. [`AppError`] covers fatal start-up failures
//! of the window, GPU surface and UI backends.

use thiserror::Error;

/// Why a field could not be bound to a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidFieldReason {
    /// The target key no longer resolves to an object in the context
    UnknownTarget,
    /// The object has no field with that name
    Missing,
    /// The field exists but no control can render its kind
    UnsupportedKind(&'static str),
}

impl std::fmt::Display for InvalidFieldReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidFieldReason::UnknownTarget => write!(f, "target does not exist"),
            InvalidFieldReason::Missing => write!(f, "no such field"),
            InvalidFieldReason::UnsupportedKind(kind) => {
                write!(f, "fields of kind `{}` cannot be bound", kind)
            }
        }
    }
}

/// Errors raised by the property inspector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InspectorError {
    #[error("cannot bind `{field}` on {target}: {reason}")]
    InvalidField {
        target: String,
        field: String,
        reason: InvalidFieldReason,
    },

    #[error("`{option}` is not valid for control `{control}`: {reason}")]
    UnsupportedConfiguration {
        control: String,
        option: &'static str,
        reason: String,
    },

    #[error("field `{field}` expects a {expected} value, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{value} is out of range for `{field}`: {reason}")]
    OutOfRange {
        field: String,
        value: f32,
        reason: &'static str,
    },

    #[error("field `{0}` is read-only")]
    ReadOnlyField(String),

    #[error("control #{0} does not exist")]
    UnknownControl(usize),

    #[error("folder #{0} does not exist")]
    UnknownFolder(usize),
}

/// Fatal initialisation and presentation errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create render surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the selected adapter")]
    UnsupportedSurface,

    #[error("failed to acquire the next frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("failed to prepare UI frame: {0}")]
    UiPlatform(#[from] winit::error::ExternalError),

    #[error("failed to render UI: {0}")]
    UiRender(String),

    #[error("failed to wire the inspector: {0}")]
    Inspector(#[from] InspectorError),

    #[error("render pipeline `{0}` is not available")]
    MissingPipeline(&'static str),
}
