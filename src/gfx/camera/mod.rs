pub mod orbit_controls;
pub mod perspective;
pub mod viewport;

// Re-export main types
pub use orbit_controls::OrbitControls;
pub use perspective::{CameraUniform, PerspectiveCamera, OPENGL_TO_WGPU_MATRIX};
pub use viewport::Viewport;
