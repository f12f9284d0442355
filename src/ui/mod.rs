//! # User Interface Module
//!
//! Dear ImGui integration for the inspector panel.
//!
//! - [`UiManager`] - ImGui context, winit platform and wgpu renderer
//! - [`inspector_window`] - draws an inspector [`Panel`] and writes edits back
//!
//! ## Input Handling
//!
//! Events reach imgui before the camera controls. While the pointer is over
//! the panel, orbit controls ignore the mouse.
//!
//! [`Panel`]: crate::inspector::Panel

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::inspector_window;
