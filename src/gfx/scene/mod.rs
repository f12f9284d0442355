//! # Scene graph
//!
//! A flat list of [`SceneNode`]s owned by a [`Scene`]. Nodes are lights,
//! light helpers, meshes, cameras or plain transforms. Each node exposes its
//! fields to the inspector, and [`SceneTarget`] addresses a node or one of
//! its transform vectors.

pub mod helper;
pub mod light;
pub mod node;
pub mod scene;

// Re-export main types
pub use helper::{HelperKind, HelperShape, LightHelper, MAX_HELPER_PARTS};
pub use light::{color_from_hex, Color, Light, LightKind};
pub use node::{MeshNode, NodeId, NodeKind, SceneNode, Transform};
pub use scene::{Scene, SceneTarget, TargetPart};
