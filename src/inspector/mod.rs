//! Property inspector
//!
//! Declarative binding of UI controls to named fields of scene objects.
//! A [`Panel`] owns a tree of folders and [`ControlSpec`]s; the objects stay
//! in an [`InspectorContext`] that is handed to every read and write.
//!
//! ```ignore
//! let lights = panel.create_folder(FolderId::ROOT, "Lights")?;
//! panel.close(lights)?;
//! let spec = panel
//!     .bind(&scene, SceneTarget::node(point), "intensity")?
//!     .with_range(0.0, 1.0)?
//!     .with_step(0.001)?;
//! panel.add(lights, spec)?;
//! ```

pub mod control;
pub mod panel;
pub mod value;

pub use control::ControlSpec;
pub use panel::{ControlId, FolderId, Panel, PanelItem};
pub use value::{Inspectable, InspectorContext, Value, ValueKind};
