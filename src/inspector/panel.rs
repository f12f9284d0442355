//! The inspector panel: a tree of folders holding bound controls
//!
//! Folders and controls live in two arenas and are addressed by [`FolderId`]
//! and [`ControlId`]. A folder keeps its children as an ordered list, so two
//! siblings may share a name and still be reached independently.

use log::{debug, trace};

use crate::error::{InspectorError, InvalidFieldReason};

use super::control::ControlSpec;
use super::value::{type_mismatch, InspectorContext, Value, ValueKind};

/// Handle to a folder of a [`Panel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderId(usize);

impl FolderId {
    /// The panel's root folder
    pub const ROOT: FolderId = FolderId(0);
}

/// Handle to a control of a [`Panel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(usize);

impl ControlId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One entry of a folder, in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelItem {
    Folder(FolderId),
    Control(ControlId),
}

#[derive(Debug)]
struct Folder {
    name: String,
    items: Vec<PanelItem>,
    closed: bool,
}

/// Declarative property inspector bound to the targets of a context
///
/// `K` is the context's target key type. The panel only stores keys and field
/// names; all reads and writes go through the context passed to each call.
pub struct Panel<K> {
    folders: Vec<Folder>,
    controls: Vec<ControlSpec<K>>,
}

impl<K> Panel<K>
where
    K: Copy + std::fmt::Debug + PartialEq,
{
    /// Creates a panel whose root folder carries `title`
    pub fn new(title: &str) -> Self {
        Self {
            folders: vec![Folder {
                name: title.to_string(),
                items: Vec::new(),
                closed: false,
            }],
            controls: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.folders[FolderId::ROOT.0].name
    }

    /// Adds a child folder under `parent`. Duplicate names are allowed.
    ///
    /// Fails with [`InspectorError::UnknownFolder`] if `parent` belongs to
    /// another panel.
    pub fn create_folder(&mut self, parent: FolderId, name: &str) -> Result<FolderId, InspectorError> {
        let id = FolderId(self.folders.len());
        self.folder_mut(parent)?.items.push(PanelItem::Folder(id));
        self.folders.push(Folder {
            name: name.to_string(),
            items: Vec::new(),
            closed: false,
        });
        Ok(id)
    }

    /// Marks a folder as collapsed and hands its id back for chaining
    pub fn close(&mut self, folder: FolderId) -> Result<FolderId, InspectorError> {
        self.folder_mut(folder)?.closed = true;
        Ok(folder)
    }

    pub fn is_closed(&self, folder: FolderId) -> Option<bool> {
        self.folders.get(folder.0).map(|f| f.closed)
    }

    pub fn folder_name(&self, folder: FolderId) -> Option<&str> {
        self.folders.get(folder.0).map(|f| f.name.as_str())
    }

    /// Children of a folder in insertion order
    pub fn items(&self, folder: FolderId) -> Option<&[PanelItem]> {
        self.folders.get(folder.0).map(|f| f.items.as_slice())
    }

    /// Child folders of `parent`, in insertion order; none for an unknown id
    pub fn subfolders(&self, parent: FolderId) -> impl Iterator<Item = FolderId> + '_ {
        self.items(parent).unwrap_or_default().iter().filter_map(|item| match item {
            PanelItem::Folder(id) => Some(*id),
            PanelItem::Control(_) => None,
        })
    }

    /// Every child folder of `parent` named `name`
    ///
    /// Names are not unique, so this may return several folders.
    pub fn find_folders(&self, parent: FolderId, name: &str) -> Vec<FolderId> {
        self.subfolders(parent)
            .filter(|id| self.folder_name(*id) == Some(name))
            .collect()
    }

    /// Controls placed directly in `folder`, in insertion order
    pub fn folder_controls(&self, folder: FolderId) -> impl Iterator<Item = ControlId> + '_ {
        self.items(folder).unwrap_or_default().iter().filter_map(|item| match item {
            PanelItem::Control(id) => Some(*id),
            PanelItem::Folder(_) => None,
        })
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    /// Validates `target.field` and returns a fresh descriptor for it
    ///
    /// Fails with [`InspectorError::InvalidField`] when the target does not
    /// resolve, the field does not exist, or no control can render its kind.
    /// The target is only read.
    pub fn bind<C>(&self, ctx: &C, target: K, field: &str) -> Result<ControlSpec<K>, InspectorError>
    where
        C: InspectorContext<Target = K>,
    {
        let invalid = |target_name: String, reason| InspectorError::InvalidField {
            target: target_name,
            field: field.to_string(),
            reason,
        };

        let object = ctx
            .resolve(target)
            .ok_or_else(|| invalid(format!("{:?}", target), InvalidFieldReason::UnknownTarget))?;
        let target_name = format!("{} {:?}", object.type_name(), target);

        let kind = object
            .field_kind(field)
            .ok_or_else(|| invalid(target_name.clone(), InvalidFieldReason::Missing))?;
        if !kind.is_bindable() {
            return Err(invalid(
                target_name,
                InvalidFieldReason::UnsupportedKind(kind.name()),
            ));
        }

        Ok(ControlSpec::new(target, field, kind))
    }

    /// Finalizes a descriptor into `folder`
    pub fn add(&mut self, folder: FolderId, spec: ControlSpec<K>) -> Result<ControlId, InspectorError> {
        let id = ControlId(self.controls.len());
        let parent = self.folder_mut(folder)?;
        parent.items.push(PanelItem::Control(id));
        trace!(
            "inspector: '{}' -> {:?}.{} in '{}'",
            spec.label(),
            spec.target(),
            spec.field(),
            parent.name
        );
        self.controls.push(spec);
        Ok(id)
    }

    /// Binds, configures and adds a control in one call
    ///
    /// # Arguments
    /// * `folder` - Folder the control is appended to
    /// * `ctx` - Context the target is validated against; only read
    /// * `target` - Key of the object that owns the field
    /// * `field` - Field name, e.g. `"intensity"` or `"x"`
    /// * `configure` - Applies range, step and label to the fresh descriptor
    ///
    /// # Errors
    /// Whatever [`Panel::bind`] or `configure` reject, or
    /// [`InspectorError::UnknownFolder`]; nothing is added in that case
    pub fn add_bound<C, F>(
        &mut self,
        folder: FolderId,
        ctx: &C,
        target: K,
        field: &str,
        configure: F,
    ) -> Result<ControlId, InspectorError>
    where
        C: InspectorContext<Target = K>,
        F: FnOnce(ControlSpec<K>) -> Result<ControlSpec<K>, InspectorError>,
    {
        let spec = configure(self.bind(ctx, target, field)?)?;
        self.add(folder, spec)
    }

    pub fn control(&self, id: ControlId) -> Option<&ControlSpec<K>> {
        self.controls.get(id.0)
    }

    /// Replaces a control's descriptor with `configure(current)`
    ///
    /// The stored descriptor only changes if `configure` succeeds.
    pub fn reconfigure<F>(&mut self, id: ControlId, configure: F) -> Result<(), InspectorError>
    where
        F: FnOnce(&ControlSpec<K>) -> Result<ControlSpec<K>, InspectorError>,
    {
        let current = self
            .controls
            .get(id.0)
            .ok_or(InspectorError::UnknownControl(id.0))?;
        let updated = configure(current)?;
        self.controls[id.0] = updated;
        Ok(())
    }

    pub fn set_control_visible(&mut self, id: ControlId, visible: bool) -> Result<(), InspectorError> {
        let spec = self
            .controls
            .get_mut(id.0)
            .ok_or(InspectorError::UnknownControl(id.0))?;
        spec.set_visible(visible);
        Ok(())
    }

    /// Reads the bound field straight from the target
    pub fn value<C>(&self, ctx: &C, id: ControlId) -> Result<Value, InspectorError>
    where
        C: InspectorContext<Target = K>,
    {
        let spec = self.spec(id)?;
        let object = ctx
            .resolve(spec.target())
            .ok_or_else(|| unknown_target(spec))?;
        object.field(spec.field()).ok_or_else(|| InspectorError::InvalidField {
            target: format!("{} {:?}", object.type_name(), spec.target()),
            field: spec.field().to_string(),
            reason: InvalidFieldReason::Missing,
        })
    }

    /// Applies a user edit and writes it to the target immediately
    ///
    /// Numbers are snapped to the step and clamped to the range first. Returns
    /// the value that was actually stored.
    pub fn set_value<C>(&self, ctx: &mut C, id: ControlId, value: Value) -> Result<Value, InspectorError>
    where
        C: InspectorContext<Target = K>,
    {
        let spec = self.spec(id)?;

        let value = match (spec.kind(), value) {
            (ValueKind::Number, Value::Number(number)) if !number.is_finite() => {
                return Err(InspectorError::TypeMismatch {
                    field: spec.field().to_string(),
                    expected: "finite number",
                    actual: "number",
                });
            }
            (ValueKind::Number, Value::Number(number)) => Value::Number(spec.constrain(number)),
            (_, other) => other,
        };
        if !spec.kind().accepts(&value) {
            return Err(type_mismatch(spec.field(), spec.kind().name(), &value));
        }

        let object = ctx
            .resolve_mut(spec.target())
            .ok_or_else(|| unknown_target(spec))?;
        object.set_field(spec.field(), value.clone())?;

        debug!("inspector: {} = {:?}", spec.label(), value);
        Ok(value)
    }

    /// Text the control's widget currently shows
    pub fn display<C>(&self, ctx: &C, id: ControlId) -> Result<String, InspectorError>
    where
        C: InspectorContext<Target = K>,
    {
        let value = self.value(ctx, id)?;
        Ok(self.spec(id)?.format_value(&value))
    }

    fn folder_mut(&mut self, id: FolderId) -> Result<&mut Folder, InspectorError> {
        self.folders
            .get_mut(id.0)
            .ok_or(InspectorError::UnknownFolder(id.0))
    }

    fn spec(&self, id: ControlId) -> Result<&ControlSpec<K>, InspectorError> {
        self.controls
            .get(id.0)
            .ok_or(InspectorError::UnknownControl(id.0))
    }
}

fn unknown_target<K: Copy + std::fmt::Debug>(spec: &ControlSpec<K>) -> InspectorError {
    InspectorError::InvalidField {
        target: format!("{:?}", spec.target()),
        field: spec.field().to_string(),
        reason: InvalidFieldReason::UnknownTarget,
    }
}
