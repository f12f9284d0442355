// src/ui/panel.rs
//! imgui rendering of an inspector [`Panel`]
//!
//! Folders become tree nodes and controls become widgets. The widget shows
//! the value read from the target this frame; an edit is routed through
//! [`Panel::set_value`] so stepping and clamping apply before the write.

use imgui::{Condition, Drag, Ui};

use crate::inspector::{ControlId, FolderId, InspectorContext, Panel, PanelItem, Value, ValueKind};

const PANEL_WIDTH: f32 = 320.0;
const MARGIN: f32 = 10.0;

/// Draws `panel` as a window anchored to the top-right corner
pub fn inspector_window<C>(ui: &Ui, panel: &Panel<C::Target>, ctx: &mut C)
where
    C: InspectorContext,
{
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }
    let width = PANEL_WIDTH.min(display_size[0] - 2.0 * MARGIN).max(100.0);

    ui.window(panel.title())
        .size([width, display_size[1] * 0.6], Condition::FirstUseEver)
        .position(
            [display_size[0] - width - MARGIN, MARGIN],
            Condition::FirstUseEver,
        )
        .collapsible(true)
        .build(|| draw_folder(ui, panel, ctx, FolderId::ROOT));
}

fn draw_folder<C>(ui: &Ui, panel: &Panel<C::Target>, ctx: &mut C, folder: FolderId)
where
    C: InspectorContext,
{
    let Some(items) = panel.items(folder) else {
        return;
    };
    for item in items {
        match *item {
            PanelItem::Folder(child) => {
                let name = panel.folder_name(child).unwrap_or_default();
                let label = format!("{}##folder{:?}", name, child);
                ui.tree_node_config(label)
                    .opened(!panel.is_closed(child).unwrap_or(false), Condition::FirstUseEver)
                    .build(|| draw_folder(ui, panel, ctx, child));
            }
            PanelItem::Control(id) => draw_control(ui, panel, ctx, id),
        }
    }
}

fn draw_control<C>(ui: &Ui, panel: &Panel<C::Target>, ctx: &mut C, id: ControlId)
where
    C: InspectorContext,
{
    let Some(spec) = panel.control(id) else {
        return;
    };
    if !spec.is_visible() {
        return;
    }
    let label = format!("{}##control{}", spec.label(), id.index());

    let current = match panel.value(ctx, id) {
        Ok(value) => value,
        Err(e) => {
            ui.text_disabled(format!("{}: {}", spec.label(), e));
            return;
        }
    };

    let edited = match (spec.kind(), current) {
        (ValueKind::Bool, Value::Bool(mut checked)) => {
            ui.checkbox(&label, &mut checked).then_some(Value::Bool(checked))
        }
        (ValueKind::Number, Value::Number(mut number)) => {
            let changed = match spec.range() {
                Some((min, max)) => ui
                    .slider_config(&label, min, max)
                    .display_format(spec.display_format())
                    .build(&mut number),
                None => Drag::new(&label)
                    .speed(spec.step().unwrap_or(0.01))
                    .display_format(spec.display_format())
                    .build(ui, &mut number),
            };
            changed.then_some(Value::Number(number))
        }
        (ValueKind::Choice(options), Value::Choice(selected)) => {
            let mut index = options
                .iter()
                .position(|option| *option == selected.as_str())
                .unwrap_or(0);
            if ui.combo_simple_string(&label, &mut index, options) {
                options.get(index).map(|option| Value::Choice(option.to_string()))
            } else {
                None
            }
        }
        (_, other) => {
            ui.text(format!("{}: {:?}", spec.label(), other));
            None
        }
    };

    if let Some(value) = edited {
        if let Err(e) = panel.set_value(ctx, id, value) {
            log::warn!("inspector: rejected edit of {}: {}", spec.label(), e);
        }
    }
}
