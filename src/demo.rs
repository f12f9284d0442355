//! The light-types demo: scene contents, inspector wiring and animation

use std::f32::consts::PI;

use cgmath::Vector3;

use crate::error::InspectorError;
use crate::gfx::camera::PerspectiveCamera;
use crate::gfx::geometry::Primitive;
use crate::gfx::resources::StandardMaterial;
use crate::gfx::scene::light::WHITE;
use crate::gfx::scene::{
    color_from_hex, HelperKind, Light, LightHelper, MeshNode, NodeId, NodeKind, Scene,
    SceneNode, SceneTarget,
};
use crate::inspector::{ControlSpec, FolderId, Panel};

pub const PANEL_TITLE: &str = "Inspector";

/// Meshes spun by [`animate`]
const ANIMATED: [&str; 3] = ["sphere", "cube", "torus"];

const INTENSITY_RANGE: (f32, f32) = (0.0, 1.0);
const INTENSITY_STEP: f32 = 0.001;
const TRANSFORM_RANGE: (f32, f32) = (-3.0, 3.0);
const TRANSFORM_STEP: f32 = 0.01;

/// Builds the scene: six lights, the spot target, five hidden helpers, four
/// meshes sharing one material and the camera, in that order
pub fn build_scene(aspect: f32) -> Scene {
    let mut scene = Scene::new(StandardMaterial::new(WHITE).with_roughness(0.4));

    scene.add(SceneNode::new(NodeKind::Light(Light::ambient(WHITE, 0.5))));
    let directional = scene.add(
        SceneNode::new(NodeKind::Light(Light::directional(WHITE, 0.3))).with_position(1.0, 0.25, 0.0),
    );
    let hemisphere = scene.add(
        SceneNode::new(NodeKind::Light(Light::hemisphere(
            color_from_hex(0xff0000),
            color_from_hex(0x0000ff),
            0.3,
        )))
        .with_position(0.0, 1.0, 0.0),
    );
    let point = scene.add(
        SceneNode::new(NodeKind::Light(Light::point(color_from_hex(0xff9000), 10.0, 2.0, 2.0)))
            .with_position(1.0, -0.5, 1.0),
    );

    let mut rect_area = SceneNode::new(NodeKind::Light(Light::rect_area(
        color_from_hex(0x4e00ff),
        2.0,
        1.0,
        1.0,
    )))
    .with_position(-1.5, 0.0, 1.5);
    rect_area.transform.look_at(Vector3::new(0.0, 0.0, 0.0));
    let rect_area = scene.add(rect_area);

    // the target is added right after the light, so its id is known up front
    let spot_target = NodeId::from_index(scene.len() + 1);
    let spot = scene.add(
        SceneNode::new(NodeKind::Light(Light::spot(
            color_from_hex(0x78ff00),
            0.5,
            10.0,
            PI * 0.1,
            0.25,
            1.0,
            spot_target,
        )))
        .with_position(0.0, 2.0, 3.0),
    );
    let added = scene.add(
        SceneNode::new(NodeKind::Empty)
            .with_name("spotLightTarget")
            .with_position(-0.75, 0.0, 0.0),
    );
    debug_assert_eq!(added, spot_target);

    for (light, kind, size) in [
        (hemisphere, HelperKind::Hemisphere, 0.2),
        (directional, HelperKind::Directional, 0.2),
        (point, HelperKind::Point, 0.2),
        (rect_area, HelperKind::RectArea, 1.0),
        (spot, HelperKind::Spot, 1.0),
    ] {
        scene.add(
            SceneNode::new(NodeKind::Helper(LightHelper::new(light, kind, size))).with_visible(false),
        );
    }

    scene.add(
        mesh(Primitive::Sphere {
            radius: 0.5,
            width_segments: 32,
            height_segments: 32,
        })
        .with_name("sphere")
        .with_position(-1.5, 0.0, 0.0),
    );
    scene.add(
        mesh(Primitive::Box {
            width: 0.75,
            height: 0.75,
            depth: 0.75,
        })
        .with_name("cube"),
    );
    scene.add(
        mesh(Primitive::Torus {
            radius: 0.3,
            tube: 0.2,
            radial_segments: 32,
            tubular_segments: 64,
        })
        .with_name("torus")
        .with_position(1.5, 0.0, 0.0),
    );
    let mut plane = mesh(Primitive::Plane {
        width: 5.0,
        height: 5.0,
    })
    .with_name("plane")
    .with_position(0.0, -0.65, 0.0);
    plane.transform.rotation.x = -PI * 0.5;
    scene.add(plane);

    scene.add(
        SceneNode::new(NodeKind::Camera(PerspectiveCamera::new(75.0, aspect, 0.1, 100.0)))
            .with_position(1.0, 1.0, 2.0),
    );

    log::debug!("demo: scene built with {} children", scene.len());
    scene
}

fn mesh(primitive: Primitive) -> SceneNode {
    SceneNode::new(NodeKind::Mesh(MeshNode { primitive }))
}

/// Folder title for each light, keyed by its type name
fn light_folder_name(type_name: &str) -> &str {
    match type_name {
        "AmbientLight" => "Ambient Light",
        "DirectionalLight" => "Directional Light",
        "HemisphereLight" => "Hemisphere Light",
        "PointLight" => "Point Light",
        "RectAreaLight" => "RectArea Light",
        "SpotLight" => "Spot Light",
        other => other,
    }
}

/// `DirectionalLight` becomes `directionalLightHelperVisible`
fn helper_toggle_label(light_type: &str) -> String {
    let mut chars = light_type.chars();
    match chars.next() {
        Some(first) => format!("{}{}HelperVisible", first.to_ascii_lowercase(), chars.as_str()),
        None => "helperVisible".to_string(),
    }
}

/// Wires the inspector: a `Lights` folder with visibility, helper toggles and
/// intensity per light, and an `Objects3D` folder with transform sliders for
/// every scene child
pub fn build_panel(scene: &Scene) -> Result<Panel<SceneTarget>, InspectorError> {
    let mut panel = Panel::new(PANEL_TITLE);

    let lights = closed_folder(&mut panel, FolderId::ROOT, "Lights")?;
    for (id, node) in scene.nodes().filter(|(_, node)| node.light().is_some()) {
        let folder = closed_folder(&mut panel, lights, light_folder_name(node.display_name()))?;

        panel.add_bound(folder, scene, SceneTarget::node(id), "visible", Ok)?;

        // both toggles drive the same helper
        if let Some(helper) = helper_of(scene, id) {
            panel.add_bound(folder, scene, SceneTarget::node(helper), "visible", |spec| {
                Ok(spec.with_label("helper"))
            })?;
            let label = helper_toggle_label(node.display_name());
            panel.add_bound(folder, scene, SceneTarget::node(helper), "visible", |spec| {
                Ok(spec.with_label(label))
            })?;
        }

        panel.add_bound(folder, scene, SceneTarget::node(id), "intensity", |spec| {
            spec.with_range(INTENSITY_RANGE.0, INTENSITY_RANGE.1)?
                .with_step(INTENSITY_STEP)
        })?;
    }

    let objects = closed_folder(&mut panel, FolderId::ROOT, "Objects3D")?;
    for (id, node) in scene.nodes() {
        let folder = closed_folder(&mut panel, objects, node.display_name())?;

        for (part, target) in [
            ("position", SceneTarget::position(id)),
            ("rotation", SceneTarget::rotation(id)),
            ("scale", SceneTarget::scale(id)),
        ] {
            let sub = closed_folder(&mut panel, folder, part)?;
            for axis in ["x", "y", "z"] {
                let label = format!("{}{}", part, axis.to_ascii_uppercase());
                panel.add_bound(sub, scene, target, axis, |spec| {
                    transform_slider(spec, label)
                })?;
            }
        }
    }

    log::debug!(
        "demo: panel wired with {} folders and {} controls",
        panel.folder_count(),
        panel.control_count()
    );
    Ok(panel)
}

fn closed_folder(
    panel: &mut Panel<SceneTarget>,
    parent: FolderId,
    name: &str,
) -> Result<FolderId, InspectorError> {
    let folder = panel.create_folder(parent, name)?;
    panel.close(folder)
}

fn transform_slider(
    spec: ControlSpec<SceneTarget>,
    label: String,
) -> Result<ControlSpec<SceneTarget>, InspectorError> {
    Ok(spec
        .with_range(TRANSFORM_RANGE.0, TRANSFORM_RANGE.1)?
        .with_step(TRANSFORM_STEP)?
        .with_label(label))
}

/// The helper node attached to `light`, if any
fn helper_of(scene: &Scene, light: NodeId) -> Option<NodeId> {
    scene
        .nodes()
        .find(|(_, node)| node.helper().is_some_and(|helper| helper.light == light))
        .map(|(id, _)| id)
}

/// Spins the sphere, cube and torus; `elapsed` is in seconds
pub fn animate(scene: &mut Scene, elapsed: f32) {
    for name in ANIMATED {
        let Some(id) = scene.find(name) else {
            continue;
        };
        if let Some(node) = scene.node_mut(id) {
            node.transform.rotation.y = 0.1 * elapsed;
            node.transform.rotation.x = 0.15 * elapsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::LightKind;
    use crate::inspector::{Inspectable, PanelItem, Value};
    use cgmath::InnerSpace;

    fn scene() -> Scene {
        build_scene(16.0 / 9.0)
    }

    /// Lights and helpers are unnamed, so match on the shown name
    fn by_display_name(scene: &Scene, name: &str) -> NodeId {
        scene
            .nodes()
            .find(|(_, node)| node.display_name() == name)
            .map(|(id, _)| id)
            .unwrap()
    }

    fn child_names(scene: &Scene) -> Vec<String> {
        scene.nodes().map(|(_, node)| node.display_name().to_string()).collect()
    }

    fn folder(panel: &Panel<SceneTarget>, parent: FolderId, name: &str) -> FolderId {
        let found = panel.find_folders(parent, name);
        assert_eq!(found.len(), 1, "expected one folder named {}", name);
        found[0]
    }

    fn labels(panel: &Panel<SceneTarget>, folder: FolderId) -> Vec<String> {
        panel
            .folder_controls(folder)
            .filter_map(|id| panel.control(id))
            .map(|spec| spec.label().to_string())
            .collect()
    }

    #[test]
    fn test_children_order() {
        let scene = scene();
        assert_eq!(
            child_names(&scene),
            vec![
                "AmbientLight",
                "DirectionalLight",
                "HemisphereLight",
                "PointLight",
                "RectAreaLight",
                "SpotLight",
                "spotLightTarget",
                "HemisphereLightHelper",
                "DirectionalLightHelper",
                "PointLightHelper",
                "RectAreaLightHelper",
                "SpotLightHelper",
                "sphere",
                "cube",
                "torus",
                "plane",
                "PerspectiveCamera",
            ]
        );
        assert_eq!(scene.camera(), Some(NodeId::from_index(16)));
    }

    #[test]
    fn test_helpers_start_hidden() {
        let scene = scene();
        let helpers: Vec<_> = scene
            .nodes()
            .filter(|(_, node)| node.helper().is_some())
            .collect();
        assert_eq!(helpers.len(), 5);
        assert!(helpers.iter().all(|(_, node)| !node.visible));
    }

    #[test]
    fn test_spot_targets_named_node() {
        let scene = scene();
        let target = scene.find("spotLightTarget").unwrap();
        let spot = by_display_name(&scene, "SpotLight");
        let light = scene.node(spot).unwrap().light().unwrap();
        match light.kind {
            LightKind::Spot { target: aimed, .. } => assert_eq!(aimed, target),
            other => panic!("not a spot light: {:?}", other),
        }
        assert_eq!(
            scene.node(target).unwrap().transform.position,
            Vector3::new(-0.75, 0.0, 0.0)
        );
    }

    #[test]
    fn test_panel_layout() {
        let scene = scene();
        let panel = build_panel(&scene).unwrap();

        let roots: Vec<_> = panel
            .subfolders(FolderId::ROOT)
            .filter_map(|id| panel.folder_name(id))
            .collect();
        assert_eq!(roots, vec!["Lights", "Objects3D"]);

        let lights = folder(&panel, FolderId::ROOT, "Lights");
        assert_eq!(panel.is_closed(lights), Some(true));
        let light_folders: Vec<_> = panel
            .subfolders(lights)
            .filter_map(|id| panel.folder_name(id))
            .collect();
        assert_eq!(
            light_folders,
            vec![
                "Ambient Light",
                "Directional Light",
                "Hemisphere Light",
                "Point Light",
                "RectArea Light",
                "Spot Light",
            ]
        );
        assert!(panel.subfolders(lights).all(|id| panel.is_closed(id) == Some(true)));

        let ambient = folder(&panel, lights, "Ambient Light");
        assert_eq!(labels(&panel, ambient), vec!["visible", "intensity"]);

        let objects = folder(&panel, FolderId::ROOT, "Objects3D");
        assert_eq!(panel.subfolders(objects).count(), scene.len());
        let cube = folder(&panel, objects, "cube");
        let parts: Vec<_> = panel
            .subfolders(cube)
            .filter_map(|id| panel.folder_name(id))
            .collect();
        assert_eq!(parts, vec!["position", "rotation", "scale"]);
        let rotation = folder(&panel, cube, "rotation");
        assert_eq!(panel.is_closed(rotation), Some(true));
        assert_eq!(labels(&panel, rotation), vec!["rotationX", "rotationY", "rotationZ"]);
        for id in panel.folder_controls(rotation) {
            let spec = panel.control(id).unwrap();
            assert_eq!(spec.range(), Some((-3.0, 3.0)));
            assert_eq!(spec.step(), Some(0.01));
        }
    }

    #[test]
    fn test_duplicate_helper_toggles() {
        let mut scene = scene();
        let panel = build_panel(&scene).unwrap();
        let lights = folder(&panel, FolderId::ROOT, "Lights");
        let directional = folder(&panel, lights, "Directional Light");

        let controls: Vec<_> = panel.folder_controls(directional).collect();
        assert_eq!(
            labels(&panel, directional),
            vec!["visible", "helper", "directionalLightHelperVisible", "intensity"]
        );
        let (helper, named) = (controls[1], controls[2]);
        assert_eq!(
            panel.control(helper).unwrap().target(),
            panel.control(named).unwrap().target()
        );

        panel.set_value(&mut scene, helper, Value::Bool(true)).unwrap();
        assert_eq!(panel.value(&scene, named).unwrap(), Value::Bool(true));
        let helper_node = by_display_name(&scene, "DirectionalLightHelper");
        assert!(scene.node(helper_node).unwrap().visible);

        let rect = folder(&panel, lights, "RectArea Light");
        assert!(labels(&panel, rect).contains(&"rectAreaLightHelperVisible".to_string()));
    }

    #[test]
    fn test_intensity_end_to_end() {
        let mut scene = scene();
        let panel = build_panel(&scene).unwrap();
        let lights = folder(&panel, FolderId::ROOT, "Lights");
        let point = folder(&panel, lights, "Point Light");
        let intensity = panel
            .items(point)
            .unwrap()
            .iter()
            .find_map(|item| match item {
                PanelItem::Control(id) if panel.control(*id).unwrap().label() == "intensity" => {
                    Some(*id)
                }
                _ => None,
            })
            .unwrap();

        panel.set_value(&mut scene, intensity, Value::Number(1.5)).unwrap();

        let node = by_display_name(&scene, "PointLight");
        assert_eq!(scene.node(node).unwrap().light().unwrap().intensity, 1.0);
        assert_eq!(panel.display(&scene, intensity).unwrap(), "1.000");
    }

    #[test]
    fn test_position_slider_moves_node() {
        let mut scene = scene();
        let panel = build_panel(&scene).unwrap();
        let objects = folder(&panel, FolderId::ROOT, "Objects3D");
        let sphere = folder(&panel, objects, "sphere");
        let position = folder(&panel, sphere, "position");
        let x = panel.folder_controls(position).next().unwrap();

        let stored = panel.set_value(&mut scene, x, Value::Number(-4.2)).unwrap();
        assert_eq!(stored, Value::Number(-3.0));
        let id = scene.find("sphere").unwrap();
        assert_eq!(scene.node(id).unwrap().transform.position.x, -3.0);
    }

    #[test]
    fn test_hemisphere_position_slider_turns_the_sky() {
        use crate::gfx::camera::CameraUniform;
        use crate::gfx::resources::global_bindings::{light_type, GlobalUBOContent};

        let mut scene = scene();
        let panel = build_panel(&scene).unwrap();
        let objects = folder(&panel, FolderId::ROOT, "Objects3D");
        let hemisphere = folder(&panel, objects, "HemisphereLight");
        let position = folder(&panel, hemisphere, "position");
        let y = panel.folder_controls(position).nth(1).unwrap();

        let sky = |scene: &Scene| {
            let content = GlobalUBOContent::new(CameraUniform::default(), scene);
            content.lights[..content.light_count()]
                .iter()
                .find(|light| light.position[3] == light_type::HEMISPHERE)
                .map(|light| light.direction)
                .unwrap()
        };
        assert_eq!(sky(&scene), [0.0, 1.0, 0.0, 0.0]);

        panel.set_value(&mut scene, y, Value::Number(-1.0)).unwrap();
        assert_eq!(sky(&scene), [0.0, -1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_animate_spins_meshes() {
        let mut scene = scene();
        animate(&mut scene, 10.0);
        for name in ANIMATED {
            let node = scene.node(scene.find(name).unwrap()).unwrap();
            assert!((node.transform.rotation.y - 1.0).abs() < 1e-6);
            assert!((node.transform.rotation.x - 1.5).abs() < 1e-6);
        }
        let plane = scene.node(scene.find("plane").unwrap()).unwrap();
        assert!((plane.transform.rotation.x + PI * 0.5).abs() < 1e-6);
        assert_eq!(plane.transform.rotation.y, 0.0);
    }

    #[test]
    fn test_rect_area_faces_origin() {
        let scene = scene();
        let id = by_display_name(&scene, "RectAreaLight");
        let node = scene.node(id).unwrap();
        let forward = -node.transform.rotation_matrix().z;
        let to_origin = -node.transform.position;
        assert!((forward.normalize() - to_origin.normalize()).magnitude() < 1e-4);
        assert_eq!(node.type_name(), "RectAreaLight");
    }
}
