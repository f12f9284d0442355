// src/gfx/rendering/render_engine.rs
//! wgpu rendering engine
//!
//! Owns the surface, device and every GPU-side mirror of the scene. Each
//! frame [`RenderEngine::update`] copies the scene into uniforms, then
//! [`RenderEngine::render_frame`] draws lit meshes, light helpers and finally
//! the UI overlay.

use std::collections::HashMap;

use wgpu::TextureFormat;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::gfx::{
    camera::CameraUniform,
    resources::{
        depth_texture::{DepthTexture, DEPTH_FORMAT},
        global_bindings::{GlobalBindings, GlobalUBO, GlobalUBOContent},
        material::MaterialBindings,
        object::{DrawMesh, GpuMesh, ObjectBindings, ObjectUniform},
    },
    scene::{light::WHITE, HelperShape, NodeId, NodeKind, Scene, MAX_HELPER_PARTS},
};
use crate::wgpu_utils::BindGroupLayoutWithDesc;

use super::pipeline_manager::{PipelineConfig, PipelineManager};

/// Lit meshes: globals, material and object bind groups
pub const STANDARD_PIPELINE: &str = "Standard";
/// Unlit helper lines: globals and object bind groups
pub const HELPER_PIPELINE: &str = "Helper";

/// GPU side of one mesh node, created the first frame the node is seen
struct MeshResources {
    mesh: GpuMesh,
    bindings: ObjectBindings,
}

/// Per-part uniforms of one helper node
struct HelperResources {
    parts: Vec<(HelperShape, ObjectBindings)>,
}

/// Core rendering engine managing GPU resources and draw calls
///
/// The RenderEngine handles:
/// - surface and device setup, plus reconfiguration on resize or loss
/// - the standard and helper pipelines
/// - the depth buffer
/// - mirroring camera, lights, material and node transforms into uniforms
/// - handing the finished frame to the UI overlay
///
/// GPU resources are keyed by [`NodeId`] and created lazily, so nodes added
/// after start-up are picked up by the next [`RenderEngine::update`].
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: DepthTexture,
    format: TextureFormat,
    clear_color: wgpu::Color,
    pub pipeline_manager: PipelineManager,

    // Uniforms shared by every draw
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    material_bindings: MaterialBindings,

    // Per-node resources
    object_layout: BindGroupLayoutWithDesc,
    meshes: HashMap<NodeId, MeshResources>,
    helpers: HashMap<NodeId, HelperResources>,
    /// One unit line mesh per shape, shared by all helpers
    helper_shapes: HashMap<HelperShape, GpuMesh>,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Picks a non-sRGB surface format (the shaders encode sRGB themselves),
    /// creates the depth buffer, the shared uniforms and both pipelines, and
    /// uploads the unit helper shapes.
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Drawing buffer width in physical pixels
    /// * `height` - Drawing buffer height in physical pixels
    /// * `app_config` - Present mode and clear colour
    ///
    /// # Returns
    /// A RenderEngine ready for [`RenderEngine::update`] and
    /// [`RenderEngine::render_frame`]
    ///
    /// # Errors
    /// Fails if no surface, adapter or device can be created, or if the
    /// surface reports no usable format
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        app_config: &AppConfig,
    ) -> Result<RenderEngine, AppError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Lantern Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        // shaders encode sRGB themselves
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(AppError::UnsupportedSurface)?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: app_config.present_mode(),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = DepthTexture::new(&device, config.width, config.height);

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let material_bindings = MaterialBindings::new(&device, &Default::default());
        let object_layout = ObjectBindings::create_layout(&device);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader("standard", include_str!("shaders/standard.wgsl"));
        pipeline_manager.load_shader("helper", include_str!("shaders/helper.wgsl"));

        // no culling: the plane is seen from both sides
        pipeline_manager.register_pipeline(
            STANDARD_PIPELINE,
            PipelineConfig::default_with_shader("standard")
                .with_label(STANDARD_PIPELINE)
                .with_color_format(format)
                .with_depth(DEPTH_FORMAT, true)
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    material_bindings.bind_group_layout().clone(),
                    object_layout.layout.clone(),
                ]),
        );
        pipeline_manager.register_pipeline(
            HELPER_PIPELINE,
            PipelineConfig::default_with_shader("helper")
                .with_label(HELPER_PIPELINE)
                .with_color_format(format)
                .with_depth(DEPTH_FORMAT, true)
                .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    object_layout.layout.clone(),
                ]),
        );
        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        let helper_shapes = HelperShape::ALL
            .iter()
            .map(|shape| {
                let label = format!("{:?} Helper", shape);
                (*shape, GpuMesh::new(&device, &shape.build(), &label))
            })
            .collect();

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            clear_color: app_config.clear_color,
            pipeline_manager,
            global_ubo,
            global_bindings,
            material_bindings,
            object_layout,
            meshes: HashMap::new(),
            helpers: HashMap::new(),
            helper_shapes,
        })
    }

    /// Copies the scene into GPU uniforms, uploading new meshes on first sight
    ///
    /// The active camera, the visible lights and the shared material go into
    /// the global and material uniforms. Mesh nodes get their model matrix and
    /// helper nodes get one matrix per part, derived from their light.
    /// Unchanged uniforms are not re-uploaded.
    ///
    /// # Arguments
    /// * `scene` - Scene as it should appear in the next frame
    pub fn update(&mut self, scene: &Scene) {
        let camera = scene
            .camera()
            .and_then(|id| scene.node(id))
            .and_then(|node| {
                node.camera()
                    .map(|camera| CameraUniform::new(camera, &node.transform.matrix()))
            })
            .unwrap_or_default();
        self.global_ubo
            .update_content(&self.queue, GlobalUBOContent::new(camera, scene));
        self.material_bindings.update(&self.queue, &scene.material);

        for (id, node) in scene.nodes() {
            match &node.kind {
                NodeKind::Mesh(mesh_node) => {
                    let resources = self.meshes.entry(id).or_insert_with(|| MeshResources {
                        mesh: GpuMesh::new(&self.device, &mesh_node.primitive.build(), node.display_name()),
                        bindings: ObjectBindings::new(&self.device, &self.object_layout),
                    });
                    resources
                        .bindings
                        .update(&self.queue, ObjectUniform::new(node.transform.matrix(), WHITE));
                }
                NodeKind::Helper(_) => {
                    let color = scene.helper_color(id).unwrap_or(WHITE);
                    let parts = scene.helper_parts(id);
                    let resources = self.helpers.entry(id).or_insert_with(|| HelperResources {
                        parts: Vec::with_capacity(MAX_HELPER_PARTS),
                    });
                    resources.parts.truncate(parts.len());
                    for (index, (shape, matrix)) in parts.into_iter().enumerate() {
                        if index == resources.parts.len() {
                            resources.parts.push((
                                shape,
                                ObjectBindings::new(&self.device, &self.object_layout),
                            ));
                        }
                        let (slot_shape, bindings) = &mut resources.parts[index];
                        *slot_shape = shape;
                        bindings.update(&self.queue, ObjectUniform::new(matrix, color));
                    }
                }
                _ => {}
            }
        }
    }

    /// Draws the scene, then hands the frame to `ui_callback` for the overlay
    ///
    /// Visible meshes are drawn with the standard pipeline, then visible
    /// helpers with the line pipeline, in one depth-tested pass. A lost or
    /// outdated surface is reconfigured and the frame skipped.
    ///
    /// # Arguments
    /// * `scene` - Scene to draw; must have gone through [`RenderEngine::update`]
    /// * `ui_callback` - Optional function that records the UI into the
    ///   frame's encoder, after the scene pass
    ///
    /// # Errors
    /// Returns [`AppError::MissingPipeline`] if a pipeline failed to build,
    /// [`AppError::Frame`] for unrecoverable surface errors, and whatever the
    /// UI callback returns
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>) -> Result<(), AppError>
    where
        F: FnOnce(
            &wgpu::Device,
            &wgpu::Queue,
            &mut wgpu::CommandEncoder,
            &wgpu::TextureView,
        ) -> Result<(), AppError>,
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out waiting for the next frame");
                return Ok(());
            }
            Err(e) => return Err(AppError::Frame(e)),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let standard = self
                .pipeline_manager
                .pipeline(STANDARD_PIPELINE)
                .ok_or(AppError::MissingPipeline(STANDARD_PIPELINE))?;
            let helper = self
                .pipeline_manager
                .pipeline(HELPER_PIPELINE)
                .ok_or(AppError::MissingPipeline(HELPER_PIPELINE))?;

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            render_pass.set_pipeline(standard);
            render_pass.set_bind_group(1, self.material_bindings.bind_group(), &[]);
            for (id, node) in scene.nodes().filter(|(_, node)| node.visible) {
                if let Some(resources) = self.meshes.get(&id) {
                    render_pass.set_bind_group(2, resources.bindings.bind_group(), &[]);
                    render_pass.draw_mesh(&resources.mesh);
                } else if node.is_mesh() {
                    log::trace!("mesh #{} not uploaded yet", id.index());
                }
            }

            render_pass.set_pipeline(helper);
            for (id, _) in scene.nodes().filter(|(_, node)| node.visible) {
                let Some(resources) = self.helpers.get(&id) else {
                    continue;
                };
                for (shape, bindings) in &resources.parts {
                    if let Some(mesh) = self.helper_shapes.get(shape) {
                        render_pass.set_bind_group(1, bindings.bind_group(), &[]);
                        render_pass.draw_mesh(mesh);
                    }
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(&self.device, &self.queue, &mut encoder, &surface_texture_view)?;
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Resizes the surface and depth buffer to a new drawing buffer size
    ///
    /// Zero sizes and repeated sizes are ignored.
    ///
    /// # Arguments
    /// * `width` - New drawing buffer width in physical pixels
    /// * `height` - New drawing buffer height in physical pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.config.width, self.config.height) {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture.ensure_size(&self.device, width, height);
        log::debug!("surface resized to {}x{}", width, height);
    }

    /// Gets the wgpu device, for the UI renderer
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Gets the wgpu queue
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Gets the surface texture format the UI must render into
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
