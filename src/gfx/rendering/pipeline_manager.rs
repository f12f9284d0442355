// src/gfx/rendering/pipeline_manager.rs
//! Render pipeline registry
//!
//! Shaders are compiled once and looked up by name. A pipeline is registered
//! as a [`PipelineConfig`] and stays pending until
//! [`PipelineManager::create_all_pipelines`] runs.

use std::collections::HashMap;

use thiserror::Error;

use super::vertex::Vertex3D;

/// Why a registered pipeline could not be created
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The config names a shader that was never passed to
    /// [`PipelineManager::load_shader`]
    #[error("pipeline '{pipeline}' needs shader '{shader}', which is not loaded")]
    ShaderNotLoaded { pipeline: String, shader: String },

    /// Nothing was registered under this name
    #[error("no pipeline named '{0}' is registered")]
    Unregistered(String),
}

/// Depth test settings; the comparison is always `Less`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthConfig {
    pub format: wgpu::TextureFormat,
    pub write: bool,
}

/// Everything needed to create one render pipeline
///
/// Both pipelines of the renderer read [`Vertex3D`] buffers and enter their
/// shader at `vs_main` / `fs_main`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Debug label of the pipeline and its layout
    pub label: String,
    /// Name the shader module was loaded under
    pub shader: String,
    /// Layouts in bind group slot order
    pub bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    pub primitive_topology: wgpu::PrimitiveTopology,
    /// Faces to cull; `None` draws both sides
    pub cull_mode: Option<wgpu::Face>,
    /// Depth test, or `None` for a pass without depth attachment
    pub depth: Option<DepthConfig>,
    /// Format of the single colour target
    pub color_format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
}

impl PipelineConfig {
    /// Opaque triangle list without depth testing
    ///
    /// Back faces are culled and the colour target is `Bgra8Unorm` until
    /// overridden.
    ///
    /// # Arguments
    /// * `shader` - Shader name, also used as the initial label
    pub fn default_with_shader(shader: &str) -> Self {
        Self {
            label: shader.to_string(),
            shader: shader.to_string(),
            bind_group_layouts: Vec::new(),
            primitive_topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            depth: None,
            color_format: wgpu::TextureFormat::Bgra8Unorm,
            blend: Some(wgpu::BlendState::REPLACE),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    /// Sets the culled face; `None` disables culling
    pub fn with_cull_mode(mut self, face: Option<wgpu::Face>) -> Self {
        self.cull_mode = face;
        self
    }

    /// Sets the bind group layouts, slot 0 first
    pub fn with_bind_group_layouts(mut self, layouts: Vec<wgpu::BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Enables the depth test against `format`
    ///
    /// # Arguments
    /// * `format` - Format of the depth attachment the pass will use
    /// * `write` - Whether passing fragments update the depth buffer
    pub fn with_depth(mut self, format: wgpu::TextureFormat, write: bool) -> Self {
        self.depth = Some(DepthConfig { format, write });
        self
    }

    /// Sets the colour target format, normally the surface format
    pub fn with_color_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_primitive_topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.primitive_topology = topology;
        self
    }

    fn depth_stencil(&self) -> Option<wgpu::DepthStencilState> {
        self.depth.map(|depth| wgpu::DepthStencilState {
            format: depth.format,
            depth_write_enabled: depth.write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        })
    }
}

enum PipelineEntry {
    Pending(PipelineConfig),
    Ready(wgpu::RenderPipeline),
}

/// Shader modules and render pipelines, both by name
///
/// Registration only stores the config. Pipelines are built in bulk by
/// [`PipelineManager::create_all_pipelines`] once their shaders are loaded,
/// and looked up with [`PipelineManager::pipeline`] while recording passes.
pub struct PipelineManager {
    device: wgpu::Device,
    shaders: HashMap<String, wgpu::ShaderModule>,
    pipelines: HashMap<String, PipelineEntry>,
}

impl PipelineManager {
    /// Creates an empty manager that builds on `device`
    pub fn new(device: wgpu::Device) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles a WGSL module and caches it under `name`
    ///
    /// # Arguments
    /// * `name` - Key that [`PipelineConfig::shader`] refers to
    /// * `source` - WGSL source with `vs_main` and `fs_main` entry points
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        self.shaders.insert(name.to_string(), module);
        log::debug!("loaded shader '{}'", name);
    }

    /// Registers a pipeline without creating it. Re-registering a name
    /// replaces the old pipeline.
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipelines
            .insert(name.to_string(), PipelineEntry::Pending(config));
    }

    /// Returns a created pipeline, or `None` while it is pending
    pub fn pipeline(&self, name: &str) -> Option<&wgpu::RenderPipeline> {
        match self.pipelines.get(name)? {
            PipelineEntry::Ready(pipeline) => Some(pipeline),
            PipelineEntry::Pending(_) => None,
        }
    }

    /// Builds every pending pipeline, collecting the failures
    ///
    /// Failed pipelines stay pending and are retried on the next call.
    ///
    /// # Returns
    /// `Ok` if every pipeline is ready, otherwise one error per failure
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<PipelineError>> {
        let pending: Vec<String> = self
            .pipelines
            .iter()
            .filter(|(_, entry)| matches!(entry, PipelineEntry::Pending(_)))
            .map(|(name, _)| name.clone())
            .collect();

        let errors: Vec<PipelineError> = pending
            .iter()
            .filter_map(|name| self.build(name).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn build(&mut self, name: &str) -> Result<(), PipelineError> {
        let config = match self.pipelines.get(name) {
            Some(PipelineEntry::Ready(_)) => return Ok(()),
            Some(PipelineEntry::Pending(config)) => config,
            None => return Err(PipelineError::Unregistered(name.to_string())),
        };
        let shader = self
            .shaders
            .get(&config.shader)
            .ok_or_else(|| PipelineError::ShaderNotLoaded {
                pipeline: name.to_string(),
                shader: config.shader.clone(),
            })?;

        let layouts: Vec<&wgpu::BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", config.label)),
                bind_group_layouts: &layouts,
                push_constant_ranges: &[],
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex3D::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.color_format,
                        blend: config.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: config.primitive_topology,
                    cull_mode: config.cull_mode,
                    ..Default::default()
                },
                depth_stencil: config.depth_stencil(),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        log::debug!("created pipeline '{}'", name);
        self.pipelines
            .insert(name.to_string(), PipelineEntry::Ready(pipeline));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::default_with_shader("helper")
            .with_label("Helper")
            .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
            .with_cull_mode(None)
            .with_depth(wgpu::TextureFormat::Depth32Float, true);

        assert_eq!(config.shader, "helper");
        assert_eq!(config.label, "Helper");
        assert_eq!(config.primitive_topology, wgpu::PrimitiveTopology::LineList);
        assert_eq!(config.cull_mode, None);

        let depth = config.depth_stencil().unwrap();
        assert_eq!(depth.format, wgpu::TextureFormat::Depth32Float);
        assert!(depth.depth_write_enabled);
        assert_eq!(depth.depth_compare, wgpu::CompareFunction::Less);
    }

    #[test]
    fn test_default_has_no_depth() {
        let config = PipelineConfig::default_with_shader("standard");
        assert_eq!(config.label, "standard");
        assert!(config.depth_stencil().is_none());
        assert_eq!(config.cull_mode, Some(wgpu::Face::Back));
    }
}
