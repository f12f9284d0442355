use std::sync::Arc;
use std::time::Instant;

use cgmath::Vector3;
use log::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::AppConfig;
use crate::demo;
use crate::error::AppError;
use crate::gfx::{
    camera::{OrbitControls, Viewport},
    scene::{Scene, SceneTarget},
    RenderEngine,
};
use crate::inspector::Panel;
use crate::ui::{inspector_window, UiManager};

/// Creates the event loop and runs the demo until the window closes
///
/// Fatal errors raised inside the loop stop it and are returned here.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = LanternApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

pub struct LanternApp {
    config: AppConfig,
    state: Option<AppState>,
    started: Instant,
    fatal: Option<AppError>,
}

/// Everything that only exists once a window is up
struct AppState {
    window: Arc<Window>,
    viewport: Viewport,
    render_engine: RenderEngine,
    ui_manager: UiManager,
    scene: Scene,
    panel: Panel<SceneTarget>,
    controls: OrbitControls,
}

impl LanternApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            started: Instant::now(),
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: AppError) {
        error!("{}", e);
        self.fatal = Some(e);
        event_loop.exit();
    }
}

impl AppState {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self, AppError> {
        let (width, height) = config.size;
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title(config.title.as_str())
                    .with_inner_size(LogicalSize::new(width, height)),
            )?,
        );

        let mut viewport = Viewport::new(config.max_pixel_ratio);
        let size = window.inner_size();
        let scale_factor = window.scale_factor();
        viewport.resize_physical(size.width, size.height, scale_factor);
        let (buffer_width, buffer_height) = viewport.drawing_buffer_size();

        let render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            buffer_width,
            buffer_height,
            config,
        ))?;

        let ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
            viewport.ui_scale(scale_factor),
            viewport.pixel_ratio(),
        );

        let scene = demo::build_scene(viewport.aspect());
        let panel = demo::build_panel(&scene)?;
        let controls = OrbitControls::new(Vector3::new(0.0, 0.0, 0.0)).with_damping(config.damping);

        info!(
            "lantern ready: {} scene children, {} inspector controls",
            scene.len(),
            panel.control_count()
        );

        Ok(Self {
            window,
            viewport,
            render_engine,
            ui_manager,
            scene,
            panel,
            controls,
        })
    }

    /// Applies a new physical window size and scale factor everywhere that
    /// depends on them
    fn resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        if !self.viewport.resize_physical(width, height, scale_factor) {
            return;
        }
        let (buffer_width, buffer_height) = self.viewport.drawing_buffer_size();
        self.render_engine.resize(buffer_width, buffer_height);

        let aspect = self.viewport.aspect();
        if let Some(camera) = self
            .scene
            .camera()
            .and_then(|id| self.scene.node_mut(id))
            .and_then(|node| node.camera_mut())
        {
            camera.update_projection(aspect);
        }

        self.ui_manager
            .set_ui_scale(&self.window, self.viewport.ui_scale(scale_factor));
    }

    fn update_camera(&mut self) {
        let viewport_height = self.window.inner_size().height as f32;
        let Some(node) = self.scene.camera().and_then(|id| self.scene.node_mut(id)) else {
            return;
        };
        let Some(camera) = node.camera().copied() else {
            return;
        };
        self.controls
            .update(&mut node.transform, &camera, viewport_height);
    }

    /// One frame: animate, build the inspector (edits land here), move the
    /// camera, sync the GPU, draw the scene and overlay the UI
    fn redraw(&mut self, elapsed: f32) -> Result<(), AppError> {
        demo::animate(&mut self.scene, elapsed);

        let Self {
            window,
            ui_manager,
            scene,
            panel,
            ..
        } = self;
        ui_manager.update_logic(window, |ui| inspector_window(ui, panel, scene))?;

        self.update_camera();
        self.render_engine.update(&self.scene);

        let ui_manager = &mut self.ui_manager;
        self.render_engine.render_frame(
            &self.scene,
            Some(
                |device: &wgpu::Device,
                 queue: &wgpu::Queue,
                 encoder: &mut wgpu::CommandEncoder,
                 view: &wgpu::TextureView| {
                    ui_manager.render_display_only(device, queue, encoder, view)
                },
            ),
        )
    }
}

impl ApplicationHandler for LanternApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match AppState::new(event_loop, &self.config) {
            Ok(state) => {
                self.state = Some(state);
                self.started = Instant::now();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        // UI input first; a drag that started in the scene keeps the mouse
        let ui_event: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        if state.ui_manager.handle_input(&state.window, &ui_event) && !state.controls.is_dragging() {
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                debug!("exit requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let scale_factor = state.window.scale_factor();
                state.resize(size.width, size.height, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = state.window.inner_size();
                state.resize(size.width, size.height, scale_factor);
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                if !state.ui_manager.wants_mouse() || button_state == ElementState::Released {
                    state.controls.handle_mouse_button(button, button_state);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !state.ui_manager.wants_mouse() {
                    state.controls.handle_scroll(&delta);
                }
            }
            WindowEvent::RedrawRequested => {
                let elapsed = self.started.elapsed().as_secs_f32();
                if let Err(e) = state.redraw(elapsed) {
                    self.fail(event_loop, e);
                }
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        if let DeviceEvent::MouseMotion { delta } = event {
            if state.ui_manager.wants_mouse() && !state.controls.is_dragging() {
                return;
            }
            let viewport_height = state.window.inner_size().height as f32;
            state.controls.handle_mouse_motion(delta, viewport_height);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_ref() {
            state.window.request_redraw();
        }
    }
}
