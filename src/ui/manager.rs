// src/ui/manager.rs
//! ImGui integration with wgpu and winit
//!
//! imgui's coordinate space is the drawing buffer: the platform is locked to
//! the ratio between window pixels and buffer pixels, so a capped pixel
//! ratio still maps the cursor onto the right widget.

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::Window,
};

use crate::error::AppError;

/// Font size in logical pixels
const FONT_SIZE: f32 = 13.0;

pub struct UiManager {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    /// Creates the imgui context, winit platform and wgpu renderer
    ///
    /// # Arguments
    /// * `device` - Device the UI renderer uploads its buffers to
    /// * `queue` - Queue for font atlas and buffer uploads
    /// * `output_color_format` - Surface format the overlay renders into
    /// * `window` - Window whose events and size drive imgui
    /// * `ui_scale` - Window pixels per drawing buffer pixel
    /// * `pixel_ratio` - Drawing buffer pixels per logical pixel
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
        ui_scale: f64,
        pixel_ratio: f64,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(ui_scale));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: FONT_SIZE * pixel_ratio as f32,
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Re-locks the platform after the window or pixel ratio changed
    pub fn set_ui_scale(&mut self, window: &Window, ui_scale: f64) {
        self.platform
            .attach_window(self.context.io_mut(), window, HiDpiMode::Locked(ui_scale));
    }

    /// Feeds an input event to imgui. Returns whether imgui wants the input
    /// for itself.
    pub fn handle_input<T>(&mut self, window: &Window, event: &Event<T>) -> bool {
        match event {
            Event::WindowEvent {
                event:
                    WindowEvent::CursorMoved { .. }
                    | WindowEvent::MouseInput { .. }
                    | WindowEvent::MouseWheel { .. }
                    | WindowEvent::KeyboardInput { .. }
                    | WindowEvent::ModifiersChanged(_)
                    | WindowEvent::Focused(_),
                ..
            } => {
                self.platform
                    .handle_event(self.context.io_mut(), window, event);
                self.wants_input()
            }
            _ => false,
        }
    }

    pub fn wants_input(&self) -> bool {
        let io = self.context.io();
        io.want_capture_mouse || io.want_capture_keyboard
    }

    pub fn wants_mouse(&self) -> bool {
        self.context.io().want_capture_mouse
    }

    /// Starts a frame, builds the UI with `run_ui` and returns whether imgui
    /// wants the input this frame
    pub fn update_logic<F>(&mut self, window: &Window, run_ui: F) -> Result<bool, AppError>
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        self.platform.prepare_frame(self.context.io_mut(), window)?;
        // the display size is already in buffer pixels
        self.context.io_mut().display_framebuffer_scale = [1.0, 1.0];

        let ui = self.context.frame();
        run_ui(ui);

        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }

        Ok(self.wants_input())
    }

    /// Draws the UI built by the last [`update_logic`](Self::update_logic)
    /// on top of `color_attachment`
    pub fn render_display_only(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) -> Result<(), AppError> {
        let draw_data = self.context.render();

        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return Ok(());
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.renderer
            .render(draw_data, queue, device, &mut render_pass)
            .map_err(|e| AppError::UiRender(e.to_string()))
    }
}
