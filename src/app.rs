//! Windowed front end: winit event loop, wgpu renderer, real pointer input.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use folio3d_core::FrameClock;
use folio3d_input::InputState;
use folio3d_render::{Renderer, SceneRenderer};
use folio3d_scene::assets::FsAssets;
use folio3d_ui3d::CursorStyle;
use tracing::{error, info};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{CursorIcon, Window, WindowBuilder};

use crate::config::{SceneConfig, Variant};
use crate::controller::SceneController;
use crate::frame;
use crate::notify::Notifier;

/// Shows notifications in the window title.
struct TitleNotifier {
    window: Arc<Window>,
    base_title: String,
}

impl Notifier for TitleNotifier {
    fn notify(&mut self, message: &str) {
        info!(message, "notification");
        self.window
            .set_title(&format!("{} | {message}", self.base_title));
    }
}

fn cursor_icon(style: CursorStyle) -> CursorIcon {
    match style {
        CursorStyle::Default => CursorIcon::Default,
        CursorStyle::Pointer => CursorIcon::Pointer,
    }
}

pub fn run(config: SceneConfig, variant: Variant, resolution: Option<(u32, u32)>) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let (width, height) = resolution.unwrap_or((config.window.width, config.window.height));
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window.title.clone())
            .with_inner_size(PhysicalSize::new(width, height))
            .build(&event_loop)
            .context("Failed to create window")?,
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone(), config.window.vsync))
        .context("Failed to initialize renderer")?;

    let notifier = TitleNotifier {
        window: window.clone(),
        base_title: config.window.title.clone(),
    };
    let mut assets = FsAssets::new(config.assets.root.clone());
    let mut controller = SceneController::new(variant, &config, &mut assets, Box::new(notifier));
    controller.resize(renderer.size());

    let mut input = InputState::new();
    let mut clock = FrameClock::default();
    let mut cursor = CursorStyle::Default;
    let started = Instant::now();

    info!(%variant, "entering event loop");
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                renderer.resize((size.width, size.height));
                controller.resize((size.width, size.height));
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                controller.cancel_chains();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = clock.tick(now);
                let (drag, wheel) = input.take_frame_deltas();
                controller.orbit_input(drag, wheel);

                let elapsed = now.duration_since(started).as_secs_f64();
                if let Err(err) = frame::run_frame(&mut controller, &mut renderer, elapsed, dt) {
                    error!("{err:?}");
                    elwt.exit();
                }
                controller.drain_events();

                if controller.cursor() != cursor {
                    cursor = controller.cursor();
                    window.set_cursor_icon(cursor_icon(cursor));
                }
            }
            other => {
                if let Some(pointer) = input.handle_event(&other) {
                    controller.pointer(pointer);
                }
            }
        },
        Event::AboutToWait => window.request_redraw(),
        _ => {}
    })?;

    Ok(())
}
