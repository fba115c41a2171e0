use crate::{
    camera::{Camera, CameraController},
    config::{Config, RoomConfig},
    links::Launcher,
    renderer::Renderer,
    scene::{RoomScene, SceneGpu, LID_TOGGLE},
    ui::{self, HoverInfo},
};
use anyhow::{Context, Result};
use roomkit::pick::{
    Action, CursorCue, Effect, EffectQueue, InteractionTracker, PointerEvent, PointerHub,
    Subscription, ViewportRect,
};
use roomkit::texture::SynthesisParams;
use std::{cell::RefCell, rc::Rc, sync::Arc, time::Instant};
use winit::{
    event::WindowEvent,
    window::{CursorIcon, Window},
};

/// Longest frame step fed to animations, so a stall does not teleport them.
const MAX_DT_S: f32 = 0.1;

pub struct App {
    pub renderer: Renderer,
    pub camera: Rc<RefCell<Camera>>,
    pub camera_controller: CameraController,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub scene: RoomScene,
    scene_gpu: SceneGpu,
    tracker: Rc<RefCell<InteractionTracker>>,
    effects: Rc<RefCell<EffectQueue>>,
    hub: PointerHub,
    subscription: Subscription,
    launcher: Launcher,
    cursor: Option<(f32, f32)>,
    last_frame: Instant,
}

impl App {
    pub async fn new(window: Arc<Window>, cfg: &Config) -> Result<Self> {
        // Load the room description, then bring up the GPU.
        let room: RoomConfig = cfg.room_config()?;
        let renderer = Renderer::new(window.clone()).await?;
        let size = renderer.gfx.size;

        // Orbit camera, shared with the picker.
        let camera = Rc::new(RefCell::new(Camera::new(
            RoomScene::orbit_target(),
            6.5,
            RoomScene::bounds(),
            size.width as f32 / size.height.max(1) as f32,
        )));
        let camera_controller = CameraController::new();

        // The tracker picks through the same camera the renderer draws with.
        let mut tracker = InteractionTracker::new(camera.clone());
        let ball = SynthesisParams {
            jitter: cfg.jitter,
            ..SynthesisParams::basketball(cfg.texture_size)
        };
        let scene = RoomScene::build(&room, &ball, !cfg.no_spin, &mut tracker)
            .context("assembling the room")?;
        let scene_gpu = SceneGpu::upload(
            &renderer.gfx.device,
            &renderer.gfx.queue,
            &renderer.mesh,
            &scene,
        );

        // Route pointer events through the hub into an effect queue.
        let tracker = Rc::new(RefCell::new(tracker));
        let effects = Rc::new(RefCell::new(EffectQueue::default()));
        let hub = PointerHub::new();
        let subscription = hub.attach(tracker.clone(), effects.clone());

        // Set up egui.
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        Ok(Self {
            renderer,
            camera,
            camera_controller,
            egui_ctx,
            egui_state,
            scene,
            scene_gpu,
            tracker,
            effects,
            hub,
            subscription,
            launcher: Launcher::new(),
            cursor: None,
            last_frame: Instant::now(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.camera
                .borrow_mut()
                .set_aspect(new_size.width as f32 / new_size.height as f32);
        }
    }

    fn viewport(&self) -> ViewportRect {
        let cfg = &self.renderer.gfx.config;
        ViewportRect::sized(cfg.width as f32, cfg.height as f32)
    }

    /// Re-picks at the last known cursor position.
    fn repick(&mut self) {
        if let Some((x, y)) = self.cursor {
            self.hub.dispatch(&PointerEvent::Move {
                x,
                y,
                viewport: self.viewport(),
            });
        }
    }

    /// Returns `true` if egui consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        // Let egui see the event first.
        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        // Camera input; a press/release without drag counts as a click.
        let outcome = self
            .camera_controller
            .handle_event(event, &mut self.camera.borrow_mut());

        // Re-pick whenever the view or the cursor changed.
        match event {
            WindowEvent::Resized(physical_size) => {
                self.resize(*physical_size);
                self.repick();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some((position.x as f32, position.y as f32));
                self.repick();
            }
            WindowEvent::CursorLeft { .. } => {
                // A point far outside any viewport reads as "no hit".
                self.cursor = None;
                self.hub.dispatch(&PointerEvent::Move {
                    x: f32::MIN,
                    y: f32::MIN,
                    viewport: self.viewport(),
                });
            }
            WindowEvent::MouseWheel { .. } => self.repick(),
            _ => {}
        }
        if outcome.clicked {
            self.hub.dispatch(&PointerEvent::Click);
        }

        self.apply_effects(window);
        false
    }

    /// Applies what the tracker asked for during dispatch.
    fn apply_effects(&mut self, window: &Window) {
        let effects = self.effects.borrow_mut().drain();
        for effect in effects {
            match self.scene.apply(effect) {
                Some(Effect::Cursor(CursorCue::Pointer)) => {
                    window.set_cursor_icon(CursorIcon::Pointer)
                }
                Some(Effect::Cursor(CursorCue::Default)) => {
                    window.set_cursor_icon(CursorIcon::Default)
                }
                Some(Effect::Perform(Action::OpenUrl(url))) => {
                    if let Err(e) = self.launcher.open(&url) {
                        log::error!("{:#}", e);
                    }
                }
                Some(other) => log::warn!("unhandled effect {:?}", other),
                None => {}
            }
        }
    }

    fn hover_info(&self) -> HoverInfo {
        let tracker = self.tracker.borrow();
        let Some(id) = tracker.state().surface() else {
            return HoverInfo::Nothing;
        };
        match tracker.action(id) {
            Some(Action::OpenUrl(url)) => match self.scene.link_for_url(url) {
                Some(link) => HoverInfo::Link {
                    label: link.label.clone(),
                    url: link.url.clone(),
                },
                None => HoverInfo::Link {
                    label: url.clone(),
                    url: url.clone(),
                },
            },
            Some(Action::Toggle(t)) if *t == LID_TOGGLE => HoverInfo::Laptop {
                open: self.scene.lid.open,
            },
            _ => HoverInfo::Nothing,
        }
    }

    /// Stops pointer interaction and restores the default cursor.
    pub fn shutdown(&mut self, window: &Window) {
        self.subscription.release();
        self.apply_effects(window);
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        // Advance animations and collect finished link openers.
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32().min(MAX_DT_S);
        self.last_frame = now;
        self.scene.tick(dt);
        self.launcher.reap();

        // Draw the room.
        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(
            &swap_view,
            &self.scene,
            &self.scene_gpu,
            &self.camera.borrow(),
        );

        // Build the HUD.
        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        ui::draw_hud(
            &self.egui_ctx,
            &self.hover_info(),
            self.scene.lid.open,
            self.scene.chair.enabled,
        );

        let egui_output = self.egui_ctx.end_frame();
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        // Upload egui textures and buffers, then draw over the scene.
        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
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
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
