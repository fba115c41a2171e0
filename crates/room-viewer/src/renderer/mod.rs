//! Owns the GPU context, the depth target and the room pipeline, and records
//! the scene pass each frame.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{context::GfxContext, pipelines::mesh::MeshPipeline, targets::Targets};
use crate::camera::Camera;
use crate::scene::{FrameUniformStd140, RoomScene, SceneGpu};
use std::sync::Arc;
use winit::window::Window;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.07,
    a: 1.0,
};

pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub mesh: MeshPipeline,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;
        let targets = Targets::new(&gfx.device, gfx.size);
        let mesh = MeshPipeline::new(&gfx.device, gfx.config.format, targets.depth_fmt);
        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            targets,
            mesh,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
        }
    }

    /// Uploads this frame's uniforms and draws the room into `swap_view`.
    pub fn render(
        &mut self,
        swap_view: &wgpu::TextureView,
        scene: &RoomScene,
        scene_gpu: &SceneGpu,
        camera: &Camera,
    ) {
        let frame = FrameUniformStd140::new(camera, &scene.spotlight);
        self.mesh.write_frame(&self.gfx.queue, &frame);
        scene_gpu.write_uniforms(&self.gfx.queue, scene);

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Room Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Room Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.mesh.draw_scene(&mut pass, scene, scene_gpu);
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}
