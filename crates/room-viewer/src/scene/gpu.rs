//! GPU representation of the room: uniform layouts, mesh buffers, textures and
//! per-object bind groups.

use super::mesh::MeshKind;
use super::room::{RoomScene, Spotlight};
use crate::camera::Camera;
use crate::renderer::pipelines::mesh::MeshPipeline;
use roomkit::texture::TextureImage;
use wgpu::util::DeviceExt;

/// Per-frame uniform, std140. Must match `Frame` in `room.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniformStd140 {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position (w unused).
    pub eye: [f32; 4],
    /// Ambient light color (w unused).
    pub ambient: [f32; 4],
    /// Spotlight position; w = intensity.
    pub spot_pos: [f32; 4],
    /// Spotlight direction; w = cosine of the outer cone.
    pub spot_dir: [f32; 4],
    /// Spotlight color; w = cosine of the inner cone.
    pub spot_color: [f32; 4],
    /// Direction the key light travels; w = intensity.
    pub key_dir: [f32; 4],
}

const _: [(); 160] = [(); core::mem::size_of::<FrameUniformStd140>()];

impl FrameUniformStd140 {
    pub fn new(camera: &Camera, spot: &Spotlight) -> Self {
        let eye = camera.position();
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 1.0],
            ambient: [0.22, 0.22, 0.25, 0.0],
            spot_pos: spot.position.extend(spot.intensity).to_array(),
            spot_dir: spot.direction.extend(spot.cos_outer).to_array(),
            spot_color: spot.color.extend(spot.cos_inner).to_array(),
            key_dir: [-0.35, -0.8, -0.45, 0.55],
        }
    }
}

/// Per-object uniform, std140. Must match `Object` in `room.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniformStd140 {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`, for normals.
    pub normal: [[f32; 4]; 4],
    pub tint: [f32; 4],
    /// x = emissive, y = u offset, z = textured (0/1), w = bump strength.
    pub params: [f32; 4],
}

const _: [(); 160] = [(); core::mem::size_of::<ObjectUniformStd140>()];

impl ObjectUniformStd140 {
    pub fn new(scene: &RoomScene, i: usize) -> Self {
        let model = scene.world_matrix(i);
        let m = &scene.objects[i].material;
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            tint: m.tint,
            params: [
                m.emissive,
                m.uv_offset,
                if m.texture.is_some() { 1.0 } else { 0.0 },
                m.bump_strength,
            ],
        }
    }
}

pub struct MeshGpu {
    pub vtx: wgpu::Buffer,
    pub idx: wgpu::Buffer,
    pub index_count: u32,
}

/// A sampled texture; the texture is kept alive for its view.
pub struct GpuTexture {
    _tex: wgpu::Texture,
    pub view: wgpu::TextureView,
}

pub struct ObjectGpu {
    pub ubo: wgpu::Buffer,
    pub bind: wgpu::BindGroup,
    /// False when the material's texture could not be uploaded.
    pub textured: bool,
}

/// All GPU resources for one assembled room.
pub struct SceneGpu {
    /// Indexed by `MeshKind::index`.
    pub meshes: Vec<MeshGpu>,
    /// Parallel to `RoomScene::objects`.
    pub objects: Vec<ObjectGpu>,
    _textures: Vec<(GpuTexture, Option<GpuTexture>)>,
    _fallback: GpuTexture,
}

impl SceneGpu {
    /// Uploads meshes, textures and per-object uniforms.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &MeshPipeline,
        scene: &RoomScene,
    ) -> Self {
        let meshes = MeshKind::ALL
            .iter()
            .map(|kind| {
                let data = kind.build();
                let label = format!("{:?} Mesh", kind);
                MeshGpu {
                    vtx: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label.as_str()),
                        contents: bytemuck::cast_slice(&data.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    idx: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label.as_str()),
                        contents: bytemuck::cast_slice(&data.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                    index_count: data.indices.len() as u32,
                }
            })
            .collect();

        let fallback = upload_rgba(device, queue, "White 1x1", 1, &[255; 4], true);
        let max_dim = device.limits().max_texture_dimension_2d;

        // A texture that cannot be uploaded leaves its object untextured.
        let textures: Vec<Option<(GpuTexture, Option<GpuTexture>)>> = scene
            .textures
            .iter()
            .map(|t| {
                if t.color.edge() > max_dim {
                    log::warn!(
                        "Texture '{}' is {}px, above the device limit of {}px; rendering without it",
                        t.label,
                        t.color.edge(),
                        max_dim
                    );
                    return None;
                }
                let color = upload_image(device, queue, t.label, &t.color, true);
                let bump = t
                    .bump
                    .as_ref()
                    .map(|b| upload_image(device, queue, t.label, b, false));
                Some((color, bump))
            })
            .collect();

        let objects = (0..scene.objects.len())
            .map(|i| {
                let obj = &scene.objects[i];
                let layers = obj.material.texture.and_then(|slot| textures[slot].as_ref());
                let mut uniform = ObjectUniformStd140::new(scene, i);
                if layers.is_none() {
                    uniform.params[2] = 0.0;
                }
                let color_view = layers.map_or(&fallback.view, |(c, _)| &c.view);
                let bump_view = layers
                    .and_then(|(_, b)| b.as_ref())
                    .map_or(&fallback.view, |b| &b.view);

                let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(obj.name.as_str()),
                    contents: bytemuck::bytes_of(&uniform),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind = pipeline.object_bind_group(device, &ubo, color_view, bump_view);
                ObjectGpu {
                    ubo,
                    bind,
                    textured: layers.is_some(),
                }
            })
            .collect();

        Self {
            meshes,
            objects,
            _textures: textures.into_iter().flatten().collect(),
            _fallback: fallback,
        }
    }

    /// Rewrites every object uniform (animations move rigged objects).
    pub fn write_uniforms(&self, queue: &wgpu::Queue, scene: &RoomScene) {
        for (i, gpu) in self.objects.iter().enumerate() {
            let mut uniform = ObjectUniformStd140::new(scene, i);
            if !gpu.textured {
                uniform.params[2] = 0.0;
            }
            queue.write_buffer(&gpu.ubo, 0, bytemuck::bytes_of(&uniform));
        }
    }

    pub fn mesh(&self, kind: MeshKind) -> &MeshGpu {
        &self.meshes[kind.index()]
    }
}

fn upload_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    image: &TextureImage,
    srgb: bool,
) -> GpuTexture {
    upload_rgba(device, queue, label, image.edge(), &image.to_rgba8(), srgb)
}

fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    edge: u32,
    rgba: &[u8],
    srgb: bool,
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width: edge,
        height: edge,
        depth_or_array_layers: 1,
    };
    let format = if srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &tex,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * edge),
            rows_per_image: Some(edge),
        },
        size,
    );
    GpuTexture {
        view: tex.create_view(&wgpu::TextureViewDescriptor::default()),
        _tex: tex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoomConfig;
    use glam::Mat4;
    use roomkit::pick::InteractionTracker;
    use roomkit::texture::SynthesisParams;

    #[test]
    fn object_uniform_flags_textured_materials() {
        let mut tracker = InteractionTracker::new(Mat4::IDENTITY);
        let scene = RoomScene::build(
            &RoomConfig::default(),
            &SynthesisParams::basketball(16),
            false,
            &mut tracker,
        )
        .unwrap();
        let ball = scene
            .objects
            .iter()
            .position(|o| o.name == "basketball")
            .unwrap();
        let u = ObjectUniformStd140::new(&scene, ball);
        assert_eq!(u.params[2], 1.0);
        assert_eq!(u.params[3], 1.0);
        assert_eq!(u.params[1], 0.25);

        let floor = ObjectUniformStd140::new(&scene, 0);
        assert_eq!(floor.params[2], 0.0);
    }
}
