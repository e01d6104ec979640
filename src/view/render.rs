use wgpu::*;
use wgpu::util::DeviceExt;

use crate::controller::{Frame, FrameRenderer};
use crate::error::{Result, SandboxError};
use crate::model::{BlockKind, Scene, SceneObject};
use crate::utils::{create_cube_mesh, InstanceRaw, MeshBuffer, Vertex};
use crate::view::gpu_init::GpuContext;
use crate::view::texture::{BlockTextures, TextureLoader};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

// three.js renderer default
const CLEAR_COLOR: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

pub struct CameraResources {
    pub camera_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
}

/// Instances of one block kind, ready to draw
struct InstanceBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_camera_resources(device: &wgpu::Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() }],
    });

    CameraResources { camera_buffer, bind_group_layout, camera_bind_group }
}

pub fn create_block_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("block_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/block.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("block_pipeline_layout"),
        bind_group_layouts: &[camera_layout, texture_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("block_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
                        wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x2 },
                    ],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[
                        wgpu::VertexAttribute { offset: 0, shader_location: 2, format: wgpu::VertexFormat::Float32x3 },
                        wgpu::VertexAttribute { offset: 12, shader_location: 3, format: wgpu::VertexFormat::Float32 },
                    ],
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format, blend: Some(wgpu::BlendState::REPLACE), write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// Instance data per block kind, indexed by `BlockKind::index`, each in
/// scene order
fn group_instances(objects: &[SceneObject]) -> Vec<Vec<InstanceRaw>> {
    let mut groups = vec![Vec::new(); BlockKind::COUNT];
    for object in objects {
        groups[object.kind.index()].push(InstanceRaw {
            offset: object.translation.to_array(),
            scale: object.size,
        });
    }
    groups
}

///////////////////////////////////////////////////////////////////////////////

/// Everything needed to put a frame on screen
pub struct RenderState {
    gpu: GpuContext,
    depth_view: TextureView,
    camera: CameraResources,
    pipeline: RenderPipeline,
    cube: MeshBuffer,
    textures: BlockTextures,
    loader: TextureLoader,

    // one slot per block kind, rebuilt when the scene revision changes
    instances: Vec<Option<InstanceBuffer>>,
    scene_revision: Option<u64>,

    egui_renderer: egui_wgpu::Renderer,
}

impl RenderState {
    /// Build all GPU resources and start loading block textures from
    /// `texture_source`. Blocks show flat placeholder colours until their
    /// texture arrives.
    pub fn new(gpu: GpuContext, texture_source: &str) -> Self {
        let device = &gpu.device;
        let (_, depth_view) = create_depth_texture(device, gpu.config.width, gpu.config.height);
        let camera = create_camera_resources(device);
        let textures = BlockTextures::new(device, &gpu.queue);
        let pipeline = create_block_pipeline(device, gpu.format, &camera.bind_group_layout, &textures.bind_group_layout);
        let cube = create_cube_mesh().upload(device);
        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        let loader = TextureLoader::new();
        loader.load_all(texture_source);

        Self {
            gpu,
            depth_view,
            camera,
            pipeline,
            cube,
            textures,
            loader,
            instances: Vec::new(),
            scene_revision: None,
            egui_renderer,
        }
    }

    fn poll_textures(&mut self) {
        for loaded in self.loader.poll() {
            self.textures.apply(&self.gpu.device, &self.gpu.queue, loaded);
        }
    }

    fn sync_instances(&mut self, scene: &Scene) {
        if self.scene_revision == Some(scene.revision()) {
            return;
        }

        let device = &self.gpu.device;
        self.instances = group_instances(scene.objects())
            .into_iter()
            .zip(BlockKind::ALL)
            .map(|(data, kind)| {
                if data.is_empty() {
                    return None;
                }
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(kind.name()),
                    contents: bytemuck::cast_slice(&data),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                Some(InstanceBuffer { buffer, count: data.len() as u32 })
            })
            .collect();

        self.scene_revision = Some(scene.revision());
        tracing::debug!("rebuilt instance buffers for {} scene objects", scene.len());
    }

    /// Next swapchain image. A lost or outdated surface is reconfigured
    /// once; a timeout yields `None` and the frame is skipped.
    fn acquire_frame(&self) -> Result<Option<SurfaceTexture>> {
        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::warn!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                Ok(Some(self.gpu.surface.get_current_texture()?))
            }
            Err(SurfaceError::Timeout) => {
                tracing::warn!("timed out acquiring frame, skipping");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl FrameRenderer for RenderState {
    type Error = SandboxError;

    fn size(&self) -> (u32, u32) {
        (self.gpu.config.width, self.gpu.config.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        let (_, depth_view) = create_depth_texture(&self.gpu.device, width, height);
        self.depth_view = depth_view;
    }

    fn render(&mut self, frame: Frame<'_>) -> Result<()> {
        self.poll_textures();
        self.sync_instances(frame.scene);

        let uniform = CameraUniform { view_proj: frame.camera.view_proj().to_cols_array_2d() };
        self.gpu.queue.write_buffer(&self.camera.camera_buffer, 0, bytemuck::bytes_of(&uniform));

        let Some(output) = self.acquire_frame()? else {
            return Ok(());
        };

        let device = &self.gpu.device;
        let queue = &self.gpu.queue;
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: frame.pixels_per_point,
        };

        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor { label: Some("encoder") });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("block_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Clear(CLEAR_COLOR), store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations { load: LoadOp::Clear(1.0), store: StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.camera.camera_bind_group, &[]);
            rp.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
            rp.set_index_buffer(self.cube.index_buffer.slice(..), IndexFormat::Uint32);

            for (kind, instances) in BlockKind::ALL.iter().zip(&self.instances) {
                let Some(instances) = instances else { continue };
                rp.set_bind_group(1, self.textures.bind_group(*kind), &[]);
                rp.set_vertex_buffer(1, instances.buffer.slice(..));
                rp.draw_indexed(0..self.cube.index_count, 0, 0..instances.count);
            }
        }

        for (id, image_delta) in &frame.ui_textures.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, &frame.ui_primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Load, store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &frame.ui_primitives, &screen_descriptor);
        }

        for id in &frame.ui_textures.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn object(kind: BlockKind, x: f32) -> SceneObject {
        SceneObject { kind, translation: Vec3::new(x, 0.0, -x), size: 1.0 }
    }

    #[test]
    fn test_group_instances_by_kind() {
        let objects = [
            object(BlockKind::Wood, 0.0),
            object(BlockKind::Grass, 1.0),
            object(BlockKind::Wood, 2.0),
        ];
        let groups = group_instances(&objects);

        assert_eq!(groups.len(), BlockKind::COUNT);
        assert_eq!(
            groups[BlockKind::Wood.index()],
            vec![
                InstanceRaw { offset: [0.0, 0.0, 0.0], scale: 1.0 },
                InstanceRaw { offset: [2.0, 0.0, -2.0], scale: 1.0 },
            ]
        );
        assert_eq!(groups[BlockKind::Grass.index()].len(), 1);
        assert!(groups[BlockKind::Ore.index()].is_empty());
    }

    #[test]
    fn test_group_instances_covers_generated_terrain() {
        let mut scene = Scene::new();
        crate::model::TerrainGenerator::with_seed(1.0, 3).generate(3, &mut scene);

        let groups = group_instances(scene.objects());
        assert_eq!(groups.iter().map(Vec::len).sum::<usize>(), scene.len());
    }
}
