use crate::shaders;
use bytemuck::{Pod, Zeroable};
use fishbowl_render::{RenderView, Renderer, SceneGraph, SceneItem};
use glam::Mat4;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct WireVertex {
    position: [f32; 3],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
}

impl InstanceData {
    fn from_transform(transform: Mat4) -> Self {
        let cols = transform.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
        }
    }
}

/// Coloured vertices for an item, in the order of its positions.
fn wire_vertices(item: &SceneItem<'_>) -> Vec<WireVertex> {
    item.positions
        .iter()
        .map(|p| WireVertex {
            position: p.to_array(),
            color: item.shading.color_at(*p),
        })
        .collect()
}

fn edge_indices(item: &SceneItem<'_>) -> Vec<u32> {
    item.edges.iter().flatten().copied().collect()
}

/// GPU buffers for one scene item.
struct GpuItem {
    vertex_buffer: wgpu::Buffer,
    vertex_count: usize,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
}

impl GpuItem {
    fn new(device: &wgpu::Device, item: &SceneItem<'_>) -> Self {
        let vertices = wire_vertices(item);
        let indices = edge_indices(item);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(item.name),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(item.name),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(item.name),
            contents: bytemuck::bytes_of(&InstanceData::from_transform(item.transform)),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            vertex_buffer,
            vertex_count: vertices.len(),
            index_buffer,
            index_count: indices.len() as u32,
            instance_buffer,
        }
    }
}

/// wgpu-based wireframe renderer.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    items: Vec<GpuItem>,
    generation: Option<u64>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("wireframe_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::WIREFRAME_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("wireframe_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_wire"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<WireVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x4,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_wire"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            items: Vec::new(),
            generation: None,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame of `graph` into `target`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        graph: &SceneGraph<'_>,
        view: &RenderView,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: view.view_projection().to_cols_array_2d(),
            }),
        );
        self.sync(device, queue, graph);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            for item in self.items.iter().filter(|item| item.index_count > 0) {
                pass.set_vertex_buffer(0, item.vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, item.instance_buffer.slice(..));
                pass.set_index_buffer(item.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..item.index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Bring GPU buffers in line with `graph`: rebuild on a new generation,
    /// otherwise re-upload only what changed.
    fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, graph: &SceneGraph<'_>) {
        if self.generation != Some(graph.generation) || self.items.len() != graph.items.len() {
            tracing::debug!(
                generation = graph.generation,
                items = graph.items.len(),
                vertices = graph.vertex_count(),
                "rebuilding gpu buffers"
            );
            self.items = graph.items.iter().map(|item| GpuItem::new(device, item)).collect();
            self.generation = Some(graph.generation);
            return;
        }

        for (gpu, item) in self.items.iter_mut().zip(&graph.items) {
            if item.needs_upload {
                if item.positions.len() == gpu.vertex_count {
                    queue.write_buffer(
                        &gpu.vertex_buffer,
                        0,
                        bytemuck::cast_slice(&wire_vertices(item)),
                    );
                } else {
                    tracing::warn!(item = item.name, "vertex count changed, recreating buffers");
                    *gpu = GpuItem::new(device, item);
                    continue;
                }
            }
            queue.write_buffer(
                &gpu.instance_buffer,
                0,
                bytemuck::bytes_of(&InstanceData::from_transform(item.transform)),
            );
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// Binds a [`WgpuRenderer`] to the device and surface texture of one frame so
/// it can be driven through the [`Renderer`] trait.
pub struct WgpuFrame<'a> {
    pub renderer: &'a mut WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target: &'a wgpu::TextureView,
}

impl Renderer for WgpuFrame<'_> {
    type Output = ();

    fn render(&mut self, graph: &SceneGraph<'_>, view: &RenderView) {
        self.renderer
            .render(self.device, self.queue, self.target, graph, view);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.renderer.resize(self.device, width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishbowl_render::Shading;
    use glam::Vec3;

    #[test]
    fn vertices_carry_shading() {
        let positions = [Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0)];
        let item = SceneItem {
            name: "sphere",
            positions: &positions,
            edges: &[[0, 1]],
            transform: Mat4::IDENTITY,
            shading: Shading::Gradient { extent: 3.0 },
            needs_upload: true,
        };
        let vertices = wire_vertices(&item);
        assert_eq!(vertices[0].color, Shading::MAGENTA);
        assert_eq!(vertices[1].color, Shading::CYAN);
        assert_eq!(vertices[1].position, [3.0, 0.0, 0.0]);
    }

    #[test]
    fn edges_flatten_into_line_list() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let item = SceneItem {
            name: "tri",
            positions: &positions,
            edges: &[[0, 1], [1, 2], [0, 2]],
            transform: Mat4::IDENTITY,
            shading: Shading::Solid(Shading::WHITE),
            needs_upload: false,
        };
        assert_eq!(edge_indices(&item), vec![0, 1, 1, 2, 0, 2]);
    }

    #[test]
    fn instance_holds_model_columns() {
        let transform = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let instance = InstanceData::from_transform(transform);
        assert_eq!(instance.model_3, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(std::mem::size_of::<InstanceData>(), 64);
    }
}
