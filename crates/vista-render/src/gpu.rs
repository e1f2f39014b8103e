//! `wgpu` implementation of [`RenderDevice`].
//!
//! The device is created without a surface: every pass renders into an
//! offscreen [`RenderTarget`] (`Rgba8Unorm` colour, `Depth32Float` depth,
//! reverse-Z). Presenting a target is left to the window owner.

use std::num::NonZeroU64;

use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::camera::{Camera, CameraUniform};
use crate::device::{RenderDevice, ResourceStats};
use crate::error::RenderError;
use crate::frustum::Aabb;
use crate::geometry::{AttributeKind, Geometry};
use crate::handle::{
    GeometryHandle, IdAllocator, ProgramHandle, RenderTargetHandle, TextureHandle,
};
use crate::program::ProgramDescriptor;
use crate::scene::{Mesh, Scene};
use crate::target::{RenderTarget, RenderTargetDescriptor};
use crate::texture::{DataTextureDescriptor, TEXEL_COMPONENTS, TextureFilter, TextureWrap};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const DATA_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
const MODEL_MATRIX_SIZE: u64 = 64;
const INITIAL_OBJECT_CAPACITY: u64 = 64;

struct GpuGeometry {
    attributes: FxHashMap<AttributeKind, wgpu::Buffer>,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    bounds: Aabb,
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    owner: Option<RenderTargetHandle>,
}

struct GpuTarget {
    label: &'static str,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,
    texture: TextureHandle,
    depth_view: wgpu::TextureView,
}

struct GpuProgram {
    desc: ProgramDescriptor,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    textures: Vec<Option<TextureHandle>>,
}

/// Per-object model matrices addressed with dynamic offsets.
struct ObjectBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u64,
}

pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    float_filterable: bool,
    wireframe_supported: bool,

    ids: IdAllocator,
    geometries: FxHashMap<GeometryHandle, GpuGeometry>,
    textures: FxHashMap<TextureHandle, GpuTexture>,
    targets: FxHashMap<RenderTargetHandle, GpuTarget>,
    programs: FxHashMap<ProgramHandle, GpuProgram>,
    stats: ResourceStats,

    camera_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_stride: u64,
    objects: ObjectBuffer,
    mesh_texture_layout: wgpu::BindGroupLayout,
    fallback: GpuTexture,
}

impl WgpuDevice {
    /// Request a headless adapter and device, blocking on the futures.
    pub fn new() -> Result<Self, RenderError> {
        pollster::block_on(Self::new_async())
    }

    pub async fn new_async() -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let optional = wgpu::Features::FLOAT32_FILTERABLE | wgpu::Features::POLYGON_MODE_LINE;
        let required_features = adapter.features() & optional;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("vista-device"),
                required_features,
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self::from_device(device, queue, required_features))
    }

    fn from_device(device: wgpu::Device, queue: wgpu::Queue, features: wgpu::Features) -> Self {
        let float_filterable = features.contains(wgpu::Features::FLOAT32_FILTERABLE);
        let wireframe_supported = features.contains(wgpu::Features::POLYGON_MODE_LINE);
        if !float_filterable {
            log::warn!("Adapter lacks FLOAT32_FILTERABLE; data textures use nearest sampling");
        }

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera-bind-group-layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                false,
                std::mem::size_of::<CameraUniform>() as u64,
            )],
        });
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera-uniform-buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera-bind-group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object-bind-group-layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX,
                true,
                MODEL_MATRIX_SIZE,
            )],
        });
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let object_stride = MODEL_MATRIX_SIZE.div_ceil(alignment) * alignment;
        let objects = create_object_buffer(
            &device,
            &object_layout,
            object_stride,
            INITIAL_OBJECT_CAPACITY,
        );

        let mesh_texture_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("mesh-texture-bind-group-layout"),
                entries: &texture_entries(0, float_filterable),
            });

        let fallback = create_data_texture(
            &device,
            &queue,
            &DataTextureDescriptor::new("fallback-texture", 1, 1, vec![1.0; 4].into()),
            float_filterable,
        );

        Self {
            device,
            queue,
            float_filterable,
            wireframe_supported,
            ids: IdAllocator::default(),
            geometries: FxHashMap::default(),
            textures: FxHashMap::default(),
            targets: FxHashMap::default(),
            programs: FxHashMap::default(),
            stats: ResourceStats::default(),
            camera_layout,
            camera_buffer,
            camera_bind_group,
            object_layout,
            object_stride,
            objects,
            mesh_texture_layout,
            fallback,
        }
    }

    /// Whether `Rgba32Float` data textures are sampled with linear filtering.
    pub fn float_filterable(&self) -> bool {
        self.float_filterable
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Colour texture behind a handle, e.g. for presenting a frame target.
    pub fn texture(&self, handle: TextureHandle) -> Option<&wgpu::Texture> {
        self.textures.get(&handle).map(|t| &t.texture)
    }

    fn ensure_object_capacity(&mut self, count: u64) {
        if count <= self.objects.capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        log::debug!("Growing object buffer to {capacity} entries");
        self.objects =
            create_object_buffer(&self.device, &self.object_layout, self.object_stride, capacity);
    }

    fn texture_or_fallback(&self, handle: Option<TextureHandle>) -> &GpuTexture {
        match handle.and_then(|h| self.textures.get(&h)) {
            Some(texture) => texture,
            None => &self.fallback,
        }
    }

    fn program_bind_group(&self, program: &GpuProgram) -> wgpu::BindGroup {
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: program.uniform_buffer.as_entire_binding(),
        }];
        for (slot, handle) in program.textures.iter().enumerate() {
            let texture = self.texture_or_fallback(*handle);
            let binding = 1 + 2 * slot as u32;
            entries.push(wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: binding + 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            });
        }
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(program.desc.label),
            layout: &program.layout,
            entries: &entries,
        })
    }

    fn mesh_texture_bind_group(&self, handle: Option<TextureHandle>) -> wgpu::BindGroup {
        let texture = self.texture_or_fallback(handle);
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh-texture-bind-group"),
            layout: &self.mesh_texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    /// A draw is possible when its program exists and its geometry carries
    /// every attribute the program consumes.
    fn drawable(&self, mesh: &Mesh) -> bool {
        let (Some(program), Some(geometry)) = (
            self.programs.get(&mesh.program),
            self.geometries.get(&mesh.geometry),
        ) else {
            log::warn!("Skipping draw with unknown program {}", mesh.program);
            return false;
        };
        let complete = program
            .desc
            .attributes
            .iter()
            .all(|kind| geometry.attributes.contains_key(kind));
        if !complete {
            log::warn!(
                "Geometry {} lacks attributes required by program '{}'",
                mesh.geometry,
                program.desc.label
            );
        }
        complete
    }
}

impl RenderDevice for WgpuDevice {
    fn create_geometry(&mut self, geometry: &Geometry) -> GeometryHandle {
        let mut attributes = FxHashMap::default();
        for kind in [AttributeKind::Position, AttributeKind::Normal, AttributeKind::Uv] {
            if let Some(data) = geometry.attribute(kind) {
                let buffer = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("geometry-attribute-buffer"),
                        contents: bytemuck::cast_slice(data),
                        usage: wgpu::BufferUsages::VERTEX,
                    });
                attributes.insert(kind, buffer);
            }
        }
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("geometry-index-buffer"),
                contents: bytemuck::cast_slice(geometry.indices()),
                usage: wgpu::BufferUsages::INDEX,
            });

        let handle = GeometryHandle(self.ids.next());
        self.geometries.insert(
            handle,
            GpuGeometry {
                attributes,
                index_buffer,
                index_count: geometry.index_count() as u32,
                bounds: geometry.bounds(),
            },
        );
        self.stats.geometries_created += 1;
        handle
    }

    fn dispose_geometry(&mut self, handle: GeometryHandle) {
        if self.geometries.remove(&handle).is_some() {
            self.stats.geometries_disposed += 1;
        } else {
            log::warn!("Dispose of unknown geometry {handle}");
            self.stats.invalid_disposals += 1;
        }
    }

    fn create_data_texture(
        &mut self,
        desc: &DataTextureDescriptor,
    ) -> Result<TextureHandle, RenderError> {
        desc.validate()?;
        let texture = create_data_texture(&self.device, &self.queue, desc, self.float_filterable);
        let handle = TextureHandle(self.ids.next());
        self.textures.insert(handle, texture);
        self.stats.textures_created += 1;
        log::debug!(
            "Created data texture '{}' ({}x{})",
            desc.label,
            desc.width,
            desc.height
        );
        Ok(handle)
    }

    fn dispose_texture(&mut self, handle: TextureHandle) {
        match self.textures.get(&handle).map(|t| t.owner) {
            Some(Some(target)) => {
                log::warn!("Texture {handle} belongs to {target} and cannot be disposed alone");
                self.stats.invalid_disposals += 1;
            }
            Some(None) => {
                self.textures.remove(&handle);
                self.stats.textures_disposed += 1;
            }
            None => {
                log::warn!("Dispose of unknown texture {handle}");
                self.stats.invalid_disposals += 1;
            }
        }
    }

    fn create_render_target(&mut self, desc: &RenderTargetDescriptor) -> RenderTarget {
        let (width, height) = (desc.width.max(1), desc.height.max(1));
        let handle = RenderTargetHandle(self.ids.next());
        let texture_handle = TextureHandle(self.ids.next());

        let (texture, view) =
            create_attachment(&self.device, desc.label, COLOR_FORMAT, width, height);
        let (_, depth_view) =
            create_attachment(&self.device, desc.label, DEPTH_FORMAT, width, height);
        let sampler = create_sampler(
            &self.device,
            TextureFilter::Linear,
            TextureWrap::ClampToEdge,
            self.float_filterable,
        );

        self.textures.insert(
            texture_handle,
            GpuTexture {
                texture,
                view,
                sampler,
                owner: Some(handle),
            },
        );
        let [r, g, b, a] = desc.clear_color;
        self.targets.insert(
            handle,
            GpuTarget {
                label: desc.label,
                width,
                height,
                clear_color: wgpu::Color { r, g, b, a },
                texture: texture_handle,
                depth_view,
            },
        );
        self.stats.targets_created += 1;
        log::debug!("Created render target '{}' ({width}x{height})", desc.label);
        RenderTarget {
            handle,
            texture: texture_handle,
        }
    }

    fn resize_render_target(&mut self, target: RenderTargetHandle, width: u32, height: u32) {
        let Some(record) = self.targets.get_mut(&target) else {
            log::warn!("Resize of unknown render target {target}");
            return;
        };
        if width == 0 || height == 0 {
            log::debug!(
                "Keeping {}x{} attachments of '{}' for zero-area resize",
                record.width,
                record.height,
                record.label
            );
            return;
        }
        if (record.width, record.height) == (width, height) {
            return;
        }

        let (texture, view) =
            create_attachment(&self.device, record.label, COLOR_FORMAT, width, height);
        let (_, depth_view) =
            create_attachment(&self.device, record.label, DEPTH_FORMAT, width, height);
        record.width = width;
        record.height = height;
        record.depth_view = depth_view;
        if let Some(color) = self.textures.get_mut(&record.texture) {
            color.texture = texture;
            color.view = view;
        }
    }

    fn render_target_size(&self, target: RenderTargetHandle) -> Option<(u32, u32)> {
        self.targets.get(&target).map(|t| (t.width, t.height))
    }

    fn create_program(&mut self, desc: &ProgramDescriptor) -> Result<ProgramHandle, RenderError> {
        desc.validate()?;

        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(desc.label),
                source: wgpu::ShaderSource::Wgsl(desc.source.into()),
            });

        let mut entries = vec![uniform_entry(
            0,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            false,
            desc.uniform_size,
        )];
        for slot in 0..desc.texture_slots {
            entries.extend(texture_entries(1 + 2 * slot, self.float_filterable));
        }
        let layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(desc.label),
                entries: &entries,
            });

        let mut bind_group_layouts = vec![&self.camera_layout, &layout, &self.object_layout];
        if desc.mesh_texture {
            bind_group_layouts.push(&self.mesh_texture_layout);
        }
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(desc.label),
                bind_group_layouts: &bind_group_layouts,
                immediate_size: 0,
            });

        let vertex_attributes: Vec<[wgpu::VertexAttribute; 1]> = desc
            .attributes
            .iter()
            .map(|kind| {
                [wgpu::VertexAttribute {
                    format: kind.vertex_format(),
                    offset: 0,
                    shader_location: kind.shader_location(),
                }]
            })
            .collect();
        let vertex_buffers: Vec<wgpu::VertexBufferLayout> = desc
            .attributes
            .iter()
            .zip(&vertex_attributes)
            .map(|(kind, attributes)| wgpu::VertexBufferLayout {
                array_stride: (kind.components() * std::mem::size_of::<f32>()) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            })
            .collect();

        let polygon_mode = if desc.wireframe && self.wireframe_supported {
            wgpu::PolygonMode::Line
        } else {
            if desc.wireframe {
                log::warn!(
                    "Wireframe requested for '{}' but POLYGON_MODE_LINE is unavailable",
                    desc.label
                );
            }
            wgpu::PolygonMode::Fill
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: desc.side.cull_mode(),
                    unclipped_depth: false,
                    polygon_mode,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: desc.depth_write,
                    depth_compare: if desc.depth_test {
                        wgpu::CompareFunction::GreaterEqual // reverse-Z
                    } else {
                        wgpu::CompareFunction::Always
                    },
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: COLOR_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            });

        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(desc.label),
            size: desc.uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let handle = ProgramHandle(self.ids.next());
        self.programs.insert(
            handle,
            GpuProgram {
                desc: desc.clone(),
                pipeline,
                layout,
                uniform_buffer,
                textures: vec![None; desc.texture_slots as usize],
            },
        );
        self.stats.programs_created += 1;
        log::info!("Created program '{}'", desc.label);
        Ok(handle)
    }

    fn write_program_uniforms(&mut self, program: ProgramHandle, bytes: &[u8]) {
        let Some(record) = self.programs.get(&program) else {
            log::warn!("Uniform write to unknown program {program}");
            return;
        };
        // Buffer writes must be a multiple of 4 bytes.
        let len = (bytes.len().min(record.desc.uniform_size as usize)) & !3;
        if len > 0 {
            self.queue
                .write_buffer(&record.uniform_buffer, 0, &bytes[..len]);
        }
    }

    fn set_program_texture(&mut self, program: ProgramHandle, slot: u32, texture: TextureHandle) {
        let Some(record) = self.programs.get_mut(&program) else {
            log::warn!("Texture bind on unknown program {program}");
            return;
        };
        match record.textures.get_mut(slot as usize) {
            Some(entry) => *entry = Some(texture),
            None => log::warn!(
                "Program '{}' has no texture slot {slot}",
                record.desc.label
            ),
        }
    }

    fn render(&mut self, scene: &Scene, camera: &Camera, target: RenderTargetHandle) {
        if !self.targets.contains_key(&target) {
            log::warn!("Render into unknown target {target}");
            return;
        }

        let geometries = &self.geometries;
        let draws: Vec<_> = scene
            .visible_draws(camera, |handle| geometries.get(&handle).map(|g| g.bounds))
            .into_iter()
            .filter(|(_, mesh)| self.drawable(mesh))
            .collect();
        self.ensure_object_capacity(draws.len() as u64);

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera.to_uniform()),
        );
        let stride = self.object_stride as usize;
        let mut models = vec![0u8; draws.len() * stride];
        for (i, (_, mesh)) in draws.iter().enumerate() {
            let matrix = mesh.transform.matrix().to_cols_array();
            models[i * stride..i * stride + MODEL_MATRIX_SIZE as usize]
                .copy_from_slice(bytemuck::cast_slice(&matrix));
        }
        if !models.is_empty() {
            self.queue.write_buffer(&self.objects.buffer, 0, &models);
        }

        let mut program_groups: FxHashMap<ProgramHandle, wgpu::BindGroup> = FxHashMap::default();
        let mut mesh_groups = Vec::with_capacity(draws.len());
        for (_, mesh) in &draws {
            if let Some(program) = self.programs.get(&mesh.program) {
                program_groups
                    .entry(mesh.program)
                    .or_insert_with(|| self.program_bind_group(program));
                mesh_groups.push(
                    program
                        .desc
                        .mesh_texture
                        .then(|| self.mesh_texture_bind_group(mesh.texture)),
                );
            }
        }

        let Some(record) = self.targets.get(&target) else {
            return;
        };
        let color_view = &self.texture_or_fallback(Some(record.texture)).view;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(record.label),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(record.label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(record.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &record.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0.0), // reverse-Z: far = 0
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for (i, ((_, mesh), mesh_group)) in draws.iter().zip(&mesh_groups).enumerate() {
                let (Some(program), Some(geometry), Some(program_group)) = (
                    self.programs.get(&mesh.program),
                    self.geometries.get(&mesh.geometry),
                    program_groups.get(&mesh.program),
                ) else {
                    continue;
                };

                pass.set_pipeline(&program.pipeline);
                pass.set_bind_group(1, program_group, &[]);
                pass.set_bind_group(
                    2,
                    &self.objects.bind_group,
                    &[(i as u64 * self.object_stride) as u32],
                );
                if let Some(group) = mesh_group {
                    pass.set_bind_group(3, group, &[]);
                }
                for (slot, kind) in program.desc.attributes.iter().enumerate() {
                    if let Some(buffer) = geometry.attributes.get(kind) {
                        pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                    }
                }
                pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..geometry.index_count, 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        self.stats.passes_rendered += 1;
    }

    fn stats(&self) -> ResourceStats {
        self.stats
    }
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    has_dynamic_offset: bool,
    size: u64,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size: NonZeroU64::new(size),
        },
        count: None,
    }
}

fn texture_entries(binding: u32, filterable: bool) -> [wgpu::BindGroupLayoutEntry; 2] {
    let sampler = if filterable {
        wgpu::SamplerBindingType::Filtering
    } else {
        wgpu::SamplerBindingType::NonFiltering
    };
    [
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: binding + 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(sampler),
            count: None,
        },
    ]
}

fn create_object_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: u64,
) -> ObjectBuffer {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("object-uniform-buffer"),
        size: stride * capacity,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("object-bind-group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(MODEL_MATRIX_SIZE),
            }),
        }],
    });
    ObjectBuffer {
        buffer,
        bind_group,
        capacity,
    }
}

/// Samplers for `Rgba32Float` must not filter unless the adapter allows it.
fn create_sampler(
    device: &wgpu::Device,
    filter: TextureFilter,
    wrap: TextureWrap,
    float_filterable: bool,
) -> wgpu::Sampler {
    let filter = match filter {
        TextureFilter::Linear if float_filterable => wgpu::FilterMode::Linear,
        _ => wgpu::FilterMode::Nearest,
    };
    let address_mode = match wrap {
        TextureWrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        TextureWrap::Repeat => wgpu::AddressMode::Repeat,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("vista-sampler"),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

fn create_data_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    desc: &DataTextureDescriptor,
    float_filterable: bool,
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width: desc.width,
        height: desc.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(desc.label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DATA_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &desc.upload_bytes(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(
                desc.width * (TEXEL_COMPONENTS * std::mem::size_of::<f32>()) as u32,
            ),
            rows_per_image: None,
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = create_sampler(device, desc.filter, desc.wrap, float_filterable);
    GpuTexture {
        texture,
        view,
        sampler,
        owner: None,
    }
}

fn create_attachment(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
    if format == COLOR_FORMAT {
        usage |= wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_SRC;
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
