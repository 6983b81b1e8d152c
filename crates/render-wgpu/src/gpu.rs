use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::collections::{HashMap, HashSet};
use wgpu::util::DeviceExt;
use wisp_assets::{AssetId, AssetStore, CubeFace, CubeTextureData, MeshData, TextureData};
use wisp_avatar::FlyCamera;
use wisp_scene::{HemisphericLight, Material, SceneGraph};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    sky_color: [f32; 4],
    ground_color: [f32; 4],
}

impl Uniforms {
    fn new(view_proj: Mat4, light: &HemisphericLight) -> Self {
        let sky = light.diffuse * light.intensity;
        let ground = light.ground_color * light.intensity;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir: light.direction.extend(0.0).to_array(),
            sky_color: sky.extend(1.0).to_array(),
            ground_color: ground.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SkyUniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, material: &Material) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: material.diffuse_color.extend(material.alpha).to_array(),
        }
    }
}

/// Interleave a mesh's attribute streams. Missing normals or uvs are zero.
fn mesh_vertices(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: mesh.normals.get(i).copied().unwrap_or_default(),
            uv: mesh.uvs.get(i).copied().unwrap_or_default(),
        })
        .collect()
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, mesh: &MeshData) -> Self {
        let vertices = mesh_vertices(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&mesh.name),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&mesh.name),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

struct MeshDraw {
    mesh: AssetId,
    texture: Option<AssetId>,
    double_sided: bool,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    double_sided_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sky_uniform_buffer: wgpu::Buffer,
    sky_uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    cube_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    default_texture: wgpu::BindGroup,
    meshes: HashMap<AssetId, GpuMesh>,
    textures: HashMap<AssetId, wgpu::BindGroup>,
    cubes: HashMap<AssetId, wgpu::BindGroup>,
    missing: HashSet<AssetId>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let light = HemisphericLight::new(Vec3::Y);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::new(Mat4::IDENTITY, &light)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sky_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky_uniform_buffer"),
            contents: bytemuck::bytes_of(&SkyUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let sky_uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky_uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: sky_uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = sampled_texture_layout(device, wgpu::TextureViewDimension::D2);
        let cube_layout = sampled_texture_layout(device, wgpu::TextureViewDimension::Cube);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let sky_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &cube_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let mesh_pipeline = mesh_pipeline(
            device,
            &mesh_layout,
            &mesh_shader,
            surface_format,
            Some(wgpu::Face::Back),
            "mesh_pipeline",
        );
        let double_sided_pipeline = self::mesh_pipeline(
            device,
            &mesh_layout,
            &mesh_shader,
            surface_format,
            None,
            "double_sided_pipeline",
        );

        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sky_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SKY_SHADER.into()),
        });
        let sky_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sky_pipeline"),
            layout: Some(&sky_layout),
            vertex: wgpu::VertexState {
                module: &sky_shader,
                entry_point: Some("vs_sky"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &sky_shader,
                entry_point: Some("fs_sky"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // Sky sits behind everything: never tested, never written.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let max_instances = 4_096u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let white = TextureData::solid("white", [255, 255, 255, 255]);
        let default_texture = upload_texture(device, queue, &texture_layout, &sampler, &white);
        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::info!(?surface_format, width, height, "renderer ready");

        Self {
            mesh_pipeline,
            double_sided_pipeline,
            sky_pipeline,
            uniform_buffer,
            uniform_bind_group,
            sky_uniform_buffer,
            sky_uniform_bind_group,
            texture_layout,
            cube_layout,
            sampler,
            default_texture,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            cubes: HashMap::new(),
            missing: HashSet::new(),
            instance_buffer,
            max_instances,
            depth_texture,
            surface_format,
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.1,
                a: 1.0,
            },
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn set_clear_color(&mut self, rgb: [f64; 3]) {
        self.clear_color = wgpu::Color {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a: 1.0,
        };
    }

    /// Number of meshes and textures resident on the GPU.
    pub fn resident_assets(&self) -> usize {
        self.meshes.len() + self.textures.len() + self.cubes.len()
    }

    /// Render one frame: skybox materials, then every other mesh node.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &FlyCamera,
        scene: &SceneGraph,
        assets: &AssetStore,
    ) {
        self.upload(device, queue, scene, assets);

        let light = scene
            .lights()
            .next()
            .copied()
            .unwrap_or_else(|| HemisphericLight::new(Vec3::Y));
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(camera.view_projection(), &light)),
        );
        queue.write_buffer(
            &self.sky_uniform_buffer,
            0,
            bytemuck::bytes_of(&SkyUniforms {
                view_proj: camera.sky_view_projection().to_cols_array_2d(),
            }),
        );

        let mut sky_draws: Vec<(AssetId, AssetId)> = Vec::new();
        let mut draws: Vec<MeshDraw> = Vec::new();
        let mut instances: Vec<InstanceData> = Vec::new();
        for (_, model, mesh, material) in scene.mesh_instances() {
            if !self.meshes.contains_key(&mesh) {
                continue;
            }
            if let Some(cube) = material.skybox_texture {
                sky_draws.push((mesh, cube));
                continue;
            }
            if instances.len() >= self.max_instances as usize {
                break;
            }
            instances.push(InstanceData::new(model, material));
            draws.push(MeshDraw {
                mesh,
                texture: material.diffuse_texture,
                double_sided: !material.back_face_culling,
            });
        }

        if !instances.is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances),
            );
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
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

            pass.set_pipeline(&self.sky_pipeline);
            pass.set_bind_group(0, &self.sky_uniform_bind_group, &[]);
            for (mesh_id, cube) in &sky_draws {
                let (Some(mesh), Some(texture)) = (self.meshes.get(mesh_id), self.cubes.get(cube))
                else {
                    continue;
                };
                pass.set_bind_group(1, texture, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if !instances.is_empty() {
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for (i, draw) in draws.iter().enumerate() {
                    let Some(mesh) = self.meshes.get(&draw.mesh) else {
                        continue;
                    };
                    let texture = draw
                        .texture
                        .and_then(|id| self.textures.get(&id))
                        .unwrap_or(&self.default_texture);
                    pass.set_pipeline(if draw.double_sided {
                        &self.double_sided_pipeline
                    } else {
                        &self.mesh_pipeline
                    });
                    pass.set_bind_group(1, texture, &[]);
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    let instance = i as u32;
                    pass.draw_indexed(0..mesh.index_count, 0, instance..instance + 1);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Upload meshes and textures referenced by the scene that are not yet
    /// resident. Ids absent from the store are logged once.
    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneGraph,
        assets: &AssetStore,
    ) {
        for (_, _, mesh_id, material) in scene.mesh_instances() {
            if !self.meshes.contains_key(&mesh_id) {
                match assets.get_mesh(mesh_id) {
                    Some(mesh) => {
                        tracing::debug!(mesh = %mesh.name, vertices = mesh.vertex_count(), "upload mesh");
                        self.meshes.insert(mesh_id, GpuMesh::new(device, mesh));
                    }
                    None => self.report_missing(mesh_id),
                }
            }
            if let Some(id) = material.diffuse_texture {
                if !self.textures.contains_key(&id) {
                    match assets.get_texture(id) {
                        Some(texture) => {
                            let bind_group = upload_texture(
                                device,
                                queue,
                                &self.texture_layout,
                                &self.sampler,
                                texture,
                            );
                            self.textures.insert(id, bind_group);
                        }
                        None => self.report_missing(id),
                    }
                }
            }
            if let Some(id) = material.skybox_texture {
                if !self.cubes.contains_key(&id) {
                    match assets.get_cube_texture(id) {
                        Some(cube) => {
                            let bind_group =
                                upload_cube(device, queue, &self.cube_layout, &self.sampler, cube);
                            self.cubes.insert(id, bind_group);
                        }
                        None => self.report_missing(id),
                    }
                }
            }
        }
    }

    fn report_missing(&mut self, id: AssetId) {
        if self.missing.insert(id) {
            tracing::warn!(asset = ?id, "scene references an asset that is not in the store");
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
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn mesh_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    cull_mode: Option<wgpu::Face>,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                    ],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4,
                        6 => Float32x4,
                        7 => Float32x4,
                    ],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn sampled_texture_layout(
    device: &wgpu::Device,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("texture_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    view: &wgpu::TextureView,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    data: &TextureData,
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&data.name),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
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
        &data.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * data.width),
            rows_per_image: Some(data.height),
        },
        size,
    );
    let view = texture.create_view(&Default::default());
    texture_bind_group(device, layout, sampler, &view, &data.name)
}

fn upload_cube(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    cube: &CubeTextureData,
) -> wgpu::BindGroup {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&cube.name),
        size: wgpu::Extent3d {
            width: cube.size,
            height: cube.size,
            depth_or_array_layers: 6,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    for face in CubeFace::ALL {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: face.gpu_layer(),
                },
                aspect: wgpu::TextureAspect::All,
            },
            cube.face(face),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * cube.size),
                rows_per_image: Some(cube.size),
            },
            wgpu::Extent3d {
                width: cube.size,
                height: cube.size,
                depth_or_array_layers: 1,
            },
        );
    }
    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(&cube.name),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });
    texture_bind_group(device, layout, sampler, &view, &cube.name)
}
