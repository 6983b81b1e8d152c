/// Textured meshes lit by a single hemispheric light.
pub const MESH_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light_dir: vec4<f32>,
    sky_color: vec4<f32>,
    ground_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var diffuse_texture: texture_2d<f32>;
@group(1) @binding(1)
var diffuse_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.uv = vertex.uv;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(diffuse_texture, diffuse_sampler, in.uv);
    let t = dot(normalize(in.world_normal), uniforms.light_dir.xyz) * 0.5 + 0.5;
    let light = mix(uniforms.ground_color.rgb, uniforms.sky_color.rgb, t);
    let base = in.color * texel;
    return vec4<f32>(base.rgb * light, base.a);
}
"#;

/// Cube-mapped sky. Samples by object-space direction; depth is ignored.
pub const SKY_SHADER: &str = r#"
struct SkyUniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> sky: SkyUniforms;

@group(1) @binding(0)
var sky_texture: texture_cube<f32>;
@group(1) @binding(1)
var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_sky(@location(0) position: vec3<f32>) -> SkyOutput {
    var out: SkyOutput;
    out.clip_position = sky.view_proj * vec4<f32>(position, 1.0);
    out.direction = position;
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    return textureSample(sky_texture, sky_sampler, in.direction);
}
"#;
