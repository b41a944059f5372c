/// Lit and unlit mesh shading, sampling the directional shadow map.
pub(crate) const MESH_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    directional_direction: vec4<f32>,
    directional_color: vec4<f32>,
    spot_position: vec4<f32>,
    spot_direction: vec4<f32>,
    spot_color: vec4<f32>,
    spot_params: vec4<f32>,
    point_position: vec4<f32>,
    point_color: vec4<f32>,
    point_params: vec4<f32>,
    shadow_params: vec4<f32>,
    shadow_bias: vec4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    material: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: Globals;
@group(0) @binding(1)
var shadow_map: texture_depth_2d;
@group(0) @binding(2)
var shadow_sampler: sampler_comparison;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

@group(2) @binding(0)
var color_map: texture_2d<f32>;
@group(2) @binding(1)
var alpha_map: texture_2d<f32>;
@group(2) @binding(2)
var map_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;

    let world_normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;

    out.normal = normalize(world_normal);
    out.uv = input.uv;
    return out;
}

fn shadow_factor(world_pos: vec3<f32>) -> f32 {
    if (globals.shadow_params.x < 0.5) {
        return 1.0;
    }
    let clip = globals.light_view_proj * vec4<f32>(world_pos, 1.0);
    let ndc = clip.xyz / clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    if (uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 || ndc.z > 1.0) {
        return 1.0;
    }

    let texel = globals.shadow_params.y;
    var spread = globals.shadow_params.z;
    if (globals.shadow_params.w > 0.5) {
        spread = 1.0;
    }
    let depth = ndc.z - globals.shadow_bias.x;

    var lit = 0.0;
    for (var x = -1; x <= 1; x = x + 1) {
        for (var y = -1; y <= 1; y = y + 1) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel * spread;
            lit = lit + textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
        }
    }
    return lit / 9.0;
}

fn distance_attenuation(dist: f32, cutoff: f32, decay: f32) -> f32 {
    var falloff = 1.0 / max(pow(dist, decay), 0.01);
    if (cutoff > 0.0) {
        let ratio = dist / cutoff;
        let fade = clamp(1.0 - ratio * ratio * ratio * ratio, 0.0, 1.0);
        falloff = falloff * fade * fade;
    }
    return falloff;
}

fn brdf(
    normal: vec3<f32>,
    view_dir: vec3<f32>,
    light_dir: vec3<f32>,
    albedo: vec3<f32>,
    roughness: f32,
    metalness: f32,
) -> vec3<f32> {
    let n_dot_l = max(dot(normal, light_dir), 0.0);
    let half_dir = normalize(light_dir + view_dir);
    let n_dot_h = max(dot(normal, half_dir), 0.0);
    let shininess = mix(512.0, 2.0, roughness);
    let specular_color = mix(vec3<f32>(0.04), albedo, metalness);
    let specular = specular_color * pow(n_dot_h, shininess) * (1.0 - 0.9 * roughness);
    let diffuse = albedo * (1.0 - metalness);
    return (diffuse + specular) * n_dot_l;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(color_map, map_sampler, input.uv);
    let mask = textureSample(alpha_map, map_sampler, input.uv).g;
    let albedo = object.color.rgb * texel.rgb;
    let alpha = object.color.a * mask;

    if (object.material.w > 0.5) {
        return vec4<f32>(albedo, alpha);
    }

    let normal = normalize(input.normal);
    let view_dir = normalize(globals.camera_position.xyz - input.world_pos);
    let roughness = object.material.x;
    let metalness = object.material.y;

    var color = globals.ambient.rgb * albedo * (1.0 - metalness);

    var visibility = 1.0;
    if (object.material.z > 0.5) {
        visibility = shadow_factor(input.world_pos);
    }
    let directional = globals.directional_color.rgb * globals.directional_direction.w;
    color = color + visibility * directional
        * brdf(normal, view_dir, globals.directional_direction.xyz, albedo, roughness, metalness);

    if (globals.spot_position.w > 0.0) {
        let to_light = globals.spot_position.xyz - input.world_pos;
        let dist = length(to_light);
        let light_dir = to_light / dist;
        let angle_cos = dot(-light_dir, globals.spot_direction.xyz);
        let cone = smoothstep(globals.spot_direction.w, globals.spot_params.x, angle_cos);
        let attenuation = cone
            * distance_attenuation(dist, globals.spot_color.w, globals.spot_params.y);
        color = color + globals.spot_color.rgb * globals.spot_position.w * attenuation
            * brdf(normal, view_dir, light_dir, albedo, roughness, metalness);
    }

    if (globals.point_position.w > 0.0) {
        let to_light = globals.point_position.xyz - input.world_pos;
        let dist = length(to_light);
        let light_dir = to_light / dist;
        let attenuation =
            distance_attenuation(dist, globals.point_color.w, globals.point_params.x);
        color = color + globals.point_color.rgb * globals.point_position.w * attenuation
            * brdf(normal, view_dir, light_dir, albedo, roughness, metalness);
    }

    return vec4<f32>(color, alpha);
}
"#;

/// Depth-only pass rendering shadow casters from the light.
pub(crate) const SHADOW_SHADER: &str = r#"
struct ShadowGlobals {
    light_view_proj: mat4x4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    material: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> shadow_globals: ShadowGlobals;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return shadow_globals.light_view_proj * object.model * vec4<f32>(position, 1.0);
}
"#;

/// Colored line list for the shadow-camera helpers.
pub(crate) const LINE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: Globals;

struct LineOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@vertex
fn vs_line(@location(0) position: vec3<f32>, @location(1) color: vec3<f32>) -> LineOutput {
    var out: LineOutput;
    out.position = globals.view_proj * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_line(input: LineOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(input.color, 1.0);
}
"#;
