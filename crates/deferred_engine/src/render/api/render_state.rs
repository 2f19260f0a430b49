//! Fixed-function state, effect techniques and shader parameters

use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::render::api::render_backend::{RenderTargetHandle, TextureHandle};

/// Colour blending mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendState {
    /// Source replaces destination
    Opaque,
    /// Straight alpha blending
    NonPremultiplied,
    /// `dst = dst + src`; used to accumulate light contributions
    Additive,
}

/// Depth buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthState {
    /// Depth test and depth write enabled
    Default,
    /// Depth test and depth write disabled
    None,
}

/// Triangle culling mode, named after the winding that gets discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// No culling
    None,
    /// Discard clockwise triangles, the front faces of light volumes
    Clockwise,
    /// Discard counter-clockwise triangles, the standard mode
    CounterClockwise,
}

/// The two shader effects the renderer drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Forward material effect used in the geometry pass
    Basic,
    /// Lighting and composite effect
    Deferred,
}

/// Named technique within an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Technique {
    /// Textured lit surface writing all four G-buffer targets
    ColorTextureLit,
    /// Flat emissive marker showing where a light sits
    LightMarker,
    /// Full-screen ambient term
    AmbientLight,
    /// Point light volume
    PointLight,
    /// Cone light volume
    ConeLight,
    /// Final composite of albedo, light and bloom
    Integrate,
}

/// Texture sampler slots exposed by the effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Material texture of an opaque object
    Diffuse,
    /// G-buffer albedo (A = diffuse coefficient)
    Color,
    /// G-buffer normal (A = specular coefficient)
    Normal,
    /// G-buffer world position (A = shininess)
    Position,
    /// G-buffer emissive/bloom filter
    Bloom,
    /// Accumulated light
    Light,
    /// Horizontally blurred bloom
    BlurH,
    /// Vertically blurred bloom
    BlurV,
}

/// What a texture slot samples from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureBinding {
    /// A render target written by an earlier pass
    Target(RenderTargetHandle),
    /// A loaded texture asset
    Texture(TextureHandle),
}

/// Parameters of the full-screen ambient term
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientParams {
    /// Reference position
    pub position: Vec3,
    /// Diffuse colour
    pub diffuse_color: Vec3,
    /// Ambient colour
    pub ambient_color: Vec3,
    /// Specular colour
    pub specular_color: Vec3,
}

impl AmbientParams {
    /// All-zero ambient, bound when no ambient light is visible
    pub fn black() -> Self {
        Self {
            position: Vec3::zeros(),
            diffuse_color: Vec3::zeros(),
            ambient_color: Vec3::zeros(),
            specular_color: Vec3::zeros(),
        }
    }
}

/// Value bound to a named effect parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShaderParam {
    /// World-to-view matrix
    View(Mat4),
    /// View-to-clip matrix
    Projection(Mat4),
    /// Object-to-world matrix
    World(Mat4),
    /// Inverse-transpose of the world matrix, for normals
    InverseTransposeWorld(Mat4),
    /// Eye position in world space
    CameraPosition(Vec3),
    /// Light position in world space
    LightPosition(Vec3),
    /// Light diffuse colour
    LightDiffuseColor(Vec3),
    /// Light specular colour
    LightSpecularColor(Vec3),
    /// Light influence radius
    LightRadius(f32),
    /// Unit direction of an oriented light
    LightDirection(Vec3),
    /// Full cone aperture in degrees
    LightConeWidth(f32),
    /// Ambient term
    Ambient(AmbientParams),
    /// Surface size in pixels
    ScreenSize(Vec2),
    /// Texture bound to a sampler slot
    Texture(TextureSlot, TextureBinding),
    /// Flat colour, used by light markers
    Color(Vec3),
    /// Phong material coefficients
    Material {
        /// Ambient coefficient
        ambient: f32,
        /// Diffuse coefficient
        diffuse: f32,
        /// Specular coefficient
        specular: f32,
        /// Specular exponent
        shininess: f32,
    },
    /// Texture coordinate scale
    Tiling(Vec2),
}
