//! Render target allocation and the deferred G-buffer

use crate::core::context::ScreenContext;
use crate::render::api::{BackendResult, RenderBackend, RenderTargetHandle};
use crate::render::RenderError;

/// Number of targets written simultaneously by the geometry pass
pub const GEOMETRY_TARGET_COUNT: usize = 4;

const TARGET_COUNT: usize = 7;

/// Pixel format of a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    /// Four 16-bit float channels; holds positions and unclamped light
    HalfVector4,
}

/// Description of a render target to allocate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TargetFormat,
    /// Attach a 24-bit depth / 8-bit stencil buffer
    pub depth_stencil: bool,
}

impl RenderTargetDesc {
    /// Validated description; zero dimensions are rejected
    pub fn new(width: u32, height: u32, format: TargetFormat, depth_stencil: bool) -> BackendResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidTargetSize { width, height });
        }
        Ok(Self { width, height, format, depth_stencil })
    }
}

/// Bind `targets` after checking the device limit
pub fn bind_render_targets(backend: &mut dyn RenderBackend, targets: &[RenderTargetHandle]) -> BackendResult<()> {
    let supported = backend.max_simultaneous_targets();
    if targets.len() > supported {
        return Err(RenderError::TooManyTargets {
            requested: targets.len(),
            supported,
        });
    }
    backend.set_render_targets(targets)
}

/// Best-effort cleanup after a failed allocation
fn release_all(backend: &mut dyn RenderBackend, targets: &[RenderTargetHandle]) {
    for &target in targets {
        if let Err(err) = backend.release_render_target(target) {
            log::warn!("Failed to release render target {}: {}", target.0, err);
        }
    }
}

/// Every intermediate target of the deferred pipeline
///
/// Geometry pass: `color` (RGB albedo, A kd), `normal` (RGB normal, A ks),
/// `position` (RGB world position, A shininess) and `bloom`. Light pass:
/// `light`, `blur_h` and `blur_v`. Only `color` carries the depth buffer
/// shared by the geometry pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GBuffer {
    /// Albedo and diffuse coefficient
    pub color: RenderTargetHandle,
    /// Normal and specular coefficient
    pub normal: RenderTargetHandle,
    /// World position and shininess
    pub position: RenderTargetHandle,
    /// Emissive bloom filter
    pub bloom: RenderTargetHandle,
    /// Accumulated light
    pub light: RenderTargetHandle,
    /// Horizontal bloom blur
    pub blur_h: RenderTargetHandle,
    /// Vertical bloom blur
    pub blur_v: RenderTargetHandle,
    width: u32,
    height: u32,
}

impl GBuffer {
    /// Allocate every target at the size of `context`
    ///
    /// Fails with [`RenderError::TooManyTargets`] if the device cannot bind the
    /// four geometry targets at once, and with
    /// [`RenderError::InvalidTargetSize`] for a zero-sized screen.
    pub fn new(backend: &mut dyn RenderBackend, context: &ScreenContext) -> BackendResult<Self> {
        let supported = backend.max_simultaneous_targets();
        if supported < GEOMETRY_TARGET_COUNT {
            return Err(RenderError::TooManyTargets {
                requested: GEOMETRY_TARGET_COUNT,
                supported,
            });
        }

        let (width, height) = (context.width, context.height);
        let with_depth = RenderTargetDesc::new(width, height, TargetFormat::HalfVector4, true)?;
        let plain = RenderTargetDesc { depth_stencil: false, ..with_depth };

        let mut created = Vec::with_capacity(TARGET_COUNT);
        for index in 0..TARGET_COUNT {
            let desc = if index == 0 { &with_depth } else { &plain };
            match backend.create_render_target(desc) {
                Ok(target) => created.push(target),
                Err(err) => {
                    release_all(backend, &created);
                    return Err(err);
                }
            }
        }
        let [color, normal, position, bloom, light, blur_h, blur_v]: [RenderTargetHandle; TARGET_COUNT] =
            created.try_into().map_err(|partial: Vec<RenderTargetHandle>| {
                RenderError::RenderingFailed(format!("allocated {} of {} G-buffer targets", partial.len(), TARGET_COUNT))
            })?;

        let gbuffer = Self {
            color,
            normal,
            position,
            bloom,
            light,
            blur_h,
            blur_v,
            width,
            height,
        };
        log::debug!("Allocated G-buffer at {}x{}", width, height);
        Ok(gbuffer)
    }

    /// Targets of the geometry pass, in binding order
    pub fn geometry_targets(&self) -> [RenderTargetHandle; GEOMETRY_TARGET_COUNT] {
        [self.color, self.normal, self.position, self.bloom]
    }

    /// Targets of the light accumulation pass, in binding order
    pub fn light_targets(&self) -> [RenderTargetHandle; 3] {
        [self.light, self.blur_h, self.blur_v]
    }

    /// Targets shown by the diagnostic overlay
    pub fn debug_targets(&self) -> [RenderTargetHandle; 4] {
        [self.color, self.normal, self.position, self.light]
    }

    fn all(&self) -> [RenderTargetHandle; TARGET_COUNT] {
        [self.color, self.normal, self.position, self.bloom, self.light, self.blur_h, self.blur_v]
    }

    /// Current size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reallocate every target at the size of `context`
    ///
    /// New targets are allocated before the old ones are released. A failed
    /// allocation releases whatever part of the replacement was created and
    /// leaves the current G-buffer intact.
    pub fn resize(&mut self, backend: &mut dyn RenderBackend, context: &ScreenContext) -> BackendResult<()> {
        let replacement = Self::new(backend, context)?;
        let previous = std::mem::replace(self, replacement);
        previous.release(backend)?;
        log::debug!("Resized G-buffer from {}x{} to {}x{}", previous.width, previous.height, self.width, self.height);
        Ok(())
    }

    /// Release every target
    pub fn release(&self, backend: &mut dyn RenderBackend) -> BackendResult<()> {
        for target in self.all() {
            backend.release_render_target(target)?;
        }
        Ok(())
    }
}
