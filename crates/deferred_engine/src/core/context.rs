//! Screen context
//!
//! Replaces a process-wide "current screen" with a small value the shell owns
//! and hands to whoever needs the aspect ratio or the cursor reference point.

use crate::foundation::math::Vec2;

/// Size of the output surface and the derived cursor reference point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenContext {
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
}

impl ScreenContext {
    /// Create a context for a `width` x `height` surface
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height; a zero height yields `1.0`
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Centre of the surface in pixel coordinates, the mouse-look reference
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.width / 2) as f32, (self.height / 2) as f32)
    }

    /// Surface size as floats, as bound to the `ScreenSize` shader parameter
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_and_center() {
        let ctx = ScreenContext::new(1600, 900);
        assert!((ctx.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(ctx.center(), Vec2::new(800.0, 450.0));
        assert_eq!(ctx.size(), Vec2::new(1600.0, 900.0));
    }

    #[test]
    fn test_zero_height_aspect() {
        assert_eq!(ScreenContext::new(640, 0).aspect_ratio(), 1.0);
    }
}
