//! Procedural field of orbiting lights
//!
//! Each generated light circles its own centre on the XZ plane. Even lights
//! orbit at `(x, h, z)` and odd lights at the mirrored `(z, h, x)`, which
//! spreads the field across both diagonals of the ground.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::LightFieldSettings;
use crate::foundation::math::Vec3;
use crate::render::lighting::{ConeLight, LightHandle, LightVolume, LightsManager, PointLight};
use crate::render::RenderError;

/// Pitch of generated cone lights in degrees
pub const CONE_PITCH: f32 = -45.0;

/// Aperture of generated cone lights in degrees
pub const CONE_WIDTH: f32 = 90.0;

/// Height offset of generated cone lights
pub const CONE_HEIGHT_OFFSET: f32 = -3.5;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Orbit {
    radius: f32,
    phase: f32,
    center_x: f32,
    center_z: f32,
    height_offset: f32,
    is_cone: bool,
}

/// Generated lights and their orbit parameters
#[derive(Debug, Clone)]
pub struct LightField {
    settings: LightFieldSettings,
    handles: Vec<LightHandle>,
    orbits: Vec<Orbit>,
    time: f32,
}

impl LightField {
    /// Empty field; call [`LightField::generate`] to populate it
    pub fn new(settings: LightFieldSettings) -> Self {
        Self {
            settings,
            handles: Vec::new(),
            orbits: Vec::new(),
            time: 0.0,
        }
    }

    /// Replace every previously generated light with `count` new ones
    ///
    /// Generation is seeded, so the same settings always yield the same field.
    pub fn generate(&mut self, count: usize, lights: &mut LightsManager) -> Result<(), RenderError> {
        self.settings.validate()?;
        for handle in self.handles.drain(..) {
            lights.destroy(handle);
        }
        self.orbits.clear();

        let mut rng = StdRng::seed_from_u64(self.settings.seed);
        let max_radius = self.settings.max_orbit_radius;
        for index in 0..count {
            let is_cone = self.settings.cone_interval > 0 && index % self.settings.cone_interval == 0;
            let orbit = Orbit {
                radius: rng.gen_range(-max_radius..max_radius) as f32,
                phase: rng.gen_range(0.0..self.settings.max_phase),
                center_x: rng.gen_range(0.0..self.settings.field_extent),
                center_z: rng.gen_range(0.0..self.settings.field_extent),
                height_offset: if is_cone { CONE_HEIGHT_OFFSET } else { 0.0 },
                is_cone,
            };
            let color = random_color(&mut rng);

            let position = self.orbit_position(index, &orbit);
            let light: LightVolume = if is_cone {
                let yaw = rng.gen_range(0.0..360.0);
                ConeLight::new(position, color, self.settings.radius, yaw, CONE_PITCH, CONE_WIDTH)?.into()
            } else {
                PointLight::new(position, color, self.settings.radius)?.into()
            };

            self.handles.push(lights.register(light));
            self.orbits.push(orbit);
        }

        log::info!(
            "Generated {} lights ({} cones) from seed {:#x}",
            count,
            self.cone_count(),
            self.settings.seed
        );
        Ok(())
    }

    /// Advance the orbit clock and move every generated light
    pub fn update(&mut self, dt: f32, lights: &mut LightsManager) {
        if dt.is_finite() {
            self.time += dt * self.settings.time_scale;
        }
        for (index, (&handle, orbit)) in self.handles.iter().zip(&self.orbits).enumerate() {
            let position = self.orbit_position(index, orbit);
            if let Some(light) = lights.get_mut(handle) {
                light.set_position(position);
            }
        }
    }

    fn orbit_position(&self, index: usize, orbit: &Orbit) -> Vec3 {
        let angle = self.time + orbit.phase;
        let x = orbit.center_x + angle.sin() * orbit.radius;
        let z = orbit.center_z + angle.cos() * orbit.radius;
        let y = self.settings.base_height + orbit.height_offset;
        if index % 2 == 0 {
            Vec3::new(x, y, z)
        } else {
            Vec3::new(z, y, x)
        }
    }

    /// Handles of the generated lights, in generation order
    pub fn handles(&self) -> &[LightHandle] {
        &self.handles
    }

    /// Number of generated lights
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the field is empty
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Number of generated cone lights
    pub fn cone_count(&self) -> usize {
        self.orbits.iter().filter(|orbit| orbit.is_cone).count()
    }

    /// Orbit clock in seconds
    pub fn time(&self) -> f32 {
        self.time
    }
}

/// Random colour that is neither black nor white
fn random_color(rng: &mut StdRng) -> Vec3 {
    let mut color = Vec3::new(rng.gen(), rng.gen(), rng.gen());
    while color == Vec3::zeros() || color == Vec3::new(1.0, 1.0, 1.0) {
        color = Vec3::new(
            f32::from(rng.gen_range(0u8..2)),
            f32::from(rng.gen_range(0u8..2)),
            f32::from(rng.gen_range(0u8..2)),
        );
    }
    color
}
