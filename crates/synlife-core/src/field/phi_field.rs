//! Time-evolving coherent-noise field with scan back action
//!
//! The base value is Perlin noise over `(x * scale + t * speed_x,
//! z * scale + t * speed_y)`, remapped to `[-amplitude, amplitude]`. Scans
//! leave short-lived damping patches that suppress the field around the
//! scanned point.

use std::collections::BTreeMap;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use synlife_creature::FieldAccess;

use crate::config::PhiFieldConfig;

/// Default finite-difference step for gradients, in world units
pub const GRADIENT_EPSILON: f32 = 0.5;

/// Active scan perturbation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackActionPatch {
    pub center: Vec2,
    /// Field time at which the patch was created
    pub start_time: f64,
    pub duration: f32,
    pub damping: f32,
}

impl BackActionPatch {
    fn elapsed_fraction(&self, time: f64) -> f32 {
        ((time - self.start_time) / self.duration as f64) as f32
    }

    fn is_expired(&self, time: f64) -> bool {
        time - self.start_time > self.duration as f64
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Patch map key; `-0.0` and `0.0` share a key
fn patch_key(position: Vec2) -> (u32, u32) {
    ((position.x + 0.0).to_bits(), (position.y + 0.0).to_bits())
}

/// The hidden scalar field
pub struct PhiField {
    config: PhiFieldConfig,
    noise: FastNoiseLite,
    time: f64,
    patches: BTreeMap<(u32, u32), BackActionPatch>,
    /// Stream for noisy sampling only
    rng: Xoshiro256StarStar,
}

impl PhiField {
    pub fn new(config: PhiFieldConfig) -> Self {
        let mut noise = FastNoiseLite::with_seed(config.seed);
        noise.set_noise_type(Some(NoiseType::Perlin));
        noise.set_frequency(Some(1.0));
        let rng = Xoshiro256StarStar::seed_from_u64(config.seed as u64);

        Self {
            config,
            noise,
            time: 0.0,
            patches: BTreeMap::new(),
            rng,
        }
    }

    pub fn config(&self) -> &PhiFieldConfig {
        &self.config
    }

    /// Elapsed field time in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn active_patches(&self) -> impl Iterator<Item = &BackActionPatch> {
        self.patches.values()
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Advance field time and purge expired patches
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt as f64;
        }
        let time = self.time;
        let before = self.patches.len();
        self.patches.retain(|_, patch| !patch.is_expired(time));
        let purged = before - self.patches.len();
        if purged > 0 {
            log::trace!("Purged {} expired back-action patches", purged);
        }
    }

    /// Undisturbed field value at `position`
    pub fn base_value(&self, position: Vec2) -> f32 {
        let t = self.time as f32;
        let x = position.x * self.config.scale + t * self.config.speed_x;
        let y = position.y * self.config.scale + t * self.config.speed_y;
        let noise01 = ((self.noise.get_noise_2d(x, y) + 1.0) * 0.5).clamp(0.0, 1.0);
        (noise01 - 0.5) * 2.0 * self.config.amplitude
    }

    /// Field value at `position`, including back-action damping
    ///
    /// Pure for a fixed configuration, time and patch set.
    pub fn sample_phi(&self, position: Vec2) -> f32 {
        let mut phi = self.base_value(position);
        if !self.config.enable_back_action || self.patches.is_empty() {
            return phi;
        }

        let radius = self.config.back_action_radius;
        for patch in self.patches.values() {
            let distance = position.distance(patch.center);
            if distance >= radius {
                continue;
            }
            let t = patch.elapsed_fraction(self.time);
            if t < 1.0 {
                let falloff = 1.0 - distance / radius;
                phi *= lerp(patch.damping, 1.0, t) * falloff;
            }
        }
        phi
    }

    /// Field value plus uniform noise in `[-noise_level, noise_level]`
    pub fn sample_phi_noisy(&mut self, position: Vec2, noise_level: f32) -> f32 {
        let phi = self.sample_phi(position);
        let level = noise_level.abs();
        if !level.is_finite() || level == 0.0 {
            return phi;
        }
        phi + self.rng.random_range(-level..=level)
    }

    /// Central-difference gradient with step `epsilon`
    pub fn sample_phi_gradient(&self, position: Vec2, epsilon: f32) -> Vec2 {
        let eps = if epsilon.is_finite() && epsilon > 0.0 {
            epsilon
        } else {
            GRADIENT_EPSILON
        };
        let dx = Vec2::new(eps, 0.0);
        let dz = Vec2::new(0.0, eps);
        Vec2::new(
            (self.sample_phi(position + dx) - self.sample_phi(position - dx)) / (2.0 * eps),
            (self.sample_phi(position + dz) - self.sample_phi(position - dz)) / (2.0 * eps),
        )
    }

    /// Insert or overwrite the patch centred at `position`
    ///
    /// No-op when back action is disabled or the configured duration is not
    /// positive.
    pub fn trigger_back_action(&mut self, position: Vec2) {
        let duration = self.config.back_action_duration;
        if !self.config.enable_back_action || duration.is_nan() || duration <= 0.0 {
            return;
        }
        self.patches.insert(
            patch_key(position),
            BackActionPatch {
                center: position,
                start_time: self.time,
                duration,
                damping: self.config.back_action_damping,
            },
        );
    }
}

impl FieldAccess for PhiField {
    fn sample(&self, position: Vec2) -> f32 {
        self.sample_phi(position)
    }

    fn sample_noisy(&mut self, position: Vec2, noise_level: f32) -> f32 {
        self.sample_phi_noisy(position, noise_level)
    }

    fn gradient(&self, position: Vec2) -> Vec2 {
        self.sample_phi_gradient(position, GRADIENT_EPSILON)
    }

    fn trigger_back_action(&mut self, position: Vec2) {
        PhiField::trigger_back_action(self, position);
    }

    fn back_action_enabled(&self) -> bool {
        self.config.enable_back_action
    }
}
