//! The particle field.
//!
//! A fixed set of N particles, each with a current position, a per-tick
//! target and a fixed color. Every tick the field:
//!
//! 1. **retargets**: picks the formation from grip strength and writes a
//!    target for every particle (text point, scattered leftover, or a freshly
//!    rolled collapse jitter);
//! 2. **advances**: moves every particle a fixed fraction of the way to its
//!    target: `current += (target − current) · rate`.
//!
//! The rate is per tick, not per second, so the perceived speed follows the
//! render tick rate (0.1 at ~60 fps settles in roughly half a second).

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::formation::{Breathing, Formation, FormationPolicy};
use crate::raster::{rasterize, RasterConfig};

// ════════════════════════════════════════════════════════════════════════════
// FieldConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    pub particle_count:     usize,
    pub raster:             RasterConfig,
    pub policy:             FormationPolicy,
    pub breathing:          Breathing,
    /// Fraction of the remaining distance covered per tick.
    pub interpolation_rate: f32,
    /// Half-width of the collapse jitter cube around the origin.
    pub collapse_jitter:    f32,
    /// Half-width of the cube that leftover text particles scatter into.
    pub text_scatter:       f32,
    /// Half-width of the cube particles start in.
    pub initial_scatter:    f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            particle_count:     8000,
            raster:             RasterConfig::default(),
            policy:             FormationPolicy::default(),
            breathing:          Breathing::default(),
            interpolation_rate: 0.1,
            collapse_jitter:    2.5,
            text_scatter:       25.0,
            initial_scatter:    50.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// helpers
// ════════════════════════════════════════════════════════════════════════════

/// Uniform point in the axis-aligned cube `[-half, half)³`.
pub fn random_in_cube<R: Rng + ?Sized>(rng: &mut R, half: f32) -> Vec3 {
    let mut axis = || (rng.gen::<f32>() - 0.5) * 2.0 * half;
    Vec3::new(axis(), axis(), axis())
}

/// Pastel cyan: red 0.5–1.0, green 0.8–1.0, full blue.
pub fn pastel_cyan<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(0.5 + rng.gen::<f32>() * 0.5, 0.8 + rng.gen::<f32>() * 0.2, 1.0)
}

/// One interpolation step toward `target`.
pub fn approach(current: Vec3, target: Vec3, rate: f32) -> Vec3 {
    current + (target - current) * rate
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

/// Owns every particle; formations only ever produce targets.
pub struct ParticleField<R = StdRng> {
    config:       FieldConfig,
    positions:    Vec<Vec3>,
    colors:       Vec<Vec3>,
    /// Text formation, padded to N with scattered points.
    text_targets: Vec<Vec3>,
    /// Targets chosen by the last retarget.
    targets:      Vec<Vec3>,
    text:         Option<String>,
    /// How many leading `text_targets` are real ink points.
    ink_len:      usize,
    formation:    Formation,
    rng:          R,
}

impl ParticleField<StdRng> {
    pub fn new(config: FieldConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: FieldConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ParticleField<R> {
    pub fn with_rng(config: FieldConfig, mut rng: R) -> Self {
        let n = config.particle_count;
        let mut positions = Vec::with_capacity(n);
        let mut colors    = Vec::with_capacity(n);
        for _ in 0..n {
            positions.push(random_in_cube(&mut rng, config.initial_scatter));
            colors.push(pastel_cyan(&mut rng));
        }
        // No text yet: everyone has a scattered target.
        let text_targets: Vec<Vec3> = (0..n)
            .map(|_| random_in_cube(&mut rng, config.text_scatter))
            .collect();
        let targets = text_targets.clone();

        ParticleField {
            config,
            positions,
            colors,
            text_targets,
            targets,
            text: None,
            ink_len: 0,
            formation: Formation::Text,
            rng,
        }
    }

    // ── text formation ───────────────────────────────────────────────────

    /// Rebuild the text formation if `text` differs from the current one.
    /// Returns true when it was rebuilt.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text.as_deref() == Some(text) {
            return false;
        }
        let ink = rasterize(text, &self.config.raster);
        let n   = self.config.particle_count;
        if ink.len() > n {
            debug!(text, ink = ink.len(), particles = n, "text formation truncated");
        }
        self.ink_len = ink.len().min(n);
        for (i, slot) in self.text_targets.iter_mut().enumerate() {
            *slot = match ink.get(i) {
                Some(&p) => p,
                None     => random_in_cube(&mut self.rng, self.config.text_scatter),
            };
        }
        debug!(text, ink = self.ink_len, "text formation rebuilt");
        self.text = Some(text.to_string());
        true
    }

    // ── per-tick operations ──────────────────────────────────────────────

    /// Recompute every particle's target for this tick.
    ///
    /// `elapsed` is seconds since start and only drives the breathing
    /// offset; non-finite values are treated as 0.
    pub fn retarget(&mut self, text: &str, grip: f32, elapsed: f32) -> Formation {
        self.set_text(text);

        let formation = self.config.policy.select(grip);
        match formation {
            Formation::Collapse => {
                let half = self.config.collapse_jitter;
                for t in self.targets.iter_mut() {
                    *t = random_in_cube(&mut self.rng, half);
                }
            }
            Formation::Text => {
                let breathe   = self.config.policy.breathes(grip);
                let breathing = self.config.breathing;
                let elapsed   = if elapsed.is_finite() { elapsed } else { 0.0 };
                for (t, &base) in self.targets.iter_mut().zip(self.text_targets.iter()) {
                    *t = base;
                    if breathe {
                        t.z += breathing.offset(base.x, elapsed);
                    }
                }
            }
        }

        if formation != self.formation {
            debug!(?formation, grip, "formation switched");
        }
        self.formation = formation;
        formation
    }

    /// Move every particle one step toward its current target.
    pub fn advance(&mut self) {
        let rate = self.config.interpolation_rate;
        for (p, &t) in self.positions.iter_mut().zip(self.targets.iter()) {
            *p = approach(*p, t, rate);
        }
    }

    /// Retarget then advance.
    pub fn tick(&mut self, text: &str, grip: f32, elapsed: f32) -> Formation {
        let f = self.retarget(text, grip, elapsed);
        self.advance();
        f
    }

    // ── accessors for the renderer / UI ──────────────────────────────────

    pub fn len(&self)           -> usize        { self.positions.len() }
    pub fn is_empty(&self)      -> bool         { self.positions.is_empty() }
    pub fn positions(&self)     -> &[Vec3]      { &self.positions }
    pub fn colors(&self)        -> &[Vec3]      { &self.colors }
    pub fn targets(&self)       -> &[Vec3]      { &self.targets }
    pub fn text_targets(&self)  -> &[Vec3]      { &self.text_targets }
    pub fn ink_len(&self)       -> usize        { self.ink_len }
    pub fn text(&self)          -> Option<&str> { self.text.as_deref() }
    pub fn formation(&self)     -> Formation    { self.formation }
    pub fn config(&self)        -> &FieldConfig { &self.config }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
