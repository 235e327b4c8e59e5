//! Top-level application state machine.
//!
//! `AppState` owns the `ParticleField`, the `ActiveState`, the word map and
//! the `CuePlayer`. It folds detector results into the active state and
//! drives the field once per rendered frame.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use glyph_field::{FieldConfig, Formation, ParticleField};
use hand_gesture::quantify;
use tracing::{debug, info};

use crate::cue::{Cue, CuePlayer};
#[cfg(not(feature = "leap"))]
use crate::detector::SimLandmarkSource;
use crate::detector::{spawn_detector, Detection, SimInput};
use crate::error::AppError;
use crate::state::{ActiveState, TextMap, INITIAL_TEXT};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub field:            FieldConfig,
    pub words:            TextMap,
    pub initial_text:     String,
    pub width:            usize,
    pub height:           usize,
    /// How often the simulated detector emits a frame.
    pub detector_cadence: Duration,
    pub muted:            bool,
    pub midi_channel:     u8,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed:             Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            field:            FieldConfig::default(),
            words:            TextMap::default(),
            initial_text:     INITIAL_TEXT.to_string(),
            width:            1024,
            height:           640,
            detector_cadence: Duration::from_millis(33),
            muted:            false,
            midi_channel:     0,
            seed:             None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.width == 0 || self.height == 0 {
            return Err(AppError::Config(format!(
                "window size must be non-zero, got {}x{}", self.width, self.height
            )));
        }
        let raster = &self.field.raster;
        if raster.width == 0 || raster.height == 0 || raster.stride == 0 {
            return Err(AppError::Config("raster canvas and stride must be non-zero".into()));
        }
        let rate = self.field.interpolation_rate;
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(AppError::Config(format!(
                "interpolation rate must be in (0, 1], got {}", rate
            )));
        }
        if self.midi_channel > 15 {
            return Err(AppError::Config(format!(
                "MIDI channel must be 0-15, got {}", self.midi_channel
            )));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── scene ─────────────────────────────────────────────────────────────
    field:     ParticleField,
    formation: Formation,

    // ── gesture → text ────────────────────────────────────────────────────
    active:    ActiveState,
    words:     TextMap,

    // ── audio ─────────────────────────────────────────────────────────────
    cues:      CuePlayer,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Self {
        let field = match cfg.seed {
            Some(seed) => ParticleField::seeded(cfg.field, seed),
            None       => ParticleField::new(cfg.field),
        };
        let formation = field.formation();
        AppState {
            field,
            formation,
            active: ActiveState::new(&cfg.initial_text),
            words:  cfg.words,
            cues:   CuePlayer::spawn(cfg.midi_channel, cfg.muted),
        }
    }

    // ── process one detector result ──────────────────────────────────────

    pub fn handle_detection(&mut self, detection: &Detection) {
        let sample = quantify(detection.first());
        if self.active.apply(&sample, &self.words) {
            info!(text = %self.active.text, fingers = sample.finger_count, "text changed");
            self.cues.play(Cue::TextChanged { finger_count: sample.finger_count });
        }
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    /// Retarget and advance the field for `elapsed` seconds since startup.
    pub fn tick(&mut self, elapsed: f32) -> Formation {
        let formation = self.field.tick(&self.active.text, self.active.grip_strength, elapsed);
        if formation != self.formation {
            debug!(?formation, grip = self.active.grip_strength, "formation switch");
            self.cues.play(match formation {
                Formation::Collapse => Cue::Collapse,
                Formation::Text     => Cue::Release,
            });
            self.formation = formation;
        }
        formation
    }

    /// Stop background work owned by the state.
    pub fn shutdown(&mut self) {
        self.cues.shutdown();
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn field(&self)         -> &ParticleField { &self.field }
    pub fn active(&self)        -> &ActiveState   { &self.active }
    pub fn formation(&self)     -> Formation      { self.formation }
    pub fn overlay_lines(&self) -> Vec<String>    { self.active.overlay_lines() }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the window, the landmark source (simulation by default, hardware
/// with `--features leap`) and drives the detect/update/render loop at
/// ~60 fps. On exit the render loop stops first, then the window is released,
/// then the detector is halted; teardown never fails.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    cfg.validate()?;

    // ── Sim input channel (window keys → simulated hand) ─────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    #[cfg(feature = "leap")]
    let mut detector = {
        drop(sim_rx);
        spawn_detector(crate::detector::LeapLandmarkSource)
    };
    #[cfg(not(feature = "leap"))]
    let mut detector = spawn_detector(SimLandmarkSource::new(sim_rx, cfg.detector_cadence));

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = match Visualizer::new(cfg.width, cfg.height, sim_tx) {
        Ok(v)  => v,
        Err(e) => {
            detector.shutdown();
            return Err(e);
        }
    };

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(cfg);
    let started = Instant::now();
    info!(particles = app.field().len(), "running");

    // ── Main loop ─────────────────────────────────────────────────────────
    let result = loop {
        if !vis.is_open() || !vis.poll_input() { break Ok(()); }

        for detection in detector.drain() {
            app.handle_detection(&detection);
        }

        let elapsed = started.elapsed().as_secs_f32();
        app.tick(elapsed);

        if let Err(e) = vis.render(
            app.field().positions(),
            app.field().colors(),
            &app.overlay_lines(),
            elapsed,
        ) {
            break Err(e);
        }
    };

    // ── Teardown ──────────────────────────────────────────────────────────
    drop(vis);
    detector.shutdown();
    app.shutdown();
    info!("shut down");

    result
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::synthetic::HandPose;

    fn small_config() -> AppConfig {
        let mut cfg = AppConfig { muted: true, seed: Some(7), ..AppConfig::default() };
        cfg.field.particle_count = 500;
        cfg
    }

    fn make_app() -> AppState {
        AppState::new(small_config())
    }

    fn hand(pose: HandPose) -> Detection {
        Detection::single(pose.landmarks())
    }

    #[test]
    fn starts_on_initial_text() {
        let app = make_app();
        assert_eq!(app.active().text, "HELLO");
        assert_eq!(app.active().status, "Initializing...");
        assert_eq!(app.formation(), Formation::Text);
    }

    #[test]
    fn two_fingers_show_future() {
        let mut app = make_app();
        app.handle_detection(&hand(HandPose::with_extended(2)));
        assert_eq!(app.active().text, "FUTURE");
        assert_eq!(app.active().finger_count, 2);
        app.tick(0.0);
        assert_eq!(app.field().text(), Some("FUTURE"));
    }

    #[test]
    fn empty_detection_reports_no_hand() {
        let mut app = make_app();
        app.handle_detection(&Detection::none());
        assert_eq!(app.active().status, "No hands detected");
        assert_eq!(app.active().text, "HELLO");
    }

    #[test]
    fn fist_collapses_and_open_releases() {
        let mut app = make_app();
        app.handle_detection(&hand(HandPose::fist()));
        assert!(app.active().grip_strength > 0.9);
        assert_eq!(app.tick(0.1), Formation::Collapse);
        assert_eq!(app.formation(), Formation::Collapse);

        app.handle_detection(&hand(HandPose::open()));
        assert_eq!(app.tick(0.2), Formation::Text);
    }

    #[test]
    fn fist_keeps_text() {
        let mut app = make_app();
        app.handle_detection(&hand(HandPose::with_extended(3)));
        app.handle_detection(&hand(HandPose::fist()));
        assert_eq!(app.active().text, "WORLD");
    }

    #[test]
    fn dead_source_releases_a_held_fist() {
        use crate::detector::LandmarkSource;
        use std::sync::atomic::AtomicBool;
        use std::sync::mpsc::Sender;
        use std::sync::Arc;

        struct FistThenGone;
        impl LandmarkSource for FistThenGone {
            fn run(self: Box<Self>, tx: Sender<Detection>, _stop: Arc<AtomicBool>) {
                let _ = tx.send(hand(HandPose::fist()));
            }
        }

        let mut app = make_app();
        let mut detector = spawn_detector(FistThenGone);
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline && app.active().status != "No hands detected" {
            for detection in detector.drain() {
                app.handle_detection(&detection);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(app.active().status, "No hands detected");
        assert_eq!(app.active().grip_strength, 0.0);
        assert_eq!(app.tick(0.5), Formation::Text);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_configs_are_rejected() {
        let zero = AppConfig { width: 0, ..AppConfig::default() };
        assert!(matches!(zero.validate(), Err(AppError::Config(_))));

        let mut rate = AppConfig::default();
        rate.field.interpolation_rate = 0.0;
        assert!(rate.validate().is_err());
        rate.field.interpolation_rate = f32::NAN;
        assert!(rate.validate().is_err());

        let chan = AppConfig { midi_channel: 16, ..AppConfig::default() };
        assert!(chan.validate().is_err());
    }
}
