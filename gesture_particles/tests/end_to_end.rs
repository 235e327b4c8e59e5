//! Whole-pipeline behaviour without a window: synthetic hands in,
//! particle targets out.

use gesture_particles::app::{AppConfig, AppState};
use gesture_particles::detector::Detection;
use glyph_field::{rasterize, Formation};
use hand_gesture::synthetic::HandPose;

fn app(particles: usize) -> AppState {
    let mut cfg = AppConfig { muted: true, seed: Some(42), ..AppConfig::default() };
    cfg.field.particle_count = particles;
    AppState::new(cfg)
}

fn show(app: &mut AppState, pose: HandPose) {
    app.handle_detection(&Detection::single(pose.landmarks()));
}

#[test]
fn two_fingers_spell_future() {
    let mut app = app(8000);
    // two fingers folded put the grip mid-range: no breathing, so the
    // targets are the raw glyph points
    show(&mut app, HandPose::with_extended(2));
    assert_eq!(app.active().text, "FUTURE");
    assert!(app.active().grip_strength > 0.2 && app.active().grip_strength < 0.9);
    assert_eq!(app.tick(1.0), Formation::Text);

    let ink = rasterize("FUTURE", &app.field().config().raster);
    let field = app.field();
    assert_eq!(field.text(), Some("FUTURE"));
    assert_eq!(field.ink_len(), ink.len().min(8000));
    for (target, point) in field.targets().iter().zip(&ink) {
        assert_eq!(target, point);
    }
}

#[test]
fn unmapped_counts_keep_the_word() {
    let mut app = app(1000);
    show(&mut app, HandPose::with_extended(3));
    app.tick(0.0);
    for n in [0, 4] {
        show(&mut app, HandPose::with_extended(n));
        app.tick(0.1);
        assert_eq!(app.active().text, "WORLD");
        assert_eq!(app.field().text(), Some("WORLD"));
    }
}

#[test]
fn fist_pulls_everything_in() {
    let mut app = app(2000);
    show(&mut app, HandPose::fist());
    for i in 0..120 {
        assert_eq!(app.tick(i as f32 / 60.0), Formation::Collapse);
    }
    let jitter = app.field().config().collapse_jitter;
    for p in app.field().positions() {
        assert!(p.abs().max_element() <= jitter + 0.01, "{:?} escaped", p);
    }
}

#[test]
fn losing_the_hand_keeps_the_scene() {
    let mut app = app(500);
    show(&mut app, HandPose::with_extended(2));
    app.tick(0.0);
    app.handle_detection(&Detection::none());
    assert_eq!(app.tick(0.1), Formation::Text);
    assert_eq!(app.active().text, "FUTURE");
    assert_eq!(app.active().status, "No hands detected");
}
