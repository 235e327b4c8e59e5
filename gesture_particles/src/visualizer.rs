//! Software-rendered particle view using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Fingers: 2         ← overlay panel                   │
//! │ Grip: 0.12                                           │
//! │ Text: FUTURE                                         │
//! │ Hand! Fingers: 2, Grip: 0.12                         │
//! │                                                      │
//! │             · · ·  particle field  · · ·             │
//! │                                                      │
//! │ keys: 0-4 fingers  G grip  H hand  Q quit            │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Particles go through a pinhole perspective camera on the +Z axis looking
//! at the origin, and are splatted as small squares with additive blending,
//! so dense regions glow.

use std::sync::mpsc::Sender;
use std::time::Duration;

use glam::{Mat3, Vec3};
use glyph_field::font::{glyph_bits, GLYPH_ROWS};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::detector::{SimInput, SimKey};
use crate::error::AppError;

// ════════════════════════════════════════════════════════════════════════════
// Look constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:      u32 = 0xFF05060A;
const PANEL_BG:      u32 = 0xFF101624;
const LABEL_COLOR:   u32 = 0xFFE6F0FF;
const STATUS_COLOR:  u32 = 0xFF00FF00;
const HINT_COLOR:    u32 = 0xFF5A6A80;

/// Particle opacity under additive blending.
pub const OPACITY:      f32 = 0.9;
/// Particle side length in scene units.
pub const POINT_SIZE:   f32 = 0.3;
/// Whole-field roll: `sin(t · SWAY_RATE) · SWAY_ANGLE` radians about Z.
pub const SWAY_RATE:    f32 = 0.5;
pub const SWAY_ANGLE:   f32 = 0.02;

const LABEL_SCALE:   usize = 2;
const LINE_GAP:      usize = 4;

const KEY_HINT: &str = "keys: 0-4 fingers  G grip  H hand  Q quit";

// ════════════════════════════════════════════════════════════════════════════
// Camera
// ════════════════════════════════════════════════════════════════════════════

/// Pinhole camera at `(0, 0, eye_z)` looking down −Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye_z:      f32,
    /// Vertical field of view, degrees.
    pub fov_y_deg:  f32,
    pub width:      usize,
    pub height:     usize,
}

impl Camera {
    pub const NEAR: f32 = 0.1;

    pub fn new(width: usize, height: usize) -> Self {
        Camera { eye_z: 30.0, fov_y_deg: 75.0, width, height }
    }

    /// Pixels per scene unit at unit depth.
    pub fn focal(&self) -> f32 {
        (self.height as f32 / 2.0) / (self.fov_y_deg.to_radians() / 2.0).tan()
    }

    /// Screen position and depth of `p`, or `None` when behind the near plane.
    pub fn project(&self, p: Vec3) -> Option<(f32, f32, f32)> {
        let depth = self.eye_z - p.z;
        if depth <= Self::NEAR || !depth.is_finite() { return None; }
        let f = self.focal();
        let sx = self.width  as f32 / 2.0 + p.x * f / depth;
        let sy = self.height as f32 / 2.0 - p.y * f / depth;
        Some((sx, sy, depth))
    }

    /// On-screen side length of a particle at `depth`, at least one pixel.
    pub fn point_pixels(&self, depth: f32) -> usize {
        (POINT_SIZE * self.focal() / depth).round().max(1.0) as usize
    }
}

/// Roll the whole field about Z by the sway angle for `elapsed` seconds.
pub fn sway(elapsed: f32) -> Mat3 {
    Mat3::from_rotation_z((elapsed * SWAY_RATE).sin() * SWAY_ANGLE)
}

/// Add `rgb · opacity` onto an ARGB pixel, saturating each channel.
pub fn additive(dst: u32, rgb: Vec3, opacity: f32) -> u32 {
    let add = |shift: u32, c: f32| {
        let base = (dst >> shift) & 0xFF;
        let inc  = (c.clamp(0.0, 1.0) * opacity * 255.0) as u32;
        (base + inc).min(0xFF) << shift
    };
    0xFF000000 | add(16, rgb.x) | add(8, rgb.y) | add(0, rgb.z)
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:   Window,
    buf:      Vec<u32>,
    camera:   Camera,
    sim_tx:   Sender<SimInput>,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Gesture Particles",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; width * height],
            camera: Camera::new(width, height),
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard inputs and forward them as SimInput events.
    /// Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            return false;
        }

        let finger_keys = [
            (Key::Key0, 0), (Key::Key1, 1), (Key::Key2, 2), (Key::Key3, 3), (Key::Key4, 4),
        ];
        for (key, n) in finger_keys {
            if one_shot(key) {
                let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::Fingers(n)));
            }
        }
        if one_shot(Key::H) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::ToggleHand));
        }
        if one_shot(Key::G) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::Grip));
        }
        if self.window.is_key_released(Key::G) {
            let _ = self.sim_tx.send(SimInput::KeyUp(SimKey::Grip));
        }

        true
    }

    /// Render one frame: the swayed particle field, then the overlay.
    pub fn render(
        &mut self,
        positions: &[Vec3],
        colors:    &[Vec3],
        overlay:   &[String],
        elapsed:   f32,
    ) -> Result<(), AppError> {
        self.buf.fill(BG_COLOR);

        let roll = sway(elapsed);
        for (&p, &c) in positions.iter().zip(colors) {
            let Some((sx, sy, depth)) = self.camera.project(roll * p) else { continue };
            let side = self.camera.point_pixels(depth);
            let x0 = sx - side as f32 / 2.0;
            let y0 = sy - side as f32 / 2.0;
            if x0 + (side as f32) < 0.0 || y0 + (side as f32) < 0.0 { continue; }
            self.splat(x0.max(0.0) as usize, y0.max(0.0) as usize, side, c);
        }

        self.draw_overlay(overlay);

        self.window.update_with_buffer(&self.buf, self.camera.width, self.camera.height)?;
        Ok(())
    }

    fn draw_overlay(&mut self, lines: &[String]) {
        let line_h = GLYPH_ROWS * LABEL_SCALE + LINE_GAP;
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let panel_w = widest * 8 * LABEL_SCALE + 16;
        let panel_h = lines.len() * line_h + 12;
        self.shade_rect(4, 4, panel_w, panel_h, PANEL_BG, 0.7);

        for (i, line) in lines.iter().enumerate() {
            // the last line is the detector status
            let color = if i + 1 == lines.len() { STATUS_COLOR } else { LABEL_COLOR };
            self.draw_label(line, 12, 10 + i * line_h, LABEL_SCALE, color);
        }

        let hint_y = self.camera.height.saturating_sub(GLYPH_ROWS + 8);
        self.draw_label(KEY_HINT, 8, hint_y, 1, HINT_COLOR);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn splat(&mut self, x: usize, y: usize, side: usize, rgb: Vec3) {
        let (w, h) = (self.camera.width, self.camera.height);
        for row in y..(y + side).min(h) {
            for col in x..(x + side).min(w) {
                let px = &mut self.buf[row * w + col];
                *px = additive(*px, rgb, OPACITY);
            }
        }
    }

    fn shade_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32, alpha: f32) {
        let (bw, bh) = (self.camera.width, self.camera.height);
        for row in y..(y + h).min(bh) {
            for col in x..(x + w).min(bw) {
                let px = &mut self.buf[row * bw + col];
                *px = blend(*px, color, alpha);
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        let (w, h) = (self.camera.width, self.camera.height);
        if x < w && y < h {
            self.buf[y * w + x] = color;
        }
    }

    /// 8×8 bitmap text, each font pixel drawn as a `scale`² block.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let advance = 8 * scale;
        let mut cx = x;
        for ch in text.chars() {
            if cx + advance > self.camera.width { break; }
            for (row, bits) in glyph_bits(ch).into_iter().enumerate() {
                for col in 0..8usize {
                    if bits & (1 << col) == 0 { continue; }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            self.set_pixel(cx + col * scale + dx, y + row * scale + dy, color);
                        }
                    }
                }
            }
            cx += advance;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_centre() {
        let cam = Camera::new(1024, 640);
        let (sx, sy, depth) = cam.project(Vec3::ZERO).unwrap();
        assert_eq!((sx, sy), (512.0, 320.0));
        assert_eq!(depth, 30.0);
    }

    #[test]
    fn scene_up_is_screen_up() {
        let cam = Camera::new(1024, 640);
        let (_, sy, _) = cam.project(Vec3::new(0.0, 5.0, 0.0)).unwrap();
        assert!(sy < 320.0);
        let (sx, _, _) = cam.project(Vec3::new(5.0, 0.0, 0.0)).unwrap();
        assert!(sx > 512.0);
    }

    #[test]
    fn nearer_points_spread_and_grow() {
        let cam = Camera::new(1024, 640);
        let (far_x, _, far_d)   = cam.project(Vec3::new(5.0, 0.0, -10.0)).unwrap();
        let (near_x, _, near_d) = cam.project(Vec3::new(5.0, 0.0, 10.0)).unwrap();
        assert!(near_x > far_x);
        assert!(cam.point_pixels(near_d) >= cam.point_pixels(far_d));
    }

    #[test]
    fn behind_camera_is_culled() {
        let cam = Camera::new(1024, 640);
        assert!(cam.project(Vec3::new(0.0, 0.0, 30.0)).is_none());
        assert!(cam.project(Vec3::new(0.0, 0.0, 45.0)).is_none());
    }

    #[test]
    fn fov_edge_maps_to_screen_edge() {
        let cam = Camera::new(640, 640);
        let half = (cam.fov_y_deg.to_radians() / 2.0).tan() * cam.eye_z;
        let (_, sy, _) = cam.project(Vec3::new(0.0, half, 0.0)).unwrap();
        assert!(sy.abs() < 1e-3, "top edge at {}", sy);
    }

    #[test]
    fn sway_is_a_tiny_roll() {
        assert_eq!(sway(0.0) * Vec3::X, Vec3::X);
        let p = sway(std::f32::consts::PI) * Vec3::new(10.0, 0.0, 0.0);
        assert!((p.length() - 10.0).abs() < 1e-4);
        assert!(p.y.abs() <= 10.0 * SWAY_ANGLE.sin() + 1e-4);
    }

    #[test]
    fn additive_saturates() {
        let white = Vec3::ONE;
        let once  = additive(0xFF000000, white, 0.9);
        assert_eq!(once & 0xFF, 229);
        let twice = additive(once, white, 0.9);
        assert_eq!(twice, 0xFFFFFFFF);
    }

    #[test]
    fn additive_keeps_channels_apart() {
        let px = additive(0xFF000000, Vec3::new(0.0, 0.0, 1.0), 1.0);
        assert_eq!(px, 0xFF0000FF);
    }
}
