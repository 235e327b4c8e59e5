//! Synthetic upright hands for simulation and tests.
//!
//! A [`HandPose`] describes how far each non-thumb finger is curled
//! (0.0 = straight up, 1.0 = folded into the palm) and where the hand sits in
//! normalized camera space. [`HandPose::landmarks`] turns it into a full
//! 21-point set with the same topology a real detector reports.
//!
//! Lengths are expressed in palm units (wrist → middle knuckle = 1.0), so a
//! straight finger has tip-to-knuckle ratio 1.0 and a full fist about 0.25.

use crate::{Finger, HandLandmarks, Landmark, LANDMARK_COUNT, WRIST};

// ────────────────────────────────────────────────────────────────────────────
// Skeleton constants (palm units, y up toward the fingertips is negative)
// ────────────────────────────────────────────────────────────────────────────

/// Base knuckle offsets from the wrist, index → pinky.
const KNUCKLES: [(f32, f32); 4] = [(-0.30, -0.95), (0.0, -1.0), (0.28, -0.93), (0.52, -0.82)];

/// Proximal, middle and distal segment lengths; they sum to 1.0.
const SEGMENTS: [f32; 3] = [0.45, 0.30, 0.25];

/// Per-joint flexion of a fully folded finger, radians.
const FIST_FLEX: f32 = 1.7;

/// Thumb CMC → tip offsets when the hand is open, and when it is closed.
const THUMB_OPEN:   [(f32, f32); 4] = [(-0.35, -0.25), (-0.60, -0.40), (-0.78, -0.55), (-0.92, -0.68)];
const THUMB_CLOSED: [(f32, f32); 4] = [(-0.35, -0.25), (-0.50, -0.45), (-0.40, -0.60), (-0.25, -0.65)];

/// Default wrist position and palm size in normalized camera space.
const DEFAULT_WRIST: (f32, f32) = (0.5, 0.8);
const DEFAULT_PALM:  f32        = 0.2;

// ════════════════════════════════════════════════════════════════════════════
// HandPose
// ════════════════════════════════════════════════════════════════════════════

/// A camera-facing hand described by per-finger curl.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    /// Curl of index, middle, ring, pinky in `[0, 1]`.
    pub curls: [f32; 4],
    /// Wrist position (normalized x, y).
    pub wrist: (f32, f32),
    /// Palm size (wrist → middle knuckle) in normalized units.
    pub palm:  f32,
}

impl Default for HandPose {
    fn default() -> Self { HandPose::open() }
}

impl HandPose {
    pub fn open() -> Self {
        HandPose { curls: [0.0; 4], wrist: DEFAULT_WRIST, palm: DEFAULT_PALM }
    }

    pub fn fist() -> Self {
        HandPose { curls: [1.0; 4], ..HandPose::open() }
    }

    /// The first `n` fingers (index first) straight, the rest folded.
    pub fn with_extended(n: u8) -> Self {
        let mut curls = [1.0; 4];
        for c in curls.iter_mut().take(n as usize) { *c = 0.0; }
        HandPose { curls, ..HandPose::open() }
    }

    /// Move the wrist to `(x, y)`.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.wrist = (x, y);
        self
    }

    /// Set the palm size.
    pub fn sized(mut self, palm: f32) -> Self {
        self.palm = palm;
        self
    }

    /// Close every finger at least as far as `amount`.
    pub fn closed_by(mut self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        for c in self.curls.iter_mut() { *c = c.max(amount); }
        self
    }

    pub fn mean_curl(&self) -> f32 {
        self.curls.iter().sum::<f32>() / 4.0
    }

    /// Build the 21-point landmark set.
    pub fn landmarks(&self) -> HandLandmarks {
        let mut offsets = [(0.0f32, 0.0f32, 0.0f32); LANDMARK_COUNT];
        offsets[WRIST] = (0.0, 0.0, 0.0);

        // Thumb follows the mean curl of the other fingers.
        let t = self.mean_curl().clamp(0.0, 1.0);
        for (i, (open, closed)) in THUMB_OPEN.iter().zip(THUMB_CLOSED.iter()).enumerate() {
            offsets[1 + i] = (lerp(open.0, closed.0, t), lerp(open.1, closed.1, t), 0.0);
        }

        let straight = finger_chain(0.0);
        let folded   = finger_chain(FIST_FLEX);
        for (k, finger) in Finger::ALL.iter().enumerate() {
            let c = self.curls[k].clamp(0.0, 1.0);
            let (kx, ky) = KNUCKLES[k];
            for j in 0..4 {
                let (sy, sz) = straight[j];
                let (fy, fz) = folded[j];
                offsets[finger.mcp() + j] = (kx, ky + lerp(sy, fy, c), lerp(sz, fz, c));
            }
        }

        let (wx, wy) = self.wrist;
        let points = offsets.map(|(dx, dy, dz)| {
            Landmark::new(wx + dx * self.palm, wy + dy * self.palm, dz * self.palm)
        });
        HandLandmarks::new(points)
    }
}

/// MCP, PIP, DIP, tip offsets (y, z) from the knuckle for a finger whose
/// joints are each flexed by `flex` radians toward the camera.
fn finger_chain(flex: f32) -> [(f32, f32); 4] {
    let mut out = [(0.0, 0.0); 4];
    let (mut y, mut z, mut phi) = (0.0f32, 0.0f32, 0.0f32);
    for (j, len) in SEGMENTS.iter().enumerate() {
        phi += flex;
        y -= len * phi.cos();
        z -= len * phi.sin();
        out[j + 1] = (y, z);
    }
    out
}

fn lerp(a: f32, b: f32, t: f32) -> f32 { a + (b - a) * t }
