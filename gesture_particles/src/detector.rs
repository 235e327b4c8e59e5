//! Landmark detection: from LeapMotion hardware or a keyboard-driven
//! simulated hand.
//!
//! A [`LandmarkSource`] runs on its own thread at its own cadence and delivers
//! [`Detection`]s over an `mpsc` channel. The render loop drains the channel
//! once per tick through the [`Detector`] handle, so a tick always sees the
//! newest frames without any locking; a slightly stale frame is acceptable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hand_gesture::synthetic::HandPose;
use hand_gesture::{HandLandmarks, Landmark, LANDMARK_COUNT, WRIST};
use tracing::{debug, warn};

// ════════════════════════════════════════════════════════════════════════════
// Detection
// ════════════════════════════════════════════════════════════════════════════

/// One detector result: zero or more hands, in detector order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Detection {
    pub hands: Vec<HandLandmarks>,
}

impl Detection {
    pub fn none() -> Self { Detection::default() }

    pub fn single(hand: HandLandmarks) -> Self {
        Detection { hands: vec![hand] }
    }

    /// Only the first hand is ever consulted.
    pub fn first(&self) -> Option<&HandLandmarks> { self.hands.first() }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait: unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`Detection`]s over a channel until `stop` is
/// raised or the receiver goes away.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<Detection>, stop: Arc<AtomicBool>);
}

// ════════════════════════════════════════════════════════════════════════════
// Detector handle
// ════════════════════════════════════════════════════════════════════════════

/// Receiving end of a running landmark source.
pub struct Detector {
    rx:     Receiver<Detection>,
    stop:   Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    /// The source hung up and that has already been reported.
    lost:   bool,
}

/// Spawn a landmark source on its own thread.
pub fn spawn_detector<S: LandmarkSource>(source: S) -> Detector {
    let (tx, rx) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = Arc::clone(&stop);
    let handle = thread::Builder::new()
        .name("landmark-source".into())
        .spawn(move || Box::new(source).run(tx, thread_stop));
    let handle = match handle {
        Ok(h)  => Some(h),
        Err(e) => {
            warn!(error = %e, "could not start landmark source; no hands will be reported");
            None
        }
    };
    Detector { rx, stop, handle, lost: false }
}

impl Detector {
    /// Every detection that arrived since the last call, oldest first.
    ///
    /// When the source has gone away, one empty detection follows its last
    /// frame so a hand held at that moment does not stay in effect.
    pub fn drain(&mut self) -> Vec<Detection> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(d) => out.push(d),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.lost {
                        self.lost = true;
                        warn!("landmark source stopped delivering; reporting no hands");
                        out.push(Detection::none());
                    }
                    break;
                }
            }
        }
        out
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the source thread and wait for it. Never fails; a panicked
    /// source is logged and ignored.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("landmark source panicked before shutdown");
            } else {
                debug!("landmark source stopped");
            }
        }
    }
}

impl Drop for Detector {
    fn drop(&mut self) { self.shutdown(); }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Millimetres of Leap space mapped onto the unit camera square.
pub const LEAP_SPAN_MM:     f32 = 400.0;
/// Leap height (mm) that lands on the vertical centre of the camera square.
pub const LEAP_CENTER_Y_MM: f32 = 250.0;

/// Project a Leap joint (mm, y up, origin on the device) into normalized
/// camera space (y down, centre at 0.5, 0.5).
pub fn leap_to_camera(x: f32, y: f32, z: f32) -> Landmark {
    Landmark::new(
        0.5 + x / LEAP_SPAN_MM,
        0.5 - (y - LEAP_CENTER_Y_MM) / LEAP_SPAN_MM,
        z / LEAP_SPAN_MM,
    )
}

/// Assemble a 21-point set from a wrist, four thumb joints (CMC → tip) and
/// four joints (MCP, PIP, DIP, tip) for each of index, middle, ring, pinky.
pub fn assemble_hand(wrist: Landmark, thumb: [Landmark; 4], fingers: [[Landmark; 4]; 4]) -> HandLandmarks {
    let mut points = [Landmark::default(); LANDMARK_COUNT];
    points[WRIST] = wrist;
    points[1..5].copy_from_slice(&thumb);
    for (k, joints) in fingers.iter().enumerate() {
        let base = 5 + 4 * k;
        points[base..base + 4].copy_from_slice(joints);
    }
    HandLandmarks::new(points)
}

/// Landmark source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Each tracking frame's hands are projected joint-by-joint into the 21-point
/// topology; the wrist is the mean of the four finger metacarpal bases.
#[cfg(feature = "leap")]
#[derive(Debug, Default)]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<Detection>, stop: Arc<AtomicBool>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                warn!(error = ?e, "failed to create LeapC connection");
                return;
            }
        };
        if let Err(e) = connection.open() {
            warn!(error = ?e, "failed to open LeapMotion device");
            return;
        }
        debug!("LeapMotion connection open");

        while !stop.load(Ordering::Relaxed) {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands = frame.hands().filter_map(|hand| {
                    let digits: Vec<_> = hand.digits().collect();
                    if digits.len() < 5 { return None; }

                    macro_rules! joint {
                        ($v:expr) => {{ let v = $v; leap_to_camera(v.x, v.y, v.z) }};
                    }

                    let mut wx = 0.0;
                    let mut wy = 0.0;
                    let mut wz = 0.0;
                    for d in &digits[1..5] {
                        let base = d.metacarpal().prev_joint();
                        wx += base.x / 4.0;
                        wy += base.y / 4.0;
                        wz += base.z / 4.0;
                    }
                    let thumb = &digits[0];
                    let thumb_joints = [
                        joint!(thumb.proximal().prev_joint()),
                        joint!(thumb.intermediate().prev_joint()),
                        joint!(thumb.distal().prev_joint()),
                        joint!(thumb.distal().next_joint()),
                    ];
                    let mut fingers = [[Landmark::default(); 4]; 4];
                    for (k, d) in digits[1..5].iter().enumerate() {
                        fingers[k] = [
                            joint!(d.proximal().prev_joint()),
                            joint!(d.intermediate().prev_joint()),
                            joint!(d.distal().prev_joint()),
                            joint!(d.distal().next_joint()),
                        ];
                    }
                    Some(assemble_hand(leap_to_camera(wx, wy, wz), thumb_joints, fingers))
                }).collect();

                if tx.send(Detection { hands }).is_err() { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource: keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    KeyDown(SimKey),
    KeyUp(SimKey),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Fingers(u8),    // 0–4
    Grip,           // G (held)
    ToggleHand,     // H
}

/// Seconds for a held grip to go from open to a full fist.
const GRIP_RAMP_SECS: f32 = 0.6;

/// The simulated hand: a base pose, an extra closure driven by the grip
/// key, and whether the hand is in view at all.
#[derive(Clone, Debug)]
pub struct SimHand {
    pose:     HandPose,
    closure:  f32,
    gripping: bool,
    visible:  bool,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand { pose: HandPose::open(), closure: 0.0, gripping: false, visible: true }
    }
}

impl SimHand {
    pub fn apply(&mut self, input: &SimInput) {
        match *input {
            SimInput::KeyDown(SimKey::Fingers(n)) => {
                self.pose = HandPose::with_extended(n.min(4));
            }
            SimInput::KeyDown(SimKey::Grip)       => self.gripping = true,
            SimInput::KeyUp(SimKey::Grip)         => self.gripping = false,
            SimInput::KeyDown(SimKey::ToggleHand) => self.visible = !self.visible,
            SimInput::KeyUp(_)                    => {}
        }
    }

    /// Move the grip closure toward fully closed (held) or open (released).
    pub fn step(&mut self, dt: f32) {
        let delta = dt.max(0.0) / GRIP_RAMP_SECS;
        self.closure = if self.gripping {
            (self.closure + delta).min(1.0)
        } else {
            (self.closure - delta).max(0.0)
        };
    }

    pub fn closure(&self) -> f32 { self.closure }

    pub fn detection(&self) -> Detection {
        if !self.visible {
            return Detection::none();
        }
        Detection::single(self.pose.closed_by(self.closure).landmarks())
    }
}

/// Landmark source driven by [`SimInput`] events from the visualizer window.
///
/// Emits one frame every `cadence`, like a camera-paced detector would.
pub struct SimLandmarkSource {
    pub rx:      Receiver<SimInput>,
    pub cadence: Duration,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>, cadence: Duration) -> Self {
        SimLandmarkSource { rx, cadence }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<Detection>, stop: Arc<AtomicBool>) {
        let mut hand = SimHand::default();
        let mut last = Instant::now();

        while !stop.load(Ordering::Relaxed) {
            loop {
                match self.rx.try_recv() {
                    Ok(input) => hand.apply(&input),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        debug!("simulation input closed");
                        return;
                    }
                }
            }

            let now = Instant::now();
            hand.step((now - last).as_secs_f32());
            last = now;

            if tx.send(hand.detection()).is_err() { return; }
            thread::sleep(self.cadence);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::{count_fingers, grip_strength, quantify, Finger};

    #[test]
    fn finger_keys_set_pose() {
        let mut hand = SimHand::default();
        hand.apply(&SimInput::KeyDown(SimKey::Fingers(2)));
        let det = hand.detection();
        assert_eq!(count_fingers(det.first().unwrap()), 2);
    }

    #[test]
    fn held_grip_ramps_to_fist_and_back() {
        let mut hand = SimHand::default();
        hand.apply(&SimInput::KeyDown(SimKey::Grip));
        hand.step(0.3);
        assert!(hand.closure() > 0.0 && hand.closure() < 1.0);
        hand.step(1.0);
        assert_eq!(hand.closure(), 1.0);
        let g = grip_strength(hand.detection().first().unwrap());
        assert!(g > 0.9, "grip {}", g);

        hand.apply(&SimInput::KeyUp(SimKey::Grip));
        hand.step(2.0);
        assert_eq!(hand.closure(), 0.0);
    }

    #[test]
    fn hidden_hand_reports_nothing() {
        let mut hand = SimHand::default();
        hand.apply(&SimInput::KeyDown(SimKey::ToggleHand));
        let det = hand.detection();
        assert!(det.first().is_none());
        assert_eq!(quantify(det.first()).status_text, "No hands detected");
        hand.apply(&SimInput::KeyDown(SimKey::ToggleHand));
        assert!(hand.detection().first().is_some());
    }

    #[test]
    fn leap_origin_maps_to_camera_centre() {
        let p = leap_to_camera(0.0, LEAP_CENTER_Y_MM, 0.0);
        assert_eq!(p, Landmark::new(0.5, 0.5, 0.0));
        // higher above the device is further up the image (smaller y)
        assert!(leap_to_camera(0.0, LEAP_CENTER_Y_MM + 100.0, 0.0).y < 0.5);
    }

    #[test]
    fn assemble_hand_places_joints_by_topology() {
        let l = |i: usize| Landmark::planar(i as f32, 0.0);
        let hand = assemble_hand(
            l(0),
            [l(1), l(2), l(3), l(4)],
            [
                [l(5),  l(6),  l(7),  l(8)],
                [l(9),  l(10), l(11), l(12)],
                [l(13), l(14), l(15), l(16)],
                [l(17), l(18), l(19), l(20)],
            ],
        );
        for i in 0..LANDMARK_COUNT {
            assert_eq!(hand[i].x, i as f32);
        }
        assert_eq!(hand[Finger::Ring.tip()].x, 16.0);
    }

    struct DeadSource;

    impl LandmarkSource for DeadSource {
        fn run(self: Box<Self>, tx: Sender<Detection>, _stop: Arc<AtomicBool>) {
            let _ = tx.send(Detection::single(HandPose::fist().landmarks()));
        }
    }

    #[test]
    fn lost_source_reports_no_hand_once() {
        let mut detector = spawn_detector(DeadSource);
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut seen = Vec::new();
        while Instant::now() < deadline && !seen.iter().any(|d: &Detection| d.first().is_none()) {
            seen.extend(detector.drain());
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(seen.len(), 2, "{:?}", seen);
        assert!(seen[0].first().is_some());
        assert_eq!(seen[1], Detection::none());

        // reported once, not every tick
        assert!(detector.drain().is_empty());
    }

    #[test]
    fn sim_source_streams_and_stops() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let mut detector = spawn_detector(SimLandmarkSource::new(sim_rx, Duration::from_millis(5)));
        sim_tx.send(SimInput::KeyDown(SimKey::Fingers(3))).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut seen = None;
        while Instant::now() < deadline && seen.is_none() {
            seen = detector.drain().into_iter()
                .filter_map(|d| d.first().map(count_fingers))
                .find(|&n| n == 3);
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(seen, Some(3));

        detector.shutdown();
        assert!(!detector.is_running());
    }
}
