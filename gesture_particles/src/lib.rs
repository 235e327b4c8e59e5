//! # gesture_particles
//!
//! A field of glowing particles that spell out a word. Show a hand to the
//! detector: the number of raised fingers picks the word, and closing the
//! hand into a fist pulls every particle into a tight, jittering ball.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | 1 finger raised | Text becomes `HELLO` |
//! | 2 fingers raised | Text becomes `FUTURE` |
//! | 3 fingers raised | Text becomes `WORLD` |
//! | 0 or 4 fingers | Text unchanged |
//! | Fist (grip > 0.9) | Collapse into a ball around the origin |
//! | Open hand (grip < 0.2) | Text gently breathes along Z |
//! | No hand | Text unchanged, status reads `No hands detected` |
//!
//! Bindings can be overridden with `--word N=TEXT`.
//!
//! ## Pipeline
//!
//! ```text
//! LandmarkSource ──mpsc──► Detector::drain ──► quantify ──► ActiveState
//!  (own thread)                                                  │
//!                                         ParticleField::tick ◄──┘
//!                                                  │
//!                                            Visualizer::render
//! ```
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: the keyboard drives a synthetic hand.
//! * `leap`: **Hardware mode**: hand landmarks from a LeapMotion controller.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Gesture |
//! |---|---|
//! | `1`–`4` | Raise that many fingers |
//! | `0` | Fold every finger |
//! | `G` / hold | Close the hand progressively into a fist |
//! | `H` | Hand enters / leaves view |
//! | `Q` / `Escape` | Quit |

pub mod error;
pub mod detector;
pub mod state;
pub mod cue;
pub mod visualizer;
pub mod app;

pub use error::AppError;
