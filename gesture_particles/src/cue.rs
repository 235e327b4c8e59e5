//! Short MIDI cues for scene changes.
//!
//! A background thread owns the MIDI connection and plays a brief note or
//! chord whenever the app reports a text switch or a formation switch. When
//! muted, or when no output port exists, cues go to a silent backend.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

/// General MIDI program for cue notes (Celesta).
pub const CUE_PROGRAM:  u8  = 8;
pub const CUE_VELOCITY: u8  = 90;
/// How long each cue sounds.
pub const CUE_MILLIS:   u64 = 140;

// ════════════════════════════════════════════════════════════════════════════
// Cue: what happened in the scene
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// The shown text switched; pitch follows the raised-finger count.
    TextChanged { finger_count: u8 },
    /// Particles started collapsing into the ball.
    Collapse,
    /// Particles released back to the text.
    Release,
}

/// Notes sounded for `cue`.
pub fn cue_notes(cue: Cue) -> Vec<u8> {
    // C major pentatonic, one step per finger
    const STEPS: [u8; 5] = [0, 2, 4, 7, 9];
    match cue {
        Cue::TextChanged { finger_count } => {
            let step = STEPS[(finger_count as usize).min(STEPS.len() - 1)];
            vec![72 + step]
        }
        Cue::Collapse => vec![48, 55],
        Cue::Release  => vec![60, 67, 72],
    }
}

enum CueCommand {
    Play(Cue),
    Quit,
}

/// Collapse a burst of commands into the one cue worth playing: the newest.
/// `None` when a quit is anywhere in the burst.
fn newest_cue(first: CueCommand, pending: impl IntoIterator<Item = CueCommand>) -> Option<Cue> {
    let mut latest = None;
    for cmd in std::iter::once(first).chain(pending) {
        match cmd {
            CueCommand::Play(cue) => latest = Some(cue),
            CueCommand::Quit      => return None,
        }
    }
    latest
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut: abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self,  channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
    /// A silent backend has nothing to hold notes for.
    fn is_silent(&self) -> bool { false }
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
    }
}

// ── null backend (muted, or no port available) ────────────────────────────

struct NullOut;
impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)   {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8)  {}
    fn note_off(&mut self, _ch: u8, _n: u8)          {}
    fn is_silent(&self) -> bool { true }
}

/// Open the first output port, preferring a software synth.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("gesture_particles") {
        Ok(m)  => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed; cues are silent");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        info!("no MIDI output ports; cues are silent");
        return Box::new(NullOut);
    }

    let port_idx = ports.iter().position(|p| {
        midi_out.port_name(p).map(|n| {
            let n = n.to_lowercase();
            n.contains("fluid") || n.contains("timidity") || n.contains("synth")
        }).unwrap_or(false)
    }).unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
    info!(port = %name, "opening MIDI port for cues");

    match midi_out.connect(port, "gesture-cues") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            warn!(error = %e, "MIDI connect failed; cues are silent");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CuePlayer: the cue thread
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the cue thread.
pub struct CuePlayer {
    cmd_tx: Sender<CueCommand>,
    handle: Option<JoinHandle<()>>,
}

impl CuePlayer {
    /// Spawn the cue thread on `channel`. A muted player never touches MIDI.
    pub fn spawn(channel: u8, muted: bool) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<CueCommand>();

        let handle = thread::Builder::new()
            .name("midi-cues".into())
            .spawn(move || {
                let mut midi: Box<dyn MidiOut> =
                    if muted { Box::new(NullOut) } else { open_midi_output() };
                midi.program_change(channel, CUE_PROGRAM);

                // Cues that piled up while one was sounding are stale; only
                // the newest of each burst plays, so the queue never grows.
                while let Ok(first) = cmd_rx.recv() {
                    let Some(cue) = newest_cue(first, cmd_rx.try_iter()) else { break };
                    let notes = cue_notes(cue);
                    for &n in &notes { midi.note_on(channel, n, CUE_VELOCITY); }
                    if !midi.is_silent() {
                        thread::sleep(Duration::from_millis(CUE_MILLIS));
                    }
                    for &n in &notes { midi.note_off(channel, n); }
                }
            });

        let handle = match handle {
            Ok(h)  => Some(h),
            Err(e) => {
                warn!(error = %e, "could not start cue thread; cues are silent");
                None
            }
        };
        CuePlayer { cmd_tx, handle }
    }

    pub fn play(&self, cue: Cue) {
        debug!(?cue, "cue");
        let _ = self.cmd_tx.send(CueCommand::Play(cue));
    }

    /// Stop the cue thread once the cue in flight (if any) has finished.
    /// Queued cues are discarded.
    pub fn shutdown(&mut self) {
        let _ = self.cmd_tx.send(CueCommand::Quit);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("cue thread panicked before shutdown");
            }
        }
    }
}

impl Drop for CuePlayer {
    fn drop(&mut self) { self.shutdown(); }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
