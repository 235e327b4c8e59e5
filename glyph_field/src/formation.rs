//! Formation selection.
//!
//! Grip strength picks one of two formations with a hard threshold; there is
//! no numeric blend between them. While the hand is nearly open the text
//! formation also "breathes" along Z.

/// Which target shape the particles are driven toward this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Formation {
    /// Rasterized text silhouette (plus scattered leftovers).
    Text,
    /// Jittered ball around the origin, re-rolled every tick.
    Collapse,
}

/// Grip thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FormationPolicy {
    /// Grip strictly above this selects [`Formation::Collapse`].
    pub collapse_threshold:  f32,
    /// Grip strictly below this adds the breathing offset to text targets.
    pub breathing_threshold: f32,
}

impl Default for FormationPolicy {
    fn default() -> Self {
        FormationPolicy { collapse_threshold: 0.9, breathing_threshold: 0.2 }
    }
}

impl FormationPolicy {
    /// NaN grip selects [`Formation::Text`].
    pub fn select(&self, grip: f32) -> Formation {
        if grip > self.collapse_threshold { Formation::Collapse } else { Formation::Text }
    }

    pub fn breathes(&self, grip: f32) -> bool {
        grip < self.breathing_threshold
    }
}

/// Select with the default thresholds.
pub fn select_target(grip: f32) -> Formation {
    FormationPolicy::default().select(grip)
}

/// Z oscillation applied to text targets while breathing:
/// `sin(t · rate + x · spatial) · amplitude`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breathing {
    pub amplitude: f32,
    /// Radians per second.
    pub rate:      f32,
    /// Radians per scene unit along X.
    pub spatial:   f32,
}

impl Default for Breathing {
    fn default() -> Self {
        Breathing { amplitude: 0.5, rate: 2.0, spatial: 0.1 }
    }
}

impl Breathing {
    pub fn offset(&self, x: f32, elapsed: f32) -> f32 {
        (elapsed * self.rate + x * self.spatial).sin() * self.amplitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_only_above_threshold() {
        assert_eq!(select_target(0.0),  Formation::Text);
        assert_eq!(select_target(0.9),  Formation::Text);
        assert_eq!(select_target(0.91), Formation::Collapse);
        assert_eq!(select_target(1.0),  Formation::Collapse);
    }

    #[test]
    fn nan_grip_keeps_text() {
        let p = FormationPolicy::default();
        assert_eq!(p.select(f32::NAN), Formation::Text);
        assert!(!p.breathes(f32::NAN));
    }

    #[test]
    fn breathing_band() {
        let p = FormationPolicy::default();
        assert!(p.breathes(0.0));
        assert!(p.breathes(0.19));
        assert!(!p.breathes(0.2));
        assert!(!p.breathes(0.5));
    }

    #[test]
    fn breathing_offset_bounded() {
        let b = Breathing::default();
        for i in 0..200 {
            let t = i as f32 * 0.05;
            assert!(b.offset(i as f32 - 100.0, t).abs() <= b.amplitude + 1e-6);
        }
        assert_eq!(b.offset(0.0, 0.0), 0.0);
    }
}
