//! # glyph_field
//!
//! A cloud of N points that reshapes itself between a text silhouette and a
//! collapsed ball.
//!
//! * [`raster`]: draws a string onto an off-screen canvas and samples the
//!   "ink" pixels into sparse 3D target points.
//! * [`formation`]: the grip-strength policy that picks
//!   [`Formation::Text`] or [`Formation::Collapse`] each tick.
//! * [`field`]: owns every particle; retargets and eases them toward their
//!   targets once per tick.
//!
//! ## Quick start
//!
//! ```rust
//! use glyph_field::{FieldConfig, Formation, ParticleField};
//!
//! let mut field = ParticleField::seeded(FieldConfig::default(), 42);
//! // open hand: text formation with breathing
//! assert_eq!(field.tick("HELLO", 0.0, 0.0), Formation::Text);
//! // closed fist: collapse
//! assert_eq!(field.tick("HELLO", 0.95, 0.016), Formation::Collapse);
//! ```

pub mod font;
pub mod raster;
pub mod formation;
pub mod field;

pub use field::{approach, FieldConfig, ParticleField};
pub use formation::{select_target, Breathing, Formation, FormationPolicy};
pub use raster::{rasterize, Canvas, RasterConfig};
