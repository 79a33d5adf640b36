//! Lens distortion removal for horizon edge points.
//!
//! Edge points are corrected once, after extraction and before circle
//! fitting, so the fit sees pinhole geometry.

pub mod radial;

use rkyv::{Archive, Deserialize, Serialize};

use crate::Vector2;

pub use radial::RadialDistortion;

/// Lens distortion model. Coordinates are pixels relative to the optical
/// centre.
#[derive(Debug, Clone, Copy, PartialEq, Default, Archive, Serialize, Deserialize)]
pub enum Distortion {
    #[default]
    None,
    Radial(RadialDistortion),
}

impl Distortion {
    /// Observed → ideal (pinhole) coordinates.
    pub fn correct(&self, p: &Vector2) -> Vector2 {
        match self {
            Distortion::None => *p,
            Distortion::Radial(r) => r.correct(p),
        }
    }

    /// Returns `true` if no correction would be applied.
    pub fn is_none(&self) -> bool {
        match self {
            Distortion::None => true,
            Distortion::Radial(r) => r.is_zero(),
        }
    }
}
