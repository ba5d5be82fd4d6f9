//! Reaction-target energy-loss model.
//!
//! A reconstructed particle has, at best, the kinetic energy it carried when *leaving* the
//! target. The correction back to the emission point assumes production at mid-target, so the
//! effective absorber is half the physical foil thickness.

use crate::constants::{ChargeNumber, MassNumber, MeV, Micrometer};
use crate::detectors::range_energy::RangeEnergy;
use crate::detectors::{Absorber, MaterialKind};
use crate::fragrec_errors::FragrecError;

/// The reaction target of the run.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    /// Effective absorber seen by an outgoing particle (half the foil).
    pub absorber: Absorber,
}

impl Target {
    /// Build a target from its material and full foil thickness.
    pub fn new(material: MaterialKind, foil_thickness: Micrometer) -> Self {
        Self {
            absorber: Absorber::new(material, foil_thickness / 2.0),
        }
    }

    /// Energy lost in the target by a `(z, a)` particle measured with residual energy
    /// `residual` after leaving it.
    ///
    /// The returned loss is what must be *added* to the measured energy to recover the
    /// emission energy. Zero for neutral species or non-positive residuals.
    pub fn loss_for(
        &self,
        range: &dyn RangeEnergy,
        z: ChargeNumber,
        a: MassNumber,
        residual: MeV,
    ) -> Result<MeV, FragrecError> {
        if z <= 0 || residual <= 0.0 {
            return Ok(0.0);
        }
        range.de_from_eres(&self.absorber, z, a, residual)
    }
}
