//! # Range-energy tables and their inversions
//!
//! The calibration engine never computes stopping powers itself: it goes through the
//! [`RangeEnergy`] trait, the seam behind which real range-energy tables live. The trait exposes
//! the three operations the pipeline needs:
//!
//! * [`de_from_eres`](RangeEnergy::de_from_eres) — energy lost in an absorber by a particle that
//!   leaves it with a known residual energy (used to infer unmeasured stages),
//! * [`eres_from_de`](RangeEnergy::eres_from_de) — residual energy of a particle that lost a known
//!   amount in an absorber (used to infer a terminal stage from measured silicon losses),
//! * [`loss_for_incident`](RangeEnergy::loss_for_incident) — forward loss for a known incident
//!   energy (used by the backward-consistency diagnostic pass),
//!
//! plus [`zmin_from_loss`](RangeEnergy::zmin_from_loss), the minimum charge number compatible with
//! a given energy deposit in a single stage, used when a particle stopped in the first stage of
//! the array.
//!
//! [`PowerLawRange`] is a closed-form reference model: `R(E) = c(material) · (A/Z²) · E^p`. It is
//! not a substitute for measured tables, but it is monotone, invertible, and cheap, which makes it
//! suitable for tests, benches and as a default model.

use crate::constants::{ChargeNumber, MassNumber, MeV, ZMIN_SCAN_MAX};
use crate::detectors::{Absorber, MaterialKind};
use crate::fragrec_errors::FragrecError;

/// Range-energy model of the array materials, and its inversions.
///
/// Implementations must be side-effect-free and callable concurrently from
/// several groups of the same event.
pub trait RangeEnergy: Send + Sync {
    /// Energy lost in `abs` by a `(z, a)` particle exiting with residual energy `eres`.
    fn de_from_eres(
        &self,
        abs: &Absorber,
        z: ChargeNumber,
        a: MassNumber,
        eres: MeV,
    ) -> Result<MeV, FragrecError>;

    /// Residual energy of a `(z, a)` particle that lost `de` while traversing `abs`.
    ///
    /// Fails if no incident energy can produce that loss in that absorber.
    fn eres_from_de(
        &self,
        abs: &Absorber,
        z: ChargeNumber,
        a: MassNumber,
        de: MeV,
    ) -> Result<MeV, FragrecError>;

    /// Energy lost in `abs` by a `(z, a)` particle entering with energy `ein`.
    ///
    /// If the particle stops inside the absorber the full incident energy is returned.
    fn loss_for_incident(
        &self,
        abs: &Absorber,
        z: ChargeNumber,
        a: MassNumber,
        ein: MeV,
    ) -> Result<MeV, FragrecError>;

    /// Minimum charge number whose punch-through energy in `abs` is at least `de`.
    ///
    /// A particle that *stopped* in `abs` after depositing `de` must carry at least this charge;
    /// lighter species would have punched through. Assumes `A = 2Z` for the scan.
    fn zmin_from_loss(&self, abs: &Absorber, de: MeV) -> ChargeNumber;
}

/// Closed-form power-law range model: `R(E) = c · (A/Z²) · E^p` micrometres.
#[derive(Debug, Clone, Copy)]
pub struct PowerLawRange {
    /// Range exponent; 1.75 reproduces the non-relativistic Bethe scaling.
    pub exponent: f64,
    /// Absolute tolerance of the Newton solve in [`eres_from_de`](RangeEnergy::eres_from_de).
    pub newton_eps: f64,
    /// Maximum Newton iterations before giving up.
    pub newton_max_it: usize,
}

impl Default for PowerLawRange {
    fn default() -> Self {
        Self {
            exponent: 1.75,
            newton_eps: 1e-9,
            newton_max_it: 100,
        }
    }
}

impl PowerLawRange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Material constant `c` in `R(E) = c · (A/Z²) · E^p` (micrometres per MeV^p).
    fn material_constant(material: MaterialKind) -> f64 {
        match material {
            MaterialKind::Silicon => 12.0,
            MaterialKind::CesiumIodide => 8.5,
            MaterialKind::Carbon => 16.0,
            MaterialKind::Nickel => 6.0,
        }
    }

    /// Species factor `k = c · A/Z²` for one absorber material.
    fn k(material: MaterialKind, z: ChargeNumber, a: MassNumber) -> f64 {
        Self::material_constant(material) * a as f64 / (z as f64 * z as f64)
    }

    /// Range of a `(z, a)` particle of energy `e` in the given material, micrometres.
    fn range(&self, material: MaterialKind, z: ChargeNumber, a: MassNumber, e: MeV) -> f64 {
        Self::k(material, z, a) * e.powf(self.exponent)
    }

    /// Punch-through energy: incident energy whose range equals the absorber thickness.
    fn punch_through(&self, abs: &Absorber, z: ChargeNumber, a: MassNumber) -> MeV {
        (abs.thickness / Self::k(abs.material, z, a)).powf(1.0 / self.exponent)
    }
}

impl RangeEnergy for PowerLawRange {
    fn de_from_eres(
        &self,
        abs: &Absorber,
        z: ChargeNumber,
        a: MassNumber,
        eres: MeV,
    ) -> Result<MeV, FragrecError> {
        let k = Self::k(abs.material, z, a);
        // R(ein) = R(eres) + thickness, then de = ein - eres.
        let ein = (eres.max(0.0).powf(self.exponent) + abs.thickness / k).powf(1.0 / self.exponent);
        Ok(ein - eres.max(0.0))
    }

    fn eres_from_de(
        &self,
        abs: &Absorber,
        z: ChargeNumber,
        a: MassNumber,
        de: MeV,
    ) -> Result<MeV, FragrecError> {
        // Solve R(eres + de) - R(eres) = thickness for eres >= 0.
        // The left-hand side grows with eres (p > 1), so a solution exists iff
        // R(de) <= thickness, i.e. the requested loss does not exceed the
        // maximum loss this absorber can extract from the species.
        if self.range(abs.material, z, a, de) > abs.thickness {
            return Err(FragrecError::RangeSolverDiverged {
                material: abs.material,
                thickness: abs.thickness,
                de,
            });
        }

        let k = Self::k(abs.material, z, a);
        let p = self.exponent;
        let f = |eres: f64| k * ((eres + de).powf(p) - eres.powf(p)) - abs.thickness;
        let df = |eres: f64| k * p * ((eres + de).powf(p - 1.0) - eres.powf(p - 1.0));

        let mut eres = de.max(self.punch_through(abs, z, a));
        for _ in 0..self.newton_max_it {
            let fx = f(eres);
            if fx.abs() < self.newton_eps {
                return Ok(eres);
            }
            let dfx = df(eres);
            if dfx.abs() < f64::EPSILON {
                break;
            }
            eres = (eres - fx / dfx).max(0.0);
        }

        Err(FragrecError::RangeSolverDiverged {
            material: abs.material,
            thickness: abs.thickness,
            de,
        })
    }

    fn loss_for_incident(
        &self,
        abs: &Absorber,
        z: ChargeNumber,
        a: MassNumber,
        ein: MeV,
    ) -> Result<MeV, FragrecError> {
        if ein <= 0.0 {
            return Ok(0.0);
        }
        let k = Self::k(abs.material, z, a);
        let p = self.exponent;
        if self.range(abs.material, z, a, ein) <= abs.thickness {
            // Stops inside: the absorber takes everything.
            return Ok(ein);
        }
        let eres = (ein.powf(p) - abs.thickness / k).powf(1.0 / p);
        Ok(ein - eres)
    }

    fn zmin_from_loss(&self, abs: &Absorber, de: MeV) -> ChargeNumber {
        // Punch-through energy grows with Z (k shrinks as 2c/Z for A = 2Z), so the
        // scan terminates at the first charge able to hold the whole deposit.
        for z in 1..=ZMIN_SCAN_MAX {
            if self.punch_through(abs, z, 2 * z) >= de {
                return z;
            }
        }
        ZMIN_SCAN_MAX
    }
}
