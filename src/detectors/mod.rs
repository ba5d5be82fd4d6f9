//! # Detector proxy: detectors, absorbers, calibrations and per-event signals
//!
//! This module defines the detector-side collaborators of the reconstruction pipeline:
//!
//! 1. **Static configuration** — [`Detector`] (label, kind, absorber, optional calibration),
//!    frozen for a whole run and shared read-only between groups.
//! 2. **Per-event signals** — [`EventData`], the private mutable fired/raw-energy state of one
//!    beam-target collision.
//! 3. **Predicates and accessors** — fired/calibrated checks and raw/corrected energy lookups,
//!    the contract consumed by seeding, identification and calibration.
//!
//! Energy corrections are deliberately simple: a [`LinearCalib`] maps a raw channel value to MeV.
//! Species-dependent light response is out of scope here; a particle with undefined Z stopping in
//! a calibrated scintillator is handled upstream by the gamma-as-proton substitute strategy.

pub mod range_energy;
pub mod target;

use crate::constants::{DetectorId, MeV, Micrometer, Species};

/// Absorber material of a detector or of the reaction target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Silicon,
    CesiumIodide,
    Carbon,
    Nickel,
}

/// Sensitive layer kind, used by the coherency override rules to recognise
/// silicon- and scintillator-terminated identifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    Silicon,
    Scintillator,
}

/// A slab of material traversed by a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Absorber {
    pub material: MaterialKind,
    pub thickness: Micrometer,
}

impl Absorber {
    pub fn new(material: MaterialKind, thickness: Micrometer) -> Self {
        Self {
            material,
            thickness,
        }
    }
}

/// Linear raw-channel to MeV calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCalib {
    pub gain: f64,
    pub offset: f64,
}

impl LinearCalib {
    pub fn energy(&self, raw: f64) -> MeV {
        self.gain * raw + self.offset
    }
}

/// Static description of one detector of the array.
#[derive(Debug, Clone)]
pub struct Detector {
    /// Human-readable label (e.g. `"SI_0401"`), used in diagnostics and log messages.
    pub label: String,
    pub kind: DetectorKind,
    pub absorber: Absorber,
    /// `None` means the detector is not calibrated for this run.
    pub calib: Option<LinearCalib>,
}

impl Detector {
    pub fn new(label: impl Into<String>, kind: DetectorKind, absorber: Absorber) -> Self {
        Self {
            label: label.into(),
            kind,
            absorber,
            calib: None,
        }
    }

    /// Attach a linear calibration (builder style).
    pub fn with_calib(mut self, gain: f64, offset: f64) -> Self {
        self.calib = Some(LinearCalib { gain, offset });
        self
    }

    /// True if a calibration is available for this detector.
    ///
    /// The optional species hint is accepted for interface compatibility with
    /// species-dependent calibrations; the linear model ignores it.
    pub fn calibrated(&self, _species: Option<Species>) -> bool {
        self.calib.is_some()
    }
}

/// Condition deciding whether a raw signal counts as "fired" for seeding.
///
/// The seeding condition is configurable per run through
/// [`ReconParams`](crate::reconstruction::ReconParams).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FiredCondition {
    /// Any recorded signal counts.
    Any,
    /// Only signals strictly above the given raw threshold count.
    Above(f64),
}

impl FiredCondition {
    pub fn accepts(&self, raw: f64) -> bool {
        match self {
            FiredCondition::Any => true,
            FiredCondition::Above(th) => raw > *th,
        }
    }
}

/// Per-event mutable signal state, indexed by [`DetectorId`].
///
/// One instance per (event, task); never shared between concurrently processed events. Groups of
/// the same event may read it concurrently since reconstruction never mutates signals.
#[derive(Debug, Clone)]
pub struct EventData {
    fired: Vec<bool>,
    raw: Vec<f64>,
}

impl EventData {
    /// Create an empty event for an array of `n_detectors` detectors.
    pub fn new(n_detectors: usize) -> Self {
        Self {
            fired: vec![false; n_detectors],
            raw: vec![0.0; n_detectors],
        }
    }

    /// Record a raw signal for one detector, marking it fired.
    pub fn set_signal(&mut self, det: DetectorId, raw: f64) {
        let i = det as usize;
        self.fired[i] = true;
        self.raw[i] = raw;
    }

    /// Fired predicate under a given seeding condition.
    pub fn fired(&self, det: DetectorId, cond: FiredCondition) -> bool {
        let i = det as usize;
        self.fired[i] && cond.accepts(self.raw[i])
    }

    /// Raw (uncalibrated) signal value; zero if the detector did not fire.
    pub fn raw_energy(&self, det: DetectorId) -> f64 {
        self.raw[det as usize]
    }

    /// True if any signal was recorded for this detector, regardless of thresholds.
    pub fn has_signal(&self, det: DetectorId) -> bool {
        self.fired[det as usize]
    }

    /// Number of detectors this event was sized for.
    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

#[cfg(test)]
mod test_detectors {
    use super::*;

    fn silicon(label: &str) -> Detector {
        Detector::new(
            label,
            DetectorKind::Silicon,
            Absorber::new(MaterialKind::Silicon, 300.0),
        )
    }

    #[test]
    fn test_linear_calib() {
        let det = silicon("SI_01").with_calib(0.5, 1.0);
        assert!(det.calibrated(None));
        assert_eq!(det.calib.unwrap().energy(10.0), 6.0);
    }

    #[test]
    fn test_uncalibrated_by_default() {
        assert!(!silicon("SI_02").calibrated(Some((2, 4))));
    }

    #[test]
    fn test_fired_condition() {
        let mut event = EventData::new(3);
        event.set_signal(1, 5.0);

        assert!(event.fired(1, FiredCondition::Any));
        assert!(event.fired(1, FiredCondition::Above(4.0)));
        assert!(!event.fired(1, FiredCondition::Above(5.0)));
        assert!(!event.fired(0, FiredCondition::Any));
        assert_eq!(event.raw_energy(1), 5.0);
        assert_eq!(event.raw_energy(2), 0.0);
    }
}
