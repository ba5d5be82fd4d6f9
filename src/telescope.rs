//! # Identification telescopes
//!
//! A telescope is an ordered subset of detectors used jointly to determine the charge number Z
//! (and optionally the mass number A) of a particle. Actual identification algorithms — ΔE-E
//! grids, pulse-shape analysis, light-response fits — live *outside* this crate behind the
//! [`ParticleIdentifier`] trait; the pipeline only consumes their [`IdentificationResult`]s.
//!
//! Results are compared across competing telescopes by the coherency override rules, which reason
//! on the [`TelescopeKind`] of each result and on its [`QualityCode`] (lower is more trustworthy).

use std::fmt;

use crate::constants::{ChargeNumber, DetectorId, MassNumber, TelescopeId};
use crate::detectors::EventData;

/// Closed set of telescope types the coherency rules distinguish.
///
/// Attempt results are stored per kind: a later attempt of the same kind overwrites the earlier
/// one in the per-particle result map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelescopeKind {
    /// Two silicon stages (ΔE-E between silicons).
    SiSi,
    /// Silicon ΔE stage backed by a scintillator.
    SiCsI,
    /// Single scintillator stage.
    CsI,
}

impl fmt::Display for TelescopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelescopeKind::SiSi => write!(f, "Si-Si"),
            TelescopeKind::SiCsI => write!(f, "Si-CsI"),
            TelescopeKind::CsI => write!(f, "CsI"),
        }
    }
}

/// Trustworthiness tag of an identification result; lower values are more trustworthy.
pub type QualityCode = u8;

/// Outcome of one identification attempt by one telescope.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationResult {
    /// Telescope that produced this result.
    pub telescope: TelescopeId,
    pub attempted: bool,
    pub succeeded: bool,
    /// Identified charge number; `None` for a neutral ("gamma") signature.
    pub z: Option<ChargeNumber>,
    /// Identified mass number; may stay `None` even when `z` is known.
    pub a: Option<MassNumber>,
    pub quality: QualityCode,
    pub comment: String,
}

impl IdentificationResult {
    /// A failed attempt (attempted but not identified).
    pub fn failure(telescope: TelescopeId, comment: impl Into<String>) -> Self {
        Self {
            telescope,
            attempted: true,
            succeeded: false,
            z: None,
            a: None,
            quality: QualityCode::MAX,
            comment: comment.into(),
        }
    }

    /// A successful identification with known Z and optional A.
    pub fn success(
        telescope: TelescopeId,
        z: ChargeNumber,
        a: Option<MassNumber>,
        quality: QualityCode,
    ) -> Self {
        Self {
            telescope,
            attempted: true,
            succeeded: true,
            z: Some(z),
            a,
            quality,
            comment: String::new(),
        }
    }

    /// A successful attempt with undefined charge: a neutral ("gamma") signature.
    pub fn gamma(telescope: TelescopeId, quality: QualityCode) -> Self {
        Self {
            telescope,
            attempted: true,
            succeeded: true,
            z: None,
            a: None,
            quality,
            comment: String::new(),
        }
    }
}

/// External identification collaborator: one telescope of the array.
///
/// Implementations must be side-effect-free with respect to the event: `identify` may be called
/// concurrently from several groups of the same event. Detectors are listed nearest-target-first,
/// so the last detector is the telescope's stopping member.
pub trait ParticleIdentifier: Send + Sync {
    /// Telescope type, key of the per-particle result map.
    fn kind(&self) -> TelescopeKind;

    /// Member detectors, ordered nearest-target-first.
    fn detectors(&self) -> &[DetectorId];

    /// True if this telescope can identify without subtracting contributions
    /// measured for neighbouring trajectories.
    fn is_independent(&self) -> bool;

    /// True if the telescope has everything it needs to run (grids loaded, stages calibrated).
    fn is_ready(&self, event: &EventData) -> bool;

    /// Attempt an identification on the current event signals.
    fn identify(&self, event: &EventData) -> IdentificationResult;

    /// True if `det` is one of the member detectors.
    fn contains_detector(&self, det: DetectorId) -> bool {
        self.detectors().contains(&det)
    }

    /// Stopping member of the telescope (deepest detector).
    fn stopping_detector(&self) -> DetectorId {
        *self
            .detectors()
            .last()
            .expect("telescope with no detectors")
    }
}
