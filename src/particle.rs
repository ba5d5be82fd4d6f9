//! # Reconstructed particles
//!
//! A [`Particle`] is owned by the group reconstructor for the duration of one event, then moved
//! into the event's output list. All fields the pipeline *reasons* on — status, identification
//! code, calibration code, coherency code, calibration strategy — are first-class typed fields;
//! the open string-keyed [`parameters`](Particle::parameters) map carries diagnostics only and is
//! never read back by control logic.
//!
//! Back-references to the identifying telescope and to the bound trajectory are stable indices
//! into the [`DetectorArray`](crate::array::DetectorArray) tables, never owning pointers. The
//! trajectory index is *reassignable*: the coherency override rules may rebind a particle to the
//! alternative trajectory through a corrected stopping node, so that calibration walks the
//! corrected path.

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;

use crate::constants::{ChargeNumber, MassNumber, MeV, NodeId, TelescopeId, TrajectoryId};
use crate::telescope::{IdentificationResult, TelescopeKind};

/// Processing status assigned by the coherency classifier: how independently
/// this particle can be identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoherencyStatus {
    /// Nearest-to-stop telescope needs no subtraction from neighbours.
    #[default]
    Ok,
    /// Identifiable after subtracting the single other dependent particle's contribution.
    OkAfterSubtraction,
    /// Identifiable only by sharing contributions among several dependent particles
    /// (documented imprecise fallback).
    OkAfterSharing,
    /// No telescope covers this particle: it stopped in the first stage of the array.
    StoppedFirstStage,
}

impl fmt::Display for CoherencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoherencyStatus::Ok => write!(f, "OK"),
            CoherencyStatus::OkAfterSubtraction => write!(f, "OK-after-subtraction"),
            CoherencyStatus::OkAfterSharing => write!(f, "OK-after-sharing"),
            CoherencyStatus::StoppedFirstStage => write!(f, "stopped-first-stage"),
        }
    }
}

/// How the identification was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdCode {
    /// Not identified (yet).
    #[default]
    None,
    /// Identified by a telescope with a defined charge number.
    Standard,
    /// Neutral signature in a scintillator: charge stays undefined.
    Gamma,
    /// Only a minimum charge estimated from the raw loss in the first stage.
    ZMinOnly,
}

/// How the published energy was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ECode {
    #[default]
    NotCalibrated,
    /// Every contribution measured and calibrated.
    Measured,
    /// At least one contribution inferred through range-energy inversion.
    Inferred,
    /// Measured silicon stages, inferred terminal stage.
    PartiallyInferred,
    /// Undefined-charge particle given the terminal detector's proton-equivalent energy.
    SubstituteProton,
}

/// Cross-telescope coherency override applied after result selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoherencyCode {
    /// Code 1: scintillator "gamma" overridden by a Si-Si success.
    GammaOverridden,
    /// Code 2: scintillator identification replaced by the finer Si-CsI result.
    SiCsIPreferred,
    /// Code 3: Si-CsI result replaced by a smaller-Z Si-Si result (punch-through signature).
    PunchThroughCorrected,
    /// Code 4: unidentified scintillator stop adopted a Si-Si success.
    SiSiAdopted,
}

impl CoherencyCode {
    /// Numeric code recorded in diagnostics.
    pub fn as_u8(self) -> u8 {
        match self {
            CoherencyCode::GammaOverridden => 1,
            CoherencyCode::SiCsIPreferred => 2,
            CoherencyCode::PunchThroughCorrected => 3,
            CoherencyCode::SiSiAdopted => 4,
        }
    }
}

/// Calibration strategy, chosen once at identification time and dispatched on by the
/// calibration engine. Closed set: every particle carries at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibStrategy {
    /// One calibrated stage: its corrected energy is the total.
    SingleStage,
    /// Two stages, both measured and calibrated: direct sum.
    TwoStageDirect,
    /// Two stages, one measured: the other inferred by range-energy inversion.
    TwoStageInferred,
    /// Three stages, all calibrated: direct sum.
    ThreeStageDirect,
    /// Three stages, silicons measured, terminal stage inferred from the combined
    /// silicon thickness treated as one absorber.
    ThreeStagePartialInferred,
    /// Single-detector minimum-Z particle: calibrated value of that detector.
    ZMinOnly,
    /// Undefined-charge particle stopping in a calibrated terminal detector,
    /// assigned its proton-equivalent calibrated value.
    GammaAsProtonSubstitute,
}

/// One reconstructed particle of one event.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Charge number; undefined until identification succeeds.
    pub z: Option<ChargeNumber>,
    /// Mass number; may stay undefined even with known `z`.
    pub a: Option<MassNumber>,
    /// Total kinetic energy (MeV); meaningful only alongside `calibrated`.
    energy: Option<MeV>,
    /// Set atomically with `energy`.
    calibrated: bool,
    pub status: CoherencyStatus,
    pub id_code: IdCode,
    pub e_code: ECode,
    pub coherency_code: Option<CoherencyCode>,
    /// Calibration strategy carried from identification to calibration.
    pub strategy: Option<CalibStrategy>,
    /// Weak reference to the telescope that identified this particle.
    pub identifying_telescope: Option<TelescopeId>,
    /// Weak, reassignable reference to the bound trajectory.
    pub trajectory: TrajectoryId,
    /// Node the particle is currently considered to have stopped in.
    pub stopping_node: NodeId,
    /// Identification-segment budget; initialised to the bound sub-path length,
    /// non-increasing within one event.
    pub budget: u32,
    /// Target energy-loss correction already folded into `energy`, recorded separately.
    pub target_loss: MeV,
    /// Identification attempts of this event, keyed by telescope type.
    pub results: HashMap<TelescopeKind, IdentificationResult, RandomState>,
    /// Open diagnostics map (per-detector losses, coherency codes). Never read by control logic.
    pub parameters: HashMap<String, f64, RandomState>,
}

impl Particle {
    /// Seed a new particle on a trajectory, stopped at `stopping_node`, with the
    /// identification-segment budget set to the bound sub-path length.
    pub fn seeded(trajectory: TrajectoryId, stopping_node: NodeId, segments: u32) -> Self {
        Self {
            z: None,
            a: None,
            energy: None,
            calibrated: false,
            status: CoherencyStatus::default(),
            id_code: IdCode::default(),
            e_code: ECode::default(),
            coherency_code: None,
            strategy: None,
            identifying_telescope: None,
            trajectory,
            stopping_node,
            budget: segments,
            target_loss: 0.0,
            results: HashMap::default(),
            parameters: HashMap::default(),
        }
    }

    /// True once any identification route assigned a code.
    pub fn is_identified(&self) -> bool {
        self.id_code != IdCode::None
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Published total kinetic energy, if calibration completed.
    pub fn energy(&self) -> Option<MeV> {
        self.energy
    }

    /// Publish an energy; sets the calibrated flag in the same operation.
    pub(crate) fn set_energy(&mut self, energy: MeV, e_code: ECode) {
        self.energy = Some(energy);
        self.calibrated = true;
        self.e_code = e_code;
    }

    /// Add a correction on top of an already-published energy.
    pub(crate) fn add_energy(&mut self, delta: MeV) {
        debug_assert!(self.calibrated);
        if let Some(e) = self.energy.as_mut() {
            *e += delta;
        }
    }

    /// Record a diagnostic value. Diagnostics never feed back into control logic.
    pub fn set_parameter(&mut self, key: impl Into<String>, value: f64) {
        self.parameters.insert(key.into(), value);
    }

    /// Store an attempt result, overwriting any earlier attempt of the same telescope type.
    pub(crate) fn store_result(&mut self, kind: TelescopeKind, result: IdentificationResult) {
        self.results.insert(kind, result);
    }

    /// Successful result of a given telescope type, if one was stored.
    pub fn successful_result(&self, kind: TelescopeKind) -> Option<&IdentificationResult> {
        self.results.get(&kind).filter(|r| r.succeeded)
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Particle(")?;
        match self.z {
            Some(z) => write!(f, "Z={z}")?,
            None => write!(f, "Z=?")?,
        }
        if let Some(a) = self.a {
            write!(f, " A={a}")?;
        }
        match self.energy {
            Some(e) => write!(f, " E={e:.2} MeV")?,
            None => write!(f, " uncalibrated")?,
        }
        write!(f, " status={}", self.status)?;
        write!(f, ")")
    }
}
