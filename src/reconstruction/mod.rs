//! # Group-level reconstruction pipeline
//!
//! This module tree implements the per-group reconstruction sequence run once per (event, group)
//! pair:
//!
//! 1. [`seeding`] – seed one candidate [`Particle`](crate::particle::Particle) per trajectory
//!    from fired detectors,
//! 2. [`coherency`] – classify each particle by how independently it can be identified,
//! 3. [`identification`] – attempt telescopes nearest-stop-first, cross-validate competing
//!    results, possibly reassign stopping points and re-trigger classification,
//! 4. [`calibration`] – compute total kinetic energies by strategy dispatch, with the target
//!    energy-loss correction,
//!
//! orchestrated by [`group::GroupReconstructor`] and driven over a whole event by
//! [`event::reconstruct_event`].
//!
//! All tunable behaviour is carried by [`ReconParams`], built through a validating fluent
//! builder. The run switches for identification and calibration are explicit configuration, not
//! shared static state, so groups can be processed in parallel safely.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fragrec::reconstruction::ReconParams;
//!
//! let params = ReconParams::builder()
//!     .identify(true)
//!     .calibrate(true)
//!     .max_override_quality(3)
//!     .budget_floor(0)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;

use crate::constants::MeV;
use crate::detectors::FiredCondition;
use crate::fragrec_errors::FragrecError;
use crate::telescope::QualityCode;

pub mod calibration;
pub mod coherency;
pub mod event;
pub mod group;
pub mod identification;
pub mod seeding;

/// Configuration of one reconstruction run.
///
/// Fields
/// -----------------
/// **Run switches**
/// * `identify` – run the identification engine on classified particles.
/// * `calibrate` – run the calibration engine on identified particles.
///   Either can be disabled without affecting reconstruction (seeding + classification).
///
/// **Seeding**
/// * `fired_condition` – what counts as a fired detector when walking trajectories.
///
/// **Identification**
/// * `max_override_quality` – worst [`QualityCode`] a competing result may carry and still
///   trigger a cross-telescope coherency override.
/// * `budget_floor` – the identification-segment budget value at which attempts stop. The
///   original rule ("re-classify while dependents remain, abandon otherwise") is triggered when
///   the budget reaches this floor; keeping it explicit makes the threshold testable instead of
///   an accident of scattered conditionals.
///
/// **Calibration plausibility**
/// * `min_inferred_loss` – inferred stage contributions at or below this value (MeV) are
///   anomalies: calibration is abandoned for the particle this event.
/// * `max_inferred_loss` – inferred contributions above this value (MeV) are implausible and
///   treated the same way.
///
/// Defaults
/// -----------------
/// * `identify`: true, `calibrate`: true
/// * `fired_condition`: [`FiredCondition::Any`]
/// * `max_override_quality`: 3
/// * `budget_floor`: 0
/// * `min_inferred_loss`: 0.0 MeV, `max_inferred_loss`: 5000.0 MeV
#[derive(Debug, Clone, Copy)]
pub struct ReconParams {
    pub identify: bool,
    pub calibrate: bool,
    pub fired_condition: FiredCondition,
    pub max_override_quality: QualityCode,
    pub budget_floor: u32,
    pub min_inferred_loss: MeV,
    pub max_inferred_loss: MeV,
}

impl ReconParams {
    /// Construct parameters with default values; equivalent to [`ReconParams::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`ReconParamsBuilder`] to override defaults step by step.
    pub fn builder() -> ReconParamsBuilder {
        ReconParamsBuilder::new()
    }
}

impl Default for ReconParams {
    fn default() -> Self {
        Self {
            identify: true,
            calibrate: true,
            fired_condition: FiredCondition::Any,
            max_override_quality: 3,
            budget_floor: 0,
            min_inferred_loss: 0.0,
            max_inferred_loss: 5000.0,
        }
    }
}

/// Builder for [`ReconParams`], with validation.
#[derive(Debug, Clone)]
pub struct ReconParamsBuilder {
    params: ReconParams,
}

impl Default for ReconParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: ReconParams::default(),
        }
    }

    pub fn identify(mut self, v: bool) -> Self {
        self.params.identify = v;
        self
    }

    pub fn calibrate(mut self, v: bool) -> Self {
        self.params.calibrate = v;
        self
    }

    pub fn fired_condition(mut self, v: FiredCondition) -> Self {
        self.params.fired_condition = v;
        self
    }

    pub fn max_override_quality(mut self, v: QualityCode) -> Self {
        self.params.max_override_quality = v;
        self
    }

    pub fn budget_floor(mut self, v: u32) -> Self {
        self.params.budget_floor = v;
        self
    }

    pub fn min_inferred_loss(mut self, v: MeV) -> Self {
        self.params.min_inferred_loss = v;
        self
    }

    pub fn max_inferred_loss(mut self, v: MeV) -> Self {
        self.params.max_inferred_loss = v;
        self
    }

    /// Finalize the builder, validating parameter consistency.
    ///
    /// Validation rules
    /// -----------------
    /// * `min_inferred_loss >= 0.0` and not NaN.
    /// * `max_inferred_loss > min_inferred_loss` and not NaN.
    /// * A threshold-based fired condition must carry a non-negative, comparable threshold.
    pub fn build(self) -> Result<ReconParams, FragrecError> {
        let p = &self.params;

        if !(p.min_inferred_loss >= 0.0) {
            return Err(FragrecError::InvalidReconParameter(
                "min_inferred_loss must be non-negative".into(),
            ));
        }
        if !(p.max_inferred_loss > p.min_inferred_loss) {
            return Err(FragrecError::InvalidReconParameter(
                "max_inferred_loss must exceed min_inferred_loss".into(),
            ));
        }
        if let FiredCondition::Above(th) = p.fired_condition {
            if !(th >= 0.0) {
                return Err(FragrecError::InvalidReconParameter(
                    "fired threshold must be non-negative".into(),
                ));
            }
        }

        Ok(self.params)
    }
}

impl fmt::Display for ReconParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Reconstruction Parameters")?;
            writeln!(f, "-------------------------")?;
            writeln!(f, "identify             : {}", self.identify)?;
            writeln!(f, "calibrate            : {}", self.calibrate)?;
            writeln!(f, "fired_condition      : {:?}", self.fired_condition)?;
            writeln!(f, "max_override_quality : {}", self.max_override_quality)?;
            writeln!(f, "budget_floor         : {}", self.budget_floor)?;
            writeln!(f, "min_inferred_loss    : {:.3} MeV", self.min_inferred_loss)?;
            write!(f, "max_inferred_loss    : {:.3} MeV", self.max_inferred_loss)
        } else {
            write!(
                f,
                "ReconParams(identify={}, calibrate={}, cond={:?}, q<={}, floor={}, inferred in ({:.1}, {:.1}] MeV)",
                self.identify,
                self.calibrate,
                self.fired_condition,
                self.max_override_quality,
                self.budget_floor,
                self.min_inferred_loss,
                self.max_inferred_loss,
            )
        }
    }
}
