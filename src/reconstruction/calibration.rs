//! # Calibration engine
//!
//! Turns an identified particle into a published total kinetic energy. The strategy was chosen
//! at identification time from the identifying telescope's stage count and the measurement state
//! of its detectors; this module only dispatches on it.
//!
//! Stages a telescope could not measure are inferred through the array's
//! [`RangeEnergy`](crate::detectors::range_energy::RangeEnergy) model. Every inferred
//! contribution goes through a plausibility window `(min_inferred_loss, max_inferred_loss]`;
//! an implausible or non-invertible inference abandons the calibration and leaves the particle
//! uncalibrated rather than publishing a wrong energy.
//!
//! Once an energy is published, two closing steps run for charged particles:
//!
//! 1. a backward consistency pass re-walks the bound sub-path target-outward, splitting the
//!    published energy into per-detector losses recorded as `eloss.<label>` diagnostics,
//! 2. the reaction-target correction adds the energy lost in the half target thickness on the
//!    way out, recorded both in the particle's `target_loss` field and as `target.eloss`.
//!
//! Undefined-charge particles (gamma substitutes) skip both steps.

use crate::constants::{ChargeNumber, DetectorId, MassNumber, MeV, PROTON_A, PROTON_Z};
use crate::fragrec_errors::FragrecError;
use crate::particle::{CalibStrategy, ECode};
use crate::reconstruction::group::GroupReconstructor;

impl GroupReconstructor<'_> {
    /// Calibrate one identified particle according to its strategy.
    ///
    /// Leaves the particle uncalibrated when a required stage cannot be measured or
    /// plausibly inferred.
    pub(crate) fn calibrate_particle(&mut self, idx: usize) {
        let Some(strategy) = self.particles[idx].strategy else {
            tracing::debug!(group = self.group, "identified particle with no strategy");
            return;
        };

        match strategy {
            CalibStrategy::ZMinOnly => self.calibrate_stopping_detector(idx, None, ECode::Measured),
            CalibStrategy::GammaAsProtonSubstitute => self.calibrate_stopping_detector(
                idx,
                Some((PROTON_Z, PROTON_A)),
                ECode::SubstituteProton,
            ),
            CalibStrategy::SingleStage => self.calibrate_direct(idx),
            CalibStrategy::TwoStageDirect => self.calibrate_direct(idx),
            CalibStrategy::TwoStageInferred => self.calibrate_two_stage_inferred(idx),
            CalibStrategy::ThreeStageDirect => self.calibrate_direct(idx),
            CalibStrategy::ThreeStagePartialInferred => self.calibrate_partial_inferred(idx),
        }

        if self.particles[idx].is_calibrated() && self.particles[idx].z.is_some() {
            self.backward_consistency_pass(idx);
            self.apply_target_correction(idx);
        }
    }

    /// Charge and mass the range-energy model works with; mass defaults to `2Z`.
    fn species_of(&self, idx: usize) -> Option<(ChargeNumber, MassNumber)> {
        let p = &self.particles[idx];
        let z = p.z?;
        Some((z, p.a.unwrap_or(2 * z)))
    }

    fn member_detectors(&self, idx: usize) -> Option<Vec<DetectorId>> {
        let tid = self.particles[idx].identifying_telescope?;
        Some(self.array.telescope(tid).detectors().to_vec())
    }

    /// Single calibrated detector, no telescope: the stopping detector's corrected value.
    fn calibrate_stopping_detector(
        &mut self,
        idx: usize,
        species: Option<(ChargeNumber, MassNumber)>,
        e_code: ECode,
    ) {
        let det = self.array.node(self.particles[idx].stopping_node).detector;
        let Some(e) = self.array.corrected_energy(self.event, det, species) else {
            return;
        };
        let label = self.array.detector(det).label.clone();
        let p = &mut self.particles[idx];
        p.set_parameter(format!("de.{label}"), e);
        p.set_energy(e, e_code);
    }

    /// Every stage measured and calibrated: direct sum of corrected values.
    fn calibrate_direct(&mut self, idx: usize) {
        let Some(dets) = self.member_detectors(idx) else {
            return;
        };
        let species = self.species_of(idx);

        let mut total = 0.0;
        for &det in &dets {
            let Some(de) = self.array.corrected_energy(self.event, det, species) else {
                tracing::warn!(
                    group = self.group,
                    detector = %self.array.detector(det).label,
                    "direct calibration on an uncalibrated stage, abandoned"
                );
                return;
            };
            let label = self.array.detector(det).label.clone();
            self.particles[idx].set_parameter(format!("de.{label}"), de);
            total += de;
        }
        self.particles[idx].set_energy(total, ECode::Measured);
    }

    /// Two stages, exactly one measured: the other stage is inferred by range-energy
    /// inversion, checked for plausibility, then summed in.
    fn calibrate_two_stage_inferred(&mut self, idx: usize) {
        let Some(dets) = self.member_detectors(idx) else {
            return;
        };
        let Some((z, a)) = self.species_of(idx) else {
            return;
        };
        let [de_det, stop_det] = dets[..] else {
            return;
        };
        let species = Some((z, a));

        let de_meas = self.measured_energy(de_det, species);
        let stop_meas = self.measured_energy(stop_det, species);

        let (measured_det, inferred_det, de, inferred) = match (de_meas, stop_meas) {
            (Some(de), None) => {
                // Forward stage measured: residual after it is the terminal contribution.
                let abs = self.array.detector(de_det).absorber;
                match self.array.range().eres_from_de(&abs, z, a, de) {
                    Ok(eres) => (de_det, stop_det, de, eres),
                    Err(err) => {
                        tracing::warn!(group = self.group, z, a, %err, "stage inference failed");
                        return;
                    }
                }
            }
            (None, Some(eres)) => {
                // Terminal stage measured: the forward loss follows from the residual.
                let abs = self.array.detector(de_det).absorber;
                match self.array.range().de_from_eres(&abs, z, a, eres) {
                    Ok(de) => (stop_det, de_det, eres, de),
                    Err(err) => {
                        tracing::warn!(group = self.group, z, a, %err, "stage inference failed");
                        return;
                    }
                }
            }
            _ => {
                tracing::warn!(
                    group = self.group,
                    "two-stage inference expects exactly one measured stage, abandoned"
                );
                return;
            }
        };

        if !self.plausible_inferred(inferred_det, z, a, inferred) {
            return;
        }

        let m_label = self.array.detector(measured_det).label.clone();
        let i_label = self.array.detector(inferred_det).label.clone();
        let p = &mut self.particles[idx];
        p.set_parameter(format!("de.{m_label}"), de);
        p.set_parameter(format!("de.{i_label}"), inferred);
        p.set_parameter(format!("de.{i_label}.inferred"), 1.0);
        p.set_energy(de + inferred, ECode::Inferred);
    }

    /// Three stages with measured silicons and an unmeasured terminal stage: the two silicon
    /// thicknesses are treated as one absorber and the residual behind them is inferred.
    fn calibrate_partial_inferred(&mut self, idx: usize) {
        let Some(dets) = self.member_detectors(idx) else {
            return;
        };
        let Some((z, a)) = self.species_of(idx) else {
            return;
        };
        let [si1, si2, stop] = dets[..] else {
            return;
        };
        let species = Some((z, a));

        let (Some(de1), Some(de2)) = (
            self.measured_energy(si1, species),
            self.measured_energy(si2, species),
        ) else {
            tracing::warn!(
                group = self.group,
                "partial inference needs both silicon stages measured, abandoned"
            );
            return;
        };
        if de1 <= 0.0 || de2 <= 0.0 {
            return;
        }

        let mut combined = self.array.detector(si1).absorber;
        combined.thickness += self.array.detector(si2).absorber.thickness;

        let eres = match self.array.range().eres_from_de(&combined, z, a, de1 + de2) {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(group = self.group, z, a, %err, "terminal stage inference failed");
                return;
            }
        };
        if !self.plausible_inferred(stop, z, a, eres) {
            return;
        }

        let l1 = self.array.detector(si1).label.clone();
        let l2 = self.array.detector(si2).label.clone();
        let l3 = self.array.detector(stop).label.clone();
        let p = &mut self.particles[idx];
        p.set_parameter(format!("de.{l1}"), de1);
        p.set_parameter(format!("de.{l2}"), de2);
        p.set_parameter(format!("de.{l3}"), eres);
        p.set_parameter(format!("de.{l3}.inferred"), 1.0);
        p.set_energy(de1 + de2 + eres, ECode::PartiallyInferred);
    }

    /// Corrected energy of a detector that actually fired; `None` for silent or
    /// uncalibrated detectors.
    fn measured_energy(
        &self,
        det: DetectorId,
        species: Option<(ChargeNumber, MassNumber)>,
    ) -> Option<MeV> {
        if !self.event.has_signal(det) {
            return None;
        }
        self.array.corrected_energy(self.event, det, species)
    }

    /// Plausibility window for an inferred stage contribution.
    fn plausible_inferred(&self, det: DetectorId, z: ChargeNumber, a: MassNumber, value: MeV) -> bool {
        if value > self.params.min_inferred_loss && value <= self.params.max_inferred_loss {
            return true;
        }
        let err = FragrecError::EnergyLossInversion {
            z,
            a,
            detector: det,
            value,
        };
        tracing::warn!(
            group = self.group,
            detector = %self.array.detector(det).label,
            min = self.params.min_inferred_loss,
            max = self.params.max_inferred_loss,
            %err,
            "inferred stage contribution outside plausibility window, calibration abandoned"
        );
        false
    }

    /// Re-walk the bound sub-path target-outward, splitting the published energy into
    /// per-detector losses recorded as `eloss.<label>` diagnostics.
    ///
    /// Diagnostics only: the published energy is never modified here.
    fn backward_consistency_pass(&mut self, idx: usize) {
        let Some((z, a)) = self.species_of(idx) else {
            return;
        };
        let Some(total) = self.particles[idx].energy() else {
            return;
        };

        let traj = self.array.trajectory(self.particles[idx].trajectory);
        let sub_path = traj.sub_path_from(self.particles[idx].stopping_node);

        let mut remaining = total;
        // Sub-paths run stopping-node-first; the particle traversed them the other way.
        for &node in sub_path.iter().rev() {
            if remaining <= crate::constants::ENERGY_EPS {
                break;
            }
            let det = self.array.node(node).detector;
            let abs = self.array.detector(det).absorber;
            let loss = match self.array.range().loss_for_incident(&abs, z, a, remaining) {
                Ok(l) => l,
                Err(err) => {
                    tracing::warn!(group = self.group, z, a, %err, "consistency pass aborted");
                    return;
                }
            };
            let label = self.array.detector(det).label.clone();
            self.particles[idx].set_parameter(format!("eloss.{label}"), loss);
            remaining -= loss;
        }
    }

    /// Add the energy lost in the half target thickness on the way out of the reaction.
    fn apply_target_correction(&mut self, idx: usize) {
        let Some((z, a)) = self.species_of(idx) else {
            return;
        };
        let Some(energy) = self.particles[idx].energy() else {
            return;
        };
        if z <= 0 || energy <= 0.0 {
            return;
        }

        let loss = match self.array.target().loss_for(self.array.range(), z, a, energy) {
            Ok(l) => l,
            Err(err) => {
                tracing::warn!(group = self.group, z, a, %err, "target correction failed");
                return;
            }
        };
        if loss > 0.0 {
            let p = &mut self.particles[idx];
            p.add_energy(loss);
            p.target_loss = loss;
            p.set_parameter("target.eloss", loss);
        }
    }
}
