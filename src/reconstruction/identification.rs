//! # Identification engine
//!
//! Attempts identification telescopes nearest-stop-first along the particle's bound sub-path,
//! cross-validates competing results, and may correct the stopping point by rebinding the
//! particle to the alternative trajectory through the corrected node.
//!
//! ## Attempt loop
//!
//! Every skip (telescope not run-ready, or inconsistent with the trajectory geometry) and every
//! failed attempt consumes one unit of the particle's identification-segment budget, initialised
//! at seeding to the bound sub-path length. When the budget reaches the configured floor the
//! engine aborts: with other dependent particles remaining in the group it requests a group
//! re-classification, otherwise the particle is simply left unidentified. No result is accepted
//! once the budget is exhausted.
//!
//! ## Acceptance and coherency overrides
//!
//! After the attempts, the first (nearest-stop) successful result whose telescope still contains
//! the current stopping detector is accepted. Scintillator- and Si-CsI-terminated acceptances are
//! then cross-checked against competing successful results of acceptable quality:
//!
//! | accepted                      | competitor        | action                              |
//! |-------------------------------|-------------------|-------------------------------------|
//! | CsI "gamma" (Z undefined)     | Si-Si             | adopt Si-Si, rebind stop, code 1    |
//! | CsI with Z defined            | Si-CsI            | prefer finer Si-CsI, rebind, code 2 |
//! | Si-CsI                        | Si-Si, smaller Z  | punch-through: adopt Si-Si, code 3  |
//! | none, stopped in scintillator | Si-Si             | adopt Si-Si, rebind stop, code 4    |
//!
//! Rebinding replaces the bound trajectory with the graph's alternative path through the new
//! stopping node, so that calibration walks the corrected path.

use crate::constants::{DetectorId, TelescopeId};
use crate::detectors::DetectorKind;
use crate::particle::{CalibStrategy, CoherencyCode, CoherencyStatus, IdCode};
use crate::reconstruction::group::GroupReconstructor;
use crate::telescope::{IdentificationResult, TelescopeKind};

/// Outcome of one identification attempt on one particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifyOutcome {
    Identified,
    Unidentified,
    /// Budget exhausted while dependent particles remain: the group must be re-classified.
    Reclassify,
}

impl GroupReconstructor<'_> {
    /// Resolve every stopped-first-stage particle through the minimum-Z policy.
    ///
    /// If the single (outermost) detector is calibrated, a minimum charge number is estimated
    /// from its energy deposit; the particle is then considered identified with
    /// [`IdCode::ZMinOnly`] and never enters the general identification path this event.
    pub fn apply_zmin_policy(&mut self) {
        for idx in 0..self.particles.len() {
            let p = &self.particles[idx];
            if p.status != CoherencyStatus::StoppedFirstStage || p.is_identified() {
                continue;
            }
            let det = self.array.node(p.stopping_node).detector;
            let Some(de) = self.array.corrected_energy(self.event, det, None) else {
                continue;
            };
            let zmin = self
                .array
                .range()
                .zmin_from_loss(&self.array.detector(det).absorber, de);

            let p = &mut self.particles[idx];
            p.z = Some(zmin);
            p.id_code = IdCode::ZMinOnly;
            p.strategy = Some(CalibStrategy::ZMinOnly);
            p.set_parameter("zmin.de", de);
            tracing::debug!(group = self.group, zmin, de, "minimum-Z policy applied");
        }
    }

    /// Run the telescope attempt loop, result selection and coherency overrides for one particle.
    pub fn identify_particle(&mut self, idx: usize) -> IdentifyOutcome {
        if self.particles[idx].is_identified() {
            return IdentifyOutcome::Identified;
        }
        if self.budget_exhausted(idx) {
            return IdentifyOutcome::Unidentified;
        }

        let telescopes = self.telescopes_for(idx);
        for tid in &telescopes {
            let tel = self.array.telescope(*tid);

            if let Some(missing) = self.detector_off_trajectory(idx, *tid) {
                tracing::warn!(
                    group = self.group,
                    telescope = *tid,
                    detector = %self.array.detector(missing).label,
                    "geometry inconsistency: telescope detector not on trajectory, attempt skipped"
                );
                if self.consume_budget(idx) {
                    return self.abort_exhausted(idx);
                }
                continue;
            }

            if !tel.is_ready(self.event) {
                if self.consume_budget(idx) {
                    return self.abort_exhausted(idx);
                }
                continue;
            }

            let result = tel.identify(self.event);
            let succeeded = result.succeeded;
            self.particles[idx].store_result(tel.kind(), result);
            if !succeeded && self.consume_budget(idx) {
                return self.abort_exhausted(idx);
            }
        }

        self.select_result(idx, &telescopes);
        self.apply_overrides(idx);

        if self.particles[idx].is_identified() {
            self.particles[idx].strategy = self.choose_strategy(idx);
            IdentifyOutcome::Identified
        } else {
            IdentifyOutcome::Unidentified
        }
    }

    fn budget_exhausted(&self, idx: usize) -> bool {
        self.particles[idx].budget <= self.params.budget_floor
    }

    /// Decrement the segment budget; true if it just reached the floor.
    fn consume_budget(&mut self, idx: usize) -> bool {
        let p = &mut self.particles[idx];
        p.budget = p.budget.saturating_sub(1);
        p.budget <= self.params.budget_floor
    }

    fn abort_exhausted(&mut self, idx: usize) -> IdentifyOutcome {
        if self.dependents_remain(idx) {
            tracing::debug!(
                group = self.group,
                "identification budget exhausted with dependents remaining, re-classifying"
            );
            IdentifyOutcome::Reclassify
        } else {
            IdentifyOutcome::Unidentified
        }
    }

    /// First member detector of `tid` that the particle's trajectory does not traverse.
    fn detector_off_trajectory(&self, idx: usize, tid: TelescopeId) -> Option<DetectorId> {
        let traj = self.array.trajectory(self.particles[idx].trajectory);
        self.array
            .telescope(tid)
            .detectors()
            .iter()
            .copied()
            .find(|&d| {
                !traj
                    .nodes
                    .iter()
                    .any(|&n| self.array.node(n).detector == d)
            })
    }

    /// Accept the first (nearest-stop) successful result whose telescope still contains
    /// the current stopping detector.
    fn select_result(&mut self, idx: usize, telescopes: &[TelescopeId]) {
        let stop_det = self.array.node(self.particles[idx].stopping_node).detector;

        let mut accepted: Option<IdentificationResult> = None;
        for &tid in telescopes {
            let kind = self.array.telescope(tid).kind();
            if let Some(r) = self.particles[idx].successful_result(kind) {
                if self.array.telescope(r.telescope).contains_detector(stop_det) {
                    accepted = Some(r.clone());
                    break;
                }
            }
        }

        if let Some(r) = accepted {
            self.accept(idx, &r, None);
        }
    }

    /// Record an accepted result on the particle; `code` is set by coherency overrides.
    fn accept(&mut self, idx: usize, result: &IdentificationResult, code: Option<CoherencyCode>) {
        let p = &mut self.particles[idx];
        p.z = result.z;
        p.a = result.a;
        p.identifying_telescope = Some(result.telescope);
        p.id_code = if result.z.is_some() {
            IdCode::Standard
        } else {
            IdCode::Gamma
        };
        if let Some(c) = code {
            p.coherency_code = Some(c);
            p.set_parameter("coherency.code", c.as_u8() as f64);
        }
    }

    /// Cross-telescope coherency overrides, applied only to scintillator- and
    /// Si-scintillator-terminated acceptances (or to scintillator stops left unidentified).
    fn apply_overrides(&mut self, idx: usize) {
        let max_q = self.params.max_override_quality;
        let competing = |p: &crate::particle::Particle, kind: TelescopeKind| {
            p.successful_result(kind)
                .filter(|r| r.quality <= max_q)
                .cloned()
        };

        let p = &self.particles[idx];
        let accepted_kind = p
            .identifying_telescope
            .map(|t| self.array.telescope(t).kind());

        match accepted_kind {
            Some(TelescopeKind::CsI) if p.z.is_none() => {
                // A scintillator "gamma" beaten by a real Si-Si identification.
                if let Some(r) = competing(p, TelescopeKind::SiSi) {
                    self.accept(idx, &r, Some(CoherencyCode::GammaOverridden));
                    self.rebind_stop(idx, r.telescope);
                }
            }
            Some(TelescopeKind::CsI) => {
                // Si-CsI carries the finer mass resolution.
                if let Some(r) = competing(p, TelescopeKind::SiCsI) {
                    self.accept(idx, &r, Some(CoherencyCode::SiCsIPreferred));
                    self.rebind_stop(idx, r.telescope);
                }
            }
            Some(TelescopeKind::SiCsI) => {
                // A strictly smaller Si-Si charge is a punch-through signature.
                if let Some(r) = competing(p, TelescopeKind::SiSi) {
                    if r.z.is_some() && r.z < p.z {
                        self.accept(idx, &r, Some(CoherencyCode::PunchThroughCorrected));
                        self.rebind_stop(idx, r.telescope);
                    }
                }
            }
            Some(TelescopeKind::SiSi) => {}
            None => {
                // Unidentified but stopped in a scintillator: adopt a Si-Si success.
                let stop_det = self.array.node(p.stopping_node).detector;
                if self.array.detector(stop_det).kind == DetectorKind::Scintillator {
                    if let Some(r) = competing(p, TelescopeKind::SiSi) {
                        self.accept(idx, &r, Some(CoherencyCode::SiSiAdopted));
                        self.rebind_stop(idx, r.telescope);
                    }
                }
            }
        }
    }

    /// Rebind the particle to the alternative trajectory through the stopping member of
    /// `tid`, so that calibration walks the corrected path.
    fn rebind_stop(&mut self, idx: usize, tid: TelescopeId) {
        let new_stop_det = self.array.telescope(tid).stopping_detector();
        let Some(node) = self
            .array
            .node_in_group_with_detector(self.group, new_stop_det)
        else {
            tracing::warn!(
                group = self.group,
                telescope = tid,
                detector = %self.array.detector(new_stop_det).label,
                "geometry inconsistency: corrected stopping detector has no node in group"
            );
            return;
        };
        let Some(traj) = self.array.alternative_trajectory_through(self.group, node) else {
            tracing::warn!(
                group = self.group,
                node,
                "no alternative trajectory through corrected stopping node"
            );
            return;
        };

        let p = &mut self.particles[idx];
        p.trajectory = traj;
        p.stopping_node = node;
    }

    /// Choose the calibration strategy carried from identification to calibration.
    ///
    /// The choice is made once, here, from the identifying telescope's stage count and the
    /// measurement state of its detectors; the calibration engine only dispatches on it.
    pub(crate) fn choose_strategy(&self, idx: usize) -> Option<CalibStrategy> {
        let p = &self.particles[idx];
        match p.id_code {
            IdCode::None => None,
            IdCode::ZMinOnly => Some(CalibStrategy::ZMinOnly),
            IdCode::Gamma => Some(CalibStrategy::GammaAsProtonSubstitute),
            IdCode::Standard => {
                let tel = self.array.telescope(p.identifying_telescope?);
                let dets = tel.detectors();
                let measured = |d: DetectorId| {
                    self.event.has_signal(d) && self.array.detector(d).calibrated(None)
                };
                let calibrated = |d: DetectorId| self.array.detector(d).calibrated(None);
                match dets.len() {
                    1 => Some(CalibStrategy::SingleStage),
                    2 => {
                        if dets.iter().all(|&d| measured(d)) {
                            Some(CalibStrategy::TwoStageDirect)
                        } else {
                            Some(CalibStrategy::TwoStageInferred)
                        }
                    }
                    3 => {
                        if dets.iter().all(|&d| measured(d) && calibrated(d)) {
                            Some(CalibStrategy::ThreeStageDirect)
                        } else {
                            Some(CalibStrategy::ThreeStagePartialInferred)
                        }
                    }
                    _ => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod test_identification {
    use super::*;
    use crate::array::DetectorArray;
    use crate::constants::{DetectorId, GroupId, NodeId, TrajectoryId};
    use crate::detectors::{Absorber, Detector, DetectorKind, EventData, MaterialKind};
    use crate::particle::{CalibStrategy, CoherencyCode, IdCode, Particle};
    use crate::reconstruction::group::GroupReconstructor;
    use crate::reconstruction::ReconParams;
    use crate::telescope::{ParticleIdentifier, TelescopeKind};

    /// Telescope replaying a pre-scripted result; `None` scripts a failed attempt.
    struct ScriptedTelescope {
        own_id: TelescopeId,
        kind: TelescopeKind,
        detectors: Vec<DetectorId>,
        independent: bool,
        ready: bool,
        script: Option<IdentificationResult>,
    }

    impl ParticleIdentifier for ScriptedTelescope {
        fn kind(&self) -> TelescopeKind {
            self.kind
        }
        fn detectors(&self) -> &[DetectorId] {
            &self.detectors
        }
        fn is_independent(&self) -> bool {
            self.independent
        }
        fn is_ready(&self, _event: &EventData) -> bool {
            self.ready
        }
        fn identify(&self, _event: &EventData) -> IdentificationResult {
            self.script
                .clone()
                .unwrap_or_else(|| IdentificationResult::failure(self.own_id, "scripted miss"))
        }
    }

    struct Line {
        array: DetectorArray,
        group: GroupId,
        /// Main trajectory CSI → SI_B → SI_A and the alternative stopping at SI_B.
        t_main: TrajectoryId,
        t_alt: TrajectoryId,
        n_csi: NodeId,
        n_sib: NodeId,
    }

    const T_CSI: TelescopeId = 0;
    const T_SICSI: TelescopeId = 1;
    const T_SISI: TelescopeId = 2;

    /// A three-stage line (SI_A, SI_B, CSI_C outward) with one telescope of each kind,
    /// all calibrated, scripts supplied per kind.
    fn line(
        csi: Option<IdentificationResult>,
        sicsi: Option<IdentificationResult>,
        sisi: Option<IdentificationResult>,
    ) -> Line {
        let mut b = DetectorArray::builder();
        let d_a = b.add_detector(Detector::new(
            "SI_A",
            DetectorKind::Silicon,
            Absorber::new(MaterialKind::Silicon, 300.0),
        ).with_calib(1.0, 0.0));
        let d_b = b.add_detector(Detector::new(
            "SI_B",
            DetectorKind::Silicon,
            Absorber::new(MaterialKind::Silicon, 500.0),
        ).with_calib(1.0, 0.0));
        let d_c = b.add_detector(Detector::new(
            "CSI_C",
            DetectorKind::Scintillator,
            Absorber::new(MaterialKind::CesiumIodide, 100_000.0),
        ).with_calib(1.0, 0.0));

        let n_csi = b.add_node(d_c);
        let n_sib = b.add_node(d_b);
        let n_sia = b.add_node(d_a);

        let t_csi = b.add_telescope(Box::new(ScriptedTelescope {
            own_id: T_CSI,
            kind: TelescopeKind::CsI,
            detectors: vec![d_c],
            independent: false,
            ready: true,
            script: csi,
        }));
        let t_sicsi = b.add_telescope(Box::new(ScriptedTelescope {
            own_id: T_SICSI,
            kind: TelescopeKind::SiCsI,
            detectors: vec![d_b, d_c],
            independent: false,
            ready: true,
            script: sicsi,
        }));
        let t_sisi = b.add_telescope(Box::new(ScriptedTelescope {
            own_id: T_SISI,
            kind: TelescopeKind::SiSi,
            detectors: vec![d_a, d_b],
            independent: false,
            ready: true,
            script: sisi,
        }));
        assert_eq!((t_csi, t_sicsi, t_sisi), (T_CSI, T_SICSI, T_SISI));

        // Per-node coverage, nearest-target-first.
        b.set_node_telescopes(n_csi, vec![t_sicsi, t_csi]);
        b.set_node_telescopes(n_sib, vec![t_sisi, t_sicsi]);
        b.set_node_telescopes(n_sia, vec![t_sisi]);

        let group = b.add_group();
        let t_main = b.add_trajectory(group, &[n_csi, n_sib, n_sia]);
        let t_alt = b.add_trajectory(group, &[n_sib, n_sia]);

        Line {
            array: b.build().unwrap(),
            group,
            t_main,
            t_alt,
            n_csi,
            n_sib,
        }
    }

    fn fired_event(array: &DetectorArray) -> EventData {
        let mut event = EventData::new(array.n_detectors());
        for d in 0..array.n_detectors() {
            event.set_signal(d as DetectorId, 10.0);
        }
        event
    }

    /// Seed a particle stopped in the scintillator (trajectory `t_main`, budget 3).
    fn stopped_in_csi(line: &Line) -> Particle {
        Particle::seeded(line.t_main, line.n_csi, 3)
    }

    #[test]
    fn test_accepts_nearest_stop_with_stopping_detector() {
        let line = line(
            None,
            Some(IdentificationResult::success(T_SICSI, 6, Some(12), 0)),
            Some(IdentificationResult::success(T_SISI, 6, Some(12), 0)),
        );
        let params = ReconParams::default();
        let event = fired_event(&line.array);
        let mut rec = GroupReconstructor::new(&line.array, &params, &event, line.group);
        rec.particles.push(stopped_in_csi(&line));

        assert_eq!(rec.identify_particle(0), IdentifyOutcome::Identified);
        let p = &rec.particles()[0];
        assert_eq!(p.identifying_telescope, Some(T_SICSI));
        assert_eq!(p.z, Some(6));
        assert_eq!(p.id_code, IdCode::Standard);
        assert_eq!(p.coherency_code, None);
        // One failed attempt (the scintillator) consumed one budget unit.
        assert_eq!(p.budget, 2);
    }

    #[test]
    fn test_gamma_overridden_by_sisi() {
        let line = line(
            Some(IdentificationResult::gamma(T_CSI, 0)),
            None,
            Some(IdentificationResult::success(T_SISI, 2, Some(4), 0)),
        );
        let params = ReconParams::default();
        let event = fired_event(&line.array);
        let mut rec = GroupReconstructor::new(&line.array, &params, &event, line.group);
        rec.particles.push(stopped_in_csi(&line));

        assert_eq!(rec.identify_particle(0), IdentifyOutcome::Identified);
        let p = &rec.particles()[0];
        assert_eq!(p.coherency_code, Some(CoherencyCode::GammaOverridden));
        assert_eq!(p.z, Some(2));
        assert_eq!(p.a, Some(4));
        assert_eq!(p.identifying_telescope, Some(T_SISI));
        // Corrected stop: the Si-Si stopping member's node, on the alternative trajectory.
        assert_eq!(p.stopping_node, line.n_sib);
        assert_eq!(p.trajectory, line.t_alt);
        assert_eq!(p.parameters["coherency.code"], 1.0);
        assert_eq!(p.strategy, Some(CalibStrategy::TwoStageDirect));
    }

    #[test]
    fn test_scintillator_yields_to_finer_sicsi() {
        let line = line(
            Some(IdentificationResult::success(T_CSI, 5, None, 1)),
            Some(IdentificationResult::success(T_SICSI, 6, Some(12), 0)),
            None,
        );
        let params = ReconParams::default();
        let event = fired_event(&line.array);
        let mut rec = GroupReconstructor::new(&line.array, &params, &event, line.group);
        rec.particles.push(stopped_in_csi(&line));

        assert_eq!(rec.identify_particle(0), IdentifyOutcome::Identified);
        let p = &rec.particles()[0];
        assert_eq!(p.coherency_code, Some(CoherencyCode::SiCsIPreferred));
        assert_eq!(p.z, Some(6));
        assert_eq!(p.identifying_telescope, Some(T_SICSI));
        // The Si-CsI stopping member is still the scintillator: same stop, same trajectory.
        assert_eq!(p.stopping_node, line.n_csi);
        assert_eq!(p.trajectory, line.t_main);
    }

    #[test]
    fn test_punch_through_corrected_by_smaller_sisi_charge() {
        let line = line(
            None,
            Some(IdentificationResult::success(T_SICSI, 8, Some(16), 0)),
            Some(IdentificationResult::success(T_SISI, 3, Some(7), 0)),
        );
        let params = ReconParams::default();
        let event = fired_event(&line.array);
        let mut rec = GroupReconstructor::new(&line.array, &params, &event, line.group);
        rec.particles.push(stopped_in_csi(&line));

        assert_eq!(rec.identify_particle(0), IdentifyOutcome::Identified);
        let p = &rec.particles()[0];
        assert_eq!(p.coherency_code, Some(CoherencyCode::PunchThroughCorrected));
        assert_eq!(p.z, Some(3));
        assert_eq!(p.stopping_node, line.n_sib);
        assert_eq!(p.trajectory, line.t_alt);
    }

    #[test]
    fn test_quality_gate_blocks_override() {
        let line = line(
            None,
            Some(IdentificationResult::success(T_SICSI, 8, Some(16), 0)),
            Some(IdentificationResult::success(T_SISI, 3, Some(7), 7)),
        );
        let params = ReconParams::default(); // max_override_quality = 3 < 7
        let event = fired_event(&line.array);
        let mut rec = GroupReconstructor::new(&line.array, &params, &event, line.group);
        rec.particles.push(stopped_in_csi(&line));

        assert_eq!(rec.identify_particle(0), IdentifyOutcome::Identified);
        let p = &rec.particles()[0];
        assert_eq!(p.coherency_code, None);
        assert_eq!(p.z, Some(8));
        assert_eq!(p.trajectory, line.t_main);
    }

    #[test]
    fn test_scintillator_stop_adopts_sisi_when_unidentified() {
        let line = line(
            None,
            None,
            Some(IdentificationResult::success(T_SISI, 2, Some(4), 0)),
        );
        let params = ReconParams::default();
        let event = fired_event(&line.array);
        let mut rec = GroupReconstructor::new(&line.array, &params, &event, line.group);
        rec.particles.push(stopped_in_csi(&line));

        assert_eq!(rec.identify_particle(0), IdentifyOutcome::Identified);
        let p = &rec.particles()[0];
        assert_eq!(p.coherency_code, Some(CoherencyCode::SiSiAdopted));
        assert_eq!(p.z, Some(2));
        assert_eq!(p.stopping_node, line.n_sib);
        assert_eq!(p.trajectory, line.t_alt);
    }

    #[test]
    fn test_budget_exhaustion_requests_reclassification() {
        let line = line(None, None, None);
        let params = ReconParams::default();
        let event = fired_event(&line.array);
        let mut rec = GroupReconstructor::new(&line.array, &params, &event, line.group);
        // Budget 2: two scripted misses reach the floor before the last telescope runs.
        rec.particles.push(Particle::seeded(line.t_main, line.n_csi, 2));
        // A dependent partner keeps re-classification worthwhile.
        rec.particles.push(Particle::seeded(line.t_alt, line.n_sib, 2));

        assert_eq!(rec.identify_particle(0), IdentifyOutcome::Reclassify);
        assert!(!rec.particles()[0].is_identified());
        assert_eq!(rec.particles()[0].budget, 0);
    }

    #[test]
    fn test_budget_exhaustion_alone_stays_unidentified() {
        let line = line(None, None, None);
        let params = ReconParams::default();
        let event = fired_event(&line.array);
        let mut rec = GroupReconstructor::new(&line.array, &params, &event, line.group);
        rec.particles.push(Particle::seeded(line.t_main, line.n_csi, 2));

        assert_eq!(rec.identify_particle(0), IdentifyOutcome::Unidentified);
    }

    #[test]
    fn test_exhausted_budget_skips_all_attempts() {
        let line = line(
            Some(IdentificationResult::gamma(T_CSI, 0)),
            None,
            None,
        );
        let params = ReconParams::default();
        let event = fired_event(&line.array);
        let mut rec = GroupReconstructor::new(&line.array, &params, &event, line.group);
        rec.particles.push(Particle::seeded(line.t_main, line.n_csi, 0));

        assert_eq!(rec.identify_particle(0), IdentifyOutcome::Unidentified);
        assert!(rec.particles()[0].results.is_empty());
    }

    #[test]
    fn test_zmin_policy_identifies_first_stage_stop() {
        let mut b = DetectorArray::builder();
        let d = b.add_detector(Detector::new(
            "SI_LONE",
            DetectorKind::Silicon,
            Absorber::new(MaterialKind::Silicon, 300.0),
        ).with_calib(1.0, 0.0));
        let n = b.add_node(d);
        let g = b.add_group();
        let t = b.add_trajectory(g, &[n]);
        let array = b.build().unwrap();

        let params = ReconParams::default();
        let mut event = EventData::new(array.n_detectors());
        event.set_signal(d, 60.0);

        let mut rec = GroupReconstructor::new(&array, &params, &event, g);
        let mut p = Particle::seeded(t, n, 1);
        p.status = crate::particle::CoherencyStatus::StoppedFirstStage;
        rec.particles.push(p);
        rec.apply_zmin_policy();

        let p = &rec.particles()[0];
        assert_eq!(p.id_code, IdCode::ZMinOnly);
        assert_eq!(p.strategy, Some(CalibStrategy::ZMinOnly));
        assert!(p.z.unwrap() >= 1);
        assert_eq!(p.parameters["zmin.de"], 60.0);
    }
}
