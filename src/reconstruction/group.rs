//! # Group reconstructor: the per-(event, group) orchestrator
//!
//! One [`GroupReconstructor`] is built per (event, group) pair and sequences the pipeline
//! strictly: reconstruct → classify → identify → calibrate. Identification may re-enter
//! classification, but only for this group, and only through the bounded work-list loop in
//! [`process`](GroupReconstructor::process) — never through recursion — so termination is
//! guaranteed by the pass bound (the group particle count).
//!
//! The reconstructor owns the group's particles for the duration of the event and releases them
//! with [`into_particles`](GroupReconstructor::into_particles). It holds only shared references
//! to the array configuration and to the event signals, so several groups of the same event can
//! be processed concurrently.

use std::collections::HashMap;

use ahash::RandomState;

use crate::array::DetectorArray;
use crate::constants::{DetectorId, GroupId, Particles};
use crate::detectors::EventData;
use crate::particle::CoherencyStatus;
use crate::reconstruction::identification::IdentifyOutcome;
use crate::reconstruction::ReconParams;

pub struct GroupReconstructor<'a> {
    pub(crate) array: &'a DetectorArray,
    pub(crate) params: &'a ReconParams,
    pub(crate) event: &'a EventData,
    pub(crate) group: GroupId,
    pub(crate) particles: Particles,
    /// Hit multiplicity seen by each detector of the group this event (diagnostics).
    pub(crate) hit_counts: HashMap<DetectorId, u32, RandomState>,
}

impl<'a> GroupReconstructor<'a> {
    pub fn new(
        array: &'a DetectorArray,
        params: &'a ReconParams,
        event: &'a EventData,
        group: GroupId,
    ) -> Self {
        Self {
            array,
            params,
            event,
            group,
            particles: Particles::new(),
            hit_counts: HashMap::default(),
        }
    }

    /// Run the full pipeline for this group.
    ///
    /// 1. Seed particles from fired detectors; stop if none resulted.
    /// 2. Resolve all stopped-first-stage particles through the minimum-Z policy.
    /// 3. Identify `OK` particles, looping (bounded by the particle count) while
    ///    identifications land or a re-classification is requested.
    /// 4. Calibrate every identified-but-uncalibrated particle, order-independent.
    ///
    /// Identification and calibration honour their [`ReconParams`] switches independently;
    /// disabling either never affects seeding or classification.
    pub fn process(&mut self) {
        self.reconstruct();
        if self.particles.is_empty() {
            return;
        }

        if self.params.identify {
            self.apply_zmin_policy();

            // Bounded work-list: each pass may identify particles or trigger a group
            // re-classification; the pass count never exceeds the particle count.
            let bound = self.particles.len();
            for _ in 0..bound {
                let queue: Vec<usize> = (0..self.particles.len())
                    .filter(|&i| {
                        self.particles[i].status == CoherencyStatus::Ok
                            && !self.particles[i].is_identified()
                    })
                    .collect();
                if queue.is_empty() {
                    break;
                }

                let mut identified_any = false;
                let mut reclassify = false;
                for idx in queue {
                    match self.identify_particle(idx) {
                        IdentifyOutcome::Identified => identified_any = true,
                        IdentifyOutcome::Reclassify => reclassify = true,
                        IdentifyOutcome::Unidentified => {}
                    }
                }

                if !identified_any && !reclassify {
                    break;
                }
                self.analyse_particles();
            }
        }

        if self.params.calibrate {
            for idx in 0..self.particles.len() {
                if self.particles[idx].is_identified() && !self.particles[idx].is_calibrated() {
                    self.calibrate_particle(idx);
                }
            }
        }

        tracing::info!(
            group = self.group,
            particles = self.particles.len(),
            identified = self
                .particles
                .iter()
                .filter(|p| p.is_identified())
                .count(),
            calibrated = self
                .particles
                .iter()
                .filter(|p| p.is_calibrated())
                .count(),
            "group processed"
        );
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    /// Release the reconstructed particles for appending to the event output.
    pub fn into_particles(self) -> Particles {
        self.particles
    }

    /// Hit multiplicity recorded for a detector during seeding (diagnostics).
    pub fn hits(&self, det: DetectorId) -> u32 {
        self.hit_counts.get(&det).copied().unwrap_or(0)
    }
}
