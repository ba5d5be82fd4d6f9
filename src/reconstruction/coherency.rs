//! # Coherency classification
//!
//! Assigns each unidentified particle a [`CoherencyStatus`] describing how independently it can
//! be identified:
//!
//! * `OK` — the nearest-to-stop telescope needs no subtraction from neighbouring trajectories;
//! * `OK-after-subtraction` — identification requires subtracting the contribution of exactly one
//!   other dependent particle of the group;
//! * `OK-after-sharing` — several dependent particles compete for the same stages; contributions
//!   must be shared (documented imprecise fallback);
//! * `stopped-first-stage` — no telescope covers the particle at all.
//!
//! The classification is idempotent and re-runnable: it reads only the current set of
//! unidentified particles, so identifying a particle and re-running the analysis can only
//! *promote* the remaining ones. A dependent particle whose last dependent partner has been
//! identified is promoted to `OK` — there is nothing left to subtract.

use itertools::Itertools;

use crate::constants::TelescopeId;
use crate::particle::CoherencyStatus;
use crate::reconstruction::group::GroupReconstructor;

impl GroupReconstructor<'_> {
    /// Telescopes able to identify a particle, ordered nearest-stop-first.
    ///
    /// Walks the bound sub-path from the stopping node inward; each node's telescope list is
    /// stored nearest-target-first and therefore reversed. Duplicates keep their first
    /// (nearest-stop) position.
    pub(crate) fn telescopes_for(&self, idx: usize) -> Vec<TelescopeId> {
        let p = &self.particles[idx];
        let traj = self.array.trajectory(p.trajectory);
        traj.sub_path_from(p.stopping_node)
            .iter()
            .flat_map(|&n| self.array.node(n).telescopes.iter().rev().copied())
            .unique()
            .collect()
    }

    /// True if the particle has at least one telescope and none of them is independent.
    fn dependent_only(&self, idx: usize) -> bool {
        let tels = self.telescopes_for(idx);
        !tels.is_empty()
            && tels
                .iter()
                .all(|&t| !self.array.telescope(t).is_independent())
    }

    /// Re-classify every unidentified particle of the group. Idempotent.
    pub fn analyse_particles(&mut self) {
        // Snapshot first: statuses must reflect one coherent view of the group.
        let dependent_only: Vec<bool> = (0..self.particles.len())
            .map(|i| !self.particles[i].is_identified() && self.dependent_only(i))
            .collect();

        for idx in 0..self.particles.len() {
            if self.particles[idx].is_identified() {
                continue;
            }

            let tels = self.telescopes_for(idx);
            let status = if tels.is_empty() {
                CoherencyStatus::StoppedFirstStage
            } else if self.array.telescope(tels[0]).is_independent() {
                CoherencyStatus::Ok
            } else {
                let other_dependents = (0..self.particles.len())
                    .filter(|&j| j != idx && dependent_only[j])
                    .count();
                match other_dependents {
                    0 => CoherencyStatus::Ok,
                    1 => CoherencyStatus::OkAfterSubtraction,
                    _ => CoherencyStatus::OkAfterSharing,
                }
            };

            let p = &mut self.particles[idx];
            p.status = status;
            p.set_parameter("coherency.status", status as u8 as f64);
        }
    }

    /// True if any *other* unidentified particle of the group still depends on
    /// subtraction or sharing to be identified.
    pub(crate) fn dependents_remain(&self, idx: usize) -> bool {
        (0..self.particles.len())
            .any(|j| j != idx && !self.particles[j].is_identified() && self.dependent_only(j))
    }
}
