//! # Particle seeding from fired detectors
//!
//! For each trajectory of the group, nodes are walked outward-in (outermost first). A candidate
//! particle is seeded at the first node whose detector fired and has not already been claimed as
//! a seed by another trajectory of the group, provided the stop is physically consistent: the
//! node is the outermost of its trajectory, or its immediate front-neighbour (toward the target,
//! i.e. a detector the particle must have traversed) also fired.
//!
//! A trajectory seeds at most one particle. Once seeded, every detector on the bound sub-path —
//! from the stopping node inward to the target — records the hit, and the particle's
//! identification-segment budget is initialised to that sub-path length.

use std::collections::HashSet;

use ahash::RandomState;

use crate::constants::DetectorId;
use crate::particle::Particle;
use crate::reconstruction::group::GroupReconstructor;

impl GroupReconstructor<'_> {
    /// Seed candidate particles on every trajectory of the group, then classify them.
    ///
    /// Yields at most one particle per trajectory; no detector becomes the first-fired
    /// claim of two distinct trajectory walks. Invokes the coherency classifier once
    /// after seeding if any particle resulted.
    pub(crate) fn reconstruct(&mut self) {
        let cond = self.params.fired_condition;
        let mut claimed: HashSet<DetectorId, RandomState> = HashSet::default();

        let trajectory_ids: Vec<_> = self.array.group(self.group).trajectories.clone();
        for tid in trajectory_ids {
            let traj = self.array.trajectory(tid);

            for (pos, &nid) in traj.nodes.iter().enumerate() {
                let det = self.array.node(nid).detector;

                if !self.event.fired(det, cond) || claimed.contains(&det) {
                    continue;
                }

                // The neighbour toward the target is a property of the walked trajectory,
                // not of the node: a shared node may continue differently per trajectory.
                let outermost = pos == 0;
                let front_fired = traj
                    .nodes
                    .get(pos + 1)
                    .map(|&f| self.event.fired(self.array.node(f).detector, cond))
                    .unwrap_or(false);
                if !outermost && !front_fired {
                    continue;
                }

                claimed.insert(det);
                let sub_path = &traj.nodes[pos..];
                for &n in sub_path {
                    let d = self.array.node(n).detector;
                    *self.hit_counts.entry(d).or_insert(0) += 1;
                }

                tracing::debug!(
                    group = self.group,
                    trajectory = tid,
                    stop = %self.array.detector(det).label,
                    segments = sub_path.len(),
                    "seeded particle"
                );
                self.particles
                    .push(Particle::seeded(tid, nid, sub_path.len() as u32));
                break;
            }
        }

        if !self.particles.is_empty() {
            self.analyse_particles();
        }
    }
}
