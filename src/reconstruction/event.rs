//! # Event-level reconstruction driver
//!
//! One call to [`reconstruct_event`] processes every detector group of the array against one
//! event's signals and concatenates the resulting particles in group order. Groups never share
//! detectors, so with the `parallel` feature enabled they are processed concurrently with
//! `rayon`; the output order is identical in both modes.
//!
//! [`ReconStats`] summarises an event's output for logging and quick inspection.

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;

use crate::array::DetectorArray;
use crate::constants::{GroupId, Particles};
use crate::detectors::EventData;
use crate::particle::{CoherencyStatus, ECode, IdCode};
use crate::reconstruction::group::GroupReconstructor;
use crate::reconstruction::ReconParams;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Reconstruct one event across every group of the array.
///
/// Runs the full per-group pipeline (seeding, coherency classification, identification,
/// calibration) for each group and returns the particles in group order, seeding order
/// within a group.
///
/// Arguments
/// ---------
/// * `array`: frozen array configuration shared across events.
/// * `params`: reconstruction parameters of the run.
/// * `event`: fired/raw signal state of one beam-target collision.
///
/// Return
/// ------
/// * The reconstructed [`Particles`] of the event; empty when nothing fired.
#[cfg(not(feature = "parallel"))]
pub fn reconstruct_event(
    array: &DetectorArray,
    params: &ReconParams,
    event: &EventData,
) -> Particles {
    let mut particles = Particles::new();
    for group in array.groups() {
        let mut rec = GroupReconstructor::new(array, params, event, group.id);
        rec.process();
        particles.extend(rec.into_particles());
    }
    tracing::debug!(particles = particles.len(), "event reconstructed");
    particles
}

/// Reconstruct one event across every group of the array.
///
/// Runs the full per-group pipeline (seeding, coherency classification, identification,
/// calibration) for each group and returns the particles in group order, seeding order
/// within a group. Groups are processed concurrently; the output order matches the
/// serial build.
///
/// Arguments
/// ---------
/// * `array`: frozen array configuration shared across events.
/// * `params`: reconstruction parameters of the run.
/// * `event`: fired/raw signal state of one beam-target collision.
///
/// Return
/// ------
/// * The reconstructed [`Particles`] of the event; empty when nothing fired.
#[cfg(feature = "parallel")]
pub fn reconstruct_event(
    array: &DetectorArray,
    params: &ReconParams,
    event: &EventData,
) -> Particles {
    let group_ids: Vec<_> = array.groups().map(|g| g.id).collect();
    let particles: Particles = group_ids
        .par_iter()
        .map(|&gid| {
            let mut rec = GroupReconstructor::new(array, params, event, gid);
            rec.process();
            rec.into_particles()
        })
        .flatten()
        .collect();
    tracing::debug!(particles = particles.len(), "event reconstructed");
    particles
}

/// Per-event reconstruction summary, computed from the output particle list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconStats {
    pub particles: usize,
    pub identified: usize,
    pub calibrated: usize,
    /// Particles resolved through the minimum-Z policy only.
    pub zmin_only: usize,
    /// Neutral signatures surviving as gammas.
    pub gammas: usize,
    /// Calibrations relying on at least one inferred stage.
    pub inferred: usize,
}

impl ReconStats {
    pub fn from_particles(particles: &Particles) -> Self {
        let mut stats = ReconStats {
            particles: particles.len(),
            ..Default::default()
        };
        for p in particles {
            if p.is_identified() {
                stats.identified += 1;
            }
            if p.is_calibrated() {
                stats.calibrated += 1;
            }
            match p.id_code {
                IdCode::ZMinOnly => stats.zmin_only += 1,
                IdCode::Gamma => stats.gammas += 1,
                _ => {}
            }
            if matches!(p.e_code, ECode::Inferred | ECode::PartiallyInferred) {
                stats.inferred += 1;
            }
        }
        stats
    }
}

/// Particles-per-group distribution of one event, plus counts by coherency status.
///
/// Spread numbers are computed over *occupied* groups only; an event where every group
/// stayed silent reports zeros throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupStats {
    /// Groups that produced at least one particle.
    pub occupied_groups: usize,
    pub min_per_group: usize,
    pub median_per_group: usize,
    pub max_per_group: usize,
    pub ok: usize,
    pub ok_after_subtraction: usize,
    pub ok_after_sharing: usize,
    pub stopped_first_stage: usize,
}

impl GroupStats {
    pub fn from_event(array: &DetectorArray, particles: &Particles) -> Self {
        let mut per_group: HashMap<GroupId, usize, RandomState> = HashMap::default();
        let mut stats = GroupStats::default();

        for p in particles {
            let group = array.trajectory(p.trajectory).group;
            *per_group.entry(group).or_insert(0) += 1;
            match p.status {
                CoherencyStatus::Ok => stats.ok += 1,
                CoherencyStatus::OkAfterSubtraction => stats.ok_after_subtraction += 1,
                CoherencyStatus::OkAfterSharing => stats.ok_after_sharing += 1,
                CoherencyStatus::StoppedFirstStage => stats.stopped_first_stage += 1,
            }
        }

        let mut counts: Vec<usize> = per_group.values().copied().collect();
        counts.sort_unstable();
        stats.occupied_groups = counts.len();
        if let (Some(&min), Some(&max)) = (counts.first(), counts.last()) {
            stats.min_per_group = min;
            stats.max_per_group = max;
            stats.median_per_group = counts[counts.len() / 2];
        }
        stats
    }
}

impl fmt::Display for GroupStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Group Occupancy")?;
            writeln!(f, "---------------")?;
            writeln!(f, "occupied groups    : {}", self.occupied_groups)?;
            writeln!(
                f,
                "per group          : min {} / median {} / max {}",
                self.min_per_group, self.median_per_group, self.max_per_group
            )?;
            writeln!(f, "OK                 : {}", self.ok)?;
            writeln!(f, "OK-after-subtract  : {}", self.ok_after_subtraction)?;
            writeln!(f, "OK-after-sharing   : {}", self.ok_after_sharing)?;
            write!(f, "stopped-first-stage: {}", self.stopped_first_stage)
        } else {
            write!(
                f,
                "GroupStats(groups={}, per-group={}/{}/{}, ok={}, sub={}, share={}, stopped={})",
                self.occupied_groups,
                self.min_per_group,
                self.median_per_group,
                self.max_per_group,
                self.ok,
                self.ok_after_subtraction,
                self.ok_after_sharing,
                self.stopped_first_stage,
            )
        }
    }
}

impl fmt::Display for ReconStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Event Reconstruction Summary")?;
            writeln!(f, "----------------------------")?;
            writeln!(f, "particles  : {}", self.particles)?;
            writeln!(f, "identified : {}", self.identified)?;
            writeln!(f, "calibrated : {}", self.calibrated)?;
            writeln!(f, "zmin-only  : {}", self.zmin_only)?;
            writeln!(f, "gammas     : {}", self.gammas)?;
            write!(f, "inferred   : {}", self.inferred)
        } else {
            write!(
                f,
                "ReconStats(n={}, id={}, cal={}, zmin={}, gamma={}, inferred={})",
                self.particles,
                self.identified,
                self.calibrated,
                self.zmin_only,
                self.gammas,
                self.inferred,
            )
        }
    }
}

#[cfg(test)]
mod test_event {
    use super::*;
    use crate::particle::Particle;

    #[test]
    fn test_stats_from_empty_event() {
        let stats = ReconStats::from_particles(&Particles::new());
        assert_eq!(stats, ReconStats::default());
    }

    #[test]
    fn test_stats_count_codes() {
        let mut particles = Particles::new();
        let mut p = Particle::seeded(0, 0, 1);
        p.id_code = IdCode::ZMinOnly;
        particles.push(p);
        let mut p = Particle::seeded(0, 0, 1);
        p.id_code = IdCode::Gamma;
        particles.push(p);
        particles.push(Particle::seeded(0, 0, 1));

        let stats = ReconStats::from_particles(&particles);
        assert_eq!(stats.particles, 3);
        assert_eq!(stats.identified, 2);
        assert_eq!(stats.zmin_only, 1);
        assert_eq!(stats.gammas, 1);
        assert_eq!(stats.calibrated, 0);
    }

    #[test]
    fn test_stats_display_forms() {
        let stats = ReconStats {
            particles: 4,
            identified: 3,
            calibrated: 2,
            zmin_only: 1,
            gammas: 0,
            inferred: 1,
        };
        let compact = format!("{stats}");
        assert!(compact.contains("n=4"));
        let long = format!("{stats:#}");
        assert!(long.contains("particles  : 4"));
    }
}
