//! # DetectorArray: geometry, detectors, telescopes and physics models
//!
//! This module defines the [`DetectorArray`] struct, the central façade that wires together:
//!
//! 1. **Detector configuration** — [`Detector`](crate::detectors::Detector) records with
//!    absorbers and calibrations, indexed by stable [`DetectorId`]s.
//! 2. **Trajectory graph** — node/trajectory/group tables built once per run by the external
//!    geometry subsystem (see [`geometry`](crate::geometry)).
//! 3. **Identification telescopes** — [`ParticleIdentifier`](crate::telescope::ParticleIdentifier)
//!    trait objects, indexed by [`TelescopeId`]s.
//! 4. **Physics models** — the [`RangeEnergy`](crate::detectors::range_energy::RangeEnergy) model
//!    and the reaction [`Target`](crate::detectors::target::Target).
//!
//! The array is immutable during reconstruction and shared read-only between groups, so groups of
//! one event may be processed in parallel against a single instance. All cross-references inside
//! the array (and from particles back into it) are plain indices into these tables; the tables
//! outlive every per-event particle.
//!
//! ## Panics & errors
//!
//! Accessors taking ids produced by [`DetectorArrayBuilder`] index directly and panic on a
//! foreign id; that is a construction bug, not an event-level failure. Everything event-level
//! returns `Result` or `Option`.

use once_cell::sync::OnceCell;
use std::collections::HashMap;

use ahash::RandomState;

use crate::constants::{DetectorId, GroupId, MeV, NodeId, Species, TelescopeId, TrajectoryId};
use crate::detectors::range_energy::{PowerLawRange, RangeEnergy};
use crate::detectors::target::Target;
use crate::detectors::{Detector, EventData, MaterialKind};
use crate::fragrec_errors::FragrecError;
use crate::geometry::{DetectorGroup, DetectorNode, Trajectory};
use crate::telescope::ParticleIdentifier;

pub struct DetectorArray {
    detectors: Vec<Detector>,
    nodes: Vec<DetectorNode>,
    trajectories: Vec<Trajectory>,
    groups: Vec<DetectorGroup>,
    telescopes: Vec<Box<dyn ParticleIdentifier>>,
    range: Box<dyn RangeEnergy>,
    target: Target,
    /// Lazily built (group, detector) → node lookup used by trajectory reassignment.
    node_index: OnceCell<HashMap<(GroupId, DetectorId), NodeId, RandomState>>,
}

impl DetectorArray {
    /// Start building an array configuration.
    pub fn builder() -> DetectorArrayBuilder {
        DetectorArrayBuilder::new()
    }

    pub fn n_detectors(&self) -> usize {
        self.detectors.len()
    }

    pub fn detector(&self, id: DetectorId) -> &Detector {
        &self.detectors[id as usize]
    }

    pub fn node(&self, id: NodeId) -> &DetectorNode {
        &self.nodes[id as usize]
    }

    pub fn trajectory(&self, id: TrajectoryId) -> &Trajectory {
        &self.trajectories[id as usize]
    }

    pub fn group(&self, id: GroupId) -> &DetectorGroup {
        &self.groups[id as usize]
    }

    pub fn telescope(&self, id: TelescopeId) -> &dyn ParticleIdentifier {
        self.telescopes[id as usize].as_ref()
    }

    pub fn groups(&self) -> impl Iterator<Item = &DetectorGroup> {
        self.groups.iter()
    }

    /// Trajectories of one group, in registration order.
    pub fn trajectories_of(&self, group: GroupId) -> impl Iterator<Item = &Trajectory> {
        self.groups[group as usize]
            .trajectories
            .iter()
            .map(move |&t| &self.trajectories[t as usize])
    }

    /// Range-energy model of the array materials.
    pub fn range(&self) -> &dyn RangeEnergy {
        self.range.as_ref()
    }

    /// Reaction target of the run.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Corrected (calibrated) energy of one detector for this event.
    ///
    /// Returns `None` if the detector carries no calibration; `Some(0.0)` if it did not fire.
    /// The species hint is forwarded to species-dependent calibrations.
    pub fn corrected_energy(
        &self,
        event: &EventData,
        det: DetectorId,
        species: Option<Species>,
    ) -> Option<MeV> {
        let d = self.detector(det);
        if !d.calibrated(species) {
            return None;
        }
        if !event.has_signal(det) {
            return Some(0.0);
        }
        d.calib.as_ref().map(|c| c.energy(event.raw_energy(det)))
    }

    /// Node of `group` carrying `detector`, if any.
    pub fn node_in_group_with_detector(
        &self,
        group: GroupId,
        detector: DetectorId,
    ) -> Option<NodeId> {
        let index = self.node_index.get_or_init(|| {
            let mut map: HashMap<(GroupId, DetectorId), NodeId, RandomState> = HashMap::default();
            for g in &self.groups {
                for &t in &g.trajectories {
                    for &n in &self.trajectories[t as usize].nodes {
                        map.insert((g.id, self.nodes[n as usize].detector), n);
                    }
                }
            }
            map
        });
        index.get(&(group, detector)).copied()
    }

    /// Alternative trajectory of `group` stopping at `node`.
    ///
    /// Preference goes to a trajectory whose *outermost* node is `node` (the particle is now
    /// considered to stop there); failing that, any trajectory of the group traversing `node`.
    pub fn alternative_trajectory_through(
        &self,
        group: GroupId,
        node: NodeId,
    ) -> Option<TrajectoryId> {
        let g = &self.groups[group as usize];
        g.trajectories
            .iter()
            .copied()
            .find(|&t| self.trajectories[t as usize].nodes.first() == Some(&node))
            .or_else(|| {
                g.trajectories
                    .iter()
                    .copied()
                    .find(|&t| self.trajectories[t as usize].position_of(node).is_some())
            })
    }
}

/// Builder assembling the array tables; finalized by [`build`](DetectorArrayBuilder::build).
pub struct DetectorArrayBuilder {
    detectors: Vec<Detector>,
    nodes: Vec<DetectorNode>,
    trajectories: Vec<Trajectory>,
    groups: Vec<DetectorGroup>,
    telescopes: Vec<Box<dyn ParticleIdentifier>>,
    range: Box<dyn RangeEnergy>,
    target: Target,
}

impl Default for DetectorArrayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorArrayBuilder {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            nodes: Vec::new(),
            trajectories: Vec::new(),
            groups: Vec::new(),
            telescopes: Vec::new(),
            range: Box::new(PowerLawRange::new()),
            target: Target::new(MaterialKind::Carbon, 50.0),
        }
    }

    /// Register a detector and return its stable id.
    pub fn add_detector(&mut self, det: Detector) -> DetectorId {
        self.detectors.push(det);
        (self.detectors.len() - 1) as DetectorId
    }

    /// Register a graph node for a detector and return its stable id.
    pub fn add_node(&mut self, detector: DetectorId) -> NodeId {
        self.nodes.push(DetectorNode::new(detector));
        (self.nodes.len() - 1) as NodeId
    }

    /// Assign the telescopes covering a node, nearest-target-first.
    pub fn set_node_telescopes(&mut self, node: NodeId, telescopes: Vec<TelescopeId>) {
        self.nodes[node as usize].telescopes = telescopes;
    }

    /// Register an identification telescope and return its stable id.
    pub fn add_telescope(&mut self, tel: Box<dyn ParticleIdentifier>) -> TelescopeId {
        self.telescopes.push(tel);
        (self.telescopes.len() - 1) as TelescopeId
    }

    /// Open a new detector group.
    pub fn add_group(&mut self) -> GroupId {
        let id = self.groups.len() as GroupId;
        self.groups.push(DetectorGroup::new(id));
        id
    }

    /// Register a trajectory in a group from its nodes ordered **outward-in**.
    pub fn add_trajectory(&mut self, group: GroupId, nodes: &[NodeId]) -> TrajectoryId {
        let id = self.trajectories.len() as TrajectoryId;
        self.trajectories.push(crate::geometry::trajectory(id, group, nodes));
        let g = &mut self.groups[group as usize];
        g.trajectories.push(id);
        for &n in nodes {
            let det = self.nodes[n as usize].detector;
            if !g.detectors.contains(&det) {
                g.detectors.push(det);
            }
        }
        id
    }

    /// Replace the default range-energy model.
    pub fn with_range(mut self, range: Box<dyn RangeEnergy>) -> Self {
        self.range = range;
        self
    }

    /// Replace the default reaction target.
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Finalize the configuration, checking table consistency.
    pub fn build(self) -> Result<DetectorArray, FragrecError> {
        let n_det = self.detectors.len() as u32;
        for node in &self.nodes {
            if u32::from(node.detector) >= n_det {
                return Err(FragrecError::UnknownDetector(node.detector));
            }
            for &t in &node.telescopes {
                if t as usize >= self.telescopes.len() {
                    return Err(FragrecError::UnknownTelescope(t));
                }
            }
        }
        for (tid, tel) in self.telescopes.iter().enumerate() {
            if tel.detectors().is_empty() {
                return Err(FragrecError::InvalidReconParameter(
                    "telescope with no detectors".into(),
                ));
            }
            for &d in tel.detectors() {
                if u32::from(d) >= n_det {
                    return Err(FragrecError::GeometryInconsistency {
                        telescope: tid as TelescopeId,
                        detector: d,
                    });
                }
            }
        }
        for traj in &self.trajectories {
            if traj.nodes.is_empty() {
                return Err(FragrecError::UnknownTrajectory(traj.id));
            }
            if traj.group as usize >= self.groups.len() {
                return Err(FragrecError::UnknownGroup(traj.group));
            }
            for &n in &traj.nodes {
                if n as usize >= self.nodes.len() {
                    return Err(FragrecError::UnknownNode(n));
                }
            }
        }
        Ok(DetectorArray {
            detectors: self.detectors,
            nodes: self.nodes,
            trajectories: self.trajectories,
            groups: self.groups,
            telescopes: self.telescopes,
            range: self.range,
            target: self.target,
            node_index: OnceCell::new(),
        })
    }
}
