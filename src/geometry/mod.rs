//! # Trajectory graph: nodes, trajectories, groups
//!
//! The geometry subsystem that *builds* this graph is an external collaborator; reconstruction
//! only consumes it. Per run the graph is frozen: groups partition the detectors disjointly, each
//! group owns a set of trajectories, and each trajectory is an ordered detector path from the
//! outermost reachable detector inward to the target.
//!
//! Ordering conventions, relied upon everywhere downstream:
//!
//! * [`Trajectory::nodes`] is ordered **outward-in**: the first node is the outermost (potential
//!   stopping) detector, the last node is nearest the target.
//! * [`DetectorNode::telescopes`] is ordered nearest-target-first.
//!
//! A node may be shared by several trajectories that continue differently toward the target, so
//! neighbour relations are per-trajectory (positions in [`Trajectory::nodes`]), never node-level.

use crate::constants::{DetectorId, GroupId, NodeId, NodePath, TelescopeId, TrajectoryId};

/// One detector position on the trajectory graph.
#[derive(Debug, Clone)]
pub struct DetectorNode {
    pub detector: DetectorId,
    /// Telescopes covering this node, nearest-target-first.
    pub telescopes: Vec<TelescopeId>,
}

impl DetectorNode {
    pub fn new(detector: DetectorId) -> Self {
        Self {
            detector,
            telescopes: Vec::new(),
        }
    }
}

/// Ordered detector path from the outermost detector inward to the target.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub id: TrajectoryId,
    pub group: GroupId,
    /// Nodes ordered outward-in (outermost first).
    pub nodes: NodePath,
}

impl Trajectory {
    /// Position of `node` along the path, if the trajectory traverses it.
    pub fn position_of(&self, node: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }

    /// Sub-path from `node` (inclusive) inward to the target end.
    ///
    /// Returns an empty slice if the trajectory does not traverse `node`.
    pub fn sub_path_from(&self, node: NodeId) -> &[NodeId] {
        match self.position_of(node) {
            Some(i) => &self.nodes[i..],
            None => &[],
        }
    }
}

/// Maximal cluster of detectors requiring joint reconstruction.
///
/// Immutable per run; owns no particles.
#[derive(Debug, Clone)]
pub struct DetectorGroup {
    pub id: GroupId,
    pub trajectories: Vec<TrajectoryId>,
    pub detectors: Vec<DetectorId>,
}

impl DetectorGroup {
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            trajectories: Vec::new(),
            detectors: Vec::new(),
        }
    }
}

/// Convenience builder for trajectories (keeps `NodePath` construction in one place).
pub fn trajectory(id: TrajectoryId, group: GroupId, nodes: &[NodeId]) -> Trajectory {
    Trajectory {
        id,
        group,
        nodes: NodePath::from_slice(nodes),
    }
}

#[cfg(test)]
mod test_geometry {
    use super::*;

    #[test]
    fn test_sub_path_from() {
        let t = trajectory(0, 0, &[5, 3, 1]);
        assert_eq!(t.sub_path_from(5), &[5, 3, 1]);
        assert_eq!(t.sub_path_from(3), &[3, 1]);
        assert_eq!(t.sub_path_from(9), &[] as &[crate::constants::NodeId]);
    }

    #[test]
    fn test_position_of() {
        let t = trajectory(2, 0, &[4, 2]);
        assert_eq!(t.position_of(2), Some(1));
        assert_eq!(t.position_of(7), None);
    }
}
