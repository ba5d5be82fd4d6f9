use thiserror::Error;

use crate::constants::{ChargeNumber, DetectorId, GroupId, MassNumber, MeV, Micrometer, NodeId, TelescopeId, TrajectoryId};
use crate::detectors::MaterialKind;

#[derive(Error, Debug)]
pub enum FragrecError {
    #[error("Invalid reconstruction parameter: {0}")]
    InvalidReconParameter(String),

    #[error("Geometry inconsistency: telescope {telescope} expects detector {detector} which is not on the particle trajectory")]
    GeometryInconsistency {
        telescope: TelescopeId,
        detector: DetectorId,
    },

    #[error("Unknown detector id: {0}")]
    UnknownDetector(DetectorId),

    #[error("Unknown node id: {0}")]
    UnknownNode(NodeId),

    #[error("Unknown trajectory id: {0}")]
    UnknownTrajectory(TrajectoryId),

    #[error("Unknown telescope id: {0}")]
    UnknownTelescope(TelescopeId),

    #[error("Unknown group id: {0}")]
    UnknownGroup(GroupId),

    #[error("Energy-loss inversion anomaly for Z={z} A={a} in detector {detector}: {value} MeV")]
    EnergyLossInversion {
        z: ChargeNumber,
        a: MassNumber,
        detector: DetectorId,
        value: MeV,
    },

    #[error("Range-energy solver failed to converge in {material:?} ({thickness} um) for deltaE = {de} MeV")]
    RangeSolverDiverged {
        material: MaterialKind,
        thickness: Micrometer,
        de: MeV,
    },
}

impl PartialEq for FragrecError {
    fn eq(&self, other: &Self) -> bool {
        use FragrecError::*;
        match (self, other) {
            (InvalidReconParameter(a), InvalidReconParameter(b)) => a == b,
            (
                GeometryInconsistency {
                    telescope: t1,
                    detector: d1,
                },
                GeometryInconsistency {
                    telescope: t2,
                    detector: d2,
                },
            ) => t1 == t2 && d1 == d2,
            (UnknownDetector(a), UnknownDetector(b)) => a == b,
            (UnknownNode(a), UnknownNode(b)) => a == b,
            (UnknownTrajectory(a), UnknownTrajectory(b)) => a == b,
            (UnknownTelescope(a), UnknownTelescope(b)) => a == b,
            (UnknownGroup(a), UnknownGroup(b)) => a == b,

            // Float payloads: equality if same variant and same discrete fields
            (
                EnergyLossInversion {
                    z: z1,
                    a: a1,
                    detector: d1,
                    ..
                },
                EnergyLossInversion {
                    z: z2,
                    a: a2,
                    detector: d2,
                    ..
                },
            ) => z1 == z2 && a1 == a2 && d1 == d2,
            (
                RangeSolverDiverged { material: m1, .. },
                RangeSolverDiverged { material: m2, .. },
            ) => m1 == m2,

            _ => false,
        }
    }
}
