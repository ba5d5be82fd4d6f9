//! # Constants and type definitions for fragrec
//!
//! This module centralizes the **physical constants**, **unit type aliases**, and **common type
//! definitions** used throughout the `fragrec` library. It also defines the identifier aliases
//! used as stable, non-owning handles into the [`DetectorArray`](crate::array::DetectorArray)
//! tables.
//!
//! ## Overview
//!
//! - Energy and length unit aliases (MeV, micrometres)
//! - Nuclear species aliases (charge and mass numbers)
//! - Stable 16-bit identifiers for detectors, nodes, trajectories, telescopes and groups
//! - Container types for node paths and reconstructed particles
//!
//! Identifiers are plain indices into tables owned by the array configuration, which outlives
//! every per-event [`Particle`](crate::particle::Particle). A particle therefore never owns any
//! piece of geometry; it only carries indices.

use crate::particle::Particle;
use smallvec::SmallVec;

// -------------------------------------------------------------------------------------------------
// Physical constants
// -------------------------------------------------------------------------------------------------

/// Numerical epsilon used for floating-point comparisons on energies (MeV scale)
pub const ENERGY_EPS: f64 = 1e-9;

/// Proton charge number, used by the gamma-as-proton substitute calibration
pub const PROTON_Z: ChargeNumber = 1;

/// Proton mass number, used by the gamma-as-proton substitute calibration
pub const PROTON_A: MassNumber = 1;

/// Largest charge number scanned by the minimum-Z estimation policy
pub const ZMIN_SCAN_MAX: ChargeNumber = 120;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Kinetic energy or energy loss in MeV
pub type MeV = f64;
/// Absorber thickness in micrometres
pub type Micrometer = f64;
/// Atomic (charge) number Z
pub type ChargeNumber = i32;
/// Mass number A
pub type MassNumber = i32;

/// Stable index of a detector in the array configuration
pub type DetectorId = u16;
/// Stable index of a trajectory node
pub type NodeId = u16;
/// Stable index of a trajectory
pub type TrajectoryId = u16;
/// Stable index of an identification telescope
pub type TelescopeId = u16;
/// Stable index of a detector group
pub type GroupId = u16;

/// A nuclear species hint `(Z, A)` passed to species-dependent calibrations
pub type Species = (ChargeNumber, MassNumber);

// -------------------------------------------------------------------------------------------------
// Containers
// -------------------------------------------------------------------------------------------------

/// A small, inline-optimized container for the nodes of a single trajectory.
pub type NodePath = SmallVec<[NodeId; 8]>;

/// Reconstructed particles of one group or one event, in seeding order.
pub type Particles = Vec<Particle>;
