//! Error taxonomy of the engine.
//!
//! Every variant is raised before any matrix is touched, so a failed call
//! leaves its receiver unchanged. Internal inconsistencies (a broken oracle
//! postcondition, a singular system claimed regular) are bugs and panic.

use thiserror::Error;

use crate::linear::Topology;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolyhedronError {
    /// Two operands disagree on the space dimension.
    #[error("{class}::{method}:\nthis->space_dimension() == {this_dim}, {name}.space_dimension() == {other_dim}.")]
    DimensionIncompatible {
        class: &'static str,
        method: &'static str,
        name: &'static str,
        this_dim: usize,
        other_dim: usize,
    },
    /// Closed and NNC operands mixed, or an NNC-only object given to a
    /// closed polyhedron.
    #[error("{class}::{method}:\n{detail}.")]
    TopologyIncompatible {
        class: &'static str,
        method: &'static str,
        detail: String,
    },
    /// Requested dimension exceeds `MAX_SPACE_DIMENSION`.
    #[error("{class}::{method}:\n{reason}.")]
    SpaceDimensionOverflow {
        class: &'static str,
        method: &'static str,
        reason: String,
    },
    /// A malformed single generator.
    #[error("{method}:\n{reason}.")]
    InvalidGenerator { method: &'static str, reason: String },
    /// A non-empty generator system without points.
    #[error("{class}::{method}:\n*this is an empty polyhedron and the non-empty generator system {name} contains no points.")]
    InvalidGenerators {
        class: &'static str,
        method: &'static str,
        name: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, PolyhedronError>;

impl PolyhedronError {
    pub(crate) fn dimension_incompatible(
        topology: Topology,
        method: &'static str,
        name: &'static str,
        this_dim: usize,
        other_dim: usize,
    ) -> Self {
        PolyhedronError::DimensionIncompatible {
            class: topology.class_name(),
            method,
            name,
            this_dim,
            other_dim,
        }
    }

    pub(crate) fn topology_incompatible(
        topology: Topology,
        method: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        PolyhedronError::TopologyIncompatible {
            class: topology.class_name(),
            method,
            detail: detail.into(),
        }
    }

    pub(crate) fn space_dimension_overflow(
        topology: Topology,
        method: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        PolyhedronError::SpaceDimensionOverflow {
            class: topology.class_name(),
            method,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_generators(
        topology: Topology,
        method: &'static str,
        name: &'static str,
    ) -> Self {
        PolyhedronError::InvalidGenerators {
            class: topology.class_name(),
            method,
            name,
        }
    }
}
