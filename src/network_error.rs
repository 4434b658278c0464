//! NetworkError: unified error type for pore-topo public APIs
//!
//! Every mutator and query in the crate reports failures through this type.
//! Mutators are atomic: when one of these errors is returned the network is
//! exactly as it was before the call.

use thiserror::Error;

use crate::data::property::PropertyKind;
use crate::topology::network::Domain;

/// Unified error type for network operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Marker (or point) dimensionality differs from the network's active axes.
    #[error("dimension mismatch: network spans {expected} axes, got {found} components")]
    DimensionMismatch { expected: usize, found: usize },
    /// A dependent container refused to follow a pore/throat count change.
    #[error(
        "resize of {domain} arrays from {old_count} to {new_count} rejected by `{container}`: {reason}"
    )]
    ResizeRejected {
        container: String,
        domain: Domain,
        old_count: usize,
        new_count: usize,
        reason: String,
    },
    /// A throat is a self-loop or references a pore that does not exist.
    #[error("invalid throat {conn:?}: {reason}")]
    InvalidEdge {
        conn: [usize; 2],
        reason: &'static str,
    },
    /// A mutator was handed nothing to operate on.
    #[error("`{0}` requires at least one pore or throat")]
    EmptySelection(&'static str),
    /// Property arrays with the same name cannot be concatenated.
    #[error("cannot merge `{domain}.{name}`: {reason}")]
    IncompatibleMerge {
        domain: Domain,
        name: String,
        reason: String,
    },
    /// An index exceeds the pore or throat count.
    #[error("{domain} index {index} out of range (count {count})")]
    IndexOutOfRange {
        domain: Domain,
        index: usize,
        count: usize,
    },
    /// A property array does not match its domain length.
    #[error("`{domain}.{name}` has {found} rows, expected {expected}")]
    LengthMismatch {
        domain: Domain,
        name: String,
        expected: usize,
        found: usize,
    },
    /// A named property does not exist.
    #[error("`{domain}.{name}` not found")]
    MissingProperty { domain: Domain, name: String },
    /// A named property exists but holds a different kind of data.
    #[error("`{domain}.{name}` is {found}, expected {expected}")]
    PropertyKindMismatch {
        domain: Domain,
        name: String,
        expected: PropertyKind,
        found: PropertyKind,
    },
    /// `coords`, `conns` and `all` are managed by the network itself.
    #[error("`{0}` is a reserved property name")]
    ReservedName(String),
    /// Any other argument that cannot be honored.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl NetworkError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        NetworkError::InvalidArgument(message.into())
    }
}
