//! Domain error types for the contact kernel.
//!
//! Errors are split by the three failure categories in spec.md §7:
//! per-pair geometry errors (never fatal, tallied by [`GeometryError`]),
//! configuration errors (surfaced from `init()`, tallied by [`ConfigError`]),
//! and host-contract violations ([`HostError`]). None of these abort a
//! running cycle; only [`ResourceError`] does.

use thiserror::Error;

/// Errors produced by the pure geometry primitives (spec.md §4.1).
///
/// These are never fatal: a face pair that fails geometrically is dropped
/// from the active set for the cycle and tallied in [`crate::coupling::CycleReport`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// A polygon input had fewer than 3 vertices (2D: fewer than 2), or a
    /// duplicated/zero-length edge made the vertex order structurally invalid.
    #[error("invalid face input: degenerate vertex count or duplicated vertex")]
    InvalidFaceInput,

    /// A polygon failed the CCW-and-convex check and the caller rejected it.
    #[error("face orientation is not convex CCW")]
    FaceOrientation,

    /// The polygon-polygon overlap collapsed to zero area after short-edge
    /// collapse, or fewer than 3 vertices (2D: 2) remained.
    #[error("degenerate overlap: zero area after short-edge collapse")]
    DegenerateOverlap,

    /// A face-vertex classification index referenced a vertex beyond the
    /// collected overlap-vertex buffer.
    #[error("face vertex index exceeds overlap vertex count")]
    FaceVertexIndexExceedsOverlapVertices,

    /// Catch-all for a face pair with no coherent contact-plane geometry
    /// (e.g. coincident normals with no valid bisector).
    #[error("no usable face geometry for this pair")]
    NoFaceGeomError,
}

/// Errors raised while validating a [`crate::config::CouplingConfig`] at `init()`.
///
/// `init()` accumulates every applicable [`ConfigError`] rather than
/// stopping at the first one (spec.md SPEC_FULL §11).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("mesh 1 and mesh 2 have different face vertex counts ({v1} vs {v2})")]
    DifferentFaceTypes { v1: usize, v2: usize },

    #[error("mesh 1 and mesh 2 have different spatial dimensions ({d1} vs {d2})")]
    DifferentDimensions { d1: usize, d2: usize },

    #[error(
        "combination of case={case:?}, method={method:?}, model={model:?}, enforcement={enforcement:?} is not on the allow-list"
    )]
    InvalidCombination {
        case: crate::config::ContactCase,
        method: crate::config::Method,
        model: crate::config::Model,
        enforcement: crate::config::Enforcement,
    },

    #[error("method {method:?} requires nodal response to be registered on both meshes")]
    MissingResponseSink { method: crate::config::Method },

    #[error("AUTO contact case requires element thickness to be registered on both meshes")]
    MissingElementThickness,

    #[error(
        "mortar methods require disjoint node-id ranges across the two meshes; ranges overlap"
    )]
    OverlappingNodeIdSpace,

    #[error("penalty enforcement requires penalty options to be set")]
    MissingPenaltyOptions,

    #[error("Lagrange-multiplier enforcement requires Lagrange options to be set")]
    MissingLagrangeOptions,
}

/// Host-contract violations (spec.md §7): null/invalid data supplied by the
/// simulator. Logged as warnings; the offending mesh is marked invalid so
/// later validation fails until the host corrects it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    #[error("mesh {0} was registered with zero nodes")]
    ZeroNodes(u32),

    #[error("mesh {0} was registered with zero faces")]
    ZeroFaces(u32),

    #[error("mesh {0} has no registered coordinate buffer")]
    MissingCoordinates(u32),

    #[error("mesh id {0} is not registered")]
    UnknownMesh(u32),

    #[error("coupling scheme id {0} is not registered")]
    UnknownCouplingScheme(u32),
}

/// Per-cycle resource errors (spec.md §7): fatal, propagated as a non-zero
/// `update()` return code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    #[error("device out of memory while allocating {0} contact-plane records")]
    DeviceOutOfMemory(usize),

    #[error("atomic active-plane counter overflowed capacity {0}")]
    AtomicOverflow(usize),
}

/// Top-level error returned by fallible public entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContactError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("host contract violation: {0}")]
    Host(#[from] HostError),

    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),
}
