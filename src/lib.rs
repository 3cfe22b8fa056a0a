//! Geometric contact-interface core for transient finite-element contact
//! mechanics: binning, common-plane construction, polygon overlap, and
//! penalty/mortar contact physics.
//!
//! Public API policy
//! ------------------
//! Hosts drive a simulation through [`coupling::CouplingScheme`] and
//! [`mesh::MeshView`]; [`ffi`] wraps both behind a C-compatible surface for
//! non-Rust callers. Everything under `geometry`, `binning`, `physics`, and
//! `shape` is pure and free-function based, usable directly for testing or
//! composition without going through the coupling-scheme state machine.

pub mod binning;
pub mod config;
pub mod contact_plane;
pub mod coupling;
pub mod error;
pub mod exec;
pub mod ffi;
pub mod geometry;
pub mod mesh;
pub mod physics;
pub mod shape;
pub mod sparse;
pub mod timestep;
pub mod viz;

pub use config::CouplingConfig;
pub use coupling::{CouplingScheme, CycleReport};
pub use error::ContactError;
pub use mesh::MeshView;
