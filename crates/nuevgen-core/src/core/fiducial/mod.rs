//! # Fiducial Volume Module
//!
//! Parses the compact fiducial-cut DSL (`[0][m]<shape>:<v1,v2,...>`) into a [`FiducialSpec`]
//! and turns a spec into a [`VolumeSelector`] that answers point-inclusion queries.
//!
//! ## Shapes
//!
//! | Token    | Values                                   |
//! |----------|------------------------------------------|
//! | `zcyl`   | x0, y0, r, zmin, zmax                    |
//! | `box`    | xmin, ymin, zmin, xmax, ymax, zmax       |
//! | `zpoly`  | nfaces, x0, y0, r_in, phi, zmin, zmax    |
//! | `sphere` | x0, y0, z0, r                            |
//! | `*rock*` | box corners, [rock-only, wall, dE/dx, fudge] |
//!
//! A leading `0` reverses the cut and an `m` marks master-frame coordinates.

pub mod parser;
pub mod selector;
pub mod shapes;

pub use parser::{FiducialError, FiducialSpec, RockBoxSpec, parse_fiducial_cut};
pub use selector::VolumeSelector;
pub use shapes::FiducialShape;
