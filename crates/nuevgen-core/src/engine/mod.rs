//! # Engine Module
//!
//! Stateful components of event generation: everything that is configured once and then
//! consulted or updated on every draw.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Generator parameters, their defaults and the builder
//! - **External Services** ([`services`]) - Traits through which the interaction generator and
//!   the detector geometry engine are driven
//! - **Geometry Binding** ([`geometry`]) - Top volume, fiducial selection, mass and path-length
//!   scanning
//! - **Spill Accounting** ([`spill`]) - Per-spill event and exposure bookkeeping
//! - **Translation** ([`translate`]) - Generated interactions to output records
//! - **Environment** ([`environment`]) - Seed and search-path resolution for the event source
//! - **Progress Monitoring** ([`progress`]) - Setup and draw notifications for front ends
//! - **Error Handling** ([`error`]) - The error type of the generator lifecycle

pub mod config;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod progress;
pub mod services;
pub mod spill;
pub mod translate;

#[cfg(test)]
pub(crate) mod fakes;
