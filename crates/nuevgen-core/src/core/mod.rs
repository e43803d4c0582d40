//! # Core Module
//!
//! Stateless building blocks of the event-generation orchestrator.
//!
//! ## Architecture
//!
//! - **Generated Events** ([`event`]) - The narrow, read-only view of one generated interaction
//! - **Output Records** ([`records`]) - Truth, flux-provenance and generator-truth value objects
//! - **Fiducial Volumes** ([`fiducial`]) - The fiducial-cut DSL and the volume selectors it produces
//! - **Flux Sampling** ([`flux`]) - Flux specifications, file resolution, samplers and flavor mixing
//! - **Kinematics** ([`kinematics`]) - Lepton-side kinematic invariants
//! - **Constants** ([`constants`]) - Physical constants and unit conversions
//!
//! Nothing in this layer performs I/O beyond loading flux files, and nothing here holds
//! spill or lifecycle state.

pub mod constants;
pub mod event;
pub mod fiducial;
pub mod flux;
pub mod kinematics;
pub mod records;
pub(crate) mod utils;
