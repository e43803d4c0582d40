//! # nuevgen Core Library
//!
//! Orchestration of simulated neutrino interaction events: flux sampler selection and
//! configuration, detector geometry binding with optional fiducial-volume restriction,
//! per-spill exposure accounting, and translation of generated interactions into
//! experiment-facing truth, flux-provenance and generator-diagnostic records.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (output records, generated event
//!   records), the fiducial-cut DSL parser and volume selectors, the flux samplers and their
//!   factory, and pure kinematic helpers.
//!
//! - **[`engine`]: The Logic Core.** Stateful components: configuration, the geometry adapter,
//!   the spill accountant, the event translator, environment resolution, and the capability
//!   traits through which the external generation engine and geometry engine are consumed.
//!
//! - **[`workflows`]: The Public API.** The [`workflows::generate::EventGenerator`] ties the
//!   engine and core together behind an `initialize` / `sample` / `stop` lifecycle.
//!
//! The physics of interaction generation and the material scanning of the detector geometry
//! are external; they are injected as [`engine::services::EventSource`] and
//! [`engine::services::GeometryService`] implementations.

pub mod core;
pub mod engine;
pub mod workflows;
