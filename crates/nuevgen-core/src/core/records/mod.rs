//! Experiment-facing output records.
//!
//! Each record is a plain value object owned by the caller of
//! [`EventGenerator::sample`](crate::workflows::generate::EventGenerator::sample) and fully
//! overwritten on every successful draw.

pub mod flux;
pub mod gtruth;
pub mod truth;

pub use flux::{BeamParentage, FlavorFluxes, FluxKind, FluxRecord};
pub use gtruth::GeneratorTruth;
pub use truth::{CurrentType, InteractionMode, NeutrinoInfo, Origin, TrackParticle, TruthRecord};
