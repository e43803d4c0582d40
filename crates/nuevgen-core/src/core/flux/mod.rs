//! # Flux Module
//!
//! Everything needed to turn a [`FluxSpec`] into a working neutrino source.
//!
//! ## Samplers
//!
//! | Type          | Sampler              | Input                                         |
//! |---------------|----------------------|-----------------------------------------------|
//! | `mono`        | [`MonoFlux`]         | none                                          |
//! | `ntuple`      | [`NtupleFlux`]       | beam-simulation CSV tables                    |
//! | `simple_flux` | [`SimpleNtupleFlux`] | simplified ray tables with a TOML header      |
//! | `histogram`   | [`HistogramFlux`]    | one TOML file of per-flavor energy spectra    |
//! | `atmo_*`      | [`AtmosphericFlux`]  | one FLUKA or BARTOL table per flavor          |
//!
//! [`build_flux_pipeline`] selects and configures the sampler and optionally wraps it in a
//! [`FluxBlender`] that remaps flavors through a [`FlavorMixer`]. Flux files are located with
//! the pure search functions in [`search`].

pub mod atmo;
pub mod driver;
pub mod factory;
pub mod flavor;
pub mod histogram;
pub mod mixer;
pub mod mono;
pub mod ntuple;
pub mod search;
pub mod spec;
mod tables;

pub use atmo::AtmosphericFlux;
pub use driver::{FluxDriver, FluxError};
pub use factory::{FluxPipeline, FluxSampler, MixerSettings, build_flux_pipeline, effective_events_per_spill};
pub use histogram::{EnergySpectrum, HistogramFlux};
pub use mixer::{FlavorMap, FlavorMixer, FluxBlender};
pub use mono::MonoFlux;
pub use ntuple::{DetectorLocation, NtupleFlux, SimpleEntry, SimpleNtupleFlux};
pub use search::{SearchError, find_flux_path, resolve_flux_files};
pub use spec::{AtmoBounds, AtmoModel, BeamSpec, FluxFiles, FluxSpec, FluxType};
