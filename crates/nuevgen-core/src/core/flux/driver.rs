use super::search::SearchError;
use super::spec::UnknownFluxType;
use crate::core::event::FourVector;
use crate::core::utils::sampling::SamplingError;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FluxError {
    #[error("Failed to read flux file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse flux table '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to parse flux histograms '{path}': {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("No histogram named '{name}' for flavor {pdg} in '{path}'")]
    MissingHistogram { name: String, pdg: i32, path: String },
    #[error("Malformed spectrum '{name}': {reason}")]
    InvalidSpectrum { name: String, reason: String },
    #[error("Flux file '{path}' holds no usable entries")]
    EmptyFlux { path: String },
    #[error("Flavor {0} is not a neutrino")]
    UnknownFlavor(i32),
    #[error("No flavors requested")]
    NoFlavors,
    #[error("{flux_type} flux needs at least one resolved file, none found for {pattern:?}")]
    NoFluxFiles {
        flux_type: String,
        pattern: Vec<String>,
    },
    #[error(
        "The number of generated neutrino flavors ({flavors}) doesn't correspond to the number of files ({files})"
    )]
    FlavorFileMismatch { flavors: usize, files: usize },
    #[error("Atmospheric generation needs exactly 1 event per spill, not {0}")]
    AtmosphericEventsPerSpill(f64),
    #[error("Malformed flavor mixer configuration '{config}': {reason}")]
    InvalidMixer { config: String, reason: String },
    #[error("Unsupported detector location '{0}'")]
    UnknownDetectorLocation(String),
    #[error(transparent)]
    UnknownFluxType(#[from] UnknownFluxType),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("Sampling failed: {0}")]
    Sampling(#[from] SamplingError),
}

/// A source of flux neutrinos.
///
/// After a successful [`generate_next`](FluxDriver::generate_next) the accessors describe the
/// drawn neutrino. Positions are `(x, y, z, t)` in meters, momenta `(px, py, pz, E)` in GeV.
pub trait FluxDriver {
    /// Flavors this driver can produce.
    fn flux_particles(&self) -> &BTreeSet<i32>;

    fn max_energy(&self) -> f64;

    /// Draws the next neutrino; `Ok(false)` when no neutrino could be produced.
    fn generate_next(&mut self) -> Result<bool, FluxError>;

    fn pdg_code(&self) -> i32;

    fn weight(&self) -> f64;

    fn momentum(&self) -> FourVector;

    /// Ray generation point.
    fn position(&self) -> FourVector;

    fn end_of_flux(&self) -> bool;

    /// Distance from the neutrino's production point to the ray generation point, when known.
    fn decay_distance(&self) -> Option<f64> {
        None
    }
}
