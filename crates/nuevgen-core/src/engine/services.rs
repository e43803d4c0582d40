//! Capability traits through which the external generation and geometry engines are used.

use super::environment::ResolvedEnvironment;
use crate::core::event::InteractionRecord;
use crate::core::fiducial::VolumeSelector;
use crate::core::flux::FluxDriver;
use nalgebra::Isometry3;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{service} failed: {message}")]
pub struct ServiceError {
    pub service: &'static str,
    pub message: String,
}

impl ServiceError {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

/// Scan resolutions the geometry engine falls back to when a requested value is too small.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerDefaults {
    pub points: u32,
    pub rays: u32,
    pub particles: u32,
}

/// How the maximum path lengths through the geometry are obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanMethod {
    /// Whatever the geometry engine does by default.
    Default,
    /// Read a pre-computed table instead of scanning.
    File(PathBuf),
    /// Rays shot from `points` points on each face of the bounding box, `rays` per point.
    Box { points: u32, rays: u32 },
    /// Rays drawn from the configured flux sampler.
    Flux { particles: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    pub method: ScanMethod,
    /// Multiplier applied to the scanned path lengths when set.
    pub safety_factor: Option<f64>,
    /// Whether the resulting table should be written out together with its provenance.
    pub write: bool,
}

impl ScanSettings {
    pub fn engine_default() -> Self {
        Self {
            method: ScanMethod::Default,
            safety_factor: None,
            write: false,
        }
    }
}

/// Maximum density-weighted path length per target material, keyed by nucleus PDG code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathLengthList(pub BTreeMap<i32, f64>);

impl PathLengthList {
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n\n");
        out.push_str("<path_length_list>\n\n");
        for (pdg, length) in &self.0 {
            let _ = writeln!(out, "   <path_length pdg=\"{}\"> {:e} </path_length>", pdg, length);
        }
        out.push_str("</path_length_list>\n");
        out
    }
}

/// The external detector-geometry engine.
///
/// Lengths are in cm and masses in kg, the geometry's own units.
pub trait GeometryService {
    /// Name of the outermost volume.
    fn world_volume(&self) -> String;

    /// File the geometry was loaded from.
    fn geometry_file(&self) -> String;

    fn detector_length(&self) -> f64;

    /// Mass of the named volume and everything inside it.
    fn total_mass(&self, volume: &str) -> Result<f64, ServiceError>;

    /// Makes `volume` the volume interactions are generated in.
    fn set_top_volume(&mut self, volume: &str) -> Result<(), ServiceError>;

    /// Transform from master (world) coordinates to the current top volume's frame.
    fn master_to_top(&self) -> Isometry3<f64>;

    /// Installs a selector restricting where vertices may be placed. Returns `false` when the
    /// geometry cannot honor one.
    fn adopt_volume_selector(&mut self, selector: VolumeSelector) -> bool;

    fn scanner_defaults(&self) -> ScannerDefaults;

    fn configure_scan(&mut self, settings: &ScanSettings) -> Result<(), ServiceError>;

    /// The maximum path lengths in use, once computed or loaded.
    fn max_path_lengths(&self) -> Option<PathLengthList>;
}

/// The external interaction-generation engine.
pub trait EventSource {
    /// One-time setup with the resolved environment, after the flux and geometry are ready.
    /// This is where cross sections are prepared and maximum path lengths computed.
    fn configure(
        &mut self,
        environment: &ResolvedEnvironment,
        flux: &mut dyn FluxDriver,
        geometry: &mut dyn GeometryService,
    ) -> Result<(), ServiceError>;

    /// Draws neutrinos from `flux` until one interacts in `geometry`. `Ok(None)` when no
    /// viable interaction was produced.
    fn generate_event(
        &mut self,
        flux: &mut dyn FluxDriver,
        geometry: &mut dyn GeometryService,
    ) -> Result<Option<Box<dyn InteractionRecord>>, ServiceError>;

    /// Interaction-probability scale applied to all neutrinos; exposure counted by the flux is
    /// divided by it.
    fn glob_prob_scale(&self) -> f64;
}
