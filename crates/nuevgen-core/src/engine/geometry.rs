use super::services::{GeometryService, ScanMethod, ScanSettings, ScannerDefaults, ServiceError};
use crate::core::fiducial::{FiducialError, VolumeSelector, parse_fiducial_cut};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Scan resolutions at or below this are replaced by the geometry engine's defaults.
const MIN_SCAN_RESOLUTION: i64 = 10;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Unknown geometry scan method in '{0}' (expected default, file, box or flux)")]
    UnknownScanMethod(String),
    #[error("Geometry scan '{0}' names no path-length file")]
    MissingScanFile(String),
    #[error("Invalid number '{value}' in geometry scan '{scan}'")]
    InvalidScanValue { scan: String, value: String },
    #[error("Malformed fiducial cut: {0}")]
    Fiducial(#[from] FiducialError),
    #[error("Geometry engine error: {0}")]
    Service(#[from] ServiceError),
    #[error("Failed to write path lengths to '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parses the geometry scan DSL.
///
/// - `default`: leave the scan to the geometry engine.
/// - `file:<path>` or `file <path>`: use a pre-computed table.
/// - `box <points> <rays> [safety] [write]`
/// - `flux <particles> [safety] [write]`
///
/// Resolutions of 10 or less fall back to `defaults`. Missing trailing values count as zero.
pub fn parse_geom_scan(scan: &str, defaults: &ScannerDefaults) -> Result<ScanSettings, GeometryError> {
    let trimmed = scan.trim();
    if trimmed.contains("default") {
        return Ok(ScanSettings::engine_default());
    }

    let lower = trimmed.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let method = tokens.first().copied().unwrap_or("");

    if method.contains("file") {
        let inline = method.split_once(':').map(|(_, p)| p).filter(|p| !p.is_empty());
        // Paths keep their original case.
        let original: Vec<&str> = trimmed.split_whitespace().collect();
        let path = match inline {
            Some(_) => original[0].split_once(':').map(|(_, p)| p),
            None => original.get(1).copied(),
        }
        .ok_or_else(|| GeometryError::MissingScanFile(scan.to_string()))?;
        return Ok(ScanSettings {
            method: ScanMethod::File(PathBuf::from(path)),
            safety_factor: None,
            write: false,
        });
    }

    let mut values = tokens
        .iter()
        .skip(1)
        .map(|v| {
            v.parse::<f64>().map_err(|_| GeometryError::InvalidScanValue {
                scan: scan.to_string(),
                value: v.to_string(),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;
    let supplied = values.len();
    if values.len() < 4 {
        values.resize(4, 0.0);
    }
    let resolution = |value: f64, fallback: u32| {
        let n = value as i64;
        if n <= MIN_SCAN_RESOLUTION {
            return Ok(fallback);
        }
        u32::try_from(n).map_err(|_| GeometryError::InvalidScanValue {
            scan: scan.to_string(),
            value: value.to_string(),
        })
    };

    let (method, safety, write) = if method.contains("box") {
        let points = resolution(values[0], defaults.points)?;
        let rays = resolution(values[1], defaults.rays)?;
        info!(points, rays, "Geometry scan using box");
        (
            ScanMethod::Box { points, rays },
            (supplied >= 3).then_some(values[2]),
            supplied >= 4 && values[3] != 0.0,
        )
    } else if method.contains("flux") {
        let particles = resolution(values[0], defaults.particles)?;
        info!(particles, "Geometry scan using flux");
        (
            ScanMethod::Flux { particles },
            (supplied >= 2).then_some(values[1]),
            supplied >= 3 && values[2] != 0.0,
        )
    } else {
        return Err(GeometryError::UnknownScanMethod(scan.to_string()));
    };

    Ok(ScanSettings {
        method,
        safety_factor: safety.filter(|s| *s > 0.0),
        write,
    })
}

/// Configuration summary appended to a written path-length table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanProvenance {
    pub flux_type: String,
    pub beam_name: String,
    pub flux_files: Vec<String>,
    pub detector_location: String,
    pub geometry_file: String,
    pub world_volume: String,
    pub top_volume: String,
    pub fiducial_cut: String,
    pub geom_scan: String,
}

impl ScanProvenance {
    pub fn render(&self) -> String {
        let mut out = String::from("\n");
        out.push_str(&format!("   FluxType:     {}\n", self.flux_type));
        out.push_str(&format!("   BeamName:     {}\n", self.beam_name));
        out.push_str("   FluxFiles:    ");
        for file in &self.flux_files {
            out.push_str(&format!("\n         {}", file));
        }
        out.push('\n');
        out.push_str(&format!("   DetLocation:  {}\n", self.detector_location));
        out.push_str(&format!("   ROOTFile:     {}\n", self.geometry_file));
        out.push_str(&format!("   WorldVolume:  {}\n", self.world_volume));
        out.push_str(&format!("   TopVolume:    {}\n", self.top_volume));
        out.push_str(&format!("   FiducialCut:  {}\n", self.fiducial_cut));
        out.push_str(&format!("   GeomScan:     {}\n", self.geom_scan));
        out
    }
}

/// Binds the generator to a detector geometry: volumes, mass, fiducial selection and
/// path-length scanning.
#[derive(Debug)]
pub struct GeometryAdapter<G: GeometryService> {
    service: G,
    world_volume: String,
    top_volume: String,
    detector_mass: f64,
    detector_length: f64,
    has_selector: bool,
    scan: ScanSettings,
}

impl<G: GeometryService> GeometryAdapter<G> {
    /// Selects the top volume (the world volume when `top_volume` is empty), attaches the
    /// fiducial selector and measures the detector.
    ///
    /// A cut with too few values is reported and generation proceeds without a selector; any
    /// other malformed cut is an error. A rock box always works in the world volume.
    #[instrument(skip(service), name = "geometry_bind")]
    pub fn bind(mut service: G, top_volume: &str, fiducial_cut: &str) -> Result<Self, GeometryError> {
        let world_volume = service.world_volume();
        let mut top = if top_volume.trim().is_empty() {
            world_volume.clone()
        } else {
            top_volume.to_string()
        };
        service.set_top_volume(&top)?;

        let has_selector = match parse_fiducial_cut(fiducial_cut) {
            Ok(None) => false,
            Ok(Some(spec)) => {
                if spec.is_rock_box() && top != world_volume {
                    info!(top = %top, world = %world_volume, "Rock box selection uses the world volume");
                    top = world_volume.clone();
                    service.set_top_volume(&top)?;
                }
                let selector = VolumeSelector::from_spec(&spec, &service.master_to_top());
                if selector.is_reversed() {
                    info!("Reverse sense of fiducial volume cut");
                }
                let adopted = service.adopt_volume_selector(selector);
                if !adopted {
                    warn!(cut = fiducial_cut, "Geometry cannot accept a volume selector; cut ignored");
                }
                adopted
            }
            Err(e) if e.is_recoverable() => {
                error!(cut = fiducial_cut, error = %e, "Fiducial cut ignored");
                false
            }
            Err(e) => return Err(e.into()),
        };

        let detector_mass = service.total_mass(&top)?;
        let detector_length = service.detector_length();
        info!(
            world = %world_volume,
            top = %top,
            mass_kg = detector_mass,
            length_cm = detector_length,
            fiducial = has_selector,
            "Geometry bound"
        );

        Ok(Self {
            service,
            world_volume,
            top_volume: top,
            detector_mass,
            detector_length,
            has_selector,
            scan: ScanSettings::engine_default(),
        })
    }

    /// Parses `scan` and hands the settings to the geometry engine.
    pub fn configure_scan(&mut self, scan: &str) -> Result<&ScanSettings, GeometryError> {
        let settings = parse_geom_scan(scan, &self.service.scanner_defaults())?;
        if let Some(safety) = settings.safety_factor {
            info!(safety, "Path length safety factor");
        }
        self.service.configure_scan(&settings)?;
        self.scan = settings;
        Ok(&self.scan)
    }

    pub fn scan(&self) -> &ScanSettings {
        &self.scan
    }

    pub fn world_volume(&self) -> &str {
        &self.world_volume
    }

    pub fn top_volume(&self) -> &str {
        &self.top_volume
    }

    /// Mass of the top volume, in kg.
    pub fn detector_mass(&self) -> f64 {
        self.detector_mass
    }

    pub fn detector_length(&self) -> f64 {
        self.detector_length
    }

    pub fn has_selector(&self) -> bool {
        self.has_selector
    }

    pub fn geometry_file(&self) -> String {
        self.service.geometry_file()
    }

    pub fn enter_top_volume(&mut self) -> Result<(), GeometryError> {
        Ok(self.service.set_top_volume(&self.top_volume)?)
    }

    pub fn restore_world_volume(&mut self) -> Result<(), GeometryError> {
        Ok(self.service.set_top_volume(&self.world_volume)?)
    }

    pub fn service(&self) -> &G {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut G {
        &mut self.service
    }

    /// Writes the maximum path lengths as XML followed by the provenance comment. Returns
    /// `false` when the geometry engine has no path lengths to write.
    pub fn write_max_path_lengths(&self, path: &Path, provenance: &str) -> Result<bool, GeometryError> {
        let Some(lengths) = self.service.max_path_lengths() else {
            warn!(path = %path.display(), "No maximum path lengths available to write");
            return Ok(false);
        };
        let io_err = |e| GeometryError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        };
        let mut file = fs::File::create(path).map_err(io_err)?;
        write!(
            file,
            "{}\n<!-- this file is only relevant for a setup compatible with:\n{}\n-->\n",
            lengths.to_xml(),
            provenance
        )
        .map_err(io_err)?;
        info!(path = %path.display(), "Saved maximum path lengths");
        Ok(true)
    }
}
