use crate::core::flux::{AtmoBounds, BeamSpec, FluxFiles, FluxSpec, FluxType, MixerSettings};
use nalgebra::{Point3, Vector3};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Bit flags selecting extra diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugFlags(pub u32);

impl DebugFlags {
    /// Log the flavor blender configuration at setup.
    pub const MIXER_CONFIG: u32 = 0x01;
    /// Log the flavor blender state after every draw.
    pub const BLENDER_STATE: u32 = 0x02;
    /// Log the vertex and flux ray of every interaction.
    pub const VERTEX_RAY: u32 = 0x04;

    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// Settings handed to the external event source instead of process-wide environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentSettings {
    /// Random seed; a fresh one is drawn when absent.
    pub seed: Option<u64>,
    /// Colon-separated XML configuration search path.
    pub xml_path: Option<String>,
    /// Pre-computed cross-section spline file, looked up along the XML search path.
    pub spline_file: Option<String>,
    /// Any other key/value pairs, passed through untouched.
    pub extra: BTreeMap<String, String>,
}

/// Time offsets applied to the particles of every event, in ns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    pub global_offset: f64,
    pub random_offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub flux_type: FluxType,
    pub flavors: BTreeSet<i32>,
    /// Explicit flux file names, or a single glob pattern.
    pub flux_files: Vec<String>,
    /// Directories searched, in order, for the flux files.
    pub flux_search_path: Vec<PathBuf>,
    pub beam_name: String,
    pub detector_location: String,
    /// Top volume of the geometry; empty means the world volume.
    pub top_volume: String,
    pub fiducial_cut: String,
    pub geom_scan: String,
    pub pot_per_spill: f64,
    pub events_per_spill: f64,
    pub mono_energy: f64,
    pub beam: BeamSpec,
    /// Mass (kg) outside the top volume that still contributes interactions.
    pub surrounding_mass: f64,
    pub flux_upstream_z: f64,
    pub timing: TimingConfig,
    pub atmo: AtmoBounds,
    pub mixer: MixerSettings,
    pub environment: EnvironmentSettings,
    pub debug: DebugFlags,
}

impl GeneratorConfig {
    /// The flux part of the configuration, with the flux files already resolved.
    pub fn flux_spec(&self, files: FluxFiles) -> FluxSpec {
        FluxSpec {
            flux_type: self.flux_type,
            flavors: self.flavors.clone(),
            files,
            beam: self.beam,
            mono_energy: self.mono_energy,
            detector_location: self.detector_location.clone(),
            upstream_z: self.flux_upstream_z,
            atmo: self.atmo,
        }
    }
}

#[derive(Default)]
pub struct GeneratorConfigBuilder {
    flux_type: Option<FluxType>,
    flavors: Option<BTreeSet<i32>>,
    flux_files: Option<Vec<String>>,
    flux_search_path: Option<Vec<PathBuf>>,
    beam_name: Option<String>,
    detector_location: Option<String>,
    top_volume: Option<String>,
    fiducial_cut: Option<String>,
    geom_scan: Option<String>,
    pot_per_spill: Option<f64>,
    events_per_spill: Option<f64>,
    mono_energy: Option<f64>,
    beam_direction: Option<Vector3<f64>>,
    beam_center: Option<Point3<f64>>,
    beam_radius: Option<f64>,
    surrounding_mass: Option<f64>,
    flux_upstream_z: Option<f64>,
    global_time_offset: Option<f64>,
    random_time_offset: Option<f64>,
    atmo_e_min: Option<f64>,
    atmo_e_max: Option<f64>,
    atmo_r_l: Option<f64>,
    atmo_r_t: Option<f64>,
    mixer_config: Option<String>,
    mixer_baseline: Option<f64>,
    environment: Option<EnvironmentSettings>,
    debug_flags: Option<u32>,
}

impl GeneratorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flux_type(mut self, flux_type: FluxType) -> Self {
        self.flux_type = Some(flux_type);
        self
    }
    pub fn flavors(mut self, flavors: BTreeSet<i32>) -> Self {
        self.flavors = Some(flavors);
        self
    }
    pub fn flux_files(mut self, files: Vec<String>) -> Self {
        self.flux_files = Some(files);
        self
    }
    pub fn flux_search_path(mut self, dirs: Vec<PathBuf>) -> Self {
        self.flux_search_path = Some(dirs);
        self
    }
    pub fn beam_name(mut self, name: impl Into<String>) -> Self {
        self.beam_name = Some(name.into());
        self
    }
    pub fn detector_location(mut self, location: impl Into<String>) -> Self {
        self.detector_location = Some(location.into());
        self
    }
    pub fn top_volume(mut self, volume: impl Into<String>) -> Self {
        self.top_volume = Some(volume.into());
        self
    }
    pub fn fiducial_cut(mut self, cut: impl Into<String>) -> Self {
        self.fiducial_cut = Some(cut.into());
        self
    }
    pub fn geom_scan(mut self, scan: impl Into<String>) -> Self {
        self.geom_scan = Some(scan.into());
        self
    }
    pub fn pot_per_spill(mut self, pot: f64) -> Self {
        self.pot_per_spill = Some(pot);
        self
    }
    pub fn events_per_spill(mut self, events: f64) -> Self {
        self.events_per_spill = Some(events);
        self
    }
    pub fn mono_energy(mut self, energy: f64) -> Self {
        self.mono_energy = Some(energy);
        self
    }
    pub fn beam_direction(mut self, direction: Vector3<f64>) -> Self {
        self.beam_direction = Some(direction);
        self
    }
    pub fn beam_center(mut self, center: Point3<f64>) -> Self {
        self.beam_center = Some(center);
        self
    }
    pub fn beam_radius(mut self, radius: f64) -> Self {
        self.beam_radius = Some(radius);
        self
    }
    pub fn surrounding_mass(mut self, mass: f64) -> Self {
        self.surrounding_mass = Some(mass);
        self
    }
    pub fn flux_upstream_z(mut self, z: f64) -> Self {
        self.flux_upstream_z = Some(z);
        self
    }
    pub fn global_time_offset(mut self, offset: f64) -> Self {
        self.global_time_offset = Some(offset);
        self
    }
    pub fn random_time_offset(mut self, offset: f64) -> Self {
        self.random_time_offset = Some(offset);
        self
    }
    pub fn atmo_energy_range(mut self, e_min: f64, e_max: f64) -> Self {
        self.atmo_e_min = Some(e_min);
        self.atmo_e_max = Some(e_max);
        self
    }
    pub fn atmo_radii(mut self, r_l: f64, r_t: f64) -> Self {
        self.atmo_r_l = Some(r_l);
        self.atmo_r_t = Some(r_t);
        self
    }
    pub fn mixer_config(mut self, config: impl Into<String>) -> Self {
        self.mixer_config = Some(config.into());
        self
    }
    pub fn mixer_baseline(mut self, baseline: f64) -> Self {
        self.mixer_baseline = Some(baseline);
        self
    }
    pub fn environment(mut self, environment: EnvironmentSettings) -> Self {
        self.environment = Some(environment);
        self
    }
    pub fn debug_flags(mut self, flags: u32) -> Self {
        self.debug_flags = Some(flags);
        self
    }

    pub fn build(self) -> Result<GeneratorConfig, ConfigError> {
        let flux_type = self
            .flux_type
            .ok_or(ConfigError::MissingParameter("flux_type"))?;
        let flavors = self
            .flavors
            .ok_or(ConfigError::MissingParameter("flavors"))?;
        if flavors.is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "flavors",
                reason: "at least one flavor is required".to_string(),
            });
        }

        let atmo = AtmoBounds {
            e_min: self.atmo_e_min.unwrap_or(0.1),
            e_max: self.atmo_e_max.unwrap_or(10.0),
            r_l: self.atmo_r_l.unwrap_or(20.0),
            r_t: self.atmo_r_t.unwrap_or(20.0),
        };
        if atmo.e_min >= atmo.e_max {
            return Err(ConfigError::InvalidValue {
                parameter: "atmo_energy_range",
                reason: format!("Emin {} must be below Emax {}", atmo.e_min, atmo.e_max),
            });
        }
        let events_per_spill = self.events_per_spill.unwrap_or(0.0);
        if events_per_spill < 0.0 {
            return Err(ConfigError::InvalidValue {
                parameter: "events_per_spill",
                reason: "must not be negative".to_string(),
            });
        }

        Ok(GeneratorConfig {
            flux_type,
            flavors,
            flux_files: self.flux_files.unwrap_or_default(),
            flux_search_path: self.flux_search_path.unwrap_or_default(),
            beam_name: self.beam_name.unwrap_or_default(),
            detector_location: self.detector_location.unwrap_or_default(),
            top_volume: self.top_volume.unwrap_or_default(),
            fiducial_cut: self.fiducial_cut.unwrap_or_else(|| "none".to_string()),
            geom_scan: self.geom_scan.unwrap_or_else(|| "default".to_string()),
            pot_per_spill: self.pot_per_spill.unwrap_or(5.0e13),
            events_per_spill,
            mono_energy: self.mono_energy.unwrap_or(2.0),
            beam: BeamSpec {
                direction: self.beam_direction.unwrap_or_else(Vector3::z),
                center: self.beam_center.unwrap_or_else(Point3::origin),
                radius: self.beam_radius.unwrap_or(3.0),
            },
            surrounding_mass: self.surrounding_mass.unwrap_or(0.0),
            flux_upstream_z: self.flux_upstream_z.unwrap_or(-2.0e30),
            timing: TimingConfig {
                global_offset: self.global_time_offset.unwrap_or(1.0e4),
                random_offset: self.random_time_offset.unwrap_or(1.0e4),
            },
            atmo,
            mixer: MixerSettings {
                config: self.mixer_config.unwrap_or_else(|| "none".to_string()),
                baseline: self.mixer_baseline.unwrap_or(0.0),
            },
            environment: self.environment.unwrap_or_default(),
            debug: DebugFlags(self.debug_flags.unwrap_or(0)),
        })
    }
}
