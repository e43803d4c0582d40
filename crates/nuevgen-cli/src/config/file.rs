use crate::error::{CliError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A flavor as written in the configuration file: a PDG code or a name.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FileFlavor {
    Code(i32),
    Name(String),
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBeamConfig {
    pub direction: Option<[f64; 3]>,
    pub center: Option<[f64; 3]>,
    pub radius: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileAtmoConfig {
    pub e_min: Option<f64>,
    pub e_max: Option<f64>,
    pub r_l: Option<f64>,
    pub r_t: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileMixerConfig {
    pub config: Option<String>,
    pub baseline: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileFluxConfig {
    #[serde(rename = "type")]
    pub flux_type: Option<String>,
    pub flavors: Option<Vec<FileFlavor>>,
    pub files: Option<Vec<String>>,
    pub search_path: Option<Vec<PathBuf>>,
    pub beam_name: Option<String>,
    pub detector_location: Option<String>,
    pub upstream_z: Option<f64>,
    pub mono_energy: Option<f64>,
    pub pot_per_spill: Option<f64>,
    pub events_per_spill: Option<f64>,
    pub beam: Option<FileBeamConfig>,
    pub atmo: Option<FileAtmoConfig>,
    pub mixer: Option<FileMixerConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileGeometryConfig {
    pub top_volume: Option<String>,
    pub fiducial_cut: Option<String>,
    pub geom_scan: Option<String>,
    pub surrounding_mass: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileTimingConfig {
    pub global_offset: Option<f64>,
    pub random_offset: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEnvironmentConfig {
    pub seed: Option<u64>,
    pub xml_path: Option<String>,
    pub spline_file: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub flux: Option<FileFluxConfig>,
    pub geometry: Option<FileGeometryConfig>,
    pub timing: Option<FileTimingConfig>,
    pub environment: Option<FileEnvironmentConfig>,
    pub debug_flags: Option<u32>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
