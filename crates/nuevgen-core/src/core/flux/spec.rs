use nalgebra::{Point3, Vector3};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtmoModel {
    Fluka,
    Bartol,
}

/// Which flux sampler a generation run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FluxType {
    Mono,
    Ntuple,
    SimpleNtuple,
    Histogram,
    Atmospheric(AtmoModel),
}

impl FluxType {
    pub fn is_atmospheric(self) -> bool {
        matches!(self, Self::Atmospheric(_))
    }

    /// Ntuple-backed samplers that report their protons-on-target exposure.
    pub fn is_pot_driven(self) -> bool {
        matches!(self, Self::Ntuple | Self::SimpleNtuple)
    }

    pub fn has_histograms(self) -> bool {
        matches!(self, Self::Histogram | Self::Atmospheric(_))
    }
}

impl fmt::Display for FluxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mono => "mono",
            Self::Ntuple => "ntuple",
            Self::SimpleNtuple => "simple_flux",
            Self::Histogram => "histogram",
            Self::Atmospheric(AtmoModel::Fluka) => "atmo_FLUKA",
            Self::Atmospheric(AtmoModel::Bartol) => "atmo_BARTOL",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Unknown flux type '{0}' (expected mono, ntuple, simple_flux, histogram, atmo_FLUKA or atmo_BARTOL)"
)]
pub struct UnknownFluxType(pub String);

impl FromStr for FluxType {
    type Err = UnknownFluxType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mono" => Ok(Self::Mono),
            "ntuple" => Ok(Self::Ntuple),
            "simple_flux" | "simple-ntuple" => Ok(Self::SimpleNtuple),
            "histogram" => Ok(Self::Histogram),
            "atmo_FLUKA" => Ok(Self::Atmospheric(AtmoModel::Fluka)),
            "atmo_BARTOL" => Ok(Self::Atmospheric(AtmoModel::Bartol)),
            other => Err(UnknownFluxType(other.to_string())),
        }
    }
}

/// The flux files a sampler reads, after resolution against the search path.
#[derive(Debug, Clone, PartialEq)]
pub enum FluxFiles {
    /// Individually listed files, ordered and de-duplicated.
    Explicit(BTreeSet<PathBuf>),
    /// A wildcard pattern anchored in the winning search directory, with its matches.
    Pattern {
        pattern: PathBuf,
        matches: Vec<PathBuf>,
    },
}

impl FluxFiles {
    pub fn len(&self) -> usize {
        match self {
            Self::Explicit(files) => files.len(),
            Self::Pattern { matches, .. } => matches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first file a single-file sampler should load.
    pub fn first(&self) -> Option<&PathBuf> {
        match self {
            Self::Explicit(files) => files.iter().next(),
            Self::Pattern { matches, .. } => matches.first(),
        }
    }

    /// Every file in order.
    pub fn paths(&self) -> Vec<&PathBuf> {
        match self {
            Self::Explicit(files) => files.iter().collect(),
            Self::Pattern { matches, .. } => matches.iter().collect(),
        }
    }

    /// Entries as recorded in provenance dumps: listed files, or the resolved pattern.
    pub fn display_entries(&self) -> Vec<String> {
        match self {
            Self::Explicit(files) => files.iter().map(|p| p.display().to_string()).collect(),
            Self::Pattern { pattern, .. } => vec![pattern.display().to_string()],
        }
    }
}

/// Ray geometry of beam-like samplers, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSpec {
    pub direction: Vector3<f64>,
    pub center: Point3<f64>,
    pub radius: f64,
}

/// Energy clamp and generation-surface radii of the atmospheric samplers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmoBounds {
    pub e_min: f64,
    pub e_max: f64,
    /// Distance of the generation disk from the detector origin.
    pub r_l: f64,
    /// Radius of the generation disk.
    pub r_t: f64,
}

/// Everything a flux sampler needs, fixed at configuration time.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxSpec {
    pub flux_type: FluxType,
    pub flavors: BTreeSet<i32>,
    pub files: FluxFiles,
    pub beam: BeamSpec,
    pub mono_energy: f64,
    pub detector_location: String,
    /// Upstream-z override for ntuple rays, ignored at or beyond `1e30` in magnitude.
    pub upstream_z: f64,
    pub atmo: AtmoBounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flux_type_parses_and_displays_canonical_names() {
        for name in ["mono", "ntuple", "simple_flux", "histogram", "atmo_FLUKA", "atmo_BARTOL"] {
            let t: FluxType = name.parse().unwrap();
            assert_eq!(t.to_string(), name);
        }
        assert_eq!("simple-ntuple".parse(), Ok(FluxType::SimpleNtuple));
        assert!("atmo_fluka".parse::<FluxType>().is_err());
    }

    #[test]
    fn flux_type_predicates() {
        assert!(FluxType::Ntuple.is_pot_driven());
        assert!(!FluxType::Histogram.is_pot_driven());
        assert!(FluxType::Atmospheric(AtmoModel::Bartol).is_atmospheric());
        assert!(FluxType::Histogram.has_histograms());
        assert!(!FluxType::Mono.has_histograms());
    }

    #[test]
    fn pattern_files_report_the_pattern_for_provenance() {
        let files = FluxFiles::Pattern {
            pattern: PathBuf::from("/data/flux/gsimple_*.csv"),
            matches: vec![
                PathBuf::from("/data/flux/gsimple_1.csv"),
                PathBuf::from("/data/flux/gsimple_2.csv"),
            ],
        };
        assert_eq!(files.len(), 2);
        assert_eq!(files.first(), Some(&PathBuf::from("/data/flux/gsimple_1.csv")));
        assert_eq!(files.display_entries(), vec!["/data/flux/gsimple_*.csv"]);
    }
}
