use super::driver::{FluxDriver, FluxError};
use super::flavor::canonical_name;
use super::spec::BeamSpec;
use crate::core::event::FourVector;
use crate::core::utils::geometry::sample_on_disk;
use crate::core::utils::sampling::{find_bin, weighted_choice};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// A binned energy spectrum: `contents[i]` is the flux between `edges[i]` and `edges[i + 1]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnergySpectrum {
    pub edges: Vec<f64>,
    pub contents: Vec<f64>,
}

impl EnergySpectrum {
    pub fn validate(&self, name: &str) -> Result<(), FluxError> {
        let invalid = |reason: &str| FluxError::InvalidSpectrum {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if self.contents.is_empty() || self.edges.len() != self.contents.len() + 1 {
            return Err(invalid("expected one more edge than bin contents"));
        }
        if self.edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid("bin edges must be strictly increasing"));
        }
        if self.contents.iter().any(|c| *c < 0.0 || !c.is_finite()) {
            return Err(invalid("bin contents must be finite and non-negative"));
        }
        Ok(())
    }

    /// Sum of the bin contents.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    /// Content of the bin holding `energy`, zero outside the spectrum.
    pub fn content_at(&self, energy: f64) -> f64 {
        find_bin(&self.edges, energy)
            .map(|i| self.contents[i])
            .unwrap_or(0.0)
    }

    pub fn max_energy(&self) -> f64 {
        self.edges.last().copied().unwrap_or(0.0)
    }

    fn sample_energy(&self, rng: &mut impl Rng) -> Result<f64, FluxError> {
        let bin = weighted_choice(&self.contents, rng)?;
        let (lo, hi) = (self.edges[bin], self.edges[bin + 1]);
        Ok(lo + (hi - lo) * rng.gen_range(0.0..1.0))
    }
}

/// Loads one spectrum per requested flavor from a TOML file keyed by canonical flavor name.
pub fn load_spectra(
    path: &Path,
    flavors: &BTreeSet<i32>,
) -> Result<Vec<(i32, EnergySpectrum)>, FluxError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| FluxError::Io {
        path: display.clone(),
        source: e,
    })?;
    let mut table: BTreeMap<String, EnergySpectrum> =
        toml::from_str(&content).map_err(|e| FluxError::Toml {
            path: display.clone(),
            source: e,
        })?;

    flavors
        .iter()
        .map(|&pdg| {
            let name = canonical_name(pdg).ok_or(FluxError::UnknownFlavor(pdg))?;
            let spectrum = table
                .remove(name)
                .ok_or_else(|| FluxError::MissingHistogram {
                    name: name.to_string(),
                    pdg,
                    path: display.clone(),
                })?;
            spectrum.validate(name)?;
            Ok((pdg, spectrum))
        })
        .collect()
}

/// Neutrinos drawn from per-flavor energy spectra, on rays parallel to the beam direction that
/// start on a disk around the beam spot.
#[derive(Debug)]
pub struct HistogramFlux {
    spectra: Vec<(i32, EnergySpectrum)>,
    flavors: BTreeSet<i32>,
    integrals: Vec<f64>,
    beam: BeamSpec,
    current: Option<(i32, FourVector, Point3<f64>)>,
    rng: StdRng,
}

impl HistogramFlux {
    pub fn new(
        spectra: Vec<(i32, EnergySpectrum)>,
        beam: BeamSpec,
        seed: u64,
    ) -> Result<Self, FluxError> {
        if spectra.is_empty() {
            return Err(FluxError::NoFlavors);
        }
        let integrals: Vec<f64> = spectra.iter().map(|(_, s)| s.integral()).collect();
        let flavors = spectra.iter().map(|(pdg, _)| *pdg).collect();
        info!(
            direction = ?beam.direction,
            center = ?beam.center,
            radius = beam.radius,
            total = integrals.iter().sum::<f64>(),
            "Histogram flux configured"
        );
        Ok(Self {
            spectra,
            flavors,
            integrals,
            beam,
            current: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Total flux over all requested flavors.
    pub fn total_flux(&self) -> f64 {
        self.integrals.iter().sum()
    }

    pub fn spectra(&self) -> &[(i32, EnergySpectrum)] {
        &self.spectra
    }

    /// Flux of every configured flavor at `energy`.
    pub fn fluxes_at(&self, energy: f64) -> Vec<(i32, f64)> {
        self.spectra
            .iter()
            .map(|(pdg, s)| (*pdg, s.content_at(energy)))
            .collect()
    }
}

impl FluxDriver for HistogramFlux {
    fn flux_particles(&self) -> &BTreeSet<i32> {
        &self.flavors
    }

    fn max_energy(&self) -> f64 {
        self.spectra
            .iter()
            .map(|(_, s)| s.max_energy())
            .fold(0.0, f64::max)
    }

    fn generate_next(&mut self) -> Result<bool, FluxError> {
        let idx = weighted_choice(&self.integrals, &mut self.rng)?;
        let (pdg, spectrum) = &self.spectra[idx];
        let energy = spectrum.sample_energy(&mut self.rng)?;
        let dir = self.beam.direction.normalize();
        let p = dir * energy;
        let origin = sample_on_disk(&self.beam.center, &dir, self.beam.radius, &mut self.rng);
        self.current = Some((*pdg, FourVector::new(p.x, p.y, p.z, energy), origin));
        Ok(true)
    }

    fn pdg_code(&self) -> i32 {
        self.current.map(|(pdg, _, _)| pdg).unwrap_or(0)
    }

    fn weight(&self) -> f64 {
        1.0
    }

    fn momentum(&self) -> FourVector {
        self.current
            .map(|(_, p4, _)| p4)
            .unwrap_or_else(FourVector::zeros)
    }

    fn position(&self) -> FourVector {
        self.current
            .map(|(_, _, o)| FourVector::new(o.x, o.y, o.z, 0.0))
            .unwrap_or_else(FourVector::zeros)
    }

    fn end_of_flux(&self) -> bool {
        false
    }
}
