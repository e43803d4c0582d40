use super::driver::{FluxDriver, FluxError};
use super::spec::{AtmoBounds, AtmoModel};
use super::tables::read_rows;
use crate::core::event::FourVector;
use crate::core::utils::geometry::{direction_from_zenith, sample_on_disk};
use crate::core::utils::sampling::weighted_choice;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::path::Path;
use tracing::info;

/// Energy bins are logarithmic with this many bins per decade.
const ENERGY_BINS_PER_DECADE: f64 = 10.0;
const COS_ZENITH_BIN_WIDTH: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
struct AtmoBin {
    cos_lo: f64,
    cos_hi: f64,
    e_lo: f64,
    e_hi: f64,
}

/// Flux table of one flavor, clipped to the energy window.
#[derive(Debug, Clone, PartialEq)]
pub struct AtmoTable {
    bins: Vec<AtmoBin>,
    weights: Vec<f64>,
}

impl AtmoTable {
    /// Reads a headerless table of `(cos_zenith, energy, flux)` rows for FLUKA or
    /// `(energy, cos_zenith, flux)` rows for BARTOL, with values at bin centers.
    pub fn load(path: &Path, model: AtmoModel, e_min: f64, e_max: f64) -> Result<Self, FluxError> {
        let rows: Vec<(f64, f64, f64)> = read_rows(path, false)?;
        let half_decade = 0.5 / ENERGY_BINS_PER_DECADE;
        let half_cos = 0.5 * COS_ZENITH_BIN_WIDTH;

        let mut bins = Vec::new();
        let mut weights = Vec::new();
        for (a, b, flux) in rows {
            let (cos_zenith, energy) = match model {
                AtmoModel::Fluka => (a, b),
                AtmoModel::Bartol => (b, a),
            };
            let e_lo = energy * 10f64.powf(-half_decade);
            let e_hi = energy * 10f64.powf(half_decade);
            let lo = e_lo.max(e_min);
            let hi = e_hi.min(e_max);
            if hi <= lo || flux <= 0.0 {
                continue;
            }
            bins.push(AtmoBin {
                cos_lo: (cos_zenith - half_cos).max(-1.0),
                cos_hi: (cos_zenith + half_cos).min(1.0),
                e_lo: lo,
                e_hi: hi,
            });
            weights.push(flux * (hi - lo) * COS_ZENITH_BIN_WIDTH * 2.0 * PI);
        }
        if bins.is_empty() {
            return Err(FluxError::EmptyFlux {
                path: path.to_string_lossy().to_string(),
            });
        }
        Ok(Self { bins, weights })
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    fn max_energy(&self) -> f64 {
        self.bins.iter().map(|b| b.e_hi).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AtmoDraw {
    pdg: i32,
    momentum: FourVector,
    origin: Point3<f64>,
}

/// Atmospheric neutrinos arriving from all directions, generated on a disk of radius `Rt`
/// placed `Rl` away from the detector origin, facing the incoming neutrino.
#[derive(Debug)]
pub struct AtmosphericFlux {
    model: AtmoModel,
    flavors: BTreeSet<i32>,
    tables: Vec<(i32, AtmoTable)>,
    totals: Vec<f64>,
    bounds: AtmoBounds,
    n_neutrinos: u64,
    current: Option<AtmoDraw>,
    rng: StdRng,
}

impl AtmosphericFlux {
    pub fn new(
        model: AtmoModel,
        tables: Vec<(i32, AtmoTable)>,
        bounds: AtmoBounds,
        seed: u64,
    ) -> Result<Self, FluxError> {
        if tables.is_empty() {
            return Err(FluxError::NoFlavors);
        }
        info!(
            ?model,
            e_min = bounds.e_min,
            e_max = bounds.e_max,
            r_l = bounds.r_l,
            r_t = bounds.r_t,
            "Atmospheric flux configured"
        );
        Ok(Self {
            model,
            flavors: tables.iter().map(|(pdg, _)| *pdg).collect(),
            totals: tables.iter().map(|(_, t)| t.total()).collect(),
            tables,
            bounds,
            n_neutrinos: 0,
            current: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn model(&self) -> AtmoModel {
        self.model
    }

    /// Number of neutrinos thrown so far.
    pub fn n_flux_neutrinos(&self) -> u64 {
        self.n_neutrinos
    }

    pub fn bounds(&self) -> &AtmoBounds {
        &self.bounds
    }
}

impl FluxDriver for AtmosphericFlux {
    fn flux_particles(&self) -> &BTreeSet<i32> {
        &self.flavors
    }

    fn max_energy(&self) -> f64 {
        self.tables
            .iter()
            .map(|(_, t)| t.max_energy())
            .fold(0.0, f64::max)
    }

    fn generate_next(&mut self) -> Result<bool, FluxError> {
        let flavor = weighted_choice(&self.totals, &mut self.rng)?;
        let (pdg, table) = &self.tables[flavor];
        let bin = table.bins[weighted_choice(&table.weights, &mut self.rng)?];

        let energy = bin.e_lo + (bin.e_hi - bin.e_lo) * self.rng.gen_range(0.0..1.0);
        let cos_zenith = bin.cos_lo + (bin.cos_hi - bin.cos_lo) * self.rng.gen_range(0.0..1.0);
        let azimuth = 2.0 * PI * self.rng.gen_range(0.0..1.0);
        let dir: Vector3<f64> = direction_from_zenith(cos_zenith, azimuth);

        let disk_center = Point3::from(-dir * self.bounds.r_l);
        let origin = sample_on_disk(&disk_center, &dir, self.bounds.r_t, &mut self.rng);
        let p = dir * energy;

        self.n_neutrinos += 1;
        self.current = Some(AtmoDraw {
            pdg: *pdg,
            momentum: FourVector::new(p.x, p.y, p.z, energy),
            origin,
        });
        Ok(true)
    }

    fn pdg_code(&self) -> i32 {
        self.current.map(|d| d.pdg).unwrap_or(0)
    }

    fn weight(&self) -> f64 {
        1.0
    }

    fn momentum(&self) -> FourVector {
        self.current
            .map(|d| d.momentum)
            .unwrap_or_else(FourVector::zeros)
    }

    fn position(&self) -> FourVector {
        self.current
            .map(|d| FourVector::new(d.origin.x, d.origin.y, d.origin.z, 0.0))
            .unwrap_or_else(FourVector::zeros)
    }

    fn end_of_flux(&self) -> bool {
        false
    }
}
