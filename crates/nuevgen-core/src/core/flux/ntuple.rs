use super::driver::{FluxDriver, FluxError};
use super::tables::{read_header, read_rows};
use crate::core::constants::UPSTREAM_Z_UNSET_LIMIT;
use crate::core::event::FourVector;
use crate::core::records::BeamParentage;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

const CM_TO_M: f64 = 0.01;

/// Which detector's energy, weight and direction columns a beam-simulation entry is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorLocation {
    Near,
    Far,
}

impl FromStr for DetectorLocation {
    type Err = FluxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if lower.contains("near") {
            Ok(Self::Near)
        } else if lower.contains("far") {
            Ok(Self::Far)
        } else {
            Err(FluxError::UnknownDetectorLocation(s.to_string()))
        }
    }
}

/// Returns the upstream-z override when it is set.
pub fn upstream_override(upstream_z: f64) -> Option<f64> {
    (upstream_z.abs() < UPSTREAM_Z_UNSET_LIMIT).then_some(upstream_z)
}

/// Moves `origin` along `dir` onto the plane `z = z_plane`; returns the new point and the
/// signed distance travelled.
fn shift_to_plane(origin: Point3<f64>, dir: &Vector3<f64>, z_plane: f64) -> (Point3<f64>, f64) {
    if dir.z.abs() < f64::EPSILON {
        return (origin, 0.0);
    }
    let t = (z_plane - origin.z) / dir.z;
    (origin + dir * t, t)
}

/// Ray state of the last accepted neutrino.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Draw {
    index: usize,
    pdg: i32,
    momentum: FourVector,
    origin: Point3<f64>,
    decay_distance: f64,
}

/// Walks a cyclic list of weighted entries, accepting each with probability `w / w_max`.
#[derive(Debug)]
struct WeightedCursor {
    weights: Vec<f64>,
    eligible: Vec<bool>,
    max_weight: f64,
    next: usize,
    considered: u64,
}

impl WeightedCursor {
    fn new(weights: Vec<f64>, eligible: Vec<bool>) -> Self {
        let max_weight = weights
            .iter()
            .zip(&eligible)
            .filter(|(_, ok)| **ok)
            .map(|(w, _)| *w)
            .fold(0.0, f64::max);
        Self {
            weights,
            eligible,
            max_weight,
            next: 0,
            considered: 0,
        }
    }

    fn is_usable(&self) -> bool {
        self.max_weight > 0.0
    }

    /// Index of the next accepted entry, `None` after 64 passes without an acceptance.
    fn advance(&mut self, rng: &mut impl Rng) -> Option<usize> {
        let n = self.weights.len();
        if n == 0 || !self.is_usable() {
            return None;
        }
        for _ in 0..(n * 64) {
            let i = self.next;
            self.next = (self.next + 1) % n;
            self.considered += 1;
            if !self.eligible[i] {
                continue;
            }
            if rng.gen_range(0.0..1.0) * self.max_weight < self.weights[i] {
                return Some(i);
            }
        }
        None
    }

    fn fraction_used(&self) -> f64 {
        if self.weights.is_empty() {
            0.0
        } else {
            self.considered as f64 / self.weights.len() as f64
        }
    }
}

/// Beam-simulation ntuple flux: full parentage rows read from CSV tables.
#[derive(Debug)]
pub struct NtupleFlux {
    entries: Vec<BeamParentage>,
    flavors: BTreeSet<i32>,
    location: DetectorLocation,
    upstream_z: Option<f64>,
    file_pots: f64,
    cursor: WeightedCursor,
    current: Option<Draw>,
    rng: StdRng,
}

impl NtupleFlux {
    pub fn load(
        files: &[&PathBuf],
        location: DetectorLocation,
        flavors: &BTreeSet<i32>,
        seed: u64,
    ) -> Result<Self, FluxError> {
        let mut entries = Vec::new();
        let mut file_pots = 0.0;
        for path in files {
            let rows: Vec<BeamParentage> = read_rows(path, true)?;
            if rows.is_empty() {
                return Err(FluxError::EmptyFlux {
                    path: path.to_string_lossy().to_string(),
                });
            }
            // Protons are numbered per file; the highest number is the file's exposure.
            file_pots += rows.iter().map(|r| r.evtno).max().unwrap_or(0) as f64;
            debug!(path = %path.display(), entries = rows.len(), "Loaded beam simulation file");
            entries.extend(rows);
        }

        let weights = entries.iter().map(|e| Self::weight_of(e, location)).collect();
        let eligible = entries.iter().map(|e| flavors.contains(&e.ntype)).collect();
        let cursor = WeightedCursor::new(weights, eligible);
        if !cursor.is_usable() {
            return Err(FluxError::EmptyFlux {
                path: files
                    .first()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default(),
            });
        }
        info!(
            entries = entries.len(),
            pots = file_pots,
            ?location,
            "Beam simulation flux loaded"
        );
        Ok(Self {
            entries,
            flavors: flavors.clone(),
            location,
            upstream_z: None,
            file_pots,
            cursor,
            current: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn set_upstream_z(&mut self, z: f64) {
        self.upstream_z = Some(z);
    }

    fn weight_of(entry: &BeamParentage, location: DetectorLocation) -> f64 {
        let wt = match location {
            DetectorLocation::Near => entry.nwtnear,
            DetectorLocation::Far => entry.nwtfar,
        };
        entry.nimpwt * wt
    }

    fn ray_of(&self, entry: &BeamParentage) -> (f64, Vector3<f64>) {
        match self.location {
            DetectorLocation::Near => (
                entry.nenergyn,
                Vector3::new(entry.ndxdznea, entry.ndydznea, 1.0).normalize(),
            ),
            DetectorLocation::Far => (
                entry.nenergyf,
                Vector3::new(entry.ndxdzfar, entry.ndydzfar, 1.0).normalize(),
            ),
        }
    }

    /// Protons on target consumed so far, including rejected entries.
    pub fn used_pots(&self) -> f64 {
        self.cursor.fraction_used() * self.file_pots
    }

    /// Parentage of the last accepted neutrino.
    pub fn pass_through(&self) -> Option<&BeamParentage> {
        self.current.map(|d| &self.entries[d.index])
    }
}

impl FluxDriver for NtupleFlux {
    fn flux_particles(&self) -> &BTreeSet<i32> {
        &self.flavors
    }

    fn max_energy(&self) -> f64 {
        self.entries
            .iter()
            .filter(|e| self.flavors.contains(&e.ntype))
            .map(|e| self.ray_of(e).0)
            .fold(0.0, f64::max)
    }

    fn generate_next(&mut self) -> Result<bool, FluxError> {
        let Some(index) = self.cursor.advance(&mut self.rng) else {
            self.current = None;
            return Ok(false);
        };
        let entry = &self.entries[index];
        let (energy, dir) = self.ray_of(entry);
        let decay = Point3::new(entry.vx, entry.vy, entry.vz) * CM_TO_M;
        let (origin, moved) = match self.upstream_z {
            Some(z) => shift_to_plane(decay, &dir, z),
            None => (decay, 0.0),
        };
        let p = dir * energy;
        self.current = Some(Draw {
            index,
            pdg: entry.ntype,
            momentum: FourVector::new(p.x, p.y, p.z, energy),
            origin,
            decay_distance: moved.abs(),
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

    fn decay_distance(&self) -> Option<f64> {
        self.current.map(|d| d.decay_distance)
    }
}

/// One row of a simplified flux table: the neutrino ray plus optional parentage columns.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimpleEntry {
    pub pdg: i32,
    pub wgt: f64,
    /// Ray origin, in meters.
    pub vtxx: f64,
    pub vtxy: f64,
    pub vtxz: f64,
    /// Distance from the decay point to the ray origin.
    pub dist: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    #[serde(rename = "E")]
    pub energy: f64,
    pub run: Option<i32>,
    pub evtno: Option<i32>,
    pub tpx: Option<f64>,
    pub tpy: Option<f64>,
    pub tpz: Option<f64>,
    pub tptype: Option<i32>,
    pub vx: Option<f64>,
    pub vy: Option<f64>,
    pub vz: Option<f64>,
    pub ndecay: Option<i32>,
    pub ppmedium: Option<i32>,
}

impl SimpleEntry {
    /// True when the beam-simulation auxiliary columns are present.
    pub fn has_aux(&self) -> bool {
        self.run.is_some() && self.evtno.is_some()
    }

    /// Copies this entry into a parentage record.
    pub fn fill_parentage(&self, out: &mut BeamParentage) {
        out.ntype = self.pdg;
        out.nimpwt = self.wgt;
        if !self.has_aux() {
            return;
        }
        out.run = self.run.unwrap_or_default();
        out.evtno = self.evtno.unwrap_or_default();
        out.tpx = self.tpx.unwrap_or_default();
        out.tpy = self.tpy.unwrap_or_default();
        out.tpz = self.tpz.unwrap_or_default();
        out.tptype = self.tptype.unwrap_or_default();
        out.vx = self.vx.unwrap_or_default();
        out.vy = self.vy.unwrap_or_default();
        out.vz = self.vz.unwrap_or_default();
        out.ndecay = self.ndecay.unwrap_or_default();
        out.ppmedium = self.ppmedium.unwrap_or_default();
    }
}

#[derive(Debug, Default, Deserialize)]
struct SimpleFluxMeta {
    #[serde(default)]
    protons_on_target: f64,
}

/// Simplified flux tables: one pre-computed ray per row, with per-file exposure metadata.
#[derive(Debug)]
pub struct SimpleNtupleFlux {
    entries: Vec<SimpleEntry>,
    flavors: BTreeSet<i32>,
    upstream_z: Option<f64>,
    file_pots: f64,
    cursor: WeightedCursor,
    current: Option<Draw>,
    rng: StdRng,
}

impl SimpleNtupleFlux {
    pub fn load(files: &[&PathBuf], flavors: &BTreeSet<i32>, seed: u64) -> Result<Self, FluxError> {
        let mut entries = Vec::new();
        let mut file_pots = 0.0;
        for path in files {
            let meta: SimpleFluxMeta = read_header(path)?;
            let rows: Vec<SimpleEntry> = read_rows(path, true)?;
            if rows.is_empty() {
                return Err(FluxError::EmptyFlux {
                    path: path.to_string_lossy().to_string(),
                });
            }
            file_pots += meta.protons_on_target;
            debug!(path = %path.display(), entries = rows.len(), pots = meta.protons_on_target, "Loaded simple flux file");
            entries.extend(rows);
        }

        let weights = entries.iter().map(|e| e.wgt).collect();
        let eligible = entries.iter().map(|e| flavors.contains(&e.pdg)).collect();
        let cursor = WeightedCursor::new(weights, eligible);
        if !cursor.is_usable() {
            return Err(FluxError::EmptyFlux {
                path: files
                    .first()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default(),
            });
        }
        Ok(Self {
            entries,
            flavors: flavors.clone(),
            upstream_z: None,
            file_pots,
            cursor,
            current: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn set_upstream_z(&mut self, z: f64) {
        self.upstream_z = Some(z);
    }

    pub fn used_pots(&self) -> f64 {
        self.cursor.fraction_used() * self.file_pots
    }

    pub fn current_entry(&self) -> Option<&SimpleEntry> {
        self.current.map(|d| &self.entries[d.index])
    }
}

impl FluxDriver for SimpleNtupleFlux {
    fn flux_particles(&self) -> &BTreeSet<i32> {
        &self.flavors
    }

    fn max_energy(&self) -> f64 {
        self.entries
            .iter()
            .filter(|e| self.flavors.contains(&e.pdg))
            .map(|e| e.energy)
            .fold(0.0, f64::max)
    }

    fn generate_next(&mut self) -> Result<bool, FluxError> {
        let Some(index) = self.cursor.advance(&mut self.rng) else {
            self.current = None;
            return Ok(false);
        };
        let entry = &self.entries[index];
        let p = Vector3::new(entry.px, entry.py, entry.pz);
        let vtx = Point3::new(entry.vtxx, entry.vtxy, entry.vtxz);
        let (origin, moved) = match (self.upstream_z, p.try_normalize(f64::EPSILON)) {
            (Some(z), Some(dir)) => shift_to_plane(vtx, &dir, z),
            _ => (vtx, 0.0),
        };
        self.current = Some(Draw {
            index,
            pdg: entry.pdg,
            momentum: FourVector::new(p.x, p.y, p.z, entry.energy),
            origin,
            decay_distance: entry.dist + moved,
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

    fn decay_distance(&self) -> Option<f64> {
        self.current.map(|d| d.decay_distance)
    }
}
