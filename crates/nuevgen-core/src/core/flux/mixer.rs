use super::driver::{FluxDriver, FluxError};
use super::flavor::generation;
use crate::core::event::FourVector;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Draws in a row that may come out sterile before the blender gives up.
const MAX_STERILE_REDRAWS: usize = 10_000;

const GENERATION_CODES: [i32; 3] = [12, 14, 16];

/// Transition probabilities between neutrino flavors.
pub trait FlavorMixer: fmt::Debug {
    /// Probability that a neutrino produced as `pdg_in` is seen as `pdg_out` after travelling
    /// `distance` meters with `energy` GeV.
    fn probability(&self, pdg_in: i32, pdg_out: i32, energy: f64, distance: f64) -> f64;

    fn describe(&self) -> String;
}

/// Energy- and distance-independent flavor transitions.
///
/// Configured with one of:
///
/// - `swap 12:14 14:12` or `map 12:14 16:0`: deterministic remapping, `0` means sterile.
/// - `fixedfrac {12:0.1,0.8,0.1} {14:0.0,0.5,0.5}`: probabilities of becoming the e, mu and
///   tau flavor; whatever is left over is sterile.
///
/// The output always keeps the particle/antiparticle sign of the input. Flavors that are not
/// listed pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct FlavorMap {
    rows: BTreeMap<i32, [f64; 3]>,
}

impl FlavorMap {
    pub fn parse(config: &str) -> Result<Self, FluxError> {
        let invalid = |reason: String| FluxError::InvalidMixer {
            config: config.to_string(),
            reason,
        };
        let trimmed = config.trim();
        let (keyword, rest) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));

        let mut rows = BTreeMap::new();
        match keyword.to_lowercase().as_str() {
            "swap" | "map" => {
                for token in rest.split_whitespace() {
                    let (from, to) = token
                        .split_once(':')
                        .ok_or_else(|| invalid(format!("expected 'in:out', got '{}'", token)))?;
                    let from = parse_flavor(from).map_err(&invalid)?;
                    let to: i32 = to
                        .trim()
                        .parse()
                        .map_err(|_| invalid(format!("bad output flavor '{}'", to)))?;
                    let mut row = [0.0; 3];
                    if to != 0 {
                        let g = generation(to)
                            .ok_or_else(|| invalid(format!("{} is not a neutrino", to)))?;
                        row[g - 1] = 1.0;
                    }
                    rows.insert(from, row);
                }
            }
            "fixedfrac" => {
                for group in rest.split('{').skip(1) {
                    let body = group
                        .split_once('}')
                        .map(|(b, _)| b)
                        .ok_or_else(|| invalid("unterminated '{' group".to_string()))?;
                    let (from, fracs) = body
                        .split_once(':')
                        .ok_or_else(|| invalid(format!("expected 'in:pe,pmu,ptau', got '{}'", body)))?;
                    let from = parse_flavor(from).map_err(&invalid)?;
                    let values: Vec<f64> = fracs
                        .split(',')
                        .map(|v| v.trim().parse::<f64>())
                        .collect::<Result<_, _>>()
                        .map_err(|_| invalid(format!("bad fractions '{}'", fracs)))?;
                    if values.len() != 3 || values.iter().any(|v| *v < 0.0) {
                        return Err(invalid(format!("need three non-negative fractions, got '{}'", fracs)));
                    }
                    if values.iter().sum::<f64>() > 1.0 + 1e-9 {
                        return Err(invalid(format!("fractions for {} exceed 1", from)));
                    }
                    rows.insert(from, [values[0], values[1], values[2]]);
                }
            }
            other => return Err(invalid(format!("unknown keyword '{}'", other))),
        }
        if rows.is_empty() {
            return Err(invalid("no flavor transitions given".to_string()));
        }
        Ok(Self { rows })
    }
}

fn parse_flavor(text: &str) -> Result<i32, String> {
    let pdg: i32 = text
        .trim()
        .parse()
        .map_err(|_| format!("bad input flavor '{}'", text))?;
    generation(pdg)
        .map(|_| pdg)
        .ok_or_else(|| format!("{} is not a neutrino", pdg))
}

impl FlavorMixer for FlavorMap {
    fn probability(&self, pdg_in: i32, pdg_out: i32, _energy: f64, _distance: f64) -> f64 {
        if pdg_in.signum() != pdg_out.signum() {
            return 0.0;
        }
        let Some(g_out) = generation(pdg_out) else {
            return 0.0;
        };
        match self.rows.get(&pdg_in) {
            Some(row) => row[g_out - 1],
            None if generation(pdg_in) == Some(g_out) => 1.0,
            None => 0.0,
        }
    }

    fn describe(&self) -> String {
        let rows = self
            .rows
            .iter()
            .map(|(pdg, row)| format!("{} -> [e {:.3}, mu {:.3}, tau {:.3}]", pdg, row[0], row[1], row[2]))
            .join(", ");
        format!("FlavorMap {{ {} }}", rows)
    }
}

/// Wraps a flux driver and remaps the flavor of each draw through a [`FlavorMixer`].
///
/// The wrapped driver is only ever asked for new draws; its own state is left untouched.
/// Draws that come out sterile are thrown away and a new neutrino is requested.
#[derive(Debug)]
pub struct FluxBlender<D: FluxDriver> {
    inner: D,
    mixer: Option<Box<dyn FlavorMixer>>,
    baseline: f64,
    flavors: BTreeSet<i32>,
    current_pdg: i32,
    travel_distance: f64,
    rng: StdRng,
}

impl<D: FluxDriver> FluxBlender<D> {
    pub fn new(inner: D, mixer: Option<Box<dyn FlavorMixer>>, baseline: f64, seed: u64) -> Self {
        let mut flavors = inner.flux_particles().clone();
        if let Some(mixer) = &mixer {
            let energy = inner.max_energy();
            for &pdg_in in inner.flux_particles() {
                for out in GENERATION_CODES.map(|c| c * pdg_in.signum()) {
                    if mixer.probability(pdg_in, out, energy, baseline) > 0.0 {
                        flavors.insert(out);
                    }
                }
            }
        }
        Self {
            inner,
            mixer,
            baseline,
            flavors,
            current_pdg: 0,
            travel_distance: baseline,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn has_mixer(&self) -> bool {
        self.mixer.is_some()
    }

    /// Decay-to-generation distance of the last draw, or the baseline when the wrapped driver
    /// cannot report one.
    pub fn travel_distance(&self) -> f64 {
        self.travel_distance
    }

    /// Flavor of the last draw before mixing.
    pub fn unmixed_pdg(&self) -> i32 {
        self.inner.pdg_code()
    }

    pub fn log_config(&self) {
        info!(
            baseline = self.baseline,
            mixer = %self.mixer.as_ref().map(|m| m.describe()).unwrap_or_else(|| "none".to_string()),
            flavors = ?self.flavors,
            "Flux blender configured"
        );
    }

    pub fn log_state(&self) {
        info!(
            pdg_in = self.inner.pdg_code(),
            pdg_out = self.current_pdg,
            energy = self.inner.momentum().w,
            travel_distance = self.travel_distance,
            "Flux blender state"
        );
    }

    fn choose_flavor(&mut self, pdg_in: i32) -> i32 {
        let Some(mixer) = &self.mixer else {
            return pdg_in;
        };
        let energy = self.inner.momentum().w;
        let u: f64 = self.rng.gen_range(0.0..1.0);
        let mut cumulative = 0.0;
        for out in GENERATION_CODES.map(|c| c * pdg_in.signum()) {
            cumulative += mixer
                .probability(pdg_in, out, energy, self.travel_distance)
                .max(0.0);
            if u < cumulative {
                return out;
            }
        }
        0
    }
}

impl<D: FluxDriver> FluxDriver for FluxBlender<D> {
    fn flux_particles(&self) -> &BTreeSet<i32> {
        &self.flavors
    }

    fn max_energy(&self) -> f64 {
        self.inner.max_energy()
    }

    fn generate_next(&mut self) -> Result<bool, FluxError> {
        for _ in 0..MAX_STERILE_REDRAWS {
            if !self.inner.generate_next()? {
                self.current_pdg = 0;
                return Ok(false);
            }
            self.travel_distance = self.inner.decay_distance().unwrap_or(self.baseline);
            let pdg_in = self.inner.pdg_code();
            let pdg_out = self.choose_flavor(pdg_in);
            if pdg_out != 0 {
                self.current_pdg = pdg_out;
                return Ok(true);
            }
            debug!(pdg_in, "Sterile draw discarded");
        }
        warn!(
            attempts = MAX_STERILE_REDRAWS,
            "Every draw came out sterile; giving up on this neutrino"
        );
        self.current_pdg = 0;
        Ok(false)
    }

    fn pdg_code(&self) -> i32 {
        self.current_pdg
    }

    fn weight(&self) -> f64 {
        self.inner.weight()
    }

    fn momentum(&self) -> FourVector {
        self.inner.momentum()
    }

    fn position(&self) -> FourVector {
        self.inner.position()
    }

    fn end_of_flux(&self) -> bool {
        self.inner.end_of_flux()
    }

    fn decay_distance(&self) -> Option<f64> {
        Some(self.travel_distance)
    }
}
