use super::driver::{FluxDriver, FluxError};
use crate::core::event::FourVector;
use crate::core::utils::sampling::weighted_choice;
use nalgebra::{Point3, Vector3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;

/// Fixed-energy neutrinos along one ray, flavors drawn with equal weight.
#[derive(Debug)]
pub struct MonoFlux {
    energy: f64,
    flavors: BTreeSet<i32>,
    codes: Vec<i32>,
    weights: Vec<f64>,
    direction: Vector3<f64>,
    origin: Point3<f64>,
    current: Option<i32>,
    rng: StdRng,
}

impl MonoFlux {
    pub fn new(energy: f64, flavors: &BTreeSet<i32>, seed: u64) -> Result<Self, FluxError> {
        if flavors.is_empty() {
            return Err(FluxError::NoFlavors);
        }
        let weight = 1.0 / flavors.len() as f64;
        Ok(Self {
            energy,
            flavors: flavors.clone(),
            codes: flavors.iter().copied().collect(),
            weights: vec![weight; flavors.len()],
            direction: Vector3::z(),
            origin: Point3::origin(),
            current: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Sets the direction cosines; the vector is normalized.
    pub fn set_direction_cos(&mut self, direction: Vector3<f64>) {
        if direction.norm() > 0.0 {
            self.direction = direction.normalize();
        }
    }

    pub fn set_ray_origin(&mut self, origin: Point3<f64>) {
        self.origin = origin;
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }
}

impl FluxDriver for MonoFlux {
    fn flux_particles(&self) -> &BTreeSet<i32> {
        &self.flavors
    }

    fn max_energy(&self) -> f64 {
        self.energy
    }

    fn generate_next(&mut self) -> Result<bool, FluxError> {
        let idx = weighted_choice(&self.weights, &mut self.rng)?;
        self.current = Some(self.codes[idx]);
        Ok(true)
    }

    fn pdg_code(&self) -> i32 {
        self.current.unwrap_or(0)
    }

    fn weight(&self) -> f64 {
        1.0
    }

    fn momentum(&self) -> FourVector {
        let p = self.direction * self.energy;
        FourVector::new(p.x, p.y, p.z, self.energy)
    }

    fn position(&self) -> FourVector {
        FourVector::new(self.origin.x, self.origin.y, self.origin.z, 0.0)
    }

    fn end_of_flux(&self) -> bool {
        false
    }
}
