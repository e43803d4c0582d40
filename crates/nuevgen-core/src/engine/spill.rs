use crate::core::constants::{
    ATMOSPHERIC_AREA_CONVERSION, HISTOGRAM_FLUX_POT_NORMALIZATION, NOMINAL_CROSS_SECTION_CM2,
    PROTON_MASS_KG,
};
use crate::core::flux::FluxType;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Poisson};
use std::f64::consts::PI;
use tracing::{debug, info};

/// Below this, events-per-spill counts as unset for histogram fluxes.
const EVENTS_PER_SPILL_UNSET: f64 = 0.01;

/// Mean number of interactions per spill for a histogram flux normalized per 1e20 POT.
pub fn histogram_event_mean(pot_per_spill: f64, target_mass_kg: f64, total_hist_flux: f64) -> f64 {
    NOMINAL_CROSS_SECTION_CM2 * HISTOGRAM_FLUX_POT_NORMALIZATION * pot_per_spill * target_mass_kg
        / PROTON_MASS_KG
        * total_hist_flux
}

/// When a spill is over, fixed at initialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpillPolicy {
    pub flux_type: FluxType,
    pub events_per_spill: f64,
    pub pot_per_spill: f64,
    /// Poisson mean of the per-spill event target; zero unless a histogram flux is driven by POT.
    pub hist_event_mean: f64,
    /// Radius of the atmospheric generation disk, in m.
    pub atmo_r_t: f64,
}

impl SpillPolicy {
    pub fn new(
        flux_type: FluxType,
        events_per_spill: f64,
        pot_per_spill: f64,
        target_mass_kg: f64,
        total_hist_flux: f64,
        atmo_r_t: f64,
    ) -> Self {
        let hist_event_mean =
            if flux_type == FluxType::Histogram && events_per_spill < EVENTS_PER_SPILL_UNSET {
                let mean = histogram_event_mean(pot_per_spill, target_mass_kg, total_hist_flux);
                info!(mean, "Events per spill drawn from a Poisson distribution");
                mean
            } else {
                0.0
            };
        Self {
            flux_type,
            events_per_spill,
            pot_per_spill,
            hist_event_mean,
            atmo_r_t,
        }
    }
}

/// Per-spill event and exposure bookkeeping.
///
/// Exposure is counted in protons on target, except for atmospheric fluxes where it is the
/// equivalent live time in seconds.
#[derive(Debug)]
pub struct SpillAccountant {
    policy: SpillPolicy,
    spill_events: u64,
    spill_exposure: f64,
    total_exposure: f64,
    hist_events_target: u64,
    rng: StdRng,
}

impl SpillAccountant {
    pub fn new(policy: SpillPolicy, seed: u64) -> Self {
        let mut accountant = Self {
            policy,
            spill_events: 0,
            spill_exposure: 0.0,
            total_exposure: 0.0,
            hist_events_target: 0,
            rng: StdRng::seed_from_u64(seed),
        };
        accountant.hist_events_target = accountant.draw_target();
        accountant
    }

    fn draw_target(&mut self) -> u64 {
        match Poisson::new(self.policy.hist_event_mean) {
            Ok(poisson) => poisson.sample(&mut self.rng) as u64,
            Err(_) => 0,
        }
    }

    pub fn policy(&self) -> &SpillPolicy {
        &self.policy
    }

    /// Updates the spill exposure from the protons on target the flux has consumed in total.
    pub fn record_used_pots(&mut self, used_pots: f64, glob_prob_scale: f64) {
        self.spill_exposure = used_pots / glob_prob_scale - self.total_exposure;
    }

    /// Counts one generated interaction, for the flux types that count events.
    pub fn count_event(&mut self) {
        let counts = match self.policy.flux_type {
            FluxType::Histogram | FluxType::Mono => true,
            FluxType::Ntuple | FluxType::SimpleNtuple | FluxType::Atmospheric(_) => {
                self.policy.events_per_spill > 0.0
            }
        };
        if counts {
            self.spill_events += 1;
        }
    }

    /// Decides whether the current spill is complete and, if so, folds it into the lifetime
    /// exposure and starts a new one. `flux_neutrinos` is the atmospheric flux's running count.
    pub fn stop(&mut self, flux_neutrinos: Option<u64>) -> bool {
        let policy = self.policy;
        let events = self.spill_events as f64;

        let complete = if policy.flux_type.is_atmospheric() {
            !(policy.events_per_spill > 0.0 && events < policy.events_per_spill)
        } else if policy.events_per_spill > 0.0 {
            events >= policy.events_per_spill
        } else if policy.flux_type.is_pot_driven() {
            self.spill_exposure >= policy.pot_per_spill
        } else if policy.flux_type == FluxType::Histogram {
            let reached = self.spill_events >= self.hist_events_target;
            if reached {
                self.spill_exposure = policy.pot_per_spill;
            }
            reached
        } else {
            true
        };
        if !complete {
            return false;
        }

        if policy.flux_type.is_atmospheric() {
            let thrown = flux_neutrinos.unwrap_or(0) as f64;
            self.total_exposure =
                ATMOSPHERIC_AREA_CONVERSION * thrown / (PI * policy.atmo_r_t * policy.atmo_r_t);
            debug!(seconds = self.total_exposure, "Atmospheric exposure");
        } else {
            self.total_exposure += self.spill_exposure;
        }
        debug!(
            events = self.spill_events,
            exposure = self.spill_exposure,
            total = self.total_exposure,
            "Spill complete"
        );

        self.spill_events = 0;
        self.spill_exposure = 0.0;
        self.hist_events_target = self.draw_target();
        true
    }

    pub fn spill_events(&self) -> u64 {
        self.spill_events
    }

    pub fn spill_exposure(&self) -> f64 {
        self.spill_exposure
    }

    /// Exposure of all completed spills.
    pub fn total_exposure(&self) -> f64 {
        self.total_exposure
    }

    /// Events the current histogram spill must reach.
    pub fn hist_events_target(&self) -> u64 {
        self.hist_events_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flux::AtmoModel;

    fn policy(flux_type: FluxType, events_per_spill: f64, pot_per_spill: f64) -> SpillPolicy {
        SpillPolicy::new(flux_type, events_per_spill, pot_per_spill, 1000.0, 0.0, 20.0)
    }

    #[test]
    fn fixed_events_per_spill_completes_on_nth_event() {
        let mut acc = SpillAccountant::new(policy(FluxType::Ntuple, 3.0, 5e13), 1);
        for _ in 0..2 {
            for n in 1..3 {
                acc.count_event();
                assert_eq!(acc.spill_events(), n);
                assert!(!acc.stop(None));
            }
            acc.count_event();
            assert!(acc.stop(None));
            assert_eq!(acc.spill_events(), 0);
        }
    }

    #[test]
    fn pot_driven_spill_completes_once_exposure_reached() {
        let mut acc = SpillAccountant::new(policy(FluxType::SimpleNtuple, 0.0, 100.0), 1);
        let mut used = 0.0;
        let mut last_total = acc.total_exposure();
        for _ in 0..3 {
            used += 60.0;
            acc.record_used_pots(used, 1.0);
            acc.count_event();
            assert_eq!(acc.spill_events(), 0, "ntuple events are not counted without a cap");
            assert!(!acc.stop(None));

            used += 60.0;
            acc.record_used_pots(used, 1.0);
            assert!(acc.stop(None));
            assert!(acc.total_exposure() > last_total);
            last_total = acc.total_exposure();
            assert_eq!(acc.spill_exposure(), 0.0);
        }
        assert_eq!(acc.total_exposure(), 360.0);
    }

    #[test]
    fn spill_exposure_is_scaled_by_probability_scale() {
        let mut acc = SpillAccountant::new(policy(FluxType::Ntuple, 0.0, 100.0), 1);
        acc.record_used_pots(50.0, 0.25);
        assert_eq!(acc.spill_exposure(), 200.0);
        assert!(acc.stop(None));
        acc.record_used_pots(60.0, 0.25);
        assert_eq!(acc.spill_exposure(), 40.0);
    }

    #[test]
    fn histogram_event_mean_follows_mass_and_pot() {
        let mean = histogram_event_mean(5e13, 1000.0, 2.0);
        let expected = 1e-38 * 1e-20 * 5e13 * 1000.0 / 1.67262158e-27 * 2.0;
        assert!((mean - expected).abs() <= 1e-12 * expected.abs());
    }

    #[test]
    fn histogram_spill_reaches_poisson_target_and_books_pot() {
        // Mean of about 30 events per spill.
        let flux = 30.0 / histogram_event_mean(1e14, 500.0, 1.0);
        let p = SpillPolicy::new(FluxType::Histogram, 0.0, 1e14, 500.0, flux, 20.0);
        assert!((p.hist_event_mean - 30.0).abs() < 1e-6);

        let mut acc = SpillAccountant::new(p, 11);
        let target = acc.hist_events_target();
        for _ in 0..target {
            assert!(!acc.stop(None));
            acc.count_event();
        }
        assert!(acc.stop(None));
        assert_eq!(acc.total_exposure(), 1e14);
        assert_eq!(acc.spill_events(), 0);
    }

    #[test]
    fn histogram_with_event_cap_has_no_poisson_target() {
        let p = SpillPolicy::new(FluxType::Histogram, 2.0, 1e14, 500.0, 1e30, 20.0);
        assert_eq!(p.hist_event_mean, 0.0);
        let acc = SpillAccountant::new(p, 1);
        assert_eq!(acc.hist_events_target(), 0);
    }

    #[test]
    fn atmospheric_exposure_is_recomputed_from_thrown_neutrinos() {
        let mut acc = SpillAccountant::new(policy(FluxType::Atmospheric(AtmoModel::Fluka), 1.0, 0.0), 1);
        acc.count_event();
        assert!(acc.stop(Some(100)));
        let area = PI * 20.0 * 20.0;
        assert!((acc.total_exposure() - 1e4 * 100.0 / area).abs() < 1e-9);

        acc.count_event();
        assert!(acc.stop(Some(150)));
        assert!((acc.total_exposure() - 1e4 * 150.0 / area).abs() < 1e-9);
    }

    #[test]
    fn mono_counts_every_event() {
        let mut acc = SpillAccountant::new(policy(FluxType::Mono, 1.0, 5e13), 1);
        for _ in 0..5 {
            acc.count_event();
            assert_eq!(acc.spill_events(), 1);
            assert!(acc.stop(None));
            assert_eq!(acc.spill_events(), 0);
        }
    }
}
