//! In-memory stand-ins for the external engines, shared by the unit tests.

use super::environment::ResolvedEnvironment;
use super::services::{
    EventSource, GeometryService, PathLengthList, ScanSettings, ScannerDefaults, ServiceError,
};
use crate::core::event::{EventRecord, FourVector, GeneratedParticle, InteractionRecord};
use crate::core::fiducial::VolumeSelector;
use crate::core::flux::FluxDriver;
use nalgebra::Isometry3;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone)]
pub struct FakeGeometry {
    pub world: String,
    pub top: String,
    /// Every volume passed to `set_top_volume`, in order.
    pub top_history: Vec<String>,
    pub masses: BTreeMap<String, f64>,
    pub length: f64,
    pub selector: Option<VolumeSelector>,
    pub accepts_selector: bool,
    pub scan: Option<ScanSettings>,
    pub path_lengths: Option<PathLengthList>,
}

impl Default for FakeGeometry {
    fn default() -> Self {
        let masses = [("volWorld", 1.0e6), ("volDetEnclosure", 1000.0)]
            .into_iter()
            .map(|(name, mass)| (name.to_string(), mass))
            .collect();
        Self {
            world: "volWorld".to_string(),
            top: "volWorld".to_string(),
            top_history: Vec::new(),
            masses,
            length: 2500.0,
            selector: None,
            accepts_selector: true,
            scan: None,
            path_lengths: None,
        }
    }
}

impl GeometryService for FakeGeometry {
    fn world_volume(&self) -> String {
        self.world.clone()
    }

    fn geometry_file(&self) -> String {
        "det.gdml".to_string()
    }

    fn detector_length(&self) -> f64 {
        self.length
    }

    fn total_mass(&self, volume: &str) -> Result<f64, ServiceError> {
        self.masses
            .get(volume)
            .copied()
            .ok_or_else(|| ServiceError::new("geometry", format!("no volume named {}", volume)))
    }

    fn set_top_volume(&mut self, volume: &str) -> Result<(), ServiceError> {
        if !self.masses.contains_key(volume) {
            return Err(ServiceError::new("geometry", format!("no volume named {}", volume)));
        }
        self.top = volume.to_string();
        self.top_history.push(volume.to_string());
        Ok(())
    }

    fn master_to_top(&self) -> Isometry3<f64> {
        Isometry3::identity()
    }

    fn adopt_volume_selector(&mut self, selector: VolumeSelector) -> bool {
        if self.accepts_selector {
            self.selector = Some(selector);
        }
        self.accepts_selector
    }

    fn scanner_defaults(&self) -> ScannerDefaults {
        ScannerDefaults {
            points: 200,
            rays: 200,
            particles: 10_000,
        }
    }

    fn configure_scan(&mut self, settings: &ScanSettings) -> Result<(), ServiceError> {
        self.scan = Some(settings.clone());
        Ok(())
    }

    fn max_path_lengths(&self) -> Option<PathLengthList> {
        self.path_lengths.clone()
    }
}

/// Replays a fixed list of outcomes, drawing one flux neutrino per request.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    pub outcomes: VecDeque<Option<EventRecord>>,
    pub prob_scale: f64,
    pub environment: Option<ResolvedEnvironment>,
    pub flux_draws: usize,
    /// Flavor of every drawn neutrino.
    pub drawn_pdgs: Vec<i32>,
    pub fail_configure: bool,
}

impl ScriptedSource {
    pub fn new(outcomes: impl IntoIterator<Item = Option<EventRecord>>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            prob_scale: 1.0,
            ..Self::default()
        }
    }

    /// Always produces `event` while the script lasts.
    pub fn repeating(event: EventRecord, times: usize) -> Self {
        Self::new(std::iter::repeat_n(Some(event), times))
    }
}

impl EventSource for ScriptedSource {
    fn configure(
        &mut self,
        environment: &ResolvedEnvironment,
        _flux: &mut dyn FluxDriver,
        _geometry: &mut dyn GeometryService,
    ) -> Result<(), ServiceError> {
        if self.fail_configure {
            return Err(ServiceError::new("event source", "cross sections unavailable"));
        }
        self.environment = Some(environment.clone());
        Ok(())
    }

    fn generate_event(
        &mut self,
        flux: &mut dyn FluxDriver,
        _geometry: &mut dyn GeometryService,
    ) -> Result<Option<Box<dyn InteractionRecord>>, ServiceError> {
        let drawn = flux
            .generate_next()
            .map_err(|e| ServiceError::new("event source", e.to_string()))?;
        if drawn {
            self.flux_draws += 1;
            self.drawn_pdgs.push(flux.pdg_code());
        }
        Ok(self
            .outcomes
            .pop_front()
            .flatten()
            .map(|event| Box::new(event) as Box<dyn InteractionRecord>))
    }

    fn glob_prob_scale(&self) -> f64 {
        self.prob_scale
    }
}

/// A muon-neutrino charged-current quasi-elastic scatter off argon at `vertex` (m).
pub fn numu_cc_event(vertex: FourVector) -> EventRecord {
    let mut record = EventRecord::new(vertex);
    let nu = record.push(GeneratedParticle::new(14, 0, -1, FourVector::new(0.0, 0.0, 2.0, 2.0)));
    record.push(GeneratedParticle::new(
        1000180400,
        0,
        -1,
        FourVector::new(0.0, 0.0, 0.0, 37.2),
    ));
    let nucleon = record.push(GeneratedParticle::new(2112, 11, 1, FourVector::new(0.0, 0.0, 0.0, 0.94)));
    let mu = record.push(GeneratedParticle::new(13, 1, 0, FourVector::new(0.2, 0.1, 1.5, 1.52)));
    record.push(GeneratedParticle::new(2212, 1, 2, FourVector::new(-0.2, -0.1, 0.5, 1.07)));

    record.probe_index = Some(nu);
    record.hit_nucleon_index = Some(nucleon);
    record.lepton_index = Some(mu);

    record.summary.process.interaction_type_id = 2;
    record.summary.process.scattering_type_id = 1;
    record.summary.reaction_code = 1;
    record.summary.initial_state.probe_pdg = 14;
    record.summary.initial_state.probe_p4 = FourVector::new(0.0, 0.0, 2.0, 2.0);
    record.summary.initial_state.target.pdg = 1000180400;
    record.summary.initial_state.target.z = 18;
    record.summary.initial_state.target.a = 40;
    record.summary.initial_state.target.hit_nucleon_pdg = 2112;
    record.weights.weight = 1.0;
    record
}
