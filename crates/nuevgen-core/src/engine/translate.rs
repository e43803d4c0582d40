use super::config::TimingConfig;
use crate::core::constants::{FERMI_TO_METER, METER_TO_CENTIMETER, NUANCE_OFFSET};
use crate::core::event::{FourVector, GeneratedParticle, InteractionRecord};
use crate::core::flux::{FluxDriver, FluxPipeline, FluxSampler};
use crate::core::kinematics::Invariants;
use crate::core::records::truth::TrajectoryPoint;
use crate::core::records::{
    CurrentType, FlavorFluxes, FluxKind, FluxRecord, GeneratorTruth, InteractionMode, NeutrinoInfo, Origin,
    TrackParticle, TruthRecord,
};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PRIMARY_PROCESS: &str = "primary";

/// Turns generated interactions into the experiment-facing output records.
#[derive(Debug)]
pub struct EventTranslator {
    timing: TimingConfig,
    rng: StdRng,
}

impl EventTranslator {
    pub fn new(timing: TimingConfig, seed: u64) -> Self {
        Self {
            timing,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Start time of the current spill, in ns.
    fn draw_spill_time(&mut self) -> f64 {
        self.timing.global_offset + self.rng.gen_range(0.0..1.0) * self.timing.random_offset
    }

    /// Overwrites `truth` with the particles and interaction summary of `record`.
    pub fn fill_truth(&mut self, record: &dyn InteractionRecord, truth: &mut TruthRecord) {
        truth.clear();
        truth.origin = Origin::BeamNeutrino;

        let vertex = record.vertex();
        let spill_time = self.draw_spill_time();

        for (index, particle) in record.particles().iter().enumerate() {
            truth.add(track_particle(index, particle, &vertex, spill_time));
        }

        let summary = record.summary();
        let process = &summary.process;
        let current = if process.is_weak_nc {
            CurrentType::Neutral
        } else {
            CurrentType::Charged
        };
        let mode = if process.is_deep_inelastic {
            InteractionMode::DeepInelastic
        } else if process.is_resonant {
            InteractionMode::Resonant
        } else if process.is_coherent {
            InteractionMode::Coherent
        } else {
            InteractionMode::QuasiElastic
        };

        let invariants = match (
            record.hit_nucleon(),
            record.probe(),
            record.final_state_primary_lepton(),
        ) {
            (Some(_), Some(probe), Some(lepton)) => {
                Invariants::from_leptons(&probe.momentum, &lepton.momentum)
            }
            _ => Invariants::UNDEFINED,
        };

        let target = &summary.initial_state.target;
        truth.neutrino = Some(NeutrinoInfo {
            current,
            mode,
            interaction_type: NUANCE_OFFSET + summary.reaction_code,
            target: target.pdg,
            hit_nucleon: target.hit_nucleon_pdg,
            hit_quark: target.hit_quark_pdg,
            w: invariants.w,
            x: invariants.x,
            y: invariants.y,
            q_sqr: invariants.q_sqr,
        });
    }

    /// Overwrites `gtruth` with the generator's own view of `record`.
    pub fn fill_generator_truth(&self, record: &dyn InteractionRecord, gtruth: &mut GeneratorTruth) {
        let summary = record.summary();
        let weights = record.weights();
        let exclusive = &summary.exclusive;
        let kinematics = &summary.kinematics;
        let initial = &summary.initial_state;

        let defaults = GeneratorTruth::default();
        *gtruth = GeneratorTruth {
            interaction_code: summary.process.interaction_type_id,
            scattering_code: summary.process.scattering_type_id,

            weight: weights.weight,
            probability: weights.probability,
            cross_section: weights.cross_section,
            differential_cross_section: weights.differential_cross_section,
            vertex: record.vertex(),

            num_pi_plus: exclusive.n_pi_plus,
            num_pi_minus: exclusive.n_pi_minus,
            num_pi0: exclusive.n_pi0,
            num_proton: exclusive.n_protons,
            num_neutron: exclusive.n_neutrons,
            is_charm: exclusive.is_charm,
            resonance: exclusive.resonance,

            gen_q_sqr: kinematics.q_sqr,
            gen_q_sqr_signed: kinematics.q_sqr_signed,
            gen_w: kinematics.w,
            gen_t: kinematics.t.unwrap_or(defaults.gen_t),
            gen_x: kinematics.x,
            gen_y: kinematics.y,
            hadronic_system_p4: kinematics.hadronic_system_p4,

            is_sea_quark: initial.target.hit_sea_quark,
            hit_nucleon_p4: initial.target.hit_nucleon_p4,
            target_z: initial.target.z,
            target_a: initial.target.a,
            target_pdg: initial.target.pdg,

            probe_pdg: initial.probe_pdg,
            probe_p4: initial.probe_p4,
        };
    }
}

fn track_particle(
    index: usize,
    particle: &GeneratedParticle,
    vertex: &FourVector,
    spill_time: f64,
) -> TrackParticle {
    let local = particle.position;
    let position = if matches!(particle.status, 0 | 1) {
        let scaled = (local.xyz() * FERMI_TO_METER + vertex.xyz()) * METER_TO_CENTIMETER;
        FourVector::new(scaled.x, scaled.y, scaled.z, local.w + spill_time)
    } else {
        local
    };

    TrackParticle {
        track_id: -(index as i32) - 1,
        pdg: particle.pdg,
        process: PRIMARY_PROCESS.to_string(),
        mother: particle.first_mother,
        mass: particle.mass,
        status: particle.status,
        trajectory: vec![TrajectoryPoint {
            position,
            momentum: particle.momentum,
        }],
        generator_vertex: local,
        rescatter: particle.rescatter_code,
        polarization: particle.polarization,
    }
}

/// Copies the beam-simulation provenance of the last draw of an ntuple-backed sampler.
///
/// Resets `flux` first. Returns `false` for sampler types that carry no such provenance,
/// leaving `flux` untouched.
pub fn pack_beam_flux(sampler: &FluxSampler, flux: &mut FluxRecord) -> bool {
    match sampler {
        FluxSampler::Ntuple(ntuple) => {
            flux.reset();
            flux.kind = FluxKind::Ntuple;
            if let Some(parentage) = ntuple.pass_through() {
                flux.parentage = parentage.clone();
            }
            true
        }
        FluxSampler::SimpleNtuple(simple) => {
            flux.reset();
            flux.kind = FluxKind::SimpleFlux;
            if let Some(entry) = simple.current_entry() {
                entry.fill_parentage(&mut flux.parentage);
            }
            flux.decay_to_gen = simple.decay_distance().unwrap_or_default();
            true
        }
        _ => false,
    }
}

/// Records the per-flavor histogram flux at `energy` for histogram samplers, and tags
/// atmospheric draws.
pub fn pack_histogram_flux(sampler: &FluxSampler, energy: f64, flux: &mut FluxRecord) {
    match sampler {
        FluxSampler::Histogram(histogram) => {
            flux.kind = FluxKind::HistPlusFocus;
            flux.flavor_fluxes = FlavorFluxes::default();
            for (pdg, value) in histogram.fluxes_at(energy) {
                flux.flavor_fluxes.set(pdg, value);
            }
        }
        FluxSampler::Atmospheric(_) => flux.kind = FluxKind::HistPlusFocus,
        _ => {}
    }
}

/// Fills the ray fields of `flux`: where the neutrino ray started, how far that is from the
/// vertex, and the mixer's travel distance when flavors are mixed.
pub fn pack_ray(pipeline: &FluxPipeline, vertex: &FourVector, flux: &mut FluxRecord) {
    let start = pipeline.sampler().position();
    let start: Vector3<f64> = start.xyz();
    flux.gen_point = Point3::from(start);
    flux.gen_to_vertex = (start - vertex.xyz()).norm();
    if let Some(blender) = pipeline.blender() {
        flux.decay_to_gen = blender.travel_distance();
    }
}
