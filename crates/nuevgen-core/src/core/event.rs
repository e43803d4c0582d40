use nalgebra::{Vector3, Vector4};

/// Four-vector with components `(x, y, z, t)` or `(px, py, pz, E)`.
pub type FourVector = Vector4<f64>;

/// One particle of a generated interaction, as reported by the generation engine.
///
/// Positions are local to the struck nucleus (fm) and momenta are in GeV/c.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedParticle {
    pub pdg: i32,
    pub status: i32,
    /// Index of the first mother in the event's particle list, `-1` for none.
    pub first_mother: i32,
    pub mass: f64,
    pub position: FourVector,
    pub momentum: FourVector,
    pub rescatter_code: i32,
    pub polarization: Option<Vector3<f64>>,
}

impl GeneratedParticle {
    pub fn new(pdg: i32, status: i32, first_mother: i32, momentum: FourVector) -> Self {
        Self {
            pdg,
            status,
            first_mother,
            mass: 0.0,
            position: FourVector::zeros(),
            momentum,
            rescatter_code: -1,
            polarization: None,
        }
    }

    pub fn energy(&self) -> f64 {
        self.momentum.w
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessInfo {
    pub interaction_type_id: i32,
    pub scattering_type_id: i32,
    pub is_weak_nc: bool,
    pub is_deep_inelastic: bool,
    pub is_resonant: bool,
    pub is_coherent: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetInfo {
    pub pdg: i32,
    pub z: i32,
    pub a: i32,
    pub hit_nucleon_pdg: i32,
    pub hit_quark_pdg: i32,
    pub hit_sea_quark: bool,
    pub hit_nucleon_p4: FourVector,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialStateInfo {
    pub probe_pdg: i32,
    pub probe_p4: FourVector,
    pub target: TargetInfo,
}

/// Exclusive final-state tag: hadron multiplicities and resonance information.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusiveTag {
    pub n_pi_plus: i32,
    pub n_pi_minus: i32,
    pub n_pi0: i32,
    pub n_protons: i32,
    pub n_neutrons: i32,
    pub is_charm: bool,
    pub resonance: i32,
}

/// The generator's own (on-shell, internally tracked) kinematics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorKinematics {
    pub q_sqr: f64,
    pub q_sqr_signed: f64,
    pub w: f64,
    /// Only present when the generator selected a momentum transfer `t`.
    pub t: Option<f64>,
    pub x: f64,
    pub y: f64,
    pub hadronic_system_p4: FourVector,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionSummary {
    pub process: ProcessInfo,
    pub initial_state: InitialStateInfo,
    pub exclusive: ExclusiveTag,
    pub kinematics: GeneratorKinematics,
    /// NUANCE-style reaction code assigned by the generator.
    pub reaction_code: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventWeights {
    pub weight: f64,
    pub probability: f64,
    pub cross_section: f64,
    pub differential_cross_section: f64,
}

/// Read-only view of one interaction produced by the generation engine.
///
/// The orchestrator owns at most one record at a time and only ever inspects it through
/// this interface, so engine adapters and test doubles are interchangeable.
pub trait InteractionRecord {
    /// Interaction vertex `(x, y, z, t)` in meters and seconds.
    fn vertex(&self) -> FourVector;

    /// All particles of the event, in generator order.
    fn particles(&self) -> &[GeneratedParticle];

    /// The incoming neutrino.
    fn probe(&self) -> Option<&GeneratedParticle>;

    fn final_state_primary_lepton(&self) -> Option<&GeneratedParticle>;

    /// The struck nucleon, absent for coherent or nucleus-level scattering.
    fn hit_nucleon(&self) -> Option<&GeneratedParticle>;

    fn summary(&self) -> &InteractionSummary;

    fn weights(&self) -> EventWeights;
}

/// A plain, fully materialized [`InteractionRecord`].
///
/// Engine adapters that can copy their native event representation fill one of these;
/// it is also the natural fixture for tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub vertex: FourVector,
    pub particles: Vec<GeneratedParticle>,
    pub probe_index: Option<usize>,
    pub lepton_index: Option<usize>,
    pub hit_nucleon_index: Option<usize>,
    pub summary: InteractionSummary,
    pub weights: EventWeights,
}

impl EventRecord {
    pub fn new(vertex: FourVector) -> Self {
        Self {
            vertex,
            ..Self::default()
        }
    }

    /// Appends a particle and returns its index.
    pub fn push(&mut self, particle: GeneratedParticle) -> usize {
        self.particles.push(particle);
        self.particles.len() - 1
    }
}

impl InteractionRecord for EventRecord {
    fn vertex(&self) -> FourVector {
        self.vertex
    }

    fn particles(&self) -> &[GeneratedParticle] {
        &self.particles
    }

    fn probe(&self) -> Option<&GeneratedParticle> {
        self.probe_index.and_then(|i| self.particles.get(i))
    }

    fn final_state_primary_lepton(&self) -> Option<&GeneratedParticle> {
        self.lepton_index.and_then(|i| self.particles.get(i))
    }

    fn hit_nucleon(&self) -> Option<&GeneratedParticle> {
        self.hit_nucleon_index.and_then(|i| self.particles.get(i))
    }

    fn summary(&self) -> &InteractionSummary {
        &self.summary
    }

    fn weights(&self) -> EventWeights {
        self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_record_resolves_roles_by_index() {
        let mut record = EventRecord::new(FourVector::new(1.0, 2.0, 3.0, 0.0));
        let nu = record.push(GeneratedParticle::new(14, 0, -1, FourVector::new(0.0, 0.0, 2.0, 2.0)));
        let mu = record.push(GeneratedParticle::new(13, 1, 0, FourVector::new(0.1, 0.0, 1.5, 1.6)));
        record.probe_index = Some(nu);
        record.lepton_index = Some(mu);

        assert_eq!(record.probe().map(|p| p.pdg), Some(14));
        assert_eq!(record.final_state_primary_lepton().map(|p| p.pdg), Some(13));
        assert!(record.hit_nucleon().is_none());
        assert_eq!(record.particles().len(), 2);
    }

    #[test]
    fn out_of_range_role_index_yields_none() {
        let mut record = EventRecord::default();
        record.probe_index = Some(3);
        assert!(record.probe().is_none());
    }
}
