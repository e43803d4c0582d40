use crate::core::event::FourVector;

/// Generator-internal diagnostics of one interaction.
///
/// Codes and multiplicities default to `-1`, continuous quantities and four-vectors to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorTruth {
    pub interaction_code: i32,
    pub scattering_code: i32,

    pub weight: f64,
    pub probability: f64,
    pub cross_section: f64,
    pub differential_cross_section: f64,
    pub vertex: FourVector,

    pub num_pi_plus: i32,
    pub num_pi_minus: i32,
    pub num_pi0: i32,
    pub num_proton: i32,
    pub num_neutron: i32,
    pub is_charm: bool,
    pub resonance: i32,

    pub gen_q_sqr: f64,
    pub gen_q_sqr_signed: f64,
    pub gen_w: f64,
    pub gen_t: f64,
    pub gen_x: f64,
    pub gen_y: f64,
    pub hadronic_system_p4: FourVector,

    pub is_sea_quark: bool,
    pub hit_nucleon_p4: FourVector,
    pub target_z: i32,
    pub target_a: i32,
    pub target_pdg: i32,

    pub probe_pdg: i32,
    pub probe_p4: FourVector,
}

impl Default for GeneratorTruth {
    fn default() -> Self {
        Self {
            interaction_code: -1,
            scattering_code: -1,
            weight: 0.0,
            probability: 0.0,
            cross_section: 0.0,
            differential_cross_section: 0.0,
            vertex: FourVector::zeros(),
            num_pi_plus: -1,
            num_pi_minus: -1,
            num_pi0: -1,
            num_proton: -1,
            num_neutron: -1,
            is_charm: false,
            resonance: -1,
            gen_q_sqr: 0.0,
            gen_q_sqr_signed: 0.0,
            gen_w: 0.0,
            gen_t: 0.0,
            gen_x: 0.0,
            gen_y: 0.0,
            hadronic_system_p4: FourVector::zeros(),
            is_sea_quark: false,
            hit_nucleon_p4: FourVector::zeros(),
            target_z: 0,
            target_a: 0,
            target_pdg: 0,
            probe_pdg: -1,
            probe_p4: FourVector::zeros(),
        }
    }
}
