use crate::core::event::FourVector;
use nalgebra::Vector3;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    Unknown,
    BeamNeutrino,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrentType {
    #[default]
    Charged,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    QuasiElastic,
    DeepInelastic,
    Resonant,
    Coherent,
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::QuasiElastic => "QE",
            Self::DeepInelastic => "DIS",
            Self::Resonant => "RES",
            Self::Coherent => "COH",
        };
        f.write_str(s)
    }
}

/// One trajectory point: position `(x, y, z, t)` in cm and ns, momentum `(px, py, pz, E)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub position: FourVector,
    pub momentum: FourVector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackParticle {
    /// Negative, sequential identifier: `-1` for the first particle of the event.
    pub track_id: i32,
    pub pdg: i32,
    pub process: String,
    pub mother: i32,
    pub mass: f64,
    pub status: i32,
    pub trajectory: Vec<TrajectoryPoint>,
    /// Raw generator vertex, in fm relative to the struck nucleus.
    pub generator_vertex: FourVector,
    pub rescatter: i32,
    pub polarization: Option<Vector3<f64>>,
}

impl TrackParticle {
    pub fn start(&self) -> Option<&TrajectoryPoint> {
        self.trajectory.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeutrinoInfo {
    pub current: CurrentType,
    pub mode: InteractionMode,
    pub interaction_type: i32,
    pub target: i32,
    pub hit_nucleon: i32,
    pub hit_quark: i32,
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub q_sqr: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TruthRecord {
    pub origin: Origin,
    pub particles: Vec<TrackParticle>,
    pub neutrino: Option<NeutrinoInfo>,
}

impl TruthRecord {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn add(&mut self, particle: TrackParticle) {
        self.particles.push(particle);
    }
}
