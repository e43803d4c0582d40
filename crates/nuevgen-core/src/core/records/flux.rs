use nalgebra::Point3;
use serde::Deserialize;

/// How the flux of a record was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FluxKind {
    #[default]
    Unknown,
    /// Binned spectra (histogram and atmospheric tables).
    HistPlusFocus,
    Ntuple,
    SimpleFlux,
}

/// Beam-simulation parentage of one flux neutrino.
///
/// Field names follow the beam-simulation ntuple columns so the rows can be read directly from
/// flux files; lengths are in cm, momenta in GeV/c, particle codes are PDG codes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BeamParentage {
    pub run: i32,
    pub evtno: i32,
    pub ndxdz: f64,
    pub ndydz: f64,
    pub npz: f64,
    pub nenergy: f64,
    pub ndxdznea: f64,
    pub ndydznea: f64,
    pub nenergyn: f64,
    pub nwtnear: f64,
    pub ndxdzfar: f64,
    pub ndydzfar: f64,
    pub nenergyf: f64,
    pub nwtfar: f64,
    pub norig: i32,
    pub ndecay: i32,
    pub ntype: i32,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub pdpx: f64,
    pub pdpy: f64,
    pub pdpz: f64,
    pub ppdxdz: f64,
    pub ppdydz: f64,
    pub pppz: f64,
    pub ppenergy: f64,
    pub ppmedium: i32,
    pub ptype: i32,
    pub ppvx: f64,
    pub ppvy: f64,
    pub ppvz: f64,
    pub muparpx: f64,
    pub muparpy: f64,
    pub muparpz: f64,
    pub mupare: f64,
    pub necm: f64,
    pub nimpwt: f64,
    pub xpoint: f64,
    pub ypoint: f64,
    pub zpoint: f64,
    pub tvx: f64,
    pub tvy: f64,
    pub tvz: f64,
    pub tpx: f64,
    pub tpy: f64,
    pub tpz: f64,
    pub tptype: i32,
    pub tgen: i32,
    pub tgptype: i32,
    pub tgppx: f64,
    pub tgppy: f64,
    pub tgppz: f64,
    pub tprivx: f64,
    pub tprivy: f64,
    pub tprivz: f64,
    pub beamx: f64,
    pub beamy: f64,
    pub beamz: f64,
    pub beampx: f64,
    pub beampy: f64,
    pub beampz: f64,
}

/// Per-flavor flux at the energy of the drawn neutrino.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlavorFluxes {
    pub nue: f64,
    pub nuebar: f64,
    pub numu: f64,
    pub numubar: f64,
    pub nutau: f64,
    pub nutaubar: f64,
}

impl FlavorFluxes {
    /// Sets the slot belonging to `pdg`; non-neutrino codes are ignored.
    pub fn set(&mut self, pdg: i32, value: f64) {
        match pdg {
            12 => self.nue = value,
            -12 => self.nuebar = value,
            14 => self.numu = value,
            -14 => self.numubar = value,
            16 => self.nutau = value,
            -16 => self.nutaubar = value,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluxRecord {
    pub kind: FluxKind,
    pub parentage: BeamParentage,
    pub flavor_fluxes: FlavorFluxes,
    /// Ray generation point, in meters.
    pub gen_point: Point3<f64>,
    /// Distance from the ray generation point to the interaction vertex.
    pub gen_to_vertex: f64,
    /// Distance from the neutrino's decay point to the ray generation point.
    pub decay_to_gen: f64,
}

impl FluxRecord {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
