use super::constants::{KINEMATIC_SENTINEL, NUCLEON_MASS_GEV};
use super::event::FourVector;

/// Lepton-side kinematic invariants of one interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Invariants {
    pub q_sqr: f64,
    pub x: f64,
    pub y: f64,
    pub w: f64,
}

impl Invariants {
    /// All invariants set to the sentinel, used when no struck nucleon is known.
    pub const UNDEFINED: Self = Self {
        q_sqr: KINEMATIC_SENTINEL,
        x: KINEMATIC_SENTINEL,
        y: KINEMATIC_SENTINEL,
        w: KINEMATIC_SENTINEL,
    };

    /// Computes the invariants from the incoming (`k1`) and outgoing (`k2`) lepton momenta.
    ///
    /// With `q = k1 - k2` and `M` the nucleon mass: `Q² = -q²`, `ν = q⁰`,
    /// `x = Q²/(2Mν)`, `y = ν/E1`, `W² = M² + 2Mν - Q²`.
    pub fn from_leptons(k1: &FourVector, k2: &FourVector) -> Self {
        let m = NUCLEON_MASS_GEV;
        let q = k1 - k2;
        let q_sqr = -minkowski_square(&q);
        let nu = q.w;
        let w_sqr = m * m + 2.0 * m * nu - q_sqr;
        Self {
            q_sqr,
            x: q_sqr / (2.0 * m * nu),
            y: nu / k1.w,
            w: w_sqr.sqrt(),
        }
    }
}

/// `E² - |p|²` for a `(px, py, pz, E)` four-vector.
pub fn minkowski_square(p: &FourVector) -> f64 {
    p.w * p.w - (p.x * p.x + p.y * p.y + p.z * p.z)
}
