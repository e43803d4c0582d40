use super::parser::{FiducialSpec, RockBoxSpec};
use super::shapes::FiducialShape;
use nalgebra::{Isometry3, Point3, Vector3};

/// Point-inclusion test attached to the geometry to restrict where vertices may be placed.
///
/// Query points are always in top-volume coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeSelector {
    Fiducial {
        shape: FiducialShape,
        reverse: bool,
        /// Present when the shape was given in master coordinates.
        master_to_top: Option<Isometry3<f64>>,
    },
    RockBox {
        spec: RockBoxSpec,
        exclusion: FiducialShape,
    },
}

impl VolumeSelector {
    pub fn from_spec(spec: &FiducialSpec, master_to_top: &Isometry3<f64>) -> Self {
        match spec {
            FiducialSpec::Volume {
                shape,
                reverse,
                master,
            } => Self::Fiducial {
                shape: shape.clone(),
                reverse: *reverse,
                master_to_top: master.then_some(*master_to_top),
            },
            FiducialSpec::RockBox(rb) => Self::RockBox {
                spec: rb.clone(),
                exclusion: rb.exclusion(),
            },
        }
    }

    pub fn contains(&self, point: &Point3<f64>) -> bool {
        self.contains_at_energy(point, 0.0)
    }

    /// Inclusion test for a neutrino of `energy` GeV.
    ///
    /// Only the rock box depends on the energy: its wall grows with the muon range.
    pub fn contains_at_energy(&self, point: &Point3<f64>, energy: f64) -> bool {
        match self {
            Self::Fiducial {
                shape,
                reverse,
                master_to_top,
            } => {
                let local = match master_to_top {
                    Some(iso) => iso.inverse_transform_point(point),
                    None => *point,
                };
                shape.contains(&local) != *reverse
            }
            Self::RockBox { spec, exclusion } => {
                let wall = spec.wall_min.max(energy / spec.effective_dedx());
                let pad = Vector3::repeat(wall);
                let outer = FiducialShape::Box {
                    min: spec.min - pad,
                    max: spec.max + pad,
                };
                outer.contains(point) && !exclusion.contains(point)
            }
        }
    }

    pub fn is_reversed(&self) -> bool {
        matches!(self, Self::Fiducial { reverse: true, .. })
    }
}
