use nalgebra::Point3;
use std::f64::consts::PI;

/// A closed volume in detector coordinates (cm).
#[derive(Debug, Clone, PartialEq)]
pub enum FiducialShape {
    /// Cylinder parallel to the z axis.
    ZCylinder {
        x0: f64,
        y0: f64,
        radius: f64,
        z_min: f64,
        z_max: f64,
    },
    Box {
        min: Point3<f64>,
        max: Point3<f64>,
    },
    /// Regular prism with `n_faces` sides in the x-y plane, capped in z.
    ///
    /// `phi` (degrees) rotates the first face normal away from +x.
    ZPolygon {
        n_faces: u32,
        x0: f64,
        y0: f64,
        inscribed_radius: f64,
        phi: f64,
        z_min: f64,
        z_max: f64,
    },
    Sphere {
        center: Point3<f64>,
        radius: f64,
    },
}

impl FiducialShape {
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        match self {
            Self::ZCylinder {
                x0,
                y0,
                radius,
                z_min,
                z_max,
            } => {
                let dx = p.x - x0;
                let dy = p.y - y0;
                dx * dx + dy * dy <= radius * radius && p.z >= *z_min && p.z <= *z_max
            }
            Self::Box { min, max } => {
                (0..3).all(|i| p[i] >= min[i] && p[i] <= max[i])
            }
            Self::ZPolygon {
                n_faces,
                x0,
                y0,
                inscribed_radius,
                phi,
                z_min,
                z_max,
            } => {
                if p.z < *z_min || p.z > *z_max || *n_faces < 3 {
                    return false;
                }
                let dx = p.x - x0;
                let dy = p.y - y0;
                let step = 2.0 * PI / f64::from(*n_faces);
                (0..*n_faces).all(|i| {
                    let angle = phi.to_radians() + step * f64::from(i);
                    dx * angle.cos() + dy * angle.sin() <= *inscribed_radius
                })
            }
            Self::Sphere { center, radius } => (p - center).norm_squared() <= radius * radius,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ZCylinder { .. } => "zcyl",
            Self::Box { .. } => "box",
            Self::ZPolygon { .. } => "zpoly",
            Self::Sphere { .. } => "sphere",
        }
    }
}
