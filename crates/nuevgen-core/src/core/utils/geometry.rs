use nalgebra::{Point3, Vector3};
use rand::Rng;
use std::f64::consts::PI;

/// Returns two unit vectors spanning the plane perpendicular to `axis`.
pub fn perpendicular_basis(axis: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let n = axis.normalize();
    let mut helper = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    helper = (helper - n * n.dot(&helper)).normalize();
    let u = helper;
    let v = n.cross(&u).normalize();
    (u, v)
}

/// Uniformly samples a point on a disk of `radius` centered at `center`, normal to `normal`.
pub fn sample_on_disk(
    center: &Point3<f64>,
    normal: &Vector3<f64>,
    radius: f64,
    rng: &mut impl Rng,
) -> Point3<f64> {
    let (u, v) = perpendicular_basis(normal);
    let r = radius * rng.gen_range(0.0_f64..1.0).sqrt();
    let phi = 2.0 * PI * rng.gen_range(0.0..1.0);
    center + u * (r * phi.cos()) + v * (r * phi.sin())
}

/// Direction given by a zenith cosine and an azimuth, with `y` pointing up.
pub fn direction_from_zenith(cos_zenith: f64, azimuth: f64) -> Vector3<f64> {
    let sin_zenith = (1.0 - cos_zenith * cos_zenith).max(0.0).sqrt();
    Vector3::new(
        sin_zenith * azimuth.cos(),
        -cos_zenith,
        sin_zenith * azimuth.sin(),
    )
}
