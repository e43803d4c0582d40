pub mod geometry;
pub mod sampling;
