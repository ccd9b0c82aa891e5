//! Prism Beam Simulation Library

use nalgebra::Vector3;

pub mod beam;
pub mod channels;
pub mod error;
pub mod materials;
pub mod objects;
pub mod optics;
pub mod transrot;
pub mod utils;

pub type Vec3 = Vector3<f64>;
pub type Point = Vec3;
pub type Color = Vec3;

/// Prelude
pub mod prelude {
    pub use crate::beam::{Beam, BeamSegment, Emitter, Frame, Simulator};
    pub use crate::channels::Channel;
    pub use crate::error::{SimError, SimResult};
    pub use crate::materials::PrismMaterial;
    pub use crate::objects::{Axis, HittableList, Rect, Slab, Sphere};
    pub use crate::transrot::{Rotate, Translate};
    pub use crate::{Color, Point, Ray, Vec3};
}

/// The ray in beam tracing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub orig: Point,
    pub dir: Vec3,
}
impl Ray {
    pub fn new(orig: Point, dir: Vec3) -> Self {
        Self { orig, dir }
    }

    pub fn get(&self, t: f64) -> Point {
        self.orig + t * self.dir
    }
}
