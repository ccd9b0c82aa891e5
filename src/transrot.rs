//! Translation and rotation

use crate::{
    objects::{HitRecord, Hittable, SurfaceObj},
    Ray, Vec3,
};
use nalgebra::{Rotation3, Unit};

/// Translate a surface
pub struct Translate {
    obj: SurfaceObj,
    offset: Vec3,
}
impl Translate {
    pub fn new(obj: SurfaceObj, offset: Vec3) -> Self {
        Self { obj, offset }
    }
}
impl Hittable for Translate {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let moved_ray = Ray::new(ray.orig - self.offset, ray.dir);

        self.obj.try_hit(&moved_ray, t_min, t_max).map(|mut hr| {
            hr.p += self.offset;
            hr
        })
    }
}
impl Clone for Translate {
    fn clone(&self) -> Self {
        Self {
            obj: dyn_clone::clone_box(&*self.obj),
            offset: self.offset,
        }
    }
}

/// Rotate a surface about an arbitrary pole through the origin
///
/// Queries are carried into the surface's own frame and the hit carried
/// back out, so the wrapped geometry never moves.
pub struct Rotate {
    obj: SurfaceObj,
    rotation: Rotation3<f64>,
    inverse: Rotation3<f64>,
}
impl Rotate {
    pub fn new(obj: SurfaceObj, pole: Vec3, angle_deg: f64) -> Self {
        let axis = Unit::new_normalize(pole);
        let rotation = Rotation3::from_axis_angle(&axis, angle_deg.to_radians());
        let inverse = rotation.inverse();
        Self {
            obj,
            rotation,
            inverse,
        }
    }
}
impl Hittable for Rotate {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let rotated_ray = Ray::new(self.inverse * ray.orig, self.inverse * ray.dir);

        self.obj.try_hit(&rotated_ray, t_min, t_max).map(|mut hr| {
            // Rotating point and normal together preserves the
            // front-face orientation
            hr.p = self.rotation * hr.p;
            hr.normal = self.rotation * hr.normal;
            hr
        })
    }
}
impl Clone for Rotate {
    fn clone(&self) -> Self {
        Self {
            obj: dyn_clone::clone_box(&*self.obj),
            rotation: self.rotation,
            inverse: self.inverse,
        }
    }
}
