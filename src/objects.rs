//! Objects

use crate::{
    error::SimResult,
    materials::{MaterialConfig, PrismMaterial},
    utils::SerdeVector,
    Point, Ray, Vec3,
};
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};

pub type SurfaceObj = Box<dyn Hittable + Send + Sync>;

/// The geometry oracle queried by every trace step
///
/// Implementations report the nearest intersection within `[t_min,
/// t_max]` or nothing. A hit on bare geometry carries no material; that
/// is a valid outcome, not an error.
pub trait Hittable: DynClone {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord>;
}

#[derive(Default)]
pub struct HittableList(pub Vec<SurfaceObj>);
impl HittableList {
    pub fn add(&mut self, boxed_obj: SurfaceObj) {
        self.0.push(boxed_obj)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_config(config: HittableListConfig) -> SimResult<Self> {
        let mut s = Self::default();
        for obj_cfg in config.objects {
            s.add(Generator::from_config(obj_cfg)?);
        }
        Ok(s)
    }
}
impl Hittable for HittableList {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let mut closest_so_far = t_max;
        let mut hr_final = None;

        for obj in &self.0 {
            if let Some(hr) = obj.try_hit(ray, t_min, closest_so_far) {
                closest_so_far = hr.t;
                hr_final = Some(hr)
            }
        }
        hr_final
    }
}
// NOTE -- manual impl because the members are trait objects -- you cannot
// derive Clone over those
impl Clone for HittableList {
    fn clone(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|obj| dyn_clone::clone_box(&**obj))
                .collect(),
        )
    }
}

/// Hittable List Config
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HittableListConfig {
    objects: Vec<SurfaceConfig>,
}

/// Config for any surface the oracle can hold
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceConfig {
    Sphere(SphereConfig),
    Rect(RectConfig),
    Slab(SlabConfig),
}

/// Generator from config
pub struct Generator;
impl Generator {
    pub fn from_config(config: SurfaceConfig) -> SimResult<SurfaceObj> {
        Ok(match config {
            SurfaceConfig::Sphere(c) => Box::new(Sphere::from_config(c)?),
            SurfaceConfig::Rect(c) => Box::new(Rect::from_config(c)?),
            SurfaceConfig::Slab(c) => Box::new(Slab::from_config(c)?),
        })
    }
}

/// Represents a hit
pub struct HitRecord {
    /// Point of intersection
    pub p: Point,
    /// Normal vector, flipped to face the query ray
    pub normal: Vec3,
    /// Ray parameter of the intersection
    pub t: f64,
    /// Whether the query ray arrived from outside the surface
    pub front_face: bool,
    /// Refractive parameters, absent for bare geometry
    pub material: Option<PrismMaterial>,
}
impl HitRecord {
    pub fn new(
        p: Point,
        t: f64,
        ray: &Ray,
        outward_normal: &Vec3,
        material: Option<PrismMaterial>,
    ) -> Self {
        let front_face = ray.dir.dot(outward_normal) < 0.0;
        let mut normal = outward_normal.to_owned();
        if !front_face {
            normal = -normal;
        }
        Self {
            p,
            normal,
            t,
            front_face,
            material,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Point,
    pub radius: f64,
    pub material: Option<PrismMaterial>,
}
impl Sphere {
    pub fn new(center: Point, radius: f64, material: Option<PrismMaterial>) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    pub fn from_config(config: SphereConfig) -> SimResult<Self> {
        Ok(Self::new(
            config.center.into(),
            config.radius,
            material_from_config(config.material)?,
        ))
    }
}
impl Hittable for Sphere {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let oc = ray.orig - self.center;
        let a = ray.dir.norm().powi(2);
        let half_b = oc.dot(&ray.dir);
        let c = oc.norm().powi(2) - self.radius.powi(2);
        let discriminant = half_b.powi(2) - a * c;
        if discriminant < 0.0 {
            return None;
        }

        // Find the nearest root that lies in the acceptable range
        let sqrtd = discriminant.sqrt();
        let mut root = (-half_b - sqrtd) / a;
        if root < t_min || t_max < root {
            root = (-half_b + sqrtd) / a;
            if root < t_min || t_max < root {
                return None;
            }
        }
        let p = ray.get(root);
        let outward_normal = ((p - self.center) / self.radius).normalize();
        Some(HitRecord::new(p, root, ray, &outward_normal, self.material))
    }
}

/// Sphere config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereConfig {
    pub center: SerdeVector,
    pub radius: f64,
    pub material: Option<MaterialConfig>,
}

/// The axis a rectangle's plane normal lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}
impl Axis {
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two remaining indices, in index order
    pub fn in_plane(&self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }

    pub fn unit(&self) -> Vec3 {
        let mut v = Vec3::zeros();
        v[self.index()] = 1.0;
        v
    }
}

/// Axis-aligned rectangle
///
/// `a0..a1` and `b0..b1` span the two in-plane axes in index order; `k`
/// is the plane offset along the normal axis.
#[derive(Debug, Clone)]
pub struct Rect {
    axis: Axis,
    a0: f64,
    a1: f64,
    b0: f64,
    b1: f64,
    k: f64,
    material: Option<PrismMaterial>,
}
impl Rect {
    pub fn new(
        axis: Axis,
        a0: f64,
        a1: f64,
        b0: f64,
        b1: f64,
        k: f64,
        material: Option<PrismMaterial>,
    ) -> Self {
        Self {
            axis,
            a0,
            a1,
            b0,
            b1,
            k,
            material,
        }
    }

    pub fn from_config(config: RectConfig) -> SimResult<Self> {
        Ok(Self::new(
            config.axis,
            config.a0,
            config.a1,
            config.b0,
            config.b1,
            config.k,
            material_from_config(config.material)?,
        ))
    }
}
impl Hittable for Rect {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let ni = self.axis.index();
        let (ai, bi) = self.axis.in_plane();
        let t = (self.k - ray.orig[ni]) / ray.dir[ni];
        // An in-plane ray divides zero by zero
        if !t.is_finite() || t < t_min || t > t_max {
            return None;
        }
        let a = ray.orig[ai] + t * ray.dir[ai];
        let b = ray.orig[bi] + t * ray.dir[bi];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }
        let outward_normal = self.axis.unit();
        let p = ray.get(t);
        Some(HitRecord::new(p, t, ray, &outward_normal, self.material))
    }
}

/// Rect config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectConfig {
    pub axis: Axis,
    pub a0: f64,
    pub a1: f64,
    pub b0: f64,
    pub b1: f64,
    pub k: f64,
    pub material: Option<MaterialConfig>,
}

/// Axis-aligned box
///
/// The slab interval test, extended to report which face the ray
/// crossed so the hit carries a usable outward normal.
#[derive(Debug, Clone)]
pub struct Slab {
    pub min: Point,
    pub max: Point,
    material: Option<PrismMaterial>,
}
impl Slab {
    pub fn new(min: Point, max: Point, material: Option<PrismMaterial>) -> Self {
        Self { min, max, material }
    }

    pub fn from_config(config: SlabConfig) -> SimResult<Self> {
        Ok(Self::new(
            config.min.into(),
            config.max.into(),
            material_from_config(config.material)?,
        ))
    }
}
impl Hittable for Slab {
    fn try_hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let mut t_enter = t_min;
        let mut t_exit = t_max;
        let mut enter_axis = 0;
        let mut exit_axis = 0;
        let mut entered = false;
        let mut exited = false;

        for a in 0..3 {
            let inv_d = 1.0 / ray.dir[a];
            let mut t0 = (self.min[a] - ray.orig[a]) * inv_d;
            let mut t1 = (self.max[a] - ray.orig[a]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_enter {
                t_enter = t0;
                enter_axis = a;
                entered = true;
            }
            if t1 < t_exit {
                t_exit = t1;
                exit_axis = a;
                exited = true;
            }
            if t_exit <= t_enter {
                return None;
            }
        }

        // Entering from outside crosses the near face; a ray starting
        // inside only crosses the far one
        let (t, axis, sign) = if entered {
            (t_enter, enter_axis, -ray.dir[enter_axis].signum())
        } else if exited {
            (t_exit, exit_axis, ray.dir[exit_axis].signum())
        } else {
            return None;
        };

        let mut outward_normal = Vec3::zeros();
        outward_normal[axis] = sign;
        let p = ray.get(t);
        Some(HitRecord::new(p, t, ray, &outward_normal, self.material))
    }
}

/// Slab config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlabConfig {
    pub min: SerdeVector,
    pub max: SerdeVector,
    pub material: Option<MaterialConfig>,
}

fn material_from_config(config: Option<MaterialConfig>) -> SimResult<Option<PrismMaterial>> {
    config.map(PrismMaterial::from_config).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glass() -> Option<PrismMaterial> {
        Some(PrismMaterial::glass())
    }

    #[test]
    fn sphere_reports_front_hit() {
        let sphere = Sphere::new(Point::new(0.0, 0.0, 5.0), 1.0, glass());
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let hr = sphere.try_hit(&ray, 0.001, 100.0).unwrap();
        assert!((hr.t - 4.0).abs() < 1e-12);
        assert!(hr.front_face);
        assert!((hr.normal - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
        assert!(hr.material.is_some());
    }

    #[test]
    fn sphere_hit_from_inside_flips_normal() {
        let sphere = Sphere::new(Point::new(0.0, 0.0, 0.0), 2.0, glass());
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let hr = sphere.try_hit(&ray, 0.001, 100.0).unwrap();
        assert!((hr.t - 2.0).abs() < 1e-12);
        assert!(!hr.front_face);
        // Geometric normal points out, the record faces the ray
        assert!((hr.normal - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn rect_hits_within_bounds_only() {
        let rect = Rect::new(Axis::Z, -1.0, 1.0, -1.0, 1.0, 3.0, glass());
        let hit = Ray::new(Point::new(0.5, -0.5, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let hr = rect.try_hit(&hit, 0.001, 100.0).unwrap();
        assert!((hr.t - 3.0).abs() < 1e-12);
        assert_eq!(hr.p, Point::new(0.5, -0.5, 3.0));

        let miss = Ray::new(Point::new(2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(rect.try_hit(&miss, 0.001, 100.0).is_none());
    }

    #[test]
    fn rect_ignores_in_plane_ray() {
        let rect = Rect::new(Axis::Z, -1.0, 1.0, -1.0, 1.0, 0.0, glass());
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(rect.try_hit(&ray, 0.001, 100.0).is_none());
    }

    #[test]
    fn rect_faces_either_side() {
        let rect = Rect::new(Axis::X, -1.0, 1.0, -1.0, 1.0, 0.0, glass());
        let from_positive = Ray::new(Point::new(2.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let hr = rect.try_hit(&from_positive, 0.001, 100.0).unwrap();
        assert!(hr.front_face);
        assert!((hr.normal - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-12);

        let from_negative = Ray::new(Point::new(-2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let hr = rect.try_hit(&from_negative, 0.001, 100.0).unwrap();
        assert!(!hr.front_face);
        assert!((hr.normal - Vec3::new(-1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn slab_reports_entry_face() {
        let slab = Slab::new(Point::new(-1.0, -1.0, 2.0), Point::new(1.0, 1.0, 4.0), glass());
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let hr = slab.try_hit(&ray, 0.001, 100.0).unwrap();
        assert!((hr.t - 2.0).abs() < 1e-12);
        assert!(hr.front_face);
        assert!((hr.normal - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn slab_reports_exit_face_from_inside() {
        let slab = Slab::new(Point::new(-1.0, -1.0, -1.0), Point::new(1.0, 1.0, 1.0), glass());
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let hr = slab.try_hit(&ray, 0.001, 100.0).unwrap();
        assert!((hr.t - 1.0).abs() < 1e-12);
        assert!(!hr.front_face);
        assert!((hr.normal - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-12);
    }

    #[test]
    fn slab_misses_sideways() {
        let slab = Slab::new(Point::new(-1.0, -1.0, 2.0), Point::new(1.0, 1.0, 4.0), glass());
        let ray = Ray::new(Point::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(slab.try_hit(&ray, 0.001, 100.0).is_none());
    }

    #[test]
    fn list_returns_nearest_hit() {
        let mut list = HittableList::default();
        list.add(Box::new(Rect::new(Axis::Z, -1.0, 1.0, -1.0, 1.0, 5.0, glass())));
        list.add(Box::new(Rect::new(Axis::Z, -1.0, 1.0, -1.0, 1.0, 2.0, None)));
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let hr = list.try_hit(&ray, 0.001, 100.0).unwrap();
        assert!((hr.t - 2.0).abs() < 1e-12);
        // The nearest one is bare geometry
        assert!(hr.material.is_none());
    }

    #[test]
    fn cloned_list_keeps_geometry() {
        let mut list = HittableList::default();
        list.add(Box::new(Sphere::new(Point::new(0.0, 0.0, 3.0), 1.0, None)));
        let copy = list.clone();
        assert_eq!(copy.len(), 1);
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(copy.try_hit(&ray, 0.001, 100.0).is_some());
    }

    #[test]
    fn scene_config_parses_tagged_surfaces() {
        let yaml = r#"
objects:
  - type: Rect
    axis: Z
    a0: -1.0
    a1: 1.0
    b0: -1.0
    b1: 1.0
    k: 0.0
    material:
      refractive_index: 1.5
      transmittance: 0.8
      thickness: 1.0
  - type: Sphere
    center: {x: 0.0, y: 0.0, z: 5.0}
    radius: 1.0
"#;
        let config: HittableListConfig = serde_yaml::from_str(yaml).unwrap();
        let list = HittableList::from_config(config).unwrap();
        assert_eq!(list.len(), 2);
    }
}
