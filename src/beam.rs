//! Beam tracing and the per-tick simulation driver
//!
//! Each channel owns a fixed run of beam slots laid out as an unrolled
//! binary tree: the root split lands in slots 0 and 1, and the walk then
//! slides a (current, reflect, refract) triple up the run, stepping onto
//! each refract child and falling back one slot onto the reflect twin
//! when refraction dies out.

use crate::{
    channels::{Channel, ChannelConfig},
    error::{SimError, SimResult},
    objects::Hittable,
    optics,
    utils::SerdeVector,
    Color, Point, Ray, Vec3,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Default number of beam slots per channel
pub const DEFAULT_CAPACITY: usize = 16;
/// Default range of the branching trace query
pub const DEFAULT_QUERY_RANGE: f64 = 10.0;
/// Default range of the terminal visibility query
pub const DEFAULT_RESOLVE_RANGE: f64 = 100.0;
/// Minimum query distance, keeps a child from re-hitting its own surface
const SURFACE_SKIP: f64 = 1e-3;

/// A single traced beam
///
/// `hit_point` starts at the origin and is settled by the trace; a
/// density of exactly zero marks the slot inactive.
#[derive(Debug, Clone, Copy)]
pub struct Beam {
    ray: Ray,
    density: f64,
    hit_point: Point,
    is_inside: bool,
    thickness: f64,
}
impl Beam {
    fn zeroed() -> Self {
        Self {
            ray: Ray::new(Point::zeros(), Vec3::zeros()),
            density: 0.0,
            hit_point: Point::zeros(),
            is_inside: false,
            thickness: 0.0,
        }
    }

    fn child(origin: Point, dir: Vec3, is_inside: bool, thickness: f64) -> Self {
        Self {
            ray: Ray::new(origin, dir),
            density: 0.0,
            hit_point: origin,
            is_inside,
            thickness,
        }
    }

    /// The oracle query for this beam
    ///
    /// An inside beam advances one medium thickness along its direction
    /// and looks back, which finds the exit face from the far side.
    fn query_ray(&self) -> Ray {
        if self.is_inside {
            Ray::new(self.ray.orig + self.ray.dir * self.thickness, -self.ray.dir)
        } else {
            self.ray
        }
    }

    pub fn origin(&self) -> Point {
        self.ray.orig
    }

    pub fn direction(&self) -> Vec3 {
        self.ray.dir
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn hit_point(&self) -> Point {
        self.hit_point
    }

    pub fn is_inside(&self) -> bool {
        self.is_inside
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }
}

/// Where the root beam starts each tick
#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    origin: Point,
    direction: Vec3,
    density: f64,
}
impl Emitter {
    pub fn new(origin: Point, direction: Vec3, density: f64) -> SimResult<Self> {
        if origin.iter().any(|c| !c.is_finite()) {
            return Err(SimError::seed(format!(
                "origin must be finite, got {origin:?}"
            )));
        }
        if direction.iter().any(|c| !c.is_finite()) || direction.norm() == 0.0 {
            return Err(SimError::seed(format!(
                "direction must be finite and non-zero, got {direction:?}"
            )));
        }
        let mut emitter = Self {
            origin,
            direction: direction.normalize(),
            density: 0.0,
        };
        emitter.set_density(density)?;
        Ok(emitter)
    }

    pub fn from_config(config: EmitterConfig) -> SimResult<Self> {
        Self::new(config.origin.into(), config.direction.into(), config.density)
    }

    /// Dial the seed intensity without re-aiming
    pub fn set_density(&mut self, density: f64) -> SimResult<()> {
        if !density.is_finite() || !(0.0..=1.0).contains(&density) {
            return Err(SimError::seed(format!(
                "density must be within [0, 1], got {density}"
            )));
        }
        self.density = density;
        Ok(())
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    fn root_beam(&self) -> Beam {
        Beam {
            ray: Ray::new(self.origin, self.direction),
            density: self.density,
            hit_point: self.origin,
            is_inside: false,
            thickness: 0.0,
        }
    }
}

/// Emitter config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterConfig {
    pub origin: SerdeVector,
    pub direction: SerdeVector,
    pub density: f64,
}

/// Drives the recursive trace for every channel
#[derive(Debug, Clone)]
pub struct Simulator {
    channels: Vec<Channel>,
    capacity: usize,
    query_range: f64,
    resolve_range: f64,
}
impl Simulator {
    pub fn new(
        channels: Vec<Channel>,
        capacity: usize,
        query_range: f64,
        resolve_range: f64,
    ) -> SimResult<Self> {
        if channels.is_empty() {
            return Err(SimError::config("at least one channel is required"));
        }
        if capacity < 2 {
            return Err(SimError::config(format!(
                "capacity must hold the root split, got {capacity}"
            )));
        }
        if !query_range.is_finite() || query_range <= 0.0 {
            return Err(SimError::config(format!(
                "query range must be positive, got {query_range}"
            )));
        }
        if !resolve_range.is_finite() || resolve_range <= 0.0 {
            return Err(SimError::config(format!(
                "resolve range must be positive, got {resolve_range}"
            )));
        }
        Ok(Self {
            channels,
            capacity,
            query_range,
            resolve_range,
        })
    }

    pub fn from_config(config: SimulatorConfig) -> SimResult<Self> {
        let channels = config
            .channels
            .into_iter()
            .map(Channel::from_config)
            .collect::<SimResult<Vec<_>>>()?;
        Self::new(
            channels,
            config.capacity,
            config.query_range,
            config.resolve_range,
        )
    }

    /// Rainbow channels with the stock capacity and ranges
    pub fn rainbow() -> Self {
        Self {
            channels: Channel::rainbow(),
            capacity: DEFAULT_CAPACITY,
            query_range: DEFAULT_QUERY_RANGE,
            resolve_range: DEFAULT_RESOLVE_RANGE,
        }
    }

    /// Trace one full frame
    ///
    /// Pure with respect to the simulator: every call allocates its own
    /// slots and re-traces from the seed, so nothing persists between
    /// ticks.
    pub fn simulate(&self, emitter: &Emitter, scene: &impl Hittable) -> Frame {
        let channels = self
            .channels
            .iter()
            .map(|&channel| self.run_channel(channel, emitter, scene))
            .collect::<Vec<_>>();
        debug!(
            "traced {} channels, {} active beams",
            channels.len(),
            channels.iter().map(|c| c.active().count()).sum::<usize>()
        );
        Frame { channels }
    }

    fn run_channel(&self, channel: Channel, emitter: &Emitter, scene: &impl Hittable) -> ChannelBeams {
        let mut root = emitter.root_beam();
        let mut beams = vec![Beam::zeroed(); self.capacity];

        // A dead seed never touches the oracle
        if root.density > 0.0 {
            let (reflect, refract) = pair_mut(&mut beams, 0);
            if self.trace_step(&mut root, reflect, refract, &channel, scene) {
                // The budget caps trace calls even when every step falls
                // back, and the index guard keeps the triple in range
                let mut budget = (self.capacity - 2) / 2;
                let mut j = 1;
                while j + 2 < self.capacity && budget > 0 {
                    if beams[j].density == 0.0 {
                        break;
                    }
                    let (current, reflect, refract) = triple_mut(&mut beams, j);
                    let split = self.trace_step(current, reflect, refract, &channel, scene);
                    budget -= 1;
                    if !split {
                        break;
                    }
                    j += 2;
                    // A dead refract slot hands the walk to its reflect twin
                    if beams[j].density == 0.0 {
                        j -= 1;
                    }
                }
            }
        }

        trace!(
            "channel scale {}: {} active beams",
            channel.refract_scale(),
            beams.iter().filter(|b| b.density > 0.0).count()
        );
        ChannelBeams {
            channel,
            root,
            beams,
        }
    }

    /// Split `current` against the nearest surface it can reach
    ///
    /// Fills the reflect and refract slots and reports whether the
    /// branch keeps going. No hit settles the current beam's hit point
    /// at query range; a hit on bare geometry stops the branch without
    /// touching anything.
    fn trace_step(
        &self,
        current: &mut Beam,
        reflect: &mut Beam,
        refract: &mut Beam,
        channel: &Channel,
        scene: &impl Hittable,
    ) -> bool {
        let query = current.query_ray();
        let hr = match scene.try_hit(&query, SURFACE_SKIP, self.query_range) {
            Some(hr) => hr,
            None => {
                current.hit_point = current.ray.get(self.query_range);
                return false;
            }
        };
        let material = match hr.material {
            Some(material) => material,
            None => return false,
        };

        let rate = material.refractive_index() * channel.refract_scale();
        let eta = if current.is_inside { 1.0 / rate } else { rate };
        // The record's normal faces the query ray; an inside beam needs
        // it facing back into the medium
        let normal = if current.is_inside {
            -hr.normal
        } else {
            hr.normal
        };

        current.hit_point = hr.p;
        *reflect = Beam::child(
            hr.p,
            optics::reflect(&current.ray.dir, &normal),
            current.is_inside,
            material.thickness(),
        );
        *refract = Beam::child(
            hr.p,
            optics::refract(&current.ray.dir, &normal, eta),
            !current.is_inside,
            material.thickness(),
        );

        if refract.ray.dir == Vec3::zeros() {
            // Total internal reflection, every bit of energy stays with
            // the reflected beam
            reflect.density = current.density;
            refract.density = 0.0;
        } else {
            refract.density = current.density * material.transmittance();
            reflect.density = current.density * (1.0 - material.transmittance());
        }

        if reflect.density > 0.0 {
            self.resolve_hit_point(reflect, scene);
        }
        true
    }

    /// Settle where a terminal beam lands without branching it further
    fn resolve_hit_point(&self, beam: &mut Beam, scene: &impl Hittable) {
        let query = beam.query_ray();
        beam.hit_point = match scene.try_hit(&query, SURFACE_SKIP, self.resolve_range) {
            Some(hr) => hr.p,
            // Fall back to the short range along the beam itself
            None => beam.ray.get(self.query_range),
        };
    }
}

/// Simulator config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub channels: Vec<ChannelConfig>,
    pub capacity: usize,
    pub query_range: f64,
    pub resolve_range: f64,
}

/// One channel's fully traced sequence
#[derive(Debug, Clone)]
pub struct ChannelBeams {
    pub channel: Channel,
    pub root: Beam,
    pub beams: Vec<Beam>,
}
impl ChannelBeams {
    /// Slots that still carry energy
    pub fn active(&self) -> impl Iterator<Item = &Beam> {
        self.beams.iter().filter(|beam| beam.density > 0.0)
    }
}

/// The complete result of one simulation tick
#[derive(Debug, Clone)]
pub struct Frame {
    pub channels: Vec<ChannelBeams>,
}
impl Frame {
    /// Drawable segments, one per active beam
    ///
    /// The undispersed root is identical across channels and drawn once,
    /// in white.
    pub fn segments(&self) -> Vec<BeamSegment> {
        let mut segments = Vec::new();
        if let Some(first) = self.channels.first() {
            if first.root.density > 0.0 {
                segments.push(BeamSegment {
                    start: first.root.origin(),
                    end: first.root.hit_point(),
                    density: first.root.density(),
                    color: Color::new(1.0, 1.0, 1.0),
                });
            }
        }
        for channel_beams in &self.channels {
            for beam in channel_beams.active() {
                segments.push(BeamSegment {
                    start: beam.origin(),
                    end: beam.hit_point(),
                    density: beam.density(),
                    color: channel_beams.channel.color(),
                });
            }
        }
        segments
    }
}

/// A drawable line segment
#[derive(Debug, Clone, Copy)]
pub struct BeamSegment {
    pub start: Point,
    pub end: Point,
    pub density: f64,
    pub color: Color,
}

/// Split a slot and its successor out as disjoint borrows
fn pair_mut(beams: &mut [Beam], j: usize) -> (&mut Beam, &mut Beam) {
    let (head, tail) = beams.split_at_mut(j + 1);
    (&mut head[j], &mut tail[0])
}

/// Split three adjacent slots out as disjoint borrows
fn triple_mut(beams: &mut [Beam], j: usize) -> (&mut Beam, &mut Beam, &mut Beam) {
    let (head, tail) = beams.split_at_mut(j + 1);
    let (mid, rest) = tail.split_at_mut(1);
    (&mut head[j], &mut mid[0], &mut rest[0])
}
