//! Utils

use crate::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Serializable stand-in for a Vec3 in config files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerdeVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}
impl From<SerdeVector> for Vec3 {
    fn from(v: SerdeVector) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}
impl From<Vec3> for SerdeVector {
    fn from(v: Vec3) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }
}

/// Generate Random Vectors
pub fn gen_random(len: usize, min: Option<f64>, max: Option<f64>) -> Vec3 {
    let mut rng = rand::thread_rng();
    Vec3::from_vec(
        (0..len)
            .map(|_| {
                if min.is_some() && max.is_some() {
                    rng.gen_range(min.unwrap()..max.unwrap())
                } else {
                    rng.gen()
                }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_vector_round_trips() {
        let v = Vec3::new(1.0, -2.5, 0.25);
        let sv: SerdeVector = v.into();
        let back: Vec3 = sv.into();
        assert_eq!(back, v);
    }

    #[test]
    fn gen_random_respects_bounds() {
        for _ in 0..32 {
            let v = gen_random(3, Some(-1.0), Some(1.0));
            for c in 0..3 {
                assert!(v[c] >= -1.0 && v[c] < 1.0);
            }
        }
    }
}
