use image::DynamicImage;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A decoded, resized image and its synthetic capture time in seconds.
pub struct Frame {
    pub image: DynamicImage,
    pub timestamp: f64,
}

/// Opaque handle of a landmark inside the engine's map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkId(pub u64);

/// Read-only view of one map point, valid for a single export call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: LandmarkId,
    pub position: na::Vector3<f32>,
    #[serde(default)]
    pub bad: bool,
}

impl Landmark {
    pub fn new(id: u64, position: na::Vector3<f32>) -> Landmark {
        Landmark {
            id: LandmarkId(id),
            position,
            bad: false,
        }
    }

    pub fn bad(id: u64, position: na::Vector3<f32>) -> Landmark {
        Landmark {
            bad: true,
            ..Landmark::new(id, position)
        }
    }

    pub fn is_bad(&self) -> bool {
        self.bad
    }

    pub fn world_pos(&self) -> na::Vector3<f32> {
        self.position
    }
}

/// All landmarks of the active map plus the ids of the reference subset,
/// both in the order the engine reported them.
///
/// Reference entries are handles into `points`; their position and bad flag
/// are always read from the full set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub points: Vec<Landmark>,
    #[serde(default)]
    pub reference: Vec<LandmarkId>,
}

impl MapSnapshot {
    pub fn new(points: Vec<Landmark>, reference: Vec<LandmarkId>) -> MapSnapshot {
        MapSnapshot { points, reference }
    }

    pub fn all_map_points(&self) -> &[Landmark] {
        &self.points
    }

    pub fn reference_ids(&self) -> &[LandmarkId] {
        &self.reference
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Reference ids with no landmark in the full set.
    pub fn dangling_reference_ids(&self) -> Vec<LandmarkId> {
        let ids: HashSet<LandmarkId> = self.points.iter().map(|p| p.id).collect();
        self.reference
            .iter()
            .filter(|id| !ids.contains(id))
            .copied()
            .collect()
    }

    /// Every reference id must name a landmark of the full set.
    pub fn is_consistent(&self) -> bool {
        self.dangling_reference_ids().is_empty()
    }
}
