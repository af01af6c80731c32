use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dist(&self, other: &Point3) -> f64 {
        self.sq_dist(other).sqrt()
    }

    pub fn sq_dist(&self, other: &Point3) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3> for [f64; 3] {
    fn from(point: Point3) -> Self {
        [point.x, point.y, point.z]
    }
}

/// Axis aligned box bounding the sensitive region of the detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActiveVolume {
    pub min: Point3,
    pub max: Point3,
}

impl ActiveVolume {
    pub fn x_range(&self) -> RangeInclusive<f64> {
        self.min.x..=self.max.x
    }

    pub fn y_range(&self) -> RangeInclusive<f64> {
        self.min.y..=self.max.y
    }

    pub fn z_range(&self) -> RangeInclusive<f64> {
        self.min.z..=self.max.z
    }

    pub fn contains(&self, point: &Point3) -> bool {
        self.x_range().contains(&point.x)
            && self.y_range().contains(&point.y)
            && self.z_range().contains(&point.z)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TrajectoryError {
    #[error("A trajectory needs at least two points, got {0}")]
    TooFewPoints(usize),
}

/// Particle path through the detector, an immutable polyline of at least two points.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    points: Vec<Point3>,
}

impl Trajectory {
    pub fn new(points: Vec<Point3>) -> Result<Self, TrajectoryError> {
        if points.len() < 2 {
            return Err(TrajectoryError::TooFewPoints(points.len()));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Consecutive pairs of points making up the path.
    pub fn segments(&self) -> impl Iterator<Item = (&Point3, &Point3)> {
        self.points.iter().tuple_windows()
    }

    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| a.dist(b)).sum()
    }
}
