use crate::{Charge, Point3, SampleId};

/// A single charge deposition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub q: Charge,
}

impl QPoint {
    pub fn new(x: f64, y: f64, z: f64, q: Charge) -> Self {
        Self { x, y, z, q }
    }

    pub fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Ordered charge depositions left by one trajectory.
///
/// The `id` stays unset until the cluster is assembled into a sample set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChargeCluster {
    points: Vec<QPoint>,
    pub id: Option<SampleId>,
}

impl ChargeCluster {
    pub fn new(points: Vec<QPoint>) -> Self {
        Self { points, id: None }
    }

    pub fn push(&mut self, point: QPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[QPoint] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [QPoint] {
        &mut self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn front(&self) -> Option<&QPoint> {
        self.points.first()
    }

    pub fn back(&self) -> Option<&QPoint> {
        self.points.last()
    }

    /// Copy of the cluster with every point moved by `dx` along the drift axis.
    pub fn shifted(&self, dx: f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| QPoint { x: p.x + dx, ..*p })
                .collect(),
            id: self.id,
        }
    }

    /// Removes every point whose x lies outside `[min_x, max_x]`.
    pub fn drop_outside(&mut self, min_x: f64, max_x: f64) {
        self.points.retain(|p| (min_x..=max_x).contains(&p.x));
    }

    pub fn sum(&self) -> Charge {
        self.points.iter().fold(0.0, |sum, p| sum + p.q)
    }

    pub fn min_x(&self) -> Option<f64> {
        self.points.iter().map(|p| p.x).reduce(f64::min)
    }

    pub fn max_x(&self) -> Option<f64> {
        self.points.iter().map(|p| p.x).reduce(f64::max)
    }

    /// Distance between the first and last deposition, zero for clusters shorter than two points.
    pub fn end_to_end(&self) -> f64 {
        match (self.front(), self.back()) {
            (Some(front), Some(back)) => front.position().dist(&back.position()),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn cluster() -> ChargeCluster {
        ChargeCluster::new(vec![
            QPoint::new(-5.0, 0.0, 0.0, 1.0),
            QPoint::new(0.0, 1.0, 0.0, 2.0),
            QPoint::new(5.0, 2.0, 0.0, 3.0),
            QPoint::new(10.0, 3.0, 0.0, 4.0),
        ])
    }

    #[test]
    fn test_shifted() {
        let shifted = cluster().shifted(2.5);
        assert_eq!(shifted.len(), 4);
        assert_approx_eq!(shifted.front().unwrap().x, -2.5);
        assert_approx_eq!(shifted.back().unwrap().x, 12.5);
        assert_approx_eq!(shifted.back().unwrap().y, 3.0);
        assert_approx_eq!(shifted.sum(), 10.0);
    }

    #[test]
    fn test_drop_outside() {
        let mut cluster = cluster();
        cluster.drop_outside(0.0, 5.0);
        assert_eq!(cluster.len(), 2);
        assert_approx_eq!(cluster.min_x().unwrap(), 0.0);
        assert_approx_eq!(cluster.max_x().unwrap(), 5.0);
        assert_approx_eq!(cluster.sum(), 5.0);

        cluster.drop_outside(100.0, 200.0);
        assert!(cluster.is_empty());
        assert!(cluster.sum().is_sign_positive());
        assert_eq!(cluster.front(), None);
        assert_eq!(cluster.min_x(), None);
    }

    #[test]
    fn test_end_to_end() {
        assert_approx_eq!(cluster().end_to_end(), (225.0_f64 + 9.0).sqrt());
        assert_eq!(ChargeCluster::default().end_to_end(), 0.0);
    }
}
