//! Axis-aligned bounding boxes, the invariant CLAM's `Cluster::radius`
//! plays for a metric space, specialised to coordinate-wise min/max.

/// Coordinate-wise min and max over a set of points.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl BoundingBox {
    /// The degenerate bbox of a single point.
    pub fn of_point(point: &[f64]) -> Self {
        Self {
            min: point.to_vec(),
            max: point.to_vec(),
        }
    }

    /// Element-wise merge of two child bboxes, per invariant P3.
    pub fn merge(a: &BoundingBox, b: &BoundingBox) -> Self {
        let min = a
            .min
            .iter()
            .zip(b.min.iter())
            .map(|(&x, &y)| x.min(y))
            .collect();
        let max = a
            .max
            .iter()
            .zip(b.max.iter())
            .map(|(&x, &y)| x.max(y))
            .collect();
        Self { min, max }
    }

    /// Spans `max - min` per dimension.
    pub fn span(&self) -> Vec<f64> {
        self.min
            .iter()
            .zip(self.max.iter())
            .map(|(&lo, &hi)| hi - lo)
            .collect()
    }

    /// The bbox obtained by widening `self` to also contain `point`.
    pub fn expanded_to_contain(&self, point: &[f64]) -> Self {
        let min = self
            .min
            .iter()
            .zip(point.iter())
            .map(|(&lo, &p)| lo.min(p))
            .collect();
        let max = self
            .max
            .iter()
            .zip(point.iter())
            .map(|(&hi, &p)| hi.max(p))
            .collect();
        Self { min, max }
    }

    /// Whether `other` pushes this bbox's boundary outward on either side.
    pub fn is_expanded_by(&self, other: &BoundingBox) -> bool {
        self.min
            .iter()
            .zip(other.min.iter())
            .any(|(&lo, &other_lo)| other_lo < lo)
            || self
                .max
                .iter()
                .zip(other.max.iter())
                .any(|(&hi, &other_hi)| other_hi > hi)
    }

    /// Approximate equality, used by property tests (P2/P6) at 1e-8.
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        let close = |a: &[f64], b: &[f64]| {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= tolerance)
        };
        close(&self.min, &other.min) && close(&self.max, &other.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_takes_elementwise_extremes() {
        let a = BoundingBox {
            min: vec![0.0, 5.0],
            max: vec![1.0, 6.0],
        };
        let b = BoundingBox {
            min: vec![-1.0, 7.0],
            max: vec![2.0, 8.0],
        };
        let merged = BoundingBox::merge(&a, &b);
        assert_eq!(merged.min, vec![-1.0, 5.0]);
        assert_eq!(merged.max, vec![2.0, 8.0]);
    }

    #[test]
    fn expanded_to_contain_widens_only_as_needed() {
        let bbox = BoundingBox {
            min: vec![0.0],
            max: vec![1.0],
        };
        let same = bbox.expanded_to_contain(&[0.5]);
        assert_eq!(same, bbox);

        let wider = bbox.expanded_to_contain(&[2.0]);
        assert_eq!(wider.max, vec![2.0]);
    }
}
