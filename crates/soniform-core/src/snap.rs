//! Snapping engine: aligns move deltas to sibling edges/centres and the
//! optional grid.

use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Distance threshold for snapping, in canvas units.
pub const SNAP_THRESHOLD: f64 = 8.0;

/// Grid spacing variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridVariant {
    #[default]
    Medium,
    Coarse,
    Fine,
}

impl GridVariant {
    /// Grid line spacing in canvas units.
    pub fn spacing(self) -> f64 {
        match self {
            GridVariant::Medium => 24.0,
            GridVariant::Coarse => 32.0,
            GridVariant::Fine => 18.0,
        }
    }
}

/// Snap axis for guide lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// An alignment target the adjusted delta became exact against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapGuide {
    pub axis: Axis,
    /// Canvas-unit coordinate of the guide line on its axis.
    pub position: f64,
}

/// Result of a snap computation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapAdjustment {
    /// The adjusted move delta.
    pub delta: Vec2,
    /// Zero or more guides, at most one per axis.
    pub guides: Vec<SnapGuide>,
}

impl SnapAdjustment {
    pub fn unchanged(delta: Vec2) -> Self {
        Self {
            delta,
            guides: Vec::new(),
        }
    }
}

/// Snap one axis: features of the moving box against ordered targets.
/// Returns the correction and the winning target, or `None` when nothing
/// is within threshold. Ties break to the first-found target.
fn snap_axis(features: &[f64], targets: &[f64]) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64)> = None;
    let mut best_dist = SNAP_THRESHOLD;
    for &target in targets {
        for &feature in features {
            let dist = (target - feature).abs();
            if dist <= best_dist && best.map_or(true, |_| dist < best_dist) {
                best_dist = dist;
                best = Some((target - feature, target));
            }
        }
    }
    best
}

/// Nearest grid line for each feature, at the given spacing.
fn grid_targets(features: &[f64], spacing: f64) -> Vec<f64> {
    features
        .iter()
        .map(|f| (f / spacing).round() * spacing)
        .collect()
}

/// Compute an adjusted delta for a moving element.
///
/// `bounds` is the element's start geometry (axis-aligned, canvas units),
/// `siblings` the flattened bounds of every other element at the same
/// level. Candidate targets per axis are each sibling's centre and both
/// edges, then the grid lines when enabled; the smallest feature-to-target
/// distance under the threshold wins per axis independently.
pub fn snap_move(
    bounds: Rect,
    delta: Vec2,
    siblings: &[Rect],
    grid: Option<GridVariant>,
) -> SnapAdjustment {
    if !delta.x.is_finite() || !delta.y.is_finite() {
        return SnapAdjustment::unchanged(Vec2::ZERO);
    }
    let moved = bounds + delta;

    let features_x = [moved.center().x, moved.x0, moved.x1];
    let features_y = [moved.center().y, moved.y0, moved.y1];

    let mut targets_x: Vec<f64> = Vec::new();
    let mut targets_y: Vec<f64> = Vec::new();
    for sibling in siblings {
        targets_x.extend([sibling.center().x, sibling.x0, sibling.x1]);
        targets_y.extend([sibling.center().y, sibling.y0, sibling.y1]);
    }
    if let Some(variant) = grid {
        let spacing = variant.spacing();
        targets_x.extend(grid_targets(&features_x, spacing));
        targets_y.extend(grid_targets(&features_y, spacing));
    }

    let mut adjusted = delta;
    let mut guides = Vec::new();
    if let Some((correction, target)) = snap_axis(&features_x, &targets_x) {
        adjusted.x += correction;
        guides.push(SnapGuide {
            axis: Axis::X,
            position: target,
        });
    }
    if let Some((correction, target)) = snap_axis(&features_y, &targets_y) {
        adjusted.y += correction;
        guides.push(SnapGuide {
            axis: Axis::Y,
            position: target,
        });
    }

    SnapAdjustment {
        delta: adjusted,
        guides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect::new(x0, y0, x1, y1)
    }

    #[test]
    fn test_edge_within_threshold_snaps_exact() {
        // Moving box right edge lands at 95; sibling left edge at 100.
        let bounds = rect(0.0, 0.0, 20.0, 20.0);
        let sibling = rect(100.0, 200.0, 140.0, 240.0);
        let result = snap_move(bounds, Vec2::new(75.0, 0.0), &[sibling], None);
        assert!((result.delta.x - 80.0).abs() < 1e-9);
        assert_eq!(result.guides.len(), 1);
        assert_eq!(result.guides[0].axis, Axis::X);
        assert!((result.guides[0].position - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_nine_units_away_is_unmodified() {
        let bounds = rect(0.0, 0.0, 20.0, 20.0);
        let sibling = rect(100.0, 200.0, 140.0, 240.0);
        // Right edge ends at 91, nine units short of 100.
        let result = snap_move(bounds, Vec2::new(71.0, 0.0), &[sibling], None);
        assert!((result.delta.x - 71.0).abs() < 1e-9);
        assert!(result.guides.is_empty());
    }

    #[test]
    fn test_axes_are_independent() {
        let bounds = rect(0.0, 0.0, 20.0, 20.0);
        let sibling = rect(100.0, 25.0, 140.0, 65.0);
        // X far away, Y top edge within threshold of sibling top edge.
        let result = snap_move(bounds, Vec2::new(10.0, 22.0), &[sibling], None);
        assert!((result.delta.x - 10.0).abs() < 1e-9);
        assert!((result.delta.y - 25.0).abs() < 1e-9);
        assert_eq!(result.guides.len(), 1);
        assert_eq!(result.guides[0].axis, Axis::Y);
    }

    #[test]
    fn test_centre_target() {
        let bounds = rect(0.0, 0.0, 20.0, 20.0);
        let sibling = rect(40.0, 100.0, 80.0, 140.0);
        // Moving centre lands at 57; sibling centre at 60.
        let result = snap_move(bounds, Vec2::new(47.0, 0.0), &[sibling], None);
        assert!((result.delta.x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_snapping() {
        let bounds = rect(0.0, 0.0, 10.0, 10.0);
        // Left edge at 22 is 2 from the 24-unit grid line.
        let result = snap_move(
            bounds,
            Vec2::new(22.0, 0.0),
            &[],
            Some(GridVariant::Medium),
        );
        assert!((result.delta.x - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_variants() {
        assert_eq!(GridVariant::Medium.spacing(), 24.0);
        assert_eq!(GridVariant::Coarse.spacing(), 32.0);
        assert_eq!(GridVariant::Fine.spacing(), 18.0);
    }

    #[test]
    fn test_tie_breaks_to_first_target() {
        let bounds = rect(0.0, 0.0, 10.0, 10.0);
        // Moved box spans [22, 32]. first.x0 = 18 is 4 left of the moved
        // left edge, second.x0 = 36 is 4 right of the moved right edge;
        // every other candidate is further out. First wins the tie.
        let first = rect(18.0, 100.0, 70.0, 120.0);
        let second = rect(36.0, 100.0, 80.0, 120.0);
        let result = snap_move(bounds, Vec2::new(22.0, 0.0), &[first, second], None);
        assert!((result.delta.x - 18.0).abs() < 1e-9);
        assert_eq!(result.guides.len(), 1);
        assert!((result.guides[0].position - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_nan_delta_is_ignored() {
        let bounds = rect(0.0, 0.0, 10.0, 10.0);
        let result = snap_move(bounds, Vec2::new(f64::NAN, 0.0), &[], None);
        assert_eq!(result.delta, Vec2::ZERO);
    }
}
