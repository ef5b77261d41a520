//! Boolean-like merge/subtract composition over transformed elements.

use super::{
    circle_path, line_path, polyline_path, rect_path, rotated_corners, spline_path, triangle_path,
};
use crate::element::{Element, ElementId, ElementKind, MaskComposite, MaskLayer, MaskVisibility};
use crate::scene::Scene;
use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Padding applied around the union bounding box, per side.
const COMPOSE_PADDING: f64 = 2.0;

/// The element's outline path, re-expressed relative to `origin` (canvas
/// units). `None` for groups and unresolvable geometry.
fn element_path_at(scene: &Scene, id: ElementId, origin: Point) -> Option<BezPath> {
    let element = scene.find(id)?;
    let center = scene.world_center(id)?;
    let rotation = scene.world_rotation(id)?;
    let offset = center - origin;
    if !offset.x.is_finite() || !offset.y.is_finite() {
        return None;
    }

    let path = match &element.kind {
        ElementKind::Circle => circle_path(element.width, element.height, rotation, offset),
        ElementKind::Rect => rect_path(element.width, element.height, rotation, offset),
        ElementKind::Triangle => triangle_path(element.width, element.height, rotation, offset),
        ElementKind::Line => line_path(element.width, rotation, offset),
        ElementKind::Freeform { points } => polyline_path(points, rotation, offset),
        ElementKind::Spline { points, closed } => spline_path(points, *closed, rotation, offset),
        ElementKind::CustomPath { path, .. } => {
            let mut path = path.clone();
            path.apply_affine(Affine::translate(offset) * Affine::rotate(rotation.to_radians()));
            path
        }
        // Raster/vector/text payloads contribute their bounding rectangle.
        ElementKind::Image { .. } | ElementKind::Vector { .. } | ElementKind::Text(_) => {
            rect_path(element.width, element.height, rotation, offset)
        }
        ElementKind::Group { .. } => return None,
    };
    Some(path)
}

/// Union of the inputs' rotated corner sets, inflated by the compose
/// padding. `None` when any element's frame cannot be resolved.
pub fn union_bounds(scene: &Scene, ids: &[ElementId]) -> Option<Rect> {
    let mut bbox: Option<Rect> = None;
    for &id in ids {
        let element = scene.find(id)?;
        let center = scene.world_center(id)?;
        let rotation = scene.world_rotation(id)?;
        for corner in rotated_corners(center, element.width, element.height, rotation) {
            if !corner.x.is_finite() || !corner.y.is_finite() {
                log::warn!("compose skipped: element {id} has a non-finite frame");
                return None;
            }
            let r = Rect::new(corner.x, corner.y, corner.x, corner.y);
            bbox = Some(match bbox {
                Some(b) => b.union(r),
                None => r,
            });
        }
    }
    bbox.map(|b| b.inflate(COMPOSE_PADDING, COMPOSE_PADDING))
}

/// Merge two or more elements into one compound-path element.
///
/// The inputs are untouched; paint is inherited from the topmost (last)
/// input. Returns `None` for fewer than two inputs or unresolvable
/// geometry.
pub fn merge(scene: &Scene, ids: &[ElementId]) -> Option<Element> {
    if ids.len() < 2 {
        return None;
    }
    let bbox = union_bounds(scene, ids)?;
    let center = bbox.center();

    let mut compound = BezPath::new();
    for &id in ids {
        compound.extend(element_path_at(scene, id, center)?);
    }

    let top = scene.find(*ids.last()?)?;
    let mut merged = Element::new(
        ElementKind::CustomPath {
            path: compound,
            mask: None,
        },
        center.x / scene.width,
        center.y / scene.height,
        bbox.width(),
        bbox.height(),
    );
    merged.paint = top.paint.clone();
    merged.opacity = top.opacity;
    Some(merged)
}

/// Subtract every other element from the first (bottom-most) one.
///
/// Produces a compound-path element carrying a mask composite: a
/// full-covering hidden rectangle, the visible base path, then each cutter
/// painted hidden on top. Paint is inherited from the base. Returns `None`
/// for fewer than two inputs or unresolvable geometry.
pub fn subtract(scene: &Scene, ids: &[ElementId]) -> Option<Element> {
    if ids.len() < 2 {
        return None;
    }
    let bbox = union_bounds(scene, ids)?;
    let center = bbox.center();

    let base_id = ids[0];
    let base_path = element_path_at(scene, base_id, center)?;

    let mut layers = vec![
        MaskLayer {
            path: rect_path(bbox.width(), bbox.height(), 0.0, Vec2::ZERO),
            visibility: MaskVisibility::Hidden,
        },
        MaskLayer {
            path: base_path.clone(),
            visibility: MaskVisibility::Visible,
        },
    ];
    for &cutter in &ids[1..] {
        layers.push(MaskLayer {
            path: element_path_at(scene, cutter, center)?,
            visibility: MaskVisibility::Hidden,
        });
    }

    let base = scene.find(base_id)?;
    let mut result = Element::new(
        ElementKind::CustomPath {
            path: base_path,
            mask: Some(MaskComposite { layers }),
        },
        center.x / scene.width,
        center.y / scene.height,
        bbox.width(),
        bbox.height(),
    );
    result.paint = base.paint.clone();
    result.opacity = base.opacity;
    Some(result)
}
