//! Move and resize gesture math.

use super::{Editor, Modifiers, MIN_ELEMENT_SIZE};
use crate::element::ElementId;
use crate::scene::rotate_vec;
use crate::snap::snap_move;
use kurbo::{Point, Rect, Vec2};

/// The handle being dragged during a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl Corner {
    /// Unit direction from the box centre towards this corner.
    fn direction(self) -> Vec2 {
        match self {
            Corner::NorthWest => Vec2::new(-1.0, -1.0),
            Corner::NorthEast => Vec2::new(1.0, -1.0),
            Corner::SouthEast => Vec2::new(1.0, 1.0),
            Corner::SouthWest => Vec2::new(-1.0, 1.0),
        }
    }
}

/// Frame of the element when the resize began, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeStart {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

impl ResizeStart {
    pub(super) fn capture(scene: &crate::scene::Scene, id: ElementId) -> Option<Self> {
        let center = scene.world_center(id)?;
        let element = scene.find(id)?;
        Some(Self {
            center,
            width: element.width,
            height: element.height,
        })
    }

    /// The corner that stays fixed while `dragged` moves.
    fn anchor(&self, dragged: Corner) -> Point {
        let dir = dragged.direction();
        Point::new(
            self.center.x - dir.x * self.width / 2.0,
            self.center.y - dir.y * self.height / 2.0,
        )
    }
}

impl Editor {
    /// Translate the selection by a screen-pixel delta, snapping when
    /// exactly one element is selected and shift is held.
    pub(super) fn move_selection(&mut self, screen_delta: Vec2, mods: Modifiers) {
        let mut canvas_delta = self.viewport.canvas_delta(screen_delta);
        if !canvas_delta.x.is_finite() || !canvas_delta.y.is_finite() {
            return;
        }

        if mods.shift && self.selection.len() == 1 {
            let id = self.selection[0];
            if let Some(bounds) = self.scene.world_bounds(id) {
                let siblings = self.sibling_bounds(id);
                canvas_delta = snap_move(bounds, canvas_delta, &siblings, self.grid).delta;
            }
        }

        for id in self.selection.clone() {
            let delta = self.position_delta(id, canvas_delta);
            self.scene = self.scene.update(id, |e| {
                e.x += delta.x;
                e.y += delta.y;
            });
        }
    }

    /// Resize `id` so the dragged corner tracks the pointer while the
    /// opposite corner stays put. Dimensions clamp to the 10-unit minimum,
    /// growing away from the anchored edges; ctrl locks the aspect ratio by
    /// re-deriving the dimension with the smaller delta.
    pub(super) fn resize_to(
        &mut self,
        id: ElementId,
        corner: Corner,
        start: ResizeStart,
        canvas: Point,
        mods: Modifiers,
    ) {
        if !canvas.x.is_finite() || !canvas.y.is_finite() {
            return;
        }
        let anchor = start.anchor(corner);
        let dir = corner.direction();

        let mut width = (canvas.x - anchor.x) * dir.x;
        let mut height = (canvas.y - anchor.y) * dir.y;

        if mods.ctrl && start.width > 0.0 && start.height > 0.0 {
            let ratio = start.width / start.height;
            if (width - start.width).abs() >= (height - start.height).abs() {
                height = width / ratio;
            } else {
                width = height * ratio;
            }
        }

        let width = width.max(MIN_ELEMENT_SIZE);
        let height = height.max(MIN_ELEMENT_SIZE);
        let center = Point::new(
            anchor.x + dir.x * width / 2.0,
            anchor.y + dir.y * height / 2.0,
        );

        self.scene = self.scene.update(id, |e| {
            e.width = width;
            e.height = height;
        });
        self.set_world_center(id, center);
    }

    /// Re-express a world-space centre into the element's own coordinate
    /// fields (normalized at the root, parent-relative offsets inside a
    /// group).
    pub(super) fn set_world_center(&mut self, id: ElementId, target: Point) {
        match self.scene.parent_of(id) {
            None => {
                let (w, h) = (self.scene.width, self.scene.height);
                self.scene = self.scene.update(id, |e| {
                    e.x = target.x / w;
                    e.y = target.y / h;
                });
            }
            Some(parent) => {
                let Some(parent_center) = self.scene.world_center(parent) else {
                    return;
                };
                let Some(parent_rotation) = self.scene.world_rotation(parent) else {
                    return;
                };
                let local = rotate_vec(target - parent_center, -parent_rotation);
                self.scene = self.scene.update(id, |e| {
                    e.x = local.x;
                    e.y = local.y;
                });
            }
        }
    }

    /// World bounds of every sibling except `id`, in sibling-list order.
    fn sibling_bounds(&self, id: ElementId) -> Vec<Rect> {
        let siblings: Vec<ElementId> = match self.scene.parent_of(id) {
            Some(parent) => self
                .scene
                .find(parent)
                .and_then(|g| g.children())
                .map(|c| c.iter().map(|e| e.id).collect())
                .unwrap_or_default(),
            None => self.scene.elements.iter().map(|e| e.id).collect(),
        };
        siblings
            .into_iter()
            .filter(|&s| s != id)
            .filter_map(|s| self.scene.world_bounds(s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementKind};
    use crate::interaction::InteractionState;
    use crate::scene::Scene;

    fn editor_with(elements: Vec<Element>) -> Editor {
        let mut scene = Scene::new(800.0, 600.0);
        scene.elements = elements;
        Editor::with_scene(scene)
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(ElementKind::Rect, x, y, w, h)
    }

    #[test]
    fn test_resize_south_east_grows() {
        // Centre (400, 300), 40x20: corners at (380,290)-(420,310).
        let a = rect(0.5, 0.5, 40.0, 20.0);
        let ida = a.id;
        let mut editor = editor_with(vec![a]);

        editor.begin_resize(ida, Corner::SouthEast);
        editor.pointer_move(Point::new(440.0, 320.0), Modifiers::default());
        editor.pointer_up(Point::new(440.0, 320.0), Modifiers::default());

        let resized = editor.scene().find(ida).unwrap();
        assert!((resized.width - 60.0).abs() < 1e-9);
        assert!((resized.height - 30.0).abs() < 1e-9);
        // The north-west corner stays at (380, 290).
        let center = editor.scene().world_center(ida).unwrap();
        assert!((center.x - 410.0).abs() < 1e-9);
        assert!((center.y - 305.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_north_west_anchors_south_east() {
        let a = rect(0.5, 0.5, 40.0, 20.0);
        let ida = a.id;
        let mut editor = editor_with(vec![a]);

        editor.begin_resize(ida, Corner::NorthWest);
        editor.pointer_move(Point::new(360.0, 280.0), Modifiers::default());
        editor.pointer_up(Point::new(360.0, 280.0), Modifiers::default());

        let resized = editor.scene().find(ida).unwrap();
        assert!((resized.width - 60.0).abs() < 1e-9);
        assert!((resized.height - 30.0).abs() < 1e-9);
        // South-east corner fixed at (420, 310).
        let center = editor.scene().world_center(ida).unwrap();
        assert!((center.x - 390.0).abs() < 1e-9);
        assert!((center.y - 295.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let a = rect(0.5, 0.5, 40.0, 20.0);
        let ida = a.id;
        let mut editor = editor_with(vec![a]);

        editor.begin_resize(ida, Corner::SouthEast);
        // Drag far past the anchored corner.
        editor.pointer_move(Point::new(100.0, 100.0), Modifiers::default());
        editor.pointer_up(Point::new(100.0, 100.0), Modifiers::default());

        let resized = editor.scene().find(ida).unwrap();
        assert_eq!(resized.width, MIN_ELEMENT_SIZE);
        assert_eq!(resized.height, MIN_ELEMENT_SIZE);
        // Minimum box grows from the anchored north-west corner (380, 290).
        let center = editor.scene().world_center(ida).unwrap();
        assert!((center.x - 385.0).abs() < 1e-9);
        assert!((center.y - 295.0).abs() < 1e-9);
    }

    #[test]
    fn test_aspect_lock_preserves_ratio() {
        // 2:1 box.
        let a = rect(0.5, 0.5, 40.0, 20.0);
        let ida = a.id;
        let mut editor = editor_with(vec![a]);
        let ctrl = Modifiers {
            ctrl: true,
            ..Default::default()
        };

        editor.begin_resize(ida, Corner::SouthEast);
        // Width delta (+40) dominates height delta (+5).
        editor.pointer_move(Point::new(460.0, 315.0), ctrl);
        editor.pointer_up(Point::new(460.0, 315.0), ctrl);

        let resized = editor.scene().find(ida).unwrap();
        assert!((resized.width - 80.0).abs() < 1e-9);
        assert!((resized.height - 40.0).abs() < 1e-9);
        assert!((resized.width / resized.height - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_shift_move_snaps_single_selection() {
        // Mover centre (200, 300); target left edge at 300.
        let mover = rect(0.25, 0.5, 40.0, 40.0);
        let target = rect(0.4, 0.25, 40.0, 40.0);
        let mover_id = mover.id;
        let mut editor = editor_with(vec![mover, target]);
        let shift = Modifiers {
            shift: true,
            ..Default::default()
        };

        editor.selection = vec![mover_id];
        editor.state = InteractionState::Move {
            last: Point::new(200.0, 300.0),
            moved: false,
        };
        // Right edge moves from 220 to 295, five units shy of 300.
        editor.pointer_move(Point::new(275.0, 300.0), shift);
        editor.pointer_up(Point::new(275.0, 300.0), shift);

        let bounds = editor.scene().world_bounds(mover_id).unwrap();
        assert!((bounds.x1 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_without_shift_does_not_snap() {
        let mover = rect(0.25, 0.5, 40.0, 40.0);
        let target = rect(0.4, 0.25, 40.0, 40.0);
        let mover_id = mover.id;
        let mut editor = editor_with(vec![mover, target]);

        editor.selection = vec![mover_id];
        editor.state = InteractionState::Move {
            last: Point::new(200.0, 300.0),
            moved: false,
        };
        editor.pointer_move(Point::new(275.0, 300.0), Modifiers::default());
        editor.pointer_up(Point::new(275.0, 300.0), Modifiers::default());

        let bounds = editor.scene().world_bounds(mover_id).unwrap();
        assert!((bounds.x1 - 295.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_child_moves_in_absolute_units() {
        let child = rect(0.0, 0.0, 20.0, 20.0);
        let child_id = child.id;
        let group = Element::new(
            ElementKind::Group {
                children: vec![child],
            },
            0.5,
            0.5,
            20.0,
            20.0,
        );
        let group_id = group.id;
        let mut editor = editor_with(vec![group]);
        editor.group_scope = Some(group_id);
        editor.selection = vec![child_id];
        editor.state = InteractionState::Move {
            last: Point::new(400.0, 300.0),
            moved: false,
        };

        editor.pointer_move(Point::new(430.0, 300.0), Modifiers::default());
        // Child offset is absolute units, not normalized.
        assert!((editor.scene().find(child_id).unwrap().x - 30.0).abs() < 1e-9);
    }
}
