//! Spline authoring and anchor/handle editing.

use super::{Editor, InteractionState, Modifiers, MIN_ELEMENT_SIZE, SPLINE_CLOSE_DISTANCE};
use crate::element::{Anchor, Element, ElementId, ElementKind};
use crate::scene::rotate_vec;
use kurbo::{Point, Rect, Vec2};

/// The part of a spline a drag addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplinePart {
    Anchor(usize),
    HandleIn(usize),
    HandleOut(usize),
}

impl Editor {
    /// A click with the spline tool: open a new spline, append an anchor,
    /// or close the spline when the click lands within the closing distance
    /// of its first anchor.
    ///
    /// While authoring, the element sits at the canvas origin and anchors
    /// hold absolute canvas positions; finalizing recentres both.
    pub(super) fn spline_pointer_down(&mut self, canvas: Point) {
        let InteractionState::SplineCreate { id } = self.state.clone() else {
            let element = Element::new(
                ElementKind::Spline {
                    points: vec![Anchor::new(canvas)],
                    closed: false,
                },
                0.0,
                0.0,
                0.0,
                0.0,
            );
            let id = element.id;
            self.selection = vec![id];
            self.scene = self.scene.add(element);
            self.state = InteractionState::SplineTangentDrag {
                id,
                anchor: 0,
                origin: canvas,
            };
            return;
        };

        let Some(ElementKind::Spline { points, .. }) = self.scene.find(id).map(|e| &e.kind)
        else {
            self.state = InteractionState::Idle;
            return;
        };
        let closes = points.len() >= 2
            && points
                .first()
                .is_some_and(|a| (a.point - canvas).hypot() <= SPLINE_CLOSE_DISTANCE);

        if closes {
            self.scene = self.scene.update(id, |e| {
                if let ElementKind::Spline { closed, .. } = &mut e.kind {
                    *closed = true;
                }
            });
            self.finalize_spline(id);
        } else {
            let anchor = points.len();
            self.scene = self.scene.update(id, |e| {
                if let ElementKind::Spline { points, .. } = &mut e.kind {
                    points.push(Anchor::new(canvas));
                }
            });
            self.state = InteractionState::SplineTangentDrag {
                id,
                anchor,
                origin: canvas,
            };
        }
    }

    /// Dragging right after placing an anchor pulls out its tangent:
    /// symmetric handles unless the independent-handles modifier is held.
    pub(super) fn spline_tangent_move(
        &mut self,
        id: ElementId,
        anchor: usize,
        origin: Point,
        canvas: Point,
        mods: Modifiers,
    ) {
        let tangent = canvas - origin;
        self.scene = self.scene.update(id, |e| {
            let ElementKind::Spline { points, .. } = &mut e.kind else {
                return;
            };
            let Some(target) = points.get_mut(anchor) else {
                return;
            };
            if tangent.hypot() < 0.5 {
                target.handle_out = None;
                if !mods.alt {
                    target.handle_in = None;
                }
                return;
            }
            target.handle_out = Some(tangent);
            if !mods.alt {
                target.handle_in = Some(-tangent);
            }
        });
    }

    /// Drag an anchor or a tangent handle of an existing spline. The pointer
    /// position is re-expressed in the element's local rotated frame.
    pub(super) fn spline_edit_move(
        &mut self,
        id: ElementId,
        part: SplinePart,
        canvas: Point,
        mods: Modifiers,
    ) {
        let Some(center) = self.scene.world_center(id) else {
            return;
        };
        let Some(rotation) = self.scene.world_rotation(id) else {
            return;
        };
        let local = rotate_vec(canvas - center, -rotation);
        let local = Point::new(local.x, local.y);

        self.scene = self.scene.update(id, |e| {
            let ElementKind::Spline { points, .. } = &mut e.kind else {
                return;
            };
            match part {
                SplinePart::Anchor(i) => {
                    if let Some(a) = points.get_mut(i) {
                        a.point = local;
                    }
                }
                SplinePart::HandleOut(i) => {
                    if let Some(a) = points.get_mut(i) {
                        let v = local - a.point;
                        a.handle_out = Some(v);
                        if !mods.alt {
                            a.handle_in = Some(-v);
                        }
                    }
                }
                SplinePart::HandleIn(i) => {
                    if let Some(a) = points.get_mut(i) {
                        let v = local - a.point;
                        a.handle_in = Some(v);
                        if !mods.alt {
                            a.handle_out = Some(-v);
                        }
                    }
                }
            }
        });
    }

    /// Release after a spline edit: auto-close when an endpoint was dragged
    /// within closing distance of the opposite endpoint, renormalize, and
    /// commit.
    pub(super) fn finish_spline_edit(&mut self, id: ElementId, part: SplinePart, edited: bool) {
        if !edited {
            return;
        }
        if let SplinePart::Anchor(index) = part {
            self.scene = self.scene.update(id, |e| {
                let ElementKind::Spline { points, closed } = &mut e.kind else {
                    return;
                };
                if *closed || points.len() < 2 {
                    return;
                }
                let is_endpoint = index == 0 || index == points.len() - 1;
                let near = (points[0].point - points[points.len() - 1].point).hypot()
                    <= SPLINE_CLOSE_DISTANCE;
                if is_endpoint && near {
                    *closed = true;
                }
            });
        }
        self.renormalize_spline(id);
        if let Some(parent) = self.scene.parent_of(id) {
            self.scene = self.scene.normalize_group(parent);
        }
        self.commit_working();
    }

    /// End authoring: recentre the anchors on their bounding box, move the
    /// element to that centre, and commit.
    pub(super) fn finalize_spline(&mut self, id: ElementId) {
        self.state = InteractionState::Idle;
        if self.scene.find(id).is_none() {
            return;
        }
        self.renormalize_spline(id);
        self.selection = vec![id];
        self.commit_working();
    }

    /// Re-express anchors relative to their bounding-box centre and shift
    /// the element so nothing moves on screen.
    fn renormalize_spline(&mut self, id: ElementId) {
        let is_root = self.scene.parent_of(id).is_none();
        let (scene_w, scene_h) = (self.scene.width, self.scene.height);
        self.scene = self.scene.update(id, |e| {
            let rotation = e.rotation;
            let ElementKind::Spline { points, .. } = &mut e.kind else {
                return;
            };
            let Some(first) = points.first() else {
                return;
            };
            let mut bbox = Rect::new(first.point.x, first.point.y, first.point.x, first.point.y);
            for a in points.iter() {
                bbox = bbox.union_pt(a.point);
            }
            let center = bbox.center();
            for a in points.iter_mut() {
                a.point -= center.to_vec2();
            }
            let shift = rotate_vec(Vec2::new(center.x, center.y), rotation);
            if is_root {
                e.x += shift.x / scene_w;
                e.y += shift.y / scene_h;
            } else {
                e.x += shift.x;
                e.y += shift.y;
            }
            e.width = bbox.width().max(MIN_ELEMENT_SIZE);
            e.height = bbox.height().max(MIN_ELEMENT_SIZE);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Tool;
    use crate::scene::Scene;

    fn editor() -> Editor {
        let mut editor = Editor::with_scene(Scene::new(800.0, 600.0));
        editor.set_tool(Tool::Spline);
        editor
    }

    fn spline_of(editor: &Editor, id: ElementId) -> (&Vec<Anchor>, bool) {
        match &editor.scene().find(id).unwrap().kind {
            ElementKind::Spline { points, closed } => (points, *closed),
            _ => panic!("expected a spline"),
        }
    }

    fn click(editor: &mut Editor, x: f64, y: f64) {
        editor.pointer_down(Point::new(x, y), Modifiers::default());
        editor.pointer_up(Point::new(x, y), Modifiers::default());
    }

    #[test]
    fn test_authoring_appends_anchors() {
        let mut editor = editor();
        click(&mut editor, 100.0, 100.0);
        let InteractionState::SplineCreate { id } = editor.state().clone() else {
            panic!("expected authoring to stay open");
        };
        click(&mut editor, 200.0, 100.0);
        click(&mut editor, 300.0, 200.0);

        let (points, closed) = spline_of(&editor, id);
        assert_eq!(points.len(), 3);
        assert!(!closed);
    }

    #[test]
    fn test_escape_finalizes_and_recentres() {
        let mut editor = editor();
        click(&mut editor, 100.0, 100.0);
        let InteractionState::SplineCreate { id } = editor.state().clone() else {
            panic!("expected authoring to stay open");
        };
        click(&mut editor, 200.0, 100.0);
        click(&mut editor, 300.0, 200.0);
        editor.escape();

        assert!(matches!(editor.state(), InteractionState::Idle));
        let element = editor.scene().find(id).unwrap();
        // Anchor bbox spans (100,100)-(300,200); centre (200,150).
        assert!((element.x - 200.0 / 800.0).abs() < 1e-9);
        assert!((element.y - 150.0 / 600.0).abs() < 1e-9);
        assert!((element.width - 200.0).abs() < 1e-9);
        assert!((element.height - 100.0).abs() < 1e-9);
        let (points, _) = spline_of(&editor, id);
        assert_eq!(points[0].point, Point::new(-100.0, -50.0));
        assert_eq!(points[2].point, Point::new(100.0, 50.0));
    }

    #[test]
    fn test_click_near_first_anchor_closes() {
        let mut editor = editor();
        click(&mut editor, 100.0, 100.0);
        let InteractionState::SplineCreate { id } = editor.state().clone() else {
            panic!("expected authoring to stay open");
        };
        click(&mut editor, 200.0, 100.0);
        click(&mut editor, 200.0, 200.0);
        // Within 12 units of the first anchor: closes instead of appending.
        click(&mut editor, 105.0, 95.0);

        assert!(matches!(editor.state(), InteractionState::Idle));
        let (points, closed) = spline_of(&editor, id);
        assert!(closed);
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_far_click_does_not_close() {
        let mut editor = editor();
        click(&mut editor, 100.0, 100.0);
        let InteractionState::SplineCreate { id } = editor.state().clone() else {
            panic!("expected authoring to stay open");
        };
        click(&mut editor, 200.0, 100.0);
        // 13 units away: appends a third anchor.
        click(&mut editor, 113.0, 100.0);

        let (points, closed) = spline_of(&editor, id);
        assert!(!closed);
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_tangent_drag_sets_symmetric_handles() {
        let mut editor = editor();
        click(&mut editor, 100.0, 100.0);
        editor.pointer_down(Point::new(200.0, 100.0), Modifiers::default());
        editor.pointer_move(Point::new(220.0, 120.0), Modifiers::default());
        editor.pointer_up(Point::new(220.0, 120.0), Modifiers::default());
        let InteractionState::SplineCreate { id } = editor.state().clone() else {
            panic!("expected authoring to stay open");
        };

        let (points, _) = spline_of(&editor, id);
        assert_eq!(points[1].handle_out, Some(Vec2::new(20.0, 20.0)));
        assert_eq!(points[1].handle_in, Some(Vec2::new(-20.0, -20.0)));
    }

    #[test]
    fn test_alt_drag_leaves_handle_in_alone() {
        let mut editor = editor();
        let alt = Modifiers {
            alt: true,
            ..Default::default()
        };
        click(&mut editor, 100.0, 100.0);
        editor.pointer_down(Point::new(200.0, 100.0), Modifiers::default());
        editor.pointer_move(Point::new(220.0, 120.0), alt);
        editor.pointer_up(Point::new(220.0, 120.0), alt);
        let InteractionState::SplineCreate { id } = editor.state().clone() else {
            panic!("expected authoring to stay open");
        };

        let (points, _) = spline_of(&editor, id);
        assert_eq!(points[1].handle_out, Some(Vec2::new(20.0, 20.0)));
        assert_eq!(points[1].handle_in, None);
    }

    #[test]
    fn test_endpoint_drag_auto_closes() {
        // An existing open spline centred at (400, 300).
        let element = Element::new(
            ElementKind::Spline {
                points: vec![
                    Anchor::new(Point::new(-50.0, 0.0)),
                    Anchor::new(Point::new(0.0, -40.0)),
                    Anchor::new(Point::new(50.0, 0.0)),
                ],
                closed: false,
            },
            0.5,
            0.5,
            100.0,
            40.0,
        );
        let id = element.id;
        let mut editor = Editor::with_scene(Scene::new(800.0, 600.0).add(element));

        editor.begin_spline_edit(id, SplinePart::Anchor(2));
        // Drag the last anchor next to the first (world (350, 300)).
        editor.pointer_move(Point::new(355.0, 302.0), Modifiers::default());
        editor.pointer_up(Point::new(355.0, 302.0), Modifiers::default());

        let (_, closed) = spline_of(&editor, id);
        assert!(closed);
        assert!(matches!(editor.state(), InteractionState::Idle));
    }

    #[test]
    fn test_edit_without_movement_commits_nothing() {
        let element = Element::new(
            ElementKind::Spline {
                points: vec![
                    Anchor::new(Point::new(-50.0, 0.0)),
                    Anchor::new(Point::new(50.0, 0.0)),
                ],
                closed: false,
            },
            0.5,
            0.5,
            100.0,
            10.0,
        );
        let id = element.id;
        let mut editor = Editor::with_scene(Scene::new(800.0, 600.0).add(element));

        editor.begin_spline_edit(id, SplinePart::Anchor(0));
        editor.pointer_up(Point::new(350.0, 300.0), Modifiers::default());
        assert!(!editor.undo());
    }
}
