//! Selection-level commands: grouping, z-order, duplication, deletion, and
//! path composition.

use super::{Editor, DUPLICATE_OFFSET};
use crate::element::{Element, ElementId, ElementKind};
use crate::geometry::{merge, rotated_corners, subtract};
use crate::scene::{rotate_vec, LayerShift};
use kurbo::{Point, Rect, Vec2};

impl Editor {
    /// Group two or more root-level elements: union box, children
    /// re-expressed relative to the box centre, inserted at the topmost
    /// input's position.
    pub fn group_selected(&mut self) {
        let ids = self.root_selection();
        if ids.len() < 2 {
            return;
        }

        let mut bbox: Option<Rect> = None;
        let mut centers = Vec::with_capacity(ids.len());
        for &id in &ids {
            let Some(center) = self.scene.world_center(id) else {
                return;
            };
            let Some(element) = self.scene.find(id) else {
                return;
            };
            for corner in rotated_corners(center, element.width, element.height, element.rotation) {
                let r = Rect::new(corner.x, corner.y, corner.x, corner.y);
                bbox = Some(match bbox {
                    Some(b) => b.union(r),
                    None => r,
                });
            }
            centers.push(center);
        }
        let Some(bbox) = bbox else {
            return;
        };
        let group_center = bbox.center();

        let mut next = self.scene.clone();
        let insert_at = remove_from_root(&mut next.elements, &ids);
        let children: Vec<Element> = ids
            .iter()
            .zip(centers)
            .filter_map(|(&id, center)| {
                let mut child = self.scene.find(id)?.clone();
                child.x = center.x - group_center.x;
                child.y = center.y - group_center.y;
                Some(child)
            })
            .collect();

        let group = Element::new(
            ElementKind::Group { children },
            group_center.x / next.width,
            group_center.y / next.height,
            bbox.width(),
            bbox.height(),
        );
        let group_id = group.id;
        next.elements.insert(insert_at.min(next.elements.len()), group);

        self.scene = next;
        self.selection = vec![group_id];
        self.commit_working();
    }

    /// Dissolve every selected root-level group, composing each child's
    /// position and rotation with the group's and reinserting the children
    /// at the group's former position.
    pub fn ungroup_selected(&mut self) {
        let ids = self.root_selection();
        let mut next = self.scene.clone();
        let mut freed = Vec::new();
        let mut changed = false;

        for id in ids {
            let Some(index) = next.elements.iter().position(|e| e.id == id) else {
                continue;
            };
            if !next.elements[index].is_group() {
                continue;
            }
            let group = next.elements.remove(index);
            let group_center = Point::new(group.x * next.width, group.y * next.height);
            let ElementKind::Group { children } = group.kind else {
                unreachable!("is_group guarantees a group payload");
            };
            for (offset, mut child) in children.into_iter().enumerate() {
                let world =
                    group_center + rotate_vec(Vec2::new(child.x, child.y), group.rotation);
                child.x = world.x / next.width;
                child.y = world.y / next.height;
                child.rotation += group.rotation;
                freed.push(child.id);
                next.elements.insert(index + offset, child);
            }
            changed = true;
        }

        if changed {
            self.scene = next;
            self.selection = freed;
            self.commit_working();
        }
    }

    /// Reorder every selected element within its sibling list. The
    /// selection is processed in tree-path order, ascending or descending
    /// per direction, so relative order among the moved elements survives.
    pub fn shift_selected(&mut self, shift: LayerShift) {
        let mut ordered = self.selection.clone();
        ordered.sort_by_key(|&id| self.scene.path_of(id));
        if matches!(shift, LayerShift::Back | LayerShift::Forward) {
            ordered.reverse();
        }
        let mut next = self.scene.clone();
        for id in ordered {
            next = next.change_layer(id, shift);
        }
        self.scene = next;
        self.commit_working();
    }

    /// Clone the selection with fresh ids at a small offset; the copies
    /// become the new selection.
    pub fn duplicate_selected(&mut self) {
        let mut ordered = self.selection.clone();
        ordered.sort_by_key(|&id| self.scene.path_of(id));

        let mut next = self.scene.clone();
        let mut copies = Vec::new();
        for id in ordered {
            let Some(element) = self.scene.find(id) else {
                continue;
            };
            let mut copy = element.duplicate();
            let offset = self.position_delta(id, Vec2::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET));
            copy.x += offset.x;
            copy.y += offset.y;
            copies.push(copy.id);
            match self.scene.parent_of(id) {
                None => next.elements.push(copy),
                Some(parent) => {
                    next = next.update(parent, |g| {
                        if let Some(children) = g.children_mut() {
                            children.push(copy);
                        }
                    });
                    next = next.normalize_group(parent);
                }
            }
        }

        if !copies.is_empty() {
            self.scene = next;
            self.selection = copies;
            self.commit_working();
        }
    }

    /// Remove every selected element.
    pub fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let mut next = self.scene.clone();
        for id in self.selection.clone() {
            next = next.remove(id);
        }
        if let Some(scope) = self.group_scope {
            next = next.normalize_group(scope);
        }
        self.scene = next;
        self.selection.clear();
        self.commit_working();
    }

    /// Merge the selection into one compound-path element, replacing the
    /// inputs at the topmost input's position.
    pub fn merge_selected(&mut self) {
        let ids = self.root_selection();
        let Some(merged) = merge(&self.scene, &ids) else {
            return;
        };
        self.replace_with(&ids, merged);
    }

    /// Subtract the upper selected elements from the bottom-most one.
    pub fn subtract_selected(&mut self) {
        let ids = self.root_selection();
        let Some(result) = subtract(&self.scene, &ids) else {
            return;
        };
        self.replace_with(&ids, result);
    }

    fn replace_with(&mut self, ids: &[ElementId], replacement: Element) {
        let mut next = self.scene.clone();
        let insert_at = remove_from_root(&mut next.elements, ids);
        let id = replacement.id;
        next.elements.insert(insert_at.min(next.elements.len()), replacement);
        self.scene = next;
        self.selection = vec![id];
        self.commit_working();
    }

    /// Selected root-level elements, bottom to top.
    fn root_selection(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = self
            .selection
            .iter()
            .copied()
            .filter(|&id| self.scene.parent_of(id).is_none() && self.scene.find(id).is_some())
            .collect();
        ids.sort_by_key(|&id| self.scene.path_of(id));
        ids
    }
}

/// Remove the given ids from the root list and return the index where the
/// topmost of them used to sit, adjusted for the removals below it.
fn remove_from_root(elements: &mut Vec<Element>, ids: &[ElementId]) -> usize {
    let top = elements
        .iter()
        .rposition(|e| ids.contains(&e.id))
        .unwrap_or(elements.len());
    let below = elements[..top].iter().filter(|e| ids.contains(&e.id)).count();
    elements.retain(|e| !ids.contains(&e.id));
    top.saturating_sub(below)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    fn editor_with(elements: Vec<Element>) -> Editor {
        let mut scene = Scene::new(100.0, 100.0);
        scene.elements = elements;
        Editor::with_scene(scene)
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(ElementKind::Rect, x, y, w, h)
    }

    #[test]
    fn test_group_builds_union_box() {
        // Centres (30,50) and (70,50), both 20x20: union (20,40)-(80,60).
        let a = rect(0.3, 0.5, 20.0, 20.0);
        let b = rect(0.7, 0.5, 20.0, 20.0);
        let (ida, idb) = (a.id, b.id);
        let mut editor = editor_with(vec![a, b]);
        editor.selection = vec![ida, idb];

        editor.group_selected();
        assert_eq!(editor.scene().elements.len(), 1);
        let group = &editor.scene().elements[0];
        assert!(group.is_group());
        assert!((group.x - 0.5).abs() < 1e-9);
        assert!((group.y - 0.5).abs() < 1e-9);
        assert!((group.width - 60.0).abs() < 1e-9);
        assert!((group.height - 20.0).abs() < 1e-9);
        let children = group.children().unwrap();
        assert!((children[0].x - -20.0).abs() < 1e-9);
        assert!((children[1].x - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_requires_two() {
        let a = rect(0.3, 0.5, 20.0, 20.0);
        let ida = a.id;
        let mut editor = editor_with(vec![a]);
        editor.selection = vec![ida];
        editor.group_selected();
        assert!(!editor.scene().elements[0].is_group());
    }

    #[test]
    fn test_group_ungroup_round_trips() {
        let mut a = rect(0.3, 0.5, 20.0, 20.0);
        a.rotation = 30.0;
        let b = rect(0.7, 0.4, 20.0, 10.0);
        let (ida, idb) = (a.id, b.id);
        let mut editor = editor_with(vec![a, b]);
        editor.selection = vec![ida, idb];

        editor.group_selected();
        editor.ungroup_selected();

        assert_eq!(editor.scene().elements.len(), 2);
        let a = editor.scene().find(ida).unwrap();
        assert!((a.x - 0.3).abs() < 1e-9);
        assert!((a.y - 0.5).abs() < 1e-9);
        assert!((a.rotation - 30.0).abs() < 1e-9);
        let b = editor.scene().find(idb).unwrap();
        assert!((b.x - 0.7).abs() < 1e-9);
        assert!((b.y - 0.4).abs() < 1e-9);
        // Z order survives.
        assert_eq!(editor.scene().elements[0].id, ida);
        assert_eq!(editor.scene().elements[1].id, idb);
    }

    #[test]
    fn test_ungroup_composes_rotation() {
        let child = rect(30.0, 0.0, 10.0, 10.0);
        let child_id = child.id;
        let mut group = Element::new(
            ElementKind::Group {
                children: vec![child],
            },
            0.5,
            0.5,
            60.0,
            10.0,
        );
        group.rotation = 90.0;
        let group_id = group.id;
        let mut editor = editor_with(vec![group]);
        editor.selection = vec![group_id];

        editor.ungroup_selected();
        let child = editor.scene().find(child_id).unwrap();
        // The (30,0) offset rotates to (0,30): world centre (50, 80).
        assert!((child.x - 0.5).abs() < 1e-9);
        assert!((child.y - 0.8).abs() < 1e-9);
        assert!((child.rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_shift_front_preserves_relative_order() {
        let a = rect(0.1, 0.1, 10.0, 10.0);
        let b = rect(0.2, 0.2, 10.0, 10.0);
        let c = rect(0.3, 0.3, 10.0, 10.0);
        let (ida, idb, idc) = (a.id, b.id, c.id);
        let mut editor = editor_with(vec![a, b, c]);
        editor.selection = vec![idb, ida];

        editor.shift_selected(LayerShift::Front);
        let order: Vec<_> = editor.scene().elements.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![idc, ida, idb]);
    }

    #[test]
    fn test_shift_back_preserves_relative_order() {
        let a = rect(0.1, 0.1, 10.0, 10.0);
        let b = rect(0.2, 0.2, 10.0, 10.0);
        let c = rect(0.3, 0.3, 10.0, 10.0);
        let (ida, idb, idc) = (a.id, b.id, c.id);
        let mut editor = editor_with(vec![a, b, c]);
        editor.selection = vec![idc, idb];

        editor.shift_selected(LayerShift::Back);
        let order: Vec<_> = editor.scene().elements.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![idb, idc, ida]);
    }

    #[test]
    fn test_duplicate_offsets_and_reselects() {
        let a = rect(0.3, 0.3, 20.0, 20.0);
        let ida = a.id;
        let mut editor = editor_with(vec![a]);
        editor.selection = vec![ida];

        editor.duplicate_selected();
        assert_eq!(editor.scene().elements.len(), 2);
        let copy_id = editor.selection()[0];
        assert_ne!(copy_id, ida);
        let copy = editor.scene().find(copy_id).unwrap();
        assert!((copy.x - 0.4).abs() < 1e-9);
        assert!((copy.y - 0.4).abs() < 1e-9);
        // One undoable step.
        assert!(editor.undo());
        assert_eq!(editor.scene().elements.len(), 1);
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let a = rect(0.3, 0.3, 20.0, 20.0);
        let b = rect(0.7, 0.7, 20.0, 20.0);
        let (ida, idb) = (a.id, b.id);
        let mut editor = editor_with(vec![a, b]);
        editor.selection = vec![ida, idb];

        editor.delete_selected();
        assert!(editor.scene().elements.is_empty());
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_merge_selected_replaces_inputs() {
        let a = rect(0.3, 0.5, 20.0, 20.0);
        let below = rect(0.1, 0.1, 5.0, 5.0);
        let b = rect(0.7, 0.5, 20.0, 20.0);
        let (ida, idb) = (a.id, b.id);
        let below_id = below.id;
        let mut editor = editor_with(vec![a, below, b]);
        editor.selection = vec![idb, ida];

        editor.merge_selected();
        assert_eq!(editor.scene().elements.len(), 2);
        assert_eq!(editor.scene().elements[0].id, below_id);
        let merged = &editor.scene().elements[1];
        assert!(matches!(merged.kind, ElementKind::CustomPath { .. }));
        assert_eq!(editor.selection(), &[merged.id]);
    }

    #[test]
    fn test_subtract_selected_produces_mask() {
        let base = rect(0.5, 0.5, 40.0, 40.0);
        let cutter = rect(0.55, 0.5, 20.0, 20.0);
        let (base_id, cutter_id) = (base.id, cutter.id);
        let mut editor = editor_with(vec![base, cutter]);
        editor.selection = vec![base_id, cutter_id];

        editor.subtract_selected();
        assert_eq!(editor.scene().elements.len(), 1);
        let ElementKind::CustomPath { mask: Some(_), .. } = &editor.scene().elements[0].kind
        else {
            panic!("expected a masked custom path");
        };
    }
}
