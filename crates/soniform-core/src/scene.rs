//! Scene graph: an ordered, recursively nested collection of elements.
//!
//! All tree operations are functional: they return a new tree and never
//! mutate in place, so the history manager can snapshot by value without
//! defensive copying at commit sites.

use crate::element::{Element, ElementId};
use crate::geometry::rotated_corners;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Placement of an element relative to a sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Before,
    After,
}

/// Sibling-list reorder directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerShift {
    Front,
    Back,
    Forward,
    Backward,
}

/// The document: canvas dimensions plus the root element list (back to
/// front paint order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Canvas width in absolute units (also the rendering surface width).
    pub width: f64,
    /// Canvas height in absolute units.
    pub height: f64,
    pub elements: Vec<Element>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Find an element anywhere in the tree.
    pub fn find(&self, id: ElementId) -> Option<&Element> {
        find_in(&self.elements, id)
    }

    /// Return a new tree with `f` applied to the element with `id`.
    /// Unchanged when the id is absent.
    pub fn update(&self, id: ElementId, f: impl FnOnce(&mut Element)) -> Scene {
        let mut next = self.clone();
        if let Some(element) = find_in_mut(&mut next.elements, id) {
            f(element);
        }
        next
    }

    /// Return a new tree with the element appended at the root level.
    pub fn add(&self, element: Element) -> Scene {
        let mut next = self.clone();
        next.elements.push(element);
        next
    }

    /// Return a new tree without the element (and its descendants).
    pub fn remove(&self, id: ElementId) -> Scene {
        let mut next = self.clone();
        remove_in(&mut next.elements, id);
        next
    }

    /// Reorder `source` next to `target` within their shared parent.
    /// No-op when the two live under different parents.
    pub fn move_relative(&self, source: ElementId, target: ElementId, place: Placement) -> Scene {
        let mut next = self.clone();
        let (Some(source_path), Some(target_path)) = (self.path_of(source), self.path_of(target))
        else {
            return next;
        };
        if source_path[..source_path.len() - 1] != target_path[..target_path.len() - 1] {
            return next;
        }
        let siblings = list_at_mut(&mut next.elements, &source_path[..source_path.len() - 1]);
        let from = source_path[source_path.len() - 1];
        let element = siblings.remove(from);
        let Some(mut to) = siblings.iter().position(|e| e.id == target) else {
            siblings.insert(from.min(siblings.len()), element);
            return next;
        };
        if place == Placement::After {
            to += 1;
        }
        siblings.insert(to.min(siblings.len()), element);
        next
    }

    /// Shift an element within its sibling list. No-op when it has no
    /// siblings.
    pub fn change_layer(&self, id: ElementId, shift: LayerShift) -> Scene {
        let mut next = self.clone();
        let Some(path) = self.path_of(id) else {
            return next;
        };
        let siblings = list_at_mut(&mut next.elements, &path[..path.len() - 1]);
        if siblings.len() < 2 {
            return next;
        }
        let pos = path[path.len() - 1];
        match shift {
            LayerShift::Front => {
                let element = siblings.remove(pos);
                siblings.push(element);
            }
            LayerShift::Back => {
                let element = siblings.remove(pos);
                siblings.insert(0, element);
            }
            LayerShift::Forward => {
                if pos + 1 < siblings.len() {
                    siblings.swap(pos, pos + 1);
                }
            }
            LayerShift::Backward => {
                if pos > 0 {
                    siblings.swap(pos, pos - 1);
                }
            }
        }
        next
    }

    /// Ordered child indices from the root down to the element.
    pub fn path_of(&self, id: ElementId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        if path_in(&self.elements, id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    /// Id of the element's parent group, `None` for root-level elements.
    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        let path = self.path_of(id)?;
        if path.len() < 2 {
            return None;
        }
        let mut current = &self.elements[path[0]];
        for &index in &path[1..path.len() - 1] {
            current = &current.children()?[index];
        }
        Some(current.id)
    }

    /// Ids of the elements sharing the element's parent, excluding itself.
    pub fn siblings_of(&self, id: ElementId) -> Vec<ElementId> {
        let list: Vec<ElementId> = match self.parent_of(id) {
            Some(parent) => self
                .find(parent)
                .and_then(Element::children)
                .map(|c| c.iter().map(|e| e.id).collect())
                .unwrap_or_default(),
            None => {
                if self.path_of(id).is_none() {
                    return Vec::new();
                }
                self.elements.iter().map(|e| e.id).collect()
            }
        };
        list.into_iter().filter(|&s| s != id).collect()
    }

    /// The outermost root-level ancestor of an element (itself if it is
    /// root-level).
    pub fn root_ancestor(&self, id: ElementId) -> Option<ElementId> {
        let path = self.path_of(id)?;
        Some(self.elements[path[0]].id)
    }

    /// Centre of an element in absolute canvas units, composing every
    /// ancestor group's position and rotation.
    pub fn world_center(&self, id: ElementId) -> Option<Point> {
        let path = self.path_of(id)?;
        let root = &self.elements[path[0]];
        let mut center = Point::new(root.x * self.width, root.y * self.height);
        let mut rotation = root.rotation;
        let mut current = root;
        for &index in &path[1..] {
            let child = &current.children()?[index];
            let offset = rotate_vec(Vec2::new(child.x, child.y), rotation);
            center += offset;
            rotation += child.rotation;
            current = child;
        }
        Some(center)
    }

    /// Accumulated rotation of an element in degrees, including ancestors.
    pub fn world_rotation(&self, id: ElementId) -> Option<f64> {
        let path = self.path_of(id)?;
        let root = &self.elements[path[0]];
        let mut rotation = root.rotation;
        let mut current = root;
        for &index in &path[1..] {
            let child = &current.children()?[index];
            rotation += child.rotation;
            current = child;
        }
        Some(rotation)
    }

    /// Axis-aligned bounds of an element in canvas units (centre, width and
    /// height; rotation ignored). Used by snapping and marquee tests.
    pub fn world_bounds(&self, id: ElementId) -> Option<Rect> {
        let center = self.world_center(id)?;
        let element = self.find(id)?;
        Some(Rect::new(
            center.x - element.width / 2.0,
            center.y - element.height / 2.0,
            center.x + element.width / 2.0,
            center.y + element.height / 2.0,
        ))
    }

    /// Recompute a group's bounding box from the post-rotation corners of
    /// its children, recentre the group on it, and re-express each child
    /// relative to the new centre.
    ///
    /// Invoked whenever a group's children set or a child's geometry
    /// changes; group geometry is never independently authored.
    pub fn normalize_group(&self, id: ElementId) -> Scene {
        let Some(path) = self.path_of(id) else {
            return self.clone();
        };
        let is_root = path.len() == 1;
        let mut next = self.clone();
        let Some(group) = find_in_mut(&mut next.elements, id) else {
            return next;
        };
        let rotation = group.rotation;
        let Some(children) = group.children_mut() else {
            return next;
        };
        if children.is_empty() {
            return next;
        }

        let mut bbox: Option<Rect> = None;
        for child in children.iter() {
            let corners = rotated_corners(
                Point::new(child.x, child.y),
                child.width,
                child.height,
                child.rotation,
            );
            for corner in corners {
                let r = Rect::new(corner.x, corner.y, corner.x, corner.y);
                bbox = Some(match bbox {
                    Some(b) => b.union(r),
                    None => r,
                });
            }
        }
        let bbox = bbox.unwrap_or(Rect::ZERO);
        let local_center = bbox.center();
        for child in children.iter_mut() {
            child.x -= local_center.x;
            child.y -= local_center.y;
        }
        let shift = rotate_vec(Vec2::new(local_center.x, local_center.y), rotation);
        group.width = bbox.width();
        group.height = bbox.height();
        if is_root {
            group.x += shift.x / next.width;
            group.y += shift.y / next.height;
        } else {
            group.x += shift.x;
            group.y += shift.y;
        }
        next
    }

    /// Iterate over every element in the tree, depth-first.
    pub fn walk(&self, mut visit: impl FnMut(&Element)) {
        fn go(elements: &[Element], visit: &mut impl FnMut(&Element)) {
            for element in elements {
                visit(element);
                if let Some(children) = element.children() {
                    go(children, visit);
                }
            }
        }
        go(&self.elements, &mut visit);
    }
}

/// Rotate a vector by `degrees`.
pub(crate) fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

fn find_in(elements: &[Element], id: ElementId) -> Option<&Element> {
    for element in elements {
        if element.id == id {
            return Some(element);
        }
        if let Some(children) = element.children() {
            if let Some(found) = find_in(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_in_mut(elements: &mut [Element], id: ElementId) -> Option<&mut Element> {
    for element in elements {
        if element.id == id {
            return Some(element);
        }
        if let Some(children) = element.children_mut() {
            if let Some(found) = find_in_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn remove_in(elements: &mut Vec<Element>, id: ElementId) -> bool {
    if let Some(pos) = elements.iter().position(|e| e.id == id) {
        elements.remove(pos);
        return true;
    }
    for element in elements {
        if let Some(children) = element.children_mut() {
            if remove_in(children, id) {
                return true;
            }
        }
    }
    false
}

fn path_in(elements: &[Element], id: ElementId, path: &mut Vec<usize>) -> bool {
    for (index, element) in elements.iter().enumerate() {
        path.push(index);
        if element.id == id {
            return true;
        }
        if let Some(children) = element.children() {
            if path_in(children, id, path) {
                return true;
            }
        }
        path.pop();
    }
    false
}

fn list_at_mut<'a>(elements: &'a mut Vec<Element>, prefix: &[usize]) -> &'a mut Vec<Element> {
    let mut list = elements;
    for &index in prefix {
        list = list[index]
            .children_mut()
            .expect("path prefix must address a group");
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(ElementKind::Rect, x, y, w, h)
    }

    fn group_of(children: Vec<Element>) -> Element {
        Element::new(ElementKind::Group { children }, 0.5, 0.5, 100.0, 100.0)
    }

    #[test]
    fn test_find_nested() {
        let child = rect(10.0, 10.0, 20.0, 20.0);
        let child_id = child.id;
        let group = group_of(vec![child]);
        let scene = Scene::default().add(group);

        assert!(scene.find(child_id).is_some());
        assert!(scene.find(uuid::Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_update_is_functional() {
        let el = rect(0.5, 0.5, 40.0, 40.0);
        let id = el.id;
        let scene = Scene::default().add(el);

        let next = scene.update(id, |e| e.width = 99.0);
        assert_eq!(scene.find(id).unwrap().width, 40.0);
        assert_eq!(next.find(id).unwrap().width, 99.0);
    }

    #[test]
    fn test_remove_nested() {
        let child = rect(10.0, 10.0, 20.0, 20.0);
        let child_id = child.id;
        let group = group_of(vec![child]);
        let group_id = group.id;
        let scene = Scene::default().add(group);

        let next = scene.remove(child_id);
        assert!(next.find(child_id).is_none());
        assert!(next.find(group_id).is_some());
        // Original untouched
        assert!(scene.find(child_id).is_some());
    }

    #[test]
    fn test_move_relative_same_parent() {
        let a = rect(0.1, 0.1, 10.0, 10.0);
        let b = rect(0.2, 0.2, 10.0, 10.0);
        let c = rect(0.3, 0.3, 10.0, 10.0);
        let (ida, idb, idc) = (a.id, b.id, c.id);
        let scene = Scene::default().add(a).add(b).add(c);

        let next = scene.move_relative(ida, idc, Placement::After);
        let order: Vec<_> = next.elements.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![idb, idc, ida]);

        let next = scene.move_relative(idc, ida, Placement::Before);
        let order: Vec<_> = next.elements.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![idc, ida, idb]);
    }

    #[test]
    fn test_move_relative_cross_parent_is_noop() {
        let child = rect(0.0, 0.0, 10.0, 10.0);
        let child_id = child.id;
        let group = group_of(vec![child]);
        let outside = rect(0.3, 0.3, 10.0, 10.0);
        let outside_id = outside.id;
        let scene = Scene::default().add(group).add(outside);

        let next = scene.move_relative(child_id, outside_id, Placement::After);
        assert_eq!(next, scene);
    }

    #[test]
    fn test_change_layer() {
        let a = rect(0.1, 0.1, 10.0, 10.0);
        let b = rect(0.2, 0.2, 10.0, 10.0);
        let c = rect(0.3, 0.3, 10.0, 10.0);
        let (ida, idb, idc) = (a.id, b.id, c.id);
        let scene = Scene::default().add(a).add(b).add(c);

        let front = scene.change_layer(ida, LayerShift::Front);
        assert_eq!(front.elements.last().unwrap().id, ida);

        let back = scene.change_layer(idc, LayerShift::Back);
        assert_eq!(back.elements.first().unwrap().id, idc);

        let forward = scene.change_layer(ida, LayerShift::Forward);
        let order: Vec<_> = forward.elements.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![idb, ida, idc]);

        let backward = scene.change_layer(idc, LayerShift::Backward);
        let order: Vec<_> = backward.elements.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![ida, idc, idb]);
    }

    #[test]
    fn test_change_layer_single_sibling_is_noop() {
        let only = rect(0.5, 0.5, 10.0, 10.0);
        let id = only.id;
        let scene = Scene::default().add(only);
        assert_eq!(scene.change_layer(id, LayerShift::Front), scene);
    }

    #[test]
    fn test_path_of() {
        let child = rect(0.0, 0.0, 10.0, 10.0);
        let child_id = child.id;
        let inner = group_of(vec![child]);
        let inner_id = inner.id;
        let outer = group_of(vec![inner]);
        let spacer = rect(0.9, 0.9, 10.0, 10.0);
        let scene = Scene::default().add(spacer).add(outer);

        assert_eq!(scene.path_of(child_id), Some(vec![1, 0, 0]));
        assert_eq!(scene.path_of(inner_id), Some(vec![1, 0]));
    }

    #[test]
    fn test_siblings_of() {
        let a = rect(0.1, 0.1, 10.0, 10.0);
        let b = rect(0.2, 0.2, 10.0, 10.0);
        let c = rect(0.3, 0.3, 10.0, 10.0);
        let (ida, idb, idc) = (a.id, b.id, c.id);
        let scene = Scene::default().add(a).add(b).add(c);

        assert_eq!(scene.siblings_of(idb), vec![ida, idc]);
        assert!(scene.siblings_of(uuid::Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_parent_and_root_ancestor() {
        let child = rect(0.0, 0.0, 10.0, 10.0);
        let child_id = child.id;
        let inner = group_of(vec![child]);
        let inner_id = inner.id;
        let outer = group_of(vec![inner]);
        let outer_id = outer.id;
        let scene = Scene::default().add(outer);

        assert_eq!(scene.parent_of(child_id), Some(inner_id));
        assert_eq!(scene.parent_of(outer_id), None);
        assert_eq!(scene.root_ancestor(child_id), Some(outer_id));
    }

    #[test]
    fn test_world_center_composes_parents() {
        let mut child = rect(30.0, 0.0, 10.0, 10.0);
        child.rotation = 10.0;
        let child_id = child.id;
        let mut group = group_of(vec![child]);
        group.x = 0.5;
        group.y = 0.5;
        group.rotation = 90.0;
        let scene = Scene::new(100.0, 100.0).add(group);

        // Group centre is (50,50); the child offset (30,0) rotates to (0,30).
        let center = scene.world_center(child_id).unwrap();
        assert!((center.x - 50.0).abs() < 1e-9);
        assert!((center.y - 80.0).abs() < 1e-9);
        assert!((scene.world_rotation(child_id).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_group_recenters() {
        let a = rect(-20.0, 0.0, 10.0, 10.0);
        let b = rect(40.0, 0.0, 10.0, 10.0);
        let mut group = group_of(vec![a, b]);
        group.x = 0.5;
        group.y = 0.5;
        let group_id = group.id;
        let scene = Scene::new(100.0, 100.0).add(group);

        let next = scene.normalize_group(group_id);
        let group = next.find(group_id).unwrap();
        // Children span x in [-25, 45] locally: centre 10, size 70x10.
        assert!((group.width - 70.0).abs() < 1e-9);
        assert!((group.height - 10.0).abs() < 1e-9);
        assert!((group.x - 0.6).abs() < 1e-9);
        let children = group.children().unwrap();
        assert!((children[0].x - -30.0).abs() < 1e-9);
        assert!((children[1].x - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_walk_visits_all() {
        let child = rect(0.0, 0.0, 10.0, 10.0);
        let group = group_of(vec![child]);
        let scene = Scene::default().add(group).add(rect(0.2, 0.2, 5.0, 5.0));
        let mut count = 0;
        scene.walk(|_| count += 1);
        assert_eq!(count, 3);
    }
}
