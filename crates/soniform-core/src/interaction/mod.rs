//! Pointer-driven editing: selection, tools, and the gesture state machine.
//!
//! `Editor` owns the committed document through `History` plus a working
//! copy that in-progress gestures mutate; a gesture commits on release and
//! cancels by restoring the committed tree.

mod arrange;
mod spline;
mod transform;

pub use spline::SplinePart;
pub use transform::{Corner, ResizeStart};

use crate::element::{Element, ElementId, ElementKind};
use crate::history::History;
use crate::scene::Scene;
use crate::snap::GridVariant;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};

/// Distance within which a spline click closes back onto the first anchor,
/// in canvas units.
pub const SPLINE_CLOSE_DISTANCE: f64 = 12.0;

/// Minimum element width/height in canvas units.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

/// Canvas-unit offset applied to duplicated elements.
pub const DUPLICATE_OFFSET: f64 = 10.0;

/// The active editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Pan,
    Freeform,
    Spline,
}

/// Keyboard modifiers accompanying a pointer event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Snap while moving; toggle membership on click.
    pub shift: bool,
    /// Lock aspect ratio while resizing.
    pub ctrl: bool,
    /// Edit tangent handles independently.
    pub alt: bool,
}

/// The single in-progress gesture, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Rubber-band selection from `start`, in canvas units.
    Marquee {
        start: Point,
        current: Point,
        preserved: Vec<ElementId>,
    },
    /// Dragging the viewport; `last` is in screen pixels.
    Pan { last: Point },
    /// Dragging the selection; `last` is in screen pixels.
    Move { last: Point, moved: bool },
    Resize {
        id: ElementId,
        corner: Corner,
        start: ResizeStart,
        resized: bool,
    },
    /// Collecting freeform points, in canvas units.
    FreeformDraw { points: Vec<Point> },
    /// A spline is open for authoring; clicks append anchors.
    SplineCreate { id: ElementId },
    /// Dragging out the tangent of a just-placed anchor.
    SplineTangentDrag {
        id: ElementId,
        anchor: usize,
        origin: Point,
    },
    /// Dragging an anchor or handle of an existing spline.
    SplineEdit {
        id: ElementId,
        part: SplinePart,
        edited: bool,
    },
}

/// The interaction controller: committed document, working copy, selection,
/// view transform, and the gesture state machine.
#[derive(Debug)]
pub struct Editor {
    pub(crate) history: History,
    pub(crate) scene: Scene,
    pub(crate) selection: Vec<ElementId>,
    pub viewport: Viewport,
    /// Grid snapping, when enabled.
    pub grid: Option<GridVariant>,
    pub(crate) tool: Tool,
    pub(crate) state: InteractionState,
    /// When set, selection and hit testing are scoped to this group's
    /// children.
    pub(crate) group_scope: Option<ElementId>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_scene(Scene::default())
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scene(scene: Scene) -> Self {
        Self {
            history: History::new(scene.clone()),
            scene,
            selection: Vec::new(),
            viewport: Viewport::new(),
            grid: None,
            tool: Tool::Select,
            state: InteractionState::Idle,
            group_scope: None,
        }
    }

    /// The scene as currently displayed, including uncommitted gesture
    /// changes.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn group_scope(&self) -> Option<ElementId> {
        self.group_scope
    }

    /// Switch tools, finalizing any in-progress authoring first.
    pub fn set_tool(&mut self, tool: Tool) {
        self.finish_gesture();
        self.tool = tool;
    }

    pub fn pointer_down(&mut self, screen: Point, mods: Modifiers) {
        let canvas = self.viewport.screen_to_canvas(screen);
        match self.tool {
            Tool::Pan => {
                self.state = InteractionState::Pan { last: screen };
            }
            Tool::Select => self.select_pointer_down(screen, canvas, mods),
            Tool::Freeform => {
                self.state = InteractionState::FreeformDraw {
                    points: vec![canvas],
                };
            }
            Tool::Spline => self.spline_pointer_down(canvas),
        }
    }

    pub fn pointer_move(&mut self, screen: Point, mods: Modifiers) {
        let canvas = self.viewport.screen_to_canvas(screen);
        match self.state.clone() {
            InteractionState::Idle => {}
            InteractionState::Pan { last } => {
                self.viewport.pan(screen - last);
                self.state = InteractionState::Pan { last: screen };
            }
            InteractionState::Marquee {
                start, preserved, ..
            } => {
                self.state = InteractionState::Marquee {
                    start,
                    current: canvas,
                    preserved,
                };
            }
            InteractionState::Move { last, .. } => {
                self.move_selection(screen - last, mods);
                self.state = InteractionState::Move {
                    last: screen,
                    moved: true,
                };
            }
            InteractionState::Resize {
                id, corner, start, ..
            } => {
                self.resize_to(id, corner, start, canvas, mods);
                self.state = InteractionState::Resize {
                    id,
                    corner,
                    start,
                    resized: true,
                };
            }
            InteractionState::FreeformDraw { mut points } => {
                points.push(canvas);
                self.state = InteractionState::FreeformDraw { points };
            }
            InteractionState::SplineCreate { .. } => {}
            InteractionState::SplineTangentDrag { id, anchor, origin } => {
                self.spline_tangent_move(id, anchor, origin, canvas, mods);
            }
            InteractionState::SplineEdit { id, part, .. } => {
                self.spline_edit_move(id, part, canvas, mods);
                self.state = InteractionState::SplineEdit {
                    id,
                    part,
                    edited: true,
                };
            }
        }
    }

    pub fn pointer_up(&mut self, _screen: Point, _mods: Modifiers) {
        match self.state.clone() {
            InteractionState::Idle | InteractionState::SplineCreate { .. } => {}
            InteractionState::Pan { .. } => {
                self.state = InteractionState::Idle;
            }
            InteractionState::Marquee {
                start,
                current,
                preserved,
            } => {
                self.finish_marquee(start, current, preserved);
                self.state = InteractionState::Idle;
            }
            InteractionState::Move { moved, .. } => {
                if moved {
                    if let Some(scope) = self.group_scope {
                        self.scene = self.scene.normalize_group(scope);
                    }
                    self.commit_working();
                }
                self.state = InteractionState::Idle;
            }
            InteractionState::Resize { resized, .. } => {
                if resized {
                    if let Some(scope) = self.group_scope {
                        self.scene = self.scene.normalize_group(scope);
                    }
                    self.commit_working();
                }
                self.state = InteractionState::Idle;
            }
            InteractionState::FreeformDraw { points } => {
                self.finish_freeform(&points);
                self.state = InteractionState::Idle;
            }
            InteractionState::SplineTangentDrag { id, .. } => {
                // Authoring continues until close, Escape or a tool switch.
                self.state = InteractionState::SplineCreate { id };
            }
            InteractionState::SplineEdit { id, part, edited } => {
                self.finish_spline_edit(id, part, edited);
                self.state = InteractionState::Idle;
            }
        }
    }

    /// Double-click enters group editing scoped to the clicked element's
    /// outermost ancestor group; a background double-click leaves it.
    pub fn double_click(&mut self, screen: Point, _mods: Modifiers) {
        let canvas = self.viewport.screen_to_canvas(screen);
        let Some(hit) = self.hit_test(canvas) else {
            self.group_scope = None;
            return;
        };
        let Some(root) = self.scene.root_ancestor(hit) else {
            return;
        };
        let is_group = self.scene.find(root).is_some_and(Element::is_group);
        if is_group && self.group_scope != Some(root) {
            self.group_scope = Some(root);
            // Select the child under the cursor within the new scope.
            self.selection = self.hit_test(canvas).into_iter().collect();
        }
    }

    /// Cancel or finalize the in-progress gesture; when idle, leave group
    /// editing.
    pub fn escape(&mut self) {
        match self.state.clone() {
            InteractionState::Idle => {
                self.group_scope = None;
            }
            InteractionState::SplineCreate { id }
            | InteractionState::SplineTangentDrag { id, .. } => {
                self.finalize_spline(id);
            }
            _ => {
                self.cancel_working();
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.undo() {
            return false;
        }
        self.adopt_committed();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo() {
            return false;
        }
        self.adopt_committed();
        true
    }

    /// Begin a corner resize on an element, as dispatched by the handle the
    /// view layer hit-tested.
    pub fn begin_resize(&mut self, id: ElementId, corner: Corner) {
        let Some(start) = ResizeStart::capture(&self.scene, id) else {
            return;
        };
        if !self.selection.contains(&id) {
            self.selection = vec![id];
        }
        self.state = InteractionState::Resize {
            id,
            corner,
            start,
            resized: false,
        };
    }

    /// Begin dragging an anchor or tangent handle of an existing spline.
    pub fn begin_spline_edit(&mut self, id: ElementId, part: SplinePart) {
        if !matches!(
            self.scene.find(id).map(|e| &e.kind),
            Some(ElementKind::Spline { .. })
        ) {
            return;
        }
        self.selection = vec![id];
        self.state = InteractionState::SplineEdit {
            id,
            part,
            edited: false,
        };
    }

    fn select_pointer_down(&mut self, screen: Point, canvas: Point, mods: Modifiers) {
        if let Some(hit) = self.hit_test(canvas) {
            if mods.shift {
                if let Some(pos) = self.selection.iter().position(|&s| s == hit) {
                    self.selection.remove(pos);
                    return;
                }
                self.selection.push(hit);
            } else if !self.selection.contains(&hit) {
                self.selection = vec![hit];
            }
            self.state = InteractionState::Move {
                last: screen,
                moved: false,
            };
        } else {
            let preserved = if mods.shift {
                self.selection.clone()
            } else {
                self.selection.clear();
                Vec::new()
            };
            self.state = InteractionState::Marquee {
                start: canvas,
                current: canvas,
                preserved,
            };
        }
    }

    fn finish_marquee(&mut self, start: Point, current: Point, preserved: Vec<ElementId>) {
        let rect = Rect::from_points(start, current);
        let mut selection = preserved;
        for id in self.scope_ids() {
            let inside = self
                .scene
                .world_center(id)
                .is_some_and(|c| rect.contains(c));
            if inside && !selection.contains(&id) {
                selection.push(id);
            }
        }
        self.selection = selection;
    }

    /// Topmost element under the canvas point, within the current scope.
    pub fn hit_test(&self, canvas: Point) -> Option<ElementId> {
        let ids = self.scope_ids();
        ids.iter()
            .rev()
            .copied()
            .find(|&id| {
                self.scene
                    .world_bounds(id)
                    .is_some_and(|b| b.contains(canvas))
            })
    }

    /// Candidate ids for hit testing and marquee: root elements, or the
    /// scoped group's children.
    fn scope_ids(&self) -> Vec<ElementId> {
        match self.group_scope.and_then(|id| self.scene.find(id)) {
            Some(group) => group
                .children()
                .map(|c| c.iter().map(|e| e.id).collect())
                .unwrap_or_default(),
            None => self.scene.elements.iter().map(|e| e.id).collect(),
        }
    }

    fn finish_freeform(&mut self, points: &[Point]) {
        let Some(first) = points.first() else {
            return;
        };
        let mut bbox = Rect::new(first.x, first.y, first.x, first.y);
        for p in points {
            bbox = bbox.union_pt(*p);
        }
        let center = bbox.center();
        let relative: Vec<Point> = points
            .iter()
            .map(|p| Point::new(p.x - center.x, p.y - center.y))
            .collect();
        let element = Element::new(
            ElementKind::Freeform { points: relative },
            center.x / self.scene.width,
            center.y / self.scene.height,
            bbox.width().max(MIN_ELEMENT_SIZE),
            bbox.height().max(MIN_ELEMENT_SIZE),
        );
        self.selection = vec![element.id];
        self.scene = self.scene.add(element);
        self.commit_working();
    }

    /// Commit the working scene if it differs from the committed one.
    pub(crate) fn commit_working(&mut self) {
        if &self.scene != self.history.current() {
            self.history.commit(self.scene.clone());
        }
    }

    /// Throw away uncommitted changes.
    pub(crate) fn cancel_working(&mut self) {
        self.scene = self.history.current().clone();
        self.state = InteractionState::Idle;
    }

    fn adopt_committed(&mut self) {
        self.scene = self.history.current().clone();
        self.state = InteractionState::Idle;
        self.selection.retain(|&id| self.scene.find(id).is_some());
        if let Some(scope) = self.group_scope {
            if self.scene.find(scope).is_none() {
                self.group_scope = None;
            }
        }
    }

    /// Finalize whatever gesture is active, as a tool switch does.
    fn finish_gesture(&mut self) {
        match self.state.clone() {
            InteractionState::SplineCreate { id }
            | InteractionState::SplineTangentDrag { id, .. } => {
                self.finalize_spline(id);
            }
            InteractionState::Idle => {}
            _ => self.cancel_working(),
        }
    }

    /// Move delta helper: absolute canvas units for scoped children,
    /// normalized units at the root.
    pub(crate) fn position_delta(&self, id: ElementId, canvas_delta: Vec2) -> Vec2 {
        if self.scene.parent_of(id).is_some() {
            canvas_delta
        } else {
            Vec2::new(
                canvas_delta.x / self.scene.width,
                canvas_delta.y / self.scene.height,
            )
        }
    }
}
