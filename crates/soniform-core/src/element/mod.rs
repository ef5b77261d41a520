//! Element definitions for the scene graph.

mod paint;

pub use paint::{FillKind, Gradient, GradientKind, Paint, Rgba};

use crate::animation::Track;
use kurbo::{BezPath, Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// A spline anchor with optional tangent handles.
///
/// Handles are relative vectors from the anchor, not absolute points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_in: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_out: Option<Vec2>,
}

impl Anchor {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            handle_in: None,
            handle_out: None,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Text payload for text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub content: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub line_height: f64,
    pub letter_spacing: f64,
    pub align: TextAlign,
}

impl Default for TextBlock {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_family: "sans-serif".to_string(),
            font_size: 24.0,
            font_weight: 400,
            line_height: 1.2,
            letter_spacing: 0.0,
            align: TextAlign::Left,
        }
    }
}

/// View box of imported vector markup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Visibility of a mask layer: visible regions keep the base, hidden cut it away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskVisibility {
    Visible,
    Hidden,
}

/// One layer of a subtract mask composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskLayer {
    pub path: BezPath,
    pub visibility: MaskVisibility,
}

/// Mask composite produced by the subtract operation.
///
/// Layers are painted in order: a full-covering hidden rectangle, the
/// visible base path, then each cutter path hidden on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskComposite {
    pub layers: Vec<MaskLayer>,
}

/// Type-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    Circle,
    Rect,
    Triangle,
    Line,
    Freeform {
        /// Polyline points relative to the element centre.
        points: Vec<Point>,
    },
    Spline {
        /// Anchors relative to the element centre.
        points: Vec<Anchor>,
        closed: bool,
    },
    Group {
        children: Vec<Element>,
    },
    Image {
        /// Embeddable data reference.
        href: String,
        natural_width: f64,
        natural_height: f64,
    },
    Vector {
        /// Sanitized inner markup of the imported SVG root.
        markup: String,
        view_box: ViewBox,
    },
    CustomPath {
        /// Compound path relative to the element centre.
        path: BezPath,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mask: Option<MaskComposite>,
    },
    Text(TextBlock),
}

impl ElementKind {
    /// Short name used in logs and layer listings.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Circle => "circle",
            ElementKind::Rect => "rect",
            ElementKind::Triangle => "triangle",
            ElementKind::Line => "line",
            ElementKind::Freeform { .. } => "freeform",
            ElementKind::Spline { .. } => "spline",
            ElementKind::Group { .. } => "group",
            ElementKind::Image { .. } => "image",
            ElementKind::Vector { .. } => "vector",
            ElementKind::CustomPath { .. } => "custom-path",
            ElementKind::Text(_) => "text",
        }
    }
}

/// Type-based paint defaults, centralized as a single lookup.
pub fn paint_defaults(kind: &ElementKind) -> Paint {
    let (fill_enabled, stroke_enabled) = match kind {
        ElementKind::Circle | ElementKind::Rect | ElementKind::Triangle => (true, false),
        ElementKind::Line => (false, true),
        ElementKind::Freeform { .. } | ElementKind::Spline { .. } => (false, true),
        ElementKind::Group { .. } => (false, false),
        ElementKind::Image { .. } | ElementKind::Vector { .. } => (false, false),
        ElementKind::CustomPath { .. } => (true, false),
        ElementKind::Text(_) => (true, false),
    };
    Paint {
        fill_enabled,
        stroke_enabled,
        ..Paint::default()
    }
}

fn default_opacity() -> f64 {
    1.0
}

/// A drawable node of the scene graph.
///
/// Root-level positions are normalized to `[0,1]` relative to the canvas;
/// children store their centre as an absolute-unit offset from the parent
/// group's centre. Width and height are always absolute units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    pub paint: Paint,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<Track>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create an element with type-based paint defaults.
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            width,
            height,
            rotation: 0.0,
            opacity: 1.0,
            paint: paint_defaults(&kind),
            tracks: Vec::new(),
            kind,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group { .. })
    }

    /// Children of this element, if it is a group.
    pub fn children(&self) -> Option<&[Element]> {
        match &self.kind {
            ElementKind::Group { children } => Some(children),
            _ => None,
        }
    }

    /// Mutable children of this element, if it is a group.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match &mut self.kind {
            ElementKind::Group { children } => Some(children),
            _ => None,
        }
    }

    /// Clone this element with fresh ids on the element, every nested
    /// child, and every track and keyframe. Used by duplication; project
    /// import keeps ids verbatim and never goes through here.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.regenerate_ids();
        copy
    }

    fn regenerate_ids(&mut self) {
        self.id = Uuid::new_v4();
        for track in &mut self.tracks {
            track.id = Uuid::new_v4();
            for keyframe in &mut track.keyframes {
                keyframe.id = Uuid::new_v4();
            }
        }
        if let Some(children) = self.children_mut() {
            for child in children {
                child.regenerate_ids();
            }
        }
    }

    /// Collect this element's id and the ids of all descendants.
    pub fn all_ids(&self) -> Vec<ElementId> {
        let mut ids = vec![self.id];
        if let Some(children) = self.children() {
            for child in children {
                ids.extend(child.all_ids());
            }
        }
        ids
    }
}
