//! Soniform Core Library
//!
//! Platform-agnostic engine for an audio-reactive vector scene editor:
//! scene graph, geometry, interaction state machine, snapping, animation
//! tracks, and project serialization.

pub mod animation;
pub mod assets;
pub mod audio;
pub mod element;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod project;
pub mod scene;
pub mod snap;
pub mod viewport;

pub use animation::{
    apply_layer_commands, evaluate_frame, Driver, FrameOverlays, Keyframe, LayerCommand, Overlay,
    Track, TrackTarget,
};
pub use assets::{import_font, import_image, import_images, import_vector, sanitize_svg, Font};
pub use audio::{band_level, AudioSource, FftSize};
pub use element::{Anchor, Element, ElementId, ElementKind, Paint, Rgba};
pub use geometry::{merge, subtract, union_bounds};
pub use history::History;
pub use interaction::{Corner, Editor, InteractionState, Modifiers, SplinePart, Tool};
pub use project::Project;
pub use scene::{LayerShift, Placement, Scene};
pub use snap::{snap_move, GridVariant, SnapAdjustment, SnapGuide, SNAP_THRESHOLD};
pub use viewport::Viewport;
