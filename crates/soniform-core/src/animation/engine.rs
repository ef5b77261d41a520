//! Per-frame evaluation of every enabled track into non-destructive
//! overlays. The scene tree itself is never mutated by playback.

use super::{driver_value, sample_track, LayerCommand, SampledValue, TrackTarget};
use crate::element::{ElementId, Rgba};
use crate::scene::Scene;
use std::collections::HashMap;

/// Per-element render adjustments for one frame.
///
/// Multiplicative fields default to 1, additive fields to 0; an identity
/// overlay leaves the element exactly as authored.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Multiplier on both dimensions.
    pub scale: f64,
    /// Multiplier on the authored opacity.
    pub opacity: f64,
    /// Degrees added to the authored rotation.
    pub rotation: f64,
    /// Canvas-unit offsets added to the element's position.
    pub dx: f64,
    pub dy: f64,
    /// Canvas units added to width/height.
    pub dw: f64,
    pub dh: f64,
    /// Fill color override.
    pub color: Option<Rgba>,
    /// Pending z-order command.
    pub layer: Option<LayerCommand>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            scale: 1.0,
            opacity: 1.0,
            rotation: 0.0,
            dx: 0.0,
            dy: 0.0,
            dw: 0.0,
            dh: 0.0,
            color: None,
            layer: None,
        }
    }
}

impl Overlay {
    fn fold(&mut self, target: TrackTarget, value: SampledValue) {
        match (target, value) {
            (TrackTarget::Scale, SampledValue::Number(n)) => self.scale *= n,
            (TrackTarget::Opacity, SampledValue::Number(n)) => self.opacity *= n,
            (TrackTarget::Rotation, SampledValue::Number(n)) => self.rotation += n,
            (TrackTarget::X, SampledValue::Number(n)) => self.dx += n,
            (TrackTarget::Y, SampledValue::Number(n)) => self.dy += n,
            (TrackTarget::Width, SampledValue::Number(n)) => self.dw += n,
            (TrackTarget::Height, SampledValue::Number(n)) => self.dh += n,
            (TrackTarget::Color, SampledValue::Color(c)) => self.color = Some(c),
            (TrackTarget::Layer, SampledValue::Layer(cmd)) => self.layer = Some(cmd),
            // Mismatched value kinds are skipped.
            _ => {}
        }
    }
}

/// All overlays produced for one frame, keyed by element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOverlays {
    overlays: HashMap<ElementId, Overlay>,
}

impl FrameOverlays {
    pub fn get(&self, id: ElementId) -> Option<&Overlay> {
        self.overlays.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// The layer commands this frame, in scene walk order.
    pub fn layer_commands(&self, scene: &Scene) -> Vec<(ElementId, LayerCommand)> {
        let mut commands = Vec::new();
        scene.walk(|element| {
            if let Some(cmd) = self.overlays.get(&element.id).and_then(|o| o.layer) {
                commands.push((element.id, cmd));
            }
        });
        commands
    }
}

/// Evaluate every enabled track in the scene at the given clock and
/// spectrum. Elements with no active tracks get no entry.
///
/// Tracks on the same target compose: scale and opacity multiply, the
/// geometric targets add, and color/layer take the last evaluated track.
pub fn evaluate_frame(scene: &Scene, clock_ms: f64, spectrum: &[u8]) -> FrameOverlays {
    let mut overlays = HashMap::new();
    scene.walk(|element| {
        let mut overlay: Option<Overlay> = None;
        for track in &element.tracks {
            if !track.enabled {
                continue;
            }
            let t = driver_value(&track.driver, clock_ms, spectrum);
            if let Some(value) = sample_track(track, t) {
                overlay
                    .get_or_insert_with(Overlay::default)
                    .fold(track.target, value);
            }
        }
        if let Some(overlay) = overlay {
            overlays.insert(element.id, overlay);
        }
    });
    FrameOverlays { overlays }
}

/// Apply layer commands to a back-to-front sibling order, returning the
/// reordered id list. Commands apply in sequence; a command naming an
/// unknown element, or targeting the element itself, is skipped.
pub fn apply_layer_commands(
    order: &[ElementId],
    commands: &[(ElementId, LayerCommand)],
) -> Vec<ElementId> {
    let mut order: Vec<ElementId> = order.to_vec();
    for &(id, command) in commands {
        let Some(from) = order.iter().position(|&e| e == id) else {
            continue;
        };
        match command {
            LayerCommand::Front => {
                let id = order.remove(from);
                order.push(id);
            }
            LayerCommand::Back => {
                let id = order.remove(from);
                order.insert(0, id);
            }
            LayerCommand::Before(target) | LayerCommand::After(target) => {
                if target == id || !order.contains(&target) {
                    continue;
                }
                let id = order.remove(from);
                // Re-resolve after removal shifts indices.
                let at = order
                    .iter()
                    .position(|&e| e == target)
                    .map(|i| match command {
                        LayerCommand::After(_) => i + 1,
                        _ => i,
                    })
                    .unwrap_or(order.len());
                order.insert(at, id);
            }
        }
    }
    order
}
