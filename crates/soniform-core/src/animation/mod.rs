//! Keyframed animation tracks and their per-frame sampling.

mod engine;

pub use engine::{apply_layer_commands, evaluate_frame, FrameOverlays, Overlay};

use crate::audio::band_level;
use crate::element::{ElementId, Rgba};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for tracks and keyframes.
pub type TrackId = Uuid;

/// The element property a track animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackTarget {
    Scale,
    Opacity,
    Rotation,
    X,
    Y,
    Width,
    Height,
    Layer,
    Color,
}

/// What drives a track's progress value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum Driver {
    /// A looping clock; progress is `(now mod duration) / duration`.
    Time { duration_ms: f64 },
    /// A live audio band, expressed as a fraction interval of the spectrum.
    Audio { frequency_range: [f64; 2] },
}

/// A keyframe value: numeric for most targets, a color string for `color`,
/// a z-order command string for `layer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Number(f64),
    Text(String),
}

impl KeyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            KeyValue::Number(n) => Some(*n),
            KeyValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyValue::Number(_) => None,
            KeyValue::Text(s) => Some(s),
        }
    }
}

/// A (offset, value) pair along a track's driver range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub id: TrackId,
    /// Position along the driver range, in `[0,1]`.
    pub offset: f64,
    pub value: KeyValue,
}

impl Keyframe {
    pub fn number(offset: f64, value: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            offset,
            value: KeyValue::Number(value),
        }
    }

    pub fn text(offset: f64, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            offset,
            value: KeyValue::Text(value.into()),
        }
    }
}

/// An animation track owned by an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub target: TrackTarget,
    #[serde(flatten)]
    pub driver: Driver,
    pub keyframes: Vec<Keyframe>,
    pub enabled: bool,
}

impl Track {
    pub fn new(target: TrackTarget, driver: Driver, keyframes: Vec<Keyframe>) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            driver,
            keyframes,
            enabled: true,
        }
    }
}

/// A z-order command carried by layer keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerCommand {
    Front,
    Back,
    Before(ElementId),
    After(ElementId),
}

impl LayerCommand {
    /// Parse a layer keyframe payload: `front`, `back`, `before:<id>`,
    /// `after:<id>`.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "front" => Some(LayerCommand::Front),
            "back" => Some(LayerCommand::Back),
            _ => {
                if let Some(id) = text.strip_prefix("before:") {
                    return Uuid::parse_str(id).ok().map(LayerCommand::Before);
                }
                if let Some(id) = text.strip_prefix("after:") {
                    return Uuid::parse_str(id).ok().map(LayerCommand::After);
                }
                None
            }
        }
    }
}

/// A sampled track output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampledValue {
    Number(f64),
    Color(Rgba),
    Layer(LayerCommand),
}

/// Compute the raw driver value in `[0,1]` for a track.
pub fn driver_value(driver: &Driver, clock_ms: f64, spectrum: &[u8]) -> f64 {
    match driver {
        Driver::Time { duration_ms } => {
            if *duration_ms <= 0.0 || !duration_ms.is_finite() {
                return 0.0;
            }
            (clock_ms.rem_euclid(*duration_ms)) / duration_ms
        }
        Driver::Audio { frequency_range } => band_level(spectrum, *frequency_range),
    }
}

/// Sample a track at driver value `t`.
///
/// Numeric targets interpolate piecewise-linearly and clamp outside the
/// keyframe span; color interpolates per RGB channel between hex values and
/// falls back to a step function otherwise; layer is a step function over
/// midpoint thresholds.
pub fn sample_track(track: &Track, t: f64) -> Option<SampledValue> {
    if track.keyframes.is_empty() {
        return None;
    }
    let mut frames: Vec<&Keyframe> = track.keyframes.iter().collect();
    frames.sort_by(|a, b| a.offset.total_cmp(&b.offset));

    match track.target {
        TrackTarget::Layer => {
            let text = step_value(&frames, t).as_text()?;
            LayerCommand::parse(text).map(SampledValue::Layer)
        }
        TrackTarget::Color => sample_color(&frames, t).map(SampledValue::Color),
        _ => sample_number(&frames, t).map(SampledValue::Number),
    }
}

fn sample_number(frames: &[&Keyframe], t: f64) -> Option<f64> {
    let first = frames.first()?;
    let last = frames.last()?;
    if t <= first.offset {
        return first.value.as_number();
    }
    if t >= last.offset {
        return last.value.as_number();
    }
    for pair in frames.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t >= a.offset && t <= b.offset {
            let va = a.value.as_number()?;
            let vb = b.value.as_number()?;
            let span = b.offset - a.offset;
            if span <= f64::EPSILON {
                return Some(vb);
            }
            let frac = (t - a.offset) / span;
            return Some(va + (vb - va) * frac);
        }
    }
    last.value.as_number()
}

fn sample_color(frames: &[&Keyframe], t: f64) -> Option<Rgba> {
    let parse = |kf: &Keyframe| kf.value.as_text().and_then(Rgba::from_hex);

    let first = frames.first()?;
    let last = frames.last()?;
    if t <= first.offset {
        return parse(first);
    }
    if t >= last.offset {
        return parse(last);
    }
    for pair in frames.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t >= a.offset && t <= b.offset {
            return match (parse(a), parse(b)) {
                (Some(ca), Some(cb)) => {
                    let span = b.offset - a.offset;
                    if span <= f64::EPSILON {
                        return Some(cb);
                    }
                    Some(ca.lerp(cb, (t - a.offset) / span))
                }
                // Unparseable endpoints degrade to a step function.
                (ca, _) => ca,
            };
        }
    }
    parse(last)
}

/// Step function over midpoint thresholds between consecutive keyframes.
fn step_value<'a>(frames: &[&'a Keyframe], t: f64) -> &'a KeyValue {
    let mut chosen = frames[0];
    for pair in frames.windows(2) {
        let midpoint = (pair[0].offset + pair[1].offset) / 2.0;
        if t >= midpoint {
            chosen = pair[1];
        }
    }
    &chosen.value
}
