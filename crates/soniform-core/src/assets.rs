//! Asset import: raster images, vector markup, and fonts.
//!
//! Imported bytes are embedded as data URLs so the project file stays
//! self-contained. Vector markup is sanitized before it enters the scene.

use crate::element::{Element, ElementKind, ViewBox};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Largest width/height an imported image element may take, in canvas
/// units.
pub const IMAGE_MAX_DIMENSION: f64 = 360.0;

/// Upper bound on a single imported file.
pub const MAX_ASSET_BYTES: usize = 10 * 1024 * 1024;

/// Asset import errors.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unsupported asset: {0}")]
    UnsupportedAsset(String),
    #[error("malformed asset: {0}")]
    MalformedInput(String),
}

pub type AssetResult<T> = Result<T, AssetError>;

/// A decoded raster file handed over by the host.
#[derive(Debug, Clone)]
pub struct RasterAsset {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub natural_width: f64,
    pub natural_height: f64,
}

/// An imported font record. `source` is a data URL usable as an
/// `@font-face` src.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub id: Uuid,
    pub name: String,
    pub family: String,
    pub source: String,
}

/// Build an image element from a decoded raster file, centred on the
/// canvas. The element is scaled down so its largest dimension is at most
/// [`IMAGE_MAX_DIMENSION`]; small images keep their natural size.
pub fn import_image(asset: &RasterAsset) -> AssetResult<Element> {
    if !asset.mime.starts_with("image/") || asset.mime == "image/svg+xml" {
        return Err(AssetError::UnsupportedAsset(asset.mime.clone()));
    }
    if asset.bytes.len() > MAX_ASSET_BYTES {
        return Err(AssetError::UnsupportedAsset(format!(
            "file too large ({} bytes)",
            asset.bytes.len()
        )));
    }
    if !(asset.natural_width.is_finite() && asset.natural_width > 0.0)
        || !(asset.natural_height.is_finite() && asset.natural_height > 0.0)
    {
        return Err(AssetError::MalformedInput(
            "image has no usable dimensions".into(),
        ));
    }

    let largest = asset.natural_width.max(asset.natural_height);
    let scale = (IMAGE_MAX_DIMENSION / largest).min(1.0);
    let href = format!(
        "data:{};base64,{}",
        asset.mime,
        BASE64.encode(&asset.bytes)
    );

    Ok(Element::new(
        ElementKind::Image {
            href,
            natural_width: asset.natural_width,
            natural_height: asset.natural_height,
        },
        0.5,
        0.5,
        asset.natural_width * scale,
        asset.natural_height * scale,
    ))
}

/// Import a batch of raster files; failures are logged and skipped.
pub fn import_images(assets: &[RasterAsset]) -> Vec<Element> {
    assets
        .iter()
        .filter_map(|asset| match import_image(asset) {
            Ok(element) => Some(element),
            Err(err) => {
                warn!("skipping raster import: {err}");
                None
            }
        })
        .collect()
}

/// Build a vector element from SVG markup, centred on the canvas and
/// sized from its view box (clamped like raster imports).
pub fn import_vector(markup: &str) -> AssetResult<Element> {
    let (inner, view_box) = sanitize_svg(markup)?;
    let largest = view_box.width.max(view_box.height);
    let scale = if largest > 0.0 {
        (IMAGE_MAX_DIMENSION / largest).min(1.0)
    } else {
        1.0
    };
    Ok(Element::new(
        ElementKind::Vector {
            markup: inner,
            view_box,
        },
        0.5,
        0.5,
        view_box.width * scale,
        view_box.height * scale,
    ))
}

/// Wrap font bytes into a [`Font`] record with a data-URL source.
pub fn import_font(name: &str, family: &str, bytes: &[u8], mime: &str) -> AssetResult<Font> {
    if !mime.starts_with("font/") && mime != "application/font-woff" {
        return Err(AssetError::UnsupportedAsset(mime.to_string()));
    }
    if bytes.len() > MAX_ASSET_BYTES {
        return Err(AssetError::UnsupportedAsset(format!(
            "file too large ({} bytes)",
            bytes.len()
        )));
    }
    Ok(Font {
        id: Uuid::new_v4(),
        name: name.to_string(),
        family: family.to_string(),
        source: format!("data:{};base64,{}", mime, BASE64.encode(bytes)),
    })
}

/// Extract an SVG root's inner markup and view box, with scripts, style
/// blocks, event-handler attributes, and external references removed.
pub fn sanitize_svg(markup: &str) -> AssetResult<(String, ViewBox)> {
    let lower = markup.to_ascii_lowercase();
    let open = lower
        .find("<svg")
        .ok_or_else(|| AssetError::MalformedInput("no <svg> root".into()))?;
    let open_end = lower[open..]
        .find('>')
        .map(|i| open + i)
        .ok_or_else(|| AssetError::MalformedInput("unterminated <svg> tag".into()))?;
    let close = lower
        .rfind("</svg")
        .filter(|&i| i > open_end)
        .ok_or_else(|| AssetError::MalformedInput("missing </svg>".into()))?;

    let root_attrs = &markup[open + 4..open_end];
    let view_box = parse_view_box(root_attrs)
        .ok_or_else(|| AssetError::MalformedInput("missing or invalid viewBox".into()))?;

    let mut inner = markup[open_end + 1..close].to_string();
    inner = remove_blocks(&inner, "script");
    inner = remove_blocks(&inner, "style");
    inner = strip_attributes(&inner, |name, value| {
        let name = name.to_ascii_lowercase();
        if name.starts_with("on") {
            return true;
        }
        if name == "href" || name == "xlink:href" {
            let value = value.trim_start();
            return value.starts_with("http:")
                || value.starts_with("https:")
                || value.starts_with("//");
        }
        false
    });
    Ok((inner.trim().to_string(), view_box))
}

fn parse_view_box(attrs: &str) -> Option<ViewBox> {
    let lower = attrs.to_ascii_lowercase();
    let at = lower.find("viewbox")?;
    let rest = &attrs[at + "viewbox".len()..];
    let eq = rest.find('=')?;
    let rest = rest[eq + 1..].trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let end = rest[1..].find(quote)?;
    let value = &rest[1..1 + end];

    let mut numbers = value
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>);
    let min_x = numbers.next()?.ok()?;
    let min_y = numbers.next()?.ok()?;
    let width = numbers.next()?.ok()?;
    let height = numbers.next()?.ok()?;
    if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
        return None;
    }
    Some(ViewBox {
        min_x,
        min_y,
        width,
        height,
    })
}

/// Remove every `<tag ...>...</tag>` block, case-insensitively.
fn remove_blocks(markup: &str, tag: &str) -> String {
    let open_pat = format!("<{tag}");
    let close_pat = format!("</{tag}");
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    loop {
        let lower = rest.to_ascii_lowercase();
        let Some(start) = lower.find(&open_pat) else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..start]);
        match lower[start..].find(&close_pat) {
            Some(offset) => {
                let after = start + offset;
                let end = lower[after..].find('>').map(|i| after + i + 1);
                match end {
                    Some(end) => rest = &rest[end..],
                    None => return out,
                }
            }
            // Unterminated block: drop the remainder.
            None => return out,
        }
    }
}

/// Remove attributes the predicate rejects, preserving everything else.
///
/// Scans bytes but copies whole spans of the input, so multibyte text
/// content passes through untouched. All structural characters are ASCII
/// and cannot occur inside a UTF-8 continuation sequence, so every span
/// boundary falls on a character boundary.
fn strip_attributes(markup: &str, drop: impl Fn(&str, &str) -> bool) -> String {
    let bytes = markup.as_bytes();
    let mut out = String::with_capacity(markup.len());
    // Everything before this offset is already flushed to `out`.
    let mut copied = 0;
    let mut i = 0;
    let mut in_tag = false;
    while i < bytes.len() {
        let b = bytes[i];
        if !in_tag {
            if b == b'<' {
                in_tag = true;
            }
            i += 1;
            continue;
        }
        if b == b'>' {
            in_tag = false;
            i += 1;
            continue;
        }
        if !b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Possible attribute boundary: whitespace, name, optional value.
        let start = i;
        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let name_start = j;
        while j < bytes.len()
            && (bytes[j].is_ascii_alphanumeric() || matches!(bytes[j], b'-' | b'_' | b':'))
        {
            j += 1;
        }
        if j == name_start {
            i = j;
            continue;
        }
        let name = &markup[name_start..j];

        let mut k = j;
        while k < bytes.len() && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k < bytes.len() && bytes[k] == b'=' {
            k += 1;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < bytes.len() && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let quote = bytes[k];
                k += 1;
                let value_start = k;
                while k < bytes.len() && bytes[k] != quote {
                    k += 1;
                }
                let value = &markup[value_start..k];
                if k < bytes.len() {
                    k += 1;
                }
                if drop(name, value) {
                    out.push_str(&markup[copied..start]);
                    copied = k;
                }
                i = k;
                continue;
            }
        }
        // Valueless attribute.
        if drop(name, "") {
            out.push_str(&markup[copied..start]);
            copied = j;
        }
        i = j;
    }
    out.push_str(&markup[copied..]);
    out
}
