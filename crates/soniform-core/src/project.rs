//! Project file serialization.

use crate::assets::Font;
use crate::element::Element;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current project file format version.
pub const PROJECT_VERSION: &str = "1.0";

/// Project file errors.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("malformed project file: {0}")]
    MalformedInput(#[from] serde_json::Error),
}

pub type ProjectResult<T> = Result<T, ProjectError>;

/// The persisted document: scene content plus imported font records.
///
/// Serialization is lossless and ids round-trip verbatim; import never
/// regenerates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fonts: Vec<Font>,
    pub version: String,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            fonts: Vec::new(),
            version: PROJECT_VERSION.to_string(),
        }
    }

    /// Capture the committed scene content under a project name.
    pub fn from_scene(name: impl Into<String>, scene: &Scene) -> Self {
        Self {
            name: name.into(),
            elements: scene.elements.clone(),
            fonts: Vec::new(),
            version: PROJECT_VERSION.to_string(),
        }
    }

    /// Rebuild a scene at the given canvas size from the project's
    /// elements, preserving ids and z order.
    pub fn into_scene(self, width: f64, height: f64) -> Scene {
        let mut scene = Scene::new(width, height);
        scene.elements = self.elements;
        scene
    }

    pub fn to_json(&self) -> ProjectResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> ProjectResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
