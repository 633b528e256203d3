//! Flat key/value preset serialization.

use alloc::string::String;

use serde::{Deserialize, Serialize};

/// Flat parameter snapshot. Every field is optional so presets with missing
/// keys leave the current engine state untouched; unknown keys in incoming
/// JSON are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damping: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispersion: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sympathetic_coupling: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_preset: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetError {
    Malformed,
}

impl core::fmt::Display for PresetError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PresetError::Malformed => write!(f, "malformed preset data"),
        }
    }
}

impl Preset {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        serde_json::from_str(json).map_err(|_| PresetError::Malformed)
    }
}
