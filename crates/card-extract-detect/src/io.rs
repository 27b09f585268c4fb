//! JSON configuration and report helpers for card extraction.

use card_extract_core::OrientedRect;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{CannyThresholds, CardExtractor, ExtractError, Extraction, ExtractorParams, LayoutKind, ParamsError};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Named parameter preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPreset {
    #[default]
    Tableau,
    Grid,
    Single,
    Column,
}

impl LayoutPreset {
    pub fn params(self) -> ExtractorParams {
        match self {
            LayoutPreset::Tableau => ExtractorParams::tableau(),
            LayoutPreset::Grid => ExtractorParams::dataset_grid(),
            LayoutPreset::Single => ExtractorParams::single_card(),
            LayoutPreset::Column => ExtractorParams::column_card(),
        }
    }
}

impl FromStr for LayoutPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tableau" => Ok(LayoutPreset::Tableau),
            "grid" => Ok(LayoutPreset::Grid),
            "single" => Ok(LayoutPreset::Single),
            "column" => Ok(LayoutPreset::Column),
            other => Err(format!("unknown layout preset '{other}'")),
        }
    }
}

impl fmt::Display for LayoutPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayoutPreset::Tableau => "tableau",
            LayoutPreset::Grid => "grid",
            LayoutPreset::Single => "single",
            LayoutPreset::Column => "column",
        })
    }
}

/// Configuration for a card extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub image_path: String,
    #[serde(default)]
    pub preset: LayoutPreset,
    /// Replaces the preset entirely when present.
    #[serde(default)]
    pub params: Option<ExtractorParams>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub report_path: Option<String>,
}

impl ExtractConfig {
    pub fn new(image_path: impl Into<String>, preset: LayoutPreset) -> Self {
        Self {
            image_path: image_path.into(),
            preset,
            params: None,
            output_dir: None,
            report_path: None,
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Directory icons are written into.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("icons"))
    }

    /// Resolve the output report path; defaults to `report.json` in the
    /// output directory.
    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.output_dir().join("report.json"))
    }

    pub fn build_params(&self) -> ExtractorParams {
        self.params.clone().unwrap_or_else(|| self.preset.params())
    }

    pub fn build_extractor(&self) -> Result<CardExtractor, ParamsError> {
        CardExtractor::new(self.build_params())
    }
}

/// Per-slot entry of a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotReport {
    pub slot: String,
    pub centroid: [f32; 2],
    pub rect: OrientedRect,
    pub rotated: bool,
    #[serde(default)]
    pub icon_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractReport {
    pub image_path: String,
    pub layout: LayoutKind,
    pub regions: usize,
    #[serde(default)]
    pub contours: Option<usize>,
    #[serde(default)]
    pub thresholds: Option<CannyThresholds>,
    #[serde(default)]
    pub slots: Vec<SlotReport>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExtractReport {
    /// Empty report for an image about to be processed with `params`.
    pub fn new(image_path: impl Into<String>, params: &ExtractorParams) -> Self {
        Self {
            image_path: image_path.into(),
            layout: params.layout,
            regions: params.regions,
            contours: None,
            thresholds: None,
            slots: Vec::new(),
            error: None,
        }
    }

    /// Populate slots from a successful extraction. Icon paths are filled
    /// in by whoever writes the icons.
    pub fn set_extraction(&mut self, extraction: &Extraction) {
        self.contours = Some(extraction.contours);
        self.thresholds = Some(extraction.thresholds);
        self.slots = extraction
            .slots
            .iter()
            .map(|s| SlotReport {
                slot: s.slot.to_string(),
                centroid: [s.region.centroid.x, s.region.centroid.y],
                rect: s.region.rect,
                rotated: s.region.rotated,
                icon_path: None,
            })
            .collect();
        self.error = None;
    }

    /// Record an extraction error.
    pub fn set_error(&mut self, err: &ExtractError) {
        self.slots.clear();
        self.error = Some(err.to_string());
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_tableau_preset() {
        let cfg: ExtractConfig = serde_json::from_str(r#"{ "image_path": "table.png" }"#).unwrap();
        assert_eq!(cfg.preset, LayoutPreset::Tableau);
        assert_eq!(cfg.build_params(), ExtractorParams::tableau());
        assert_eq!(cfg.output_dir(), PathBuf::from("icons"));
        assert_eq!(cfg.report_path(), PathBuf::from("icons").join("report.json"));
    }

    #[test]
    fn inline_params_override_preset() {
        let cfg: ExtractConfig = serde_json::from_str(
            r#"{ "image_path": "x.png", "preset": "grid", "params": { "regions": 16, "layout": { "kind": "grid", "rows": 2 } } }"#,
        )
        .unwrap();
        let params = cfg.build_params();
        assert_eq!(params.regions, 16);
        assert!(cfg.build_extractor().is_ok());
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let mut cfg = ExtractConfig::new("deck.png", LayoutPreset::Single);
        cfg.output_dir = Some("out".into());
        cfg.write_json(&path).unwrap();
        let back = ExtractConfig::load_json(&path).unwrap();
        assert_eq!(back.preset, LayoutPreset::Single);
        assert_eq!(back.output_dir(), PathBuf::from("out"));
    }

    #[test]
    fn error_report_serializes_message() {
        let mut report = ExtractReport::new("x.png", &ExtractorParams::tableau());
        report.set_error(&ExtractError::InsufficientRegions { found: 3, required: 8 });
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("found 3 candidate regions"));
        assert!(!report.is_success());
    }

    #[test]
    fn preset_names_parse() {
        for preset in [
            LayoutPreset::Tableau,
            LayoutPreset::Grid,
            LayoutPreset::Single,
            LayoutPreset::Column,
        ] {
            assert_eq!(preset.to_string().parse::<LayoutPreset>(), Ok(preset));
        }
        assert!("poker".parse::<LayoutPreset>().is_err());
    }
}
