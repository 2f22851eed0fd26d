//! Configuration persistence for mat-designer settings

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::{FontFamily, Rgba, TextStyle};

/// Preset mat colors offered by the backing color picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackingColor {
    #[default]
    Black,
    DarkGray,
    Red,
    Blue,
    Beige,
    Brown,
}

impl BackingColor {
    pub const ALL: [BackingColor; 6] = [
        BackingColor::Black,
        BackingColor::DarkGray,
        BackingColor::Red,
        BackingColor::Blue,
        BackingColor::Beige,
        BackingColor::Brown,
    ];

    pub fn rgba(self) -> Rgba {
        match self {
            BackingColor::Black => Rgba::rgb(0x1a, 0x1a, 0x1a),
            BackingColor::DarkGray => Rgba::rgb(0x33, 0x33, 0x33),
            BackingColor::Red => Rgba::rgb(0x8b, 0x00, 0x00),
            BackingColor::Blue => Rgba::rgb(0x00, 0x00, 0x8b),
            BackingColor::Beige => Rgba::rgb(0xd2, 0xb4, 0x8c),
            BackingColor::Brown => Rgba::rgb(0x3d, 0x29, 0x14),
        }
    }
}

/// Designer configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Mat color of a fresh design
    pub backing_color: Rgba,
    /// Style preselected in the text controls
    pub text_style: TextStyle,
    /// Bold font file per family
    pub fonts: BTreeMap<FontFamily, PathBuf>,
    /// Font used for families without their own file
    pub fallback_font: Option<PathBuf>,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            backing_color: BackingColor::Black.rgba(),
            // White 48px Arial
            text_style: TextStyle::default(),
            fonts: BTreeMap::new(),
            fallback_font: None,
        }
    }
}

impl DesignerConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "mat-designer";
    const FILE_NAME: &'static str = "config.json";

    /// Default config file location, if the platform has a config dir
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join(Self::FILE_NAME))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            log::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:#}", err);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::path() else {
            log::error!("Could not determine config directory for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:#}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
    }
}
