use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use boucle_sync::{DEFAULT_BLINK_PERIOD, DEFAULT_PROGRESS_PERIOD};

use crate::palette::PadPalette;
use crate::MidiError;

/// Persisted pad controller settings stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PadSettings {
    /// Input port index of the controller.
    pub input_port: Option<usize>,
    /// Output port index used for pad feedback.
    pub output_port: Option<usize>,
    /// Channel for outbound frames (0-15).
    pub channel: u8,
    /// Velocity per clip state.
    pub palette: PadPalette,
    pub blink_period_ms: u64,
    pub progress_period_ms: u64,
}

impl Default for PadSettings {
    fn default() -> Self {
        Self {
            input_port: None,
            output_port: None,
            channel: 0,
            palette: PadPalette::default(),
            blink_period_ms: DEFAULT_BLINK_PERIOD.as_millis() as u64,
            progress_period_ms: DEFAULT_PROGRESS_PERIOD.as_millis() as u64,
        }
    }
}

impl PadSettings {
    pub fn blink_period(&self) -> Duration {
        Duration::from_millis(self.blink_period_ms)
    }

    pub fn progress_period(&self) -> Duration {
        Duration::from_millis(self.progress_period_ms)
    }

    pub fn validate(&self) -> Result<(), MidiError> {
        if self.channel > 0x0F {
            return Err(MidiError::InvalidChannel(self.channel));
        }
        self.palette.validate()
    }
}

fn settings_path() -> Option<PathBuf> {
    let mut base = dirs::config_dir()?;
    base.push("Boucle");
    if !base.exists() {
        let _ = fs::create_dir_all(&base);
    }
    base.push("pad.json");
    Some(base)
}

/// Load settings from disk. Returns defaults if loading fails.
pub fn load() -> PadSettings {
    let Some(path) = settings_path() else {
        return PadSettings::default();
    };
    match load_from(&path) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::debug!(?err, "using default pad settings");
            PadSettings::default()
        }
    }
}

/// Save settings to disk.
pub fn save(settings: &PadSettings) {
    let Some(path) = settings_path() else {
        return;
    };
    if let Err(err) = save_to(&path, settings) {
        tracing::warn!(?err, "failed to write pad settings");
    }
}

pub fn load_from(path: &Path) -> anyhow::Result<PadSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let settings: PadSettings = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid settings file", path.display()))?;
    settings.validate()?;
    Ok(settings)
}

pub fn save_to(path: &Path, settings: &PadSettings) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
