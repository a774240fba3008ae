use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::window::{WindowDesc, WindowFlags};
use crate::PlatformError;

/// What happens to queued events nobody consumed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventRetention {
    /// Keep events until the application consumes them. Replay-only consumers make the
    /// queue grow without bound.
    #[default]
    Retain,
    /// Empty the queue at the start of every frame.
    ClearEachFrame,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub retention: EventRetention,
    /// Warn once when more than this many events are retained.
    pub warn_threshold: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Number of frame deltas kept for averages.
    pub history: usize,
    /// Seconds per frame, overriding the wall clock.
    pub fixed_delta: Option<f32>,
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), PlatformError> {
        match self.fixed_delta {
            Some(secs) if !secs.is_finite() || secs < 0. => Err(PlatformError::ConfigValue {
                key: "timing.fixed_delta",
                value: secs.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            history: 60,
            fixed_delta: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json_file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub fullscreen: bool,
    pub visible: bool,
    pub samples: u32,
    pub monitor: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        let desc = WindowDesc::default();
        Self {
            title: desc.title.into_owned(),
            width: desc.width,
            height: desc.height,
            resizable: true,
            fullscreen: false,
            visible: true,
            samples: desc.num_samples,
            monitor: desc.monitor_index,
        }
    }
}

impl WindowConfig {
    pub fn desc(&self) -> WindowDesc {
        let mut flags = WindowFlags::empty();
        flags.set(WindowFlags::NO_RESIZE, !self.resizable);
        flags.set(WindowFlags::FULLSCREEN, self.fullscreen);
        flags.set(WindowFlags::INVISIBLE, !self.visible);
        WindowDesc {
            title: self.title.clone().into(),
            width: self.width,
            height: self.height,
            flags,
            num_samples: self.samples,
            monitor_index: self.monitor,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub events: EventConfig,
    pub timing: TimingConfig,
    pub log: LogConfig,
    pub window: WindowConfig,
}

impl PlatformConfig {
    pub fn from_toml(input: &str) -> Result<Self, PlatformError> {
        let config: Self = toml::from_str(input)?;
        config.timing.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PlatformError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| PlatformError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }
}
