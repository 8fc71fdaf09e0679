//! User configuration (`config.toml`)
//!
//! Lives at `<config dir>/stackview/config.toml`, or wherever
//! `STACKVIEW_CONFIG` points. Every field has a default, so a missing file
//! or a partial one is fine.

use anyhow::{Context, Result};
use reconcile::TransitionConfig;
use serde::{Deserialize, Serialize};
use stack_core::ViewConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "STACKVIEW_CONFIG";

/// Keys accepted by `config --get/--set`
pub const KEYS: &[&str] = &[
    "animation.enter_ms",
    "animation.exit_ms",
    "animation.flash_ms",
    "animation.stagger_ms",
    "animation.frame_ms",
    "view.commit_chunk",
    "view.show_commits",
    "watch.debounce_ms",
    "watch.poll_interval_secs",
];

/// Transition timings, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enter_ms: u64,
    pub exit_ms: u64,
    pub flash_ms: u64,
    /// Per-row delay when a whole list is cleared
    pub stagger_ms: u64,
    /// Repaint interval while transitions are running
    pub frame_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enter_ms: 300,
            exit_ms: 300,
            flash_ms: 600,
            stagger_ms: 30,
            frame_ms: 33,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Commits revealed per page
    pub commit_chunk: usize,
    pub show_commits: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            commit_chunk: stack_core::DEFAULT_COMMIT_CHUNK,
            show_commits: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Quiet window before a burst of file events triggers a refresh
    pub debounce_ms: u64,
    /// Fallback mtime polling, 0 disables it
    pub poll_interval_secs: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            poll_interval_secs: 5,
        }
    }
}

/// Complete user configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub animation: AnimationConfig,
    pub view: ViewSettings,
    pub watch: WatchSettings,
}

fn check_range(key: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if value < min || value > max {
        anyhow::bail!("{} must be between {} and {} (got {})", key, min, max, value);
    }
    Ok(())
}

impl SystemConfig {
    /// Reject out-of-range values
    pub fn validate(&self) -> Result<()> {
        let a = &self.animation;
        check_range("animation.enter_ms", a.enter_ms, 0, 10_000)?;
        check_range("animation.exit_ms", a.exit_ms, 0, 10_000)?;
        check_range("animation.flash_ms", a.flash_ms, 0, 10_000)?;
        check_range("animation.stagger_ms", a.stagger_ms, 0, 1_000)?;
        check_range("animation.frame_ms", a.frame_ms, 5, 1_000)?;
        check_range("view.commit_chunk", self.view.commit_chunk as u64, 1, 1_000)?;
        check_range("watch.debounce_ms", self.watch.debounce_ms, 0, 10_000)?;
        check_range("watch.poll_interval_secs", self.watch.poll_interval_secs, 0, 3_600)?;
        Ok(())
    }

    /// Transition timings for the keyed list
    pub fn transition_config(&self) -> TransitionConfig {
        TransitionConfig {
            enter: Duration::from_millis(self.animation.enter_ms),
            exit: Duration::from_millis(self.animation.exit_ms),
            flash: Duration::from_millis(self.animation.flash_ms),
            stagger: Duration::from_millis(self.animation.stagger_ms),
        }
    }

    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            commit_chunk: self.view.commit_chunk,
        }
    }

    /// Read a single value by dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "animation.enter_ms" => self.animation.enter_ms.to_string(),
            "animation.exit_ms" => self.animation.exit_ms.to_string(),
            "animation.flash_ms" => self.animation.flash_ms.to_string(),
            "animation.stagger_ms" => self.animation.stagger_ms.to_string(),
            "animation.frame_ms" => self.animation.frame_ms.to_string(),
            "view.commit_chunk" => self.view.commit_chunk.to_string(),
            "view.show_commits" => self.view.show_commits.to_string(),
            "watch.debounce_ms" => self.watch.debounce_ms.to_string(),
            "watch.poll_interval_secs" => self.watch.poll_interval_secs.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {}. Use 'stackview config --list' to see available keys.",
                key
            ),
        };
        Ok(value)
    }

    /// Set a single value by dotted key, then validate
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fn int(value: &str) -> Result<u64> {
            value
                .parse()
                .context("Invalid value: must be a non-negative integer")
        }

        match key {
            "animation.enter_ms" => self.animation.enter_ms = int(value)?,
            "animation.exit_ms" => self.animation.exit_ms = int(value)?,
            "animation.flash_ms" => self.animation.flash_ms = int(value)?,
            "animation.stagger_ms" => self.animation.stagger_ms = int(value)?,
            "animation.frame_ms" => self.animation.frame_ms = int(value)?,
            "view.commit_chunk" => self.view.commit_chunk = int(value)? as usize,
            "view.show_commits" => {
                self.view.show_commits = value
                    .parse()
                    .context("Invalid value: must be 'true' or 'false'")?
            }
            "watch.debounce_ms" => self.watch.debounce_ms = int(value)?,
            "watch.poll_interval_secs" => self.watch.poll_interval_secs = int(value)?,
            _ => anyhow::bail!(
                "Unknown config key: {}. Use 'stackview config --list' to see available keys.",
                key
            ),
        }

        self.validate().context("Invalid configuration value")
    }
}

/// Location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("stackview").join("config.toml"))
}

/// Load the configuration, falling back to defaults when there is no file
pub fn load() -> Result<SystemConfig> {
    let Some(path) = config_file_path() else {
        tracing::debug!("no config directory, using defaults");
        return Ok(SystemConfig::default());
    };
    if !path.exists() {
        return Ok(SystemConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    Ok(config)
}

/// Write the configuration to disk
pub fn save(config: &SystemConfig) -> Result<()> {
    let path = config_file_path().context("Could not determine config file path")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write the default configuration if no file exists yet
pub fn init_if_missing() -> Result<()> {
    let path = config_file_path().context("Could not determine config file path")?;
    if !path.exists() {
        save(&SystemConfig::default())?;
    }
    Ok(())
}

/// Annotated example file
pub fn example_config() -> &'static str {
    r#"# stackview configuration

[animation]
# Length of the entrance highlight for new rows
enter_ms = 300
# Time a removed row stays visible while leaving
exit_ms = 300
# How long a changed row stays highlighted
flash_ms = 600
# Extra delay per row when the whole list is cleared
stagger_ms = 30
# Repaint interval while transitions are running
frame_ms = 33

[view]
# Commits revealed per page
commit_chunk = 5
show_commits = true

[watch]
# Quiet window before file events trigger a refresh
debounce_ms = 100
# Fallback polling interval, 0 disables polling
poll_interval_secs = 5
"#
}
