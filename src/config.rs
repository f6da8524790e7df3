//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treediag/treediag.toml`
//! 3. Local config: `<dir>/.treediag.toml` (`--config-dir` or the working directory)
//! 4. Environment variables: `TREEDIAG_*` prefix, `__` between section and key

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES};

/// Graphviz renderer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Graphviz executable (default: `dot` on PATH)
    pub program: String,
    /// Output format passed as `-T<format>`
    pub format: String,
    pub dpi: u32,
    /// Seconds before a hung renderer is killed
    pub timeout_secs: u64,
    /// Node font name
    pub font: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: "dot".into(),
            format: "png".into(),
            dpi: 300,
            timeout_secs: 30,
            font: "Arial Bold".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Deepest tree accepted by decoding and layout
    pub max_depth: usize,
    /// Largest diagram, in layout nodes, handed to the renderer
    pub max_nodes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Image viewer command; the platform opener when unset
    pub command: Option<String>,
}

/// Raw render config for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderConfig {
    pub program: Option<String>,
    pub format: Option<String>,
    pub dpi: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub font: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutConfig {
    pub max_depth: Option<usize>,
    pub max_nodes: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawViewerConfig {
    pub command: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub render: RawRenderConfig,
    pub layout: RawLayoutConfig,
    pub viewer: RawViewerConfig,
}

impl RenderConfig {
    fn merge(&self, overlay: &RawRenderConfig) -> Self {
        Self {
            program: overlay
                .program
                .clone()
                .unwrap_or_else(|| self.program.clone()),
            format: overlay
                .format
                .clone()
                .unwrap_or_else(|| self.format.clone()),
            dpi: overlay.dpi.unwrap_or(self.dpi),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            font: overlay.font.clone().unwrap_or_else(|| self.font.clone()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Unified configuration for treediag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub render: RenderConfig,
    pub layout: LayoutConfig,
    pub viewer: ViewerConfig,
}

/// Get the XDG config directory for treediag.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treediag").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treediag.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".treediag.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is returned unchanged.
pub fn expand_env_vars(input: &str) -> String {
    shellexpand::full(input)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in command fields.
    fn expand_paths(&mut self) {
        self.render.program = expand_env_vars(&self.render.program);
        if let Some(command) = &self.viewer.command {
            self.viewer.command = Some(expand_env_vars(command));
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            render: self.render.merge(&overlay.render),
            layout: LayoutConfig {
                max_depth: overlay.layout.max_depth.unwrap_or(self.layout.max_depth),
                max_nodes: overlay.layout.max_nodes.unwrap_or(self.layout.max_nodes),
            },
            viewer: ViewerConfig {
                command: overlay
                    .viewer
                    .command
                    .clone()
                    .or_else(|| self.viewer.command.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory searched for `.treediag.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local_dir)
    }

    /// Load settings from an explicit global config path.
    ///
    /// Missing files are skipped; unreadable or malformed files are errors.
    pub fn load_from(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!("Loading global config: {}", global_path.display());
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("Loading local config: {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply TREEDIAG_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("TREEDIAG").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("render.program") {
            settings.render.program = val;
        }
        if let Ok(val) = config.get_string("render.format") {
            settings.render.format = val;
        }
        if let Ok(val) = config.get_string("render.font") {
            settings.render.font = val;
        }
        if let Some(val) = get_number(&config, "render.dpi")? {
            settings.render.dpi = val;
        }
        if let Some(val) = get_number(&config, "render.timeout_secs")? {
            settings.render.timeout_secs = val;
        }
        if let Some(val) = get_number(&config, "layout.max_depth")? {
            settings.layout.max_depth = val;
        }
        if let Some(val) = get_number(&config, "layout.max_nodes")? {
            settings.layout.max_nodes = val;
        }
        if let Ok(val) = config.get_string("viewer.command") {
            settings.viewer.command = Some(val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treediag configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treediag/treediag.toml
#   Local:  <dir>/.treediag.toml
#   Env:    TREEDIAG_<SECTION>__<KEY>, e.g. TREEDIAG_RENDER__DPI=150

[render]
# program = "dot"
# format = "png"
# dpi = 300
# timeout_secs = 30
# font = "Arial Bold"

[layout]
# max_depth = 512
# max_nodes = 10000

[viewer]
# command = "feh"
"#
        .to_string()
    }
}

/// Numeric env override; a present but unparsable value is a config error.
fn get_number<T: std::str::FromStr>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get_string(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ApplicationError::Config {
                message: format!("{key}: expected a number, got '{raw}'"),
            }),
        Err(_) => Ok(None),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_match_graphviz_settings() {
        let settings = Settings::default();
        assert_eq!(settings.render.program, "dot");
        assert_eq!(settings.render.format, "png");
        assert_eq!(settings.render.dpi, 300);
        assert_eq!(settings.render.timeout(), Duration::from_secs(30));
        assert_eq!(settings.layout.max_depth, DEFAULT_MAX_DEPTH);
        assert!(settings.viewer.command.is_none());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            render: RawRenderConfig {
                dpi: Some(72),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.render.dpi, 72);
        assert_eq!(merged.render.program, "dot");
        assert_eq!(merged.layout, base.layout);
    }

    #[test]
    fn given_tilde_in_viewer_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            viewer: ViewerConfig {
                command: Some("~/bin/viewer".into()),
            },
            ..Default::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let command = settings.viewer.command.unwrap_or_default();
        assert!(command.starts_with(&home), "viewer should expand: {command}");
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.render.program.is_none());
    }
}
