//! RuneKit's configuration surface: the knobs from `spec.md` §6, loaded
//! from an optional `rune.toml` file and then overridden by environment
//! variables, the same two-layer shape the teacher's config loader uses
//! (`discover` → `load_from` → apply context), generalized to env
//! overrides instead of viewport re-clamping.

use core_cell::OptimizationMode;
use serde::Deserialize;
use std::path::PathBuf;
use std::{env, fs};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown optimization mode {0:?}, expected full_redraw, line_diff, or automatic")]
    UnknownOptimizationMode(String),
}

fn parse_mode(s: &str) -> Result<OptimizationMode, ConfigError> {
    match s {
        "full_redraw" => Ok(OptimizationMode::FullRedraw),
        "line_diff" => Ok(OptimizationMode::LineDiff),
        "automatic" => Ok(OptimizationMode::Automatic),
        other => Err(ConfigError::UnknownOptimizationMode(other.to_string())),
    }
}

fn parse_bool_flag(s: &str) -> Option<bool> {
    match s {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// The rendering core's configuration, per `spec.md` §6. Every field has
/// the specified default; invalid values clamp rather than fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub optimization_mode: OptimizationMode,
    pub max_lines_for_diff: usize,
    pub min_efficiency_threshold: f64,
    pub max_frame_rate: f64,
    pub write_buffer_size: usize,
    pub hide_cursor_during_render: bool,
    pub disable_autowrap_during_render: bool,
    pub use_alternate_screen: bool,
    pub enable_console_capture: bool,
    /// Set by `RUNE_DEBUG=1`. Consumed by the binary's logging setup to
    /// pick a more verbose `EnvFilter` directive when `RUST_LOG` isn't
    /// already set; the library itself does not branch on it.
    pub debug: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            optimization_mode: OptimizationMode::LineDiff,
            max_lines_for_diff: 1000,
            min_efficiency_threshold: 0.7,
            max_frame_rate: 60.0,
            write_buffer_size: 8192,
            hide_cursor_during_render: true,
            disable_autowrap_during_render: false,
            use_alternate_screen: false,
            enable_console_capture: false,
            debug: false,
        }
    }
}

impl RenderConfig {
    /// Clamp out-of-range values rather than fail, per `spec.md` §7
    /// ("invalid configuration values ... clamp to a minimum of 1.0 fps").
    pub fn clamp(&mut self) {
        if self.max_frame_rate <= 0.0 {
            self.max_frame_rate = 1.0;
        }
    }

    /// Apply `RUNE_RENDER_MODE` / `RUNE_ALT_SCREEN` / `RUNE_CONSOLE_CAPTURE`
    /// / `RUNE_DEBUG` from the process environment, in that order, logging
    /// and ignoring any value it can't parse.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(mode) = env::var("RUNE_RENDER_MODE") {
            match parse_mode(&mode) {
                Ok(m) => self.optimization_mode = m,
                Err(e) => tracing::warn!(error = %e, "ignoring RUNE_RENDER_MODE"),
            }
        }
        if let Ok(v) = env::var("RUNE_ALT_SCREEN") {
            match parse_bool_flag(&v) {
                Some(b) => self.use_alternate_screen = b,
                None => tracing::warn!(value = %v, "ignoring malformed RUNE_ALT_SCREEN"),
            }
        }
        if let Ok(v) = env::var("RUNE_CONSOLE_CAPTURE") {
            match parse_bool_flag(&v) {
                Some(b) => self.enable_console_capture = b,
                None => tracing::warn!(value = %v, "ignoring malformed RUNE_CONSOLE_CAPTURE"),
            }
        }
        if env::var("RUNE_DEBUG").as_deref() == Ok("1") {
            self.debug = true;
        }
        self.clamp();
    }
}

/// The on-disk shape of `rune.toml`: every field optional, unknown fields
/// ignored, so the file can evolve without breaking older configs.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    optimization_mode: Option<String>,
    max_lines_for_diff: Option<usize>,
    min_efficiency_threshold: Option<f64>,
    max_frame_rate: Option<f64>,
    write_buffer_size: Option<usize>,
    hide_cursor_during_render: Option<bool>,
    disable_autowrap_during_render: Option<bool>,
    use_alternate_screen: Option<bool>,
    enable_console_capture: Option<bool>,
}

impl ConfigFile {
    fn apply_to(self, cfg: &mut RenderConfig) {
        if let Some(mode) = self.optimization_mode {
            match parse_mode(&mode) {
                Ok(m) => cfg.optimization_mode = m,
                Err(e) => tracing::warn!(error = %e, "ignoring rune.toml optimization_mode"),
            }
        }
        if let Some(v) = self.max_lines_for_diff {
            cfg.max_lines_for_diff = v;
        }
        if let Some(v) = self.min_efficiency_threshold {
            cfg.min_efficiency_threshold = v;
        }
        if let Some(v) = self.max_frame_rate {
            cfg.max_frame_rate = v;
        }
        if let Some(v) = self.write_buffer_size {
            cfg.write_buffer_size = v;
        }
        if let Some(v) = self.hide_cursor_during_render {
            cfg.hide_cursor_during_render = v;
        }
        if let Some(v) = self.disable_autowrap_during_render {
            cfg.disable_autowrap_during_render = v;
        }
        if let Some(v) = self.use_alternate_screen {
            cfg.use_alternate_screen = v;
        }
        if let Some(v) = self.enable_console_capture {
            cfg.enable_console_capture = v;
        }
    }
}

/// Best-effort config path: prefer `./rune.toml`, then the platform config
/// dir (`$XDG_CONFIG_HOME/runekit/rune.toml` or the platform equivalent).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("rune.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("runekit").join("rune.toml");
    }
    PathBuf::from("rune.toml")
}

/// Load `rune.toml` from `path` (or the discovered default), falling back
/// to defaults on a missing or unparseable file, then apply environment
/// overrides. This is the entry point most callers want.
pub fn load() -> RenderConfig {
    let mut cfg = load_from(None);
    cfg.apply_env_overrides();
    cfg
}

/// Load from an explicit path (or discovery) without applying environment
/// overrides — used by tests that want the file layer in isolation.
pub fn load_from(path: Option<PathBuf>) -> RenderConfig {
    let path = path.unwrap_or_else(discover);
    let mut cfg = RenderConfig::default();
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => file.apply_to(&mut cfg),
            Err(e) => tracing::warn!(error = %e, path = %path.display(), "ignoring unparseable rune.toml"),
        }
    }
    cfg.clamp();
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = RenderConfig::default();
        assert_eq!(cfg.optimization_mode, OptimizationMode::LineDiff);
        assert_eq!(cfg.max_lines_for_diff, 1000);
        assert_eq!(cfg.min_efficiency_threshold, 0.7);
        assert_eq!(cfg.max_frame_rate, 60.0);
        assert_eq!(cfg.write_buffer_size, 8192);
        assert!(cfg.hide_cursor_during_render);
        assert!(!cfg.disable_autowrap_during_render);
        assert!(!cfg.use_alternate_screen);
        assert!(!cfg.enable_console_capture);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_rune_toml__.toml")));
        assert_eq!(cfg, RenderConfig::default());
    }

    #[test]
    fn parses_file_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "optimization_mode = \"automatic\"\nmax_frame_rate = 30.0\nuse_alternate_screen = true\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.optimization_mode, OptimizationMode::Automatic);
        assert_eq!(cfg.max_frame_rate, 30.0);
        assert!(cfg.use_alternate_screen);
    }

    #[test]
    fn invalid_mode_in_file_falls_back_to_default_and_keeps_other_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "optimization_mode = \"bogus\"\nmax_frame_rate = 45.0\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.optimization_mode, OptimizationMode::LineDiff);
        assert_eq!(cfg.max_frame_rate, 45.0);
    }

    #[test]
    fn zero_frame_rate_clamps_to_one() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "max_frame_rate = 0.0\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.max_frame_rate, 1.0);
    }

    #[test]
    fn env_override_alt_screen() {
        // SAFETY (test-only): no other test in this process reads this var concurrently.
        unsafe { env::set_var("RUNE_ALT_SCREEN", "true") };
        let mut cfg = RenderConfig::default();
        cfg.apply_env_overrides();
        unsafe { env::remove_var("RUNE_ALT_SCREEN") };
        assert!(cfg.use_alternate_screen);
    }

    #[test]
    fn parse_mode_rejects_unknown_values() {
        assert_eq!(parse_mode("nonsense"), Err(ConfigError::UnknownOptimizationMode("nonsense".to_string())));
    }
}
