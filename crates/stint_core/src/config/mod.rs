use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "STINT_CONFIG_PATH";
const EDITOR_ENV_VAR: &str = "EDITOR";
const FALLBACK_EDITOR: &str = "vi";

/// ANSI colors for task listings: active work is highlighted, paused work
/// flagged. The `plain` theme leaves every code empty.
#[derive(Debug, Clone)]
pub struct Palette {
    pub current: &'static str,
    pub in_progress: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn paint_current(&self, text: &str) -> String {
        paint(self.current, self.reset, text)
    }

    pub fn paint_in_progress(&self, text: &str) -> String {
        paint(self.in_progress, self.reset, text)
    }
}

fn paint(code: &str, reset: &str, text: &str) -> String {
    if code.is_empty() {
        text.to_string()
    } else {
        format!("{code}{text}{reset}")
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.map(|name| name.trim().to_ascii_lowercase()).as_deref() {
        Some("plain") => Palette {
            current: "",
            in_progress: "",
            reset: "",
        },
        _ => Palette {
            current: "\x1b[32m",
            in_progress: "\x1b[33m",
            reset: "\x1b[0m",
        },
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub editor: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("stint").join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("stint")
            .join(CONFIG_FILE_NAME))
    }
}

/// Loads the config, falling back to defaults when the file is missing or
/// unreadable; a load error is reported alongside the defaults instead of
/// aborting the command.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

/// Editor used by `edit`: config value, then `$EDITOR`, then `vi`.
pub fn resolve_editor(config: &Config) -> String {
    if let Some(editor) = config.editor.as_deref()
        && !editor.trim().is_empty()
    {
        return editor.to_string();
    }

    match std::env::var(EDITOR_ENV_VAR) {
        Ok(editor) if !editor.trim().is_empty() => editor,
        _ => FALLBACK_EDITOR.to_string(),
    }
}
