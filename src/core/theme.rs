use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::errors::{Error, Result};

/// Key the theme preference is stored under in the settings file.
pub const THEME_STORAGE_KEY: &str = "markdown-explorer-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }

    /// Resolves `Auto` against the client's colour-scheme preference.
    pub fn effective(self, prefers_dark: bool) -> Theme {
        match self {
            Theme::Auto if prefers_dark => Theme::Dark,
            Theme::Auto => Theme::Light,
            other => other,
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light | Theme::Auto => Theme::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "auto" => Ok(Theme::Auto),
            other => Err(Error::Other(format!("unknown theme '{other}'"))),
        }
    }
}

/// Persisted light/dark preference.
///
/// Read once when opened and written on every change. Only `light` and `dark`
/// are accepted from disk; anything else falls back to `light`. Other keys in
/// the settings file are preserved.
#[derive(Debug)]
pub struct ThemeStore {
    path: Option<PathBuf>,
    current: Theme,
}

impl ThemeStore {
    pub fn open(path: Option<PathBuf>) -> Self {
        let current = path
            .as_deref()
            .and_then(|p| match read_stored_theme(p) {
                Ok(theme) => theme,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable theme settings {}: {}", p.display(), e);
                    None
                }
            })
            .unwrap_or_default();
        Self { path, current }
    }

    pub fn in_memory() -> Self {
        Self::open(None)
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn set(&mut self, theme: Theme) -> Result<()> {
        self.current = theme;
        if let Some(path) = &self.path {
            write_stored_theme(path, theme)?;
        }
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<Theme> {
        let next = self.current.toggled();
        self.set(next)?;
        Ok(next)
    }
}

fn read_settings(path: &Path) -> Result<Map<String, Value>> {
    match fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(Map::new()),
        Ok(raw) => match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
        Err(e) => Err(e.into()),
    }
}

fn read_stored_theme(path: &Path) -> Result<Option<Theme>> {
    let settings = read_settings(path)?;
    Ok(match settings.get(THEME_STORAGE_KEY).and_then(Value::as_str) {
        Some("light") => Some(Theme::Light),
        Some("dark") => Some(Theme::Dark),
        _ => None,
    })
}

fn write_stored_theme(path: &Path, theme: Theme) -> Result<()> {
    let mut settings = read_settings(path).unwrap_or_default();
    settings.insert(
        THEME_STORAGE_KEY.to_string(),
        Value::String(theme.as_str().to_string()),
    );
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&Value::Object(settings))?)?;
    Ok(())
}
