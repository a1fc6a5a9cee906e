use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Two-valued visual theme, persisted across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Color set for one theme. All components are linear 0..1 RGBA.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: [f32; 4],
    pub text: [f32; 4],
    pub muted_text: [f32; 4],
    pub success: [f32; 4],
    pub danger: [f32; 4],
    /// Base RGB for the wave lines; alpha is supplied per line
    pub wave: [f32; 3],
    pub panel: [f32; 4],
    pub button: [f32; 4],
    pub button_hover: [f32; 4],
    pub button_disabled: [f32; 4],
    pub button_text: [f32; 4],
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            background: [0.96, 0.95, 0.93, 1.0],
            text: [0.08, 0.08, 0.08, 1.0],
            muted_text: [0.40, 0.40, 0.40, 1.0],
            success: [0.13, 0.55, 0.27, 1.0],
            danger: [0.78, 0.12, 0.10, 1.0],
            wave: [0.0, 0.0, 0.0],
            panel: [1.0, 1.0, 1.0, 0.92],
            button: [0.10, 0.10, 0.10, 1.0],
            button_hover: [0.25, 0.25, 0.25, 1.0],
            button_disabled: [0.10, 0.10, 0.10, 0.35],
            button_text: [0.97, 0.97, 0.97, 1.0],
        },
        Theme::Dark => Palette {
            background: [0.09, 0.09, 0.10, 1.0],
            text: [0.92, 0.92, 0.90, 1.0],
            muted_text: [0.62, 0.62, 0.62, 1.0],
            success: [0.24, 0.78, 0.42, 1.0],
            danger: [1.0, 0.32, 0.28, 1.0],
            wave: [1.0, 1.0, 1.0],
            panel: [0.14, 0.14, 0.16, 0.94],
            button: [0.88, 0.88, 0.86, 1.0],
            button_hover: [0.75, 0.75, 0.73, 1.0],
            button_disabled: [0.88, 0.88, 0.86, 0.35],
            button_text: [0.08, 0.08, 0.08, 1.0],
        },
    }
}

fn state_file_in(base: &Path) -> PathBuf {
    base.join("undertone").join("theme")
}

/// Read a previously stored preference from the given config directory.
pub fn load_preference_from(base: &Path) -> Option<Theme> {
    let contents = std::fs::read_to_string(state_file_in(base)).ok()?;
    Theme::parse(&contents)
}

/// Persist the preference under the given config directory.
pub fn store_preference_in(base: &Path, theme: Theme) -> Result<()> {
    let path = state_file_in(base);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    std::fs::write(&path, theme.as_str())
        .with_context(|| format!("Failed to write theme preference to {:?}", path))?;
    Ok(())
}

pub fn store_preference(theme: Theme) -> Result<()> {
    let base = dirs::config_dir().context("No config directory available")?;
    store_preference_in(&base, theme)
}

/// Initial theme: stored preference first, system dark-mode preference
/// when nothing was stored.
pub fn resolve_initial() -> Theme {
    if let Some(stored) = dirs::config_dir().and_then(|base| load_preference_from(&base)) {
        return stored;
    }
    if detect_system_dark_mode() {
        Theme::Dark
    } else {
        Theme::Light
    }
}

fn detect_system_dark_mode() -> bool {
    std::process::Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).contains("dark"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        store_preference_in(dir.path(), Theme::Dark).unwrap();
        assert_eq!(load_preference_from(dir.path()), Some(Theme::Dark));

        store_preference_in(dir.path(), Theme::Light).unwrap();
        assert_eq!(load_preference_from(dir.path()), Some(Theme::Light));
    }

    #[test]
    fn missing_preference_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_preference_from(dir.path()), None);
    }

    #[test]
    fn garbage_preference_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("undertone");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("theme"), "solarized").unwrap();
        assert_eq!(load_preference_from(dir.path()), None);
    }

    #[test]
    fn toggle_flips_both_ways() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
