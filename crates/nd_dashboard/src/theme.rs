use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use nd_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Icon of the toggle control, which offers the other theme.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Dark => "bi-sun",
            Self::Light => "bi-moon-stars",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dark => "浅色模式",
            Self::Light => "深色模式",
        }
    }
}

#[async_trait]
pub trait ThemeStore: Send + Sync {
    async fn load(&self) -> Result<Option<Theme>>;
    async fn save(&self, theme: Theme) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ThemeFile {
    theme: Theme,
}

/// Theme preference kept as a small JSON file.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/nd/theme.json`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("nd").join("theme.json"))
            .ok_or_else(|| Error::External(anyhow::anyhow!("No config directory available")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ThemeStore for FileThemeStore {
    async fn load(&self) -> Result<Option<Theme>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: ThemeFile = serde_json::from_str(&raw)?;
        Ok(Some(file.theme))
    }

    async fn save(&self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string(&ThemeFile { theme })?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    value: RwLock<Option<Theme>>,
}

impl MemoryThemeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThemeStore for MemoryThemeStore {
    async fn load(&self) -> Result<Option<Theme>> {
        Ok(*self.value.read().await)
    }

    async fn save(&self, theme: Theme) -> Result<()> {
        *self.value.write().await = Some(theme);
        Ok(())
    }
}

/// Current theme plus where it is persisted.
pub struct ThemeToggle {
    theme: Theme,
    store: Arc<dyn ThemeStore>,
}

impl ThemeToggle {
    /// Read the stored preference. Missing or unreadable values mean dark.
    pub async fn load(store: Arc<dyn ThemeStore>) -> Self {
        let theme = match store.load().await {
            Ok(Some(theme)) => theme,
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Ignoring stored theme: {}", e);
                Theme::default()
            }
        };
        Self { theme, store }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub async fn toggle(&mut self) -> Result<Theme> {
        let next = self.theme.toggled();
        self.store.save(next).await?;
        self.theme = next;
        info!("🎨 Theme switched to {}", next.as_str());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_theme_toggle;

    #[tokio::test]
    async fn test_default_dark_then_toggle_persists_light() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("theme.json");
        let store: Arc<dyn ThemeStore> = Arc::new(FileThemeStore::new(&path));

        let mut toggle = ThemeToggle::load(store.clone()).await;
        assert_eq!(toggle.theme(), Theme::Dark);
        let html = render_theme_toggle(toggle.theme());
        assert!(html.contains("bi-sun"));
        assert!(html.contains("浅色模式"));

        assert_eq!(toggle.toggle().await.unwrap(), Theme::Light);
        assert_eq!(store.load().await.unwrap(), Some(Theme::Light));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"theme":"light"}"#);
        let html = render_theme_toggle(toggle.theme());
        assert!(html.contains("bi-moon-stars"));
        assert!(html.contains("深色模式"));

        let reloaded = ThemeToggle::load(store).await;
        assert_eq!(reloaded.theme(), Theme::Light);
    }

    #[tokio::test]
    async fn test_unknown_stored_value_falls_back_to_dark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        std::fs::write(&path, r#"{"theme":"solarized"}"#).unwrap();
        let toggle = ThemeToggle::load(Arc::new(FileThemeStore::new(&path))).await;
        assert_eq!(toggle.theme(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = Arc::new(MemoryThemeStore::new());
        let mut toggle = ThemeToggle::load(store.clone()).await;
        toggle.toggle().await.unwrap();
        toggle.toggle().await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(Theme::Dark));
    }
}
