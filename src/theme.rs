//! # Theme Module
//!
//! Light/dark preference, persisted as a single string key so the choice
//! survives restarts. Defaults to light when nothing (or garbage) is stored.

use std::sync::Arc;

use crate::error::Result;
use crate::storage::KeyValueStore;

/// Storage key holding the theme preference
pub const THEME_KEY: &str = "fieldwork.theme";

/// The user's theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    /// Light palette (the default)
    #[default]
    Light,
    /// Dark palette
    Dark,
}

impl ThemePreference {
    /// Convert to the persisted string
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// Parse from the persisted string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            _ => None,
        }
    }

    /// The other preference
    pub fn toggled(&self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }
}

/// Theme persistence over the key-value store
pub struct ThemeService {
    store: Arc<dyn KeyValueStore>,
}

impl ThemeService {
    /// Create the service over a store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the stored preference; absent or unparseable values read as light.
    pub async fn load(&self) -> Result<ThemePreference> {
        let stored = self.store.get(THEME_KEY).await?;
        Ok(stored
            .as_deref()
            .and_then(ThemePreference::parse)
            .unwrap_or_default())
    }

    /// Persist a preference
    pub async fn set(&self, preference: ThemePreference) -> Result<()> {
        self.store.set(THEME_KEY, preference.as_str()).await?;
        tracing::debug!(theme = preference.as_str(), "Theme preference saved");
        Ok(())
    }

    /// Flip the stored preference and return the new value
    pub async fn toggle(&self) -> Result<ThemePreference> {
        let next = self.load().await?.toggled();
        self.set(next).await?;
        Ok(next)
    }
}

// ============================================================================
// TESTS
// ============================================================================
