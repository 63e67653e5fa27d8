use std::borrow::Cow;

use anyhow::Context;
use log::warn;

use crate::{config::BookingConfig, preferences::Preferences};

pub struct BookingContext {
    pub config: BookingConfig,
    /// Preferences as loaded at startup; the fallback when the file turns bad.
    pub preferences: Preferences,
}

impl BookingContext {
    pub fn new() -> anyhow::Result<Self> {
        let config = BookingConfig::new()?;
        let preferences = Preferences::load(&config.preferences_path)
            .with_context(|| format!("failed to load {}", config.preferences_path))?;
        Ok(BookingContext {
            config,
            preferences,
        })
    }

    /// Re-reads the preferences file so edits apply without a restart. If it
    /// can no longer be read or parsed, the startup copy is used.
    pub fn current_preferences(&self) -> Cow<'_, Preferences> {
        match Preferences::load(&self.config.preferences_path) {
            Ok(preferences) => Cow::Owned(preferences),
            Err(e) => {
                warn!(
                    "Failed to reload {}, using preferences loaded at startup: {e}",
                    self.config.preferences_path
                );
                Cow::Borrowed(&self.preferences)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BookingEnv;

    #[test]
    fn current_preferences_follow_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(
            &path,
            r#"{"preferences": [{"weekdays": ["monday"], "time": "10:00", "courts": [1]}]}"#,
        )
        .unwrap();
        let env: BookingEnv = envy::from_iter(vec![(
            "PREFERENCES_PATH".to_string(),
            path.display().to_string(),
        )])
        .unwrap();
        let config = BookingConfig::from_env(env).unwrap();
        let context = BookingContext {
            preferences: Preferences::load(&config.preferences_path).unwrap(),
            config,
        };
        assert_eq!(context.current_preferences().len(), 1);

        std::fs::write(
            &path,
            r#"{"preferences": [
                {"weekdays": ["monday", "friday"], "time": "10:00", "courts": [1]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(context.current_preferences().len(), 2);

        std::fs::write(&path, "not json").unwrap();
        let fallback = context.current_preferences();
        assert!(matches!(fallback, Cow::Borrowed(_)));
        assert_eq!(fallback.len(), 1);
    }
}
