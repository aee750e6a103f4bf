use super::store::{KeyValueStore, StoreKey};
use crate::domain::validation::{check_minutes, MAX_MINUTES};
use crate::domain::{ThemeName, ValidationError};
use crate::session::{PhaseDurations, DEFAULT_LONG_BREAK_MINUTES, DEFAULT_SHORT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// User settings stored in settings.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub work: u32,
    pub short_break: u32,
    pub long_break: u32,
    pub theme: ThemeName,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work: DEFAULT_WORK_MINUTES,
            short_break: DEFAULT_SHORT_BREAK_MINUTES,
            long_break: DEFAULT_LONG_BREAK_MINUTES,
            theme: ThemeName::default(),
        }
    }
}

/// Editable rows of the settings view, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    Work,
    ShortBreak,
    LongBreak,
    Theme,
}

impl SettingField {
    pub fn all() -> &'static [SettingField] {
        &[
            SettingField::Work,
            SettingField::ShortBreak,
            SettingField::LongBreak,
            SettingField::Theme,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingField::Work => "Focus minutes",
            SettingField::ShortBreak => "Short break minutes",
            SettingField::LongBreak => "Long break minutes",
            SettingField::Theme => "Theme",
        }
    }

    fn key(&self) -> &'static str {
        match self {
            SettingField::Work => "work",
            SettingField::ShortBreak => "shortBreak",
            SettingField::LongBreak => "longBreak",
            SettingField::Theme => "theme",
        }
    }
}

impl Settings {
    /// Fallback timer durations
    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations {
            work: self.work,
            short_break: self.short_break,
            long_break: self.long_break,
        }
    }

    pub fn minutes(&self, field: SettingField) -> Option<u32> {
        match field {
            SettingField::Work => Some(self.work),
            SettingField::ShortBreak => Some(self.short_break),
            SettingField::LongBreak => Some(self.long_break),
            SettingField::Theme => None,
        }
    }

    /// Set a duration field, rejecting values outside 1..=MAX_MINUTES
    pub fn set_minutes(&mut self, field: SettingField, value: u32) -> Result<(), ValidationError> {
        let value = check_minutes(field.key(), value)?;
        match field {
            SettingField::Work => self.work = value,
            SettingField::ShortBreak => self.short_break = value,
            SettingField::LongBreak => self.long_break = value,
            SettingField::Theme => {}
        }
        Ok(())
    }

    /// Step a duration field by `delta` minutes
    pub fn adjust_minutes(&mut self, field: SettingField, delta: i32) -> Result<(), ValidationError> {
        let Some(current) = self.minutes(field) else {
            return Ok(());
        };
        let target = i64::from(current) + i64::from(delta);
        let value = u32::try_from(target.clamp(0, i64::from(MAX_MINUTES) + 1)).unwrap_or(0);
        self.set_minutes(field, value)
    }

    pub fn set_theme(&mut self, name: &str) -> Result<(), ValidationError> {
        self.theme = ThemeName::from_name(name).ok_or_else(|| ValidationError::UnknownTheme(name.to_string()))?;
        Ok(())
    }

    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.cycle();
    }

    /// Replace out-of-range durations with their defaults
    fn sanitized(mut self) -> Self {
        let defaults = Settings::default();
        for (key, value, fallback) in [
            ("work", &mut self.work, defaults.work),
            ("shortBreak", &mut self.short_break, defaults.short_break),
            ("longBreak", &mut self.long_break, defaults.long_break),
        ] {
            if check_minutes(key, *value).is_err() {
                tracing::warn!(field = key, value = *value, "stored setting out of range, using default");
                *value = fallback;
            }
        }
        self
    }
}

/// Load settings, falling back to defaults when absent or malformed
pub fn load_settings(store: &dyn KeyValueStore) -> Settings {
    let value = match store.load(StoreKey::Settings) {
        Ok(Some(value)) => value,
        Ok(None) => return Settings::default(),
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "settings unreadable, using defaults");
            return Settings::default();
        }
    };

    match serde_json::from_value::<Settings>(value) {
        Ok(settings) => settings.sanitized(),
        Err(error) => {
            tracing::warn!(%error, "settings malformed, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings(store: &mut dyn KeyValueStore, settings: &Settings) -> Result<()> {
    store.save(StoreKey::Settings, &serde_json::to_value(settings)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::store::{FileStore, MemoryStore};
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_settings() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());

        let settings = load_settings(&store);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.durations(), PhaseDurations::default());
        assert_eq!(settings.theme, ThemeName::Dark);
    }

    #[test]
    fn test_save_and_load_settings() {
        let temp_dir = tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());

        let mut settings = Settings::default();
        settings.set_minutes(SettingField::Work, 50).unwrap();
        settings.set_theme("green").unwrap();
        save_settings(&mut store, &settings).unwrap();

        let loaded = load_settings(&store);
        assert_eq!(loaded.work, 50);
        assert_eq!(loaded.short_break, 5);
        assert_eq!(loaded.theme, ThemeName::Green);
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let mut store = MemoryStore::new();
        store
            .save(StoreKey::Settings, &json!({"work": 30, "longBreak": 0}))
            .unwrap();

        let loaded = load_settings(&store);
        assert_eq!(loaded.work, 30);
        assert_eq!(loaded.short_break, 5);
        assert_eq!(loaded.long_break, 15);
    }

    #[test]
    fn test_malformed_record_uses_defaults() {
        let mut store = MemoryStore::new();
        store
            .save(StoreKey::Settings, &json!({"work": "lots", "theme": "neon"}))
            .unwrap();
        assert_eq!(load_settings(&store), Settings::default());
    }

    #[test]
    fn test_invalid_updates_are_rejected() {
        let mut settings = Settings::default();
        assert_eq!(
            settings.set_minutes(SettingField::ShortBreak, 0),
            Err(ValidationError::NonPositive { field: "shortBreak" })
        );
        assert!(settings.set_minutes(SettingField::Work, MAX_MINUTES + 1).is_err());
        assert!(settings.set_theme("neon").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_adjust_stops_at_bounds() {
        let mut settings = Settings::default();
        settings.adjust_minutes(SettingField::ShortBreak, -4).unwrap();
        assert_eq!(settings.short_break, 1);
        assert!(settings.adjust_minutes(SettingField::ShortBreak, -1).is_err());
        assert_eq!(settings.short_break, 1);

        settings.adjust_minutes(SettingField::Work, 5).unwrap();
        assert_eq!(settings.work, 30);
        settings.adjust_minutes(SettingField::Theme, 5).unwrap();
    }
}
