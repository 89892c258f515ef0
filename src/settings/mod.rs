use crate::constants::SETTINGS_KEY;
use crate::error::AppError;
use crate::models::{PomodoroSettingsPatch, Settings, SettingsPatch};
use crate::storage::{preserve_corrupt, Storage};
use crate::validation::validate_settings;
use log::{error, info, warn};
use std::sync::Arc;

/// Store for the single `settings` record.
pub struct SettingsStore {
    storage: Arc<dyn Storage>,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Current settings; defaults when nothing usable is stored.
    ///
    /// Never fails: unreadable or corrupt data is logged and replaced by
    /// defaults. Fields missing from an otherwise valid record take their
    /// default values.
    pub fn load(&self) -> Settings {
        let raw = match self.storage.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Settings::default(),
            Err(e) => {
                error!("Failed to read settings, using defaults: {e}");
                return Settings::default();
            }
        };

        match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) => {
                if let Err(e) = validate_settings(&settings) {
                    warn!("Stored settings are out of range, using defaults: {e}");
                    preserve_corrupt(self.storage.as_ref(), SETTINGS_KEY, &raw);
                    return Settings::default();
                }
                settings
            }
            Err(e) => {
                warn!("Stored settings are corrupt, using defaults: {e}");
                preserve_corrupt(self.storage.as_ref(), SETTINGS_KEY, &raw);
                Settings::default()
            }
        }
    }

    /// Merge the provided fields into the stored record.
    pub fn update(&self, patch: &SettingsPatch) -> Result<Settings, AppError> {
        let mut settings = self.load();
        settings.apply(patch);
        validate_settings(&settings)?;
        self.persist(&settings)?;
        Ok(settings)
    }

    /// Merge the provided Pomodoro fields, keeping the rest.
    pub fn update_pomodoro(&self, patch: &PomodoroSettingsPatch) -> Result<Settings, AppError> {
        self.update(&SettingsPatch {
            pomodoro_settings: Some(patch.clone()),
            ..SettingsPatch::default()
        })
    }

    pub fn reset(&self) -> Result<Settings, AppError> {
        let settings = Settings::default();
        self.persist(&settings)?;
        info!("Settings reset to defaults");
        Ok(settings)
    }

    fn persist(&self, settings: &Settings) -> Result<(), AppError> {
        let json = serde_json::to_string(settings)?;
        self.storage.set(SETTINGS_KEY, &json).map_err(|e| {
            error!("Failed to persist settings: {e}");
            e
        })
    }
}
