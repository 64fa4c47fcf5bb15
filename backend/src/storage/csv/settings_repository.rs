//! # Draw Settings Repository
//!
//! File-based storage for the shared draw settings document, kept in a
//! single YAML file `settings.yaml` at the root of the data directory.
//!
//! ## YAML Format
//!
//! ```yaml
//! version: 4
//! cycle: 3
//! draw_date: 2024-02-09
//! draw_date_ethiopian:
//!   year: 2016
//!   month: 6
//!   day: 1
//! draw_date_display_en: "Yekatit 1, 2016"
//! draw_date_display_am: "የካቲት 1, 2016"
//! updated_at: "2024-01-10T09:30:00Z"
//! ```
//!
//! Writes go through a temp file and rename so collaborators never observe a
//! half-written document. The version field increments on every store.

use anyhow::Result;
use chrono::{Local, Utc};
use log::{debug, info};
use std::fs;

use super::connection::CsvConnection;
use crate::domain::models::draw_settings::DrawSettings;
use crate::storage::traits::SettingsStorage;

#[derive(Clone)]
pub struct SettingsRepository {
    connection: CsvConnection,
}

impl SettingsRepository {
    /// Create a new settings repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_or_bootstrap(&self) -> Result<DrawSettings> {
        let settings_path = self.connection.settings_file_path();

        if settings_path.exists() {
            let yaml_content = fs::read_to_string(&settings_path)?;
            let settings: DrawSettings = serde_yaml::from_str(&yaml_content)?;
            debug!("Loaded draw settings from {:?}", settings_path);
            Ok(settings)
        } else {
            let settings = DrawSettings::bootstrap(Local::now().date_naive());
            let stored = self.save_settings(&settings)?;
            info!("Created default draw settings at {:?}", settings_path);
            Ok(stored)
        }
    }

    /// Save settings with a bumped version, via temp file + rename
    fn save_settings(&self, settings: &DrawSettings) -> Result<DrawSettings> {
        let settings_path = self.connection.settings_file_path();

        let mut stored = settings.clone();
        stored.version = settings.version + 1;
        stored.updated_at = Utc::now().to_rfc3339();

        let yaml_content = serde_yaml::to_string(&stored)?;

        let temp_path = settings_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &settings_path)?;

        debug!("Saved draw settings v{} to {:?}", stored.version, settings_path);
        Ok(stored)
    }
}

impl SettingsStorage for SettingsRepository {
    fn get_settings(&self) -> Result<DrawSettings> {
        let _guard = self.connection.lock_for_write();
        self.load_or_bootstrap()
    }

    fn store_settings(&self, settings: &DrawSettings) -> Result<DrawSettings> {
        let _guard = self.connection.lock_for_write();
        self.save_settings(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup_test_repo() -> (SettingsRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        (SettingsRepository::new(connection), temp_dir)
    }

    #[test]
    fn test_bootstraps_cycle_one() {
        let (repo, _temp_dir) = setup_test_repo();

        let settings = repo.get_settings().expect("Failed to get settings");
        assert_eq!(settings.cycle, 1);
        assert_eq!(settings.version, 1);

        // The bootstrap was persisted, not just returned.
        let again = repo.get_settings().expect("Failed to get settings");
        assert_eq!(again, settings);
    }

    #[test]
    fn test_store_bumps_version_and_persists() {
        let (repo, _temp_dir) = setup_test_repo();

        let mut settings = repo.get_settings().expect("Failed to get settings");
        settings.cycle = 2;
        settings.draw_date = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();

        let stored = repo.store_settings(&settings).expect("Failed to store settings");
        assert_eq!(stored.version, settings.version + 1);
        assert_eq!(stored.cycle, 2);

        let loaded = repo.get_settings().expect("Failed to get settings");
        assert_eq!(loaded.cycle, 2);
        assert_eq!(loaded.version, stored.version);
        assert_eq!(loaded.draw_date, NaiveDate::from_ymd_opt(2024, 2, 9).unwrap());
    }
}
