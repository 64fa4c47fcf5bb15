use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// CsvConnection manages file paths for the data directory and hands out the
/// shared write lock.
///
/// All mutating repository operations run their read-check-write sequence
/// while holding the lock, which is what makes check-then-create on the
/// (cycle, number) keyspace atomic across concurrent sessions sharing this
/// connection.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create a connection in the default data directory:
    /// `$EQUB_DATA_DIR` if set, otherwise `<platform data dir>/equb-tracker`.
    pub fn new_default() -> Result<Self> {
        let data_dir = match std::env::var("EQUB_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
            _ => dirs::data_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not determine platform data directory"))?
                .join("equb-tracker"),
        };

        info!("Using data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Take the connection-wide write lock. Held for the duration of any
    /// read-check-write sequence in the repositories.
    pub(crate) fn lock_for_write(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap()
    }

    /// Path of the ticket ledger file for one cycle
    pub fn tickets_file_path(&self, cycle: u32) -> PathBuf {
        self.base_directory.join(format!("tickets_cycle_{}.csv", cycle))
    }

    pub fn members_file_path(&self) -> PathBuf {
        self.base_directory.join("members.csv")
    }

    pub fn claims_file_path(&self) -> PathBuf {
        self.base_directory.join("claims.csv")
    }

    pub fn settings_file_path(&self) -> PathBuf {
        self.base_directory.join("settings.yaml")
    }
}
