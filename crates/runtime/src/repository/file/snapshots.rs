//! File-based snapshot repositories.
//!
//! Each snapshot is one bincode file named `{prefix}_{sequence}.bin`. Writes go
//! to a temporary file first and are moved into place with a rename, so a
//! crash never leaves a half-written snapshot under the final name.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use combat_core::SchedulerSnapshot;
use serde::{Serialize, de::DeserializeOwned};

use crate::repository::{
    CombatantRecord, CombatantRepository, EffectRepository, RepositoryError, Result,
};

/// One directory of sequence-indexed bincode files.
struct SequenceFiles<T> {
    base_dir: PathBuf,
    prefix: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SequenceFiles<T>
where
    T: Serialize + DeserializeOwned,
{
    fn new(base_dir: impl AsRef<Path>, prefix: &'static str) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            prefix,
            _marker: PhantomData,
        })
    }

    fn path(&self, sequence: u64) -> PathBuf {
        self.base_dir
            .join(format!("{}_{}.bin", self.prefix, sequence))
    }

    fn save(&self, sequence: u64, value: &T) -> Result<()> {
        let path = self.path(sequence);
        let temp_path = path.with_extension("bin.tmp");

        let bytes = bincode::serialize(value)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved {}[{}] to {}", self.prefix, sequence, path.display());
        Ok(())
    }

    fn load(&self, sequence: u64) -> Result<Option<T>> {
        let path = self.path(sequence);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let value = bincode::deserialize(&bytes).map_err(|e| {
            RepositoryError::CorruptedData(format!("{}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded {}[{}] from {}", self.prefix, sequence, path.display());
        Ok(Some(value))
    }

    fn exists(&self, sequence: u64) -> bool {
        self.path(sequence).exists()
    }

    fn delete(&self, sequence: u64) -> Result<()> {
        let path = self.path(sequence);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!("Deleted {}[{}]", self.prefix, sequence);
        }
        Ok(())
    }

    fn list_sequences(&self) -> Result<Vec<u64>> {
        let mut sequences = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(sequence) = filename
                    .strip_prefix(self.prefix)
                    .and_then(|s| s.strip_prefix('_'))
                    .and_then(|s| s.strip_suffix(".bin"))
                && let Ok(sequence) = sequence.parse::<u64>()
            {
                sequences.push(sequence);
            }
        }
        sequences.sort_unstable();
        Ok(sequences)
    }
}

/// Stores scheduler snapshots as `effects_{sequence}.bin`.
pub struct FileEffectRepository {
    files: SequenceFiles<SchedulerSnapshot>,
}

impl FileEffectRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            files: SequenceFiles::new(base_dir, "effects")?,
        })
    }
}

impl EffectRepository for FileEffectRepository {
    fn save(&self, sequence: u64, snapshot: &SchedulerSnapshot) -> Result<()> {
        self.files.save(sequence, snapshot)
    }

    fn load(&self, sequence: u64) -> Result<Option<SchedulerSnapshot>> {
        self.files.load(sequence)
    }

    fn exists(&self, sequence: u64) -> bool {
        self.files.exists(sequence)
    }

    fn delete(&self, sequence: u64) -> Result<()> {
        self.files.delete(sequence)
    }

    fn list_sequences(&self) -> Result<Vec<u64>> {
        self.files.list_sequences()
    }
}

/// Stores combatant records as `combatants_{sequence}.bin`.
pub struct FileCombatantRepository {
    files: SequenceFiles<CombatantRecord>,
}

impl FileCombatantRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            files: SequenceFiles::new(base_dir, "combatants")?,
        })
    }
}

impl CombatantRepository for FileCombatantRepository {
    fn save(&self, sequence: u64, record: &CombatantRecord) -> Result<()> {
        self.files.save(sequence, record)
    }

    fn load(&self, sequence: u64) -> Result<Option<CombatantRecord>> {
        self.files.load(sequence)
    }

    fn exists(&self, sequence: u64) -> bool {
        self.files.exists(sequence)
    }

    fn delete(&self, sequence: u64) -> Result<()> {
        self.files.delete(sequence)
    }

    fn list_sequences(&self) -> Result<Vec<u64>> {
        self.files.list_sequences()
    }
}
