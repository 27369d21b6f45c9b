//! Append-only event log file.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::events::CombatEvent;
use crate::repository::{EventRepository, RepositoryError, Result};

/// File-backed combat event log.
///
/// Entries are written as `[u32 length][bincode CombatEvent]` through a
/// buffered writer; reads open an independent handle so they never disturb
/// the write position.
pub struct FileEventLog {
    /// Filename of the log, used as its session identifier
    session_id: String,
    path: PathBuf,
    writer: BufWriter<File>,
    /// Byte offset for the next write
    current_offset: u64,
}

impl FileEventLog {
    const BUFFER_SIZE: usize = 64 * 1024;

    /// Create a new log. Fails if the file already exists.
    pub fn create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let filename = filename.as_ref();
        std::fs::create_dir_all(base_dir)?;

        let path = base_dir.join(filename);
        if path.exists() {
            return Err(RepositoryError::LogAlreadyExists(
                path.display().to_string(),
            ));
        }

        let file = OpenOptions::new().create_new(true).write(true).open(&path)?;
        tracing::debug!("Created event log: {}", path.display());

        Ok(Self {
            session_id: filename.to_string(),
            path,
            writer: BufWriter::with_capacity(Self::BUFFER_SIZE, file),
            current_offset: 0,
        })
    }

    /// Open an existing log for appending, or create it.
    pub fn open_or_create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let filename = filename.as_ref();
        std::fs::create_dir_all(base_dir)?;

        let path = base_dir.join(filename);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let current_offset = file.metadata()?.len();

        tracing::debug!(
            "Opened event log: {} at offset {}",
            path.display(),
            current_offset
        );

        Ok(Self {
            session_id: filename.to_string(),
            path,
            writer: BufWriter::with_capacity(Self::BUFFER_SIZE, file),
            current_offset,
        })
    }

    /// Reads every event from a log file without opening it for writing.
    pub fn read_path(path: impl AsRef<Path>) -> Result<Vec<CombatEvent>> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        let mut events = Vec::new();
        let mut offset = 0;
        while offset < size {
            let (event, next) = read_entry(&mut reader, offset)?;
            events.push(event);
            offset = next;
        }
        Ok(events)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads one `[len][payload]` entry at the reader's position (`offset`).
fn read_entry(reader: &mut impl Read, offset: u64) -> Result<(CombatEvent, u64)> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    let mut data = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match reader.read(&mut data[filled..]) {
            Ok(0) => {
                return Err(RepositoryError::PartialWrite {
                    offset,
                    expected: len,
                    actual: filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    let event = bincode::deserialize(&data)
        .map_err(|e| RepositoryError::CorruptedData(format!("entry at {}: {}", offset, e)))?;
    Ok((event, offset + 4 + len as u64))
}

impl EventRepository for FileEventLog {
    fn append(&mut self, event: &CombatEvent) -> Result<u64> {
        let offset = self.current_offset;
        let bytes = bincode::serialize(event)?;
        let len = u32::try_from(bytes.len()).map_err(|_| {
            RepositoryError::Serialization(format!("event of {} bytes is too large", bytes.len()))
        })?;

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&bytes)?;
        self.current_offset += 4 + bytes.len() as u64;

        Ok(offset)
    }

    fn read_at_offset(&self, offset: u64) -> Result<Option<(CombatEvent, u64)>> {
        let file = File::open(&self.path)?;
        let file_size = file.metadata()?.len();
        if offset >= file_size {
            return Ok(None);
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;
        read_entry(&mut reader, offset).map(Some)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.current_offset)
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for FileEventLog {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!("Failed to flush event log {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ActiveEffectId, CombatantId, Tick};

    fn cancelled(id: u64) -> CombatEvent {
        CombatEvent::EffectCancelled {
            effect: ActiveEffectId(id),
            at: Tick(id * 100),
        }
    }

    #[test]
    fn appended_events_read_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = FileEventLog::create(dir.path(), "events.log").unwrap();

        let first = log.append(&cancelled(1)).unwrap();
        let second = log
            .append(&CombatEvent::Dispelled {
                target: CombatantId(2),
                at: Tick(250),
                cancelled: vec![ActiveEffectId(1)],
            })
            .unwrap();
        log.flush().unwrap();

        assert_eq!(first, 0);
        let (event, next) = log.read_at_offset(first).unwrap().unwrap();
        assert_eq!(event, cancelled(1));
        assert_eq!(next, second);
        assert_eq!(log.read_all().unwrap().len(), 2);
        assert!(log.read_at_offset(log.size().unwrap()).unwrap().is_none());
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        drop(FileEventLog::create(dir.path(), "events.log").unwrap());
        assert!(matches!(
            FileEventLog::create(dir.path(), "events.log"),
            Err(RepositoryError::LogAlreadyExists(_))
        ));
    }

    #[test]
    fn reopened_log_appends_after_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut log = FileEventLog::create(dir.path(), "events.log").unwrap();
            log.append(&cancelled(1)).unwrap();
        }
        let mut log = FileEventLog::open_or_create(dir.path(), "events.log").unwrap();
        log.append(&cancelled(2)).unwrap();
        log.flush().unwrap();

        let events = FileEventLog::read_path(log.path()).unwrap();
        assert_eq!(events, vec![cancelled(1), cancelled(2)]);
    }

    #[test]
    fn truncated_tail_is_a_partial_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let mut log = FileEventLog::create(dir.path(), "events.log").unwrap();
            log.append(&cancelled(1)).unwrap();
            log.flush().unwrap();
            log.path().to_path_buf()
        };
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 2);
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            FileEventLog::read_path(&path),
            Err(RepositoryError::PartialWrite { offset: 0, .. })
        ));
    }
}
