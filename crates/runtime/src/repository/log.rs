//! Append-only log repositories.
//!
//! [`FileRepository<T>`] stores any serializable type in a length-prefixed
//! append-only file; [`FileActionLog`] is its action log instantiation.
//! [`InMemoryActionLog`] keeps entries in memory for headless sessions and
//! tests.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Serialize, de::DeserializeOwned};

use super::traits::{ActionLogReader, ActionLogWriter};
use super::{ActionLogEntry, RepositoryError, Result};

/// File-backed action log.
pub type FileActionLog = FileRepository<ActionLogEntry>;

const WRITE_BUFFER_BYTES: usize = 64 * 1024;

/// Generic file-based repository for append-only logs.
///
/// Stores items of type `T` in a file using the format:
/// ```text
/// [u32 LE length][bincode serialized T]
/// [u32 LE length][bincode serialized T]
/// ...
/// ```
pub struct FileRepository<T> {
    /// Filename without path.
    session_id: String,
    path: PathBuf,
    writer: BufWriter<File>,
    /// Byte offset of the next write.
    current_offset: u64,
    _phantom: PhantomData<T>,
}

impl<T> FileRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a new file repository.
    ///
    /// # Errors
    ///
    /// Returns error if the file already exists (prevents accidental overwrites).
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
        tracing::debug!(target: "runtime::repository", path = %path.display(), "Created log");
        Ok(Self::from_parts(filename, path, file, 0))
    }

    /// Open an existing file repository for appending.
    pub fn open(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let filename = filename.as_ref();
        let path = base_dir.as_ref().join(filename);

        let file = OpenOptions::new().append(true).open(&path)?;
        let current_offset = file.metadata()?.len();
        tracing::debug!(
            target: "runtime::repository",
            path = %path.display(),
            offset = current_offset,
            "Opened log"
        );
        Ok(Self::from_parts(filename, path, file, current_offset))
    }

    /// Open or create a file repository.
    ///
    /// Creates the directory and file if they don't exist, or opens the
    /// existing file for appending.
    pub fn open_or_create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        std::fs::create_dir_all(base_dir)?;

        let filename = filename.as_ref();
        let path = base_dir.join(filename);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let current_offset = file.metadata()?.len();
        tracing::debug!(
            target: "runtime::repository",
            path = %path.display(),
            offset = current_offset,
            "Opened or created log"
        );
        Ok(Self::from_parts(filename, path, file, current_offset))
    }

    fn from_parts(filename: &str, path: PathBuf, file: File, current_offset: u64) -> Self {
        Self {
            session_id: filename.to_string(),
            path,
            writer: BufWriter::with_capacity(WRITE_BUFFER_BYTES, file),
            current_offset,
            _phantom: PhantomData,
        }
    }

    /// Append an item to the log.
    ///
    /// Returns the byte offset where the item was written.
    pub fn append(&mut self, item: &T) -> Result<u64> {
        let offset = self.current_offset;

        let bytes =
            bincode::serialize(item).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let len = u32::try_from(bytes.len()).map_err(|_| {
            RepositoryError::Serialization(format!("entry of {} bytes is too large", bytes.len()))
        })?;

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&bytes)?;
        self.current_offset += 4 + u64::from(len);

        Ok(offset)
    }

    /// Read an item at a specific byte offset.
    ///
    /// Returns `None` if the offset is at or beyond the end of the file, and
    /// `Some((item, next_offset))` otherwise. Only flushed entries are visible.
    pub fn read_at_offset(&self, byte_offset: u64) -> Result<Option<(T, u64)>> {
        let file = File::open(&self.path)?;
        let file_size = file.metadata()?.len();
        if byte_offset >= file_size {
            return Ok(None);
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(byte_offset))?;
        match read_frame(&mut reader, byte_offset, file_size)? {
            Some((item, len)) => Ok(Some((item, byte_offset + 4 + len))),
            None => Ok(None),
        }
    }

    /// Reads every flushed item from the start of the file.
    ///
    /// # Errors
    ///
    /// A truncated trailing entry, or a length prefix larger than the rest of
    /// the file, is reported as [`RepositoryError::CorruptedData`].
    pub fn read_all(&self) -> Result<Vec<T>> {
        let file = File::open(&self.path)?;
        let file_size = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        let mut items = Vec::new();
        let mut offset = 0;
        while let Some((item, len)) = read_frame(&mut reader, offset, file_size)? {
            items.push(item);
            offset += 4 + len;
        }
        Ok(items)
    }

    /// Flush buffered writes to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Current size of the log in bytes, including unflushed writes.
    pub fn size(&self) -> u64 {
        self.current_offset
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads one `[len][payload]` frame. Returns `None` at a clean end of file.
///
/// `file_size` bounds the payload length before anything is allocated.
fn read_frame<T: DeserializeOwned>(
    reader: &mut impl Read,
    offset: u64,
    file_size: u64,
) -> Result<Option<(T, u64)>> {
    let mut len_bytes = [0u8; 4];
    let mut filled = 0;
    while filled < len_bytes.len() {
        match reader.read(&mut len_bytes[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(RepositoryError::CorruptedData(format!(
                    "truncated length prefix at offset {offset}"
                )));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    let len = u32::from_le_bytes(len_bytes);
    let remaining = file_size.saturating_sub(offset + 4);
    if u64::from(len) > remaining {
        return Err(RepositoryError::CorruptedData(format!(
            "entry of {len} bytes at offset {offset} exceeds the remaining {remaining} bytes"
        )));
    }
    let mut data = vec![0u8; len as usize];
    reader.read_exact(&mut data).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => RepositoryError::CorruptedData(format!(
            "truncated entry of {len} bytes at offset {offset}"
        )),
        _ => RepositoryError::Io(e),
    })?;

    let item =
        bincode::deserialize(&data).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    Ok(Some((item, u64::from(len))))
}

impl<T> Drop for FileRepository<T> {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(
                target: "runtime::repository",
                log = %self.session_id,
                error = %e,
                "Failed to flush log on drop"
            );
        }
    }
}

impl ActionLogWriter for FileRepository<ActionLogEntry> {
    fn append(&mut self, entry: &ActionLogEntry) -> Result<u64> {
        FileRepository::append(self, entry)
    }

    fn flush(&mut self) -> Result<()> {
        FileRepository::flush(self)
    }

    fn session_id(&self) -> &str {
        FileRepository::session_id(self)
    }
}

impl ActionLogReader for FileRepository<ActionLogEntry> {
    fn read_all(&self) -> Result<Vec<ActionLogEntry>> {
        FileRepository::read_all(self)
    }
}

/// Action log kept in memory. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct InMemoryActionLog {
    entries: Arc<Mutex<Vec<ActionLogEntry>>>,
}

impl InMemoryActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn entries(&self) -> Vec<ActionLogEntry> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ActionLogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ActionLogWriter for InMemoryActionLog {
    fn append(&mut self, entry: &ActionLogEntry) -> Result<u64> {
        let mut entries = self.lock();
        entries.push(entry.clone());
        Ok(entries.len() as u64 - 1)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn session_id(&self) -> &str {
        "memory"
    }
}

impl ActionLogReader for InMemoryActionLog {
    fn read_all(&self) -> Result<Vec<ActionLogEntry>> {
        Ok(self.entries())
    }
}
