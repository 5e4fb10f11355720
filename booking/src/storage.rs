//! Local key-value persistence
//!
//! Holds the session keys and the single-slot edit draft mailbox. The file
//! store keeps every key in one JSON object so a restart sees the same
//! values.

use crate::api::BookingError;
use crate::types::EditRequest;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Persisted key names
pub mod keys {
    /// Logged-in identity (JSON)
    pub const USER: &str = "user";
    /// Bearer token
    pub const AUTH_TOKEN: &str = "authToken";
    /// Interface language code
    pub const LANGUAGE: &str = "language";
    /// Edit draft hand-off (JSON booking)
    pub const EDITING_BOOKING: &str = "editingBooking";
}

/// String key-value store
pub trait KeyValueStore: Send + Sync {
    /// Value under `key`
    ///
    /// # Errors
    ///
    /// [`BookingError::Storage`] when the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, BookingError>;

    /// Overwrite `key`
    ///
    /// # Errors
    ///
    /// [`BookingError::Storage`] when the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), BookingError>;

    /// Delete `key` (absent keys are fine)
    ///
    /// # Errors
    ///
    /// [`BookingError::Storage`] when the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), BookingError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, BookingError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BookingError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BookingError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Store backed by one JSON object on disk
///
/// Every write rewrites the whole file; a missing file reads as empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Store at `path` (created on first write)
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, BookingError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| BookingError::Storage(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(BookingError::Storage(format!("{}: {e}", self.path.display()))),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), BookingError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| BookingError::Storage(format!("{}: {e}", parent.display())))?;
        }
        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| BookingError::Storage(e.to_string()))?;
        fs::write(&self.path, text)
            .map_err(|e| BookingError::Storage(format!("{}: {e}", self.path.display())))
    }

    fn update<F>(&self, change: F) -> Result<(), BookingError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        change(&mut entries);
        self.write_all(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, BookingError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BookingError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), BookingError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

/// Single-slot mailbox carrying a booking from the list to the edit form
///
/// Posting overwrites whatever was there (last write wins); the edit form
/// clears it on save or cancel. Posts and clears are serialized by a mutex
/// shared between clones.
#[derive(Clone)]
pub struct DraftMailbox {
    store: Arc<dyn KeyValueStore>,
    lock: Arc<Mutex<()>>,
}

impl DraftMailbox {
    /// Mailbox stored under [`keys::EDITING_BOOKING`]
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Replace the mailbox content
    ///
    /// # Errors
    ///
    /// Storage failures.
    pub fn post(&self, request: &EditRequest) -> Result<(), BookingError> {
        let json = serde_json::to_string(request).map_err(|e| BookingError::Storage(e.to_string()))?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.set(keys::EDITING_BOOKING, &json)?;
        tracing::debug!(booking_id = %request.booking_id(), "Edit draft posted");
        Ok(())
    }

    /// Current content without consuming it
    ///
    /// # Errors
    ///
    /// Storage failures, or [`BookingError::Decode`] for unreadable content.
    pub fn peek(&self) -> Result<Option<EditRequest>, BookingError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store
            .get(keys::EDITING_BOOKING)?
            .map(|json| serde_json::from_str(&json).map_err(|e| BookingError::Decode(e.to_string())))
            .transpose()
    }

    /// Empty the mailbox
    ///
    /// # Errors
    ///
    /// Storage failures.
    pub fn clear(&self) -> Result<(), BookingError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.remove(keys::EDITING_BOOKING)
    }
}

/// Async wrappers for use inside effects
///
/// The backing store may touch the filesystem, so each call runs on
/// tokio's blocking pool.
impl DraftMailbox {
    /// [`DraftMailbox::post`] on the blocking pool
    ///
    /// # Errors
    ///
    /// As [`DraftMailbox::post`], or [`BookingError::Storage`] if the task dies.
    pub async fn post_async(&self, request: EditRequest) -> Result<(), BookingError> {
        let mailbox = self.clone();
        offload(move || mailbox.post(&request)).await
    }

    /// [`DraftMailbox::peek`] on the blocking pool
    ///
    /// # Errors
    ///
    /// As [`DraftMailbox::peek`], or [`BookingError::Storage`] if the task dies.
    pub async fn peek_async(&self) -> Result<Option<EditRequest>, BookingError> {
        let mailbox = self.clone();
        offload(move || mailbox.peek()).await
    }

    /// [`DraftMailbox::clear`] on the blocking pool
    ///
    /// # Errors
    ///
    /// As [`DraftMailbox::clear`], or [`BookingError::Storage`] if the task dies.
    pub async fn clear_async(&self) -> Result<(), BookingError> {
        let mailbox = self.clone();
        offload(move || mailbox.clear()).await
    }
}

async fn offload<T, F>(work: F) -> Result<T, BookingError>
where
    F: FnOnce() -> Result<T, BookingError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| BookingError::Storage(format!("mailbox task failed: {e}")))?
}

impl fmt::Debug for DraftMailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftMailbox")
            .field("key", &keys::EDITING_BOOKING)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{BookedSlot, BookingId, RoomId, SlotOwner, SlotRoom, UserId};
    use chrono::{TimeZone, Utc};

    fn booking(id: i64) -> BookedSlot {
        let start = Utc.with_ymd_and_hms(2025, 1, 16, 9, 0, 0).unwrap();
        BookedSlot {
            id: BookingId::new(id),
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
            duration: 1,
            reserved: true,
            room: SlotRoom {
                id: RoomId::new(1),
                room_letter: Some("A".into()),
                room_number: Some(3),
                room_name: Some("A3".into()),
                capacity: Some(70),
            },
            owner: SlotOwner {
                id: UserId::new(42),
                user_name: "alice".into(),
                email: None,
            },
        }
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileStore::new(&path);
        store.set(keys::AUTH_TOKEN, "abc").unwrap();
        store.set(keys::LANGUAGE, "fr").unwrap();
        store.remove(keys::LANGUAGE).unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(keys::AUTH_TOKEN).unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get(keys::LANGUAGE).unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get("user"), Err(BookingError::Storage(_))));
    }

    #[test]
    fn mailbox_last_write_wins() {
        let mailbox = DraftMailbox::new(Arc::new(MemoryStore::new()));
        assert_eq!(mailbox.peek().unwrap(), None);

        mailbox.post(&EditRequest::new(booking(5))).unwrap();
        mailbox.post(&EditRequest::new(booking(7))).unwrap();
        assert_eq!(mailbox.peek().unwrap().unwrap().booking_id(), BookingId::new(7));

        mailbox.clear().unwrap();
        assert_eq!(mailbox.peek().unwrap(), None);
    }

    #[tokio::test]
    async fn async_mailbox_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let mailbox = DraftMailbox::new(Arc::new(FileStore::new(dir.path().join("state.json"))));

        mailbox.post_async(EditRequest::new(booking(5))).await.unwrap();
        let peeked = mailbox.peek_async().await.unwrap().unwrap();
        assert_eq!(peeked.booking_id(), BookingId::new(5));

        mailbox.clear_async().await.unwrap();
        assert_eq!(mailbox.peek_async().await.unwrap(), None);
    }

    #[test]
    fn mailbox_rejects_garbage() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::EDITING_BOOKING, "[]").unwrap();
        let mailbox = DraftMailbox::new(store);
        assert!(matches!(mailbox.peek(), Err(BookingError::Decode(_))));
    }
}
