// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable transaction event queue backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `events`: event id → serialized TransactionEvent (immutable)
//! - `timeline`: composite key (secs_be|nanos_be|id) → id, ascending display order
//! - `status`: event id → display state byte (0 pending, 1 visible)
//!
//! Inserting an id that is already present is a no-op.

use std::collections::VecDeque;
use std::ops::Bound;
use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};

use super::events::{QueueStatus, QueuedEvent, TransactionEvent};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: id → serialized TransactionEvent (JSON bytes).
const EVENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("events");

/// Index: `secs_be|nanos_be|id` → id, scanned forward for oldest-first order.
const TIMELINE: TableDefinition<&[u8], &str> = TableDefinition::new("timeline");

/// Display state per id.
const STATUS: TableDefinition<&str, u8> = TableDefinition::new("status");

/// Number of timeline entries fetched per read transaction while listing.
const DEFAULT_PAGE_SIZE: usize = 64;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type QueueResult<T> = Result<T, QueueError>;

// =============================================================================
// Timeline Key Helpers
// =============================================================================

/// Build the timeline key: `sortable_secs_be | subsec_nanos_be | id`.
///
/// The sign bit is flipped so pre-epoch timestamps still sort before later ones.
/// Equal timestamps fall back to id byte order.
fn make_timeline_key(created: &DateTime<Utc>, id: &str) -> Vec<u8> {
    let secs = (created.timestamp() as u64) ^ (1 << 63);
    let nanos = created.timestamp_subsec_nanos();
    let mut key = Vec::with_capacity(8 + 4 + 1 + id.len());
    key.extend_from_slice(&secs.to_be_bytes());
    key.extend_from_slice(&nanos.to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(id.as_bytes());
    key
}

// =============================================================================
// TransactionQueue
// =============================================================================

/// Append-only, deduplicated queue of transaction events.
pub struct TransactionQueue {
    db: Database,
}

impl TransactionQueue {
    /// Open (or create) the queue database at the given path.
    pub fn open(path: &Path) -> QueueResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(EVENTS)?;
            let _ = write_txn.open_table(TIMELINE)?;
            let _ = write_txn.open_table(STATUS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Insert `event` unless its id is already queued.
    ///
    /// Returns `true` if the event was inserted, `false` for a duplicate.
    pub fn enqueue(&self, event: &TransactionEvent) -> QueueResult<bool> {
        let json = serde_json::to_vec(event)?;
        let timeline_key = make_timeline_key(&event.created_date, &event.id);

        let write_txn = self.db.begin_write()?;
        let inserted = {
            let mut events = write_txn.open_table(EVENTS)?;
            let exists = events.get(event.id.as_str())?.is_some();
            if exists {
                false
            } else {
                events.insert(event.id.as_str(), json.as_slice())?;

                let mut timeline = write_txn.open_table(TIMELINE)?;
                timeline.insert(timeline_key.as_slice(), event.id.as_str())?;

                let mut status = write_txn.open_table(STATUS)?;
                status.insert(event.id.as_str(), QueueStatus::Pending.to_byte())?;
                true
            }
        };

        if inserted {
            write_txn.commit()?;
            tracing::info!(
                tx_id = %event.id,
                event_type = ?event.event_type,
                "Transaction event queued"
            );
        } else {
            write_txn.abort()?;
            tracing::debug!(tx_id = %event.id, "Duplicate transaction event ignored");
        }
        Ok(inserted)
    }

    /// Look up a single event by id.
    pub fn get(&self, id: &str) -> QueueResult<Option<QueuedEvent>> {
        let read_txn = self.db.begin_read()?;
        let events = read_txn.open_table(EVENTS)?;
        let status = read_txn.open_table(STATUS)?;

        let event: TransactionEvent = match events.get(id)? {
            Some(value) => serde_json::from_slice(value.value())?,
            None => return Ok(None),
        };
        let state = status
            .get(id)?
            .map(|v| QueueStatus::from_byte(v.value()))
            .unwrap_or(QueueStatus::Pending);

        Ok(Some(QueuedEvent {
            event,
            status: state,
        }))
    }

    pub fn status(&self, id: &str) -> QueueResult<Option<QueueStatus>> {
        let read_txn = self.db.begin_read()?;
        let status = read_txn.open_table(STATUS)?;
        Ok(status.get(id)?.map(|v| QueueStatus::from_byte(v.value())))
    }

    /// Number of queued events.
    pub fn len(&self) -> QueueResult<usize> {
        let read_txn = self.db.begin_read()?;
        let events = read_txn.open_table(EVENTS)?;
        Ok(events.len()? as usize)
    }

    pub fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len()? == 0)
    }

    /// All events ordered by creation time, oldest first.
    ///
    /// The iterator reads lazily in pages; calling `list()` again restarts
    /// from the beginning.
    pub fn list(&self) -> QueueIter<'_> {
        QueueIter::new(self, DEFAULT_PAGE_SIZE)
    }

    /// Events not yet surfaced to the user, oldest first.
    pub fn pending(&self) -> QueueResult<Vec<QueuedEvent>> {
        self.list()
            .filter(|item| {
                item.as_ref()
                    .map(|queued| queued.status == QueueStatus::Pending)
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Mark an event as shown to the user.
    ///
    /// Returns `true` if the status changed; marking twice is harmless.
    pub fn mark_visible(&self, id: &str) -> QueueResult<bool> {
        let write_txn = self.db.begin_write()?;
        let changed = {
            let mut status = write_txn.open_table(STATUS)?;
            let current = status
                .get(id)?
                .map(|v| QueueStatus::from_byte(v.value()))
                .ok_or_else(|| QueueError::NotFound(format!("Transaction event {id}")))?;
            if current == QueueStatus::Visible {
                false
            } else {
                status.insert(id, QueueStatus::Visible.to_byte())?;
                true
            }
        };

        if changed {
            write_txn.commit()?;
            tracing::debug!(tx_id = %id, "Transaction event marked visible");
        } else {
            write_txn.abort()?;
        }
        Ok(changed)
    }

    /// Drop every queued event (account deletion).
    pub fn clear(&self) -> QueueResult<()> {
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(EVENTS)?;
        write_txn.delete_table(TIMELINE)?;
        write_txn.delete_table(STATUS)?;
        {
            let _ = write_txn.open_table(EVENTS)?;
            let _ = write_txn.open_table(TIMELINE)?;
            let _ = write_txn.open_table(STATUS)?;
        }
        write_txn.commit()?;
        tracing::info!("Transaction queue cleared");
        Ok(())
    }

    /// Read one page of the timeline strictly after `cursor`.
    fn read_page(&self, cursor: Option<&[u8]>, limit: usize) -> QueueResult<Page> {
        let read_txn = self.db.begin_read()?;
        let timeline = read_txn.open_table(TIMELINE)?;
        let events = read_txn.open_table(EVENTS)?;
        let status = read_txn.open_table(STATUS)?;

        let start = match cursor {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };

        let mut page = Page {
            events: Vec::with_capacity(limit),
            last_key: None,
            scanned: 0,
        };
        for entry in timeline.range::<&[u8]>((start, Bound::Unbounded))? {
            let (key, id) = entry?;
            let id = id.value();

            if let Some(value) = events.get(id)? {
                let event: TransactionEvent = serde_json::from_slice(value.value())?;
                let state = status
                    .get(id)?
                    .map(|v| QueueStatus::from_byte(v.value()))
                    .unwrap_or(QueueStatus::Pending);
                page.events.push(QueuedEvent {
                    event,
                    status: state,
                });
            }
            page.last_key = Some(key.value().to_vec());
            page.scanned += 1;

            if page.scanned >= limit {
                break;
            }
        }

        Ok(page)
    }
}

/// One batch of timeline entries read in a single transaction.
struct Page {
    events: Vec<QueuedEvent>,
    last_key: Option<Vec<u8>>,
    scanned: usize,
}

/// Lazy, finite iterator over the queue in display order.
pub struct QueueIter<'a> {
    queue: &'a TransactionQueue,
    page_size: usize,
    cursor: Option<Vec<u8>>,
    buffer: VecDeque<QueuedEvent>,
    exhausted: bool,
}

impl<'a> QueueIter<'a> {
    fn new(queue: &'a TransactionQueue, page_size: usize) -> Self {
        Self {
            queue,
            page_size: page_size.max(1),
            cursor: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Override how many entries each read transaction fetches.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

impl Iterator for QueueIter<'_> {
    type Item = QueueResult<QueuedEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.buffer.pop_front() {
            return Some(Ok(item));
        }
        if self.exhausted {
            return None;
        }

        match self.queue.read_page(self.cursor.as_deref(), self.page_size) {
            Ok(page) => {
                if page.scanned < self.page_size {
                    self.exhausted = true;
                }
                if page.last_key.is_some() {
                    self.cursor = page.last_key;
                }
                self.buffer.extend(page.events);
                match self.buffer.pop_front() {
                    Some(item) => Some(Ok(item)),
                    None if self.exhausted => None,
                    None => self.next(),
                }
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::events::{TxEventData, TxEventType};
    use chrono::{Duration, TimeZone};

    fn temp_queue() -> (TransactionQueue, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let queue = TransactionQueue::open(&dir.path().join("queue.redb")).unwrap();
        (queue, dir)
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn sample_event(id: &str, offset_secs: i64) -> TransactionEvent {
        TransactionEvent {
            id: id.to_string(),
            created_date: base_time() + Duration::seconds(offset_secs),
            event_type: TxEventType::Receive,
            data: TxEventData {
                from: "0x2222222222222222222222222222222222222222".to_string(),
                amount: 250,
            },
        }
    }

    fn ids(queue: &TransactionQueue) -> Vec<String> {
        queue
            .list()
            .map(|item| item.unwrap().event.id)
            .collect()
    }

    #[test]
    fn enqueue_and_get() {
        let (queue, _dir) = temp_queue();
        let event = sample_event("0xaaa", 0);

        assert!(queue.enqueue(&event).unwrap());

        let stored = queue.get("0xaaa").unwrap().unwrap();
        assert_eq!(stored.event, event);
        assert_eq!(stored.status, QueueStatus::Pending);
        assert!(queue.get("0xmissing").unwrap().is_none());
    }

    #[test]
    fn duplicate_enqueue_is_noop() {
        let (queue, _dir) = temp_queue();
        let event = sample_event("0xdup", 0);

        assert!(queue.enqueue(&event).unwrap());
        assert!(!queue.enqueue(&event).unwrap());

        assert_eq!(queue.len().unwrap(), 1);
        assert_eq!(ids(&queue), vec!["0xdup"]);
    }

    #[test]
    fn duplicate_with_different_payload_keeps_original() {
        let (queue, _dir) = temp_queue();
        let original = sample_event("0xsame", 0);
        let mut replay = sample_event("0xsame", 30);
        replay.data.amount = 999;

        queue.enqueue(&original).unwrap();
        assert!(!queue.enqueue(&replay).unwrap());

        assert_eq!(queue.get("0xsame").unwrap().unwrap().event, original);
        assert_eq!(queue.list().count(), 1);
    }

    #[test]
    fn list_orders_by_created_date() {
        let (queue, _dir) = temp_queue();
        queue.enqueue(&sample_event("0xlate", 20)).unwrap();
        queue.enqueue(&sample_event("0xearly", -10)).unwrap();
        queue.enqueue(&sample_event("0xmid", 5)).unwrap();

        assert_eq!(ids(&queue), vec!["0xearly", "0xmid", "0xlate"]);
    }

    #[test]
    fn sub_millisecond_order_follows_created_date() {
        let (queue, _dir) = temp_queue();
        let mut later = sample_event("0xaa", 0);
        later.created_date = base_time() + Duration::microseconds(600);
        let mut earlier = sample_event("0xzz", 0);
        earlier.created_date = base_time() + Duration::microseconds(100);

        queue.enqueue(&later).unwrap();
        queue.enqueue(&earlier).unwrap();

        assert_eq!(ids(&queue), vec!["0xzz", "0xaa"]);
    }

    #[test]
    fn equal_timestamps_order_by_id() {
        let (queue, _dir) = temp_queue();
        queue.enqueue(&sample_event("0xb2", 7)).unwrap();
        queue.enqueue(&sample_event("0xa1", 7)).unwrap();
        queue.enqueue(&sample_event("0xc3", 7)).unwrap();

        assert_eq!(ids(&queue), vec!["0xa1", "0xb2", "0xc3"]);
    }

    #[test]
    fn pre_epoch_timestamps_sort_first() {
        let old = Utc.with_ymd_and_hms(1969, 12, 31, 23, 0, 0).unwrap();
        let new = Utc.with_ymd_and_hms(1970, 1, 1, 1, 0, 0).unwrap();
        assert!(make_timeline_key(&old, "a") < make_timeline_key(&new, "a"));
    }

    #[test]
    fn list_pages_lazily_and_restarts() {
        let (queue, _dir) = temp_queue();
        for i in 0..7 {
            queue.enqueue(&sample_event(&format!("0x{i:04}"), i)).unwrap();
        }

        let paged: Vec<String> = queue
            .list()
            .page_size(2)
            .map(|item| item.unwrap().event.id)
            .collect();
        assert_eq!(paged.len(), 7);
        assert_eq!(paged.first().map(String::as_str), Some("0x0000"));
        assert_eq!(paged.last().map(String::as_str), Some("0x0006"));

        // A fresh iterator starts over.
        assert_eq!(ids(&queue), paged);
    }

    #[test]
    fn list_sees_events_added_between_pages() {
        let (queue, _dir) = temp_queue();
        queue.enqueue(&sample_event("0x1", 1)).unwrap();
        queue.enqueue(&sample_event("0x2", 2)).unwrap();
        queue.enqueue(&sample_event("0x3", 3)).unwrap();

        let mut iter = queue.list().page_size(2);
        assert_eq!(iter.next().unwrap().unwrap().event.id, "0x1");
        queue.enqueue(&sample_event("0x4", 4)).unwrap();
        let rest: Vec<String> = iter.map(|item| item.unwrap().event.id).collect();
        assert_eq!(rest, vec!["0x2", "0x3", "0x4"]);
    }

    #[test]
    fn mark_visible_transitions_once() {
        let (queue, _dir) = temp_queue();
        queue.enqueue(&sample_event("0xa", 1)).unwrap();
        queue.enqueue(&sample_event("0xb", 2)).unwrap();

        assert!(queue.mark_visible("0xa").unwrap());
        assert!(!queue.mark_visible("0xa").unwrap());
        assert_eq!(queue.status("0xa").unwrap(), Some(QueueStatus::Visible));

        let pending: Vec<String> = queue
            .pending()
            .unwrap()
            .into_iter()
            .map(|q| q.event.id)
            .collect();
        assert_eq!(pending, vec!["0xb"]);
    }

    #[test]
    fn mark_visible_unknown_id() {
        let (queue, _dir) = temp_queue();
        let result = queue.mark_visible("0xnope");
        assert!(matches!(result, Err(QueueError::NotFound(_))));
    }

    #[test]
    fn queue_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("queue.redb");
        {
            let queue = TransactionQueue::open(&path).unwrap();
            queue.enqueue(&sample_event("0xpersist", 0)).unwrap();
            queue.mark_visible("0xpersist").unwrap();
        }

        let reopened = TransactionQueue::open(&path).unwrap();
        let stored = reopened.get("0xpersist").unwrap().unwrap();
        assert_eq!(stored.status, QueueStatus::Visible);
        assert!(!reopened.enqueue(&sample_event("0xpersist", 0)).unwrap());
    }

    #[test]
    fn clear_empties_queue() {
        let (queue, _dir) = temp_queue();
        queue.enqueue(&sample_event("0x1", 1)).unwrap();
        queue.clear().unwrap();

        assert!(queue.is_empty().unwrap());
        assert_eq!(queue.list().count(), 0);
        assert!(queue.enqueue(&sample_event("0x1", 1)).unwrap());
    }
}
