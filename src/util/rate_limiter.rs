//! Attempt throttling for sign-in and public forms.
//!
//! Counts attempts per identifier inside a fixed window that opens on the
//! first attempt. Reaching `max_attempts` blocks the identifier for
//! `block_duration`. State lives in an [`AttemptStore`] under
//! `rate_limit_<identifier>`; the file-backed store mirrors browser-local
//! storage, so the limiter is advisory and can be bypassed by anyone who
//! clears it. Server-side enforcement belongs to the data platform.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::RateLimitConfig;

/// Persisted per-identifier state. Timestamps are unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub attempts: u32,
    pub first_attempt: i64,
    pub blocked_until: Option<i64>,
}

/// Record storage. `update` is the only write path and runs the closure
/// under the store's lock, so concurrent read-modify-write cycles serialize.
pub trait AttemptStore: Send + Sync {
    fn load(&self, key: &str) -> Option<AttemptRecord>;
    /// Replaces the record with what `f` returns; `None` removes it.
    /// Returns the record as stored.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<AttemptRecord>) -> Option<AttemptRecord>,
    ) -> Option<AttemptRecord>;
}

fn apply(
    records: &mut HashMap<String, AttemptRecord>,
    key: &str,
    f: &mut dyn FnMut(Option<AttemptRecord>) -> Option<AttemptRecord>,
) -> (Option<AttemptRecord>, bool) {
    let current = records.get(key).copied();
    let next = f(current);
    match next {
        Some(record) => {
            records.insert(key.to_string(), record);
        }
        None => {
            records.remove(key);
        }
    }
    (next, next != current)
}

#[derive(Default)]
pub struct MemoryAttemptStore {
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl AttemptStore for MemoryAttemptStore {
    fn load(&self, key: &str) -> Option<AttemptRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).get(key).copied()
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<AttemptRecord>) -> Option<AttemptRecord>,
    ) -> Option<AttemptRecord> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut records, key, f).0
    }
}

struct FileState {
    records: HashMap<String, AttemptRecord>,
    generation: u64,
}

/// Writes numbered snapshots; an older snapshot never overwrites a newer one.
struct SnapshotWriter {
    path: PathBuf,
    written: Mutex<u64>,
}

impl SnapshotWriter {
    fn write(&self, generation: u64, json: String) {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if generation <= *written {
            return;
        }
        if let Err(e) = std::fs::write(&self.path, json) {
            warn!(path = %self.path.display(), "Failed to persist attempt store: {}", e);
            return;
        }
        *written = generation;
    }
}

/// Key/value JSON file. Unreadable or corrupt files start empty; write
/// failures are logged and otherwise ignored.
///
/// Inside a tokio runtime the file write runs on the blocking pool, so the
/// file can trail memory by one write; outside a runtime it is written inline.
pub struct JsonFileAttemptStore {
    state: Mutex<FileState>,
    writer: Arc<SnapshotWriter>,
}

impl JsonFileAttemptStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let records = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), "Discarding corrupt attempt store: {}", e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            state: Mutex::new(FileState { records, generation: 0 }),
            writer: Arc::new(SnapshotWriter { path, written: Mutex::new(0) }),
        }
    }

    fn persist(&self, state: &mut FileState) {
        let json = match serde_json::to_string(&state.records) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to encode attempt store: {}", e);
                return;
            }
        };
        state.generation += 1;
        let generation = state.generation;
        let writer = self.writer.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || writer.write(generation, json));
            }
            Err(_) => writer.write(generation, json),
        }
    }
}

impl AttemptStore for JsonFileAttemptStore {
    fn load(&self, key: &str) -> Option<AttemptRecord> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).records.get(key).copied()
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<AttemptRecord>) -> Option<AttemptRecord>,
    ) -> Option<AttemptRecord> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (stored, changed) = apply(&mut state.records, key, f);
        if changed {
            self.persist(&mut state);
        }
        stored
    }
}

fn storage_key(identifier: &str) -> String {
    format!("rate_limit_{identifier}")
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn duration_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

#[derive(Clone)]
pub struct AttemptLimiter {
    store: Arc<dyn AttemptStore>,
    max_attempts: u32,
    window: Duration,
    block_duration: Duration,
}

impl AttemptLimiter {
    pub fn new(config: &RateLimitConfig, store: Arc<dyn AttemptStore>) -> Self {
        Self {
            store,
            max_attempts: config.max_attempts,
            window: config.window,
            block_duration: config.block_duration,
        }
    }

    /// In-memory limiter, or a file-backed one when the config names a path.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        let store: Arc<dyn AttemptStore> = match &config.store_path {
            Some(path) => Arc::new(JsonFileAttemptStore::open(path)),
            None => Arc::new(MemoryAttemptStore::default()),
        };
        Self::new(config, store)
    }

    pub fn record_attempt(&self, identifier: &str) {
        self.record_attempt_at(identifier, now_ms())
    }

    /// Counts one attempt. An active block is kept as is; otherwise a record
    /// whose window has passed (or whose block elapsed) starts over.
    pub fn record_attempt_at(&self, identifier: &str, now: i64) {
        let window = duration_ms(self.window);
        let block = duration_ms(self.block_duration);
        let max_attempts = self.max_attempts;

        let stored = self.store.update(&storage_key(identifier), &mut |current| {
            let mut record = match current {
                Some(r) if r.blocked_until.is_some_and(|until| now < until) => r,
                Some(r) if r.blocked_until.is_none() && now - r.first_attempt <= window => r,
                _ => AttemptRecord { attempts: 0, first_attempt: now, blocked_until: None },
            };
            record.attempts = record.attempts.saturating_add(1);
            if record.attempts >= max_attempts && record.blocked_until.is_none() {
                record.blocked_until = Some(now + block);
            }
            Some(record)
        });

        match stored {
            Some(r) if r.attempts == max_attempts => {
                warn!(identifier, attempts = r.attempts, "Identifier blocked after too many attempts")
            }
            Some(r) => debug!(identifier, attempts = r.attempts, "Recorded attempt"),
            None => {}
        }
    }

    pub fn is_blocked(&self, identifier: &str) -> bool {
        self.is_blocked_at(identifier, now_ms())
    }

    /// An elapsed block clears the whole record.
    pub fn is_blocked_at(&self, identifier: &str, now: i64) -> bool {
        let key = storage_key(identifier);
        let blocked = |r: &AttemptRecord| r.blocked_until.is_some_and(|until| now < until);
        self.store
            .update(&key, &mut |current| current.filter(|r| r.blocked_until.is_none() || blocked(r)))
            .is_some_and(|r| blocked(&r))
    }

    pub fn remaining_block_time(&self, identifier: &str) -> Duration {
        self.remaining_block_time_at(identifier, now_ms())
    }

    pub fn remaining_block_time_at(&self, identifier: &str, now: i64) -> Duration {
        self.store
            .load(&storage_key(identifier))
            .and_then(|r| r.blocked_until)
            .filter(|until| *until > now)
            .map(|until| Duration::from_millis((until - now) as u64))
            .unwrap_or(Duration::ZERO)
    }

    pub fn reset(&self, identifier: &str) {
        self.store.update(&storage_key(identifier), &mut |_| None);
    }
}

/// Whole minutes, rounded up, for user-facing "try again in" messages.
pub fn minutes_remaining(remaining: Duration) -> u64 {
    remaining.as_secs().div_ceil(60).max(1)
}
