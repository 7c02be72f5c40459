use std::collections::{hash_map::Entry, HashMap};
use std::hash::Hash;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    store::RecordStore,
    types::{FixtureRecord, StandingsRow},
};

pub const MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub received: usize,
    pub unique: usize,
    pub written: usize,
    pub failed_batches: usize,
}

impl SyncReport {
    pub fn merge(&mut self, other: &SyncReport) {
        self.received += other.received;
        self.unique += other.unique;
        self.written += other.written;
        self.failed_batches += other.failed_batches;
    }
}

/// Keeps one record per key. A later duplicate replaces the earlier one in
/// place, so the output follows first-seen order with last-seen values.
pub fn dedupe_by_key<T, K, F>(records: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut unique: Vec<T> = Vec::with_capacity(records.len());

    for record in records {
        match positions.entry(key(&record)) {
            Entry::Occupied(slot) => unique[*slot.get()] = record,
            Entry::Vacant(slot) => {
                slot.insert(unique.len());
                unique.push(record);
            }
        }
    }

    unique
}

pub struct Synchronizer<S: RecordStore> {
    store: S,
    batch_size: usize,
}

impl<S: RecordStore> Synchronizer<S> {
    pub fn new(store: S, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub async fn sync_fixtures(&self, table: &str, fixtures: Vec<FixtureRecord>) -> SyncReport {
        let received = fixtures.len();
        let fixtures = dedupe_by_key(fixtures, |f| f.identity_key.clone());
        let mut report = SyncReport {
            received,
            unique: fixtures.len(),
            ..Default::default()
        };

        if fixtures.is_empty() {
            info!("No fixtures to upsert into {}", table);
            return report;
        }

        info!("Upserting {} fixtures into {}...", fixtures.len(), table);
        for (batch_no, batch) in fixtures.chunks(self.batch_size).enumerate() {
            match self.store.upsert_fixtures(table, batch).await {
                Ok(_) => report.written += batch.len(),
                Err(e) => {
                    error!("Error upserting fixture batch {} into {}: {}", batch_no, table, e);
                    report.failed_batches += 1;
                }
            }
        }

        report
    }

    pub async fn sync_standings(&self, table: &str, rows: Vec<StandingsRow>) -> SyncReport {
        let received = rows.len();
        let rows = dedupe_by_key(rows, StandingsRow::key);
        let mut report = SyncReport {
            received,
            unique: rows.len(),
            ..Default::default()
        };

        if rows.is_empty() {
            info!("No standings data to upsert into {}", table);
            return report;
        }

        info!("Upserting {} standing records into {}...", rows.len(), table);
        for (batch_no, batch) in rows.chunks(self.batch_size).enumerate() {
            match self.store.upsert_standings(table, batch).await {
                Ok(_) => report.written += batch.len(),
                Err(e) => {
                    error!("Error upserting standings batch {} into {}: {}", batch_no, table, e);
                    report.failed_batches += 1;
                }
            }
        }

        report
    }

    /// Returns false when the table could not be cleared.
    pub async fn clear_standings(&self, table: &str) -> bool {
        match self.store.clear_standings(table).await {
            Ok(deleted) => {
                info!("Cleared {} rows from {}", deleted, table);
                true
            }
            Err(e) => {
                error!("Error clearing {}: {}", table, e);
                false
            }
        }
    }

    pub async fn record_last_run(&self, table: &str) -> bool {
        let now = Utc::now();
        match self.store.record_last_run(table, now).await {
            Ok(()) => {
                info!("Updated last_scrape to {}", now.to_rfc3339());
                true
            }
            Err(e) => {
                warn!("Error updating last_scrape: {}", e);
                false
            }
        }
    }
}
