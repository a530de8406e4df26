//! In-memory channel registry.
//!
//! 所有记录保存在一个 `Mutex` 保护的映射中，进程退出即丢失。
//! Every operation takes the same lock exactly once, so each call is atomic
//! with respect to every other call.

use crate::structs::{band_label, channel_key, WiFiChannel, STANDARD_BANDS};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Whether an upsert created a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Updated,
}

/// Best channel per band label; `None` when a standard band has no records.
pub type BandSummary = BTreeMap<String, Option<WiFiChannel>>;

#[derive(Debug, Default)]
struct Inner {
    // BTreeMap keeps snapshots and tie-breaking in key order.
    channels: BTreeMap<String, WiFiChannel>,
    history: VecDeque<String>,
}

#[derive(Debug)]
pub struct ChannelRegistry {
    inner: Mutex<Inner>,
    history_limit: usize,
}

impl ChannelRegistry {
    /// Creates an empty registry keeping at most `history_limit` log lines.
    pub fn new(history_limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            history_limit,
        }
    }

    // A panic while holding the lock cannot leave the map half-written,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts the record under its derived key, replacing any previous one.
    pub fn upsert(&self, channel: WiFiChannel) -> UpsertOutcome {
        let key = channel.key();
        let mut inner = self.lock();

        let outcome = match inner.channels.insert(key, channel) {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Added,
        };
        let verb = match outcome {
            UpsertOutcome::Added => "Added",
            UpsertOutcome::Updated => "Updated",
        };
        self.record(
            &mut inner,
            format!(
                "{} Channel {} on {}.",
                verb,
                channel.channel_number,
                band_label(channel.frequency_band)
            ),
        );

        outcome
    }

    /// Deletes the record for (channel number, band). Returns whether one existed;
    /// removing an absent record is not an error.
    pub fn remove(&self, channel_number: i32, frequency_band: f64) -> bool {
        let key = channel_key(channel_number, frequency_band);
        let mut inner = self.lock();

        let removed = inner.channels.remove(&key).is_some();
        if removed {
            self.record(
                &mut inner,
                format!(
                    "Removed Channel {} on {}.",
                    channel_number,
                    band_label(frequency_band)
                ),
            );
        }
        removed
    }

    /// Snapshot of every record, keyed by derived key.
    pub fn list(&self) -> BTreeMap<String, WiFiChannel> {
        self.lock().channels.clone()
    }

    /// The record with the lowest score, or `None` when the registry is empty.
    /// Ties go to the first record in key order.
    pub fn best_summary(&self) -> Option<WiFiChannel> {
        let inner = self.lock();
        lowest_score(inner.channels.values())
    }

    /// Applies the lowest-score rule independently within each band.
    pub fn best_per_band(&self) -> BandSummary {
        let inner = self.lock();

        let mut summary: BandSummary = STANDARD_BANDS
            .iter()
            .map(|band| (band_label(*band), None))
            .collect();

        for channel in inner.channels.values() {
            let slot = summary
                .entry(band_label(channel.frequency_band))
                .or_insert(None);
            let replace = match slot {
                Some(best) => channel.score() < best.score(),
                None => true,
            };
            if replace {
                *slot = Some(*channel);
            }
        }
        summary
    }

    /// Action log, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.lock().history.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().channels.is_empty()
    }

    fn record(&self, inner: &mut Inner, message: String) {
        if self.history_limit == 0 {
            return;
        }
        tracing::debug!(%message, "Registry action");
        inner.history.push_back(message);
        while inner.history.len() > self.history_limit {
            inner.history.pop_front();
        }
    }
}

fn lowest_score<'a>(channels: impl Iterator<Item = &'a WiFiChannel>) -> Option<WiFiChannel> {
    let mut best: Option<&WiFiChannel> = None;
    for channel in channels {
        match best {
            Some(current) if current.score() <= channel.score() => {}
            _ => best = Some(channel),
        }
    }
    best.copied()
}
