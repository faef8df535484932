//! Session bookkeeping: score, best score, score events and tile ids

use serde::{Deserialize, Serialize};

use crate::slide::Merge;
use crate::tile::IdAllocator;

/// A discrete score increment from one merge, for score-popup animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    /// Monotonic within a game; acknowledge events by key
    pub key: u64,
    pub value: u64,
}

/// Reported once when a game reaches the terminal state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub score: u64,
    /// Best score after this game; the caller persists it
    pub best_score: u64,
    pub new_record: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    pub best_score: u64,
    pub active: bool,
    score_events: Vec<ScoreEvent>,
    next_event_key: u64,
    ids: IdAllocator,
}

impl Session {
    pub fn new(best_score: u64) -> Self {
        Self {
            best_score,
            active: true,
            ..Default::default()
        }
    }

    /// Start over, keeping only the best score
    pub fn reset(&mut self) {
        *self = Self::new(self.best_score);
    }

    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Add each merge to the score and queue one event per merge.
    /// Returns the score delta.
    pub fn record_merges(&mut self, merges: &[Merge]) -> u64 {
        let mut delta = 0;
        for merge in merges {
            let value = merge.value as u64;
            self.score_events.push(ScoreEvent {
                key: self.next_event_key,
                value,
            });
            self.next_event_key += 1;
            delta += value;
        }
        self.score += delta;
        delta
    }

    pub fn score_events(&self) -> &[ScoreEvent] {
        &self.score_events
    }

    pub fn drain_score_events(&mut self) -> Vec<ScoreEvent> {
        std::mem::take(&mut self.score_events)
    }

    /// Drop every event up to and including `key`
    pub fn acknowledge_score_events(&mut self, key: u64) {
        self.score_events.retain(|e| e.key > key);
    }

    /// Mark the game terminal and fold the score into the best score
    pub fn finish(&mut self) -> GameOver {
        self.active = false;
        let new_record = self.score > self.best_score;
        if new_record {
            self.best_score = self.score;
        }
        GameOver {
            score: self.score,
            best_score: self.best_score,
            new_record,
        }
    }
}
