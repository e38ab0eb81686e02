//! Song container: tempo, patterns and the order list.

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::pattern::Pattern;
use crate::tempo::Tempo;

/// Order list entry and row for a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SongPosition {
    /// Index into the order list
    pub order: usize,
    /// Row within that pattern
    pub row: u16,
}

/// A complete song.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Song {
    /// Song title
    pub title: String,
    /// Initial tempo
    pub tempo: Tempo,
    /// Pattern pool
    pub patterns: Vec<Pattern>,
    /// Pattern indices in play order
    pub order: Vec<u16>,
}

impl Song {
    /// Create a new empty song.
    pub fn new(title: &str) -> Self {
        Self {
            title: String::from(title),
            ..Self::default()
        }
    }

    /// Patterns in play order, skipping indices that do not exist.
    pub fn ordered_patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.order
            .iter()
            .filter_map(|&idx| self.patterns.get(idx as usize))
    }

    /// Length of the song in ticks.
    pub fn total_ticks(&self) -> u64 {
        self.ordered_patterns().map(|p| p.rows() as u64).sum()
    }

    /// Order list entry and row playing at `tick`, `None` past the end.
    pub fn position_at(&self, tick: u64) -> Option<SongPosition> {
        let mut start = 0u64;
        for (order, &idx) in self.order.iter().enumerate() {
            let Some(pattern) = self.patterns.get(idx as usize) else {
                continue;
            };
            let end = start + pattern.rows() as u64;
            if tick < end {
                return Some(SongPosition {
                    order,
                    row: (tick - start) as u16,
                });
            }
            start = end;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_ticks_follows_order() {
        let mut song = Song::new("test");
        song.patterns.push(Pattern::new(16));
        song.patterns.push(Pattern::new(8));
        song.order = alloc::vec![0, 1, 0, 7];
        assert_eq!(song.total_ticks(), 40);
    }

    #[test]
    fn position_skips_missing_patterns() {
        let mut song = Song::new("test");
        song.patterns.push(Pattern::new(4));
        song.order = alloc::vec![0, 5, 0];
        assert_eq!(song.position_at(3), Some(SongPosition { order: 0, row: 3 }));
        assert_eq!(song.position_at(5), Some(SongPosition { order: 2, row: 1 }));
        assert_eq!(song.position_at(8), None);
    }

    #[test]
    fn loads_minimal_json() {
        let song: Song = serde_json::from_str(
            r#"{ "title": "x", "tempo": { "beats_per_minute": 140 }, "patterns": [ { "rows": 4 } ], "order": [0] }"#,
        )
        .unwrap();
        assert_eq!(song.tempo.beats_per_minute, 140);
        assert_eq!(song.tempo.ticks_per_beat, 4);
        assert_eq!(song.total_ticks(), 4);
    }
}
