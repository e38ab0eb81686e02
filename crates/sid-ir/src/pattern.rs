//! Pattern and cell types for three-voice sequences.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effects::EffectCommand;
use crate::note::Note;
use crate::waveform::Waveform;

/// Number of voices on the chip.
pub const NUM_VOICES: usize = 3;

/// Envelope settings, each 0-15.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Adsr {
    pub attack: u8,
    pub decay: u8,
    pub sustain: u8,
    pub release: u8,
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack: 2,
            decay: 2,
            sustain: 10,
            release: 5,
        }
    }
}

/// A single voice cell in a pattern row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cell {
    /// Note value
    pub note: Note,
    /// Effect column command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<EffectCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waveform: Option<Waveform>,
    /// Pulse width, 0-4095
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_width: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope: Option<Adsr>,
}

impl Cell {
    /// Create an empty cell.
    pub const fn empty() -> Self {
        Self {
            note: Note::None,
            effect: None,
            waveform: None,
            pulse_width: None,
            envelope: None,
        }
    }

    /// Cell holding only a note.
    pub const fn note(note: Note) -> Self {
        Self {
            note,
            ..Self::empty()
        }
    }

    /// Returns true if the cell is completely empty.
    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

/// Global column of a pattern row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalCell {
    /// Filter cutoff, 0-2047
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resonance: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
}

impl GlobalCell {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Rejected pattern data.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("row {row} is outside a {rows}-row pattern")]
    Row { row: u16, rows: u16 },
    #[error("voice {0} does not exist")]
    Voice(u8),
}

/// A pattern of rows, each holding one cell per voice plus a global cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SparsePattern", into = "SparsePattern")]
pub struct Pattern {
    rows: u16,
    /// Pattern data, stored row-major: data[row * NUM_VOICES + voice]
    data: Vec<Cell>,
    globals: Vec<GlobalCell>,
}

impl Pattern {
    /// Create a new pattern with empty cells.
    pub fn new(rows: u16) -> Self {
        Self {
            rows,
            data: alloc::vec![Cell::empty(); rows as usize * NUM_VOICES],
            globals: alloc::vec![GlobalCell::default(); rows as usize],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Get a reference to a cell.
    pub fn cell(&self, row: u16, voice: u8) -> &Cell {
        debug_assert!(row < self.rows);
        debug_assert!((voice as usize) < NUM_VOICES);
        &self.data[row as usize * NUM_VOICES + voice as usize]
    }

    /// Get a mutable reference to a cell.
    pub fn cell_mut(&mut self, row: u16, voice: u8) -> &mut Cell {
        debug_assert!(row < self.rows);
        debug_assert!((voice as usize) < NUM_VOICES);
        &mut self.data[row as usize * NUM_VOICES + voice as usize]
    }

    /// All voice cells in a row.
    pub fn row(&self, row: u16) -> &[Cell] {
        let start = row as usize * NUM_VOICES;
        &self.data[start..start + NUM_VOICES]
    }

    pub fn global(&self, row: u16) -> &GlobalCell {
        &self.globals[row as usize]
    }

    pub fn global_mut(&mut self, row: u16) -> &mut GlobalCell {
        &mut self.globals[row as usize]
    }
}

/// Serialized form: only non-empty cells are listed.
#[derive(Serialize, Deserialize)]
struct SparsePattern {
    rows: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    cells: Vec<PlacedCell>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    globals: Vec<PlacedGlobal>,
}

#[derive(Serialize, Deserialize)]
struct PlacedCell {
    row: u16,
    voice: u8,
    #[serde(flatten)]
    cell: Cell,
}

#[derive(Serialize, Deserialize)]
struct PlacedGlobal {
    row: u16,
    #[serde(flatten)]
    cell: GlobalCell,
}

impl TryFrom<SparsePattern> for Pattern {
    type Error = PatternError;

    fn try_from(sparse: SparsePattern) -> Result<Self, Self::Error> {
        let mut pattern = Pattern::new(sparse.rows);
        for placed in sparse.cells {
            if placed.row >= pattern.rows {
                return Err(PatternError::Row { row: placed.row, rows: pattern.rows });
            }
            if placed.voice as usize >= NUM_VOICES {
                return Err(PatternError::Voice(placed.voice));
            }
            *pattern.cell_mut(placed.row, placed.voice) = placed.cell;
        }
        for placed in sparse.globals {
            if placed.row >= pattern.rows {
                return Err(PatternError::Row { row: placed.row, rows: pattern.rows });
            }
            *pattern.global_mut(placed.row) = placed.cell;
        }
        Ok(pattern)
    }
}

impl From<Pattern> for SparsePattern {
    fn from(pattern: Pattern) -> Self {
        let mut cells = Vec::new();
        let mut globals = Vec::new();
        for row in 0..pattern.rows {
            for (voice, cell) in pattern.row(row).iter().enumerate() {
                if !cell.is_empty() {
                    cells.push(PlacedCell { row, voice: voice as u8, cell: *cell });
                }
            }
            let global = pattern.global(row);
            if !global.is_empty() {
                globals.push(PlacedGlobal { row, cell: *global });
            }
        }
        SparsePattern {
            rows: pattern.rows,
            cells,
            globals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectType;

    #[test]
    fn pattern_cell_access() {
        let mut pattern = Pattern::new(16);
        pattern.cell_mut(10, 2).note = Note::from_octave_semitone(4, 0);

        assert_eq!(pattern.cell(10, 2).note, Note::from_octave_semitone(4, 0));
        assert_eq!(pattern.cell(10, 1).note, Note::None);
        assert_eq!(pattern.row(10).len(), NUM_VOICES);
    }

    #[test]
    fn sparse_json_loads() {
        let json = r#"{
            "rows": 4,
            "cells": [
                { "row": 0, "voice": 1, "note": "c-4", "effect": { "kind": "arpeggio", "value": 71 } },
                { "row": 2, "voice": 1, "note": "off" }
            ],
            "globals": [ { "row": 0, "cutoff": 512 } ]
        }"#;
        let pattern: Pattern = serde_json::from_str(json).unwrap();
        assert_eq!(pattern.rows(), 4);
        assert_eq!(pattern.row(3).len(), NUM_VOICES);
        let cell = pattern.cell(0, 1);
        assert_eq!(cell.note, Note::from_octave_semitone(4, 0));
        assert_eq!(cell.effect, Some(EffectCommand::new(EffectType::Arpeggio, 0x47)));
        assert_eq!(pattern.cell(2, 1).note, Note::Off);
        assert_eq!(pattern.global(0).cutoff, Some(512));
        assert!(pattern.cell(1, 1).is_empty());
    }

    #[test]
    fn rejects_cells_outside_pattern() {
        let json = r#"{ "rows": 2, "cells": [ { "row": 5, "voice": 0, "note": "c-4" } ] }"#;
        assert!(serde_json::from_str::<Pattern>(json).is_err());
        let json = r#"{ "rows": 2, "cells": [ { "row": 0, "voice": 3, "note": "c-4" } ] }"#;
        assert!(serde_json::from_str::<Pattern>(json).is_err());
    }

    #[test]
    fn serializes_only_used_cells() {
        let mut pattern = Pattern::new(8);
        *pattern.cell_mut(3, 0) = Cell::note(Note::Off);
        let json = serde_json::to_string(&pattern).unwrap();
        let back: Pattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pattern);
        assert_eq!(json.matches("\"row\"").count(), 1);
    }
}
