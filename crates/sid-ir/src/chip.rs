//! Chip revision and master clock selection.

use serde::{Deserialize, Serialize};

/// SID chip revision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChipModel {
    #[default]
    #[serde(rename = "6581", alias = "mos6581")]
    Mos6581,
    #[serde(rename = "8580", alias = "mos8580")]
    Mos8580,
}

impl ChipModel {
    pub const fn name(self) -> &'static str {
        match self {
            ChipModel::Mos6581 => "MOS6581",
            ChipModel::Mos8580 => "MOS8580",
        }
    }
}

/// Master clock the chip runs at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockRate {
    #[default]
    Pal,
    Ntsc,
}

impl ClockRate {
    pub const PAL_HZ: u32 = 985_248;
    pub const NTSC_HZ: u32 = 1_022_727;

    /// Clock frequency in Hz.
    pub const fn hz(self) -> u32 {
        match self {
            ClockRate::Pal => Self::PAL_HZ,
            ClockRate::Ntsc => Self::NTSC_HZ,
        }
    }
}
