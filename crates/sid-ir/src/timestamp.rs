//! Time representation with subtick precision.

/// Time position in the song.
///
/// Ticks are pattern rows; the subtick is the 0-based buffer index within
/// that tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Absolute tick from song start
    pub tick: u64,
    /// Subtick within the tick (0..subticks_per_beat)
    pub subtick: u16,
}

impl Timestamp {
    /// Create a timestamp at an exact tick boundary.
    pub const fn from_ticks(tick: u64) -> Self {
        Self { tick, subtick: 0 }
    }

    pub const fn new(tick: u64, subtick: u16) -> Self {
        Self { tick, subtick }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_ordering() {
        let t1 = Timestamp::from_ticks(10);
        let t2 = Timestamp::from_ticks(20);
        let t3 = Timestamp::new(10, 2);

        assert!(t1 < t2);
        assert!(t1 < t3);
        assert!(t3 < t2);
    }
}
