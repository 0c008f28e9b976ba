//! Output data rate selection
//!
//! The L3GD20H data rate is split over two registers: the LOW_ODR bit picks
//! between the low (12.5 - 50 Hz) and the normal (100 - 800 Hz) rate
//! families, and the DR/BW field of CTRL1 picks the rate within the family.

/// One supported output data rate and the register values that realize it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyTableEntry {
    /// Nominal rate in Hz; requests up to this value select this entry
    pub threshold_hz: u32,
    /// Value for the LOW_ODR register (0 or 1)
    pub low_odr: u8,
    /// Value for CTRL1: data rate, bandwidth, power and axis enables
    pub ctrl1: u8,
}

const fn entry(threshold_hz: u32, low_odr: u8, ctrl1: u8) -> FrequencyTableEntry {
    FrequencyTableEntry {
        threshold_hz,
        low_odr,
        ctrl1,
    }
}

/// Supported rates, ascending; the last entry is the maximum rate
pub const FREQUENCY_TABLE: [FrequencyTableEntry; 7] = [
    entry(12, 1, 0x0F),
    entry(25, 1, 0x1F),
    entry(50, 1, 0x2F),
    entry(100, 0, 0x0F),
    entry(200, 0, 0x1F),
    entry(400, 0, 0x2F),
    entry(800, 0, 0x3F),
];

/// Pick the table entry for a requested rate
///
/// Rounds up to the nearest supported rate and clamps to the fastest one,
/// so every request maps to exactly one entry.
pub fn select_frequency(hz: u32) -> &'static FrequencyTableEntry {
    let last = FREQUENCY_TABLE.len() - 1;
    for (i, candidate) in FREQUENCY_TABLE.iter().enumerate() {
        if candidate.threshold_hz >= hz || i == last {
            return candidate;
        }
    }
    &FREQUENCY_TABLE[last]
}
