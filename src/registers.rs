//! L3GD20H register map

/// Default 7-bit I2C address (SDO/SA0 pulled high)
pub const DEFAULT_ADDRESS: u8 = 0x6B;

// Register addresses
pub const REG_CTRL1: u8 = 0x20; // Power, axis enable, data rate, bandwidth
pub const REG_CTRL4: u8 = 0x23; // Full scale selection
pub const REG_STATUS: u8 = 0x27; // Data-ready / overrun flags, followed by OUT_X_L..OUT_Z_H
pub const REG_LOW_ODR: u8 = 0x39; // Low output data rate selector

/// Auto-increment flag for multi-byte reads
pub const AUTO_INCREMENT: u8 = 0x80;

// CTRL1 bits
pub const CTRL1_POWER: u8 = 1 << 3; // PD: 0 = power-down
pub const CTRL1_WAKE_MASK: u8 = 0xF0; // Upper nibble forced on by wake

// STATUS nibbles
pub const STATUS_OVERRUN_MASK: u8 = 0xF0; // ZYXOR, ZOR, YOR, XOR
pub const STATUS_DATA_READY_MASK: u8 = 0x0F; // ZYXDA, ZDA, YDA, XDA

/// CTRL4 value for ~250 dps full scale
pub const CTRL4_FS_250DPS: u8 = 0x00;

/// Status byte plus three little-endian axis words
pub const OUT_BURST_LEN: usize = 7;
