//! Error types for the L3GD20H bus transports
//!
//! The driver itself never wraps transport errors: every `L3gd20h` method
//! returns the transport's own `Error` type unchanged. `BusError` is the
//! error type of the transports shipped with this crate.

use thiserror::Error;

/// Error type for register bus transactions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// FTDI driver error
    #[error("FTDI error: {status} ({description})")]
    Ftdi { status: u32, description: String },

    /// No I2C channels found
    #[error("No I2C channels found")]
    NoChannelsFound,

    /// Invalid channel index
    #[error("Invalid channel index: {0}")]
    InvalidChannel(u32),

    /// Device did not acknowledge its address or register
    #[error("Device 0x{address:02X} did not acknowledge")]
    Nack { address: u8 },

    /// Data transfer error
    #[error("Data transfer error: expected {expected} bytes, transferred {actual}")]
    TransferError { expected: u32, actual: u32 },
}

/// Result type for bus transactions
pub type Result<T> = std::result::Result<T, BusError>;
