//! Driver for the L3GD20H three-axis gyroscope on an I2C bus
//!
//! The driver talks to the sensor through the [`RegisterBus`] trait. Use
//! [`I2cBus`] to drive it from any `embedded-hal` 1.0 I2C implementation, or
//! [`FtdiI2c`] (feature `ftdi`) for an FT232H USB-to-I2C bridge.
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "ftdi")]
//! # fn main() -> Result<(), l3gd20h_interface::BusError> {
//! use l3gd20h_interface::{DataAvailability, FtdiConfig, FtdiI2c, L3gd20h, DEFAULT_ADDRESS};
//!
//! let bus = FtdiI2c::open(0, &FtdiConfig::default())?;
//! let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);
//!
//! gyro.set_frequency(100)?;
//! loop {
//!     let reading = gyro.read()?;
//!     match reading.status {
//!         DataAvailability::Fresh => println!("{:?}", reading.sample),
//!         DataAvailability::Overwritten => println!("missed a sample, polling too slowly"),
//!         _ => {}
//!     }
//! }
//! # }
//! # #[cfg(not(feature = "ftdi"))]
//! # fn main() {}
//! ```
//!
//! Bus failures come back as `Err` with the transport's own error type.
//! Stale data is not an error: [`L3gd20h::read`] always returns the latched
//! sample together with a [`DataAvailability`] status.

pub mod bus;
pub mod common;
pub mod error;
pub mod frequency;
pub mod l3gd20h;
pub mod registers;

#[cfg(feature = "ftdi")]
pub mod ftdi;

#[cfg(test)]
mod mock;

// Re-export public API
pub use bus::{I2cBus, RegisterBus};
pub use common::{create_bar, ReadStats};
pub use error::{BusError, Result};
pub use frequency::{select_frequency, FrequencyTableEntry, FREQUENCY_TABLE};
pub use l3gd20h::{decode_axis, DataAvailability, GyroReading, L3gd20h, SampleVector};
pub use registers::DEFAULT_ADDRESS;

#[cfg(feature = "ftdi")]
pub use ftdi::{FtdiConfig, FtdiI2c};
