//! Register bus abstraction
//!
//! `RegisterBus` is the only thing the driver needs from a transport:
//! single-register reads and writes plus a multi-byte read. Methods take
//! `&self` so one bus can back several drivers; implementations serialize
//! their own access.

use std::cell::RefCell;

use embedded_hal::i2c::I2c;
use log::trace;

/// Register-addressed two-wire bus
pub trait RegisterBus {
    /// Transport error, returned to the driver's caller unchanged
    type Error;

    /// Read one register
    fn read_byte(&self, address: u8, register: u8) -> Result<u8, Self::Error>;

    /// Write one register
    fn write_byte(&self, address: u8, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Read `buffer.len()` bytes starting at `register`
    ///
    /// Whether the register address auto-increments is up to the device;
    /// callers set any increment flag in `register` themselves.
    fn read_bytes(&self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

/// `RegisterBus` over any `embedded-hal` 1.0 I2C bus
///
/// The HAL bus sits in a `RefCell`, so a single `I2cBus` can be shared by
/// reference between drivers on the same thread.
pub struct I2cBus<I2C> {
    i2c: RefCell<I2C>,
}

impl<I2C: I2c> I2cBus<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c: RefCell::new(i2c),
        }
    }

    /// Hand the HAL bus back
    pub fn into_inner(self) -> I2C {
        self.i2c.into_inner()
    }
}

impl<I2C: I2c> RegisterBus for I2cBus<I2C> {
    type Error = I2C::Error;

    fn read_byte(&self, address: u8, register: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8];
        self.i2c.borrow_mut().write_read(address, &[register], &mut buf)?;
        trace!("read_byte {:#04x}[{:#04x}] = {:#04x}", address, register, buf[0]);
        Ok(buf[0])
    }

    fn write_byte(&self, address: u8, register: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.borrow_mut().write(address, &[register, value])
    }

    fn read_bytes(&self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.borrow_mut().write_read(address, &[register], buffer)
    }
}
