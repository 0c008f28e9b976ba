//! FT232H USB-to-I2C transport using FTDI libMPSSE
//!
//! Enabled with the `ftdi` feature. The library is linked by `build.rs`.

use std::ptr;
use std::sync::Mutex;

use log::{debug, trace};

use crate::bus::RegisterBus;
use crate::error::{BusError, Result};

use self::sys::*;

/// Bindings for the parts of libmpsse_i2c.h this transport uses
#[allow(non_camel_case_types, non_snake_case)]
mod sys {
    use std::ffi::c_void;

    pub type DWORD = u32;
    pub type UCHAR = u8;
    pub type USHORT = u16;

    pub type FT_STATUS = DWORD;
    pub type FT_HANDLE = *mut c_void;

    pub const FT_OK: FT_STATUS = 0;

    pub const I2C_TRANSFER_OPTIONS_START_BIT: DWORD = 0x0000_0001;
    pub const I2C_TRANSFER_OPTIONS_STOP_BIT: DWORD = 0x0000_0002;
    pub const I2C_TRANSFER_OPTIONS_BREAK_ON_NACK: DWORD = 0x0000_0004;
    pub const I2C_TRANSFER_OPTIONS_NACK_LAST_BYTE: DWORD = 0x0000_0008;

    #[repr(C)]
    pub struct ChannelConfig {
        pub ClockRate: DWORD,
        pub LatencyTimer: UCHAR,
        pub Options: DWORD,
        pub Pin: DWORD,
        pub currentPinState: USHORT,
    }

    extern "C" {
        pub fn I2C_GetNumChannels(numChannels: *mut DWORD) -> FT_STATUS;
        pub fn I2C_OpenChannel(index: DWORD, handle: *mut FT_HANDLE) -> FT_STATUS;
        pub fn I2C_InitChannel(handle: FT_HANDLE, config: *mut ChannelConfig) -> FT_STATUS;
        pub fn I2C_CloseChannel(handle: FT_HANDLE) -> FT_STATUS;
        pub fn I2C_DeviceRead(
            handle: FT_HANDLE,
            deviceAddress: UCHAR,
            sizeToTransfer: DWORD,
            buffer: *mut UCHAR,
            sizeTransfered: *mut DWORD,
            options: DWORD,
        ) -> FT_STATUS;
        pub fn I2C_DeviceWrite(
            handle: FT_HANDLE,
            deviceAddress: UCHAR,
            sizeToTransfer: DWORD,
            buffer: *const UCHAR,
            sizeTransfered: *mut DWORD,
            options: DWORD,
        ) -> FT_STATUS;
    }
}

/// I2C clock rates supported by the MPSSE engine
pub const CLOCK_STANDARD_MODE: u32 = 100_000;
pub const CLOCK_FAST_MODE: u32 = 400_000;
pub const CLOCK_FAST_MODE_PLUS: u32 = 1_000_000;

/// Channel settings applied by [`FtdiI2c::open`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtdiConfig {
    /// I2C clock in Hz
    pub clock_rate: u32,
    /// USB latency timer in ms (1 is the lowest stable value)
    pub latency_timer: u8,
}

impl Default for FtdiConfig {
    fn default() -> Self {
        Self {
            clock_rate: CLOCK_FAST_MODE,
            latency_timer: 1,
        }
    }
}

/// Name of an FT_STATUS code (from ftd2xx.h)
fn status_to_string(status: FT_STATUS) -> &'static str {
    match status {
        0 => "FT_OK",
        1 => "FT_INVALID_HANDLE",
        2 => "FT_DEVICE_NOT_FOUND",
        3 => "FT_DEVICE_NOT_OPENED",
        4 => "FT_IO_ERROR",
        5 => "FT_INSUFFICIENT_RESOURCES",
        6 => "FT_INVALID_PARAMETER",
        7 => "FT_INVALID_BAUD_RATE",
        8 => "FT_DEVICE_NOT_OPENED_FOR_ERASE",
        9 => "FT_DEVICE_NOT_OPENED_FOR_WRITE",
        10 => "FT_FAILED_TO_WRITE_DEVICE",
        11 => "FT_EEPROM_READ_FAILED",
        12 => "FT_EEPROM_WRITE_FAILED",
        13 => "FT_EEPROM_ERASE_FAILED",
        14 => "FT_EEPROM_NOT_PRESENT",
        15 => "FT_EEPROM_NOT_PROGRAMMED",
        16 => "FT_INVALID_ARGS",
        17 => "FT_NOT_SUPPORTED",
        18 => "FT_OTHER_ERROR",
        _ => "UNKNOWN_ERROR",
    }
}

fn check(status: FT_STATUS) -> Result<()> {
    if status == FT_OK {
        Ok(())
    } else {
        Err(BusError::Ftdi {
            status,
            description: status_to_string(status).to_string(),
        })
    }
}

/// Owned MPSSE channel handle
struct Channel(FT_HANDLE);

// The handle is only touched while the owning mutex is held
unsafe impl Send for Channel {}

/// FT232H I2C channel implementing [`RegisterBus`]
///
/// Every register transaction holds an internal lock, so the bus can be
/// shared by reference between drivers and threads.
pub struct FtdiI2c {
    channel: Mutex<Channel>,
}

impl FtdiI2c {
    /// Open and initialize an I2C channel
    ///
    /// # Arguments
    /// * `channel_index` - Index of the I2C channel to use (usually 0)
    /// * `config` - Clock rate and latency settings
    ///
    /// # Returns
    /// * `Ok(FtdiI2c)` - Ready-to-use bus
    /// * `Err(BusError)` - No channel, bad index, or an FTDI failure
    pub fn open(channel_index: u32, config: &FtdiConfig) -> Result<Self> {
        let mut num_channels: DWORD = 0;
        check(unsafe { I2C_GetNumChannels(&mut num_channels) })?;

        if num_channels == 0 {
            return Err(BusError::NoChannelsFound);
        }
        if channel_index >= num_channels {
            return Err(BusError::InvalidChannel(channel_index));
        }

        let mut handle: FT_HANDLE = ptr::null_mut();
        check(unsafe { I2C_OpenChannel(channel_index, &mut handle) })?;

        let mut channel_config = ChannelConfig {
            ClockRate: config.clock_rate,
            LatencyTimer: config.latency_timer,
            Options: 0,
            Pin: 0,
            currentPinState: 0,
        };
        if let Err(e) = check(unsafe { I2C_InitChannel(handle, &mut channel_config) }) {
            unsafe { I2C_CloseChannel(handle) };
            return Err(e);
        }

        debug!(
            "opened I2C channel {} of {} at {} Hz",
            channel_index, num_channels, config.clock_rate
        );

        Ok(Self {
            channel: Mutex::new(Channel(handle)),
        })
    }

    /// Run `f` with exclusive use of the channel handle
    fn with_handle<T>(&self, f: impl FnOnce(FT_HANDLE) -> Result<T>) -> Result<T> {
        // A poisoned lock only means another thread panicked mid-transfer
        let guard = self.channel.lock().unwrap_or_else(|e| e.into_inner());
        f(guard.0)
    }

    /// Write the register pointer without STOP, keeping the bus for a
    /// repeated-START read
    fn write_pointer(handle: FT_HANDLE, address: u8, register: u8) -> Result<()> {
        let buffer = [register];
        let mut transferred: DWORD = 0;
        let options = I2C_TRANSFER_OPTIONS_START_BIT | I2C_TRANSFER_OPTIONS_BREAK_ON_NACK;

        check(unsafe {
            I2C_DeviceWrite(handle, address, 1, buffer.as_ptr(), &mut transferred, options)
        })?;
        if transferred != 1 {
            return Err(BusError::Nack { address });
        }
        Ok(())
    }

    fn read_into(handle: FT_HANDLE, address: u8, buffer: &mut [u8]) -> Result<()> {
        let mut transferred: DWORD = 0;
        let options = I2C_TRANSFER_OPTIONS_START_BIT
            | I2C_TRANSFER_OPTIONS_STOP_BIT
            | I2C_TRANSFER_OPTIONS_NACK_LAST_BYTE;

        check(unsafe {
            I2C_DeviceRead(
                handle,
                address,
                buffer.len() as DWORD,
                buffer.as_mut_ptr(),
                &mut transferred,
                options,
            )
        })?;
        if transferred as usize != buffer.len() {
            return Err(BusError::TransferError {
                expected: buffer.len() as u32,
                actual: transferred,
            });
        }
        Ok(())
    }
}

impl RegisterBus for FtdiI2c {
    type Error = BusError;

    fn read_byte(&self, address: u8, register: u8) -> Result<u8> {
        let mut data = [0u8];
        self.read_bytes(address, register, &mut data)?;
        Ok(data[0])
    }

    fn write_byte(&self, address: u8, register: u8, value: u8) -> Result<()> {
        self.with_handle(|handle| {
            let buffer = [register, value];
            let mut transferred: DWORD = 0;
            let options = I2C_TRANSFER_OPTIONS_START_BIT
                | I2C_TRANSFER_OPTIONS_STOP_BIT
                | I2C_TRANSFER_OPTIONS_BREAK_ON_NACK;

            check(unsafe {
                I2C_DeviceWrite(handle, address, 2, buffer.as_ptr(), &mut transferred, options)
            })?;
            if transferred != 2 {
                return Err(BusError::Nack { address });
            }
            Ok(())
        })
    }

    fn read_bytes(&self, address: u8, register: u8, buffer: &mut [u8]) -> Result<()> {
        self.with_handle(|handle| {
            Self::write_pointer(handle, address, register)?;
            Self::read_into(handle, address, buffer)?;
            trace!("{:#04x}[{:#04x}..] -> {:02x?}", address, register, buffer);
            Ok(())
        })
    }
}

impl Drop for FtdiI2c {
    fn drop(&mut self) {
        let channel = self.channel.get_mut().unwrap_or_else(|e| e.into_inner());
        unsafe {
            I2C_CloseChannel(channel.0);
        }
    }
}
