//! L3GD20H gyroscope driver over a register bus

use log::{debug, trace};

use crate::bus::RegisterBus;
use crate::frequency::select_frequency;
use crate::registers::*;

/// Raw angular-velocity counts, not scaled by the full-scale sensitivity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleVector {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl SampleVector {
    pub fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Decode OUT_X_L, OUT_X_H, OUT_Y_L, OUT_Y_H, OUT_Z_L, OUT_Z_H
    pub fn from_le_bytes(bytes: [u8; 6]) -> Self {
        Self {
            x: decode_axis(bytes[0], bytes[1]),
            y: decode_axis(bytes[2], bytes[3]),
            z: decode_axis(bytes[4], bytes[5]),
        }
    }
}

/// Combine an axis low/high byte pair into a two's-complement count
pub fn decode_axis(lo: u8, hi: u8) -> i16 {
    i16::from_le_bytes([lo, hi])
}

/// Freshness of the sample returned by [`L3gd20h::read`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAvailability {
    /// New data on at least one axis since the previous read
    Fresh,
    /// No new measurement since the previous read; the data rate is lower
    /// than the polling rate
    NotYetAvailable,
    /// A new measurement replaced one that was never read
    Overwritten,
    /// Status that fits none of the above; data may be stale
    Unknown,
}

impl DataAvailability {
    /// Classify a STATUS register value
    ///
    /// Overrun flags take precedence over data-ready flags.
    pub fn from_status(status: u8) -> Self {
        if status & STATUS_OVERRUN_MASK != 0 {
            DataAvailability::Overwritten
        } else if status & STATUS_DATA_READY_MASK == 0 {
            DataAvailability::NotYetAvailable
        } else {
            DataAvailability::Fresh
        }
    }

    pub fn is_fresh(&self) -> bool {
        *self == DataAvailability::Fresh
    }
}

/// Result of a successful read: the latched sample and how fresh it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GyroReading {
    pub sample: SampleVector,
    pub status: DataAvailability,
}

/// L3GD20H sensor interface
///
/// Borrows the bus; several drivers may share one bus by reference.
pub struct L3gd20h<'a, B: ?Sized> {
    bus: &'a B,
    address: u8,
}

impl<'a, B> L3gd20h<'a, B>
where
    B: RegisterBus + ?Sized,
{
    /// Bind a driver to a bus and device address
    ///
    /// No bus traffic happens here. The address is not validated; use
    /// [`DEFAULT_ADDRESS`] for the usual wiring.
    pub fn new(bus: &'a B, address: u8) -> Self {
        Self { bus, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    fn read_register(&self, reg: u8) -> Result<u8, B::Error> {
        let value = self.bus.read_byte(self.address, reg)?;
        trace!("read_reg {:#04x} = {:#04x}", reg, value);
        Ok(value)
    }

    fn write_register(&self, reg: u8, value: u8) -> Result<(), B::Error> {
        debug!("write_reg {:#04x} = {:#04x}", reg, value);
        self.bus.write_byte(self.address, reg, value)
    }

    /// Put the sensor into power-down mode
    ///
    /// CTRL1 also holds the axis enables and the data rate, so only the
    /// power bit is cleared. Power-down draws less than sleep mode but
    /// takes longer to wake from.
    pub fn sleep(&self) -> Result<(), B::Error> {
        let ctrl1 = self.read_register(REG_CTRL1)?;
        self.write_register(REG_CTRL1, ctrl1 & !CTRL1_POWER)
    }

    /// Power the sensor back up after [`sleep`](Self::sleep)
    ///
    /// Forces the whole upper nibble of CTRL1 on and keeps the lower
    /// nibble. The upper nibble is not restored to its pre-sleep value.
    pub fn wake(&self) -> Result<(), B::Error> {
        let ctrl1 = self.read_register(REG_CTRL1)?;
        self.write_register(REG_CTRL1, ctrl1 | CTRL1_WAKE_MASK)
    }

    /// Set the output data rate, in Hz (12 ..= 800)
    ///
    /// The request is rounded up to the next supported rate and clamped to
    /// 800 Hz. Also resets full scale to ~250 dps and powers the sensor on.
    ///
    /// The three writes are not atomic: if one fails the remaining ones are
    /// skipped and the error is returned, so the whole call should be
    /// retried.
    ///
    /// # Example
    /// ```
    /// # use l3gd20h_interface::{L3gd20h, RegisterBus, DEFAULT_ADDRESS};
    /// # fn configure<B: RegisterBus>(bus: &B) -> Result<(), B::Error> {
    /// let gyro = L3gd20h::new(bus, DEFAULT_ADDRESS);
    /// gyro.set_frequency(200)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_frequency(&self, hz: u32) -> Result<(), B::Error> {
        self.write_register(REG_CTRL4, CTRL4_FS_250DPS)?;

        let entry = select_frequency(hz);
        debug!(
            "requested {} Hz, using {} Hz (LOW_ODR={}, CTRL1={:#04x})",
            hz, entry.threshold_hz, entry.low_odr, entry.ctrl1
        );

        // LOW_ODR changes how CTRL1's DR field is interpreted, so it goes first
        self.write_register(REG_LOW_ODR, entry.low_odr)?;
        self.write_register(REG_CTRL1, entry.ctrl1)
    }

    /// Read the latest sample
    ///
    /// Fetches STATUS and the three axes in one burst. The sample is
    /// returned even when it is stale; check [`GyroReading::status`].
    ///
    /// # Returns
    /// * `Ok(GyroReading)` - Sample and its freshness
    /// * `Err(B::Error)` - The bus transaction failed; no sample
    pub fn read(&self) -> Result<GyroReading, B::Error> {
        let mut data = [0u8; OUT_BURST_LEN];
        self.bus
            .read_bytes(self.address, REG_STATUS | AUTO_INCREMENT, &mut data)?;
        trace!("burst {:02x?}", data);

        let [status, xl, xh, yl, yh, zl, zh] = data;
        Ok(GyroReading {
            sample: SampleVector::from_le_bytes([xl, xh, yl, yh, zl, zh]),
            status: DataAvailability::from_status(status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;
    use crate::mock::{MockBus, Transaction};

    #[test]
    fn test_decode_axis() {
        assert_eq!(decode_axis(0xFF, 0xFF), -1);
        assert_eq!(decode_axis(0x00, 0x80), -32768);
        assert_eq!(decode_axis(0xFF, 0x7F), 32767);
        assert_eq!(decode_axis(0x01, 0x00), 1);
        assert_eq!(decode_axis(0x00, 0x01), 256);
        assert_eq!(decode_axis(0x80, 0xFF), -128);
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(DataAvailability::from_status(0xF0), DataAvailability::Overwritten);
        assert_eq!(DataAvailability::from_status(0xFF), DataAvailability::Overwritten);
        assert_eq!(DataAvailability::from_status(0x10), DataAvailability::Overwritten);
        assert_eq!(DataAvailability::from_status(0x0F), DataAvailability::Fresh);
        assert_eq!(DataAvailability::from_status(0x01), DataAvailability::Fresh);
        assert_eq!(DataAvailability::from_status(0x00), DataAvailability::NotYetAvailable);
        assert!(DataAvailability::from_status(0x08).is_fresh());
        assert!(!DataAvailability::from_status(0x80).is_fresh());
    }

    #[test]
    fn test_new_performs_no_io() {
        let bus = MockBus::new();
        let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);
        assert_eq!(gyro.address(), 0x6B);
        assert!(bus.transactions().is_empty());
    }

    #[test]
    fn test_sleep_clears_only_power_bit() {
        for before in [0xFF, 0x0F, 0x08, 0x3F, 0x00, 0xA5] {
            let bus = MockBus::new();
            bus.set_register(REG_CTRL1, before);
            let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

            gyro.sleep().unwrap();
            assert_eq!(bus.register(REG_CTRL1), before & !0x08);
            assert_eq!(
                bus.transactions(),
                vec![
                    Transaction::ReadByte { address: 0x6B, register: 0x20 },
                    Transaction::WriteByte { address: 0x6B, register: 0x20, value: before & !0x08 },
                ]
            );
        }
    }

    #[test]
    fn test_wake_sets_upper_nibble() {
        for before in [0x00, 0x05, 0x0F, 0x37, 0xF0] {
            let bus = MockBus::new();
            bus.set_register(REG_CTRL1, before);
            let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

            gyro.wake().unwrap();
            let after = bus.register(REG_CTRL1);
            assert_eq!(after & 0xF0, 0xF0);
            assert_eq!(after & 0x0F, before & 0x0F);
        }
    }

    #[test]
    fn test_sleep_then_wake_does_not_restore_upper_bits() {
        let bus = MockBus::new();
        let before = 0x1F;
        bus.set_register(REG_CTRL1, before);
        let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

        gyro.sleep().unwrap();
        gyro.wake().unwrap();
        assert_eq!(bus.register(REG_CTRL1), (before & !0x08) | 0xF0);
        assert_ne!(bus.register(REG_CTRL1), before);
    }

    #[test]
    fn test_sleep_read_failure_skips_write() {
        let bus = MockBus::new();
        bus.fail_reads();
        let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

        assert_eq!(gyro.sleep(), Err(BusError::Nack { address: 0x6B }));
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn test_wake_write_failure_is_returned() {
        let bus = MockBus::new();
        bus.fail_on_write(1);
        bus.set_register(REG_CTRL1, 0x07);
        let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

        assert_eq!(gyro.wake(), Err(BusError::Nack { address: 0x6B }));
        assert_eq!(bus.register(REG_CTRL1), 0x07);
    }

    #[test]
    fn test_set_frequency_100hz_write_order() {
        let bus = MockBus::new();
        let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

        gyro.set_frequency(100).unwrap();
        assert_eq!(bus.writes(), vec![(0x23, 0x00), (0x39, 0x00), (0x20, 0x0F)]);
    }

    #[test]
    fn test_set_frequency_12hz_write_order() {
        let bus = MockBus::new();
        let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

        gyro.set_frequency(12).unwrap();
        assert_eq!(bus.writes(), vec![(0x23, 0x00), (0x39, 0x01), (0x20, 0x0F)]);
    }

    #[test]
    fn test_set_frequency_clamps_to_800hz() {
        let bus = MockBus::new();
        let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

        gyro.set_frequency(5000).unwrap();
        assert_eq!(bus.writes(), vec![(0x23, 0x00), (0x39, 0x00), (0x20, 0x3F)]);
    }

    #[test]
    fn test_set_frequency_aborts_on_failed_write() {
        let bus = MockBus::new();
        bus.set_register(REG_CTRL4, 0x30);
        bus.set_register(REG_LOW_ODR, 0x01);
        bus.set_register(REG_CTRL1, 0x07);
        bus.fail_on_write(2);
        let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

        assert_eq!(gyro.set_frequency(200), Err(BusError::Nack { address: 0x6B }));

        // Second write attempted, third never issued
        assert_eq!(bus.writes(), vec![(0x23, 0x00), (0x39, 0x00)]);
        assert_eq!(bus.register(REG_CTRL4), 0x00);
        assert_eq!(bus.register(REG_LOW_ODR), 0x01);
        assert_eq!(bus.register(REG_CTRL1), 0x07);
    }

    #[test]
    fn test_read_burst_and_decode() {
        let bus = MockBus::new();
        bus.set_registers(REG_STATUS, &[0x0F, 0x01, 0x00, 0xFF, 0xFF, 0x00, 0x80]);
        let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

        let reading = gyro.read().unwrap();
        assert_eq!(reading.sample, SampleVector::new(1, -1, -32768));
        assert_eq!(reading.status, DataAvailability::Fresh);
        assert_eq!(
            bus.transactions(),
            vec![Transaction::ReadBytes { address: 0x6B, register: 0xA7, len: 7 }]
        );
    }

    #[test]
    fn test_read_returns_sample_when_stale() {
        let bus = MockBus::new();
        bus.set_registers(REG_STATUS, &[0x00, 0xFF, 0x7F, 0x10, 0x00, 0x00, 0x00]);
        let gyro = L3gd20h::new(&bus, DEFAULT_ADDRESS);

        let reading = gyro.read().unwrap();
        assert_eq!(reading.status, DataAvailability::NotYetAvailable);
        assert_eq!(reading.sample, SampleVector::new(32767, 16, 0));

        bus.set_register(REG_STATUS, 0xFF);
        let reading = gyro.read().unwrap();
        assert_eq!(reading.status, DataAvailability::Overwritten);
        assert_eq!(reading.sample, SampleVector::new(32767, 16, 0));
    }

    #[test]
    fn test_read_bus_failure() {
        let bus = MockBus::new();
        bus.fail_reads();
        let gyro = L3gd20h::new(&bus, 0x6A);

        assert_eq!(gyro.read(), Err(BusError::Nack { address: 0x6A }));
    }

    #[test]
    fn test_two_drivers_share_one_bus() {
        let bus = MockBus::new();
        let first = L3gd20h::new(&bus, 0x6A);
        let second = L3gd20h::new(&bus, 0x6B);

        first.set_frequency(50).unwrap();
        second.sleep().unwrap();

        let addresses: Vec<u8> = bus
            .transactions()
            .iter()
            .map(|t| match t {
                Transaction::ReadByte { address, .. }
                | Transaction::WriteByte { address, .. }
                | Transaction::ReadBytes { address, .. } => *address,
            })
            .collect();
        assert_eq!(addresses, vec![0x6A, 0x6A, 0x6A, 0x6B, 0x6B]);
    }
}
