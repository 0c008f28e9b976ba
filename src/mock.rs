//! Recording register bus for driver tests

use std::cell::{Cell, RefCell};

use crate::bus::RegisterBus;
use crate::error::BusError;

/// Bus transaction, as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    ReadByte { address: u8, register: u8 },
    WriteByte { address: u8, register: u8, value: u8 },
    ReadBytes { address: u8, register: u8, len: usize },
}

/// Register file with a transaction log and injectable failures
///
/// `read_bytes` ignores the auto-increment flag and serves consecutive
/// registers starting at `register & 0x7F`.
pub struct MockBus {
    regs: RefCell<[u8; 256]>,
    log: RefCell<Vec<Transaction>>,
    writes: Cell<usize>,
    fail_write: Cell<Option<usize>>,
    fail_reads: Cell<bool>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            regs: RefCell::new([0; 256]),
            log: RefCell::new(Vec::new()),
            writes: Cell::new(0),
            fail_write: Cell::new(None),
            fail_reads: Cell::new(false),
        }
    }

    pub fn set_register(&self, register: u8, value: u8) {
        self.regs.borrow_mut()[register as usize] = value;
    }

    pub fn set_registers(&self, start: u8, values: &[u8]) {
        let mut regs = self.regs.borrow_mut();
        for (i, v) in values.iter().enumerate() {
            regs[(start as usize + i) & 0xFF] = *v;
        }
    }

    pub fn register(&self, register: u8) -> u8 {
        self.regs.borrow()[register as usize]
    }

    /// Fail the n-th write (1-based) with a NACK; it is logged but not applied
    pub fn fail_on_write(&self, n: usize) {
        self.fail_write.set(Some(n));
    }

    pub fn fail_reads(&self) {
        self.fail_reads.set(true);
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.log.borrow().clone()
    }

    /// Only the writes, as (register, value) pairs
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|t| match t {
                Transaction::WriteByte { register, value, .. } => Some((*register, *value)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_transactions(&self) {
        self.log.borrow_mut().clear();
    }
}

impl RegisterBus for MockBus {
    type Error = BusError;

    fn read_byte(&self, address: u8, register: u8) -> Result<u8, BusError> {
        self.log.borrow_mut().push(Transaction::ReadByte { address, register });
        if self.fail_reads.get() {
            return Err(BusError::Nack { address });
        }
        Ok(self.register(register))
    }

    fn write_byte(&self, address: u8, register: u8, value: u8) -> Result<(), BusError> {
        self.log.borrow_mut().push(Transaction::WriteByte {
            address,
            register,
            value,
        });
        let n = self.writes.get() + 1;
        self.writes.set(n);
        if self.fail_write.get() == Some(n) {
            return Err(BusError::Nack { address });
        }
        self.set_register(register, value);
        Ok(())
    }

    fn read_bytes(&self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), BusError> {
        self.log.borrow_mut().push(Transaction::ReadBytes {
            address,
            register,
            len: buffer.len(),
        });
        if self.fail_reads.get() {
            return Err(BusError::Nack { address });
        }
        let regs = self.regs.borrow();
        let start = (register & 0x7F) as usize;
        for (i, b) in buffer.iter_mut().enumerate() {
            *b = regs[(start + i) & 0xFF];
        }
        Ok(())
    }
}
