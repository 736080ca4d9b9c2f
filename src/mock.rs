// Scripted serial port and simulated time for driver tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{ErrorKind, ErrorType, Read, ReadReady, Write};

use crate::{checksum, Clock};

/// Simulated monotonic time, shared between the clock and the delay.
#[derive(Clone, Default)]
pub struct SimTime {
    now_us: Rc<Cell<u64>>,
}

impl SimTime {
    pub fn advance_ms(&self, ms: u64) {
        self.now_us.set(self.now_us.get() + ms * 1_000);
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay(self.clone())
    }
}

impl Clock for SimTime {
    fn now_ms(&self) -> u64 {
        self.now_us.get() / 1_000
    }
}

pub struct SimDelay(SimTime);

impl DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        let now = &self.0.now_us;
        now.set(now.get() + u64::from(ns) / 1_000);
    }
}

#[derive(Default)]
struct Inner {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    replies: VecDeque<Vec<u8>>,
    answered_upto: usize,
    fail_writes: bool,
    max_chunk: Option<usize>,
    stuck: bool,
}

/// Serial port answering each flushed command with the next scripted reply.
#[derive(Clone, Default)]
pub struct MockSerial {
    inner: Rc<RefCell<Inner>>,
}

impl MockSerial {
    /// Queues raw bytes delivered after the next flushed command.
    pub fn reply_raw(&self, bytes: &[u8]) {
        self.inner.borrow_mut().replies.push_back(bytes.to_vec());
    }

    /// Queues a well-formed response to `code` carrying `data` in bytes 2 to 7.
    pub fn reply(&self, code: u8, data: [u8; 6]) {
        self.reply_raw(&response(code, data));
    }

    /// Puts bytes in the receive buffer right away, as a late reply would.
    pub fn inject(&self, bytes: &[u8]) {
        self.inner.borrow_mut().rx.extend(bytes.iter().copied());
    }

    /// Limits the number of bytes a single read returns.
    pub fn max_chunk(&self, bytes: usize) {
        self.inner.borrow_mut().max_chunk = Some(bytes);
    }

    /// Reports data ready forever while every read returns 0 bytes.
    pub fn stuck_at_eof(&self) {
        self.inner.borrow_mut().stuck = true;
    }

    pub fn fail_writes(&self) {
        self.inner.borrow_mut().fail_writes = true;
    }

    pub fn written(&self) -> Vec<u8> {
        self.inner.borrow().tx.clone()
    }

    pub fn pending_rx(&self) -> usize {
        self.inner.borrow().rx.len()
    }
}

/// Builds a valid response frame.
pub fn response(code: u8, data: [u8; 6]) -> [u8; 9] {
    let mut bytes = [0xFF, code, 0, 0, 0, 0, 0, 0, 0];
    bytes[2..8].copy_from_slice(&data);
    bytes[8] = checksum(&bytes[1..8]);
    bytes
}

impl ErrorType for MockSerial {
    type Error = ErrorKind;
}

impl Read for MockSerial {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut inner = self.inner.borrow_mut();
        if inner.stuck {
            return Ok(0);
        }
        let limit = inner.max_chunk.unwrap_or(usize::MAX);
        let n = buf.len().min(inner.rx.len()).min(limit);
        for slot in buf.iter_mut().take(n) {
            *slot = inner.rx.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}

impl ReadReady for MockSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        let inner = self.inner.borrow();
        Ok(inner.stuck || !inner.rx.is_empty())
    }
}

impl Write for MockSerial {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(ErrorKind::BrokenPipe);
        }
        inner.tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        let mut inner = self.inner.borrow_mut();
        if inner.tx.len() > inner.answered_upto {
            inner.answered_upto = inner.tx.len();
            if let Some(reply) = inner.replies.pop_front() {
                inner.rx.extend(reply);
            }
        }
        Ok(())
    }
}
