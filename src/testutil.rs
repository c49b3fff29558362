// Test-only bus + delay recorder.
//
// Logs every write, read and delay into one ordered list so tests can
// check where a delay falls relative to the traffic around it. Implements
// both the blocking and the async embedded-hal traits, so the same
// expectations apply to both driver flavours.

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::i2c::{ErrorType, Operation, SevenBitAddress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Write(u8, Vec<u8>),
    Read(u8, usize),
    DelayNs(u64),
}

impl Event {
    pub fn write(addr: u8, bytes: &[u8]) -> Self {
        Event::Write(addr, bytes.to_vec())
    }

    pub fn delay_ms(ms: u64) -> Self {
        Event::DelayNs(ms * 1_000_000)
    }
}

#[derive(Clone, Default)]
pub struct Recorder {
    log: Rc<RefCell<Vec<Event>>>,
    // bytes handed out for reads, front first
    replies: Rc<RefCell<Vec<u8>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: &[u8]) -> Self {
        let rec = Self::default();
        rec.replies.borrow_mut().extend_from_slice(replies);
        rec
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    fn record(&self, address: SevenBitAddress, operations: &mut [Operation<'_>]) {
        let mut log = self.log.borrow_mut();
        for op in operations {
            match op {
                Operation::Write(bytes) => log.push(Event::Write(address, bytes.to_vec())),
                Operation::Read(buf) => {
                    let mut replies = self.replies.borrow_mut();
                    for b in buf.iter_mut() {
                        *b = if replies.is_empty() { 0 } else { replies.remove(0) };
                    }
                    log.push(Event::Read(address, buf.len()));
                }
            }
        }
    }

    fn record_delay(&self, ns: u64) {
        self.log.borrow_mut().push(Event::DelayNs(ns));
    }
}

impl ErrorType for Recorder {
    type Error = Infallible;
}

impl embedded_hal::i2c::I2c for Recorder {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.record(address, operations);
        Ok(())
    }
}

impl embedded_hal::delay::DelayNs for Recorder {
    fn delay_ns(&mut self, ns: u32) {
        self.record_delay(ns as u64);
    }

    fn delay_us(&mut self, us: u32) {
        self.record_delay(us as u64 * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.record_delay(ms as u64 * 1_000_000);
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::i2c::I2c for Recorder {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.record(address, operations);
        Ok(())
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::delay::DelayNs for Recorder {
    async fn delay_ns(&mut self, ns: u32) {
        self.record_delay(ns as u64);
    }

    async fn delay_us(&mut self, us: u32) {
        self.record_delay(us as u64 * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.record_delay(ms as u64 * 1_000_000);
    }
}

// Drives a future to completion by busy polling. Every future in these
// tests completes without ever returning Pending for long.
#[cfg(feature = "async")]
pub fn block_on<F: core::future::Future>(fut: F) -> F::Output {
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};

    let mut fut = pin!(fut);
    let mut cx = Context::from_waker(Waker::noop());
    loop {
        if let Poll::Ready(out) = fut.as_mut().poll(&mut cx) {
            return out;
        }
    }
}
