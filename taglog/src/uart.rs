//! Serial port access with bounded blocking reads.
//!
//! [`UartBus`] is the hardware driver, [`UartDevice`] the handle components talk to. Reads on a
//! device wait for the requested number of bytes by polling the driver, and give up after
//! [`READ_TIMEOUT_MS`]. Writes are fire-and-forget.

use core::fmt;

use crate::transport::Transport;

/// How long a read waits for its bytes before giving up, in milliseconds.
pub const READ_TIMEOUT_MS: u32 = 1000;

/// A free-running millisecond counter.
///
/// The counter may wrap; elapsed time is computed with wrapping arithmetic.
pub trait Clock {
    /// Returns the current time in milliseconds.
    fn millis(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn millis(&self) -> u32 {
        (**self).millis()
    }
}

/// A UART driver.
pub trait UartBus {
    /// Queues `bytes` for transmission.
    fn write_bytes(&mut self, bytes: &[u8]);

    /// Takes the next received byte, if any.
    fn read_byte(&mut self) -> Option<u8>;

    /// Returns the next received byte without consuming it.
    fn peek_byte(&mut self) -> Option<u8>;

    /// Moves up to `buffer.len()` received bytes into `buffer`, returning how many were moved.
    fn read_into(&mut self, buffer: &mut [u8]) -> usize;

    /// Returns the number of received bytes waiting to be read.
    fn available(&self) -> usize;

    /// Blocks until all queued bytes have been transmitted.
    fn flush(&mut self);
}

/// A read gave up waiting for data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTimeout {
    /// Bytes the read asked for.
    pub requested: usize,
    /// Bytes that had arrived when the read gave up.
    pub available: usize,
}

impl fmt::Display for ReadTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timed out after {READ_TIMEOUT_MS} ms waiting for {} bytes, {} available",
            self.requested, self.available
        )
    }
}

impl core::error::Error for ReadTimeout {}

impl embedded_io::Error for ReadTimeout {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::TimedOut
    }
}

/// A component's handle on a UART bus.
///
/// ```rust
/// use taglog::uart::{Clock, UartBus, UartDevice};
///
/// struct Loopback(Vec<u8>);
///
/// impl UartBus for Loopback {
///     fn write_bytes(&mut self, bytes: &[u8]) { self.0.extend_from_slice(bytes) }
///     fn read_byte(&mut self) -> Option<u8> { (!self.0.is_empty()).then(|| self.0.remove(0)) }
///     fn peek_byte(&mut self) -> Option<u8> { self.0.first().copied() }
///     fn read_into(&mut self, buffer: &mut [u8]) -> usize {
///         let count = buffer.len().min(self.0.len());
///         buffer[..count].copy_from_slice(&self.0[..count]);
///         self.0.drain(..count);
///         count
///     }
///     fn available(&self) -> usize { self.0.len() }
///     fn flush(&mut self) {}
/// }
///
/// struct Frozen;
///
/// impl Clock for Frozen {
///     fn millis(&self) -> u32 { 0 }
/// }
///
/// let mut device = UartDevice::new(Loopback(Vec::new()), Frozen);
/// device.write_str("AT");
/// let mut reply = [0; 2];
/// device.read_array(&mut reply)?;
/// assert_eq!(&reply, b"AT");
/// # Ok::<(), taglog::uart::ReadTimeout>(())
/// ```
#[derive(Debug)]
pub struct UartDevice<B, C> {
    bus: B,
    clock: C,
}

impl<B: UartBus, C: Clock> UartDevice<B, C> {
    /// Creates a device on `bus`, timing reads with `clock`.
    pub fn new(bus: B, clock: C) -> Self {
        Self { bus, clock }
    }

    /// Returns the underlying driver.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Returns the underlying driver mutably.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Returns the driver and the clock.
    pub fn into_inner(self) -> (B, C) {
        (self.bus, self.clock)
    }

    /// Writes a single byte.
    pub fn write_byte(&mut self, byte: u8) {
        self.bus.write_bytes(&[byte]);
    }

    /// Writes `bytes`.
    pub fn write_array(&mut self, bytes: &[u8]) {
        self.bus.write_bytes(bytes);
    }

    /// Writes `text`.
    pub fn write_str(&mut self, text: &str) {
        self.bus.write_bytes(text.as_bytes());
    }

    /// Writes `text` followed by `"\r\n"`.
    pub fn println(&mut self, text: &str) {
        self.write_str(text);
        self.bus.write_bytes(b"\r\n");
    }

    /// Reads one byte, waiting for it if necessary.
    pub fn read_byte(&mut self) -> Result<u8, ReadTimeout> {
        self.wait_for(1)?;
        self.bus.read_byte().ok_or(ReadTimeout {
            requested: 1,
            available: 0,
        })
    }

    /// Returns the next byte without consuming it, waiting for it if necessary.
    pub fn peek_byte(&mut self) -> Result<u8, ReadTimeout> {
        self.wait_for(1)?;
        self.bus.peek_byte().ok_or(ReadTimeout {
            requested: 1,
            available: 0,
        })
    }

    /// Fills `buffer` completely, waiting for enough bytes to arrive first.
    ///
    /// Nothing is consumed if the wait times out.
    pub fn read_array(&mut self, buffer: &mut [u8]) -> Result<(), ReadTimeout> {
        self.wait_for(buffer.len())?;
        let read = self.bus.read_into(buffer);
        if read < buffer.len() {
            return Err(ReadTimeout {
                requested: buffer.len(),
                available: read,
            });
        }
        Ok(())
    }

    /// Returns the number of received bytes waiting to be read.
    pub fn available(&self) -> usize {
        self.bus.available()
    }

    /// Blocks until all written bytes have been transmitted.
    pub fn flush(&mut self) {
        self.bus.flush();
    }

    /// Spins until `len` bytes are available or [`READ_TIMEOUT_MS`] have passed.
    fn wait_for(&self, len: usize) -> Result<(), ReadTimeout> {
        let start = self.clock.millis();
        loop {
            let available = self.bus.available();
            if available >= len {
                return Ok(());
            }
            if self.clock.millis().wrapping_sub(start) > READ_TIMEOUT_MS {
                return Err(ReadTimeout {
                    requested: len,
                    available,
                });
            }
            core::hint::spin_loop();
        }
    }
}

impl<B: UartBus, C: Clock> Transport for UartDevice<B, C> {
    fn write_line(&mut self, line: &str) {
        self.println(line);
    }
}

impl<B, C> embedded_io::ErrorType for UartDevice<B, C> {
    type Error = ReadTimeout;
}

impl<B: UartBus, C: Clock> embedded_io::Read for UartDevice<B, C> {
    /// Waits for at least one byte, then reads whatever has arrived.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.wait_for(1)?;
        Ok(self.bus.read_into(buf))
    }
}

impl<B: UartBus, C: Clock> embedded_io::Write for UartDevice<B, C> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.bus.write_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.bus.flush();
        Ok(())
    }
}

/// A [`Clock`] counting milliseconds since its creation.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Starts a clock at zero.
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn millis(&self) -> u32 {
        // Truncation is the wrap-around.
        self.start.elapsed().as_millis() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, READ_TIMEOUT_MS, ReadTimeout, UartBus, UartDevice};
    use crate::transport::Transport;
    use core::cell::Cell;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::vec::Vec;

    #[derive(Debug, Default)]
    struct FakeBus {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
        flushes: usize,
    }

    impl FakeBus {
        fn receiving(bytes: &[u8]) -> Self {
            Self {
                rx: bytes.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    impl UartBus for FakeBus {
        fn write_bytes(&mut self, bytes: &[u8]) {
            self.tx.extend_from_slice(bytes);
        }

        fn read_byte(&mut self) -> Option<u8> {
            self.rx.pop_front()
        }

        fn peek_byte(&mut self) -> Option<u8> {
            self.rx.front().copied()
        }

        fn read_into(&mut self, buffer: &mut [u8]) -> usize {
            let count = buffer.len().min(self.rx.len());
            for (slot, byte) in buffer.iter_mut().zip(self.rx.drain(..count)) {
                *slot = byte;
            }
            count
        }

        fn available(&self) -> usize {
            self.rx.len()
        }

        fn flush(&mut self) {
            self.flushes += 1;
        }
    }

    /// Advances by `step` ms on every reading.
    #[derive(Debug)]
    struct FakeClock {
        now: Cell<u32>,
        step: u32,
    }

    impl FakeClock {
        fn starting_at(now: u32, step: u32) -> Self {
            Self {
                now: Cell::new(now),
                step,
            }
        }

        fn readings(&self, start: u32) -> u32 {
            self.now.get().wrapping_sub(start) / self.step
        }
    }

    impl Clock for FakeClock {
        fn millis(&self) -> u32 {
            let now = self.now.get();
            self.now.set(now.wrapping_add(self.step));
            now
        }
    }

    #[test]
    fn writes_reach_the_bus() {
        let mut device = UartDevice::new(FakeBus::default(), FakeClock::starting_at(0, 1));
        device.write_byte(b'>');
        device.write_array(&[0x01, 0x02]);
        device.write_str("ok");
        device.println("done");
        device.flush();

        assert_eq!(device.bus().tx, b">\x01\x02okdone\r\n");
        assert_eq!(device.bus().flushes, 1);
    }

    #[test]
    fn transport_writes_terminated_lines() {
        let mut device = UartDevice::new(FakeBus::default(), FakeClock::starting_at(0, 1));
        device.write_line("[I][app]: up");

        assert_eq!(device.bus().tx, b"[I][app]: up\r\n");
    }

    #[test]
    fn reads_available_data() {
        let mut device =
            UartDevice::new(FakeBus::receiving(b"abcd"), FakeClock::starting_at(0, 1));

        assert_eq!(device.peek_byte(), Ok(b'a'));
        assert_eq!(device.read_byte(), Ok(b'a'));

        let mut buffer = [0; 3];
        assert_eq!(device.read_array(&mut buffer), Ok(()));
        assert_eq!(&buffer, b"bcd");
        assert_eq!(device.available(), 0);
    }

    #[test]
    fn read_times_out_without_data() {
        let mut device = UartDevice::new(FakeBus::default(), FakeClock::starting_at(0, 10));

        assert_eq!(
            device.read_byte(),
            Err(ReadTimeout {
                requested: 1,
                available: 0
            })
        );
        let (_, clock) = device.into_inner();
        // One reading for the start, then polls until more than the timeout has elapsed.
        assert_eq!(clock.readings(0), READ_TIMEOUT_MS / 10 + 2);
    }

    #[test]
    fn short_read_leaves_data_in_place() {
        let mut device =
            UartDevice::new(FakeBus::receiving(b"xy"), FakeClock::starting_at(0, 100));

        let mut buffer = [0; 4];
        assert_eq!(
            device.read_array(&mut buffer),
            Err(ReadTimeout {
                requested: 4,
                available: 2
            })
        );
        assert_eq!(device.available(), 2);
        assert_eq!(buffer, [0; 4]);
    }

    #[test]
    fn timeout_survives_clock_wrap() {
        let mut device =
            UartDevice::new(FakeBus::default(), FakeClock::starting_at(u32::MAX - 50, 100));

        assert!(device.peek_byte().is_err());
        let (_, clock) = device.into_inner();
        assert_eq!(clock.readings(u32::MAX - 50), READ_TIMEOUT_MS / 100 + 2);
    }

    #[test]
    fn embedded_io_read_returns_what_arrived() {
        use embedded_io::Read;

        let mut device =
            UartDevice::new(FakeBus::receiving(b"hi"), FakeClock::starting_at(0, 1));
        let mut buffer = [0; 8];

        assert_eq!(device.read(&mut buffer), Ok(2));
        assert_eq!(&buffer[..2], b"hi");
        assert_eq!(device.read(&mut []), Ok(0));
    }

    #[test]
    fn timeout_kind() {
        use embedded_io::Error;

        let error = ReadTimeout {
            requested: 3,
            available: 1,
        };
        assert_eq!(error.kind(), embedded_io::ErrorKind::TimedOut);
        assert_eq!(
            std::format!("{error}"),
            "timed out after 1000 ms waiting for 3 bytes, 1 available"
        );
    }
}
