use std::collections::VecDeque;

use taglog::uart::{StdClock, UartBus, UartDevice};
use taglog::{Logger, Severity, Transport};

/// A bus that receives everything it transmits and echoes transmissions to stdout.
#[derive(Debug, Default)]
struct Loopback {
    rx: VecDeque<u8>,
}

impl UartBus for Loopback {
    fn write_bytes(&mut self, bytes: &[u8]) {
        print!("{}", String::from_utf8_lossy(bytes));
        self.rx.extend(bytes);
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

    fn flush(&mut self) {}
}

fn main() {
    let device = UartDevice::new(Loopback::default(), StdClock::new());
    let mut logger = Logger::with_transport(device, 64);
    logger.set_global_level(Severity::Verbose);

    logger
        .log(Severity::Info, "uart", "baud %u, %d data bits", &[115_200u32.into(), 8.into()])
        .unwrap();

    let device = logger.transport_mut().unwrap();
    device.write_line("raw line");

    let mut reader = UartDevice::new(Loopback::default(), StdClock::new());
    match reader.read_byte() {
        Ok(byte) => println!("unexpected byte {byte:#04x}"),
        Err(error) => println!("{error}"),
    }
}
