//! In-process bus: a `Transport` that delivers frames straight to a
//! `Peripheral`, shifting read replies by `READ_OFFSET` like the BSC FIFO does.

use std::io;

use crate::bus::Transport;
use crate::frame::{
	Message,
	READ_OFFSET,
};
use crate::peripheral::Peripheral;

/// Value of the FIFO leftovers preceding a reply
pub const FIFO_FILL: u8 = 0x00;

pub struct Loopback {
	peripheral: Peripheral,
	staged: Vec<u8>,
	fail_next: bool,
	transfers: usize,
}

impl Loopback {
	pub fn new(peripheral: Peripheral) -> Self {
		Loopback {
			peripheral,
			staged: Vec::new(),
			fail_next: false,
			transfers: 0,
		}
	}

	pub fn peripheral(&self) -> &Peripheral {
		&self.peripheral
	}

	/// Make the next transfer fail before anything reaches the peripheral.
	pub fn fail_next_transfer(&mut self) {
		self.fail_next = true;
	}

	/// number of transfers that reached the peripheral
	pub fn transfers(&self) -> usize {
		self.transfers
	}

	fn fill_reply(&self, buf: &mut [u8]) {
		for (i, b) in buf.iter_mut().enumerate() {
			*b = if i < READ_OFFSET {
				FIFO_FILL
			} else {
				self.staged.get(i - READ_OFFSET).cloned().unwrap_or(0)
			};
		}
	}
}

impl Transport for Loopback {
	fn transfer(&mut self, peer: u8, messages: &mut [Message]) -> io::Result<()> {
		if self.fail_next {
			self.fail_next = false;
			return Err(io::Error::new(io::ErrorKind::Other, "injected transfer failure"));
		}
		if peer != self.peripheral.bus_address() {
			// what i2c-dev reports when nobody acks the address
			return Err(io::Error::from_raw_os_error(libc::ENXIO));
		}

		self.transfers += 1;
		for message in messages.iter_mut() {
			match message {
				Message::Write(data) => {
					if data.is_empty() {
						continue;
					}
					self.staged = self.peripheral.handle_frame(data).unwrap_or_default();
				},
				Message::Read(buf) => self.fill_reply(buf),
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::frame::{
		self,
		decode_read,
	};

	#[test]
	fn read_reply_is_shifted() {
		let mut bus = Loopback::new(Peripheral::new(0x44));
		let mut tx = frame::encode_write(0, 2, &[0x12, 0x34]).unwrap();
		bus.transfer(0x44, tx.messages_mut()).unwrap();

		let mut tx = frame::encode_read(0, 2).unwrap();
		bus.transfer(0x44, tx.messages_mut()).unwrap();
		let raw = tx.raw_reply().unwrap();
		assert_eq!(raw.len(), READ_OFFSET + 2);
		assert!(raw[..READ_OFFSET].iter().all(|&b| b == FIFO_FILL));
		assert_eq!(&raw[READ_OFFSET..], &[0x12, 0x34]);
		assert_eq!(decode_read(raw, 2), vec![0x12, 0x34]);
	}

	#[test]
	fn unknown_peer_fails() {
		let mut bus = Loopback::new(Peripheral::new(0x44));
		let mut tx = frame::encode_identity_query();
		let e = bus.transfer(0x45, tx.messages_mut()).unwrap_err();
		assert_eq!(e.raw_os_error(), Some(libc::ENXIO));
		assert_eq!(bus.transfers(), 0);
	}

	#[test]
	fn injected_failure_is_one_shot() {
		let mut bus = Loopback::new(Peripheral::new(0x44));
		bus.fail_next_transfer();
		let mut tx = frame::encode_identity_query();
		assert!(bus.transfer(0x44, tx.messages_mut()).is_err());
		assert!(bus.transfer(0x44, tx.messages_mut()).is_ok());
		assert_eq!(bus.transfers(), 1);
	}
}
