//! Peripheral side of the two-phase register protocol.
//!
//! The bus hands us inbound frames one by one with no correlation between
//! them, so the peripheral tracks which phase it expects next:
//! - a control frame `[register address, direction, length]`; read requests
//!   are answered right away (the reply is staged for the controller's read
//!   message), write requests move on to the data phase
//! - the data frame of a pending write, copied into the register store
//!
//! A write whose data phase never arrives leaves the peripheral waiting; the
//! next inbound frame (whatever it is) completes the write.

use crate::frame::{
	ControlFrame,
	Direction,
};
use crate::registers::{
	IDENTITY_ADDRESS,
	RegisterStore,
};

mod session;

pub use self::session::{
	Session,
	serve,
	serve_once,
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ProtocolState {
	AwaitingControl,
	AwaitingDataCompletion {
		address: u8,
		length: u8,
	},
}

impl Default for ProtocolState {
	fn default() -> Self {
		ProtocolState::AwaitingControl
	}
}

#[derive(Debug)]
pub struct Peripheral {
	bus_address: u8,
	registers: RegisterStore,
	state: ProtocolState,
}

impl Peripheral {
	pub fn new(bus_address: u8) -> Self {
		Peripheral {
			bus_address,
			registers: RegisterStore::new(),
			state: ProtocolState::AwaitingControl,
		}
	}

	pub fn bus_address(&self) -> u8 {
		self.bus_address
	}

	pub fn registers(&self) -> &RegisterStore {
		&self.registers
	}

	pub fn state(&self) -> ProtocolState {
		self.state
	}

	/// Process one inbound frame; returns the reply to stage, if any.
	///
	/// Empty frames are ignored.
	pub fn handle_frame(&mut self, frame: &[u8]) -> Option<Vec<u8>> {
		if frame.is_empty() {
			return None;
		}

		match self.state {
			ProtocolState::AwaitingControl => self.handle_control(frame),
			ProtocolState::AwaitingDataCompletion { address, length } => {
				self.complete_write(address, length, frame);
				None
			},
		}
	}

	fn handle_control(&mut self, frame: &[u8]) -> Option<Vec<u8>> {
		let control = match ControlFrame::parse(frame) {
			Some(c) => c,
			None => {
				warn!("Ignoring short control frame: {:02x?}", frame);
				return None;
			}
		};

		match control.direction {
			Direction::Read if control.address == IDENTITY_ADDRESS => {
				debug!("Identity query, replying 0x{:02x}", self.bus_address);
				Some(vec![self.bus_address])
			},
			Direction::Read => {
				let reply = self.registers.read(control.address, control.length as usize);
				debug!("Copying {} registers from 0x{:02x} to controller", reply.len(), control.address);
				for (i, value) in reply.iter().enumerate() {
					trace!("[0x{:02x}] value = 0x{:02x}", control.address as usize + i, value);
				}
				Some(reply)
			},
			Direction::Write => {
				debug!("Expecting {} bytes for register 0x{:02x}", control.length, control.address);
				self.state = ProtocolState::AwaitingDataCompletion {
					address: control.address,
					length: control.length,
				};
				None
			},
		}
	}

	fn complete_write(&mut self, address: u8, length: u8, frame: &[u8]) {
		let data = &frame[..frame.len().min(length as usize)];
		if data.len() < length as usize {
			warn!("Write to 0x{:02x}: expected {} bytes, got {}", address, length, data.len());
		}
		let stored = self.registers.write(address, data);
		debug!("Writing to 0x{:02x} register in length of {} bytes", address, stored);
		trace!("Registers:\n{:?}", self.registers);
		self.state = ProtocolState::AwaitingControl;
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::registers::REGISTER_COUNT;

	fn write(p: &mut Peripheral, address: u8, data: &[u8]) {
		assert_eq!(p.handle_frame(&[address, 0, data.len() as u8]), None);
		assert_eq!(p.handle_frame(data), None);
	}

	fn read(p: &mut Peripheral, address: u8, length: u8) -> Vec<u8> {
		p.handle_frame(&[address, 1, length]).expect("read must stage a reply")
	}

	#[test]
	fn starts_awaiting_control() {
		let p = Peripheral::new(0x44);
		assert_eq!(p.state(), ProtocolState::AwaitingControl);
		assert_eq!(p.registers(), &RegisterStore::new());
	}

	#[test]
	fn write_control_then_data() {
		let mut p = Peripheral::new(0x44);
		assert_eq!(p.handle_frame(&[0x08, 0x00, 0x03]), None);
		assert_eq!(p.state(), ProtocolState::AwaitingDataCompletion { address: 0x08, length: 3 });
		assert_eq!(p.handle_frame(&[0xa1, 0xa2, 0xa3]), None);
		assert_eq!(p.state(), ProtocolState::AwaitingControl);

		let regs = p.registers().as_bytes();
		assert_eq!(&regs[0x08..0x0b], &[0xa1, 0xa2, 0xa3]);
		assert!(regs[..0x08].iter().all(|&b| b == 0));
		assert!(regs[0x0b..].iter().all(|&b| b == 0));
	}

	#[test]
	fn read_completes_without_data_phase() {
		let mut p = Peripheral::new(0x44);
		write(&mut p, 0, &[1, 2, 3, 4]);
		assert_eq!(read(&mut p, 0, 4), vec![1, 2, 3, 4]);
		assert_eq!(p.state(), ProtocolState::AwaitingControl);
		assert_eq!(read(&mut p, 2, 2), vec![3, 4]);
	}

	#[test]
	fn round_trip_everywhere() {
		let mut p = Peripheral::new(0x44);
		for address in 0..REGISTER_COUNT as u8 {
			let length = REGISTER_COUNT as u8 - address;
			let data: Vec<u8> = (0..length).map(|i| address ^ i.wrapping_mul(7)).collect();
			write(&mut p, address, &data);
			assert_eq!(read(&mut p, address, length), data);
		}
	}

	#[test]
	fn overflowing_write_is_truncated() {
		let mut p = Peripheral::new(0x44);
		write(&mut p, 60, &[1, 2, 3, 4, 5, 6, 7, 8]);
		assert_eq!(&p.registers().as_bytes()[60..], &[1, 2, 3, 4]);
		assert_eq!(read(&mut p, 60, 8), vec![1, 2, 3, 4]);
		assert_eq!(p.state(), ProtocolState::AwaitingControl);
	}

	#[test]
	fn identity_read_does_not_touch_store() {
		let mut p = Peripheral::new(0x44);
		write(&mut p, 0, &[0x99; 64]);
		assert_eq!(read(&mut p, IDENTITY_ADDRESS, 1), vec![0x44]);
		// length is ignored for identity queries
		assert_eq!(read(&mut p, IDENTITY_ADDRESS, 8), vec![0x44]);
	}

	#[test]
	fn identity_survives_write_to_identity_address() {
		let mut p = Peripheral::new(0x23);
		write(&mut p, IDENTITY_ADDRESS, &[0x55]);
		assert_eq!(p.state(), ProtocolState::AwaitingControl);
		assert_eq!(p.registers(), &RegisterStore::new());
		assert_eq!(read(&mut p, IDENTITY_ADDRESS, 1), vec![0x23]);
	}

	#[test]
	fn empty_frames_are_ignored() {
		let mut p = Peripheral::new(0x44);
		assert_eq!(p.handle_frame(&[]), None);
		assert_eq!(p.state(), ProtocolState::AwaitingControl);

		p.handle_frame(&[0x00, 0x00, 0x02]);
		assert_eq!(p.handle_frame(&[]), None);
		assert_eq!(p.state(), ProtocolState::AwaitingDataCompletion { address: 0, length: 2 });
	}

	#[test]
	fn short_control_frame_is_ignored() {
		let mut p = Peripheral::new(0x44);
		assert_eq!(p.handle_frame(&[0x00, 0x01]), None);
		assert_eq!(p.state(), ProtocolState::AwaitingControl);
	}

	#[test]
	fn short_data_frame_writes_what_arrived() {
		let mut p = Peripheral::new(0x44);
		p.handle_frame(&[0x10, 0x00, 0x04]);
		p.handle_frame(&[0xaa, 0xbb]);
		assert_eq!(p.state(), ProtocolState::AwaitingControl);
		assert_eq!(read(&mut p, 0x10, 4), vec![0xaa, 0xbb, 0x00, 0x00]);
	}

	#[test]
	fn long_data_frame_writes_announced_length() {
		let mut p = Peripheral::new(0x44);
		p.handle_frame(&[0x10, 0x00, 0x02]);
		p.handle_frame(&[0xaa, 0xbb, 0xcc]);
		assert_eq!(read(&mut p, 0x10, 3), vec![0xaa, 0xbb, 0x00]);
	}

	#[test]
	fn missing_data_phase_keeps_waiting() {
		// no timeout: the pending write stays open indefinitely
		let mut p = Peripheral::new(0x44);
		p.handle_frame(&[0x05, 0x00, 0x01]);
		for _ in 0..1000 {
			assert_eq!(p.handle_frame(&[]), None);
		}
		assert_eq!(p.state(), ProtocolState::AwaitingDataCompletion { address: 0x05, length: 1 });
	}

	#[test]
	fn back_to_back_write_controls_are_taken_as_data() {
		// known protocol hazard: the second control frame becomes write data
		let mut p = Peripheral::new(0x44);
		p.handle_frame(&[0x00, 0x00, 0x03]);
		p.handle_frame(&[0x20, 0x00, 0x02]);
		assert_eq!(p.state(), ProtocolState::AwaitingControl);
		assert_eq!(&p.registers().as_bytes()[..3], &[0x20, 0x00, 0x02]);

		// the real data frame is now parsed as a control frame
		assert_eq!(p.handle_frame(&[0x11, 0x22]), None);
		assert_eq!(p.state(), ProtocolState::AwaitingControl);
		assert!(p.registers().as_bytes()[0x20..0x22].iter().all(|&b| b == 0));
	}

	#[test]
	fn nonzero_direction_is_read() {
		let mut p = Peripheral::new(0x44);
		write(&mut p, 0, &[0x42]);
		assert_eq!(p.handle_frame(&[0x00, 0x80, 0x01]), Some(vec![0x42]));
		assert_eq!(p.state(), ProtocolState::AwaitingControl);
	}
}
