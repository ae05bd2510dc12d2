//! Controller side of the two-phase register protocol.
//!
//! Every transaction is a single combined bus exchange of two messages:
//! - a 3-byte control frame `[register address, direction, length]`
//!   (always written to the peripheral)
//! - a data frame: either the bytes to store (write) or a receive buffer
//!   (read)
//!
//! The peripheral's BSC FIFO hands out its reply shifted: the first
//! `READ_OFFSET` bytes a controller clocks in are leftovers, the staged reply
//! only starts after them. Reads therefore request `READ_OFFSET` extra bytes
//! and `decode_read` skips them.

use crate::error::{
	Error,
	LengthOverflow,
};
use crate::registers::{
	IDENTITY_ADDRESS,
	REGISTER_COUNT,
};

/// Number of junk bytes preceding the peripheral's reply in a read buffer
pub const READ_OFFSET: usize = 17;

pub const CONTROL_FRAME_LEN: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	/// controller writes to the peripheral
	Write,
	/// controller reads from the peripheral
	Read,
}

impl Direction {
	pub fn to_byte(self) -> u8 {
		match self {
			Direction::Write => 0,
			Direction::Read => 1,
		}
	}

	// anything but 0 is a read request
	pub fn from_byte(v: u8) -> Self {
		match v {
			0 => Direction::Write,
			_ => Direction::Read,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ControlFrame {
	pub address: u8,
	pub direction: Direction,
	pub length: u8,
}

impl ControlFrame {
	pub fn to_bytes(&self) -> [u8; CONTROL_FRAME_LEN] {
		[self.address, self.direction.to_byte(), self.length]
	}

	/// Interpret the start of an inbound frame; `None` if it is too short.
	pub fn parse(frame: &[u8]) -> Option<Self> {
		if frame.len() < CONTROL_FRAME_LEN {
			return None;
		}
		Some(ControlFrame {
			address: frame[0],
			direction: Direction::from_byte(frame[1]),
			length: frame[2],
		})
	}
}

/// One message of a combined bus transaction
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Message {
	/// bytes sent to the peer
	Write(Vec<u8>),
	/// buffer filled by the peer; its length is the number of bytes to clock in
	Read(Vec<u8>),
}

impl Message {
	pub fn len(&self) -> usize {
		match self {
			Message::Write(data) => data.len(),
			Message::Read(buf) => buf.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		0 == self.len()
	}
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
	control: ControlFrame,
	messages: Vec<Message>,
	overflow: Option<LengthOverflow>,
}

impl Transaction {
	fn new(control: ControlFrame, data: Message, overflow: Option<LengthOverflow>) -> Self {
		Transaction {
			control,
			messages: vec![Message::Write(control.to_bytes().to_vec()), data],
			overflow,
		}
	}

	pub fn control(&self) -> ControlFrame {
		self.control
	}

	/// number of registers this transaction actually covers
	pub fn length(&self) -> usize {
		self.control.length as usize
	}

	/// set if the requested length was clamped
	pub fn overflow(&self) -> Option<LengthOverflow> {
		self.overflow
	}

	pub fn messages(&self) -> &[Message] {
		&self.messages
	}

	pub fn messages_mut(&mut self) -> &mut [Message] {
		&mut self.messages
	}

	/// raw receive buffer of a read transaction (including the offset bytes)
	pub fn raw_reply(&self) -> Option<&[u8]> {
		match self.messages.last() {
			Some(Message::Read(buf)) => Some(buf),
			_ => None,
		}
	}

	/// decoded reply of a read transaction
	pub fn reply(&self) -> Option<Vec<u8>> {
		self.raw_reply().map(|raw| decode_read(raw, self.length()))
	}
}

// validate address and clamp length to the register file
fn check_range(address: u8, length: usize) -> Result<(u8, Option<LengthOverflow>), Error> {
	if address as usize >= REGISTER_COUNT {
		return Err(Error::InvalidAddress { address });
	}
	if 0 == length {
		return Err(Error::InvalidLength { address, length, reason: "nothing to transfer" });
	}

	let available = REGISTER_COUNT - address as usize;
	if length > available {
		let overflow = LengthOverflow {
			address,
			requested: length,
			effective: available,
		};
		warn!("{}", overflow);
		Ok((available as u8, Some(overflow)))
	} else {
		Ok((length as u8, None))
	}
}

pub fn encode_write(address: u8, length: usize, payload: &[u8]) -> Result<Transaction, Error> {
	let (effective, overflow) = check_range(address, length)?;
	if payload.len() < effective as usize {
		return Err(Error::InvalidLength { address, length, reason: "not enough data to write" });
	}

	let control = ControlFrame {
		address,
		direction: Direction::Write,
		length: effective,
	};
	let data = payload[..effective as usize].to_vec();
	Ok(Transaction::new(control, Message::Write(data), overflow))
}

pub fn encode_read(address: u8, length: usize) -> Result<Transaction, Error> {
	let (effective, overflow) = check_range(address, length)?;

	let control = ControlFrame {
		address,
		direction: Direction::Read,
		length: effective,
	};
	let buf = vec![0u8; effective as usize + READ_OFFSET];
	Ok(Transaction::new(control, Message::Read(buf), overflow))
}

pub fn encode_identity_query() -> Transaction {
	let control = ControlFrame {
		address: IDENTITY_ADDRESS,
		direction: Direction::Read,
		length: 1,
	};
	Transaction::new(control, Message::Read(vec![0u8; 1 + READ_OFFSET]), None)
}

/// Strip the FIFO leftovers from a read buffer.
///
/// Bytes before `READ_OFFSET` are transport artifacts, never data. A short
/// buffer yields only what it holds past the offset.
pub fn decode_read(raw: &[u8], length: usize) -> Vec<u8> {
	raw.iter().skip(READ_OFFSET).take(length).cloned().collect()
}
