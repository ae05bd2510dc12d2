use std::fmt;
use std::io;

/// Errors for a single controller-side register operation
#[derive(Debug, Fail)]
pub enum Error {
	#[fail(display = "invalid register address 0x{:02x} (valid: 0x00..0x3f)", address)]
	InvalidAddress {
		address: u8,
	},

	#[fail(display = "invalid length {} for register 0x{:02x}: {}", length, address, reason)]
	InvalidLength {
		address: u8,
		length: usize,
		reason: &'static str,
	},

	#[fail(display = "bus transfer to peer 0x{:02x} failed: {}", peer, cause)]
	TransportFailure {
		peer: u8,
		#[fail(cause)]
		cause: io::Error,
	},
}

/// Not an error: a request reaching past the last register got clamped.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LengthOverflow {
	pub address: u8,
	pub requested: usize,
	pub effective: usize,
}

impl fmt::Display for LengthOverflow {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f,
			"length {} too big for register 0x{:02x}, only {} registers will be accessed",
			self.requested,
			self.address,
			self.effective,
		)
	}
}
