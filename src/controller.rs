use crate::bus::Transport;
use crate::error::Error;
use crate::frame::{
	self,
	Transaction,
};

/// Register access to one peripheral through a bus transport
pub struct Controller<T: Transport> {
	transport: T,
	peer: u8,
}

impl<T: Transport> Controller<T> {
	pub fn new(transport: T, peer: u8) -> Self {
		Controller { transport, peer }
	}

	pub fn peer(&self) -> u8 {
		self.peer
	}

	pub fn transport(&mut self) -> &mut T {
		&mut self.transport
	}

	pub fn release(self) -> T {
		self.transport
	}

	fn submit(&mut self, tx: &mut Transaction) -> Result<(), Error> {
		let peer = self.peer;
		debug!("peer 0x{:02x}: {:?}", peer, tx.control());
		self.transport.transfer(peer, tx.messages_mut()).map_err(|cause| {
			Error::TransportFailure { peer, cause }
		})
	}

	/// Read `length` registers starting at `address`.
	///
	/// A length reaching past the last register is clamped (with a warning);
	/// the result is then shorter than requested.
	pub fn read(&mut self, address: u8, length: usize) -> Result<Vec<u8>, Error> {
		let mut tx = frame::encode_read(address, length)?;
		self.submit(&mut tx)?;
		Ok(tx.reply().unwrap_or_default())
	}

	/// Write the first `length` bytes of `data` starting at register
	/// `address`; returns the number of registers written (after clamping).
	pub fn write(&mut self, address: u8, length: usize, data: &[u8]) -> Result<usize, Error> {
		let mut tx = frame::encode_write(address, length, data)?;
		self.submit(&mut tx)?;
		Ok(tx.length())
	}

	/// Ask the peripheral for its bus address.
	pub fn identity_query(&mut self) -> Result<u8, Error> {
		let mut tx = frame::encode_identity_query();
		self.submit(&mut tx)?;
		// the receive buffer always covers the offset plus one byte
		Ok(tx.reply().and_then(|r| r.first().cloned()).unwrap_or(0))
	}
}
