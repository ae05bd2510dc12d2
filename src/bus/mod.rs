use std::io;

use crate::frame::Message;

mod linux;

// OS-specific. for now linux only.
pub use self::linux::{
	I2cDevice,
	open_i2c_device,
};

/// Combined-transaction primitive of the bus.
///
/// All messages go to `peer` in order as a single exchange (repeated start
/// between them); `Message::Read` buffers get filled by the peer. The whole
/// submission either completes or fails as a unit.
pub trait Transport {
	fn transfer(&mut self, peer: u8, messages: &mut [Message]) -> io::Result<()>;
}

impl<'a, T: ?Sized + Transport> Transport for &'a mut T {
	fn transfer(&mut self, peer: u8, messages: &mut [Message]) -> io::Result<()> {
		T::transfer(*self, peer, messages)
	}
}
