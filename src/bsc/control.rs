use std::fmt;

/*
bscXfer control word (pigpio), bits 0-13 are copied to the BSC CR register:

22 21 20 19 18 17 16 15 14 13 12 11 10 09 08 07 06 05 04 03 02 01 00
a  a  a  a  a  a  a  -  -  IT HC TF IR RE TE BK EC ES PL PH I2 SP EN
*/

const BSC_ENABLE:          u32 = 0x0000_0001; // EN
const BSC_SPI:             u32 = 0x0000_0002; // SP
const BSC_I2C:             u32 = 0x0000_0004; // I2
const BSC_BREAK:           u32 = 0x0000_0080; // BK: abort and clear FIFOs
const BSC_TRANSMIT_ENABLE: u32 = 0x0000_0100; // TE
const BSC_RECEIVE_ENABLE:  u32 = 0x0000_0200; // RE
const BSC_ADDRESS_SHIFT: u8 = 16;
const BSC_ADDRESS_MASK:    u32 = 0x007f_0000;

/// 7-bit addresses only
pub const MAX_SLAVE_ADDRESS: u8 = 0x7f;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BscControl(pub u32);

impl BscControl {
	fn with_address(address: u8) -> Self {
		BscControl(((address as u32) << BSC_ADDRESS_SHIFT) & BSC_ADDRESS_MASK)
	}

	/// I2C slave on `address` with receive and transmit enabled
	pub fn open(address: u8) -> Self {
		let mut c = Self::with_address(address);
		c.0 |= BSC_RECEIVE_ENABLE | BSC_TRANSMIT_ENABLE | BSC_I2C | BSC_ENABLE;
		c
	}

	/// abort operation and disable the slave on `address`
	pub fn close(address: u8) -> Self {
		let mut c = Self::with_address(address);
		c.0 |= BSC_BREAK;
		c
	}

	pub fn address(&self) -> u8 {
		((self.0 & BSC_ADDRESS_MASK) >> BSC_ADDRESS_SHIFT) as u8
	}

	pub fn is_enabled(&self) -> bool {
		0 != self.0 & BSC_ENABLE
	}
	pub fn is_spi(&self) -> bool {
		0 != self.0 & BSC_SPI
	}
	pub fn is_i2c(&self) -> bool {
		0 != self.0 & BSC_I2C
	}
	pub fn is_break(&self) -> bool {
		0 != self.0 & BSC_BREAK
	}
	pub fn is_transmit_enabled(&self) -> bool {
		0 != self.0 & BSC_TRANSMIT_ENABLE
	}
	pub fn is_receive_enabled(&self) -> bool {
		0 != self.0 & BSC_RECEIVE_ENABLE
	}
}

impl fmt::Display for BscControl {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:08x}", self.0)
	}
}

impl fmt::Debug for BscControl {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:08x} (address: 0x{:02x}", self.0, self.address())?;
		if self.is_enabled() { write!(f, " [EN]")?; }
		if self.is_spi() { write!(f, " [SP]")?; }
		if self.is_i2c() { write!(f, " [I2]")?; }
		if self.is_break() { write!(f, " [BK]")?; }
		if self.is_transmit_enabled() { write!(f, " [TE]")?; }
		if self.is_receive_enabled() { write!(f, " [RE]")?; }
		write!(f, ")")
	}
}

#[cfg(test)]
mod test {
	use super::BscControl;

	#[test]
	fn open_word() {
		let c = BscControl::open(0x44);
		assert_eq!(c.0, 0x0044_0305);
		assert_eq!(c.address(), 0x44);
		assert!(c.is_enabled() && c.is_i2c() && c.is_receive_enabled() && c.is_transmit_enabled());
		assert!(!c.is_break() && !c.is_spi());
	}

	#[test]
	fn close_word() {
		let c = BscControl::close(0x44);
		assert_eq!(c.0, 0x0044_0080);
		assert!(c.is_break());
		assert!(!c.is_enabled() && !c.is_i2c());
	}

	#[test]
	fn address_is_seven_bits() {
		assert_eq!(BscControl::open(0xff).address(), 0x7f);
		assert_eq!(BscControl::close(0x00).0, 0x0000_0080);
	}

	#[test]
	fn debug_output() {
		assert_eq!(format!("{:?}", BscControl::close(0x10)), "0x00100080 (address: 0x10 [BK])");
	}
}
