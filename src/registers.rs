use std::fmt;

/// Number of addressable registers
pub const REGISTER_COUNT: usize = 64;

/// Virtual register: reading it yields the peripheral's own bus address.
/// It is never backed by the store.
pub const IDENTITY_ADDRESS: u8 = 0xff;

/// The peripheral's register file.
///
/// Accesses reaching past the last register are truncated to the in-range
/// tail; nothing here ever fails. The controller may already have clamped the
/// length, but frames from a misbehaving controller land here unfiltered.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterStore {
	cells: [u8; REGISTER_COUNT],
}

impl Default for RegisterStore {
	fn default() -> Self {
		RegisterStore::new()
	}
}

impl RegisterStore {
	pub fn new() -> Self {
		RegisterStore {
			cells: [0u8; REGISTER_COUNT],
		}
	}

	// in-range span starting at `address`, at most `length` long
	fn span(address: u8, length: usize) -> std::ops::Range<usize> {
		let start = (address as usize).min(REGISTER_COUNT);
		let end = start + length.min(REGISTER_COUNT - start);
		start..end
	}

	pub fn read(&self, address: u8, length: usize) -> Vec<u8> {
		self.cells[Self::span(address, length)].to_vec()
	}

	/// Returns the number of bytes actually stored.
	pub fn write(&mut self, address: u8, data: &[u8]) -> usize {
		let span = Self::span(address, data.len());
		let len = span.len();
		self.cells[span].copy_from_slice(&data[..len]);
		len
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.cells
	}
}

impl fmt::Debug for RegisterStore {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, row) in self.cells.chunks(16).enumerate() {
			write!(f, "{:02x}:", i * 16)?;
			for b in row {
				write!(f, " {:02x}", b)?;
			}
			if i * 16 + 16 < REGISTER_COUNT {
				writeln!(f)?;
			}
		}
		Ok(())
	}
}
