use std::fs;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{
	Path,
	PathBuf,
};

use libc::{
	c_int,
	ioctl,
};

use super::Transport;
use crate::frame::Message;

/* see linux/i2c-dev.h and linux/i2c.h */
const I2C_RDWR: u16 = 0x0707;
const I2C_M_RD: u16 = 0x0001;
// I2C_RDWR_IOCTL_MAX_MSGS
const MAX_MESSAGES: usize = 42;

#[repr(C)]
#[derive(Debug)]
struct I2cMsg {
	addr: u16,
	flags: u16,
	len: u16,
	buf: *mut u8,
}

#[repr(C)]
#[derive(Debug)]
struct I2cRdwrIoctlData {
	msgs: *mut I2cMsg,
	nmsgs: u32,
}

// the returned messages borrow the buffers in `messages`
fn build_messages(peer: u8, messages: &mut [Message]) -> io::Result<Vec<I2cMsg>> {
	if messages.len() > MAX_MESSAGES {
		return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("too many messages in one transfer: {}", messages.len())));
	}

	let mut result = Vec::with_capacity(messages.len());
	for message in messages.iter_mut() {
		let (flags, buf) = match message {
			Message::Write(data) => (0, data),
			Message::Read(buf) => (I2C_M_RD, buf),
		};
		if buf.len() > u16::max_value() as usize {
			return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("message too long: {} bytes", buf.len())));
		}
		result.push(I2cMsg {
			addr: peer as u16,
			flags,
			len: buf.len() as u16,
			buf: buf.as_mut_ptr(),
		});
	}
	Ok(result)
}

/// Controller side of an i2c-dev character device (`/dev/i2c-N`)
#[derive(Debug)]
pub struct I2cDevice {
	file: fs::File,
	path: PathBuf,
}

impl I2cDevice {
	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl Transport for I2cDevice {
	fn transfer(&mut self, peer: u8, messages: &mut [Message]) -> io::Result<()> {
		let mut msgs = build_messages(peer, messages)?;
		let mut data = I2cRdwrIoctlData {
			msgs: msgs.as_mut_ptr(),
			nmsgs: msgs.len() as u32,
		};
		trace!("{}: I2C_RDWR to 0x{:02x}: {:?}", self.path.display(), peer, msgs);

		let res: c_int = unsafe {
			ioctl(self.file.as_raw_fd(), I2C_RDWR as _, &mut data as *mut I2cRdwrIoctlData)
		};
		if res < 0 {
			return Err(io::Error::last_os_error());
		}
		Ok(())
	}
}

// the device gets closed when the returned handle is dropped
pub fn open_i2c_device<P: AsRef<Path>>(path: P) -> io::Result<I2cDevice> {
	let path = path.as_ref();
	let file = fs::OpenOptions::new()
		.read(true)
		.write(true)
		.open(path)?;

	Ok(I2cDevice {
		file,
		path: path.to_path_buf(),
	})
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn message_flags_and_lengths() {
		let mut messages = vec![
			Message::Write(vec![0x05, 0x01, 0x02]),
			Message::Read(vec![0u8; 19]),
		];
		let msgs = build_messages(0x44, &mut messages).unwrap();
		assert_eq!(msgs.len(), 2);
		assert_eq!((msgs[0].addr, msgs[0].flags, msgs[0].len), (0x44, 0, 3));
		assert_eq!((msgs[1].addr, msgs[1].flags, msgs[1].len), (0x44, I2C_M_RD, 19));
	}

	#[test]
	fn message_points_into_buffer() {
		let mut messages = vec![Message::Read(vec![0u8; 4])];
		let msgs = build_messages(0x10, &mut messages).unwrap();
		match &messages[0] {
			Message::Read(buf) => assert_eq!(msgs[0].buf as *const u8, buf.as_ptr()),
			_ => unreachable!(),
		}
	}

	#[test]
	fn rejects_oversized_transfers() {
		let mut messages = vec![Message::Write(vec![0u8; 0x1_0000])];
		assert!(build_messages(0x44, &mut messages).is_err());

		let mut messages = vec![Message::Write(vec![0u8]); MAX_MESSAGES + 1];
		assert!(build_messages(0x44, &mut messages).is_err());
	}

	#[test]
	fn open_missing_device_fails() {
		assert!(open_i2c_device("/nonexistent/i2c-device").is_err());
	}
}
