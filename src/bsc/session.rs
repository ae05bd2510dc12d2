use libc::c_int;

use super::{
	BscControl,
	MAX_SLAVE_ADDRESS,
};
use crate::peripheral::Session;

/* see pigpio.h */
const BSC_FIFO_SIZE: usize = 512;

#[repr(C)]
struct BscXfer {
	control: u32,
	rx_cnt: c_int,
	rx_buf: [u8; BSC_FIFO_SIZE],
	tx_cnt: c_int,
	tx_buf: [u8; BSC_FIFO_SIZE],
}

#[link(name = "pigpio")]
extern "C" {
	#[link_name = "gpioInitialise"]
	fn gpio_initialise() -> c_int;
	#[link_name = "gpioTerminate"]
	fn gpio_terminate();
	#[link_name = "bscXfer"]
	fn bsc_xfer(xfer: *mut BscXfer) -> c_int;
}

fn initialise() -> crate::AResult<()> {
	let version = unsafe { gpio_initialise() };
	ensure!(version >= 0, "Unsuccessful GPIO initialization: {}", version);
	debug!("Initialized GPIOs (pigpio version {})", version);
	Ok(())
}

fn terminate() {
	unsafe { gpio_terminate() };
	debug!("Terminated GPIOs");
}

/// I2C slave session on the BSC peripheral.
///
/// The slave address is visible on the bus while the session is open; the
/// session closes the slave and terminates pigpio when dropped.
pub struct BscSession {
	xfer: Box<BscXfer>,
	address: u8,
	open: bool,
}

impl BscSession {
	pub fn open(address: u8) -> crate::AResult<Self> {
		ensure!(address <= MAX_SLAVE_ADDRESS, "invalid I2C slave address 0x{:02x}", address);
		initialise()?;

		let mut session = BscSession {
			xfer: Box::new(BscXfer {
				control: 0,
				rx_cnt: 0,
				rx_buf: [0u8; BSC_FIFO_SIZE],
				tx_cnt: 0,
				tx_buf: [0u8; BSC_FIFO_SIZE],
			}),
			address,
			open: true,
		};

		// close previous slaves on this address
		let status = session.exchange(BscControl::close(address));
		if status < 0 {
			warn!("Closing previous slave on 0x{:02x} failed: {}", address, status);
		}

		let status = session.exchange(BscControl::open(address));
		ensure!(status >= 0, "Failed to open slave on 0x{:02x}: {}", address, status);
		session.xfer.rx_cnt = 0;
		info!("Slave opened on 0x{:02x}", address);

		Ok(session)
	}

	pub fn address(&self) -> u8 {
		self.address
	}

	// returns the BSC status (or a negative pigpio error)
	fn exchange(&mut self, control: BscControl) -> c_int {
		self.xfer.control = control.0;
		trace!("bscXfer control {:?}", control);
		unsafe { bsc_xfer(&mut *self.xfer as *mut BscXfer) }
	}

	fn shutdown(&mut self) {
		if self.open {
			self.open = false;
			let status = self.exchange(BscControl::close(self.address));
			if status < 0 {
				error!("Failed to close slave on 0x{:02x}: {}", self.address, status);
			} else {
				info!("Closed slave on 0x{:02x}", self.address);
			}
			terminate();
		}
	}

	pub fn close(mut self) -> crate::AResult<()> {
		self.shutdown();
		Ok(())
	}
}

impl Session for BscSession {
	fn poll(&mut self) -> crate::AResult<Option<Vec<u8>>> {
		let status = self.exchange(BscControl::open(self.address));
		ensure!(status >= 0, "bscXfer on 0x{:02x} failed: {}", self.address, status);
		// staged data went into the transmit FIFO
		self.xfer.tx_cnt = 0;

		let received = self.xfer.rx_cnt.max(0) as usize;
		if 0 == received {
			return Ok(None);
		}
		let frame = self.xfer.rx_buf[..received.min(BSC_FIFO_SIZE)].to_vec();
		self.xfer.rx_cnt = 0;
		trace!("received {:02x?}", frame);
		Ok(Some(frame))
	}

	fn stage_reply(&mut self, reply: &[u8]) -> crate::AResult<()> {
		ensure!(reply.len() <= BSC_FIFO_SIZE, "reply too long for BSC FIFO: {} bytes", reply.len());
		self.xfer.tx_buf = [0u8; BSC_FIFO_SIZE];
		self.xfer.tx_buf[..reply.len()].copy_from_slice(reply);
		self.xfer.tx_cnt = reply.len() as c_int;
		Ok(())
	}
}

impl Drop for BscSession {
	fn drop(&mut self) {
		self.shutdown();
	}
}

/// Out-of-band teardown of a slave on `address`, e.g. one left behind by a
/// killed `run`.
pub fn disable(address: u8) -> crate::AResult<()> {
	ensure!(address <= MAX_SLAVE_ADDRESS, "invalid I2C slave address 0x{:02x}", address);
	initialise()?;

	let mut xfer = BscXfer {
		control: BscControl::close(address).0,
		rx_cnt: 0,
		rx_buf: [0u8; BSC_FIFO_SIZE],
		tx_cnt: 0,
		tx_buf: [0u8; BSC_FIFO_SIZE],
	};
	let status = unsafe { bsc_xfer(&mut xfer as *mut BscXfer) };
	terminate();

	ensure!(status >= 0, "Failed to close slave on 0x{:02x}: {}", address, status);
	info!("Closed slave on 0x{:02x}", address);
	Ok(())
}
