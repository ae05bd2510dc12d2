#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod bsc;
pub mod bus;
pub mod controller;
pub mod error;
pub mod frame;
pub mod peripheral;
pub mod registers;
pub mod sim;
pub mod value;

pub use self::error::Error;

/// Bus address the peripheral answers on (and reports for identity queries)
pub const DEFAULT_PERIPHERAL_ADDRESS: u8 = 0x44;

/// i2c-dev node the controller talks through
pub const DEFAULT_I2C_DEVICE: &str = "/dev/i2c-1";
