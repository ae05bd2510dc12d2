//! Broadcom Serial Controller (BSC) as I2C slave, through pigpio's `bscXfer`.
//!
//! Only the control word is available without the `pigpio` feature.

mod control;
#[cfg(feature = "pigpio")]
mod session;

pub use self::control::{
	BscControl,
	MAX_SLAVE_ADDRESS,
};

#[cfg(feature = "pigpio")]
pub use self::session::{
	BscSession,
	disable,
};
