#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate rpi_i2c_regfile;
use rpi_i2c_regfile::*;

use std::process::exit;

use rpi_i2c_regfile::peripheral::Peripheral;
use rpi_i2c_regfile::value::ByteValue;

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid paramater {}: {}", name, e);
		e.context(msg).into()
	})
}

fn run(address: u8) -> AResult<()> {
	let mut session = bsc::BscSession::open(address)?;
	let mut peripheral = Peripheral::new(address);

	peripheral::serve(&mut session, &mut peripheral)
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg address: -a --address +takes_value default_value("0x44") "I2C slave address to answer on")
		(@subcommand run =>
			(about: "open the I2C slave and serve the register file until killed")
		)
		(@subcommand disable =>
			(about: "close the I2C slave on the address (e.g. after a killed run)")
		)
	).get_matches();

	let address: ByteValue = get_param(&matches, "address")?;

	match matches.subcommand() {
		("run", _) => {
			run(address.0)
		}
		("disable", _) => {
			bsc::disable(address.0)
		}
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
