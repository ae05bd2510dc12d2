#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate rpi_i2c_regfile;
use rpi_i2c_regfile::*;

use std::io::{
	self,
	Read,
};
use std::process::exit;

use rpi_i2c_regfile::bus::I2cDevice;
use rpi_i2c_regfile::controller::Controller;
use rpi_i2c_regfile::value::{
	ByteValue,
	parse_hex_bytes,
};

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

fn open_controller(matches: &clap::ArgMatches) -> AResult<Controller<I2cDevice>> {
	let device = matches.value_of("device").unwrap_or(DEFAULT_I2C_DEVICE);
	let peer: ByteValue = get_param(matches, "peer")?;

	let dev = bus::open_i2c_device(device).map_err(|e| {
		let msg = format!("Error while trying to open i2c device {}: {}", device, e);
		failure::Error::from(e).context(msg)
	})?;
	debug!("Opened {} for peer {}", dev.path().display(), peer);
	Ok(Controller::new(dev, peer.0))
}

fn read_registers(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address: ByteValue = get_param(sub_m, "ADDRESS")?;
	let length: usize = get_param(sub_m, "LENGTH")?;

	let mut controller = open_controller(matches)?;
	let values = controller.read(address.0, length)?;

	println!("Bytes read:");
	println!("[addr] val");
	for (i, value) in values.iter().enumerate() {
		println!("[0x{:02x}]  0x{:02x}", address.0 as usize + i, value);
	}
	println!();

	Ok(())
}

fn write_registers(matches: &clap::ArgMatches, sub_m: &clap::ArgMatches) -> AResult<()> {
	let address: ByteValue = get_param(sub_m, "ADDRESS")?;
	let length: usize = get_param(sub_m, "LENGTH")?;

	let data = match sub_m.values_of("DATA") {
		Some(values) => parse_hex_bytes(&values.collect::<Vec<_>>().join(" "))?,
		None => {
			eprintln!("Enter hex data for writing to peripheral...");
			let mut input = String::new();
			io::stdin().read_to_string(&mut input)?;
			parse_hex_bytes(&input)?
		}
	};

	let mut controller = open_controller(matches)?;
	let written = controller.write(address.0, length, &data)?;
	info!("Wrote {} registers starting at {}", written, address);

	Ok(())
}

fn who_am_i(matches: &clap::ArgMatches) -> AResult<()> {
	let mut controller = open_controller(matches)?;
	let address = controller.identity_query()?;
	println!("Peripheral address: 0x{:02x}", address);

	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg device: -d --device +takes_value default_value(DEFAULT_I2C_DEVICE) "i2c-dev device node of the bus")
		(@arg peer: -p --peer +takes_value default_value("0x44") "bus address of the peripheral")
		(@subcommand read =>
			(about: "read registers from the peripheral")
			(@arg ADDRESS: +required "first register (0..63)")
			(@arg LENGTH: +required "number of registers")
		)
		(@subcommand write =>
			(about: "write registers of the peripheral")
			(@arg ADDRESS: +required "first register (0..63)")
			(@arg LENGTH: +required "number of registers")
			(@arg DATA: ... "hex bytes to write (read from stdin if missing)")
		)
		(@subcommand whoami =>
			(about: "query the bus address of the peripheral")
		)
	).get_matches();

	match matches.subcommand() {
		("read", Some(sub_m)) => {
			read_registers(&matches, sub_m)
		}
		("write", Some(sub_m)) => {
			write_registers(&matches, sub_m)
		}
		("whoami", _) => {
			who_am_i(&matches)
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
