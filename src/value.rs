use std::fmt;
use std::str;

/// Byte given on the command line, either decimal or `0x` prefixed hex
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ByteValue(pub u8);

impl fmt::Display for ByteValue {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:02x}", self.0)
	}
}

impl str::FromStr for ByteValue {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		let v = if s.starts_with("0x") || s.starts_with("0X") {
			with_context!(("invalid hex byte: {:?}", s),
				Ok(u8::from_str_radix(&s[2..], 16)?)
			)?
		} else {
			with_context!(("invalid byte: {:?}", s),
				Ok(s.parse::<u8>()?)
			)?
		};
		Ok(ByteValue(v))
	}
}

/// Parse whitespace separated hex bytes (`0x` prefix optional), as typed in
/// when write data comes from stdin.
pub fn parse_hex_bytes(input: &str) -> crate::AResult<Vec<u8>> {
	input.split_whitespace().map(|word| {
		let digits = if word.starts_with("0x") || word.starts_with("0X") {
			&word[2..]
		} else {
			word
		};
		with_context!(("invalid hex byte: {:?}", word),
			Ok(u8::from_str_radix(digits, 16)?)
		)
	}).collect()
}
