use super::Peripheral;

/// Hardware side of a peripheral bound to a bus address.
pub trait Session {
	/// Run one exchange with the bus hardware; returns the inbound frame
	/// received since the last poll, if any.
	fn poll(&mut self) -> crate::AResult<Option<Vec<u8>>>;

	/// Place the frame the controller gets on its next read; replaces whatever
	/// was staged before.
	fn stage_reply(&mut self, reply: &[u8]) -> crate::AResult<()>;
}

impl<'a, S: ?Sized + Session> Session for &'a mut S {
	fn poll(&mut self) -> crate::AResult<Option<Vec<u8>>> {
		S::poll(*self)
	}

	fn stage_reply(&mut self, reply: &[u8]) -> crate::AResult<()> {
		S::stage_reply(*self, reply)
	}
}

/// Poll once and feed a received frame to the state machine.
///
/// Every non-empty inbound frame resets the staged reply: it is either the
/// answer to a read request or empty. Returns whether a frame was processed.
pub fn serve_once<S>(session: &mut S, peripheral: &mut Peripheral) -> crate::AResult<bool>
where
	S: Session + ?Sized,
{
	let frame = match session.poll()? {
		Some(f) => f,
		None => return Ok(false),
	};
	if frame.is_empty() {
		return Ok(false);
	}

	let reply = peripheral.handle_frame(&frame).unwrap_or_default();
	session.stage_reply(&reply)?;
	Ok(true)
}

/// Serve the register protocol until the session fails.
pub fn serve<S>(session: &mut S, peripheral: &mut Peripheral) -> crate::AResult<()>
where
	S: Session + ?Sized,
{
	info!("Serving registers on bus address 0x{:02x}", peripheral.bus_address());
	loop {
		serve_once(session, peripheral)?;
	}
}
