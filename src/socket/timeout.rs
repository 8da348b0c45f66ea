use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use crate::abi::{SO_RCVTIMEO, SO_SNDTIMEO};
use crate::error::{Result, SyscallError};

const NANOS_PER_SEC: i64 = 1_000_000_000;
const NANOS_PER_MICRO: i64 = 1_000;

/// Stores timeouts for send and receive calls.
///
/// Meant to be embedded in every transport's socket and handed out through
/// `Socket::timeouts`. Values are nanoseconds: zero means no timeout
/// (block indefinitely), negative means don't wait at all.
///
/// Lock-free. Readers see either the old or the new value, never a torn one.
#[derive(Debug, Default)]
pub struct SendReceiveTimeout {
	send: AtomicI64,
	recv: AtomicI64,
}

/// How a blocking operation should wait, derived from a stored timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocking {
	/// Wait until the operation can make progress.
	Indefinite,
	/// Return `WouldBlock` instead of waiting.
	NonBlocking,
	/// Wait no later than the given instant.
	Until(Instant),
}

impl Blocking {
	fn from_timeout(nanoseconds: i64, now: Instant) -> Self {
		match nanoseconds {
			0 => Self::Indefinite,
			ns if ns < 0 => Self::NonBlocking,
			ns => now
				.checked_add(Duration::from_nanos(ns as u64))
				.map_or(Self::Indefinite, Self::Until),
		}
	}

	/// Deadline to pass to `recv_msg`/`send_msg`, if any.
	pub fn deadline(&self) -> Option<Instant> {
		match self {
			Self::Until(deadline) => Some(*deadline),
			_ => None,
		}
	}

	pub fn is_nonblocking(&self) -> bool {
		matches!(self, Self::NonBlocking)
	}
}

impl SendReceiveTimeout {
	pub const fn new() -> Self {
		Self {
			send: AtomicI64::new(0),
			recv: AtomicI64::new(0),
		}
	}

	/// Sets the timeout (in ns) for recv operations.
	#[inline]
	pub fn set_recv_timeout(&self, nanoseconds: i64) {
		self.recv.store(nanoseconds, Ordering::Release);
	}

	/// Gets the current timeout (in ns) for recv operations.
	#[inline]
	pub fn recv_timeout(&self) -> i64 {
		self.recv.load(Ordering::Acquire)
	}

	/// Sets the timeout (in ns) for send operations.
	#[inline]
	pub fn set_send_timeout(&self, nanoseconds: i64) {
		self.send.store(nanoseconds, Ordering::Release);
	}

	/// Gets the current timeout (in ns) for send operations.
	#[inline]
	pub fn send_timeout(&self) -> i64 {
		self.send.load(Ordering::Acquire)
	}

	/// Waiting policy for a receive starting at `now`.
	pub fn recv_blocking(&self, now: Instant) -> Blocking {
		Blocking::from_timeout(self.recv_timeout(), now)
	}

	/// Waiting policy for a send starting at `now`.
	pub fn send_blocking(&self, now: Instant) -> Blocking {
		Blocking::from_timeout(self.send_timeout(), now)
	}

	/// Implements getsockopt(SO_RCVTIMEO / SO_SNDTIMEO).
	///
	/// Returns the encoded `struct timeval`, or None for any other option.
	pub fn get_timeval(&self, name: i32) -> Option<Vec<u8>> {
		let ns = match name {
			SO_RCVTIMEO => self.recv_timeout(),
			SO_SNDTIMEO => self.send_timeout(),
			_ => return None,
		};
		Some(encode_timeval(nanos_to_timeval(ns)))
	}

	/// Implements setsockopt(SO_RCVTIMEO / SO_SNDTIMEO).
	///
	/// Returns None for any other option.
	pub fn set_timeval(&self, name: i32, opt: &[u8]) -> Option<Result<()>> {
		let target = match name {
			SO_RCVTIMEO => &self.recv,
			SO_SNDTIMEO => &self.send,
			_ => return None,
		};
		Some(decode_timeval(opt).and_then(timeval_to_nanos).map(|ns| {
			target.store(ns, Ordering::Release);
		}))
	}
}

fn decode_timeval(opt: &[u8]) -> Result<libc::timeval> {
	if opt.len() < std::mem::size_of::<libc::timeval>() {
		return Err(SyscallError::InvalidArgument);
	}
	Ok(unsafe { std::ptr::read_unaligned(opt.as_ptr() as *const libc::timeval) })
}

fn encode_timeval(tv: libc::timeval) -> Vec<u8> {
	let ptr = &tv as *const libc::timeval as *const u8;
	unsafe { std::slice::from_raw_parts(ptr, std::mem::size_of::<libc::timeval>()) }.to_vec()
}

/// Converts a guest timeval to a stored timeout, saturating on overflow.
///
/// Negative seconds mean "no timeout", like Linux `sock_set_timeout`.
fn timeval_to_nanos(tv: libc::timeval) -> Result<i64> {
	let usec = tv.tv_usec as i64;
	if !(0..1_000_000).contains(&usec) {
		return Err(SyscallError::OutOfRange);
	}
	let sec = tv.tv_sec as i64;
	if sec < 0 {
		return Ok(0);
	}
	Ok(sec
		.saturating_mul(NANOS_PER_SEC)
		.saturating_add(usec * NANOS_PER_MICRO))
}

fn nanos_to_timeval(ns: i64) -> libc::timeval {
	let ns = ns.max(0);
	libc::timeval {
		tv_sec: (ns / NANOS_PER_SEC) as libc::time_t,
		tv_usec: ((ns % NANOS_PER_SEC) / NANOS_PER_MICRO) as libc::suseconds_t,
	}
}
