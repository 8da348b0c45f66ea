//! The socket contract and everything shared by all transports.

mod control;
pub mod options;
mod registry;
mod sockfs;
mod timeout;

pub use self::control::{ControlMessages, Credentials, IpControlMessages, UnixControlMessages};
pub use self::registry::{Creation, Provider, Registry, RegistryBuilder};
pub use self::sockfs::{Sockfs, SockfsConfig, new_dirent};
pub use self::timeout::{Blocking, SendReceiveTimeout};

use std::time::Instant;

use crate::abi::SOCK_TYPE_MASK;
use crate::addr::SockName;
use crate::error::{Result, SyscallError};
use crate::fs::FileOperations;
use crate::kernel::{Fd, Task};

/// Socket type as passed to socket(2), with the flag bits stripped.
///
/// Unknown values are representable on purpose: they are forwarded to the
/// providers, which decline what they don't serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SockType(i32);

impl SockType {
	pub const STREAM: Self = Self(libc::SOCK_STREAM);
	pub const DGRAM: Self = Self(libc::SOCK_DGRAM);
	pub const RAW: Self = Self(libc::SOCK_RAW);
	pub const RDM: Self = Self(libc::SOCK_RDM);
	pub const SEQPACKET: Self = Self(libc::SOCK_SEQPACKET);
	pub const PACKET: Self = Self(libc::SOCK_PACKET);

	pub const fn from_raw(raw: i32) -> Self {
		Self(raw)
	}

	/// Returns the libc constant for this socket type.
	#[inline]
	pub const fn raw(self) -> i32 {
		self.0
	}

	/// Splits the `type` argument of socket(2)/socketpair(2).
	///
	/// Fails with `InvalidArgument` if bits other than the type and
	/// `SOCK_NONBLOCK | SOCK_CLOEXEC` are set.
	pub fn parse(raw: i32) -> Result<(Self, SockFlags)> {
		let flags = raw & !SOCK_TYPE_MASK;
		let flags = SockFlags::from_bits(flags).ok_or(SyscallError::InvalidArgument)?;
		Ok((Self(raw & SOCK_TYPE_MASK), flags))
	}
}

bitflags::bitflags! {
	/// Creation flags accepted in the `type` argument of socket(2).
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct SockFlags: i32 {
		const NONBLOCK = libc::SOCK_NONBLOCK;
		const CLOEXEC = libc::SOCK_CLOEXEC;
	}
}

/// Result of accept(2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
	/// Descriptor of the new connection in the caller's table.
	pub fd: Fd,
	/// Peer address, only filled when it was requested.
	///
	/// `len` is the real address length, which may exceed the guest buffer.
	pub peer: Option<SockName>,
}

/// Outcome of recvmsg(2).
///
/// `n > 0` together with an error is legal and means some data was
/// delivered before the call was cut short; the bytes must not be dropped.
#[derive(Debug, Default)]
pub struct Received {
	pub n: usize,
	pub sender: Option<SockName>,
	pub control: ControlMessages,
	pub error: Option<SyscallError>,
}

impl Received {
	pub fn ok(n: usize) -> Self {
		Self { n, ..Default::default() }
	}

	pub fn err(error: SyscallError) -> Self {
		Self { error: Some(error), ..Default::default() }
	}

	/// True if data was delivered and the call still reported an error.
	pub fn is_partial(&self) -> bool {
		self.n > 0 && self.error.is_some()
	}

	/// Collapses to what the syscall returns: the byte count whenever any
	/// progress was made, the error otherwise.
	pub fn into_result(self) -> Result<usize> {
		match self.error {
			Some(err) if self.n == 0 => Err(err),
			_ => Ok(self.n),
		}
	}
}

/// Outcome of sendmsg(2).
///
/// If `n > 0` the error, when present, is one raised while blocking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sent {
	pub n: usize,
	pub error: Option<SyscallError>,
}

impl Sent {
	pub fn ok(n: usize) -> Self {
		Self { n, error: None }
	}

	pub fn err(error: SyscallError) -> Self {
		Self { n: 0, error: Some(error) }
	}

	pub fn partial(n: usize, error: SyscallError) -> Self {
		Self { n, error: Some(error) }
	}

	pub fn is_partial(&self) -> bool {
		self.n > 0 && self.error.is_some()
	}

	/// See [`Received::into_result`].
	pub fn into_result(self) -> Result<usize> {
		match self.error {
			Some(err) if self.n == 0 => Err(err),
			_ => Ok(self.n),
		}
	}
}

/// The socket syscalls the syscall layer redirects to a transport.
///
/// Implementations must be safe to drive from several tasks at once; any
/// two operations may run concurrently on the same socket.
pub trait Socket: FileOperations {
	/// Implements connect(2).
	fn connect(&self, task: &dyn Task, sockaddr: &[u8], blocking: bool) -> Result<()>;

	/// Implements accept4(2).
	fn accept(&self, task: &dyn Task, peer_requested: bool, flags: i32, blocking: bool) -> Result<Accepted>;

	/// Implements bind(2).
	fn bind(&self, task: &dyn Task, sockaddr: &[u8]) -> Result<()>;

	/// Implements listen(2).
	fn listen(&self, task: &dyn Task, backlog: i32) -> Result<()>;

	/// Implements shutdown(2).
	fn shutdown(&self, task: &dyn Task, how: i32) -> Result<()>;

	/// Implements getsockopt(2).
	///
	/// `out_len` is the size of the guest buffer. Unknown options fail with
	/// `NotSupported`.
	fn get_sock_opt(&self, task: &dyn Task, level: i32, name: i32, out_len: usize) -> Result<Vec<u8>>;

	/// Implements setsockopt(2).
	fn set_sock_opt(&self, task: &dyn Task, level: i32, name: i32, opt: &[u8]) -> Result<()>;

	/// Implements getsockname(2).
	fn get_sock_name(&self, task: &dyn Task) -> Result<SockName>;

	/// Implements getpeername(2).
	fn get_peer_name(&self, task: &dyn Task) -> Result<SockName>;

	/// Implements recvmsg(2).
	///
	/// `control_data_len` is how many bytes of ancillary data the guest can
	/// take. The sender address is only filled if `sender_requested`.
	fn recv_msg(
		&self,
		task: &dyn Task,
		dst: &mut [u8],
		flags: i32,
		deadline: Option<Instant>,
		sender_requested: bool,
		control_data_len: u64,
	) -> Received;

	/// Implements sendmsg(2).
	///
	/// Take `control` (see [`ControlMessages::take`]) only once the send is
	/// committed. On failure it must be left with the caller untouched.
	fn send_msg(
		&self,
		task: &dyn Task,
		src: &[u8],
		to: Option<&[u8]>,
		flags: i32,
		deadline: Option<Instant>,
		control: &mut ControlMessages,
	) -> Sent;

	/// The timeout state embedded in the transport.
	fn timeouts(&self) -> &SendReceiveTimeout;

	/// Sets the receive timeout in ns. Zero means none, negative means don't wait.
	fn set_recv_timeout(&self, nanoseconds: i64) {
		self.timeouts().set_recv_timeout(nanoseconds)
	}

	fn recv_timeout(&self) -> i64 {
		self.timeouts().recv_timeout()
	}

	/// Sets the send timeout in ns. Zero means none, negative means don't wait.
	fn set_send_timeout(&self, nanoseconds: i64) {
		self.timeouts().set_send_timeout(nanoseconds)
	}

	fn send_timeout(&self) -> i64 {
		self.timeouts().send_timeout()
	}
}
