/// Socket-layer syscall errors.
///
/// Every failure reported by the registry or by a transport through the
/// `Socket` contract is one of these. `errno()` gives the stable code the
/// syscall layer hands back to the guest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyscallError {
	#[error("address family not supported")]
	AddressFamilyNotSupported,

	#[error("socket type not supported")]
	SocketNotSupported,

	#[error("operation would block")]
	WouldBlock,

	/// The call was interrupted before completing and may be restarted.
	#[error("interrupted by signal")]
	Interrupted,

	#[error("address already in use")]
	AddressInUse,

	#[error("connection refused")]
	ConnectionRefused,

	/// Unknown or unimplemented socket option (ENOPROTOOPT).
	#[error("protocol not available")]
	NotSupported,

	#[error("invalid argument")]
	InvalidArgument,

	#[error("numerical argument out of domain")]
	OutOfRange,

	#[error("connection timed out")]
	TimedOut,

	/// The socket device ran out of inode numbers.
	#[error("too many open files in system")]
	NoInodes,

	/// Transport-specific failure, passed through unchanged.
	#[error("{}", errno_to_str(*.errno))]
	Transport { errno: i32 },
}

/// Shorthand for results carrying a [`SyscallError`].
pub type Result<T> = std::result::Result<T, SyscallError>;

impl SyscallError {
	/// Returns the Linux errno for this error.
	pub fn errno(&self) -> i32 {
		match self {
			Self::AddressFamilyNotSupported => libc::EAFNOSUPPORT,
			Self::SocketNotSupported => libc::ESOCKTNOSUPPORT,
			Self::WouldBlock => libc::EAGAIN,
			Self::Interrupted => libc::EINTR,
			Self::AddressInUse => libc::EADDRINUSE,
			Self::ConnectionRefused => libc::ECONNREFUSED,
			Self::NotSupported => libc::ENOPROTOOPT,
			Self::InvalidArgument => libc::EINVAL,
			Self::OutOfRange => libc::EDOM,
			Self::TimedOut => libc::ETIMEDOUT,
			Self::NoInodes => libc::ENFILE,
			Self::Transport { errno } => *errno,
		}
	}

	/// Builds an error from a raw errno.
	///
	/// Codes with a dedicated variant map to it; everything else becomes
	/// `Transport`.
	pub fn from_errno(errno: i32) -> Self {
		match errno {
			libc::EAFNOSUPPORT => Self::AddressFamilyNotSupported,
			libc::ESOCKTNOSUPPORT => Self::SocketNotSupported,
			libc::EAGAIN => Self::WouldBlock,
			libc::EINTR => Self::Interrupted,
			libc::EADDRINUSE => Self::AddressInUse,
			libc::ECONNREFUSED => Self::ConnectionRefused,
			libc::ENOPROTOOPT => Self::NotSupported,
			libc::EINVAL => Self::InvalidArgument,
			libc::EDOM => Self::OutOfRange,
			libc::ETIMEDOUT => Self::TimedOut,
			libc::ENFILE => Self::NoInodes,
			errno => Self::Transport { errno },
		}
	}

	/// True if the syscall layer should restart the call.
	#[inline]
	pub fn is_restartable(&self) -> bool {
		matches!(self, Self::Interrupted)
	}

	/// True for the "try again later" conditions a blocking loop waits on.
	#[inline]
	pub fn is_would_block(&self) -> bool {
		matches!(self, Self::WouldBlock)
	}
}

/// Converts errno to human-readable string.
fn errno_to_str(errno: i32) -> String {
	match errno {
		libc::EACCES => "permission denied".into(),
		libc::EADDRNOTAVAIL => "address not available".into(),
		libc::EALREADY => "operation already in progress".into(),
		libc::EBADF => "bad file descriptor".into(),
		libc::ECONNRESET => "connection reset by peer".into(),
		libc::EDESTADDRREQ => "destination address required".into(),
		libc::EINPROGRESS => "operation in progress".into(),
		libc::EISCONN => "already connected".into(),
		libc::EMSGSIZE => "message too long".into(),
		libc::ENETUNREACH => "network unreachable".into(),
		libc::ENOBUFS => "no buffer space available".into(),
		libc::ENOTCONN => "not connected".into(),
		libc::EOPNOTSUPP => "operation not supported".into(),
		libc::EPIPE => "broken pipe".into(),
		libc::EPROTONOSUPPORT => "protocol not supported".into(),
		_ => format!("errno {}", errno),
	}
}

/// Maps errno to std::io::ErrorKind.
fn errno_to_kind(errno: i32) -> std::io::ErrorKind {
	match errno {
		libc::EACCES | libc::EPERM => std::io::ErrorKind::PermissionDenied,
		libc::EADDRINUSE => std::io::ErrorKind::AddrInUse,
		libc::EADDRNOTAVAIL => std::io::ErrorKind::AddrNotAvailable,
		libc::EAGAIN => std::io::ErrorKind::WouldBlock,
		libc::ECONNREFUSED => std::io::ErrorKind::ConnectionRefused,
		libc::ECONNRESET => std::io::ErrorKind::ConnectionReset,
		libc::EINTR => std::io::ErrorKind::Interrupted,
		libc::EINVAL | libc::EDOM => std::io::ErrorKind::InvalidInput,
		libc::ENOTCONN => std::io::ErrorKind::NotConnected,
		libc::EPIPE => std::io::ErrorKind::BrokenPipe,
		libc::ETIMEDOUT => std::io::ErrorKind::TimedOut,
		libc::EAFNOSUPPORT | libc::ESOCKTNOSUPPORT | libc::ENOPROTOOPT | libc::EOPNOTSUPP => {
			std::io::ErrorKind::Unsupported
		}
		_ => std::io::ErrorKind::Other,
	}
}

impl From<SyscallError> for std::io::Error {
	fn from(err: SyscallError) -> Self {
		std::io::Error::new(errno_to_kind(err.errno()), err)
	}
}
