//! Socket addresses.
//!
//! Transports hand addresses to the syscall layer as [`SockAddr`], the
//! encoded Linux `sockaddr` image. The typed addresses below encode to and
//! decode from that image:
//! - `SocketAddrV4`: `sockaddr_in`
//! - `SocketAddrV6`: `sockaddr_in6`
//! - `UnixAddr`: `sockaddr_un`, pathname or abstract

mod ipv4;
mod ipv6;
mod unix;
pub use self::ipv4::{Ipv4, SocketAddrV4};
pub use self::ipv6::{Ipv6, SocketAddrV6};
pub use self::unix::{Unix, UnixAddr};

use crate::error::{Result, SyscallError};

/// Trait for address family markers.
///
/// Each type implementing this trait names an address family a provider
/// can be registered under.
pub trait Domain {
	type Addr: ToSockAddr + FromSockAddr;
	/// Returns the libc constant for this address family.
	fn raw() -> libc::c_int;
}

/// Trait for address types that can be converted to raw sockaddr.
pub trait ToSockAddr {
	/// Calls the provided closure with a pointer to the raw sockaddr and its length.
	/// Returns None if the address is invalid (e.g., path too long for Unix).
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R;

	/// Encodes the address into its sockaddr byte image.
	fn to_sockaddr(&self) -> Option<SockAddr> {
		self.with_raw(|ptr, len| {
			let bytes = unsafe { std::slice::from_raw_parts(ptr as *const u8, len as usize) };
			SockAddr::from_bytes(bytes.to_vec())
		})
	}
}

/// Trait for address types that can be created from raw sockaddr.
pub trait FromSockAddr: Sized {
	/// Creates address from raw sockaddr storage.
	///
	/// # Safety
	/// `addr` must point to at least `len` readable bytes, and to storage
	/// at least as large as the concrete sockaddr type.
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self>;

	/// Decodes from an encoded sockaddr image.
	///
	/// Returns None if the family does not match or the image is short.
	fn from_encoded(addr: &SockAddr) -> Option<Self> {
		let bytes = addr.as_bytes();
		if bytes.len() > std::mem::size_of::<libc::sockaddr_storage>() {
			return None;
		}
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		unsafe {
			std::ptr::copy_nonoverlapping(
				bytes.as_ptr(),
				&mut storage as *mut _ as *mut u8,
				bytes.len(),
			);
			Self::from_sockaddr(&storage as *const _ as *const libc::sockaddr, bytes.len() as libc::socklen_t)
		}
	}
}

/// An encoded socket address, opaque to the dispatch layer.
///
/// Holds the bytes of a Linux `sockaddr` exactly as they are copied out
/// to the guest. The first two bytes are the family in native order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SockAddr {
	bytes: Vec<u8>,
}

impl SockAddr {
	/// Wraps an encoded address.
	pub fn from_bytes(bytes: Vec<u8>) -> Self {
		Self { bytes }
	}

	/// Returns the address family, if the image is long enough to carry one.
	pub fn family(&self) -> Option<i32> {
		let raw: [u8; 2] = self.bytes.get(..2)?.try_into().ok()?;
		Some(libc::sa_family_t::from_ne_bytes(raw) as i32)
	}

	/// Returns the encoded bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Length of the encoded image.
	pub fn encoded_len(&self) -> u32 {
		self.bytes.len() as u32
	}

	/// Pairs the address with its own encoded length.
	pub fn named(self) -> SockName {
		let len = self.encoded_len();
		SockName { addr: self, len }
	}
}

/// An address together with the length reported to the guest.
///
/// `len` is the real length of the address. The guest's buffer may be
/// shorter, in which case only a prefix is copied but `len` is still what
/// gets reported; the address itself is never altered by truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SockName {
	pub addr: SockAddr,
	pub len: u32,
}

impl SockName {
	pub fn new(addr: SockAddr, len: u32) -> Self {
		Self { addr, len }
	}

	/// Copies the address out to a guest buffer.
	///
	/// `buf_len` is the length the guest passed in (signed, as read from
	/// guest memory). Copies as much of the address as fits in both the
	/// buffer and `len`, and returns the length to write back, which is
	/// always the full `len`.
	pub fn write_to(&self, buf_len: i32, out: &mut [u8]) -> Result<u32> {
		if buf_len < 0 {
			return Err(SyscallError::InvalidArgument);
		}
		let n = (buf_len as u32)
			.min(self.len)
			.min(self.addr.encoded_len()) as usize;
		let n = n.min(out.len());
		out[..n].copy_from_slice(&self.addr.as_bytes()[..n]);
		Ok(self.len)
	}
}
