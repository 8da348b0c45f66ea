use crate::addr::{Domain, FromSockAddr, ToSockAddr};

/// Unix domain socket marker.
///
/// Providers registered under this domain serve AF_UNIX.
pub struct Unix;

impl Domain for Unix {
	type Addr = UnixAddr;

	#[inline]
	fn raw() -> libc::c_int {
		libc::AF_UNIX
	}
}

/// Offset of `sun_path` inside `sockaddr_un`.
const PATH_OFFSET: usize = std::mem::size_of::<libc::sa_family_t>();

/// Unix domain socket address: pathname, abstract, or unnamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnixAddr {
	path: Vec<u8>,
	/// True if this is an abstract socket (Linux-only, no filesystem entry).
	is_abstract: bool,
}

impl UnixAddr {
	/// Creates a new Unix address from a filesystem path.
	pub fn new<P: AsRef<[u8]>>(path: P) -> Self {
		Self {
			path: path.as_ref().to_vec(),
			is_abstract: false,
		}
	}

	/// Creates an abstract socket address.
	pub fn abstract_socket<P: AsRef<[u8]>>(name: P) -> Self {
		Self {
			path: name.as_ref().to_vec(),
			is_abstract: true,
		}
	}

	/// The address of a socket that was never bound.
	pub fn unnamed() -> Self {
		Self { path: Vec::new(), is_abstract: false }
	}

	pub fn is_abstract(&self) -> bool {
		self.is_abstract
	}

	pub fn is_unnamed(&self) -> bool {
		!self.is_abstract && self.path.is_empty()
	}

	/// Returns the path bytes (without the leading NUL for abstract names).
	pub fn path(&self) -> &[u8] {
		&self.path
	}

	/// Length Linux reports for this address.
	///
	/// Pathnames count their trailing NUL, abstract names their leading one,
	/// unnamed sockets only the family field.
	pub fn addr_len(&self) -> usize {
		if self.is_unnamed() {
			PATH_OFFSET
		} else {
			PATH_OFFSET + self.path.len() + 1
		}
	}

	/// Converts to the raw sockaddr_un.
	pub(crate) fn to_raw(&self) -> Option<libc::sockaddr_un> {
		let mut addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
		addr.sun_family = libc::AF_UNIX as libc::sa_family_t;

		// Either way one byte of sun_path is a NUL.
		if self.path.len() + 1 > addr.sun_path.len() {
			return None;
		}
		let start = if self.is_abstract { 1 } else { 0 };
		for (i, &byte) in self.path.iter().enumerate() {
			addr.sun_path[start + i] = byte as libc::c_char;
		}

		Some(addr)
	}

	/// Creates from raw sockaddr_un, honouring the reported length.
	pub(crate) fn from_raw(raw: &libc::sockaddr_un, len: usize) -> Self {
		let path_len = len.saturating_sub(PATH_OFFSET).min(raw.sun_path.len());
		if path_len == 0 {
			return Self::unnamed();
		}
		let path = &raw.sun_path[..path_len];
		if path[0] == 0 {
			let name = path[1..].iter().map(|&c| c as u8).collect();
			Self { path: name, is_abstract: true }
		} else {
			let end = path.iter().position(|&c| c == 0).unwrap_or(path.len());
			let name = path[..end].iter().map(|&c| c as u8).collect();
			Self { path: name, is_abstract: false }
		}
	}
}

impl ToSockAddr for UnixAddr {
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		let raw = self.to_raw()?;
		let ptr = &raw as *const _ as *const libc::sockaddr;
		Some(f(ptr, self.addr_len() as libc::socklen_t))
	}
}

impl FromSockAddr for UnixAddr {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if (len as usize) < PATH_OFFSET {
			return None;
		}
		let raw = unsafe { &*(addr as *const libc::sockaddr_un) };
		if raw.sun_family as libc::c_int != libc::AF_UNIX {
			return None;
		}
		Some(Self::from_raw(raw, len as usize))
	}
}
