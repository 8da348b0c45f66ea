use std::fmt;

use super::Dirent;
use crate::socket::{SockFlags, Socket};

bitflags::bitflags! {
	/// Status flags of an open file.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct FileFlags: u32 {
		const READ = 1 << 0;
		const WRITE = 1 << 1;
		const NONBLOCK = 1 << 2;
	}
}

impl FileFlags {
	/// Flags for a freshly created socket file.
	///
	/// Sockets are always open for both reading and writing.
	pub fn for_socket(flags: SockFlags) -> Self {
		let mut file = Self::READ | Self::WRITE;
		if flags.contains(SockFlags::NONBLOCK) {
			file |= Self::NONBLOCK;
		}
		file
	}
}

/// An open socket file.
///
/// Owns its socket for the whole open lifetime. Share it with `Arc` for
/// descriptor tables; the socket is released when the last reference drops.
pub struct File {
	dirent: Dirent,
	flags: FileFlags,
	socket: Box<dyn Socket>,
}

impl File {
	pub fn new(dirent: Dirent, flags: FileFlags, socket: Box<dyn Socket>) -> Self {
		Self { dirent, flags, socket }
	}

	pub fn dirent(&self) -> &Dirent {
		&self.dirent
	}

	/// Display name, e.g. `socket:[42]`.
	pub fn name(&self) -> &str {
		self.dirent.name()
	}

	pub fn flags(&self) -> FileFlags {
		self.flags
	}

	/// The socket all socket syscalls on this file are forwarded to.
	pub fn socket(&self) -> &dyn Socket {
		self.socket.as_ref()
	}
}

impl Drop for File {
	fn drop(&mut self) {
		log::trace!("releasing {}", self.dirent.name());
		self.socket.release();
	}
}

impl fmt::Debug for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("File")
			.field("name", &self.dirent.name())
			.field("flags", &self.flags)
			.finish_non_exhaustive()
	}
}
