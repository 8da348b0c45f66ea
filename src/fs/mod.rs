//! The slice of the virtual filesystem sockets need.
//!
//! The real VFS lives elsewhere; a socket only needs a device to draw
//! inode numbers from, an inode and dirent to be named by, and a file to
//! be reachable through a descriptor.

mod device;
mod dirent;
mod file;
mod inode;

pub use self::device::{Device, make_device_id};
pub use self::dirent::Dirent;
pub use self::file::{File, FileFlags};
pub use self::inode::{FilePermissions, Inode, InodeType, PermMask, StableAttr};

use crate::error::Result;
use crate::kernel::Task;

bitflags::bitflags! {
	/// Readiness events, using the poll(2) bit values.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct EventMask: u32 {
		const READABLE = libc::POLLIN as u32;
		const PRIORITY = libc::POLLPRI as u32;
		const WRITABLE = libc::POLLOUT as u32;
		const ERROR = libc::POLLERR as u32;
		const HANGUP = libc::POLLHUP as u32;
		const READ_HANGUP = libc::POLLRDHUP as u32;
	}
}

/// Generic file behaviour every socket must also provide.
pub trait FileOperations: Send + Sync {
	/// Implements read(2).
	fn read(&self, task: &dyn Task, dst: &mut [u8]) -> Result<usize>;

	/// Implements write(2).
	fn write(&self, task: &dyn Task, src: &[u8]) -> Result<usize>;

	/// Returns the subset of `mask` that is currently ready.
	fn readiness(&self, mask: EventMask) -> EventMask;

	/// Called once when the owning file is destroyed.
	fn release(&self) {}
}
