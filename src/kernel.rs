//! Interfaces to the parts of the kernel this layer does not own.
//!
//! The scheduler, the syscall trampoline and the kernel-wide event
//! machinery live elsewhere. Sockets only see them through these traits.

/// A guest file descriptor number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fd(pub i32);

/// Identifies the guest thread issuing a syscall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub i32);

/// Owner recorded on newly created inodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileOwner {
	pub uid: u32,
	pub gid: u32,
}

/// Anything able to describe who is creating filesystem objects.
pub trait Context {
	/// Effective owner for new inodes.
	fn file_owner(&self) -> FileOwner;
}

/// Kernel-wide services reachable from a task.
#[cfg_attr(test, mockall::automock)]
pub trait Kernel: Send + Sync {
	/// Records that `tid` touched a recognized but unimplemented feature.
	///
	/// Purely a monitoring signal; it never fails.
	fn emit_unimplemented_event(&self, tid: ThreadId);
}

/// The task on whose behalf a socket syscall runs.
pub trait Task: Context {
	fn thread_id(&self) -> ThreadId;

	fn kernel(&self) -> &dyn Kernel;
}
