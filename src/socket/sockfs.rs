use std::sync::Arc;

use super::{SockFlags, Socket};
use crate::abi::{SOCKFS_MAGIC, page_size};
use crate::error::{Result, SyscallError};
use crate::fs::{Device, Dirent, File, FileFlags, FilePermissions, Inode, InodeType, PermMask, StableAttr};
use crate::kernel::Context;

/// Attributes given to socket inodes.
#[derive(Debug, Clone, Copy)]
pub struct SockfsConfig {
	pub block_size: u64,
	pub perms: FilePermissions,
}

impl Default for SockfsConfig {
	fn default() -> Self {
		Self {
			block_size: page_size(),
			perms: FilePermissions {
				user: PermMask::read_write(),
				..Default::default()
			},
		}
	}
}

impl SockfsConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the block size reported by stat(2). Default: the page size.
	pub fn block_size(mut self, size: u64) -> Self {
		self.block_size = size;
		self
	}

	/// Set the inode permissions. Default: read/write for the owner.
	pub fn perms(mut self, perms: FilePermissions) -> Self {
		self.perms = perms;
		self
	}
}

/// Returns a sockfs dirent that resides on `device`.
///
/// The dirent is named `socket:[<ino>]`, which is what Linux shows in
/// `/proc/<pid>/fd`. Fails only once the device runs out of inode numbers.
pub fn new_dirent(ctx: &dyn Context, device: &Device) -> Result<Dirent> {
	build_dirent(ctx, device, &SockfsConfig::default())
}

fn build_dirent(ctx: &dyn Context, device: &Device, config: &SockfsConfig) -> Result<Dirent> {
	let ino = device.next_ino().ok_or(SyscallError::NoInodes)?;
	let attr = StableAttr {
		kind: InodeType::Socket,
		device_id: device.device_id(),
		inode_id: ino,
		block_size: config.block_size,
	};
	let inode = Inode::new(attr, ctx.file_owner(), config.perms, SOCKFS_MAGIC);

	// Matches net/socket.c:sockfs_dname.
	Ok(Dirent::new(Arc::new(inode), format!("socket:[{}]", ino)))
}

/// A socket pseudo-filesystem bound to one device.
///
/// Transports keep one of these and use it to turn their sockets into
/// files.
#[derive(Debug)]
pub struct Sockfs {
	device: Arc<Device>,
	config: SockfsConfig,
}

impl Sockfs {
	pub fn new(device: Arc<Device>) -> Self {
		Self::with_config(device, SockfsConfig::default())
	}

	pub fn with_config(device: Arc<Device>, config: SockfsConfig) -> Self {
		Self { device, config }
	}

	pub fn device(&self) -> &Arc<Device> {
		&self.device
	}

	/// Allocates the next `socket:[N]` dirent on this filesystem's device.
	pub fn new_dirent(&self, ctx: &dyn Context) -> Result<Dirent> {
		build_dirent(ctx, &self.device, &self.config)
	}

	/// Wraps `socket` in a new file.
	///
	/// If no inode can be allocated the socket is released right away.
	pub fn new_file(&self, ctx: &dyn Context, socket: Box<dyn Socket>, flags: SockFlags) -> Result<File> {
		match self.new_dirent(ctx) {
			Ok(dirent) => Ok(File::new(dirent, FileFlags::for_socket(flags), socket)),
			Err(err) => {
				log::warn!("sockfs device {:#x} out of inode numbers", self.device.device_id());
				socket.release();
				Err(err)
			}
		}
	}
}
