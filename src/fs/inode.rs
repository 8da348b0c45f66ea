use crate::kernel::FileOwner;

/// Kind of object an inode represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeType {
	RegularFile,
	Directory,
	Symlink,
	Pipe,
	Socket,
	CharacterDevice,
}

/// Attributes fixed for the lifetime of an inode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StableAttr {
	pub kind: InodeType,
	pub device_id: u64,
	pub inode_id: u64,
	pub block_size: u64,
}

/// Read/write/execute bits for one class of user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermMask {
	pub read: bool,
	pub write: bool,
	pub execute: bool,
}

impl PermMask {
	pub const fn read_write() -> Self {
		Self { read: true, write: true, execute: false }
	}

	fn bits(&self) -> u32 {
		(self.read as u32) << 2 | (self.write as u32) << 1 | self.execute as u32
	}
}

/// Permissions of an inode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilePermissions {
	pub user: PermMask,
	pub group: PermMask,
	pub other: PermMask,
}

impl FilePermissions {
	/// Returns the permissions as a mode, e.g. `0o600`.
	pub fn mode(&self) -> u32 {
		self.user.bits() << 6 | self.group.bits() << 3 | self.other.bits()
	}
}

/// A minimal in-memory inode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
	attr: StableAttr,
	owner: FileOwner,
	perms: FilePermissions,
	fs_magic: u64,
}

impl Inode {
	pub fn new(attr: StableAttr, owner: FileOwner, perms: FilePermissions, fs_magic: u64) -> Self {
		Self { attr, owner, perms, fs_magic }
	}

	pub fn stable_attr(&self) -> &StableAttr {
		&self.attr
	}

	pub fn owner(&self) -> FileOwner {
		self.owner
	}

	pub fn permissions(&self) -> FilePermissions {
		self.perms
	}

	/// Magic of the filesystem the inode belongs to, as seen by statfs(2).
	pub fn fs_magic(&self) -> u64 {
		self.fs_magic
	}
}
