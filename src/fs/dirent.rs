use std::sync::Arc;

use super::inode::Inode;

/// A named reference to an inode.
#[derive(Debug, Clone)]
pub struct Dirent {
	inode: Arc<Inode>,
	name: String,
}

impl Dirent {
	pub fn new(inode: Arc<Inode>, name: impl Into<String>) -> Self {
		Self { inode, name: name.into() }
	}

	pub fn inode(&self) -> &Arc<Inode> {
		&self.inode
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}
