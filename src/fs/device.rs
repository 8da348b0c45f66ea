use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Minor numbers handed out to anonymous devices (major 0).
static NEXT_ANON_MINOR: AtomicU32 = AtomicU32::new(1);

/// Encodes a device number the way Linux `makedev` does.
pub fn make_device_id(major: u32, minor: u32) -> u64 {
	let major = major as u64;
	let minor = minor as u64;
	(minor & 0xff) | ((major & 0xfff) << 8) | ((minor >> 8) << 20)
}

/// A virtual device owning an inode number space.
///
/// Inode numbers come from a single atomic counter and are never reused.
#[derive(Debug)]
pub struct Device {
	major: u32,
	minor: u32,
	/// Last inode number handed out.
	last_ino: AtomicU64,
}

impl Device {
	pub fn new(major: u32, minor: u32) -> Self {
		Self {
			major,
			minor,
			last_ino: AtomicU64::new(0),
		}
	}

	/// Allocates a fresh anonymous device.
	pub fn anonymous() -> Self {
		let minor = NEXT_ANON_MINOR.fetch_add(1, Ordering::Relaxed);
		Self::new(0, minor)
	}

	/// Starts the inode counter after `last`, so the next inode is `last + 1`.
	pub fn with_last_ino(self, last: u64) -> Self {
		self.last_ino.store(last, Ordering::Release);
		self
	}

	pub fn major(&self) -> u32 {
		self.major
	}

	pub fn minor(&self) -> u32 {
		self.minor
	}

	pub fn device_id(&self) -> u64 {
		make_device_id(self.major, self.minor)
	}

	/// Allocates the next inode number.
	///
	/// Returns None once the counter is exhausted.
	pub fn next_ino(&self) -> Option<u64> {
		self.last_ino
			.fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| last.checked_add(1))
			.ok()
			.map(|last| last + 1)
	}
}
