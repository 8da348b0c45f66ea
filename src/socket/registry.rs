use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{SockFlags, SockType};
use crate::addr::Domain;
use crate::error::{Result, SyscallError};
use crate::fs::File;
use crate::kernel::Task;

/// What a provider did with a creation request.
#[derive(Debug)]
pub enum Creation<T> {
	/// The provider does not serve this (type, protocol). Try the next one.
	Declined,
	/// The provider serves the request and created the socket(s).
	Created(T),
	/// The provider serves the request but creation failed. Authoritative.
	Failed(SyscallError),
}

impl<T> Creation<T> {
	/// Adapts the two-channel "object or error, both empty means declined"
	/// convention.
	///
	/// Only for providers written against that convention; the dispatch
	/// path itself never builds a `Creation` this way. An error always wins;
	/// anything created alongside it is dropped.
	pub fn from_parts(created: Option<T>, error: Option<SyscallError>) -> Self {
		match (created, error) {
			(_, Some(err)) => Self::Failed(err),
			(Some(created), None) => Self::Created(created),
			(None, None) => Self::Declined,
		}
	}

	pub fn is_declined(&self) -> bool {
		matches!(self, Self::Declined)
	}
}

impl<T> Creation<(T, T)> {
	/// Adapts the two-channel convention for socket pairs, for the same
	/// providers as [`Creation::from_parts`].
	///
	/// A pair with only one half and no error is not a valid answer; it is
	/// treated as a decline and the stray half is dropped.
	pub fn from_pair_parts(first: Option<T>, second: Option<T>, error: Option<SyscallError>) -> Self {
		match (first, second, error) {
			(_, _, Some(err)) => Self::Failed(err),
			(Some(a), Some(b), None) => Self::Created((a, b)),
			(None, None, None) => Self::Declined,
			(_, _, None) => {
				log::warn!("provider returned half a socket pair; treating it as declined");
				Self::Declined
			}
		}
	}
}

impl<T> From<Result<Option<T>>> for Creation<T> {
	fn from(result: Result<Option<T>>) -> Self {
		match result {
			Ok(Some(created)) => Self::Created(created),
			Ok(None) => Self::Declined,
			Err(err) => Self::Failed(err),
		}
	}
}

/// Supplies sockets for one address family (e.g. AF_INET).
pub trait Provider: Send + Sync {
	/// Creates a new socket.
	///
	/// Return `Declined` if the (type, protocol) combination is not served by
	/// this provider, `Failed` only if it is served but creation failed.
	/// `flags` must end up on the file, normally via [`Sockfs::new_file`].
	///
	/// [`Sockfs::new_file`]: super::Sockfs::new_file
	fn socket(&self, task: &dyn Task, stype: SockType, protocol: i32, flags: SockFlags) -> Creation<File>;

	/// Creates a pair of connected sockets.
	///
	/// Same conventions as [`Provider::socket`]; `flags` apply to both files.
	fn pair(&self, task: &dyn Task, stype: SockType, protocol: i32, flags: SockFlags) -> Creation<(File, File)>;
}

/// Collects providers during initialization.
///
/// Every transport registers here before the registry is built; once
/// `build` is called the set of providers is fixed.
///
/// # Example
/// ```ignore
/// let registry = RegistryBuilder::new()
///     .register(libc::AF_UNIX, Arc::new(UnixProvider::new()))
///     .register(libc::AF_INET, Arc::new(NetstackProvider::new()))
///     .register(libc::AF_INET, Arc::new(HostPassthrough::new()))
///     .build();
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
	families: BTreeMap<i32, Vec<Arc<dyn Provider>>>,
}

impl RegistryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a provider for `family`.
	///
	/// Providers are tried in registration order. Registering the same
	/// provider twice is allowed and simply makes it appear twice.
	pub fn register(mut self, family: i32, provider: Arc<dyn Provider>) -> Self {
		self.families.entry(family).or_default().push(provider);
		self
	}

	/// Appends a provider for the family of domain `D`.
	pub fn register_domain<D: Domain>(self, provider: Arc<dyn Provider>) -> Self {
		self.register(D::raw(), provider)
	}

	/// Ends the registration phase.
	pub fn build(self) -> Registry {
		for (family, providers) in &self.families {
			log::debug!("family {}: {} provider(s) registered", family, providers.len());
		}
		Registry { families: self.families }
	}
}

/// Per-family socket providers, fixed after construction.
///
/// Shared between tasks behind an `Arc`; lookups need no locking.
pub struct Registry {
	families: BTreeMap<i32, Vec<Arc<dyn Provider>>>,
}

impl Registry {
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::new()
	}

	/// True if at least one provider serves `family`.
	pub fn is_registered(&self, family: i32) -> bool {
		self.families.contains_key(&family)
	}

	/// Providers for `family`, in the order they are tried.
	pub fn providers(&self, family: i32) -> &[Arc<dyn Provider>] {
		self.families.get(&family).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Registered families in ascending order.
	pub fn families(&self) -> impl Iterator<Item = i32> + '_ {
		self.families.keys().copied()
	}

	/// Creates a new socket with the given family, type and protocol.
	///
	/// `flags` are the creation flags split off by [`SockType::parse`]. The
	/// first provider to create a socket wins. A provider failure is
	/// returned as is; later providers are not consulted.
	pub fn new_socket(&self, task: &dyn Task, family: i32, stype: SockType, protocol: i32, flags: SockFlags) -> Result<File> {
		for (idx, provider) in self.providers(family).iter().enumerate() {
			match provider.socket(task, stype, protocol, flags) {
				Creation::Created(file) => {
					log::debug!(
						"socket(family={}, type={}, protocol={}) -> {} via provider {}",
						family, stype.raw(), protocol, file.name(), idx
					);
					return Ok(file);
				}
				Creation::Failed(err) => {
					log::debug!(
						"socket(family={}, type={}, protocol={}) failed in provider {}: {}",
						family, stype.raw(), protocol, idx, err
					);
					return Err(err);
				}
				Creation::Declined => {
					log::trace!("family {}: provider {} declined type {} protocol {}", family, idx, stype.raw(), protocol);
				}
			}
		}

		Err(SyscallError::AddressFamilyNotSupported)
	}

	/// Creates a new connected socket pair with the given family, type and
	/// protocol.
	///
	/// An unregistered family fails with `AddressFamilyNotSupported`; a
	/// registered family where every provider declines fails with
	/// `SocketNotSupported`.
	pub fn pair(&self, task: &dyn Task, family: i32, stype: SockType, protocol: i32, flags: SockFlags) -> Result<(File, File)> {
		let providers = self
			.families
			.get(&family)
			.ok_or(SyscallError::AddressFamilyNotSupported)?;

		for (idx, provider) in providers.iter().enumerate() {
			match provider.pair(task, stype, protocol, flags) {
				Creation::Created((first, second)) => {
					log::debug!(
						"socketpair(family={}, type={}, protocol={}) -> ({}, {}) via provider {}",
						family, stype.raw(), protocol, first.name(), second.name(), idx
					);
					return Ok((first, second));
				}
				Creation::Failed(err) => {
					log::debug!(
						"socketpair(family={}, type={}, protocol={}) failed in provider {}: {}",
						family, stype.raw(), protocol, idx, err
					);
					return Err(err);
				}
				Creation::Declined => {
					log::trace!("family {}: provider {} declined pair type {} protocol {}", family, idx, stype.raw(), protocol);
				}
			}
		}

		Err(SyscallError::SocketNotSupported)
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut map = f.debug_map();
		for (family, providers) in &self.families {
			map.entry(family, &providers.len());
		}
		map.finish()
	}
}
