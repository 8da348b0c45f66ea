use std::net::Ipv6Addr;

use crate::addr::{Domain, FromSockAddr, ToSockAddr};

/// AF_INET6.
pub struct Ipv6;

impl Domain for Ipv6 {
	type Addr = SocketAddrV6;

	#[inline]
	fn raw() -> libc::c_int {
		libc::AF_INET6
	}
}

/// An AF_INET6 endpoint, including flow label and scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketAddrV6 {
	ip: Ipv6Addr,
	port: u16,
	flowinfo: u32,
	/// Interface index for link-local (fe80::/10) peers.
	scope_id: u32,
}

impl SocketAddrV6 {
	pub fn new(ip: impl Into<Ipv6Addr>, port: u16) -> Self {
		Self { ip: ip.into(), port, flowinfo: 0, scope_id: 0 }
	}

	pub fn with_scope(ip: impl Into<Ipv6Addr>, port: u16, scope_id: u32) -> Self {
		Self { scope_id, ..Self::new(ip, port) }
	}

	pub fn ip(&self) -> Ipv6Addr {
		self.ip
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	pub fn flowinfo(&self) -> u32 {
		self.flowinfo
	}

	pub fn scope_id(&self) -> u32 {
		self.scope_id
	}

	fn encode(&self) -> libc::sockaddr_in6 {
		libc::sockaddr_in6 {
			sin6_family: libc::AF_INET6 as libc::sa_family_t,
			sin6_port: self.port.to_be(),
			sin6_flowinfo: self.flowinfo.to_be(),
			sin6_addr: libc::in6_addr { s6_addr: self.ip.octets() },
			// Host order, unlike the rest.
			sin6_scope_id: self.scope_id,
		}
	}

	fn decode(raw: &libc::sockaddr_in6) -> Self {
		Self {
			ip: Ipv6Addr::from(raw.sin6_addr.s6_addr),
			port: u16::from_be(raw.sin6_port),
			flowinfo: u32::from_be(raw.sin6_flowinfo),
			scope_id: raw.sin6_scope_id,
		}
	}
}

impl From<std::net::SocketAddrV6> for SocketAddrV6 {
	fn from(addr: std::net::SocketAddrV6) -> Self {
		Self {
			ip: *addr.ip(),
			port: addr.port(),
			flowinfo: addr.flowinfo(),
			scope_id: addr.scope_id(),
		}
	}
}

impl From<SocketAddrV6> for std::net::SocketAddrV6 {
	fn from(addr: SocketAddrV6) -> Self {
		Self::new(addr.ip, addr.port, addr.flowinfo, addr.scope_id)
	}
}

impl ToSockAddr for SocketAddrV6 {
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		let raw = self.encode();
		Some(f(
			(&raw as *const libc::sockaddr_in6).cast(),
			std::mem::size_of_val(&raw) as libc::socklen_t,
		))
	}
}

impl FromSockAddr for SocketAddrV6 {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if (len as usize) < std::mem::size_of::<libc::sockaddr_in6>() {
			return None;
		}
		let raw = unsafe { &*addr.cast::<libc::sockaddr_in6>() };
		(raw.sin6_family as libc::c_int == libc::AF_INET6).then(|| Self::decode(raw))
	}
}
