use std::net::Ipv4Addr;

use crate::addr::{Domain, FromSockAddr, ToSockAddr};

/// AF_INET.
pub struct Ipv4;

impl Domain for Ipv4 {
	type Addr = SocketAddrV4;

	#[inline]
	fn raw() -> libc::c_int {
		libc::AF_INET
	}
}

/// An AF_INET endpoint as a transport reports it to the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketAddrV4 {
	ip: Ipv4Addr,
	port: u16,
}

impl SocketAddrV4 {
	pub fn new(ip: impl Into<Ipv4Addr>, port: u16) -> Self {
		Self { ip: ip.into(), port }
	}

	pub fn ip(&self) -> Ipv4Addr {
		self.ip
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	fn encode(&self) -> libc::sockaddr_in {
		// s_addr holds the octets in network order, i.e. memory order.
		libc::sockaddr_in {
			sin_family: libc::AF_INET as libc::sa_family_t,
			sin_port: self.port.to_be(),
			sin_addr: libc::in_addr { s_addr: u32::from_ne_bytes(self.ip.octets()) },
			sin_zero: [0; 8],
		}
	}

	fn decode(raw: &libc::sockaddr_in) -> Self {
		Self::new(raw.sin_addr.s_addr.to_ne_bytes(), u16::from_be(raw.sin_port))
	}
}

impl From<std::net::SocketAddrV4> for SocketAddrV4 {
	fn from(addr: std::net::SocketAddrV4) -> Self {
		Self::new(*addr.ip(), addr.port())
	}
}

impl From<SocketAddrV4> for std::net::SocketAddrV4 {
	fn from(addr: SocketAddrV4) -> Self {
		Self::new(addr.ip, addr.port)
	}
}

impl ToSockAddr for SocketAddrV4 {
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		let raw = self.encode();
		Some(f(
			(&raw as *const libc::sockaddr_in).cast(),
			std::mem::size_of_val(&raw) as libc::socklen_t,
		))
	}
}

impl FromSockAddr for SocketAddrV4 {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if (len as usize) < std::mem::size_of::<libc::sockaddr_in>() {
			return None;
		}
		let raw = unsafe { &*addr.cast::<libc::sockaddr_in>() };
		(raw.sin_family as libc::c_int == libc::AF_INET).then(|| Self::decode(raw))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encodes_network_order() {
		let addr = SocketAddrV4::new([127, 0, 0, 1], 8080).to_sockaddr().unwrap();
		assert_eq!(addr.family(), Some(libc::AF_INET));
		let bytes = addr.as_bytes();
		assert_eq!(&bytes[2..4], &8080u16.to_be_bytes());
		assert_eq!(&bytes[4..8], &[127, 0, 0, 1]);
	}

	#[test]
	fn decodes_what_it_encodes() {
		let addr = SocketAddrV4::from("192.168.1.20:53".parse::<std::net::SocketAddrV4>().unwrap());
		let decoded = SocketAddrV4::from_encoded(&addr.to_sockaddr().unwrap()).unwrap();
		assert_eq!(decoded, addr);
		assert_eq!(decoded.ip(), Ipv4Addr::new(192, 168, 1, 20));
	}
}
