use std::sync::Arc;

use crate::fs::File;

/// Sender credentials carried by SCM_CREDENTIALS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
	pub pid: i32,
	pub uid: u32,
	pub gid: u32,
}

/// Ancillary data produced or consumed by local-domain transports.
#[derive(Debug, Default)]
pub struct UnixControlMessages {
	/// Files passed with SCM_RIGHTS.
	pub rights: Vec<Arc<File>>,
	pub credentials: Option<Credentials>,
}

impl UnixControlMessages {
	pub fn is_empty(&self) -> bool {
		self.rights.is_empty() && self.credentials.is_none()
	}
}

/// Ancillary data produced or consumed by network-stack transports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IpControlMessages {
	/// Receive timestamp in nanoseconds (SO_TIMESTAMP).
	pub timestamp: Option<i64>,
	/// Bytes left in the receive queue (TCP_INQ).
	pub inq: Option<i32>,
	/// Type of service of the received packet (IP_TOS).
	pub tos: Option<u8>,
}

impl IpControlMessages {
	pub fn is_empty(&self) -> bool {
		self.timestamp.is_none() && self.inq.is_none() && self.tos.is_none()
	}
}

/// Control messages exchanged between the syscall layer and a transport.
///
/// At most one alternative is populated, chosen by the transport that
/// produced or will consume it.
#[derive(Debug, Default)]
pub enum ControlMessages {
	#[default]
	None,
	Unix(UnixControlMessages),
	Ip(IpControlMessages),
}

impl ControlMessages {
	/// True if there is no ancillary data to deliver.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::None => true,
			Self::Unix(unix) => unix.is_empty(),
			Self::Ip(ip) => ip.is_empty(),
		}
	}

	pub fn unix(&self) -> Option<&UnixControlMessages> {
		match self {
			Self::Unix(unix) => Some(unix),
			_ => None,
		}
	}

	pub fn ip(&self) -> Option<&IpControlMessages> {
		match self {
			Self::Ip(ip) => Some(ip),
			_ => None,
		}
	}

	/// Takes the messages, leaving `None` behind.
	///
	/// Transports call this from `send_msg` only once the send is committed.
	pub fn take(&mut self) -> Self {
		std::mem::take(self)
	}
}

impl From<UnixControlMessages> for ControlMessages {
	fn from(unix: UnixControlMessages) -> Self {
		Self::Unix(unix)
	}
}

impl From<IpControlMessages> for ControlMessages {
	fn from(ip: IpControlMessages) -> Self {
		Self::Ip(ip)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_alternatives_count_as_empty() {
		assert!(ControlMessages::None.is_empty());
		assert!(ControlMessages::from(UnixControlMessages::default()).is_empty());
		let ip = IpControlMessages { tos: Some(0x10), ..Default::default() };
		assert!(!ControlMessages::from(ip).is_empty());
	}

	#[test]
	fn take_leaves_none() {
		let creds = Credentials { pid: 1, uid: 0, gid: 0 };
		let mut cms: ControlMessages = UnixControlMessages { rights: Vec::new(), credentials: Some(creds) }.into();
		let taken = cms.take();
		assert!(matches!(cms, ControlMessages::None));
		assert_eq!(taken.unix().unwrap().credentials, Some(creds));
		assert!(taken.ip().is_none());
	}
}
