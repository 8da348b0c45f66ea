//! Socket dispatch and lifecycle for a user-space kernel.
//!
//! Transports register a [`Provider`] per address family with a
//! [`RegistryBuilder`]; the syscall layer asks the resulting [`Registry`]
//! for sockets and drives them through the [`Socket`] contract.

pub mod abi;
pub mod addr;
pub mod fs;
pub mod kernel;
pub mod socket;
mod error;

pub use self::error::{Result, SyscallError};
pub use self::addr::{Domain, FromSockAddr, Ipv4, Ipv6, SockAddr, SockName, SocketAddrV4, SocketAddrV6, ToSockAddr, Unix, UnixAddr};
pub use self::fs::{Device, Dirent, EventMask, File, FileFlags, FileOperations};
pub use self::kernel::{Context, Fd, FileOwner, Kernel, Task, ThreadId};
pub use self::socket::{Accepted, Blocking, ControlMessages, Creation, Credentials, IpControlMessages,
					   Provider, Received, Registry, RegistryBuilder, SendReceiveTimeout, Sent,
					   SockFlags, SockType, Socket, Sockfs, SockfsConfig, UnixControlMessages,
					   new_dirent};
pub use self::socket::options::{get_sock_opt_emit_unimplemented_event, set_sock_opt_emit_unimplemented_event};
