//! Socket-level option classification.
//!
//! Transports that don't implement a SOL_SOCKET option still want to know
//! when a guest asks for one Linux supports. The tables below list those
//! options; a lookup that hits emits an "unimplemented feature" event on
//! the task's kernel. Misses are ignored.
//!
//! None of this changes what getsockopt/setsockopt return.

use crate::abi::*;
use crate::error::SyscallError;
use crate::kernel::Task;

/// Options Linux accepts for getsockopt(2) only.
pub const GET_ONLY_OPTIONS: &[i32] = &[
	SO_ACCEPTCONN,
	SO_BPF_EXTENSIONS,
	SO_COOKIE,
	SO_DOMAIN,
	SO_ERROR,
	SO_GET_FILTER,
	SO_INCOMING_NAPI_ID,
	SO_MEMINFO,
	SO_PEERCRED,
	SO_PEERGROUPS,
	SO_PEERNAME,
	SO_PEERSEC,
	SO_PROTOCOL,
	SO_SNDLOWAT,
	SO_TYPE,
];

/// Options Linux accepts for setsockopt(2) only.
pub const SET_ONLY_OPTIONS: &[i32] = &[
	SO_ATTACH_BPF,
	SO_ATTACH_FILTER,
	SO_ATTACH_REUSEPORT_CBPF,
	SO_ATTACH_REUSEPORT_EBPF,
	SO_CNX_ADVICE,
	SO_DETACH_FILTER,
	SO_RCVBUFFORCE,
	SO_SNDBUFFORCE,
];

/// Options Linux accepts on both paths.
pub const COMMON_OPTIONS: &[i32] = &[
	SO_BINDTODEVICE,
	SO_BROADCAST,
	SO_BSDCOMPAT,
	SO_BUSY_POLL,
	SO_DEBUG,
	SO_DONTROUTE,
	SO_INCOMING_CPU,
	SO_KEEPALIVE,
	SO_LINGER,
	SO_LOCK_FILTER,
	SO_MARK,
	SO_MAX_PACING_RATE,
	SO_NOFCS,
	SO_NO_CHECK,
	SO_OOBINLINE,
	SO_PASSCRED,
	SO_PASSSEC,
	SO_PEEK_OFF,
	SO_PRIORITY,
	SO_RCVBUF,
	SO_RCVLOWAT,
	SO_RCVTIMEO,
	SO_REUSEADDR,
	SO_REUSEPORT,
	SO_RXQ_OVFL,
	SO_SELECT_ERR_QUEUE,
	SO_SNDBUF,
	SO_SNDTIMEO,
	SO_TIMESTAMP,
	SO_TIMESTAMPING,
	SO_TIMESTAMPNS,
	SO_TXTIME,
	SO_WIFI_STATUS,
	SO_ZEROCOPY,
];

/// Emits an unimplemented event if `name` is a valid SOL_SOCKET option for
/// getsockopt(2).
pub fn get_sock_opt_emit_unimplemented_event(task: &dyn Task, name: i32) {
	if GET_ONLY_OPTIONS.contains(&name) {
		emit(task, "getsockopt", name);
	} else {
		emit_unimplemented_event(task, name);
	}
}

/// Emits an unimplemented event if `name` is a valid SOL_SOCKET option for
/// setsockopt(2).
pub fn set_sock_opt_emit_unimplemented_event(task: &dyn Task, name: i32) {
	if SET_ONLY_OPTIONS.contains(&name) {
		emit(task, "setsockopt", name);
	} else {
		emit_unimplemented_event(task, name);
	}
}

/// Emits an unimplemented event if `name` is valid on both paths.
fn emit_unimplemented_event(task: &dyn Task, name: i32) {
	if COMMON_OPTIONS.contains(&name) {
		emit(task, "sockopt", name);
	}
}

fn emit(task: &dyn Task, call: &str, name: i32) {
	log::debug!(
		"{}: unimplemented SOL_SOCKET option {} ({}) from tid {}",
		call,
		option_name(name),
		name,
		task.thread_id().0
	);
	task.kernel().emit_unimplemented_event(task.thread_id());
}

/// Fails a getsockopt(2) the transport doesn't handle.
///
/// Records telemetry for SOL_SOCKET options and returns `NotSupported`.
pub fn unsupported_get(task: &dyn Task, level: i32, name: i32) -> SyscallError {
	if level == SOL_SOCKET {
		get_sock_opt_emit_unimplemented_event(task, name);
	}
	SyscallError::NotSupported
}

/// Fails a setsockopt(2) the transport doesn't handle.
///
/// Records telemetry for SOL_SOCKET options and returns `NotSupported`.
pub fn unsupported_set(task: &dyn Task, level: i32, name: i32) -> SyscallError {
	if level == SOL_SOCKET {
		set_sock_opt_emit_unimplemented_event(task, name);
	}
	SyscallError::NotSupported
}

/// Returns the symbolic name of a SOL_SOCKET option, for log lines.
pub fn option_name(name: i32) -> &'static str {
	match name {
		SO_DEBUG => "SO_DEBUG",
		SO_REUSEADDR => "SO_REUSEADDR",
		SO_TYPE => "SO_TYPE",
		SO_ERROR => "SO_ERROR",
		SO_DONTROUTE => "SO_DONTROUTE",
		SO_BROADCAST => "SO_BROADCAST",
		SO_SNDBUF => "SO_SNDBUF",
		SO_RCVBUF => "SO_RCVBUF",
		SO_KEEPALIVE => "SO_KEEPALIVE",
		SO_OOBINLINE => "SO_OOBINLINE",
		SO_NO_CHECK => "SO_NO_CHECK",
		SO_PRIORITY => "SO_PRIORITY",
		SO_LINGER => "SO_LINGER",
		SO_BSDCOMPAT => "SO_BSDCOMPAT",
		SO_REUSEPORT => "SO_REUSEPORT",
		SO_PASSCRED => "SO_PASSCRED",
		SO_PEERCRED => "SO_PEERCRED",
		SO_RCVLOWAT => "SO_RCVLOWAT",
		SO_SNDLOWAT => "SO_SNDLOWAT",
		SO_RCVTIMEO => "SO_RCVTIMEO",
		SO_SNDTIMEO => "SO_SNDTIMEO",
		SO_BINDTODEVICE => "SO_BINDTODEVICE",
		// Also SO_GET_FILTER on the get path.
		SO_ATTACH_FILTER => "SO_ATTACH_FILTER",
		SO_DETACH_FILTER => "SO_DETACH_FILTER",
		SO_PEERNAME => "SO_PEERNAME",
		SO_TIMESTAMP => "SO_TIMESTAMP",
		SO_ACCEPTCONN => "SO_ACCEPTCONN",
		SO_PEERSEC => "SO_PEERSEC",
		SO_SNDBUFFORCE => "SO_SNDBUFFORCE",
		SO_RCVBUFFORCE => "SO_RCVBUFFORCE",
		SO_PASSSEC => "SO_PASSSEC",
		SO_TIMESTAMPNS => "SO_TIMESTAMPNS",
		SO_MARK => "SO_MARK",
		SO_TIMESTAMPING => "SO_TIMESTAMPING",
		SO_PROTOCOL => "SO_PROTOCOL",
		SO_DOMAIN => "SO_DOMAIN",
		SO_RXQ_OVFL => "SO_RXQ_OVFL",
		SO_WIFI_STATUS => "SO_WIFI_STATUS",
		SO_PEEK_OFF => "SO_PEEK_OFF",
		SO_NOFCS => "SO_NOFCS",
		SO_LOCK_FILTER => "SO_LOCK_FILTER",
		SO_SELECT_ERR_QUEUE => "SO_SELECT_ERR_QUEUE",
		SO_BUSY_POLL => "SO_BUSY_POLL",
		SO_MAX_PACING_RATE => "SO_MAX_PACING_RATE",
		SO_BPF_EXTENSIONS => "SO_BPF_EXTENSIONS",
		SO_INCOMING_CPU => "SO_INCOMING_CPU",
		SO_ATTACH_BPF => "SO_ATTACH_BPF",
		SO_ATTACH_REUSEPORT_CBPF => "SO_ATTACH_REUSEPORT_CBPF",
		SO_ATTACH_REUSEPORT_EBPF => "SO_ATTACH_REUSEPORT_EBPF",
		SO_CNX_ADVICE => "SO_CNX_ADVICE",
		SO_MEMINFO => "SO_MEMINFO",
		SO_INCOMING_NAPI_ID => "SO_INCOMING_NAPI_ID",
		SO_COOKIE => "SO_COOKIE",
		SO_PEERGROUPS => "SO_PEERGROUPS",
		SO_ZEROCOPY => "SO_ZEROCOPY",
		SO_TXTIME => "SO_TXTIME",
		_ => "unknown",
	}
}
