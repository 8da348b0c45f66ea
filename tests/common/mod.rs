//! Test doubles: a task, a counting kernel, an in-memory loopback
//! transport and providers with scripted answers.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use sockmux::abi::{SO_RCVTIMEO, SO_SNDTIMEO, SOL_SOCKET};
use sockmux::socket::options;
use sockmux::{
	Accepted, Context, ControlMessages, Creation, Device, EventMask, Fd, File, FileOperations,
	FileOwner, FromSockAddr, Kernel, Provider, Received, SendReceiveTimeout, Sent, SockAddr, SockFlags,
	SockName, SockType, Socket, Sockfs, SyscallError, Task, ThreadId, ToSockAddr, UnixAddr,
};

/// Counts unimplemented-feature events.
#[derive(Default)]
pub struct CountingKernel {
	events: Mutex<Vec<ThreadId>>,
}

impl CountingKernel {
	pub fn events(&self) -> Vec<ThreadId> {
		self.events.lock().unwrap().clone()
	}
}

impl Kernel for CountingKernel {
	fn emit_unimplemented_event(&self, tid: ThreadId) {
		self.events.lock().unwrap().push(tid);
	}
}

pub struct TestTask {
	pub tid: ThreadId,
	pub owner: FileOwner,
	pub kernel: CountingKernel,
}

impl TestTask {
	pub fn new() -> Self {
		Self {
			tid: ThreadId(100),
			owner: FileOwner { uid: 1000, gid: 1000 },
			kernel: CountingKernel::default(),
		}
	}

	pub fn event_count(&self) -> usize {
		self.kernel.events().len()
	}
}

impl Context for TestTask {
	fn file_owner(&self) -> FileOwner {
		self.owner
	}
}

impl Task for TestTask {
	fn thread_id(&self) -> ThreadId {
		self.tid
	}

	fn kernel(&self) -> &dyn Kernel {
		&self.kernel
	}
}

/// Knobs shared between a test and the sockets it created.
#[derive(Default)]
pub struct Script {
	/// recv_msg delivers at most this many bytes, then reports `Interrupted`.
	pub interrupt_after: Mutex<Option<usize>>,
	/// send_msg fails with this error without consuming anything.
	pub send_error: Mutex<Option<SyscallError>>,
	/// Number of sockets released.
	pub released: AtomicUsize,
}

impl Script {
	pub fn released(&self) -> usize {
		self.released.load(Ordering::SeqCst)
	}
}

/// A socket that sends into its own receive queue.
pub struct LoopbackSocket {
	stype: SockType,
	queue: Mutex<VecDeque<u8>>,
	control: Mutex<ControlMessages>,
	bound: Mutex<Option<UnixAddr>>,
	peer: Mutex<Option<SockAddr>>,
	listening: Mutex<bool>,
	timeouts: SendReceiveTimeout,
	script: Arc<Script>,
}

/// Address connect() refuses.
pub fn refused_addr() -> UnixAddr {
	UnixAddr::abstract_socket("nobody-home")
}

impl LoopbackSocket {
	pub fn new(stype: SockType, script: Arc<Script>) -> Self {
		Self {
			stype,
			queue: Mutex::new(VecDeque::new()),
			control: Mutex::new(ControlMessages::None),
			bound: Mutex::new(None),
			peer: Mutex::new(None),
			listening: Mutex::new(false),
			timeouts: SendReceiveTimeout::new(),
			script,
		}
	}

	fn decode(sockaddr: &[u8]) -> Result<UnixAddr, SyscallError> {
		UnixAddr::from_encoded(&SockAddr::from_bytes(sockaddr.to_vec())).ok_or(SyscallError::InvalidArgument)
	}
}

impl FileOperations for LoopbackSocket {
	fn read(&self, task: &dyn Task, dst: &mut [u8]) -> sockmux::Result<usize> {
		self.recv_msg(task, dst, 0, None, false, 0).into_result()
	}

	fn write(&self, task: &dyn Task, src: &[u8]) -> sockmux::Result<usize> {
		let mut control = ControlMessages::None;
		self.send_msg(task, src, None, 0, None, &mut control).into_result()
	}

	fn readiness(&self, mask: EventMask) -> EventMask {
		let mut ready = EventMask::WRITABLE;
		if !self.queue.lock().unwrap().is_empty() {
			ready |= EventMask::READABLE;
		}
		ready & mask
	}

	fn release(&self) {
		self.script.released.fetch_add(1, Ordering::SeqCst);
	}
}

impl Socket for LoopbackSocket {
	fn connect(&self, _task: &dyn Task, sockaddr: &[u8], _blocking: bool) -> sockmux::Result<()> {
		let addr = Self::decode(sockaddr)?;
		if addr == refused_addr() {
			return Err(SyscallError::ConnectionRefused);
		}
		*self.peer.lock().unwrap() = Some(SockAddr::from_bytes(sockaddr.to_vec()));
		Ok(())
	}

	fn accept(&self, _task: &dyn Task, peer_requested: bool, _flags: i32, blocking: bool) -> sockmux::Result<Accepted> {
		if !*self.listening.lock().unwrap() {
			return Err(SyscallError::InvalidArgument);
		}
		if !blocking {
			return Err(SyscallError::WouldBlock);
		}
		let peer = UnixAddr::new("/run/peer.sock").to_sockaddr().map(SockAddr::named);
		Ok(Accepted {
			fd: Fd(7),
			peer: if peer_requested { peer } else { None },
		})
	}

	fn bind(&self, _task: &dyn Task, sockaddr: &[u8]) -> sockmux::Result<()> {
		let addr = Self::decode(sockaddr)?;
		let mut bound = self.bound.lock().unwrap();
		if bound.is_some() {
			return Err(SyscallError::InvalidArgument);
		}
		*bound = Some(addr);
		Ok(())
	}

	fn listen(&self, _task: &dyn Task, backlog: i32) -> sockmux::Result<()> {
		if self.stype != SockType::STREAM {
			return Err(SyscallError::Transport { errno: libc::EOPNOTSUPP });
		}
		if backlog < 0 {
			return Err(SyscallError::InvalidArgument);
		}
		*self.listening.lock().unwrap() = true;
		Ok(())
	}

	fn shutdown(&self, _task: &dyn Task, how: i32) -> sockmux::Result<()> {
		match how {
			libc::SHUT_RD | libc::SHUT_WR | libc::SHUT_RDWR => Ok(()),
			_ => Err(SyscallError::InvalidArgument),
		}
	}

	fn get_sock_opt(&self, task: &dyn Task, level: i32, name: i32, _out_len: usize) -> sockmux::Result<Vec<u8>> {
		if level == SOL_SOCKET {
			if let Some(tv) = self.timeouts.get_timeval(name) {
				return Ok(tv);
			}
		}
		Err(options::unsupported_get(task, level, name))
	}

	fn set_sock_opt(&self, task: &dyn Task, level: i32, name: i32, opt: &[u8]) -> sockmux::Result<()> {
		if level == SOL_SOCKET && (name == SO_RCVTIMEO || name == SO_SNDTIMEO) {
			if let Some(result) = self.timeouts.set_timeval(name, opt) {
				return result;
			}
		}
		Err(options::unsupported_set(task, level, name))
	}

	fn get_sock_name(&self, _task: &dyn Task) -> sockmux::Result<SockName> {
		let addr = self.bound.lock().unwrap().clone().unwrap_or_else(UnixAddr::unnamed);
		addr.to_sockaddr().map(SockAddr::named).ok_or(SyscallError::InvalidArgument)
	}

	fn get_peer_name(&self, _task: &dyn Task) -> sockmux::Result<SockName> {
		self.peer
			.lock()
			.unwrap()
			.clone()
			.map(SockAddr::named)
			.ok_or(SyscallError::Transport { errno: libc::ENOTCONN })
	}

	fn recv_msg(
		&self,
		task: &dyn Task,
		dst: &mut [u8],
		flags: i32,
		deadline: Option<Instant>,
		sender_requested: bool,
		_control_data_len: u64,
	) -> Received {
		let mut queue = self.queue.lock().unwrap();
		if queue.is_empty() {
			let dontwait = flags & libc::MSG_DONTWAIT != 0 || self.timeouts.recv_timeout() < 0;
			return Received::err(match deadline {
				Some(_) if !dontwait => SyscallError::TimedOut,
				_ => SyscallError::WouldBlock,
			});
		}

		let limit = self.script.interrupt_after.lock().unwrap().unwrap_or(usize::MAX);
		let n = dst.len().min(queue.len()).min(limit);
		for (slot, byte) in dst.iter_mut().zip(queue.drain(..n)) {
			*slot = byte;
		}
		let error = if n == limit && limit < dst.len() { Some(SyscallError::Interrupted) } else { None };

		Received {
			n,
			sender: if sender_requested { self.get_sock_name(task).ok() } else { None },
			control: self.control.lock().unwrap().take(),
			error,
		}
	}

	fn send_msg(
		&self,
		_task: &dyn Task,
		src: &[u8],
		_to: Option<&[u8]>,
		_flags: i32,
		_deadline: Option<Instant>,
		control: &mut ControlMessages,
	) -> Sent {
		if let Some(err) = self.script.send_error.lock().unwrap().clone() {
			return Sent::err(err);
		}
		self.queue.lock().unwrap().extend(src);
		if !control.is_empty() {
			*self.control.lock().unwrap() = control.take();
		}
		Sent::ok(src.len())
	}

	fn timeouts(&self) -> &SendReceiveTimeout {
		&self.timeouts
	}
}

/// What a scripted provider answers.
#[derive(Clone)]
pub enum Answer {
	Decline,
	Accept,
	Fail(SyscallError),
}

/// Provider whose answer is fixed by the test. Every call is logged.
pub struct ScriptedProvider {
	pub label: &'static str,
	pub answer: Answer,
	pub calls: Arc<Mutex<Vec<&'static str>>>,
	pub fs: Sockfs,
	pub script: Arc<Script>,
}

impl ScriptedProvider {
	pub fn new(label: &'static str, answer: Answer, calls: &Arc<Mutex<Vec<&'static str>>>) -> Self {
		Self {
			label,
			answer,
			calls: Arc::clone(calls),
			fs: Sockfs::new(Arc::new(Device::anonymous())),
			script: Arc::new(Script::default()),
		}
	}

	fn file(&self, task: &dyn Task, stype: SockType, flags: SockFlags) -> sockmux::Result<File> {
		let socket = Box::new(LoopbackSocket::new(stype, Arc::clone(&self.script)));
		self.fs.new_file(task, socket, flags)
	}
}

impl Provider for ScriptedProvider {
	fn socket(&self, task: &dyn Task, stype: SockType, _protocol: i32, flags: SockFlags) -> Creation<File> {
		self.calls.lock().unwrap().push(self.label);
		match &self.answer {
			Answer::Decline => Creation::Declined,
			Answer::Fail(err) => Creation::Failed(err.clone()),
			Answer::Accept => self.file(task, stype, flags).map(Some).into(),
		}
	}

	fn pair(&self, task: &dyn Task, stype: SockType, _protocol: i32, flags: SockFlags) -> Creation<(File, File)> {
		self.calls.lock().unwrap().push(self.label);
		match &self.answer {
			Answer::Decline => Creation::Declined,
			Answer::Fail(err) => Creation::Failed(err.clone()),
			Answer::Accept => {
				let first = self.file(task, stype, flags);
				let second = self.file(task, stype, flags);
				match (first, second) {
					(Ok(a), Ok(b)) => Creation::Created((a, b)),
					(Err(err), _) | (_, Err(err)) => Creation::Failed(err),
				}
			}
		}
	}
}

/// Provider that only serves stream sockets, like a typical TCP stack.
pub struct StreamOnlyProvider {
	pub fs: Sockfs,
	pub script: Arc<Script>,
}

impl StreamOnlyProvider {
	pub fn new() -> Self {
		Self {
			fs: Sockfs::new(Arc::new(Device::anonymous())),
			script: Arc::new(Script::default()),
		}
	}
}

impl Provider for StreamOnlyProvider {
	fn socket(&self, task: &dyn Task, stype: SockType, protocol: i32, flags: SockFlags) -> Creation<File> {
		if stype != SockType::STREAM || (protocol != 0 && protocol != libc::IPPROTO_TCP) {
			return Creation::Declined;
		}
		let socket = Box::new(LoopbackSocket::new(stype, Arc::clone(&self.script)));
		self.fs.new_file(task, socket, flags).map(Some).into()
	}

	fn pair(&self, _task: &dyn Task, _stype: SockType, _protocol: i32, _flags: SockFlags) -> Creation<(File, File)> {
		Creation::Declined
	}
}

/// Provider that reports results as separate object and error slots, the
/// way older transports do.
pub struct LegacyProvider {
	/// Which halves get created.
	pub halves: (bool, bool),
	pub error: Option<SyscallError>,
	pub fs: Sockfs,
	pub script: Arc<Script>,
}

impl LegacyProvider {
	pub fn new(halves: (bool, bool), error: Option<SyscallError>) -> Self {
		Self {
			halves,
			error,
			fs: Sockfs::new(Arc::new(Device::anonymous())),
			script: Arc::new(Script::default()),
		}
	}

	fn half(&self, wanted: bool, task: &dyn Task, stype: SockType, flags: SockFlags) -> Option<File> {
		if !wanted {
			return None;
		}
		let socket = Box::new(LoopbackSocket::new(stype, Arc::clone(&self.script)));
		self.fs.new_file(task, socket, flags).ok()
	}
}

impl Provider for LegacyProvider {
	fn socket(&self, task: &dyn Task, stype: SockType, _protocol: i32, flags: SockFlags) -> Creation<File> {
		let file = self.half(self.halves.0, task, stype, flags);
		Creation::from_parts(file, self.error.clone())
	}

	fn pair(&self, task: &dyn Task, stype: SockType, _protocol: i32, flags: SockFlags) -> Creation<(File, File)> {
		let first = self.half(self.halves.0, task, stype, flags);
		let second = self.half(self.halves.1, task, stype, flags);
		Creation::from_pair_parts(first, second, self.error.clone())
	}
}
