//! Control-command construction and the per-command resource guard.
//!
//! A command's lifetime is owned by its [`CommandContext`]: the transfer
//! buffer and the ledger slot are released when the context is dropped,
//! whether the transport completes it, rejects it, or simply drops it.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dsbridge_errors::{FilterError, FilterResult, TransferError, TransferStatus};
use dsbridge_hid_ds3_protocol::{
    ENABLE_PAYLOAD, ENABLE_REPORT_VALUE, HID_INTERFACE, OUTPUT_REPORT_VALUE, requests,
};
use serde::Serialize;
use tracing::{debug, error, trace};

use crate::ports::ControlPipe;

/// `bmRequestType` for a class request to an interface, host to device.
pub const CLASS_INTERFACE_OUT: u8 = 0x21;

/// USB setup packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupPacket {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

impl SetupPacket {
    /// Wire encoding (little-endian fields).
    pub fn to_bytes(&self) -> [u8; 8] {
        let [v0, v1] = self.value.to_le_bytes();
        let [i0, i1] = self.index.to_le_bytes();
        let [l0, l1] = self.length.to_le_bytes();
        [self.request_type, self.request, v0, v1, i0, i1, l0, l1]
    }
}

/// Which of the two recurring commands a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Feature report that switches the controller into streaming mode.
    Enable,
    /// Output report carrying the current rumble and LED state.
    OutputPush,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Enable => f.write_str("enable"),
            CommandKind::OutputPush => f.write_str("output-push"),
        }
    }
}

/// A class request to send, with its payload borrowed from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCommand<'a> {
    pub kind: CommandKind,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub payload: &'a [u8],
}

impl ControlCommand<'static> {
    /// `SET_REPORT(Feature, 0xF4)` with the enable payload.
    pub fn ds3_enable() -> Self {
        Self {
            kind: CommandKind::Enable,
            request: requests::SET_REPORT,
            value: ENABLE_REPORT_VALUE,
            index: HID_INTERFACE,
            payload: &ENABLE_PAYLOAD,
        }
    }
}

impl<'a> ControlCommand<'a> {
    /// `SET_REPORT(Output, 0x01)` carrying `native_output`.
    pub fn ds3_output(native_output: &'a [u8]) -> Self {
        Self {
            kind: CommandKind::OutputPush,
            request: requests::SET_REPORT,
            value: OUTPUT_REPORT_VALUE,
            index: HID_INTERFACE,
            payload: native_output,
        }
    }
}

/// Completion routine attached to a command.
pub type Completion = Box<dyn FnOnce(CommandKind, TransferStatus) + Send + 'static>;

/// Counts command contexts so leaks are observable.
#[derive(Debug, Default)]
pub struct CommandLedger {
    issued: AtomicU64,
    released: AtomicU64,
    submit_failures: AtomicU64,
}

/// Point-in-time copy of a [`CommandLedger`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub issued: u64,
    pub released: u64,
    pub submit_failures: u64,
}

impl LedgerStats {
    pub fn outstanding(&self) -> u64 {
        self.issued.saturating_sub(self.released)
    }
}

impl CommandLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::AcqRel)
    }

    fn record_release(&self) {
        self.released.fetch_add(1, Ordering::AcqRel);
    }

    fn record_submit_failure(&self) {
        self.submit_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Contexts created and not yet dropped.
    pub fn outstanding(&self) -> u64 {
        self.stats().outstanding()
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            released: self.released.load(Ordering::Acquire),
            issued: self.issued.load(Ordering::Acquire),
            submit_failures: self.submit_failures.load(Ordering::Relaxed),
        }
    }
}

/// One outstanding control command.
///
/// Owns the transfer buffer and the completion routine. The transport calls
/// [`CommandContext::complete`] exactly once; dropping the context without
/// completing it releases the same resources.
pub struct CommandContext {
    id: u64,
    kind: CommandKind,
    setup: SetupPacket,
    buffer: Vec<u8>,
    completion: Option<Completion>,
    ledger: Arc<CommandLedger>,
}

impl CommandContext {
    /// Allocate the transfer buffer and format the setup packet for `command`.
    ///
    /// # Errors
    ///
    /// [`FilterError::AllocationFailed`] if the buffer cannot be reserved and
    /// [`FilterError::FormattingFailed`] if the payload does not fit `wLength`.
    /// No ledger slot is taken on failure.
    pub fn prepare(
        command: &ControlCommand<'_>,
        completion: Completion,
        ledger: &Arc<CommandLedger>,
    ) -> FilterResult<Self> {
        let length = u16::try_from(command.payload.len()).map_err(|e| {
            FilterError::FormattingFailed(format!(
                "{} byte payload exceeds wLength: {e}",
                command.payload.len()
            ))
        })?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(command.payload.len())
            .map_err(|e| {
                debug!(kind = %command.kind, error = %e, "transfer buffer reservation failed");
                FilterError::AllocationFailed {
                    bytes: command.payload.len(),
                }
            })?;
        buffer.extend_from_slice(command.payload);

        let setup = SetupPacket {
            request_type: CLASS_INTERFACE_OUT,
            request: command.request,
            value: command.value,
            index: command.index,
            length,
        };

        let id = ledger.record_issue();
        trace!(id, kind = %command.kind, "command context created");

        Ok(Self {
            id,
            kind: command.kind,
            setup,
            buffer,
            completion: Some(completion),
            ledger: Arc::clone(ledger),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn setup(&self) -> &SetupPacket {
        &self.setup
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Run the completion routine, then release the context.
    pub fn complete(mut self, status: TransferStatus) {
        if let Some(completion) = self.completion.take() {
            completion(self.kind, status);
        }
    }
}

impl Drop for CommandContext {
    fn drop(&mut self) {
        self.ledger.record_release();
        trace!(id = self.id, kind = %self.kind, "command context released");
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("setup", &self.setup)
            .field("buffer_len", &self.buffer.len())
            .finish()
    }
}

/// Hand a prepared context to the transport.
///
/// # Errors
///
/// [`FilterError::SubmitFailed`] if the transport refuses the request. The
/// context has been dropped by then and its completion never runs.
pub fn submit_command(pipe: &dyn ControlPipe, context: CommandContext) -> FilterResult<()> {
    let kind = context.kind();
    let ledger = Arc::clone(&context.ledger);
    pipe.submit(context).map_err(|e: TransferError| {
        ledger.record_submit_failure();
        error!(%kind, error = %e, "failed to submit control request");
        FilterError::SubmitFailed(e)
    })
}

/// Build a class/interface control request for `command` and submit it.
///
/// # Errors
///
/// See [`CommandContext::prepare`] and [`submit_command`].
pub fn send_control_request(
    pipe: &dyn ControlPipe,
    ledger: &Arc<CommandLedger>,
    command: &ControlCommand<'_>,
    completion: Completion,
) -> FilterResult<()> {
    let context = CommandContext::prepare(command, completion, ledger).inspect_err(|e| {
        error!(kind = %command.kind, error = %e, "failed to build control request");
    })?;
    submit_command(pipe, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockControlPipe;
    use parking_lot::Mutex;

    fn noop() -> Completion {
        Box::new(|_, _| {})
    }

    #[test]
    fn test_enable_setup_packet() {
        let ledger = Arc::new(CommandLedger::new());
        let ctx = CommandContext::prepare(&ControlCommand::ds3_enable(), noop(), &ledger)
            .expect("enable command should prepare");
        assert_eq!(
            ctx.setup().to_bytes(),
            [0x21, 0x09, 0xF4, 0x03, 0x00, 0x00, 0x04, 0x00]
        );
        assert_eq!(ctx.buffer(), &[0x42, 0x0C, 0x00, 0x00]);
        assert_eq!(ledger.outstanding(), 1);
        drop(ctx);
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn test_output_setup_packet() {
        let ledger = Arc::new(CommandLedger::new());
        let payload = [0u8; 48];
        let ctx = CommandContext::prepare(&ControlCommand::ds3_output(&payload), noop(), &ledger)
            .expect("output command should prepare");
        assert_eq!(
            ctx.setup().to_bytes(),
            [0x21, 0x09, 0x01, 0x02, 0x00, 0x00, 0x30, 0x00]
        );
        assert_eq!(ctx.kind(), CommandKind::OutputPush);
    }

    #[test]
    fn test_oversized_payload_fails_formatting() {
        let ledger = Arc::new(CommandLedger::new());
        let payload = vec![0u8; usize::from(u16::MAX) + 1];
        let result = CommandContext::prepare(&ControlCommand::ds3_output(&payload), noop(), &ledger);
        match result {
            Err(FilterError::FormattingFailed(message)) => {
                assert!(message.contains("65536 byte payload"), "{message}");
                assert!(message.contains("out of range"), "{message}");
            }
            other => panic!("expected formatting failure, got {other:?}"),
        }
        assert_eq!(ledger.stats(), LedgerStats::default());
    }

    #[test]
    fn test_completion_runs_once_then_releases() {
        let ledger = Arc::new(CommandLedger::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let ctx = CommandContext::prepare(
            &ControlCommand::ds3_enable(),
            Box::new(move |kind, status| sink.lock().push((kind, status))),
            &ledger,
        )
        .expect("enable command should prepare");

        ctx.complete(Ok(4));
        assert_eq!(*seen.lock(), vec![(CommandKind::Enable, Ok(4))]);
        assert_eq!(ledger.stats().released, 1);
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn test_submit_failure_releases_context() {
        let pipe = MockControlPipe::new();
        pipe.reject_submissions(Some(TransferError::Busy));
        let ledger = Arc::new(CommandLedger::new());
        let called = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&called);

        let result = send_control_request(
            &pipe,
            &ledger,
            &ControlCommand::ds3_enable(),
            Box::new(move |_, _| *flag.lock() = true),
        );

        assert_eq!(result, Err(FilterError::SubmitFailed(TransferError::Busy)));
        assert!(!*called.lock());
        let stats = ledger.stats();
        assert_eq!(stats.issued, 1);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.submit_failures, 1);
    }

    #[test]
    fn test_send_control_request_completes_through_pipe() {
        let pipe = MockControlPipe::new();
        let ledger = Arc::new(CommandLedger::new());
        let status = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&status);

        send_control_request(
            &pipe,
            &ledger,
            &ControlCommand::ds3_enable(),
            Box::new(move |_, s| *slot.lock() = Some(s)),
        )
        .expect("submission should succeed");

        assert_eq!(*status.lock(), Some(Ok(4)));
        assert_eq!(ledger.outstanding(), 0);
        let submitted = pipe.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].kind, CommandKind::Enable);
        assert_eq!(submitted[0].payload, ENABLE_PAYLOAD.to_vec());
    }
}
