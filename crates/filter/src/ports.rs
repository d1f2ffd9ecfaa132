//! Boundaries to the collaborators the filter does not own: the control
//! transport to the device and the virtual-controller bus.

use dsbridge_errors::{FilterResult, TransferError};
use dsbridge_xusb::XusbSubmitReport;

use crate::command::CommandContext;

/// Control endpoint of the physical device.
///
/// `submit` takes ownership of the context. On `Ok` the transport must
/// eventually call [`CommandContext::complete`] (or drop the context if the
/// device goes away); completion may run on any thread. On `Err` the context
/// is dropped and its completion never runs.
pub trait ControlPipe: Send + Sync {
    fn submit(&self, context: CommandContext) -> Result<(), TransferError>;
}

/// Virtual-controller bus that consumes XUSB reports.
pub trait VirtualPad: Send + Sync {
    fn submit_report(&self, report: XusbSubmitReport) -> FilterResult<()>;
}

/// Mock implementations for testing
pub mod mock {
    use super::*;
    use crate::command::{CommandKind, SetupPacket};
    use dsbridge_errors::{FilterError, TransferStatus};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// A command as seen by the transport.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SubmittedCommand {
        pub kind: CommandKind,
        pub setup: SetupPacket,
        pub payload: Vec<u8>,
    }

    #[derive(Default)]
    struct PipeState {
        hold: bool,
        reject: Option<TransferError>,
        script: VecDeque<TransferStatus>,
        pending: VecDeque<CommandContext>,
        submitted: Vec<SubmittedCommand>,
    }

    /// In-memory control pipe.
    ///
    /// By default every command completes synchronously inside `submit`, with
    /// the next scripted status or a full-length success. In holding mode
    /// commands stay pending until [`MockControlPipe::complete_next`].
    #[derive(Clone, Default)]
    pub struct MockControlPipe {
        state: Arc<Mutex<PipeState>>,
    }

    impl MockControlPipe {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn holding() -> Self {
            let pipe = Self::default();
            pipe.state.lock().hold = true;
            pipe
        }

        /// Queue completion statuses for the next immediately completed commands.
        pub fn script(&self, statuses: impl IntoIterator<Item = TransferStatus>) {
            self.state.lock().script.extend(statuses);
        }

        /// Refuse every submission with `error` until cleared with `None`.
        pub fn reject_submissions(&self, error: Option<TransferError>) {
            self.state.lock().reject = error;
        }

        /// Complete the oldest pending command. Returns `false` if none is pending.
        pub fn complete_next(&self, status: TransferStatus) -> bool {
            let next = self.state.lock().pending.pop_front();
            match next {
                Some(context) => {
                    context.complete(status);
                    true
                }
                None => false,
            }
        }

        /// Drop every pending command without completing it.
        pub fn drop_pending(&self) -> usize {
            let pending: Vec<_> = self.state.lock().pending.drain(..).collect();
            pending.len()
        }

        pub fn pending_count(&self) -> usize {
            self.state.lock().pending.len()
        }

        pub fn submitted(&self) -> Vec<SubmittedCommand> {
            self.state.lock().submitted.clone()
        }

        pub fn submitted_count(&self, kind: CommandKind) -> usize {
            self.state
                .lock()
                .submitted
                .iter()
                .filter(|c| c.kind == kind)
                .count()
        }
    }

    impl ControlPipe for MockControlPipe {
        fn submit(&self, context: CommandContext) -> Result<(), TransferError> {
            let mut state = self.state.lock();
            if let Some(error) = state.reject.clone() {
                drop(state);
                drop(context);
                return Err(error);
            }

            state.submitted.push(SubmittedCommand {
                kind: context.kind(),
                setup: *context.setup(),
                payload: context.buffer().to_vec(),
            });

            if state.hold {
                state.pending.push_back(context);
                return Ok(());
            }

            let status = state
                .script
                .pop_front()
                .unwrap_or(Ok(context.buffer().len()));
            drop(state);
            context.complete(status);
            Ok(())
        }
    }

    /// In-memory virtual-controller bus recording every report.
    #[derive(Clone, Default)]
    pub struct MockVirtualPad {
        reports: Arc<Mutex<Vec<XusbSubmitReport>>>,
        failure: Arc<Mutex<Option<String>>>,
    }

    impl MockVirtualPad {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_with(&self, message: Option<&str>) {
            *self.failure.lock() = message.map(str::to_owned);
        }

        pub fn reports(&self) -> Vec<XusbSubmitReport> {
            self.reports.lock().clone()
        }
    }

    impl VirtualPad for MockVirtualPad {
        fn submit_report(&self, report: XusbSubmitReport) -> FilterResult<()> {
            if let Some(message) = self.failure.lock().clone() {
                return Err(FilterError::VirtualPad(message));
            }
            self.reports.lock().push(report);
            Ok(())
        }
    }
}
