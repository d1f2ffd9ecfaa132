//! Enable/output command lifecycle.
//!
//! After attach the device is polled with the enable command until one
//! succeeds; from then on the native output buffer is pushed periodically.
//! [`SequencerStateMachine`] holds the decisions and is free of I/O and
//! timers; [`CommandSequencer`] drives it with tokio tasks.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use dsbridge_errors::{FilterError, FilterResult, TransferStatus};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::command::{
    CommandContext, CommandKind, CommandLedger, Completion, LedgerStats, send_control_request,
    submit_command,
};
use crate::device::DeviceContext;
use crate::ports::ControlPipe;

/// Lifecycle phase of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SequencerState {
    /// Enable command is being retried; output is not pushed.
    Enabling,
    /// Device is streaming; output is pushed periodically.
    Streaming,
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerState::Enabling => f.write_str("enabling"),
            SequencerState::Streaming => f.write_str("streaming"),
        }
    }
}

/// The two per-device timers. At most one runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimerKind {
    Enable,
    OutputPush,
}

impl TimerKind {
    fn command(self) -> CommandKind {
        match self {
            TimerKind::Enable => CommandKind::Enable,
            TimerKind::OutputPush => CommandKind::OutputPush,
        }
    }
}

/// Timer change requested by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start { timer: TimerKind, delay: Duration },
    Stop(TimerKind),
}

/// Delays before the first tick and periods between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTiming {
    pub enable_delay: Duration,
    pub enable_interval: Duration,
    pub output_delay: Duration,
    pub output_interval: Duration,
}

impl Default for SequencerTiming {
    fn default() -> Self {
        Self {
            enable_delay: Duration::from_millis(10),
            enable_interval: Duration::from_millis(100),
            output_delay: Duration::from_millis(10),
            output_interval: Duration::from_millis(10),
        }
    }
}

impl SequencerTiming {
    pub fn period(&self, timer: TimerKind) -> Duration {
        match timer {
            TimerKind::Enable => self.enable_interval,
            TimerKind::OutputPush => self.output_interval,
        }
    }
}

/// Completion tallies kept by the state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SequencerCounters {
    pub enable_successes: u64,
    pub enable_failures: u64,
    pub output_successes: u64,
    pub output_failures: u64,
}

/// Pure lifecycle decisions.
#[derive(Debug, Clone)]
pub struct SequencerStateMachine {
    state: SequencerState,
    timing: SequencerTiming,
    counters: SequencerCounters,
}

impl SequencerStateMachine {
    pub fn new(timing: SequencerTiming) -> Self {
        Self {
            state: SequencerState::Enabling,
            timing,
            counters: SequencerCounters::default(),
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn timing(&self) -> &SequencerTiming {
        &self.timing
    }

    pub fn counters(&self) -> SequencerCounters {
        self.counters
    }

    /// Device attached: start retrying the enable command.
    pub fn attach(&mut self) -> Vec<TimerAction> {
        self.state = SequencerState::Enabling;
        vec![TimerAction::Start {
            timer: TimerKind::Enable,
            delay: self.timing.enable_delay,
        }]
    }

    /// Enable command completed.
    ///
    /// The first success switches to streaming: the enable timer stops and
    /// the output timer starts. Failures leave the enable timer running.
    /// Completions that arrive after the switch are ignored.
    pub fn on_enable_completed(&mut self, status: &TransferStatus) -> Vec<TimerAction> {
        match (self.state, status) {
            (SequencerState::Streaming, _) => {
                debug!("enable completion after streaming started, ignored");
                Vec::new()
            }
            (SequencerState::Enabling, Err(e)) => {
                self.counters.enable_failures += 1;
                warn!(
                    status = %e,
                    failures = self.counters.enable_failures,
                    "enable command failed, retrying on next tick"
                );
                Vec::new()
            }
            (SequencerState::Enabling, Ok(_)) => {
                self.counters.enable_successes += 1;
                self.state = SequencerState::Streaming;
                info!("device streaming, starting output push");
                vec![
                    TimerAction::Stop(TimerKind::Enable),
                    TimerAction::Start {
                        timer: TimerKind::OutputPush,
                        delay: self.timing.output_delay,
                    },
                ]
            }
        }
    }

    /// Output push completed. Never changes state.
    pub fn on_output_completed(&mut self, status: &TransferStatus) {
        match status {
            Ok(_) => self.counters.output_successes += 1,
            Err(e) => {
                self.counters.output_failures += 1;
                debug!(status = %e, "output push failed");
            }
        }
    }
}

/// Something that can be cancelled, such as a timer task.
pub trait TimerHandle {
    fn cancel(&self);
}

impl TimerHandle for JoinHandle<()> {
    fn cancel(&self) {
        self.abort();
    }
}

/// Holds the running timer, if any. Starting one cancels the other.
#[derive(Debug)]
pub struct TimerSlots<H> {
    enable: Option<H>,
    output: Option<H>,
}

impl<H> Default for TimerSlots<H> {
    fn default() -> Self {
        Self {
            enable: None,
            output: None,
        }
    }
}

impl<H: TimerHandle> TimerSlots<H> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, timer: TimerKind) -> &mut Option<H> {
        match timer {
            TimerKind::Enable => &mut self.enable,
            TimerKind::OutputPush => &mut self.output,
        }
    }

    /// Install `handle` as the running `timer`, cancelling whatever ran before.
    pub fn start(&mut self, timer: TimerKind, handle: H) {
        self.stop_all();
        *self.slot_mut(timer) = Some(handle);
    }

    /// Cancel `timer`. Returns `false` if it was not running.
    pub fn stop(&mut self, timer: TimerKind) -> bool {
        match self.slot_mut(timer).take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&mut self) {
        self.stop(TimerKind::Enable);
        self.stop(TimerKind::OutputPush);
    }

    pub fn active(&self) -> Option<TimerKind> {
        match (&self.enable, &self.output) {
            (Some(_), _) => Some(TimerKind::Enable),
            (None, Some(_)) => Some(TimerKind::OutputPush),
            (None, None) => None,
        }
    }
}

/// Diagnostics view of a running sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequencerSnapshot {
    pub device_index: u32,
    pub state: SequencerState,
    pub active_timer: Option<TimerKind>,
    pub counters: SequencerCounters,
    pub skipped_ticks: u64,
    pub commands: LedgerStats,
}

struct Shared {
    device: Arc<DeviceContext>,
    pipe: Arc<dyn ControlPipe>,
    ledger: Arc<CommandLedger>,
    timing: SequencerTiming,
    machine: Mutex<SequencerStateMachine>,
    timers: Mutex<TimerSlots<JoinHandle<()>>>,
    skipped_ticks: AtomicU64,
    /// Set once by [`Shared::shutdown`]; no timer starts afterwards.
    stopped: AtomicBool,
    runtime: Handle,
}

impl Shared {
    fn apply(self: &Arc<Self>, actions: Vec<TimerAction>) {
        for action in actions {
            match action {
                TimerAction::Start { timer, delay } => {
                    let mut timers = self.timers.lock();
                    if self.stopped.load(Ordering::Acquire) {
                        debug!(device_index = self.device.device_index(), ?timer, "sequencer stopped, timer not started");
                        continue;
                    }
                    timers.start(timer, self.spawn_timer(timer, delay));
                    debug!(device_index = self.device.device_index(), ?timer, ?delay, "timer started");
                }
                TimerAction::Stop(timer) => {
                    if self.timers.lock().stop(timer) {
                        debug!(device_index = self.device.device_index(), ?timer, "timer stopped");
                    }
                }
            }
        }
    }

    fn spawn_timer(self: &Arc<Self>, timer: TimerKind, delay: Duration) -> JoinHandle<()> {
        let period = self.timing.period(timer).max(Duration::from_millis(1));
        let weak = Arc::downgrade(self);
        self.runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                shared.on_tick(timer);
            }
        })
    }

    fn on_tick(self: &Arc<Self>, timer: TimerKind) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }
        let outstanding = self.ledger.outstanding();
        if outstanding > 0 {
            self.skipped_ticks.fetch_add(1, Ordering::Relaxed);
            trace!(?timer, outstanding, "command in flight, tick skipped");
            return;
        }

        let result = match timer {
            TimerKind::Enable => self.issue_enable(),
            TimerKind::OutputPush => self.issue_output(),
        };
        if let Err(e) = result {
            debug!(
                device_index = self.device.device_index(),
                command = %timer.command(),
                error = %e,
                retryable = e.is_retryable(),
                "command not issued this tick"
            );
        }
    }

    fn completion(self: &Arc<Self>) -> Completion {
        let weak = Arc::downgrade(self);
        Box::new(move |kind, status| {
            if let Some(shared) = weak.upgrade() {
                shared.on_completed(kind, status);
            }
        })
    }

    fn issue_enable(self: &Arc<Self>) -> FilterResult<()> {
        let command = self.device.with_handler(|h| Ok(h.enable_command()))?;
        send_control_request(self.pipe.as_ref(), &self.ledger, &command, self.completion())
    }

    fn issue_output(self: &Arc<Self>) -> FilterResult<()> {
        let completion = self.completion();
        let context = self.device.with_handler(|h| {
            CommandContext::prepare(&h.output_command(), completion, &self.ledger)
        })?;
        submit_command(self.pipe.as_ref(), context)
    }

    /// Stop both timers for good. The flag is set under the timer lock so a
    /// concurrent `apply` cannot slip a new timer in after `stop_all`.
    fn shutdown(&self) -> bool {
        let mut timers = self.timers.lock();
        let was_running = !self.stopped.swap(true, Ordering::AcqRel);
        timers.stop_all();
        was_running
    }

    fn on_completed(self: &Arc<Self>, kind: CommandKind, status: TransferStatus) {
        trace!(device_index = self.device.device_index(), %kind, ?status, "command completed");
        let actions = {
            let mut machine = self.machine.lock();
            match kind {
                CommandKind::Enable => machine.on_enable_completed(&status),
                CommandKind::OutputPush => {
                    machine.on_output_completed(&status);
                    Vec::new()
                }
            }
        };
        self.apply(actions);
    }
}

/// Runs the enable/output lifecycle of one device on the current tokio
/// runtime. Dropping it stops both timers; commands already handed to the
/// transport still complete.
pub struct CommandSequencer {
    shared: Arc<Shared>,
}

impl CommandSequencer {
    /// Start the lifecycle for `device`: the enable timer begins ticking
    /// after `timing.enable_delay`.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnsupportedVariant`] if the device has no handler and
    /// [`FilterError::RuntimeUnavailable`] outside a tokio runtime.
    pub fn attach(
        device: Arc<DeviceContext>,
        pipe: Arc<dyn ControlPipe>,
        timing: SequencerTiming,
    ) -> FilterResult<Self> {
        if !device.has_handler() {
            return Err(FilterError::unsupported(device.device_type().name()));
        }
        let runtime =
            Handle::try_current().map_err(|e| FilterError::RuntimeUnavailable(e.to_string()))?;

        let shared = Arc::new(Shared {
            device,
            pipe,
            ledger: Arc::new(CommandLedger::new()),
            timing,
            machine: Mutex::new(SequencerStateMachine::new(timing)),
            timers: Mutex::new(TimerSlots::new()),
            skipped_ticks: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
            runtime,
        });

        let actions = shared.machine.lock().attach();
        shared.apply(actions);
        info!(
            device_index = shared.device.device_index(),
            device_type = %shared.device.device_type(),
            "command sequencer attached"
        );

        Ok(Self { shared })
    }

    pub fn state(&self) -> SequencerState {
        self.shared.machine.lock().state()
    }

    pub fn active_timer(&self) -> Option<TimerKind> {
        self.shared.timers.lock().active()
    }

    pub fn ledger(&self) -> Arc<CommandLedger> {
        Arc::clone(&self.shared.ledger)
    }

    pub fn snapshot(&self) -> SequencerSnapshot {
        let (state, counters) = {
            let machine = self.shared.machine.lock();
            (machine.state(), machine.counters())
        };
        SequencerSnapshot {
            device_index: self.shared.device.device_index(),
            state,
            active_timer: self.active_timer(),
            counters,
            skipped_ticks: self.shared.skipped_ticks.load(Ordering::Relaxed),
            commands: self.shared.ledger.stats(),
        }
    }

    /// Stop both timers. Idempotent.
    ///
    /// Commands already submitted still complete and are counted, but a late
    /// enable success no longer starts the output timer.
    pub fn stop(&self) {
        if self.shared.shutdown() {
            debug!(device_index = self.shared.device.device_index(), "command sequencer stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::Acquire)
    }
}

impl Drop for CommandSequencer {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}

impl fmt::Debug for CommandSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSequencer")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
