//! DualShock 3 USB filter
//!
//! Sits between a DualShock 3 and the host gamepad stack. It answers
//! descriptor queries with canned blobs, rewrites input reports in place
//! into the canonical layout while forwarding an XUSB report to a virtual
//! controller, merges host output reports into the controller's native
//! output buffer, and runs the enable/output command lifecycle.
//!
//! The transport and the virtual-controller bus are reached only through the
//! [`ControlPipe`] and [`VirtualPad`] traits; [`ports::mock`] provides
//! in-memory versions of both.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod command;
pub mod config;
pub mod descriptors;
pub mod device;
pub mod input;
pub mod logging;
pub mod output;
pub mod ports;
pub mod sequencer;
pub mod variant;

pub use command::{
    CommandContext, CommandKind, CommandLedger, Completion, ControlCommand, LedgerStats,
    SetupPacket, send_control_request, submit_command,
};
pub use config::{BridgeConfig, SequencerConfig};
pub use descriptors::{DescriptorKind, configuration_descriptor, report_descriptor, respond};
pub use device::{DeviceContext, DeviceType};
pub use input::{InputOutcome, on_input_report};
pub use logging::{LoggingConfig, init_logging};
pub use output::on_output_report;
pub use ports::{ControlPipe, VirtualPad};
pub use sequencer::{
    CommandSequencer, SequencerCounters, SequencerSnapshot, SequencerState, SequencerStateMachine,
    SequencerTiming, TimerAction, TimerKind, TimerSlots,
};
pub use variant::{Ds3Handler, VariantHandler, variant_handler};
