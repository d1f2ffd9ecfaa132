//! Command lifecycle tests against the mock control pipe.
//!
//! Time is paused, so the enable timer ticks at exactly 10 ms, 110 ms, 210 ms,
//! ... and the output timer every 10 ms after its start delay. Sleeps end
//! between ticks to keep ordering deterministic.

use std::sync::Arc;
use std::time::Duration;

use dsbridge_errors::{FilterError, TransferError};
use dsbridge_filter::command::CommandKind;
use dsbridge_filter::ports::mock::MockControlPipe;
use dsbridge_filter::{
    CommandSequencer, DeviceContext, DeviceType, SequencerState, SequencerTiming, TimerKind,
    on_output_report,
};
use tokio::time::sleep;

fn timing() -> SequencerTiming {
    SequencerTiming {
        enable_delay: Duration::from_millis(10),
        enable_interval: Duration::from_millis(100),
        output_delay: Duration::from_millis(10),
        output_interval: Duration::from_millis(10),
    }
}

fn ds3(index: u32) -> Arc<DeviceContext> {
    Arc::new(DeviceContext::new(DeviceType::DualShock3, index, None))
}

#[tokio::test(start_paused = true)]
async fn test_enable_failures_never_start_output() -> Result<(), FilterError> {
    let pipe = MockControlPipe::new();
    pipe.script((0..10).map(|_| Err(TransferError::Stalled)));
    let sequencer = CommandSequencer::attach(ds3(0), Arc::new(pipe.clone()), timing())?;

    sleep(Duration::from_millis(955)).await;

    assert_eq!(pipe.submitted_count(CommandKind::Enable), 10);
    assert_eq!(pipe.submitted_count(CommandKind::OutputPush), 0);
    assert_eq!(sequencer.state(), SequencerState::Enabling);
    assert_eq!(sequencer.active_timer(), Some(TimerKind::Enable));

    let snapshot = sequencer.snapshot();
    assert_eq!(snapshot.counters.enable_failures, 10);
    assert_eq!(snapshot.counters.enable_successes, 0);
    assert_eq!(snapshot.commands.outstanding(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_first_success_switches_to_output_once() -> Result<(), FilterError> {
    let pipe = MockControlPipe::new();
    pipe.script([Err(TransferError::Stalled), Err(TransferError::Busy), Ok(4)]);
    let sequencer = CommandSequencer::attach(ds3(0), Arc::new(pipe.clone()), timing())?;

    // enable at 10, 110, 210 (success); output at 220, 230, 240, 250
    sleep(Duration::from_millis(255)).await;

    assert_eq!(sequencer.state(), SequencerState::Streaming);
    assert_eq!(sequencer.active_timer(), Some(TimerKind::OutputPush));
    assert_eq!(pipe.submitted_count(CommandKind::Enable), 3);
    assert_eq!(pipe.submitted_count(CommandKind::OutputPush), 4);

    sleep(Duration::from_millis(300)).await;
    assert_eq!(pipe.submitted_count(CommandKind::Enable), 3);

    let snapshot = sequencer.snapshot();
    assert_eq!(snapshot.counters.enable_successes, 1);
    assert_eq!(snapshot.counters.enable_failures, 2);
    assert_eq!(snapshot.commands.outstanding(), 0);
    assert_eq!(snapshot.commands.issued, snapshot.commands.released);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_single_command_in_flight() -> Result<(), FilterError> {
    let pipe = MockControlPipe::holding();
    let sequencer = CommandSequencer::attach(ds3(0), Arc::new(pipe.clone()), timing())?;

    // enable submitted at 10, ticks at 110 and 210 skipped
    sleep(Duration::from_millis(255)).await;
    assert_eq!(pipe.submitted_count(CommandKind::Enable), 1);
    assert_eq!(pipe.pending_count(), 1);
    assert_eq!(sequencer.snapshot().skipped_ticks, 2);
    assert_eq!(sequencer.ledger().outstanding(), 1);

    assert!(pipe.complete_next(Ok(4)));
    assert_eq!(sequencer.state(), SequencerState::Streaming);
    assert_eq!(sequencer.ledger().outstanding(), 0);

    // output timer restarted at 255: first push at 265, later ticks skipped
    sleep(Duration::from_millis(45)).await;
    assert_eq!(pipe.submitted_count(CommandKind::OutputPush), 1);

    assert!(pipe.complete_next(Ok(48)));
    sleep(Duration::from_millis(8)).await;
    assert_eq!(pipe.submitted_count(CommandKind::OutputPush), 2);
    assert_eq!(sequencer.ledger().outstanding(), 1);

    assert_eq!(pipe.drop_pending(), 1);
    assert_eq!(sequencer.ledger().outstanding(), 0);
    assert_eq!(sequencer.snapshot().counters.output_successes, 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_output_push_carries_host_rumble_and_player_led() -> Result<(), FilterError> {
    let pipe = MockControlPipe::new();
    let device = ds3(1);
    on_output_report(&device, &[0x01, 0x00, 0x10, 0x20, 0x30, 0x40])?;
    let _sequencer = CommandSequencer::attach(device, Arc::new(pipe.clone()), timing())?;

    sleep(Duration::from_millis(45)).await;

    let pushes: Vec<_> = pipe
        .submitted()
        .into_iter()
        .filter(|c| c.kind == CommandKind::OutputPush)
        .collect();
    assert!(!pushes.is_empty());
    let last = &pushes[pushes.len() - 1];
    assert_eq!(last.setup.request_type, 0x21);
    assert_eq!(last.setup.request, 0x09);
    assert_eq!(last.setup.value, 0x0201);
    assert_eq!(last.setup.length, 48);
    assert_eq!(last.payload[0], 0x00);
    assert_eq!(&last.payload[1..5], &[0x10, 0x20, 0x30, 0x40]);
    assert_eq!(last.payload[9], 0x04);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_submit_rejection_keeps_enabling() -> Result<(), FilterError> {
    let pipe = MockControlPipe::new();
    pipe.reject_submissions(Some(TransferError::Busy));
    let sequencer = CommandSequencer::attach(ds3(0), Arc::new(pipe.clone()), timing())?;

    sleep(Duration::from_millis(255)).await;
    let snapshot = sequencer.snapshot();
    assert_eq!(snapshot.state, SequencerState::Enabling);
    assert_eq!(snapshot.commands.submit_failures, 3);
    assert_eq!(snapshot.commands.outstanding(), 0);
    assert!(pipe.submitted().is_empty());

    pipe.reject_submissions(None);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(sequencer.state(), SequencerState::Streaming);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_timers() -> Result<(), FilterError> {
    let pipe = MockControlPipe::new();
    let sequencer = CommandSequencer::attach(ds3(0), Arc::new(pipe.clone()), timing())?;

    sleep(Duration::from_millis(45)).await;
    let before = pipe.submitted().len();
    assert!(before > 0);

    drop(sequencer);
    sleep(Duration::from_millis(500)).await;
    assert_eq!(pipe.submitted().len(), before);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_idempotent() -> Result<(), FilterError> {
    let pipe = MockControlPipe::new();
    let sequencer = CommandSequencer::attach(ds3(0), Arc::new(pipe.clone()), timing())?;
    sequencer.stop();
    sequencer.stop();
    assert_eq!(sequencer.active_timer(), None);

    sleep(Duration::from_millis(500)).await;
    assert!(pipe.submitted().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_late_enable_success_after_stop_stays_stopped() -> Result<(), FilterError> {
    let pipe = MockControlPipe::holding();
    let sequencer = CommandSequencer::attach(ds3(0), Arc::new(pipe.clone()), timing())?;

    sleep(Duration::from_millis(15)).await;
    assert_eq!(pipe.pending_count(), 1);

    sequencer.stop();
    assert!(sequencer.is_stopped());
    assert_eq!(sequencer.active_timer(), None);

    assert!(pipe.complete_next(Ok(4)));
    assert_eq!(sequencer.active_timer(), None);

    sleep(Duration::from_millis(300)).await;
    assert_eq!(pipe.submitted_count(CommandKind::OutputPush), 0);
    assert_eq!(pipe.submitted_count(CommandKind::Enable), 1);

    let snapshot = sequencer.snapshot();
    assert_eq!(snapshot.counters.enable_successes, 1);
    assert_eq!(snapshot.commands.outstanding(), 0);
    Ok(())
}

#[tokio::test]
async fn test_unsupported_device_cannot_attach() {
    let device = Arc::new(DeviceContext::new(DeviceType::DualShock4, 0, None));
    let result = CommandSequencer::attach(device, Arc::new(MockControlPipe::new()), timing());
    assert!(matches!(
        result,
        Err(FilterError::UnsupportedVariant { variant: "DualShock4" })
    ));
}
