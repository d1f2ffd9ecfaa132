//! Output formatting for CLI responses

use std::path::Path;

use anyhow::{Error, Result};
use colored::*;
use dsbridge_filter::{BridgeConfig, SequencerSnapshot, SequencerState};
use dsbridge_hid_ds3_protocol::{CanonicalGamepadState, UsbIdentity, buttons};
use dsbridge_xusb::{XusbSubmitReport, buttons as xusb};
use serde_json::json;

use crate::commands::DescriptorTarget;

const CANONICAL_BUTTON_NAMES: [(u16, &str); 12] = [
    (buttons::TRIANGLE, "triangle"),
    (buttons::CIRCLE, "circle"),
    (buttons::CROSS, "cross"),
    (buttons::SQUARE, "square"),
    (buttons::SELECT, "select"),
    (buttons::LEFT_THUMB, "l3"),
    (buttons::RIGHT_THUMB, "r3"),
    (buttons::START, "start"),
    (buttons::LEFT_TRIGGER, "l2"),
    (buttons::RIGHT_TRIGGER, "r2"),
    (buttons::LEFT_SHOULDER, "l1"),
    (buttons::RIGHT_SHOULDER, "r1"),
];

const XUSB_BUTTON_NAMES: [(u16, &str); 15] = [
    (xusb::DPAD_UP, "dpad_up"),
    (xusb::DPAD_DOWN, "dpad_down"),
    (xusb::DPAD_LEFT, "dpad_left"),
    (xusb::DPAD_RIGHT, "dpad_right"),
    (xusb::START, "start"),
    (xusb::BACK, "back"),
    (xusb::LEFT_THUMB, "left_thumb"),
    (xusb::RIGHT_THUMB, "right_thumb"),
    (xusb::LEFT_SHOULDER, "left_shoulder"),
    (xusb::RIGHT_SHOULDER, "right_shoulder"),
    (xusb::GUIDE, "guide"),
    (xusb::A, "a"),
    (xusb::B, "b"),
    (xusb::X, "x"),
    (xusb::Y, "y"),
];

fn names(mask: u16, table: &[(u16, &'static str)]) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(bit, _)| mask & bit != 0)
        .map(|(_, name)| *name)
        .collect()
}

/// Space-separated uppercase hex.
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    print_json(&json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "chain": error.chain().skip(1).map(|e| e.to_string()).collect::<Vec<_>>(),
        }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

/// Data shown by `translate`.
pub struct TranslationView<'a> {
    pub raw: &'a [u8],
    pub canonical: &'a [u8],
    pub state: CanonicalGamepadState,
    pub forwarded: Option<XusbSubmitReport>,
}

pub fn print_translation(view: &TranslationView<'_>, json: bool) {
    let state = &view.state;
    let pressed = names(state.buttons, &CANONICAL_BUTTON_NAMES);
    let hat = format!("{:?}", state.hat());

    if json {
        print_json(&json!({
            "success": true,
            "raw_len": view.raw.len(),
            "canonical": hex_string(view.canonical),
            "state": {
                "left_thumb": [state.left_thumb_x, state.left_thumb_y],
                "right_thumb": [state.right_thumb_x, state.right_thumb_y],
                "triggers": [state.left_trigger, state.right_trigger],
                "hat": hat,
                "buttons": pressed,
                "ps": state.ps_pressed(),
            },
            "xusb": view.forwarded,
        }));
        return;
    }

    println!("{}", "Canonical report:".bold());
    println!("  {}", hex_string(view.canonical));
    println!(
        "  Sticks: L({}, {}) R({}, {})  Triggers: {} / {}",
        state.left_thumb_x,
        state.left_thumb_y,
        state.right_thumb_x,
        state.right_thumb_y,
        state.left_trigger,
        state.right_trigger
    );
    println!("  Hat: {}", hat.cyan());
    println!(
        "  Buttons: {}{}",
        if pressed.is_empty() {
            "none".dimmed().to_string()
        } else {
            pressed.join(", ")
        },
        if state.ps_pressed() { " +ps" } else { "" }
    );

    match &view.forwarded {
        Some(submit) => {
            let xusb_names = names(submit.report.buttons, &XUSB_BUTTON_NAMES);
            println!(
                "{} slot {} buttons {:#06X} [{}]",
                "XUSB:".bold(),
                submit.serial_no,
                submit.report.buttons,
                xusb_names.join(", ")
            );
        }
        None => println!("{} {}", "XUSB:".bold(), "not forwarded".yellow()),
    }
}

pub fn print_descriptor(
    target: DescriptorTarget,
    identity: &UsbIdentity,
    requested: usize,
    bytes: &[u8],
    json: bool,
) {
    if json {
        print_json(&json!({
            "success": true,
            "descriptor": format!("{target:?}").to_lowercase(),
            "identity": {
                "vendor_id": identity.vendor_id,
                "product_id": identity.product_id,
                "input_report_len": identity.input_report_len,
                "output_report_len": identity.output_report_len,
            },
            "requested": requested,
            "written": bytes.len(),
            "bytes": hex_string(bytes),
        }));
        return;
    }

    println!(
        "{} {:04X}:{:04X}, input report {} bytes, output report {} bytes",
        "Presented as".bold(),
        identity.vendor_id,
        identity.product_id,
        identity.input_report_len,
        identity.output_report_len
    );

    println!(
        "{} {:?}: {} of {} bytes written",
        "Descriptor".bold(),
        target,
        bytes.len(),
        requested
    );
    if bytes.is_empty() {
        println!("  {}", "(nothing written for this request length)".yellow());
    }
    for chunk in bytes.chunks(16) {
        println!("  {}", hex_string(chunk));
    }
}

/// Data shown by `simulate`.
pub struct SimulationView {
    pub snapshot: SequencerSnapshot,
    pub enable_commands: usize,
    pub output_commands: usize,
}

pub fn print_simulation(view: &SimulationView, json: bool) {
    let snapshot = &view.snapshot;
    if json {
        print_json(&json!({
            "success": true,
            "snapshot": snapshot,
            "enable_commands": view.enable_commands,
            "output_commands": view.output_commands,
        }));
        return;
    }

    let state = match snapshot.state {
        SequencerState::Enabling => snapshot.state.to_string().yellow(),
        SequencerState::Streaming => snapshot.state.to_string().green(),
    };
    println!("{} {}", "State:".bold(), state);
    println!(
        "  Enable commands: {} ({} failed)",
        view.enable_commands, snapshot.counters.enable_failures
    );
    println!(
        "  Output pushes:   {} ({} failed)",
        view.output_commands, snapshot.counters.output_failures
    );
    println!("  Skipped ticks:   {}", snapshot.skipped_ticks);
    println!(
        "  Contexts:        {} issued, {} released, {} outstanding",
        snapshot.commands.issued,
        snapshot.commands.released,
        snapshot.commands.outstanding()
    );
}

pub fn print_config(path: &Path, config: &BridgeConfig, json: bool) -> Result<()> {
    if json {
        print_json(&json!({
            "success": true,
            "path": path.display().to_string(),
            "config": config,
        }));
        return Ok(());
    }

    println!("{} {}", "Config:".bold(), path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
