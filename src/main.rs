//! Aquastream XT Control CLI
//!
//! Command-line interface for monitoring the Aquacomputer Aquastream XT and
//! managing its fan control policy.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{LevelFilter, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use aquacomputer_rust_devices::config::Settings;
use aquacomputer_rust_devices::control::{ControlPolicy, PolicyTracker};
use aquacomputer_rust_devices::device::{
    Device, DeviceOptions, HidTransport, PollOutcome, Transport, list_devices, open_device,
};
use aquacomputer_rust_devices::error::AquaError;
use aquacomputer_rust_devices::protocol::{
    AQUACOMPUTER_VID, AQUASTREAM_XT_PID, DecodedSample, FEATURE_BUFFER_LENGTH, REPORT_ID_STATUS,
};
use aquacomputer_rust_devices::sensors::SensorRegistry;
use aquacomputer_rust_devices::storage;
use aquacomputer_rust_devices::utils::{hex_rows, parse_fan_policy, parse_percent};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Aquastream XT Control Tool
#[derive(Parser, Debug)]
#[command(name = "aquastream-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// HID device path (overrides the settings file)
    #[arg(long, global = true)]
    path: Option<String>,

    /// Expose diagnostic sensors (alarms, modes, versions)
    #[arg(short, long, global = true)]
    diagnostics: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show current device status
    Status,

    /// Continuously poll the device and apply fan policy changes
    Monitor {
        /// Poll interval in milliseconds (defaults to the settings file)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show variant, firmware and identity
    Info,

    /// List connected Aquacomputer devices
    List,

    /// Set a software fan duty
    SetFan {
        /// Duty cycle percentage (0-100)
        #[arg(value_parser = parse_percent)]
        duty: f32,
    },

    /// Hand the fan back to firmware control
    SetDefault,

    /// Set the fan policy by name: default, unmanaged, or software:XX
    Policy {
        name: String,
    },

    /// Show the settings file
    Config,

    /// Debug: show raw feature report bytes
    Debug {
        /// Number of reads to perform
        #[arg(short, long, default_value = "5")]
        count: u32,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;

    let mut settings = storage::load_settings().context("Failed to load settings")?;
    if args.path.is_some() {
        settings.device_path = args.path.clone();
    }
    if args.diagnostics {
        settings.diagnostics_enabled = true;
    }

    match args.command {
        Command::Status => cmd_status(&settings),
        Command::Monitor { interval } => cmd_monitor(settings, interval),
        Command::Info => cmd_info(&settings),
        Command::List => cmd_list(),
        Command::SetFan { duty } => cmd_set_policy(&settings, ControlPolicy::Software(duty)),
        Command::SetDefault => cmd_set_policy(&settings, ControlPolicy::FirmwareDefault),
        Command::Policy { name } => {
            let policy = parse_fan_policy(&name)?;
            cmd_set_policy(&settings, policy)
        }
        Command::Config => cmd_config(&settings),
        Command::Debug { count } => cmd_debug(&settings, count),
    }
}

fn open(settings: &Settings, options: &DeviceOptions) -> Result<Box<dyn Device>> {
    open_device(settings.device_path.as_deref(), options).context("Failed to open Aquastream XT")
}

fn cmd_status(settings: &Settings) -> Result<()> {
    let mut device = open(settings, &settings.device_options())?;
    device.poll().context("Failed to read status")?;

    let mut registry = SensorRegistry::new();
    device.publish(&mut registry);

    println!("{}", device.name());
    println!("{}", device.status());
    println!("{}", "─".repeat(66));
    print!("{}", registry);
    Ok(())
}

fn cmd_monitor(mut settings: Settings, interval: Option<u64>) -> Result<()> {
    if let Some(interval) = interval {
        settings.poll_interval_ms = interval;
    }
    settings.validate()?;

    let mut device = open(&settings, &settings.device_options())?;
    let mut tracker = PolicyTracker::with_initial(device.policy());
    let mut registry = SensorRegistry::new();

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    println!(
        "Monitoring {} every {} ms (Ctrl+C to stop)",
        device.name(),
        settings.poll_interval_ms
    );

    while running.load(Ordering::SeqCst) {
        // Pick up policy edits from the settings file
        match storage::load_settings() {
            Ok(latest) => {
                if let Some(event) = tracker.observe(latest.fan_control) {
                    match device.handle_event(event) {
                        Ok(()) => {}
                        Err(AquaError::NotSupported(reason)) => warn!("{}", reason),
                        Err(e) => error!("Failed to apply fan policy: {}", e),
                    }
                }
            }
            Err(e) => warn!("Keeping current fan policy: {}", e),
        }

        match device.poll() {
            Ok(PollOutcome::Updated) => {
                device.publish(&mut registry);
                // Clear screen and move cursor to top
                print!("\x1B[2J\x1B[1;1H");
                println!("{} | Fan policy: {}", device.name(), device.policy());
                println!("{}", "─".repeat(66));
                print!("{}", registry);
            }
            Ok(PollOutcome::Stale) => {}
            Err(e) => error!("Read error: {}", e),
        }

        std::thread::sleep(settings.poll_interval());
    }

    println!("\nMonitoring stopped.");
    Ok(())
}

fn cmd_info(settings: &Settings) -> Result<()> {
    let options = DeviceOptions {
        diagnostics_enabled: true,
        ..settings.device_options()
    };
    let device = open(settings, &options)?;

    let mut registry = SensorRegistry::new();
    device.publish(&mut registry);

    println!("╭──────────────────────────────────────────╮");
    println!("│  {:<40}│", device.name());
    println!("├──────────────────────────────────────────┤");
    println!("│  Path: {:<34}│", device.identifier());
    println!("│  Fan policy: {:<28}│", device.policy().to_string());
    println!("╰──────────────────────────────────────────╯");
    println!("{}", device.status());

    for key in ["diag_versions", "diag_identity", "diag_modes", "diag_alarms"] {
        if let Some(detail) = registry.by_key(key).and_then(|r| r.detail.as_ref()) {
            println!("  {}", detail);
        }
    }

    Ok(())
}

fn cmd_list() -> Result<()> {
    let devices = list_devices().context("Failed to enumerate devices")?;

    if devices.is_empty() {
        println!("No supported Aquacomputer devices found.");
        return Ok(());
    }

    println!("Found {} device(s):\n", devices.len());
    for (i, device) in devices.iter().enumerate() {
        println!("  {}. {}", i + 1, device.model);
        println!("     Path: {}", device.path);
        if let Some(serial) = &device.serial {
            println!("     Serial: {}", serial);
        }
    }

    Ok(())
}

fn cmd_set_policy(settings: &Settings, policy: ControlPolicy) -> Result<()> {
    // Persist first so a running monitor picks it up too
    let stored = storage::update_fan_policy(policy).context("Failed to store fan policy")?;
    println!("Stored fan policy: {}", stored.fan_control);

    let options = DeviceOptions {
        initial_policy: ControlPolicy::Unmanaged,
        ..settings.device_options()
    };
    let mut device = open(settings, &options)?;

    match device.apply_policy(stored.fan_control) {
        Ok(()) => println!("Fan policy applied: {}", device.policy()),
        Err(AquaError::NotSupported(reason)) => {
            println!("Fan policy stored but not sent: {}", reason);
        }
        Err(e) => return Err(e).context("Failed to apply fan policy"),
    }

    Ok(())
}

fn cmd_config(settings: &Settings) -> Result<()> {
    let path = storage::get_config_path()?;
    println!("Settings file: {}", path.display());
    println!(
        "{}",
        serde_json::to_string_pretty(settings).context("Failed to serialize settings")?
    );
    Ok(())
}

fn cmd_debug(settings: &Settings, count: u32) -> Result<()> {
    let api = hidapi::HidApi::new().context("Failed to init HID")?;
    let transport = match settings.device_path.as_deref() {
        Some(path) => HidTransport::open_path(&api, path),
        None => HidTransport::open_ids(&api, AQUACOMPUTER_VID, AQUASTREAM_XT_PID),
    }
    .context("Failed to open Aquastream XT")?;

    println!("Debug Mode - Reading raw feature reports from {}\n", transport.path());

    for i in 0..count {
        let mut buf = [0u8; FEATURE_BUFFER_LENGTH];
        let read = transport
            .read_feature_report(REPORT_ID_STATUS, &mut buf)
            .context("Failed to read")?;
        let report = &buf[..read.min(buf.len())];

        println!("━━━ Read #{} ({} bytes) ━━━", i + 1, read);
        for row in hex_rows(report) {
            println!("{}", row);
        }

        match DecodedSample::decode(report) {
            Ok(sample) => print!("{}", sample),
            Err(e) => println!("Not decoded: {}", e),
        }
        println!();

        std::thread::sleep(settings.poll_interval());
    }

    Ok(())
}
