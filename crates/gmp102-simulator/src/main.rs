//! Desktop simulator for the gmp102-rs barometer.
//!
//! Runs the gmp102-core acquisition loop against an emulated GMP102 and
//! prints each cycle the way the demo board's serial console does.
//!
//! # Usage
//!
//! ```text
//! gmp102-simulator [float|s64|s32] [cycles]
//! ```
//!
//! The compensation mode defaults to `float`; without a cycle count the
//! simulator runs until interrupted. Set `RUST_LOG=debug` to see register
//! traffic.

mod console;
mod device;

use std::process::ExitCode;
use std::time::Duration;

use embassy_futures::block_on;
use embedded_hal_async::delay::DelayNs;
use log::{error, info};

use gmp102_core::CompensationMode;
use gmp102_core::acquisition::AcquisitionLoop;
use gmp102_core::config::SensorConfig;
use gmp102_core::sensors::Gmp102Sensor;

use console::SerialConsole;
use device::SimulatedGmp102;

/// Sea-level reference the demo board is configured with, Pa.
const DEMO_SEA_LEVEL_PA: f32 = 100_110.0;

const USAGE: &str = "usage: gmp102-simulator [float|s64|s32] [cycles]";

// ---------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------

/// Blocking delay backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
struct StdDelay;

impl DelayNs for StdDelay {
    async fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }

    async fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Args {
    mode: CompensationMode,
    cycles: Option<usize>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, String> {
    let mut args = args.into_iter();

    let mode = match args.next() {
        Some(label) => CompensationMode::from_label(&label)
            .ok_or_else(|| format!("unknown compensation mode '{label}'"))?,
        None => CompensationMode::default(),
    };

    let cycles = match args.next() {
        Some(count) => Some(
            count
                .parse::<usize>()
                .map_err(|e| format!("invalid cycle count '{count}': {e}"))?,
        ),
        None => None,
    };

    if let Some(extra) = args.next() {
        return Err(format!("unexpected argument '{extra}'"));
    }

    Ok(Args { mode, cycles })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    let config = SensorConfig {
        mode: args.mode,
        sea_level_pa: DEMO_SEA_LEVEL_PA,
        ..SensorConfig::default()
    };
    info!("Starting gmp102-rs simulator");
    info!(
        "Mode: {}, OSR {}, sea level {} Pa, interval {} ms",
        config.mode.label(),
        config.pressure_osr.ratio(),
        config.sea_level_pa,
        config.sample_interval_ms
    );

    let device = match SimulatedGmp102::new(config.address) {
        Ok(device) => device,
        Err(e) => {
            error!("Simulated device rejected its calibration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let sensor = Gmp102Sensor::new(device, StdDelay, &config);
    let mut acquisition = AcquisitionLoop::<_, _, _, 3>::new(
        sensor,
        StdDelay,
        SerialConsole::default(),
        config.sample_interval_ms,
    );

    let stats = block_on(acquisition.run(args.cycles));

    info!(
        "Simulator exiting after {} cycles ({} failed, {} lines printed)",
        stats.cycles,
        stats.failures,
        acquisition.sink().lines_written()
    );
    if stats.failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
