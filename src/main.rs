//! pcapwm — command shell for one PCA9685.
//!
//! ```text
//!  stdin ──▶ PwmCommand::parse ──▶ PwmController::execute ──▶ stdout
//!                                        │
//!                          I2cBus (rpi feature) / SimBus
//! ```
//!
//! Usage: `pcapwm [config.json]`.  One command per line (`help` lists
//! them); lines starting with `#` or `--` are comments.  Set `RUST_LOG` to
//! see driver-level logging on stderr.
#![deny(unused_must_use)]

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use pcapwm::{BusTransport, PwmCommand, PwmConfig, PwmController};

const HELP: &str = "\
set_freq <hz> | get_freq | sleep <0|1> | is_sleep | invert <0|1> | is_invert
open_drn <0|1> | is_open_drn | restart | ch_val <ch> [pct]
<NAME|ch> = <pct> | <NAME>
names: PWM0-PWM4 SGN1 SGN0 DC3 DC2 DC1 LED1-LED6";

fn load_config() -> Result<PwmConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(PwmConfig::default());
    };
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
    let config: PwmConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

#[cfg(feature = "rpi")]
fn open_transport(config: &PwmConfig) -> Result<impl BusTransport> {
    pcapwm::adapters::i2c::open_rpi(config.bus_id)
        .with_context(|| format!("opening /dev/i2c-{}", config.bus_id))
}

#[cfg(not(feature = "rpi"))]
fn open_transport(config: &PwmConfig) -> Result<impl BusTransport> {
    warn!("no hardware bus compiled in, driving the simulator");
    Ok(pcapwm::adapters::sim::SimBus::with_address(
        config.bus_id,
        config.address,
    ))
}

/// Read-execute-print loop.  Bad lines and device errors are reported and
/// the loop keeps going; only stdin/stdout failures end it.
fn run<T: BusTransport>(ctl: &mut PwmController<T>) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("--") {
            continue;
        }
        match line {
            "quit" | "exit" => break,
            "help" => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            _ => {}
        }

        match PwmCommand::parse(line) {
            Ok(cmd) => match ctl.execute(&cmd) {
                Ok(reply) => writeln!(out, "{reply}")?,
                Err(e) => {
                    warn!("'{}' failed: {}", line, e);
                    eprintln!("error: {e}");
                }
            },
            Err(e) => eprintln!("error: {e}: '{line}'"),
        }
        out.flush()?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    info!("pcapwm v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let transport = open_transport(&config)?;
    let mut ctl = PwmController::new(transport, &config).context("PCA9685 bring-up failed")?;

    run(&mut ctl)
}
