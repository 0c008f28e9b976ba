//! L3GD20H gyroscope reader - Continuous polling and display
//!
//! Configures the sensor through an FT232H I2C bridge, then polls it and
//! shows the raw counts together with how many reads were fresh, stale
//! or overwritten.
//!
//! Usage:
//!   l3gd20h-reader --rate 200 --address 0x6B --sleep-on-exit

use chrono::Local;
use clap::Parser;
use l3gd20h_interface::{
    create_bar, BusError, DataAvailability, FtdiConfig, FtdiI2c, L3gd20h, ReadStats,
    DEFAULT_ADDRESS,
};
use log::{info, warn};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Full positive scale of a raw axis count
const FULL_SCALE_COUNTS: i32 = 32768;

#[derive(Parser, Debug)]
#[command(name = "l3gd20h-reader")]
#[command(about = "Poll an L3GD20H gyroscope over an FT232H I2C bridge", long_about = None)]
struct Args {
    /// FTDI I2C channel index
    #[arg(short, long, default_value = "0")]
    channel: u32,

    /// 7-bit device address (decimal or 0x-prefixed hex)
    #[arg(short, long, default_value = "0x6B", value_parser = parse_address)]
    address: u8,

    /// Output data rate in Hz (12-800, rounded up to a supported rate)
    #[arg(short, long, default_value = "100")]
    rate: u32,

    /// I2C clock in kHz
    #[arg(long, default_value = "400")]
    clock_khz: u32,

    /// Stop after this many successful reads (runs until Ctrl+C if omitted)
    #[arg(short, long)]
    samples: Option<u64>,

    /// Put the sensor into power-down mode before exiting
    #[arg(long)]
    sleep_on_exit: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn status_label(status: DataAvailability) -> &'static str {
    match status {
        DataAvailability::Fresh => "fresh",
        DataAvailability::NotYetAvailable => "no new data",
        DataAvailability::Overwritten => "OVERWRITTEN",
        DataAvailability::Unknown => "unknown",
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.rate < 12 || args.rate > 800 {
        warn!("rate {} Hz is outside 12-800 Hz and will be clamped", args.rate);
    }

    println!("L3GD20H Gyroscope Reader");
    println!("========================");
    println!("Initializing FT232H I2C interface...");

    let config = FtdiConfig {
        clock_rate: args.clock_khz * 1000,
        ..FtdiConfig::default()
    };

    let bus = match FtdiI2c::open(args.channel, &config) {
        Ok(bus) => bus,
        Err(BusError::NoChannelsFound) => {
            eprintln!("Error: No FT232H devices found.");
            eprintln!("Please check:");
            eprintln!("  1. FT232H is connected via USB");
            eprintln!("  2. FTDI drivers are installed");
            eprintln!("  3. No other application is using the device");
            return Err(Box::new(BusError::NoChannelsFound));
        }
        Err(e) => {
            eprintln!("Error opening I2C channel: {}", e);
            return Err(Box::new(e));
        }
    };

    let gyro = L3gd20h::new(&bus, args.address);
    if args.address != DEFAULT_ADDRESS {
        info!("using non-default address {:#04x}", args.address);
    }

    gyro.wake()?;
    gyro.set_frequency(args.rate)?;
    let odr = l3gd20h_interface::select_frequency(args.rate).threshold_hz;
    println!("Sensor configured for {} Hz output data rate", odr);
    println!("Press Ctrl+C to exit\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let started = Local::now();
    let mut stats = ReadStats::new();

    // Clear screen once at start
    print!("\x1B[2J\x1B[H");
    io::stdout().flush()?;

    while running.load(Ordering::SeqCst) {
        if let Some(limit) = args.samples {
            if stats.reads() >= limit {
                break;
            }
        }

        match gyro.read() {
            Ok(reading) => {
                stats.record(&reading);
                let s = reading.sample;

                // Move cursor to top without clearing (reduces flicker)
                print!("\x1B[H");

                println!("L3GD20H Gyroscope Reader - Live Data                           ");
                println!("====================================                           ");
                println!(
                    "Started: {} | Time: {:.2}s | Reads: {} | Poll rate: {:.1} Hz      ",
                    started.format("%H:%M:%S"),
                    stats.elapsed_secs(),
                    stats.reads(),
                    stats.poll_rate()
                );
                println!();

                println!("RAW COUNTS (ODR {} Hz)             -32768 ◄───────┼───────► +32767", odr);
                println!("  X: {:6}  [{}]", s.x, create_bar(s.x, FULL_SCALE_COUNTS, 40));
                println!("  Y: {:6}  [{}]", s.y, create_bar(s.y, FULL_SCALE_COUNTS, 40));
                println!("  Z: {:6}  [{}]", s.z, create_bar(s.z, FULL_SCALE_COUNTS, 40));
                println!();

                println!("Last status: {:<12}                                     ", status_label(reading.status));
                println!(
                    "Fresh: {} | No new data: {} | Overwritten: {} | Bus errors: {}      ",
                    stats.fresh, stats.not_yet_available, stats.overwritten, stats.bus_errors
                );
                println!();
                println!("Press Ctrl+C to exit                                           ");

                io::stdout().flush()?;
            }
            Err(e) => {
                stats.record_bus_error();
                eprintln!("\nError reading sensor: {}", e);
                eprintln!("Retrying...");
                thread::sleep(Duration::from_millis(500));
            }
        }
    }

    println!();
    info!(
        "stopped after {} reads ({} fresh, {} overwritten, {} bus errors)",
        stats.reads(),
        stats.fresh,
        stats.overwritten,
        stats.bus_errors
    );

    if args.sleep_on_exit {
        gyro.sleep()?;
        println!("Sensor powered down");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x6B"), Ok(0x6B));
        assert_eq!(parse_address("0X6a"), Ok(0x6A));
        assert_eq!(parse_address("107"), Ok(107));
        assert!(parse_address("0x1FF").is_err());
        assert!(parse_address("gyro").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["l3gd20h-reader"]);
        assert_eq!(args.channel, 0);
        assert_eq!(args.address, 0x6B);
        assert_eq!(args.rate, 100);
        assert_eq!(args.clock_khz, 400);
        assert_eq!(args.samples, None);
        assert!(!args.sleep_on_exit);
    }
}
