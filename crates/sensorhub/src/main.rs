mod bridge;
mod config;
mod serve;

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sensorhub_core::{Measurement, MeasurementData};
use tokio::net::UdpSocket;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "UDP sensor telemetry to accessory-protocol bridge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the bridge until interrupted
    Serve(ConfigArgs),
    /// Load and validate a configuration file, then print a summary
    CheckConfig(ConfigArgs),
    /// Send one synthetic measurement datagram to a running bridge
    Emit(EmitArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Path to the bridge configuration file
    #[arg(long, default_value = "sensor-bridge.json")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct EmitArgs {
    /// Receiver address of the running bridge
    #[arg(long, default_value = "127.0.0.1:3232")]
    target: String,
    /// Sensor serial to report as
    #[arg(long)]
    serial: String,
    #[arg(long, default_value_t = 21.0)]
    temperature: f32,
    #[arg(long, default_value_t = 50.0)]
    humidity: f32,
    #[arg(long, default_value_t = 1013.0)]
    pressure: f32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            let config = config::Config::load(&args.config)?;
            serve::run(config).await
        }
        Command::CheckConfig(args) => {
            let config = config::Config::load(&args.config)?;
            println!("receiver port: {}", config.receiver.port);
            println!(
                "bridge: {} ({} {})",
                config.bridge.name, config.bridge.manufacturer, config.bridge.model
            );
            println!("sensors: {}", config.bridge.sensors.len());
            for sensor in &config.bridge.sensors {
                println!("  {} {} ({})", sensor.serial, sensor.name, sensor.model);
            }
            Ok(())
        }
        Command::Emit(args) => emit(args).await,
    }
}

async fn emit(args: EmitArgs) -> Result<()> {
    let sensor_time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the Unix epoch")?
        .as_secs() as i64;

    let measurement = Measurement {
        sensor_id: args.serial.clone(),
        sensor_time,
        measurement_id: format!("{}-{sensor_time}", args.serial),
        measurement_data: MeasurementData {
            temperature: args.temperature,
            humidity: args.humidity,
            pressure: args.pressure,
        },
    };

    let payload = measurement
        .encode()
        .context("could not encode measurement")?;
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .await
        .context("could not bind sender socket")?;
    socket
        .send_to(&payload, args.target.as_str())
        .await
        .with_context(|| format!("could not send datagram to {}", args.target))?;

    info!(serial = %args.serial, target = %args.target, "measurement datagram sent");
    Ok(())
}
