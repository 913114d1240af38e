//! xye-bridge: Midea XYE RS485 to UDP bridge.

use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use xye_protocol::DatagramSink;

use xye_bridge::{
    list_ports, logging, open_port, Args, Bridge, BridgeResult, BridgeStats, CountingSink,
    QueuedSink, RunOutcome, UdpSink,
};

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.log_level());

    let result = if args.list_ports {
        print_ports()
    } else {
        run(&args)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_ports() -> BridgeResult<()> {
    let ports = list_ports()?;
    println!("Available serial ports:");
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{}", port);
    }
    Ok(())
}

fn run(args: &Args) -> BridgeResult<()> {
    let config = args.resolve_config()?;
    let port_name = config.port_name()?.to_string();

    let mut port = open_port(&config.serial, &port_name)?;
    info!("Connected to {} at {} baud", port_name, config.serial.baud_rate);

    let stats = Arc::new(BridgeStats::new());
    let udp = UdpSink::connect(&config.udp)?;
    info!("Sending UDP packets to {}", udp.dest());
    let udp = CountingSink::new(udp, stats.clone());

    let sink: Box<dyn DatagramSink> = match config.queue_depth {
        Some(depth) => Box::new(QueuedSink::spawn(udp, depth, stats.clone())?),
        None => Box::new(udp),
    };

    let mut bridge = Bridge::from_config(&config, sink, stats.clone())?;
    let stop = bridge.stop_handle();
    ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;
    info!("Press Ctrl+C to exit");

    let outcome = bridge.run(port.as_mut());
    // Dropping the bridge flushes and joins the forwarder thread, if any.
    drop(bridge);

    match outcome? {
        RunOutcome::Stopped => info!("Exiting..."),
        RunOutcome::EndOfStream => info!("Serial port closed"),
    }
    stats.log_summary();
    Ok(())
}
