use std::process::ExitCode;
use std::sync::mpsc::channel;

use clap::Parser;

use lightmeter::{DeviceConfiguration, Error, OutputFormat, RecordWriter, Scheduler};
use lightmeter::{Source, SourceKind, sampling_interval};

/// Read light level from a Kuffner-Sternwarte lightmeter mark 2.3
#[derive(Debug, Parser)]
struct Args {
    /// Sampling interval in minutes (can be fractional)
    #[arg(short, long, default_value_t = 1.0)]
    interval: f64,
    /// Don't use hardware and instead generate mock readings for testing
    #[arg(long)]
    nohw: bool,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Stop after this many samples
    #[arg(short = 'n', long)]
    count: Option<usize>,
}

fn run(args: &Args) -> lightmeter::Result<()> {
    let interval = sampling_interval(args.interval)?;
    let kind = if args.nohw { SourceKind::Synthetic } else { SourceKind::Hardware };
    let mut source = Source::open(kind, &DeviceConfiguration::default())?;

    // the loop stops on a message *or* when every sender is gone, so keep one around
    let (stop_send, stop) = channel();
    let handler_send = stop_send.clone();
    if let Err(error) = ctrlc::set_handler(move || { let _ = handler_send.send(()); }) {
        log::warn!("cannot install signal handler: {}", error);
    }

    let mut writer = RecordWriter::new(std::io::stdout().lock(), args.format);
    writer.write_header()?;
    let mut scheduler = Scheduler::new(interval);
    if let Some(count) = args.count {
        scheduler = scheduler.with_limit(count);
    }
    let result = scheduler.run(&mut source, &mut writer, &stop);
    let finalized = writer.finalize();
    source.close();
    drop(stop_send);
    result?;
    finalized
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error @ Error::PermissionDenied { .. }) => {
            eprintln!("{}", error);
            if let Some(device_node) = error.device_node() {
                eprintln!("Set read/write permissions on device node {}", device_node);
            }
            eprintln!("Alternatively, use udev to fix this permanently.");
            ExitCode::from(1)
        }
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::from(1)
        }
    }
}
