use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::process::ExitCode;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use clap::Parser;

use lightmeter::{TableWriter, shorten_field_names};

/// Convert json_lines or json_lines_long format into json_table. Useful for sending the output
/// of lightmeter over the network and storing it on the other side.
#[derive(Debug, Parser)]
struct Args {
    /// Output file, stdout if unspecified
    #[arg(short, long, default_value = "-")]
    outfile: String,
    /// Input file, stdin if unspecified
    #[arg(short, long, default_value = "-")]
    infile: String,
}

#[derive(Debug)]
enum Event {
    Line(String),
    Failed(io::Error),
    /// End of input, or an interrupt.
    End,
}

fn open_input(path: &str) -> io::Result<Box<dyn BufRead>> {
    if path == "-" {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

fn open_output(path: &str) -> io::Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(io::stdout().lock()))
    } else {
        Ok(Box::new(File::create(path)?))
    }
}

fn forward_lines<R: BufRead>(input: R, events: &Sender<Event>) {
    for line in input.lines() {
        let event = match line {
            Ok(line) => Event::Line(line),
            Err(error) => Event::Failed(error),
        };
        let failed = matches!(event, Event::Failed(_));
        if events.send(event).is_err() || failed {
            return
        }
    }
    let _ = events.send(Event::End);
}

/// Writes every forwarded line as a record until the input ends or an interrupt arrives, then
/// closes the document.
fn convert<W: Write>(events: &Receiver<Event>, table: &mut TableWriter<W>) -> lightmeter::Result<()> {
    table.write_header()?;
    while let Ok(event) = events.recv() {
        match event {
            Event::Line(line) => {
                let line = line.trim_end();
                if line.is_empty() {
                    continue
                }
                table.write_record(&shorten_field_names(line))?;
            }
            Event::Failed(error) => return Err(error.into()),
            Event::End => break,
        }
    }
    table.finish()
}

fn run(args: &Args) -> lightmeter::Result<usize> {
    let (send, events) = channel();
    let handler_send = send.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        log::info!("interrupted, closing the document");
        let _ = handler_send.send(Event::End);
    }) {
        log::warn!("cannot install signal handler: {}", error);
    }

    let mut table = TableWriter::new(open_output(&args.outfile)?);
    // the reader may stay blocked on stdin after an interrupt; it ends with the process
    let infile = args.infile.clone();
    thread::spawn(move || match open_input(&infile) {
        Ok(input) => forward_lines(input, &send),
        Err(error) => { let _ = send.send(Event::Failed(error)); }
    });
    convert(&events, &mut table)?;
    Ok(table.records())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(records) => {
            log::info!("converted {} records", records);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::from(1)
        }
    }
}
