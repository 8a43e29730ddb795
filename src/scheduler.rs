use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::{RecordWriter, Result, Sampler};

/// Runs the sample, write, sleep loop.
///
/// The interval is measured from the end of one cycle to the start of the next one; time spent
/// sampling and writing is not compensated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    interval: Duration,
    limit: Option<usize>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Scheduler {
        Scheduler { interval, limit: None }
    }

    /// Stops after `count` samples instead of running until stopped.
    pub fn with_limit(self, count: usize) -> Scheduler {
        Scheduler { limit: Some(count), ..self }
    }

    /// Samples until `stop` receives a message or disconnects, or the sample limit is reached.
    /// Returns the number of readings written. The first failing cycle ends the run.
    pub fn run<S, W>(&self, sampler: &mut S, writer: &mut RecordWriter<W>, stop: &Receiver<()>)
            -> Result<usize>
            where S: Sampler, W: Write {
        let mut count = 0;
        loop {
            if self.limit.is_some_and(|limit| count >= limit) {
                break
            }
            let reading = sampler.sample()?;
            writer.write_record(&reading)?;
            count += 1;
            log::debug!("wrote sample #{}, sleeping for {:?}", count, self.interval);
            if self.limit.is_some_and(|limit| count >= limit) {
                break
            }
            match stop.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    log::info!("stopping after {} samples", count);
                    break
                }
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod test {
    use std::sync::mpsc::channel;
    use std::time::Instant;

    use super::*;
    use crate::{Error, OutputFormat, Reading, SyntheticSource};

    struct FailingSampler {
        remaining: usize,
    }

    impl Sampler for FailingSampler {
        fn sample(&mut self) -> Result<Reading> {
            if self.remaining == 0 {
                return Err(Error::Calibration)
            }
            self.remaining -= 1;
            SyntheticSource::seeded(1).sample()
        }
    }

    #[test]
    fn test_limit() {
        let (_send, stop) = channel();
        let mut buf = Vec::new();
        let mut writer = RecordWriter::new(&mut buf, OutputFormat::JsonLines);
        let mut source = SyntheticSource::seeded(7);
        let count = Scheduler::new(Duration::ZERO).with_limit(3)
            .run(&mut source, &mut writer, &stop).unwrap();
        assert_eq!(count, 3);
        drop(writer);
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_stop_interrupts_sleep() {
        let (send, stop) = channel();
        send.send(()).unwrap();
        let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Text);
        let mut source = SyntheticSource::seeded(7);
        let started = Instant::now();
        let count = Scheduler::new(Duration::from_secs(3600))
            .run(&mut source, &mut writer, &stop).unwrap();
        assert_eq!(count, 1);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[test]
    fn test_disconnected_stops() {
        let (send, stop) = channel::<()>();
        drop(send);
        let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Text);
        let count = Scheduler::new(Duration::from_secs(3600))
            .run(&mut SyntheticSource::seeded(7), &mut writer, &stop).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_failure_ends_run_and_table_is_closed() {
        let (_send, stop) = channel();
        let mut buf = Vec::new();
        {
            let mut writer = RecordWriter::new(&mut buf, OutputFormat::JsonTable);
            writer.write_header().unwrap();
            let result = Scheduler::new(Duration::ZERO)
                .run(&mut FailingSampler { remaining: 2 }, &mut writer, &stop);
            assert!(matches!(result, Err(Error::Calibration)));
        }
        let document: serde_json::Value =
            serde_json::from_str(&String::from_utf8(buf).unwrap()).unwrap();
        assert_eq!(document["data"].as_array().unwrap().len(), 2);
    }
}
