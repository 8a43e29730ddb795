use std::io::Write;

use chrono::SecondsFormat;
use serde::Serialize;

use crate::{Reading, Result};
use crate::table::TableWriter;

pub const TEXT_HEADER: &str =
    "# DATE_UTC TIME_UTC UNIX_EPOCH T_CELSIUS LIGHTMETER_COUNTS DAYLIGHT_LUX STATUS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Space separated columns with a header comment
    #[default]
    #[value(name = "text")]
    Text,
    /// One JSON object per line, abbreviated keys
    #[value(name = "json_lines")]
    JsonLines,
    /// One JSON object per line, full field names
    #[value(name = "json_lines_long")]
    JsonLinesLong,
    /// A single JSON table schema document
    #[value(name = "json_table")]
    JsonTable,
}

#[derive(Serialize)]
struct ShortRecord {
    #[serde(rename = "TS")]
    utc: String,
    #[serde(rename = "T")]
    temperature: f64,
    #[serde(rename = "L")]
    light_level: u32,
    #[serde(rename = "D")]
    daylight: f64,
    #[serde(rename = "S")]
    status: bool,
}

#[derive(Serialize)]
struct LongRecord {
    utc: String,
    temperature: f64,
    #[serde(rename = "lightlevel")]
    light_level: u32,
    daylight: f64,
    status: bool,
}

fn iso8601(reading: &Reading) -> String {
    reading.utc().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats `value` with `precision` significant digits, like C's `%g`.
fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value)
    }
    let precision = precision.max(1);
    // the exponent is taken after rounding to the requested precision
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific
    };
    fn trim_zeros(digits: &str) -> &str {
        if digits.contains('.') {
            digits.trim_end_matches('0').trim_end_matches('.')
        } else {
            digits
        }
    }
    if exponent >= -4 && exponent < precision as i32 {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_owned()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs())
    }
}

impl OutputFormat {
    /// Renders a single reading, without a trailing newline.
    pub fn render(self, reading: &Reading) -> Result<String> {
        Ok(match self {
            Self::Text => format!("{} {} {:.1} {} {} {}",
                reading.utc().format("%Y-%m-%d %H:%M:%S"),
                reading.unix(),
                reading.temperature(),
                reading.light_level(),
                format_general(reading.daylight(), 3),
                if reading.status() { "OK" } else { "ERROR" }),
            Self::JsonLines | Self::JsonTable => serde_json::to_string(&ShortRecord {
                utc: iso8601(reading),
                temperature: reading.temperature(),
                light_level: reading.light_level(),
                daylight: reading.daylight(),
                status: reading.status(),
            })?,
            Self::JsonLinesLong => serde_json::to_string(&LongRecord {
                utc: iso8601(reading),
                temperature: reading.temperature(),
                light_level: reading.light_level(),
                daylight: reading.daylight(),
                status: reading.status(),
            })?,
        })
    }
}

#[derive(Debug)]
enum Sink<W: Write> {
    Lines(W),
    Table(TableWriter<W>),
}

/// Writes a stream of readings in one of the output formats.
///
/// For `json_table` the document stays open between records; it is closed by `finalize`, or
/// when the writer is dropped, so that it is well-formed on every way out of the sampling loop.
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    format: OutputFormat,
    sink: Sink<W>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> RecordWriter<W> {
        let sink = match format {
            OutputFormat::JsonTable => Sink::Table(TableWriter::new(out)),
            _ => Sink::Lines(out),
        };
        RecordWriter { format, sink }
    }

    pub fn write_header(&mut self) -> Result<()> {
        match (&mut self.sink, self.format) {
            (Sink::Table(table), _) => table.write_header()?,
            (Sink::Lines(out), OutputFormat::Text) => {
                writeln!(out, "{}", TEXT_HEADER)?;
                out.flush()?;
            }
            (Sink::Lines(_), _) => (),
        }
        Ok(())
    }

    pub fn write_record(&mut self, reading: &Reading) -> Result<()> {
        let record = self.format.render(reading)?;
        match &mut self.sink {
            Sink::Table(table) => table.write_record(&record)?,
            Sink::Lines(out) => {
                writeln!(out, "{}", record)?;
                out.flush()?;
            }
        }
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<()> {
        match &mut self.sink {
            Sink::Table(table) => table.finish(),
            Sink::Lines(out) => Ok(out.flush()?),
        }
    }
}
