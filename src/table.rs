//! Streaming JSON document in the (pandas compatible) Frictionless Data table schema format.
//!
//! See <https://specs.frictionlessdata.io/table-schema/>. The document is written incrementally:
//! the schema and the opening of the `data` array first, then one record per line, and the
//! closing brackets once at the very end.

use std::borrow::Cow;
use std::io::Write;

use serde::Serialize;

use crate::Result;

/// Long field names as used by `json_lines_long`, paired with their abbreviations.
pub const FIELD_NAMES: [(&str, &str); 5] = [
    ("utc",         "TS"),
    ("temperature", "T"),
    ("lightlevel",  "L"),
    ("daylight",    "D"),
    ("status",      "S"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub primary_key: &'static [&'static str],
    pub fields: &'static [FieldDescriptor],
}

impl TableSchema {
    pub const LIGHTMETER: TableSchema = TableSchema {
        primary_key: &["TS"],
        fields: &[
            FieldDescriptor {
                name: "TS",
                kind: "datetime",
                title: "Timestamp",
                description: "ISO8601 string, UTC",
            },
            FieldDescriptor {
                name: "T",
                kind: "number",
                title: "Temperature",
                description: "Temperature in degrees Celsius",
            },
            FieldDescriptor {
                name: "L",
                kind: "integer",
                title: "Light level",
                description: "Light level counts, no calibration",
            },
            FieldDescriptor {
                name: "D",
                kind: "integer",
                title: "Daylight",
                description: "Daylight sensor reading in Lux",
            },
            FieldDescriptor {
                name: "S",
                kind: "boolean",
                title: "Status",
                description: "True if everything is OK, false otherwise",
            },
        ],
    };
}

/// Replaces the long field names of a `json_lines_long` record with the abbreviated ones.
///
/// Lines are recognized as long records by the presence of the `"lightlevel"` key; anything
/// else is returned unchanged.
pub fn shorten_field_names(line: &str) -> Cow<'_, str> {
    if !line.contains("\"lightlevel\"") {
        return Cow::Borrowed(line)
    }
    let mut line = line.to_owned();
    for (long, short) in FIELD_NAMES {
        line = line.replace(&format!("\"{}\"", long), &format!("\"{}\"", short));
    }
    Cow::Owned(line)
}

/// Writes a `json_table` document one record at a time.
///
/// Once the header has been written, the document is closed by `finish`, or, failing that, when
/// the writer is dropped.
#[derive(Debug)]
pub struct TableWriter<W: Write> {
    out: W,
    schema: TableSchema,
    records: usize,
    started: bool,
    finished: bool,
}

impl<W: Write> TableWriter<W> {
    pub fn new(out: W) -> TableWriter<W> {
        Self::with_schema(out, TableSchema::LIGHTMETER)
    }

    pub fn with_schema(out: W, schema: TableSchema) -> TableWriter<W> {
        TableWriter { out, schema, records: 0, started: false, finished: false }
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn write_header(&mut self) -> Result<()> {
        if self.started {
            return Ok(())
        }
        self.started = true;
        write!(self.out, "{{\"schema\": ")?;
        serde_json::to_writer(&mut self.out, &self.schema)?;
        write!(self.out, ", \"data\": [")?;
        self.out.flush()?;
        Ok(())
    }

    /// Appends one serialized record to the `data` array.
    pub fn write_record(&mut self, record: &str) -> Result<()> {
        self.write_header()?;
        let separator = if self.records == 0 { "" } else { "," };
        write!(self.out, "{}\n{}", separator, record)?;
        self.out.flush()?;
        self.records += 1;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        self.write_header()?;
        if self.finished {
            return Ok(())
        }
        self.finished = true;
        log::debug!("closing json_table document after {} records", self.records);
        write!(self.out, "\n]}}\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for TableWriter<W> {
    fn drop(&mut self) {
        if self.started && !self.finished {
            if let Err(error) = self.finish() {
                log::warn!("failed to close json_table document: {}", error);
            }
        }
    }
}
