//! Replay of events stored as delimited text, one event per line.
//!
//! ```text
//! # x y t p
//! 12 40 1000 1
//! 13 40 1004 -1
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ConfigurationError, ReadError};
use crate::event::{Event, Polarity};
use crate::source::EventSource;

/// Order of the four columns on each line.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Columns {
    /// timestamp, x, y, polarity
    #[default]
    Txyp,
    /// x, y, timestamp, polarity (the eDVS tool format)
    Xytp,
    /// polarity, timestamp, x, y
    Ptxy,
    /// polarity, x, y, timestamp
    Pxyt,
}

impl Columns {
    /// Positions of (t, x, y, p) on a line.
    fn positions(self) -> [usize; 4] {
        match self {
            Columns::Txyp => [0, 1, 2, 3],
            Columns::Xytp => [2, 0, 1, 3],
            Columns::Ptxy => [1, 2, 3, 0],
            Columns::Pxyt => [3, 1, 2, 0],
        }
    }
}

/// Reads events from a text stream.
///
/// Blank lines and lines starting with `#` are skipped. Fields are split on
/// any whitespace unless a separator character is set. Timestamps are
/// multiplied by the time scale and rounded, so a file in seconds reads as
/// microseconds with a scale of `1e6`.
///
/// The reader does not reorder. A timestamp going backwards is logged once
/// and passed through.
#[derive(Debug)]
pub struct PlainTextReader<R> {
    reader: R,
    columns: Columns,
    separator: Option<char>,
    time_scale: f64,
    resolution: Option<(u32, u32)>,
    line: usize,
    buf: String,
    last_timestamp: Option<i64>,
    warned_order: bool,
}

impl PlainTextReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "opened event file");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> PlainTextReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            columns: Columns::default(),
            separator: None,
            time_scale: 1.0,
            resolution: None,
            line: 0,
            buf: String::new(),
            last_timestamp: None,
            warned_order: false,
        }
    }

    pub fn with_columns(mut self, columns: Columns) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }

    pub fn with_time_scale(mut self, scale: f64) -> Result<Self, ConfigurationError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ConfigurationError::InvalidScale(scale));
        }
        self.time_scale = scale;
        Ok(self)
    }

    /// Sensor size reported through [`EventSource::resolution`].
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Next event, or `None` at end of input.
    pub fn read_event(&mut self) -> Result<Option<Event>, ReadError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let event = self.parse_line()?;
            self.check_order(event.timestamp);
            return Ok(Some(event));
        }
    }

    fn parse_line(&self) -> Result<Event, ReadError> {
        let text = self.buf.trim();
        let separator = self.separator;
        let split = text
            .split(move |c: char| match separator {
                Some(sep) => c == sep,
                None => c.is_whitespace(),
            })
            .map(str::trim)
            .filter(|field| !field.is_empty());

        let mut fields = [""; 4];
        let mut found = 0;
        for field in split {
            if found < fields.len() {
                fields[found] = field;
            }
            found += 1;
        }
        if found < fields.len() {
            return Err(ReadError::MissingColumn {
                line: self.line,
                expected: fields.len(),
                found,
            });
        }

        let [t, x, y, p] = self.columns.positions();
        Ok(Event {
            x: self.parse_coordinate(fields[x], "x")?,
            y: self.parse_coordinate(fields[y], "y")?,
            timestamp: self.parse_timestamp(fields[t])?,
            polarity: self.parse_polarity(fields[p])?,
        })
    }

    fn parse_coordinate(&self, field: &str, axis: &str) -> Result<u16, ReadError> {
        field.parse().map_err(|_| self.error(format!("invalid {} coordinate {:?}", axis, field)))
    }

    fn parse_timestamp(&self, field: &str) -> Result<i64, ReadError> {
        if self.time_scale == 1.0 {
            if let Ok(t) = field.parse::<i64>() {
                return Ok(t);
            }
        }
        let t: f64 = field
            .parse()
            .map_err(|_| self.error(format!("invalid timestamp {:?}", field)))?;
        let scaled = (t * self.time_scale).round();
        if !scaled.is_finite() || scaled < i64::MIN as f64 || scaled > i64::MAX as f64 {
            return Err(self.error(format!("timestamp {:?} out of range", field)));
        }
        Ok(scaled as i64)
    }

    fn parse_polarity(&self, field: &str) -> Result<Polarity, ReadError> {
        match field {
            "1" | "+1" | "true" => Ok(Polarity::Positive),
            "0" | "-1" | "false" => Ok(Polarity::Negative),
            other => Err(self.error(format!("invalid polarity {:?}", other))),
        }
    }

    fn error(&self, message: String) -> ReadError {
        ReadError::Parse {
            line: self.line,
            message,
        }
    }

    fn check_order(&mut self, timestamp: i64) {
        if let Some(last) = self.last_timestamp {
            if timestamp < last && !self.warned_order {
                warn!(
                    line = self.line,
                    timestamp,
                    previous = last,
                    "event timestamps go backwards; representations assume ordered input"
                );
                self.warned_order = true;
            }
        }
        self.last_timestamp = Some(timestamp);
    }
}

impl<R: BufRead + Seek> PlainTextReader<R> {
    /// Restart from the beginning of the stream.
    pub fn rewind(&mut self) -> Result<(), ReadError> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.line = 0;
        self.last_timestamp = None;
        self.warned_order = false;
        Ok(())
    }
}

impl<R: BufRead> Iterator for PlainTextReader<R> {
    type Item = Result<Event, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event().transpose()
    }
}

impl<R: BufRead> EventSource for PlainTextReader<R> {
    fn next_event(&mut self) -> Result<Option<Event>, ReadError> {
        self.read_event()
    }

    fn resolution(&self) -> Option<(u32, u32)> {
        self.resolution
    }
}
