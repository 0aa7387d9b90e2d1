//! JSON-lines sink: one descriptor object per line.

use std::io::Write;

use async_trait::async_trait;
use serde::Serialize;

use super::{MetadataSink, SinkError};
use crate::model::TableDescriptor;

#[derive(Serialize)]
struct Fingerprinted<'a> {
    fingerprint: String,
    table: &'a TableDescriptor,
}

/// Writes each descriptor as a single line of JSON.
///
/// With fingerprints enabled each line is wrapped as
/// `{"fingerprint": "<sha256>", "table": {...}}`.
pub struct JsonLinesSink<W> {
    writer: W,
    fingerprints: bool,
    written: usize,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            fingerprints: false,
            written: 0,
        }
    }

    pub fn with_fingerprints(mut self, enabled: bool) -> Self {
        self.fingerprints = enabled;
        self
    }

    /// Number of lines written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: Write + Send> MetadataSink for JsonLinesSink<W> {
    async fn publish(&mut self, table: &TableDescriptor) -> Result<(), SinkError> {
        if self.fingerprints {
            let line = Fingerprinted {
                fingerprint: table.fingerprint()?,
                table,
            };
            serde_json::to_writer(&mut self.writer, &line)?;
        } else {
            serde_json::to_writer(&mut self.writer, table)?;
        }
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
