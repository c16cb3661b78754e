//! Message output
//!
//! Writes Singer messages as JSON lines. In production this wraps stdout;
//! tests hand it a `Vec<u8>` and inspect the lines.

use super::messages::Message;
use crate::error::Result;
use std::io::Write;

/// Writes Singer messages to an output sink
pub struct MessageWriter<W: Write> {
    out: W,
    records_written: u64,
}

impl MessageWriter<std::io::Stdout> {
    /// Writer for stdout, the normal tap output channel
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> MessageWriter<W> {
    /// Create a writer over any sink
    pub fn new(out: W) -> Self {
        Self {
            out,
            records_written: 0,
        }
    }

    /// Write one message as a JSON line
    pub fn write(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;

        match message {
            Message::Record { .. } => {
                self.records_written += 1;
            }
            // STATE must be durable before the run can be resumed from it
            Message::State { .. } => {
                self.out.flush()?;
            }
            Message::Schema { .. } => {}
        }

        Ok(())
    }

    /// Flush the underlying sink
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Number of RECORD messages written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Consume the writer and return the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn lines(buf: &[u8]) -> Vec<Value> {
        String::from_utf8(buf.to_vec())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_json_lines() {
        let mut writer = MessageWriter::new(Vec::new());
        writer
            .write(&Message::schema(
                "accounts",
                json!({"type": "object"}),
                vec!["accountId".to_string()],
                vec![],
            ))
            .unwrap();
        writer
            .write(&Message::record("accounts", json!({"accountId": 1})))
            .unwrap();
        writer.write(&Message::state(json!({}))).unwrap();

        let out = lines(&writer.into_inner());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["type"], "SCHEMA");
        assert_eq!(out[1]["type"], "RECORD");
        assert_eq!(out[2]["type"], "STATE");
    }

    #[test]
    fn test_counts_records() {
        let mut writer = MessageWriter::new(Vec::new());
        assert_eq!(writer.records_written(), 0);

        for i in 0..3 {
            writer
                .write(&Message::record("accounts", json!({"accountId": i})))
                .unwrap();
        }
        writer.write(&Message::state(json!({}))).unwrap();

        assert_eq!(writer.records_written(), 3);
    }
}
