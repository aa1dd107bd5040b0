//! Text display surface for reports.

use std::io::Write;

use crate::monitor::collaborator::{CollaboratorError, ReportSink};
use crate::monitor::report::Report;

/// Renders each report as text to a writer, the way a status panel would.
///
/// A panel shows one report at a time, so every write replaces what the
/// reader sees; on a plain stream that means reports are separated by a
/// blank line.
pub struct TextSink<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Number of reports and status lines written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes one entry; only counted once it reached the writer.
    fn emit(&mut self, text: std::fmt::Arguments<'_>) -> std::io::Result<()> {
        if self.written > 0 {
            writeln!(self.out)?;
        }
        self.out.write_fmt(text)?;
        self.out.flush()?;
        self.written += 1;
        Ok(())
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn write(&mut self, report: &Report) -> Result<(), CollaboratorError> {
        self.emit(format_args!("{report}"))?;
        Ok(())
    }

    fn write_status(&mut self, line: &str) -> Result<(), CollaboratorError> {
        self.emit(format_args!("{line}\n"))?;
        Ok(())
    }
}

/// Sink that shows nothing, for quiet runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn write(&mut self, _report: &Report) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn write_status(&mut self, _line: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::monitor::metrics::{AggregateMetrics, Snapshot};
    use crate::monitor::recommendation::Recommendation;

    fn empty_report() -> Report {
        Report::build(
            "Outpost",
            Utc.with_ymd_and_hms(2025, 1, 1, 8, 30, 0).unwrap(),
            &Snapshot::default(),
            &AggregateMetrics::default(),
            Recommendation::default(),
            1.5,
            None,
        )
    }

    #[test]
    fn writes_report_text() {
        let mut sink = TextSink::new(Vec::new());
        sink.write(&empty_report()).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.starts_with("=== GRID POWER STATUS ===\nGrid: Outpost\nTime: 08:30:00\n"));
    }

    #[test]
    fn separates_consecutive_writes() {
        let mut sink = TextSink::new(Vec::new());
        sink.write_status("first").unwrap();
        sink.write_status("second").unwrap();
        assert_eq!(sink.written(), 2);
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "first\n\nsecond\n");
    }

    #[test]
    fn io_failure_surfaces_as_collaborator_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("panel detached"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sink = TextSink::new(Broken);
        let err = sink.write(&empty_report()).unwrap_err();
        assert!(matches!(err, CollaboratorError::Io(_)));
        assert_eq!(sink.written(), 0);
    }

    #[test]
    fn failed_write_adds_no_separator() {
        // rejects the first write, then behaves
        struct Flaky {
            failed: bool,
            buf: Vec<u8>,
        }
        impl Write for Flaky {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if !self.failed {
                    self.failed = true;
                    return Err(std::io::Error::other("panel busy"));
                }
                self.buf.write(buf)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sink = TextSink::new(Flaky {
            failed: false,
            buf: Vec::new(),
        });
        assert!(sink.write_status("lost").is_err());
        sink.write_status("shown").unwrap();
        assert_eq!(sink.written(), 1);
        assert_eq!(String::from_utf8(sink.into_inner().buf).unwrap(), "shown\n");
    }
}
