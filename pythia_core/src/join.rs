//! Simulation log joining.
//!
//! Reads `<prefix>0 .. <prefix>N-1` in index order, copies payload lines
//! verbatim into one output and replaces every `#<int>` line with a single
//! trailing `#<total>`.

use crate::config::JoinConfig;
use crate::error::{PythiaError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Marker byte opening a count line.
const COUNT_MARKER: u8 = b'#';

/// Classification of one raw input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `#<int>` line carrying an event count
    Count(i64),

    /// Anything else, copied through untouched
    Payload,
}

impl LineKind {
    /// Classifies a line, including its terminator if present.
    ///
    /// Returns `None` for a `#` line whose remainder is not an integer.
    pub fn classify(line: &[u8]) -> Option<Self> {
        match line.split_first() {
            Some((&COUNT_MARKER, rest)) => std::str::from_utf8(rest)
                .ok()
                .and_then(|text| text.trim().parse().ok())
                .map(LineKind::Count),
            _ => Some(LineKind::Payload),
        }
    }
}

/// Per-input statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub payload_lines: u64,
    pub count_lines: u64,
    pub event_count: i64,
}

/// Outcome of a join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinSummary {
    /// Where the aggregate was written
    pub output_path: PathBuf,

    /// Number of inputs consumed
    pub files_read: u64,

    /// Payload lines copied
    pub payload_lines: u64,

    /// Count lines folded into the total
    pub count_lines: u64,

    /// Sum of every count across all inputs
    pub event_count: i64,

    /// Breakdown per input, in index order
    pub per_file: Vec<FileSummary>,
}

impl JoinSummary {
    fn absorb(&mut self, file: FileSummary) -> Result<()> {
        self.event_count = self
            .event_count
            .checked_add(file.event_count)
            .ok_or_else(|| PythiaError::CountOverflow {
                path: file.path.clone(),
            })?;
        self.files_read += 1;
        self.payload_lines += file.payload_lines;
        self.count_lines += file.count_lines;
        self.per_file.push(file);
        Ok(())
    }
}

/// Drains one input into `output`, returning its statistics.
fn copy_stream<R: BufRead, W: Write>(
    path: &Path,
    mut input: R,
    output_path: &Path,
    output: &mut W,
) -> Result<FileSummary> {
    let mut summary = FileSummary {
        path: path.to_path_buf(),
        ..Default::default()
    };
    let mut line = Vec::new();
    let mut line_no = 0;

    loop {
        line.clear();
        let read = input
            .read_until(b'\n', &mut line)
            .map_err(|e| PythiaError::io(path, e))?;
        if read == 0 {
            break;
        }
        line_no += 1;

        match LineKind::classify(&line) {
            Some(LineKind::Count(n)) => {
                summary.count_lines += 1;
                summary.event_count = summary
                    .event_count
                    .checked_add(n)
                    .ok_or_else(|| PythiaError::CountOverflow {
                        path: path.to_path_buf(),
                    })?;
            }
            Some(LineKind::Payload) => {
                summary.payload_lines += 1;
                output
                    .write_all(&line)
                    .map_err(|e| PythiaError::io(output_path, e))?;
            }
            None => {
                return Err(PythiaError::InvalidCount {
                    path: path.to_path_buf(),
                    line: line_no,
                    text: String::from_utf8_lossy(&line).trim_end().to_string(),
                });
            }
        }
    }

    Ok(summary)
}

fn write_total<W: Write>(output: &mut W, output_path: &Path, total: i64) -> Result<()> {
    writeln!(output, "{}{}", COUNT_MARKER as char, total)
        .and_then(|_| output.flush())
        .map_err(|e| PythiaError::io(output_path, e))
}

/// Joins already-open inputs into `output`, then appends `#<total>`.
///
/// Inputs are drained one at a time in the order given. Errors on the
/// output sink are reported against `output_path`.
pub fn join_streams<I, P, R, W>(inputs: I, output_path: &Path, mut output: W) -> Result<JoinSummary>
where
    I: IntoIterator<Item = (P, R)>,
    P: AsRef<Path>,
    R: BufRead,
    W: Write,
{
    let mut summary = JoinSummary {
        output_path: output_path.to_path_buf(),
        ..Default::default()
    };

    for (path, input) in inputs {
        let file = copy_stream(path.as_ref(), input, output_path, &mut output)?;
        summary.absorb(file)?;
    }

    write_total(&mut output, output_path, summary.event_count)?;
    Ok(summary)
}

/// Joins numbered simulation outputs on disk.
pub struct LogJoiner {
    config: JoinConfig,
}

impl LogJoiner {
    /// Creates a joiner.
    pub fn new(config: JoinConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    /// Joins inputs `0..task_count` into the configured output.
    ///
    /// The output is truncated before any input is opened. A missing input
    /// aborts the join and leaves the output incomplete.
    pub fn join(&self, task_count: u64) -> Result<JoinSummary> {
        let output_path = &self.config.output_path;
        let output = File::create(output_path).map_err(|e| PythiaError::io(output_path, e))?;
        let mut output = BufWriter::new(output);

        let mut summary = JoinSummary {
            output_path: output_path.clone(),
            ..Default::default()
        };

        for index in 0..task_count {
            let path = self.config.input_path(index);
            let input = File::open(&path).map_err(|e| PythiaError::open_input(&path, e))?;
            let file = copy_stream(&path, BufReader::new(input), output_path, &mut output)?;
            debug!(
                "{}: {} payload lines, {} events",
                path.display(),
                file.payload_lines,
                file.event_count
            );
            summary.absorb(file)?;
        }

        write_total(&mut output, output_path, summary.event_count)?;

        info!(
            "Joined {} files into {} ({} events)",
            summary.files_read,
            output_path.display(),
            summary.event_count
        );
        Ok(summary)
    }
}
