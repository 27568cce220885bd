//! Signal accumulation
//!
//! Reads label blocks from a [`LineReader`] and collects their samples into
//! a [`RawSignalTable`]. A block is a label line, a run of sample lines and a
//! terminator line. Blocks that repeat a label are appended to the signal
//! already in the table.
//!
//! A wildcard in the y column repeats the signal's previous y-value, looking
//! back into earlier blocks of the same label when the current block has
//! none yet.
//!
//! Per-line problems (bad tokens, too few values) are logged, counted in
//! the [`IngestReport`] and skipped. A missing terminator is fatal: once the
//! block structure is lost there is no reliable way to resynchronize.

use crate::config::DecoderConfig;
use crate::reader::LineReader;
use crate::sample::decode_sample;
use crate::types::{DecoderError, RawLine, RawSignal, RawSignalTable, Result};
use std::io::{BufRead, Seek};

/// Skipped-line errors kept in [`IngestReport::skipped`]; later ones are
/// only counted
pub const MAX_RECORDED_ERRORS: usize = 100;

/// Counters and recoverable errors collected while accumulating
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Label blocks read (repeated labels count once per block)
    pub blocks: usize,
    /// Sample lines accepted
    pub samples: usize,
    /// Accepted samples whose y-value was clamped to the maximum
    pub clamped: usize,
    /// Blocks that hit the terminator before their expected length
    pub truncated_blocks: usize,
    /// Lines skipped because they could not be decoded
    pub skipped_lines: usize,
    /// The first [`MAX_RECORDED_ERRORS`] skipped-line errors
    pub skipped: Vec<DecoderError>,
}

impl IngestReport {
    pub fn has_warnings(&self) -> bool {
        self.skipped_lines > 0 || self.truncated_blocks > 0
    }

    fn skip(&mut self, error: DecoderError) {
        self.skipped_lines += 1;
        if self.skipped.len() < MAX_RECORDED_ERRORS {
            self.skipped.push(error);
        }
    }
}

/// Groups decoded samples by label
pub struct SignalAccumulator<'a> {
    config: &'a DecoderConfig,
}

impl<'a> SignalAccumulator<'a> {
    pub fn new(config: &'a DecoderConfig) -> Self {
        Self { config }
    }

    /// Consume the whole input and build the raw signal table
    pub fn accumulate<R: BufRead + Seek>(
        &self,
        reader: &mut LineReader<R>,
    ) -> Result<(RawSignalTable, IngestReport)> {
        let mut table = RawSignalTable::new();
        let mut report = IngestReport::default();

        while let Some(label) = reader.next_line()? {
            if self.config.is_terminator(&label.text) {
                return Err(DecoderError::UnexpectedTerminator {
                    line: label.number,
                    terminator: self.config.terminator.clone(),
                });
            }

            let declared = self.block_len(reader, &label)?;
            let prior_y = table
                .get(&label.text)
                .and_then(|existing| existing.y.last().copied());
            let signal = self.read_block(reader, &label, declared, prior_y, &mut report)?;

            log::debug!(
                "Block '{}' at line {}: {} sample(s), {} gap(s)",
                label.text,
                label.number,
                signal.len(),
                signal.gap_count()
            );

            if table.contains(&signal.label) {
                log::debug!("Appending to existing signal '{}'", signal.label);
            }
            report.blocks += 1;
            table.merge(signal);
        }

        log::info!(
            "Read {} block(s) into {} signal(s): {} sample(s), {} skipped line(s)",
            report.blocks,
            table.len(),
            report.samples,
            report.skipped_lines
        );

        Ok((table, report))
    }

    /// Count the lines between the current position and the next
    /// terminator, then rewind. Nothing is consumed.
    fn block_len<R: BufRead + Seek>(
        &self,
        reader: &mut LineReader<R>,
        label: &RawLine,
    ) -> Result<usize> {
        let mark = reader.mark()?;
        let mut count = 0;

        loop {
            match reader.next_line()? {
                Some(line) if self.config.is_terminator(&line.text) => break,
                Some(_) => count += 1,
                None => {
                    return Err(self.missing_terminator(
                        label,
                        label.number,
                        "reached end of input",
                    ));
                }
            }
        }

        reader.seek(mark)?;
        Ok(count)
    }

    /// Read up to `declared` sample lines followed by the terminator.
    ///
    /// A terminator met before `declared` lines ends the block early and the
    /// signal keeps only the samples actually read. `prior_y` is the last
    /// y-value of an earlier block with the same label.
    pub(crate) fn read_block<R: BufRead + Seek>(
        &self,
        reader: &mut LineReader<R>,
        label: &RawLine,
        declared: usize,
        prior_y: Option<f64>,
        report: &mut IngestReport,
    ) -> Result<RawSignal> {
        let mut signal = RawSignal::with_capacity(label.text.as_str(), declared);

        for _ in 0..declared {
            let line = match reader.next_line()? {
                Some(line) => line,
                None => {
                    return Err(self.missing_terminator(
                        label,
                        reader.line_number(),
                        "reached end of input",
                    ));
                }
            };

            if self.config.is_terminator(&line.text) {
                log::warn!(
                    "Signal '{}': terminator at line {} after {} of {} expected line(s), \
                     truncating block",
                    label.text,
                    line.number,
                    signal.len(),
                    declared
                );
                report.truncated_blocks += 1;
                return Ok(signal);
            }

            let held_y = signal.y.last().copied().or(prior_y);
            let decoded = decode_sample(
                &line,
                &self.config.wildcard,
                self.config.min_columns,
                held_y,
            );
            match decoded {
                Ok(mut sample) => {
                    let clamped = self.config.clamp(sample.y);
                    if clamped < sample.y {
                        report.clamped += 1;
                    }
                    sample.y = clamped;
                    signal.push(sample);
                    report.samples += 1;
                }
                Err(e) if e.is_recoverable() => {
                    log::warn!("Skipping line: {}", e);
                    report.skip(e);
                }
                Err(e) => return Err(e),
            }
        }

        match reader.next_line()? {
            Some(line) if self.config.is_terminator(&line.text) => Ok(signal),
            Some(line) => Err(self.missing_terminator(
                label,
                line.number,
                &format!("found '{}'", line.text),
            )),
            None => Err(self.missing_terminator(
                label,
                reader.line_number(),
                "reached end of input",
            )),
        }
    }

    fn missing_terminator(&self, label: &RawLine, line: usize, found: &str) -> DecoderError {
        DecoderError::MissingTerminator {
            label: label.text.clone(),
            line,
            terminator: self.config.terminator.clone(),
            found: found.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str, config: &DecoderConfig) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(text.as_bytes().to_vec()), config.comment_marker)
    }

    fn accumulate(text: &str, config: &DecoderConfig) -> Result<(RawSignalTable, IngestReport)> {
        SignalAccumulator::new(config).accumulate(&mut reader(text, config))
    }

    #[test]
    fn test_wildcard_y_holds_previous_value() {
        let config = DecoderConfig::new().with_maximum(100.0);
        let (table, report) =
            accumulate("sig1\n0 1.0\n1 *\n2 3.0\nEND_OF_SIGNAL\n", &config).unwrap();

        assert!(!report.has_warnings());
        let sig = table.get("sig1").unwrap();
        assert_eq!(sig.x, vec![Some(0.0), Some(1.0), Some(2.0)]);
        assert_eq!(sig.y, vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_wildcard_y_holds_across_blocks() {
        let input = "s\n0 7\nEND_OF_SIGNAL\ns\n1 *\nEND_OF_SIGNAL\n";
        let (table, _) = accumulate(input, &DecoderConfig::new()).unwrap();
        assert_eq!(table.get("s").unwrap().y, vec![7.0, 7.0]);
    }

    #[test]
    fn test_wildcard_y_first_sample_skipped() {
        let (table, report) =
            accumulate("s\n0 *\n1 2\nEND_OF_SIGNAL\n", &DecoderConfig::new()).unwrap();
        assert_eq!(table.get("s").unwrap().y, vec![2.0]);
        assert!(matches!(report.skipped[0], DecoderError::MalformedSample { line: 2, .. }));
    }

    #[test]
    fn test_wildcard_x() {
        let config = DecoderConfig::new();
        let (table, report) =
            accumulate("sig1\n0 1.0\n* 1.0\n2 3.0\nEND_OF_SIGNAL\n", &config).unwrap();

        assert!(!report.has_warnings());
        assert_eq!(report.samples, 3);
        let sig = table.get("sig1").unwrap();
        assert_eq!(sig.x, vec![Some(0.0), None, Some(2.0)]);
        assert_eq!(sig.y, vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_duplicate_labels_merge_in_order() {
        let input = "\
sig1
0 1.0
END_OF_SIGNAL
other
5 5.0
END_OF_SIGNAL
sig1
1 2.0
END_OF_SIGNAL
";
        let (table, report) = accumulate(input, &DecoderConfig::new()).unwrap();

        assert_eq!(report.blocks, 3);
        assert_eq!(table.len(), 2);
        let sig = table.get("sig1").unwrap();
        assert_eq!(sig.x, vec![Some(0.0), Some(1.0)]);
        assert_eq!(sig.y, vec![1.0, 2.0]);
        assert_eq!(table.labels().collect::<Vec<_>>(), vec!["sig1", "other"]);
    }

    #[test]
    fn test_clamping() {
        let config = DecoderConfig::new().with_maximum(10.0);
        let input = "s\n0 5\n1 10\n2 11\n3 1e9\nEND_OF_SIGNAL\n";
        let (table, report) = accumulate(input, &config).unwrap();

        assert_eq!(table.get("s").unwrap().y, vec![5.0, 10.0, 10.0, 10.0]);
        assert_eq!(report.clamped, 2);
    }

    #[test]
    fn test_malformed_line_does_not_change_count() {
        let config = DecoderConfig::new();
        let clean = "s\n0 1\n1 2\nEND_OF_SIGNAL\n";
        let dirty = "s\n0 1\nabc xyz\n1 2\nEND_OF_SIGNAL\n";

        let (clean_table, _) = accumulate(clean, &config).unwrap();
        let (dirty_table, report) = accumulate(dirty, &config).unwrap();

        assert_eq!(clean_table.get("s"), dirty_table.get("s"));
        assert_eq!(report.skipped_lines, 1);
        assert_eq!(report.skipped[0].line(), Some(3));
    }

    #[test]
    fn test_short_line_skipped() {
        let (table, report) =
            accumulate("s\n0 1\n42\nEND_OF_SIGNAL\n", &DecoderConfig::new()).unwrap();
        assert_eq!(table.get("s").unwrap().len(), 1);
        assert!(matches!(report.skipped[0], DecoderError::ShortSample { .. }));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let input =
            "# capture\n\nsig # the label\n  0 1 # first\n\n1 2\nEND_OF_SIGNAL # done\n\n# eof\n";
        let (table, _) = accumulate(input, &DecoderConfig::new()).unwrap();
        assert_eq!(table.get("sig").unwrap().len(), 2);
    }

    #[test]
    fn test_empty_block() {
        let (table, _) = accumulate("empty\nEND_OF_SIGNAL\n", &DecoderConfig::new()).unwrap();
        assert!(table.get("empty").unwrap().is_empty());
    }

    #[test]
    fn test_empty_input() {
        let (table, report) = accumulate("# nothing here\n\n", &DecoderConfig::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(report.blocks, 0);
    }

    #[test]
    fn test_missing_terminator_is_fatal() {
        let err = accumulate("s\n0 1\n1 2\n", &DecoderConfig::new()).unwrap_err();
        assert!(matches!(err, DecoderError::MissingTerminator { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_unexpected_terminator() {
        let err = accumulate("END_OF_SIGNAL\n", &DecoderConfig::new()).unwrap_err();
        assert!(matches!(err, DecoderError::UnexpectedTerminator { line: 1, .. }));
    }

    #[test]
    fn test_early_terminator_truncates() {
        let config = DecoderConfig::new();
        let acc = SignalAccumulator::new(&config);
        let mut r = reader("0 1\n1 2\nEND_OF_SIGNAL\nnext\n", &config);
        let label = RawLine::new(1, "s");
        let mut report = IngestReport::default();

        let signal = acc.read_block(&mut r, &label, 5, None, &mut report).unwrap();

        assert_eq!(signal.x, vec![Some(0.0), Some(1.0)]);
        assert_eq!(signal.y, vec![1.0, 2.0]);
        assert_eq!(report.truncated_blocks, 1);
        // The terminator was consumed; the next label is still available
        assert_eq!(r.next_line().unwrap().unwrap().text, "next");
    }

    #[test]
    fn test_wrong_line_after_declared_count() {
        let config = DecoderConfig::new();
        let acc = SignalAccumulator::new(&config);
        let mut r = reader("0 1\n1 2\nEND_OF_SIGNAL\n", &config);
        let label = RawLine::new(1, "s");
        let mut report = IngestReport::default();

        let err = acc.read_block(&mut r, &label, 1, None, &mut report).unwrap_err();
        match err {
            DecoderError::MissingTerminator { line, found, .. } => {
                assert_eq!(line, 2);
                assert_eq!(found, "found '1 2'");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_tokens() {
        let config = DecoderConfig::new()
            .with_wildcard("?")
            .with_terminator("END")
            .with_comment_marker(';');
        let input = "# not a comment\n? 1 ; wildcard x\nEND\na ; label\n? 1\n2 2\nEND ; done\n";
        let (table, report) = accumulate(input, &config).unwrap();

        assert_eq!(report.blocks, 2);
        assert_eq!(table.labels().collect::<Vec<_>>(), vec!["# not a comment", "a"]);
        assert_eq!(table.get("a").unwrap().x, vec![None, Some(2.0)]);
        assert_eq!(table.get("a").unwrap().y, vec![1.0, 2.0]);
    }

    #[test]
    fn test_infinite_x_skipped() {
        let input = "s\n-inf 1\n* 2\ninf 3\n4 4\nEND_OF_SIGNAL\n";
        let (table, report) = accumulate(input, &DecoderConfig::new()).unwrap();

        assert_eq!(report.skipped_lines, 2);
        assert_eq!(report.skipped[0].line(), Some(2));
        assert_eq!(report.skipped[1].line(), Some(4));
        assert_eq!(table.get("s").unwrap().x, vec![None, Some(4.0)]);
    }

    #[test]
    fn test_skipped_errors_are_capped() {
        let garbage = MAX_RECORDED_ERRORS + 5;
        let mut input = String::from("s\n0 1\n");
        for _ in 0..garbage {
            input.push_str("abc\n");
        }
        input.push_str("1 2\nEND_OF_SIGNAL\n");

        let (table, report) = accumulate(&input, &DecoderConfig::new()).unwrap();

        assert_eq!(table.get("s").unwrap().len(), 2);
        assert_eq!(report.skipped_lines, garbage);
        assert_eq!(report.skipped.len(), MAX_RECORDED_ERRORS);
        assert_eq!(report.skipped[0].line(), Some(3));
        assert!(report.has_warnings());
    }
}
