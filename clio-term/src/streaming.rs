//! Streaming Pipeline (`spec.md` §4.3, the hardest subsystem). Split into a
//! pure fold over [`clio_protocol::ModelEvent`] (this module) and an IO
//! driver that actually writes to the terminal ([`crate::chat_controller`]).
//! Per the REDESIGN FLAG in `spec.md` §9 ("Callbacks vs. iterators"), the
//! fold is a pure state transition so P1–P4 and P7/P8 are testable without
//! a terminal at all.

use std::time::Duration;
use std::time::Instant;

const FLUSH_LINE_THRESHOLD: usize = 10;
const FLUSH_HARD_CEILING: usize = 50;
const FLUSH_INTERVAL: Duration = Duration::from_millis(500);

/// Extracts complete lines from an arbitrarily-chunked byte stream,
/// holding the trailing incomplete line across calls (`spec.md` §4.3 step
/// 2, P1).
#[derive(Debug, Default)]
pub struct LineExtractor {
    pending: String,
}

impl LineExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every newly-completed line (without the
    /// trailing `\n`). Any partial line at the end of `delta` is held for
    /// the next call.
    pub fn feed(&mut self, delta: &str) -> Vec<String> {
        self.pending.push_str(delta);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=pos).collect();
            lines.push(line.trim_end_matches('\n').to_string());
        }
        lines
    }

    /// Whatever is left in the buffer with no trailing newline yet, taken
    /// at end-of-turn flush (`spec.md` §4.3 step 6).
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

/// Fence/table detection state (`spec.md` §4.3 step 2, P3/P4).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FenceTableState {
    pub in_code_block: bool,
    pub in_table: bool,
}

impl FenceTableState {
    pub fn apply_line(&mut self, line: &str) {
        if line.trim_start().starts_with("```") {
            self.in_code_block = !self.in_code_block;
        }
        let trimmed = line.trim();
        if trimmed.starts_with('|') && trimmed.ends_with('|') && trimmed.len() >= 2 {
            self.in_table = true;
        } else if trimmed.is_empty() {
            // blank lines do not change table state
        } else {
            self.in_table = false;
        }
    }
}

/// Pure flush-cadence decision (`spec.md` §4.3 step 2, P2). `buffer_len` is
/// the number of completed lines currently pending render.
pub fn should_flush(buffer_len: usize, elapsed_since_last_flush: Duration, fence: FenceTableState) -> bool {
    if buffer_len >= FLUSH_HARD_CEILING {
        return true;
    }
    if fence.in_code_block || fence.in_table {
        return false;
    }
    buffer_len >= FLUSH_LINE_THRESHOLD || elapsed_since_last_flush >= FLUSH_INTERVAL
}

/// Accumulates completed markdown lines and decides when to flush, driven
/// entirely by [`LineExtractor::feed`] and [`should_flush`] — no IO here.
pub struct StreamingPipeline {
    extractor: LineExtractor,
    fence: FenceTableState,
    markdown_buffer: Vec<String>,
    last_flush: Instant,
    pub accumulated_content: String,
}

impl StreamingPipeline {
    pub fn new() -> Self {
        Self {
            extractor: LineExtractor::new(),
            fence: FenceTableState::default(),
            markdown_buffer: Vec::new(),
            last_flush: Instant::now(),
            accumulated_content: String::new(),
        }
    }

    pub fn fence_state(&self) -> FenceTableState {
        self.fence
    }

    /// Ingest one chunk of content. Returns the lines ready to flush if the
    /// cadence decision fires, or `None` if more input should accumulate
    /// first.
    pub fn ingest_chunk(&mut self, delta: &str) -> Option<Vec<String>> {
        self.accumulated_content.push_str(delta);
        for line in self.extractor.feed(delta) {
            self.fence.apply_line(&line);
            self.markdown_buffer.push(line);
        }
        if should_flush(self.markdown_buffer.len(), self.last_flush.elapsed(), self.fence) {
            self.flush_now()
        } else {
            None
        }
    }

    /// Force-drain the markdown buffer and (held) partial line, used at
    /// end-of-turn (`spec.md` §4.3 step 6).
    pub fn drain_remaining(&mut self) -> Option<Vec<String>> {
        if let Some(rest) = self.extractor.take_remainder() {
            self.fence.apply_line(&rest);
            self.markdown_buffer.push(rest);
        }
        if self.markdown_buffer.is_empty() {
            None
        } else {
            self.flush_now()
        }
    }

    fn flush_now(&mut self) -> Option<Vec<String>> {
        if self.markdown_buffer.is_empty() {
            return None;
        }
        self.last_flush = Instant::now();
        Some(std::mem::take(&mut self.markdown_buffer))
    }
}

impl Default for StreamingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_extraction_matches_splitting_on_newline_regardless_of_chunking() {
        let whole = "alpha\nbeta\ngamma\n";
        let mut whole_extractor = LineExtractor::new();
        let expected = whole_extractor.feed(whole);

        let chunks = ["al", "pha\nbe", "ta\ngam", "ma\n"];
        let mut chunked_extractor = LineExtractor::new();
        let mut actual = Vec::new();
        for chunk in chunks {
            actual.extend(chunked_extractor.feed(chunk));
        }
        assert_eq!(actual, expected);
    }

    #[test]
    fn trailing_partial_line_is_held_until_flushed() {
        let mut extractor = LineExtractor::new();
        assert!(extractor.feed("no newline yet").is_empty());
        assert_eq!(extractor.take_remainder(), Some("no newline yet".to_string()));
        assert_eq!(extractor.take_remainder(), None);
    }

    #[test]
    fn code_fence_toggles_on_every_backtick_line() {
        let mut fence = FenceTableState::default();
        fence.apply_line("```rust");
        assert!(fence.in_code_block);
        fence.apply_line("let x = 1;");
        assert!(fence.in_code_block);
        fence.apply_line("```");
        assert!(!fence.in_code_block);
    }

    #[test]
    fn table_state_enters_on_pipe_row_and_ignores_blank_lines() {
        let mut fence = FenceTableState::default();
        fence.apply_line("| a | b |");
        assert!(fence.in_table);
        fence.apply_line("");
        assert!(fence.in_table);
        fence.apply_line("not a table row");
        assert!(!fence.in_table);
    }

    #[test]
    fn no_flush_inside_code_block_below_hard_ceiling() {
        let fence = FenceTableState {
            in_code_block: true,
            in_table: false,
        };
        assert!(!should_flush(40, Duration::from_secs(10), fence));
        assert!(should_flush(50, Duration::from_secs(10), fence));
    }

    #[test]
    fn flush_fires_at_line_threshold_outside_fence_or_table() {
        let fence = FenceTableState::default();
        assert!(!should_flush(9, Duration::from_millis(0), fence));
        assert!(should_flush(10, Duration::from_millis(0), fence));
    }

    #[test]
    fn flush_fires_after_time_threshold_even_with_few_lines() {
        let fence = FenceTableState::default();
        assert!(should_flush(1, Duration::from_millis(600), fence));
        assert!(!should_flush(1, Duration::from_millis(100), fence));
    }

    #[test]
    fn pipeline_does_not_flush_mid_table_until_it_exits_or_hits_ceiling() {
        let mut pipeline = StreamingPipeline::new();
        for i in 0..12 {
            let flushed = pipeline.ingest_chunk(&format!("| row {i} |\n"));
            assert!(flushed.is_none(), "must not flush while still inside a table");
        }
        let flushed = pipeline.ingest_chunk("plain text that exits the table\n");
        assert!(flushed.is_some());
    }
}
