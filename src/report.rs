use std::fmt::{self, Write as _};

use crate::{LeakAnalyzer, ValueType};

/// A human readable report of a [`LeakAnalyzer`] state.
///
/// It lists the top entries of the latest snapshot, with the growth since the previous one,
/// followed by the classes reported as leak suspects:
///
/// ```text
/// ***** Top 2 sizes *****
///         64:       3000 (      1000)
///         16:         10 (         0)
/// Suspected sizes: 64
/// ```
pub struct Report<'a, V: ValueType> {
    analyzer: &'a LeakAnalyzer<V>,
}

impl<'a, V: ValueType> Report<'a, V> {
    pub fn new(analyzer: &'a LeakAnalyzer<V>) -> Self {
        Self { analyzer }
    }

    /// Renders the report, keeping at most `buffer_size - 1` bytes, as a nul terminated buffer would.
    pub fn render(&self, buffer_size: usize) -> String {
        let mut writer = BoundedWriter::new(buffer_size.saturating_sub(1));
        // the writer only fails once full, and the truncated text is what we want
        let _ = write!(writer, "{self}");
        writer.buffer
    }
}

impl<V: ValueType> fmt::Display for Report<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.analyzer.latest_snapshot();
        if let Some(top) = snapshot.first() {
            writeln!(
                f,
                "***** Top {} {}s *****",
                snapshot.len(),
                top.value.type_name()
            )?;

            for entry in snapshot.iter().take_while(|entry| entry.count > 0) {
                write!(f, "{:>10}: {:>10} ", entry.value, entry.count)?;
                if let Some(previous) = self.analyzer.previous_count(&entry.value) {
                    let delta = entry.count as i128 - previous as i128;
                    write!(f, "({delta:>10})")?;
                }
                writeln!(f)?;
            }
        }

        let suspects = self.analyzer.suspects();
        if let Some(first) = suspects.first() {
            write!(f, "Suspected {}s: ", first.type_name())?;
            for (index, value) in suspects.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{value}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// A [`fmt::Write`] which stops accepting text once `limit` bytes have been written.
struct BoundedWriter {
    buffer: String,
    limit: usize,
}

impl BoundedWriter {
    fn new(limit: usize) -> Self {
        Self {
            buffer: String::with_capacity(limit),
            limit,
        }
    }
}

impl fmt::Write for BoundedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let remaining = self.limit - self.buffer.len();
        if s.len() <= remaining {
            self.buffer.push_str(s);
            return Ok(());
        }

        let mut end = remaining;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buffer.push_str(&s[..end]);

        Err(fmt::Error)
    }
}
