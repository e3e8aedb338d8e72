use super::patterns::{app_switch, prefix_paths};
use crate::umbrella::AppDictionary;
use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use tracing::{debug, trace};

/// Line-by-line rewriter tracking which app the tool is reporting on.
///
/// The current prefix starts empty and changes only on `==> app` lines. Every
/// line, including the switch line itself, is rewritten with the prefix in
/// effect after the switch.
pub struct PathRewriter<'a> {
    dictionary: &'a AppDictionary,
    current_prefix: &'a str,
}

impl<'a> PathRewriter<'a> {
    pub fn new(dictionary: &'a AppDictionary) -> Self {
        Self {
            dictionary,
            current_prefix: "",
        }
    }

    pub fn current_prefix(&self) -> &str {
        self.current_prefix
    }

    /// Rewrites a single line (without its terminator)
    pub fn rewrite_line<'l>(&mut self, line: &'l [u8]) -> Cow<'l, [u8]> {
        if let Some(app) = app_switch(line) {
            self.current_prefix = self.dictionary.lookup(app);
            if self.dictionary.contains(app) {
                trace!(app, prefix = self.current_prefix, "Switched app context");
            } else {
                debug!(app, "Unknown app in output, paths left unprefixed");
            }
        }
        prefix_paths(line, self.current_prefix)
    }

    /// Rewrites `input` into `output` and returns the number of lines written.
    ///
    /// Lines are split on `\n`, a trailing `\r` is dropped and every emitted
    /// line ends with `\n`, so the output has exactly as many lines as the
    /// input. Only I/O on the two streams can fail.
    pub fn rewrite<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> io::Result<usize> {
        let mut buf = Vec::new();
        let mut lines = 0;

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let rewritten = self.rewrite_line(strip_line_ending(&buf));
            output.write_all(&rewritten)?;
            output.write_all(b"\n")?;
            lines += 1;
        }
        output.flush()?;

        Ok(lines)
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Rewrites a fully captured output buffer against `dictionary`
pub fn rewrite_output<W: Write>(
    dictionary: &AppDictionary,
    captured: &[u8],
    output: W,
) -> io::Result<usize> {
    PathRewriter::new(dictionary).rewrite(captured, output)
}
