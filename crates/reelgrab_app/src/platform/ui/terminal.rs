use std::io::{self, Write};
use std::sync::Mutex;

use reelgrab_core::{MetadataView, StatusNotice};
use reelgrab_engine::UiSink;

const BAR_WIDTH: usize = 30;

pub fn render_metadata(view: &MetadataView) -> Vec<String> {
    let width = view
        .lines()
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    view.lines()
        .into_iter()
        .map(|(label, value)| {
            let pad = width - label.chars().count();
            format!("{label}:{} {value}", " ".repeat(pad))
        })
        .collect()
}

pub fn render_progress(percent: u8) -> String {
    let percent = percent.min(100) as usize;
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {percent:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

/// Writes to a terminal-like sink. The progress bar redraws in place with `\r`.
pub struct TerminalUi<W: Write + Send> {
    out: Mutex<Output<W>>,
}

struct Output<W> {
    writer: W,
    bar_visible: bool,
}

impl TerminalUi<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalUi<W> {
    pub fn new(writer: W) -> Self {
        Self {
            out: Mutex::new(Output {
                writer,
                bar_visible: false,
            }),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out.writer,
            Err(poisoned) => poisoned.into_inner().writer,
        }
    }

    fn with_output(&self, f: impl FnOnce(&mut Output<W>) -> io::Result<()>) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let out = &mut *out;
        if let Err(err) = f(out).and_then(|_| out.writer.flush()) {
            engine_logging::engine_warn!("terminal write failed: {err}");
        }
    }
}

impl<W: Write> Output<W> {
    /// Ends an in-place progress line so the next message starts on its own row.
    fn break_bar(&mut self) -> io::Result<()> {
        if self.bar_visible {
            writeln!(self.writer)?;
            self.bar_visible = false;
        }
        Ok(())
    }
}

impl<W: Write + Send> UiSink for TerminalUi<W> {
    fn show_metadata(&self, view: &MetadataView) {
        self.with_output(|out| {
            out.break_bar()?;
            for line in render_metadata(view) {
                writeln!(out.writer, "{line}")?;
            }
            Ok(())
        });
    }

    fn update_progress(&self, percent: u8) {
        self.with_output(|out| {
            write!(out.writer, "\r{}", render_progress(percent))?;
            out.bar_visible = true;
            Ok(())
        });
    }

    fn hide_progress(&self) {
        self.with_output(|out| out.break_bar());
    }

    fn show_status(&self, notice: StatusNotice) {
        self.with_output(|out| {
            out.break_bar()?;
            writeln!(out.writer, "{}", notice.text())
        });
    }

    fn show_error(&self, message: &str) {
        self.with_output(|out| {
            out.break_bar()?;
            writeln!(out.writer, "Error: {message}")
        });
    }

    fn clear_error(&self) {
        // Printed lines cannot be retracted.
        engine_logging::engine_trace!("clear_error on terminal is a no-op");
    }
}
