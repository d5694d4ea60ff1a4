use std::io::Write;

use reelgrab_core::OutputFormat;
use reelgrab_engine::FormatPrompt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Interprets one answer line. Blank keeps the preselected format; a menu number or a
/// format name picks that format. Anything else is `None` and should be asked again.
pub fn parse_format_choice(line: &str, preselected: OutputFormat) -> Option<OutputFormat> {
    let answer = line.trim();
    if answer.is_empty() {
        return Some(preselected);
    }
    if let Ok(index) = answer.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| OutputFormat::ALL.get(i).copied());
    }
    answer.parse().ok()
}

pub fn menu(preselected: OutputFormat) -> String {
    let mut text = String::from("Formato de descarga:\n");
    for (i, format) in OutputFormat::ALL.iter().enumerate() {
        let marker = if *format == preselected { '*' } else { ' ' };
        text.push_str(&format!(" {marker} {}) {format}\n", i + 1));
    }
    text.push_str(&format!("Elija formato [{preselected}]: "));
    text
}

/// Reads the format answer from a line source, stdin in the binary.
pub struct LinePrompt<R> {
    lines: Mutex<Lines<R>>,
}

impl LinePrompt<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> LinePrompt<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }
}

#[async_trait::async_trait]
impl<R: AsyncBufRead + Unpin + Send> FormatPrompt for LinePrompt<R> {
    async fn choose_format(&self, preselected: OutputFormat) -> Option<OutputFormat> {
        let mut lines = self.lines.lock().await;
        loop {
            print!("{}", menu(preselected));
            let _ = std::io::stdout().flush();

            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    engine_logging::engine_debug!("format prompt reached end of input");
                    return None;
                }
                Err(err) => {
                    engine_logging::engine_warn!("reading format answer failed: {err}");
                    return None;
                }
            };
            match parse_format_choice(&line, preselected) {
                Some(format) => return Some(format),
                None => println!("Opción no válida: {}", line.trim()),
            }
        }
    }
}

/// Confirms the preselected format without asking.
pub struct AutoConfirm;

#[async_trait::async_trait]
impl FormatPrompt for AutoConfirm {
    async fn choose_format(&self, preselected: OutputFormat) -> Option<OutputFormat> {
        Some(preselected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answer_keeps_preselection() {
        assert_eq!(parse_format_choice("", OutputFormat::Mp3), Some(OutputFormat::Mp3));
        assert_eq!(parse_format_choice("  \t", OutputFormat::Mp4), Some(OutputFormat::Mp4));
    }

    #[test]
    fn numbers_and_names_pick_a_format() {
        assert_eq!(parse_format_choice("2", OutputFormat::Mp4), Some(OutputFormat::Mp3));
        assert_eq!(parse_format_choice("1", OutputFormat::Mp3), Some(OutputFormat::Mp4));
        assert_eq!(parse_format_choice(" MP3 ", OutputFormat::Mp4), Some(OutputFormat::Mp3));
        assert_eq!(parse_format_choice("3", OutputFormat::Mp4), None);
        assert_eq!(parse_format_choice("0", OutputFormat::Mp4), None);
        assert_eq!(parse_format_choice("wav", OutputFormat::Mp4), None);
    }

    #[test]
    fn menu_marks_preselection() {
        let text = menu(OutputFormat::Mp3);
        assert!(text.contains("   1) mp4\n"));
        assert!(text.contains(" * 2) mp3\n"));
        assert!(text.ends_with("[mp3]: "));
    }

    #[tokio::test]
    async fn invalid_answers_are_asked_again() {
        let prompt = LinePrompt::new(BufReader::new(&b"wav\n\n"[..]));
        assert_eq!(
            prompt.choose_format(OutputFormat::Mp3).await,
            Some(OutputFormat::Mp3)
        );
    }

    #[tokio::test]
    async fn end_of_input_aborts() {
        let prompt = LinePrompt::new(BufReader::new(&b"bogus\n"[..]));
        assert_eq!(prompt.choose_format(OutputFormat::Mp4).await, None);
    }
}
