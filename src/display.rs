use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

pub const FLOWER: &str = "  @--<3--🌸";
const LYRIC_WIDTH: usize = 70;

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))
}

/// Prints lyric lines one character at a time.
pub struct Typewriter<W> {
    out: W,
    char_delay: Duration,
    interrupted: Arc<AtomicBool>,
}

impl<W: Write> Typewriter<W> {
    pub fn new(out: W, char_delay: Duration, interrupted: Arc<AtomicBool>) -> Self {
        Self {
            out,
            char_delay,
            interrupted,
        }
    }

    /// Pads `text` to a fixed column and appends the flower.
    pub fn print_lyric(&mut self, text: &str) -> io::Result<()> {
        let line = format!("{:<width$}{}", text, FLOWER, width = LYRIC_WIDTH);
        self.type_line(&line)
    }

    /// Stops typing as soon as an interruption is flagged, but still ends the line.
    pub fn type_line(&mut self, line: &str) -> io::Result<()> {
        for ch in line.chars() {
            if self.interrupted.load(Ordering::SeqCst) {
                break;
            }
            write!(self.out, "{}", ch)?;
            self.out.flush()?;
            if !self.char_delay.is_zero() {
                thread::sleep(self.char_delay);
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typewriter(interrupted: bool) -> Typewriter<Vec<u8>> {
        Typewriter::new(
            Vec::new(),
            Duration::ZERO,
            Arc::new(AtomicBool::new(interrupted)),
        )
    }

    #[test]
    fn lyric_is_padded_before_the_flower() {
        let mut tw = typewriter(false);

        tw.print_lyric("Hello").unwrap();

        let out = String::from_utf8(tw.into_inner()).unwrap();
        let expected = format!("Hello{}{}\n", " ".repeat(65), FLOWER);
        assert_eq!(out, expected);
    }

    #[test]
    fn long_lyric_is_not_truncated() {
        let mut tw = typewriter(false);
        let text = "x".repeat(80);

        tw.print_lyric(&text).unwrap();

        let out = String::from_utf8(tw.into_inner()).unwrap();
        assert_eq!(out, format!("{}{}\n", text, FLOWER));
    }

    #[test]
    fn padding_counts_characters_not_bytes() {
        let mut tw = typewriter(false);

        tw.print_lyric("però").unwrap();

        let out = String::from_utf8(tw.into_inner()).unwrap();
        assert_eq!(out.chars().count(), LYRIC_WIDTH + FLOWER.chars().count() + 1);
    }

    #[test]
    fn interrupted_typewriter_only_ends_the_line() {
        let mut tw = typewriter(true);

        tw.print_lyric("Hello").unwrap();

        assert_eq!(tw.into_inner(), b"\n");
    }

    #[cfg(unix)]
    #[test]
    fn clear_screen_writes_escape_sequences() {
        let mut out = Vec::new();

        clear_screen(&mut out).unwrap();

        assert_eq!(out, b"\x1b[2J\x1b[1;1H");
    }
}
