use crate::error::LyricError;
use crate::srt::{SubtitleEntry, SubtitleTrack};

use std::fs;
use std::path::Path;
use std::time::Duration;

use nom::bytes::complete::{tag, take_while_m_n};
use nom::combinator::{all_consuming, map_res};
use nom::error::{convert_error, VerboseError};
use nom::{Err, IResult};
use regex::Regex;

const BLOCK_SEPARATOR: &str = r"\n\s*\n";
// ASCII digits only, the same set `parse_time` accepts.
const TIMECODE: &str = r"([0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3})\s*-->\s*([0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3})";
const MARKUP: &str = r"<.*?>";

/// Reads an SRT file into a track. A missing file is reported before any read is attempted.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SubtitleTrack, LyricError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LyricError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    Parser::new()?.parse(&content)
}

pub struct Parser {
    block_separator: Regex,
    timecode: Regex,
    markup: Regex,
}

impl Parser {
    pub fn new() -> Result<Self, LyricError> {
        Ok(Self {
            block_separator: Regex::new(BLOCK_SEPARATOR)?,
            timecode: Regex::new(TIMECODE)?,
            markup: Regex::new(MARKUP)?,
        })
    }

    /// Parses SRT text into a track sorted by start time.
    ///
    /// Blocks are kept only if they contain a timecode line followed by at least one line
    /// of text that survives markup stripping. Anything before the timecode line, such as
    /// the sequence number, is ignored.
    pub fn parse(&self, input: &str) -> Result<SubtitleTrack, LyricError> {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        let mut content = input.replace("\r\n", "\n").replace('\r', "\n");
        if !content.ends_with('\n') {
            content.push('\n');
        }

        let entries: Vec<SubtitleEntry> = self
            .block_separator
            .split(content.trim())
            .enumerate()
            .filter_map(|(n, block)| {
                let entry = self.block(block);
                if entry.is_none() {
                    log::debug!("Discarding subtitle block {}: {:?}", n + 1, block);
                }
                entry
            })
            .collect();

        if entries.is_empty() {
            return Err(LyricError::Parse(
                "No valid subtitle entries found in the SRT file.".to_string(),
            ));
        }
        log::debug!("Parsed {} subtitle entries", entries.len());
        Ok(SubtitleTrack::new(entries))
    }

    fn block(&self, block: &str) -> Option<SubtitleEntry> {
        let lines: Vec<&str> = block.trim().split('\n').collect();
        if lines.len() < 2 {
            return None;
        }

        let (time_line, captures) = lines
            .iter()
            .enumerate()
            .find_map(|(i, line)| self.timecode.captures(line).map(|c| (i, c)))?;

        // The end time is never shown, but a malformed one still invalidates the block.
        let start = match (parse_time(&captures[1]), parse_time(&captures[2])) {
            (Ok(start), Ok(_)) => start,
            (Err(err), _) | (_, Err(err)) => {
                log::debug!("Bad timecode {:?}: {}", &captures[0], err);
                return None;
            }
        };

        let text = lines[time_line + 1..]
            .iter()
            .map(|line| self.markup.replace_all(line, ""))
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<String>>()
            .join(" ");

        if text.is_empty() {
            None
        } else {
            Some(SubtitleEntry::new(start, text))
        }
    }
}

/// Parses an `HH:MM:SS,mmm` timecode.
pub fn parse_time(input: &str) -> Result<Duration, LyricError> {
    match all_consuming(timestamp)(input) {
        Ok((_, duration)) => Ok(duration),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => {
            Err(LyricError::Parse(convert_error(input, err)))
        }
        Err(Err::Incomplete(_)) => {
            unreachable!("Incomplete data received by non-streaming parser.")
        }
    }
}

fn timestamp(input: &str) -> IResult<&str, Duration, VerboseError<&str>> {
    let (input, hours) = digits(2)(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = digits(2)(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = digits(2)(input)?;
    let (input, _) = tag(",")(input)?;
    let (input, millis) = digits(3)(input)?;

    Ok((
        input,
        Duration::from_millis(
            millis + seconds * 1000 + minutes * 60 * 1000 + hours * 60 * 60 * 1000,
        ),
    ))
}

fn digits<'a>(count: usize) -> impl FnMut(&'a str) -> IResult<&'a str, u64, VerboseError<&'a str>> {
    map_res(
        take_while_m_n(count, count, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u64>(),
    )
}
