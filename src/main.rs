mod display;
mod error;
mod launcher;
mod parser;
mod srt;
mod sync;

use crate::display::Typewriter;
use crate::error::PlayerError;
use crate::launcher::{Launcher, Playback, SystemLauncher};
use crate::sync::{Outcome, SyncPlayer, SystemClock};

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;

const AUDIO_WAIT: Duration = Duration::from_secs(5);

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Play a song and scroll its lyrics in sync")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "Directory holding the song and its subtitles. Defaults to the executable's directory if the subtitles are there, otherwise the current directory."
    )]
    dir: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "SRT file with the timed lyrics, relative to the base directory.",
        default_value = "mazzolin.srt"
    )]
    subtitles: PathBuf,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Audio file to play, relative to the base directory.",
        default_value = "mazzolin.mp3"
    )]
    audio: PathBuf,
    #[arg(
        long,
        help = "Do not launch an audio player; start the lyrics when Enter is pressed."
    )]
    no_audio: bool,
    #[arg(
        long,
        value_name = "MS",
        help = "Delay between typed characters.",
        default_value_t = 50
    )]
    char_delay: u64,
    #[arg(
        long,
        value_name = "MS",
        help = "How often the lyric clock is checked.",
        default_value_t = 20
    )]
    poll_interval: u64,
    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity.")]
    verbose: u8,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.verbose);

    let base_dir = resolve_base_dir(cli.dir.as_deref(), &cli.subtitles)?;
    let audio = base_dir.join(&cli.audio);
    let subtitles = base_dir.join(&cli.subtitles);
    log::debug!("Base directory: {}", base_dir.display());

    let mut stdout = io::stdout();
    display::clear_screen(&mut stdout)?;
    println!("🌼 Quel mazzolin di fiori — terminal 🌼");
    println!();
    println!("Audio file: {}", audio.display());
    println!("Subtitle file: {}", subtitles.display());
    println!();

    println!("Parsing SRT…");
    let track = parser::load(&subtitles)
        .with_context(|| format!("Failed to load lyrics from '{}'", subtitles.display()))?;

    println!("Loaded {} lines.", track.len());
    println!("Press Enter to start playback and lyric sync...");
    let mut input = io::stdin().lock();
    wait_for_enter(&mut input)?;

    let mut playback = if cli.no_audio {
        None
    } else {
        start_audio(&SystemLauncher::new(&base_dir), &audio, &mut input)?
    };
    let clock = SystemClock::start_now();

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install the Ctrl-C handler")?;

    let mut typewriter = Typewriter::new(
        io::stdout(),
        Duration::from_millis(cli.char_delay),
        interrupted.clone(),
    );
    let outcome = SyncPlayer::new(clock, interrupted)
        .with_poll_interval(Duration::from_millis(cli.poll_interval))
        .run(&track, |entry| typewriter.print_lyric(entry.text()))
        .context("Failed to write lyrics to the terminal")?;

    finish_audio(outcome, playback.as_mut(), AUDIO_WAIT)?;
    match outcome {
        Outcome::Completed => {
            println!();
            println!("🌸 Fine! 🌸");
        }
        Outcome::Interrupted => {
            display::clear_screen(&mut stdout)?;
            println!("Closed. Alla prossima 🌼");
        }
    }

    Ok(())
}

/// An interrupted session always kills the player. A completed one gives it `wait` to
/// finish the song and then leaves it running.
fn finish_audio(outcome: Outcome, playback: Option<&mut Playback>, wait: Duration) -> Result<()> {
    let playback = match playback {
        Some(playback) => playback,
        None => return Ok(()),
    };
    match outcome {
        Outcome::Completed => {
            if !playback.wait_timeout(wait)? {
                log::info!("{} still playing, not waiting any longer", playback.player());
            }
        }
        Outcome::Interrupted => playback.stop()?,
    }
    Ok(())
}

/// Starts the song. Returns `None` when playback has to happen without us, in which case the
/// lyrics start right away (missing audio) or once the user has started the song by hand.
fn start_audio<L: Launcher, R: BufRead>(
    launcher: &L,
    audio: &Path,
    input: &mut R,
) -> Result<Option<Playback>> {
    match launcher.launch(audio) {
        Ok(playback) => Ok(Some(playback)),
        Err(err @ PlayerError::AudioMissing { .. }) => {
            println!("{}", err);
            println!("Put the song in the base directory or pass its path with --audio.");
            Ok(None)
        }
        Err(err @ PlayerError::Unavailable) => {
            println!("{}", err);
            println!("Start the song manually in your player of choice,");
            print!("then press Enter here to sync the lyrics: ");
            io::stdout().flush()?;
            wait_for_enter(input)?;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn wait_for_enter<R: BufRead>(input: &mut R) -> Result<()> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(())
}

/// The executable's directory when it ships with the subtitles, else the working directory.
fn resolve_base_dir(dir: Option<&Path>, subtitles: &Path) -> Result<PathBuf> {
    if let Some(dir) = dir {
        return Ok(dir.to_path_buf());
    }
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    if let Some(exe_dir) = exe_dir {
        if exe_dir.join(subtitles).exists() {
            return Ok(exe_dir);
        }
    }
    env::current_dir().context("Failed to determine the current directory")
}

fn setup_logger(level: u8) {
    let mut builder = pretty_env_logger::formatted_timed_builder();

    let log_level = match level {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    builder.filter_level(log_level);
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp_millis();
    builder.init();
}
