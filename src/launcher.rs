//! Fire-and-forget audio playback through an external command-line player.

use crate::error::PlayerError;

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const WAIT_POLL: Duration = Duration::from_millis(50);

/// Something that can start playing an audio file in the background.
pub trait Launcher {
    fn launch(&self, audio: &Path) -> Result<Playback, PlayerError>;
}

/// A known player and the arguments that make it play once without a window.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCommand {
    pub name: &'static str,
    pub program: PathBuf,
    pub args: &'static [&'static str],
}

impl PlayerCommand {
    fn command(&self, audio: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args)
            .arg(audio)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

/// Players in preference order.
const PLAYERS: &[(&str, &[&str])] = &[
    ("ffplay", &["-nodisp", "-autoexit"]),
    ("afplay", &[]),
    ("vlc", &["--intf", "dummy", "--play-and-exit"]),
    ("mpg123", &[]),
];

/// Looks for players in the resource directory first, then on `PATH`.
pub struct SystemLauncher {
    base_dir: PathBuf,
    search_path: Option<OsString>,
}

impl SystemLauncher {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
            search_path: env::var_os("PATH"),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn find_player(&self) -> Option<PlayerCommand> {
        // Only ffplay is ever shipped next to the resources.
        let (name, args) = PLAYERS[0];
        let bundled = self.base_dir.join(executable_name(name));
        if is_executable(&bundled) {
            return Some(PlayerCommand {
                name,
                program: bundled,
                args,
            });
        }

        PLAYERS.iter().find_map(|&(name, args)| {
            self.which(name).map(|program| PlayerCommand {
                name,
                program,
                args,
            })
        })
    }

    fn which(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        let file = executable_name(name);
        env::split_paths(search_path)
            .map(|dir| dir.join(&file))
            .find(|candidate| is_executable(candidate))
    }
}

impl Launcher for SystemLauncher {
    fn launch(&self, audio: &Path) -> Result<Playback, PlayerError> {
        if !audio.exists() {
            return Err(PlayerError::AudioMissing {
                path: audio.to_path_buf(),
            });
        }
        let player = self.find_player().ok_or(PlayerError::Unavailable)?;
        log::info!("Starting {} ({})", player.name, player.program.display());

        let child = player
            .command(audio)
            .spawn()
            .map_err(|source| PlayerError::Spawn {
                player: player.name,
                source,
            })?;

        Ok(Playback {
            player: player.name,
            child,
        })
    }
}

fn executable_name(name: &str) -> String {
    format!("{}{}", name, env::consts::EXE_SUFFIX)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// A running player process.
#[derive(Debug)]
pub struct Playback {
    player: &'static str,
    child: Child,
}

impl Playback {
    pub fn player(&self) -> &'static str {
        self.player
    }

    /// Waits for the player to exit on its own. Returns `false` if it is still running when
    /// `timeout` expires.
    pub fn wait_timeout(&mut self, timeout: Duration) -> io::Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.child.try_wait()?.is_some() {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            thread::sleep(WAIT_POLL.min(deadline - now));
        }
    }

    pub fn is_running(&mut self) -> io::Result<bool> {
        Ok(self.child.try_wait()?.is_none())
    }

    /// Kills the player if it is still running and reaps it.
    pub fn stop(&mut self) -> io::Result<()> {
        if self.is_running()? {
            log::debug!("Stopping {}", self.player);
            self.child.kill()?;
            self.child.wait()?;
        }
        Ok(())
    }
}
