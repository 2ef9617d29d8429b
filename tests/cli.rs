use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

const LYRICS: &str = "1\n00:00:00,000 --> 00:00:01,000\n<i>Quel mazzolin</i> di fiori\n\n\
                      2\n00:00:00,010 --> 00:00:01,000\nche vien dalla montagna\n";

fn lyricsync(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lyricsync").unwrap();
    cmd.arg("--dir").arg(dir).env_remove("RUST_LOG");
    cmd
}

fn song_dir(srt: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mazzolin.srt"), srt).unwrap();
    dir
}

#[test]
fn missing_subtitles_exit_with_failure() {
    let dir = tempfile::tempdir().unwrap();

    let output = lyricsync(dir.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("mazzolin.srt' not found."), "{}", stderr);
}

#[test]
fn unparsable_subtitles_exit_with_failure() {
    let dir = song_dir("this is not\nan srt file\n");

    let output = lyricsync(dir.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No valid subtitle entries found in the SRT file."),
        "{}",
        stderr
    );
}

#[test]
fn plays_lyrics_without_audio() {
    let dir = song_dir(LYRICS);

    let output = lyricsync(dir.path())
        .args(["--no-audio", "--char-delay", "0", "--poll-interval", "1"])
        .write_stdin("\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Loaded 2 lines."), "{}", stdout);
    let first = stdout.rfind("Quel mazzolin di fiori").unwrap();
    let second = stdout.find("che vien dalla montagna").unwrap();
    assert!(first < second);
    assert!(stdout.contains("Fine!"), "{}", stdout);
}

#[test]
fn missing_audio_still_plays_lyrics() {
    let dir = song_dir(LYRICS);

    let output = lyricsync(dir.path())
        .args(["--char-delay", "0", "--subtitles", "mazzolin.srt", "--audio", "gone.mp3"])
        .write_stdin("\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gone.mp3' not found."), "{}", stdout);
    assert!(stdout.contains("che vien dalla montagna"), "{}", stdout);
}

#[test]
fn no_player_prompts_for_manual_start() {
    let dir = song_dir(LYRICS);
    fs::write(dir.path().join("mazzolin.mp3"), b"").unwrap();

    let output = lyricsync(dir.path())
        .current_dir(dir.path())
        .env("PATH", "")
        .args(["--char-delay", "0"])
        .write_stdin("\n\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Could not find a command-line audio player"), "{}", stdout);
    let prompt = stdout.find("Start the song manually").unwrap();
    let lyric = stdout.find("che vien dalla montagna").unwrap();
    assert!(prompt < lyric);
    assert!(stdout.contains("Fine!"), "{}", stdout);
}
