//! Rodio-based clip player
//!
//! rodio's OutputStream is not Send, so playback lives on a dedicated
//! thread that owns the stream and sink. The async side talks to it over
//! a command channel. Starting a new clip implicitly stops the previous
//! one, and completion releases the output device.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::{oneshot, watch};

use crate::application::ports::{ClipPlayer, PlaybackError};

/// How often the playback thread checks for clip completion
const POLL_INTERVAL: Duration = Duration::from_millis(100);

enum PlayerCommand {
    Play(PathBuf, oneshot::Sender<Result<(), PlaybackError>>),
    Stop,
}

/// Clip player backed by the default rodio output device
pub struct RodioClipPlayer {
    commands: mpsc::Sender<PlayerCommand>,
    playing_rx: watch::Receiver<bool>,
}

impl RodioClipPlayer {
    pub fn new() -> Self {
        let (commands, command_rx) = mpsc::channel();
        let (playing_tx, playing_rx) = watch::channel(false);

        std::thread::spawn(move || playback_loop(command_rx, playing_tx));

        Self {
            commands,
            playing_rx,
        }
    }
}

impl Default for RodioClipPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipPlayer for RodioClipPlayer {
    async fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(PlayerCommand::Play(path.to_path_buf(), reply_tx))
            .map_err(|_| PlaybackError::PlaybackFailed("Playback thread gone".into()))?;
        reply_rx
            .await
            .map_err(|_| PlaybackError::PlaybackFailed("Playback thread gone".into()))?
    }

    async fn stop(&self) {
        let _ = self.commands.send(PlayerCommand::Stop);
    }

    fn playing(&self) -> watch::Receiver<bool> {
        self.playing_rx.clone()
    }
}

/// Open, decode and start a clip on a fresh output stream.
/// The stream handle must outlive the sink, so both are returned together.
fn start_clip(path: &Path) -> Result<(OutputStream, Sink), PlaybackError> {
    let file = File::open(path).map_err(|e| PlaybackError::OpenFailed(e.to_string()))?;
    let source =
        Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::DecodeFailed(e.to_string()))?;

    let (stream, handle) =
        OutputStream::try_default().map_err(|e| PlaybackError::DeviceNotAvailable(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| PlaybackError::PlaybackFailed(e.to_string()))?;

    sink.append(source);
    Ok((stream, sink))
}

fn playback_loop(commands: mpsc::Receiver<PlayerCommand>, playing_tx: watch::Sender<bool>) {
    // Holding the OutputStream keeps the device open for the sink
    let mut current: Option<(OutputStream, Sink)> = None;

    loop {
        match commands.recv_timeout(POLL_INTERVAL) {
            Ok(PlayerCommand::Play(path, reply)) => {
                // Implicit stop of whatever was playing
                current = None;

                match start_clip(&path) {
                    Ok(stream_and_sink) => {
                        current = Some(stream_and_sink);
                        playing_tx.send_replace(true);
                        let _ = reply.send(Ok(()));
                    }
                    Err(e) => {
                        playing_tx.send_replace(false);
                        let _ = reply.send(Err(e));
                    }
                }
            }
            Ok(PlayerCommand::Stop) => {
                current = None;
                playing_tx.send_replace(false);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Clip ran out on its own; release the device
                if current.as_ref().is_some_and(|(_, sink)| sink.empty()) {
                    current = None;
                    playing_tx.send_replace(false);
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_idle() {
        let player = RodioClipPlayer::new();
        assert!(!*player.playing().borrow());
    }

    #[tokio::test]
    async fn missing_file_is_open_failure() {
        let player = RodioClipPlayer::new();
        let result = player.play(Path::new("/nonexistent/clip.flac")).await;
        assert!(matches!(result, Err(PlaybackError::OpenFailed(_))));
        assert!(!*player.playing().borrow());
    }

    #[tokio::test]
    async fn undecodable_file_is_decode_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("garbage.flac");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let player = RodioClipPlayer::new();
        let result = player.play(&path).await;
        assert!(matches!(result, Err(PlaybackError::DecodeFailed(_))));
    }

    #[tokio::test]
    async fn stop_while_idle_is_harmless() {
        let player = RodioClipPlayer::new();
        player.stop().await;
        assert!(!*player.playing().borrow());
    }
}
