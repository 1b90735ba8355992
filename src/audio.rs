use crate::errors::{ChatterError, ChatterResult};
use log::{debug, warn};
use rodio::{OutputStream, OutputStreamHandle};
use std::{fs::File, io::BufReader, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Send,
    Receive,
}

/// Fire-and-forget playback of the chat sound cues.
pub trait AudioPlayer {
    fn play(&self, cue: SoundCue);
}

/// Plays cues from files on the default output device.
pub struct RodioPlayer {
    // Playback stops when the stream is dropped.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    send_audio: PathBuf,
    receive_audio: PathBuf,
}

impl RodioPlayer {
    pub fn try_new(send_audio: PathBuf, receive_audio: PathBuf) -> ChatterResult<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| ChatterError::audio_error(format!("No audio output: {}", e)))?;

        Ok(Self {
            _stream: stream,
            handle,
            send_audio,
            receive_audio,
        })
    }

    fn path_for(&self, cue: SoundCue) -> &PathBuf {
        match cue {
            SoundCue::Send => &self.send_audio,
            SoundCue::Receive => &self.receive_audio,
        }
    }

    fn try_play(&self, cue: SoundCue) -> ChatterResult<()> {
        let path = self.path_for(cue);
        let file = File::open(path)?;
        let sink = self
            .handle
            .play_once(BufReader::new(file))
            .map_err(|e| ChatterError::audio_error(format!("{}: {}", path.display(), e)))?;
        sink.detach();
        Ok(())
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&self, cue: SoundCue) {
        if let Err(e) = self.try_play(cue) {
            warn!("Failed to play {:?} cue: {}", cue, e);
        }
    }
}

/// Used when no output device is available.
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn play(&self, cue: SoundCue) {
        debug!("Audio disabled, skipping {:?} cue", cue);
    }
}

/// Opens the default device, falling back to silence.
pub fn default_player(send_audio: PathBuf, receive_audio: PathBuf) -> Box<dyn AudioPlayer> {
    match RodioPlayer::try_new(send_audio, receive_audio) {
        Ok(player) => Box::new(player),
        Err(e) => {
            warn!("{}; sound cues disabled", e);
            Box::new(SilentPlayer)
        }
    }
}
