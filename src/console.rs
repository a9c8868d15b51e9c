//! Line-oriented console front end.
//!
//! The loop owns the [`AppState`] (and with it the audio output), so every
//! state change happens here. Synthesis is the one slow call: it runs on a
//! spawned task and its result comes back over a channel, keeping pause and
//! stop responsive while a request is in flight.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::commands::{settings, tts};
use crate::engine::{AudioBytes, Voice};
use crate::error;
use crate::state::AppState;

type SynthesisResult = error::Result<AudioBytes>;

const HELP: &str = "\
commands:
  text <words>      set the text to read
  say <words>       set the text and play it
  play              read the text (resumes when paused)
  pause             pause / resume
  resume            resume a paused clip
  stop              stop playback
  save [path]       save the last clip (default tts_audio.mp3)
  voice [name]      show or set the voice
  voices            list voices
  speed <x>         set speed (0.25 - 4.0)
  model <id>        set the speech model
  key <api-key>     set the OpenAI API key for this session
  status            show current state
  help              show this help
  quit              exit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Text(String),
    Say(String),
    Play,
    Pause,
    Resume,
    Stop,
    Save(Option<PathBuf>),
    Voice(Option<String>),
    Voices,
    Speed(String),
    Model(String),
    Key(String),
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn parse_command(line: &str) -> ConsoleCommand {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleCommand::Empty;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let optional = |s: &str| (!s.is_empty()).then(|| s.to_string());

    match word.to_ascii_lowercase().as_str() {
        "text" => ConsoleCommand::Text(rest.to_string()),
        "say" => ConsoleCommand::Say(rest.to_string()),
        "play" => ConsoleCommand::Play,
        "pause" => ConsoleCommand::Pause,
        "resume" => ConsoleCommand::Resume,
        "stop" => ConsoleCommand::Stop,
        "save" | "download" => ConsoleCommand::Save(optional(rest).map(PathBuf::from)),
        "voice" => ConsoleCommand::Voice(optional(rest)),
        "voices" => ConsoleCommand::Voices,
        "speed" => ConsoleCommand::Speed(rest.to_string()),
        "model" => ConsoleCommand::Model(rest.to_string()),
        "key" => ConsoleCommand::Key(rest.to_string()),
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => ConsoleCommand::Unknown(other.to_string()),
    }
}

/// Apply one command. Failures are written to `out` and never end the loop.
pub fn handle_command(
    state: &mut AppState,
    command: ConsoleCommand,
    out: &mut dyn Write,
    results: &UnboundedSender<SynthesisResult>,
) -> std::io::Result<Flow> {
    match command {
        ConsoleCommand::Empty => {}
        ConsoleCommand::Text(text) => {
            state.text = text;
            writeln!(out, "text set ({} chars)", state.text.chars().count())?;
        }
        ConsoleCommand::Say(text) => {
            state.text = text;
            speak(state, out, results)?;
        }
        ConsoleCommand::Play => speak(state, out, results)?,
        ConsoleCommand::Pause => {
            let now = tts::pause_speaking(state);
            writeln!(out, "{:?}", now)?;
        }
        ConsoleCommand::Resume => {
            let now = tts::resume_speaking(state);
            writeln!(out, "{:?}", now)?;
        }
        ConsoleCommand::Stop => {
            let now = tts::stop_speaking(state);
            writeln!(out, "{:?}", now)?;
        }
        ConsoleCommand::Save(dest) => match tts::save_audio(state, dest.as_deref()) {
            Ok(path) => writeln!(out, "saved to {}", path.display())?,
            Err(e) => writeln!(out, "error: {}", e)?,
        },
        ConsoleCommand::Voice(None) => writeln!(out, "voice: {}", state.settings.tts.voice)?,
        ConsoleCommand::Voice(Some(name)) => match settings::set_voice(state, &name) {
            Ok(voice) => writeln!(out, "voice: {}", voice)?,
            Err(e) => writeln!(out, "error: {}", e)?,
        },
        ConsoleCommand::Voices => {
            let names: Vec<&str> = Voice::ALL.iter().map(Voice::as_str).collect();
            writeln!(out, "{}", names.join(", "))?;
        }
        ConsoleCommand::Speed(value) => match settings::set_speed(state, &value) {
            Ok(speed) => writeln!(out, "speed: {}", speed)?,
            Err(e) => writeln!(out, "error: {}", e)?,
        },
        ConsoleCommand::Model(model) => {
            let model = settings::set_model(state, &model);
            writeln!(out, "model: {}", model)?;
        }
        ConsoleCommand::Key(key) => {
            settings::set_credential(state, &key);
            if state.credential.is_empty() {
                writeln!(out, "api key cleared")?;
            } else {
                writeln!(out, "api key set")?;
            }
        }
        ConsoleCommand::Status => {
            let report = tts::get_status(state);
            writeln!(
                out,
                "{:?} / {:?}  voice={} model={} speed={}  key={}  text={} chars  clip={}",
                report.status,
                report.playback,
                report.voice,
                report.model,
                report.speed,
                if report.has_credential { "set" } else { "missing" },
                report.text_chars,
                report
                    .clip_bytes
                    .map(|b| format!("{} bytes", b))
                    .unwrap_or_else(|| "none".to_string()),
            )?;
        }
        ConsoleCommand::Help => writeln!(out, "{}", HELP)?,
        ConsoleCommand::Quit => return Ok(Flow::Quit),
        ConsoleCommand::Unknown(word) => {
            writeln!(out, "unknown command '{}'", word)?;
            writeln!(out, "{}", HELP)?;
        }
    }
    Ok(Flow::Continue)
}

fn speak(
    state: &mut AppState,
    out: &mut dyn Write,
    results: &UnboundedSender<SynthesisResult>,
) -> std::io::Result<()> {
    match tts::begin_speak(state) {
        Ok(tts::SpeakAction::Resumed) => writeln!(out, "resumed"),
        Ok(tts::SpeakAction::AlreadyPlaying) => writeln!(out, "already playing"),
        Ok(tts::SpeakAction::Synthesize(request)) => {
            let client = state.synthesis.clone();
            let results = results.clone();
            tokio::spawn(async move {
                let result = client.synthesize(&request).await;
                let _ = results.send(result);
            });
            writeln!(out, "synthesizing...")
        }
        Err(e) => writeln!(out, "error: {}", e),
    }
}

/// Run until `quit` or end of input
pub async fn run_console(mut state: AppState) -> Result<()> {
    let (results_tx, mut results_rx) = mpsc::unbounded_channel::<SynthesisResult>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    writeln!(stdout, "{}", HELP)?;
    prompt(&mut stdout)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                let flow = handle_command(&mut state, parse_command(&line), &mut stdout, &results_tx)?;
                if flow == Flow::Quit {
                    break;
                }
                prompt(&mut stdout)?;
            }
            Some(result) = results_rx.recv() => {
                match tts::finish_speak(&mut state, result) {
                    Ok(now) => writeln!(stdout, "\n{:?}", now)?,
                    Err(e) => writeln!(stdout, "\nerror: {}", e)?,
                }
                prompt(&mut stdout)?;
            }
        }
    }

    tts::stop_speaking(&mut state);
    tracing::info!("Console closed");
    Ok(())
}

fn prompt(out: &mut dyn Write) -> std::io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}
