//! Operator command line
//!
//! One command per input line. Parsing is pure; execution drives the
//! [`SessionController`] and returns the text to print.

use opcon_common::models::MediaKind;
use std::str::FromStr;

use crate::error::Error;
use crate::presentation::{render_history, render_leaderboard, render_library, render_stats};
use crate::session::controller::SKIP_SECONDS;
use crate::session::SessionController;

pub const HELP: &str = "\
Commands:
  register <name...> <dni>   set the active operator
  library [audio|video]      list the catalog
  add <audio|video> <seconds> <url> <title...> [--genre <genre>]
                             add a catalog entry
  load <id>                  load an item (starts a session when an operator is set)
  play | pause | stop
  back | forward             skip 10 seconds
  seek <percent>             jump to a percentage of the duration
  speed <rate>               playback rate, 0 < rate <= 16
  volume <0..1>
  stats | leaders | history  refresh a projection
  seed                       generate demo data on the service
  status                     show the current context
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register { name: String, dni: String },
    Library(Option<MediaKind>),
    Add {
        kind: MediaKind,
        duration_seconds: i64,
        source_url: String,
        title: String,
        genre: Option<String>,
    },
    Load(i64),
    Play,
    Pause,
    Stop,
    Back,
    Forward,
    Seek(f64),
    Speed(f64),
    Volume(f64),
    Stats,
    Leaders,
    History,
    Seed,
    Status,
    Help,
    Quit,
}

const ADD_USAGE: &str = "add <audio|video> <seconds> <url> <title...> [--genre <genre>]";

fn parse_add(args: &[&str]) -> Result<Command, Error> {
    let usage = || Error::Validation(format!("Usage: {}", ADD_USAGE));

    let (args, genre) = match args.iter().position(|&w| w == "--genre") {
        Some(at) if at + 1 < args.len() => (&args[..at], Some(args[at + 1..].join(" "))),
        Some(_) => return Err(usage()),
        None => (args, None),
    };
    let [kind, duration, url, title @ ..] = args else {
        return Err(usage());
    };
    if title.is_empty() {
        return Err(usage());
    }

    Ok(Command::Add {
        kind: kind.parse()?,
        duration_seconds: number(Some(*duration), ADD_USAGE)?,
        source_url: url.to_string(),
        title: title.join(" "),
        genre,
    })
}

fn number<T: FromStr>(word: Option<&str>, usage: &str) -> Result<T, Error> {
    word.and_then(|w| w.parse().ok())
        .ok_or_else(|| Error::Validation(format!("Usage: {}", usage)))
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            return Err(Error::Validation("Empty command.".to_string()));
        };
        let first = args.first().copied();

        let command = match verb.to_ascii_lowercase().as_str() {
            "register" => match args.split_last() {
                Some((dni, name)) if !name.is_empty() => Command::Register {
                    name: name.join(" "),
                    dni: dni.to_string(),
                },
                _ => {
                    return Err(Error::Validation(
                        "Usage: register <name...> <dni>".to_string(),
                    ))
                }
            },
            "library" | "ls" => Command::Library(first.and_then(|k| k.parse().ok())),
            "add" => parse_add(args)?,
            "load" => Command::Load(number(first, "load <id>")?),
            "play" => Command::Play,
            "pause" => Command::Pause,
            "stop" => Command::Stop,
            "back" => Command::Back,
            "forward" | "fwd" => Command::Forward,
            "seek" => Command::Seek(number(first, "seek <percent>")?),
            "speed" => Command::Speed(number(first, "speed <rate>")?),
            "volume" | "vol" => Command::Volume(number(first, "volume <0..1>")?),
            "stats" => Command::Stats,
            "leaders" | "leaderboard" => Command::Leaders,
            "history" => Command::History,
            "seed" => Command::Seed,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(Error::Validation(format!(
                    "Unknown command: {} (try `help`)",
                    other
                )))
            }
        };
        Ok(command)
    }
}

fn transport_report(controller: &SessionController) -> String {
    format!("{}\n{}", controller.status(), controller.progress().render())
}

fn error_line(e: &Error) -> String {
    format!("[error] {}", e)
}

/// Run a command and return what to print
pub async fn execute(controller: &mut SessionController, command: Command) -> String {
    match command {
        Command::Register { name, dni } => match controller.register_operator(&name, &dni).await {
            Ok(_) => format!(
                "{}\n{}",
                controller.status(),
                render_history(controller.dashboard().history.as_deref())
            ),
            Err(_) => controller.status().to_string(),
        },
        Command::Library(kind) => match controller.refresh_library(kind).await {
            Ok(()) => render_library(controller.dashboard().library.as_deref().unwrap_or(&[])),
            Err(e) => error_line(&e),
        },
        Command::Add {
            kind,
            duration_seconds,
            source_url,
            title,
            genre,
        } => {
            let _ = controller
                .add_media(&title, kind, &source_url, duration_seconds, genre.as_deref())
                .await;
            controller.status().to_string()
        }
        Command::Load(media_id) => {
            let _ = controller.load_media_by_id(media_id).await;
            transport_report(controller)
        }
        Command::Play => {
            let _ = controller.play().await;
            transport_report(controller)
        }
        Command::Pause => {
            controller.pause();
            transport_report(controller)
        }
        Command::Stop => {
            controller.stop().await;
            transport_report(controller)
        }
        Command::Back => {
            let _ = controller.seek_by(-SKIP_SECONDS);
            transport_report(controller)
        }
        Command::Forward => {
            let _ = controller.seek_by(SKIP_SECONDS);
            transport_report(controller)
        }
        Command::Seek(percent) => {
            let _ = controller.seek_to_percent(percent);
            transport_report(controller)
        }
        Command::Speed(rate) => {
            let _ = controller.set_speed(rate);
            controller.status().to_string()
        }
        Command::Volume(volume) => {
            let _ = controller.set_volume(volume);
            controller.status().to_string()
        }
        Command::Stats => match controller.refresh_stats().await {
            Ok(()) => render_stats(controller.dashboard().stats.as_ref()),
            Err(e) => format!("{}\n{}", render_stats(None), error_line(&e)),
        },
        Command::Leaders => match controller.refresh_leaderboard().await {
            Ok(()) => render_leaderboard(controller.dashboard().leaders.as_deref().unwrap_or(&[])),
            Err(e) => error_line(&e),
        },
        Command::History => match controller.refresh_history().await {
            Ok(()) => render_history(controller.dashboard().history.as_deref()),
            Err(e) => error_line(&e),
        },
        Command::Seed => {
            let _ = controller.seed_demo().await;
            controller.status().to_string()
        }
        Command::Status => describe(controller),
        Command::Help => HELP.to_string(),
        Command::Quit => "Bye.".to_string(),
    }
}

fn describe(controller: &SessionController) -> String {
    let context = controller.context();
    let operator = context
        .operator()
        .map(|o| format!("{} ({})", o.name, o.dni))
        .unwrap_or_else(|| "none".to_string());
    let media = context
        .media()
        .map(|m| format!("#{} {} [{}]", m.id, m.title, m.kind))
        .unwrap_or_else(|| "none".to_string());
    let session = match context.active_session() {
        Some(id) => format!("#{}", id),
        None => controller.session_state().name().to_string(),
    };
    let (delivered, failed) = controller.event_counts();

    format!(
        "{}\nOperator: {}\nMedia:    {}\nSession:  {}\nEvents:   {} sent, {} dropped\n{}",
        controller.status(),
        operator,
        media,
        session,
        delivered,
        failed,
        controller.progress().render()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_splits_name_and_dni() {
        let command: Command = "register Ana Maria Gomez 12345678".parse().unwrap();
        assert_eq!(
            command,
            Command::Register {
                name: "Ana Maria Gomez".to_string(),
                dni: "12345678".to_string()
            }
        );
        assert!("register 12345678".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!("load 3".parse::<Command>().unwrap(), Command::Load(3));
        assert_eq!("SEEK 50".parse::<Command>().unwrap(), Command::Seek(50.0));
        assert_eq!(
            "library audio".parse::<Command>().unwrap(),
            Command::Library(Some(MediaKind::Audio))
        );
        // Unknown kind lists everything
        assert_eq!("library podcast".parse::<Command>().unwrap(), Command::Library(None));
        assert!("load x".parse::<Command>().is_err());
        assert!("speed".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_add() {
        let command: Command = "add video 95 https://cdn.example/intro.mp4 Station intro --genre Station ID"
            .parse()
            .unwrap();
        assert_eq!(
            command,
            Command::Add {
                kind: MediaKind::Video,
                duration_seconds: 95,
                source_url: "https://cdn.example/intro.mp4".to_string(),
                title: "Station intro".to_string(),
                genre: Some("Station ID".to_string()),
            }
        );

        let command: Command = "add AUDIO 0 https://cdn.example/a.mp3 Jingle".parse().unwrap();
        assert!(matches!(command, Command::Add { genre: None, kind: MediaKind::Audio, .. }));

        assert!("add tape 5 https://x Title".parse::<Command>().is_err());
        assert!("add audio five https://x Title".parse::<Command>().is_err());
        assert!("add audio 5 https://x".parse::<Command>().is_err());
        assert!("add audio 5 https://x Title --genre".parse::<Command>().is_err());
    }

    #[test]
    fn test_unknown_and_empty() {
        let err = "rewind".parse::<Command>().unwrap_err();
        assert!(err.to_string().contains("Unknown command: rewind"));
        assert!("   ".parse::<Command>().is_err());
    }
}
