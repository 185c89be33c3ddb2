use std::io::{self, BufRead, Write};
use std::path::Path;

use trackball_scroll::logging;
use trackball_scroll::scroll::ScrollService;
use trackball_scroll::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Pause,
    Resume,
    ToggleX1,
    ToggleX2,
    ToggleAxis,
    ToggleMiddle,
    ToggleReverse,
    Status,
    Help,
    Quit,
}

impl Command {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "pause" | "off" => Some(Command::Pause),
            "resume" | "on" => Some(Command::Resume),
            "x1" => Some(Command::ToggleX1),
            "x2" => Some(Command::ToggleX2),
            "axis" => Some(Command::ToggleAxis),
            "middle" => Some(Command::ToggleMiddle),
            "reverse" => Some(Command::ToggleReverse),
            "status" => Some(Command::Status),
            "help" | "?" => Some(Command::Help),
            "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "commands: pause, resume, x1, x2, axis, middle, reverse, status, quit";

fn print_status(service: &ScrollService) {
    let s = service.settings();
    println!(
        "hook: {} | x1: {} | x2: {} | prefer axis: {} | middle click: {} | reverse vertical: {}",
        if service.is_running() { "on" } else { "off" },
        s.use_x1,
        s.use_x2,
        s.prefer_axis,
        s.emulate_middle_button,
        s.reverse_vertical_scroll,
    );
    if let Some(stats) = service.stats() {
        println!(
            "injected {} records in {} batches ({} failed)",
            stats.records(),
            stats.batches(),
            stats.failures()
        );
    }
}

fn apply(service: &mut ScrollService, settings: Settings, path: &Path) -> anyhow::Result<()> {
    if let Err(err) = settings.save(path) {
        tracing::warn!(?err, path = %path.display(), "failed to save settings");
    }
    service.update_settings(settings)
}

fn main() -> anyhow::Result<()> {
    let path = Settings::default_path();
    let settings = Settings::load(&path)?;
    logging::init(settings.debug_logging, settings.log_file.clone());
    tracing::info!(path = %path.display(), "settings loaded");

    let mut service = ScrollService::default();
    service.update_settings(settings)?;
    if let Err(err) = service.start() {
        eprintln!("scrolling is disabled: {err:#}");
    }
    println!("{HELP}");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = Command::parse(&line) else {
            println!("unknown command '{}'; {HELP}", line.trim());
            continue;
        };

        let mut next = service.settings().clone();
        match command {
            Command::Pause => service.stop(),
            Command::Resume => {
                if let Err(err) = service.start() {
                    eprintln!("scrolling is disabled: {err:#}");
                }
            }
            Command::ToggleX1 => {
                next.toggle_use_x1();
                apply(&mut service, next, &path)?;
            }
            Command::ToggleX2 => {
                next.toggle_use_x2();
                apply(&mut service, next, &path)?;
            }
            Command::ToggleAxis => {
                next.prefer_axis = !next.prefer_axis;
                apply(&mut service, next, &path)?;
            }
            Command::ToggleMiddle => {
                next.emulate_middle_button = !next.emulate_middle_button;
                apply(&mut service, next, &path)?;
            }
            Command::ToggleReverse => {
                next.reverse_vertical_scroll = !next.reverse_vertical_scroll;
                apply(&mut service, next, &path)?;
            }
            Command::Status => print_status(&service),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
        if command != Command::Status && command != Command::Help && command != Command::Quit {
            print_status(&service);
        }
        let _ = io::stdout().flush();
    }

    service.shutdown();
    tracing::info!("exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Command;

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!(Command::parse(" Pause "), Some(Command::Pause));
        assert_eq!(Command::parse("X2"), Some(Command::ToggleX2));
        assert_eq!(Command::parse("scroll"), None);
    }
}
