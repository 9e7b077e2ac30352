//! Operator command loop
//!
//! One command per line, input trimmed:
//!
//! | Input        | Effect                                   |
//! |--------------|------------------------------------------|
//! | `h`, `l`     | print help                               |
//! | `r`          | raise the active source's offset         |
//! | `m`          | mitigate (lower) the active source's offset |
//! | `s`          | switch to the next source                |
//! | `s <source>` | switch to a named source                 |
//! | `q`          | quit                                     |
//!
//! Anything else prints the unknown-command hint and the loop goes on.

use std::io;

use thermoguard_connectors::ConsoleSink;
use thermoguard_core::Station;

pub const HELP: &str = "\
Commands:
  h, l        show this help
  r           raise the active source's offset
  m           mitigate (lower) the active source's offset
  s           switch to the next source
  s <source>  switch to <source>
  q           quit";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Type 'h' for help.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Raise,
    Mitigate,
    Cycle,
    Select(String),
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, arg) = match line.split_once(char::is_whitespace) {
            Some((head, arg)) => (head, Some(arg.trim())),
            None => (line, None),
        };

        match (head, arg) {
            ("", None) => Command::Empty,
            ("h" | "l", None) => Command::Help,
            ("r", None) => Command::Raise,
            ("m", None) => Command::Mitigate,
            ("s", None) => Command::Cycle,
            ("s", Some(source)) => Command::Select(source.to_owned()),
            ("q", None) => Command::Quit,
            _ => Command::Unknown(line.to_owned()),
        }
    }
}

/// Whether the loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn banner(station: &Station) -> String {
    format!(
        "ThermoGuard station '{}' monitoring {}\nActive source: {}\nType 'h' for help.",
        station.name(),
        station.source_ids().join(", "),
        station.active_source()
    )
}

/// Apply one command to the station, reporting back through the console
pub fn execute(command: &Command, station: &Station, console: &ConsoleSink) -> io::Result<Flow> {
    match command {
        Command::Empty => {}
        Command::Help => console.say(HELP)?,
        Command::Raise => {
            station.increase_active();
            report_offset(station, console)?;
        }
        Command::Mitigate => {
            station.decrease_active();
            report_offset(station, console)?;
        }
        Command::Cycle => {
            let source = station.cycle_active_source();
            console.say(&format!("Active source: {source}"))?;
        }
        Command::Select(source) => match station.select_active_source(source) {
            Ok(()) => console.say(&format!("Active source: {source}"))?,
            Err(err) => console.say(&err.to_string())?,
        },
        Command::Quit => return Ok(Flow::Quit),
        Command::Unknown(input) => {
            log::debug!("unknown command '{}'", input);
            console.say(UNKNOWN_COMMAND)?;
        }
    }
    Ok(Flow::Continue)
}

fn report_offset(station: &Station, console: &ConsoleSink) -> io::Result<()> {
    let source = station.active_source();
    let Ok(channel) = station.channel(source) else {
        return Ok(());
    };
    console.say(&format!(
        "Offset of {}: {}",
        source,
        console.format_value(channel.quantity(), channel.offset())
    ))
}
