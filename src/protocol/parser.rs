//! Command parser for the line protocol.
//!
//! Turns one line of input into a [`Command`] the engine session can
//! dispatch on. Unknown or malformed lines yield `None` after a warning.

use log::warn;

use crate::board::Power;

/// Arguments of `go [<power>] [tier <name>] [movetime <ms>]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoParams {
    pub power: Option<Power>,
    pub tier: Option<String>,
    pub movetime: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Handshake; the engine answers with its id and `duiok`.
    Dui,
    /// Ping; the engine answers `readyok`.
    IsReady,
    SetOption { name: String, value: Option<String> },
    NewGame,
    /// `position startpos` or `position <dfen>`.
    Position { dfen: String },
    SetPower { power: Power },
    Go(GoParams),
    /// `press <sender> <canned sentence>`.
    Press { from: Power, text: String },
    Quit,
}

/// Parses a single input line.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let (&head, args) = tokens.split_first()?;

    match head {
        "dui" => Some(Command::Dui),
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "newgame" => Some(Command::NewGame),
        "setoption" => parse_setoption(args),
        "position" => parse_position(args),
        "setpower" => parse_setpower(args),
        "go" => parse_go(args),
        "press" => parse_press(args),
        other => {
            warn!("unknown command: {other}");
            None
        }
    }
}

/// `setoption name <id> [value <x>]`; both parts may span several words.
fn parse_setoption(args: &[&str]) -> Option<Command> {
    let Some((&"name", rest)) = args.split_first() else {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    };
    let (name_parts, value) = match rest.iter().position(|&t| t == "value") {
        Some(vi) => {
            let value = &rest[vi + 1..];
            (&rest[..vi], (!value.is_empty()).then(|| value.join(" ")))
        }
        None => (rest, None),
    };
    if name_parts.is_empty() {
        warn!("malformed setoption: empty name");
        return None;
    }
    Some(Command::SetOption { name: name_parts.join(" "), value })
}

fn parse_position(args: &[&str]) -> Option<Command> {
    match args {
        [dfen] => Some(Command::Position { dfen: dfen.to_string() }),
        _ => {
            warn!("malformed position: expected 'position <dfen>' or 'position startpos'");
            None
        }
    }
}

fn parse_setpower(args: &[&str]) -> Option<Command> {
    let Some(&name) = args.first() else {
        warn!("malformed setpower: expected 'setpower <power>'");
        return None;
    };
    match Power::from_name(name) {
        Some(power) => Some(Command::SetPower { power }),
        None => {
            warn!("unknown power: '{name}'");
            None
        }
    }
}

fn parse_go(args: &[&str]) -> Option<Command> {
    let mut params = GoParams::default();
    let mut it = args.iter();
    while let Some(&token) = it.next() {
        match token {
            "movetime" => match it.next().map(|v| v.parse::<u64>()) {
                Some(Ok(ms)) => params.movetime = Some(ms),
                _ => warn!("go: movetime needs a millisecond count"),
            },
            "tier" => match it.next() {
                Some(name) => params.tier = Some(name.to_string()),
                None => warn!("go: tier needs a name"),
            },
            other => match Power::from_name(other) {
                Some(p) if params.power.is_none() => params.power = Some(p),
                _ => warn!("unknown go parameter: '{other}'"),
            },
        }
    }
    Some(Command::Go(params))
}

fn parse_press(args: &[&str]) -> Option<Command> {
    let [from, rest @ ..] = args else {
        warn!("malformed press: expected 'press <power> <message>'");
        return None;
    };
    let Some(from) = Power::from_name(from) else {
        warn!("press: unknown sender '{from}'");
        return None;
    };
    if rest.is_empty() {
        warn!("press: empty message");
        return None;
    }
    Some(Command::Press { from, text: rest.join(" ") })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_commands() {
        assert_eq!(parse_command("dui"), Some(Command::Dui));
        assert_eq!(parse_command("  isready  "), Some(Command::IsReady));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("newgame"), Some(Command::NewGame));
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command(" \t "), None);
        assert_eq!(parse_command("foobar"), None);
    }

    #[test]
    fn setoption() {
        assert_eq!(
            parse_command("setoption name Tier value posture"),
            Some(Command::SetOption { name: "Tier".into(), value: Some("posture".into()) })
        );
        assert_eq!(
            parse_command("setoption name Config value /etc/bot config.json"),
            Some(Command::SetOption {
                name: "Config".into(),
                value: Some("/etc/bot config.json".into())
            })
        );
        assert_eq!(
            parse_command("setoption name Reset"),
            Some(Command::SetOption { name: "Reset".into(), value: None })
        );
        assert_eq!(parse_command("setoption"), None);
        assert_eq!(parse_command("setoption foo"), None);
        assert_eq!(parse_command("setoption name value 3"), None);
    }

    #[test]
    fn position() {
        let dfen = "1901sm/Aavie,Aabud,Aftri/-/-";
        let position = |dfen: &str| Some(Command::Position { dfen: dfen.into() });
        assert_eq!(parse_command(&format!("position {dfen}")), position(dfen));
        assert_eq!(parse_command("position startpos"), position("startpos"));
        assert_eq!(parse_command("position"), None);
    }

    #[test]
    fn setpower() {
        for power in crate::board::ALL_POWERS {
            let line = format!("setpower {power}");
            assert_eq!(parse_command(&line), Some(Command::SetPower { power }));
        }
        let turkey = Some(Command::SetPower { power: Power::Turkey });
        assert_eq!(parse_command("setpower Turkey"), turkey);
        assert_eq!(parse_command("setpower narnia"), None);
        assert_eq!(parse_command("setpower"), None);
    }

    #[test]
    fn go() {
        assert_eq!(parse_command("go"), Some(Command::Go(GoParams::default())));
        assert_eq!(
            parse_command("go france tier hard movetime 250"),
            Some(Command::Go(GoParams {
                power: Some(Power::France),
                tier: Some("hard".into()),
                movetime: Some(250)
            }))
        );
        assert_eq!(
            parse_command("go movetime soon"),
            Some(Command::Go(GoParams::default()))
        );
    }

    #[test]
    fn press() {
        assert_eq!(
            parse_command("press germany Please don't attack mun, I won't attack yours"),
            Some(Command::Press {
                from: Power::Germany,
                text: "Please don't attack mun, I won't attack yours".into()
            })
        );
        assert_eq!(parse_command("press"), None);
        assert_eq!(parse_command("press germany"), None);
        assert_eq!(parse_command("press narnia Agreed"), None);
    }
}
