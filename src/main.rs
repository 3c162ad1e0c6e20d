//! Stratagem: a Diplomacy bot speaking a line protocol on stdin/stdout.
//!
//! Logging goes to stderr and is configured with `RUST_LOG`.

use std::io::{self, BufRead, Write};

use log::{error, warn};
use stratagem::engine::Engine;
use stratagem::protocol::parser::{parse_command, Command};

fn run<W: Write>(input: impl BufRead, out: &mut W) -> io::Result<()> {
    let mut engine = Engine::new();

    for line in input.lines() {
        let Some(cmd) = parse_command(&line?) else { continue };

        match cmd {
            Command::Dui => engine.handle_dui(out)?,
            Command::IsReady => engine.handle_isready(out)?,
            Command::SetOption { name, value } => {
                if let Err(e) = engine.set_option(name, value) {
                    warn!("setoption: {e}");
                }
            }
            Command::NewGame => engine.new_game(),
            Command::Position { dfen } => {
                if let Err(e) = engine.set_position(&dfen) {
                    warn!("position: {e}");
                }
            }
            Command::SetPower { power } => engine.set_power(power),
            Command::Go(params) => engine.handle_go(&params, out)?,
            Command::Press { from, text } => {
                if let Err(e) = engine.receive_press(from, &text) {
                    warn!("press: {e}");
                }
            }
            Command::Quit => break,
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let stdin = io::stdin();
    let mut out = io::BufWriter::new(io::stdout().lock());
    if let Err(e) = run(stdin.lock(), &mut out) {
        error!("i/o failure: {e}");
        std::process::exit(1);
    }
}
