//! Integration tests for the stratagem binary.
//!
//! Spawns the engine, feeds it a session over stdin and checks what comes
//! back on stdout.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_stratagem");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start stratagem");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

fn best_orders(lines: &[String]) -> Vec<&str> {
    lines.iter().filter_map(|l| l.strip_prefix("bestorders ")).collect()
}

/// Retreat phase with an Austrian army dislodged from Serbia by Bulgaria.
const RETREAT_DFEN: &str = concat!(
    "1902fr/Aabud,Aavie,Aftri,Aagre,Efnth,Efnwy,Eabel,Eflon,Ffmao,Fabur,Fapar,Ffbre,Gaden,Gamun,",
    "Gfkie,Gaber,Ifnap,Iaven,Iarom,Ramos,Rawar,Ragal,Rfstp.sc,Tabul,Tfbla,Tacon,Tasmy,Tfank/Abud,",
    "Agre,Atri,Avie,Ebel,Eedi,Elon,Elvp,Fbre,Fmar,Fpar,Gber,Gden,Gkie,Gmun,Inap,Irom,Iven,Rmos,",
    "Rsev,Rstp,Rwar,Tank,Tbul,Tcon,Tsmy,Nhol,Nnwy,Npor,Nrum,Nser,Nspa,Nswe,Ntun/Aaser<bul,",
    "Rfsev<bla",
);

/// Build phase where Austria holds 5 centers with 3 units.
const BUILD_DFEN: &str = concat!(
    "1901fb/Aatri,Aarum,Afgre/Abud,Agre,Arum,Atri,Avie,Eedi,Elon,Elvp,Fbre,Fmar,Fpar,Gber,Gkie,",
    "Gmun,Inap,Irom,Iven,Rmos,Rsev,Rstp,Rwar,Tank,Tcon,Tsmy,Nbel,Nbul,Nden,Nhol,Nnwy,Npor,Nser,",
    "Nspa,Nswe,Ntun/-",
);

#[test]
fn dui_handshake() {
    let lines = run_engine(&["dui", "quit"]);
    assert_eq!(lines.first().map(String::as_str), Some("id name stratagem"));
    assert_eq!(lines.last().map(String::as_str), Some("duiok"));

    let options: Vec<&String> = lines.iter().filter(|l| l.starts_with("option ")).collect();
    assert!(options.iter().any(|l| l.starts_with("option name Tier ")));
    for opt in options {
        assert!(opt.contains(" type "), "option line missing type: {opt}");
    }
}

#[test]
fn unknown_and_empty_lines_are_ignored() {
    let lines = run_engine(&["foobar", "", "  ", "stop", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn setoption_is_silent() {
    let lines = run_engine(&[
        "setoption name Tier value heuristic",
        "setoption name Threads value 8",
        "setoption name Tier value godlike",
        "isready",
        "quit",
    ]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn go_from_startpos() {
    let lines = run_engine(&[
        "dui",
        "isready",
        "newgame",
        "setpower austria",
        "position startpos",
        "go movetime 500",
        "quit",
    ]);
    let info = lines.iter().find(|l| l.starts_with("info ")).expect("info line");
    assert!(info.starts_with("info tier tactical orders 3"), "{info}");
    let orders = best_orders(&lines);
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].split(" ; ").count(), 3, "{}", orders[0]);
}

#[test]
fn go_for_all_seven_powers() {
    let expected = [
        ("austria", 3),
        ("england", 3),
        ("france", 3),
        ("germany", 3),
        ("italy", 3),
        ("russia", 4),
        ("turkey", 3),
    ];
    for (power, units) in expected {
        let lines = run_engine(&[
            "setoption name Seed value 11",
            "position startpos",
            &format!("go {power} tier heuristic movetime 200"),
            "quit",
        ]);
        let orders = best_orders(&lines);
        assert_eq!(orders.len(), 1, "no bestorders for {power}");
        assert_eq!(orders[0].split(" ; ").count(), units, "{power}: {}", orders[0]);
    }
}

#[test]
fn newgame_forgets_position() {
    let lines = run_engine(&[
        "setpower austria",
        "position startpos",
        "go tier hold",
        "newgame",
        "go tier hold",
        "quit",
    ]);
    assert_eq!(best_orders(&lines), vec!["A bud H ; F tri H ; A vie H"]);
}

#[test]
fn retreat_phase() {
    let position = format!("position {RETREAT_DFEN}");
    let lines = run_engine(&["setpower austria", &position, "go movetime 200", "quit"]);
    let orders = best_orders(&lines);
    assert_eq!(orders.len(), 1);
    let parts: Vec<&str> = orders[0].split(" ; ").collect();
    assert_eq!(parts.len(), 1);
    assert!(parts[0].starts_with("A ser "), "{}", parts[0]);
    assert!(parts[0].ends_with(" D") || parts[0].contains(" R "), "{}", parts[0]);
    assert!(!parts[0].ends_with(" R bul"));
}

#[test]
fn build_phase() {
    let position = format!("position {BUILD_DFEN}");
    let lines = run_engine(&["setpower austria", &position, "go movetime 200", "quit"]);
    let orders = best_orders(&lines);
    assert_eq!(orders.len(), 1);
    let parts: Vec<&str> = orders[0].split(" ; ").collect();
    assert_eq!(parts.len(), 2, "{}", orders[0]);
    for part in parts {
        assert!(part == "W" || part == "A bud B" || part == "A vie B", "{part}");
    }
}

#[test]
fn malformed_position_keeps_running() {
    let lines = run_engine(&[
        "isready",
        "position garbage_dfen",
        "setpower austria",
        "go",
        "isready",
        "quit",
    ]);
    assert_eq!(lines, vec!["readyok".to_string(), "readyok".to_string()]);
}

#[test]
fn eof_exits_cleanly() {
    let lines = run_engine(&["dui", "isready"]);
    assert!(lines.iter().any(|l| l == "duiok"));
    assert!(lines.iter().any(|l| l == "readyok"));
}

#[test]
fn press_is_answered() {
    let lines = run_engine(&[
        "setpower austria",
        "position startpos",
        "press italy Please don't attack ven, I won't attack yours",
        "press germany this is not a canned sentence",
        "go tier heuristic movetime 200",
        "quit",
    ]);
    assert!(lines.iter().any(|l| l == "press_out italy Agreed"), "{lines:?}");
    assert!(!lines.iter().any(|l| l.starts_with("press_out germany Agreed")));
    assert_eq!(best_orders(&lines).len(), 1);
}
