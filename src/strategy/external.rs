//! Delegation to an out-of-process engine.
//!
//! [`ExternalEngine`] is the seam: given a position and a power it returns
//! the DSON order list for the current phase. [`ProcessEngine`] implements it
//! over a child process speaking the line protocol of this crate's own
//! binary. [`ExternalTier`] wraps any engine and falls back to a safe answer
//! whenever the engine fails or answers with something illegal.

use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::rngs::SmallRng;
use thiserror::Error;

use crate::board::{BuildOrder, GameState, Order, Phase, Power, RetreatOrder};
use crate::protocol::dfen::encode_dfen;
use crate::protocol::dson::{parse_build, parse_order, parse_orders, parse_retreat, DsonError};
use crate::resolve::{validate_build, validate_order, validate_retreat};

use super::simple::all_disband;
use super::{heuristic, Context, Strategy};

/// Extra time granted past the move time before a reply counts as late.
const REPLY_GRACE: Duration = Duration::from_secs(2);

/// How long a closing engine gets to exit after `quit`.
const EXIT_GRACE: Duration = Duration::from_secs(3);

/// How long a freshly spawned engine gets to answer `isready`.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("bad order notation: {0}")]
    Notation(#[from] DsonError),
    #[error("illegal order '{0}'")]
    Illegal(String),
}

/// An engine that can be asked for orders.
pub trait ExternalEngine: Send + Sync {
    /// The DSON order list `power` should play in `state`, computed within
    /// roughly `movetime`.
    fn best_orders(
        &self,
        state: &GameState,
        power: Power,
        movetime: Duration,
    ) -> Result<String, ExternalError>;
}

/// Tier backed by an [`ExternalEngine`].
#[derive(Clone)]
pub struct ExternalTier {
    engine: Arc<dyn ExternalEngine>,
}

impl ExternalTier {
    pub fn new(engine: Arc<dyn ExternalEngine>) -> Self {
        ExternalTier { engine }
    }

    fn query<T>(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        parse: fn(&str, Power) -> Result<T, DsonError>,
        valid: impl Fn(&T) -> bool,
        describe: impl Fn(&T) -> String,
    ) -> Result<Vec<T>, ExternalError> {
        let movetime = ctx.deadline.saturating_duration_since(Instant::now());
        let reply = self.engine.best_orders(state, power, movetime)?;
        let orders = parse_orders(&reply, power, parse)?;
        if let Some(bad) = orders.iter().find(|o| !valid(o)) {
            return Err(ExternalError::Illegal(describe(bad)));
        }
        Ok(orders)
    }
}

impl fmt::Debug for ExternalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExternalTier")
    }
}

impl Strategy for ExternalTier {
    fn name(&self) -> &'static str {
        "external"
    }

    fn movement_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        _rng: &mut SmallRng,
    ) -> Vec<Order> {
        let valid = |o: &Order| validate_order(o, state).is_ok();
        match self.query(state, power, ctx, parse_order, valid, Order::to_string) {
            Ok(orders) => orders,
            Err(e) => {
                warn!("external engine failed for {power} movement: {e}; holding");
                heuristic::all_hold(state, power)
            }
        }
    }

    fn retreat_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        _rng: &mut SmallRng,
    ) -> Vec<RetreatOrder> {
        let valid = |o: &RetreatOrder| validate_retreat(o, state).is_ok();
        match self.query(state, power, ctx, parse_retreat, valid, RetreatOrder::to_string) {
            Ok(orders) => orders,
            Err(e) => {
                warn!("external engine failed for {power} retreats: {e}; disbanding");
                all_disband(state, power)
            }
        }
    }

    fn build_orders(
        &self,
        state: &GameState,
        power: Power,
        ctx: &Context<'_>,
        _rng: &mut SmallRng,
    ) -> Vec<BuildOrder> {
        let valid = |o: &BuildOrder| validate_build(o, state).is_ok();
        match self.query(state, power, ctx, parse_build, valid, BuildOrder::to_string) {
            Ok(orders) => orders,
            Err(e) => {
                warn!("external engine failed for {power} adjustments: {e}; submitting none");
                Vec::new()
            }
        }
    }
}

/// Live connection to a child engine process. Dropping it reaps the child.
struct Session {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    /// `bestorders` replies owed for queries already given up on.
    stale: usize,
}

impl Session {
    fn send(&mut self, line: &str) -> Result<(), ExternalError> {
        debug!("> {line}");
        writeln!(self.stdin, "{line}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn next_line(&mut self, deadline: Instant, timeout: Duration) -> Result<String, ExternalError> {
        let left = deadline.saturating_duration_since(Instant::now());
        match self.lines.recv_timeout(left) {
            Ok(line) => {
                debug!("< {line}");
                Ok(line)
            }
            Err(RecvTimeoutError::Timeout) => Err(ExternalError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(ExternalError::Unavailable("engine closed its output".into()))
            }
        }
    }

    /// Reads until a line starting with `prefix` arrives and returns the rest.
    fn read_until(&mut self, prefix: &str, timeout: Duration) -> Result<String, ExternalError> {
        let deadline = Instant::now() + timeout;
        loop {
            let line = self.next_line(deadline, timeout)?;
            if let Some(rest) = line.strip_prefix(prefix) {
                return Ok(rest.trim().to_string());
            }
        }
    }

    /// Waits for the `bestorders` answering the latest `go`, skipping
    /// replies owed to abandoned queries.
    fn read_reply(&mut self, timeout: Duration) -> Result<String, ExternalError> {
        let deadline = Instant::now() + timeout;
        loop {
            let line = self.next_line(deadline, timeout)?;
            let Some(rest) = line.strip_prefix("bestorders") else { continue };
            if self.stale > 0 {
                self.stale -= 1;
                debug!("discarding late reply");
                continue;
            }
            return Ok(rest.trim().to_string());
        }
    }

    /// Drops whatever the engine printed since the last query.
    fn drain(&mut self) {
        while let Ok(line) = self.lines.try_recv() {
            debug!("< {line} (discarded)");
            if line.starts_with("bestorders") && self.stale > 0 {
                self.stale -= 1;
            }
        }
    }

    /// Stops a search that overran and swallows its reply if it comes
    /// within `grace`. A reply arriving later is skipped by the next query.
    fn abandon(&mut self, grace: Duration) {
        self.stale += 1;
        if self.send("stop").is_err() {
            return;
        }
        let deadline = Instant::now() + grace;
        while self.stale > 0 {
            match self.next_line(deadline, grace) {
                Ok(line) if line.starts_with("bestorders") => self.stale -= 1,
                Ok(_) => {}
                Err(_) => break,
            }
        }
    }

    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

/// An engine binary driven over stdin/stdout.
///
/// Each query sends `position`, `setpower` and `go movetime`, then waits for
/// the `bestorders` line. Other output is ignored.
pub struct ProcessEngine {
    path: PathBuf,
    session: Mutex<Session>,
}

impl ProcessEngine {
    /// Spawns `path`, applies `options` with `setoption` and waits for
    /// `readyok`.
    pub fn spawn(
        path: impl Into<PathBuf>,
        options: &[(String, String)],
    ) -> Result<Self, ExternalError> {
        Self::spawn_with_timeout(path.into(), options, HANDSHAKE_TIMEOUT)
    }

    fn spawn_with_timeout(
        path: PathBuf,
        options: &[(String, String)],
        handshake: Duration,
    ) -> Result<Self, ExternalError> {
        let mut child = Command::new(&path).stdin(Stdio::piped()).stdout(Stdio::piped()).spawn()?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ExternalError::Unavailable("missing stdio pipes".into()));
        };

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut session = Session { child, stdin, lines: rx, stale: 0 };
        for (name, value) in options {
            session.send(&format!("setoption name {name} value {value}"))?;
        }
        session.send("isready")?;
        if let Err(e) = session.read_until("readyok", handshake) {
            warn!("{} failed its handshake: {e}", path.display());
            return Err(e);
        }
        Ok(ProcessEngine { path, session: Mutex::new(session) })
    }
}

impl ExternalEngine for ProcessEngine {
    fn best_orders(
        &self,
        state: &GameState,
        power: Power,
        movetime: Duration,
    ) -> Result<String, ExternalError> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| ExternalError::Unavailable("session poisoned".into()))?;
        if !session.is_running() {
            let msg = format!("{} is not running", self.path.display());
            return Err(ExternalError::Unavailable(msg));
        }
        session.drain();
        session.send(&format!("position {}", encode_dfen(state)))?;
        session.send(&format!("setpower {power}"))?;
        session.send(&format!("go movetime {}", movetime.as_millis()))?;
        let reply = match session.read_reply(movetime + REPLY_GRACE) {
            Ok(reply) => reply,
            Err(e @ ExternalError::Timeout(_)) => {
                warn!("{} overran its move time, stopping it", self.path.display());
                session.abandon(REPLY_GRACE);
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        match state.phase {
            Phase::Movement if reply.is_empty() && state.unit_count(power) > 0 => {
                Err(ExternalError::Protocol("empty movement answer".into()))
            }
            _ => Ok(reply),
        }
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        let Ok(session) = self.session.get_mut() else { return };
        let _ = session.send("quit");
        let until = Instant::now() + EXIT_GRACE;
        while Instant::now() < until {
            if !session.is_running() {
                return;
            }
            thread::sleep(Duration::from_millis(20));
        }
        warn!("{} did not exit after quit, killing it", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::board::{
        Action, Dislodged, Location, Province, RetreatAction, Season, Unit, UnitKind,
    };
    use crate::config::EngineConfig;
    use Province::*;

    /// Replies with a fixed string, or fails.
    struct Canned(Option<&'static str>);

    impl ExternalEngine for Canned {
        fn best_orders(
            &self,
            _: &GameState,
            _: Power,
            _: Duration,
        ) -> Result<String, ExternalError> {
            self.0.map(str::to_string).ok_or_else(|| ExternalError::Unavailable("offline".into()))
        }
    }

    fn tier(reply: Option<&'static str>) -> ExternalTier {
        ExternalTier::new(Arc::new(Canned(reply)))
    }

    fn run_movement(t: &ExternalTier) -> Vec<Order> {
        let cfg = EngineConfig::default();
        let ctx = Context::new(&cfg, Instant::now() + Duration::from_millis(100));
        let mut rng = SmallRng::seed_from_u64(1);
        t.movement_orders(&GameState::initial(), Power::Austria, &ctx, &mut rng)
    }

    #[test]
    fn passes_through_legal_orders() {
        let orders = run_movement(&tier(Some("A vie - gal ; A bud - ser ; F tri - alb")));
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].move_target(), Some(Gal));
    }

    #[test]
    fn failure_holds_everything() {
        let orders = run_movement(&tier(None));
        assert_eq!(orders.len(), 3);
        assert!(orders.iter().all(|o| o.action == Action::Hold));
    }

    #[test]
    fn garbage_or_illegal_answers_hold() {
        for reply in ["A vie jumps", "A vie - lon", "A mos - war"] {
            let orders = run_movement(&tier(Some(reply)));
            assert!(orders.iter().all(|o| o.action == Action::Hold), "{reply}");
        }
    }

    #[test]
    fn failed_retreats_disband_and_builds_waive() {
        let cfg = EngineConfig::default();
        let ctx = Context::new(&cfg, Instant::now());
        let mut rng = SmallRng::seed_from_u64(1);
        let mut gs = GameState::empty(1901, Season::Fall, Phase::Retreat);
        gs.dislodged[Ser.index()] =
            Some(Dislodged { unit: Unit::new(Power::Austria, UnitKind::Army), attacker_from: Bul });
        let t = tier(None);
        let retreats = t.retreat_orders(&gs, Power::Austria, &ctx, &mut rng);
        assert_eq!(retreats.len(), 1);
        assert_eq!(retreats[0].action, RetreatAction::Disband);

        let mut gs = GameState::empty(1901, Season::Fall, Phase::Build);
        gs.set_owner(Vie, Some(Power::Austria));
        assert!(t.build_orders(&gs, Power::Austria, &ctx, &mut rng).is_empty());

        let ok = tier(Some("A vie B"));
        assert_eq!(
            ok.build_orders(&gs, Power::Austria, &ctx, &mut rng),
            vec![BuildOrder::build(Power::Austria, UnitKind::Army, Location::new(Vie))]
        );
    }

    /// Answers every `go` with its own sequence number, sleeping through
    /// the first one.
    #[cfg(unix)]
    const SLOW_ENGINE: &str = r#"n=0
while read -r cmd rest; do
  case "$cmd" in
    isready) echo readyok ;;
    go)
      n=$((n + 1))
      if [ "$n" -eq 1 ]; then sleep 3; fi
      echo "bestorders REPLY_FOR_QUERY_$n"
      ;;
    quit) exit 0 ;;
  esac
done
"#;

    #[cfg(unix)]
    fn fake_engine(name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = std::env::temp_dir().join(format!("stratagem-{name}-{}.sh", std::process::id()));
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn overrun_reply_is_not_returned_for_the_next_query() {
        let path = fake_engine("slow", SLOW_ENGINE);
        let engine = ProcessEngine::spawn(path.clone(), &[]).unwrap();
        let gs = GameState::initial();

        let first = engine.best_orders(&gs, Power::Austria, Duration::ZERO);
        assert!(matches!(first, Err(ExternalError::Timeout(_))), "{first:?}");
        let second = engine.best_orders(&gs, Power::Russia, Duration::from_millis(100)).unwrap();
        assert_eq!(second, "REPLY_FOR_QUERY_2");

        drop(engine);
        let _ = std::fs::remove_file(path);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_handshake_reaps_the_engine() {
        let pid_file =
            std::env::temp_dir().join(format!("stratagem-mute-{}.pid", std::process::id()));
        let body = format!("echo $$ > {}\nexec sleep 30\n", pid_file.display());
        let path = fake_engine("mute", &body);

        let spawned =
            ProcessEngine::spawn_with_timeout(path.clone(), &[], Duration::from_millis(500));
        assert!(matches!(spawned, Err(ExternalError::Timeout(_))));
        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let proc_entry = format!("/proc/{}", pid.trim());
        assert!(!std::path::Path::new(&proc_entry).exists(), "pid {pid} survived");

        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(pid_file);
    }
}
