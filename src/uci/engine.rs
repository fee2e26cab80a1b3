use crate::config::EngineConfig;
use crate::oracle::{Evaluation, Line, Oracle, OracleError};
use crate::uci::UciBoard;
use crate::uci::parse::{InfoLine, parse_bestmove};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

const QUIT_GRACE: Duration = Duration::from_millis(500);

/// A UCI engine process used as an [`Oracle`].
///
/// The process is started lazily and restarted after a crash or a timeout, with up to
/// `max_retries` retries per request. Dropping the engine sends `quit` and reaps the process.
pub struct UciEngine {
    config: EngineConfig,
    process: Option<Process>,
}

struct Process {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    lines: Receiver<String>,
    name: String,
    multipv: usize,
}

#[derive(Debug, Default)]
struct SearchOutput {
    lines: BTreeMap<usize, InfoLine>,
    best_move: Option<String>,
}

impl UciEngine {
    /// Starts the engine and waits for it to be ready.
    pub fn start(config: EngineConfig) -> Result<Self, OracleError> {
        let mut engine = UciEngine {
            config,
            process: None,
        };
        engine.with_retry(|_| Ok(()))?;
        Ok(engine)
    }

    /// The name the engine reported during the handshake.
    pub fn name(&self) -> Option<&str> {
        self.process.as_ref().map(|p| p.name.as_str())
    }

    /// Shuts the engine down. Dropping it does the same.
    pub fn quit(mut self) {
        self.stop_process();
    }

    fn stop_process(&mut self) {
        if let Some(process) = self.process.take() {
            process.shutdown();
        }
    }

    fn with_retry<T>(
        &mut self,
        mut request: impl FnMut(&mut Process) -> Result<T, OracleError>,
    ) -> Result<T, OracleError> {
        let mut attempt = 0;
        loop {
            let result = match self.process {
                Some(ref mut process) => request(process),
                None => Process::spawn(&self.config).and_then(|process| {
                    request(self.process.insert(process))
                }),
            };

            let error = match result {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() => error,
                Err(error) => return Err(error),
            };

            self.stop_process();
            if attempt >= self.config.max_retries {
                return Err(OracleError::Exhausted {
                    attempts: attempt + 1,
                    last: Box::new(error),
                });
            }
            attempt += 1;
            let delay = self.config.retry_delay(attempt);
            warn!(attempt, ?delay, %error, "engine request failed, restarting engine");
            thread::sleep(delay);
        }
    }

    fn search<B: UciBoard>(
        &mut self,
        board: &B,
        depth: u32,
        lines: usize,
    ) -> Result<SearchOutput, OracleError> {
        let position = board.uci_position();
        let timeout = self.config.call_timeout();
        self.with_retry(|process| process.search(&position, depth, lines, timeout))
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        self.stop_process();
    }
}

impl Process {
    fn spawn(config: &EngineConfig) -> Result<Process, OracleError> {
        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                OracleError::Unavailable(format!("cannot start {}: {}", config.path.display(), e))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(OracleError::Unavailable("engine pipes are not available".into()));
        };

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("uci-reader".to_string())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })?;

        let mut process = Process {
            child,
            stdin: BufWriter::new(stdin),
            lines: rx,
            name: config.path.display().to_string(),
            multipv: 1,
        };
        if let Err(error) = process.handshake(config) {
            process.shutdown();
            return Err(error);
        }
        info!(engine = %process.name, pid = process.child.id(), "engine ready");
        Ok(process)
    }

    fn handshake(&mut self, config: &EngineConfig) -> Result<(), OracleError> {
        let timeout = config.call_timeout();
        self.send("uci")?;
        let mut name = None;
        self.read_until(timeout, |line| {
            if let Some(id) = line.strip_prefix("id name ") {
                name = Some(id.trim().to_string());
            }
            line.trim() == "uciok"
        })?;
        if let Some(name) = name {
            self.name = name;
        }

        for (option, value) in &config.options {
            self.send(&format!("setoption name {option} value {value}"))?;
        }
        self.send("ucinewgame")?;
        self.wait_ready(timeout)
    }

    fn wait_ready(&mut self, timeout: Duration) -> Result<(), OracleError> {
        self.send("isready")?;
        self.read_until(timeout, |line| line.trim() == "readyok")
    }

    fn send(&mut self, command: &str) -> Result<(), OracleError> {
        trace!(engine = %self.name, "> {}", command);
        writeln!(self.stdin, "{command}")?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Feeds engine output to `done` until it returns true or `timeout` has passed.
    fn read_until(
        &mut self,
        timeout: Duration,
        mut done: impl FnMut(&str) -> bool,
    ) -> Result<(), OracleError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    trace!(engine = %self.name, "< {}", line);
                    if done(&line) {
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Err(OracleError::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(OracleError::Unavailable(format!(
                        "{} closed its output",
                        self.name
                    )));
                }
            }
        }
    }

    fn search(
        &mut self,
        position: &str,
        depth: u32,
        lines: usize,
        timeout: Duration,
    ) -> Result<SearchOutput, OracleError> {
        if self.multipv != lines {
            self.send(&format!("setoption name MultiPV value {lines}"))?;
            self.multipv = lines;
        }
        self.send(&format!("position {position}"))?;
        self.send(&format!("go depth {depth}"))?;

        let mut output = SearchOutput::default();
        let mut best_move = None;
        self.read_until(timeout, |line| {
            if let Some(info) = InfoLine::parse(line) {
                if !info.bound && info.multipv <= lines {
                    output.lines.insert(info.multipv, info);
                }
                return false;
            }
            match parse_bestmove(line) {
                Some(found) => {
                    best_move = found.map(str::to_string);
                    true
                }
                None => false,
            }
        })?;
        output.best_move = best_move;
        debug!(position, depth, lines = output.lines.len(), best = ?output.best_move, "search done");
        Ok(output)
    }

    fn shutdown(mut self) {
        let _ = self.send("quit");
        let deadline = Instant::now() + QUIT_GRACE;
        while Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(Duration::from_millis(10)),
                Err(_) => break,
            }
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Replays the principal variation on a scratch board so every move is parsed in the
/// position it is played from. Parsing stops at the first move that does not fit.
fn parse_pv<B: UciBoard>(board: &B, pv: &[String]) -> Result<Vec<B::Move>, OracleError> {
    let mut scratch = board.clone();
    let mut moves = Vec::with_capacity(pv.len());
    for text in pv {
        match scratch.parse_uci_move(text) {
            Some(b_move) => {
                scratch.perform_move(&b_move);
                moves.push(b_move);
            }
            None if moves.is_empty() => return Err(OracleError::IllegalMove(text.clone())),
            None => break,
        }
    }
    Ok(moves)
}

impl<B: UciBoard> Oracle<B> for UciEngine {
    fn analyse(&mut self, board: &B, depth: u32) -> Result<Evaluation, OracleError> {
        let output = self.search(board, depth, 1)?;
        Ok(Evaluation {
            score: output.lines.get(&1).and_then(|info| info.score),
        })
    }

    fn analyse_multipv(
        &mut self,
        board: &B,
        depth: u32,
        lines: usize,
    ) -> Result<Vec<Line<B::Move>>, OracleError> {
        let output = self.search(board, depth, lines)?;
        let mut ranked = Vec::with_capacity(output.lines.len());
        for (rank, info) in output.lines {
            if info.pv.is_empty() {
                continue;
            }
            ranked.push(Line {
                rank,
                evaluation: Evaluation { score: info.score },
                moves: parse_pv(board, &info.pv)?,
            });
        }
        Ok(ranked)
    }

    fn play(&mut self, board: &B, depth: u32) -> Result<Option<B::Move>, OracleError> {
        let output = self.search(board, depth, 1)?;
        match output.best_move {
            None => Ok(None),
            Some(text) => board
                .parse_uci_move(&text)
                .map(Some)
                .ok_or(OracleError::IllegalMove(text)),
        }
    }
}
