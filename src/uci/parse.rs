use crate::oracle::Score;

/// The parts of an engine `info` line the oracle cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    pub depth: Option<u32>,
    /// 1-based rank of the line, 1 when the engine does not say.
    pub multipv: usize,
    pub score: Option<Score>,
    /// The score is only a `lowerbound` or `upperbound`.
    pub bound: bool,
    /// Principal variation in UCI notation.
    pub pv: Vec<String>,
}

impl Default for InfoLine {
    fn default() -> Self {
        InfoLine {
            depth: None,
            multipv: 1,
            score: None,
            bound: false,
            pv: Vec::new(),
        }
    }
}

/// Keys followed by exactly one value that are skipped.
const SINGLE_VALUE_KEYS: [&str; 10] = [
    "seldepth",
    "time",
    "nodes",
    "nps",
    "hashfull",
    "tbhits",
    "sbhits",
    "cpuload",
    "currmove",
    "currmovenumber",
];

impl InfoLine {
    /// Parses an `info` line. `None` for any other line and for lines that carry neither a
    /// score nor a principal variation (`info string ...`, `info currmove ...`).
    pub fn parse(line: &str) -> Option<InfoLine> {
        let mut tokens = line.split_whitespace();
        if tokens.next()? != "info" {
            return None;
        }

        let mut info = InfoLine::default();
        while let Some(token) = tokens.next() {
            match token {
                "depth" => info.depth = tokens.next().and_then(|t| t.parse().ok()),
                "multipv" => {
                    info.multipv = tokens.next().and_then(|t| t.parse().ok()).unwrap_or(1)
                }
                "score" => {
                    let kind = tokens.next();
                    let value = tokens.next().and_then(|t| t.parse().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(cp)) => Some(Score::Centipawns(cp)),
                        (Some("mate"), Some(moves)) => Some(Score::Mate(moves)),
                        _ => None,
                    };
                }
                "lowerbound" | "upperbound" => info.bound = true,
                "wdl" => {
                    tokens.by_ref().take(3).for_each(drop);
                }
                "pv" => {
                    info.pv = tokens.by_ref().map(str::to_string).collect();
                }
                "string" => break,
                key if SINGLE_VALUE_KEYS.contains(&key) => {
                    tokens.next();
                }
                _ => {}
            }
        }

        if info.score.is_none() && info.pv.is_empty() {
            return None;
        }
        Some(info)
    }
}

/// Parses a `bestmove` line. `None` for any other line, `Some(None)` when the engine has no
/// move to offer (`(none)` or `0000`).
pub fn parse_bestmove(line: &str) -> Option<Option<&str>> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "bestmove" {
        return None;
    }
    match tokens.next() {
        None | Some("(none)") | Some("0000") => Some(None),
        Some(text) => Some(Some(text)),
    }
}
