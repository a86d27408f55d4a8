//! Go Text Protocol (GTP) front-end.
//!
//! Implements the subset of GTP version 2 needed to play games from a GUI
//! such as Sabaki or GoGui, plus a few engine-specific inspection commands.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <size>` - only the compiled-in size is accepted
//! - `clear_board` - empty the board and drop the search tree
//! - `komi <value>`
//! - `play <color> <vertex>`
//! - `genmove <color>` - search, play and print a move
//! - `showboard`
//! - `policy_moves <color>` - rollout policy candidates for `color`
//! - `prior_moves <color>` - normalized prior distribution for `color`
//!
//! ## Example
//!
//! ```ignore
//! use go_uct::gtp::GtpEngine;
//! let mut engine = GtpEngine::new(Box::new(NoPrior), SearchConfig::default(), None);
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail, ensure};

use crate::board::{Board, Color};
use crate::config::SearchConfig;
use crate::constants::N;
use crate::features::{PriorModel, prior_distribution};
use crate::policy::policy_moves;
use crate::position::{Position, parse_coord, str_coord};
use crate::search::MctsPlayer;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "policy_moves",
    "prior_moves",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// Prior models are chosen at startup, so the engine holds a trait object.
pub type DynPrior = Box<dyn PriorModel<Position>>;

/// GTP engine state.
pub struct GtpEngine {
    /// Current game position
    pos: Position,
    player: MctsPlayer<DynPrior>,
    config: SearchConfig,
}

impl GtpEngine {
    /// Create an engine; `seed` makes its searches reproducible.
    pub fn new(model: DynPrior, config: SearchConfig, seed: Option<u64>) -> Self {
        let player = match seed {
            Some(seed) => MctsPlayer::with_seed(model, seed),
            None => MctsPlayer::new(model),
        };
        Self {
            pos: Position::new(),
            player,
            config,
        }
    }

    /// Run the GTP command loop on stdin and stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the GTP command loop until `quit` or end of input.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading GTP command")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let mut parts = command_line.split_whitespace();
            let Some(command) = parts.next() else {
                continue;
            };
            let command = command.to_lowercase();
            let args: Vec<&str> = parts.collect();

            let (prefix, message) = match self.execute(&command, &args) {
                Ok(message) => ('=', message),
                Err(e) => {
                    log::warn!("{command}: {e:#}");
                    ('?', format!("{e:#}"))
                }
            };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(output, "{prefix}{id_str} {message}\n\n").context("writing GTP response")?;
            output.flush().context("flushing GTP response")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a GTP command and return the success message.
    fn execute(&mut self, command: &str, args: &[&str]) -> Result<String> {
        match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),
            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),
            "protocol_version" => Ok("2".to_string()),
            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),
            "known_command" => {
                let name = arg(args, 0)?.to_lowercase();
                Ok(KNOWN_COMMANDS.contains(&name.as_str()).to_string())
            }
            "quit" => Ok(String::new()),

            "boardsize" => {
                let size: usize = arg(args, 0)?.parse().context("invalid size")?;
                ensure!(size == N, "unacceptable size, only {N} is supported (got {size})");
                Ok(String::new())
            }

            "clear_board" => {
                self.pos.clear();
                self.player.reset();
                Ok(String::new())
            }

            "komi" => {
                let komi: f64 = arg(args, 0)?.parse().context("invalid komi")?;
                ensure!(komi.is_finite(), "invalid komi");
                self.config.komi = komi;
                Ok(String::new())
            }

            "play" => {
                let color = color_arg(args, 0)?;
                let vertex = arg(args, 1)?;
                let pt = parse_coord(vertex).ok_or_else(|| anyhow!("invalid vertex {vertex:?}"))?;
                self.pos
                    .play(pt, color)
                    .with_context(|| format!("illegal move {}", str_coord(pt)))?;
                self.player.advance_root(pt);
                Ok(String::new())
            }

            "genmove" => {
                let color = color_arg(args, 0)?;
                let pt = self.player.choose_move(&self.pos, color, &self.config)?;
                self.pos
                    .play(pt, color)
                    .with_context(|| format!("search chose illegal move {}", str_coord(pt)))?;
                self.player.advance_root(pt);
                log::info!("genmove {color}: {} (move {})", str_coord(pt), self.pos.n);
                Ok(str_coord(pt))
            }

            "showboard" => Ok(format!("\n{}", self.pos)),

            "policy_moves" => {
                let color = color_arg(args, 0)?;
                let (kind, moves) = policy_moves(&self.pos, color, self.config.policy_options());
                let moves: Vec<String> = moves.into_iter().map(str_coord).collect();
                Ok(format!("{kind}: {}", moves.join(" ")))
            }

            "prior_moves" => {
                let color = color_arg(args, 0)?;
                let dist = prior_distribution(self.player.model(), &self.pos, color);
                let moves: Vec<String> = dist
                    .into_iter()
                    .map(|(mv, p)| format!("{} {p:.3}", str_coord(mv)))
                    .collect();
                Ok(moves.join("\n"))
            }

            _ => bail!("unknown command"),
        }
    }
}

fn arg<'a>(args: &[&'a str], index: usize) -> Result<&'a str> {
    args.get(index).copied().ok_or_else(|| anyhow!("missing argument"))
}

fn color_arg(args: &[&str], index: usize) -> Result<Color> {
    let s = arg(args, index)?;
    Color::parse(s).ok_or_else(|| anyhow!("invalid color {s:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PASS_MOVE;
    use crate::features::{GammaModel, NoPrior};

    fn engine() -> GtpEngine {
        let config = SearchConfig::new().with_playouts(20).with_rollout_limit(30);
        GtpEngine::new(Box::new(NoPrior), config, Some(7))
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = GtpEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = GtpEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut engine = engine();
        assert_eq!(engine.execute("name", &[]).unwrap(), "go-uct");
        assert_eq!(engine.execute("protocol_version", &[]).unwrap(), "2");
    }

    #[test]
    fn test_known_command() {
        let mut engine = engine();
        assert_eq!(engine.execute("known_command", &["genmove"]).unwrap(), "true");
        assert_eq!(engine.execute("known_command", &["frobnicate"]).unwrap(), "false");
        assert!(engine.execute("known_command", &[]).is_err());
    }

    #[test]
    fn test_boardsize() {
        let mut engine = engine();
        assert!(engine.execute("boardsize", &[&N.to_string()]).is_ok());
        assert!(engine.execute("boardsize", &["19"]).is_err());
    }

    #[test]
    fn test_komi() {
        let mut engine = engine();
        engine.execute("komi", &["7.5"]).unwrap();
        assert_eq!(engine.config.komi, 7.5);
        assert!(engine.execute("komi", &["lots"]).is_err());
    }

    #[test]
    fn test_play_and_clear() {
        let mut engine = engine();
        engine.execute("play", &["black", "D4"]).unwrap();
        assert!(engine.execute("play", &["white", "D4"]).is_err());
        assert!(engine.execute("play", &["green", "E5"]).is_err());
        assert_eq!(engine.pos.n, 1);

        engine.execute("clear_board", &[]).unwrap();
        assert_eq!(engine.pos.n, 0);
        assert_eq!(engine.player.tree().len(), 1);
    }

    #[test]
    fn test_genmove_plays_legal_move() {
        let mut engine = engine();
        let reply = engine.execute("genmove", &["b"]).unwrap();
        let pt = parse_coord(&reply).unwrap();
        if pt != PASS_MOVE {
            assert_eq!(engine.pos.stone_at(pt), Some(Color::Black));
        }
        assert!(engine.player.tree().root_node().is_root());

        let reply = engine.execute("genmove", &["w"]).unwrap();
        assert!(parse_coord(&reply).is_some());
    }

    #[test]
    fn test_policy_moves_on_empty_board() {
        let mut engine = engine();
        let reply = engine.execute("policy_moves", &["b"]).unwrap();
        assert!(reply.starts_with("Random:"));
    }

    #[test]
    fn test_prior_moves() {
        let mut engine = engine();
        assert_eq!(engine.execute("prior_moves", &["b"]).unwrap(), "");

        let model: GammaModel = "line_1 0.1\npass 0.01".parse().unwrap();
        let config = SearchConfig::new().with_playouts(10);
        let mut engine = GtpEngine::new(Box::new(model), config, Some(1));
        let reply = engine.execute("prior_moves", &["w"]).unwrap();
        assert_eq!(reply.lines().count(), N * N + 1);
        assert!(reply.lines().last().unwrap().starts_with("pass"));
    }

    #[test]
    fn test_run_with_script() {
        let mut engine = engine();
        let input = b"1 name\n# comment\n\nbogus\n2 play b E5\nquit\nname\n";
        let mut output = Vec::new();
        engine.run_with(&input[..], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "=1 go-uct\n\n? unknown command\n\n=2 \n\n= \n\n");
    }
}
