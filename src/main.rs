//! go-uct: a small Go engine built on UCT search.
//!
//! ## Usage
//!
//! - `go-uct` - Show a demo
//! - `go-uct gtp` - Start GTP server for GUI integration
//! - `go-uct demo` - Play a few self-play moves and print the search

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flexi_logger::Logger;

use go_uct::board::{Board, Color};
use go_uct::config::SearchConfig;
use go_uct::constants::{
    DEFAULT_EXPLORATION, DEFAULT_KOMI, DEFAULT_PLAYOUTS, DEFAULT_ROLLOUT_LIMIT, PASS_MOVE,
};
use go_uct::features::{GammaModel, NoPrior, PriorModel};
use go_uct::gtp::{DynPrior, GtpEngine};
use go_uct::position::{Position, str_coord};
use go_uct::search::MctsPlayer;

/// go-uct: a Go engine using Monte Carlo Tree Search
#[derive(Parser)]
#[command(name = "go-uct")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    search: SearchArgs,

    /// Log level filter, overridden by RUST_LOG
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Run a short self-play demo
    Demo {
        /// Number of moves to play
        #[arg(long, default_value_t = 6)]
        moves: usize,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Playouts per move
    #[arg(short = 's', long = "sim", default_value_t = DEFAULT_PLAYOUTS, global = true)]
    playouts: usize,

    /// Maximum moves per rollout
    #[arg(long = "limit", default_value_t = DEFAULT_ROLLOUT_LIMIT, global = true)]
    rollout_limit: usize,

    /// UCT exploration constant
    #[arg(long, default_value_t = DEFAULT_EXPLORATION, global = true)]
    exploration: f64,

    #[arg(long, default_value_t = DEFAULT_KOMI, global = true)]
    komi: f64,

    /// Disable 3x3 pattern moves in rollouts
    #[arg(long, global = true)]
    no_pattern: bool,

    /// Disable the self-atari filter in rollouts
    #[arg(long, global = true)]
    no_selfatari: bool,

    /// Feature weight file for move priors
    #[arg(long, global = true)]
    weights: Option<PathBuf>,

    /// Random seed for reproducible searches
    #[arg(long, global = true)]
    seed: Option<u64>,
}

impl SearchArgs {
    fn config(&self) -> Result<SearchConfig> {
        let config = SearchConfig::new()
            .with_playouts(self.playouts)
            .with_rollout_limit(self.rollout_limit)
            .with_exploration(self.exploration)
            .with_komi(self.komi)
            .with_pattern_policy(!self.no_pattern)
            .with_self_atari_filter(!self.no_selfatari);
        config.validate()?;
        Ok(config)
    }

    fn model(&self) -> Result<DynPrior> {
        match &self.weights {
            Some(path) => {
                let model = GammaModel::load(path)?;
                log::info!("loaded feature weights from {}", path.display());
                Ok(Box::new(model))
            }
            None => Ok(Box::new(NoPrior)),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the GTP channel on stdout stays clean
    let _logger = Logger::try_with_env_or_str(&cli.log_level)
        .context("invalid log level")?
        .format(flexi_logger::default_format)
        .log_to_stderr()
        .start()
        .context("starting logger")?;

    let config = cli.search.config()?;
    let model = cli.search.model()?;

    match cli.command {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::new(model, config, cli.search.seed);
            engine.run()
        }
        Some(Commands::Demo { moves }) => run_demo(model, &config, cli.search.seed, moves),
        None => run_demo(model, &config, cli.search.seed, 6),
    }
}

fn run_demo<M: PriorModel<Position>>(
    model: M,
    config: &SearchConfig,
    seed: Option<u64>,
    moves: usize,
) -> Result<()> {
    println!("go-uct: Go engine with UCT search\n");

    let mut player = match seed {
        Some(seed) => MctsPlayer::with_seed(model, seed),
        None => MctsPlayer::new(model),
    };
    let mut pos = Position::new();
    let mut color = Color::Black;

    for _ in 0..moves {
        println!("Running {} playouts for {color}...", config.playouts);
        let mv = player.choose_move(&pos, color, config)?;
        for stat in player.root_statistics().iter().take(3) {
            println!("  {stat}");
        }
        pos.play(mv, color)
            .with_context(|| format!("playing {}", str_coord(mv)))?;
        player.advance_root(mv);
        println!("{color} plays {}\n{pos}\n", str_coord(mv));

        if mv == PASS_MOVE && pos.last2_move().is_none() && pos.n > 1 {
            break;
        }
        color = color.opponent();
    }

    println!("Black wins with komi {}: {}", config.komi, pos.score(config.komi) == Color::Black);
    Ok(())
}
