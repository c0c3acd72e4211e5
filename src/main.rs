use std::io::{self, BufRead, Error, Write};
use clap::Parser;
use log::{info, error};
use tic_tac_toe_engine::{Engine, Game, Player};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play tic-tac-toe against a minimax engine", long_about = None)]
struct Args {
    /// Use alpha-beta pruning. Prompts for it when omitted.
    #[arg(long)]
    alpha_beta: Option<bool>,
    /// Let the engine make the first move.
    #[arg(long)]
    ai_first: bool,
    #[arg(long, default_value = "warn")]
    log_level: log::Level,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    simple_logger::init_with_level(args.log_level)
        .map_err(|e| Error::new(io::ErrorKind::Other, e))?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    let use_pruning = match args.alpha_beta {
        Some(use_pruning) => use_pruning,
        None => prompt_pruning(&mut input, &mut output)?,
    };
    info!("Alpha-beta pruning: {}", use_pruning);

    let first = if args.ai_first { Player::O } else { Player::X };
    let mut game = Game::new(Engine::new(Player::O), use_pruning, first);
    if let Err(e) = game.play(&mut input, &mut output) {
        error!("Game aborted: {}", e);
        return Err(e);
    }
    Ok(())
}

fn prompt_pruning<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<bool, Error> {
    write!(output, "Use Alpha-Beta Pruning? (y/n): ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_lowercase() == "y")
}
