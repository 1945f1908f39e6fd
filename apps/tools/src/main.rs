use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use picker::{Color, GridConfig, GridGenerator, NarrowingSession, Selection, SelectionOutcome};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    /// Per-round levels per channel, e.g. 8,8,4.
    #[arg(long, value_delimiter = ',', num_args = 3)]
    levels: Option<Vec<u16>>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints one round's grid as rows of hex colours.
    Grid {
        #[arg(long, default_value_t = 0)]
        round: usize,
        #[arg(long)]
        center: Option<String>,
    },
    /// Picks three cells by index and prints the colour they settle on.
    Walk {
        #[arg(num_args = 3, required = true)]
        indices: Vec<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = GridConfig::default();
    if let Some(&[coarse, medium, fine]) = cli.levels.as_deref() {
        config.levels = [coarse, medium, fine];
    }
    let generator = GridGenerator::new(config)?;

    match cli.command {
        Command::Grid { round, center } => {
            let center = center
                .as_deref()
                .map(str::parse::<Color>)
                .transpose()
                .context("parsing --center")?;
            let grid = generator.generate_for(round, center)?;
            let layout = grid.layout();
            for row in grid.colors().chunks(layout.columns.max(1)) {
                let line: Vec<String> = row.iter().map(|color| color.to_hex()).collect();
                println!("{}", line.join(" "));
            }
            println!(
                "{} x {} = {} colours: {}-{} / {}",
                layout.rows,
                layout.columns,
                grid.len(),
                grid.first().unwrap_or(Color::BLACK),
                grid.last().unwrap_or(Color::BLACK),
                grid.step()
            );
        }
        Command::Walk { indices } => {
            let mut session = NarrowingSession::new(&generator);
            for index in indices {
                let outcome = session.select(&generator, Selection::Index(index))?;
                match outcome {
                    SelectionOutcome::Narrowed { round, center } => {
                        debug!(index, ?round, %center, "narrowed");
                        println!("picked {center}, next round {}", round.index());
                    }
                    SelectionOutcome::Finalized(color) => {
                        println!("selected {color}");
                    }
                }
            }
        }
    }

    Ok(())
}
