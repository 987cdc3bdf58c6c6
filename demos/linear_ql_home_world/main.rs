use std::{
    env,
    error::Error,
    fs,
    path::{Path, PathBuf},
};

use textrl::{
    algo::LinearQAgentConfig,
    corpus, decay,
    decay::Decay,
    experiment::{Experiment, ExperimentConfig, RewardMatrix},
    exploration::EpsilonGreedy,
    feature::Vocabulary,
    gym::HomeWorld,
};

const USAGE: &str = "\
Usage: linear_ql_home_world [--corpus <file.tsv>] [--anneal <epochs>] [--final-epsilon <e>]

  --corpus <file.tsv>    Build the vocabulary from a tab-separated corpus
                         (e.g. demos/linear_ql_home_world/game.tsv) instead of the built-in texts
  --anneal <epochs>      Anneal training epsilon from 0.5 down to the final epsilon over this
                         many epochs. Without it training epsilon stays at 0.5
  --final-epsilon <e>    Training epsilon once annealing is over (default 0.05)";

struct Args {
    corpus: Option<PathBuf>,
    anneal: Option<u32>,
    final_epsilon: f32,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let mut out = Self {
            corpus: None,
            anneal: None,
            final_epsilon: 0.05,
        };

        let mut it = env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--help" | "-h" => {
                    println!("{USAGE}");
                    std::process::exit(0);
                }
                "--corpus" => {
                    let v = it.next().ok_or("Missing value for --corpus")?;
                    out.corpus = Some(PathBuf::from(v));
                }
                "--anneal" => {
                    let v = it.next().ok_or("Missing value for --anneal")?;
                    out.anneal = Some(
                        v.parse()
                            .map_err(|_| "Invalid --anneal (expected epochs)".to_string())?,
                    );
                }
                "--final-epsilon" => {
                    let v = it.next().ok_or("Missing value for --final-epsilon")?;
                    out.final_epsilon = v
                        .parse()
                        .map_err(|_| "Invalid --final-epsilon (expected float)".to_string())?;
                }
                other => return Err(format!("Unknown argument {other:?}\n\n{USAGE}")),
            }
        }
        Ok(out)
    }
}

fn setup_logging() -> Result<(), log::SetLoggerError> {
    let log_level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log_level)
        .chain(std::io::stdout())
        .apply()
}

fn train<D>(
    agent_config: LinearQAgentConfig<D>,
    vocabulary: Vocabulary,
) -> textrl::error::Result<RewardMatrix>
where
    D: Decay + Clone + Send + Sync,
{
    Experiment::new(ExperimentConfig::default(), agent_config, vocabulary)?
        .run_parallel(|i| HomeWorld::new(1000 + i as u64))
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse()?;
    setup_logging()?;
    let path = Path::new("demos/linear_ql_home_world");

    let vocabulary = match &args.corpus {
        Some(file) => Vocabulary::build(corpus::load(file)?)?,
        None => Vocabulary::build(HomeWorld::corpus())?,
    };
    log::info!("state dim {}", vocabulary.len());

    let rewards = match args.anneal {
        Some(epochs) => {
            log::info!(
                "annealing training epsilon to {} over {} epochs",
                args.final_epsilon,
                epochs
            );
            let defaults = LinearQAgentConfig::<decay::Constant>::default();
            let config = LinearQAgentConfig {
                training_exploration: EpsilonGreedy::new(decay::Anneal::new(
                    defaults.training_exploration.epsilon(0),
                    args.final_epsilon,
                    epochs,
                )?),
                testing_exploration: defaults.testing_exploration,
                alpha: defaults.alpha,
                gamma: defaults.gamma,
            };
            train(config, vocabulary)?
        }
        None => train(LinearQAgentConfig::<decay::Constant>::default(), vocabulary)?,
    };

    fs::create_dir_all(path.join("out"))?;
    let mut wtr = csv::Writer::from_path(path.join("out/data.csv"))?;
    wtr.write_record(["epoch", "reward"])?;
    for (epoch, reward) in rewards.mean_per_epoch().into_iter().enumerate() {
        wtr.write_record([epoch.to_string(), reward.to_string()])?;
    }
    wtr.flush()?;

    let curve = rewards.mean_per_epoch();
    log::info!(
        "final reward {:.6} | ewma {:.6}",
        curve.last().copied().unwrap_or_default(),
        textrl::util::ewma(&curve, 0.9)
    );

    Ok(())
}
