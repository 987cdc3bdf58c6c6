use std::{panic, sync::Arc, thread};

use log::{debug, info};

use crate::{
    action::ActionSpace,
    algo::{LinearQAgent, LinearQAgentConfig, Mode},
    decay::Decay,
    env::{DiscreteActionSpace, Environment},
    error::{Error, Result},
    feature::Vocabulary,
    util::{ewma, mean, transpose},
};

/// Configuration of the training and evaluation schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Independent runs, each starting from zero weights
    ///
    /// **Default**: `10`
    pub num_runs: usize,
    /// Epochs per run
    ///
    /// **Default**: `600`
    pub num_epochs: usize,
    /// Training episodes per epoch
    ///
    /// **Default**: `25`
    pub num_episodes_train: usize,
    /// Evaluation episodes per epoch
    ///
    /// **Default**: `50`
    pub num_episodes_test: usize,
    /// Run `i` seeds its agent with `seed + i`
    ///
    /// **Default**: `0`
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            num_runs: 10,
            num_epochs: 600,
            num_episodes_train: 25,
            num_episodes_test: 50,
            seed: 0,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("num_runs", self.num_runs),
            ("num_epochs", self.num_epochs),
            ("num_episodes_train", self.num_episodes_train),
            ("num_episodes_test", self.num_episodes_test),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(Error::InvalidConfig {
                    name,
                    value: value as f64,
                    expected: "a positive count",
                });
            }
        }
        Ok(())
    }

    fn run_seed(&self, run: usize) -> u64 {
        self.seed.wrapping_add(run as u64)
    }
}

/// Play one epoch: a batch of training episodes, then a batch of evaluation episodes
///
/// **Returns** the mean discounted reward of the evaluation episodes
pub fn run_epoch<E, D>(agent: &mut LinearQAgent<D>, env: &mut E, config: &ExperimentConfig) -> f32
where
    E: Environment,
    D: Decay,
{
    for _ in 0..config.num_episodes_train {
        agent.go(env, Mode::Train);
    }

    let rewards = (0..config.num_episodes_test)
        .filter_map(|_| agent.go(env, Mode::Test))
        .collect::<Vec<_>>();

    agent.advance_epoch();
    mean(&rewards)
}

/// Play a full run from zero weights
///
/// **Returns** the mean evaluation reward of each epoch, in order
pub fn run<E, D>(agent: &mut LinearQAgent<D>, env: &mut E, config: &ExperimentConfig) -> Vec<f32>
where
    E: Environment,
    D: Decay,
{
    agent.reset();

    let mut epoch_rewards = Vec::with_capacity(config.num_epochs);
    for epoch in 0..config.num_epochs {
        epoch_rewards.push(run_epoch(agent, env, config));
        debug!(
            "epoch {}: avg reward {:.6} | ewma reward {:.6}",
            epoch,
            mean(&epoch_rewards),
            ewma(&epoch_rewards, 0.9)
        );
    }
    epoch_rewards
}

/// Mean evaluation rewards of every epoch of every run
#[derive(Debug, Clone, PartialEq)]
pub struct RewardMatrix {
    runs: Vec<Vec<f32>>,
}

impl RewardMatrix {
    /// Panics if the runs do not all cover the same number of epochs
    pub fn new(runs: Vec<Vec<f32>>) -> Self {
        if let Some(first) = runs.first() {
            assert!(
                runs.iter().all(|run| run.len() == first.len()),
                "Every run must cover the same number of epochs."
            );
        }
        Self { runs }
    }

    /// Per-run rows, each holding one value per epoch
    pub fn runs(&self) -> &[Vec<f32>] {
        &self.runs
    }

    /// Returns `(num_runs, num_epochs)`
    pub fn shape(&self) -> (usize, usize) {
        (self.runs.len(), self.runs.first().map_or(0, Vec::len))
    }

    /// Average of each epoch across runs, the learning curve
    pub fn mean_per_epoch(&self) -> Vec<f32> {
        if self.runs.is_empty() {
            return Vec::new();
        }
        transpose(self.runs.clone())
            .into_iter()
            .map(|epoch| mean(&epoch))
            .collect()
    }
}

/// A complete experiment: several independent runs of a [`LinearQAgent`]
pub struct Experiment<D: Decay + Clone> {
    config: ExperimentConfig,
    agent_config: LinearQAgentConfig<D>,
    vocabulary: Arc<Vocabulary>,
}

impl<D: Decay + Clone> Experiment<D> {
    /// Validate both configurations up front, before any episode is played
    pub fn new(
        config: ExperimentConfig,
        agent_config: LinearQAgentConfig<D>,
        vocabulary: Vocabulary,
    ) -> Result<Self> {
        config.validate()?;
        agent_config.validate()?;
        if vocabulary.is_empty() {
            return Err(Error::EmptyVocabulary);
        }

        Ok(Self {
            config,
            agent_config,
            vocabulary: Arc::new(vocabulary),
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    fn agent(&self, space: ActionSpace, run: usize) -> Result<LinearQAgent<D>> {
        LinearQAgent::new(
            self.agent_config.clone(),
            Arc::clone(&self.vocabulary),
            space,
            self.config.run_seed(run),
        )
    }

    /// Play every run in sequence in a single environment
    pub fn run<E>(&self, env: &mut E) -> Result<RewardMatrix>
    where
        E: Environment + DiscreteActionSpace,
    {
        let mut runs = Vec::with_capacity(self.config.num_runs);
        for i in 0..self.config.num_runs {
            info!("starting run {}/{}", i + 1, self.config.num_runs);
            let mut agent = self.agent(env.action_space(), i)?;
            let rewards = run(&mut agent, env, &self.config);
            info!(
                "run {} finished, final epoch reward {:.6}",
                i + 1,
                rewards.last().copied().unwrap_or_default()
            );
            runs.push(rewards);
        }
        Ok(RewardMatrix::new(runs))
    }

    /// Play every run on its own thread
    ///
    /// `make_env` builds the environment for run `i`, so no environment, agent, or random
    /// number generator is shared between threads. Row `i` of the result belongs to run `i`.
    pub fn run_parallel<E, F>(&self, make_env: F) -> Result<RewardMatrix>
    where
        E: Environment + DiscreteActionSpace,
        F: Fn(usize) -> E + Sync,
        D: Send + Sync,
    {
        let make_env = &make_env;
        let runs = thread::scope(|s| {
            let handles = (0..self.config.num_runs)
                .map(|i| {
                    s.spawn(move || -> Result<Vec<f32>> {
                        let mut env = make_env(i);
                        let mut agent = self.agent(env.action_space(), i)?;
                        let rewards = run(&mut agent, &mut env, &self.config);
                        info!("run {} finished", i + 1);
                        Ok(rewards)
                    })
                })
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
                .collect::<Result<Vec<_>>>()
        })?;
        Ok(RewardMatrix::new(runs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decay, ds::WeightMatrix, env::tests::MockEnv, exploration::EpsilonGreedy};

    fn small_config() -> ExperimentConfig {
        ExperimentConfig {
            num_runs: 3,
            num_epochs: 4,
            num_episodes_train: 2,
            num_episodes_test: 3,
            seed: 11,
        }
    }

    fn env() -> MockEnv {
        MockEnv::new(
            ("hall", "you are hungry"),
            &[("kitchen", "you are hungry", -0.1), ("kitchen", "done", 1.0)],
        )
    }

    fn experiment() -> Experiment<decay::Constant> {
        let vocabulary = Vocabulary::build(["hall kitchen you are hungry done"]).unwrap();
        Experiment::new(small_config(), LinearQAgentConfig::default(), vocabulary).unwrap()
    }

    #[test]
    fn reward_matrix_shape_and_mean() {
        let matrix = RewardMatrix::new(vec![vec![1.0, 2.0, 3.0], vec![3.0, 4.0, 5.0]]);
        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.mean_per_epoch(), [2.0, 3.0, 4.0]);
        assert!(RewardMatrix::new(Vec::new()).mean_per_epoch().is_empty());
    }

    #[test]
    #[should_panic(expected = "same number of epochs")]
    fn ragged_reward_matrix_panics() {
        RewardMatrix::new(vec![vec![1.0, 2.0, 3.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn epoch_mean_of_fixed_trajectory() {
        let experiment = experiment();
        let mut env = env();
        let mut agent = experiment.agent(env.action_space(), 0).unwrap();

        // the script ignores commands, so every evaluation return is -0.1 + 0.5 * 1.0
        let reward = run_epoch(&mut agent, &mut env, experiment.config());
        assert!((reward - 0.4).abs() < 1e-6, "reward was {reward}");
        assert_eq!(agent.epoch(), 1);
        // 2 training + 3 evaluation episodes of 2 steps
        assert_eq!(env.commands.len(), 10);
    }

    #[test]
    fn run_produces_one_value_per_epoch() {
        let experiment = experiment();
        let matrix = experiment.run(&mut env()).unwrap();
        assert_eq!(matrix.shape(), (3, 4));
        for reward in matrix.mean_per_epoch() {
            assert!((reward - 0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn runs_start_from_zero_weights() {
        // fully greedy, so the weights do not depend on the random stream
        let agent_config = LinearQAgentConfig {
            training_exploration: EpsilonGreedy::new(decay::Constant::new(0.0)),
            testing_exploration: EpsilonGreedy::new(decay::Constant::new(0.0)),
            ..Default::default()
        };
        let vocabulary = Vocabulary::build(["hall kitchen you are hungry done"]).unwrap();
        let experiment = Experiment::new(small_config(), agent_config, vocabulary).unwrap();
        let mut env = env();

        let mut agent = experiment.agent(env.action_space(), 0).unwrap();
        run(&mut agent, &mut env, experiment.config());
        let (rows, cols) = agent.theta().shape();
        assert_ne!(*agent.theta(), WeightMatrix::zeros(rows, cols));

        // a second run on the same agent must not inherit the first run's weights
        let mut fresh = experiment.agent(env.action_space(), 5).unwrap();
        run(&mut agent, &mut env, experiment.config());
        run(&mut fresh, &mut env, experiment.config());
        assert_eq!(agent.theta(), fresh.theta());
        assert_eq!(agent.epoch(), fresh.epoch());
    }

    #[test]
    fn identical_seeds_reproduce_runs() {
        let experiment = experiment();
        let mut first_env = env();
        let mut second_env = env();
        experiment.run(&mut first_env).unwrap();
        experiment.run(&mut second_env).unwrap();
        assert_eq!(first_env.commands, second_env.commands);
    }

    #[test]
    fn parallel_matches_sequential() {
        let experiment = experiment();
        let sequential = experiment.run(&mut env()).unwrap();
        let parallel = experiment.run_parallel(|_| env()).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn training_epsilon_anneals_across_epochs() {
        let agent_config = LinearQAgentConfig {
            training_exploration: EpsilonGreedy::new(decay::Anneal::new(0.5, 0.1, 2).unwrap()),
            testing_exploration: EpsilonGreedy::new(decay::Constant::new(0.05)),
            alpha: 0.001,
            gamma: 0.5,
        };
        let vocabulary = Vocabulary::build(["hall kitchen you are hungry done"]).unwrap();
        let experiment = Experiment::new(small_config(), agent_config, vocabulary).unwrap();
        let mut env = env();
        let mut agent = experiment.agent(env.action_space(), 0).unwrap();

        let mut epsilons = Vec::new();
        for _ in 0..experiment.config().num_epochs {
            epsilons.push(agent.epsilon(Mode::Train));
            run_epoch(&mut agent, &mut env, experiment.config());
        }
        assert_eq!(epsilons[0], 0.5);
        assert!((epsilons[1] - 0.3).abs() < 1e-6, "epsilons {epsilons:?}");
        assert_eq!(epsilons[2], 0.1);
        assert_eq!(epsilons[3], 0.1);
        assert_eq!(agent.epsilon(Mode::Test), 0.05);

        // a new run rewinds the schedule
        run(
            &mut agent,
            &mut env,
            &ExperimentConfig {
                num_epochs: 1,
                ..small_config()
            },
        );
        assert_eq!(agent.epoch(), 1);
        assert!((agent.epsilon(Mode::Train) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn empty_vocabulary_rejected() {
        let result = Experiment::new(
            small_config(),
            LinearQAgentConfig::<decay::Constant>::default(),
            Vocabulary::default(),
        );
        assert!(matches!(result, Err(Error::EmptyVocabulary)));
    }

    #[test]
    fn invalid_configuration_rejected() {
        let vocabulary = Vocabulary::build(["a"]).unwrap();
        let config = ExperimentConfig {
            num_episodes_test: 0,
            ..Default::default()
        };
        let result = Experiment::new(
            config,
            LinearQAgentConfig::<decay::Constant>::default(),
            vocabulary,
        );
        assert!(matches!(
            result,
            Err(Error::InvalidConfig {
                name: "num_episodes_test",
                ..
            })
        ));
    }
}
