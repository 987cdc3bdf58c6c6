use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    action::{ActionSpace, Command},
    assert_interval, decay,
    decay::Decay,
    ds::{argmax, WeightMatrix},
    env::Environment,
    error::{Error, Result},
    exploration::{explore_or_exploit, Choice, EpsilonGreedy},
    feature::{FeatureVector, Vocabulary},
    util::check_interval,
};

/// Configuration for the [`LinearQAgent`]
#[derive(Debug, Clone)]
pub struct LinearQAgentConfig<D: Decay> {
    /// Exploration used in training episodes, evaluated at the current epoch
    ///
    /// **Default**: constant `0.5`
    pub training_exploration: EpsilonGreedy<D>,
    /// Exploration used in evaluation episodes
    ///
    /// **Default**: constant `0.05`
    pub testing_exploration: EpsilonGreedy<decay::Constant>,
    /// Learning rate, must be positive
    ///
    /// **Default**: `0.001`
    pub alpha: f32,
    /// Discount factor, must be in `(0, 1]`
    ///
    /// **Default**: `0.5`
    pub gamma: f32,
}

impl Default for LinearQAgentConfig<decay::Constant> {
    fn default() -> Self {
        Self {
            training_exploration: EpsilonGreedy::new(decay::Constant::new(0.5)),
            testing_exploration: EpsilonGreedy::new(decay::Constant::new(0.05)),
            alpha: 0.001,
            gamma: 0.5,
        }
    }
}

impl<D: Decay> LinearQAgentConfig<D> {
    /// Check every hyperparameter is in range
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha.is_finite()) {
            return Err(Error::InvalidConfig {
                name: "alpha",
                value: self.alpha.into(),
                expected: "a positive learning rate",
            });
        }
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(Error::InvalidConfig {
                name: "gamma",
                value: self.gamma.into(),
                expected: "a discount factor in (0, 1]",
            });
        }

        let expected = "an exploration rate in [0, 1]";
        check_interval(
            "training_exploration",
            self.training_exploration.epsilon(0),
            0.0,
            1.0,
            expected,
        )?;
        check_interval(
            "training_exploration",
            self.training_exploration.final_epsilon(),
            0.0,
            1.0,
            expected,
        )?;
        check_interval(
            "testing_exploration",
            self.testing_exploration.epsilon(0),
            0.0,
            1.0,
            expected,
        )
    }
}

/// Which kind of episode the agent is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Weights are updated after every step, no reward is collected
    Train,
    /// Weights are frozen, the discounted return is collected
    Test,
}

/// A single transition between two encoded states
#[derive(Debug, Clone, PartialEq)]
pub struct Exp {
    /// The state before taking the command
    pub state: FeatureVector,
    /// The command taken in `state`
    pub command: Command,
    /// The reward received for the command
    pub reward: f32,
    /// The state the command led to
    pub next_state: FeatureVector,
    /// Whether `next_state` ends the episode
    pub terminal: bool,
}

/// Select a command with an epsilon-greedy policy over a linear Q function
///
/// With probability `epsilon` a command is drawn uniformly from the whole action space, ignoring
/// the Q values. Otherwise the command with the highest Q value `theta · state` is chosen, ties
/// going to the lowest flat index.
///
/// **Panics** if `epsilon` is not in `[0, 1]`
pub fn select_action<R: Rng + ?Sized>(
    state: &FeatureVector,
    theta: &WeightMatrix,
    space: &ActionSpace,
    epsilon: f32,
    rng: &mut R,
) -> Command {
    assert_interval!(epsilon, 0.0, 1.0);
    let c = match explore_or_exploit(epsilon, &mut *rng) {
        Choice::Explore => rng.gen_range(0..space.len()),
        Choice::Exploit => argmax(&theta.q_values(state)).expect("action space is never empty"),
    };
    space.to_command(c)
}

/// One-step Q-learning update of a linear Q function
///
/// Only the row of the command taken is touched:
///
/// θ<sub>c</sub> ← θ<sub>c</sub> + α (r + γ max<sub>c′</sub> θ<sub>c′</sub>·s′ − θ<sub>c</sub>·s) s
///
/// where the bootstrap term is zero when the transition is terminal.
pub fn linear_q_update(
    theta: &mut WeightMatrix,
    space: &ActionSpace,
    exp: &Exp,
    alpha: f32,
    gamma: f32,
) {
    let c = space.to_flat(exp.command);
    let q_value = theta.q_value(c, &exp.state);
    let max_next_q = if exp.terminal {
        0.0
    } else {
        theta.max_q(&exp.next_state)
    };
    let target = exp.reward + gamma * max_next_q;
    theta.add_scaled_row(c, alpha * (target - q_value), &exp.state);
}

/// A Q-learning agent with a linear value function over bag-of-words features
///
/// The agent owns everything a training run mutates: the weight matrix, the random number
/// generator, and the epoch counter driving the training exploration schedule. Two agents never
/// share any of these, so runs can be played independently or in parallel.
#[derive(Debug, Clone)]
pub struct LinearQAgent<D: Decay> {
    theta: WeightMatrix,
    vocabulary: Arc<Vocabulary>,
    space: ActionSpace,
    training_exploration: EpsilonGreedy<D>,
    testing_exploration: EpsilonGreedy<decay::Constant>,
    alpha: f32,
    gamma: f32,
    rng: StdRng,
    epoch: u32,
}

impl<D: Decay> LinearQAgent<D> {
    /// Initialize a new `LinearQAgent` with zero weights
    ///
    /// ### Arguments
    /// - `config` Hyperparameters, validated before anything else
    /// - `vocabulary` The feature dictionary, shared read-only between agents
    /// - `space` The action space of the environment the agent will play
    /// - `seed` Seed for the agent's own random number generator
    pub fn new(
        config: LinearQAgentConfig<D>,
        vocabulary: Arc<Vocabulary>,
        space: ActionSpace,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        if vocabulary.is_empty() {
            return Err(Error::EmptyVocabulary);
        }

        Ok(Self {
            theta: WeightMatrix::zeros(space.len(), vocabulary.len()),
            vocabulary,
            space,
            training_exploration: config.training_exploration,
            testing_exploration: config.testing_exploration,
            alpha: config.alpha,
            gamma: config.gamma,
            rng: StdRng::seed_from_u64(seed),
            epoch: 0,
        })
    }

    pub fn theta(&self) -> &WeightMatrix {
        &self.theta
    }

    pub fn action_space(&self) -> ActionSpace {
        self.space
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Zero the weights and rewind the exploration schedule
    pub fn reset(&mut self) {
        self.theta.reset();
        self.epoch = 0;
    }

    pub(crate) fn advance_epoch(&mut self) {
        self.epoch += 1;
    }

    /// Exploration rate used in episodes of the given mode at the current epoch
    pub fn epsilon(&self, mode: Mode) -> f32 {
        match mode {
            Mode::Train => self.training_exploration.epsilon(self.epoch),
            Mode::Test => self.testing_exploration.epsilon(self.epoch),
        }
    }

    /// Choose a command for an encoded state
    pub fn act(&mut self, state: &FeatureVector, mode: Mode) -> Command {
        let epsilon = self.epsilon(mode);
        select_action(state, &self.theta, &self.space, epsilon, &mut self.rng)
    }

    /// Update the weights from one transition
    pub fn learn(&mut self, exp: &Exp) {
        linear_q_update(&mut self.theta, &self.space, exp, self.alpha, self.gamma);
    }

    /// Deploy the agent into the environment for one episode
    ///
    /// In [`Mode::Train`] the weights are updated after every step and `None` is returned. In
    /// [`Mode::Test`] the weights are left untouched and the discounted return of the episode is
    /// returned.
    pub fn go<E: Environment>(&mut self, env: &mut E, mode: Mode) -> Option<f32> {
        let mut observation = env.reset();
        let mut gamma_t = 1.0;
        let mut episode_reward = 0.0;
        let mut steps = 0u32;

        while !observation.terminal {
            let state = self.vocabulary.encode(&observation.text());
            let command = self.act(&state, mode);
            let (next, reward) = env.step(&observation, command);
            let next_state = self.vocabulary.encode(&next.text());

            match mode {
                Mode::Train => self.learn(&Exp {
                    state,
                    command,
                    reward,
                    next_state,
                    terminal: next.terminal,
                }),
                Mode::Test => {
                    episode_reward += gamma_t * reward;
                    gamma_t *= self.gamma;
                }
            }

            observation = next;
            steps += 1;
        }

        log::trace!("{:?} episode finished after {} steps", mode, steps);
        match mode {
            Mode::Train => None,
            Mode::Test => Some(episode_reward),
        }
    }
}
