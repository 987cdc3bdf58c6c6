use rand::Rng;

use crate::decay::Decay;

use super::Choice;

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Epsilon threshold at time `t`
    pub fn epsilon(&self, t: u32) -> f32 {
        self.epsilon.evaluate(t as f32)
    }

    /// Epsilon threshold once the schedule has settled
    pub fn final_epsilon(&self) -> f32 {
        self.epsilon.limit()
    }

    /// Invoke epsilon greedy policy at time `t`
    pub fn choose<R: Rng + ?Sized>(&self, t: u32, rng: &mut R) -> Choice {
        explore_or_exploit(self.epsilon(t), rng)
    }
}

/// Flip the exploration coin: explore with probability `epsilon`
pub fn explore_or_exploit<R: Rng + ?Sized>(epsilon: f32, rng: &mut R) -> Choice {
    if rng.gen::<f32>() < epsilon {
        Choice::Explore
    } else {
        Choice::Exploit
    }
}
