use crate::error::{Error, Result};

/// A hyperparameter schedule indexed by training epoch
pub trait Decay {
    /// Value at epoch `t`
    fn evaluate(&self, t: f32) -> f32;

    /// Value the schedule settles at once annealing is over
    fn limit(&self) -> f32;
}

/// The same value at every epoch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constant {
    value: f32,
}

impl Constant {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn evaluate(&self, _t: f32) -> f32 {
        self.value
    }

    fn limit(&self) -> f32 {
        self.value
    }
}

/// Moves in a straight line from `start` to `end` over the first `epochs` epochs, then holds
/// at `end`
#[derive(Debug, Clone, PartialEq)]
pub struct Anneal {
    start: f32,
    end: f32,
    epochs: u32,
}

impl Anneal {
    /// **Errors** if `epochs` is zero or either endpoint is not finite
    pub fn new(start: f32, end: f32, epochs: u32) -> Result<Self> {
        if epochs == 0 {
            return Err(Error::InvalidConfig {
                name: "epochs",
                value: 0.0,
                expected: "a positive annealing length",
            });
        }
        for (name, value) in [("start", start), ("end", end)] {
            if !value.is_finite() {
                return Err(Error::InvalidConfig {
                    name,
                    value: value.into(),
                    expected: "a finite value",
                });
            }
        }
        Ok(Self { start, end, epochs })
    }

    /// Number of epochs until the schedule reaches `end`
    pub fn epochs(&self) -> u32 {
        self.epochs
    }
}

impl Decay for Anneal {
    fn evaluate(&self, t: f32) -> f32 {
        let progress = (t / self.epochs as f32).clamp(0.0, 1.0);
        if progress >= 1.0 {
            self.end
        } else {
            self.start + (self.end - self.start) * progress
        }
    }

    fn limit(&self) -> f32 {
        self.end
    }
}
