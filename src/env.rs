use crate::action::{ActionSpace, Command};

/// What a text game shows the agent: a room description, the current quest, and whether the
/// episode has ended
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Observation {
    pub room: String,
    pub quest: String,
    pub terminal: bool,
}

impl Observation {
    pub fn new(room: impl Into<String>, quest: impl Into<String>, terminal: bool) -> Self {
        Self {
            room: room.into(),
            quest: quest.into(),
            terminal,
        }
    }

    /// The state text the agent encodes, room description followed by quest
    pub fn text(&self) -> String {
        format!("{} {}", self.room, self.quest)
    }
}

/// Represents a text game the agent learns to play
///
/// The environment is an oracle: its transition rules and reward schedule are opaque to the
/// agent. Implementations are trusted to eventually report a terminal observation, since the
/// episode runner has no step limit of its own.
pub trait Environment {
    /// Start a fresh episode
    ///
    /// **Returns** the initial observation, which is never terminal
    fn reset(&mut self) -> Observation;

    /// Apply `command` in the state described by `state`
    ///
    /// **Returns** `(next_observation, reward)`
    fn step(&mut self, state: &Observation, command: Command) -> (Observation, f32);
}

/// A text game whose commands are every pairing of a verb with an object
///
/// Both lists are fixed for the lifetime of the environment.
pub trait DiscreteActionSpace {
    /// Verb names, in index order
    fn actions(&self) -> &[String];

    /// Object names, in index order
    fn objects(&self) -> &[String];

    fn action_space(&self) -> ActionSpace {
        ActionSpace::new(self.actions().len(), self.objects().len())
    }

    /// Render a command as text, e.g. `"eat apple"`
    fn describe(&self, command: Command) -> String {
        format!(
            "{} {}",
            self.actions()[command.action],
            self.objects()[command.object]
        )
    }
}
