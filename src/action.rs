/// A text command: the index of a verb and the index of the object it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub action: usize,
    pub object: usize,
}

impl Command {
    pub fn new(action: usize, object: usize) -> Self {
        Self { action, object }
    }
}

impl From<(usize, usize)> for Command {
    fn from((action, object): (usize, usize)) -> Self {
        Self { action, object }
    }
}

impl From<Command> for (usize, usize) {
    fn from(command: Command) -> Self {
        (command.action, command.object)
    }
}

/// The combinatorial action space of a text game
///
/// Every `(action, object)` pair is a distinct command, laid out row-major as
/// `c = action * num_objects + object`. The layout never changes for a given space, so flat
/// indices can be used to address rows of a weight matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpace {
    num_actions: usize,
    num_objects: usize,
}

impl ActionSpace {
    /// **Panics** if either dimension is zero
    pub fn new(num_actions: usize, num_objects: usize) -> Self {
        assert!(
            num_actions > 0 && num_objects > 0,
            "Action space must contain at least one action and one object."
        );
        Self {
            num_actions,
            num_objects,
        }
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn num_objects(&self) -> usize {
        self.num_objects
    }

    /// Total number of commands, `num_actions * num_objects`
    pub fn len(&self) -> usize {
        self.num_actions * self.num_objects
    }

    /// Always `false`, construction rejects empty spaces
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Convert a command to its flat index
    ///
    /// **Panics** if the action or object index is out of range
    pub fn to_flat(&self, command: Command) -> usize {
        let Command { action, object } = command;
        assert!(
            action < self.num_actions,
            "Invalid action index: {} (num_actions = {})",
            action,
            self.num_actions
        );
        assert!(
            object < self.num_objects,
            "Invalid object index: {} (num_objects = {})",
            object,
            self.num_objects
        );
        action * self.num_objects + object
    }

    /// Convert a flat index back to its command
    ///
    /// **Panics** if `index >= self.len()`
    pub fn to_command(&self, index: usize) -> Command {
        assert!(
            index < self.len(),
            "Invalid flat action index: {} (len = {})",
            index,
            self.len()
        );
        Command {
            action: index / self.num_objects,
            object: index % self.num_objects,
        }
    }

    /// Iterate all commands in flat index order
    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        (0..self.len()).map(|c| self.to_command(c))
    }
}
