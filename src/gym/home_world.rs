use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use strum::{Display, VariantArray};

use crate::{
    action::Command,
    env::{DiscreteActionSpace, Environment, Observation},
};

/// Reward for a valid command that does not complete the quest
pub const DEFAULT_REWARD: f32 = -0.01;
/// Reward for a command that makes no sense in the current room
pub const JUNK_CMD_REWARD: f32 = -0.1;
/// Reward for completing the quest
pub const QUEST_REWARD: f32 = 1.0;
/// Episodes end after this many commands
pub const MAX_STEPS: u32 = 20;

#[derive(Display, VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Verb {
    Eat,
    Sleep,
    Watch,
    Exercise,
    Go,
}

#[derive(Display, VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Object {
    Apple,
    Bed,
    Tv,
    Bike,
    North,
    South,
    East,
    West,
}

#[derive(VariantArray, Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Room {
    Living,
    Bedroom,
    Kitchen,
    Garden,
}

impl Room {
    pub fn descriptions(self) -> &'static [&'static str] {
        match self {
            Room::Living => &[
                "This room has a couch, chairs and a TV.",
                "You have entered the living room. You can watch TV here.",
                "This room has two sofas, chairs and a chandelier. A huge television is mounted on the wall.",
            ],
            Room::Bedroom => &[
                "This is a small bedroom with a bed and a wardrobe.",
                "You have entered the bedroom. There is a comfortable bed.",
                "A soft bed sits under the window next to a nightstand.",
            ],
            Room::Kitchen => &[
                "The kitchen has a fridge, an oven and a basket of red apples.",
                "You have entered the kitchen. A bowl of fruit sits on the counter.",
                "This is a clean kitchen. There is an apple on the table.",
            ],
            Room::Garden => &[
                "You are in the garden. A bike leans against the fence.",
                "This garden has a lawn, some flowers and an exercise bike.",
                "You have entered the garden. The grass is freshly cut.",
            ],
        }
    }

    fn from_description(text: &str) -> Option<Self> {
        Room::VARIANTS
            .iter()
            .copied()
            .find(|room| room.descriptions().iter().any(|&d| d == text))
    }

    /// The room reached by going in `direction`, if there is a door
    pub fn exit(self, direction: Object) -> Option<Room> {
        match (self, direction) {
            (Room::Living, Object::North) => Some(Room::Bedroom),
            (Room::Living, Object::East) => Some(Room::Kitchen),
            (Room::Living, Object::South) => Some(Room::Garden),
            (Room::Bedroom, Object::South) => Some(Room::Living),
            (Room::Kitchen, Object::West) => Some(Room::Living),
            (Room::Garden, Object::North) => Some(Room::Living),
            _ => None,
        }
    }

    /// The one thing to do in this room
    pub fn activity(self) -> (Verb, Object) {
        match self {
            Room::Living => (Verb::Watch, Object::Tv),
            Room::Bedroom => (Verb::Sleep, Object::Bed),
            Room::Kitchen => (Verb::Eat, Object::Apple),
            Room::Garden => (Verb::Exercise, Object::Bike),
        }
    }
}

/// A goal for the episode: do the activity of a particular room
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quest {
    pub text: &'static str,
    pub room: Room,
}

pub const QUESTS: [Quest; 4] = [
    Quest {
        text: "You are hungry.",
        room: Room::Kitchen,
    },
    Quest {
        text: "You are sleepy.",
        room: Room::Bedroom,
    },
    Quest {
        text: "You are bored.",
        room: Room::Living,
    },
    Quest {
        text: "You are getting fat.",
        room: Room::Garden,
    },
];

/// A four-room house in which the agent is given a quest to eat, sleep, watch TV, or exercise
///
/// Each episode starts in a random room with a random quest. The agent must walk to the right
/// room and issue the right command. The episode ends when the quest is completed or after
/// [`MAX_STEPS`] commands.
pub struct HomeWorld {
    actions: Vec<String>,
    objects: Vec<String>,
    rng: StdRng,
    steps: u32,
}

impl HomeWorld {
    pub fn new(seed: u64) -> Self {
        Self {
            actions: Verb::VARIANTS.iter().map(ToString::to_string).collect(),
            objects: Object::VARIANTS.iter().map(ToString::to_string).collect(),
            rng: StdRng::seed_from_u64(seed),
            steps: 0,
        }
    }

    /// Every text the game can show, for building a vocabulary
    pub fn corpus() -> Vec<&'static str> {
        Room::VARIANTS
            .iter()
            .flat_map(|room| room.descriptions().iter().copied())
            .chain(QUESTS.iter().map(|q| q.text))
            .collect()
    }

    /// The command index of a verb and object
    pub fn command(verb: Verb, object: Object) -> Command {
        Command::new(verb as usize, object as usize)
    }

    fn describe_room(&mut self, room: Room) -> &'static str {
        room.descriptions()
            .choose(&mut self.rng)
            .copied()
            .expect("every room has a description")
    }
}

impl Environment for HomeWorld {
    fn reset(&mut self) -> Observation {
        self.steps = 0;
        let room = *Room::VARIANTS
            .choose(&mut self.rng)
            .expect("there is at least one room");
        let quest = *QUESTS
            .choose(&mut self.rng)
            .expect("there is at least one quest");
        Observation::new(self.describe_room(room), quest.text, false)
    }

    fn step(&mut self, state: &Observation, command: Command) -> (Observation, f32) {
        let room = Room::from_description(&state.room)
            .unwrap_or_else(|| panic!("Unknown room description: {:?}", state.room));
        let quest = *QUESTS
            .iter()
            .find(|q| q.text == state.quest)
            .unwrap_or_else(|| panic!("Unknown quest: {:?}", state.quest));
        let verb = Verb::VARIANTS[command.action];
        let object = Object::VARIANTS[command.object];
        self.steps += 1;

        let (next_room, reward, done) = if room == quest.room && room.activity() == (verb, object) {
            (room, QUEST_REWARD, true)
        } else if verb == Verb::Go {
            match room.exit(object) {
                Some(next) => (next, DEFAULT_REWARD, false),
                None => (room, JUNK_CMD_REWARD, false),
            }
        } else if room.activity() == (verb, object) {
            (room, DEFAULT_REWARD, false)
        } else {
            (room, JUNK_CMD_REWARD, false)
        };

        let description = if next_room == room {
            state.room.clone()
        } else {
            self.describe_room(next_room).to_string()
        };
        let terminal = done || self.steps >= MAX_STEPS;
        (Observation::new(description, quest.text, terminal), reward)
    }
}

impl DiscreteActionSpace for HomeWorld {
    fn actions(&self) -> &[String] {
        &self.actions
    }

    fn objects(&self) -> &[String] {
        &self.objects
    }
}
