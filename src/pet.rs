//! Pet state and actions
//!
//! The typed save schema of the game. `charData` is cached display metadata
//! derived from `selectedChar`; it is rebuilt on load and never saved.

use serde::{Deserialize, Serialize};

use crate::persistence::SaveData;

/// Upper bound of hunger, energy and joy
pub const STAT_MAX: u8 = 100;
/// Stat gained by feed/sleep/play
pub const STAT_STEP: u8 = 10;
/// XP gained by one training session
pub const TRAIN_XP: u32 = 5;
/// XP needed per level (times the current level)
pub const XP_PER_LEVEL: u32 = 20;

/// Playable bulldogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    Shadow,
    Cotton,
    Titan,
}

/// Display metadata for a character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharMeta {
    pub name: String,
    pub image: String,
}

impl Character {
    pub const ALL: [Character; 3] = [Character::Shadow, Character::Cotton, Character::Titan];

    pub fn as_str(&self) -> &'static str {
        match self {
            Character::Shadow => "shadow",
            Character::Cotton => "cotton",
            Character::Titan => "titan",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "shadow" => Some(Character::Shadow),
            "cotton" | "fluffy" => Some(Character::Cotton),
            "titan" => Some(Character::Titan),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Character::Shadow => "Shadow",
            Character::Cotton => "Cotton",
            Character::Titan => "Titan",
        }
    }

    /// Portrait file; Cotton ships as `fluffy.png`
    pub fn image(&self) -> &'static str {
        match self {
            Character::Shadow => "shadow.png",
            Character::Cotton => "fluffy.png",
            Character::Titan => "titan.png",
        }
    }

    pub fn meta(&self) -> CharMeta {
        CharMeta {
            name: self.display_name().to_string(),
            image: self.image().to_string(),
        }
    }
}

/// Care actions on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Feed,
    Sleep,
    Play,
    Train,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Feed => "feed",
            Action::Sleep => "sleep",
            Action::Play => "play",
            Action::Train => "train",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "feed" => Some(Action::Feed),
            "sleep" => Some(Action::Sleep),
            "play" => Some(Action::Play),
            "train" => Some(Action::Train),
            _ => None,
        }
    }
}

/// Everything that survives a reload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetState {
    pub selected_char: Option<Character>,
    pub level: u32,
    pub xp: u32,
    pub gold: u64,
    pub hunger: u8,
    pub energy: u8,
    pub joy: u8,
    /// Derived from `selected_char`
    #[serde(default)]
    pub char_data: Option<CharMeta>,
}

impl Default for PetState {
    fn default() -> Self {
        Self {
            selected_char: None,
            level: 1,
            xp: 0,
            gold: 0,
            hunger: STAT_MAX,
            energy: STAT_MAX,
            joy: STAT_MAX,
            char_data: None,
        }
    }
}

impl PetState {
    pub fn select_character(&mut self, character: Character) {
        self.selected_char = Some(character);
        self.char_data = Some(character.meta());
    }

    /// Apply a care action. Returns true if it caused a level-up.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Feed => {
                self.hunger = raise_stat(self.hunger);
                false
            }
            Action::Sleep => {
                self.energy = raise_stat(self.energy);
                false
            }
            Action::Play => {
                self.joy = raise_stat(self.joy);
                false
            }
            Action::Train => self.add_xp(TRAIN_XP),
        }
    }

    /// Add XP; reaching `level * XP_PER_LEVEL` resets XP and levels up.
    /// Returns true on level-up.
    pub fn add_xp(&mut self, amount: u32) -> bool {
        self.xp = self.xp.saturating_add(amount);
        if self.xp >= self.level.saturating_mul(XP_PER_LEVEL) {
            self.xp = 0;
            self.level = self.level.saturating_add(1);
            log::info!("Level up! Now level {}", self.level);
            return true;
        }
        false
    }
}

fn raise_stat(value: u8) -> u8 {
    value.saturating_add(STAT_STEP).min(STAT_MAX)
}

impl SaveData for PetState {
    fn normalize(&mut self) {
        self.char_data = self.selected_char.map(|c| c.meta());
        self.level = self.level.max(1);
        self.hunger = self.hunger.min(STAT_MAX);
        self.energy = self.energy.min(STAT_MAX);
        self.joy = self.joy.min(STAT_MAX);
    }
}
