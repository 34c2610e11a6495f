//! Choose-your-own-adventure story engine
//!
//! A `Story` is a table of named passages loaded from JSON; every choice
//! jumps forward to one other passage. Play always begins at `start`.

use core::fmt;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Name of the opening passage
pub const START_PASSAGE: &str = "start";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    /// Name of the passage this choice leads to
    pub goto: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Passage {
    /// A passage with nowhere to go
    pub fn is_ending(&self) -> bool {
        self.choices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoryError {
    Parse(String),
    MissingStart,
    PassageNotFound { name: String },
    DanglingChoice { from: String, to: String },
    ChoiceOutOfRange { index: usize, available: usize },
}

impl fmt::Display for StoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid story json: {msg}"),
            Self::MissingStart => write!(f, "story has no \"{START_PASSAGE}\" passage"),
            Self::PassageNotFound { name } => write!(f, "passage \"{name}\" not found"),
            Self::DanglingChoice { from, to } => {
                write!(f, "passage \"{from}\" links to missing passage \"{to}\"")
            }
            Self::ChoiceOutOfRange { index, available } => {
                write!(f, "choice {index} out of range ({available} available)")
            }
        }
    }
}

impl std::error::Error for StoryError {}

/// Passage table keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Story {
    passages: HashMap<String, Passage>,
}

impl Story {
    /// Parse a `{ "name": { "text": ..., "choices": [...] } }` table
    pub fn from_json(json: &str) -> Result<Self, StoryError> {
        serde_json::from_str(json).map_err(|e| StoryError::Parse(e.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, passage: Passage) {
        self.passages.insert(name.into(), passage);
    }

    pub fn get(&self, name: &str) -> Option<&Passage> {
        self.passages.get(name)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Check that play can start and every choice leads somewhere
    pub fn validate(&self) -> Result<(), StoryError> {
        if !self.passages.contains_key(START_PASSAGE) {
            return Err(StoryError::MissingStart);
        }
        // Sorted so the reported error is stable
        let mut names: Vec<&String> = self.passages.keys().collect();
        names.sort();
        for name in names {
            for choice in &self.passages[name].choices {
                if !self.passages.contains_key(&choice.goto) {
                    return Err(StoryError::DanglingChoice {
                        from: name.clone(),
                        to: choice.goto.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Reader position within a story
#[derive(Debug, Clone)]
pub struct StoryEngine {
    story: Story,
    current: String,
    history: Vec<String>,
}

impl StoryEngine {
    /// Open the story at its start passage
    pub fn new(story: Story) -> Result<Self, StoryError> {
        if story.get(START_PASSAGE).is_none() {
            return Err(StoryError::MissingStart);
        }
        Ok(Self {
            story,
            current: START_PASSAGE.to_string(),
            history: vec![START_PASSAGE.to_string()],
        })
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    pub fn current(&self) -> &Passage {
        // `current` only ever holds names that were looked up successfully
        &self.story.passages[&self.current]
    }

    /// Every passage visited since the last restart, in order
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn is_ending(&self) -> bool {
        self.current().is_ending()
    }

    /// Jump to a passage by name. Unknown names leave the reader in place.
    pub fn goto(&mut self, name: &str) -> Result<&Passage, StoryError> {
        if self.story.get(name).is_none() {
            log::error!("Passage \"{name}\" not found");
            return Err(StoryError::PassageNotFound {
                name: name.to_string(),
            });
        }
        self.current = name.to_string();
        self.history.push(self.current.clone());
        log::debug!("Now at \"{name}\" ({} visited)", self.history.len());
        Ok(self.current())
    }

    /// Follow the `index`th choice of the current passage
    pub fn choose(&mut self, index: usize) -> Result<&Passage, StoryError> {
        let choices = &self.current().choices;
        let target = match choices.get(index) {
            Some(choice) => choice.goto.clone(),
            None => {
                return Err(StoryError::ChoiceOutOfRange {
                    index,
                    available: choices.len(),
                });
            }
        };
        self.goto(&target)
    }

    /// Back to the start with a fresh history
    pub fn restart(&mut self) -> &Passage {
        self.history.clear();
        self.current = START_PASSAGE.to_string();
        self.history.push(self.current.clone());
        self.current()
    }
}

/// Split passage text into paragraphs (blank-line separated), each a list of lines
pub fn paragraphs(text: &str) -> Vec<Vec<&str>> {
    text.split("\n\n").map(|p| p.split('\n').collect()).collect()
}
