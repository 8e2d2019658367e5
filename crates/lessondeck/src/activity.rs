//! Per-level activity tracking as an explicit state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivityError {
    #[error("activity '{id}' cannot complete before it has started")]
    NotStarted { id: String },

    #[error("activity '{id}' is already complete")]
    AlreadyCompleted { id: String },

    #[error("level '{level}' has no activity '{id}'")]
    Unknown { level: String, id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub state: ActivityState,
}

impl Activity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: ActivityState::NotStarted,
        }
    }

    /// Start the activity. Starting one already in progress changes nothing.
    pub fn start(&mut self) -> Result<(), ActivityError> {
        match self.state {
            ActivityState::NotStarted => {
                self.state = ActivityState::InProgress;
                Ok(())
            }
            ActivityState::InProgress => Ok(()),
            ActivityState::Completed => Err(ActivityError::AlreadyCompleted {
                id: self.id.clone(),
            }),
        }
    }

    pub fn complete(&mut self) -> Result<(), ActivityError> {
        match self.state {
            ActivityState::InProgress => {
                self.state = ActivityState::Completed;
                Ok(())
            }
            ActivityState::NotStarted => Err(ActivityError::NotStarted {
                id: self.id.clone(),
            }),
            ActivityState::Completed => Err(ActivityError::AlreadyCompleted {
                id: self.id.clone(),
            }),
        }
    }

    pub fn reset(&mut self) {
        self.state = ActivityState::NotStarted;
    }

    pub fn is_complete(&self) -> bool {
        self.state == ActivityState::Completed
    }
}

/// The activities that make up one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBoard {
    pub level: String,
    pub activities: Vec<Activity>,
}

impl LevelBoard {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            activities: Vec::new(),
        }
    }

    /// Add an activity unless one with the same id exists.
    pub fn register(&mut self, id: &str) -> &mut Activity {
        let position = match self.activities.iter().position(|a| a.id == id) {
            Some(i) => i,
            None => {
                self.activities.push(Activity::new(id));
                self.activities.len() - 1
            }
        };
        &mut self.activities[position]
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn activity_mut(&mut self, id: &str) -> Result<&mut Activity, ActivityError> {
        let level = &self.level;
        self.activities
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ActivityError::Unknown {
                level: level.clone(),
                id: id.to_string(),
            })
    }

    /// True once every registered activity is complete.
    pub fn is_complete(&self) -> bool {
        !self.activities.is_empty() && self.activities.iter().all(Activity::is_complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut a = Activity::new("slides");
        assert_eq!(a.state, ActivityState::NotStarted);
        a.start().unwrap();
        a.start().unwrap();
        assert_eq!(a.state, ActivityState::InProgress);
        a.complete().unwrap();
        assert!(a.is_complete());
        a.reset();
        assert_eq!(a.state, ActivityState::NotStarted);
    }

    #[test]
    fn test_illegal_transitions() {
        let mut a = Activity::new("quiz");
        assert_eq!(
            a.complete(),
            Err(ActivityError::NotStarted {
                id: "quiz".to_string()
            })
        );
        a.start().unwrap();
        a.complete().unwrap();
        assert!(matches!(a.start(), Err(ActivityError::AlreadyCompleted { .. })));
        assert!(matches!(a.complete(), Err(ActivityError::AlreadyCompleted { .. })));
    }

    #[test]
    fn test_board_register_and_complete() {
        let mut board = LevelBoard::new("level-2");
        assert!(!board.is_complete());
        board.register("slides").start().unwrap();
        board.register("slides");
        assert_eq!(board.activities.len(), 1);
        assert_eq!(board.activity("slides").unwrap().state, ActivityState::InProgress);

        board.activity_mut("slides").unwrap().complete().unwrap();
        assert!(board.is_complete());

        let err = board.activity_mut("game").unwrap_err();
        assert_eq!(err.to_string(), "level 'level-2' has no activity 'game'");
    }
}
