//! Outbound per-slot directives

use std::fmt;

/// Decision for a single battling slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 1-based move index as listed in the request
    UseMove {
        move_index: usize,
        with_transform: bool,
    },
    /// 1-based roster position of the replacement
    SwitchTo { slot: usize },
    /// Slot needs no action
    Pass,
    /// Let the engine pick
    UseDefault,
}

impl Action {
    pub fn use_move(move_index: usize) -> Self {
        Action::UseMove {
            move_index,
            with_transform: false,
        }
    }

    /// Render the directive, using `keyword` for the transform suffix
    pub fn directive(&self, keyword: &str) -> String {
        match self {
            Action::UseMove {
                move_index,
                with_transform: true,
            } => format!("move {} {}", move_index, keyword),
            Action::UseMove { move_index, .. } => format!("move {}", move_index),
            Action::SwitchTo { slot } => format!("switch {}", slot),
            Action::Pass => "pass".to_string(),
            Action::UseDefault => "default".to_string(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.directive(DEFAULT_TRANSFORM_KEYWORD))
    }
}

pub const DEFAULT_TRANSFORM_KEYWORD: &str = "terastallize";

/// Join per-slot actions into one submission line
pub fn format_choice(actions: &[Action], keyword: &str) -> String {
    actions
        .iter()
        .map(|a| a.directive(keyword))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A complete answer to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub rqid: Option<u64>,
    pub line: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives() {
        assert_eq!(Action::use_move(2).to_string(), "move 2");
        assert_eq!(
            Action::UseMove {
                move_index: 1,
                with_transform: true
            }
            .directive("dynamax"),
            "move 1 dynamax"
        );
        assert_eq!(Action::SwitchTo { slot: 4 }.to_string(), "switch 4");
        assert_eq!(Action::Pass.to_string(), "pass");
        assert_eq!(Action::UseDefault.to_string(), "default");
    }

    #[test]
    fn test_format_choice_joins_slots() {
        let line = format_choice(
            &[Action::SwitchTo { slot: 3 }, Action::Pass],
            DEFAULT_TRANSFORM_KEYWORD,
        );
        assert_eq!(line, "switch 3, pass");
    }
}
