//! Question Sets
//!
//! Static, per-mode prompts. Ids are unique within a mode and double as
//! answer keys in a [`ReflectionRecord`](super::ReflectionRecord).

use serde::Serialize;

use super::error::ReflectionResult;
use super::mode::ReportMode;

/// A single prompt on the reflection form
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Question {
    /// Answer key
    pub id: &'static str,
    /// Human-readable prompt
    pub label: &'static str,
}

const MORNING: &[Question] = &[
    Question {
        id: "priorities",
        label: "What are your top priorities for today?",
    },
    Question {
        id: "intention",
        label: "What is your intention for the day?",
    },
];

const EVENING: &[Question] = &[
    Question {
        id: "reflection",
        label: "How did your day go?",
    },
    Question {
        id: "challenges",
        label: "What challenges did you face?",
    },
    Question {
        id: "tomorrow",
        label: "What do you want to focus on tomorrow?",
    },
];

/// Ordered question set for a mode
pub fn questions_for(mode: ReportMode) -> &'static [Question] {
    match mode {
        ReportMode::Morning => MORNING,
        ReportMode::Evening => EVENING,
    }
}

/// Question set for a textual mode name
///
/// Fails with a configuration error when the name is not a known mode.
pub fn questions_for_name(name: &str) -> ReflectionResult<&'static [Question]> {
    let mode: ReportMode = name.parse()?;
    Ok(questions_for(mode))
}

/// Look up one question of a mode by id
pub fn find_question(mode: ReportMode, id: &str) -> Option<&'static Question> {
    questions_for(mode).iter().find(|q| q.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::ReflectionError;
    use std::collections::HashSet;

    #[test]
    fn test_morning_questions() {
        let ids: Vec<_> = questions_for(ReportMode::Morning).iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["priorities", "intention"]);
    }

    #[test]
    fn test_evening_questions() {
        let ids: Vec<_> = questions_for(ReportMode::Evening).iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["reflection", "challenges", "tomorrow"]);
    }

    #[test]
    fn test_question_sets_are_stable_and_disjoint() {
        for mode in ReportMode::all() {
            assert!(!questions_for(*mode).is_empty());
            assert_eq!(questions_for(*mode), questions_for(*mode));
        }

        let morning: HashSet<_> = questions_for(ReportMode::Morning).iter().map(|q| q.id).collect();
        let evening: HashSet<_> = questions_for(ReportMode::Evening).iter().map(|q| q.id).collect();
        assert!(morning.is_disjoint(&evening));
    }

    #[test]
    fn test_questions_for_name() {
        assert_eq!(questions_for_name("evening").unwrap().len(), 3);
        assert!(matches!(
            questions_for_name("weekly"),
            Err(ReflectionError::Configuration(_))
        ));
    }

    #[test]
    fn test_find_question() {
        let q = find_question(ReportMode::Evening, "tomorrow").unwrap();
        assert_eq!(q.label, "What do you want to focus on tomorrow?");
        assert!(find_question(ReportMode::Morning, "tomorrow").is_none());
    }
}
