use serde::Serialize;

/// Outcome recorded for one prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// A colour was chosen; correctness was drawn at record time
    Chosen { option: usize, correct: bool },
    /// "All agree" was pressed with nothing selected
    Skipped,
}

impl Answer {
    pub fn selected(&self) -> Option<usize> {
        match self {
            Answer::Chosen { option, .. } => Some(*option),
            Answer::Skipped => None,
        }
    }

    pub fn correct(&self) -> Option<bool> {
        match self {
            Answer::Chosen { correct, .. } => Some(*correct),
            Answer::Skipped => None,
        }
    }
}

/// End-of-task statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionSummary {
    pub answered: usize,
    pub correct: usize,
    pub percentage: u8,
}

impl SessionSummary {
    pub fn from_answers(answers: &[Option<Answer>]) -> Self {
        let (answered, correct) = answers
            .iter()
            .flatten()
            .filter_map(Answer::correct)
            .fold((0, 0), |(n, c), ok| (n + 1, c + usize::from(ok)));

        let percentage = if answered > 0 {
            ((correct as f64 / answered as f64) * 100.0).round() as u8
        } else {
            0
        };

        Self {
            answered,
            correct,
            percentage,
        }
    }
}
