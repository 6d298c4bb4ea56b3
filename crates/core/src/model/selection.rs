use crate::error::Error;
use crate::model::ids::OptionId;
use crate::model::question::{Question, QuestionType};

/// The option ids a learner has picked for the current question.
///
/// Ids are unique; order follows the learner's clicks but carries no meaning.
/// A single-choice selection never holds more than one id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<OptionId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a selection for `question` from ids reported by the server.
    ///
    /// Ids the question does not offer are dropped, and single-choice questions
    /// keep only the first remaining id.
    #[must_use]
    pub fn restore(question: &Question, ids: &[OptionId]) -> Self {
        let mut selection = Self::new();
        for id in ids {
            if question.has_option(*id) && !selection.contains(*id) {
                selection.ids.push(*id);
            }
        }
        if !question.kind.allows_multiple() {
            selection.ids.truncate(1);
        }
        selection
    }

    /// Apply a click on `id`: single choice replaces, multiple choice flips membership.
    pub fn toggle(&mut self, kind: QuestionType, id: OptionId) {
        if !kind.allows_multiple() {
            self.ids.clear();
            self.ids.push(id);
            return;
        }
        if let Some(pos) = self.ids.iter().position(|existing| *existing == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn contains(&self, id: OptionId) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[OptionId] {
        &self.ids
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<OptionId> {
        self.ids.clone()
    }

    /// Check the selection against the question it is about to be submitted for.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSelection` for an id the question does not offer and
    /// `Error::TooManyOptions` for a multi-id single-choice selection.
    pub fn validate(&self, question: &Question) -> Result<(), Error> {
        if let Some(option) = self.ids.iter().find(|id| !question.has_option(**id)) {
            return Err(Error::InvalidSelection {
                question: question.id,
                option: *option,
            });
        }
        if !question.kind.allows_multiple() && self.ids.len() > 1 {
            return Err(Error::TooManyOptions(question.id));
        }
        Ok(())
    }
}
