use crate::domain::person::Person;
use crate::domain::sequence::{Enrollment, Sequence, SequenceStep};

pub struct SequencesPageData {
    pub sequences: Vec<Sequence>,
}

/// Sequence editor with its steps and enrolled contacts.
pub struct SequenceDetailData {
    pub sequence: Sequence,
    pub steps: Vec<SequenceStep>,
    pub enrollments: Vec<(Enrollment, Person)>,
    /// Visible contacts with an email that are not enrolled yet.
    pub candidates: Vec<Person>,
}
