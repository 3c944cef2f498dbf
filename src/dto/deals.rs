use serde::Deserialize;

use crate::domain::account::Account;
use crate::domain::deal::{Deal, PipelineColumn};
use crate::domain::note::Note;
use crate::domain::person::Person;
use crate::domain::task::Task;
use crate::domain::user::User;
use crate::pagination::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct DealsQuery {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

/// Records offered by the deal form selects.
pub struct DealChoices {
    pub people: Vec<Person>,
    pub accounts: Vec<Account>,
    pub team: Vec<User>,
}

pub struct DealsPageData {
    pub deals: Paginated<Deal>,
    pub stage: Option<String>,
    pub choices: DealChoices,
}

pub struct PipelineData {
    pub columns: Vec<PipelineColumn>,
}

pub struct DealDetailData {
    pub deal: Deal,
    pub account: Option<Account>,
    pub person: Option<Person>,
    pub owner: Option<User>,
    pub notes: Vec<Note>,
    pub tasks: Vec<Task>,
    pub choices: DealChoices,
}
