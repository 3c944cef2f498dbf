use serde::Deserialize;

use crate::domain::account::Account;
use crate::domain::activity::Activity;
use crate::domain::deal::Deal;
use crate::domain::note::Note;
use crate::domain::person::Person;
use crate::domain::sequence::{Enrollment, Sequence};
use crate::domain::tag::Tag;
use crate::domain::task::Task;
use crate::domain::user::User;
use crate::pagination::Paginated;

/// Query string of the contacts list.
#[derive(Debug, Default, Deserialize)]
pub struct PeopleQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tag: Option<i32>,
    #[serde(default)]
    pub page: Option<usize>,
}

pub struct PeoplePageData {
    pub people: Paginated<Person>,
    pub search_query: Option<String>,
    pub status: Option<String>,
    pub tag_id: Option<i32>,
    pub tags: Vec<Tag>,
    pub accounts: Vec<Account>,
    /// Team members offered by the assignment form.
    pub team: Vec<User>,
}

pub struct PersonDetailData {
    pub person: Person,
    pub account: Option<Account>,
    pub owner: Option<User>,
    pub tags: Vec<Tag>,
    pub available_tags: Vec<Tag>,
    pub notes: Vec<Note>,
    pub tasks: Vec<Task>,
    pub deals: Vec<Deal>,
    pub activities: Vec<Activity>,
    pub enrollments: Vec<(Enrollment, Sequence)>,
    pub sequences: Vec<Sequence>,
    pub accounts: Vec<Account>,
    pub team: Vec<User>,
}
