use serde::Deserialize;

use crate::domain::account::Account;
use crate::domain::deal::Deal;
use crate::domain::note::Note;
use crate::domain::person::Person;
use crate::domain::user::User;
use crate::pagination::Paginated;

#[derive(Debug, Default, Deserialize)]
pub struct AccountsQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

pub struct AccountsPageData {
    pub accounts: Paginated<Account>,
    pub search_query: Option<String>,
    pub team: Vec<User>,
}

/// Company page with the records linked to it.
pub struct AccountDetailData {
    pub account: Account,
    pub owner: Option<User>,
    pub people: Vec<Person>,
    pub deals: Vec<Deal>,
    pub notes: Vec<Note>,
    pub team: Vec<User>,
}
