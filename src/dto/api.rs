//! DTOs exposed by the CRM API endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::person::Person;

/// Query parameters accepted by the `/api/v1/people` service.
#[derive(Debug, Default, Deserialize)]
pub struct PeopleApiQuery {
    /// Optional free-form search string applied to the contact list.
    #[serde(default)]
    pub search: Option<String>,
    /// Optional page number for pagination.
    #[serde(default)]
    pub page: Option<usize>,
}

/// Result payload returned by [`crate::services::api::list_people`].
#[derive(Debug, Serialize)]
pub struct PeopleResponse {
    /// Total number of contacts matching the filter.
    pub total: usize,
    /// Page of contacts requested by the caller.
    pub people: Vec<Person>,
}
