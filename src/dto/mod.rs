//! DTO modules that bridge services with templates and APIs.

pub mod accounts;
pub mod api;
pub mod auth;
pub mod campaigns;
pub mod dashboard;
pub mod deals;
pub mod people;
pub mod sequences;
pub mod settings;
pub mod sync;
pub mod tags;
pub mod tasks;
pub mod team;
pub mod webhooks;
