//! Domain aggregates exposed by the CRM service layer.

pub mod account;
pub mod activity;
pub mod auth;
pub mod automation;
pub mod campaign;
pub mod dashboard;
pub mod deal;
pub mod integration;
pub mod note;
pub mod person;
pub mod scoring;
pub mod sequence;
pub mod sync;
pub mod tag;
pub mod task;
pub mod tenant;
pub mod types;
pub mod user;
pub mod webhook;
