//! Database models shared across the CRM repository.

pub mod account;
pub mod activity;
pub mod campaign;
#[cfg(feature = "server")]
pub mod config;
pub mod deal;
pub mod integration;
pub mod note;
pub mod person;
pub mod sequence;
pub mod settings;
pub mod sync_run;
pub mod tag;
pub mod task;
pub mod tenant;
pub mod user;
pub mod webhook_event;
