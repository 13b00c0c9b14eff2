//! HTTP handlers for the Projects domain

pub mod files;
pub mod join_requests;
pub mod projects;
pub mod roster;
