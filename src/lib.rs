//! MediTrack Core Library
//!
//! Daily medicine scheduling, adherence tracking and missed-dose alerting.
//! Derives each day's dose events from prescription data, tracks
//! taken/dismissed state per day, and decides when reminders and
//! missed-dose alerts fire.

pub mod alerts;
pub mod db;
pub mod models;
pub mod schedule;
pub mod scheduler;
pub mod store;
pub mod tracker;
