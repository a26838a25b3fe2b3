//! Pure resource converter logic for ISRU.
//!
//! This crate contains all converter logic that is independent of any
//! engine or host runtime. Functions take plain data plus an injected
//! [`store::ResourceStore`] and return results, making them unit-testable
//! with an in-memory store and portable to any scheduler.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`applier`] | Withdraws inputs and deposits outputs for a resolved amount |
//! | [`constants`] | Time clamps, epsilon, discrepancy tolerance, resource names |
//! | [`controls`] | Derived enable/disable actions (always-on handling) |
//! | [`converter`] | Converter definitions, parsed config, validation |
//! | [`info`] | Human-readable rate summary and SI value formatting |
//! | [`ratio`] | Resource ratios and delimited config string parsing |
//! | [`resolver`] | Constrained-rate resolution of the per-tick amount |
//! | [`resources`] | Resource definitions and the resource library |
//! | [`sequencer`] | Per-tick clock handling: prime, clamp, resolve, apply |
//! | [`state`] | Runtime state, status messages, persisted timestamp |
//! | [`store`] | Resource store trait and an in-memory implementation |

pub mod applier;
pub mod constants;
pub mod controls;
pub mod converter;
pub mod info;
pub mod ratio;
pub mod resolver;
pub mod resources;
pub mod sequencer;
pub mod state;
pub mod store;
