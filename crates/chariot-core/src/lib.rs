//! # chariot-core
//!
//! Domain types and pure rules for Chariot, the pre-shift forklift
//! inspection tool.
//!
//! This crate holds everything that does not touch storage:
//! - Entity structs (equipment, questions, responses, inspections, tickets)
//! - Category, severity and status enums with their state machines
//! - The built-in equipment catalog and question bank
//! - The inspection session state machine
//! - Status aggregation, the same-day re-inspection check, ticket derivation
//! - Change-log envelope and response types

pub mod catalog;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod guard;
pub mod ids;
pub mod ledger;
pub mod question_bank;
pub mod responses;
pub mod session;
pub mod status;
pub mod trail;
