//! Course grade calculation.
//!
//! Submissions are indexed by assignment, each assignment group is scored
//! under its drop rules, and the group totals are combined under the course's
//! weighting scheme into a single percentage.

pub mod aggregate;
pub mod calculator;
pub mod group;
pub mod index;
pub mod types;
pub mod utility;
