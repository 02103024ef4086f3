//! Statutory deadline calculations and filing workflow stages for UK
//! accountancy practice clients.
//!
//! All calculations take "today" as an argument and never fail: input that
//! cannot be resolved yields `None`, rendered as "Not set".

pub mod filing;
