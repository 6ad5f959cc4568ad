//! Row-level repair: header recovery, validation, deduplication, imputation,
//! outlier capping and label tallies.
//!
//! Every step recovers locally and only counts what it changed into
//! [`CleaningStats`](crate::schema::v1::CleaningStats).

pub mod dedup;
pub mod distribution;
pub mod header;
pub mod impute;
pub mod outliers;
pub mod validate;
