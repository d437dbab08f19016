//! Module for core business logic services.
//!
//! This module encapsulates the operations that sit between the HTTP handlers
//! and the store: validating campaign input, generating voucher codes in
//! batches, seeding load-test data, and rendering exports.

pub mod campaign_input;
pub mod csv_export;
pub mod seeder;
pub mod voucher_generator;
