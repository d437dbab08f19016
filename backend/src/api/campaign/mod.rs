//! Module for the campaign API.
//!
//! Campaign CRUD plus everything scoped to a campaign's vouchers: bulk
//! generation (plain and streamed), paginated listing and CSV export.

pub mod handlers;
pub mod routes;
