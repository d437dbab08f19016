//! Module for operations on individual vouchers, addressed by voucher id.

pub mod handlers;
pub mod routes;
