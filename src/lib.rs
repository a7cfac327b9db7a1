//! Collection-voucher desk for an assaying and hallmarking centre.
//!
//! The working receipt, its derived totals and the saved history live in
//! [`services`]; durable storage sits behind [`db::HistoryStore`].

pub mod commands;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;
