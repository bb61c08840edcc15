//! Wire types shared by the Parley server crates.

pub mod api;
pub mod models;
