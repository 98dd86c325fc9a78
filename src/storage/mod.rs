mod admins;
mod company;
mod contacts;
pub mod db;
mod media;
pub mod models;
mod tables;

pub use db::{Database, DatabaseError, PurgeStats};
pub use tables::*;
