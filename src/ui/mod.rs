//! Interactive terminal helpers

pub mod menu;
