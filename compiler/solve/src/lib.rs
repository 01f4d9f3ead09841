#![warn(clippy::dbg_macro)]

pub mod solve;
