#![warn(clippy::dbg_macro)]

pub mod all;
