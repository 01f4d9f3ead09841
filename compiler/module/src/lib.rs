#![warn(clippy::dbg_macro)]

#[macro_use]
extern crate lazy_static;

pub mod ident;
pub mod symbol;
