//! The unifier: given two type variables, make their classes denote the
//! same type or explain why they cannot. Everything else in the solver is
//! bookkeeping around this crate.
#![warn(clippy::dbg_macro)]

pub mod unify;
