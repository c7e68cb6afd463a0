#![warn(missing_docs)]
//! scriptop is a host runtime for operator scripts written in Rhai.
//!
//! A script exposes well-known names (`NumParameters`, `Parameter0`, ...,
//! `getResult()`, `getTitle()`) that the host discovers, shows to the user and
//! invokes.

pub mod catalog;
pub mod cmd;
pub mod config;
pub mod engine;
pub mod models;
pub mod script;
pub mod test_helpers;
