#![cfg_attr(not(test), no_std)]

//! # ir-stopwatch
//! ## An interrupt-driven presence stopwatch
//!
//! Features:
//! - IR sensor starts timing when an object arrives and stops when it leaves
//! - Reset button that always wins
//! - 1 ms tick counter shared safely between interrupts and the main loop
//! - Status lines over serial and a running/idle LED pair
//!
//! The modules here are `no_std` and hardware independent; the Pico board
//! binary in `main.rs` wires them to real interrupts.

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod foreground;
pub mod outbox;
pub mod rendering;
pub mod sensors;
pub mod shared;
pub mod timer;

pub use error::Error;
