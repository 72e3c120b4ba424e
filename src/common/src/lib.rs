//! Types shared between the cgaterm kernel and its tooling.

#![cfg_attr(not(test), no_std)]

pub mod attribute;
pub mod error;
pub mod keys;
