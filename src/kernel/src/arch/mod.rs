//! Architecture-specific implementations.
//!
//! This module provides platform abstractions for different target architectures.
//! Currently supported: bare-metal x86_64.

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod x86_64;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub use self::x86_64::*;
