//! cgaterm kernel console
//!
//! The console of a small x86 kernel: a line-editing keyboard input ring,
//! a text-mode renderer driving the CRT cursor registers, a color picker
//! overlay toggled by a key chord, and `printf`-style output with a
//! fail-stop panic path.
//!
//! # Architecture
//!
//! The kernel is structured into the following modules:
//! - `console`: the console core, generic over the HAL traits
//! - `device`: character device dispatch by major number
//! - `arch`: Platform-specific code (VGA, serial, keyboard, interrupts)
//!
//! # Safety
//!
//! Outside tests this is a `#![no_std]` kernel. All unsafe code is documented
//! with safety invariants explaining why the usage is correct.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_os = "none", feature(abi_x86_interrupt))]
#![warn(missing_docs)]

#[cfg(target_os = "none")]
extern crate alloc;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod allocator;
pub mod arch;
pub mod console;
pub mod device;

#[cfg(test)]
mod testutil;

/// Initializes core kernel subsystems.
///
/// Called early in the boot process to set up essential services.
pub fn init() {
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    arch::x86_64::init();
}
