//! cgaterm Kernel Entry Point
//!
//! Boots, brings up the console and echoes every line typed on it.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod kernel {
    use bootloader::{entry_point, BootInfo};
    use cgaterm_kernel::arch::x86_64;
    use cgaterm_kernel::device::{Device, CONSOLE_MAJOR};
    use cgaterm_kernel::println;
    use core::panic::PanicInfo;

    entry_point!(kernel_main);

    /// Kernel entry point.
    ///
    /// Called by the bootloader after setting up the initial environment.
    fn kernel_main(_boot_info: &'static BootInfo) -> ! {
        cgaterm_kernel::init();
        println!("cgaterm console, Alt-C Alt-O Alt-L picks colors");

        let mut line = [0u8; 128];
        loop {
            let result = x86_64::with_console(|console| {
                let device = Device::open(CONSOLE_MAJOR, console)?;
                device.write(b"$ ")?;
                let n = device.read(&mut line)?;
                device.write(&line[..n])
            });

            match result {
                Ok(0) => log::info!("end of input"),
                Ok(n) => log::debug!("echoed {} bytes", n),
                Err(e) => log::warn!("console: {}", e),
            }
        }
    }

    /// This function is called on panic.
    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        x86_64::console::panic(info)
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
