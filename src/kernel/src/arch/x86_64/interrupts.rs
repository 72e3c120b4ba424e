//! Interrupt Descriptor Table (IDT) and exception handlers for x86_64.

use crate::arch::x86_64::pic::{InterruptIndex, PicController, PICS};
use cgaterm_hal::InterruptController;
use lazy_static::lazy_static;
use x86_64::instructions::port::Port;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode};

/// PS/2 controller data port.
const KEYBOARD_DATA_PORT: u16 = 0x60;

lazy_static! {
    /// The Interrupt Descriptor Table (IDT).
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();
        idt.breakpoint.set_handler_fn(breakpoint_handler);
        idt.double_fault.set_handler_fn(double_fault_handler);
        idt.page_fault.set_handler_fn(page_fault_handler);
        idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);

        // Hardware interrupts
        idt[InterruptIndex::Timer.as_usize()]
            .set_handler_fn(timer_interrupt_handler);
        idt[InterruptIndex::Keyboard.as_usize()]
            .set_handler_fn(keyboard_interrupt_handler);

        idt
    };
}

/// Initializes the IDT and the PICs, then enables hardware interrupts.
pub fn init_idt() {
    IDT.load();
    // SAFETY: the PIC offsets do not overlap the exception vectors and the
    // IDT has handlers for every unmasked line.
    unsafe {
        PICS.lock().initialize();
    }
    PicController.enable();
}

/// Handler for the timer interrupt.
extern "x86-interrupt" fn timer_interrupt_handler(_stack_frame: InterruptStackFrame) {
    PicController.end_of_interrupt(InterruptIndex::Timer.as_u8());
}

/// Handler for the keyboard interrupt.
///
/// Runs the console's key handling for every key decoded so far.
extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
    let mut port = Port::new(KEYBOARD_DATA_PORT);
    // SAFETY: reading the PS/2 data port acknowledges the byte.
    let scancode: u8 = unsafe { port.read() };
    super::keyboard::add_scancode(scancode);

    super::console::console().interrupt(super::keyboard::pending_keys());

    PicController.end_of_interrupt(InterruptIndex::Keyboard.as_u8());
}

/// Handler for the breakpoint exception (INT3).
extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    log::info!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

/// Handler for the double fault exception.
extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    _error_code: u64,
) -> ! {
    panic!("EXCEPTION: DOUBLE FAULT\n{:#?}", stack_frame);
}

/// Handler for the page fault exception.
extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;

    panic!(
        "page fault at {:?} ({:?})\n{:#?}",
        Cr2::read(),
        error_code,
        stack_frame
    );
}

/// Handler for the general protection fault exception.
extern "x86-interrupt" fn general_protection_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    panic!(
        "general protection fault, error code {:#x}\n{:#?}",
        error_code, stack_frame
    );
}
