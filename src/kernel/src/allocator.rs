//! Kernel heap allocation.
//!
//! The heap is a static array, so it needs no paging setup. Only the
//! scancode queue allocates.

use core::ptr::addr_of_mut;

use linked_list_allocator::LockedHeap;

/// The size of the kernel heap.
pub const HEAP_SIZE: usize = 16 * 1024; // 16 KiB

static mut HEAP_SPACE: [u8; HEAP_SIZE] = [0; HEAP_SIZE];

#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Initialize the kernel heap. Call once, before the first allocation.
pub fn init_heap() {
    // SAFETY: HEAP_SPACE is used by nothing but the allocator, and this runs
    // once during boot before any allocation.
    unsafe {
        ALLOCATOR
            .lock()
            .init(addr_of_mut!(HEAP_SPACE).cast::<u8>(), HEAP_SIZE);
    }
}
