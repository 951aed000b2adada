use bumpalo::Bump;
use std::alloc::Layout;
use std::ptr::NonNull;

// Bump-pointer region owning every variable-length payload
// built during one evaluation session. Nothing is freed individually,
// everything goes away when the arena is dropped.
//
// Only plain data is ever placed in here (no Drop impls run on reset),
// and the arena is !Sync so a session can not be shared across threads.
#[derive(Default)]
pub struct Arena {
    bump: Bump
}

impl Arena {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self { bump: Bump::with_capacity(bytes) }
    }

    /// Raw allocation entry point for collaborators which keep their
    /// own payloads next to the values of a session.
    pub fn allocate(&self, layout: Layout) -> NonNull<u8> {
        self.bump.alloc_layout(layout)
    }

    /// Total bytes handed out by the underlying chunks so far.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Whether `ptr` points into memory owned by this arena.
    pub fn owns<T: ?Sized>(&self, ptr: *const T) -> bool {
        let addr = ptr as *const u8 as usize;
        // only chunk bounds are read, nothing is dereferenced
        unsafe { self.bump.iter_allocated_chunks_raw() }
            .any(|(start, len)| {
                let start = start as usize;
                addr >= start && addr < start + len
            })
    }

    pub(crate) fn alloc<T>(&self, value: T) -> &T {
        self.bump.alloc(value)
    }

    pub(crate) fn alloc_slice<T: Copy>(&self, src: &[T]) -> &[T] {
        self.bump.alloc_slice_copy(src)
    }
}
