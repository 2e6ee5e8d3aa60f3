use std::sync::atomic::{AtomicUsize, Ordering};

// Shared by every drawable kind; clones keep the id they were created with
static NEXT_DRAWABLE_ID: AtomicUsize = AtomicUsize::new(1);

pub fn generate_id() -> usize {
    NEXT_DRAWABLE_ID.fetch_add(1, Ordering::SeqCst)
}
