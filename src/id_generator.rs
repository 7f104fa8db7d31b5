use std::sync::atomic::{AtomicU64, Ordering};

// Single static counter for all masks created in this process.
static NEXT_MASK_ID: AtomicU64 = AtomicU64::new(1);

pub fn generate_id() -> u64 {
    NEXT_MASK_ID.fetch_add(1, Ordering::SeqCst)
}
