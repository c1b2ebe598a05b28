use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Last-request-wins bookkeeping shared by every view.
///
/// Each load takes a ticket; its result may be applied only while that
/// ticket is still the newest and the view is still mounted.
#[derive(Debug, Default)]
pub struct Tickets {
    generation: AtomicU64,
    mounted: AtomicBool,
}

impl Tickets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self) {
        self.mounted.store(true, Ordering::SeqCst);
    }

    /// Also invalidates every ticket already handed out
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn issue(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.is_mounted() && self.generation.load(Ordering::SeqCst) == ticket
    }
}
