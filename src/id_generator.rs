use std::sync::atomic::{AtomicUsize, Ordering};

// Single static counter for all editor images in this process
static NEXT_EDITOR_IMAGE_ID: AtomicUsize = AtomicUsize::new(1);

pub fn generate_id() -> usize {
    NEXT_EDITOR_IMAGE_ID.fetch_add(1, Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = generate_id();
        let b = generate_id();
        assert!(b > a);
    }
}
