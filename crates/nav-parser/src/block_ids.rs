use rustc_hash::FxHashMap;

/// Hands out document-unique block ids.
///
/// A user id maps to `block_<seq>_<id>` the first time it is seen and to the
/// same string afterwards, whether it came from a fence or a tab row. Blocks
/// without an id get `block_<seq>_generated`, fresh every time.
#[derive(Debug, Default)]
pub(crate) struct BlockIdAllocator {
    by_user_id: FxHashMap<String, String>,
}

impl BlockIdAllocator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resolve `user_id`, drawing from `counter` only for a fresh allocation.
    pub(crate) fn upsert(&mut self, user_id: Option<&str>, counter: &mut u64) -> String {
        let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
            return format!("block_{}_generated", take(counter));
        };

        if let Some(existing) = self.by_user_id.get(user_id) {
            return existing.clone();
        }

        let generated = format!("block_{}_{user_id}", take(counter));
        self.by_user_id
            .insert(user_id.to_string(), generated.clone());
        generated
    }

    pub(crate) fn len(&self) -> usize {
        self.by_user_id.len()
    }
}

fn take(counter: &mut u64) -> u64 {
    let value = *counter;
    *counter = counter.saturating_add(1);
    value
}

#[cfg(test)]
mod tests {
    use super::BlockIdAllocator;

    #[test]
    fn same_user_id_resolves_to_same_block_id() {
        let mut ids = BlockIdAllocator::new();
        let mut counter = 100;
        let first = ids.upsert(Some("notes"), &mut counter);
        let second = ids.upsert(Some("notes"), &mut counter);
        assert_eq!(first, "block_100_notes");
        assert_eq!(first, second);
        assert_eq!(counter, 101);
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn omitted_ids_are_never_reused() {
        let mut ids = BlockIdAllocator::new();
        let mut counter = 7;
        let first = ids.upsert(None, &mut counter);
        let second = ids.upsert(Some(""), &mut counter);
        assert_eq!(first, "block_7_generated");
        assert_eq!(second, "block_8_generated");
        assert_eq!(counter, 9);
        assert_eq!(ids.len(), 0);
    }
}
