use crate::model::Rect;

/// Pieces kept in ascending order of a scalar key, popped best-fit first.
///
/// Entries with equal keys keep their insertion order.
#[derive(Debug, Clone)]
pub struct SortedPool<I> {
    entries: Vec<Entry<I>>,
}

#[derive(Debug, Clone)]
struct Entry<I> {
    key: u32,
    id: I,
    rect: Rect,
}

impl<I> SortedPool<I> {
    /// Builds a pool from `pieces`, keyed by `key` (e.g. the height of a container-wide strip).
    pub fn new<T, F>(pieces: T, key: F) -> Self
    where
        T: IntoIterator<Item = (I, Rect)>,
        F: Fn(&Rect) -> u32,
    {
        let mut entries: Vec<Entry<I>> = pieces
            .into_iter()
            .map(|(id, rect)| Entry {
                key: key(&rect),
                id,
                rect,
            })
            .collect();
        // stable
        entries.sort_by_key(|e| e.key);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns the piece with the largest key `<= threshold`.
    ///
    /// Among equal keys the last inserted one is returned. `None` if every key exceeds
    /// `threshold`.
    pub fn pop_at_most(&mut self, threshold: u32) -> Option<(I, Rect)> {
        let idx = self.entries.partition_point(|e| e.key <= threshold);
        if idx == 0 {
            return None;
        }
        let e = self.entries.remove(idx - 1);
        Some((e.id, e.rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(id: &'static str, h: u32) -> (&'static str, Rect) {
        (id, Rect::new(0, 0, 100, h))
    }

    #[test]
    fn pops_largest_key_not_above_threshold() {
        let mut pool = SortedPool::new(
            vec![strip("a", 30), strip("b", 10), strip("c", 50), strip("d", 20)],
            |r| r.height,
        );
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.pop_at_most(45).map(|p| p.0), Some("a"));
        assert_eq!(pool.pop_at_most(50).map(|p| p.0), Some("c"));
        assert_eq!(pool.pop_at_most(9), None);
        assert_eq!(pool.pop_at_most(1000).map(|p| p.0), Some("d"));
        assert_eq!(pool.pop_at_most(10).map(|p| p.0), Some("b"));
        assert!(pool.is_empty());
        assert_eq!(pool.pop_at_most(u32::MAX), None);
    }

    #[test]
    fn equal_keys_pop_last_inserted_first() {
        let mut pool = SortedPool::new(
            vec![strip("x", 21), strip("y", 21), strip("z", 21)],
            |r| r.height,
        );
        assert_eq!(pool.pop_at_most(21).map(|p| p.0), Some("z"));
        assert_eq!(pool.pop_at_most(21).map(|p| p.0), Some("y"));
        assert_eq!(pool.pop_at_most(21).map(|p| p.0), Some("x"));
    }

    #[test]
    fn key_function_selects_axis() {
        let pieces = vec![("w", Rect::new(0, 0, 40, 5)), ("n", Rect::new(0, 0, 5, 40))];
        let mut by_width = SortedPool::new(pieces.clone(), |r| r.width);
        assert_eq!(by_width.pop_at_most(10).map(|p| p.0), Some("n"));
        let mut by_height = SortedPool::new(pieces, |r| r.height);
        assert_eq!(by_height.pop_at_most(10).map(|p| p.0), Some("w"));
    }
}
