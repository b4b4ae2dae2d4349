/// Something that can be recycled through a [`Pool`].
pub trait Poolable: Default {
    /// Return to the freshly-created state.
    fn reset(&mut self);
}

/// Explicitly owned free list.
///
/// Items are moved out by [`Pool::borrow`] and moved back in by [`Pool::give_back`], so at any
/// moment an item has exactly one owner. The pool grows by `grow_by` items whenever it runs dry.
#[derive(Debug)]
pub struct Pool<T: Poolable> {
    free: Vec<T>,
    grow_by: usize,
    created: usize,
    outstanding: usize,
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::with_capacity(100, 25)
    }
}

impl<T: Poolable> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(initial: usize, grow_by: usize) -> Self {
        let mut pool = Self {
            free: Vec::with_capacity(initial),
            grow_by: grow_by.max(1),
            created: 0,
            outstanding: 0,
        };
        pool.preallocate(initial);
        pool
    }

    pub fn preallocate(&mut self, count: usize) {
        self.free.reserve(count);
        for _ in 0..count {
            self.free.push(T::default());
        }
        self.created += count;
    }

    pub fn borrow(&mut self) -> T {
        if self.free.is_empty() {
            self.preallocate(self.grow_by);
        }
        self.outstanding += 1;
        self.free.pop().unwrap_or_default()
    }

    pub fn give_back(&mut self, mut item: T) {
        item.reset();
        self.free.push(item);
        self.outstanding = self.outstanding.saturating_sub(1);
    }

    pub fn give_back_all(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.give_back(item);
        }
    }

    /// Items ever allocated by this pool.
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Items borrowed and not yet given back.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Scratch {
        value: u32,
    }

    impl Poolable for Scratch {
        fn reset(&mut self) {
            self.value = 0;
        }
    }

    #[test]
    fn borrow_grows_when_empty() {
        let mut pool = Pool::<Scratch>::with_capacity(1, 4);
        let a = pool.borrow();
        let b = pool.borrow();
        assert_eq!(pool.created(), 5);
        assert_eq!(pool.outstanding(), 2);
        assert_eq!(pool.available(), 3);
        pool.give_back_all([a, b]);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.available(), 5);
    }

    #[test]
    fn given_back_items_are_reset() {
        let mut pool = Pool::<Scratch>::with_capacity(1, 1);
        let mut item = pool.borrow();
        item.value = 7;
        pool.give_back(item);
        assert_eq!(pool.borrow().value, 0);
        assert_eq!(pool.created(), 1);
    }
}
