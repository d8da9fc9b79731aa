use std::iter::FusedIterator;

const GROWTH_FACTOR: usize = 2;

/// A growable FIFO queue over a wrap-around buffer of optional slots.
///
/// The buffer doubles when full and halves once the queue drops below a
/// quarter of its capacity, but never below the capacity it was created with.
pub struct CircularQueue<T> {
    storage: Box<[Option<T>]>,
    count: usize,
    write_cursor: usize,
    initial_capacity: usize,
}

impl<T> Default for CircularQueue<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T> CircularQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: Self::allocate(capacity),
            count: 0,
            write_cursor: 0,
            initial_capacity: capacity,
        }
    }

    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub const fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Returns the oldest element.
    ///
    /// # Panics
    /// if the queue is empty. Check [`Self::is_empty`] first.
    pub fn peek(&self) -> &T {
        assert!(!self.is_empty(), "peek on an empty queue");
        self.storage[self.read_cursor()]
            .as_ref()
            .expect("read cursor to point at an occupied slot")
    }

    pub fn enqueue(&mut self, value: T) {
        if self.count == self.capacity() {
            let capacity = std::cmp::max(self.capacity(), 1) * GROWTH_FACTOR;
            self.resize(capacity);
        }

        self.storage[self.write_cursor] = Some(value);
        self.write_cursor = (self.write_cursor + 1) % self.capacity();
        self.count += 1;
    }

    pub fn dequeue(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let value = self.storage[self.read_cursor()].take();
        self.count -= 1;

        // shrinking at a quarter (not half) keeps a push/pop pair at the
        // boundary from resizing on every call
        let threshold = self.capacity() / (GROWTH_FACTOR * GROWTH_FACTOR);
        if self.count < threshold && threshold >= self.initial_capacity {
            self.resize(self.capacity() / GROWTH_FACTOR);
        }

        debug_assert!(value.is_some(), "dequeued an empty slot");
        value
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            storage: &self.storage,
            index: self.read_cursor(),
            remaining: self.count,
        }
    }

    fn read_cursor(&self) -> usize {
        match self.capacity() {
            0 => 0,
            capacity => (self.write_cursor + capacity - self.count) % capacity,
        }
    }

    fn resize(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.count);

        let read = self.read_cursor();
        let mut storage = Self::allocate(capacity);
        let old = self.capacity();
        for (i, slot) in storage.iter_mut().take(self.count).enumerate() {
            *slot = self.storage[(read + i) % old].take();
        }

        log::trace!(
            "resized from {old} to {capacity} slots ({count} queued)",
            count = self.count
        );

        self.storage = storage;
        self.write_cursor = self.count % capacity;
    }

    fn allocate(capacity: usize) -> Box<[Option<T>]> {
        std::iter::repeat_with(|| None).take(capacity).collect()
    }
}

impl<T> std::fmt::Debug for CircularQueue<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for CircularQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.enqueue(item)
        }
    }
}

impl<T> FromIterator<T> for CircularQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Self::default();
        queue.extend(iter);
        queue
    }
}

impl<T> IntoIterator for CircularQueue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { queue: self }
    }
}

impl<'a, T> IntoIterator for &'a CircularQueue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a [`CircularQueue`], oldest to newest.
pub struct Iter<'a, T> {
    storage: &'a [Option<T>],
    index: usize,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn slot(&self, offset: usize) -> &'a T {
        let storage = self.storage;
        storage[(self.index + offset) % storage.len()]
            .as_ref()
            .expect("logical window to only hold occupied slots")
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let item = self.slot(0);
        self.index = (self.index + 1) % self.storage.len();
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;
        Some(self.slot(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
impl<'a, T> FusedIterator for Iter<'a, T> {}

/// Owning iterator that dequeues until the queue is empty.
pub struct IntoIter<T> {
    queue: CircularQueue<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.dequeue()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}
