use std::collections::VecDeque;

/// Fixed-length history; adding past the limit evicts the oldest value.
#[derive(Debug, Clone)]
pub struct CircBuffer<T> {
    storage: VecDeque<T>,
    max_length: usize,
}

impl<T> CircBuffer<T> {
    pub fn new(max_length: usize) -> Self {
        let max_length = max_length.max(1);
        let storage = VecDeque::with_capacity(max_length);
        Self {
            storage,
            max_length,
        }
    }

    pub fn add(&mut self, value: T) -> Option<T> {
        let evicted = if self.storage.len() == self.max_length {
            self.storage.pop_front()
        } else {
            None
        };
        self.storage.push_back(value);
        evicted
    }

    pub fn latest(&self) -> Option<&T> {
        self.storage.back()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.storage.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::CircBuffer;

    #[test]
    fn evicts_oldest() {
        let mut buf = CircBuffer::new(3);
        assert_eq!(buf.add(1), None);
        assert_eq!(buf.add(2), None);
        assert_eq!(buf.add(3), None);
        assert_eq!(buf.add(4), Some(1));
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), [2, 3, 4]);
        assert_eq!(buf.latest(), Some(&4));
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn zero_length_holds_one() {
        let mut buf = CircBuffer::new(0);
        buf.add('a');
        assert_eq!(buf.add('b'), Some('a'));
        assert_eq!(buf.len(), 1);
    }
}
