use std::collections::VecDeque;

/// Growable byte queue used by the request parser
pub struct Buffer {
    data: VecDeque<u8>,
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            data: VecDeque::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.data.extend(bytes.iter().copied());
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Remove and return up to `n` bytes from the front
    pub fn drain(&mut self, n: usize) -> Vec<u8> {
        self.data.drain(..n.min(self.data.len())).collect()
    }

    /// Discard up to `n` bytes from the front, returning how many were dropped
    pub fn skip(&mut self, n: usize) -> usize {
        let n = n.min(self.data.len());
        self.data.drain(..n);
        n
    }

    pub fn find(&self, pattern: &[u8]) -> Option<usize> {
        if pattern.is_empty() || pattern.len() > self.data.len() {
            return None;
        }

        (0..=self.data.len() - pattern.len())
            .find(|&i| self.data.range(i..i + pattern.len()).eq(pattern.iter()))
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}
