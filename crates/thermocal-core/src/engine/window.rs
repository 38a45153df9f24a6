/// Fixed-capacity ring of free-energy samples.
///
/// Appending to a full window overwrites the oldest sample in place; iteration always runs
/// from the oldest to the newest sample.
#[derive(Debug, Clone)]
pub struct FreeEnergyWindow {
    samples: Vec<f64>,
    head: usize,
    len: usize,
}

impl FreeEnergyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            head: 0,
            len: 0,
        }
    }

    /// Window of `2m + 1` samples for a stencil of half-width `m`.
    pub fn for_half_width(half_width: usize) -> Self {
        Self::new(2 * half_width + 1)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Appends a sample and returns the one it displaced, if the window was full.
    pub fn push(&mut self, sample: f64) -> Option<f64> {
        let capacity = self.capacity();
        if capacity == 0 {
            return Some(sample);
        }
        if self.len < capacity {
            self.samples[(self.head + self.len) % capacity] = sample;
            self.len += 1;
            None
        } else {
            let dropped = std::mem::replace(&mut self.samples[self.head], sample);
            self.head = (self.head + 1) % capacity;
            Some(dropped)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let capacity = self.capacity();
        (0..self.len).map(move |offset| self.samples[(self.head + offset) % capacity])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_fills_before_dropping() {
        let mut window = FreeEnergyWindow::for_half_width(1);
        assert_eq!(window.push(1.0), None);
        assert_eq!(window.push(2.0), None);
        assert!(!window.is_full());
        assert_eq!(window.push(3.0), None);
        assert!(window.is_full());
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn full_window_drops_oldest_and_keeps_order() {
        let mut window = FreeEnergyWindow::new(3);
        for v in [1.0, 2.0, 3.0] {
            window.push(v);
        }
        assert_eq!(window.push(4.0), Some(1.0));
        assert_eq!(window.push(5.0), Some(2.0));
        assert_eq!(window.len(), 3);
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(window.push(6.0), Some(3.0));
        assert_eq!(window.push(7.0), Some(4.0));
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![5.0, 6.0, 7.0]);
    }
}
