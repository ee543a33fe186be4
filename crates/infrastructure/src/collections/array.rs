/// Contiguous sequence that doubles its capacity when full.
///
/// A ceiling turns it into a fixed arena: `push_back` fails instead of growing
/// once `ceiling` elements are in use.
#[derive(Debug, Clone)]
pub struct Array<T> {
    items: Vec<T>,
    ceiling: Option<usize>,
}

impl<T> Array<T> {
    pub fn with_capacity(initial: usize) -> Self {
        Self {
            items: Vec::with_capacity(initial.max(1)),
            ceiling: None,
        }
    }

    pub fn fixed(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            ceiling: Some(capacity),
        }
    }

    /// Appends and returns the new index, or `None` when a fixed arena is full.
    pub fn push_back(&mut self, item: T) -> Option<usize> {
        if let Some(ceiling) = self.ceiling {
            if self.items.len() >= ceiling {
                return None;
            }
        } else if self.items.len() == self.items.capacity() {
            let grow_by = self.items.capacity().max(1);
            self.items.reserve_exact(grow_by);
        }
        self.items.push(item);
        Some(self.items.len() - 1)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn pop_back(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.ceiling.unwrap_or(self.items.capacity())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self::with_capacity(4)
    }
}

/// Element placement for an array that grows from a fixed high boundary
/// toward lower offsets inside a byte region that must not move.
///
/// Element `i` occupies `[top - (i + 1) * element_size, top - i * element_size)`.
/// The low side is bounded by a cursor owned by whoever grows the region
/// upward; a push only succeeds while the two fronts stay apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownwardArray {
    pub top: usize,
    pub element_size: usize,
    pub used: usize,
}

impl DownwardArray {
    pub fn new(top: usize, element_size: usize, used: usize) -> Self {
        Self {
            top,
            element_size,
            used,
        }
    }

    #[inline]
    pub fn offset_of(&self, index: usize) -> usize {
        self.top - (index + 1) * self.element_size
    }

    /// Lowest byte in use, i.e. the high cursor of the region.
    pub fn low_edge(&self) -> usize {
        self.top - self.used * self.element_size
    }

    /// Reserves the next element if it would not reach below `low_cursor`.
    pub fn push(&mut self, low_cursor: usize) -> Option<usize> {
        let needed = (self.used + 1).checked_mul(self.element_size)?;
        let new_edge = self.top.checked_sub(needed)?;
        if low_cursor > new_edge {
            return None;
        }
        self.used += 1;
        Some(self.used - 1)
    }

    pub fn pop(&mut self) {
        self.used = self.used.saturating_sub(1);
    }
}
