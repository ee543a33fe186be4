use std::cmp::Ordering;

#[derive(Debug, Clone)]
struct BstNode<T> {
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    live: bool,
    record: T,
}

/// Binary search tree whose links are indices into a node arena.
///
/// Equal records descend to the right. A two-child delete copies the
/// in-order successor into the deleted node and recycles the successor's
/// slot, so node indices survive field edits but not such deletes.
#[derive(Debug, Clone)]
pub struct IndexBst<T> {
    nodes: Vec<BstNode<T>>,
    free: Vec<usize>,
    root: Option<usize>,
    len: usize,
    cmp: fn(&T, &T) -> Ordering,
}

impl<T: Ord + Clone> IndexBst<T> {
    pub fn new() -> Self {
        Self::with_comparator(T::cmp)
    }
}

impl<T: Ord + Clone> Default for IndexBst<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> IndexBst<T> {
    pub fn with_comparator(cmp: fn(&T, &T) -> Ordering) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
            cmp,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, node: usize) -> Option<&T> {
        self.nodes
            .get(node)
            .filter(|n| n.live)
            .map(|n| &n.record)
    }

    pub fn insert(&mut self, record: T) -> usize {
        let mut parent = None;
        let mut go_left = false;
        let mut cursor = self.root;
        while let Some(current) = cursor {
            parent = Some(current);
            let node = &self.nodes[current];
            if (self.cmp)(&record, &node.record) == Ordering::Less {
                go_left = true;
                cursor = node.left;
            } else {
                go_left = false;
                cursor = node.right;
            }
        }

        let fresh = BstNode {
            parent,
            left: None,
            right: None,
            live: true,
            record,
        };
        let index = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = fresh;
                slot
            }
            None => {
                self.nodes.push(fresh);
                self.nodes.len() - 1
            }
        };

        match parent {
            None => self.root = Some(index),
            Some(p) if go_left => self.nodes[p].left = Some(index),
            Some(p) => self.nodes[p].right = Some(index),
        }
        self.len += 1;
        index
    }

    /// First node equal to `record`, searching from the root.
    pub fn search(&self, record: &T) -> Option<usize> {
        self.descend(record, self.root)
    }

    /// Next node equal to `record` after a previous match.
    pub fn search_from(&self, record: &T, previous: usize) -> Option<usize> {
        let start = self.nodes.get(previous).and_then(|n| n.right);
        self.descend(record, start)
    }

    fn descend(&self, record: &T, mut cursor: Option<usize>) -> Option<usize> {
        while let Some(current) = cursor {
            let node = &self.nodes[current];
            match (self.cmp)(record, &node.record) {
                Ordering::Less => cursor = node.left,
                Ordering::Greater => cursor = node.right,
                Ordering::Equal => return Some(current),
            }
        }
        None
    }

    pub fn contains(&self, record: &T) -> bool {
        self.search(record).is_some()
    }

    /// Leftmost node of the subtree at `from`, or of the whole tree.
    pub fn minimum(&self, from: Option<usize>) -> Option<usize> {
        let mut cursor = from.or(self.root)?;
        while let Some(left) = self.nodes[cursor].left {
            cursor = left;
        }
        Some(cursor)
    }

    pub fn successor(&self, node: usize) -> Option<usize> {
        if let Some(right) = self.nodes[node].right {
            return self.minimum(Some(right));
        }
        let mut child = node;
        let mut parent = self.nodes[node].parent;
        while let Some(p) = parent {
            if self.nodes[p].right != Some(child) {
                break;
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    /// Removes the record held at `node` and returns the slot that was recycled.
    pub fn delete(&mut self, node: usize) -> Option<usize> {
        if !self.nodes.get(node).is_some_and(|n| n.live) {
            return None;
        }

        let (left, right) = (self.nodes[node].left, self.nodes[node].right);
        if left.is_some() && right.is_some() {
            let successor = self.minimum(right)?;
            let record = self.nodes[successor].record.clone();
            self.nodes[node].record = record;
            return self.delete(successor);
        }

        let child = left.or(right);
        let parent = self.nodes[node].parent;
        if let Some(c) = child {
            self.nodes[c].parent = parent;
        }
        match parent {
            None => self.root = child,
            Some(p) => {
                if self.nodes[p].left == Some(node) {
                    self.nodes[p].left = child;
                } else {
                    self.nodes[p].right = child;
                }
            }
        }

        let freed = &mut self.nodes[node];
        freed.live = false;
        freed.parent = None;
        freed.left = None;
        freed.right = None;
        self.free.push(node);
        self.len -= 1;
        Some(node)
    }

    /// Records in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let mut cursor = self.minimum(None);
        std::iter::from_fn(move || {
            let current = cursor?;
            cursor = self.successor(current);
            Some(&self.nodes[current].record)
        })
    }
}
