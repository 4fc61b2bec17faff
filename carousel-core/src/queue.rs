//! Circular doubly-linked rotation queue backed by an index arena.
//!
//! Nodes live in a slot vector and link to each other by slot index, so
//! relinking on insert and removal is index rewiring. Freed slots are
//! recycled. Every operation except [`RotationQueue::iter`] is O(1).
//!
//! ```text
//!            current
//!               v
//!   ... <-> [ A ] <-> [ B ] <-> [ C ] <-> (back to A)
//!                                  ^
//!                     add() links new nodes here, before `current`
//! ```

/// Handle to a node inserted with [`RotationQueue::add`].
///
/// Valid until that node is removed; slots are reused afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    prev: usize,
    next: usize,
}

/// Circular queue of values rotated in insertion order.
///
/// Empty-queue reads return `None`; an idle CPU is an ordinary state.
///
/// # Examples
///
/// ```
/// use carousel_core::RotationQueue;
///
/// let mut queue = RotationQueue::new();
/// queue.add("P1");
/// queue.add("P2");
///
/// assert_eq!(queue.advance(), Some(&"P1"));
/// assert_eq!(queue.peek_current(), Some(&"P2"));
/// assert_eq!(queue.remove_current(), Some("P2"));
/// assert_eq!(queue.iter().collect::<Vec<_>>(), vec![&"P1"]);
/// ```
#[derive(Debug, Clone)]
pub struct RotationQueue<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    current: Option<usize>,
    len: usize,
}

impl<T> Default for RotationQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RotationQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            current: None,
            len: 0,
        }
    }

    /// Number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no node is linked.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Link `value` as the new tail, immediately before `current`.
    ///
    /// The first node becomes `current` and links to itself. Otherwise
    /// `current` is left untouched.
    pub fn add(&mut self, value: T) -> NodeHandle {
        let idx = match self.free.pop() {
            Some(idx) => idx,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };

        match self.current {
            None => {
                self.slots[idx] = Some(Node {
                    value,
                    prev: idx,
                    next: idx,
                });
                self.current = Some(idx);
            }
            Some(cur) => {
                let tail = self.node(cur).prev;
                self.slots[idx] = Some(Node {
                    value,
                    prev: tail,
                    next: cur,
                });
                self.node_mut(tail).next = idx;
                self.node_mut(cur).prev = idx;
            }
        }

        self.len += 1;
        NodeHandle(idx)
    }

    /// Return the value at `current` and rotate `current` to the next node.
    pub fn advance(&mut self) -> Option<&T> {
        let cur = self.current?;
        self.current = Some(self.node(cur).next);
        Some(&self.node(cur).value)
    }

    /// Unlink the node at `current`; its successor becomes `current`.
    ///
    /// # Panics
    ///
    /// Panics if `current` or one of its links refers to a freed slot. Every
    /// insert and removal keeps the cycle closed over live slots, so this
    /// only happens if that invariant is broken.
    pub fn remove_current(&mut self) -> Option<T> {
        let cur = self.current?;
        let node = self.slots[cur]
            .take()
            .expect("current node should be live");
        self.free.push(cur);
        self.len -= 1;

        if self.len == 0 {
            self.current = None;
        } else {
            self.node_mut(node.prev).next = node.next;
            self.node_mut(node.next).prev = node.prev;
            self.current = Some(node.next);
        }

        Some(node.value)
    }

    /// The value that would be dispatched next.
    pub fn peek_current(&self) -> Option<&T> {
        self.current.map(|cur| &self.node(cur).value)
    }

    /// Handle of the node at `current`.
    pub fn current_handle(&self) -> Option<NodeHandle> {
        self.current.map(NodeHandle)
    }

    /// Look up a live node by handle.
    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        self.slots
            .get(handle.0)
            .and_then(Option::as_ref)
            .map(|node| &node.value)
    }

    /// Walk the cycle once, starting at `current`, in rotation order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            queue: self,
            next: self.current,
            remaining: self.len,
        }
    }

    fn node(&self, idx: usize) -> &Node<T> {
        self.slots[idx]
            .as_ref()
            .expect("linked node should be live")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        self.slots[idx]
            .as_mut()
            .expect("linked node should be live")
    }
}

/// Iterator over a [`RotationQueue`] in rotation order.
#[derive(Debug)]
pub struct Iter<'a, T> {
    queue: &'a RotationQueue<T>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let queue = self.queue;
        let node = queue.node(self.next?);
        self.next = Some(node.next);
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a RotationQueue<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
