//! Recency List Module
//!
//! Slab-backed doubly linked list ordering entries by recency of use.

// == Node Handle ==
/// Position handle of a node in a [`RecencyList`].
///
/// Handles stay valid until the node is removed; a freed slot may be reused
/// by a later insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// - Front (head) = most recently used
/// - Back (tail) = least recently used
///
/// Insert at front, move to front, remove by handle and peek at back are
/// all O(1).
#[derive(Debug)]
pub(crate) struct RecencyList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a value as the most recently used node.
    pub(crate) fn push_front(&mut self, value: T) -> NodeId {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.link_front(idx);
        self.len += 1;
        NodeId(idx)
    }

    // == Move To Front ==
    /// Marks a node as most recently used. Unknown handles are ignored.
    pub(crate) fn move_to_front(&mut self, id: NodeId) {
        if self.node(id.0).is_none() || self.head == Some(id.0) {
            return;
        }
        self.unlink(id.0);
        self.link_front(id.0);
    }

    // == Remove ==
    /// Detaches a node and returns its value.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<T> {
        self.node(id.0)?;
        self.unlink(id.0);
        let node = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.value)
    }

    // == Peek ==
    /// Handle of the least recently used node.
    pub(crate) fn back(&self) -> Option<NodeId> {
        self.tail.map(NodeId)
    }

    /// Handle of the next more recently used node.
    pub(crate) fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.node(id.0)?.prev.map(NodeId)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&T> {
        self.node(id.0).map(|node| &node.value)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .map(|node| &mut node.value)
    }

    // == Length ==
    /// Returns the number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Iterates from most to least recently used.
    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.node(cursor?)?;
            cursor = node.next;
            Some(&node.value)
        })
    }

    // == Internal Linking ==
    fn node(&self, idx: usize) -> Option<&Node<T>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head.and_then(|h| self.node_mut(h)) {
            Some(head) => head.prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return,
        };
        match prev.and_then(|p| self.node_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn order(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<u32> = RecencyList::new();
        assert_eq!(list.len(), 0);
        assert_eq!(list.back(), None);
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn test_push_front_orders_by_recency() {
        let mut list = RecencyList::new();

        list.push_front("key1");
        list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.len(), 3);
        assert_eq!(order(&list), vec!["key3", "key2", "key1"]);
        assert_eq!(list.get(list.back().unwrap()), Some(&"key1"));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        list.move_to_front(a);

        assert_eq!(order(&list), vec!["a", "c", "b"]);
        assert_eq!(list.get(list.back().unwrap()), Some(&"b"));
    }

    #[test]
    fn test_move_tail_and_head() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        let b = list.push_front("b");

        list.move_to_front(b);
        assert_eq!(order(&list), vec!["b", "a"]);

        list.move_to_front(a);
        assert_eq!(order(&list), vec!["a", "b"]);
        assert_eq!(list.back(), Some(b));
    }

    #[test]
    fn test_remove_from_middle() {
        let mut list = RecencyList::new();

        list.push_front("key1");
        let key2 = list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.remove(key2), Some("key2"));

        assert_eq!(list.len(), 2);
        assert_eq!(order(&list), vec!["key3", "key1"]);
    }

    #[test]
    fn test_remove_last_node_empties_list() {
        let mut list = RecencyList::new();

        let only = list.push_front("only");
        list.remove(only);

        assert_eq!(list.len(), 0);
        assert_eq!(list.back(), None);
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn test_remove_twice_is_none() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        assert_eq!(list.remove(a), Some("a"));
        assert_eq!(list.remove(a), None);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_freed_slot_is_reused() {
        let mut list = RecencyList::new();

        let a = list.push_front("a");
        list.push_front("b");
        list.remove(a);
        let c = list.push_front("c");

        assert_eq!(a, c);
        assert_eq!(order(&list), vec!["c", "b"]);
    }

    #[test]
    fn test_walk_back_to_front() {
        let mut list = RecencyList::new();

        list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        let mut seen = Vec::new();
        let mut cursor = list.back();
        while let Some(id) = cursor {
            seen.push(*list.get(id).unwrap());
            cursor = list.prev(id);
        }

        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_get_mut() {
        let mut list = RecencyList::new();

        let id = list.push_front(1);
        *list.get_mut(id).unwrap() += 41;

        assert_eq!(list.get(id), Some(&42));
    }
}
