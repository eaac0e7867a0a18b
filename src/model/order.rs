use super::ClientKey;

/// An ordered list of client handles. Used for both the tiling order and the
/// focus order; the front is the newest (or most recently focused) entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClientOrder(Vec<ClientKey>);

impl ClientOrder {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn contains(&self, key: ClientKey) -> bool { self.0.contains(&key) }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = ClientKey> + '_ { self.0.iter().copied() }

    pub fn front(&self) -> Option<ClientKey> { self.0.first().copied() }

    /// Inserts `key` at the front, dropping any earlier occurrence.
    pub fn push_front(&mut self, key: ClientKey) {
        self.remove(key);
        self.0.insert(0, key);
    }

    pub fn push_back(&mut self, key: ClientKey) {
        self.remove(key);
        self.0.push(key);
    }

    pub fn remove(&mut self, key: ClientKey) -> bool {
        match self.0.iter().position(|&k| k == key) {
            Some(pos) => {
                self.0.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Moves an existing entry to the front. Returns false if absent.
    pub fn move_to_front(&mut self, key: ClientKey) -> bool {
        if !self.remove(key) {
            return false;
        }
        self.0.insert(0, key);
        true
    }

    pub fn position(&self, key: ClientKey) -> Option<usize> { self.0.iter().position(|&k| k == key) }

    pub fn find(&self, mut pred: impl FnMut(ClientKey) -> bool) -> Option<ClientKey> {
        self.iter().find(|&k| pred(k))
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn keys(n: usize) -> Vec<ClientKey> {
        let mut map: SlotMap<ClientKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn push_front_keeps_entries_unique() {
        let k = keys(3);
        let mut order = ClientOrder::new();
        order.push_front(k[0]);
        order.push_front(k[1]);
        order.push_front(k[0]);
        assert_eq!(order.iter().collect::<Vec<_>>(), vec![k[0], k[1]]);
    }

    #[test]
    fn move_to_front_requires_membership() {
        let k = keys(3);
        let mut order = ClientOrder::new();
        order.push_front(k[0]);
        order.push_front(k[1]);
        assert!(order.move_to_front(k[0]));
        assert_eq!(order.front(), Some(k[0]));
        assert!(!order.move_to_front(k[2]));
        assert!(!order.contains(k[2]));
    }

    #[test]
    fn remove_drops_the_link() {
        let k = keys(2);
        let mut order = ClientOrder::new();
        order.push_front(k[0]);
        order.push_front(k[1]);
        assert!(order.remove(k[1]));
        assert!(!order.remove(k[1]));
        assert_eq!(order.len(), 1);
        assert_eq!(order.find(|key| key == k[0]), Some(k[0]));
    }
}
