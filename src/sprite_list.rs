// ============================================================================
// SPRITE LIST: z-ordered ids, index 0 is the front
// ============================================================================

use crate::sprite::SpriteId;

/// One of the four reorder menu commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderCommand {
    BringToFront,
    SendToBack,
    BringForwards,
    SendBackwards,
}

impl ReorderCommand {
    pub fn label(&self) -> &'static str {
        match self {
            ReorderCommand::BringToFront => "bring to front",
            ReorderCommand::SendToBack => "send to back",
            ReorderCommand::BringForwards => "bring forwards",
            ReorderCommand::SendBackwards => "send backwards",
        }
    }

    pub fn all() -> &'static [ReorderCommand] {
        &[
            ReorderCommand::BringToFront,
            ReorderCommand::SendToBack,
            ReorderCommand::BringForwards,
            ReorderCommand::SendBackwards,
        ]
    }
}

/// Paint order walks back to front, hit testing front to back, so the
/// sprite drawn on top is the one that gets hit.
#[derive(Clone, Debug, Default)]
pub struct SpriteList {
    ids: Vec<SpriteId>,
}

impl SpriteList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.ids.contains(&id)
    }

    pub fn index_of(&self, id: SpriteId) -> Option<usize> {
        self.ids.iter().position(|&i| i == id)
    }

    pub fn get(&self, index: usize) -> Option<SpriteId> {
        self.ids.get(index).copied()
    }

    /// Insert at the front, moving the id if it is already present.
    pub fn push_front(&mut self, id: SpriteId) {
        self.remove(id);
        self.ids.insert(0, id);
    }

    pub fn push_back(&mut self, id: SpriteId) {
        self.remove(id);
        self.ids.push(id);
    }

    pub fn remove(&mut self, id: SpriteId) -> bool {
        match self.index_of(id) {
            Some(i) => {
                self.ids.remove(i);
                true
            }
            None => false,
        }
    }

    /// Swap `old` for `new` in place.
    pub fn replace(&mut self, old: SpriteId, new: SpriteId) -> bool {
        if old == new {
            return self.contains(old);
        }
        if !self.contains(old) {
            return false;
        }
        self.remove(new);
        if let Some(i) = self.index_of(old) {
            self.ids[i] = new;
        }
        true
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn bring_to_front(&mut self, id: SpriteId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.push_front(id);
        true
    }

    pub fn send_to_back(&mut self, id: SpriteId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.push_back(id);
        true
    }

    /// Swap with the neighbour in front. No-op at index 0.
    pub fn bring_forwards(&mut self, id: SpriteId) -> bool {
        match self.index_of(id) {
            Some(0) => true,
            Some(i) => {
                self.ids.swap(i, i - 1);
                true
            }
            None => false,
        }
    }

    /// Swap with the neighbour behind. No-op at the back.
    pub fn send_backwards(&mut self, id: SpriteId) -> bool {
        match self.index_of(id) {
            Some(i) if i + 1 < self.ids.len() => {
                self.ids.swap(i, i + 1);
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn reorder(&mut self, cmd: ReorderCommand, id: SpriteId) -> bool {
        match cmd {
            ReorderCommand::BringToFront => self.bring_to_front(id),
            ReorderCommand::SendToBack => self.send_to_back(id),
            ReorderCommand::BringForwards => self.bring_forwards(id),
            ReorderCommand::SendBackwards => self.send_backwards(id),
        }
    }

    pub fn front_to_back(&self) -> impl DoubleEndedIterator<Item = SpriteId> + '_ {
        self.ids.iter().copied()
    }

    pub fn back_to_front(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.ids.iter().rev().copied()
    }

    pub fn as_slice(&self) -> &[SpriteId] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: usize) -> (SpriteList, Vec<SpriteId>) {
        let ids: Vec<SpriteId> = (0..n).map(|_| SpriteId::new()).collect();
        let mut l = SpriteList::new();
        for &id in &ids {
            l.push_back(id);
        }
        (l, ids)
    }

    #[test]
    fn push_front_moves_existing() {
        let (mut l, ids) = list(3);
        l.push_front(ids[2]);
        assert_eq!(l.as_slice(), &[ids[2], ids[0], ids[1]]);
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn forwards_and_backwards_swap_neighbours() {
        let (mut l, ids) = list(3);
        assert!(l.bring_forwards(ids[1]));
        assert_eq!(l.as_slice(), &[ids[1], ids[0], ids[2]]);
        assert!(l.send_backwards(ids[1]));
        assert!(l.send_backwards(ids[1]));
        assert_eq!(l.as_slice(), &[ids[0], ids[2], ids[1]]);
    }

    #[test]
    fn edges_are_noops() {
        let (mut l, ids) = list(3);
        assert!(l.bring_forwards(ids[0]));
        assert!(l.send_backwards(ids[2]));
        assert_eq!(l.as_slice(), &ids[..]);
    }

    #[test]
    fn front_and_back() {
        let (mut l, ids) = list(3);
        l.reorder(ReorderCommand::BringToFront, ids[2]);
        assert_eq!(l.get(0), Some(ids[2]));
        l.reorder(ReorderCommand::SendToBack, ids[2]);
        assert_eq!(l.as_slice(), &ids[..]);
    }

    #[test]
    fn unknown_id_is_reported() {
        let (mut l, ids) = list(2);
        let stranger = SpriteId::new();
        assert!(!l.remove(stranger));
        assert!(!l.reorder(ReorderCommand::BringForwards, stranger));
        assert!(!l.replace(stranger, ids[0]));
        assert_eq!(l.index_of(stranger), None);
        assert_eq!(l.as_slice(), &ids[..]);
    }

    #[test]
    fn replace_keeps_slot() {
        let (mut l, ids) = list(3);
        let fresh = SpriteId::new();
        assert!(l.replace(ids[1], fresh));
        assert_eq!(l.as_slice(), &[ids[0], fresh, ids[2]]);
    }

    #[test]
    fn iteration_directions() {
        let (l, ids) = list(3);
        let back: Vec<_> = l.back_to_front().collect();
        assert_eq!(back, vec![ids[2], ids[1], ids[0]]);
    }
}
