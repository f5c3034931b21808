//! Dense slot storage with tombstones and slot recycling.

/// Index into a [`SlotArray`].
pub type Slot = usize;

/// Dense, index-addressable storage. Removal leaves a tombstone; the most recently
/// retired slot is handed out again by the next [`SlotArray::add`].
#[derive(Debug, Clone)]
pub struct SlotArray<T> {
    slots: Vec<Option<T>>,
    free: Vec<Slot>,
}

impl<T> Default for SlotArray<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> SlotArray<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: T) -> Slot {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(item);
                slot
            }
            None => {
                self.slots.push(Some(item));
                self.slots.len() - 1
            }
        }
    }

    /// Slot the next `add` will use.
    pub fn next_slot(&self) -> Slot {
        self.free.last().copied().unwrap_or(self.slots.len())
    }

    pub fn remove(&mut self, slot: Slot) -> Option<T> {
        let item = self.slots.get_mut(slot)?.take()?;
        self.free.push(slot);
        Some(item)
    }

    pub fn get(&self, slot: Slot) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut T> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    pub fn is_live(&self, slot: Slot) -> bool {
        self.get(slot).is_some()
    }

    /// Capacity including tombstones, not the live count.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live_count() == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, item)| item.as_ref().map(|item| (slot, item)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Slot, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, item)| item.as_mut().map(|item| (slot, item)))
    }
}
