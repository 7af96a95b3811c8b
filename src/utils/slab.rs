/// Slot storage with stable indices and free-slot reuse.
///
/// Used as the registry of unfinished tasks: a task keeps its slot index from
/// spawn until it completes or is discarded.
pub(crate) struct Slab<T> {
    items: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Slab<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, item: T) -> usize {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            self.items[index] = Some(item);
            return index;
        }

        self.items.push(Some(item));
        self.items.len() - 1
    }

    /// Removes the item at `index`, returning it if the slot was occupied.
    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        let item = self.items.get_mut(index)?.take()?;

        self.free.push(index);
        self.len -= 1;

        Some(item)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Removes every item, in slot order.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        let items: Vec<T> = self.items.drain(..).flatten().collect();

        self.free.clear();
        self.len = 0;

        items
    }
}
