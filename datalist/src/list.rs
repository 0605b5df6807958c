use alloc::vec::Vec;

use crate::{Error, Slot};

/// Iterator over the slots of a [`VirtualizingList`].
pub type Slots<'a, T> = core::slice::Iter<'a, Slot<T>>;

/// A growable, randomly indexable sequence of [`Slot`]s.
///
/// Every index in `[0, len)` is addressable whether or not its value has been fetched. Growing
/// the list (via [`VirtualizingList::update_count`]) appends unfetched slots and leaves existing
/// slots untouched; shrinking discards the slots past the new end.
///
/// Value-based queries (`contains`, `index_of`, `remove`) only ever match fetched slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualizingList<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Default for VirtualizingList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> VirtualizingList<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Creates a list of `count` unfetched slots.
    pub fn with_count(count: usize) -> Self {
        let mut list = Self::new();
        list.update_count(count);
        list
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Resizes the list to exactly `count` slots.
    pub fn update_count(&mut self, count: usize) {
        dtrace!(from = self.slots.len(), to = count, "VirtualizingList::update_count");
        self.slots.resize_with(count, Slot::default);
    }

    pub fn slot(&self, index: usize) -> Result<&Slot<T>, Error> {
        self.slots.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.slots.len(),
        })
    }

    /// Returns the fetched value at `index`, or `None` if that slot has not been fetched.
    pub fn get(&self, index: usize) -> Result<Option<&T>, Error> {
        self.slot(index).map(Slot::value)
    }

    pub fn is_fetched(&self, index: usize) -> Result<bool, Error> {
        self.slot(index).map(Slot::is_fetched)
    }

    /// Stores `value` at `index`, marking the slot as fetched.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), Error> {
        self.replace(index, Slot::Fetched(value)).map(|_| ())
    }

    /// Swaps the slot at `index` for `slot`, returning the previous one.
    pub fn replace(&mut self, index: usize, slot: Slot<T>) -> Result<Slot<T>, Error> {
        let len = self.slots.len();
        let current = self
            .slots
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        Ok(core::mem::replace(current, slot))
    }

    pub fn push(&mut self, value: T) {
        self.slots.push(Slot::Fetched(value));
    }

    /// Inserts a fetched value at `index`. `index == len` appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), Error> {
        let len = self.slots.len();
        if index > len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        self.slots.insert(index, Slot::Fetched(value));
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Slot<T>, Error> {
        let len = self.slots.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        Ok(self.slots.remove(index))
    }

    /// Removes the first fetched slot equal to `item`. Returns `false` if there was none.
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        match self.index_of(item) {
            Some(index) => {
                self.slots.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(item).is_some()
    }

    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.slots.iter().position(|slot| slot.holds(item))
    }

    pub fn iter(&self) -> Slots<'_, T> {
        self.slots.iter()
    }

    /// Copies every value into `dest[offset..offset + len]`, substituting `placeholder` for
    /// unfetched slots.
    pub fn copy_to(&self, dest: &mut [T], offset: usize, placeholder: &T) -> Result<(), Error>
    where
        T: Clone,
    {
        let needed = offset.saturating_add(self.slots.len());
        let Some(target) = dest.get_mut(offset..needed) else {
            return Err(Error::DestinationTooSmall {
                needed,
                available: dest.len(),
            });
        };
        for (out, slot) in target.iter_mut().zip(&self.slots) {
            *out = slot.value_or(placeholder).clone();
        }
        Ok(())
    }
}

impl<'a, T> IntoIterator for &'a VirtualizingList<T> {
    type Item = &'a Slot<T>;
    type IntoIter = Slots<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for VirtualizingList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(Slot::Fetched).collect(),
        }
    }
}
