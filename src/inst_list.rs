use std::ops::Index;

use log::debug;

use crate::instance::Instance;
use crate::{CMPIError, CMPIResult};

/// Capacity is grown by this many slots whenever the list is full.
pub const INST_LIST_GROWTH: usize = 10;

/// An append-only list of instances, built up while serving one request.
///
/// The list owns the instances added to it and hands them on when it is
/// returned to a [`ResultSink`](crate::broker::ResultSink). Capacity grows by a fixed
/// [`INST_LIST_GROWTH`] slots rather than doubling.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InstList {
    list: Vec<Instance>,
}

impl InstList {
    pub fn new() -> Self {
        InstList { list: Vec::new() }
    }

    /// Reset to the empty state with no backing storage.
    pub fn init(&mut self) {
        *self = InstList::new();
    }

    /// Append `inst`.
    ///
    /// If growing the storage fails the list is left unchanged and the
    /// instance is handed back to the caller.
    pub fn try_add(&mut self, inst: Instance) -> Result<(), Instance> {
        if self.list.len() == self.list.capacity() {
            if let Err(e) = self.list.try_reserve_exact(INST_LIST_GROWTH) {
                debug!("Failed to grow instance list past {}: {}", self.list.len(), e);
                return Err(inst);
            }
        }

        self.list.push(inst);

        Ok(())
    }

    /// Append `inst`, reporting [`CMPIError::OutOfMemory`] if the list can't grow.
    pub fn add(&mut self, inst: Instance) -> CMPIResult<()> {
        self.try_add(inst).map_err(|_| CMPIError::OutOfMemory)
    }

    /// Drop every instance and release the backing storage.
    pub fn free(&mut self) {
        self.list = Vec::new();
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn capacity(&self) -> usize {
        self.list.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.list.get(index)
    }

    pub fn last(&self) -> Option<&Instance> {
        self.list.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.list.iter()
    }

    pub fn into_vec(self) -> Vec<Instance> {
        self.list
    }
}

impl Index<usize> for InstList {
    type Output = Instance;

    fn index(&self, index: usize) -> &Instance {
        &self.list[index]
    }
}

impl IntoIterator for InstList {
    type Item = Instance;
    type IntoIter = std::vec::IntoIter<Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.into_iter()
    }
}

impl<'a> IntoIterator for &'a InstList {
    type Item = &'a Instance;
    type IntoIter = std::slice::Iter<'a, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_path::ObjectPath;

    fn inst(id: u32) -> Instance {
        Instance::new(&ObjectPath::new("root/test", "Foo").with_key("Id", id))
    }

    #[test]
    fn it_starts_empty() {
        let list = InstList::new();

        assert_eq!(list.len(), 0);
        assert_eq!(list.capacity(), 0);
        assert!(list.get(0).is_none());
    }

    #[test]
    fn it_reads_back_the_last_added() {
        let mut list = InstList::new();

        for id in 0..25 {
            list.add(inst(id)).unwrap();

            assert_eq!(list.len(), id as usize + 1);
            assert_eq!(list[list.len() - 1], inst(id));
            assert!(list.len() <= list.capacity());
        }
    }

    #[test]
    fn it_grows_by_a_fixed_step() {
        let mut list = InstList::new();

        list.add(inst(0)).unwrap();
        assert_eq!(list.capacity(), INST_LIST_GROWTH);

        for id in 1..=INST_LIST_GROWTH as u32 {
            list.add(inst(id)).unwrap();
        }

        assert_eq!(list.capacity(), 2 * INST_LIST_GROWTH);
        let ids: Vec<_> = list
            .iter()
            .map(|i| i.get_property("Id").cloned())
            .collect();
        let expected: Vec<_> = (0..=INST_LIST_GROWTH as u32)
            .map(|id| Some(id.into()))
            .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn it_is_reusable_after_free() {
        let mut list = InstList::new();
        list.add(inst(1)).unwrap();
        list.add(inst(2)).unwrap();

        list.free();
        assert_eq!(list.len(), 0);
        assert_eq!(list.capacity(), 0);

        list.init();
        list.add(inst(3)).unwrap();

        let mut fresh = InstList::new();
        fresh.add(inst(3)).unwrap();

        assert_eq!(list, fresh);
        assert_eq!(list.capacity(), fresh.capacity());
    }
}
