//! Insertion-ordered partitioning of a batch by destination

use crate::core::{Address, AddressKey, Record};
use std::collections::HashMap;

/// Ordered association from [`Address`] to the items bound for it.
///
/// Iteration follows the order in which each address was first seen, and
/// items keep their insertion order within an address.
#[derive(Debug, Clone)]
pub struct Groups<T> {
    entries: Vec<(Address, Vec<T>)>,
    index: HashMap<Address, usize>,
}

impl<T> Default for Groups<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }
}

impl<T> Groups<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item to the group of `address`, creating the group if needed.
    pub fn push(&mut self, address: Address, item: T) {
        match self.index.get(&address) {
            Some(&i) => self.entries[i].1.push(item),
            None => {
                self.index.insert(address.clone(), self.entries.len());
                self.entries.push((address, vec![item]));
            }
        }
    }

    pub fn get(&self, address: &Address) -> Option<&[T]> {
        self.index.get(address).map(|&i| self.entries[i].1.as_slice())
    }

    /// Number of distinct addresses
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &[T])> {
        self.entries.iter().map(|(address, items)| (address, items.as_slice()))
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.entries.iter().map(|(address, _)| address)
    }

    /// Transform every group as a whole, keeping addresses and order.
    pub fn map<U, F>(self, mut f: F) -> Groups<U>
    where
        F: FnMut(&Address, Vec<T>) -> Vec<U>,
    {
        let entries = self
            .entries
            .into_iter()
            .map(|(address, items)| {
                let mapped = f(&address, items);
                (address, mapped)
            })
            .collect();
        Groups { entries, index: self.index }
    }
}

impl<T> IntoIterator for Groups<T> {
    type Item = (Address, Vec<T>);
    type IntoIter = std::vec::IntoIter<(Address, Vec<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Partition `records` by destination in a single pass.
pub fn group_records(records: &[Record], key: AddressKey) -> Groups<&Record> {
    let mut groups = Groups::new();
    for record in records {
        groups.push(Address::resolve(record, key), record);
    }
    groups
}
