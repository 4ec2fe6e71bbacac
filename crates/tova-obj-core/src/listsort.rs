//! The list sort entry point.
//!
//! The buffer is detached from the live list for the whole sort: any
//! callback (key function, comparator) that reaches back into the list sees
//! an empty, consistent container instead of a half-sorted buffer. After
//! sorting, the buffer is swapped back in; anything a callback grew into
//! the live list in the meantime is released and reported as a
//! mutation-during-sort error — always after consistency has been restored,
//! never instead of it.

use crate::compare::{key_lt, select_comparator};
use crate::error::{ObjError, ObjResult};
use crate::heap::{Heap, HeapData, HeapId};
use crate::value::Value;

/// Caller-supplied less-than over two values. Receives the heap mutably, so
/// it can allocate and even mutate the list being sorted (which it will
/// observe as empty).
pub type CompareFn<'a> = &'a mut dyn FnMut(&mut Heap, Value, Value) -> ObjResult<bool>;

/// Caller-supplied key extraction: borrows an element, returns an owned key.
pub type KeyFn<'a> = &'a mut dyn FnMut(&mut Heap, Value) -> ObjResult<Value>;

/// Options for [`Heap::list_sort`]. With a key function, comparisons (the
/// selected fast path or `cmp`) apply to the extracted keys.
#[derive(Default)]
pub struct SortSpec<'a> {
    pub key: Option<KeyFn<'a>>,
    pub cmp: Option<CompareFn<'a>>,
    pub reverse: bool,
}

/// Key and payload move in lockstep through the merge machinery.
#[derive(Clone, Copy)]
struct SortPair {
    key: Value,
    value: Value,
}

impl Heap {
    /// Stable in-place sort, ascending by default. `reverse` reverses the
    /// buffer, sorts ascending, and reverses again, so one stable sort
    /// serves both directions and equal keys keep their original order
    /// either way.
    ///
    /// On comparator failure the list is reattached holding some
    /// permutation of its elements — nothing leaked, nothing duplicated —
    /// and the error propagates.
    pub fn list_sort(&mut self, list: Value, spec: SortSpec<'_>) -> ObjResult<()> {
        let (id, mut l) = self.take_list(list)?;
        let mut detached = std::mem::take(&mut l.items);
        let prev_lock = l.sorting;
        l.sorting = true;
        self.put_list(id, l);
        // Hold the list alive for the whole call, whatever the callbacks
        // release.
        self.retain(list);

        let sorted = self.sort_detached(&mut detached, spec);
        let reattached = self.reattach(id, detached, prev_lock);
        self.release(list);
        sorted.and(reattached)
    }

    fn sort_detached(&mut self, items: &mut Vec<Value>, spec: SortSpec<'_>) -> ObjResult<()> {
        let SortSpec { key, cmp, reverse } = spec;
        match key {
            None => self.sort_values(items, cmp, reverse),
            Some(keyf) => self.sort_pairs(items, keyf, cmp, reverse),
        }
    }

    fn sort_values(
        &mut self,
        items: &mut [Value],
        cmp: Option<CompareFn<'_>>,
        reverse: bool,
    ) -> ObjResult<()> {
        if items.len() < 2 {
            return Ok(());
        }
        if reverse {
            items.reverse();
        }
        let result = match cmp {
            Some(cmp) => {
                let mut lt = |a: &Value, b: &Value| cmp(self, *a, *b);
                tova_sort::sort_stable(items, &mut lt)
            }
            None => {
                let kind = select_comparator(self, items);
                let heap = &*self;
                let mut lt = |a: &Value, b: &Value| key_lt(heap, &kind, *a, *b);
                tova_sort::sort_stable(items, &mut lt)
            }
        };
        // Un-reverse on the error path too: the buffer must go back in a
        // sensible orientation regardless.
        if reverse {
            items.reverse();
        }
        result
    }

    fn sort_pairs(
        &mut self,
        items: &mut [Value],
        keyf: KeyFn<'_>,
        cmp: Option<CompareFn<'_>>,
        reverse: bool,
    ) -> ObjResult<()> {
        // One key per element, extracted before anything is compared. On
        // failure the keys built so far are released and nothing has moved.
        let mut keys: Vec<Value> = Vec::with_capacity(items.len());
        for &v in items.iter() {
            match keyf(self, v) {
                Ok(k) => keys.push(k),
                Err(e) => {
                    for k in keys {
                        self.release(k);
                    }
                    return Err(e);
                }
            }
        }

        let result = if items.len() < 2 {
            Ok(())
        } else {
            let mut pairs: Vec<SortPair> = items
                .iter()
                .zip(&keys)
                .map(|(&value, &key)| SortPair { key, value })
                .collect();
            if reverse {
                pairs.reverse();
            }
            let sorted = match cmp {
                Some(cmp) => {
                    let mut lt = |a: &SortPair, b: &SortPair| cmp(self, a.key, b.key);
                    tova_sort::sort_stable(&mut pairs, &mut lt)
                }
                None => {
                    let kind = select_comparator(self, &keys);
                    let heap = &*self;
                    let mut lt = |a: &SortPair, b: &SortPair| key_lt(heap, &kind, a.key, b.key);
                    tova_sort::sort_stable(&mut pairs, &mut lt)
                }
            };
            if reverse {
                pairs.reverse();
            }
            for (slot, pair) in items.iter_mut().zip(&pairs) {
                *slot = pair.value;
            }
            sorted
        };

        // Key objects are released whatever happened above.
        for k in keys {
            self.release(k);
        }
        result
    }

    /// Swaps the sorted buffer back into the list and restores the lock
    /// state. Elements a callback grew into the live list during the sort
    /// are released, and their presence (or a broken lock) is reported as a
    /// mutation — after the list is already consistent again.
    fn reattach(&mut self, id: HeapId, items: Vec<Value>, prev_lock: bool) -> ObjResult<()> {
        let (intruders, lock_intact) = {
            let l = match self.data_mut(id) {
                HeapData::List(l) => l,
                _ => unreachable!("a list slot cannot change type"),
            };
            let intruders = std::mem::replace(&mut l.items, items);
            let lock_intact = l.sorting;
            l.sorting = prev_lock;
            (intruders, lock_intact)
        };
        let mutated = !intruders.is_empty() || !lock_intact;
        for v in intruders {
            self.release(v);
        }
        if mutated {
            Err(ObjError::mutated_during_sort())
        } else {
            Ok(())
        }
    }
}
