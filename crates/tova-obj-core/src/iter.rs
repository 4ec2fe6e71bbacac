//! Forward and reverse list iterators.
//!
//! An iterator owns one reference to its list for as long as it can still
//! yield elements; exhaustion releases that reference eagerly. Mutating a
//! list while iterating is allowed — the bounds are re-checked against the
//! live length on every step, so a shrunken list simply ends the iteration
//! early.

use crate::error::ObjResult;
use crate::heap::{Heap, HeapData};
use crate::value::Value;

#[derive(Debug)]
pub struct ListIter {
    /// The list being walked; `None` once exhausted.
    pub(crate) list: Value,
    pub(crate) index: i64,
}

#[derive(Debug)]
pub struct ListRevIter {
    pub(crate) list: Value,
    pub(crate) index: i64,
}

impl Heap {
    pub fn list_iter(&mut self, list: Value) -> ObjResult<Value> {
        self.expect_list(list)?;
        self.retain(list);
        self.alloc(HeapData::ListIter(ListIter { list, index: 0 }))
    }

    pub fn list_rev_iter(&mut self, list: Value) -> ObjResult<Value> {
        let n = self.expect_list(list)?.len() as i64;
        self.retain(list);
        self.alloc(HeapData::ListRevIter(ListRevIter {
            list,
            index: n - 1,
        }))
    }

    /// The iteration protocol: the next retained element, or `None` once
    /// exhausted. The first exhausted answer also drops the iterator's
    /// reference to its list.
    pub fn iter_next(&mut self, it: Value) -> ObjResult<Option<Value>> {
        let Value::Ref(id) = it else {
            return Err(self.wrong_type(it, "iterator"));
        };
        let (list, index, step) = match self.get(id) {
            HeapData::ListIter(s) => (s.list, s.index, 1i64),
            HeapData::ListRevIter(s) => (s.list, s.index, -1i64),
            _ => return Err(self.wrong_type(it, "iterator")),
        };
        if matches!(list, Value::None) {
            return Ok(None);
        }
        let len = self.expect_list(list)?.len() as i64;
        if index >= 0 && index < len {
            let item = self.expect_list(list)?.items()[index as usize];
            self.retain(item);
            match self.data_mut(id) {
                HeapData::ListIter(s) => s.index = index + step,
                HeapData::ListRevIter(s) => s.index = index + step,
                _ => unreachable!("iterator kind checked above"),
            }
            Ok(Some(item))
        } else {
            match self.data_mut(id) {
                HeapData::ListIter(s) => s.list = Value::None,
                HeapData::ListRevIter(s) => s.list = Value::None,
                _ => unreachable!("iterator kind checked above"),
            }
            self.release(list);
            Ok(None)
        }
    }

    /// Remaining length, assuming no further mutation of the list.
    pub fn iter_len_hint(&self, it: Value) -> ObjResult<usize> {
        let Value::Ref(id) = it else {
            return Err(self.wrong_type(it, "iterator"));
        };
        match self.get(id) {
            HeapData::ListIter(s) => {
                if matches!(s.list, Value::None) {
                    return Ok(0);
                }
                let len = self.expect_list(s.list)?.len() as i64;
                Ok((len - s.index).max(0) as usize)
            }
            HeapData::ListRevIter(s) => {
                if matches!(s.list, Value::None) {
                    return Ok(0);
                }
                let len = self.expect_list(s.list)?.len() as i64;
                Ok((s.index + 1).clamp(0, len) as usize)
            }
            _ => Err(self.wrong_type(it, "iterator")),
        }
    }
}
