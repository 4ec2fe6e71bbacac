//! The reference-counted heap arena.
//!
//! Every heap value lives in a slot holding an explicit reference count and
//! its payload. Counts are managed by convention: whoever stores a `Value`
//! copy that outlives its source calls [`Heap::retain`], whoever drops an
//! owned copy calls [`Heap::release`]. A count reaching zero frees the slot
//! (children are walked iteratively, never by recursion) and pushes its id
//! onto a free list for reuse, so allocate/free churn does not grow the
//! arena.

use std::cell::Cell;

use num_bigint::BigInt;

use crate::error::{ObjError, ObjResult};
use crate::iter::{ListIter, ListRevIter};
use crate::list::List;
use crate::value::Value;

/// Index of a slot in the heap arena. Stable for the lifetime of the object
/// it names; reused only after that object is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapId(usize);

impl HeapId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An immutable sequence of owned references.
#[derive(Debug, Default)]
pub struct Tuple {
    items: Vec<Value>,
}

impl Tuple {
    pub(crate) fn new(items: Vec<Value>) -> Self {
        Tuple { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn items(&self) -> &[Value] {
        &self.items
    }
}

/// Payload of a heap slot.
#[derive(Debug)]
pub enum HeapData {
    Str(String),
    /// An integer too large for the inline representation. Same logical
    /// type as `Value::Int`.
    Big(BigInt),
    Tuple(Tuple),
    List(List),
    ListIter(ListIter),
    ListRevIter(ListRevIter),
}

impl HeapData {
    /// Child references owned by this payload, pushed onto `stack` so the
    /// caller can release them iteratively.
    fn push_children(&self, stack: &mut Vec<HeapId>) {
        let push = |stack: &mut Vec<HeapId>, v: &Value| {
            if let Value::Ref(id) = v {
                stack.push(*id);
            }
        };
        match self {
            HeapData::Str(_) | HeapData::Big(_) => {}
            HeapData::Tuple(t) => {
                for v in &t.items {
                    push(stack, v);
                }
            }
            HeapData::List(l) => {
                for v in l.items() {
                    push(stack, v);
                }
            }
            HeapData::ListIter(it) => push(stack, &it.list),
            HeapData::ListRevIter(it) => push(stack, &it.list),
        }
    }
}

#[derive(Debug)]
struct Slot {
    refcount: Cell<usize>,
    /// `None` only while the payload is temporarily taken out for an
    /// operation that needs the heap mutably alongside it.
    data: Option<HeapData>,
}

/// Depth limit for recursive value comparison and repr. Cyclic containers
/// that escape the identity shortcuts hit this instead of overflowing the
/// native stack.
const RECURSION_LIMIT: usize = 200;

/// RAII guard for the comparison/repr depth counter.
pub(crate) struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

#[derive(Debug, Default)]
pub struct Heap {
    entries: Vec<Option<Slot>>,
    /// Freed slot ids available for reuse; popped by `alloc`.
    free_list: Vec<HeapId>,
    depth: Cell<usize>,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    /// Number of live heap objects. Intended for leak assertions in tests.
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|s| s.is_some()).count()
    }

    /// Current reference count of a live object.
    pub fn refcount(&self, id: HeapId) -> usize {
        self.slot(id, "refcount").refcount.get()
    }

    /// Allocates a slot for `data` with a count of one. References already
    /// held by `data` (container children) are transferred, not re-counted;
    /// on failure they are released, so the caller only handles the error.
    pub fn alloc(&mut self, data: HeapData) -> ObjResult<Value> {
        if self.free_list.is_empty() && self.entries.try_reserve(1).is_err() {
            let mut children = Vec::new();
            data.push_children(&mut children);
            for id in children {
                self.release(Value::Ref(id));
            }
            return Err(ObjError::out_of_memory("heap slot"));
        }
        let slot = Slot {
            refcount: Cell::new(1),
            data: Some(data),
        };
        let id = if let Some(id) = self.free_list.pop() {
            self.entries[id.index()] = Some(slot);
            id
        } else {
            let id = HeapId(self.entries.len());
            self.entries.push(Some(slot));
            id
        };
        Ok(Value::Ref(id))
    }

    pub fn new_str(&mut self, s: impl Into<String>) -> ObjResult<Value> {
        self.alloc(HeapData::Str(s.into()))
    }

    /// Allocates an integer, demoting to the inline representation when the
    /// magnitude allows it.
    pub fn new_int(&mut self, n: BigInt) -> ObjResult<Value> {
        match i64::try_from(&n) {
            Ok(small) => Ok(Value::Int(small)),
            Err(_) => self.alloc(HeapData::Big(n)),
        }
    }

    /// Allocates a tuple, taking ownership of one reference per item.
    pub fn new_tuple(&mut self, items: Vec<Value>) -> ObjResult<Value> {
        self.alloc(HeapData::Tuple(Tuple::new(items)))
    }

    /// Increments the count behind `v`; a no-op for immediates.
    ///
    /// The caller must already own a reference, so the object is live and
    /// only interior mutability is needed.
    pub fn retain(&self, v: Value) {
        if let Value::Ref(id) = v {
            let rc = &self.slot(id, "retain").refcount;
            rc.set(rc.get() + 1);
        }
    }

    /// Releases one reference to `v`; a no-op for immediates. When a count
    /// reaches zero the object is freed and every reference it owns is
    /// released in turn, using an explicit work stack so arbitrarily deep
    /// container chains cannot overflow the native stack.
    pub fn release(&mut self, v: Value) {
        let Value::Ref(first) = v else { return };
        let mut stack = vec![first];
        while let Some(id) = stack.pop() {
            let slot = self
                .entries
                .get_mut(id.index())
                .expect("Heap::release: slot missing")
                .as_mut()
                .expect("Heap::release: object already freed");
            let rc = slot.refcount.get();
            debug_assert!(rc > 0);
            if rc > 1 {
                slot.refcount.set(rc - 1);
                continue;
            }
            let freed = self.entries[id.index()]
                .take()
                .expect("Heap::release: slot vanished");
            self.free_list.push(id);
            match freed.data {
                Some(data) => data.push_children(&mut stack),
                None => panic!("Heap::release: freed an object whose data is borrowed"),
            }
        }
    }

    /// Nulls `slot` first, then releases the previous occupant. The order
    /// matters: release can cascade into code that reads back through the
    /// same slot, which must observe `None` rather than a dying object.
    pub fn clear_slot(&mut self, slot: &mut Value) {
        let old = std::mem::replace(slot, Value::None);
        self.release(old);
    }

    /// Stores `new` into `slot` (taking ownership of it), then releases the
    /// previous occupant. Same ordering rationale as [`Heap::clear_slot`].
    pub fn set_slot(&mut self, slot: &mut Value, new: Value) {
        let old = std::mem::replace(slot, new);
        self.release(old);
    }

    /// Borrows the payload of a live object.
    ///
    /// # Panics
    /// If the id is stale, freed, or the payload is currently taken — all
    /// programming errors in the caller, not user-triggerable states.
    pub fn get(&self, id: HeapId) -> &HeapData {
        self.slot(id, "get")
            .data
            .as_ref()
            .expect("Heap::get: data currently borrowed")
    }

    pub fn str_value(&self, v: Value) -> ObjResult<&str> {
        if let Value::Ref(id) = v {
            if let HeapData::Str(s) = self.get(id) {
                return Ok(s);
            }
        }
        Err(self.wrong_type(v, "str"))
    }

    pub fn tuple_len(&self, v: Value) -> ObjResult<usize> {
        Ok(self.expect_tuple(v)?.len())
    }

    /// Bounds-checked tuple element access; the result is retained for the
    /// caller.
    pub fn tuple_get(&self, v: Value, i: usize) -> ObjResult<Value> {
        let t = self.expect_tuple(v)?;
        let item = *t
            .items()
            .get(i)
            .ok_or_else(|| ObjError::index_out_of_range("tuple index out of range"))?;
        self.retain(item);
        Ok(item)
    }

    fn slot(&self, id: HeapId, op: &str) -> &Slot {
        self.entries
            .get(id.index())
            .unwrap_or_else(|| panic!("Heap::{op}: slot missing"))
            .as_ref()
            .unwrap_or_else(|| panic!("Heap::{op}: object already freed"))
    }

    pub(crate) fn wrong_type(&self, v: Value, wanted: &str) -> ObjError {
        ObjError::type_mismatch(format!(
            "expected {wanted}, got {}",
            v.type_tag(self).name()
        ))
    }

    pub(crate) fn expect_tuple(&self, v: Value) -> ObjResult<&Tuple> {
        if let Value::Ref(id) = v {
            if let HeapData::Tuple(t) = self.get(id) {
                return Ok(t);
            }
        }
        Err(self.wrong_type(v, "tuple"))
    }

    pub(crate) fn expect_list(&self, v: Value) -> ObjResult<&List> {
        if let Value::Ref(id) = v {
            if let HeapData::List(l) = self.get(id) {
                return Ok(l);
            }
        }
        Err(self.wrong_type(v, "list"))
    }

    pub(crate) fn expect_list_mut(&mut self, v: Value) -> ObjResult<&mut List> {
        let Value::Ref(id) = v else {
            return Err(self.wrong_type(v, "list"));
        };
        // Tag check first so the error path can re-borrow self immutably.
        if !matches!(self.get(id), HeapData::List(_)) {
            return Err(self.wrong_type(v, "list"));
        }
        match self
            .entries
            .get_mut(id.index())
            .expect("Heap::expect_list_mut: slot missing")
            .as_mut()
            .expect("Heap::expect_list_mut: object already freed")
            .data
            .as_mut()
            .expect("Heap::expect_list_mut: data currently borrowed")
        {
            HeapData::List(l) => Ok(l),
            _ => unreachable!(),
        }
    }

    /// Takes a list payload out of its slot so the caller can mutate it and
    /// the heap at the same time. Must be paired with [`Heap::put_list`] on
    /// every path.
    pub(crate) fn take_list(&mut self, v: Value) -> ObjResult<(HeapId, List)> {
        let Value::Ref(id) = v else {
            return Err(self.wrong_type(v, "list"));
        };
        let slot = self
            .entries
            .get_mut(id.index())
            .expect("Heap::take_list: slot missing")
            .as_mut()
            .expect("Heap::take_list: object already freed");
        let data = slot
            .data
            .take()
            .expect("Heap::take_list: data currently borrowed");
        match data {
            HeapData::List(l) => Ok((id, l)),
            other => {
                slot.data = Some(other);
                Err(self.wrong_type(v, "list"))
            }
        }
    }

    pub(crate) fn put_list(&mut self, id: HeapId, l: List) {
        let slot = self
            .entries
            .get_mut(id.index())
            .expect("Heap::put_list: slot missing")
            .as_mut()
            .expect("Heap::put_list: object already freed");
        debug_assert!(slot.data.is_none());
        slot.data = Some(HeapData::List(l));
    }

    pub(crate) fn data_mut(&mut self, id: HeapId) -> &mut HeapData {
        self.entries
            .get_mut(id.index())
            .expect("Heap::data_mut: slot missing")
            .as_mut()
            .expect("Heap::data_mut: object already freed")
            .data
            .as_mut()
            .expect("Heap::data_mut: data currently borrowed")
    }

    /// Enters one level of recursive comparison/repr, failing with
    /// `RecursionLimit` past the depth bound.
    pub(crate) fn enter_recursive(&self, what: &str) -> ObjResult<DepthGuard<'_>> {
        let d = self.depth.get();
        if d >= RECURSION_LIMIT {
            return Err(ObjError::recursion_limit(what));
        }
        self.depth.set(d + 1);
        Ok(DepthGuard(&self.depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_retain_release_roundtrip() {
        let mut heap = Heap::new();
        let s = heap.new_str("hello").unwrap();
        let id = s.as_ref_id().unwrap();
        assert_eq!(heap.refcount(id), 1);
        heap.retain(s);
        assert_eq!(heap.refcount(id), 2);
        heap.release(s);
        assert_eq!(heap.refcount(id), 1);
        heap.release(s);
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut heap = Heap::new();
        let a = heap.new_str("a").unwrap();
        let a_id = a.as_ref_id().unwrap();
        heap.release(a);
        let b = heap.new_str("b").unwrap();
        assert_eq!(b.as_ref_id().unwrap(), a_id);
        heap.release(b);
    }

    #[test]
    fn releasing_a_tuple_releases_children_once() {
        let mut heap = Heap::new();
        let s = heap.new_str("x").unwrap();
        heap.retain(s);
        let t = heap.new_tuple(vec![s, Value::Int(1)]).unwrap();
        // s: one ref ours, one owned by the tuple.
        assert_eq!(heap.refcount(s.as_ref_id().unwrap()), 2);
        heap.release(t);
        assert_eq!(heap.refcount(s.as_ref_id().unwrap()), 1);
        heap.release(s);
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn deep_nesting_frees_iteratively() {
        let mut heap = Heap::new();
        let mut inner = heap.new_tuple(vec![]).unwrap();
        for _ in 0..50_000 {
            inner = heap.new_tuple(vec![inner]).unwrap();
        }
        heap.release(inner);
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn set_slot_releases_the_old_occupant_after_the_store() {
        let mut heap = Heap::new();
        let a = heap.new_str("a").unwrap();
        let b = heap.new_str("b").unwrap();
        let mut slot = a;
        heap.set_slot(&mut slot, b);
        assert!(slot.is(b));
        assert_eq!(heap.live_count(), 1);
        heap.clear_slot(&mut slot);
        assert!(matches!(slot, Value::None));
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn big_ints_demote_to_inline_when_small() {
        let mut heap = Heap::new();
        let small = heap.new_int(BigInt::from(42)).unwrap();
        assert!(matches!(small, Value::Int(42)));
        let big = heap.new_int(BigInt::from(i64::MAX) * 2).unwrap();
        assert!(matches!(big, Value::Ref(_)));
        heap.release(big);
        assert_eq!(heap.live_count(), 0);
    }
}
