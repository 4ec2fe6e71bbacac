//! The resizable list container.
//!
//! A list owns one reference per element. Capacity follows an explicit
//! policy rather than the stdlib default: the target for a logical size `n`
//! is `n + n/8 + (3 or 6)`, mild over-allocation that gives amortized O(1)
//! append, and the buffer is only reallocated when the size leaves the
//! `[capacity/2, capacity]` band, so pop/append churn near a stable size
//! never reallocates.
//!
//! Releasing an element can cascade into arbitrary container teardown, so
//! every mutating operation reshapes the list into a consistent state first
//! and releases displaced references afterwards, from a temporary recycle
//! buffer when a whole range is displaced.

use smallvec::SmallVec;

use crate::error::{ObjError, ObjResult};
use crate::heap::{Heap, HeapData};
use crate::value::Value;

/// Capacity target for a list of logical size `n`. `None` when the
/// computation would overflow. The growth pattern for repeated appends is
/// 0, 4, 8, 16, 25, 35, 46, 58, 72, 88, ...
pub fn grow_target(n: usize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    let pad = if n < 9 { 3 } else { 6 };
    n.checked_add(n / 8)?.checked_add(pad)
}

#[derive(Debug, Default)]
pub struct List {
    pub(crate) items: Vec<Value>,
    /// Set while a sort has the buffer detached. The live list is empty for
    /// that duration; this flag is the explicit lock state.
    pub(crate) sorting: bool,
}

impl List {
    pub(crate) fn new(items: Vec<Value>) -> Self {
        List {
            items,
            sorting: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn is_sorting(&self) -> bool {
        self.sorting
    }

    pub(crate) fn items(&self) -> &[Value] {
        &self.items
    }

    /// Grows capacity for a prospective logical size. Leaves the buffer
    /// untouched on failure.
    pub(crate) fn reserve_policy(&mut self, new_len: usize) -> ObjResult<()> {
        if new_len <= self.items.capacity() {
            return Ok(());
        }
        let target = grow_target(new_len).ok_or_else(|| ObjError::out_of_memory("list buffer"))?;
        let additional = target - self.items.len();
        self.items
            .try_reserve_exact(additional)
            .map_err(|_| ObjError::out_of_memory("list buffer"))
    }

    /// Gives memory back once the size has dropped below half the capacity.
    /// Call after the logical size has been reduced.
    pub(crate) fn shrink_policy(&mut self) {
        let len = self.items.len();
        let cap = self.items.capacity();
        if len >= cap / 2 {
            return;
        }
        // Cannot overflow: len is below an existing capacity.
        let target = grow_target(len).unwrap_or(cap);
        self.items.shrink_to(target);
    }
}

/// A `start:stop:step` slice request with optional bounds, resolved against
/// a concrete length by [`SliceSpec::indices`].
#[derive(Debug, Clone, Copy)]
pub struct SliceSpec {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: i64,
}

impl SliceSpec {
    pub fn new(start: Option<i64>, stop: Option<i64>, step: i64) -> Self {
        SliceSpec { start, stop, step }
    }

    /// Resolves against a sequence of length `len`: negative bounds count
    /// from the end, out-of-range bounds clamp, and the number of selected
    /// indices is computed. Fails on a zero step.
    pub fn indices(&self, len: usize) -> ObjResult<ResolvedSlice> {
        if self.step == 0 {
            return Err(ObjError::index_out_of_range("slice step cannot be zero"));
        }
        let step = self.step;
        let len = len as i64;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };

        let resolve = |bound: Option<i64>, default: i64| -> i64 {
            match bound {
                None => default,
                Some(b) => {
                    let b = if b < 0 { b + len } else { b };
                    b.clamp(lower, upper)
                }
            }
        };
        let start = resolve(self.start, if step < 0 { upper } else { lower });
        let stop = resolve(self.stop, if step < 0 { lower } else { upper });

        let count = if step > 0 {
            if start < stop {
                ((stop - start - 1) / step + 1) as usize
            } else {
                0
            }
        } else if stop < start {
            ((start - stop - 1) / -step + 1) as usize
        } else {
            0
        };
        Ok(ResolvedSlice {
            start,
            stop,
            step,
            count,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedSlice {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
    pub count: usize,
}

impl ResolvedSlice {
    /// The `k`-th selected index; requires `k < count`.
    fn index(&self, k: usize) -> usize {
        (self.start + k as i64 * self.step) as usize
    }
}

/// Normalizes an insertion index: negative counts from the end, and both
/// directions clamp into `[0, len]` instead of failing.
fn clamp_insert_index(index: i64, len: usize) -> usize {
    if index < 0 {
        let adjusted = index + len as i64;
        if adjusted < 0 {
            0
        } else {
            adjusted as usize
        }
    } else {
        (index as u64).min(len as u64) as usize
    }
}

/// Normalizes a search bound for `index`: negative counts from the end and
/// clamps to 0, positive clamps to `len`.
fn clamp_search_bound(bound: i64, len: usize) -> usize {
    if bound < 0 {
        let adjusted = bound + len as i64;
        if adjusted < 0 {
            0
        } else {
            adjusted as usize
        }
    } else {
        (bound as u64).min(len as u64) as usize
    }
}

impl Heap {
    /// Allocates a list of `n` placeholder (`none`) elements with capacity
    /// exactly `n`, meant to be filled by the caller before the list is
    /// shared.
    pub fn list_new(&mut self, n: usize) -> ObjResult<Value> {
        let mut items = Vec::new();
        if items.try_reserve_exact(n).is_err() {
            return Err(ObjError::out_of_memory("list buffer"));
        }
        items.resize(n, Value::None);
        self.alloc(HeapData::List(List::new(items)))
    }

    /// Allocates a list from `items`, taking ownership of one reference per
    /// element.
    pub fn list_from(&mut self, items: Vec<Value>) -> ObjResult<Value> {
        self.alloc(HeapData::List(List::new(items)))
    }

    pub fn list_len(&self, list: Value) -> ObjResult<usize> {
        Ok(self.expect_list(list)?.items.len())
    }

    pub fn list_capacity(&self, list: Value) -> ObjResult<usize> {
        Ok(self.expect_list(list)?.items.capacity())
    }

    /// Bounds-checked element read; no negative-index normalization at this
    /// level. The result is retained for the caller.
    pub fn list_get(&self, list: Value, i: usize) -> ObjResult<Value> {
        let l = self.expect_list(list)?;
        let item = *l
            .items
            .get(i)
            .ok_or_else(|| ObjError::index_out_of_range("list index out of range"))?;
        self.retain(item);
        Ok(item)
    }

    /// Bounds-checked element write. Takes ownership of `v` even on failure;
    /// the displaced element is released only after the store.
    pub fn list_set(&mut self, list: Value, i: usize, v: Value) -> ObjResult<()> {
        let replaced = self.expect_list_mut(list).and_then(|l| match l.items.get_mut(i) {
            Some(slot) => Ok(std::mem::replace(slot, v)),
            None => Err(ObjError::index_out_of_range(
                "list assignment index out of range",
            )),
        });
        match replaced {
            Ok(old) => {
                self.release(old);
                Ok(())
            }
            Err(e) => {
                self.release(v);
                Err(e)
            }
        }
    }

    /// Appends `v`, taking ownership of it even on failure.
    pub fn list_append(&mut self, list: Value, v: Value) -> ObjResult<()> {
        let r = self.expect_list_mut(list).and_then(|l| {
            let n = l.items.len();
            l.reserve_policy(n + 1)?;
            l.items.push(v);
            Ok(())
        });
        if r.is_err() {
            self.release(v);
        }
        r
    }

    /// Inserts `v` at `index`, clamping out-of-range indices into `[0, len]`.
    /// Takes ownership of `v` even on failure.
    pub fn list_insert(&mut self, list: Value, index: i64, v: Value) -> ObjResult<()> {
        let r = self.expect_list_mut(list).and_then(|l| {
            let n = l.items.len();
            let at = clamp_insert_index(index, n);
            l.reserve_policy(n + 1)?;
            l.items.insert(at, v);
            Ok(())
        });
        if r.is_err() {
            self.release(v);
        }
        r
    }

    /// Removes and returns the element at `index` (negative counts from the
    /// end; default last). Ownership of the returned reference moves to the
    /// caller. Popping the last element skips the tail shift.
    pub fn list_pop(&mut self, list: Value, index: Option<i64>) -> ObjResult<Value> {
        let l = self.expect_list_mut(list)?;
        let n = l.items.len();
        if n == 0 {
            return Err(ObjError::index_out_of_range("pop from empty list"));
        }
        let raw = index.unwrap_or(-1);
        let at = if raw < 0 { raw + n as i64 } else { raw };
        if at < 0 || at >= n as i64 {
            return Err(ObjError::index_out_of_range("pop index out of range"));
        }
        let at = at as usize;
        let v = if at == n - 1 {
            l.items.pop().expect("list_pop: checked non-empty")
        } else {
            l.items.remove(at)
        };
        l.shrink_policy();
        Ok(v)
    }

    /// Removes the first element equal to `needle`.
    pub fn list_remove(&mut self, list: Value, needle: Value) -> ObjResult<()> {
        let found = {
            let l = self.expect_list(list)?;
            let mut found = None;
            for (i, &item) in l.items.iter().enumerate() {
                if self.value_eq(needle, item)? {
                    found = Some(i);
                    break;
                }
            }
            found
        };
        match found {
            Some(i) => {
                let l = self.expect_list_mut(list)?;
                let old = l.items.remove(i);
                l.shrink_policy();
                self.release(old);
                Ok(())
            }
            None => Err(ObjError::not_found("list.remove: value not in list")),
        }
    }

    /// Empties the list. The buffer is detached before any element is
    /// released, so a release that cascades back into this list observes an
    /// empty, consistent container.
    pub fn list_clear(&mut self, list: Value) -> ObjResult<()> {
        let l = self.expect_list_mut(list)?;
        let old = std::mem::take(&mut l.items);
        for v in old {
            self.release(v);
        }
        Ok(())
    }

    /// Shallow copy.
    pub fn list_copy(&mut self, list: Value) -> ObjResult<Value> {
        let items = self.expect_list(list)?.items.clone();
        for &v in &items {
            self.retain(v);
        }
        self.list_from(items)
    }

    /// Unit-step slice read: clamps `lo`/`hi` into `[0, len]`, treats
    /// `hi < lo` as empty, and returns a new list of retained copies.
    pub fn list_get_slice(&mut self, list: Value, lo: i64, hi: i64) -> ObjResult<Value> {
        let items = {
            let l = self.expect_list(list)?;
            let n = l.items.len() as i64;
            let lo = lo.clamp(0, n) as usize;
            let hi = hi.clamp(lo as i64, n) as usize;
            l.items[lo..hi].to_vec()
        };
        for &v in &items {
            self.retain(v);
        }
        self.list_from(items)
    }

    /// Unit-step slice write. `replacement` of `None` deletes the range;
    /// otherwise it must be a list or tuple whose elements replace the range
    /// (the sizes need not match — the list grows or shrinks). Replaced
    /// elements are parked in a recycle buffer and released only after the
    /// list is back in a consistent shape.
    pub fn list_set_slice(
        &mut self,
        list: Value,
        lo: i64,
        hi: i64,
        replacement: Option<Value>,
    ) -> ObjResult<()> {
        let (size, lo, hi) = {
            let l = self.expect_list(list)?;
            let n = l.items.len() as i64;
            let lo = lo.clamp(0, n) as usize;
            let hi = hi.clamp(lo as i64, n) as usize;
            (l.items.len(), lo, hi)
        };

        // Snapshot the replacement before touching the target; for
        // `a[i:j] = a` the snapshot doubles as the required copy of the
        // right-hand side.
        let repl: Vec<Value> = match replacement {
            None => Vec::new(),
            Some(r) => self.snapshot_sequence(r)?,
        };

        let n_orig = hi - lo;
        let n_new = repl.len();
        if size - n_orig + n_new == 0 {
            return self.list_clear(list);
        }

        if n_new > n_orig {
            let l = self.expect_list_mut(list)?;
            l.reserve_policy(size + (n_new - n_orig))?;
        }
        for &v in &repl {
            self.retain(v);
        }

        let recycle: SmallVec<[Value; 8]> = {
            let l = self.expect_list_mut(list)?;
            let recycle: SmallVec<[Value; 8]> = l.items[lo..hi].iter().copied().collect();
            if n_new < n_orig {
                l.items.copy_within(hi..size, lo + n_new);
                l.items.truncate(size - (n_orig - n_new));
            } else if n_new > n_orig {
                let grow = n_new - n_orig;
                // Placeholders are overwritten below before anyone can see
                // them; capacity is already reserved.
                l.items.resize(size + grow, Value::None);
                l.items.copy_within(hi..size, hi + grow);
            }
            l.items[lo..lo + n_new].copy_from_slice(&repl);
            if n_new < n_orig {
                l.shrink_policy();
            }
            recycle
        };
        for v in recycle {
            self.release(v);
        }
        Ok(())
    }

    /// Deletes `[lo, hi)`.
    pub fn list_del_slice(&mut self, list: Value, lo: i64, hi: i64) -> ObjResult<()> {
        self.list_set_slice(list, lo, hi, None)
    }

    /// Stride slice read (`start:stop:step`).
    pub fn list_stride_get(&mut self, list: Value, spec: &SliceSpec) -> ObjResult<Value> {
        let r = {
            let l = self.expect_list(list)?;
            spec.indices(l.items.len())?
        };
        if r.step == 1 {
            return self.list_get_slice(list, r.start, r.stop);
        }
        let out = {
            let l = self.expect_list(list)?;
            let mut out = Vec::new();
            if out.try_reserve_exact(r.count).is_err() {
                return Err(ObjError::out_of_memory("list buffer"));
            }
            for k in 0..r.count {
                out.push(l.items[r.index(k)]);
            }
            out
        };
        for &v in &out {
            self.retain(v);
        }
        self.list_from(out)
    }

    /// Stride slice write. Unlike unit-step assignment the replacement must
    /// have exactly the slice's length.
    pub fn list_stride_set(
        &mut self,
        list: Value,
        spec: &SliceSpec,
        replacement: Value,
    ) -> ObjResult<()> {
        let r = {
            let l = self.expect_list(list)?;
            spec.indices(l.items.len())?
        };
        if r.step == 1 {
            return self.list_set_slice(list, r.start, r.stop, Some(replacement));
        }
        let repl = self.snapshot_sequence(replacement)?;
        if repl.len() != r.count {
            return Err(ObjError::length_mismatch(format!(
                "attempt to assign sequence of size {} to extended slice of size {}",
                repl.len(),
                r.count
            )));
        }
        if r.count == 0 {
            return Ok(());
        }
        for &v in &repl {
            self.retain(v);
        }
        let recycle: SmallVec<[Value; 8]> = {
            let l = self.expect_list_mut(list)?;
            let mut recycle = SmallVec::new();
            for (k, &v) in repl.iter().enumerate() {
                recycle.push(std::mem::replace(&mut l.items[r.index(k)], v));
            }
            recycle
        };
        for v in recycle {
            self.release(v);
        }
        Ok(())
    }

    /// Stride slice delete: removes every selected index, closing the gaps
    /// with a single left-to-right pass.
    pub fn list_stride_del(&mut self, list: Value, spec: &SliceSpec) -> ObjResult<()> {
        let r = {
            let l = self.expect_list(list)?;
            spec.indices(l.items.len())?
        };
        if r.count == 0 {
            return Ok(());
        }
        if r.step == 1 {
            return self.list_set_slice(list, r.start, r.stop, None);
        }
        // Walk forward regardless of the requested direction.
        let (first, step) = if r.step < 0 {
            (r.index(r.count - 1), (-r.step) as usize)
        } else {
            (r.start as usize, r.step as usize)
        };

        let recycle: SmallVec<[Value; 8]> = {
            let l = self.expect_list_mut(list)?;
            let size = l.items.len();
            let mut recycle = SmallVec::new();
            let mut removed = 0usize;
            let mut dst = first;
            for src in first..size {
                if removed < r.count && src == first + removed * step {
                    recycle.push(l.items[src]);
                    removed += 1;
                } else {
                    let tmp = l.items[src];
                    l.items[dst] = tmp;
                    dst += 1;
                }
            }
            l.items.truncate(size - r.count);
            l.shrink_policy();
            recycle
        };
        for v in recycle {
            self.release(v);
        }
        Ok(())
    }

    /// `a + b`: a new list holding retained copies of both operands'
    /// elements. Both operands must be lists.
    pub fn list_concat(&mut self, a: Value, b: Value) -> ObjResult<Value> {
        self.expect_list(a)?;
        if self.expect_list(b).is_err() {
            return Err(ObjError::type_mismatch(format!(
                "can only concatenate list to list, got {}",
                b.type_tag(self).name()
            )));
        }
        let out = {
            let la = self.expect_list(a)?;
            let lb = self.expect_list(b)?;
            let total = la
                .items
                .len()
                .checked_add(lb.items.len())
                .ok_or_else(|| ObjError::out_of_memory("list buffer"))?;
            let mut out = Vec::new();
            if out.try_reserve_exact(total).is_err() {
                return Err(ObjError::out_of_memory("list buffer"));
            }
            out.extend_from_slice(&la.items);
            out.extend_from_slice(&lb.items);
            out
        };
        for &v in &out {
            self.retain(v);
        }
        self.list_from(out)
    }

    /// `a * n`: the list repeated `n` times (`n <= 0` yields an empty list).
    pub fn list_repeat(&mut self, list: Value, n: i64) -> ObjResult<Value> {
        let src = self.expect_list(list)?.items.clone();
        let count = if n < 0 { 0 } else { n as usize };
        let total = src
            .len()
            .checked_mul(count)
            .ok_or_else(|| ObjError::out_of_memory("list buffer"))?;
        let mut out = Vec::new();
        if out.try_reserve_exact(total).is_err() {
            return Err(ObjError::out_of_memory("list buffer"));
        }
        for _ in 0..count {
            out.extend_from_slice(&src);
        }
        for &v in &out {
            self.retain(v);
        }
        self.list_from(out)
    }

    /// `a *= n` in place. `n <= 0` clears the list.
    pub fn list_repeat_in_place(&mut self, list: Value, n: i64) -> ObjResult<()> {
        if n <= 0 {
            return self.list_clear(list);
        }
        let n = n as usize;
        if n == 1 {
            self.expect_list(list)?;
            return Ok(());
        }
        let src = self.expect_list(list)?.items.clone();
        let total = src
            .len()
            .checked_mul(n)
            .ok_or_else(|| ObjError::out_of_memory("list buffer"))?;
        {
            let l = self.expect_list_mut(list)?;
            l.reserve_policy(total)?;
        }
        let mut extra = Vec::new();
        if extra.try_reserve_exact(total - src.len()).is_err() {
            return Err(ObjError::out_of_memory("list buffer"));
        }
        for _ in 1..n {
            extra.extend_from_slice(&src);
        }
        for &v in &extra {
            self.retain(v);
        }
        let l = self.expect_list_mut(list)?;
        l.items.extend_from_slice(&extra);
        Ok(())
    }

    /// Appends every element of `iterable` to the list. Lists and tuples
    /// take a bulk path with a single reserve; iterator objects are drained
    /// through the iteration protocol with policy growth and a final trim.
    /// Extending a list with itself appends a snapshot of its own elements.
    pub fn list_extend(&mut self, list: Value, iterable: Value) -> ObjResult<()> {
        let bulk: Option<Vec<Value>> = match iterable {
            Value::Ref(id) => match self.get(id) {
                HeapData::List(l) => Some(l.items.clone()),
                HeapData::Tuple(t) => Some(t.items().to_vec()),
                _ => None,
            },
            _ => None,
        };

        if let Some(src) = bulk {
            // The snapshot is taken before the reserve below, so the
            // self-extend case cannot observe its own growth.
            let m = self.list_len(list)?;
            let total = m
                .checked_add(src.len())
                .ok_or_else(|| ObjError::out_of_memory("list buffer"))?;
            {
                let l = self.expect_list_mut(list)?;
                l.reserve_policy(total)?;
            }
            for &v in &src {
                self.retain(v);
            }
            let l = self.expect_list_mut(list)?;
            l.items.extend_from_slice(&src);
            return Ok(());
        }

        self.expect_list(list)?;
        loop {
            match self.iter_next(iterable) {
                Ok(Some(v)) => self.list_append(list, v)?,
                Ok(None) => break,
                Err(e) if e.kind == crate::error::ErrorKind::TypeMismatch => {
                    return Err(self.wrong_type_not_iterable(iterable));
                }
                Err(e) => return Err(e),
            }
        }
        let l = self.expect_list_mut(list)?;
        l.shrink_policy();
        Ok(())
    }

    /// `a += b`: extend, by any iterable operand.
    pub fn list_inplace_concat(&mut self, list: Value, other: Value) -> ObjResult<()> {
        self.list_extend(list, other)
    }

    pub fn list_reverse(&mut self, list: Value) -> ObjResult<()> {
        self.expect_list_mut(list)?.items.reverse();
        Ok(())
    }

    pub fn list_contains(&self, list: Value, needle: Value) -> ObjResult<bool> {
        let l = self.expect_list(list)?;
        for &item in &l.items {
            if self.value_eq(needle, item)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// First index of `needle` within `[start, stop)` (negative bounds count
    /// from the end).
    pub fn list_index(
        &self,
        list: Value,
        needle: Value,
        start: Option<i64>,
        stop: Option<i64>,
    ) -> ObjResult<usize> {
        let l = self.expect_list(list)?;
        let n = l.items.len();
        let start = clamp_search_bound(start.unwrap_or(0), n);
        let stop = clamp_search_bound(stop.unwrap_or(n as i64), n);
        for (off, &item) in l.items[start.min(stop)..stop].iter().enumerate() {
            if self.value_eq(needle, item)? {
                return Ok(start + off);
            }
        }
        Err(ObjError::not_found("list.index: value not in list"))
    }

    pub fn list_count(&self, list: Value, needle: Value) -> ObjResult<usize> {
        let l = self.expect_list(list)?;
        let mut count = 0;
        for &item in &l.items {
            if self.value_eq(needle, item)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Copies the elements of a list or tuple out as a plain vector, without
    /// touching reference counts.
    fn snapshot_sequence(&self, v: Value) -> ObjResult<Vec<Value>> {
        if let Value::Ref(id) = v {
            match self.get(id) {
                HeapData::List(l) => return Ok(l.items.clone()),
                HeapData::Tuple(t) => return Ok(t.items().to_vec()),
                _ => {}
            }
        }
        Err(self.wrong_type(v, "list or tuple"))
    }

    fn wrong_type_not_iterable(&self, v: Value) -> ObjError {
        ObjError::type_mismatch(format!("{} object is not iterable", v.type_tag(self).name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_target_matches_the_documented_pattern() {
        assert_eq!(grow_target(0), Some(0));
        assert_eq!(grow_target(1), Some(4));
        assert_eq!(grow_target(5), Some(8));
        assert_eq!(grow_target(9), Some(16));
        assert_eq!(grow_target(17), Some(25));
        assert_eq!(grow_target(26), Some(35));
        assert_eq!(grow_target(usize::MAX), None);
    }

    #[test]
    fn slice_spec_resolves_negative_and_open_bounds() {
        let full = SliceSpec::new(None, None, 1).indices(5).unwrap();
        assert_eq!((full.start, full.stop, full.count), (0, 5, 5));

        let rev = SliceSpec::new(None, None, -1).indices(5).unwrap();
        assert_eq!((rev.start, rev.stop, rev.count), (4, -1, 5));

        let every_other = SliceSpec::new(Some(0), None, 2).indices(5).unwrap();
        assert_eq!(every_other.count, 3);

        let neg_bounds = SliceSpec::new(Some(-3), Some(-1), 1).indices(5).unwrap();
        assert_eq!((neg_bounds.start, neg_bounds.stop, neg_bounds.count), (2, 4, 2));

        let clamped = SliceSpec::new(Some(-99), Some(99), 1).indices(3).unwrap();
        assert_eq!((clamped.start, clamped.stop, clamped.count), (0, 3, 3));

        assert!(SliceSpec::new(None, None, 0).indices(3).is_err());
    }

    #[test]
    fn insert_index_clamps_both_directions() {
        assert_eq!(clamp_insert_index(-100, 3), 0);
        assert_eq!(clamp_insert_index(-1, 3), 2);
        assert_eq!(clamp_insert_index(0, 3), 0);
        assert_eq!(clamp_insert_index(3, 3), 3);
        assert_eq!(clamp_insert_index(100, 3), 3);
    }
}
