//! Value equality and ordering, and the pre-sort comparator selection.
//!
//! Ordering follows the runtime's surface rules: numbers compare across
//! representations (inline ints, heap big ints, floats), strings compare
//! bytewise (UTF-8 byte order equals scalar-value order), sequences compare
//! lexicographically with length as the tie-break, everything else is
//! unorderable and fails with a type mismatch. Equality never fails on type
//! grounds; differently-typed values are simply unequal.
//!
//! The pre-sort check inspects a key array once and picks a specialized
//! less-than for the whole sort. Every fast path re-checks its precondition
//! on each call and silently defers to the generic path when a comparison
//! side effect has broken homogeneity — fast comparators accelerate, they
//! never change answers.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::FromPrimitive;

use crate::error::{ObjError, ObjResult};
use crate::heap::{Heap, HeapData, Tuple};
use crate::value::{TypeTag, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// A numeric view of a value, when it has one. Bools are numbers here, as
/// on the runtime surface.
enum Num<'a> {
    Int(i64),
    Big(&'a BigInt),
    Float(f64),
}

fn as_num(heap: &Heap, v: Value) -> Option<Num<'_>> {
    match v {
        Value::Bool(b) => Some(Num::Int(b as i64)),
        Value::Int(i) => Some(Num::Int(i)),
        Value::Float(f) => Some(Num::Float(f)),
        Value::Ref(id) => match heap.get(id) {
            HeapData::Big(b) => Some(Num::Big(b)),
            _ => None,
        },
        Value::None => None,
    }
}

/// Exact comparison of an integer against a float; `None` for NaN.
fn int_vs_float(i: i64, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f == f64::INFINITY {
        return Some(Ordering::Less);
    }
    if f == f64::NEG_INFINITY {
        return Some(Ordering::Greater);
    }
    let fl = f.floor();
    // 2^63 is exactly representable; beyond it no i64 can reach the float.
    if fl >= 9_223_372_036_854_775_808.0 {
        return Some(Ordering::Less);
    }
    if fl < -9_223_372_036_854_775_808.0 {
        return Some(Ordering::Greater);
    }
    let fi = fl as i64;
    match i.cmp(&fi) {
        Ordering::Equal => {
            if f > fl {
                Some(Ordering::Less)
            } else {
                Some(Ordering::Equal)
            }
        }
        other => Some(other),
    }
}

fn big_vs_float(b: &BigInt, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f == f64::INFINITY {
        return Some(Ordering::Less);
    }
    if f == f64::NEG_INFINITY {
        return Some(Ordering::Greater);
    }
    let fl = f.floor();
    let fb = BigInt::from_f64(fl).expect("finite float has an integral floor");
    match b.cmp(&fb) {
        Ordering::Equal => {
            if f > fl {
                Some(Ordering::Less)
            } else {
                Some(Ordering::Equal)
            }
        }
        other => Some(other),
    }
}

fn num_cmp(a: Num<'_>, b: Num<'_>) -> Option<Ordering> {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
        (Num::Int(x), Num::Float(y)) => int_vs_float(x, y),
        (Num::Float(x), Num::Int(y)) => int_vs_float(y, x).map(Ordering::reverse),
        (Num::Float(x), Num::Float(y)) => x.partial_cmp(&y),
        (Num::Big(x), Num::Big(y)) => Some(x.cmp(y)),
        (Num::Big(x), Num::Int(y)) => Some(x.cmp(&BigInt::from(y))),
        (Num::Int(x), Num::Big(y)) => Some(BigInt::from(x).cmp(y)),
        (Num::Big(x), Num::Float(y)) => big_vs_float(x, y),
        (Num::Float(x), Num::Big(y)) => big_vs_float(y, x).map(Ordering::reverse),
    }
}

impl Heap {
    /// Value equality. Never fails on type grounds; comparing values of
    /// different types is `false`, not an error.
    pub fn value_eq(&self, a: Value, b: Value) -> ObjResult<bool> {
        // Identity first: the same object equals itself without recursing,
        // which also terminates self-referential containers.
        if a.is(b) {
            return Ok(true);
        }
        if let (Some(x), Some(y)) = (as_num(self, a), as_num(self, b)) {
            return Ok(num_cmp(x, y) == Some(Ordering::Equal));
        }
        match (a, b) {
            (Value::Ref(x), Value::Ref(y)) => match (self.get(x), self.get(y)) {
                (HeapData::Str(s), HeapData::Str(t)) => Ok(s == t),
                (HeapData::Tuple(s), HeapData::Tuple(t)) => self.seq_eq(s.items(), t.items()),
                (HeapData::List(s), HeapData::List(t)) => self.seq_eq(s.items(), t.items()),
                _ => Ok(false),
            },
            _ => Ok(false),
        }
    }

    /// Ordering comparison. Fails with a type mismatch for unorderable
    /// operand combinations.
    pub fn value_compare(&self, a: Value, b: Value, op: CmpOp) -> ObjResult<bool> {
        if let (Some(x), Some(y)) = (as_num(self, a), as_num(self, b)) {
            // Unordered (NaN) answers false for every ordering operator.
            return Ok(num_cmp(x, y).map(|o| op.holds(o)).unwrap_or(false));
        }
        match (a, b) {
            (Value::Ref(x), Value::Ref(y)) => match (self.get(x), self.get(y)) {
                (HeapData::Str(s), HeapData::Str(t)) => Ok(op.holds(s.as_str().cmp(t.as_str()))),
                (HeapData::Tuple(s), HeapData::Tuple(t)) => {
                    self.seq_compare(s.items(), t.items(), op)
                }
                (HeapData::List(s), HeapData::List(t)) => self.seq_compare(s.items(), t.items(), op),
                _ => Err(self.unorderable(a, b, op)),
            },
            _ => Err(self.unorderable(a, b, op)),
        }
    }

    pub fn value_lt(&self, a: Value, b: Value) -> ObjResult<bool> {
        self.value_compare(a, b, CmpOp::Lt)
    }

    fn seq_eq(&self, a: &[Value], b: &[Value]) -> ObjResult<bool> {
        if a.len() != b.len() {
            return Ok(false);
        }
        let _guard = self.enter_recursive("comparison")?;
        for (&x, &y) in a.iter().zip(b) {
            if !self.value_eq(x, y)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Lexicographic sequence ordering: the first unequal pair decides,
    /// length breaks the tie.
    fn seq_compare(&self, a: &[Value], b: &[Value], op: CmpOp) -> ObjResult<bool> {
        let _guard = self.enter_recursive("comparison")?;
        let n = a.len().min(b.len());
        for i in 0..n {
            if !self.value_eq(a[i], b[i])? {
                return self.value_compare(a[i], b[i], op);
            }
        }
        Ok(op.holds(a.len().cmp(&b.len())))
    }

    fn unorderable(&self, a: Value, b: Value, op: CmpOp) -> ObjError {
        ObjError::type_mismatch(format!(
            "'{}' not supported between {} and {}",
            op.symbol(),
            a.type_tag(self).name(),
            b.type_tag(self).name()
        ))
    }
}

/// The comparison strategy picked by the pre-sort check, one per sort call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCmp {
    /// Every key is an inline int.
    Int,
    /// Every key is an inline float.
    Float,
    /// Every key is a string; bytewise order is exact for UTF-8.
    Bytes,
    /// Every key shares one type that carries a native ordering; dispatch
    /// straight to it.
    SameType(TypeTag),
    /// Every key is a non-empty tuple; compare first elements with the
    /// inner strategy, fall back to full comparison on ties.
    Tuple(Box<KeyCmp>),
    /// No useful homogeneity; full dynamic dispatch per comparison.
    Generic,
}

/// Inspects the keys once, before sorting begins, and picks the cheapest
/// comparison strategy that is behaviorally identical to the generic one
/// for this array. The first key is the hypothesis; the scan over the rest
/// confirms or refutes it.
pub fn select_comparator(heap: &Heap, keys: &[Value]) -> KeyCmp {
    if keys.len() < 2 {
        return KeyCmp::Generic;
    }
    if is_nonempty_tuple(heap, keys[0]) {
        if !keys.iter().all(|&k| is_nonempty_tuple(heap, k)) {
            return KeyCmp::Generic;
        }
        let firsts: Vec<Value> = keys
            .iter()
            .map(|&k| tuple_first(heap, k).expect("all keys are non-empty tuples"))
            .collect();
        let inner = match classify_scalars(heap, &firsts) {
            // Tuples of tuples keep the generic element comparison.
            KeyCmp::SameType(TypeTag::Tuple) | KeyCmp::Tuple(_) => KeyCmp::Generic,
            other => other,
        };
        return KeyCmp::Tuple(Box::new(inner));
    }
    classify_scalars(heap, keys)
}

fn classify_scalars(heap: &Heap, keys: &[Value]) -> KeyCmp {
    let tag0 = keys[0].type_tag(heap);
    let mut ints_bounded = true;
    for &k in keys {
        if k.type_tag(heap) != tag0 {
            return KeyCmp::Generic;
        }
        // A heap-resident big integer is the same type but too wide for the
        // inline fast path.
        if tag0 == TypeTag::Int && !matches!(k, Value::Int(_)) {
            ints_bounded = false;
        }
    }
    match tag0 {
        TypeTag::Int if ints_bounded => KeyCmp::Int,
        TypeTag::Float => KeyCmp::Float,
        TypeTag::Str => KeyCmp::Bytes,
        t if t.has_native_order() => KeyCmp::SameType(t),
        _ => KeyCmp::Generic,
    }
}

fn is_nonempty_tuple(heap: &Heap, v: Value) -> bool {
    matches!(v, Value::Ref(id) if matches!(heap.get(id), HeapData::Tuple(t) if !t.is_empty()))
}

fn tuple_first(heap: &Heap, v: Value) -> Option<Value> {
    tuple_of(heap, v).and_then(|t| t.items().first().copied())
}

fn tuple_of(heap: &Heap, v: Value) -> Option<&Tuple> {
    match v {
        Value::Ref(id) => match heap.get(id) {
            HeapData::Tuple(t) => Some(t),
            _ => None,
        },
        _ => None,
    }
}

fn str_of(heap: &Heap, v: Value) -> Option<&str> {
    match v {
        Value::Ref(id) => match heap.get(id) {
            HeapData::Str(s) => Some(s.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// Less-than under the selected strategy. Each arm re-checks its
/// precondition; a value of an unexpected type (possible when a comparison
/// callback mutated something mid-sort) re-dispatches that one call to the
/// generic path instead of producing a wrong answer.
pub(crate) fn key_lt(heap: &Heap, kind: &KeyCmp, a: Value, b: Value) -> ObjResult<bool> {
    match kind {
        KeyCmp::Int => match (a, b) {
            (Value::Int(x), Value::Int(y)) => Ok(x < y),
            _ => heap.value_lt(a, b),
        },
        KeyCmp::Float => match (a, b) {
            (Value::Float(x), Value::Float(y)) => Ok(x < y),
            _ => heap.value_lt(a, b),
        },
        KeyCmp::Bytes => match (str_of(heap, a), str_of(heap, b)) {
            (Some(x), Some(y)) => Ok(x < y),
            _ => heap.value_lt(a, b),
        },
        KeyCmp::SameType(tag) => {
            if a.type_tag(heap) == *tag && b.type_tag(heap) == *tag {
                same_type_lt(heap, *tag, a, b)
            } else {
                heap.value_lt(a, b)
            }
        }
        KeyCmp::Tuple(inner) => tuple_key_lt(heap, inner, a, b),
        KeyCmp::Generic => heap.value_lt(a, b),
    }
}

/// The type's own ordering, skipping the cross-type dispatch of the
/// generic path. Only called once both operands are known to share `tag`.
fn same_type_lt(heap: &Heap, tag: TypeTag, a: Value, b: Value) -> ObjResult<bool> {
    match tag {
        TypeTag::Bool | TypeTag::Int | TypeTag::Float => {
            let (Some(x), Some(y)) = (as_num(heap, a), as_num(heap, b)) else {
                return heap.value_lt(a, b);
            };
            Ok(num_cmp(x, y) == Some(Ordering::Less))
        }
        TypeTag::Str => match (str_of(heap, a), str_of(heap, b)) {
            (Some(x), Some(y)) => Ok(x < y),
            _ => heap.value_lt(a, b),
        },
        _ => heap.value_lt(a, b),
    }
}

fn tuple_key_lt(heap: &Heap, inner: &KeyCmp, a: Value, b: Value) -> ObjResult<bool> {
    let (Some(ta), Some(tb)) = (tuple_of(heap, a), tuple_of(heap, b)) else {
        return heap.value_lt(a, b);
    };
    if ta.is_empty() || tb.is_empty() {
        return heap.value_lt(a, b);
    }
    let xs = ta.items();
    let ys = tb.items();
    let n = xs.len().min(ys.len());
    let mut i = 0;
    while i < n {
        if !heap.value_eq(xs[i], ys[i])? {
            break;
        }
        i += 1;
    }
    if i >= n {
        return Ok(xs.len() < ys.len());
    }
    if i == 0 {
        key_lt(heap, inner, xs[0], ys[0])
    } else {
        heap.value_lt(xs[i], ys[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_comparison_crosses_representations() {
        let mut heap = Heap::new();
        let big = heap.new_int(BigInt::from(i64::MAX) + 1).unwrap();
        assert!(heap.value_lt(Value::Int(i64::MAX), big).unwrap());
        assert!(heap.value_lt(Value::Int(1), Value::Float(1.5)).unwrap());
        assert!(heap.value_lt(Value::Float(0.5), Value::Int(1)).unwrap());
        assert!(heap.value_eq(Value::Bool(true), Value::Int(1)).unwrap());
        // Large ints compare exactly, not through lossy float conversion.
        assert!(heap
            .value_lt(Value::Int(9_007_199_254_740_993), Value::Float(9_007_199_254_740_994.0))
            .unwrap());
        heap.release(big);
    }

    #[test]
    fn nan_is_unordered_and_unequal() {
        let heap = Heap::new();
        let nan = Value::Float(f64::NAN);
        assert!(!heap.value_eq(nan, nan).unwrap());
        assert!(!heap.value_compare(nan, Value::Float(1.0), CmpOp::Lt).unwrap());
        assert!(!heap.value_compare(nan, Value::Float(1.0), CmpOp::Ge).unwrap());
        assert!(!heap.value_compare(nan, Value::Int(1), CmpOp::Lt).unwrap());
    }

    #[test]
    fn ordering_mixed_types_is_a_type_mismatch() {
        let mut heap = Heap::new();
        let s = heap.new_str("x").unwrap();
        let err = heap.value_lt(Value::Int(1), s).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::TypeMismatch);
        assert!(heap.value_lt(Value::None, Value::None).is_err());
        heap.release(s);
    }

    #[test]
    fn classification_follows_the_keys() {
        let mut heap = Heap::new();
        assert_eq!(
            select_comparator(&heap, &[Value::Int(1), Value::Int(2)]),
            KeyCmp::Int
        );
        assert_eq!(
            select_comparator(&heap, &[Value::Float(1.0), Value::Float(2.0)]),
            KeyCmp::Float
        );
        let a = heap.new_str("a").unwrap();
        let b = heap.new_str("b").unwrap();
        assert_eq!(select_comparator(&heap, &[a, b]), KeyCmp::Bytes);
        assert_eq!(
            select_comparator(&heap, &[Value::Int(1), Value::Float(2.0)]),
            KeyCmp::Generic
        );

        // One big int demotes the whole array to the same-type strategy.
        let big = heap.new_int(BigInt::from(u64::MAX)).unwrap();
        assert_eq!(
            select_comparator(&heap, &[Value::Int(1), big]),
            KeyCmp::SameType(TypeTag::Int)
        );

        let t1 = heap.new_tuple(vec![Value::Int(1), Value::Int(9)]).unwrap();
        let t2 = heap.new_tuple(vec![Value::Int(2)]).unwrap();
        assert_eq!(
            select_comparator(&heap, &[t1, t2]),
            KeyCmp::Tuple(Box::new(KeyCmp::Int))
        );

        for v in [a, b, big, t1, t2] {
            heap.release(v);
        }
    }

    #[test]
    fn fast_paths_redispatch_when_the_precondition_breaks() {
        let mut heap = Heap::new();
        // An Int strategy handed a float still answers like the generic path.
        assert!(key_lt(&heap, &KeyCmp::Int, Value::Int(1), Value::Float(2.0)).unwrap());
        let s = heap.new_str("a").unwrap();
        let err = key_lt(&heap, &KeyCmp::Bytes, s, Value::Int(1)).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::TypeMismatch);
        heap.release(s);
    }
}
