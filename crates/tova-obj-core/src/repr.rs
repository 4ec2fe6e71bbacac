//! Human-readable value rendering. Containers that reach themselves render
//! the inner occurrence as `[...]` / `(...)` instead of recursing forever.

use ahash::AHashSet;

use crate::error::ObjResult;
use crate::heap::{Heap, HeapData, HeapId};
use crate::value::Value;

impl Heap {
    pub fn value_repr(&self, v: Value) -> ObjResult<String> {
        let mut out = String::new();
        let mut seen = AHashSet::new();
        self.repr_into(v, &mut out, &mut seen)?;
        Ok(out)
    }

    fn repr_into(
        &self,
        v: Value,
        out: &mut String,
        seen: &mut AHashSet<HeapId>,
    ) -> ObjResult<()> {
        match v {
            Value::None => out.push_str("none"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Int(i) => {
                let mut buf = itoa::Buffer::new();
                out.push_str(buf.format(i));
            }
            Value::Float(f) => {
                if f.is_nan() {
                    out.push_str("nan");
                } else if f.is_infinite() {
                    out.push_str(if f > 0.0 { "inf" } else { "-inf" });
                } else {
                    let mut buf = ryu::Buffer::new();
                    out.push_str(buf.format(f));
                }
            }
            Value::Ref(id) => match self.get(id) {
                HeapData::Str(s) => repr_str(s, out),
                HeapData::Big(b) => out.push_str(&b.to_string()),
                HeapData::Tuple(t) => {
                    if !seen.insert(id) {
                        out.push_str("(...)");
                        return Ok(());
                    }
                    let _guard = self.enter_recursive("repr")?;
                    out.push('(');
                    for (i, &item) in t.items().iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.repr_into(item, out, seen)?;
                    }
                    if t.len() == 1 {
                        out.push(',');
                    }
                    out.push(')');
                    seen.remove(&id);
                }
                HeapData::List(l) => {
                    if !seen.insert(id) {
                        out.push_str("[...]");
                        return Ok(());
                    }
                    let _guard = self.enter_recursive("repr")?;
                    out.push('[');
                    for (i, &item) in l.items().iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.repr_into(item, out, seen)?;
                    }
                    out.push(']');
                    seen.remove(&id);
                }
                HeapData::ListIter(_) => out.push_str("<list-iterator>"),
                HeapData::ListRevIter(_) => out.push_str("<list-reverse-iterator>"),
            },
        }
        Ok(())
    }
}

fn repr_str(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_scalars_and_containers() {
        let mut heap = Heap::new();
        let s = heap.new_str("hi\n").unwrap();
        let t = heap.new_tuple(vec![Value::Int(1)]).unwrap();
        let l = heap
            .list_from(vec![Value::None, Value::Bool(true), Value::Float(1.5), s, t])
            .unwrap();
        assert_eq!(
            heap.value_repr(l).unwrap(),
            "[none, true, 1.5, \"hi\\n\", (1,)]"
        );
        heap.release(l);
        assert_eq!(heap.live_count(), 0);
    }

    #[test]
    fn self_referential_list_renders_ellipsis() {
        let mut heap = Heap::new();
        let l = heap.list_from(vec![Value::Int(1)]).unwrap();
        heap.retain(l);
        heap.list_append(l, l).unwrap();
        assert_eq!(heap.value_repr(l).unwrap(), "[1, [...]]");
        // Break the cycle before dropping (cycle collection is out of scope).
        heap.list_pop(l, None).map(|v| heap.release(v)).unwrap();
        heap.release(l);
        assert_eq!(heap.live_count(), 0);
    }
}
