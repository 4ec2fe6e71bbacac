//! Object core of the tova runtime: a reference-counted heap arena, the
//! resizable list container built on it, and the adaptive stable sort entry
//! point (the merge machinery itself lives in `tova-sort`).
//!
//! Values are 16-byte `Copy` handles; heap objects carry explicit reference
//! counts managed by convention through [`Heap::retain`] / [`Heap::release`].
//! The hazard this crate is organized around is re-entrancy, not threads:
//! releasing a reference or running a comparison can cascade into code that
//! synchronously calls back into the very container being mutated, so every
//! mutating operation restores a consistent container shape before any
//! release or callback can run.

pub mod compare;
pub mod error;
pub mod heap;
pub mod iter;
pub mod list;
pub mod listsort;
mod repr;
pub mod value;

pub use compare::{select_comparator, CmpOp, KeyCmp};
pub use error::{ErrorKind, ObjError, ObjResult};
pub use heap::{Heap, HeapData, HeapId, Tuple};
pub use list::{grow_target, List, SliceSpec};
pub use listsort::{CompareFn, KeyFn, SortSpec};
pub use value::{TypeTag, Value};
