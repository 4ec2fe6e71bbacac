use std::fmt;

/// Failure categories surfaced by the object core. Every kind is recoverable
/// by the caller; no operation leaves a container inconsistent on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An allocation or reallocation failed, or a size computation would
    /// overflow. The affected container is unchanged.
    OutOfMemory,
    /// A scalar or slice index was out of bounds or malformed.
    IndexOutOfRange,
    /// An operand of the wrong kind was passed to an operation.
    TypeMismatch,
    /// A stride-slice assignment disagreed with the slice length.
    LengthMismatch,
    /// A lookup (`remove`, `index`) did not find the requested value.
    NotFound,
    /// A caller-supplied comparison or key function reported an error.
    CompareFailed,
    /// A callback structurally modified the list while it was being sorted.
    /// Reported only after the list has been restored to a consistent state.
    MutatedDuringSort,
    /// Value comparison or repr recursed past the depth limit (cyclic or
    /// extremely deep containers).
    RecursionLimit,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::OutOfMemory => "out of memory",
            ErrorKind::IndexOutOfRange => "index out of range",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::LengthMismatch => "length mismatch",
            ErrorKind::NotFound => "not found",
            ErrorKind::CompareFailed => "comparison failed",
            ErrorKind::MutatedDuringSort => "mutated during sort",
            ErrorKind::RecursionLimit => "recursion limit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ObjError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ObjError {
            kind,
            message: message.into(),
        }
    }

    pub fn out_of_memory(what: &str) -> Self {
        ObjError::new(ErrorKind::OutOfMemory, format!("cannot allocate {what}"))
    }

    pub fn index_out_of_range(message: impl Into<String>) -> Self {
        ObjError::new(ErrorKind::IndexOutOfRange, message)
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        ObjError::new(ErrorKind::TypeMismatch, message)
    }

    pub fn length_mismatch(message: impl Into<String>) -> Self {
        ObjError::new(ErrorKind::LengthMismatch, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ObjError::new(ErrorKind::NotFound, message)
    }

    pub fn mutated_during_sort() -> Self {
        ObjError::new(ErrorKind::MutatedDuringSort, "list modified during sort")
    }

    pub fn recursion_limit(what: &str) -> Self {
        ObjError::new(
            ErrorKind::RecursionLimit,
            format!("recursion limit exceeded in {what}"),
        )
    }
}

impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for ObjError {}

pub type ObjResult<T> = Result<T, ObjError>;
