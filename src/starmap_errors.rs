use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StarmapError {
    #[error("Invalid value for `{name}`: {value} is outside [{min}, {max}]")]
    IndexOutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Index selection is empty: {0}")]
    EmptySelection(String),

    #[error("Invalid coefficient array shape.")]
    InvalidArrayShape,

    #[error("Mismatch in index array and coefficient array sizes: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Operation not supported: {0}")]
    Capability(String),

    #[error("Numerical kernel failure: {0}")]
    Kernel(String),

    #[error("Imaging service error: {0}")]
    Imaging(String),
}

impl PartialEq for StarmapError {
    fn eq(&self, other: &Self) -> bool {
        use StarmapError::*;
        match (self, other) {
            (
                IndexOutOfRange {
                    name: a,
                    value: va,
                    ..
                },
                IndexOutOfRange {
                    name: b,
                    value: vb,
                    ..
                },
            ) => a == b && va == vb,
            (EmptySelection(a), EmptySelection(b)) => a == b,
            (
                ShapeMismatch {
                    expected: ea,
                    found: fa,
                },
                ShapeMismatch {
                    expected: eb,
                    found: fb,
                },
            ) => ea == eb && fa == fb,
            (Configuration(a), Configuration(b)) => a == b,
            (Capability(a), Capability(b)) => a == b,

            // Messages from external collaborators are not compared
            (Kernel(_), Kernel(_)) => true,
            (Imaging(_), Imaging(_)) => true,

            (InvalidArrayShape, InvalidArrayShape) => true,

            _ => false,
        }
    }
}
