//! Utility macros shared by the grammar and protocol modules.

/// Returns early with an error if a condition is not met.
///
/// Works like `assert!`, but returns `Err($error)` instead of panicking. The
/// error expression is only evaluated when the predicate fails, so building a
/// formatted reason costs nothing on the happy path.
///
/// # Example
///
/// ```ignore
/// ensure!(!value.is_empty(), "value must not be empty".to_owned());
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
