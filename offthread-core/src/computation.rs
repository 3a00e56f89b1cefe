//! Pure computations that can be relocated to a worker thread.
//!
//! A [`Computation`] wraps a plain function pointer. Function pointers cannot
//! capture their environment, so a computation is self-contained by
//! construction: whatever it needs must arrive through its input value.
//! Non-capturing closures coerce to function pointers, so call sites stay
//! short:
//!
//! ```
//! use offthread_core::Computation;
//!
//! let double = Computation::unary(|x: i32| x * 2);
//! assert_eq!(double.apply(Some(21)), Ok(42));
//!
//! let greet = Computation::nullary(|| "hi");
//! assert_eq!(greet.apply(None), Ok("hi"));
//! ```

use std::any::type_name;
use std::fmt;

use thiserror::Error;

/// A unary computation was applied without an input value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("computation `{shape}` requires an input value but none was given")]
pub struct MissingInput {
    /// Rendered signature of the computation.
    pub shape: &'static str,
}

/// Calling convention of a [`Computation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `fn(T) -> T`
    Unary,
    /// `fn() -> T`
    Nullary,
    /// `fn(Option<T>) -> T`
    Optional,
}

impl Shape {
    /// Returns a short name used in logs and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unary => "unary",
            Self::Nullary => "nullary",
            Self::Optional => "optional",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A self-contained function from `T` to `T`.
///
/// # Input handling
///
/// | shape      | input `Some(v)`  | input `None`          |
/// |------------|------------------|-----------------------|
/// | `Unary`    | `f(v)`           | [`MissingInput`]      |
/// | `Nullary`  | `f()`, `v` dropped | `f()`               |
/// | `Optional` | `f(Some(v))`     | `f(None)`             |
pub enum Computation<T> {
    /// Takes the input value.
    Unary(fn(T) -> T),
    /// Takes no arguments.
    Nullary(fn() -> T),
    /// Takes the input value if there is one.
    Optional(fn(Option<T>) -> T),
}

impl<T> Computation<T> {
    /// Wraps a function that takes the input value.
    pub fn unary(f: fn(T) -> T) -> Self {
        Self::Unary(f)
    }

    /// Wraps a function that takes no arguments.
    pub fn nullary(f: fn() -> T) -> Self {
        Self::Nullary(f)
    }

    /// Wraps a function that receives the input as an `Option`.
    pub fn optional(f: fn(Option<T>) -> T) -> Self {
        Self::Optional(f)
    }

    /// Returns the calling convention.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Unary(_) => Shape::Unary,
            Self::Nullary(_) => Shape::Nullary,
            Self::Optional(_) => Shape::Optional,
        }
    }

    /// Checks that `input` is acceptable for this computation without
    /// running it.
    pub fn check_input(&self, input: Option<&T>) -> Result<(), MissingInput> {
        match (self, input) {
            (Self::Unary(_), None) => Err(MissingInput {
                shape: self.signature(),
            }),
            _ => Ok(()),
        }
    }

    /// Runs the computation on the current thread.
    pub fn apply(self, input: Option<T>) -> Result<T, MissingInput> {
        match (self, input) {
            (Self::Unary(f), Some(value)) => Ok(f(value)),
            (Self::Unary(_), None) => Err(MissingInput {
                shape: self.signature(),
            }),
            (Self::Nullary(f), _) => Ok(f()),
            (Self::Optional(f), input) => Ok(f(input)),
        }
    }

    /// Renders the signature with concrete type names, e.g. `fn(i32) -> i32`.
    pub fn signature(&self) -> &'static str {
        match self {
            Self::Unary(_) => type_name::<fn(T) -> T>(),
            Self::Nullary(_) => type_name::<fn() -> T>(),
            Self::Optional(_) => type_name::<fn(Option<T>) -> T>(),
        }
    }
}

// Manual impls: a derive would require `T: Clone`, but function pointers are
// always `Copy`.
impl<T> Clone for Computation<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Computation<T> {}

impl<T> fmt::Debug for Computation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Computation")
            .field(&self.signature())
            .finish()
    }
}

impl<T> From<fn(T) -> T> for Computation<T> {
    fn from(f: fn(T) -> T) -> Self {
        Self::Unary(f)
    }
}

impl<T> From<fn() -> T> for Computation<T> {
    fn from(f: fn() -> T) -> Self {
        Self::Nullary(f)
    }
}

impl<T> From<fn(Option<T>) -> T> for Computation<T> {
    fn from(f: fn(Option<T>) -> T) -> Self {
        Self::Optional(f)
    }
}
