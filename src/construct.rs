//! Compile-time construction strategies for boxed values.
//!
//! A box is built from a *tag*: a small wrapper whose type says how the
//! protected value should come into existence. Each tag implements
//! [`Construct`] and carries its [`Strategy`] as an associated constant, so
//! the initialization path is fixed by the type checker and never decided by
//! a runtime branch.
//!
//! Strategies in order of preference, with the capability each needs:
//!
//! | Rank | [`Strategy`]                      | Tag                               | Requires on `T`     |
//! |------|-----------------------------------|-----------------------------------|---------------------|
//! | 1    | [`MoveConstruct`][Strategy::MoveConstruct]     | [`Moved`]                   | nothing             |
//! | 2    | [`MoveAssign`][Strategy::MoveAssign]           | [`MoveAssigned`]            | `Default`           |
//! | 3    | [`CloneMoveAssign`][Strategy::CloneMoveAssign] | [`CloneAssigned`]           | `Clone + Default`   |
//! | 4    | [`CopyConstruct`][Strategy::CopyConstruct]     | [`Copied`], `&T`            | `Copy` / `Clone`    |
//! | 5    | [`CopyAssign`][Strategy::CopyAssign]           | [`CopyAssigned`]            | `Copy + Default`    |
//! | 6    | [`InPlace`][Strategy::InPlace]                 | [`InPlace`], [`Emplace`]    | `From<A>` / closure |
//!
//! Fallible in-place construction goes through [`TryConstruct`] with
//! [`TryInPlace`] and [`TryEmplace`]; the constructor's error comes back to the
//! caller unchanged.
//!
//! ```
//! use lockbox::{Construct, Copied, InPlace, Moved, Strategy};
//!
//! assert_eq!(<Moved<u8> as Construct<u8>>::STRATEGY, Strategy::MoveConstruct);
//! assert_eq!(<Copied<'_, u8> as Construct<u8>>::STRATEGY, Strategy::CopyConstruct);
//! assert_eq!(<InPlace<&str> as Construct<String>>::STRATEGY, Strategy::InPlace);
//! assert!(Strategy::MoveConstruct < Strategy::InPlace);
//! ```

use std::fmt;

/// How a boxed value is initialized.
///
/// Variants are declared in order of preference; `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strategy {
    /// The source value is moved straight into storage.
    MoveConstruct,
    /// Storage is default-initialized, then the source is move-assigned.
    MoveAssign,
    /// The source is cloned into a local, which is then move-assigned into
    /// default-initialized storage.
    CloneMoveAssign,
    /// Storage is a copy of the source.
    CopyConstruct,
    /// Storage is default-initialized, then a copy of the source is assigned.
    CopyAssign,
    /// The value is built from constructor arguments.
    InPlace,
}

impl Strategy {
    /// All strategies, most preferred first.
    pub const ALL: [Self; 6] = [
        Self::MoveConstruct,
        Self::MoveAssign,
        Self::CloneMoveAssign,
        Self::CopyConstruct,
        Self::CopyAssign,
        Self::InPlace,
    ];

    /// Returns a stable name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MoveConstruct => "move-construct",
            Self::MoveAssign => "move-assign",
            Self::CloneMoveAssign => "clone-move-assign",
            Self::CopyConstruct => "copy-construct",
            Self::CopyAssign => "copy-assign",
            Self::InPlace => "in-place",
        }
    }

    /// Returns the 1-based preference rank.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A source that can initialize a `T`.
pub trait Construct<T> {
    /// The path this source takes, known at compile time.
    const STRATEGY: Strategy;

    /// Produces the value to store.
    fn construct(self) -> T;
}

/// A source that can initialize a `T` or report why it could not.
pub trait TryConstruct<T> {
    /// Error reported by the value's own constructor.
    type Error;

    /// The path this source takes, known at compile time.
    const STRATEGY: Strategy;

    /// Produces the value to store, or the constructor's error.
    fn try_construct(self) -> Result<T, Self::Error>;
}

// Assignment through a reference keeps "initialize, then overwrite" explicit
// without tripping the unused-assignment lint.
#[inline]
fn assign<T>(slot: &mut T, value: T) {
    *slot = value;
}

/// Move the value into storage.
#[derive(Debug)]
pub struct Moved<T>(pub T);

impl<T> Construct<T> for Moved<T> {
    const STRATEGY: Strategy = Strategy::MoveConstruct;

    #[inline]
    fn construct(self) -> T {
        self.0
    }
}

/// Default-initialize storage, then move-assign the value into it.
#[derive(Debug)]
pub struct MoveAssigned<T>(pub T);

impl<T: Default> Construct<T> for MoveAssigned<T> {
    const STRATEGY: Strategy = Strategy::MoveAssign;

    #[inline]
    fn construct(self) -> T {
        let mut slot = T::default();
        assign(&mut slot, self.0);
        slot
    }
}

/// Clone the referenced value into a local, then move-assign that local into
/// default-initialized storage.
#[derive(Debug)]
pub struct CloneAssigned<'a, T>(pub &'a T);

impl<T: Clone + Default> Construct<T> for CloneAssigned<'_, T> {
    const STRATEGY: Strategy = Strategy::CloneMoveAssign;

    #[inline]
    fn construct(self) -> T {
        let local = self.0.clone();
        let mut slot = T::default();
        assign(&mut slot, local);
        slot
    }
}

/// Copy the referenced value bit for bit; `Clone::clone` is never called.
#[derive(Debug)]
pub struct Copied<'a, T>(pub &'a T);

impl<T: Copy> Construct<T> for Copied<'_, T> {
    const STRATEGY: Strategy = Strategy::CopyConstruct;

    #[inline]
    fn construct(self) -> T {
        *self.0
    }
}

/// A bare reference copy-constructs through `Clone`.
impl<T: Clone> Construct<T> for &T {
    const STRATEGY: Strategy = Strategy::CopyConstruct;

    #[inline]
    fn construct(self) -> T {
        self.clone()
    }
}

/// Default-initialize storage, then assign a copy of the referenced value.
#[derive(Debug)]
pub struct CopyAssigned<'a, T>(pub &'a T);

impl<T: Copy + Default> Construct<T> for CopyAssigned<'_, T> {
    const STRATEGY: Strategy = Strategy::CopyAssign;

    #[inline]
    fn construct(self) -> T {
        let mut slot = T::default();
        assign(&mut slot, *self.0);
        slot
    }
}

/// Build the value from constructor arguments through `From`.
///
/// Several arguments travel as a tuple:
///
/// ```
/// use lockbox::{ExclusiveBox, InPlace};
///
/// struct Endpoint {
///     host: String,
///     port: u16,
/// }
///
/// impl From<(&str, u16)> for Endpoint {
///     fn from((host, port): (&str, u16)) -> Self {
///         Self { host: host.to_owned(), port }
///     }
/// }
///
/// let endpoint: ExclusiveBox<Endpoint> = ExclusiveBox::with(InPlace(("localhost", 8080)));
/// assert_eq!(endpoint.lock().port, 8080);
/// ```
#[derive(Debug)]
pub struct InPlace<A>(pub A);

impl<A, T: From<A>> Construct<T> for InPlace<A> {
    const STRATEGY: Strategy = Strategy::InPlace;

    #[inline]
    fn construct(self) -> T {
        T::from(self.0)
    }
}

/// Build the value by running a constructor closure.
pub struct Emplace<F>(pub F);

impl<T, F: FnOnce() -> T> Construct<T> for Emplace<F> {
    const STRATEGY: Strategy = Strategy::InPlace;

    #[inline]
    fn construct(self) -> T {
        (self.0)()
    }
}

impl<F> fmt::Debug for Emplace<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Emplace").finish_non_exhaustive()
    }
}

/// Build the value from constructor arguments through `TryFrom`.
#[derive(Debug)]
pub struct TryInPlace<A>(pub A);

impl<A, T: TryFrom<A>> TryConstruct<T> for TryInPlace<A> {
    type Error = T::Error;

    const STRATEGY: Strategy = Strategy::InPlace;

    #[inline]
    fn try_construct(self) -> Result<T, Self::Error> {
        T::try_from(self.0)
    }
}

/// Build the value by running a fallible constructor closure.
pub struct TryEmplace<F>(pub F);

impl<T, E, F: FnOnce() -> Result<T, E>> TryConstruct<T> for TryEmplace<F> {
    type Error = E;

    const STRATEGY: Strategy = Strategy::InPlace;

    #[inline]
    fn try_construct(self) -> Result<T, E> {
        (self.0)()
    }
}

impl<F> fmt::Debug for TryEmplace<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TryEmplace").finish_non_exhaustive()
    }
}
