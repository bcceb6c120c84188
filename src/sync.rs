//! Blocking mutex shared by the `std` and `no_std` builds.
//!
//! Only guards short, non-async critical sections such as drawing from the
//! shared generator or stamping a table entry. Access goes through
//! [`Mutex::with`], so no guard can outlive the closure and end up held
//! across an `.await`.

#[cfg(feature = "std")]
type Inner<T> = std::sync::Mutex<T>;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
type Inner<T> = spin::Mutex<T>;

pub struct Mutex<T>(Inner<T>);

impl<T> Mutex<T> {
    pub const fn new(value: T) -> Self {
        Self(Inner::new(value))
    }

    /// Runs `f` with exclusive access to the value.
    ///
    /// A poisoned `std` lock is recovered: the generator and timestamps kept
    /// here are valid after any partial update.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        #[cfg(feature = "std")]
        let mut guard = self
            .0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        #[cfg(all(not(feature = "std"), feature = "alloc"))]
        let mut guard = self.0.lock();

        f(&mut guard)
    }
}
