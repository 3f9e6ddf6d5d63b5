use once_cell::sync::Lazy;

/// Memoizes a zero-argument function.
///
/// The wrapped function runs at most once, on the first call of the returned
/// closure; every later call clones the stored result. Concurrent first calls
/// block until the single computation finishes, so this is safe to share
/// across threads.
///
/// Note that `func` is `FnOnce`: it may move captured state into the result.
///
/// # Examples
///
/// ```
/// use memito_core::memoize_once;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// static CALLS: AtomicUsize = AtomicUsize::new(0);
///
/// let defaults = memoize_once(|| {
///     CALLS.fetch_add(1, Ordering::SeqCst);
///     vec!["alpha", "beta"]
/// });
///
/// assert_eq!(defaults(), vec!["alpha", "beta"]);
/// assert_eq!(defaults(), vec!["alpha", "beta"]);
/// assert_eq!(CALLS.load(Ordering::SeqCst), 1);
/// ```
pub fn memoize_once<V, F>(func: F) -> impl Fn() -> V
where
    V: Clone,
    F: FnOnce() -> V,
{
    let cell = Lazy::new(func);
    move || (*cell).clone()
}
