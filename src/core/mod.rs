//! In-memory view state, product cache, and debounce timer.

/// Ordered product cache with id index.
pub mod catalog;
/// Cancellable quiet-period timer.
pub mod debounce;
/// Screen state and its pure transitions.
pub mod view;
