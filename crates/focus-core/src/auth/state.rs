//! Per-flow loading flag.

use std::cell::Cell;

/// Transient UI state for one flow. Owned by the caller and lent to each
/// submission; `loading` is true exactly while a request is in flight.
#[derive(Debug, Default)]
pub struct RequestState {
    loading: Cell<bool>,
}

impl RequestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Marks the flow busy. Returns `None` if it already is.
    ///
    /// The flag is cleared when the returned guard drops.
    pub fn begin(&self) -> Option<InFlight<'_>> {
        if self.loading.replace(true) {
            return None;
        }
        Some(InFlight { state: self })
    }
}

/// Clears the loading flag on drop.
#[derive(Debug)]
#[must_use = "dropping the guard clears the loading flag immediately"]
pub struct InFlight<'a> {
    state: &'a RequestState,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.loading.set(false);
    }
}
