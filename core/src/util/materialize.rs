use std::sync::Arc;

use parking_lot::Mutex;

/// The state of a lazily computed value
enum State<T> {
    Unmaterialized,
    Materialized(Arc<T>),
}

/// A slot that computes its value on first access and keeps it for the rest
/// of its lifetime.
///
/// The computation runs while the slot's guard is held, so concurrent first
/// callers wait for the running computation instead of starting their own.
/// If the computation fails, the slot stays unmaterialized and the next
/// caller tries again.
pub struct MaterializeOnce<T> {
    state: Mutex<State<T>>,
}

impl<T> Default for MaterializeOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MaterializeOnce<T> {
    /// Creates an empty slot
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Unmaterialized),
        }
    }

    /// Returns the stored value or computes it with `f`. The error returned
    /// by `f` is passed through unchanged and nothing is stored.
    pub fn get_or_try_init<E, F>(&self, f: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut state = self.state.lock();
        match &*state {
            State::Materialized(value) => Ok(Arc::clone(value)),
            State::Unmaterialized => {
                let value = Arc::new(f()?);
                *state = State::Materialized(Arc::clone(&value));
                Ok(value)
            }
        }
    }

    /// Returns the stored value without computing it
    pub fn get(&self) -> Option<Arc<T>> {
        match &*self.state.lock() {
            State::Materialized(value) => Some(Arc::clone(value)),
            State::Unmaterialized => None,
        }
    }

    /// Checks if the value has been computed
    pub fn is_materialized(&self) -> bool {
        matches!(&*self.state.lock(), State::Materialized(_))
    }
}
