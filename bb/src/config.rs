use std::fmt;
use std::ops::Deref;

use tokio::sync::watch;

/// A setting that can be read and written to via immutable references.
/// This can be cloned to create multiple references to the same underlying setting, each clone
/// tracks separately whether it has seen the latest write.
pub struct Setting<T> {
    rx: watch::Receiver<T>,
    tx: watch::Sender<T>,
}

impl<T> Clone for Setting<T> {
    fn clone(&self) -> Self {
        Self { rx: self.rx.clone(), tx: self.tx.clone() }
    }
}

impl<T: Default> Default for Setting<T> {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl<T: PartialEq> PartialEq<T> for Setting<T> {
    #[inline]
    fn eq(&self, other: &T) -> bool {
        &*self.rx.borrow() == other
    }
}

impl<T: fmt::Debug> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.rx.borrow().deref().fmt(f)
    }
}

impl<T> Setting<T> {
    pub fn new(value: T) -> Self {
        let (tx, rx) = watch::channel(value);
        Self { rx, tx }
    }

    #[inline]
    pub fn read(&self) -> impl Deref<Target = T> + '_ {
        self.rx.borrow()
    }

    /// Whether a write happened since this handle last called [`Setting::read_changed`].
    #[inline]
    pub fn has_changed(&self) -> bool {
        // Can't fail as `self` keeps the sender alive.
        self.rx.has_changed().unwrap_or(false)
    }

    /// Returns the value if it was written since the last call, marking it as seen.
    pub fn read_changed(&mut self) -> Option<impl Deref<Target = T> + '_> {
        if !self.has_changed() {
            return None;
        }
        Some(self.rx.borrow_and_update())
    }

    #[inline]
    pub fn write(&self, value: T) {
        self.tx.send_replace(value);
    }
}
