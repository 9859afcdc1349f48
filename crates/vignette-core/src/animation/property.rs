//! Shared numeric attributes that interpolators write into.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A named numeric attribute shared between its owner and any interpolator
/// animating it.
///
/// Cloning a `Property` yields another handle to the same value, so a scene can
/// keep its offset fields while the orchestrator hands copies to interpolators.
/// Single-threaded by construction (`Rc<Cell<_>>`), matching the one-tick game
/// loop.
#[derive(Clone)]
pub struct Property {
    name: Rc<str>,
    value: Rc<Cell<f32>>,
}

impl Property {
    /// Create a new attribute with a label used in logs.
    pub fn new(name: impl Into<Rc<str>>, initial: f32) -> Self {
        Self {
            name: name.into(),
            value: Rc::new(Cell::new(initial)),
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.get()
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.value.set(value);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if both handles point at the same attribute.
    pub fn same_as(&self, other: &Property) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property({}={})", self.name, self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let a = Property::new("overlay.opacity", 0.0);
        let b = a.clone();
        b.set(128.0);
        assert_eq!(a.get(), 128.0);
        assert!(a.same_as(&b));
    }

    #[test]
    fn test_distinct_properties() {
        let a = Property::new("x", 1.0);
        let b = Property::new("x", 1.0);
        assert!(!a.same_as(&b));
        assert_eq!(a.name(), "x");
    }
}
