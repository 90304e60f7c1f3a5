use std::any::Any;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::errors::{MotionError, Result};

/// Identifies an animatable field of a target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyId(&'static str);

impl PropertyId {
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Typed field token: reads and writes one property of `T` holding a `V`.
///
/// Built once when a template is constructed; the engine never looks fields
/// up by name at runtime. The getter returns an owned copy, so a snapshot
/// never aliases the live field.
pub struct Property<T, V> {
    name: &'static str,
    get: fn(&T) -> V,
    set: fn(&mut T, V),
}

impl<T, V> Clone for Property<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Property<T, V> {}

impl<T, V> fmt::Debug for Property<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.name).finish()
    }
}

impl<T, V> Property<T, V> {
    #[must_use]
    pub fn new(name: &'static str, get: fn(&T) -> V, set: fn(&mut T, V)) -> Self {
        Self { name, get, set }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> PropertyId {
        PropertyId(self.name)
    }

    #[inline]
    pub fn get(&self, target: &T) -> V {
        (self.get)(target)
    }

    #[inline]
    pub fn set(&self, target: &mut T, value: V) {
        (self.set)(target, value);
    }
}

impl<T, V: 'static> Property<T, V> {
    /// Looks up this property's value in a snapshot.
    pub fn initial<'a>(&self, initial: &'a InitialValues) -> Result<&'a V> {
        initial
            .get::<V>(self.id())
            .ok_or(MotionError::MissingInitialValue(self.name))
    }
}

/// Declares a [`Property`] token for a plain struct field.
///
/// ```rust,ignore
/// struct Dot { x: f64 }
/// let x = property!(Dot, x);
/// ```
#[macro_export]
macro_rules! property {
    ($target:ty, $field:ident) => {
        $crate::animation::Property::new(
            stringify!($field),
            |target: &$target| ::std::clone::Clone::clone(&target.$field),
            |target: &mut $target, value| target.$field = value,
        )
    };
}

/// A property whose pre-animation value a template needs.
pub trait PickProperty<T> {
    fn id(&self) -> PropertyId;

    /// Copies the property's current value from `target` into `into`.
    fn capture(&self, target: &T, into: &mut InitialValues);
}

impl<T, V: 'static> PickProperty<T> for Property<T, V> {
    fn id(&self) -> PropertyId {
        Property::id(self)
    }

    fn capture(&self, target: &T, into: &mut InitialValues) {
        into.insert(self.id(), self.get(target));
    }
}

/// Shared, type-erased picked property.
pub type Picked<T> = Rc<dyn PickProperty<T>>;

/// Wraps a property token for a template's picked set.
#[must_use]
pub fn pick<T: 'static, V: 'static>(property: Property<T, V>) -> Picked<T> {
    Rc::new(property)
}

/// Snapshot of every picked property, taken once when playback starts.
#[derive(Default)]
pub struct InitialValues {
    values: FxHashMap<PropertyId, Box<dyn Any>>,
}

impl InitialValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<V: 'static>(&mut self, id: PropertyId, value: V) {
        self.values.insert(id, Box::new(value));
    }

    #[must_use]
    pub fn get<V: 'static>(&self, id: PropertyId) -> Option<&V> {
        self.values.get(&id).and_then(|value| value.downcast_ref::<V>())
    }

    #[must_use]
    pub fn contains(&self, id: PropertyId) -> bool {
        self.values.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for InitialValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        position: [f64; 2],
        label: String,
    }

    #[test]
    fn test_property_get_set() {
        let position = property!(Probe, position);
        let mut probe = Probe {
            position: [1.0, 2.0],
            label: String::new(),
        };

        assert_eq!(position.get(&probe), [1.0, 2.0]);
        position.set(&mut probe, [3.0, 4.0]);
        assert_eq!(probe.position, [3.0, 4.0]);
        assert_eq!(position.id().name(), "position");
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let label = property!(Probe, label);
        let mut probe = Probe {
            position: [0.0; 2],
            label: "before".to_string(),
        };

        let mut initial = InitialValues::new();
        label.capture(&probe, &mut initial);
        probe.label.push_str(" and after");

        assert_eq!(label.initial(&initial).unwrap(), "before");
    }

    #[test]
    fn test_missing_initial_value() {
        let label = property!(Probe, label);
        let initial = InitialValues::new();
        assert_eq!(
            label.initial(&initial),
            Err(MotionError::MissingInitialValue("label"))
        );
    }
}
