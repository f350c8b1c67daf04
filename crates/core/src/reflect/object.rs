//! Type-erased handles to live, shared objects.

use super::class::{Class, Configurable};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A shared, interior-mutable object. Parents and the builder stack hold the
/// same child through clones of this pointer.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps `value` into a [`Shared`] pointer.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Runtime identity of a type (concrete or `dyn Trait`).
///
/// Equality and hashing only consider the `TypeId`; the name is carried
/// along for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full type path, e.g. `my_app::model::BuildPath`.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type-erased handle on a `Shared<T>` where `T: Configurable`.
///
/// Cloning the handle clones the pointer, never the object.
#[derive(Clone)]
pub struct ObjectRef {
    cell: Rc<dyn Any>,
    class: Rc<Class>,
}

impl ObjectRef {
    /// Moves `value` into a fresh shared cell.
    pub fn new<T: Configurable>(value: T) -> Self {
        Self::from_shared(shared(value))
    }

    /// Wraps an existing shared cell without copying it.
    pub fn from_shared<T: Configurable>(value: Shared<T>) -> Self {
        Self {
            cell: value,
            class: Class::of::<T>(),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    pub fn type_key(&self) -> TypeKey {
        self.class.key()
    }

    pub fn type_name(&self) -> &'static str {
        self.class.key().name()
    }

    /// Returns `true` if the handle points at a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.cell.is::<RefCell<T>>()
    }

    /// Recovers the concrete shared pointer.
    pub fn downcast<T: 'static>(&self) -> Option<Shared<T>> {
        self.cell.clone().downcast::<RefCell<T>>().ok()
    }

    /// Views the object as `Shared<U>`, where `U` is the object's own type or
    /// one of the supertypes it declared with `Operations::implements`.
    pub fn cast<U: ?Sized + 'static>(&self) -> Option<Shared<U>> {
        self.class
            .upcast(self.cell.clone(), TypeKey::of::<U>())?
            .downcast::<Shared<U>>()
            .ok()
            .map(|boxed| *boxed)
    }

    /// Returns `true` if [`ObjectRef::cast`] to `key` would succeed.
    pub fn is_assignable_to(&self, key: TypeKey) -> bool {
        self.class.is_assignable_to(key)
    }

    /// Pointer identity.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.cell), Rc::as_ptr(&other.cell))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.type_name())
    }
}

impl<T: Configurable> From<Shared<T>> for ObjectRef {
    fn from(value: Shared<T>) -> Self {
        ObjectRef::from_shared(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Operations;

    trait Named {
        fn label(&self) -> String;
    }

    #[derive(Default)]
    struct Widget {
        label: String,
    }

    impl Named for Widget {
        fn label(&self) -> String {
            self.label.clone()
        }
    }

    impl Configurable for Widget {
        fn describe(ops: &mut Operations<Self>) {
            ops.implements::<dyn Named>(|it| it);
        }
    }

    #[derive(Default)]
    struct Plain;

    impl Configurable for Plain {
        fn describe(_ops: &mut Operations<Self>) {}
    }

    #[test]
    fn test_downcast_returns_same_cell() {
        let widget = shared(Widget::default());
        let obj = ObjectRef::from_shared(widget.clone());

        let back = obj.downcast::<Widget>().unwrap();
        back.borrow_mut().label = "changed".to_string();
        assert_eq!(widget.borrow().label, "changed");
        assert!(obj.is::<Widget>());
        assert!(!obj.is::<Plain>());
        assert!(obj.downcast::<Plain>().is_none());
    }

    #[test]
    fn test_cast_to_declared_trait() {
        let obj = ObjectRef::new(Widget {
            label: "w".to_string(),
        });
        let named = obj.cast::<dyn Named>().unwrap();
        assert_eq!(named.borrow().label(), "w");
        assert!(obj.is_assignable_to(TypeKey::of::<dyn Named>()));
        assert!(obj.is_assignable_to(TypeKey::of::<Widget>()));
    }

    #[test]
    fn test_cast_to_undeclared_trait_fails() {
        let obj = ObjectRef::new(Plain);
        assert!(obj.cast::<dyn Named>().is_none());
        assert!(!obj.is_assignable_to(TypeKey::of::<dyn Named>()));
    }

    #[test]
    fn test_clones_share_identity() {
        let obj = ObjectRef::new(Plain);
        let other = obj.clone();
        assert!(obj.ptr_eq(&other));
        assert!(!obj.ptr_eq(&ObjectRef::new(Plain)));
    }

    #[test]
    fn test_type_key_equality_ignores_name() {
        assert_eq!(TypeKey::of::<Widget>(), TypeKey::of::<Widget>());
        assert_ne!(TypeKey::of::<Widget>(), TypeKey::of::<dyn Named>());
        assert!(TypeKey::of::<Widget>().name().ends_with("Widget"));
    }

    thread_local! {
        static DESCRIBED: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
    }

    #[derive(Default)]
    struct Counted;

    impl Configurable for Counted {
        fn describe(_ops: &mut Operations<Self>) {
            DESCRIBED.with(|count| count.set(count.get() + 1));
        }
    }

    #[test]
    fn test_class_is_described_once_per_type() {
        let first = ObjectRef::new(Counted);
        let second = ObjectRef::new(Counted);
        assert!(Rc::ptr_eq(first.class(), second.class()));
        assert!(Rc::ptr_eq(first.class(), &Class::of::<Counted>()));
        assert_eq!(DESCRIBED.with(|count| count.get()), 1);
    }
}
