//! Per-type operation tables.
//!
//! A host type opts into configuration by implementing [`Configurable`] and
//! listing its operations once, by conventional identifier and shape. The
//! shapes mirror what a reflective runtime would discover on its own:
//!
//! | shape                  | signature                        |
//! |------------------------|----------------------------------|
//! | `returns_child`        | `fn(&mut T) -> Shared<C>`        |
//! | `takes_child`          | `fn(&mut T, Shared<C>)`          |
//! | `takes_abstract_child` | `fn(&mut T, Shared<dyn Trait>)`  |
//! | `takes_value`          | `fn(&mut T, V)`                  |
//! | `takes_parsed`         | `fn(&mut T, V)`, `V: FromStr`    |
//!
//! Which family (create/add/addConfigured/set) an operation belongs to is
//! decided later by [`Descriptor`](super::Descriptor), from the identifier.

use super::object::{ObjectRef, Shared, TypeKey};
use crate::coerce::{AttributeType, AttributeValue, ValueKind, parse_boxed};
use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// A type that can be populated by the builder.
///
/// # Example
///
/// ```ignore
/// impl Configurable for BuildPath {
///     fn describe(ops: &mut Operations<Self>) {
///         ops.takes_value("setPath", |this, path: PathBuf| this.path = Some(path))
///             .returns_child("createXInterface", |this| this.new_interface())
///             .takes_child("addConfigured", |this, child: Shared<Include>| this.includes.push(child));
///     }
/// }
/// ```
pub trait Configurable: Any {
    fn describe(ops: &mut Operations<Self>)
    where
        Self: Sized;
}

/// Failure while running a registered operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("operation registered on {expected} invoked on {found}")]
    Target {
        expected: &'static str,
        found: &'static str,
    },

    #[error("expected argument of type {expected}, found {found}")]
    Argument {
        expected: &'static str,
        found: String,
    },

    #[error("{type_name} is already borrowed")]
    Busy { type_name: &'static str },
}

pub(crate) type FactoryFn = Rc<dyn Fn(&ObjectRef) -> Result<ObjectRef, InvokeError>>;
pub(crate) type AcceptFn = Rc<dyn Fn(&ObjectRef, &ObjectRef) -> Result<(), InvokeError>>;
pub(crate) type AssignFn = Rc<dyn Fn(&ObjectRef, AttributeValue) -> Result<(), InvokeError>>;
type UpcastFn = Rc<dyn Fn(Rc<dyn Any>) -> Option<Box<dyn Any>>>;

/// The declared parameter type of an object-accepting operation.
#[derive(Clone, Copy, Debug)]
pub struct ParamClass {
    key: TypeKey,
    constructor: Option<fn() -> ObjectRef>,
}

pub(crate) fn construct<C: Configurable + Default>() -> ObjectRef {
    ObjectRef::new(C::default())
}

impl ParamClass {
    pub fn constructible<C: Configurable + Default>() -> Self {
        Self {
            key: TypeKey::of::<C>(),
            constructor: Some(construct::<C>),
        }
    }

    pub fn abstract_of<C: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<C>(),
            constructor: None,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Builds a default instance, or `None` when the type has no default constructor.
    pub fn instantiate(&self) -> Option<ObjectRef> {
        self.constructor.map(|ctor| ctor())
    }
}

pub(crate) enum Signature {
    Factory { invoke: FactoryFn },
    Accept { param: ParamClass, invoke: AcceptFn },
    Assign { kind: ValueKind, invoke: AssignFn },
}

/// One registered operation.
pub struct Operation {
    identifier: &'static str,
    pub(crate) signature: Signature,
}

impl Operation {
    pub fn identifier(&self) -> &'static str {
        self.identifier
    }

    /// Parameter type, for object-accepting operations.
    pub fn param(&self) -> Option<ParamClass> {
        match &self.signature {
            Signature::Accept { param, .. } => Some(*param),
            _ => None,
        }
    }

    /// Value kind, for value-accepting operations.
    pub fn value_kind(&self) -> Option<&ValueKind> {
        match &self.signature {
            Signature::Assign { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub(crate) fn create(&self, target: &ObjectRef) -> Result<ObjectRef, InvokeError> {
        match &self.signature {
            Signature::Factory { invoke } => invoke(target),
            _ => Err(self.shape_mismatch("no argument")),
        }
    }

    pub(crate) fn accept(&self, target: &ObjectRef, child: &ObjectRef) -> Result<(), InvokeError> {
        match &self.signature {
            Signature::Accept { invoke, .. } => invoke(target, child),
            _ => Err(self.shape_mismatch(child.type_name())),
        }
    }

    pub(crate) fn assign(&self, target: &ObjectRef, value: AttributeValue) -> Result<(), InvokeError> {
        match &self.signature {
            Signature::Assign { invoke, .. } => invoke(target, value),
            _ => Err(self.shape_mismatch(value.type_label())),
        }
    }

    fn shape_mismatch(&self, found: &str) -> InvokeError {
        InvokeError::Argument {
            expected: self.identifier,
            found: found.to_string(),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match &self.signature {
            Signature::Factory { .. } => "factory".to_string(),
            Signature::Accept { param, .. } => format!("accepts {}", param.key),
            Signature::Assign { kind, .. } => format!("assigns {}", kind.type_name()),
        };
        write!(f, "{} ({})", self.identifier, shape)
    }
}

struct Upcast {
    cast: UpcastFn,
}

/// Collects the operation table of `T` during [`Configurable::describe`].
pub struct Operations<T> {
    operations: Vec<Rc<Operation>>,
    upcasts: HashMap<TypeId, Upcast>,
    _marker: PhantomData<fn(&mut T)>,
}

fn borrow_target<T: 'static>(target: &ObjectRef) -> Result<Shared<T>, InvokeError> {
    target.downcast::<T>().ok_or(InvokeError::Target {
        expected: type_name::<T>(),
        found: target.type_name(),
    })
}

fn busy<T>() -> InvokeError {
    InvokeError::Busy {
        type_name: type_name::<T>(),
    }
}

impl<T: Configurable> Operations<T> {
    fn new() -> Self {
        let mut ops = Self {
            operations: Vec::new(),
            upcasts: HashMap::new(),
            _marker: PhantomData,
        };
        ops.implements::<T>(|it| it);
        ops
    }

    /// Registers a zero-argument operation returning a new child.
    pub fn returns_child<C, F>(&mut self, identifier: &'static str, f: F) -> &mut Self
    where
        C: Configurable,
        F: Fn(&mut T) -> Shared<C> + 'static,
    {
        let invoke: FactoryFn = Rc::new(move |target: &ObjectRef| {
            let cell = borrow_target::<T>(target)?;
            let mut this = cell.try_borrow_mut().map_err(|_| busy::<T>())?;
            Ok(ObjectRef::from_shared(f(&mut this)))
        });
        self.push(identifier, Signature::Factory { invoke })
    }

    /// Registers a one-argument operation taking a default-constructible child.
    pub fn takes_child<C, F>(&mut self, identifier: &'static str, f: F) -> &mut Self
    where
        C: Configurable + Default,
        F: Fn(&mut T, Shared<C>) + 'static,
    {
        self.push_accept(identifier, ParamClass::constructible::<C>(), f)
    }

    /// Registers a one-argument operation whose parameter type cannot be
    /// instantiated by the builder, typically `dyn Trait`.
    pub fn takes_abstract_child<C, F>(&mut self, identifier: &'static str, f: F) -> &mut Self
    where
        C: ?Sized + 'static,
        F: Fn(&mut T, Shared<C>) + 'static,
    {
        self.push_accept(identifier, ParamClass::abstract_of::<C>(), f)
    }

    /// Registers a one-argument operation taking a value coerced from a string.
    pub fn takes_value<V, F>(&mut self, identifier: &'static str, f: F) -> &mut Self
    where
        V: AttributeType,
        F: Fn(&mut T, V) + 'static,
    {
        self.push_assign(identifier, V::kind(), V::from_value, f)
    }

    /// Registers a one-argument operation whose value is built with
    /// `V::from_str`. Works for foreign types such as `std::net::IpAddr`,
    /// which cannot implement [`AttributeType`] outside this crate.
    pub fn takes_parsed<V, F>(&mut self, identifier: &'static str, f: F) -> &mut Self
    where
        V: FromStr + 'static,
        V::Err: fmt::Display,
        F: Fn(&mut T, V) + 'static,
    {
        let kind = ValueKind::Parsed {
            type_name: type_name::<V>(),
            parse: parse_boxed::<V>,
        };
        let unwrap: fn(AttributeValue) -> Option<V> = |value| match value {
            AttributeValue::Parsed(boxed) => boxed.downcast::<V>().ok().map(|v| *v),
            _ => None,
        };
        self.push_assign(identifier, kind, unwrap, f)
    }

    /// Declares that `T` may be used wherever `U` is expected.
    pub fn implements<U>(&mut self, upcast: fn(Shared<T>) -> Shared<U>) -> &mut Self
    where
        U: ?Sized + 'static,
    {
        let cast: UpcastFn = Rc::new(move |cell: Rc<dyn Any>| {
            let concrete = cell.downcast::<RefCell<T>>().ok()?;
            Some(Box::new(upcast(concrete)) as Box<dyn Any>)
        });
        self.upcasts.insert(TypeId::of::<U>(), Upcast { cast });
        self
    }

    fn push_accept<C, F>(&mut self, identifier: &'static str, param: ParamClass, f: F) -> &mut Self
    where
        C: ?Sized + 'static,
        F: Fn(&mut T, Shared<C>) + 'static,
    {
        let invoke: AcceptFn = Rc::new(move |target: &ObjectRef, child: &ObjectRef| {
            let cell = borrow_target::<T>(target)?;
            let child = child.cast::<C>().ok_or_else(|| InvokeError::Argument {
                expected: type_name::<C>(),
                found: child.type_name().to_string(),
            })?;
            let mut this = cell.try_borrow_mut().map_err(|_| busy::<T>())?;
            f(&mut this, child);
            Ok(())
        });
        self.push(identifier, Signature::Accept { param, invoke })
    }

    fn push_assign<V, F>(
        &mut self,
        identifier: &'static str,
        kind: ValueKind,
        unwrap: fn(AttributeValue) -> Option<V>,
        f: F,
    ) -> &mut Self
    where
        V: 'static,
        F: Fn(&mut T, V) + 'static,
    {
        let invoke: AssignFn = Rc::new(move |target: &ObjectRef, value: AttributeValue| {
            let cell = borrow_target::<T>(target)?;
            let found = value.type_label().to_string();
            let value = unwrap(value).ok_or(InvokeError::Argument {
                expected: type_name::<V>(),
                found,
            })?;
            let mut this = cell.try_borrow_mut().map_err(|_| busy::<T>())?;
            f(&mut this, value);
            Ok(())
        });
        self.push(identifier, Signature::Assign { kind, invoke })
    }

    fn push(&mut self, identifier: &'static str, signature: Signature) -> &mut Self {
        self.operations.push(Rc::new(Operation {
            identifier,
            signature,
        }));
        self
    }
}

thread_local! {
    static CLASSES: RefCell<HashMap<TypeId, Rc<Class>>> = RefCell::new(HashMap::new());
}

/// Operation table and supertype list of one configurable type.
pub struct Class {
    key: TypeKey,
    operations: Vec<Rc<Operation>>,
    upcasts: HashMap<TypeId, Upcast>,
}

impl Class {
    /// The frozen operation table of `T`. `T::describe` runs once per
    /// thread; later calls share the same table.
    pub fn of<T: Configurable>() -> Rc<Class> {
        let id = TypeId::of::<T>();
        if let Some(class) = CLASSES.with(|classes| classes.borrow().get(&id).cloned()) {
            return class;
        }
        // Described outside the borrow so nested lookups stay possible.
        let class = Rc::new(Self::describe::<T>());
        CLASSES.with(|classes| classes.borrow_mut().entry(id).or_insert(class).clone())
    }

    fn describe<T: Configurable>() -> Class {
        let mut ops = Operations::<T>::new();
        T::describe(&mut ops);
        Class {
            key: TypeKey::of::<T>(),
            operations: ops.operations,
            upcasts: ops.upcasts,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn operations(&self) -> &[Rc<Operation>] {
        &self.operations
    }

    /// `true` for the type itself and every supertype declared with `implements`.
    pub fn is_assignable_to(&self, key: TypeKey) -> bool {
        self.upcasts.contains_key(&key.id())
    }

    pub(crate) fn upcast(&self, cell: Rc<dyn Any>, key: TypeKey) -> Option<Box<dyn Any>> {
        let upcast = self.upcasts.get(&key.id())?;
        (upcast.cast)(cell)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("key", &self.key)
            .field("operations", &self.operations)
            .finish()
    }
}
