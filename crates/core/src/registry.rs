//! Name to type bindings ("typedefs").

use crate::reflect::{Class, Configurable, ObjectRef, TypeKey, construct};
use std::collections::HashMap;
use std::rc::Rc;

/// A registered type: its operation table and, when it has one, a default
/// constructor.
#[derive(Clone, Debug)]
pub struct TypeDef {
    class: Rc<Class>,
    constructor: Option<fn() -> ObjectRef>,
}

impl TypeDef {
    pub fn of<T: Configurable + Default>() -> Self {
        Self {
            class: Class::of::<T>(),
            constructor: Some(construct::<T>),
        }
    }

    /// A type the builder can match against but never instantiate.
    pub fn without_constructor<T: Configurable>() -> Self {
        Self {
            class: Class::of::<T>(),
            constructor: None,
        }
    }

    pub(crate) fn from_class(class: Rc<Class>) -> Self {
        Self {
            class,
            constructor: None,
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    pub fn key(&self) -> TypeKey {
        self.class.key()
    }

    pub fn instantiate(&self) -> Option<ObjectRef> {
        self.constructor.map(|ctor| ctor())
    }
}

/// A resolved type reference, the value of `TypeRef`-typed attributes.
#[derive(Clone, Debug)]
pub struct TypeRef {
    name: String,
    def: TypeDef,
}

impl TypeRef {
    /// The name the reference was resolved from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> TypeKey {
        self.def.key()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.key() == TypeKey::of::<T>()
    }

    pub fn instantiate(&self) -> Option<ObjectRef> {
        self.def.instantiate()
    }
}

#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    defs: HashMap<String, TypeDef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `def`, returning the previous binding.
    pub fn register(&mut self, name: impl Into<String>, def: TypeDef) -> Option<TypeDef> {
        let name = name.into();
        log::debug!("typedef {} -> {}", name, def.key());
        self.defs.insert(name, def)
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.defs.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.defs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Looks `name` up as a typedef first, then as the full type name of a
    /// registered type.
    pub fn resolve_type_ref(&self, name: &str) -> Option<TypeRef> {
        let def = self
            .defs
            .get(name)
            .or_else(|| self.defs.values().find(|def| def.key().name() == name))?;
        Some(TypeRef {
            name: name.to_string(),
            def: def.clone(),
        })
    }
}
