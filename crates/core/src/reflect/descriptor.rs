//! The per-object capability cache consulted by the builder.

use super::class::{Class, Operation, Signature};
use super::object::{ObjectRef, TypeKey};
use std::collections::HashMap;
use std::rc::Rc;

const CREATE: &str = "create";
const ADD: &str = "add";
const ADD_CONFIGURED: &str = "addConfigured";
const SET: &str = "set";
const ADD_TEXT: &str = "addText";

/// Lowercases the first character: `BuildPath` -> `buildPath`.
fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Wraps one live object and classifies its operations into the four
/// families once, at construction.
///
/// Tables are never modified afterwards. Type-keyed lookups fall back to the
/// first registered supertype the child is assignable to; when several
/// supertypes match, which one wins follows `HashMap` iteration order and is
/// therefore unspecified.
#[derive(Debug)]
pub struct Descriptor {
    object: ObjectRef,
    name: Option<String>,
    create: HashMap<String, Rc<Operation>>,
    add: HashMap<String, Rc<Operation>>,
    add_configured: HashMap<String, Rc<Operation>>,
    set: HashMap<String, Rc<Operation>>,
    typed_add: HashMap<TypeKey, Rc<Operation>>,
    typed_add_configured: HashMap<TypeKey, Rc<Operation>>,
    text: Option<Rc<Operation>>,
}

impl Descriptor {
    pub fn new(object: ObjectRef, name: Option<&str>) -> Self {
        let mut descriptor = Self {
            name: name.map(str::to_string),
            create: HashMap::new(),
            add: HashMap::new(),
            add_configured: HashMap::new(),
            set: HashMap::new(),
            typed_add: HashMap::new(),
            typed_add_configured: HashMap::new(),
            text: None,
            object,
        };
        let class = descriptor.object.class().clone();
        for op in class.operations() {
            descriptor.classify(op);
        }
        descriptor
    }

    fn classify(&mut self, op: &Rc<Operation>) {
        let ident = op.identifier();
        match &op.signature {
            Signature::Factory { .. } => {
                if let Some(rest) = ident.strip_prefix(CREATE)
                    && !rest.is_empty()
                {
                    self.create.insert(uncapitalize(rest), op.clone());
                }
            }
            Signature::Accept { param, .. } => {
                // `addConfigured` must be tested first: it also starts with `add`.
                let (rest, named, typed) = if let Some(rest) = ident.strip_prefix(ADD_CONFIGURED) {
                    (rest, &mut self.add_configured, &mut self.typed_add_configured)
                } else if let Some(rest) = ident.strip_prefix(ADD) {
                    (rest, &mut self.add, &mut self.typed_add)
                } else {
                    return;
                };
                if rest.is_empty() {
                    typed.insert(param.key(), op.clone());
                } else {
                    named.insert(uncapitalize(rest), op.clone());
                }
            }
            Signature::Assign { kind, .. } => {
                if ident == ADD_TEXT && kind.is_string() {
                    self.text = Some(op.clone());
                    return;
                }
                let Some(rest) = ident.strip_prefix(SET) else {
                    return;
                };
                if rest.is_empty() {
                    return;
                }
                let name = uncapitalize(rest);
                // String setters take precedence over typed ones.
                if let Some(current) = self.set.get(&name)
                    && current.value_kind().is_some_and(|k| k.is_string())
                {
                    return;
                }
                self.set.insert(name, op.clone());
            }
        }
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    /// The child name this object was created under (`None` for the root).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used in diagnostics: the child name, or the type name for the root.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.object.type_name())
    }

    pub fn create_op(&self, name: &str) -> Option<Rc<Operation>> {
        self.create.get(name).cloned()
    }

    pub fn add_op(&self, name: &str) -> Option<Rc<Operation>> {
        self.add.get(name).cloned()
    }

    pub fn add_configured_op(&self, name: &str) -> Option<Rc<Operation>> {
        self.add_configured.get(name).cloned()
    }

    pub fn add_op_for(&self, class: &Class) -> Option<Rc<Operation>> {
        Self::type_matching(class, &self.typed_add)
    }

    pub fn add_configured_op_for(&self, class: &Class) -> Option<Rc<Operation>> {
        Self::type_matching(class, &self.typed_add_configured)
    }

    pub fn set_op(&self, name: &str) -> Option<Rc<Operation>> {
        self.set.get(name).cloned()
    }

    pub fn text_op(&self) -> Option<Rc<Operation>> {
        self.text.clone()
    }

    fn type_matching(
        class: &Class,
        table: &HashMap<TypeKey, Rc<Operation>>,
    ) -> Option<Rc<Operation>> {
        if let Some(op) = table.get(&class.key()) {
            return Some(op.clone());
        }
        table
            .iter()
            .find(|(key, _)| class.is_assignable_to(**key))
            .map(|(key, op)| {
                log::trace!("{} matched through supertype {}", class.key(), key);
                op.clone()
            })
    }
}
