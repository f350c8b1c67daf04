//! The event-driven object-graph builder.
//!
//! A [`Configurator`] keeps a stack of [`Descriptor`]s, one per object on the
//! path from the root to the object currently being configured. The four
//! structural events (`start_child`, `set_attribute`, `add_text`, `end_child`)
//! act on the top of that stack.

use crate::attribute_map::AttributeMap;
use crate::coerce::{AttributeValue, CoercionContext, coerce};
use crate::config::ConfiguratorConfig;
use crate::error::ConfigureError;
use crate::macros::{MacroDef, MacroInstance, MacroRecord};
use crate::reflect::{
    Class, Configurable, Descriptor, InvokeError, ObjectRef, Operation, Shared, shared,
};
use crate::registry::{TypeDef, TypeRegistry};
use std::collections::HashMap;
use std::rc::Rc;
use trellis_resource::{BaseDirResolver, WorkingDirResolver};
use trellis_traits::PathResolver;

/// Child names that declare the formals of a macro being defined.
const MACRO_FORMALS: [&str; 2] = ["attribute", "element"];

#[derive(Debug)]
struct Frame {
    descriptor: Descriptor,
    /// Set when the object was attached through a type-keyed operation; the
    /// `addConfigured` lookup at end is then done by type instead of by name.
    attach_type: Option<Rc<Class>>,
}

/// Builds and populates host objects from a flat sequence of structural
/// events.
///
/// One instance serves one construction session. Failures are not
/// recoverable: after an error the stack is left as it was at the point of
/// failure, and the builder should be discarded.
///
/// # Example
///
/// ```ignore
/// let mut conf = Configurator::new();
/// conf.register_type("buildpath", TypeDef::of::<BuildPath>());
/// conf.set_root(project.clone());
/// conf.start_child("buildpath")?;
/// conf.set_attribute("path", "lib")?;
/// conf.end_child()?;
/// ```
#[derive(Debug)]
pub struct Configurator {
    config: ConfiguratorConfig,
    path_resolver: Box<dyn PathResolver>,
    types: TypeRegistry,
    macros: HashMap<String, Shared<MacroDef>>,
    stack: Vec<Frame>,
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new()
    }
}

impl Configurator {
    pub fn new() -> Self {
        Self::with_config(ConfiguratorConfig::default())
    }

    pub fn with_config(config: ConfiguratorConfig) -> Self {
        let path_resolver: Box<dyn PathResolver> = match &config.base_dir {
            Some(dir) if config.confine_paths => Box::new(BaseDirResolver::confined(dir)),
            Some(dir) => Box::new(BaseDirResolver::new(dir)),
            None => Box::new(WorkingDirResolver::new()),
        };
        Self {
            config,
            path_resolver,
            types: TypeRegistry::new(),
            macros: HashMap::new(),
            stack: Vec::new(),
        }
    }

    pub fn config(&self) -> &ConfiguratorConfig {
        &self.config
    }

    pub fn path_resolver(&self) -> &dyn PathResolver {
        self.path_resolver.as_ref()
    }

    /// Replaces the collaborator used for path-typed attributes.
    pub fn set_path_resolver(&mut self, resolver: impl PathResolver + 'static) {
        log::debug!("using path resolver {}", resolver.name());
        self.path_resolver = Box::new(resolver);
    }

    // Registries

    pub fn register_type(&mut self, name: impl Into<String>, def: TypeDef) -> Option<TypeDef> {
        self.types.register(name, def)
    }

    /// Shorthand for `register_type(name, TypeDef::of::<T>())`.
    pub fn type_def_of<T: Configurable + Default>(&mut self, name: impl Into<String>) {
        self.types.register(name, TypeDef::of::<T>());
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Registers `def` under its own name, replacing any previous definition.
    pub fn add_macro_def(&mut self, def: MacroDef) -> Shared<MacroDef> {
        let def = shared(def);
        self.add_configured_macro_def(def.clone());
        def
    }

    fn add_configured_macro_def(&mut self, def: Shared<MacroDef>) {
        let name = def.borrow().name().to_string();
        log::debug!("registered macro {}", name);
        self.macros.insert(name, def);
    }

    pub fn macro_def(&self, name: &str) -> Option<Shared<MacroDef>> {
        self.macros.get(name).cloned()
    }

    // Stack inspection

    /// Starts a new session on `root`, discarding any previous stack.
    pub fn set_root(&mut self, root: impl Into<ObjectRef>) {
        let root = root.into();
        log::debug!("root set to {}", root.type_name());
        self.stack.clear();
        self.stack.push(Frame {
            descriptor: Descriptor::new(root, None),
            attach_type: None,
        });
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn current_object(&self) -> Option<ObjectRef> {
        self.stack.last().map(|frame| frame.descriptor.object().clone())
    }

    pub fn current_depth(&self) -> usize {
        self.stack.len()
    }

    /// `true` while a macro definition is on top of the stack, i.e. when
    /// `attribute` and `element` children declare formals.
    pub fn is_at_top_level_macro_definition(&self) -> bool {
        self.stack
            .last()
            .is_some_and(|frame| frame.descriptor.object().is::<MacroDef>())
    }

    fn top(&self, action: &'static str) -> Result<&Frame, ConfigureError> {
        self.stack.last().ok_or(ConfigureError::NoRoot(action))
    }

    fn push(&mut self, object: ObjectRef, name: &str, attach_type: Option<Rc<Class>>) -> ObjectRef {
        log::debug!(
            "{}<{}> {}",
            "  ".repeat(self.stack.len()),
            name,
            object.type_name()
        );
        self.stack.push(Frame {
            descriptor: Descriptor::new(object.clone(), Some(name)),
            attach_type,
        });
        object
    }

    fn push_record(&mut self, record: Shared<MacroRecord>, name: &str) -> ObjectRef {
        self.push(ObjectRef::from_shared(record), name, None)
    }

    // Structural events

    /// Begins a child named `name` under the current object and makes it the
    /// current object.
    pub fn start_child(&mut self, name: &str) -> Result<ObjectRef, ConfigureError> {
        let parent = self.top("creating child")?.descriptor.object().clone();

        if let Some(def) = parent.downcast::<MacroDef>()
            && !MACRO_FORMALS.contains(&name)
        {
            let record = def.borrow_mut().record_create_child(name);
            return Ok(self.push_record(record, name));
        }
        if let Some(instance) = parent.downcast::<MacroInstance>() {
            let record = instance.borrow_mut().record_create_child(name);
            return Ok(self.push_record(record, name));
        }
        if let Some(record) = parent.downcast::<MacroRecord>() {
            let child = record.borrow_mut().record_child(name);
            return Ok(self.push_record(child, name));
        }
        if let Some(def) = self.macros.get(name).cloned() {
            let instance = ObjectRef::new(MacroInstance::new(def));
            return Ok(self.push(instance, name, None));
        }
        if let Some(def) = self.types.get(name).cloned() {
            return self.attach(name, &def, None);
        }

        let (create, add, add_configured) = {
            let descriptor = &self.top("creating child")?.descriptor;
            (
                descriptor.create_op(name),
                descriptor.add_op(name),
                descriptor.add_configured_op(name),
            )
        };
        if let Some(op) = create {
            let child = op
                .create(&parent)
                .map_err(|source| bad_method(name, &parent, source))?;
            return Ok(self.push(child, name, None));
        }
        if let Some(op) = add {
            let child = instantiate_param(&op, name, &parent)?;
            op.accept(&parent, &child)
                .map_err(|source| bad_method(name, &parent, source))?;
            return Ok(self.push(child, name, None));
        }
        if let Some(op) = add_configured {
            let child = instantiate_param(&op, name, &parent)?;
            return Ok(self.push(child, name, None));
        }
        Err(ConfigureError::NoAddMethod {
            child: name.to_string(),
            parent: parent.type_name().to_string(),
        })
    }

    /// Attaches an already-built `child` under the current object and makes it
    /// the current object.
    ///
    /// Inside a macro template or element content the object is recorded
    /// as-is and re-attached on every replay.
    pub fn add_child(&mut self, name: &str, child: ObjectRef) -> Result<ObjectRef, ConfigureError> {
        self.top("creating child")?;
        let def = TypeDef::from_class(child.class().clone());
        self.attach(name, &def, Some(child))
    }

    /// Type-keyed attachment, shared by typedef children and [`Self::add_child`].
    fn attach(
        &mut self,
        name: &str,
        def: &TypeDef,
        child: Option<ObjectRef>,
    ) -> Result<ObjectRef, ConfigureError> {
        let frame = self.top("creating child")?;
        let parent = frame.descriptor.object().clone();

        if let Some(record) = parent.downcast::<MacroRecord>() {
            let recorded = match child {
                Some(object) => record.borrow_mut().record_prebound_child(name, object),
                None => record.borrow_mut().record_child(name),
            };
            return Ok(self.push_record(recorded, name));
        }

        let add = frame.descriptor.add_op_for(def.class());
        let add_configured = frame.descriptor.add_configured_op_for(def.class());
        let attach_type = Some(def.class().clone());
        if let Some(op) = add {
            let child = match child {
                Some(child) => child,
                None => instantiate_def(def, name, &parent)?,
            };
            op.accept(&parent, &child)
                .map_err(|source| bad_method(name, &parent, source))?;
            return Ok(self.push(child, name, attach_type));
        }
        if add_configured.is_some() {
            let child = match child {
                Some(child) => child,
                None => instantiate_def(def, name, &parent)?,
            };
            return Ok(self.push(child, name, attach_type));
        }
        Err(ConfigureError::NoAddMethod {
            child: name.to_string(),
            parent: parent.type_name().to_string(),
        })
    }

    /// Ends the current child and returns the finished object.
    ///
    /// Ending a macro use-site replays the macro and returns the object the
    /// replay produced. Otherwise the parent's matching `addConfigured*`
    /// operation, if any, receives the child.
    pub fn end_child(&mut self) -> Result<ObjectRef, ConfigureError> {
        match self.stack.len() {
            0 => return Err(ConfigureError::NoRoot("ending child")),
            1 => return Err(ConfigureError::CannotEndRoot),
            _ => {}
        }
        let Some(frame) = self.stack.pop() else {
            return Err(ConfigureError::NoRoot("ending child"));
        };
        let child = frame.descriptor.object().clone();
        let name = frame.descriptor.name().unwrap_or_default().to_string();
        log::debug!("{}</{}>", "  ".repeat(self.stack.len()), name);

        if let Some(instance) = child.downcast::<MacroInstance>() {
            let instance = instance.borrow().clone();
            return instance.play(self);
        }

        let parent_frame = self.top("ending child")?;
        let parent = parent_frame.descriptor.object().clone();
        let op = match &frame.attach_type {
            Some(class) => parent_frame.descriptor.add_configured_op_for(class),
            None => parent_frame.descriptor.add_configured_op(&name),
        };
        if let Some(op) = op {
            op.accept(&parent, &child)
                .map_err(|source| ConfigureError::AddConfigured {
                    child: name.clone(),
                    parent: parent.type_name().to_string(),
                    source,
                })?;
        }
        Ok(child)
    }

    /// Sets attribute `name` on the current object.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), ConfigureError> {
        let frame = self.top("setting attribute")?;
        let target = frame.descriptor.object().clone();

        if let Some(instance) = target.downcast::<MacroInstance>() {
            return instance.borrow_mut().define_attribute(name, value);
        }
        if let Some(record) = target.downcast::<MacroRecord>() {
            record.borrow_mut().record_attribute(name, value);
            return Ok(());
        }
        if let Some(op) = frame.descriptor.set_op(name) {
            let Some(kind) = op.value_kind() else {
                return Err(self.no_set_method(name, &target));
            };
            let label = format!("{}.{}", frame.descriptor.display_name(), name);
            let ctx = CoercionContext {
                types: &self.types,
                paths: self.path_resolver.as_ref(),
                label: &label,
            };
            let coerced = coerce(kind, value, &ctx).map_err(|source| ConfigureError::Coercion {
                value: value.to_string(),
                target: kind.type_name().to_string(),
                attribute: name.to_string(),
                owner: target.type_name().to_string(),
                source,
            })?;
            op.assign(&target, coerced)
                .map_err(|source| ConfigureError::Assignment {
                    attribute: name.to_string(),
                    value: value.to_string(),
                    owner: target.type_name().to_string(),
                    source,
                })?;
            log::trace!("{} = '{}'", label, value);
            return Ok(());
        }
        if let Some(map) = target.downcast::<AttributeMap>() {
            map.borrow_mut().insert(name, value);
            return Ok(());
        }
        Err(self.no_set_method(name, &target))
    }

    fn no_set_method(&self, name: &str, target: &ObjectRef) -> ConfigureError {
        ConfigureError::NoSetMethod {
            attribute: name.to_string(),
            owner: target.type_name().to_string(),
        }
    }

    /// Passes character content to the current object's `addText` operation.
    pub fn add_text(&mut self, text: &str) -> Result<(), ConfigureError> {
        let frame = self.top("adding text")?;
        let target = frame.descriptor.object().clone();
        let op = frame
            .descriptor
            .text_op()
            .ok_or_else(|| ConfigureError::NoTextMethod {
                owner: target.type_name().to_string(),
            })?;
        op.assign(&target, AttributeValue::Str(text.to_string()))
            .map_err(|source| ConfigureError::Text {
                owner: target.type_name().to_string(),
                source,
            })
    }

    // Macro authoring

    /// Pushes a new macro definition. Children begun until
    /// [`Self::end_macro_def`] record its template.
    pub fn start_macro_def(&mut self, name: &str) -> Shared<MacroDef> {
        let def = shared(MacroDef::new(name));
        self.push(ObjectRef::from_shared(def.clone()), name, None);
        def
    }

    fn current_macro_def(&self) -> Result<Shared<MacroDef>, ConfigureError> {
        let frame = self.top("defining a macro")?;
        frame
            .descriptor
            .object()
            .downcast::<MacroDef>()
            .ok_or_else(|| ConfigureError::NotInMacroDefinition {
                found: frame.descriptor.object().type_name().to_string(),
            })
    }

    pub fn add_macro_attribute(
        &mut self,
        name: &str,
        default: Option<&str>,
    ) -> Result<(), ConfigureError> {
        self.current_macro_def()?
            .borrow_mut()
            .add_attribute(name, default);
        Ok(())
    }

    pub fn add_macro_element(&mut self, name: &str, optional: bool) -> Result<(), ConfigureError> {
        self.current_macro_def()?
            .borrow_mut()
            .add_element(name, optional);
        Ok(())
    }

    /// Pops the current macro definition and registers it.
    ///
    /// With `strict_placeholders`, a template referencing an undeclared
    /// attribute is rejected and the definition stays on the stack.
    pub fn end_macro_def(&mut self) -> Result<Shared<MacroDef>, ConfigureError> {
        let def = self.current_macro_def()?;
        if self.config.strict_placeholders {
            let undeclared = def.borrow().undeclared_placeholders();
            if let Some(attribute) = undeclared.into_iter().next() {
                return Err(ConfigureError::UndeclaredAttribute {
                    attribute,
                    macro_name: def.borrow().name().to_string(),
                });
            }
        }
        self.stack.pop();
        self.add_configured_macro_def(def.clone());
        Ok(def)
    }
}

fn bad_method(name: &str, parent: &ObjectRef, source: InvokeError) -> ConfigureError {
    ConfigureError::BadMethod {
        child: name.to_string(),
        parent: parent.type_name().to_string(),
        source,
    }
}

fn no_constructor(type_name: &str, name: &str, parent: &ObjectRef) -> ConfigureError {
    ConfigureError::NoConstructor {
        type_name: type_name.to_string(),
        child: name.to_string(),
        parent: parent.type_name().to_string(),
    }
}

fn instantiate_param(
    op: &Operation,
    name: &str,
    parent: &ObjectRef,
) -> Result<ObjectRef, ConfigureError> {
    let Some(param) = op.param() else {
        return Err(no_constructor(op.identifier(), name, parent));
    };
    param
        .instantiate()
        .ok_or_else(|| no_constructor(param.key().name(), name, parent))
}

fn instantiate_def(def: &TypeDef, name: &str, parent: &ObjectRef) -> Result<ObjectRef, ConfigureError> {
    def.instantiate()
        .ok_or_else(|| no_constructor(def.key().name(), name, parent))
}
