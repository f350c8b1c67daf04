use super::placeholder::substitute_params;
use super::record::MacroRecord;
use crate::builder::Configurator;
use crate::error::ConfigureError;
use crate::reflect::{Configurable, ObjectRef, Operations, Shared, shared};
use std::collections::{BTreeMap, HashMap};

/// A formal attribute of a macro.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MacroAttribute {
    name: String,
    default: Option<String>,
}

impl MacroAttribute {
    pub fn new(name: impl Into<String>, default: Option<&str>) -> Self {
        Self {
            name: name.into(),
            default: default.map(str::to_string),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

impl Configurable for MacroAttribute {
    fn describe(ops: &mut Operations<Self>) {
        ops.takes_value("setName", |this, name: String| this.name = name)
            .takes_value("setDefault", |this, value: String| this.default = Some(value));
    }
}

/// A formal element slot of a macro.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MacroElement {
    name: String,
    optional: bool,
}

impl MacroElement {
    pub fn new(name: impl Into<String>, optional: bool) -> Self {
        Self {
            name: name.into(),
            optional,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

impl Configurable for MacroElement {
    fn describe(ops: &mut Operations<Self>) {
        ops.takes_value("setName", |this, name: String| this.name = name)
            .takes_value("setOptional", |this, optional: bool| this.optional = optional);
    }
}

/// A named template with formal attributes and element slots.
///
/// While a definition is being recorded it sits on the builder stack like any
/// other object: `attribute` and `element` children configure its formals
/// through `addConfiguredAttribute` / `addConfiguredElement`, and the first
/// other child becomes the template.
#[derive(Debug, Clone, Default)]
pub struct MacroDef {
    name: String,
    attributes: BTreeMap<String, MacroAttribute>,
    elements: BTreeMap<String, MacroElement>,
    template: Option<Shared<MacroRecord>>,
}

impl Configurable for MacroDef {
    fn describe(ops: &mut Operations<Self>) {
        ops.takes_child(
            "addConfiguredAttribute",
            |this, attribute: Shared<MacroAttribute>| {
                this.add_configured_attribute(attribute.borrow().clone())
            },
        )
        .takes_child("addConfiguredElement", |this, element: Shared<MacroElement>| {
            this.add_configured_element(element.borrow().clone())
        });
    }
}

impl MacroDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_configured_attribute(&mut self, attribute: MacroAttribute) {
        self.attributes.insert(attribute.name.clone(), attribute);
    }

    pub fn add_configured_element(&mut self, element: MacroElement) {
        self.elements.insert(element.name.clone(), element);
    }

    pub fn add_attribute(&mut self, name: &str, default: Option<&str>) {
        self.add_configured_attribute(MacroAttribute::new(name, default));
    }

    pub fn add_element(&mut self, name: &str, optional: bool) {
        self.add_configured_element(MacroElement::new(name, optional));
    }

    pub fn attribute(&self, name: &str) -> Option<&MacroAttribute> {
        self.attributes.get(name)
    }

    pub fn element(&self, name: &str) -> Option<&MacroElement> {
        self.elements.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &MacroAttribute> {
        self.attributes.values()
    }

    pub fn elements(&self) -> impl Iterator<Item = &MacroElement> {
        self.elements.values()
    }

    pub fn template(&self) -> Option<Shared<MacroRecord>> {
        self.template.clone()
    }

    /// Starts a new template root, replacing any previous one.
    pub fn record_create_child(&mut self, name: &str) -> Shared<MacroRecord> {
        let record = shared(MacroRecord::new(name));
        self.template = Some(record.clone());
        record
    }

    /// Placeholders in the template that name no formal attribute, sorted.
    pub fn undeclared_placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(template) = &self.template {
            template.borrow().collect_placeholders(&mut names);
        }
        names.retain(|name| !self.attributes.contains_key(name));
        names.sort();
        names.dedup();
        names
    }

    /// Replays the template into `conf` at its current position.
    ///
    /// `values` holds the attributes supplied at the use-site; `supplied`
    /// maps element slot names to the content recorded for them.
    pub fn play(
        &self,
        conf: &mut Configurator,
        mut values: HashMap<String, String>,
        supplied: &HashMap<String, Vec<Shared<MacroRecord>>>,
    ) -> Result<ObjectRef, ConfigureError> {
        for attribute in self.attributes.values() {
            if values.contains_key(&attribute.name) {
                continue;
            }
            let default = attribute
                .default
                .clone()
                .ok_or_else(|| ConfigureError::MissingAttribute {
                    attribute: attribute.name.clone(),
                    macro_name: self.name.clone(),
                })?;
            values.insert(attribute.name.clone(), default);
        }
        let template = self
            .template
            .clone()
            .ok_or_else(|| ConfigureError::EmptyMacro {
                macro_name: self.name.clone(),
            })?;
        log::debug!("replaying macro {}", self.name);
        self.replay(conf, &template, &values, supplied)
    }

    fn replay(
        &self,
        conf: &mut Configurator,
        record: &Shared<MacroRecord>,
        values: &HashMap<String, String>,
        supplied: &HashMap<String, Vec<Shared<MacroRecord>>>,
    ) -> Result<ObjectRef, ConfigureError> {
        let node = record.borrow().clone();
        if let Some(object) = node.object() {
            conf.add_child(node.name(), object.clone())?;
            conf.end_child()?;
            return Ok(object.clone());
        }

        conf.start_child(node.name())?;
        for (name, value) in node.attributes() {
            conf.set_attribute(name, &substitute_params(value, values))?;
        }

        let nothing_supplied = HashMap::new();
        for child in node.children() {
            let child_name = child.borrow().name().to_string();
            let Some(element) = self.elements.get(&child_name) else {
                self.replay(conf, child, values, supplied)?;
                continue;
            };
            match supplied.get(&child_name) {
                Some(contents) => {
                    for content in contents {
                        let parts = content.borrow().children().to_vec();
                        for part in &parts {
                            self.replay(conf, part, values, &nothing_supplied)?;
                        }
                    }
                }
                None if !element.optional => {
                    return Err(ConfigureError::MissingElement {
                        element: child_name,
                        macro_name: self.name.clone(),
                    });
                }
                None => {}
            }
        }
        conf.end_child()
    }
}
