use super::definition::MacroDef;
use super::record::MacroRecord;
use crate::builder::Configurator;
use crate::error::ConfigureError;
use crate::reflect::{Configurable, ObjectRef, Operations, Shared, shared};
use std::collections::HashMap;

/// One use-site of a [`MacroDef`], collected until its end event.
#[derive(Debug, Clone)]
pub struct MacroInstance {
    definition: Shared<MacroDef>,
    values: HashMap<String, String>,
    supplied: HashMap<String, Vec<Shared<MacroRecord>>>,
}

impl Configurable for MacroInstance {
    fn describe(_ops: &mut Operations<Self>) {}
}

impl MacroInstance {
    pub fn new(definition: Shared<MacroDef>) -> Self {
        Self {
            definition,
            values: HashMap::new(),
            supplied: HashMap::new(),
        }
    }

    pub fn macro_name(&self) -> String {
        self.definition.borrow().name().to_string()
    }

    /// Supplies a value for a formal attribute.
    pub fn define_attribute(&mut self, name: &str, value: &str) -> Result<(), ConfigureError> {
        let definition = self.definition.borrow();
        if definition.attribute(name).is_none() {
            return Err(ConfigureError::UndeclaredAttribute {
                attribute: name.to_string(),
                macro_name: definition.name().to_string(),
            });
        }
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Starts recording content for the element slot `name`. A slot may be
    /// supplied more than once; contents are replayed in order.
    pub fn record_create_child(&mut self, name: &str) -> Shared<MacroRecord> {
        let record = shared(MacroRecord::new(name));
        self.supplied
            .entry(name.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    /// Replays the definition with this use-site's values and contents.
    pub fn play(self, conf: &mut Configurator) -> Result<ObjectRef, ConfigureError> {
        let definition = self.definition.borrow().clone();
        definition.play(conf, self.values, &self.supplied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn instance() -> MacroInstance {
        let mut def = MacroDef::new("compile");
        def.add_attribute("x", Some("0"));
        MacroInstance::new(shared(def))
    }

    #[test]
    fn test_define_declared_attribute() {
        let mut m = instance();
        m.define_attribute("x", "5").unwrap();
        assert_eq!(m.value("x"), Some("5"));
    }

    #[test]
    fn test_define_undeclared_attribute_fails() {
        let mut m = instance();
        let err = m.define_attribute("y", "5").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MacroContract);
        assert_eq!(err.to_string(), "undeclared attribute y on macro compile");
    }

    #[test]
    fn test_slot_contents_accumulate() {
        let mut m = instance();
        m.record_create_child("body");
        m.record_create_child("body");
        assert_eq!(m.supplied["body"].len(), 2);
        assert_eq!(m.macro_name(), "compile");
    }
}
