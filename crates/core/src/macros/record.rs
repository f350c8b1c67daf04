use super::placeholder::placeholder_names;
use crate::reflect::{Configurable, ObjectRef, Operations, Shared, shared};

/// One node of a recorded subtree: a macro template, or the content a
/// use-site supplies for an element slot.
///
/// Attribute values are stored verbatim, placeholders included.
#[derive(Debug, Clone, Default)]
pub struct MacroRecord {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Shared<MacroRecord>>,
    object: Option<ObjectRef>,
}

impl MacroRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records an attribute. Re-recording a name replaces the value in place.
    pub fn record_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn record_child(&mut self, name: &str) -> Shared<MacroRecord> {
        let child = shared(MacroRecord::new(name));
        self.children.push(child.clone());
        child
    }

    /// Records a child that is an already-built object rather than a subtree.
    pub fn record_prebound_child(&mut self, name: &str, object: ObjectRef) -> Shared<MacroRecord> {
        let child = shared(MacroRecord {
            object: Some(object),
            ..MacroRecord::new(name)
        });
        self.children.push(child.clone());
        child
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Shared<MacroRecord>] {
        &self.children
    }

    pub fn object(&self) -> Option<&ObjectRef> {
        self.object.as_ref()
    }

    /// Every placeholder name used in this subtree.
    pub(crate) fn collect_placeholders(&self, out: &mut Vec<String>) {
        for (_, value) in &self.attributes {
            out.extend(placeholder_names(value).into_iter().map(str::to_string));
        }
        for child in &self.children {
            child.borrow().collect_placeholders(out);
        }
    }
}

impl Configurable for MacroRecord {
    fn describe(_ops: &mut Operations<Self>) {}
}
