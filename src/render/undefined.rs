//! Sentinel value for names left unresolved during partial rendering
//!
//! The tagged-value model: a name the environment cannot resolve becomes an
//! [`Unresolved`] object instead of an undefined. Rendering it, indexing
//! into it, or attribute-accessing it all deterministically produce the
//! reconstructed `{{ name }}` text, so the expression survives partial
//! rendering verbatim and can be re-parsed later for free-variable
//! extraction.

use minijinja::value::{Enumerator, Object, ObjectRepr, Value};
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
pub struct Unresolved {
    name: String,
}

impl Unresolved {
    pub fn value(name: &str) -> Value {
        Value::from_object(Unresolved {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The literal template expression this sentinel stands for.
    pub fn expression(&self) -> String {
        format!("{{{{ {} }}}}", self.name)
    }
}

impl Object for Unresolved {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Plain
    }

    // Attribute access and indexing both collapse back to the root name.
    fn get_value(self: &Arc<Self>, _key: &Value) -> Option<Value> {
        Some(Unresolved::value(&self.name))
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::NonEnumerable
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression())
    }
}
