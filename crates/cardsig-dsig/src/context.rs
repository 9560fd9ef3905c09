#![forbid(unsafe_code)]

//! Configuration for reference checking.

/// Context for reference digest checks.
#[derive(Debug, Clone, Default)]
pub struct ReferenceContext {
    /// Additional ID attribute names to register.
    pub id_attrs: Vec<String>,
}

impl ReferenceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ID attribute name to register during processing.
    pub fn add_id_attr(&mut self, name: &str) {
        self.id_attrs.push(name.to_owned());
    }
}
