use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Value;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Empty until a store assigns one.
    pub id: String,
    pub content: String,
    pub metadata: HashMap<String, Value>,
    pub embedding: Option<Vec<f32>>,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: HashMap<String, Value>) -> Self {
        Self {
            id: String::new(),
            content: content.into(),
            metadata,
            embedding: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}
