//! Improvement proposals bound to a class

use std::fmt;

/// A proposed improvement for one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub class_path: String,
    pub text: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, class_path: impl Into<String>) -> Self {
        Self {
            class_path: class_path.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class_path, self.text)
    }
}
