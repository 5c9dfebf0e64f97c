//! Jobs and artifacts, and their mapping onto messages
//!
//! Both envelopes marshal to a [`Message`] whose first part is the description text. Every
//! following part is tagged with a `type` metadata entry:
//!
//! - `class` and `example`: file parts with inline content plus `class-name` and `class-path`
//! - `suggestion`: text parts plus `class-path`

use serde_json::Value;

use crate::protocol::{
    message::{Message, Role},
    part::{FileContent, Metadata, Part, PartKind},
};

use super::{class::Class, class::InMemoryClass, error::DomainError, suggestion::Suggestion};

pub const TYPE: &str = "type";
pub const CLASS_NAME: &str = "class-name";
pub const CLASS_PATH: &str = "class-path";
pub const MAX_SIZE: &str = "max-size";

const CLASS: &str = "class";
const EXAMPLE: &str = "example";
const SUGGESTION: &str = "suggestion";

/// Change budget used when a job does not carry a usable `max-size`
pub const DEFAULT_MAX_SIZE: usize = 200;

/// Free text describing a job or its outcome, with open parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    pub text: String,
    pub meta: Metadata,
}

impl Description {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            meta: Metadata::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Work sent to an agent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Job {
    pub description: Description,
    pub classes: Vec<InMemoryClass>,
    pub suggestions: Vec<Suggestion>,
    pub examples: Vec<InMemoryClass>,
}

impl Job {
    pub fn new(description: Description) -> Self {
        Self {
            description,
            ..Self::default()
        }
    }

    /// Attach a copy of `class`
    pub fn with_class(mut self, class: &dyn Class) -> Self {
        self.classes.push(InMemoryClass::snapshot(class));
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = Suggestion>) -> Self {
        self.suggestions.extend(suggestions);
        self
    }

    pub fn with_example(mut self, example: &dyn Class) -> Self {
        self.examples.push(InMemoryClass::snapshot(example));
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.description.meta.get(key)
    }

    /// Change budget carried as `max-size`; numbers and numeric strings are accepted
    pub fn max_size(&self) -> usize {
        let size = match self.param(MAX_SIZE) {
            Some(Value::Number(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        size.unwrap_or(DEFAULT_MAX_SIZE)
    }

    pub fn first_class(&self) -> Option<&InMemoryClass> {
        self.classes.first()
    }

    pub fn to_message(&self) -> Message {
        let mut parts = vec![description_part(&self.description)];
        parts.extend(self.classes.iter().map(|c| class_part(c, CLASS)));
        parts.extend(self.examples.iter().map(|c| class_part(c, EXAMPLE)));
        parts.extend(self.suggestions.iter().map(suggestion_part));
        Message::new(Role::User, parts)
    }

    pub fn from_message(message: &Message) -> Result<Self, DomainError> {
        let decoded = decode(message)?;
        Ok(Self {
            description: decoded.description,
            classes: decoded.classes,
            suggestions: decoded.suggestions,
            examples: decoded.examples,
        })
    }
}

/// Results returned by an agent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifacts {
    pub description: Description,
    pub classes: Vec<InMemoryClass>,
    pub suggestions: Vec<Suggestion>,
}

impl Artifacts {
    pub fn new(description: Description) -> Self {
        Self {
            description,
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: InMemoryClass) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = Suggestion>) -> Self {
        self.suggestions.extend(suggestions);
        self
    }

    pub fn to_message(&self) -> Message {
        let mut parts = vec![description_part(&self.description)];
        parts.extend(self.classes.iter().map(|c| class_part(c, CLASS)));
        parts.extend(self.suggestions.iter().map(suggestion_part));
        Message::new(Role::Agent, parts)
    }

    /// Decode artifacts; examples are only meaningful in a job and are rejected
    pub fn from_message(message: &Message) -> Result<Self, DomainError> {
        let decoded = decode(message)?;
        if !decoded.examples.is_empty() {
            return Err(DomainError::UnknownPartType(EXAMPLE.to_string()));
        }
        Ok(Self {
            description: decoded.description,
            classes: decoded.classes,
            suggestions: decoded.suggestions,
        })
    }
}

fn description_part(description: &Description) -> Part {
    let part = Part::text(&description.text);
    if description.meta.is_empty() {
        part
    } else {
        part.with_metadata_map(description.meta.clone())
    }
}

fn class_part(class: &InMemoryClass, tag: &str) -> Part {
    Part::file_bytes(class.content())
        .with_metadata(TYPE, tag)
        .with_metadata(CLASS_NAME, class.name())
        .with_metadata(CLASS_PATH, class.path())
}

fn suggestion_part(suggestion: &Suggestion) -> Part {
    Part::text(&suggestion.text)
        .with_metadata(TYPE, SUGGESTION)
        .with_metadata(CLASS_PATH, suggestion.class_path.as_str())
}

#[derive(Default)]
struct Decoded {
    description: Description,
    classes: Vec<InMemoryClass>,
    suggestions: Vec<Suggestion>,
    examples: Vec<InMemoryClass>,
}

fn decode(message: &Message) -> Result<Decoded, DomainError> {
    let (first, rest) = message
        .parts
        .split_first()
        .ok_or(DomainError::EmptyMessage)?;
    let text = first.as_text().ok_or(DomainError::UnexpectedPart {
        position: 0,
        expected: PartKind::Text,
        actual: first.kind(),
    })?;

    let mut decoded = Decoded {
        description: Description {
            text: text.to_string(),
            meta: first.metadata().cloned().unwrap_or_default(),
        },
        ..Decoded::default()
    };

    for (offset, part) in rest.iter().enumerate() {
        let position = offset + 1;
        match required_meta(part, position, TYPE)? {
            CLASS => decoded.classes.push(decode_class(part, position)?),
            EXAMPLE => decoded.examples.push(decode_class(part, position)?),
            SUGGESTION => decoded.suggestions.push(decode_suggestion(part, position)?),
            other => return Err(DomainError::UnknownPartType(other.to_string())),
        }
    }
    Ok(decoded)
}

fn decode_class(part: &Part, position: usize) -> Result<InMemoryClass, DomainError> {
    let name = required_meta(part, position, CLASS_NAME)?;
    let path = required_meta(part, position, CLASS_PATH)?;
    let file = match part {
        Part::File {
            file: FileContent::Bytes(file),
            ..
        } => file,
        Part::File { .. } => return Err(DomainError::UnsupportedFile { position }),
        other => {
            return Err(DomainError::UnexpectedPart {
                position,
                expected: PartKind::File,
                actual: other.kind(),
            })
        }
    };
    let bytes = file.decode().map_err(|source| DomainError::Decode {
        class: name.to_string(),
        source,
    })?;
    let content = String::from_utf8(bytes).map_err(|_| DomainError::Utf8 {
        class: name.to_string(),
    })?;
    Ok(InMemoryClass::new(name, path, content))
}

fn decode_suggestion(part: &Part, position: usize) -> Result<Suggestion, DomainError> {
    let text = part.as_text().ok_or(DomainError::UnexpectedPart {
        position,
        expected: PartKind::Text,
        actual: part.kind(),
    })?;
    let path = required_meta(part, position, CLASS_PATH)?;
    Ok(Suggestion::new(text, path))
}

fn required_meta<'a>(
    part: &'a Part,
    position: usize,
    key: &'static str,
) -> Result<&'a str, DomainError> {
    part.meta(key)
        .and_then(Value::as_str)
        .ok_or(DomainError::MissingMetadata { position, key })
}
