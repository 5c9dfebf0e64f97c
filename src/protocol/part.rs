//! Message parts
//!
//! A [`Part`] is one self-describing unit of content inside a message. On the wire every part
//! carries a `kind` field (`"text"`, `"file"` or `"data"`) that selects the variant, plus an open
//! `metadata` map that the domain layer uses to attach application semantics.

use std::{collections::HashMap, fmt};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{
    de::{self, Deserializer},
    ser::{SerializeMap, Serializer},
    Deserialize, Serialize,
};
use serde_json::{Map, Value};

/// Open key/value metadata attached to a part
pub type Metadata = HashMap<String, Value>;

/// Discriminator of a [`Part`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Text,
    File,
    Data,
}

impl PartKind {
    /// Wire value of the `kind` field
    pub fn as_str(&self) -> &'static str {
        match self {
            PartKind::Text => "text",
            PartKind::File => "file",
            PartKind::Data => "data",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inline file content, base64-encoded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileWithBytes {
    pub bytes: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl FileWithBytes {
    /// Decode the base64 payload, tolerating surrounding whitespace
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.bytes.trim())
    }
}

/// File referenced by URI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileWithUri {
    pub uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Content of a file part
///
/// Decoding probes the nested object: a `bytes` key selects [`FileContent::Bytes`], a `uri` key
/// selects [`FileContent::Uri`], anything else is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Bytes(FileWithBytes),
    Uri(FileWithUri),
}

impl Serialize for FileContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FileContent::Bytes(file) => file.serialize(serializer),
            FileContent::Uri(file) => file.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FileContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let probe = Map::<String, Value>::deserialize(deserializer)?;
        let value = Value::Object(probe);

        if value.get("bytes").is_some() {
            FileWithBytes::deserialize(value)
                .map(FileContent::Bytes)
                .map_err(de::Error::custom)
        } else if value.get("uri").is_some() {
            FileWithUri::deserialize(value)
                .map(FileContent::Uri)
                .map_err(de::Error::custom)
        } else {
            Err(de::Error::custom(
                "unknown file format in file part: expected a `bytes` or `uri` key",
            ))
        }
    }
}

/// A part of a message
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text {
        text: String,
        metadata: Option<Metadata>,
    },
    File {
        file: FileContent,
        metadata: Option<Metadata>,
    },
    Data {
        data: Map<String, Value>,
        metadata: Option<Metadata>,
    },
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            metadata: None,
        }
    }

    /// Create a file part carrying `content` inline as base64
    pub fn file_bytes(content: impl AsRef<[u8]>) -> Self {
        Part::File {
            file: FileContent::Bytes(FileWithBytes {
                bytes: STANDARD.encode(content),
                name: None,
                mime_type: None,
            }),
            metadata: None,
        }
    }

    /// Create a file part referencing `uri`
    pub fn file_uri(uri: impl Into<String>) -> Self {
        Part::File {
            file: FileContent::Uri(FileWithUri {
                uri: uri.into(),
                name: None,
                mime_type: None,
            }),
            metadata: None,
        }
    }

    /// Create a structured data part
    pub fn data(data: Map<String, Value>) -> Self {
        Part::Data {
            data,
            metadata: None,
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata_mut()
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace the whole metadata map
    pub fn with_metadata_map(mut self, metadata: Metadata) -> Self {
        *self.metadata_mut() = Some(metadata);
        self
    }

    pub fn kind(&self) -> PartKind {
        match self {
            Part::Text { .. } => PartKind::Text,
            Part::File { .. } => PartKind::File,
            Part::Data { .. } => PartKind::Data,
        }
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            Part::Text { metadata, .. }
            | Part::File { metadata, .. }
            | Part::Data { metadata, .. } => metadata.as_ref(),
        }
    }

    /// Look up one metadata entry
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata().and_then(|m| m.get(key))
    }

    /// Text content, for text parts
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    fn metadata_mut(&mut self) -> &mut Option<Metadata> {
        match self {
            Part::Text { metadata, .. }
            | Part::File { metadata, .. }
            | Part::Data { metadata, .. } => metadata,
        }
    }
}

impl Serialize for Part {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", self.kind().as_str())?;
        match self {
            Part::Text { text, .. } => map.serialize_entry("text", text)?,
            Part::File { file, .. } => map.serialize_entry("file", file)?,
            Part::Data { data, .. } => map.serialize_entry("data", data)?,
        }
        if let Some(metadata) = self.metadata() {
            map.serialize_entry("metadata", metadata)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct KindProbe {
    kind: String,
}

#[derive(Deserialize)]
struct TextWire {
    text: String,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Deserialize)]
struct FileWire {
    file: FileContent,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Deserialize)]
struct DataWire {
    data: Map<String, Value>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        // Only the discriminator is read first; the variant is decoded afterwards
        let KindProbe { kind } = KindProbe::deserialize(&value).map_err(de::Error::custom)?;

        match kind.as_str() {
            "text" => {
                let wire = TextWire::deserialize(value).map_err(de::Error::custom)?;
                Ok(Part::Text {
                    text: wire.text,
                    metadata: wire.metadata,
                })
            }
            "file" => {
                let wire = FileWire::deserialize(value).map_err(de::Error::custom)?;
                Ok(Part::File {
                    file: wire.file,
                    metadata: wire.metadata,
                })
            }
            "data" => {
                let wire = DataWire::deserialize(value).map_err(de::Error::custom)?;
                Ok(Part::Data {
                    data: wire.data,
                    metadata: wire.metadata,
                })
            }
            other => Err(de::Error::custom(format!("unknown part kind '{other}'"))),
        }
    }
}
