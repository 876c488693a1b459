//! Front-matter parsing

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Custom deserializer that handles a single string, a list of strings, or null
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Errors raised while splitting or decoding a front-matter block
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    #[error("unclosed front-matter block, missing closing ---")]
    Unclosed,

    #[error("invalid YAML in front-matter: {0}")]
    InvalidYaml(String),

    #[error("field `{field}` {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}

/// Front-matter data from an MDX entry
///
/// Every known field is optional; [`crate::content::Metadata::normalize`] fills
/// in the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    /// Kept as a raw YAML value; any scalar is accepted and coerced to a string
    pub date: Option<serde_yaml::Value>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, body)
    ///
    /// A block opens when the first line is exactly `---` and closes at the next
    /// line that is exactly `---`. Content without an opening line has no
    /// front-matter and is returned whole as the body.
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some(rest) = strip_delimiter_line(content) else {
            return Ok((FrontMatter::default(), content));
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if is_delimiter(line) {
                let yaml = &rest[..offset];
                let body = &rest[offset + line.len()..];
                return Ok((Self::from_yaml(yaml)?, body));
            }
            offset += line.len();
        }

        Err(FrontMatterError::Unclosed)
    }

    fn from_yaml(yaml: &str) -> Result<Self, FrontMatterError> {
        if yaml.trim().is_empty() {
            return Ok(FrontMatter::default());
        }

        serde_yaml::from_str(yaml).map_err(|e| FrontMatterError::InvalidYaml(e.to_string()))
    }

    /// The `date` field coerced to its string form
    ///
    /// Strings are kept verbatim, numbers and booleans use their display form.
    /// Sequences and mappings have no string form and are rejected.
    pub fn date_string(&self) -> Result<Option<String>, FrontMatterError> {
        match &self.date {
            None => Ok(None),
            Some(value) => scalar_to_string(value),
        }
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Result<Option<String>, FrontMatterError> {
    use serde_yaml::Value;

    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Err(FrontMatterError::InvalidField {
            field: "date",
            message: "must be a scalar value".to_string(),
        }),
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Strip the opening `---` line, if the content starts with one
fn strip_delimiter_line(content: &str) -> Option<&str> {
    let (first, rest) = match content.find('\n') {
        Some(pos) => (&content[..pos], &content[pos + 1..]),
        None => (content, ""),
    };
    is_delimiter(first).then_some(rest)
}
