// src/decoder/template.rs

//! Parsing of format templates into literal text and escape segments.

/// One escape occurrence: the code selecting an operation, followed by the
/// literal text up to the next escape character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub code: char,
    pub trailing: String,
}

/// A format template split on its escape character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    prefix: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Splits `source` on `escape`.
    ///
    /// An escape character with nothing after it (end of template, or a second
    /// escape character right behind it) selects the operation named by the
    /// escape character itself.
    pub fn parse(source: &str, escape: char) -> Self {
        let mut parts = source.split(escape);
        let prefix = parts.next().unwrap_or_default().to_string();
        let segments = parts
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(code) => Segment {
                        code,
                        trailing: chars.as_str().to_string(),
                    },
                    None => Segment {
                        code: escape,
                        trailing: String::new(),
                    },
                }
            })
            .collect();
        Template {
            source: source.to_string(),
            prefix,
            segments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}
