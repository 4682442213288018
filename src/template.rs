// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value templates applied to inbound payloads.
//!
//! Rendering is a collaborator of the binding: anything implementing
//! [`Render`] can turn a raw payload into the value stored for a slot.
//! [`ValueTemplate`] is the built-in renderer. It understands literal text
//! mixed with `{{ value }}` and `{{ value_json... }}` expressions:
//!
//! ```text
//! {{ value }}                     raw payload
//! {{ value_json.state }}          field of a JSON object payload
//! {{ value_json['media']["title"] }}
//! {{ value_json.tracks[0].name }}
//! ```
//!
//! Rendering never fails. If the payload is not JSON, or the path does not
//! exist, a warning is logged and the raw payload is returned unchanged.

use std::fmt;

use serde_json::Value;

use crate::error::TemplateError;

/// Something that can render a raw payload into a value.
///
/// Implementations must be tolerant of malformed payloads: they return a
/// best-effort value instead of failing.
pub trait Render: Send + Sync + fmt::Debug {
    /// Renders the raw payload.
    fn render(&self, payload: &str) -> String;
}

/// A parsed value template.
///
/// # Examples
///
/// ```
/// use mqtt_media_player::template::{Render, ValueTemplate};
///
/// let tpl = ValueTemplate::parse("{{ value_json.volume }}").unwrap();
/// assert_eq!(tpl.render(r#"{"volume": 42}"#), "42");
///
/// // Not JSON: the payload passes through untouched
/// assert_eq!(tpl.render("garbage"), "garbage");
///
/// let tpl = ValueTemplate::parse("Now: {{ value }}").unwrap();
/// assert_eq!(tpl.render("Song"), "Now: Song");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTemplate {
    source: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Value,
    ValueJson(Vec<Accessor>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Accessor {
    Key(String),
    Index(usize),
}

impl ValueTemplate {
    /// Parses template source text.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if an expression is unclosed, unsupported, or
    /// has a malformed accessor.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                return Err(TemplateError::Unclosed(offset + start));
            };
            segments.push(parse_expression(after_open[..end].trim())?);

            let consumed = start + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Returns the template source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    fn needs_json(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::ValueJson(_)))
    }
}

impl Render for ValueTemplate {
    fn render(&self, payload: &str) -> String {
        let json = if self.needs_json() {
            match serde_json::from_str::<Value>(payload) {
                Ok(json) => Some(json),
                Err(e) => {
                    tracing::warn!(
                        template = %self.source,
                        payload = %payload,
                        error = %e,
                        "Payload is not JSON, using it unrendered"
                    );
                    return payload.to_string();
                }
            }
        } else {
            None
        };

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Value => out.push_str(payload),
                Segment::ValueJson(path) => {
                    let Some(found) = json.as_ref().and_then(|root| lookup(root, path)) else {
                        tracing::warn!(
                            template = %self.source,
                            payload = %payload,
                            "Template path not found in payload, using it unrendered"
                        );
                        return payload.to_string();
                    };
                    match found {
                        Value::String(text) => out.push_str(text),
                        other => out.push_str(&other.to_string()),
                    }
                }
            }
        }
        out.trim().to_string()
    }
}

impl fmt::Display for ValueTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_expression(expr: &str) -> Result<Segment, TemplateError> {
    if expr == "value" {
        return Ok(Segment::Value);
    }
    let Some(path) = expr.strip_prefix("value_json") else {
        return Err(TemplateError::UnsupportedExpression(expr.to_string()));
    };
    Ok(Segment::ValueJson(parse_path(expr, path)?))
}

fn parse_path(expr: &str, mut path: &str) -> Result<Vec<Accessor>, TemplateError> {
    let malformed = || TemplateError::MalformedAccessor(expr.to_string());
    let mut accessors = Vec::new();

    while !path.is_empty() {
        if let Some(rest) = path.strip_prefix('.') {
            let len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            if len == 0 {
                return Err(malformed());
            }
            accessors.push(Accessor::Key(rest[..len].to_string()));
            path = &rest[len..];
        } else if let Some(rest) = path.strip_prefix('[') {
            let close = rest.find(']').ok_or_else(malformed)?;
            let inner = rest[..close].trim();
            let quoted = inner
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')));
            let accessor = match quoted {
                Some(key) => Accessor::Key(key.to_string()),
                None => Accessor::Index(inner.parse().map_err(|_| malformed())?),
            };
            accessors.push(accessor);
            path = &rest[close + 1..];
        } else {
            return Err(TemplateError::UnsupportedExpression(expr.to_string()));
        }
    }
    Ok(accessors)
}

fn lookup<'a>(root: &'a Value, path: &[Accessor]) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, accessor| match accessor {
        Accessor::Key(key) => current.get(key.as_str()),
        Accessor::Index(index) => current.get(*index),
    })
}
