// Dweve idfkit - EnergyPlus Model Toolkit
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! IDF text format.
//!
//! ```text
//! Zone,
//!   Office,                  !- Name
//!   0;                       !- Direction of Relative North {deg}
//! ```
//!
//! Objects are comma-separated field lists terminated by `;`. Everything
//! after `!` on a line is a comment. Fields are positional: the first is
//! the object type, then the name (for named types), then the fields in
//! IDD order. Fields past the fixed list fill the extensible group.

use crate::document::{Document, VERSION_TYPE};
use crate::error::{IdfError, IdfResult};
use crate::registry::SchemaRegistry;
use crate::schema::{is_blank, FieldSchema, ObjectSchema};
use crate::version::{Version, LATEST_VERSION};
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{info, warn};

/// Column where `!-` field comments start.
const COMMENT_COLUMN: usize = 27;

/// An object as written in the file, before schema mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    /// 1-based line where the object starts.
    pub line: usize,
    /// Type followed by the field values, trimmed.
    pub fields: Vec<String>,
}

/// Split IDF text into raw objects.
pub fn tokenize(text: &str) -> IdfResult<Vec<RawObject>> {
    let mut objects = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut start_line = 0;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let content = match line.find('!') {
            Some(pos) => &line[..pos],
            None => line,
        };

        for ch in content.chars() {
            match ch {
                ',' | ';' => {
                    if start_line == 0 {
                        start_line = line_no;
                    }
                    fields.push(current.trim().to_string());
                    current.clear();
                    if ch == ';' {
                        if fields.first().is_some_and(|t| !t.is_empty()) {
                            objects.push(RawObject {
                                line: start_line,
                                fields: std::mem::take(&mut fields),
                            });
                        } else {
                            return Err(IdfError::parse(start_line, "object has no type"));
                        }
                        start_line = 0;
                    }
                }
                c => {
                    if start_line == 0 && !c.is_whitespace() {
                        start_line = line_no;
                    }
                    current.push(c);
                }
            }
        }
        // A field never spans lines without a separator, keep a space so
        // tokens on adjacent lines do not fuse.
        if !current.trim().is_empty() {
            current.push(' ');
        }
    }

    if !fields.is_empty() || !current.trim().is_empty() {
        return Err(IdfError::parse(
            start_line,
            "object is not terminated with ';'",
        ));
    }
    Ok(objects)
}

/// Parse IDF text into a document.
///
/// The schema version is `version` when given, else the file's `Version`
/// object, else the latest bundled version.
pub fn parse_idf(
    text: &str,
    version: Option<Version>,
    registry: &SchemaRegistry,
) -> IdfResult<Document> {
    let raw = tokenize(text)?;

    let file_version = raw
        .iter()
        .find(|o| o.fields[0].eq_ignore_ascii_case(VERSION_TYPE))
        .and_then(|o| o.fields.get(1))
        .filter(|v| !v.is_empty())
        .map(|v| Version::parse_identifier(v))
        .transpose()?;
    let version = version.or(file_version).unwrap_or(LATEST_VERSION);

    let schema = registry.get(version)?;
    let mut doc = Document::new(schema.clone());

    for obj in raw {
        let type_name = &obj.fields[0];
        if type_name.eq_ignore_ascii_case(VERSION_TYPE) {
            continue;
        }
        let obj_schema = schema.object(type_name).ok_or_else(|| {
            IdfError::UnknownObjectType(format!(
                "'{}' is not a known object type (line {})",
                type_name, obj.line
            ))
        })?;

        let values = &obj.fields[1..];
        let (name, values) = match (obj_schema.has_name(), values.split_first()) {
            (true, Some((name, rest))) => (name.as_str(), rest),
            _ => ("", values),
        };

        let data = positional_to_map(obj_schema, values, obj.line);
        doc.add_unchecked(&obj_schema.name, name, data)
            .map_err(|e| match e {
                IdfError::DuplicateObject(m) => {
                    IdfError::DuplicateObject(format!("{} (line {})", m, obj.line))
                }
                other => other,
            })?;
    }

    Ok(doc)
}

fn positional_to_map(obj_schema: &ObjectSchema, values: &[String], line: usize) -> Map<String, Value> {
    let mut data = Map::new();
    let fixed = obj_schema.fields.len();

    for (field, raw) in obj_schema.fields.iter().zip(values) {
        if !raw.is_empty() {
            data.insert(field.name.clone(), coerce(field, raw));
        }
    }

    if values.len() > fixed {
        let extra = &values[fixed..];
        match &obj_schema.extensible {
            Some(group) if !group.fields.is_empty() => {
                let mut items: Vec<Value> = extra
                    .chunks(group.fields.len())
                    .map(|chunk| {
                        let mut item = Map::new();
                        for (field, raw) in group.fields.iter().zip(chunk) {
                            if !raw.is_empty() {
                                item.insert(field.name.clone(), coerce(field, raw));
                            }
                        }
                        Value::Object(item)
                    })
                    .collect();
                while items
                    .last()
                    .and_then(Value::as_object)
                    .is_some_and(Map::is_empty)
                {
                    items.pop();
                }
                if !items.is_empty() {
                    data.insert(group.name.clone(), Value::Array(items));
                }
            }
            _ => {
                if extra.iter().any(|v| !v.is_empty()) {
                    warn!(
                        "{} at line {} has {} extra fields, ignored",
                        obj_schema.name,
                        line,
                        extra.len()
                    );
                }
            }
        }
    }

    data
}

/// Numbers become JSON numbers and choices take their canonical spelling.
/// Values the schema rejects are kept as text for the validator to report.
fn coerce(field: &FieldSchema, raw: &str) -> Value {
    let text = Value::String(raw.to_string());
    field.normalize(&text).unwrap_or(text)
}

/// Render a document as IDF text.
pub fn write_idf(doc: &Document) -> String {
    let schema = doc.schema();
    let mut out = String::new();

    write_object(
        &mut out,
        VERSION_TYPE,
        &[(doc.version().identifier(), "Version Identifier".to_string())],
    );

    for obj in doc.all_objects() {
        let Some(obj_schema) = schema.object(&obj.obj_type) else {
            continue;
        };
        let mut lines: Vec<(String, String)> = Vec::new();
        if obj_schema.has_name() {
            lines.push((obj.name.clone(), "Name".to_string()));
        }

        let items = obj_schema
            .extensible
            .as_ref()
            .and_then(|g| obj.get(&g.name))
            .and_then(Value::as_array)
            .filter(|a| !a.is_empty());

        let last_fixed = if items.is_some() {
            obj_schema.fields.len()
        } else {
            obj_schema
                .fields
                .iter()
                .rposition(|f| obj.get(&f.name).is_some_and(|v| !is_blank(v)))
                .map_or(0, |i| i + 1)
        };
        for field in &obj_schema.fields[..last_fixed] {
            lines.push((
                obj.get(&field.name).map(format_value).unwrap_or_default(),
                field_comment(field, None),
            ));
        }

        if let (Some(items), Some(group)) = (items, obj_schema.extensible.as_ref()) {
            for (i, item) in items.iter().enumerate() {
                for field in &group.fields {
                    let value = item
                        .get(&field.name)
                        .map(format_value)
                        .unwrap_or_default();
                    lines.push((value, field_comment(field, Some(i + 1))));
                }
            }
            // Drop trailing blanks from a partially filled last item
            while lines.last().is_some_and(|(v, _)| v.is_empty()) {
                lines.pop();
            }
        }

        write_object(&mut out, &obj.obj_type, &lines);
    }

    out
}

fn write_object(out: &mut String, obj_type: &str, lines: &[(String, String)]) {
    if lines.is_empty() {
        let _ = writeln!(out, "{};\n", obj_type);
        return;
    }
    let _ = writeln!(out, "{},", obj_type);
    for (i, (value, comment)) in lines.iter().enumerate() {
        let sep = if i + 1 == lines.len() { ';' } else { ',' };
        let cell = format!("  {}{}", value, sep);
        let pad = COMMENT_COLUMN.saturating_sub(cell.len()).max(1);
        let _ = writeln!(out, "{}{}!- {}", cell, " ".repeat(pad), comment);
    }
    out.push('\n');
}

fn field_comment(field: &FieldSchema, item: Option<usize>) -> String {
    let mut comment = field.display_name.clone();
    if let Some(n) = item {
        let _ = write!(comment, " {}", n);
    }
    if let Some(units) = &field.units {
        let _ = write!(comment, " {{{}}}", units);
    }
    comment
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        other => other.to_string(),
    }
}

/// Read and parse an IDF file.
pub fn load_idf(
    path: impl AsRef<Path>,
    version: Option<Version>,
    registry: &SchemaRegistry,
) -> IdfResult<Document> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let doc = parse_idf(&text, version, registry)?;
    info!("Loaded {} objects from {}", doc.len(), path.display());
    Ok(doc)
}

/// Write a document to an IDF file.
pub fn save_idf(doc: &Document, path: impl AsRef<Path>) -> IdfResult<()> {
    std::fs::write(path.as_ref(), write_idf(doc))?;
    Ok(())
}
