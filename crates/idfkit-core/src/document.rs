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

//! The in-memory model.
//!
//! A [`Document`] owns every object of a model, grouped by type, together
//! with the schema the objects were checked against. Names are unique per
//! type and compared case-insensitively. Reference fields are resolved on
//! demand from the schema.

use crate::error::{IdfError, IdfResult};
use crate::object::IdfObject;
use crate::reference::{reference_fields, references_name, rewrite_references, DanglingReference};
use crate::schema::{ObjectSchema, Schema};
use crate::version::Version;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Object type carrying the file version; kept out of the collections.
pub const VERSION_TYPE: &str = "Version";

/// An EnergyPlus model.
#[derive(Debug, Clone)]
pub struct Document {
    version: Version,
    schema: Arc<Schema>,
    collections: HashMap<String, Vec<IdfObject>>,
}

impl Document {
    /// Create an empty model.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            version: schema.version(),
            schema,
            collections: HashMap::new(),
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Total number of objects.
    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the model holds at least one object of this type.
    pub fn contains_type(&self, obj_type: &str) -> bool {
        self.collection(obj_type).is_some()
    }

    /// Objects of a type, in insertion order. `None` when there are none.
    pub fn collection(&self, obj_type: &str) -> Option<&[IdfObject]> {
        let obj_type = self.schema.resolve_type(obj_type)?;
        self.collections
            .get(obj_type)
            .filter(|c| !c.is_empty())
            .map(Vec::as_slice)
    }

    /// Types present in the model, in schema order.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self
            .collections
            .iter()
            .filter(|(_, c)| !c.is_empty())
            .map(|(t, _)| t.as_str())
            .collect();
        types.sort_by_key(|t| self.schema.type_position(t).unwrap_or(usize::MAX));
        types
    }

    /// Every object, grouped by type in schema order.
    pub fn all_objects(&self) -> impl Iterator<Item = &IdfObject> {
        self.types()
            .into_iter()
            .filter_map(|t| self.collections.get(t))
            .flatten()
    }

    pub fn get(&self, obj_type: &str, name: &str) -> Option<&IdfObject> {
        self.collection(obj_type)?.iter().find(|o| o.is_named(name))
    }

    fn get_mut(&mut self, obj_type: &str, name: &str) -> Option<&mut IdfObject> {
        let obj_type = self.schema.resolve_type(obj_type)?;
        self.collections
            .get_mut(obj_type)?
            .iter_mut()
            .find(|o| o.is_named(name))
    }

    /// Find an object of any type by name.
    pub fn find_by_name(&self, name: &str) -> Option<&IdfObject> {
        if name.trim().is_empty() {
            return None;
        }
        self.all_objects().find(|o| o.is_named(name))
    }

    /// Add an object after checking its fields against the schema.
    pub fn add(
        &mut self,
        obj_type: &str,
        name: &str,
        fields: &Map<String, Value>,
    ) -> IdfResult<&IdfObject> {
        let (canonical, data) = {
            let obj_schema = self.object_schema(obj_type)?;
            (obj_schema.name.clone(), obj_schema.normalize_fields(fields)?)
        };
        self.insert(IdfObject::new(canonical, name.trim()).with_data(data))
    }

    /// Add an object without checking field values.
    ///
    /// The type must still exist and the name must still be free.
    pub fn add_unchecked(
        &mut self,
        obj_type: &str,
        name: &str,
        fields: Map<String, Value>,
    ) -> IdfResult<&IdfObject> {
        let canonical = self.object_schema(obj_type)?.name.clone();
        self.insert(IdfObject::new(canonical, name.trim()).with_data(fields))
    }

    fn insert(&mut self, obj: IdfObject) -> IdfResult<&IdfObject> {
        if obj.obj_type == VERSION_TYPE {
            return Err(IdfError::validation(
                "The Version object is derived from the document version",
            ));
        }
        let obj_schema = self.object_schema(&obj.obj_type)?;
        let existing = self.collection(&obj.obj_type).unwrap_or_default();

        if obj_schema.unique && !existing.is_empty() {
            return Err(IdfError::duplicate(format!(
                "'{}' is a unique object and already exists",
                obj.obj_type
            )));
        }
        if !obj.name.is_empty() && existing.iter().any(|o| o.is_named(&obj.name)) {
            return Err(IdfError::duplicate(format!(
                "{} '{}' already exists",
                obj.obj_type, obj.name
            )));
        }

        debug!("Adding {} '{}'", obj.obj_type, obj.name);
        let collection = self.collections.entry(obj.obj_type.clone()).or_default();
        collection.push(obj);
        Ok(&collection[collection.len() - 1])
    }

    /// Update fields on an existing object.
    ///
    /// Null or empty values clear the field.
    pub fn update_fields(
        &mut self,
        obj_type: &str,
        name: &str,
        fields: &Map<String, Value>,
    ) -> IdfResult<&IdfObject> {
        let obj_schema = self.object_schema(obj_type)?;
        let cleared: Vec<String> = fields
            .iter()
            .filter(|(_, v)| crate::schema::is_blank(v))
            .map(|(k, _)| k.clone())
            .collect();
        let updates = obj_schema.normalize_fields(fields)?;

        let obj = self
            .get_mut(obj_type, name)
            .ok_or_else(|| missing_object(obj_type, name))?;
        for key in cleared {
            obj.remove(&key);
        }
        for (key, value) in updates {
            obj.set(key, value);
        }
        Ok(obj)
    }

    /// Remove an object and return it.
    pub fn remove(&mut self, obj_type: &str, name: &str) -> IdfResult<IdfObject> {
        let canonical = self.object_schema(obj_type)?.name.clone();
        let collection = self
            .collections
            .get_mut(&canonical)
            .ok_or_else(|| missing_object(obj_type, name))?;
        let pos = collection
            .iter()
            .position(|o| o.is_named(name))
            .ok_or_else(|| missing_object(obj_type, name))?;
        Ok(collection.remove(pos))
    }

    /// Rename an object and update every reference to it.
    ///
    /// Returns the number of other objects whose fields were rewritten.
    pub fn rename(&mut self, obj_type: &str, old: &str, new: &str) -> IdfResult<usize> {
        let new = new.trim();
        if new.is_empty() {
            return Err(IdfError::validation("New name must not be empty"));
        }
        let obj_schema = self.object_schema(obj_type)?;
        let lists = obj_schema.provided_references().to_vec();
        let canonical = obj_schema.name.clone();

        if self.get(&canonical, old).is_none() {
            return Err(missing_object(obj_type, old));
        }
        if !new.eq_ignore_ascii_case(old) && self.get(&canonical, new).is_some() {
            return Err(IdfError::duplicate(format!(
                "{} '{}' already exists",
                canonical, new
            )));
        }

        if let Some(obj) = self.get_mut(&canonical, old) {
            obj.name = new.to_string();
        }

        let schema = Arc::clone(&self.schema);
        let mut updated = 0;
        for collection in self.collections.values_mut() {
            for obj in collection.iter_mut() {
                if rewrite_references(&schema, obj, old, new, &lists) > 0 {
                    updated += 1;
                }
            }
        }
        debug!(
            "Renamed {} '{}' to '{}', {} referencing objects updated",
            canonical, old, new, updated
        );
        Ok(updated)
    }

    /// Copy an object under a new name.
    pub fn copy_object(&mut self, obj_type: &str, name: &str, new_name: &str) -> IdfResult<&IdfObject> {
        let source = self
            .get(obj_type, name)
            .ok_or_else(|| missing_object(obj_type, name))?;
        let mut copy = source.clone();
        copy.name = new_name.trim().to_string();
        self.insert(copy)
    }

    /// Objects with a reference field naming `name`.
    pub fn get_referencing(&self, name: &str) -> Vec<&IdfObject> {
        if name.trim().is_empty() {
            return Vec::new();
        }
        self.all_objects()
            .filter(|o| references_name(&self.schema, o, name))
            .collect()
    }

    /// Names an object refers to.
    pub fn get_references(&self, obj: &IdfObject) -> BTreeSet<String> {
        reference_fields(&self.schema, obj)
            .into_iter()
            .map(|r| r.target.to_string())
            .collect()
    }

    /// Upper-cased names of every named object.
    pub fn valid_names(&self) -> HashSet<String> {
        self.all_objects()
            .filter(|o| !o.name.is_empty())
            .map(|o| o.name.to_uppercase())
            .collect()
    }

    /// References whose upper-cased target is not in `valid_names`.
    pub fn dangling_references(&self, valid_names: &HashSet<String>) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for obj in self.all_objects() {
            for r in reference_fields(&self.schema, obj) {
                if !valid_names.contains(&r.target.to_uppercase()) {
                    dangling.push(DanglingReference {
                        obj_type: obj.obj_type.clone(),
                        obj_name: obj.name.clone(),
                        field: r.field,
                        target: r.target.to_string(),
                    });
                }
            }
        }
        dangling
    }

    fn object_schema(&self, obj_type: &str) -> IdfResult<&ObjectSchema> {
        self.schema
            .object(obj_type)
            .ok_or_else(|| IdfError::unknown_type(obj_type))
    }
}

fn missing_object(obj_type: &str, name: &str) -> IdfError {
    IdfError::not_found(format!("Object '{}' not found in '{}'", name, obj_type))
}
