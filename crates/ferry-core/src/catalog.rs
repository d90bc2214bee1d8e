//! # Catalog
//!
//! The per-origin-file result handed to code generators.
//!
//! Field names are part of the external contract and must not change.

use crate::{Constructor, Function, Struct, Variable};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Bucket key: the declaring file, or `None` for inline source.
pub type Origin = Option<PathBuf>;

// =============================================================================
// ENTRIES
// =============================================================================

/// Parallel name / raw type / simple type columns.
fn columns(vars: &[Variable]) -> (Vec<String>, Vec<String>, Vec<String>) {
    let names = vars.iter().map(|v| v.name.clone()).collect();
    let raw = vars.iter().map(|v| v.raw_type.clone()).collect();
    let simple = vars.iter().map(|v| v.simple_type.clone()).collect();
    (names, raw, simple)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    pub raw_return_type: String,
    pub simple_return_type: String,
    pub var_names: Vec<String>,
    pub raw_var_types: Vec<String>,
    pub simple_var_types: Vec<String>,
    pub definition_line: Option<u32>,
    pub declaration_line: Option<u32>,
}

impl From<&Function> for FunctionEntry {
    fn from(function: &Function) -> Self {
        let (var_names, raw_var_types, simple_var_types) = columns(&function.params);
        Self {
            name: function.name.clone(),
            raw_return_type: function.raw_return_type.clone(),
            simple_return_type: function.simple_return_type.clone(),
            var_names,
            raw_var_types,
            simple_var_types,
            definition_line: function.definition_line,
            declaration_line: function.declaration_line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorEntry {
    pub var_names: Vec<String>,
    pub raw_var_types: Vec<String>,
    pub simple_var_types: Vec<String>,
    pub definition_line: u32,
}

impl From<&Constructor> for ConstructorEntry {
    fn from(constructor: &Constructor) -> Self {
        let (var_names, raw_var_types, simple_var_types) = columns(&constructor.params);
        Self {
            var_names,
            raw_var_types,
            simple_var_types,
            definition_line: constructor.definition_line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructEntry {
    pub name: String,
    pub var_names: Vec<String>,
    pub raw_var_types: Vec<String>,
    pub simple_var_types: Vec<String>,
    pub definition_line: u32,
    pub constructor_list: Vec<ConstructorEntry>,
    pub base_structs: Vec<String>,
}

impl From<&Struct> for StructEntry {
    fn from(record: &Struct) -> Self {
        let (var_names, raw_var_types, simple_var_types) = columns(&record.fields);
        Self {
            name: record.name.clone(),
            var_names,
            raw_var_types,
            simple_var_types,
            definition_line: record.definition_line,
            constructor_list: record.constructors.iter().map(ConstructorEntry::from).collect(),
            base_structs: record.base_structs.clone(),
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Everything exported under one origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCatalog {
    pub function_list: Vec<FunctionEntry>,
    pub struct_list: Vec<StructEntry>,
    /// Canonical paths of the files this origin includes directly.
    pub include_list: Vec<PathBuf>,
}

/// Origin → bucket, ordered with the inline bucket first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    files: BTreeMap<Origin, FileCatalog>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, origin: &Origin) -> bool {
        self.files.contains_key(origin)
    }

    /// Create the bucket for `origin`, seeded with its direct includes.
    ///
    /// An existing bucket is returned untouched.
    pub fn bucket<I>(&mut self, origin: Origin, includes: I) -> &mut FileCatalog
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.files.entry(origin).or_insert_with(|| FileCatalog {
            include_list: includes.into_iter().collect(),
            ..FileCatalog::default()
        })
    }

    #[must_use]
    pub fn get(&self, origin: Option<&Path>) -> Option<&FileCatalog> {
        self.files.get(&origin.map(Path::to_path_buf))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Origin, &FileCatalog)> {
        self.files.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn function_count(&self) -> usize {
        self.files.values().map(|f| f.function_list.len()).sum()
    }

    #[must_use]
    pub fn struct_count(&self) -> usize {
        self.files.values().map(|f| f.struct_list.len()).sum()
    }
}

#[derive(Serialize)]
struct OriginBucket<'a> {
    origin: Option<&'a Path>,
    #[serde(flatten)]
    catalog: &'a FileCatalog,
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.files.len()))?;
        for (origin, catalog) in &self.files {
            seq.serialize_element(&OriginBucket {
                origin: origin.as_deref(),
                catalog,
            })?;
        }
        seq.end()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_struct() -> Struct {
        let mut record = Struct::new("ns::P", "/src/p.h", 3);
        record.fields.push(Variable::new("x", "const std::int32_t &", "std::int32_t"));
        record.constructors.push(Constructor {
            params: vec![Variable::new("other", "ns::P &&", "ns::P")],
            definition_line: 5,
        });
        record
    }

    #[test]
    fn struct_entry_uses_columns() {
        let entry = StructEntry::from(&sample_struct());
        assert_eq!(entry.var_names, vec!["x"]);
        assert_eq!(entry.raw_var_types, vec!["const std::int32_t &"]);
        assert_eq!(entry.simple_var_types, vec!["std::int32_t"]);
        assert_eq!(entry.constructor_list[0].var_names, vec!["other"]);
        assert_eq!(entry.constructor_list[0].definition_line, 5);
    }

    #[test]
    fn bucket_is_seeded_once() {
        let mut catalog = Catalog::new();
        catalog.bucket(None, vec![PathBuf::from("/src/p.h")]);
        catalog.bucket(None, vec![PathBuf::from("/src/q.h")]);

        let bucket = catalog.get(None).expect("inline bucket");
        assert_eq!(bucket.include_list, vec![PathBuf::from("/src/p.h")]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn serializes_as_origin_array() {
        let mut catalog = Catalog::new();
        catalog
            .bucket(Some(PathBuf::from("/src/p.h")), Vec::new())
            .struct_list
            .push(StructEntry::from(&sample_struct()));
        catalog.bucket(None, Vec::new());

        let json = serde_json::to_value(&catalog).expect("serialize");
        let buckets = json.as_array().expect("array");
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0]["origin"], serde_json::Value::Null);
        assert_eq!(buckets[1]["origin"], "/src/p.h");
        assert_eq!(buckets[1]["struct_list"][0]["name"], "ns::P");
        assert!(buckets[1]["function_list"].as_array().expect("list").is_empty());
        assert_eq!(catalog.struct_count(), 1);
        assert_eq!(catalog.function_count(), 0);
    }
}
