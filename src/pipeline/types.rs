//! @ai:module:intent Resolve the reachable type graph of the retained interfaces
//! @ai:module:layer application
//! @ai:module:public_api StageTypeCollection
//! @ai:module:depends_on source, annotation, typeexpr, pipeline
//! @ai:module:stateless true
//!
//! Starting from every parameter and result of the retained interfaces, this
//! stage walks type references recursively: locally declared structs
//! contribute their field types, references into other packages are resolved
//! through the file import tables, and anything unknown becomes an opaque
//! placeholder. A shared visited set makes cyclic references terminate.

use crate::annotation::AnnotationParser;
use crate::model::{FieldInfo, GenericInfo, Position, TypeInfo, TypeKind};
use crate::pipeline::{extract, CancelToken, Data, Stage};
use crate::source::{self, RawField, SourceFile, TypeBody};
use crate::typeexpr;
use crate::Result;
use std::collections::{BTreeMap, HashSet};

/// @ai:intent Collect every type transitively reachable from interface signatures
pub struct StageTypeCollection {
    parser: AnnotationParser,
}

impl StageTypeCollection {
    pub fn new(parser: AnnotationParser) -> Self {
        Self { parser }
    }
}

impl Stage for StageTypeCollection {
    fn process(&self, cancel: &CancelToken, mut data: Data) -> Result<Data> {
        let files = source::list_go_files(&data.absolute_path);
        let mut sources = Vec::with_capacity(files.len());
        for path in &files {
            cancel.check()?;
            sources.push(SourceFile::parse(path)?);
        }

        let package_name = sources
            .iter()
            .map(|s| s.package_name.as_str())
            .find(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| package_name_from_path(&data.absolute_path));

        // The alias table is built across all files up front and then frozen;
        // resolution never adds to it.
        let mut imports: BTreeMap<String, String> = BTreeMap::new();
        for src in &sources {
            for import in &src.imports {
                let alias = import
                    .alias
                    .clone()
                    .unwrap_or_else(|| last_segment(&import.path).to_string());
                if alias == "_" || alias == "." {
                    continue;
                }
                imports.insert(alias, import.path.clone());
            }
        }

        let mut local_names: HashSet<String> = HashSet::new();
        for src in &sources {
            local_names.extend(src.declared_type_names());
        }

        let import_path = extract::full_import_path(&data.package);
        let mut declared: BTreeMap<String, TypeInfo> = BTreeMap::new();
        for src in &sources {
            self.declare_types(src, &package_name, &import_path, &local_names, &mut declared);
        }

        let mut resolution = Resolution {
            package_name: &package_name,
            declared: &declared,
            imports: &imports,
            fallback_package: &import_path,
            resolved: BTreeMap::new(),
            visited: HashSet::new(),
        };
        for interface in &data.interfaces {
            for method in &interface.methods {
                for variable in method.info.parameters.iter().chain(&method.info.results) {
                    resolution.collect(cancel, &variable.type_name)?;
                }
            }
        }

        data.types = resolution.resolved;
        Ok(data)
    }
}

impl StageTypeCollection {
    /// Register every declaration of one file under its `package.Name` key.
    fn declare_types(
        &self,
        src: &SourceFile,
        package_name: &str,
        import_path: &str,
        local_names: &HashSet<String>,
        declared: &mut BTreeMap<String, TypeInfo>,
    ) {
        for decl in &src.types {
            let mut info = TypeInfo {
                name: decl.name.clone(),
                package: src.package_name.clone(),
                import: import_path.to_string(),
                annotations: self
                    .parser
                    .parse_all(decl.doc.iter().map(|d| d.text.as_str())),
                position: Position::new(src.file_name.clone(), decl.line, decl.column),
                ..Default::default()
            };
            if !decl.type_params.is_empty() {
                info.generic_type = true;
                info.generic = Some(GenericInfo {
                    type_params: decl.type_params.clone(),
                    ..Default::default()
                });
            }

            match &decl.body {
                TypeBody::Struct(raw_fields) => {
                    info.kind = TypeKind::Struct;
                    info.fields = raw_fields
                        .iter()
                        .map(|f| {
                            self.build_field(f, &src.file_name, package_name, local_names)
                        })
                        .collect();
                }
                TypeBody::Interface => {
                    info.kind = TypeKind::Interface;
                    info.interface = true;
                }
                TypeBody::Other(underlying) => {
                    let qualified = qualify_local(underlying, package_name, local_names);
                    classify_underlying(&qualified, &mut info);
                    info.underlying = qualified;
                }
            }

            declared.insert(format!("{}.{}", src.package_name, decl.name), info);
        }
    }

    /// Struct fields keep the full decorated reference text; bare local names
    /// get the package identifier spliced in front of the base.
    fn build_field(
        &self,
        raw: &RawField,
        file_name: &str,
        package_name: &str,
        local_names: &HashSet<String>,
    ) -> FieldInfo {
        let type_name = qualify_local(&raw.type_text, package_name, local_names);
        let name = if raw.embedded {
            type_name.clone()
        } else {
            raw.name.clone()
        };
        let mut field = FieldInfo {
            name,
            type_name,
            tags: raw
                .tag_text
                .as_deref()
                .map(source::parse_tags)
                .unwrap_or_default(),
            annotations: self
                .parser
                .parse_all(raw.doc.iter().map(|d| d.text.as_str())),
            position: Position::new(file_name.to_string(), raw.line, raw.column),
            embedded: raw.embedded,
            ..Default::default()
        };
        typeexpr::analyze(&raw.type_text).apply_to_field(&mut field);
        field
    }
}

/// @ai:intent Recursive resolution state shared across all interface signatures
struct Resolution<'a> {
    package_name: &'a str,
    declared: &'a BTreeMap<String, TypeInfo>,
    imports: &'a BTreeMap<String, String>,
    fallback_package: &'a str,
    resolved: BTreeMap<String, TypeInfo>,
    visited: HashSet<String>,
}

impl Resolution<'_> {
    /// @ai:intent Resolve one type reference and recurse into its struct fields
    /// @ai:post every reachable non-basic type has exactly one entry
    fn collect(&mut self, cancel: &CancelToken, type_ref: &str) -> Result<()> {
        let base = typeexpr::base_type(type_ref).to_string();
        if base.is_empty() || typeexpr::is_basic(&base) {
            return Ok(());
        }
        let qualified = if base.contains('.') || self.package_name.is_empty() {
            base.clone()
        } else {
            format!("{}.{}", self.package_name, base)
        };
        // Marking before descending is what terminates reference cycles.
        if !self.visited.insert(qualified.clone()) {
            return Ok(());
        }
        cancel.check()?;

        let info = match self.declared.get(&qualified) {
            Some(info) => info.clone(),
            None => self.placeholder(&base),
        };
        let field_types: Vec<String> = if info.kind == TypeKind::Struct {
            info.fields.iter().map(|f| f.type_name.clone()).collect()
        } else {
            Vec::new()
        };
        self.resolved.entry(qualified).or_insert(info);

        for field_type in field_types {
            self.collect(cancel, &field_type)?;
        }
        Ok(())
    }

    /// Opaque record for a reference with no declaration in the analyzed
    /// package: either an import resolved through the alias table, or an
    /// unqualified name attributed to the package itself.
    fn placeholder(&self, base: &str) -> TypeInfo {
        let name = typeexpr::type_name(base).to_string();
        let alias = typeexpr::type_package(base);
        if alias.is_empty() {
            return TypeInfo {
                name,
                package: self.fallback_package.to_string(),
                ..Default::default()
            };
        }
        match self.imports.get(alias) {
            Some(path) => TypeInfo {
                name,
                package: last_segment(path).to_string(),
                import: path.clone(),
                ..Default::default()
            },
            None => TypeInfo {
                name,
                package: alias.to_string(),
                ..Default::default()
            },
        }
    }
}

/// Qualify the base of a reference with the package identifier when the base
/// is a bare name declared in the analyzed package.
fn qualify_local(type_text: &str, package_name: &str, local_names: &HashSet<String>) -> String {
    let base = typeexpr::base_type(type_text);
    if !base.contains('.') && local_names.contains(base) {
        typeexpr::qualify(type_text, package_name)
    } else {
        type_text.to_string()
    }
}

/// Kind of a single-line declaration, decided by its outermost constructor.
fn classify_underlying(underlying: &str, info: &mut TypeInfo) {
    let trimmed = underlying.trim_start();
    if trimmed.starts_with("func") {
        info.kind = TypeKind::Function;
        info.function = true;
    } else if trimmed.starts_with("map[") {
        info.kind = TypeKind::Map;
        info.map = true;
    } else if trimmed.starts_with("chan") || trimmed.starts_with("<-chan") {
        info.kind = TypeKind::Channel;
        info.channel = true;
    } else if trimmed.starts_with("[]") {
        info.kind = TypeKind::Slice;
        info.slice = true;
    } else if trimmed.starts_with('[') {
        info.kind = TypeKind::Array;
        info.array = true;
        info.array_len = typeexpr::analyze(trimmed).array_len;
    } else if trimmed.starts_with('*') {
        info.kind = TypeKind::Pointer;
        info.pointer = true;
    } else {
        info.kind = TypeKind::Basic;
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Directory-name fallback when no file carries a package clause.
fn package_name_from_path(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().replace('_', ""))
        .unwrap_or_default()
}
