//! @ai:module:intent Extract annotated interfaces and their signatures from source files
//! @ai:module:layer application
//! @ai:module:public_api StageExtraction
//! @ai:module:depends_on source, annotation, typeexpr, pipeline
//! @ai:module:stateless true

use crate::annotation::AnnotationParser;
use crate::model::{Annotations, Interface, Method, MethodInfo, Package, Position, Variable};
use crate::pipeline::{CancelToken, Data, Stage};
use crate::source::{self, DocLine, RawVariable, SourceFile};
use crate::typeexpr;
use crate::Result;
use std::collections::HashSet;

/// @ai:intent Walks package files and builds raw interface records
///
/// Only interfaces whose merged annotation map is non-empty are emitted;
/// everything else is not a service candidate.
pub struct StageExtraction {
    parser: AnnotationParser,
}

impl StageExtraction {
    pub fn new(parser: AnnotationParser) -> Self {
        Self { parser }
    }

    fn collect_annotations(&self, doc: &[DocLine]) -> Annotations {
        let mut annotations = Annotations::new();
        for line in doc {
            // Lines without the prefix parse to an empty map; later lines
            // overwrite earlier values for identical keys.
            annotations.extend(self.parser.parse(&line.text));
        }
        annotations
    }
}

impl Stage for StageExtraction {
    fn process(&self, cancel: &CancelToken, mut data: Data) -> Result<Data> {
        let files = source::list_go_files(&data.absolute_path);
        if files.is_empty() {
            data.interfaces = Vec::new();
            data.package.annotations = Annotations::new();
            return Ok(data);
        }

        let mut sources = Vec::with_capacity(files.len());
        for path in &files {
            cancel.check()?;
            sources.push(SourceFile::parse(path)?);
        }

        let mut local_types: HashSet<String> = HashSet::new();
        for src in &sources {
            local_types.extend(src.declared_type_names());
        }
        let package_name = sources
            .iter()
            .map(|s| s.package_name.as_str())
            .find(|n| !n.is_empty())
            .unwrap_or_default()
            .to_string();
        let import = full_import_path(&data.package);

        let mut interfaces = Vec::new();
        let mut package_annotations = Annotations::new();
        for src in &sources {
            package_annotations.extend(self.collect_annotations(&src.package_doc));

            for decl in &src.interfaces {
                let annotations = self.collect_annotations(&decl.doc);
                if annotations.is_empty() {
                    continue;
                }
                let methods = decl
                    .methods
                    .iter()
                    .map(|m| {
                        let info = MethodInfo {
                            name: m.name.clone(),
                            parameters: build_variables(&m.params, &local_types, &package_name),
                            results: build_variables(&m.results, &local_types, &package_name),
                            annotations: self.collect_annotations(&m.doc),
                            position: Position::new(src.file_name.clone(), m.line, m.column),
                        };
                        Method::new(info)
                    })
                    .collect();

                interfaces.push(Interface {
                    name: decl.name.clone(),
                    id: format!("{}.{}", src.package_name, decl.name),
                    package: src.package_name.clone(),
                    import: import.clone(),
                    methods,
                    annotations,
                    position: Position::new(src.file_name.clone(), decl.line, decl.column),
                });
            }
        }

        data.interfaces = interfaces;
        data.package.annotations = package_annotations;
        Ok(data)
    }
}

/// Fully qualified import path of the analyzed package.
pub(crate) fn full_import_path(package: &Package) -> String {
    if package.module_name.is_empty() {
        package.package_path.clone()
    } else if package.package_path.is_empty() || package.package_path == "." {
        package.module_name.clone()
    } else {
        format!("{}/{}", package.module_name, package.package_path)
    }
}

fn build_variables(
    raw: &[RawVariable],
    local_types: &HashSet<String>,
    package_name: &str,
) -> Vec<Variable> {
    raw.iter()
        .map(|r| build_variable(r, local_types, package_name))
        .collect()
}

/// Variables carry the bare base reference; decorations live in the flags.
/// Bare names declared in the analyzed package are qualified with the
/// package identifier.
fn build_variable(
    raw: &RawVariable,
    local_types: &HashSet<String>,
    package_name: &str,
) -> Variable {
    let decorations = typeexpr::analyze(&raw.type_text);
    let base = typeexpr::base_type(&raw.type_text);
    let type_name = if !base.contains('.') && local_types.contains(base) {
        format!("{package_name}.{base}")
    } else {
        base.to_string()
    };

    let mut variable = Variable {
        name: raw.name.clone(),
        type_name,
        ..Default::default()
    };
    decorations.apply_to_variable(&mut variable);
    variable
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const SERVICE: &str = r#"// @asti version=1
package svc

import "context"

// @asti service=user
type UserService interface {
	// @asti http-method=POST
	CreateUser(ctx context.Context, user User) (id string, err error)
	GetUser(ctx context.Context, id string) (user *User, err error)
}

type Plain interface {
	Do(ctx context.Context) (err error)
}

type User struct {
	ID string `json:"id"`
}
"#;

    fn run_extraction(dir: &TempDir) -> Data {
        let data = Data {
            absolute_path: dir.path().to_path_buf(),
            ..Default::default()
        };
        StageExtraction::new(AnnotationParser::default())
            .process(&CancelToken::new(), data)
            .unwrap()
    }

    #[test]
    fn test_only_annotated_interfaces_are_extracted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("service.go"), SERVICE).unwrap();

        let result = run_extraction(&dir);
        assert_eq!(result.interfaces.len(), 1);
        let iface = &result.interfaces[0];
        assert_eq!(iface.name, "UserService");
        assert_eq!(iface.id, "svc.UserService");
        assert_eq!(iface.package, "svc");
        assert_eq!(iface.annotations["service"], "user");
        assert_eq!(result.package.annotations["version"], "1");
    }

    #[test]
    fn test_local_types_are_qualified_and_decorated() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("service.go"), SERVICE).unwrap();

        let result = run_extraction(&dir);
        let get_user = &result.interfaces[0].methods[1];
        assert_eq!(get_user.info.parameters[0].type_name, "context.Context");
        assert_eq!(get_user.info.parameters[0].name, "ctx");

        let user_result = &get_user.info.results[0];
        assert_eq!(user_result.type_name, "svc.User");
        assert!(user_result.pointer);
        assert_eq!(get_user.info.results[1].type_name, "error");
    }

    #[test]
    fn test_method_annotations_and_ids() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("service.go"), SERVICE).unwrap();

        let result = run_extraction(&dir);
        let create = &result.interfaces[0].methods[0];
        assert_eq!(create.id, "CreateUser");
        assert_eq!(create.info.annotations["http-method"], "POST");
        assert!(!create.serializable);
    }

    #[test]
    fn test_empty_directory_yields_empty_result() {
        let dir = TempDir::new().unwrap();
        let result = run_extraction(&dir);
        assert!(result.interfaces.is_empty());
        assert!(result.package.annotations.is_empty());
    }

    #[test]
    fn test_test_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("service_test.go"), SERVICE).unwrap();
        let result = run_extraction(&dir);
        assert!(result.interfaces.is_empty());
    }

    #[test]
    fn test_cancellation_aborts_extraction() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("service.go"), SERVICE).unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let data = Data {
            absolute_path: dir.path().to_path_buf(),
            ..Default::default()
        };
        let err = StageExtraction::new(AnnotationParser::default())
            .process(&cancel, data)
            .unwrap_err();
        assert!(matches!(err, crate::Error::Cancelled));
    }
}
