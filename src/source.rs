//! @ai:module:intent Scan Go source files into declarations with doc comments and positions
//! @ai:module:layer application
//! @ai:module:public_api SourceFile, InterfaceDecl, MethodDecl, TypeDecl, TypeBody, RawField, RawVariable, ImportDecl, DocLine, parse_tags
//! @ai:module:depends_on error
//! @ai:module:stateless true
//!
//! A line-oriented scanner, not a full parser: it recognises package clauses,
//! imports, interface blocks with single-line method signatures, struct
//! blocks, and single-line type declarations. Anything else is skipped.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent A doc comment line preceding a declaration
#[derive(Debug, Clone)]
pub struct DocLine {
    pub line: usize,
    pub text: String,
}

/// @ai:intent One import declaration with its optional alias
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub alias: Option<String>,
    pub path: String,
}

/// @ai:intent A raw parameter or result as written in a signature
#[derive(Debug, Clone)]
pub struct RawVariable {
    pub name: String,
    pub type_text: String,
}

/// @ai:intent A method signature found inside an interface block
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub line: usize,
    pub column: usize,
    pub doc: Vec<DocLine>,
    pub params: Vec<RawVariable>,
    pub results: Vec<RawVariable>,
}

/// @ai:intent An interface declaration with its methods
#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub line: usize,
    pub column: usize,
    pub doc: Vec<DocLine>,
    pub type_params: Vec<String>,
    pub methods: Vec<MethodDecl>,
}

/// @ai:intent A struct field as written, tag text unparsed
#[derive(Debug, Clone)]
pub struct RawField {
    pub name: String,
    pub type_text: String,
    pub tag_text: Option<String>,
    pub doc: Vec<DocLine>,
    pub embedded: bool,
    pub line: usize,
    pub column: usize,
}

/// @ai:intent Shape of a type declaration body
#[derive(Debug, Clone)]
pub enum TypeBody {
    Struct(Vec<RawField>),
    Interface,
    /// Single-line declaration; carries the underlying reference text.
    Other(String),
}

/// @ai:intent A named type declaration
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub line: usize,
    pub column: usize,
    pub doc: Vec<DocLine>,
    pub type_params: Vec<String>,
    pub body: TypeBody,
}

/// @ai:intent Scanned declarations of one source file
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub file_name: String,
    pub package_name: String,
    pub package_doc: Vec<DocLine>,
    pub imports: Vec<ImportDecl>,
    pub interfaces: Vec<InterfaceDecl>,
    pub types: Vec<TypeDecl>,
}

impl SourceFile {
    /// @ai:intent Read and scan a source file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn parse(path: &Path) -> Result<SourceFile> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(parse_source(&content, &file_name))
    }

    /// @ai:intent Names of every type declared in this file, interfaces included
    /// @ai:effects pure
    pub fn declared_type_names(&self) -> HashSet<String> {
        self.types.iter().map(|t| t.name.clone()).collect()
    }
}

/// @ai:intent List the Go source files of one package directory, sorted
/// @ai:post `_test.go` files are excluded
/// @ai:effects fs:read
pub fn list_go_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(".go") && !n.ends_with("_test.go"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// @ai:intent Scan source text into declarations
/// @ai:post unrecognised lines are skipped, never an error
/// @ai:effects pure
pub fn parse_source(content: &str, file_name: &str) -> SourceFile {
    let re_package = Regex::new(r"^package\s+([A-Za-z_]\w*)").expect("Invalid regex");
    let re_import_single =
        Regex::new(r#"^import\s+(?:([\w.]+)\s+)?"([^"]+)""#).expect("Invalid regex");
    let re_type =
        Regex::new(r"^type\s+([A-Za-z_]\w*)(\[[^\]]*\])?\s*=?\s*(.*)$").expect("Invalid regex");

    let mut source = SourceFile {
        file_name: file_name.to_string(),
        ..Default::default()
    };

    let lines: Vec<&str> = content.lines().collect();
    let mut doc: Vec<DocLine> = Vec::new();
    let mut idx = 0usize;

    while idx < lines.len() {
        let raw = lines[idx];
        let line_no = idx + 1;
        let trimmed = raw.trim();

        if trimmed.starts_with("//") {
            doc.push(DocLine {
                line: line_no,
                text: trimmed.to_string(),
            });
            idx += 1;
            continue;
        }
        if trimmed.is_empty() {
            // A blank line breaks doc attachment.
            doc.clear();
            idx += 1;
            continue;
        }

        if source.package_name.is_empty() {
            if let Some(captures) = re_package.captures(trimmed) {
                source.package_name = captures[1].to_string();
                source.package_doc = std::mem::take(&mut doc);
                idx += 1;
                continue;
            }
        }

        if trimmed.starts_with("import (") {
            idx += 1;
            while idx < lines.len() {
                let spec = lines[idx].trim();
                if spec.starts_with(')') {
                    break;
                }
                if let Some(import) = parse_import_spec(spec) {
                    source.imports.push(import);
                }
                idx += 1;
            }
            doc.clear();
            idx += 1;
            continue;
        }
        if let Some(captures) = re_import_single.captures(trimmed) {
            source.imports.push(ImportDecl {
                alias: captures.get(1).map(|m| m.as_str().to_string()),
                path: captures[2].to_string(),
            });
            doc.clear();
            idx += 1;
            continue;
        }

        if let Some(captures) = re_type.captures(trimmed) {
            let name = captures[1].to_string();
            let type_params = captures
                .get(2)
                .map(|m| parse_type_params(m.as_str()))
                .unwrap_or_default();
            let rest = captures.get(3).map(|m| m.as_str()).unwrap_or("").trim();
            let column = raw.find(&name).map(|i| i + 1).unwrap_or(1);
            let decl_doc = std::mem::take(&mut doc);

            if rest.starts_with("interface") && rest.contains('{') {
                let (body, next) = collect_block(&lines, idx);
                let methods = parse_interface_body(&body);
                source.interfaces.push(InterfaceDecl {
                    name: name.clone(),
                    line: line_no,
                    column,
                    doc: decl_doc.clone(),
                    type_params: type_params.clone(),
                    methods,
                });
                source.types.push(TypeDecl {
                    name,
                    line: line_no,
                    column,
                    doc: decl_doc,
                    type_params,
                    body: TypeBody::Interface,
                });
                idx = next;
                continue;
            }

            if rest.starts_with("struct") && rest.contains('{') {
                let (body, next) = collect_block(&lines, idx);
                let fields = parse_struct_body(&body);
                source.types.push(TypeDecl {
                    name,
                    line: line_no,
                    column,
                    doc: decl_doc,
                    type_params,
                    body: TypeBody::Struct(fields),
                });
                idx = next;
                continue;
            }

            if !rest.is_empty() {
                source.types.push(TypeDecl {
                    name,
                    line: line_no,
                    column,
                    doc: decl_doc,
                    type_params,
                    body: TypeBody::Other(rest.to_string()),
                });
                idx += 1;
                continue;
            }
        }

        doc.clear();
        idx += 1;
    }

    source
}

/// @ai:intent Parse a struct tag literal into a key-value map
/// @ai:example (`json:"id" db:"user_id"`) -> {json: id, db: user_id}
/// @ai:effects pure
pub fn parse_tags(tag_text: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    for part in tag_text.trim_matches('`').split_whitespace() {
        if let Some((key, value)) = part.split_once(':') {
            tags.insert(key.to_string(), value.trim_matches('"').to_string());
        }
    }
    tags
}

/// Collect the lines of a brace-delimited block starting at `start`.
/// Returns the inner lines (1-based line number, text) and the index of the
/// line after the closing brace.
fn collect_block<'a>(lines: &[&'a str], start: usize) -> (Vec<(usize, &'a str)>, usize) {
    let mut depth = brace_delta(lines[start]);
    let mut body = Vec::new();
    let mut idx = start + 1;

    if depth <= 0 {
        // Inline or empty body on the declaration line.
        return (body, idx);
    }
    while idx < lines.len() {
        let line = lines[idx];
        depth += brace_delta(line);
        if depth <= 0 {
            return (body, idx + 1);
        }
        body.push((idx + 1, line));
        idx += 1;
    }
    (body, idx)
}

fn brace_delta(line: &str) -> i32 {
    let mut delta = 0;
    for ch in line.chars() {
        match ch {
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

fn parse_import_spec(spec: &str) -> Option<ImportDecl> {
    let re = Regex::new(r#"^(?:([\w.]+)\s+)?"([^"]+)""#).expect("Invalid regex");
    let captures = re.captures(spec)?;
    Some(ImportDecl {
        alias: captures.get(1).map(|m| m.as_str().to_string()),
        path: captures[2].to_string(),
    })
}

/// Type-parameter names from a `[T any, U comparable]` list.
fn parse_type_params(list: &str) -> Vec<String> {
    let inner = list.trim_matches(|c| c == '[' || c == ']');
    inner
        .split(',')
        .filter_map(|p| p.trim().split_whitespace().next())
        .map(|n| n.to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

fn parse_interface_body(body: &[(usize, &str)]) -> Vec<MethodDecl> {
    let re_method = Regex::new(r"^([A-Za-z_]\w*)\s*\(").expect("Invalid regex");

    let mut methods = Vec::new();
    let mut doc: Vec<DocLine> = Vec::new();

    for &(line_no, raw) in body {
        let trimmed = raw.trim();
        if trimmed.starts_with("//") {
            doc.push(DocLine {
                line: line_no,
                text: trimmed.to_string(),
            });
            continue;
        }
        if trimmed.is_empty() {
            doc.clear();
            continue;
        }

        let name = match re_method.captures(trimmed) {
            Some(captures) => captures[1].to_string(),
            None => {
                // Embedded interface or unrecognised line.
                doc.clear();
                continue;
            }
        };
        if let Some((params, results)) = parse_signature(trimmed, name.len()) {
            let column = raw.find(&name).map(|i| i + 1).unwrap_or(1);
            methods.push(MethodDecl {
                name,
                line: line_no,
                column,
                doc: std::mem::take(&mut doc),
                params,
                results,
            });
        } else {
            doc.clear();
        }
    }

    methods
}

/// Parse `(params) results` after the method name. Signatures are expected
/// on a single line.
fn parse_signature(line: &str, name_len: usize) -> Option<(Vec<RawVariable>, Vec<RawVariable>)> {
    let line = match line.find("//") {
        Some(comment) => line[..comment].trim_end(),
        None => line,
    };

    let open = line[name_len..].find('(')? + name_len;
    let close = matching_paren(line, open)?;
    let params = parse_variable_list(&line[open + 1..close]);

    let rest = line[close + 1..].trim();
    let results = if rest.is_empty() {
        Vec::new()
    } else if rest.starts_with('(') {
        let inner_close = matching_paren(rest, 0)?;
        parse_variable_list(&rest[1..inner_close])
    } else {
        vec![RawVariable {
            name: String::new(),
            type_text: rest.to_string(),
        }]
    };

    Some((params, results))
}

fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, ch) in s.char_indices().skip_while(|&(i, _)| i < open) {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// @ai:intent Split a parameter or result list into named variables
///
/// Go's rule applies: a list is either fully named or fully unnamed, and
/// grouped names (`a, b string`) take the type of the next typed entry.
fn parse_variable_list(list: &str) -> Vec<RawVariable> {
    let parts = split_top_level(list, ',');
    if parts.is_empty() {
        return Vec::new();
    }

    let named = parts.iter().any(|p| split_named(p).is_some());
    if !named {
        return parts
            .into_iter()
            .map(|p| RawVariable {
                name: String::new(),
                type_text: p.trim().to_string(),
            })
            .collect();
    }

    let mut variables = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    for part in &parts {
        if let Some((name, type_text)) = split_named(part) {
            for grouped in pending.drain(..) {
                variables.push(RawVariable {
                    name: grouped,
                    type_text: type_text.clone(),
                });
            }
            variables.push(RawVariable {
                name,
                type_text,
            });
        } else {
            pending.push(part.trim().to_string());
        }
    }
    // Names without a following typed entry: malformed, keep them unnamed.
    for leftover in pending {
        variables.push(RawVariable {
            name: String::new(),
            type_text: leftover,
        });
    }

    variables
}

fn split_named(part: &str) -> Option<(String, String)> {
    let part = part.trim();
    let (first, rest) = part.split_once(' ')?;
    if !is_ident(first) || is_type_keyword(first) || rest.trim().is_empty() {
        return None;
    }
    Some((first.to_string(), rest.trim().to_string()))
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_type_keyword(s: &str) -> bool {
    matches!(s, "chan" | "map" | "func" | "struct" | "interface")
}

fn split_top_level(s: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for ch in s.chars() {
        match ch {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(ch);
            }
            c if c == separator && depth == 0 => {
                if !current.trim().is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }

    parts
}

fn parse_struct_body(body: &[(usize, &str)]) -> Vec<RawField> {
    let mut fields = Vec::new();
    let mut doc: Vec<DocLine> = Vec::new();

    for &(line_no, raw) in body {
        let trimmed = raw.trim();
        if trimmed.starts_with("//") {
            doc.push(DocLine {
                line: line_no,
                text: trimmed.to_string(),
            });
            continue;
        }
        if trimmed.is_empty() {
            doc.clear();
            continue;
        }

        let (decl, tag_text) = match trimmed.find('`') {
            Some(tag_start) => {
                let tag = trimmed[tag_start..].trim_matches('`');
                (trimmed[..tag_start].trim_end(), Some(tag.to_string()))
            }
            None => (trimmed, None),
        };

        let tokens: Vec<&str> = decl.split_whitespace().collect();
        if tokens.is_empty() {
            doc.clear();
            continue;
        }

        let field_doc = std::mem::take(&mut doc);
        if tokens.len() == 1 {
            // Embedded field.
            let column = raw.find(tokens[0]).map(|i| i + 1).unwrap_or(1);
            fields.push(RawField {
                name: tokens[0].to_string(),
                type_text: tokens[0].to_string(),
                tag_text,
                doc: field_doc,
                embedded: true,
                line: line_no,
                column,
            });
            continue;
        }

        let mut names = Vec::new();
        let mut type_start = tokens.len();
        for (i, token) in tokens.iter().enumerate() {
            if let Some(stripped) = token.strip_suffix(',') {
                names.push(stripped.to_string());
            } else {
                names.push(token.to_string());
                type_start = i + 1;
                break;
            }
        }
        let type_text = tokens[type_start..].join(" ");
        if type_text.is_empty() {
            continue;
        }

        for name in names {
            let column = raw.find(&name).map(|i| i + 1).unwrap_or(1);
            fields.push(RawField {
                name,
                type_text: type_text.clone(),
                tag_text: tag_text.clone(),
                doc: field_doc.clone(),
                embedded: false,
                line: line_no,
                column,
            });
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"// @asti version=1
package svc

import (
	"context"
	uuid "github.com/google/uuid"
)

// UserService manages users.
// @asti service=user log
type UserService interface {
	// @asti http-method=POST
	CreateUser(ctx context.Context, user User) (id string, err error)
	GetUser(ctx context.Context, id string) (user *User, err error)
	ListUsers(ctx context.Context, limit, offset int) (users []User, err error)
}

type User struct {
	ID      string `json:"id"`
	Name    string `json:"name"`
	Friends []*User
	Base
}

type UserID string
"#;

    #[test]
    fn test_package_and_doc() {
        let file = parse_source(SAMPLE, "service.go");
        assert_eq!(file.package_name, "svc");
        assert_eq!(file.package_doc.len(), 1);
        assert!(file.package_doc[0].text.contains("@asti version=1"));
    }

    #[test]
    fn test_imports_with_alias() {
        let file = parse_source(SAMPLE, "service.go");
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[0].path, "context");
        assert_eq!(file.imports[0].alias, None);
        assert_eq!(file.imports[1].alias.as_deref(), Some("uuid"));
        assert_eq!(file.imports[1].path, "github.com/google/uuid");
    }

    #[test]
    fn test_interface_methods() {
        let file = parse_source(SAMPLE, "service.go");
        assert_eq!(file.interfaces.len(), 1);
        let iface = &file.interfaces[0];
        assert_eq!(iface.name, "UserService");
        assert_eq!(iface.doc.len(), 2);
        assert_eq!(iface.methods.len(), 3);

        let create = &iface.methods[0];
        assert_eq!(create.name, "CreateUser");
        assert_eq!(create.doc.len(), 1);
        assert_eq!(create.params.len(), 2);
        assert_eq!(create.params[0].name, "ctx");
        assert_eq!(create.params[0].type_text, "context.Context");
        assert_eq!(create.results.len(), 2);
        assert_eq!(create.results[1].name, "err");
        assert_eq!(create.results[1].type_text, "error");
    }

    #[test]
    fn test_grouped_parameter_names() {
        let file = parse_source(SAMPLE, "service.go");
        let list = &file.interfaces[0].methods[2];
        assert_eq!(list.params.len(), 3);
        assert_eq!(list.params[1].name, "limit");
        assert_eq!(list.params[1].type_text, "int");
        assert_eq!(list.params[2].name, "offset");
        assert_eq!(list.params[2].type_text, "int");
    }

    #[test]
    fn test_struct_fields_and_tags() {
        let file = parse_source(SAMPLE, "service.go");
        let user = file
            .types
            .iter()
            .find(|t| t.name == "User")
            .expect("User type");
        let fields = match &user.body {
            TypeBody::Struct(fields) => fields,
            other => panic!("expected struct body, got {other:?}"),
        };
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].name, "ID");
        assert_eq!(
            fields[0].tag_text.as_deref(),
            Some(r#"json:"id""#)
        );
        assert_eq!(fields[2].name, "Friends");
        assert_eq!(fields[2].type_text, "[]*User");
        assert!(fields[3].embedded);
        assert_eq!(fields[3].name, "Base");
    }

    #[test]
    fn test_single_line_type_declaration() {
        let file = parse_source(SAMPLE, "service.go");
        let alias = file
            .types
            .iter()
            .find(|t| t.name == "UserID")
            .expect("UserID type");
        match &alias.body {
            TypeBody::Other(underlying) => assert_eq!(underlying, "string"),
            other => panic!("expected single-line body, got {other:?}"),
        }
    }

    #[test]
    fn test_interfaces_also_recorded_as_types() {
        let file = parse_source(SAMPLE, "service.go");
        let names = file.declared_type_names();
        assert!(names.contains("UserService"));
        assert!(names.contains("User"));
        assert!(names.contains("UserID"));
    }

    #[test]
    fn test_unnamed_result_list() {
        let content = "package svc\n\ntype S interface {\n\tDo(ctx context.Context) error\n}\n";
        let file = parse_source(content, "s.go");
        let method = &file.interfaces[0].methods[0];
        assert_eq!(method.results.len(), 1);
        assert_eq!(method.results[0].name, "");
        assert_eq!(method.results[0].type_text, "error");
    }

    #[test]
    fn test_generic_type_params() {
        let content = "package svc\n\ntype Pair[K comparable, V any] struct {\n\tKey K\n\tValue V\n}\n";
        let file = parse_source(content, "pair.go");
        let pair = &file.types[0];
        assert_eq!(pair.type_params, vec!["K".to_string(), "V".to_string()]);
    }

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags(r#"json:"id" db:"user_id""#);
        assert_eq!(tags["json"], "id");
        assert_eq!(tags["db"], "user_id");
    }
}
