//! @ai:module:intent Analyze type reference strings: decorations, base names, qualification
//! @ai:module:layer domain
//! @ai:module:public_api Decorations, analyze, base_type, is_basic, qualify, type_name, type_package
//! @ai:module:stateless true

use crate::model::{FieldInfo, Variable};

/// @ai:intent Decoration flags stripped from a type reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decorations {
    pub pointer: bool,
    pub slice: bool,
    pub array: bool,
    pub array_len: usize,
    pub map: bool,
    pub channel: bool,
    pub variadic: bool,
    pub generic: bool,
}

impl Decorations {
    pub fn apply_to_variable(&self, variable: &mut Variable) {
        variable.pointer = self.pointer;
        variable.slice = self.slice;
        variable.array = self.array;
        variable.array_len = self.array_len;
        variable.map = self.map;
        variable.channel = self.channel;
        variable.variadic = self.variadic;
        variable.generic = self.generic;
    }

    pub fn apply_to_field(&self, field: &mut FieldInfo) {
        field.pointer = self.pointer;
        field.slice = self.slice;
        field.array = self.array;
        field.array_len = self.array_len;
        field.map = self.map;
        field.channel = self.channel;
        field.generic = self.generic;
    }
}

/// @ai:intent Compute decoration flags for a type reference string
/// @ai:example ("[]*svc.User") -> slice + pointer
/// @ai:example ("map[string]User") -> map
/// @ai:effects pure
pub fn analyze(type_str: &str) -> Decorations {
    let mut decorations = Decorations::default();
    let (start, _) = base_range(type_str, Some(&mut decorations));
    let rest = &type_str[start..];
    if rest.contains('[') {
        decorations.generic = true;
    }
    decorations
}

/// @ai:intent Strip every decoration and return the bare declared name
/// @ai:example ("*[]svc.User") -> "svc.User"
/// @ai:example ("List[string]") -> "List"
/// @ai:effects pure
pub fn base_type(type_str: &str) -> &str {
    let (start, end) = base_range(type_str, None);
    &type_str[start..end]
}

/// @ai:intent Qualify a bare base name with a package identifier, preserving decorations
/// @ai:example ("[]*User", "svc") -> "[]*svc.User"
/// @ai:effects pure
pub fn qualify(type_str: &str, package: &str) -> String {
    let (start, end) = base_range(type_str, None);
    let base = &type_str[start..end];
    if base.is_empty() || base.contains('.') || is_basic(base) || package.is_empty() {
        return type_str.to_string();
    }
    format!("{}{}.{}", &type_str[..start], package, &type_str[start..])
}

/// Byte range of the bare base name, optionally recording decorations on the
/// way in. The range excludes generic argument lists.
fn base_range(type_str: &str, mut decorations: Option<&mut Decorations>) -> (usize, usize) {
    let mut rest = type_str;
    let mut offset = 0usize;

    macro_rules! mark {
        ($field:ident) => {
            if let Some(d) = decorations.as_deref_mut() {
                d.$field = true;
            }
        };
    }

    loop {
        let trimmed = rest.trim_start();
        offset += rest.len() - trimmed.len();
        rest = trimmed;

        if let Some(r) = rest.strip_prefix('*') {
            mark!(pointer);
            offset += 1;
            rest = r;
            continue;
        }
        if let Some(r) = rest.strip_prefix("[]") {
            mark!(slice);
            offset += 2;
            rest = r;
            continue;
        }
        if rest.starts_with('[') {
            // Fixed-size array prefix: [N]Elem.
            if let Some(close) = rest.find(']') {
                if let Some(d) = decorations.as_deref_mut() {
                    d.array = true;
                    d.array_len = rest[1..close].trim().parse().unwrap_or(0);
                }
                offset += close + 1;
                rest = &rest[close + 1..];
                continue;
            }
        }
        if let Some(r) = rest.strip_prefix("chan<- ") {
            mark!(channel);
            offset += 7;
            rest = r;
            continue;
        }
        if let Some(r) = rest.strip_prefix("<-chan ") {
            mark!(channel);
            offset += 7;
            rest = r;
            continue;
        }
        if let Some(r) = rest.strip_prefix("chan ") {
            mark!(channel);
            offset += 5;
            rest = r;
            continue;
        }
        if let Some(r) = rest.strip_prefix("...") {
            mark!(variadic);
            offset += 3;
            rest = r;
            continue;
        }
        if let Some(r) = strip_map_prefix(rest) {
            mark!(map);
            offset += rest.len() - r.len();
            rest = r;
            continue;
        }
        break;
    }

    let name_len = rest.find('[').unwrap_or(rest.len());
    (offset, offset + name_len)
}

/// Strip a `map[K]` prefix with bracket balancing, returning the value type.
fn strip_map_prefix(type_str: &str) -> Option<&str> {
    let rest = type_str.strip_prefix("map[")?;
    let mut depth = 1usize;
    for (idx, ch) in rest.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[idx + 1..]);
                }
            }
            _ => {}
        }
    }
    None
}

/// @ai:intent Check whether a bare name denotes a built-in scalar
/// @ai:post qualified names (containing a dot) are never basic
/// @ai:effects pure
pub fn is_basic(type_str: &str) -> bool {
    if type_str.contains('.') {
        return false;
    }
    matches!(
        type_str,
        "string"
            | "int"
            | "int8"
            | "int16"
            | "int32"
            | "int64"
            | "uint"
            | "uint8"
            | "uint16"
            | "uint32"
            | "uint64"
            | "float32"
            | "float64"
            | "complex64"
            | "complex128"
            | "bool"
            | "byte"
            | "rune"
            | "uintptr"
            | "error"
            | "interface{}"
            | "any"
    )
}

/// @ai:intent Extract the name segment of a possibly qualified reference
/// @ai:effects pure
pub fn type_name(full_type: &str) -> &str {
    match full_type.rfind('.') {
        Some(idx) => &full_type[idx + 1..],
        None => full_type,
    }
}

/// @ai:intent Extract the package segment of a possibly qualified reference
/// @ai:effects pure
pub fn type_package(full_type: &str) -> &str {
    match full_type.rfind('.') {
        Some(idx) => &full_type[..idx],
        None => "",
    }
}
