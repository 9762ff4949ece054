//! @ai:module:intent Parse @asti annotation comments into key-value maps
//! @ai:module:layer domain
//! @ai:module:public_api AnnotationParser, DEFAULT_PREFIX
//! @ai:module:stateless true

use crate::model::Annotations;

/// Prefix marking an annotation comment when none is configured.
pub const DEFAULT_PREFIX: &str = "@asti";

/// @ai:intent Parses one annotation comment into a flat string map
///
/// The grammar is whitespace-separated `key=value` pairs after the prefix.
/// Values may be double-quoted to span multiple tokens; a bare key commits
/// as `key=true`. Parsing never fails: text without the prefix yields an
/// empty map, and an unclosed quoted value commits as-is at end of input.
#[derive(Debug, Clone)]
pub struct AnnotationParser {
    prefix: String,
}

impl Default for AnnotationParser {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl AnnotationParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if prefix.is_empty() {
            prefix = DEFAULT_PREFIX.to_string();
        }
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// @ai:intent Merge successive annotation lines, later same-key value wins
    /// @ai:effects pure
    pub fn parse_all<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Annotations {
        let mut annotations = Annotations::new();
        for line in lines {
            annotations.extend(self.parse(line));
        }
        annotations
    }

    /// @ai:intent Check whether a comment line carries this parser's prefix
    /// @ai:effects pure
    pub fn is_annotation(&self, text: &str) -> bool {
        strip_comment_marker(text).starts_with(&self.prefix)
    }

    /// @ai:intent Parse one comment's text into an annotation map
    /// @ai:post text without the prefix yields an empty map, not an error
    /// @ai:effects pure
    pub fn parse(&self, text: &str) -> Annotations {
        let mut annotations = Annotations::new();

        let text = strip_comment_marker(text);
        let content = match text.strip_prefix(&self.prefix) {
            Some(rest) => rest.trim(),
            None => return annotations,
        };

        let mut current_key = String::new();
        let mut current_value = String::new();
        let mut in_quotes = false;

        for token in tokenize(content) {
            if token.contains('=') && !in_quotes {
                if !current_key.is_empty() {
                    annotations.insert(
                        std::mem::take(&mut current_key),
                        std::mem::take(&mut current_value).trim().to_string(),
                    );
                }
                let (key, value) = match token.split_once('=') {
                    Some(pair) => pair,
                    None => continue,
                };
                let key = key.trim();
                let value = value.trim();

                if value.starts_with('"') {
                    if value.ends_with('"') {
                        annotations
                            .insert(key.to_string(), value.trim_matches('"').to_string());
                    } else {
                        current_key = key.to_string();
                        current_value = value[1..].to_string();
                        in_quotes = true;
                    }
                } else {
                    annotations.insert(key.to_string(), value.to_string());
                }
            } else if in_quotes {
                if let Some(body) = token.strip_suffix('"') {
                    current_value.push(' ');
                    current_value.push_str(body);
                    annotations.insert(
                        std::mem::take(&mut current_key),
                        std::mem::take(&mut current_value).trim().to_string(),
                    );
                    in_quotes = false;
                } else {
                    current_value.push(' ');
                    current_value.push_str(&token);
                }
            } else if !current_key.is_empty() {
                current_value.push(' ');
                current_value.push_str(&token);
            } else {
                // Bare key shorthand: `@asti enabled` means `enabled=true`.
                annotations.insert(token.trim().to_string(), "true".to_string());
            }
        }

        // Unterminated quoted value: commit what was collected.
        if !current_key.is_empty() {
            annotations.insert(current_key, current_value.trim().to_string());
        }

        annotations
    }
}

/// @ai:intent Strip leading comment decoration from a line
/// @ai:effects pure
fn strip_comment_marker(text: &str) -> &str {
    let text = text.trim();
    match text.strip_prefix("//") {
        Some(rest) => rest.trim(),
        None => text,
    }
}

/// @ai:intent Split annotation content on spaces, except inside double quotes
/// @ai:effects pure
fn tokenize(content: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in content.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ' ' if !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Annotations {
        AnnotationParser::default().parse(text)
    }

    #[test]
    fn test_quoted_and_unquoted_values() {
        let annotations = parse(r#"// @asti name="A" tag=complex,advanced"#);
        assert_eq!(annotations["name"], "A");
        assert_eq!(annotations["tag"], "complex,advanced");
        assert_eq!(annotations.len(), 2);
    }

    #[test]
    fn test_numeric_values_stay_strings() {
        let annotations = parse("// @asti retry=3 timeout=10");
        assert_eq!(annotations["retry"], "3");
        assert_eq!(annotations["timeout"], "10");
    }

    #[test]
    fn test_bare_key_is_boolean() {
        let annotations = parse("// @asti enabled");
        assert_eq!(annotations["enabled"], "true");
    }

    #[test]
    fn test_quoted_value_spanning_tokens() {
        let annotations = parse(r#"// @asti desc="create a new user" log"#);
        assert_eq!(annotations["desc"], "create a new user");
        assert_eq!(annotations["log"], "true");
    }

    #[test]
    fn test_unclosed_quote_commits_collected_value() {
        let annotations = parse(r#"// @asti desc="never closed"#);
        assert_eq!(annotations["desc"], "never closed");
    }

    #[test]
    fn test_missing_prefix_yields_empty_map() {
        assert!(parse("// plain doc comment").is_empty());
        assert!(parse("// @other key=value").is_empty());
    }

    #[test]
    fn test_custom_prefix() {
        let parser = AnnotationParser::new("@svc");
        let annotations = parser.parse("// @svc method=POST");
        assert_eq!(annotations["method"], "POST");
        assert!(parser.parse("// @asti method=POST").is_empty());
    }

    #[test]
    fn test_empty_prefix_falls_back_to_default() {
        let parser = AnnotationParser::new("");
        assert_eq!(parser.prefix(), DEFAULT_PREFIX);
    }

    #[test]
    fn test_merge_is_last_write_wins() {
        let parser = AnnotationParser::default();
        let mut merged = parser.parse("// @asti a=1");
        merged.extend(parser.parse("// @asti a=2 b=3"));
        assert_eq!(merged["a"], "2");
        assert_eq!(merged["b"], "3");
        assert_eq!(merged.len(), 2);
    }
}
