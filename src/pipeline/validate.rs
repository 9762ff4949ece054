//! @ai:module:intent Validate interfaces against the calling convention, failing fast
//! @ai:module:layer application
//! @ai:module:public_api StageValidation, ValidationRule, RuleViolation, validate_interface
//! @ai:module:depends_on model, pipeline, error
//! @ai:module:stateless true

use crate::error::Error;
use crate::model::{Interface, Position};
use crate::pipeline::{CancelToken, Data, Stage};
use crate::Result;

/// @ai:intent First violation found by a validation rule
#[derive(Debug, Clone)]
pub struct RuleViolation {
    /// Empty for interface-level violations.
    pub method: String,
    pub position: Position,
    pub message: String,
}

/// @ai:intent Strict counterpart of a filter rule, reporting the first violation
pub trait ValidationRule: Send + Sync {
    fn validate(&self, iface: &Interface) -> std::result::Result<(), RuleViolation>;
}

/// @ai:intent Raises an explicit error for the first non-conforming interface
///
/// The opt-in counterpart of filtering, for callers requiring hard failures
/// instead of silent omission.
pub struct StageValidation {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl StageValidation {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    /// @ai:intent Validate one interface against this stage's rule list
    pub fn validate(&self, iface: &Interface) -> Result<()> {
        validate_interface(iface, &self.rules)
    }
}

impl Default for StageValidation {
    fn default() -> Self {
        Self::new()
    }
}

pub fn default_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![
        Box::new(AnnotationPresenceRule),
        Box::new(FirstParamContextRule),
        Box::new(LastResultErrorRule),
        Box::new(NamedParametersRule),
    ]
}

/// @ai:intent Apply rules in order, converting the first violation to an error
pub fn validate_interface(iface: &Interface, rules: &[Box<dyn ValidationRule>]) -> Result<()> {
    for rule in rules {
        if let Err(violation) = rule.validate(iface) {
            return Err(Error::Validation {
                interface: iface.name.clone(),
                method: violation.method,
                file: violation.position.file,
                line: violation.position.line,
                message: violation.message,
            });
        }
    }
    Ok(())
}

impl Stage for StageValidation {
    fn process(&self, _cancel: &CancelToken, data: Data) -> Result<Data> {
        for iface in &data.interfaces {
            self.validate(iface)?;
        }
        Ok(data)
    }
}

/// @ai:intent Interface must carry annotations
pub struct AnnotationPresenceRule;

impl ValidationRule for AnnotationPresenceRule {
    fn validate(&self, iface: &Interface) -> std::result::Result<(), RuleViolation> {
        if iface.annotations.is_empty() {
            return Err(RuleViolation {
                method: String::new(),
                position: iface.position.clone(),
                message: "interface must have annotations".to_string(),
            });
        }
        Ok(())
    }
}

/// @ai:intent First parameter of every method must be `ctx context.Context`
pub struct FirstParamContextRule;

impl ValidationRule for FirstParamContextRule {
    fn validate(&self, iface: &Interface) -> std::result::Result<(), RuleViolation> {
        for method in &iface.methods {
            let first = method.info.parameters.first().ok_or_else(|| RuleViolation {
                method: method.info.name.clone(),
                position: method.info.position.clone(),
                message: "method must have at least one parameter (context.Context)".to_string(),
            })?;
            if first.type_name != "context.Context" {
                return Err(RuleViolation {
                    method: method.info.name.clone(),
                    position: method.info.position.clone(),
                    message: format!(
                        "first parameter must be context.Context, got {}",
                        first.type_name
                    ),
                });
            }
            if first.name != "ctx" {
                return Err(RuleViolation {
                    method: method.info.name.clone(),
                    position: method.info.position.clone(),
                    message: format!("first parameter must be named 'ctx', got {}", first.name),
                });
            }
        }
        Ok(())
    }
}

/// @ai:intent Last result of every method must be `err error`
pub struct LastResultErrorRule;

impl ValidationRule for LastResultErrorRule {
    fn validate(&self, iface: &Interface) -> std::result::Result<(), RuleViolation> {
        for method in &iface.methods {
            let last = method.info.results.last().ok_or_else(|| RuleViolation {
                method: method.info.name.clone(),
                position: method.info.position.clone(),
                message: "method must return at least one value (error)".to_string(),
            })?;
            if last.type_name != "error" {
                return Err(RuleViolation {
                    method: method.info.name.clone(),
                    position: method.info.position.clone(),
                    message: format!("last result must be error, got {}", last.type_name),
                });
            }
            if last.name != "err" {
                return Err(RuleViolation {
                    method: method.info.name.clone(),
                    position: method.info.position.clone(),
                    message: format!("last result must be named 'err', got {}", last.name),
                });
            }
        }
        Ok(())
    }
}

/// @ai:intent Every parameter and result must be named
pub struct NamedParametersRule;

impl ValidationRule for NamedParametersRule {
    fn validate(&self, iface: &Interface) -> std::result::Result<(), RuleViolation> {
        for method in &iface.methods {
            for (index, variable) in method.info.parameters.iter().enumerate() {
                if variable.name.is_empty() {
                    return Err(RuleViolation {
                        method: method.info.name.clone(),
                        position: method.info.position.clone(),
                        message: format!("parameter {} must be named", index + 1),
                    });
                }
            }
            for (index, variable) in method.info.results.iter().enumerate() {
                if variable.name.is_empty() {
                    return Err(RuleViolation {
                        method: method.info.name.clone(),
                        position: method.info.position.clone(),
                        message: format!("result {} must be named", index + 1),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotations, Method, MethodInfo, Variable};

    fn variable(name: &str, type_name: &str) -> Variable {
        Variable {
            name: name.to_string(),
            type_name: type_name.to_string(),
            ..Default::default()
        }
    }

    fn conforming_interface() -> Interface {
        let mut annotations = Annotations::new();
        annotations.insert("service".to_string(), "user".to_string());
        Interface {
            name: "UserService".to_string(),
            id: "svc.UserService".to_string(),
            package: "svc".to_string(),
            methods: vec![Method::new(MethodInfo {
                name: "GetUser".to_string(),
                parameters: vec![
                    variable("ctx", "context.Context"),
                    variable("id", "string"),
                ],
                results: vec![variable("user", "svc.User"), variable("err", "error")],
                position: Position::new("service.go", 12, 2),
                ..Default::default()
            })],
            annotations,
            ..Default::default()
        }
    }

    #[test]
    fn test_conforming_interface_passes() {
        let stage = StageValidation::new();
        assert!(stage.validate(&conforming_interface()).is_ok());
    }

    #[test]
    fn test_violation_names_interface_and_method() {
        let mut iface = conforming_interface();
        iface.methods[0].info.parameters[0].name = "c".to_string();

        let err = StageValidation::new().validate(&iface).unwrap_err();
        match err {
            Error::Validation {
                interface,
                method,
                line,
                ..
            } => {
                assert_eq!(interface, "UserService");
                assert_eq!(method, "GetUser");
                assert_eq!(line, 12);
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_stage_fails_fast_on_first_violation() {
        let mut bad = conforming_interface();
        bad.name = "Broken".to_string();
        bad.methods[0].info.results.clear();

        let data = Data {
            interfaces: vec![conforming_interface(), bad],
            ..Default::default()
        };
        let err = StageValidation::new()
            .process(&CancelToken::new(), data)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { ref interface, .. } if interface == "Broken"));
    }

    #[test]
    fn test_missing_annotations_violation_has_no_method() {
        let mut iface = conforming_interface();
        iface.annotations.clear();
        let err = StageValidation::new().validate(&iface).unwrap_err();
        assert!(matches!(err, Error::Validation { ref method, .. } if method.is_empty()));
    }
}
