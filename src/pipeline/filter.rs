//! @ai:module:intent Filter interfaces against the calling convention, dropping silently
//! @ai:module:layer application
//! @ai:module:public_api StageFilter, FilterRule, AnnotationPresenceFilter, FirstParamContextFilter, LastResultErrorFilter, NamedParametersFilter
//! @ai:module:depends_on model, pipeline
//! @ai:module:stateless true

use crate::model::Interface;
use crate::pipeline::{CancelToken, Data, Stage};
use crate::Result;

/// @ai:intent Non-fatal inclusion predicate over an interface record
pub trait FilterRule: Send + Sync {
    fn should_include(&self, iface: &Interface) -> bool;
}

/// @ai:intent Drops interfaces that fail any rule; an empty result is valid
pub struct StageFilter {
    rules: Vec<Box<dyn FilterRule>>,
}

impl StageFilter {
    /// @ai:intent Build the filter with the four default convention rules
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<Box<dyn FilterRule>>) -> Self {
        Self { rules }
    }
}

impl Default for StageFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed default order: annotation presence, context first, error last,
/// everything named.
pub fn default_rules() -> Vec<Box<dyn FilterRule>> {
    vec![
        Box::new(AnnotationPresenceFilter),
        Box::new(FirstParamContextFilter),
        Box::new(LastResultErrorFilter),
        Box::new(NamedParametersFilter),
    ]
}

impl Stage for StageFilter {
    fn process(&self, _cancel: &CancelToken, mut data: Data) -> Result<Data> {
        data.interfaces
            .retain(|iface| self.rules.iter().all(|rule| rule.should_include(iface)));
        Ok(data)
    }
}

/// @ai:intent Interface-level annotation map must be non-empty
pub struct AnnotationPresenceFilter;

impl FilterRule for AnnotationPresenceFilter {
    fn should_include(&self, iface: &Interface) -> bool {
        !iface.annotations.is_empty()
    }
}

/// @ai:intent Every method's first parameter is `ctx context.Context`
pub struct FirstParamContextFilter;

impl FilterRule for FirstParamContextFilter {
    fn should_include(&self, iface: &Interface) -> bool {
        iface.methods.iter().all(|method| {
            method
                .info
                .parameters
                .first()
                .map(|p| p.type_name == "context.Context" && p.name == "ctx")
                .unwrap_or(false)
        })
    }
}

/// @ai:intent Every method's last result is `err error`
pub struct LastResultErrorFilter;

impl FilterRule for LastResultErrorFilter {
    fn should_include(&self, iface: &Interface) -> bool {
        iface.methods.iter().all(|method| {
            method
                .info
                .results
                .last()
                .map(|r| r.type_name == "error" && r.name == "err")
                .unwrap_or(false)
        })
    }
}

/// @ai:intent Every parameter and result carries a non-empty name
pub struct NamedParametersFilter;

impl FilterRule for NamedParametersFilter {
    fn should_include(&self, iface: &Interface) -> bool {
        iface.methods.iter().all(|method| {
            method
                .info
                .parameters
                .iter()
                .chain(method.info.results.iter())
                .all(|v| !v.name.is_empty())
        })
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
                ..Default::default()
            })],
            annotations,
            ..Default::default()
        }
    }

    fn run_filter(interfaces: Vec<Interface>) -> Vec<Interface> {
        let data = Data {
            interfaces,
            ..Default::default()
        };
        StageFilter::new()
            .process(&CancelToken::new(), data)
            .unwrap()
            .interfaces
    }

    #[test]
    fn test_conforming_interface_is_retained() {
        let retained = run_filter(vec![conforming_interface()]);
        assert_eq!(retained.len(), 1);
    }

    #[test]
    fn test_missing_annotations_is_dropped() {
        let mut iface = conforming_interface();
        iface.annotations.clear();
        assert!(run_filter(vec![iface]).is_empty());
    }

    #[test]
    fn test_wrong_first_param_name_is_dropped_silently() {
        let mut iface = conforming_interface();
        iface.methods[0].info.parameters[0].name = "c".to_string();
        assert!(run_filter(vec![iface]).is_empty());
    }

    #[test]
    fn test_missing_context_param_is_dropped() {
        let mut iface = conforming_interface();
        iface.methods[0].info.parameters.clear();
        assert!(run_filter(vec![iface]).is_empty());
    }

    #[test]
    fn test_last_result_must_be_named_err() {
        let mut iface = conforming_interface();
        iface.methods[0].info.results[1] = variable("e", "error");
        assert!(run_filter(vec![iface]).is_empty());
    }

    #[test]
    fn test_unnamed_parameter_is_dropped() {
        let mut iface = conforming_interface();
        iface.methods[0].info.results[0].name = String::new();
        assert!(run_filter(vec![iface]).is_empty());
    }

    #[test]
    fn test_empty_input_is_a_valid_outcome() {
        assert!(run_filter(Vec::new()).is_empty());
    }
}
