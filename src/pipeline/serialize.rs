//! @ai:module:intent Assemble the final package record and enforce ID integrity
//! @ai:module:layer application
//! @ai:module:public_api StageSerialization, to_json, from_json
//! @ai:module:depends_on model, pipeline
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::model::Package;
use crate::pipeline::{CancelToken, Data, Stage};
use std::collections::HashSet;

/// @ai:intent Move interfaces and resolved types into the package and validate IDs
pub struct StageSerialization;

impl Stage for StageSerialization {
    fn process(&self, cancel: &CancelToken, mut data: Data) -> Result<Data> {
        cancel.check()?;
        data.package.interfaces = std::mem::take(&mut data.interfaces);
        data.package.types = std::mem::take(&mut data.types);
        validate_package(&data.package)?;
        Ok(data)
    }
}

/// @ai:intent Reject packages with missing or colliding identifiers
/// @ai:post on Ok, every interface and method ID is non-empty and unique
pub fn validate_package(package: &Package) -> Result<()> {
    if package.package_path.is_empty() {
        return Err(Error::EmptyPackagePath);
    }

    let mut interface_ids: HashSet<&str> = HashSet::new();
    for interface in &package.interfaces {
        if interface.id.is_empty() {
            return Err(Error::EmptyInterfaceId(interface.name.clone()));
        }
        if !interface_ids.insert(&interface.id) {
            return Err(Error::DuplicateInterfaceId(interface.id.clone()));
        }

        let mut method_ids: HashSet<&str> = HashSet::new();
        for method in &interface.methods {
            if method.id.is_empty() {
                return Err(Error::EmptyMethodId {
                    interface: interface.name.clone(),
                    method: method.info.name.clone(),
                });
            }
            if !method_ids.insert(&method.id) {
                return Err(Error::DuplicateMethodId {
                    interface: interface.name.clone(),
                    method: method.id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// @ai:intent Serialize a package to pretty-printed JSON
/// @ai:effects pure
pub fn to_json(package: &Package) -> Result<String> {
    Ok(serde_json::to_string_pretty(package)?)
}

/// @ai:intent Deserialize a package from its JSON form
/// @ai:effects pure
pub fn from_json(json: &str) -> Result<Package> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Interface, Method, MethodInfo, TypeInfo, TypeKind, Variable};
    use pretty_assertions::assert_eq;

    fn method(name: &str) -> Method {
        Method::new(MethodInfo {
            name: name.to_string(),
            parameters: vec![Variable {
                name: "ctx".to_string(),
                type_name: "context.Context".to_string(),
                ..Default::default()
            }],
            results: vec![Variable {
                name: "err".to_string(),
                type_name: "error".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        })
    }

    fn sample_package() -> Package {
        Package {
            module_name: "example.com/app".to_string(),
            package_path: "internal/svc".to_string(),
            interfaces: vec![Interface {
                name: "UserService".to_string(),
                id: "svc.UserService".to_string(),
                package: "svc".to_string(),
                import: "example.com/app/internal/svc".to_string(),
                methods: vec![method("CreateUser"), method("DeleteUser")],
                ..Default::default()
            }],
            types: [(
                "svc.User".to_string(),
                TypeInfo {
                    name: "User".to_string(),
                    package: "svc".to_string(),
                    kind: TypeKind::Struct,
                    ..Default::default()
                },
            )]
            .into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_stage_moves_context_into_package() {
        let sample = sample_package();
        let data = Data {
            package: Package {
                module_name: sample.module_name.clone(),
                package_path: sample.package_path.clone(),
                ..Default::default()
            },
            interfaces: sample.interfaces.clone(),
            types: sample.types.clone(),
            ..Default::default()
        };

        let result = StageSerialization
            .process(&CancelToken::new(), data)
            .unwrap();
        assert_eq!(result.package, sample);
        assert!(result.interfaces.is_empty());
        assert!(result.types.is_empty());
    }

    #[test]
    fn test_empty_package_path_is_rejected() {
        let mut package = sample_package();
        package.package_path.clear();
        let err = validate_package(&package).unwrap_err();
        assert!(matches!(err, Error::EmptyPackagePath));
    }

    #[test]
    fn test_duplicate_interface_ids_are_rejected() {
        let mut package = sample_package();
        let copy = package.interfaces[0].clone();
        package.interfaces.push(copy);
        let err = validate_package(&package).unwrap_err();
        assert!(matches!(err, Error::DuplicateInterfaceId(id) if id == "svc.UserService"));
    }

    #[test]
    fn test_duplicate_method_ids_are_rejected() {
        let mut package = sample_package();
        let copy = package.interfaces[0].methods[0].clone();
        package.interfaces[0].methods.push(copy);
        let err = validate_package(&package).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateMethodId { interface, method }
                if interface == "UserService" && method == "CreateUser"
        ));
    }

    #[test]
    fn test_empty_interface_id_is_rejected() {
        let mut package = sample_package();
        package.interfaces[0].id.clear();
        let err = validate_package(&package).unwrap_err();
        assert!(matches!(err, Error::EmptyInterfaceId(name) if name == "UserService"));
    }

    #[test]
    fn test_json_round_trip_is_lossless() {
        let package = sample_package();
        let json = to_json(&package).unwrap();
        assert!(json.contains("\"moduleName\": \"example.com/app\""));
        assert!(json.contains("\"packagePath\": \"internal/svc\""));
        let restored = from_json(&json).unwrap();
        assert_eq!(restored, package);
    }
}
