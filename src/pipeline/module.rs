//! @ai:module:intent Resolve the module identifier by walking upward to go.mod
//! @ai:module:layer application
//! @ai:module:public_api StageModule, find_module_root, parse_go_mod
//! @ai:module:depends_on pipeline, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::pipeline::{CancelToken, Data, Stage};
use std::path::{Path, PathBuf};

/// @ai:intent Rewrites the package path relative to the discovered module root
///
/// Module discovery failure is recoverable: the pipeline continues with the
/// absolute path and an empty module name, degrading import attribution.
pub struct StageModule;

impl StageModule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StageModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for StageModule {
    fn process(&self, _cancel: &CancelToken, mut data: Data) -> Result<Data> {
        match find_module_info(&data.absolute_path) {
            Ok((root, module_name)) => {
                let relative = data
                    .absolute_path
                    .strip_prefix(&root)
                    .map(relative_path_string)
                    .unwrap_or_else(|_| data.absolute_path.display().to_string());
                data.package.module_name = module_name;
                data.package.package_path = relative;
            }
            Err(err) => {
                tracing::warn!("failed to find module info: {err}");
                data.package.package_path = data.absolute_path.display().to_string();
            }
        }
        Ok(data)
    }
}

fn relative_path_string(relative: &Path) -> String {
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

fn find_module_info(package_path: &Path) -> Result<(PathBuf, String)> {
    let root = find_module_root(package_path)?;
    let module_name = parse_go_mod(&root.join("go.mod"))?;
    Ok((root, module_name))
}

/// @ai:intent Walk upward from a directory until a go.mod file is found
/// @ai:effects fs:read
pub fn find_module_root(package_path: &Path) -> Result<PathBuf> {
    let mut current = package_path.to_path_buf();
    loop {
        if current.join("go.mod").is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(Error::ModuleNotFound(package_path.to_path_buf()));
        }
    }
}

/// @ai:intent Extract the module identifier from a go.mod file
/// @ai:post a trailing line comment is stripped from the identifier
/// @ai:effects fs:read
pub fn parse_go_mod(go_mod_path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(go_mod_path).map_err(|e| Error::FileRead {
        path: go_mod_path.to_path_buf(),
        source: e,
    })?;

    for line in content.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("module ") {
            let mut module_name = rest.trim();
            if let Some(comment) = module_name.find("//") {
                module_name = module_name[..comment].trim();
            }
            return Ok(module_name.to_string());
        }
    }

    Err(Error::ModuleNotFound(go_mod_path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Package;
    use std::fs;
    use tempfile::TempDir;

    fn run_stage(package_dir: &Path) -> Data {
        let data = Data {
            package: Package {
                package_path: package_dir.display().to_string(),
                ..Default::default()
            },
            absolute_path: package_dir.to_path_buf(),
            ..Default::default()
        };
        StageModule::new()
            .process(&CancelToken::new(), data)
            .unwrap()
    }

    #[test]
    fn test_module_resolution_from_nested_package() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("go.mod"),
            "module github.com/test/module\n\ngo 1.24\n",
        )
        .unwrap();
        let package_dir = dir.path().join("pkg").join("service");
        fs::create_dir_all(&package_dir).unwrap();

        let result = run_stage(&package_dir);
        assert_eq!(result.package.module_name, "github.com/test/module");
        assert_eq!(result.package.package_path, "pkg/service");
    }

    #[test]
    fn test_module_root_package_path_is_dot() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/demo\n").unwrap();

        let result = run_stage(dir.path());
        assert_eq!(result.package.module_name, "example.com/demo");
        assert_eq!(result.package.package_path, ".");
    }

    #[test]
    fn test_missing_module_degrades_to_absolute_path() {
        let dir = TempDir::new().unwrap();
        let result = run_stage(dir.path());
        assert_eq!(result.package.module_name, "");
        assert_eq!(
            result.package.package_path,
            dir.path().display().to_string()
        );
    }

    #[test]
    fn test_parse_go_mod_strips_comment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("go.mod");
        fs::write(&path, "module example.com/demo // service module\n").unwrap();
        assert_eq!(parse_go_mod(&path).unwrap(), "example.com/demo");
    }
}
