//! @ai:module:intent High-level entry point composing the extraction pipeline
//! @ai:module:layer application
//! @ai:module:public_api Parser
//! @ai:module:depends_on annotation, model, pipeline
//! @ai:module:thread_safe true

use crate::annotation::AnnotationParser;
use crate::error::{Error, Result};
use crate::model::Package;
use crate::pipeline::extract::StageExtraction;
use crate::pipeline::filter::StageFilter;
use crate::pipeline::module::StageModule;
use crate::pipeline::serialize::{self, StageSerialization};
use crate::pipeline::types::StageTypeCollection;
use crate::pipeline::validate::StageValidation;
use crate::pipeline::{CancelToken, Data, Pipeline, Stage};
use std::path::Path;

/// @ai:intent Parse annotated service interfaces out of a source package
///
/// In the default (lenient) mode, interfaces that break the calling
/// convention are silently dropped. In strict mode the first broken
/// interface aborts the run with a `Validation` error.
///
/// # Example
///
/// ```no_run
/// use asti_parser::Parser;
///
/// let parser = Parser::new();
/// let package = parser.parse_package("./internal/service")?;
/// println!("{} interfaces", package.interfaces.len());
/// # Ok::<(), asti_parser::Error>(())
/// ```
pub struct Parser {
    prefix: String,
    strict: bool,
    pipeline: Pipeline,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// @ai:intent Create a lenient parser with the default annotation prefix
    pub fn new() -> Self {
        Self::with_prefix(crate::annotation::DEFAULT_PREFIX)
    }

    /// @ai:intent Create a lenient parser with a custom annotation prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let pipeline = build_pipeline(&prefix, false);
        Self {
            prefix,
            strict: false,
            pipeline,
        }
    }

    /// @ai:intent Toggle strict validation of the calling convention
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self.pipeline = build_pipeline(&self.prefix, strict);
        self
    }

    /// @ai:intent Reconfigure the annotation prefix, rebuilding the full pipeline
    /// @ai:post module resolution remains part of the rebuilt pipeline
    pub fn set_annotation_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
        self.pipeline = build_pipeline(&self.prefix, self.strict);
    }

    pub fn annotation_prefix(&self) -> &str {
        &self.prefix
    }

    /// @ai:intent Parse one package directory into its extraction result
    /// @ai:pre path exists and points at a directory
    /// @ai:effects fs:read
    pub fn parse_package(&self, path: impl AsRef<Path>) -> Result<Package> {
        self.parse_package_with(&CancelToken::new(), path)
    }

    /// @ai:intent Parse one package directory under a cancellation token
    /// @ai:effects fs:read
    pub fn parse_package_with(
        &self,
        cancel: &CancelToken,
        path: impl AsRef<Path>,
    ) -> Result<Package> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::PathNotFound(path.to_path_buf()));
        }
        let absolute_path = path.canonicalize()?;
        let data = Data {
            absolute_path,
            ..Default::default()
        };
        let result = self.pipeline.execute(cancel, data)?;
        Ok(result.package)
    }

    /// @ai:intent Parse one package directory straight to its JSON form
    /// @ai:effects fs:read
    pub fn parse_package_to_json(&self, path: impl AsRef<Path>) -> Result<String> {
        let package = self.parse_package(path)?;
        serialize::to_json(&package)
    }

    /// @ai:intent Serialize an extraction result to pretty-printed JSON
    pub fn to_json(&self, package: &Package) -> Result<String> {
        serialize::to_json(package)
    }

    /// @ai:intent Restore an extraction result from its JSON form
    pub fn from_json(&self, json: &str) -> Result<Package> {
        serialize::from_json(json)
    }
}

fn build_pipeline(prefix: &str, strict: bool) -> Pipeline {
    let convention: Box<dyn Stage> = if strict {
        Box::new(StageValidation::new())
    } else {
        Box::new(StageFilter::new())
    };
    Pipeline::new(vec![
        Box::new(StageModule::new()),
        Box::new(StageExtraction::new(AnnotationParser::new(prefix))),
        convention,
        Box::new(StageTypeCollection::new(AnnotationParser::new(prefix))),
        Box::new(StageSerialization),
    ])
}
