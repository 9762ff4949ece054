//! @ai:module:intent Format extraction results for different formats (JSON, text)
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_package
//! @ai:module:depends_on model
//! @ai:module:stateless true

use crate::model::{Interface, Package, Variable};
use colored::Colorize;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format an extraction result as a string
/// @ai:effects pure
pub fn format_package(package: &Package, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(package).unwrap_or_default(),
        OutputFormat::JsonPretty => {
            serde_json::to_string_pretty(package).unwrap_or_default()
        }
        OutputFormat::Text => format_package_text(package),
    }
}

/// @ai:intent Format an extraction result as human-readable text
/// @ai:effects pure
fn format_package_text(package: &Package) -> String {
    let mut output = String::new();

    let heading = if package.package_path.is_empty() || package.package_path == "." {
        package.module_name.clone()
    } else if package.module_name.is_empty() {
        package.package_path.clone()
    } else {
        format!("{}/{}", package.module_name, package.package_path)
    };
    output.push_str(&format!("{}\n", heading.bold()));

    for (key, value) in &package.annotations {
        output.push_str(&format!("  {} {}={}\n", "@".dimmed(), key, value));
    }

    for interface in &package.interfaces {
        output.push_str(&format_interface_text(interface));
    }

    if !package.types.is_empty() {
        output.push_str(&format!("\n  Types ({}):\n", package.types.len()));
        for (id, info) in &package.types {
            output.push_str(&format!(
                "    {} {}\n",
                id,
                format!("[{:?}]", info.kind).to_lowercase().dimmed()
            ));
        }
    }

    output.push('\n');
    if package.interfaces.is_empty() {
        output.push_str(&format!("{} No annotated interfaces found\n", "OK".yellow()));
    } else {
        output.push_str(&format!(
            "{} {} interfaces, {} types\n",
            "OK".green().bold(),
            package.interfaces.len(),
            package.types.len()
        ));
    }

    output
}

fn format_interface_text(interface: &Interface) -> String {
    let mut output = String::new();

    let location = format!(
        "{}:{}",
        interface.position.file, interface.position.line
    );
    output.push_str(&format!(
        "\n  {} {}\n",
        interface.name.cyan().bold(),
        location.dimmed()
    ));

    for (key, value) in &interface.annotations {
        output.push_str(&format!("    {} {}={}\n", "@".dimmed(), key, value));
    }

    for method in &interface.methods {
        output.push_str(&format!(
            "    {}({}) ({})\n",
            method.info.name,
            format_variables(&method.info.parameters),
            format_variables(&method.info.results)
        ));
    }

    output
}

fn format_variables(variables: &[Variable]) -> String {
    variables
        .iter()
        .map(|v| {
            let mut decorated = String::new();
            if v.variadic {
                decorated.push_str("...");
            }
            if v.slice {
                decorated.push_str("[]");
            }
            if v.pointer {
                decorated.push('*');
            }
            decorated.push_str(&v.type_name);
            format!("{} {}", v.name, decorated)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
