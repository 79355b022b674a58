//! Naming conventions for generated symbols and files.
//!
//! Names are written in `Camel_Case` in the input (`Project_Name`,
//! `Build_Info`) and each formatter maps them to the surface forms it needs.

pub trait NameFormatter {
    fn local_variable(&self, name: &str) -> String;
    fn global_variable(&self, name: &str) -> String;
    fn function(&self, name: &str) -> String;
    fn macro_name(&self, name: &str) -> String;
    fn prefix(&self, name: &str) -> String;
    fn source_filename(&self, name: &str) -> String;
    fn header_filename(&self, name: &str) -> String;
    fn header_guard(&self, name: &str) -> String;

    /// Accessor name such as `GetProjectName` for verb `Get`.
    fn accessor(&self, verb: &str, name: &str) -> String {
        self.function(&format!("{verb}_{name}"))
    }
}

/// | Form            | `Project_Name`  |
/// |-----------------|-----------------|
/// | local variable  | `project_name`  |
/// | global variable | `Project_Name`  |
/// | function        | `ProjectName`   |
/// | macro           | `PROJECT_NAME`  |
#[derive(Debug, Clone, Copy, Default)]
pub struct PascalFunctions;

impl NameFormatter for PascalFunctions {
    fn local_variable(&self, name: &str) -> String {
        name.to_lowercase()
    }

    fn global_variable(&self, name: &str) -> String {
        name.to_string()
    }

    fn function(&self, name: &str) -> String {
        name.replace('_', "")
    }

    fn macro_name(&self, name: &str) -> String {
        name.to_uppercase()
    }

    fn prefix(&self, name: &str) -> String {
        module_prefix(name)
    }

    fn source_filename(&self, name: &str) -> String {
        format!("{}.c", name.to_lowercase())
    }

    fn header_filename(&self, name: &str) -> String {
        format!("{}.h", name.to_lowercase())
    }

    fn header_guard(&self, name: &str) -> String {
        module_guard(name)
    }
}

/// | Form            | `Project_Name`  |
/// |-----------------|-----------------|
/// | local variable  | `projectName`   |
/// | global variable | `ProjectName`   |
/// | function        | `project_name`  |
/// | macro           | `PROJECT_NAME`  |
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeFunctions;

impl NameFormatter for SnakeFunctions {
    fn local_variable(&self, name: &str) -> String {
        let mut chars = name.chars();
        let mut out: String = match chars.next() {
            Some(first) => first.to_lowercase().collect(),
            None => String::new(),
        };
        out.extend(chars.filter(|c| *c != '_'));
        out
    }

    fn global_variable(&self, name: &str) -> String {
        name.replace('_', "")
    }

    fn function(&self, name: &str) -> String {
        name.to_lowercase()
    }

    fn macro_name(&self, name: &str) -> String {
        name.to_uppercase()
    }

    fn prefix(&self, name: &str) -> String {
        module_prefix(name)
    }

    fn source_filename(&self, name: &str) -> String {
        format!("{}.c", name.to_lowercase())
    }

    fn header_filename(&self, name: &str) -> String {
        format!("{}.h", name.to_lowercase())
    }

    fn header_guard(&self, name: &str) -> String {
        module_guard(name)
    }
}

/// Upper-cased `name` with every character that cannot appear in a C
/// identifier replaced by `_`.
fn c_identifier_upper(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

fn module_prefix(name: &str) -> String {
    format!("{}_", c_identifier_upper(name))
}

fn module_guard(name: &str) -> String {
    format!("{}_H_", c_identifier_upper(name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingStyle {
    #[default]
    Pascal,
    Snake,
}

impl NamingStyle {
    pub fn formatter(self) -> Box<dyn NameFormatter> {
        match self {
            NamingStyle::Pascal => Box::new(PascalFunctions),
            NamingStyle::Snake => Box::new(SnakeFunctions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_functions_forms() {
        let f = PascalFunctions;
        assert_eq!(f.local_variable("Project_Name"), "project_name");
        assert_eq!(f.global_variable("Project_Name"), "Project_Name");
        assert_eq!(f.function("Project_Name"), "ProjectName");
        assert_eq!(f.macro_name("Project_Name"), "PROJECT_NAME");
        assert_eq!(f.accessor("Get", "Project_Name"), "GetProjectName");
        assert_eq!(f.prefix("Build_Info"), "BUILD_INFO_");
        assert_eq!(f.source_filename("Build_Info"), "build_info.c");
        assert_eq!(f.header_filename("Build_Info"), "build_info.h");
        assert_eq!(f.header_guard("Build_Info"), "BUILD_INFO_H_");
    }

    #[test]
    fn snake_functions_forms() {
        let f = SnakeFunctions;
        assert_eq!(f.local_variable("Project_Name"), "projectName");
        assert_eq!(f.global_variable("Project_Name"), "ProjectName");
        assert_eq!(f.function("Project_Name"), "project_name");
        assert_eq!(f.macro_name("Project_Name"), "PROJECT_NAME");
        assert_eq!(f.accessor("Get", "Project_Name"), "get_project_name");
        assert_eq!(f.prefix("Build_Info"), "BUILD_INFO_");
        assert_eq!(f.source_filename("Build_Info"), "build_info.c");
        assert_eq!(f.header_filename("Build_Info"), "build_info.h");
        assert_eq!(f.header_guard("Build_Info"), "BUILD_INFO_H_");
    }

    #[test]
    fn prefix_and_guard_are_c_identifiers() {
        for f in [NamingStyle::Pascal.formatter(), NamingStyle::Snake.formatter()] {
            assert_eq!(f.header_guard("my-info.v2"), "MY_INFO_V2_H_");
            assert_eq!(f.prefix("my-info.v2"), "MY_INFO_V2_");
            assert_eq!(f.header_filename("my-info.v2"), "my-info.v2.h");
        }
    }
}
