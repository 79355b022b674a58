use serde_json::Value;

use crate::error::{GenError, GenResult};
use crate::types::json_kind;

/// Session-control keywords accepted as untyped keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    SectionPrefix,
    ModuleName,
    BoolIsInteger,
    IncludeSource,
    IncludeHeader,
    GitRepository,
    DateTime,
    Version,
}

impl Directive {
    pub const ALL: [Directive; 8] = [
        Directive::SectionPrefix,
        Directive::ModuleName,
        Directive::BoolIsInteger,
        Directive::IncludeSource,
        Directive::IncludeHeader,
        Directive::GitRepository,
        Directive::DateTime,
        Directive::Version,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Directive::SectionPrefix => "Section_Prefix",
            Directive::ModuleName => "Module_Name",
            Directive::BoolIsInteger => "Bool_Is_Integer",
            Directive::IncludeSource => "Include_Source",
            Directive::IncludeHeader => "Include_Header",
            Directive::GitRepository => "Git_Repository",
            Directive::DateTime => "Date_Time",
            Directive::Version => "Version",
        }
    }

    pub fn from_keyword(name: &str) -> Option<Directive> {
        Self::ALL.into_iter().find(|d| d.keyword() == name)
    }

    pub(crate) fn expect_str(self, value: &Value) -> GenResult<&str> {
        value.as_str().ok_or_else(|| self.bad_shape("a string", value))
    }

    pub(crate) fn expect_bool(self, value: &Value) -> GenResult<bool> {
        value.as_bool().ok_or_else(|| self.bad_shape("a boolean", value))
    }

    pub(crate) fn expect_str_list(self, value: &Value) -> GenResult<Vec<String>> {
        let Some(items) = value.as_array() else {
            return Err(self.bad_shape("an array of strings", value));
        };
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.bad_shape("an array of strings", item))
            })
            .collect()
    }

    fn bad_shape(self, expected: &str, value: &Value) -> GenError {
        GenError::config(format!(
            "directive '{}' expects {expected}, got {}",
            self.keyword(),
            json_kind(value)
        ))
    }
}

/// Semantic version given as `[major, minor, patch, pre_release, build_metadata]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub pre_release: String,
    pub build_metadata: String,
}

impl Version {
    pub fn from_value(value: &Value) -> GenResult<Version> {
        let keyword = Directive::Version.keyword();
        let shape = || {
            GenError::config(format!(
                "directive '{keyword}' expects [major, minor, patch, pre_release, build_metadata], got {value}"
            ))
        };
        let Some([major, minor, patch, pre_release, build_metadata]) =
            value.as_array().map(Vec::as_slice)
        else {
            return Err(shape());
        };

        let component = |label: &str, v: &Value| -> GenResult<u8> {
            let Value::Number(n) = v else {
                return Err(shape());
            };
            let literal = n.to_string();
            let parsed = literal.parse::<i128>().map_err(|_| shape())?;
            u8::try_from(parsed).map_err(|_| {
                GenError::range(format!(
                    "directive '{keyword}': {label} {literal} must be in [0, 256)"
                ))
            })
        };
        let (Some(pre_release), Some(build_metadata)) = (pre_release.as_str(), build_metadata.as_str())
        else {
            return Err(shape());
        };

        Ok(Version {
            major: component("major", major)?,
            minor: component("minor", minor)?,
            patch: component("patch", patch)?,
            pre_release: pre_release.to_string(),
            build_metadata: build_metadata.to_string(),
        })
    }

    /// `(major << 16) | (minor << 8) | patch`.
    pub fn packed(&self) -> u32 {
        (u32::from(self.major) << 16) | (u32::from(self.minor) << 8) | u32::from(self.patch)
    }

    pub fn packed_literal(&self) -> String {
        format!("0x{:06X}", self.packed())
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }
        if !self.pre_release.is_empty() {
            write!(f, "-{}", self.pre_release)?;
        }
        if !self.build_metadata.is_empty() {
            write!(f, "+{}", self.build_metadata)?;
        }
        Ok(())
    }
}
