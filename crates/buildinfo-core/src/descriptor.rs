//! Field-key grammar:
//!
//! ```text
//! [ type [ "[" size? "]" ] ":" ] [ qualifier ":" ] name [ "(" params ")" ]
//! ```
//!
//! Whitespace around every token is ignored. A key without a type is a
//! session directive (`config`), a key without a qualifier is read-only.

use crate::error::{GenError, GenResult};
use crate::types::FieldType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// `[]`: storage sized by the initial value.
    Unsized,
    /// `[N]`: fixed storage of N bytes.
    Fixed(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Read,
    Write,
}

impl Access {
    fn from_letters(letters: &str) -> Option<Self> {
        match letters {
            "" | "r" => Some(Access::Read),
            "w" | "rw" => Some(Access::Write),
            _ => None,
        }
    }

    pub fn is_writable(self) -> bool {
        self == Access::Write
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub ty: FieldType,
    pub size: Option<Size>,
    pub access: Access,
    pub name: String,
    /// Raw macro parameter list, parentheses included.
    pub params: Option<String>,
}

impl Descriptor {
    pub fn parse(key: &str) -> GenResult<Descriptor> {
        let raw = RawKey::scan(key)?;

        let ty = if raw.ty.is_empty() {
            FieldType::Config
        } else {
            FieldType::from_name(raw.ty).ok_or_else(|| {
                GenError::type_mismatch(format!("'{key}': unknown field type '{}'", raw.ty))
            })?
        };

        let size = match raw.size {
            None => None,
            Some("") => Some(Size::Unsized),
            Some(digits) if !digits.bytes().all(|b| b.is_ascii_digit()) => {
                return Err(GenError::syntax(format!(
                    "'{key}': size '{digits}' is not a number"
                )));
            }
            Some(digits) => {
                let n = digits.parse::<usize>().map_err(|_| {
                    GenError::range(format!(
                        "'{key}': size {digits} exceeds the largest supported capacity ({})",
                        usize::MAX
                    ))
                })?;
                Some(Size::Fixed(n))
            }
        };

        let access = Access::from_letters(raw.qualifier).ok_or_else(|| {
            GenError::config(format!(
                "'{key}': invalid qualifier '{}' (expected 'r' or 'w')",
                raw.qualifier
            ))
        })?;

        let desc = Descriptor {
            ty,
            size,
            access,
            name: raw.name.to_string(),
            params: raw.params.map(str::to_string),
        };
        desc.check_annotations(key)?;
        Ok(desc)
    }

    fn check_annotations(&self, key: &str) -> GenResult<()> {
        if self.params.is_some() && self.ty != FieldType::Macro {
            return Err(GenError::config(format!(
                "'{key}': only macros take a parameter list"
            )));
        }
        if self.size.is_some() {
            match self.ty {
                FieldType::String => {}
                FieldType::Macro => {
                    return Err(GenError::config(format!(
                        "'{key}': a macro cannot have a size"
                    )));
                }
                FieldType::Config => {
                    return Err(GenError::config(format!(
                        "'{key}': a directive cannot have a size"
                    )));
                }
                other => {
                    return Err(GenError::config(format!(
                        "'{key}': {} fields cannot have a size (arrays are not supported)",
                        other.name()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Token slices of one key, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawKey<'a> {
    ty: &'a str,
    size: Option<&'a str>,
    qualifier: &'a str,
    name: &'a str,
    params: Option<&'a str>,
}

impl<'a> RawKey<'a> {
    fn scan(key: &'a str) -> GenResult<RawKey<'a>> {
        let bad = || GenError::syntax(format!("'{key}' does not match 'type[size]:qualifier:name(params)'"));

        let sections: Vec<&str> = key.split(':').collect();
        let (type_section, qualifier_section, name_section) = match sections.as_slice() {
            [name] => (None, None, *name),
            [ty, name] => (Some(*ty), None, *name),
            [ty, qualifier, name] => (Some(*ty), Some(*qualifier), *name),
            _ => return Err(bad()),
        };

        let (ty, size) = match type_section {
            None => ("", None),
            Some(section) => {
                let mut cur = Cursor::new(section);
                cur.skip_ws();
                let ty = cur.word();
                cur.skip_ws();
                let size = if cur.eat('[') {
                    cur.skip_ws();
                    let size = cur.word();
                    cur.skip_ws();
                    if !cur.eat(']') {
                        return Err(bad());
                    }
                    cur.skip_ws();
                    Some(size)
                } else {
                    None
                };
                if !cur.is_done() {
                    return Err(bad());
                }
                (ty, size)
            }
        };

        let qualifier = match qualifier_section {
            None => "",
            Some(section) => {
                let mut cur = Cursor::new(section);
                cur.skip_ws();
                let qualifier = cur.word();
                cur.skip_ws();
                if !cur.is_done() {
                    return Err(bad());
                }
                qualifier
            }
        };

        let mut cur = Cursor::new(name_section);
        cur.skip_ws();
        let name = cur.word();
        if name.is_empty() {
            return Err(bad());
        }
        cur.skip_ws();
        let params = if cur.peek() == Some('(') {
            Some(cur.param_list().ok_or_else(bad)?)
        } else {
            None
        };
        cur.skip_ws();
        if !cur.is_done() {
            return Err(bad());
        }

        Ok(RawKey {
            ty,
            size,
            qualifier,
            name,
            params,
        })
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn is_done(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        let len = self
            .rest()
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map(|(i, _)| i)
            .unwrap_or_else(|| self.rest().len());
        self.pos += len;
        &self.src[start..self.pos]
    }

    fn skip_ws(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn word(&mut self) -> &'a str {
        self.take_while(is_word_char)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// `( ... )` holding only word characters, whitespace and commas.
    fn param_list(&mut self) -> Option<&'a str> {
        let start = self.pos;
        if !self.eat('(') {
            return None;
        }
        self.take_while(|c| is_word_char(c) || c.is_whitespace() || c == ',');
        if !self.eat(')') {
            self.pos = start;
            return None;
        }
        Some(&self.src[start..self.pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntWidth;

    fn scan(key: &str) -> RawKey<'_> {
        RawKey::scan(key).expect("key must scan")
    }

    #[test]
    fn scans_every_section() {
        let raw = scan("type[size]:qualif:name(param1,param2)");
        assert_eq!(raw.ty, "type");
        assert_eq!(raw.size, Some("size"));
        assert_eq!(raw.qualifier, "qualif");
        assert_eq!(raw.name, "name");
        assert_eq!(raw.params, Some("(param1,param2)"));
    }

    #[test]
    fn two_sections_are_type_and_name() {
        let raw = scan("type:name");
        assert_eq!(raw.ty, "type");
        assert_eq!(raw.qualifier, "");
        assert_eq!(raw.name, "name");
    }

    #[test]
    fn ignores_whitespace_around_tokens() {
        let raw = scan(" type [ size ] : qualif : name( param1 , param2 ) ");
        assert_eq!(raw.ty, "type");
        assert_eq!(raw.size, Some("size"));
        assert_eq!(raw.qualifier, "qualif");
        assert_eq!(raw.name, "name");
        assert_eq!(raw.params, Some("( param1 , param2 )"));
    }

    #[test]
    fn empty_brackets_and_empty_params() {
        let raw = scan("type [] :qualif: name() ");
        assert_eq!(raw.size, Some(""));
        assert_eq!(raw.params, Some("()"));
    }

    #[test]
    fn rejects_malformed_keys() {
        for key in [
            "",
            "   ",
            "a:b:c:d",
            "int8:",
            "int8[4:Name",
            "int8 x:Name",
            "Name(a",
            "Name(a)(b)",
            "Name extra",
            "macro:Name(a.b)",
        ] {
            let err = RawKey::scan(key).expect_err(key);
            assert_eq!(err.kind, crate::error::ErrorKind::Syntax, "{key}");
            assert!(err.message.contains(key), "{}", err.message);
        }
    }

    #[test]
    fn defaults_to_config_and_read() {
        let d = Descriptor::parse("Section_Prefix").expect("parse");
        assert_eq!(d.ty, FieldType::Config);
        assert_eq!(d.access, Access::Read);
        assert_eq!(d.size, None);
    }

    #[test]
    fn resolves_type_size_and_access() {
        let d = Descriptor::parse("string[16]:w:Name").expect("parse");
        assert_eq!(d.ty, FieldType::String);
        assert_eq!(d.size, Some(Size::Fixed(16)));
        assert!(d.access.is_writable());

        let d = Descriptor::parse("uint16 : : Count").expect("parse");
        assert_eq!(d.ty, FieldType::UnsignedInt(IntWidth::W16));
        assert_eq!(d.access, Access::Read);
    }

    #[test]
    fn non_numeric_size_is_a_syntax_error() {
        let err = Descriptor::parse("string[abc]:Name").expect_err("size");
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn oversized_size_is_a_range_error() {
        let err = Descriptor::parse("string[99999999999999999999999]:S").expect_err("size");
        assert_eq!(err.kind, crate::error::ErrorKind::Range);
        assert!(err.message.contains("99999999999999999999999"), "{err}");
        assert!(err.message.contains("capacity"), "{err}");
    }
}
