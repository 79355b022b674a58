use crate::descriptor::{Descriptor, Size};
use crate::error::{GenError, GenResult};
use crate::naming::NameFormatter;
use crate::snippet::{Arg, Snippet, Tag};
use crate::types::{FieldType, FieldValue};

/// Code produced for one field, one snippet per output section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub macros: Snippet,
    pub decls: Snippet,
    pub vars: Snippet,
    pub funcs: Snippet,
}

impl Fragment {
    pub fn separator() -> Fragment {
        let mut nl = Snippet::new();
        nl.text("\n");
        Fragment {
            macros: nl.clone(),
            decls: nl.clone(),
            vars: nl.clone(),
            funcs: nl,
        }
    }
}

const SCALAR_VAR: &str = "static ${ctype} ${prefix}${var} = ${value};\n";
const SCALAR_GET: &str = "${ctype} ${prefix}${func}(void)";
const SCALAR_GET_BODY: &str = "    ${ctype} val;

    CRITICAL_BLOCK(
        val = ${prefix}${var};
    );

    return val;
";
const SCALAR_SET: &str = "void ${prefix}${func}(${ctype} val)";
const SCALAR_SET_BODY: &str = "    CRITICAL_BLOCK(
        ${prefix}${var} = val;
    );
";

const STRING_VAR: &str = "static char ${prefix}${var}[${size}] = \"${value}\";\n";
const STRING_LEN: &str = "uint16_t ${prefix}${func}(void)";
const STRING_LEN_BODY: &str = "    return sizeof(${prefix}${var});
";
const STRING_PTR: &str = "const char *${prefix}${func}(void)";
const STRING_PTR_BODY: &str = "    return &${prefix}${var}[0];
";
const STRING_GET: &str = "${bool} ${prefix}${func}(char *buff_ptr, uint16_t len)";
const STRING_GET_BODY: &str = "    ${bool} success = ${true};
    uint16_t i;
    const char *ptr = &${prefix}${var}[0];

    if (len == 0) {
        return ${false};
    }

    CRITICAL_BLOCK(
        for (i = 0; i < sizeof(${prefix}${var}); i++) {
            if (i >= len) {
                success = ${false};
                break;
            }
            buff_ptr[i] = ptr[i];
        }
    );

    buff_ptr[len - 1] = 0;
    return success;
";
const STRING_SET: &str = "${bool} ${prefix}${func}(const char *buff_ptr, uint16_t len)";
const STRING_SET_BODY: &str = "    ${bool} success = ${true};
    uint16_t i;
    char *ptr = &${prefix}${var}[0];

    CRITICAL_BLOCK(
        for (i = 0; i < len; i++) {
            if (i >= sizeof(${prefix}${var})) {
                success = ${false};
                break;
            }
            ptr[i] = buff_ptr[i];
        }
        if (i >= sizeof(${prefix}${var})) {
            i = sizeof(${prefix}${var}) - 1;
        }
        ptr[i] = 0;
    );

    return success;
";

const MACRO_DEFINE: &str = "#define ${prefix}${name}${params} ${value}\n";

/// Emits fragments for the fields of one document.
pub struct Emitter<'a> {
    naming: &'a dyn NameFormatter,
    document: usize,
}

impl<'a> Emitter<'a> {
    pub fn new(naming: &'a dyn NameFormatter, document: usize) -> Self {
        Emitter { naming, document }
    }

    pub fn emit(&self, key: &str, desc: &Descriptor, value: &FieldValue) -> GenResult<Fragment> {
        match (desc.ty, value) {
            (FieldType::String, FieldValue::Text(s)) => Ok(self.string(desc, s)),
            (FieldType::Macro, FieldValue::Text(s)) => Ok(self.macro_define(desc, s)),
            (FieldType::Bool, FieldValue::Bool(b)) => {
                let literal = if *b { Tag::BoolTrue } else { Tag::BoolFalse };
                Ok(self.scalar(desc, Arg::Tag(Tag::BoolType), Arg::Tag(literal)))
            }
            (ty, FieldValue::Integer(literal) | FieldValue::Real(literal)) => {
                match ty.c_numeric_type() {
                    Some(ctype) => Ok(self.scalar(desc, Arg::Text(ctype), Arg::Text(literal))),
                    None => Err(mismatch(key, ty)),
                }
            }
            (ty, _) => Err(mismatch(key, ty)),
        }
    }

    /// C identifiers [`Emitter::emit`] defines for a field, before prefixing.
    pub fn symbols(&self, desc: &Descriptor) -> Vec<String> {
        let verbs: &[&str] = match (desc.ty, desc.access.is_writable()) {
            (FieldType::Macro, _) => return vec![self.naming.macro_name(&desc.name)],
            (FieldType::String, false) => &["Len", "Ptr"],
            (FieldType::String, true) => &["Len", "Ptr", "Get", "Set"],
            (_, false) => &["Get"],
            (_, true) => &["Get", "Set"],
        };
        let mut out = vec![self.naming.global_variable(&desc.name)];
        out.extend(verbs.iter().map(|verb| self.naming.accessor(verb, &desc.name)));
        out
    }

    fn accessor(&self, out: &mut Fragment, proto: &str, body: &str, args: &[(&str, Arg<'_>)]) {
        let decl = Snippet::expand(&format!("{proto};\n"), self.document, args);
        let def = Snippet::expand(&format!("\n{proto} {{\n{body}}}\n"), self.document, args);
        out.decls.append(&decl);
        out.funcs.append(&def);
    }

    fn scalar(&self, desc: &Descriptor, ctype: Arg<'_>, value: Arg<'_>) -> Fragment {
        let var = self.naming.global_variable(&desc.name);
        let mut out = Fragment {
            vars: Snippet::expand(
                SCALAR_VAR,
                self.document,
                &[("ctype", ctype), ("var", Arg::Text(&var)), ("value", value)],
            ),
            ..Fragment::default()
        };

        let get = self.naming.accessor("Get", &desc.name);
        let args = [("ctype", ctype), ("var", Arg::Text(&var)), ("func", Arg::Text(&get))];
        self.accessor(&mut out, SCALAR_GET, SCALAR_GET_BODY, &args);

        if desc.access.is_writable() {
            let set = self.naming.accessor("Set", &desc.name);
            let args = [("ctype", ctype), ("var", Arg::Text(&var)), ("func", Arg::Text(&set))];
            self.accessor(&mut out, SCALAR_SET, SCALAR_SET_BODY, &args);
        }
        out
    }

    fn string(&self, desc: &Descriptor, value: &str) -> Fragment {
        let var = self.naming.global_variable(&desc.name);
        let size = match desc.size {
            Some(Size::Fixed(n)) => n.to_string(),
            Some(Size::Unsized) | None => String::new(),
        };
        let escaped = c_string_body(value);
        let mut out = Fragment {
            vars: Snippet::expand(
                STRING_VAR,
                self.document,
                &[
                    ("var", Arg::Text(&var)),
                    ("size", Arg::Text(&size)),
                    ("value", Arg::Text(&escaped)),
                ],
            ),
            ..Fragment::default()
        };

        let mut accessors = vec![("Len", STRING_LEN, STRING_LEN_BODY), ("Ptr", STRING_PTR, STRING_PTR_BODY)];
        if desc.access.is_writable() {
            accessors.push(("Get", STRING_GET, STRING_GET_BODY));
            accessors.push(("Set", STRING_SET, STRING_SET_BODY));
        }
        for (verb, proto, body) in accessors {
            let func = self.naming.accessor(verb, &desc.name);
            let args = [
                ("var", Arg::Text(&var)),
                ("func", Arg::Text(&func)),
                ("bool", Arg::Tag(Tag::BoolType)),
                ("true", Arg::Tag(Tag::BoolTrue)),
                ("false", Arg::Tag(Tag::BoolFalse)),
            ];
            self.accessor(&mut out, proto, body, &args);
        }
        out
    }

    fn macro_define(&self, desc: &Descriptor, value: &str) -> Fragment {
        let name = self.naming.macro_name(&desc.name);
        let params = desc.params.as_deref().unwrap_or("");
        Fragment {
            macros: Snippet::expand(
                MACRO_DEFINE,
                self.document,
                &[
                    ("name", Arg::Text(&name)),
                    ("params", Arg::Text(params)),
                    ("value", Arg::Text(value)),
                ],
            ),
            ..Fragment::default()
        }
    }
}

fn mismatch(key: &str, ty: FieldType) -> GenError {
    GenError::type_mismatch(format!("'{key}': value does not fit type {}", ty.name()))
}

/// Body of a C string literal holding exactly the bytes of `s`.
fn c_string_body(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}
