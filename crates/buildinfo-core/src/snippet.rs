//! Generated code is captured as text interleaved with symbolic tags. Tags
//! stand for values that are only known once the whole session has been
//! seen (prefix, file name, bool lowering) and are resolved in one pass at
//! render time. User-supplied text is stored as plain text pieces and is
//! never scanned for tags.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Naming prefix of the document with this index.
    Prefix(usize),
    HeaderGuard,
    HeaderFile,
    BoolType,
    BoolTrue,
    BoolFalse,
    /// `#include <stdbool.h>` line, empty when bools are lowered to integers.
    BoolInclude,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Tag(Tag),
}

/// Template argument: literal text or a deferred tag.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Text(&'a str),
    Tag(Tag),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippet {
    pieces: Vec<Piece>,
}

impl Snippet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, s: &str) -> &mut Self {
        if s.is_empty() {
            return self;
        }
        match self.pieces.last_mut() {
            Some(Piece::Text(last)) => last.push_str(s),
            _ => self.pieces.push(Piece::Text(s.to_string())),
        }
        self
    }

    pub fn tag(&mut self, tag: Tag) -> &mut Self {
        self.pieces.push(Piece::Tag(tag));
        self
    }

    pub fn arg(&mut self, arg: Arg<'_>) -> &mut Self {
        match arg {
            Arg::Text(s) => self.text(s),
            Arg::Tag(t) => self.tag(t),
        }
    }

    pub fn append(&mut self, other: &Snippet) -> &mut Self {
        for piece in &other.pieces {
            match piece {
                Piece::Text(s) => self.text(s),
                Piece::Tag(t) => self.tag(*t),
            };
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Expands `${name}` placeholders of a trusted template.
    ///
    /// `${prefix}` becomes the prefix tag of `document`; every other name is
    /// looked up in `args`. Unknown names are kept verbatim.
    pub fn expand(template: &str, document: usize, args: &[(&str, Arg<'_>)]) -> Snippet {
        let mut out = Snippet::new();
        let mut rest = template;
        while let Some(start) = rest.find("${") {
            out.text(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.text(&rest[start..]);
                return out;
            };
            let name = &after[..end];
            if name == "prefix" {
                out.tag(Tag::Prefix(document));
            } else if let Some((_, arg)) = args.iter().find(|(k, _)| *k == name) {
                out.arg(*arg);
            } else {
                out.text(&rest[start..start + 2 + end + 1]);
            }
            rest = &after[end + 1..];
        }
        out.text(rest);
        out
    }

    pub fn resolve(&self, res: &Resolution<'_>) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(s) => out.push_str(s),
                Piece::Tag(t) => out.push_str(&res.value(*t)),
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolRepr {
    #[default]
    Native,
    Integer,
}

impl BoolRepr {
    pub fn type_name(self) -> &'static str {
        match self {
            BoolRepr::Native => "bool",
            BoolRepr::Integer => "uint8_t",
        }
    }

    pub fn literal(self, value: bool) -> &'static str {
        match (self, value) {
            (BoolRepr::Native, true) => "true",
            (BoolRepr::Native, false) => "false",
            (BoolRepr::Integer, true) => "1",
            (BoolRepr::Integer, false) => "0",
        }
    }
}

/// Final values of every tag for one session.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// Resolved prefix per document, already in prefix form (`BUILD_`).
    pub prefixes: &'a [String],
    pub header_guard: String,
    pub header_file: String,
    pub bools: BoolRepr,
}

impl Resolution<'_> {
    fn value(&self, tag: Tag) -> String {
        match tag {
            Tag::Prefix(doc) => self.prefixes.get(doc).cloned().unwrap_or_default(),
            Tag::HeaderGuard => self.header_guard.clone(),
            Tag::HeaderFile => self.header_file.clone(),
            Tag::BoolType => self.bools.type_name().to_string(),
            Tag::BoolTrue => self.bools.literal(true).to_string(),
            Tag::BoolFalse => self.bools.literal(false).to_string(),
            Tag::BoolInclude => match self.bools {
                BoolRepr::Native => "#include <stdbool.h>\n".to_string(),
                BoolRepr::Integer => String::new(),
            },
        }
    }
}

/// Collapses every run of blank lines to a single blank line.
pub fn collapse_blank_lines(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut newlines = 0usize;
    for c in code.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(c);
            }
        } else {
            newlines = 0;
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(prefixes: &[String], bools: BoolRepr) -> Resolution<'_> {
        Resolution {
            prefixes,
            header_guard: "INFO_H_".to_string(),
            header_file: "info.h".to_string(),
            bools,
        }
    }

    #[test]
    fn expands_prefix_args_and_tags() {
        let s = Snippet::expand(
            "static ${ctype} ${prefix}${var} = ${value};\n",
            1,
            &[
                ("ctype", Arg::Tag(Tag::BoolType)),
                ("var", Arg::Text("Flag")),
                ("value", Arg::Tag(Tag::BoolTrue)),
            ],
        );
        let prefixes = vec![String::new(), "BUILD_".to_string()];
        assert_eq!(
            s.resolve(&res(&prefixes, BoolRepr::Native)),
            "static bool BUILD_Flag = true;\n"
        );
        assert_eq!(
            s.resolve(&res(&prefixes, BoolRepr::Integer)),
            "static uint8_t BUILD_Flag = 1;\n"
        );
    }

    #[test]
    fn argument_text_is_not_rescanned() {
        let s = Snippet::expand("${value}", 0, &[("value", Arg::Text("${prefix}"))]);
        assert_eq!(s.resolve(&res(&["X_".to_string()], BoolRepr::Native)), "${prefix}");
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let s = Snippet::expand("a ${nope} b ${", 0, &[]);
        assert_eq!(s.resolve(&res(&[], BoolRepr::Native)), "a ${nope} b ${");
    }

    #[test]
    fn collapses_blank_line_runs() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\nc\n\n"), "a\n\nb\nc\n\n");
    }
}
