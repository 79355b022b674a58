use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::collab::{Clock, GitDescribe, RevisionSource, SystemClock};
use crate::descriptor::Descriptor;
use crate::directive::{Directive, Version};
use crate::emit::{Emitter, Fragment};
use crate::error::{GenError, GenResult};
use crate::input;
use crate::naming::{NameFormatter, PascalFunctions};
use crate::snippet::{collapse_blank_lines, BoolRepr, Resolution, Snippet, Tag};
use crate::stamp::{stamp, Artifact};
use crate::types::{self, json_kind, FieldType};

/// Base file name used when neither `Module_Name` nor a prefix is given.
pub const DEFAULT_FILENAME: &str = "INFO";

#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Output base name (`info` -> `info.h`, `INFO_H_`). A `Module_Name`
    /// directive overrides it.
    pub filename_base: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Include {
    /// The generated header itself, named at render time.
    Generated,
    File(String),
}

#[derive(Debug, Clone)]
struct SessionState {
    /// Final raw prefix of every document seen so far; the last entry is active.
    prefixes: Vec<String>,
    filename_base: Option<String>,
    bool_as_integer: bool,
    header_includes: Vec<Include>,
    source_includes: Vec<Include>,
    /// Fields of the active document, checked for clashes once its prefix is final.
    fields: Vec<(String, Descriptor)>,
    /// Every prefixed C symbol defined so far, with the key that defined it.
    symbols: HashMap<String, String>,
}

impl SessionState {
    fn new(filename_base: Option<String>) -> Self {
        SessionState {
            prefixes: Vec::new(),
            filename_base,
            bool_as_integer: false,
            header_includes: vec![Include::File("<stdint.h>".to_string())],
            source_includes: vec![Include::Generated],
            fields: Vec::new(),
            symbols: HashMap::new(),
        }
    }

    fn document(&self) -> usize {
        self.prefixes.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Default)]
struct ModuleBuffers {
    macros: Vec<Snippet>,
    decls: Vec<Snippet>,
    vars: Vec<Snippet>,
    funcs: Vec<Snippet>,
}

impl ModuleBuffers {
    fn push(&mut self, f: Fragment) {
        self.macros.push(f.macros);
        self.decls.push(f.decls);
        self.vars.push(f.vars);
        self.funcs.push(f.funcs);
    }
}

/// Both generated files of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub header: Artifact,
    pub source: Artifact,
}

/// Converts documents of field descriptors into a C header/source pair.
///
/// Documents are processed in order and accumulate into one module. Nothing
/// that depends on session-wide state (prefixes, file name, bool lowering)
/// is resolved until [`Generator::render`].
pub struct Generator {
    naming: Box<dyn NameFormatter>,
    revisions: Box<dyn RevisionSource>,
    clock: Box<dyn Clock>,
    options: GeneratorOptions,
    state: SessionState,
    buffers: ModuleBuffers,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Generator {
            naming: Box::new(PascalFunctions),
            revisions: Box::new(GitDescribe),
            clock: Box::new(SystemClock),
            state: SessionState::new(options.filename_base.clone()),
            options,
            buffers: ModuleBuffers::default(),
        }
    }

    pub fn with_naming(mut self, naming: Box<dyn NameFormatter>) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_revisions(mut self, revisions: Box<dyn RevisionSource>) -> Self {
        self.revisions = revisions;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Drops every captured fragment and all session state.
    pub fn reset(&mut self) {
        self.state = SessionState::new(self.options.filename_base.clone());
        self.buffers = ModuleBuffers::default();
    }

    /// Accepts JSON text holding one document or an array of documents.
    /// Number literals are emitted exactly as written.
    pub fn process_json(&mut self, text: &str) -> GenResult<()> {
        for doc in input::parse(text)? {
            let fields = doc
                .iter()
                .map(|e| (e.key.as_str(), &e.value, e.literal.as_deref()));
            self.process_fields(doc.len(), fields)?;
        }
        Ok(())
    }

    /// Accepts one document (object) or a sequence of documents (array of objects).
    pub fn process_value(&mut self, value: &Value) -> GenResult<()> {
        match value {
            Value::Object(doc) => self.process_document(doc),
            Value::Array(docs) => {
                for (idx, doc) in docs.iter().enumerate() {
                    let Value::Object(doc) = doc else {
                        return Err(GenError::type_mismatch(format!(
                            "document[{idx}] must be an object, got {}",
                            json_kind(doc)
                        )));
                    };
                    self.process_document(doc)?;
                }
                Ok(())
            }
            other => Err(GenError::type_mismatch(format!(
                "input must be an object or an array of objects, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Numbers of a prebuilt document are emitted in `serde_json`'s spelling.
    pub fn process_document(&mut self, doc: &Map<String, Value>) -> GenResult<()> {
        let fields = doc.iter().map(|(key, value)| (key.as_str(), value, None));
        self.process_fields(doc.len(), fields)
    }

    fn process_fields<'a>(
        &mut self,
        count: usize,
        fields: impl IntoIterator<Item = (&'a str, &'a Value, Option<&'a str>)>,
    ) -> GenResult<()> {
        self.state.prefixes.push(String::new());
        self.state.fields.clear();
        debug!(document = self.state.document(), fields = count, "processing document");
        for (key, value, literal) in fields {
            self.process_field(key, value, literal)?;
            self.buffers.push(Fragment::separator());
        }
        self.register_symbols()
    }

    fn process_field(&mut self, key: &str, value: &Value, literal: Option<&str>) -> GenResult<()> {
        let desc = Descriptor::parse(key)?;
        if desc.ty == FieldType::Config {
            return self.apply_directive(key, &desc, value);
        }
        let checked = types::validate_literal(key, &desc, value, literal)?;
        let fragment = Emitter::new(self.naming.as_ref(), self.state.document()).emit(key, &desc, &checked)?;
        self.buffers.push(fragment);
        self.state.fields.push((key.to_string(), desc));
        Ok(())
    }

    /// Adds a field on behalf of a directive, through the same checks as input fields.
    fn synthesize(&mut self, key: &str, value: Value, literal: Option<&str>) -> GenResult<()> {
        debug!(field = key, "synthesizing field");
        self.process_field(key, &value, literal)
    }

    /// Rejects fields of the finished document whose C symbols are already defined.
    fn register_symbols(&mut self) -> GenResult<()> {
        let prefix = match self.state.prefixes.last() {
            Some(raw) if !raw.is_empty() => self.naming.prefix(raw),
            _ => String::new(),
        };
        let emitter = Emitter::new(self.naming.as_ref(), self.state.document());
        for (key, desc) in std::mem::take(&mut self.state.fields) {
            for symbol in emitter.symbols(&desc) {
                let symbol = format!("{prefix}{symbol}");
                if let Some(other) = self.state.symbols.get(&symbol) {
                    return Err(GenError::config(format!(
                        "'{key}': generates the same C symbol '{symbol}' as '{other}'"
                    )));
                }
                self.state.symbols.insert(symbol, key.clone());
            }
        }
        Ok(())
    }

    fn apply_directive(&mut self, key: &str, desc: &Descriptor, value: &Value) -> GenResult<()> {
        let directive = Directive::from_keyword(&desc.name)
            .ok_or_else(|| GenError::config(format!("'{key}': unknown directive '{}'", desc.name)))?;
        debug!(directive = directive.keyword(), "applying directive");

        match directive {
            Directive::SectionPrefix => {
                let prefix = directive.expect_str(value)?.to_string();
                if let Some(active) = self.state.prefixes.last_mut() {
                    *active = prefix;
                }
            }
            Directive::ModuleName => {
                self.state.filename_base = Some(directive.expect_str(value)?.to_string());
            }
            Directive::BoolIsInteger => {
                self.state.bool_as_integer = directive.expect_bool(value)?;
            }
            Directive::IncludeSource => {
                let files = directive.expect_str_list(value)?;
                self.state.source_includes.extend(files.into_iter().map(Include::File));
            }
            Directive::IncludeHeader => {
                let files = directive.expect_str_list(value)?;
                self.state.header_includes.extend(files.into_iter().map(Include::File));
            }
            Directive::GitRepository => {
                let repository = directive.expect_str(value)?;
                let commit = self
                    .revisions
                    .describe(Path::new(repository))
                    .map_err(|e| GenError::collaborator(format!("'{key}': {e:#}")))?;
                self.synthesize("string[]:Git_Commit_Str", Value::String(commit), None)?;
            }
            Directive::DateTime => {
                if directive.expect_bool(value)? {
                    let now = self
                        .clock
                        .now()
                        .map_err(|e| GenError::collaborator(format!("'{key}': {e:#}")))?;
                    self.synthesize("uint32:Unix_Time", Value::from(now.timestamp()), None)?;
                    let text = now.format("%Y-%m-%d %H:%M:%S").to_string();
                    self.synthesize("string:Time_Str", Value::String(text), None)?;
                }
            }
            Directive::Version => {
                let version = Version::from_value(value)?;
                self.synthesize("string:Version_Str", Value::String(version.to_string()), None)?;
                self.synthesize(
                    "uint32:Version_Num",
                    Value::from(version.packed()),
                    Some(&version.packed_literal()),
                )?;
            }
        }
        Ok(())
    }

    /// Base name of the output files, as resolved at render time.
    pub fn filename_base(&self) -> String {
        if let Some(base) = &self.state.filename_base {
            return base.clone();
        }
        match self.state.prefixes.last() {
            Some(prefix) if !prefix.is_empty() => prefix.clone(),
            _ => DEFAULT_FILENAME.to_string(),
        }
    }

    pub fn header_filename(&self) -> String {
        self.naming.header_filename(&self.filename_base())
    }

    pub fn source_filename(&self) -> String {
        self.naming.source_filename(&self.filename_base())
    }

    fn resolve(&self, code: &Snippet) -> String {
        let prefixes: Vec<String> = self
            .state
            .prefixes
            .iter()
            .map(|p| if p.is_empty() { String::new() } else { self.naming.prefix(p) })
            .collect();
        let base = self.filename_base();
        let res = Resolution {
            prefixes: &prefixes,
            header_guard: self.naming.header_guard(&base),
            header_file: self.naming.header_filename(&base),
            bools: if self.state.bool_as_integer {
                BoolRepr::Integer
            } else {
                BoolRepr::Native
            },
        };
        collapse_blank_lines(&code.resolve(&res))
    }

    /// Header text without the digest banner.
    pub fn header_body(&self) -> String {
        let mut code = Snippet::new();
        code.text("#ifndef ")
            .tag(Tag::HeaderGuard)
            .text("\n#define ")
            .tag(Tag::HeaderGuard)
            .text("\n\n");
        let (first, rest) = self.state.header_includes.split_at(1.min(self.state.header_includes.len()));
        include_lines(&mut code, first);
        code.tag(Tag::BoolInclude);
        include_lines(&mut code, rest);
        code.text("\n");
        for s in self.buffers.macros.iter().chain(&self.buffers.decls) {
            code.append(s);
        }
        code.text("\n#endif /* ").tag(Tag::HeaderGuard).text(" */\n");
        self.resolve(&code)
    }

    /// Source text without the digest banner.
    pub fn source_body(&self) -> String {
        let mut code = Snippet::new();
        include_lines(&mut code, &self.state.source_includes);
        code.text("\n");
        for s in self.buffers.vars.iter().chain(&self.buffers.funcs) {
            code.append(s);
        }
        self.resolve(&code)
    }

    pub fn render(&self) -> Rendered {
        Rendered {
            header: stamp(&self.header_body()),
            source: stamp(&self.source_body()),
        }
    }
}

fn include_lines(code: &mut Snippet, includes: &[Include]) {
    for inc in includes {
        match inc {
            Include::Generated => {
                code.text("#include \"").tag(Tag::HeaderFile).text("\"\n");
            }
            Include::File(f) if f.len() > 1 && f.starts_with('<') && f.ends_with('>') => {
                code.text(&format!("#include {f}\n"));
            }
            Include::File(f) => {
                code.text(&format!("#include \"{f}\"\n"));
            }
        }
    }
}
