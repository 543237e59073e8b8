//! Declaration Locator: finds ES import declarations without a full parser.
//!
//! Only bytes the lexer marks as code are considered, so `import` inside a
//! comment, string, or template literal never matches. Each declaration is
//! parsed with a small cursor that understands the forms
//! `import D, { a, type b as c } from 'm'`, `import type { ... } from 'm'`,
//! `import * as ns from 'm'` and `import 'm'`. Dynamic `import(...)`,
//! `import.meta` and TS `import x = require(...)` are not declarations.
//!
//! A deprecated-module declaration whose braces cannot be parsed is reported
//! as `MalformedDeclaration` and otherwise treated as unmatched.

use super::lexer::Mask;
use crate::models::{Diagnostic, DiagnosticKind};
use log::trace;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One entry of a named import list: `imported as local`.
pub struct Specifier {
    pub imported: String,
    pub local: String,
    /// Inline TS `type` modifier.
    pub type_only: bool,
}

impl Specifier {
    pub fn new(imported: &str, local: &str, type_only: bool) -> Self {
        Specifier {
            imported: imported.to_string(),
            local: local.to_string(),
            type_only,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.type_only {
            out.push_str("type ");
        }
        out.push_str(&self.imported);
        if self.local != self.imported {
            out.push_str(" as ");
            out.push_str(&self.local);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Statement-level layout of a declaration, reused when re-emitting it.
pub struct Style {
    pub indent: String,
    pub quote: char,
    pub semicolon: bool,
    pub multiline: bool,
    pub trailing_comma: bool,
}

#[derive(Debug, Clone)]
/// A parsed import declaration and where it sits in the source.
pub struct ImportDecl {
    pub span: Range<usize>,
    pub line: usize,
    pub module: String,
    pub deprecated: bool,
    pub type_only: bool,
    pub default_binding: Option<String>,
    pub namespace: Option<String>,
    /// `None` when the declaration has no braces at all.
    pub named: Option<Vec<Specifier>>,
    pub style: Style,
}

impl ImportDecl {
    pub fn specifiers(&self) -> &[Specifier] {
        self.named.as_deref().unwrap_or(&[])
    }

    /// Raw symbol list as written, for reporting.
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        if let Some(d) = &self.default_binding {
            out.push(d.clone());
        }
        if let Some(ns) = &self.namespace {
            out.push(format!("* as {ns}"));
        }
        out.extend(self.specifiers().iter().map(Specifier::render));
        out
    }

    /// Whether this declaration binds `imported` (or anything, if `None`).
    pub fn imports_symbol(&self, imported: Option<&str>) -> bool {
        match imported {
            None => true,
            Some("default") => self.default_binding.is_some(),
            Some(name) => self.specifiers().iter().any(|s| s.imported == name),
        }
    }
}

#[derive(Debug, Default)]
/// Every declaration in file order plus diagnostics for malformed ones.
pub struct Located {
    pub declarations: Vec<ImportDecl>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Located {
    /// The `ImportMatch` set: declarations naming a deprecated module.
    pub fn matches(&self) -> impl Iterator<Item = &ImportDecl> {
        self.declarations.iter().filter(|d| d.deprecated)
    }
}

enum Parsed {
    Decl(ImportDecl),
    NotDeclaration,
    Malformed { module: Option<String> },
}

/// Locate every import declaration of `src` in file order.
pub fn locate(src: &str, mask: &Mask, is_deprecated: impl Fn(&str) -> bool) -> Located {
    let bytes = src.as_bytes();
    let mut out = Located::default();
    let mut from = 0;
    while let Some(off) = src[from..].find("import") {
        let start = from + off;
        from = start + "import".len();
        if !mask.is_code(start) || !keyword_boundary(bytes, start, from) {
            continue;
        }
        match parse_declaration(src, start) {
            Parsed::Decl(mut decl) => {
                decl.deprecated = is_deprecated(&decl.module);
                trace!(
                    "import from '{}' at line {} (deprecated={})",
                    decl.module,
                    decl.line,
                    decl.deprecated
                );
                from = decl.span.end;
                out.declarations.push(decl);
            }
            Parsed::NotDeclaration => {}
            Parsed::Malformed { module } => {
                if let Some(module) = module.filter(|m| is_deprecated(m)) {
                    out.diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::MalformedDeclaration,
                        line: line_of(src, start),
                        message: format!(
                            "could not parse the import list of '{module}'; declaration left unchanged"
                        ),
                        module,
                        symbol: None,
                    });
                }
            }
        }
    }
    out
}

/// 1-based line of byte offset `at`.
pub fn line_of(src: &str, at: usize) -> usize {
    src[..at].bytes().filter(|&b| b == b'\n').count() + 1
}

fn parse_declaration(src: &str, start: usize) -> Parsed {
    let mut c = Cursor::at(src, start + "import".len());
    c.skip_trivia();
    match c.peek() {
        None | Some(b'(') | Some(b'.') => return Parsed::NotDeclaration,
        Some(b'\'') | Some(b'"') => {
            let Some((module, quote)) = c.string() else {
                return Parsed::NotDeclaration;
            };
            return finish(src, start, c, module, quote, Clause::default());
        }
        _ => {}
    }

    let mut clause = Clause::default();
    if c.at_keyword("type") {
        let save = c.pos;
        c.keyword("type");
        c.skip_trivia();
        let modifier = match c.peek() {
            Some(b'{') | Some(b'*') => true,
            Some(b) if is_ident_start(b) => !c.at_keyword("from"),
            _ => false,
        };
        if modifier {
            clause.type_only = true;
        } else {
            c.pos = save;
        }
    }

    let mut expect_more = true;
    if let Some(id) = c.ident() {
        clause.default_binding = Some(id.to_string());
        c.skip_trivia();
        if c.eat(b',') {
            c.skip_trivia();
        } else {
            expect_more = false;
        }
    }
    if expect_more {
        if c.eat(b'*') {
            c.skip_trivia();
            if !c.keyword("as") {
                return Parsed::NotDeclaration;
            }
            c.skip_trivia();
            let Some(ns) = c.ident() else {
                return Parsed::NotDeclaration;
            };
            clause.namespace = Some(ns.to_string());
        } else if c.peek() == Some(b'{') {
            let brace = c.pos;
            match parse_named(&mut c) {
                Some((list, trailing_comma)) => {
                    clause.multiline = src[brace..c.pos].contains('\n');
                    clause.trailing_comma = trailing_comma;
                    clause.named = Some(list);
                }
                None => {
                    return Parsed::Malformed {
                        module: recover_module(src, brace),
                    }
                }
            }
        } else {
            return Parsed::NotDeclaration;
        }
    }

    c.skip_trivia();
    if !c.keyword("from") {
        if clause.named.is_some() {
            return Parsed::Malformed {
                module: recover_module(src, c.pos),
            };
        }
        return Parsed::NotDeclaration;
    }
    c.skip_trivia();
    match c.string() {
        Some((module, quote)) => finish(src, start, c, module, quote, clause),
        None => Parsed::Malformed { module: None },
    }
}

#[derive(Default)]
struct Clause {
    type_only: bool,
    default_binding: Option<String>,
    namespace: Option<String>,
    named: Option<Vec<Specifier>>,
    multiline: bool,
    trailing_comma: bool,
}

fn finish(
    src: &str,
    start: usize,
    mut c: Cursor<'_>,
    module: &str,
    quote: char,
    clause: Clause,
) -> Parsed {
    // Import attributes are left to whoever wrote them.
    let after = c.pos;
    c.skip_trivia();
    if c.at_keyword("with") || c.at_keyword("assert") {
        return Parsed::NotDeclaration;
    }
    c.pos = after;
    while matches!(c.peek(), Some(b' ') | Some(b'\t')) {
        c.pos += 1;
    }
    let semicolon = c.eat(b';');
    let end = if semicolon { c.pos } else { after };

    let line_start = src[..start].rfind('\n').map(|p| p + 1).unwrap_or(0);
    let prefix = &src[line_start..start];
    let indent = if prefix.chars().all(|ch| ch == ' ' || ch == '\t') {
        prefix.to_string()
    } else {
        String::new()
    };

    Parsed::Decl(ImportDecl {
        span: start..end,
        line: line_of(src, start),
        module: module.to_string(),
        deprecated: false,
        type_only: clause.type_only,
        default_binding: clause.default_binding,
        namespace: clause.namespace,
        named: clause.named,
        style: Style {
            indent,
            quote,
            semicolon,
            multiline: clause.multiline,
            trailing_comma: clause.trailing_comma,
        },
    })
}

/// Parse `{ ... }` at the cursor. Returns the specifiers and whether the
/// list ended with a comma, or `None` on anything unbalanced or unexpected.
fn parse_named(c: &mut Cursor<'_>) -> Option<(Vec<Specifier>, bool)> {
    if !c.eat(b'{') {
        return None;
    }
    let mut specs = Vec::new();
    let mut trailing_comma = false;
    loop {
        c.skip_trivia();
        if c.eat(b'}') {
            return Some((specs, trailing_comma));
        }
        let first = c.ident()?;
        let mut type_only = false;
        let mut imported = first;
        c.skip_trivia();
        if first == "type" && !c.at_keyword("as") {
            if let Some(name) = c.ident() {
                type_only = true;
                imported = name;
                c.skip_trivia();
            }
        }
        let mut local = imported;
        if c.keyword("as") {
            c.skip_trivia();
            local = c.ident()?;
            c.skip_trivia();
        }
        specs.push(Specifier::new(imported, local, type_only));
        trailing_comma = false;
        if c.eat(b',') {
            trailing_comma = true;
            continue;
        }
        if c.eat(b'}') {
            return Some((specs, trailing_comma));
        }
        return None;
    }
}

/// Best-effort module name of a declaration that failed to parse: the first
/// string literal after `from` before the statement ends.
fn recover_module(src: &str, pos: usize) -> Option<String> {
    let mut c = Cursor::at(src, pos);
    let mut prev_word: Option<&str> = None;
    while let Some(b) = c.peek() {
        match b {
            b';' => return None,
            b'\'' | b'"' => {
                let (s, _) = c.string()?;
                return (prev_word == Some("from")).then(|| s.to_string());
            }
            b'/' if matches!(c.peek_at(1), Some(b'/') | Some(b'*')) => c.skip_trivia(),
            b if is_ident_start(b) => {
                let word = c.ident()?;
                if word == "import" {
                    return None;
                }
                prev_word = Some(word);
            }
            _ => {
                if !b.is_ascii_whitespace() {
                    prev_word = None;
                }
                c.pos += 1;
            }
        }
    }
    None
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_byte(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn keyword_boundary(bytes: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || {
        let p = bytes[start - 1];
        !is_ident_byte(p) && p != b'.'
    };
    let after_ok = bytes.get(end).map_or(true, |&b| !is_ident_byte(b));
    before_ok && after_ok
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at(src: &'a str, pos: usize) -> Self {
        Cursor { src, pos }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + n).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) {
        let bytes = self.src.as_bytes();
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'/' && self.peek_at(1) == Some(b'/') {
                self.pos = self.src[self.pos..]
                    .find('\n')
                    .map_or(bytes.len(), |n| self.pos + n);
            } else if b == b'/' && self.peek_at(1) == Some(b'*') {
                self.pos = self.src[self.pos + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |n| self.pos + 2 + n + 2);
            } else {
                break;
            }
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        if !bytes.get(start).copied().is_some_and(is_ident_start) {
            return None;
        }
        let mut end = start + 1;
        while bytes.get(end).copied().is_some_and(is_ident_byte) {
            end += 1;
        }
        self.pos = end;
        Some(&self.src[start..end])
    }

    fn at_keyword(&self, kw: &str) -> bool {
        let bytes = self.src.as_bytes();
        self.src[self.pos..].starts_with(kw)
            && bytes
                .get(self.pos + kw.len())
                .map_or(true, |&b| !is_ident_byte(b))
    }

    fn keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.pos += kw.len();
            true
        } else {
            false
        }
    }

    /// Read a quoted string literal; `None` if unterminated on its line.
    fn string(&mut self) -> Option<(&'a str, char)> {
        let bytes = self.src.as_bytes();
        let quote = self.peek()?;
        let start = self.pos + 1;
        let mut i = start;
        while let Some(&b) = bytes.get(i) {
            match b {
                b'\\' => i += 2,
                b'\n' => return None,
                _ if b == quote => {
                    self.pos = i + 1;
                    return Some((&self.src[start..i], quote as char));
                }
                _ => i += 1,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> Located {
        let mask = Mask::new(src);
        locate(src, &mask, |m| m == "old-pkg")
    }

    fn names(decl: &ImportDecl) -> Vec<String> {
        decl.specifiers().iter().map(Specifier::render).collect()
    }

    #[test]
    fn test_locates_named_and_aliased() {
        let src = "import { Alpha, Beta as B } from 'old-pkg';\nimport x from \"other\";\n";
        let found = run(src);
        assert_eq!(found.declarations.len(), 2);
        let first = &found.declarations[0];
        assert!(first.deprecated);
        assert_eq!(first.module, "old-pkg");
        assert_eq!(names(first), vec!["Alpha", "Beta as B"]);
        assert_eq!(&src[first.span.clone()], "import { Alpha, Beta as B } from 'old-pkg';");
        assert!(first.style.semicolon);
        assert_eq!(first.style.quote, '\'');
        let second = &found.declarations[1];
        assert!(!second.deprecated);
        assert_eq!(second.default_binding.as_deref(), Some("x"));
        assert_eq!(second.style.quote, '"');
        assert_eq!(found.matches().count(), 1);
    }

    #[test]
    fn test_multiline_list_with_comments_and_trailing_comma() {
        let src = "  import {\n    Alpha, // first\n    /* second */ Beta,\n  } from 'old-pkg'\nfoo();\n";
        let found = run(src);
        let decl = &found.declarations[0];
        assert_eq!(names(decl), vec!["Alpha", "Beta"]);
        assert!(decl.style.multiline);
        assert!(decl.style.trailing_comma);
        assert!(!decl.style.semicolon);
        assert_eq!(decl.style.indent, "  ");
        assert_eq!(decl.line, 1);
        assert!(src[decl.span.clone()].ends_with("'old-pkg'"));
    }

    #[test]
    fn test_ignores_comments_strings_and_dynamic_imports() {
        let src = r#"
// import { Alpha } from 'old-pkg';
/* import { Beta } from 'old-pkg'; */
const s = "import { Gamma } from 'old-pkg'";
const t = `import { Delta } from 'old-pkg'`;
const m = import('old-pkg');
const u = import.meta.url;
"#;
        let found = run(src);
        assert!(found.declarations.is_empty());
        assert!(found.diagnostics.is_empty());
    }

    #[test]
    fn test_type_only_forms() {
        let src = "import type { Props } from 'old-pkg';\nimport { type Ref, Alpha } from 'old-pkg';\nimport type from 'old-pkg';\n";
        let found = run(src);
        assert_eq!(found.declarations.len(), 3);
        assert!(found.declarations[0].type_only);
        assert_eq!(names(&found.declarations[0]), vec!["Props"]);
        assert!(!found.declarations[1].type_only);
        assert_eq!(names(&found.declarations[1]), vec!["type Ref", "Alpha"]);
        assert!(found.declarations[1].specifiers()[0].type_only);
        // `type` used as a default binding name
        assert!(!found.declarations[2].type_only);
        assert_eq!(found.declarations[2].default_binding.as_deref(), Some("type"));
    }

    #[test]
    fn test_default_namespace_and_side_effect_forms() {
        let src = "import D, { A } from 'old-pkg';\nimport * as NS from 'old-pkg';\nimport 'old-pkg';\n";
        let found = run(src);
        assert_eq!(found.declarations.len(), 3);
        assert_eq!(found.declarations[0].symbols(), vec!["D", "A"]);
        assert_eq!(found.declarations[1].namespace.as_deref(), Some("NS"));
        assert!(found.declarations[1].named.is_none());
        assert!(found.declarations[2].symbols().is_empty());
        assert!(found.declarations[2].deprecated);
    }

    #[test]
    fn test_unbalanced_braces_are_malformed() {
        let src = "import { Alpha, Beta from 'old-pkg';\nimport { Gamma } from 'old-pkg';\n";
        let found = run(src);
        assert_eq!(found.declarations.len(), 1);
        assert_eq!(names(&found.declarations[0]), vec!["Gamma"]);
        assert_eq!(found.diagnostics.len(), 1);
        assert_eq!(found.diagnostics[0].kind, DiagnosticKind::MalformedDeclaration);
        assert_eq!(found.diagnostics[0].line, 1);
    }

    #[test]
    fn test_malformed_unrelated_module_is_silent() {
        let src = "import { Alpha, Beta from 'fine-pkg';\n";
        let found = run(src);
        assert!(found.declarations.is_empty());
        assert!(found.diagnostics.is_empty());
    }

    #[test]
    fn test_identifier_suffix_is_not_a_keyword() {
        let src = "reimport { A } from 'old-pkg';\nx.import;\n";
        let found = run(src);
        assert!(found.declarations.is_empty());
    }

    #[test]
    fn test_import_attributes_are_left_alone() {
        let src = "import data from 'old-pkg' with { type: 'json' };\n";
        let found = run(src);
        assert!(found.declarations.is_empty());
    }
}
