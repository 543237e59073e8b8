//! Code mask: which bytes of a JS/TS source are live code.
//!
//! Comments, string literals, template literal text, regex literals and JSX
//! text are masked out so that declaration and call-site matching never
//! fires inside them. Expressions inside `${ ... }` of a template literal and
//! inside `{ ... }` of a JSX element count as code, as do JSX tag names.
//!
//! The scan is byte-oriented. Every delimiter it cares about is ASCII, and
//! UTF-8 continuation bytes never collide with ASCII, so multi-byte text
//! inside strings or comments is skipped correctly.
//!
//! A `<` in expression position is taken to open a JSX element. In plain
//! TypeScript the same byte can start a generic arrow function or a type
//! assertion; when such an element never closes, the scan is repeated with
//! that `<` treated as an operator.

use std::collections::HashSet;

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    /// `attr` marks a JSX attribute value, which resumes the enclosing tag.
    Str { quote: u8, attr: bool },
    Template,
    Regex { in_class: bool },
    JsxTag { closing: bool },
    JsxText,
}

/// Where a `}` at depth zero hands the scan back to.
#[derive(Clone, Copy)]
enum Resume {
    Template,
    JsxTag { closing: bool },
    JsxText,
}

/// An open `${` or JSX `{`, with the brace depth inside it.
struct Frame {
    resume: Resume,
    depth: usize,
}

/// Per-byte code/non-code classification of a source text.
pub struct Mask {
    code: Vec<bool>,
}

impl Mask {
    pub fn new(src: &str) -> Self {
        let mut not_jsx = HashSet::new();
        loop {
            match scan(src.as_bytes(), &not_jsx) {
                Ok(code) => return Mask { code },
                Err(at) => {
                    not_jsx.insert(at);
                }
            }
        }
    }

    /// True when the byte at `at` is live code.
    pub fn is_code(&self, at: usize) -> bool {
        self.code.get(at).copied().unwrap_or(false)
    }
}

/// Classify every byte. `Err` carries the offset of a JSX `<` whose element
/// was still open at the end of the text; no offset in `not_jsx` is returned.
fn scan(bytes: &[u8], not_jsx: &HashSet<usize>) -> Result<Vec<bool>, usize> {
    let mut code = vec![false; bytes.len()];
    let mut state = State::Code;
    let mut frames: Vec<Frame> = Vec::new();
    // One entry per JSX expression: offset of its `<` and open element depth.
    let mut jsx: Vec<(usize, usize)> = Vec::new();
    // Last significant code byte and its offset.
    let mut prev: Option<(u8, usize)> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match b {
                b'/' if next == Some(b'/') => {
                    state = State::LineComment;
                    i += 2;
                    continue;
                }
                b'/' if next == Some(b'*') => {
                    state = State::BlockComment;
                    i += 2;
                    continue;
                }
                b'/' if expression_allowed(bytes, prev) => {
                    state = State::Regex { in_class: false };
                }
                b'<' if !not_jsx.contains(&i)
                    && expression_allowed(bytes, prev)
                    && opens_element(bytes, i) =>
                {
                    jsx.push((i, 0));
                    code[i] = true;
                    state = State::JsxTag { closing: false };
                }
                b'\'' | b'"' => state = State::Str { quote: b, attr: false },
                b'`' => state = State::Template,
                b'{' => {
                    if let Some(f) = frames.last_mut() {
                        f.depth += 1;
                    }
                    code[i] = true;
                    prev = Some((b, i));
                }
                b'}' => match frames.last().map(|f| (f.depth, f.resume)) {
                    Some((0, resume)) => {
                        frames.pop();
                        state = match resume {
                            Resume::Template => State::Template,
                            Resume::JsxTag { closing } => {
                                code[i] = true;
                                State::JsxTag { closing }
                            }
                            Resume::JsxText => {
                                code[i] = true;
                                State::JsxText
                            }
                        };
                    }
                    _ => {
                        if let Some(f) = frames.last_mut() {
                            f.depth -= 1;
                        }
                        code[i] = true;
                        prev = Some((b, i));
                    }
                },
                _ => {
                    code[i] = true;
                    if !b.is_ascii_whitespace() {
                        prev = Some((b, i));
                    }
                }
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                    code[i] = true;
                }
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = State::Code;
                    i += 2;
                    continue;
                }
            }
            State::Str { quote, attr: true } => {
                if b == quote {
                    state = State::JsxTag { closing: false };
                }
            }
            State::Str { quote, attr: false } => {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == quote || b == b'\n' {
                    state = State::Code;
                    prev = Some((quote, i));
                }
            }
            State::Template => {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == b'`' {
                    state = State::Code;
                    prev = Some((b, i));
                } else if b == b'$' && next == Some(b'{') {
                    frames.push(Frame {
                        resume: Resume::Template,
                        depth: 0,
                    });
                    state = State::Code;
                    prev = Some((b'{', i + 1));
                    i += 2;
                    continue;
                }
            }
            State::Regex { in_class } => match b {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'[' => state = State::Regex { in_class: true },
                b']' => state = State::Regex { in_class: false },
                b'/' if !in_class => {
                    state = State::Code;
                    prev = Some(operand(i));
                }
                b'\n' => state = State::Code,
                _ => {}
            },
            State::JsxTag { closing } => {
                code[i] = true;
                match b {
                    b'{' => {
                        frames.push(Frame {
                            resume: Resume::JsxTag { closing },
                            depth: 0,
                        });
                        state = State::Code;
                        prev = Some((b, i));
                    }
                    b'\'' | b'"' => {
                        code[i] = false;
                        state = State::Str { quote: b, attr: true };
                    }
                    b'/' if next == Some(b'>') => {
                        code[i + 1] = true;
                        state = leave_element(&mut jsx);
                        prev = Some(operand(i + 1));
                        i += 2;
                        continue;
                    }
                    b'>' => {
                        if let Some(top) = jsx.last_mut() {
                            if closing {
                                top.1 = top.1.saturating_sub(1);
                            } else {
                                top.1 += 1;
                            }
                        }
                        state = leave_element(&mut jsx);
                        prev = Some(operand(i));
                    }
                    _ => {}
                }
            }
            State::JsxText => match b {
                b'<' if next == Some(b'/') => {
                    code[i] = true;
                    code[i + 1] = true;
                    state = State::JsxTag { closing: true };
                    i += 2;
                    continue;
                }
                b'<' => {
                    code[i] = true;
                    state = State::JsxTag { closing: false };
                }
                b'{' => {
                    frames.push(Frame {
                        resume: Resume::JsxText,
                        depth: 0,
                    });
                    code[i] = true;
                    state = State::Code;
                    prev = Some((b, i));
                }
                _ => {}
            },
        }
        i += 1;
    }
    match jsx.first() {
        Some(&(at, _)) => Err(at),
        None => Ok(code),
    }
}

/// State after a tag ends: children text while elements remain open,
/// otherwise back to code with the JSX expression finished.
fn leave_element(jsx: &mut Vec<(usize, usize)>) -> State {
    match jsx.last() {
        Some(&(_, depth)) if depth > 0 => State::JsxText,
        _ => {
            jsx.pop();
            State::Code
        }
    }
}

// A finished literal or element is an operand: `/` after it divides.
fn operand(at: usize) -> (u8, usize) {
    (b')', at)
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// True when a `/` or `<` at this point starts an operand rather than
/// dividing or comparing.
fn expression_allowed(bytes: &[u8], prev: Option<(u8, usize)>) -> bool {
    match prev {
        None => true,
        Some((b, at)) if is_ident(b) => {
            let end = at + 1;
            let start = bytes[..end]
                .iter()
                .rposition(|c| !is_ident(*c))
                .map_or(0, |p| p + 1);
            matches!(
                &bytes[start..end],
                b"return"
                    | b"typeof"
                    | b"case"
                    | b"do"
                    | b"else"
                    | b"in"
                    | b"of"
                    | b"new"
                    | b"delete"
                    | b"void"
                    | b"throw"
                    | b"yield"
                    | b"await"
            )
        }
        Some((b, _)) => matches!(
            b,
            b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b'}' | b';'
                | b'+' | b'-' | b'*' | b'%' | b'<' | b'>' | b'~' | b'^'
        ),
    }
}

/// `<` at `at` followed by a tag name or `>` (fragment). `<T,>` and
/// `<T extends U>` are TypeScript type parameters.
fn opens_element(bytes: &[u8], at: usize) -> bool {
    match bytes.get(at + 1) {
        Some(b'>') => true,
        Some(&b) if b.is_ascii_alphabetic() || b == b'_' || b == b'$' => {
            let mut j = at + 1;
            while j < bytes.len() && (is_ident(bytes[j]) || matches!(bytes[j], b'.' | b'-' | b':')) {
                j += 1;
            }
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            let rest = &bytes[j..];
            !(rest.starts_with(b",") || rest.starts_with(b"extends "))
        }
        _ => false,
    }
}
