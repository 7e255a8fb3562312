use std::collections::HashMap;

use log::{debug, warn};

use crate::context::{FrameData, Stack};
use crate::data::{Data, DataType};
use crate::lexer::{self, Token, TokenKind};
use crate::whitespace;

/// Upper bound on partial splices per render; recursive partials that never
/// bottom out through their data stop here.
const MAX_SPLICES: usize = 4096;

/// Upper bound on context frames per render.
const MAX_FRAMES: usize = 1 << 20;

/// Walks the token sequence with an integer cursor. Sections replay in
/// place: the close token of a list section carries the remaining
/// iteration count and the index of its open, and the element frames are
/// pre-staged on the stack in reverse, so the flat stream is never copied
/// per iteration.
pub(crate) struct Processor<'a> {
    tokens: Vec<Token>,
    stack: Stack<'a>,
    partials: &'a HashMap<String, String>,
    cursor: usize,
    output: String,
    splices: usize,
}

impl<'a> Processor<'a> {
    pub(crate) fn new(
        tokens: Vec<Token>,
        data: &'a dyn Data,
        partials: &'a HashMap<String, String>,
    ) -> Self {
        Processor {
            tokens,
            stack: Stack::root(data),
            partials,
            cursor: 0,
            output: String::new(),
            splices: 0,
        }
    }

    pub(crate) fn run(mut self) -> String {
        while self.cursor < self.tokens.len() {
            match self.tokens[self.cursor].kind {
                TokenKind::Text | TokenKind::Newline => {
                    if self.stack.top_truthy() {
                        self.output.push_str(&self.tokens[self.cursor].value);
                    }
                }
                TokenKind::Tag => self.emit_value(true),
                TokenKind::TagLiteral | TokenKind::TagLiteralTriple => self.emit_value(false),
                TokenKind::SectionOpen => self.open_section(false),
                TokenKind::SectionOpenInverted => self.open_section(true),
                TokenKind::SectionClose => self.close_section(),
                TokenKind::Partial => self.inline_partial(),
                TokenKind::Comment
                | TokenKind::SetDelimiters
                | TokenKind::Skip
                | TokenKind::Eof => {}
            }
            self.cursor += 1;
        }
        self.output
    }

    fn emit_value(&mut self, escape: bool) {
        if !self.stack.top_truthy() {
            return;
        }
        let text = self.stack.resolve(&self.tokens[self.cursor].value).as_text();
        if escape {
            self.output.push_str(&html_escape(&text));
        } else {
            self.output.push_str(&text);
        }
    }

    fn open_section(&mut self, inverted: bool) {
        let name = self.tokens[self.cursor].value.clone();
        if !self.stack.top_truthy() {
            // a falsey scope poisons everything nested beneath it
            self.push_guarded(FrameData::Nil, &name);
            return;
        }
        let resolved = self.stack.resolve(&name);
        if inverted {
            let literal = if resolved.is_truthy() { "false" } else { "true" };
            self.push_guarded(FrameData::Literal(literal), &name);
            return;
        }
        match resolved {
            FrameData::Data(data) if data.type_of() == DataType::List => {
                self.open_list(data, &name)
            }
            other => self.push_guarded(other, &name),
        }
    }

    fn open_list(&mut self, list: &'a dyn Data, name: &str) {
        let open = self.cursor;
        let Some(close) = self.matching_close(open, name) else {
            self.push_guarded(FrameData::Nil, name);
            return;
        };
        let length = list.length_of();
        if length == 0 {
            // drop the body; the placeholder keeps the close's pop balanced
            self.tokens.drain(open + 1..close);
            self.push_guarded(FrameData::Nil, name);
            return;
        }
        self.tokens[close].iters = length - 1;
        self.tokens[close].replay_to = open;
        for index in (0..length).rev() {
            let label = format!("{name}[{index}]");
            match list.index_at(index) {
                Some(element) if !element.is_nil() => {
                    self.push_guarded(FrameData::Data(element), &label)
                }
                _ => self.push_guarded(FrameData::Nil, &label),
            }
        }
    }

    fn close_section(&mut self) {
        self.stack.pop();
        let token = &mut self.tokens[self.cursor];
        if token.iters > 0 {
            token.iters -= 1;
            self.cursor = token.replay_to;
        }
    }

    fn matching_close(&self, open: usize, name: &str) -> Option<usize> {
        let mut depth = 0usize;
        for index in open + 1..self.tokens.len() {
            let token = &self.tokens[index];
            match token.kind {
                TokenKind::SectionOpen | TokenKind::SectionOpenInverted
                    if token.value == name =>
                {
                    depth += 1
                }
                TokenKind::SectionClose if token.value == name => {
                    if depth == 0 {
                        return Some(index);
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        None
    }

    fn inline_partial(&mut self) {
        if !self.stack.top_truthy() {
            return;
        }
        let name = self.tokens[self.cursor].value.clone();
        let Some(body) = self.partials.get(&name) else {
            debug!("partial {name:?} is not defined");
            return;
        };
        if self.splices >= MAX_SPLICES {
            warn!("partial expansion stopped at {name:?} after {MAX_SPLICES} splices");
            return;
        }
        self.splices += 1;
        // partials always start from the default delimiter table
        let mut spliced = match lexer::lex(body) {
            Ok(tokens) => tokens,
            Err(error) => {
                warn!("partial {name:?} is skipped: {error}");
                return;
            }
        };
        spliced.pop(); // drop the Eof
        if self.tokens[self.cursor].standalone {
            if let Some(indent) = self.indent_prefix() {
                reindent(&mut spliced, &indent);
            }
        }
        whitespace::analyze(&mut spliced);
        let at = self.cursor + 1;
        self.tokens.splice(at..at, spliced);
    }

    fn indent_prefix(&self) -> Option<String> {
        let token = &self.tokens[self.cursor];
        let previous = &self.tokens[self.cursor.checked_sub(1)?];
        (previous.is_blank_text() && previous.line == token.line)
            .then(|| previous.value.clone())
    }

    fn push_guarded(&mut self, data: FrameData<'a>, label: &str) {
        if self.stack.depth() >= MAX_FRAMES {
            warn!("context stack exceeded {MAX_FRAMES} frames at {label:?}");
            self.stack.push(FrameData::Nil, label.to_string());
            return;
        }
        self.stack.push(data, label.to_string());
    }
}

/// The indent a standalone partial was called with is repeated at the
/// start of every following line of the partial.
fn reindent(tokens: &mut Vec<Token>, indent: &str) {
    let mut index = 0;
    while index < tokens.len() {
        if tokens[index].kind == TokenKind::Newline && index + 1 < tokens.len() {
            let line = tokens[index].line + 1;
            tokens.insert(index + 1, Token::text(indent, line));
            index += 1;
        }
        index += 1;
    }
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
