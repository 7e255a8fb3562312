use std::ops::RangeInclusive;

use crate::error::RenderError;

/// Open and close sigils for every tag flavor, derived from a single
/// open/close pair so that alternative delimiter sets need no code changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Delimiters {
    pub(crate) open: String,
    pub(crate) close: String,
    pub(crate) open_triple: String,
    pub(crate) close_triple: String,
    pub(crate) open_section: String,
    pub(crate) open_inverted: String,
    pub(crate) open_end: String,
    pub(crate) open_literal: String,
    pub(crate) open_comment: String,
    pub(crate) open_partial: String,
    pub(crate) open_set: String,
    pub(crate) close_set: String,
}

impl Delimiters {
    pub(crate) fn new(open: &str, close: &str) -> Self {
        Delimiters {
            open: open.to_string(),
            close: close.to_string(),
            open_triple: format!("{open}{{"),
            close_triple: format!("}}{close}"),
            open_section: format!("{open}#"),
            open_inverted: format!("{open}^"),
            open_end: format!("{open}/"),
            open_literal: format!("{open}&"),
            open_comment: format!("{open}!"),
            open_partial: format!("{open}>"),
            open_set: format!("{open}="),
            close_set: format!("={close}"),
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters::new("{{", "}}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Text,
    Newline,
    Tag,
    TagLiteral,
    TagLiteralTriple,
    SectionOpen,
    SectionOpenInverted,
    SectionClose,
    Comment,
    Partial,
    SetDelimiters,
    Skip,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) value: String,
    pub(crate) line: usize,
    pub(crate) start_column: usize,
    pub(crate) end_column: usize,
    /// Set on `Partial` tokens whose line qualifies for standalone elision.
    pub(crate) standalone: bool,
    /// Remaining replays; meaningful only on the close of a list section.
    pub(crate) iters: usize,
    /// Index of the matching open; meaningful only with `iters`.
    pub(crate) replay_to: usize,
}

impl Token {
    pub(crate) fn new(
        kind: TokenKind,
        value: String,
        line: usize,
        start_column: usize,
        end_column: usize,
    ) -> Self {
        Token {
            kind,
            value,
            line,
            start_column,
            end_column,
            standalone: false,
            iters: 0,
            replay_to: 0,
        }
    }

    pub(crate) fn text(value: &str, line: usize) -> Self {
        Token::new(TokenKind::Text, value.to_string(), line, 1, value.len() + 1)
    }

    /// The source lines this token covers. Only comments may span more
    /// than one line.
    pub(crate) fn lines(&self) -> RangeInclusive<usize> {
        match self.kind {
            TokenKind::Comment => self.line..=self.line + self.value.matches('\n').count(),
            _ => self.line..=self.line,
        }
    }

    pub(crate) fn is_blank_text(&self) -> bool {
        self.kind == TokenKind::Text
            && self.value.chars().all(|c| matches!(c, ' ' | '\t' | '\r'))
    }
}

pub(crate) fn lex(input: &str) -> Result<Vec<Token>, RenderError> {
    lex_with(input, Delimiters::default())
}

pub(crate) fn lex_with(input: &str, delimiters: Delimiters) -> Result<Vec<Token>, RenderError> {
    Lexer::new(input, delimiters).run()
}

struct Lexer<'a> {
    input: &'a str,
    delimiters: Delimiters,
    tokens: Vec<Token>,
    kind: TokenKind,
    pos: usize,
    start: usize,
    line: usize,
    line_start: usize,
    token_line: usize,
    token_column: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str, delimiters: Delimiters) -> Self {
        Lexer {
            input,
            delimiters,
            tokens: Vec::new(),
            kind: TokenKind::Text,
            pos: 0,
            start: 0,
            line: 1,
            line_start: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, RenderError> {
        while self.pos < self.input.len() {
            if self.kind == TokenKind::Text {
                self.step_text()?;
            } else {
                self.step_tag()?;
            }
        }
        if self.kind != TokenKind::Text {
            return Err(RenderError::UnbalancedTags(format!(
                "tag at line {}, column {} is missing its close delimiter",
                self.token_line, self.token_column
            )));
        }
        self.close(TokenKind::Text)?;
        let column = self.column();
        self.tokens.push(Token::new(
            TokenKind::Eof,
            String::new(),
            self.line,
            column,
            column,
        ));
        check_sections(&self.tokens)?;
        Ok(self.tokens)
    }

    fn step_text(&mut self) -> Result<(), RenderError> {
        let input = self.input;
        let tail = &input[self.pos..];
        if tail.starts_with('\n') {
            self.close(TokenKind::Text)?;
            self.emit_newline();
            return Ok(());
        }
        if let Some((kind, length)) = self.open_kind(tail) {
            self.close(TokenKind::Text)?;
            self.kind = kind;
            self.advance(length);
            self.begin();
            return Ok(());
        }
        self.advance_char();
        Ok(())
    }

    fn step_tag(&mut self) -> Result<(), RenderError> {
        let input = self.input;
        let tail = &input[self.pos..];
        if tail.starts_with('\n') {
            if self.kind == TokenKind::Comment {
                self.advance(1);
                self.line += 1;
                self.line_start = self.pos;
                return Ok(());
            }
            // tags other than comments may not span lines
            let kind = self.kind;
            self.close(kind)?;
            self.kind = TokenKind::Text;
            self.emit_newline();
            return Ok(());
        }
        let close_length = {
            let close = self.close_sigil();
            tail.starts_with(close).then(|| close.len())
        };
        if let Some(length) = close_length {
            let kind = self.kind;
            self.close(kind)?;
            self.kind = TokenKind::Text;
            self.advance(length);
            self.begin();
            return Ok(());
        }
        self.advance_char();
        Ok(())
    }

    fn open_kind(&self, tail: &str) -> Option<(TokenKind, usize)> {
        let d = &self.delimiters;
        let sigils = [
            (&d.open_triple, TokenKind::TagLiteralTriple),
            (&d.open_section, TokenKind::SectionOpen),
            (&d.open_inverted, TokenKind::SectionOpenInverted),
            (&d.open_end, TokenKind::SectionClose),
            (&d.open_partial, TokenKind::Partial),
            (&d.open_literal, TokenKind::TagLiteral),
            (&d.open_comment, TokenKind::Comment),
            (&d.open_set, TokenKind::SetDelimiters),
            (&d.open, TokenKind::Tag),
        ];
        sigils
            .iter()
            .find(|(sigil, _)| tail.starts_with(sigil.as_str()))
            .map(|(sigil, kind)| (*kind, sigil.len()))
    }

    fn close_sigil(&self) -> &str {
        match self.kind {
            TokenKind::TagLiteralTriple => &self.delimiters.close_triple,
            TokenKind::SetDelimiters => &self.delimiters.close_set,
            _ => &self.delimiters.close,
        }
    }

    fn close(&mut self, kind: TokenKind) -> Result<(), RenderError> {
        let input = self.input;
        let span = &input[self.start..self.pos];
        if span.is_empty() {
            return Ok(());
        }
        let value = match kind {
            TokenKind::Text | TokenKind::Comment => span.to_string(),
            TokenKind::SetDelimiters => span.trim().to_string(),
            _ => span.chars().filter(|c| !matches!(c, ' ' | '\t')).collect(),
        };
        if kind == TokenKind::SetDelimiters {
            self.retarget(&value)?;
        }
        let column = self.column();
        self.tokens.push(Token::new(
            kind,
            value,
            self.token_line,
            self.token_column,
            column,
        ));
        Ok(())
    }

    fn retarget(&mut self, pair: &str) -> Result<(), RenderError> {
        let words: Vec<&str> = pair.split_whitespace().collect();
        if words.len() != 2 || words.iter().any(|word| word.contains('=')) {
            return Err(RenderError::InvalidDelimiters(pair.to_string()));
        }
        self.delimiters = Delimiters::new(words[0], words[1]);
        Ok(())
    }

    fn emit_newline(&mut self) {
        let column = self.column();
        self.tokens.push(Token::new(
            TokenKind::Newline,
            "\n".to_string(),
            self.line,
            column,
            column + 1,
        ));
        self.advance(1);
        self.line += 1;
        self.line_start = self.pos;
        self.begin();
    }

    fn begin(&mut self) {
        self.start = self.pos;
        self.token_line = self.line;
        self.token_column = self.column();
    }

    fn column(&self) -> usize {
        self.pos - self.line_start + 1
    }

    fn advance(&mut self, length: usize) {
        self.pos += length;
    }

    fn advance_char(&mut self) {
        let step = self.input[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.pos += step;
    }
}

fn check_sections(tokens: &[Token]) -> Result<(), RenderError> {
    let mut open: Vec<&Token> = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::SectionOpen | TokenKind::SectionOpenInverted => open.push(token),
            TokenKind::SectionClose => match open.pop() {
                Some(section) if section.value == token.value => {}
                Some(section) => {
                    return Err(RenderError::UnbalancedTags(format!(
                        "section {:?} opened at line {} is closed by {:?} at line {}",
                        section.value, section.line, token.value, token.line
                    )))
                }
                None => {
                    return Err(RenderError::UnbalancedTags(format!(
                        "close tag {:?} at line {} has no matching open",
                        token.value, token.line
                    )))
                }
            },
            _ => {}
        }
    }
    match open.pop() {
        Some(section) => Err(RenderError::UnbalancedTags(format!(
            "section {:?} opened at line {}, column {} is never closed",
            section.value, section.line, section.start_column
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only() {
        expect_sequence(
            " 123456 ",
            vec![(TokenKind::Text, " 123456 "), (TokenKind::Eof, "")],
        );
    }

    #[test]
    fn value_with_escape() {
        expect_sequence("{{ v }}", vec![(TokenKind::Tag, "v"), (TokenKind::Eof, "")]);
    }

    #[test]
    fn value_without_escape() {
        expect_sequence(
            "{{{ v }}}",
            vec![(TokenKind::TagLiteralTriple, "v"), (TokenKind::Eof, "")],
        );
    }

    #[test]
    fn value_with_ampersand() {
        expect_sequence(
            "{{& v }}",
            vec![(TokenKind::TagLiteral, "v"), (TokenKind::Eof, "")],
        );
    }

    #[test]
    fn section_tags() {
        expect_sequence(
            "{{#a}}x{{/a}}",
            vec![
                (TokenKind::SectionOpen, "a"),
                (TokenKind::Text, "x"),
                (TokenKind::SectionClose, "a"),
                (TokenKind::Eof, ""),
            ],
        );
    }

    #[test]
    fn inverted_section_tags() {
        expect_sequence(
            "{{^a}}{{/a}}",
            vec![
                (TokenKind::SectionOpenInverted, "a"),
                (TokenKind::SectionClose, "a"),
                (TokenKind::Eof, ""),
            ],
        );
    }

    #[test]
    fn partial_name_is_trimmed() {
        expect_sequence(
            "{{> p }}",
            vec![(TokenKind::Partial, "p"), (TokenKind::Eof, "")],
        );
    }

    #[test]
    fn dotted_name_spaces_are_stripped() {
        expect_sequence(
            "{{ a . b }}",
            vec![(TokenKind::Tag, "a.b"), (TokenKind::Eof, "")],
        );
    }

    #[test]
    fn comment_keeps_raw_value() {
        expect_sequence(
            "{{! hello }}",
            vec![(TokenKind::Comment, " hello "), (TokenKind::Eof, "")],
        );
    }

    #[test]
    fn comment_spans_lines() {
        let tokens = lex("{{! a\nb }}").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].value, " a\nb ");
        assert_eq!(tokens[0].lines(), 1..=2);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn newlines_split_text_and_count_lines() {
        let tokens = lex("a\nb").unwrap();
        let lines: Vec<(TokenKind, usize)> =
            tokens.iter().map(|t| (t.kind, t.line)).collect();
        assert_eq!(
            lines,
            vec![
                (TokenKind::Text, 1),
                (TokenKind::Newline, 1),
                (TokenKind::Text, 2),
                (TokenKind::Eof, 2),
            ]
        );
    }

    #[test]
    fn tracks_token_spans() {
        let tokens = lex("ab{{ name }}").unwrap();
        let spans: Vec<(usize, usize, usize)> = tokens
            .iter()
            .map(|t| (t.line, t.start_column, t.end_column))
            .collect();
        assert_eq!(spans, vec![(1, 1, 3), (1, 5, 11), (1, 13, 13)]);
    }

    #[test]
    fn tag_is_closed_at_end_of_line() {
        expect_sequence(
            "{{v\n}}ok",
            vec![
                (TokenKind::Tag, "v"),
                (TokenKind::Newline, "\n"),
                (TokenKind::Text, "}}ok"),
                (TokenKind::Eof, ""),
            ],
        );
    }

    #[test]
    fn single_braces_are_text() {
        expect_sequence(
            "a{b}c",
            vec![(TokenKind::Text, "a{b}c"), (TokenKind::Eof, "")],
        );
    }

    #[test]
    fn set_delimiters_retargets_the_table() {
        expect_sequence(
            "{{=| |=}}|v|",
            vec![
                (TokenKind::SetDelimiters, "| |"),
                (TokenKind::Tag, "v"),
                (TokenKind::Eof, ""),
            ],
        );
    }

    #[test]
    fn set_delimiters_values_are_trimmed() {
        expect_sequence(
            "{{= +++   --- =}}+++ v ---",
            vec![
                (TokenKind::SetDelimiters, "+++   ---"),
                (TokenKind::Tag, "v"),
                (TokenKind::Eof, ""),
            ],
        );
    }

    #[test]
    fn invalid_open_delimiter_value() {
        assert_eq!(
            lex("{{= |=   | =}}"),
            Err(RenderError::InvalidDelimiters("|=   |".to_string()))
        );
    }

    #[test]
    fn missing_close_delimiter() {
        assert!(matches!(lex("{{ v"), Err(RenderError::UnbalancedTags(_))));
    }

    #[test]
    fn unclosed_section() {
        assert!(matches!(
            lex("{{#a}}x"),
            Err(RenderError::UnbalancedTags(_))
        ));
    }

    #[test]
    fn mismatched_section_close() {
        assert!(matches!(
            lex("{{#a}}{{/b}}"),
            Err(RenderError::UnbalancedTags(_))
        ));
    }

    fn expect_sequence(input: &str, expected: Vec<(TokenKind, &str)>) {
        let tokens = lex(input).unwrap();
        let found: Vec<(TokenKind, String)> =
            tokens.iter().map(|t| (t.kind, t.value.clone())).collect();
        let expected: Vec<(TokenKind, String)> = expected
            .into_iter()
            .map(|(kind, value)| (kind, value.to_string()))
            .collect();
        assert_eq!(found, expected);
    }
}
