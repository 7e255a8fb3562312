use crate::lexer::{Token, TokenKind};

/// Standalone-line elision. Runs once, directly after lexing and before any
/// list expansion or partial inlining, so the classification reflects the
/// author's source layout.
pub(crate) fn analyze(tokens: &mut [Token]) {
    let last_line = tokens
        .iter()
        .map(|token| *token.lines().end())
        .max()
        .unwrap_or(0);
    for line in 1..=last_line {
        analyze_line(tokens, line);
    }
}

fn analyze_line(tokens: &mut [Token], line: usize) {
    let members: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.lines().contains(&line))
        .map(|(index, _)| index)
        .collect();

    let mut interpolation = false;
    let mut partials = 0usize;
    let mut structural = 0usize;
    let mut blank = true;
    for &index in &members {
        match tokens[index].kind {
            TokenKind::Tag | TokenKind::TagLiteral | TokenKind::TagLiteralTriple => {
                interpolation = true
            }
            TokenKind::Partial => partials += 1,
            TokenKind::SectionOpen
            | TokenKind::SectionOpenInverted
            | TokenKind::SectionClose
            | TokenKind::Comment
            | TokenKind::SetDelimiters => structural += 1,
            TokenKind::Text => blank = blank && tokens[index].is_blank_text(),
            _ => {}
        }
    }
    if interpolation || !blank {
        return;
    }
    if structural + partials > 0 {
        for &index in &members {
            if tokens[index].kind == TokenKind::Newline {
                tokens[index].kind = TokenKind::Skip;
            }
        }
    }
    if structural == 1 && partials == 0 {
        for &index in &members {
            if tokens[index].kind == TokenKind::Text {
                tokens[index].kind = TokenKind::Skip;
            }
        }
    }
    if structural == 0 && partials == 1 {
        for &index in &members {
            if tokens[index].kind == TokenKind::Partial {
                tokens[index].standalone = true;
            }
        }
    }
}
