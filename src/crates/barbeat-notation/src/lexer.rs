use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Byte range of a token in the notation text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span {
            start: range.start,
            end: range.end,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Token classes of bar|beat notation.
///
/// Tokens are whitespace separated and classified by their leading sigil or
/// shape only; the contents are validated by the interpreter so errors can
/// name the exact token that failed.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    /// `v80`, `v80-100`
    #[regex(r"v[^ \t\r\n\f]*", priority = 10)]
    Velocity,

    /// `t2`, `t/4`, `t1:2`
    #[regex(r"t[^ \t\r\n\f]*", priority = 11)]
    Duration,

    /// `p0.5`
    #[regex(r"p[^ \t\r\n\f]*", priority = 12)]
    Probability,

    /// `C3`, `Gb1`, `F#-1`
    #[regex(r"[A-Ga-g][#b]?-?[0-9]+", priority = 13)]
    Pitch,

    /// `1|1`, `2|1,2.5`, `1|1x16@/2`
    #[regex(r"-?[0-9]+\|[^ \t\r\n\f]*", priority = 14)]
    Position,

    /// `1:2` where a position was expected
    #[regex(r"-?[0-9]+:[^ \t\r\n\f]*", priority = 15)]
    ColonPosition,

    #[regex(r"[^ \t\r\n\f]+", priority = 1)]
    Unknown,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Velocity => write!(f, "velocity"),
            Token::Duration => write!(f, "duration"),
            Token::Probability => write!(f, "probability"),
            Token::Pitch => write!(f, "pitch"),
            Token::Position => write!(f, "position"),
            Token::ColonPosition => write!(f, "position"),
            Token::Unknown => write!(f, "unknown"),
        }
    }
}

/// Lexer wrapper yielding tokens with their spans
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Lexer {
            inner: Token::lexer(source),
        }
    }

    pub fn source(&self) -> &'source str {
        self.inner.source()
    }

    pub fn slice(&self, span: Span) -> &'source str {
        &self.source()[span.start..span.end]
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = (Token, Span);

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.inner.next()?;
        let span = Span::from(self.inner.span());
        Some((token.unwrap_or(Token::Unknown), span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Lexer::new(input).map(|(token, _)| token).collect()
    }

    #[test]
    fn test_lex_state_tokens() {
        assert_eq!(
            lex("v80 v80-100 t/2 t1:2 p0.8"),
            vec![
                Token::Velocity,
                Token::Velocity,
                Token::Duration,
                Token::Duration,
                Token::Probability
            ]
        );
    }

    #[test]
    fn test_lex_pitches_and_positions() {
        assert_eq!(
            lex("C3 Gb1 f#-1 1|1 2|1,2.5 1|1x16@/2"),
            vec![
                Token::Pitch,
                Token::Pitch,
                Token::Pitch,
                Token::Position,
                Token::Position,
                Token::Position
            ]
        );
    }

    #[test]
    fn test_lex_bad_shapes() {
        assert_eq!(lex("1:1"), vec![Token::ColonPosition]);
        assert_eq!(lex("C3x"), vec![Token::Unknown]);
        assert_eq!(lex("hello"), vec![Token::Unknown]);
        assert_eq!(lex("-1|1"), vec![Token::Position]);
    }

    #[test]
    fn test_lex_whitespace_and_slices() {
        let input = "  v80\n\tC3   1|1 ";
        let lexer = Lexer::new(input);
        let slices: Vec<&str> = Lexer::new(input).map(|(_, span)| lexer.slice(span)).collect();
        assert_eq!(slices, vec!["v80", "C3", "1|1"]);
    }
}
