//! Character stream → tokens. This stage never consults the grammar: it
//! only knows about the two delimiters (`%...%` blocks, `*`-terminated
//! commands) and line/column bookkeeping for diagnostics. Everything
//! else is the parser's job.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    ExtendedBlock,
    Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A lexical unit together with the byte it started at.
///
/// `terminated` is `false` only for the final token of a source that ends
/// mid-block or mid-command; the parser treats those as
/// [`crate::node::Node::UnknownCommand`] rather than guessing at the
/// missing half.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub position: Position,
    pub terminated: bool,
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Cursor {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next();
        if let Some(c) = c {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }
}

/// Tokenize a complete Gerber source string.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    loop {
        while matches!(cursor.peek(), Some(' ' | '\t' | '\r' | '\n')) {
            cursor.next();
        }

        let Some(c) = cursor.peek() else {
            break;
        };

        let start = cursor.position();

        if c == '%' {
            cursor.next();
            let mut value = String::new();
            let mut terminated = false;
            while let Some(c) = cursor.next() {
                if c == '%' {
                    terminated = true;
                    break;
                }
                value.push(c);
            }
            tokens.push(Token {
                kind: TokenKind::ExtendedBlock,
                value,
                position: start,
                terminated,
            });
        } else {
            let mut value = String::new();
            let mut terminated = false;
            while let Some(c) = cursor.next() {
                if c == '*' {
                    terminated = true;
                    break;
                }
                value.push(c);
            }
            tokens.push(Token {
                kind: TokenKind::Command,
                value,
                position: start,
                terminated,
            });
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_blocks_and_commands() {
        let tokens = tokenize("%FSLAX26Y26*%\nG04 hi*\nM02*");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::ExtendedBlock);
        assert_eq!(tokens[0].value, "FSLAX26Y26*");
        assert!(tokens[0].terminated);
        assert_eq!(tokens[1].kind, TokenKind::Command);
        assert_eq!(tokens[1].value, "G04 hi");
        assert_eq!(tokens[2].value, "M02");
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("M02*\nG04 x*");
        assert_eq!(tokens[0].position, Position { line: 1, column: 1 });
        assert_eq!(tokens[1].position, Position { line: 2, column: 1 });
    }

    #[test]
    fn unterminated_block_at_eof_is_flagged() {
        let tokens = tokenize("%FSLAX26Y26");
        assert_eq!(tokens.len(), 1);
        assert!(!tokens[0].terminated);
        assert_eq!(tokens[0].value, "FSLAX26Y26");
    }

    #[test]
    fn unterminated_command_at_eof_is_flagged() {
        let tokens = tokenize("M02");
        assert_eq!(tokens.len(), 1);
        assert!(!tokens[0].terminated);
    }
}
