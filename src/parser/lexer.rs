use itertools::PeekingNext;

#[derive(PartialEq, Debug)]
pub enum Token {
    Arrow,
    Or,
    // A run of non-whitespace text, split into symbols once all the
    // nonterminals are known
    Chunk(String)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_chunk_char(c: char) -> bool {
    !c.is_whitespace() && c != '|' && c != '→'
}

// Lexes a chunk of symbol text. An arrow written without surrounding
// spaces (`S->a`) ends the chunk and is returned after it.
pub fn lex_chunk(line: &mut impl PeekingNext<Item = char>) -> Vec<Token> {
    let mut text = String::new();

    while let Some(c) = line.peeking_next(|&c| is_chunk_char(c)) {
        // A lone `-` is an ordinary symbol
        if c == '-' && line.peeking_next(|&next| next == '>').is_some() {
            if text.is_empty() {
                return vec![Token::Arrow];
            }
            return vec![Token::Chunk(text), Token::Arrow];
        }
        text.push(c);
    }

    vec![Token::Chunk(text)]
}

pub fn lex_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(c) = line_chars.peek() {
        if *c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if *c == '→' {
            line_chars.next();
            tokens.push(Token::Arrow);
        } else if !c.is_whitespace() {
            tokens.extend(lex_chunk(&mut line_chars));
        } else {
            line_chars.next();
        }
    }

    return tokens;
}

fn longest_nonterminal<'a>(text: &str, nonterminals: &'a [String]) -> Option<&'a String> {
    nonterminals.iter().filter(|nonterminal| text.starts_with(nonterminal.as_str())).max_by_key(|nonterminal| nonterminal.len())
}

// Splits a chunk into grammar symbols: the longest known nonterminal at
// each position, otherwise a word (ending before a nonterminal, with an
// optional trailing prime), otherwise a single character
pub fn split_chunk(chunk: &str, nonterminals: &[String]) -> Vec<String> {
    let mut symbols = Vec::new();
    let mut rest = chunk;

    while let Some(first) = rest.chars().next() {
        let length = if let Some(nonterminal) = longest_nonterminal(rest, nonterminals) {
            nonterminal.len()
        } else if is_word_char(first) {
            let mut end = rest
                .char_indices()
                .take_while(|&(i, c)| is_word_char(c) && (i == 0 || longest_nonterminal(&rest[i..], nonterminals).is_none()))
                .map(|(i, c)| i + c.len_utf8())
                .last()
                .unwrap_or(first.len_utf8());
            if rest[end..].starts_with('\'') {
                end += 1;
            }
            end
        } else {
            first.len_utf8()
        };

        symbols.push(rest[..length].to_string());
        rest = &rest[length..];
    }

    symbols
}
