use crate::scanner::Scanner;

// Parentheses in a plain destination must balance, with a depth cap to keep
// pathological inputs cheap.
const MAX_PAREN_DEPTH: usize = 32;

fn is_escapable(c: char) -> bool {
    c.is_ascii_punctuation()
}

fn skip_escape(scanner: &mut Scanner) {
    scanner.advance();
    if scanner.peek().is_some_and(is_escapable) {
        scanner.advance();
    }
}

/// Consumes the inner content of a link label, stopping in front of an
/// unescaped `]`. Running off the end of the line is also a match: the label
/// may continue on the next line.
pub fn scan_link_label_content(scanner: &mut Scanner) -> bool {
    while let Some(c) = scanner.peek() {
        match c {
            '\\' => skip_escape(scanner),
            ']' => return true,
            '[' => return false,
            _ => {
                scanner.advance();
            }
        }
    }
    true
}

/// Consumes a link destination, either `<...>` delimited or a run of
/// non-whitespace characters with balanced parentheses.
pub fn scan_link_destination(scanner: &mut Scanner) -> bool {
    if !scanner.has_next() {
        return false;
    }
    if scanner.advance_if('<') {
        while let Some(c) = scanner.peek() {
            match c {
                '\\' => skip_escape(scanner),
                '<' => return false,
                '>' => {
                    scanner.advance();
                    return true;
                }
                _ => {
                    scanner.advance();
                }
            }
        }
        // No closing `>` on this line; bracketed destinations cannot continue.
        false
    } else {
        scan_destination_with_balanced_parens(scanner)
    }
}

fn scan_destination_with_balanced_parens(scanner: &mut Scanner) -> bool {
    let mut parens = 0usize;
    let mut empty = true;
    while let Some(c) = scanner.peek() {
        match c {
            ' ' | '\t' => break,
            '\\' => skip_escape(scanner),
            '(' => {
                parens += 1;
                if parens > MAX_PAREN_DEPTH {
                    return false;
                }
                scanner.advance();
            }
            ')' => {
                // A close paren at depth zero ends the destination without
                // being part of it.
                if parens == 0 {
                    break;
                }
                parens -= 1;
                scanner.advance();
            }
            c if c.is_ascii_control() => break,
            _ => {
                scanner.advance();
            }
        }
        empty = false;
    }
    !empty && parens == 0
}

/// Consumes the inner content of a link title, stopping in front of the
/// unescaped closing `delimiter`. Running off the end of the line is a match:
/// the title may continue on the next line.
pub fn scan_link_title_content(scanner: &mut Scanner, delimiter: char) -> bool {
    while let Some(c) = scanner.peek() {
        if c == '\\' {
            skip_escape(scanner);
        } else if c == delimiter {
            return true;
        } else if delimiter == ')' && c == '(' {
            // An unescaped `(` inside a paren-delimited title is invalid; the
            // first unescaped `)` closes, there is no nesting.
            return false;
        } else {
            scanner.advance();
        }
    }
    true
}
