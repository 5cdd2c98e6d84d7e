use std::mem;

use log::trace;

use crate::definition::LinkReferenceDefinition;
use crate::label::{normalize_label, unescape};
use crate::link_scanner::{scan_link_destination, scan_link_label_content, scan_link_title_content};
use crate::scanner::Scanner;

// A link label can have at most this many characters between the brackets.
const MAX_LABEL_LENGTH: usize = 999;

/// Recognizes link reference definitions at the beginning of a paragraph.
///
/// The enclosing block parser creates one instance per candidate paragraph,
/// calls [`parse_line`](Self::parse_line) for every line of the block in
/// order, and reads the two outputs when the block ends: the recognized
/// [`definitions`](Self::definitions) and the
/// [`paragraph_lines`](Self::paragraph_lines) left over as ordinary text.
///
/// Definitions may span lines (both the label and the title can continue
/// across a line break), so a line on its own is often not enough to decide
/// anything; the parser carries the undecided lines until a definition either
/// completes or fails. One malformed line demotes this and every following
/// line to paragraph text, while definitions completed before that point are
/// kept.
#[derive(Debug, Default)]
pub struct LinkReferenceDefinitionParser {
    stage: Stage,
    pending: Option<PendingDefinition>,
    paragraph_lines: Vec<String>,
    definitions: Vec<LinkReferenceDefinition>,
}

/// Recognition stage, carrying only the scratch data that stage needs.
#[derive(Debug, Default)]
enum Stage {
    /// Looking for the `[` that starts a definition.
    #[default]
    StartDefinition,
    /// Inside the label; `label` accumulates raw content, `\n` marking each
    /// line break the label runs across.
    Label { label: String },
    /// Label closed with `]:`; looking for the destination. `label` is the
    /// normalized lookup key.
    Destination { label: String },
    /// Destination consumed; looking for an optional title (or the next
    /// definition).
    StartTitle,
    /// Inside a title delimited by `delimiter`.
    Title { title: String, delimiter: char },
    /// Terminal: the remaining lines are ordinary paragraph text.
    Paragraph,
}

/// A definition whose label and destination are known. `valid` means it can
/// be committed as-is even if a title that follows never parses.
#[derive(Debug)]
struct PendingDefinition {
    label: String,
    destination: String,
    title: Option<String>,
    valid: bool,
}

impl LinkReferenceDefinitionParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next line of the block, without its line terminator.
    pub fn parse_line(&mut self, line: &str) {
        self.paragraph_lines.push(line.to_string());
        if matches!(self.stage, Stage::Paragraph) {
            // Definitions can only appear at the beginning of the block; once
            // we are in a paragraph there is no going back.
            return;
        }

        let mut scanner = Scanner::new(line);
        while scanner.has_next() {
            // The stage is taken by value so handlers own their scratch; on
            // failure the placeholder is already the terminal stage.
            let next = match mem::replace(&mut self.stage, Stage::Paragraph) {
                Stage::StartDefinition => self.start_definition(&mut scanner),
                Stage::Label { label } => self.label(&mut scanner, label),
                Stage::Destination { label } => self.destination(&mut scanner, label),
                Stage::StartTitle => self.start_title(&mut scanner),
                Stage::Title { title, delimiter } => self.title(&mut scanner, title, delimiter),
                Stage::Paragraph => return,
            };
            match next {
                Some(stage) => self.stage = stage,
                None => {
                    trace!("line is not part of a definition, block is a paragraph");
                    return;
                }
            }
        }
    }

    /// The recognized definitions in input order, committing any reference
    /// that is complete but still waiting for an optional title.
    pub fn definitions(&mut self) -> &[LinkReferenceDefinition] {
        self.finish_reference();
        &self.definitions
    }

    /// The lines that are ordinary paragraph content, in input order.
    pub fn paragraph_lines(&self) -> &[String] {
        &self.paragraph_lines
    }

    fn start_definition(&mut self, scanner: &mut Scanner) -> Option<Stage> {
        scanner.whitespace();
        if !scanner.advance_if('[') {
            return None;
        }
        let mut label = String::new();
        if !scanner.has_next() {
            label.push('\n');
        }
        Some(Stage::Label { label })
    }

    fn label(&mut self, scanner: &mut Scanner, mut label: String) -> Option<Stage> {
        let start = scanner.position();
        if !scan_link_label_content(scanner) {
            return None;
        }
        label.push_str(scanner.text_between(start, scanner.position()));

        if !scanner.has_next() {
            // The label might continue on the next line.
            label.push('\n');
            return Some(Stage::Label { label });
        }
        if !scanner.advance_if(']') || !scanner.advance_if(':') {
            return None;
        }
        if label.chars().count() > MAX_LABEL_LENGTH {
            return None;
        }
        let normalized = normalize_label(&label);
        if normalized.is_empty() {
            return None;
        }
        scanner.whitespace();
        Some(Stage::Destination { label: normalized })
    }

    fn destination(&mut self, scanner: &mut Scanner, label: String) -> Option<Stage> {
        scanner.whitespace();
        let start = scanner.position();
        if !scan_link_destination(scanner) {
            return None;
        }
        let raw = scanner.text_between(start, scanner.position());
        let destination = raw
            .strip_prefix('<')
            .and_then(|inner| inner.strip_suffix('>'))
            .unwrap_or(raw)
            .to_string();

        let whitespace = scanner.whitespace();
        if !scanner.has_next() {
            // Destination at end of line: already a valid reference, and the
            // lines so far belong to it, not to the paragraph. A title may
            // still follow on the next line.
            self.pending = Some(PendingDefinition {
                label,
                destination,
                title: None,
                valid: true,
            });
            self.paragraph_lines.clear();
        } else if whitespace == 0 {
            // The title must be separated from the destination by whitespace.
            return None;
        } else {
            self.pending = Some(PendingDefinition {
                label,
                destination,
                title: None,
                valid: false,
            });
        }
        Some(Stage::StartTitle)
    }

    fn start_title(&mut self, scanner: &mut Scanner) -> Option<Stage> {
        scanner.whitespace();
        let Some(c) = scanner.peek() else {
            // Nothing but whitespace left. A title can no longer follow (the
            // next line starts over at a new definition), so commit what we
            // have instead of letting a later definition overwrite it.
            self.finish_reference();
            return Some(Stage::StartDefinition);
        };
        let delimiter = match c {
            '"' | '\'' => c,
            '(' => ')',
            _ => {
                // No title here. Commit what we have; the same character may
                // start another definition.
                self.finish_reference();
                return Some(Stage::StartDefinition);
            }
        };
        scanner.advance();
        let mut title = String::new();
        if !scanner.has_next() {
            title.push('\n');
        }
        Some(Stage::Title { title, delimiter })
    }

    fn title(&mut self, scanner: &mut Scanner, mut title: String, delimiter: char) -> Option<Stage> {
        let start = scanner.position();
        if !scan_link_title_content(scanner, delimiter) {
            return None;
        }
        title.push_str(scanner.text_between(start, scanner.position()));

        if !scanner.has_next() {
            // Delimiter not reached yet; the title continues on the next line.
            title.push('\n');
            return Some(Stage::Title { title, delimiter });
        }
        scanner.advance();
        scanner.whitespace();
        if scanner.has_next() {
            // No further non-whitespace characters may occur after the title.
            return None;
        }
        let Some(pending) = self.pending.as_mut() else {
            debug_assert!(false, "title stage without a pending definition");
            return None;
        };
        pending.title = Some(title);
        pending.valid = true;
        self.finish_reference();
        self.paragraph_lines.clear();
        Some(Stage::StartDefinition)
    }

    /// Commits the pending reference, if there is one and it is valid. Called
    /// both when the input makes the end of a definition certain and when the
    /// block ends with a definition still waiting for an optional title.
    fn finish_reference(&mut self) {
        let Some(pending) = self.pending.take_if(|p| p.valid) else {
            return;
        };
        trace!("finished definition for label {:?}", pending.label);
        let destination = unescape(&pending.destination);
        let title = pending.title.as_deref().map(unescape);
        self.definitions
            .push(LinkReferenceDefinition::new(pending.label, destination, title));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(label: &str, destination: &str, title: Option<&str>) -> LinkReferenceDefinition {
        LinkReferenceDefinition::new(
            label.to_string(),
            destination.to_string(),
            title.map(str::to_string),
        )
    }

    fn parse(lines: &[&str]) -> LinkReferenceDefinitionParser {
        let mut parser = LinkReferenceDefinitionParser::new();
        for line in lines {
            parser.parse_line(line);
        }
        parser
    }

    #[test]
    fn single_line_definition() {
        let mut parser = parse(&["[foo]: /url \"title\""]);
        assert_eq!(parser.definitions(), [def("foo", "/url", Some("title"))]);
        assert!(parser.paragraph_lines().is_empty());
    }

    #[test]
    fn definition_without_title() {
        let mut parser = parse(&["[foo]: /url"]);
        assert_eq!(parser.definitions(), [def("foo", "/url", None)]);
        assert!(parser.paragraph_lines().is_empty());
    }

    #[test]
    fn label_and_destination_span_lines() {
        let mut parser = parse(&["[foo]:", " /url"]);
        assert_eq!(parser.definitions(), [def("foo", "/url", None)]);
        assert!(parser.paragraph_lines().is_empty());
    }

    #[test]
    fn multi_line_label() {
        let mut parser = parse(&["[two", "lines]: /url"]);
        assert_eq!(parser.definitions(), [def("two lines", "/url", None)]);
    }

    #[test]
    fn title_spans_lines() {
        let mut parser = parse(&["[foo]: /url \"two", "lines\""]);
        assert_eq!(
            parser.definitions(),
            [def("foo", "/url", Some("two\nlines"))]
        );
        assert!(parser.paragraph_lines().is_empty());
    }

    #[test]
    fn title_on_its_own_line() {
        let mut parser = parse(&["[foo]: /url", "\"title\""]);
        assert_eq!(parser.definitions(), [def("foo", "/url", Some("title"))]);
        assert!(parser.paragraph_lines().is_empty());
    }

    #[test]
    fn destination_only_reference_then_paragraph() {
        let mut parser = parse(&["[foo]: /url", "bar"]);
        assert_eq!(parser.definitions(), [def("foo", "/url", None)]);
        assert_eq!(parser.paragraph_lines(), ["bar"]);
    }

    #[test]
    fn two_definitions_in_order() {
        let mut parser = parse(&["[a]: /a", "[b]: /b"]);
        assert_eq!(
            parser.definitions(),
            [def("a", "/a", None), def("b", "/b", None)]
        );
        assert!(parser.paragraph_lines().is_empty());
    }

    #[test]
    fn plain_paragraph_keeps_all_lines() {
        let mut parser = parse(&["just some", "text"]);
        assert!(parser.definitions().is_empty());
        assert_eq!(parser.paragraph_lines(), ["just some", "text"]);
    }

    #[test]
    fn once_paragraph_always_paragraph() {
        let mut parser = parse(&["oops", "[foo]: /url"]);
        assert!(parser.definitions().is_empty());
        assert_eq!(parser.paragraph_lines(), ["oops", "[foo]: /url"]);
    }

    #[test]
    fn label_is_normalized() {
        let mut parser = parse(&["[ Foo  Bar ]: /url"]);
        assert_eq!(parser.definitions(), [def("foo bar", "/url", None)]);
    }

    #[test]
    fn empty_label_fails() {
        let mut parser = parse(&["[ ]: /url"]);
        assert!(parser.definitions().is_empty());
        assert_eq!(parser.paragraph_lines(), ["[ ]: /url"]);
    }

    #[test]
    fn label_longer_than_999_chars_fails() {
        let line = format!("[{}]: /url", "a".repeat(1000));
        let mut parser = parse(&[line.as_str()]);
        assert!(parser.definitions().is_empty());
        assert_eq!(parser.paragraph_lines(), [line]);
    }

    #[test]
    fn label_of_exactly_999_chars_passes() {
        let line = format!("[{}]: /url", "a".repeat(999));
        let mut parser = parse(&[line.as_str()]);
        assert_eq!(parser.definitions().len(), 1);
    }

    #[test]
    fn angle_bracket_destination_is_stripped() {
        let mut parser = parse(&["[foo]: <my url> 'title'"]);
        assert_eq!(parser.definitions(), [def("foo", "my url", Some("title"))]);
    }

    #[test]
    fn escapes_resolve_exactly_once() {
        let mut parser = parse(&["[foo]: /url\\*end \"ti\\\"tle\""]);
        assert_eq!(
            parser.definitions(),
            [def("foo", "/url*end", Some("ti\"tle"))]
        );
    }

    #[test]
    fn entities_resolve_in_destination_and_title() {
        let mut parser = parse(&["[foo]: /url?a=b&amp;c=d \"x &auml; y\""]);
        assert_eq!(
            parser.definitions(),
            [def("foo", "/url?a=b&c=d", Some("x ä y"))]
        );
    }

    #[test]
    fn missing_whitespace_before_title_fails() {
        let mut parser = parse(&["[foo]: <bar>(baz)"]);
        assert!(parser.definitions().is_empty());
        assert_eq!(parser.paragraph_lines(), ["[foo]: <bar>(baz)"]);
    }

    #[test]
    fn quotes_can_be_part_of_a_plain_destination() {
        // Only whitespace ends a plain destination, so the quote runs into it
        // and no title is seen.
        let mut parser = parse(&["[foo]: /url\"title\""]);
        assert_eq!(parser.definitions(), [def("foo", "/url\"title\"", None)]);
    }

    #[test]
    fn garbage_after_title_invalidates_the_whole_line() {
        // The reference never became valid (the title candidate started on
        // the same line), so nothing is committed.
        let mut parser = parse(&["[foo]: /url \"title\" extra"]);
        assert!(parser.definitions().is_empty());
        assert_eq!(parser.paragraph_lines(), ["[foo]: /url \"title\" extra"]);
    }

    #[test]
    fn failed_next_line_title_keeps_valid_reference() {
        // The destination-only reference was valid at the end of the first
        // line; the bad title line is paragraph text.
        let mut parser = parse(&["[foo]: /url", "\"title\" extra"]);
        assert_eq!(parser.definitions(), [def("foo", "/url", None)]);
        assert_eq!(parser.paragraph_lines(), ["\"title\" extra"]);
    }

    #[test]
    fn unclosed_title_at_block_end_commits_without_title() {
        let mut parser = parse(&["[foo]: /url", "\"never closed"]);
        assert_eq!(parser.definitions(), [def("foo", "/url", None)]);
        assert_eq!(parser.paragraph_lines(), ["\"never closed"]);
    }

    #[test]
    fn definition_then_paragraph_on_shared_line_start() {
        // `(` opens a title candidate; since the title never closes before
        // the block ends, the second line stays paragraph text.
        let mut parser = parse(&["[foo]: /url", "(not a title"]);
        assert_eq!(parser.definitions(), [def("foo", "/url", None)]);
        assert_eq!(parser.paragraph_lines(), ["(not a title"]);
    }

    #[test]
    fn definitions_flush_is_idempotent() {
        let mut parser = parse(&["[foo]: /url"]);
        assert_eq!(parser.definitions().len(), 1);
        assert_eq!(parser.definitions().len(), 1);
    }

    #[test]
    fn definition_followed_by_new_definition_on_next_line_start() {
        // After `[foo]: /url`, the `[` on the next line is not a title
        // delimiter: foo is committed and a second definition starts.
        let mut parser = parse(&["[foo]: /url", "[bar]: /other \"t\""]);
        assert_eq!(
            parser.definitions(),
            [def("foo", "/url", None), def("bar", "/other", Some("t"))]
        );
        assert!(parser.paragraph_lines().is_empty());
    }

    #[test]
    fn leading_whitespace_is_allowed() {
        let mut parser = parse(&["   [foo]: /url"]);
        assert_eq!(parser.definitions(), [def("foo", "/url", None)]);
    }

    #[test]
    fn bracket_in_label_fails() {
        let mut parser = parse(&["[foo[bar]: /url"]);
        assert!(parser.definitions().is_empty());
        assert_eq!(parser.paragraph_lines(), ["[foo[bar]: /url"]);
    }

    #[test]
    fn paren_title_closes_at_first_close_paren() {
        let mut parser = parse(&["[foo]: /url (title)"]);
        assert_eq!(parser.definitions(), [def("foo", "/url", Some("title"))]);
    }

    #[test]
    fn definition_survives_later_junk() {
        let mut parser = parse(&["[a]: /a", "[b]: junk [", "more text"]);
        assert_eq!(parser.definitions(), [def("a", "/a", None)]);
        assert_eq!(parser.paragraph_lines(), ["[b]: junk [", "more text"]);
    }
}
