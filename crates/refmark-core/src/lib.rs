//! Incremental recognition of CommonMark link reference definitions.
//!
//! A link reference definition (`[label]: destination "title"`) may only
//! appear at the beginning of a paragraph, and may span several lines. Block
//! parsers see one line at a time and cannot re-read earlier lines, so this
//! crate provides a small state machine, [`LinkReferenceDefinitionParser`],
//! that is fed lines in order and decides incrementally whether the block is
//! still a run of definitions or has turned into ordinary paragraph text.
//!
//! ```
//! use refmark_core::LinkReferenceDefinitionParser;
//!
//! let mut parser = LinkReferenceDefinitionParser::new();
//! parser.parse_line("[foo]: /url \"title\"");
//! parser.parse_line("paragraph text");
//!
//! let definitions = parser.definitions();
//! assert_eq!(definitions.len(), 1);
//! assert_eq!(definitions[0].label(), "foo");
//! assert_eq!(definitions[0].destination(), "/url");
//! assert_eq!(parser.paragraph_lines(), ["paragraph text"]);
//! ```

mod definition;
mod definition_parser;
mod entities;
mod label;
mod link_scanner;
mod scanner;

pub use definition::LinkReferenceDefinition;
pub use definition_parser::LinkReferenceDefinitionParser;
pub use label::{normalize_label, unescape};
pub use link_scanner::{scan_link_destination, scan_link_label_content, scan_link_title_content};
pub use scanner::{Position, Scanner};
