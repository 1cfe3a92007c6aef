//! Line-oriented template reader
//!
//! A template is Markdown with embedded orchestration commands. A line that
//! starts with `@@` opens a command; a second `@@` on the same line closes it.
//! Without one, the command continues over the following lines up to a line
//! starting with `@@`, whose remainder also belongs to the command.

use crate::args::split_args;

/// Command marker
pub const MARKER: &str = "@@";

/// One piece of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateItem<'a> {
    /// A literal line, without its line terminator
    Literal(&'a str),
    /// An orchestration command
    Command(TemplateCommand),
}

/// The raw text of one orchestration command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCommand {
    /// Command text between the markers, lines joined with `\n`
    pub text: String,
    /// 1-based line of the opening marker
    pub line: usize,
    /// False if the file ended before a closing marker
    pub closed: bool,
}

/// A command split into its name and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Split command text into its name and arguments. Without a `(` the whole
/// trimmed text is the name.
#[must_use]
pub fn parse_command(text: &str) -> ParsedCommand {
    let text = text.trim();
    match text.find('(') {
        Some(open) => ParsedCommand {
            name: text[..open].trim().to_string(),
            args: split_args(text, open).args,
        },
        None => ParsedCommand {
            name: text.to_string(),
            args: Vec::new(),
        },
    }
}

/// Split a template into literal lines and commands, in order.
#[must_use]
pub fn parse_template(text: &str) -> Vec<TemplateItem<'_>> {
    let mut items = Vec::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let Some(rest) = line.strip_prefix(MARKER) else {
            items.push(TemplateItem::Literal(line));
            continue;
        };

        if let Some(close) = rest.find(MARKER) {
            items.push(TemplateItem::Command(TemplateCommand {
                text: rest[..close].to_string(),
                line: index + 1,
                closed: true,
            }));
            continue;
        }

        let mut text = rest.to_string();
        let mut closed = false;
        for (_, next) in lines.by_ref() {
            text.push('\n');
            if let Some(tail) = next.strip_prefix(MARKER) {
                text.push_str(tail);
                closed = true;
                break;
            }
            text.push_str(next);
        }

        items.push(TemplateItem::Command(TemplateCommand {
            text,
            line: index + 1,
            closed,
        }));
    }

    items
}
