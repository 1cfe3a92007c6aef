//! Command resolution
//!
//! A command name is offered to each resolver in a fixed priority order:
//! built-ins, then aliases, then extension modules. The first resolver that
//! recognises the name decides the outcome.

use crate::context::DocContext;
use crate::error::CommandError;

/// Where a command appeared: the comment's position in its source unit
#[derive(Debug, Clone, Copy)]
pub struct CommentSite<'a> {
    /// Full text of the source unit
    pub src: &'a str,
    /// Byte offset just after the comment
    pub end: usize,
    /// Name of the source unit
    pub filename: &'a str,
}

impl<'a> CommentSite<'a> {
    /// Source text following the comment
    #[must_use]
    pub fn trailing(&self) -> &'a str {
        self.src.get(self.end..).unwrap_or("")
    }
}

/// One command invocation inside a documentation span
#[derive(Debug, Clone, Copy)]
pub struct CommandCall<'a> {
    /// Command name without the `@`
    pub name: &'a str,
    /// Parsed, trimmed arguments
    pub args: &'a [String],
    /// The comment the command appeared in
    pub site: CommentSite<'a>,
}

/// What a resolved command produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// Text for the active buffer
    Text(String),
    /// A synthesized pseudo-source to run back through the interpreter
    Reenter { alias: String, source: String },
    /// The command only changed state
    Done,
}

/// A source of command implementations
pub trait CommandResolver {
    /// Short name for logging
    fn kind(&self) -> &'static str;

    /// Resolve `call`, or return `None` if this resolver does not know the name.
    fn resolve(
        &mut self,
        call: &CommandCall<'_>,
        ctx: &mut DocContext,
    ) -> Option<Result<Expansion, CommandError>>;
}

/// Expands user-defined aliases.
///
/// The alias text is wrapped in a synthesized documentation comment and
/// followed by the source that trailed the original comment, up to the next
/// comment opener, so derivations inside the alias see the same code.
#[derive(Debug, Default)]
pub struct AliasResolver;

impl AliasResolver {
    /// Build the pseudo-source for an alias invoked at `site`
    #[must_use]
    pub fn synthesize(replacement: &str, site: &CommentSite<'_>) -> String {
        let trailing = site.trailing();
        let stop = [trailing.find("/*"), trailing.find("//")]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(trailing.len());
        format!("/* @DOC {replacement} @END */{}", &trailing[..stop])
    }
}

impl CommandResolver for AliasResolver {
    fn kind(&self) -> &'static str {
        "alias"
    }

    fn resolve(
        &mut self,
        call: &CommandCall<'_>,
        ctx: &mut DocContext,
    ) -> Option<Result<Expansion, CommandError>> {
        let replacement = ctx.alias(call.name)?;
        Some(Ok(Expansion::Reenter {
            alias: call.name.to_string(),
            source: Self::synthesize(replacement, &call.site),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(src: &str, end: usize) -> CommentSite<'_> {
        CommentSite {
            src,
            end,
            filename: "test.c",
        }
    }

    #[test]
    fn trailing_is_text_after_comment() {
        let src = "/* a */ int x;";
        assert_eq!(site(src, 7).trailing(), " int x;");
        assert_eq!(site(src, 99).trailing(), "");
    }

    #[test]
    fn synthesized_source_stops_at_next_comment() {
        let src = "/* @X */\nint f(int a);\n// next\nint g();";
        let source = AliasResolver::synthesize("hello", &site(src, 8));
        assert_eq!(source, "/* @DOC hello @END */\nint f(int a);\n");
    }

    #[test]
    fn synthesized_source_takes_rest_without_comments() {
        let src = "/* @X */ int v;";
        let source = AliasResolver::synthesize("@NEXT_DECL", &site(src, 8));
        assert_eq!(source, "/* @DOC @NEXT_DECL @END */ int v;");
    }

    #[test]
    fn resolves_only_registered_aliases() {
        let mut ctx = DocContext::new("docs");
        ctx.register_alias("HELLO", "hi");
        let src = "/* */";
        let mut resolver = AliasResolver;

        let call = CommandCall {
            name: "HELLO",
            args: &[],
            site: site(src, 5),
        };
        let expansion = resolver.resolve(&call, &mut ctx).unwrap().unwrap();
        assert_eq!(
            expansion,
            Expansion::Reenter {
                alias: "HELLO".into(),
                source: "/* @DOC hi @END */".into()
            }
        );

        let call = CommandCall {
            name: "OTHER",
            ..call
        };
        assert!(resolver.resolve(&call, &mut ctx).is_none());
    }
}
