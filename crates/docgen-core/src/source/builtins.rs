//! Built-in in-comment commands
//!
//! Every derivation reads the source text *after* the comment, never the
//! comment itself. The scans are purely lexical: they look for brackets,
//! separators, and identifier characters without understanding the grammar of
//! the documented language.

use std::path::Path;

use crate::args::split_args;
use crate::context::DocContext;
use crate::error::CommandError;
use crate::text::{is_ident_byte, unquote};

use super::resolver::{CommandCall, CommandResolver, Expansion};

/// Names handled by [`Builtins`], checked before aliases and extensions
pub const BUILTIN_COMMANDS: &[&str] = &[
    "SECTION",
    "NEXT_LINE",
    "FUNC_NAME",
    "NEXT_DECL",
    "FUNC_RET",
    "FUNC_ARGS",
    "FUNC_ARG",
    "CLASS_NAME",
    "NEXT_MACRO",
    "FILE_NAME",
];

/// Names the interpreter itself handles and that can never be redefined
pub const RESERVED_COMMANDS: &[&str] = &["DOC", "END", "SIMPLIFY", "S"];

/// Returns true if `name` can never reach an alias or extension
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_COMMANDS.contains(&name) || RESERVED_COMMANDS.contains(&name)
}

/// The built-in command table
#[derive(Debug, Default)]
pub struct Builtins;

impl CommandResolver for Builtins {
    fn kind(&self) -> &'static str {
        "builtin"
    }

    fn resolve(
        &mut self,
        call: &CommandCall<'_>,
        ctx: &mut DocContext,
    ) -> Option<Result<Expansion, CommandError>> {
        let src = call.site.src;
        let end = call.site.end;

        let text = match call.name {
            "SECTION" => return Some(select_section(call.args, ctx)),
            "FUNC_ARG" => return Some(func_arg_command(call.args, src, end).map(Expansion::Text)),
            "NEXT_LINE" => next_line(src, end),
            "FUNC_NAME" => func_name(src, end),
            "NEXT_DECL" => next_decl(src, end),
            "FUNC_RET" => func_ret(src, end),
            "FUNC_ARGS" => func_args(src, end),
            "CLASS_NAME" => class_name(src, end),
            "NEXT_MACRO" => next_macro(src, end),
            "FILE_NAME" => file_name(call.site.filename),
            _ => return None,
        };
        Some(Ok(Expansion::Text(text)))
    }
}

fn select_section(args: &[String], ctx: &mut DocContext) -> Result<Expansion, CommandError> {
    match args {
        [] => ctx.select_section(None),
        [name] => ctx.select_section(Some(unquote(name).to_string())),
        _ => {
            return Err(CommandError::argument_count(
                "SECTION",
                "0 or 1 arguments",
                args.len(),
            ))
        }
    }
    Ok(Expansion::Done)
}

fn func_arg_command(args: &[String], src: &str, end: usize) -> Result<String, CommandError> {
    let [index] = args else {
        return Err(CommandError::argument_count("FUNC_ARG", "1 argument", args.len()));
    };
    let index: i64 = index
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| CommandError::InvalidArgument {
            command: "FUNC_ARG".to_string(),
            value: index.clone(),
            reason: e.to_string(),
        })?;
    func_arg(src, end, index)
}

/// Offset of the first `target` at or after `from`, or the text length
fn find_byte(bytes: &[u8], from: usize, target: u8) -> usize {
    find_any(bytes, from, &[target])
}

/// Offset of the first of `targets` at or after `from`, or the text length
fn find_any(bytes: &[u8], from: usize, targets: &[u8]) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.iter().position(|b| targets.contains(b)))
        .map_or(bytes.len(), |p| from + p)
}

/// The rest of the line after the comment. For a line comment (whose end is
/// its own newline) this is the following line.
#[must_use]
pub fn next_line(src: &str, end: usize) -> String {
    let bytes = src.as_bytes();
    let start = end.min(bytes.len());
    let from = if bytes.get(start) == Some(&b'\n') {
        start + 1
    } else {
        start
    };
    let stop = find_byte(bytes, from, b'\n');
    src[start..stop].trim().to_string()
}

/// The identifier before the first `(` after the comment.
///
/// `operator==(` yields `operator==` and `operator()(` yields `operator()`.
#[must_use]
pub fn func_name(src: &str, end: usize) -> String {
    let bytes = src.as_bytes();
    let floor = end.min(bytes.len());
    let open = find_byte(bytes, floor, b'(');
    if open == bytes.len() {
        return String::new();
    }

    let mut stop = open;
    while stop > floor && !is_ident_byte(bytes[stop - 1]) {
        stop -= 1;
    }
    let mut start = stop;
    while start > floor && is_ident_byte(bytes[start - 1]) {
        start -= 1;
    }

    let name = &src[start..stop];
    if name != "operator" {
        return name.to_string();
    }

    if src[stop..].trim_start().starts_with("()") {
        return "operator()".to_string();
    }
    let paren = find_byte(bytes, stop, b'(');
    src[start..paren].trim().to_string()
}

/// Everything up to the first `;`, `=`, or `{`, terminated with `;`.
#[must_use]
pub fn next_decl(src: &str, end: usize) -> String {
    let bytes = src.as_bytes();
    let start = end.min(bytes.len());
    let stop = find_any(bytes, start, b";={");
    format!("{};", src[start..stop].trim())
}

/// The tokens before the function name, e.g. `static int` for
/// `static int count(void)`.
#[must_use]
pub fn func_ret(src: &str, end: usize) -> String {
    let bytes = src.as_bytes();
    let start = end.min(bytes.len());
    let mut stop = find_byte(bytes, start, b'(');

    while stop > start && bytes[stop - 1].is_ascii_whitespace() {
        stop -= 1;
    }
    while stop > start && !bytes[stop - 1].is_ascii_whitespace() {
        stop -= 1;
    }
    src[start..stop].trim().to_string()
}

/// Locate the parameter list of the next function: the first `(` after the comment.
fn param_list_open(src: &str, end: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let open = find_byte(bytes, end.min(bytes.len()), b'(');
    (open < bytes.len()).then_some(open)
}

/// The full parameter list text between the balanced brackets.
#[must_use]
pub fn func_args(src: &str, end: usize) -> String {
    param_list_open(src, end)
        .map(|open| split_args(src, open).inner(src, open).trim().to_string())
        .unwrap_or_default()
}

/// One parameter of the next function; negative indices count from the end.
pub fn func_arg(src: &str, end: usize, index: i64) -> Result<String, CommandError> {
    let params = param_list_open(src, end)
        .map(|open| split_args(src, open).args)
        .unwrap_or_default();

    let count = params.len();
    let resolved = if index < 0 {
        i64::try_from(count).ok().map(|n| n + index)
    } else {
        Some(index)
    };

    resolved
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| params.get(i))
        .cloned()
        .ok_or(CommandError::ArgumentOutOfRange { index, count })
}

/// The last identifier before the first `{`, `:`, or `;`.
#[must_use]
pub fn class_name(src: &str, end: usize) -> String {
    let bytes = src.as_bytes();
    let start = end.min(bytes.len());
    let mut stop = find_any(bytes, start, b"{:;");

    while stop > start && bytes[stop - 1].is_ascii_whitespace() {
        stop -= 1;
    }
    let mut begin = stop;
    while begin > start && is_ident_byte(bytes[begin - 1]) {
        begin -= 1;
    }
    src[begin..stop].to_string()
}

/// The next preprocessor directive through its first `)`. Object-like macros
/// (no `)` on the directive's line) yield the directive and the macro name.
#[must_use]
pub fn next_macro(src: &str, end: usize) -> String {
    let bytes = src.as_bytes();
    let hash = find_byte(bytes, end.min(bytes.len()), b'#');
    if hash == bytes.len() {
        return String::new();
    }
    let line_end = find_byte(bytes, hash, b'\n');

    match bytes[hash..line_end].iter().position(|&b| b == b')') {
        Some(p) => src[hash..=hash + p].trim().to_string(),
        None => src[hash..line_end]
            .split_whitespace()
            .take(2)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// The base name of the source file
#[must_use]
pub fn file_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map_or_else(|| filename.to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::resolver::CommentSite;

    /// Offset just after the first comment in `src`
    fn after_comment(src: &str) -> usize {
        crate::comment::extract_comments(src)[0].end()
    }

    #[test]
    fn next_line_after_line_comment() {
        let src = "// doc\nint counter = 0;\nint other;";
        assert_eq!(next_line(src, after_comment(src)), "int counter = 0;");
    }

    #[test]
    fn next_line_after_block_comment_on_same_line() {
        let src = "/* doc */ int x; // trailing\nint y;";
        assert_eq!(next_line(src, after_comment(src)), "int x; // trailing");
    }

    #[test]
    fn next_line_at_end_of_text() {
        let src = "// doc";
        assert_eq!(next_line(src, after_comment(src)), "");
    }

    #[test]
    fn func_name_finds_identifier_before_paren() {
        let src = "// doc\nstatic int compute_total (const int *xs, int n);";
        assert_eq!(func_name(src, after_comment(src)), "compute_total");
    }

    #[test]
    fn func_name_operator_overloads() {
        let src = "// doc\nbool operator==(const Vec &o) const;";
        assert_eq!(func_name(src, after_comment(src)), "operator==");

        let src = "// doc\nint operator()(int x);";
        assert_eq!(func_name(src, after_comment(src)), "operator()");
    }

    #[test]
    fn next_decl_stops_at_separator() {
        let src = "// doc\nconst int LIMIT = 10;";
        assert_eq!(next_decl(src, after_comment(src)), "const int LIMIT;");

        let src = "/* doc */\nstruct Point {\n int x;\n};";
        assert_eq!(next_decl(src, after_comment(src)), "struct Point;");

        let src = "// doc\nvoid run(void);";
        assert_eq!(next_decl(src, after_comment(src)), "void run(void);");
    }

    #[test]
    fn func_ret_is_text_before_name() {
        let src = "// doc\nstatic inline unsigned long hash(const char *s);";
        assert_eq!(func_ret(src, after_comment(src)), "static inline unsigned long");

        let src = "// doc\nint area (int w, int h);";
        assert_eq!(func_ret(src, after_comment(src)), "int");
    }

    #[test]
    fn func_ret_without_return_type() {
        let src = "// doc\nmain(void);";
        assert_eq!(func_ret(src, after_comment(src)), "");
    }

    #[test]
    fn func_args_is_balanced_list() {
        let src = "// doc\nvoid apply(int (*fn)(int), int n) { }";
        assert_eq!(func_args(src, after_comment(src)), "int (*fn)(int), int n");
    }

    #[test]
    fn func_args_without_parens_is_empty() {
        let src = "// doc\nint x;";
        assert_eq!(func_args(src, after_comment(src)), "");
    }

    #[test]
    fn func_arg_indexes_from_both_ends() {
        let src = "// doc\nvoid f(int a, int (*cb)(int, int), char c);";
        let end = after_comment(src);
        assert_eq!(func_arg(src, end, 0).unwrap(), "int a");
        assert_eq!(func_arg(src, end, 1).unwrap(), "int (*cb)(int, int)");
        assert_eq!(func_arg(src, end, 2).unwrap(), "char c");
        assert_eq!(func_arg(src, end, -1).unwrap(), func_arg(src, end, 2).unwrap());
        assert_eq!(func_arg(src, end, -3).unwrap(), "int a");
    }

    #[test]
    fn func_arg_out_of_range() {
        let src = "// doc\nvoid f(int a, int b, int c);";
        let end = after_comment(src);
        let err = func_arg(src, end, 3).unwrap_err();
        assert!(matches!(err, CommandError::ArgumentOutOfRange { index: 3, count: 3 }));
        assert!(func_arg(src, end, -4).is_err());
    }

    #[test]
    fn class_name_before_brace_or_colon() {
        let src = "// doc\nclass Widget : public Base {";
        assert_eq!(class_name(src, after_comment(src)), "Widget");

        let src = "/* doc */\nstruct Point\n{";
        assert_eq!(class_name(src, after_comment(src)), "Point");

        let src = "// doc\nclass Forward;";
        assert_eq!(class_name(src, after_comment(src)), "Forward");
    }

    #[test]
    fn next_macro_function_like() {
        let src = "// doc\n#define MAX(a, b) ((a) > (b) ? (a) : (b))";
        assert_eq!(next_macro(src, after_comment(src)), "#define MAX(a, b)");
    }

    #[test]
    fn next_macro_object_like() {
        let src = "// doc\n#define BUFFER_SIZE 4096\nint f(void);";
        assert_eq!(next_macro(src, after_comment(src)), "#define BUFFER_SIZE");
    }

    #[test]
    fn next_macro_without_directive() {
        let src = "// doc\nint x;";
        assert_eq!(next_macro(src, after_comment(src)), "");
    }

    #[test]
    fn file_name_strips_directories() {
        assert_eq!(file_name("src/net/socket.cpp"), "socket.cpp");
        assert_eq!(file_name("main.c"), "main.c");
    }

    #[test]
    fn section_argument_rules() {
        let mut ctx = DocContext::new("docs");
        let args = vec!["\"api\"".to_string()];
        assert_eq!(select_section(&args, &mut ctx).unwrap(), Expansion::Done);
        assert_eq!(ctx.current_section(), Some("api"));

        select_section(&[], &mut ctx).unwrap();
        assert_eq!(ctx.current_section(), None);

        let args = vec!["a".to_string(), "b".to_string()];
        assert!(select_section(&args, &mut ctx).is_err());
    }

    #[test]
    fn func_arg_requires_numeric_index() {
        let src = "// doc\nvoid f(int a);";
        let end = after_comment(src);
        let err = func_arg_command(&["one".to_string()], src, end).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { .. }));
        let err = func_arg_command(&[], src, end).unwrap_err();
        assert!(matches!(err, CommandError::ArgumentCount { found: 0, .. }));
    }

    #[test]
    fn resolver_ignores_unknown_names() {
        let mut ctx = DocContext::new("docs");
        let src = "// doc\nint x;";
        let call = CommandCall {
            name: "NOT_A_BUILTIN",
            args: &[],
            site: CommentSite {
                src,
                end: after_comment(src),
                filename: "x.c",
            },
        };
        assert!(Builtins.resolve(&call, &mut ctx).is_none());

        let call = CommandCall {
            name: "NEXT_DECL",
            ..call
        };
        let expansion = Builtins.resolve(&call, &mut ctx).unwrap().unwrap();
        assert_eq!(expansion, Expansion::Text("int x;".into()));
    }

    #[test]
    fn builtin_names_are_reserved() {
        assert!(is_builtin("SECTION"));
        assert!(is_builtin("DOC"));
        assert!(is_builtin("S"));
        assert!(!is_builtin("TEST_CMD"));
    }
}
