//! Delimiter-balanced argument splitting
//!
//! Both command languages share one argument grammar: a parenthesised,
//! comma-separated list where commas only split at nesting depth zero across
//! round, square, and curly brackets, and everything between a pair of double
//! quotes is opaque. Quotes toggle; they do not nest and have no escapes.
//!
//! Malformed input never fails. The first `)` that would take round depth
//! negative closes the list, whatever the other families hold; a stray `]` or
//! `}` only stops commas from splitting. A list with no closing `)` runs to the
//! end of the text.

/// Result of splitting an argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgList {
    /// Trimmed arguments in source order. `()` yields no arguments.
    pub args: Vec<String>,
    /// Byte offset just past the consumed closing `)`, or the text length
    pub end: usize,
    /// Whether a closing `)` was consumed
    pub closed: bool,
}

impl ArgList {
    /// Raw text between the opening `(` at `open` and the closer, untrimmed
    #[must_use]
    pub fn inner<'a>(&self, text: &'a str, open: usize) -> &'a str {
        let stop = if self.closed { self.end - 1 } else { self.end };
        text.get(open + 1..stop).unwrap_or("")
    }
}

#[derive(Debug, Default)]
struct Depth {
    round: i32,
    square: i32,
    curly: i32,
}

impl Depth {
    fn is_zero(&self) -> bool {
        self.round == 0 && self.square == 0 && self.curly == 0
    }
}

/// Split the argument list whose opening `(` is at byte offset `open` in `text`.
///
/// If `open` does not point at `(`, the scan still starts right after it.
#[must_use]
pub fn split_args(text: &str, open: usize) -> ArgList {
    let bytes = text.as_bytes();
    let mut args = Vec::new();
    let mut depth = Depth::default();
    let mut in_quote = false;
    let mut last = open + 1;
    let mut i = open + 1;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' {
            in_quote = !in_quote;
            i += 1;
            continue;
        }
        if in_quote {
            i += 1;
            continue;
        }

        match b {
            b'(' => depth.round += 1,
            b')' if depth.round == 0 => {
                args.push(text[last..i].trim().to_string());
                return finish(args, i + 1, true);
            }
            b')' => depth.round -= 1,
            b'[' => depth.square += 1,
            b']' => depth.square -= 1,
            b'{' => depth.curly += 1,
            b'}' => depth.curly -= 1,
            b',' if depth.is_zero() => {
                args.push(text[last..i].trim().to_string());
                last = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    args.push(text.get(last..).unwrap_or("").trim().to_string());
    finish(args, bytes.len(), false)
}

fn finish(mut args: Vec<String>, end: usize, closed: bool) -> ArgList {
    if args.len() == 1 && args[0].is_empty() {
        args.clear();
    }
    ArgList { args, end, closed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<String> {
        split_args(text, 0).args
    }

    #[test]
    fn nested_and_quoted_commas_do_not_split() {
        assert_eq!(split("(a, (b,c), \"d,e\")"), vec!["a", "(b,c)", "\"d,e\""]);
    }

    #[test]
    fn all_bracket_families_nest() {
        assert_eq!(
            split("(x, [1, 2], {a, b}, f(g, h))"),
            vec!["x", "[1, 2]", "{a, b}", "f(g, h)"]
        );
    }

    #[test]
    fn arguments_are_trimmed() {
        assert_eq!(split("(  a  ,\n b\t)"), vec!["a", "b"]);
    }

    #[test]
    fn empty_list_has_no_arguments() {
        let list = split_args("()", 0);
        assert!(list.args.is_empty());
        assert_eq!(list.end, 2);
        assert!(list.closed);
        assert!(split_args("(   )", 0).args.is_empty());
    }

    #[test]
    fn empty_arguments_between_commas_are_kept() {
        assert_eq!(split("(a,,b)"), vec!["a", "", "b"]);
    }

    #[test]
    fn end_points_past_closer() {
        let text = "@FUNC_ARG(1) trailing";
        let list = split_args(text, 9);
        assert_eq!(list.args, vec!["1"]);
        assert_eq!(&text[list.end..], " trailing");
        assert_eq!(list.inner(text, 9), "1");
    }

    #[test]
    fn parens_inside_quotes_are_ignored() {
        assert_eq!(split("(\"a)b\", c)"), vec!["\"a)b\"", "c"]);
    }

    #[test]
    fn unterminated_list_runs_to_end() {
        let list = split_args("(a, b", 0);
        assert_eq!(list.args, vec!["a", "b"]);
        assert_eq!(list.end, 5);
        assert!(!list.closed);
    }

    #[test]
    fn stray_closer_suppresses_splitting_until_round_closer() {
        let text = "(x, y], z) rest";
        let list = split_args(text, 0);
        assert_eq!(list.args, vec!["x", "y], z"]);
        assert_eq!(&text[list.end..], " rest");
    }

    #[test]
    fn stray_closer_keeps_balanced_round_groups() {
        let text = "(x], f(a), b) rest";
        let list = split_args(text, 0);
        assert_eq!(list.args, vec!["x], f(a), b"]);
        assert_eq!(&text[list.end..], " rest");
        assert!(list.closed);
    }

    #[test]
    fn stray_closer_without_round_bracket_takes_rest() {
        let list = split_args("(a}, b", 0);
        assert_eq!(list.args, vec!["a}, b"]);
        assert!(!list.closed);
    }

    #[test]
    fn unbalanced_square_does_not_block_closer() {
        let text = "(a[, b) tail";
        let list = split_args(text, 0);
        assert_eq!(list.args, vec!["a[, b"]);
        assert_eq!(&text[list.end..], " tail");
    }

    #[test]
    fn splitting_is_stable_under_retrimming() {
        let args = split("( a , b )");
        let rejoined = format!("({})", args.join(","));
        assert_eq!(split(&rejoined), args);
    }

    #[test]
    fn inner_of_unterminated_list() {
        let text = "f(int a, int b";
        let list = split_args(text, 1);
        assert_eq!(list.inner(text, 1), "int a, int b");
    }
}
