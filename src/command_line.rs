// Copyright 2026 Martin Pool

//! Compose the command line passed to PartCover.
//!
//! PartCover reads its options as flag groups in a fixed order, so the
//! order of fragments here matters. Values are not shell-quoted: the
//! string is handed to the tool as a single Windows-style command line.

use std::borrow::Cow;
use std::fmt::Write;

/// The settings that describe one coverage run, independent of where
/// the tool lives.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoverageArgs {
    /// The program to run under coverage, generally a test runner.
    pub target: Option<String>,
    /// Arguments for the target, as one raw string.
    pub target_args: Option<String>,
    /// Working directory for the target.
    pub working_directory: Option<String>,
    /// File where PartCover writes its results.
    pub output: Option<String>,
    /// Assembly expressions to include, like `[MyAssembly.*]*`.
    pub include: Vec<String>,
    /// Assembly expressions to exclude, like `[*.Test]*`.
    pub exclude: Vec<String>,
}

/// Accumulates `flag value` fragments, each followed by one space.
#[derive(Debug, Default)]
struct CommandLineBuilder {
    line: String,
}

impl CommandLineBuilder {
    /// Append the flag and value, unless the value is absent or blank.
    fn append_if_present(&mut self, flag: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !is_blank(v)) {
            self.append_pair(flag, value);
        }
    }

    /// Append the flag once for each value, in order.
    fn append_each(&mut self, flag: &str, values: &[String]) {
        for value in values {
            self.append_pair(flag, value);
        }
    }

    fn append_pair(&mut self, flag: &str, value: &str) {
        write!(self.line, "{flag} {value} ").expect("write to string");
    }

    /// Append a final bare switch and return the whole line.
    fn finish_with(mut self, switch: &str) -> String {
        self.line.push_str(switch);
        self.line
    }
}

/// Build the PartCover command line, not including the tool itself.
///
/// `--register` is always last.
pub fn generate_command_line(args: &CoverageArgs) -> String {
    let mut builder = CommandLineBuilder::default();
    builder.append_if_present("--target", args.target.as_deref());
    builder.append_if_present("--target-work-dir", args.working_directory.as_deref());
    let quoted_target_args = args.target_args.as_deref().map(quote_if_needed);
    builder.append_if_present("--target-args", quoted_target_args.as_deref());
    builder.append_if_present("--output", args.output.as_deref());
    builder.append_each("--include", &args.include);
    builder.append_each("--exclude", &args.exclude);
    builder.finish_with("--register")
}

/// Quote the target arguments if they contain a space.
///
/// When quoting, embedded double quotes are escaped with a backslash. A
/// string with quotes but no space is returned as is, quotes and all:
/// PartCover has always been fed that way.
pub fn quote_if_needed(args: &str) -> Cow<'_, str> {
    if is_blank(args) || !args.contains(' ') {
        Cow::Borrowed(args)
    } else {
        Cow::Owned(format!("\"{}\"", args.replace('"', "\\\"")))
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Split a command line into arguments the way the Microsoft C runtime
/// does, which is how PartCover itself will read it.
///
/// Backslashes are literal unless they precede a double quote: then each
/// pair becomes one backslash, and an odd trailing one escapes the quote.
/// Inside quotes, `""` is a literal quote and the quoted run continues.
pub fn parse_command_line(line: &str) -> Vec<String> {
    let mut argv = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' if !in_quotes => {
                if in_arg {
                    argv.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            '\\' => {
                in_arg = true;
                let mut n_backslashes = 1;
                while chars.peek() == Some(&'\\') {
                    chars.next();
                    n_backslashes += 1;
                }
                if chars.peek() == Some(&'"') {
                    current.extend(std::iter::repeat('\\').take(n_backslashes / 2));
                    if n_backslashes % 2 == 1 {
                        chars.next();
                        current.push('"');
                    }
                } else {
                    current.extend(std::iter::repeat('\\').take(n_backslashes));
                }
            }
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => {
                in_arg = true;
                in_quotes = !in_quotes;
            }
            c => {
                in_arg = true;
                current.push(c);
            }
        }
    }
    if in_arg {
        argv.push(current);
    }
    argv
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn with_target_args(target_args: &str) -> String {
        generate_command_line(&CoverageArgs {
            target_args: Some(target_args.to_owned()),
            ..Default::default()
        })
    }

    #[test]
    fn empty_args_give_only_register() {
        assert_eq!(generate_command_line(&CoverageArgs::default()), "--register");
    }

    #[test]
    fn blank_fields_are_omitted() {
        let args = CoverageArgs {
            target: Some(String::new()),
            target_args: Some("   ".to_owned()),
            working_directory: Some(" ".to_owned()),
            output: None,
            include: Vec::new(),
            exclude: Vec::new(),
        };
        assert_eq!(generate_command_line(&args), "--register");
    }

    #[test]
    fn each_field_produces_only_its_own_flag() {
        let cases: [(CoverageArgs, &str); 4] = [
            (
                CoverageArgs {
                    target: Some("t.exe".to_owned()),
                    ..Default::default()
                },
                "--target t.exe --register",
            ),
            (
                CoverageArgs {
                    working_directory: Some("c:\\work".to_owned()),
                    ..Default::default()
                },
                "--target-work-dir c:\\work --register",
            ),
            (
                CoverageArgs {
                    target_args: Some("x".to_owned()),
                    ..Default::default()
                },
                "--target-args x --register",
            ),
            (
                CoverageArgs {
                    output: Some("out.xml".to_owned()),
                    ..Default::default()
                },
                "--output out.xml --register",
            ),
        ];
        for (args, expected) in cases {
            assert_eq!(generate_command_line(&args), expected);
        }
    }

    #[test]
    fn includes_keep_their_order() {
        let args = CoverageArgs {
            include: vec!["a".to_owned(), "b".to_owned()],
            ..Default::default()
        };
        assert_eq!(
            generate_command_line(&args),
            "--include a --include b --register"
        );
    }

    #[test]
    fn excludes_follow_includes() {
        let args = CoverageArgs {
            include: vec!["i".to_owned()],
            exclude: vec!["x".to_owned(), "y".to_owned()],
            ..Default::default()
        };
        assert_eq!(
            generate_command_line(&args),
            "--include i --exclude x --exclude y --register"
        );
    }

    #[test]
    fn blank_patterns_are_kept() {
        let args = CoverageArgs {
            include: vec![String::new(), " ".to_owned()],
            ..Default::default()
        };
        assert_eq!(
            generate_command_line(&args),
            "--include  --include   --register"
        );
        let args = CoverageArgs {
            exclude: vec![String::new()],
            ..Default::default()
        };
        assert_eq!(generate_command_line(&args), "--exclude  --register");
    }

    #[test]
    fn all_fields_in_fixed_order() {
        let args = CoverageArgs {
            target: Some("nunit-console.exe".to_owned()),
            target_args: Some("tests.dll /nologo".to_owned()),
            working_directory: Some("build".to_owned()),
            output: Some("partcover.xml".to_owned()),
            include: vec!["[A]*".to_owned()],
            exclude: vec!["[B]*".to_owned()],
        };
        assert_eq!(
            generate_command_line(&args),
            "--target nunit-console.exe --target-work-dir build \
             --target-args \"tests.dll /nologo\" --output partcover.xml \
             --include [A]* --exclude [B]* --register"
        );
    }

    #[test]
    fn nunit_scenario() {
        let args = CoverageArgs {
            target: Some("nunit-console.exe".to_owned()),
            output: Some("partcover.xml".to_owned()),
            include: vec!["[MyAssembly.*]*".to_owned()],
            exclude: vec!["[*.Test]*".to_owned()],
            ..Default::default()
        };
        assert_eq!(
            generate_command_line(&args),
            "--target nunit-console.exe --output partcover.xml --include [MyAssembly.*]* --exclude [*.Test]* --register"
        );
    }

    #[test]
    fn register_is_last_and_only_once() {
        let args = CoverageArgs {
            target: Some("t.exe".to_owned()),
            output: Some("o.xml".to_owned()),
            exclude: vec!["z".to_owned()],
            ..Default::default()
        };
        let line = generate_command_line(&args);
        assert_eq!(line.split(' ').last(), Some("--register"));
        assert_eq!(line.matches("--register").count(), 1);
        assert!(!line.ends_with(' '));
    }

    #[test]
    fn target_args_without_space_are_not_quoted() {
        assert_eq!(with_target_args("foo"), "--target-args foo --register");
    }

    #[test]
    fn target_args_with_space_are_quoted() {
        assert_eq!(
            with_target_args("foo bar"),
            "--target-args \"foo bar\" --register"
        );
    }

    #[test]
    fn quotes_are_escaped_when_quoting() {
        assert_eq!(
            with_target_args(r#"foo "bar""#),
            r#"--target-args "foo \"bar\"" --register"#
        );
    }

    #[test]
    fn quotes_without_space_pass_through() {
        assert_eq!(
            with_target_args(r#"foo"bar"#),
            r#"--target-args foo"bar --register"#
        );
    }

    #[test]
    fn quote_if_needed_borrows_when_unchanged() {
        assert!(matches!(quote_if_needed(""), Cow::Borrowed("")));
        assert!(matches!(quote_if_needed("  "), Cow::Borrowed("  ")));
        assert!(matches!(quote_if_needed("a\tb"), Cow::Borrowed("a\tb")));
        assert_eq!(quote_if_needed("a b"), "\"a b\"");
    }

    #[test]
    fn parse_simple_words() {
        assert_eq!(
            parse_command_line("  --target  a.exe\t--register "),
            ["--target", "a.exe", "--register"]
        );
        assert!(parse_command_line("   ").is_empty());
    }

    #[test]
    fn parse_quoted_target_args() {
        let line = with_target_args(r#"tests.dll /xml="out put.xml""#);
        assert_eq!(
            parse_command_line(&line),
            [
                "--target-args",
                r#"tests.dll /xml="out put.xml""#,
                "--register"
            ]
        );
    }

    #[test]
    fn parse_backslashes() {
        assert_eq!(parse_command_line(r"c:\dir\file"), [r"c:\dir\file"]);
        assert_eq!(parse_command_line(r#""c:\dir\\" x"#), [r"c:\dir\", "x"]);
        assert_eq!(parse_command_line(r#"a\\\"b"#), [r#"a\"b"#]);
        assert_eq!(parse_command_line(r#""""#), [""]);
    }

    #[test]
    fn parse_doubled_quote_inside_quotes() {
        assert_eq!(parse_command_line(r#""a""b c" d"#), [r#"a"b c"#, "d"]);
        assert_eq!(parse_command_line(r#""""""#), [r#"""#]);
        // Outside quotes, each quote just toggles.
        assert_eq!(parse_command_line(r#"a""b c"#), ["ab", "c"]);
    }

    #[test]
    fn unescaped_quote_swallows_following_arguments() {
        // The tool sees an opening quote that runs to the end of the line.
        let line = with_target_args(r#"foo"bar"#);
        assert_eq!(
            parse_command_line(&line),
            ["--target-args", "foobar --register"]
        );
    }
}
