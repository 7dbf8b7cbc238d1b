//! Splitting the command line between tsprune and the compiler.
//!
//! tsprune is used as a drop-in replacement for `tsc`: anything it does not
//! recognize is passed through. [`partition_args`] removes every tsprune
//! flag (and its value) and keeps the rest in order.

/// A flag owned by tsprune.
struct ToolFlag {
    short: Option<&'static str>,
    long: &'static str,
    takes_value: bool,
}

impl ToolFlag {
    const fn value(short: Option<&'static str>, long: &'static str) -> Self {
        Self {
            short,
            long,
            takes_value: true,
        }
    }

    const fn switch(short: Option<&'static str>, long: &'static str) -> Self {
        Self {
            short,
            long,
            takes_value: false,
        }
    }

    fn matches(&self, token: &str) -> bool {
        token == self.long || self.short == Some(token)
    }

    fn short_letter(&self) -> Option<char> {
        self.short.and_then(|s| s.strip_prefix('-')).and_then(|s| s.chars().next())
    }

    /// Matches `--long=value`.
    fn matches_inline(&self, token: &str) -> bool {
        self.takes_value
            && token
                .strip_prefix(self.long)
                .is_some_and(|rest| rest.starts_with('='))
    }
}

const TOOL_FLAGS: &[ToolFlag] = &[
    ToolFlag::value(Some("-s"), "--src"),
    ToolFlag::value(Some("-d"), "--dist"),
    ToolFlag::value(Some("-e"), "--exclude"),
    ToolFlag::value(Some("-m"), "--root-module"),
    ToolFlag::switch(Some("-w"), "--watch"),
    ToolFlag::switch(Some("-r"), "--remove-dirs"),
    ToolFlag::switch(None, "--keep-dirs"),
    ToolFlag::switch(None, "--strict-declarations"),
    ToolFlag::switch(None, "--no-tsc"),
    ToolFlag::switch(Some("-v"), "--verbose"),
    ToolFlag::switch(None, "--no-color"),
    ToolFlag::switch(Some("-h"), "--help"),
    ToolFlag::switch(Some("-V"), "--version"),
];

/// Expands a cluster of short flags: `-wv`, `-we=vendor`, `-we vendor`.
///
/// Every letter must be a tsprune short flag and only the last one may take
/// a value. Returns the expanded flags and whether the next token is the
/// value. Attached values without `=` (`-slib`) are not split: single-dash
/// words such as `-strict` or `-declaration` belong to the compiler.
fn expand_short_cluster(token: &str) -> Option<(Vec<String>, bool)> {
    let body = token.strip_prefix('-').filter(|b| !b.starts_with('-'))?;
    let (letters, value) = match body.split_once('=') {
        Some((letters, value)) => (letters, Some(value)),
        None => (body, None),
    };
    if letters.is_empty() {
        return None;
    }

    let mut expanded = Vec::with_capacity(letters.len() + 1);
    let mut wants_value = false;
    for letter in letters.chars() {
        if wants_value {
            return None;
        }
        let flag = TOOL_FLAGS
            .iter()
            .find(|f| f.short_letter() == Some(letter))?;
        expanded.push(format!("-{letter}"));
        wants_value = flag.takes_value;
    }

    match value {
        Some(value) if wants_value => {
            expanded.push(value.to_owned());
            Some((expanded, false))
        }
        Some(_) => None,
        None => Some((expanded, wants_value)),
    }
}

/// The command line split in two.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedArgs {
    /// Arguments for tsprune itself, without the program name.
    pub tool: Vec<String>,
    /// Arguments forwarded to the compiler.
    pub compiler: Vec<String>,
}

impl PartitionedArgs {
    /// Returns the compiler arguments, adding `--watch` when tsprune watches.
    ///
    /// tsprune consumes `-w/--watch` itself, so the compiler only watches
    /// when told to here.
    pub fn compiler_args(&self, watch: bool) -> Vec<String> {
        let mut args = self.compiler.clone();
        if watch && !args.iter().any(|a| a == "-w" || a == "--watch") {
            args.push("--watch".to_owned());
        }
        args
    }

    /// Returns the value of the last `-p`/`--project` in the compiler arguments.
    pub fn project(&self) -> Option<&str> {
        let mut project = None;
        let mut tokens = self.compiler.iter();
        while let Some(token) = tokens.next() {
            if token == "-p" || token == "--project" {
                if let Some(value) = tokens.next() {
                    project = Some(value.as_str());
                }
            } else if let Some(value) = token.strip_prefix("--project=") {
                project = Some(value);
            }
        }
        project
    }
}

/// Splits `args` (without the program name) into tool and compiler arguments.
///
/// Tokens after a bare `--` all go to the compiler, unchanged. Short flags
/// may be clustered (`-wv`) and a short value may be attached with `=`
/// (`-e=vendor`).
pub fn partition_args<S: AsRef<str>>(args: &[S]) -> PartitionedArgs {
    let mut parts = PartitionedArgs::default();
    let mut tokens = args.iter().map(AsRef::<str>::as_ref);

    while let Some(token) = tokens.next() {
        if token == "--" {
            parts.compiler.extend(tokens.by_ref().map(str::to_owned));
            break;
        }

        if let Some(flag) = TOOL_FLAGS.iter().find(|f| f.matches(token)) {
            parts.tool.push(token.to_owned());
            if flag.takes_value {
                if let Some(value) = tokens.next() {
                    parts.tool.push(value.to_owned());
                }
            }
        } else if TOOL_FLAGS.iter().any(|f| f.matches_inline(token)) {
            parts.tool.push(token.to_owned());
        } else if let Some((expanded, wants_value)) = expand_short_cluster(token) {
            parts.tool.extend(expanded);
            if wants_value {
                if let Some(value) = tokens.next() {
                    parts.tool.push(value.to_owned());
                }
            }
        } else {
            parts.compiler.push(token.to_owned());
        }
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_keeps_order() {
        let parts = partition_args(&[
            "-p",
            "tsconfig.build.json",
            "-s",
            "lib",
            "--pretty",
            "--dist=out",
            "-w",
            "-e",
            "a",
            "--exclude",
            "b",
            "--sourceMap",
        ]);

        insta::assert_debug_snapshot!(parts, @r#"
        PartitionedArgs {
            tool: [
                "-s",
                "lib",
                "--dist=out",
                "-w",
                "-e",
                "a",
                "--exclude",
                "b",
            ],
            compiler: [
                "-p",
                "tsconfig.build.json",
                "--pretty",
                "--sourceMap",
            ],
        }
        "#);
    }

    #[test]
    fn test_everything_after_double_dash_is_forwarded() {
        let parts = partition_args(&["--no-tsc", "--", "-s", "x", "--watch"]);
        assert_eq!(parts.tool, vec!["--no-tsc"]);
        assert_eq!(parts.compiler, vec!["-s", "x", "--watch"]);
    }

    #[test]
    fn test_every_occurrence_is_removed() {
        let parts = partition_args(&["-r", "--target", "es2020", "-r", "--keep-dirs"]);
        assert_eq!(parts.tool, vec!["-r", "-r", "--keep-dirs"]);
        assert_eq!(parts.compiler, vec!["--target", "es2020"]);
    }

    #[test]
    fn test_similar_flags_are_not_matched() {
        let parts = partition_args(&["--srcDir", "x", "--distribution", "--dist"]);
        assert_eq!(parts.tool, vec!["--dist"]);
        assert_eq!(parts.compiler, vec!["--srcDir", "x", "--distribution"]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = vec!["-w".to_owned(), "--strict".to_owned()];
        let _ = partition_args(&input);
        assert_eq!(input, vec!["-w", "--strict"]);
    }

    #[test]
    fn test_compiler_args_in_watch_mode() {
        let parts = partition_args(&["-w", "--pretty"]);
        assert_eq!(parts.compiler_args(false), vec!["--pretty"]);
        assert_eq!(parts.compiler_args(true), vec!["--pretty", "--watch"]);

        let forwarded = partition_args(&["--", "--watch"]);
        assert_eq!(forwarded.compiler_args(true), vec!["--watch"]);
    }

    #[test]
    fn test_short_clusters_are_expanded() {
        let parts = partition_args(&["-wv", "-e=vendor", "-re", "lib", "--pretty"]);
        assert_eq!(parts.tool, vec!["-w", "-v", "-e", "vendor", "-r", "-e", "lib"]);
        assert_eq!(parts.compiler, vec!["--pretty"]);
    }

    #[test]
    fn test_single_dash_compiler_words_are_forwarded() {
        let parts = partition_args(&["-strict", "-declaration", "-slib", "-wp", "-w=x", "-=x"]);
        assert!(parts.tool.is_empty());
        assert_eq!(
            parts.compiler,
            vec!["-strict", "-declaration", "-slib", "-wp", "-w=x", "-=x"]
        );
    }

    #[test]
    fn test_project_lookup() {
        assert_eq!(partition_args(&["-p", "a.json"]).project(), Some("a.json"));
        assert_eq!(
            partition_args(&["--project", "a", "--project=b"]).project(),
            Some("b")
        );
        assert_eq!(partition_args(&["--pretty"]).project(), None);
    }
}
