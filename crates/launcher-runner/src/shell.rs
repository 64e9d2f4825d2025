//! Shell selection and quoting.

/// Shell and command flag for the current platform.
pub fn platform_shell() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}

/// Quote `value` as a single POSIX shell word.
///
/// The result is wrapped in single quotes; embedded single quotes become
/// `'\''`.
pub fn quote_posix(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

/// Script a visible terminal runs: enter the directory, run the command,
/// then keep an interactive shell open.
pub fn terminal_script(working_dir: &str, command: &str) -> String {
    format!(
        "cd {} && {}; exec \"${{SHELL:-/bin/sh}}\"",
        quote_posix(working_dir),
        command
    )
}

/// Escape a string for inclusion in an AppleScript string literal.
pub fn escape_applescript(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote_posix("/home/me/proj"), "'/home/me/proj'");
    }

    #[test]
    fn test_quote_spaces_and_metachars() {
        assert_eq!(quote_posix("a b;$(rm) `x`"), "'a b;$(rm) `x`'");
    }

    #[test]
    fn test_quote_single_quote() {
        assert_eq!(quote_posix("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_quote_empty() {
        assert_eq!(quote_posix(""), "''");
    }

    #[test]
    fn test_terminal_script() {
        let script = terminal_script("/tmp/my proj", "npm start");
        assert_eq!(
            script,
            "cd '/tmp/my proj' && npm start; exec \"${SHELL:-/bin/sh}\""
        );
    }

    #[test]
    fn test_escape_applescript() {
        assert_eq!(escape_applescript(r#"say "hi" \ bye"#), r#"say \"hi\" \\ bye"#);
    }

    #[cfg(unix)]
    #[test]
    fn test_quoted_path_survives_shell() {
        let dir = "/tmp/it's a \"dir\"";
        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("printf %s {}", quote_posix(dir)))
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), dir);
    }
}
