//! Terminal actions: `--help` and `--version` output.

/// Program name printed by `--version`
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Program version printed by `--version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const FLAGS: &[&str] = &[
    "[-v|--version]",
    "[-h|--help]",
    "[-q|--quiet]",
    "[-V|--verbose]",
    "[--port=PORT]",
    "[--host=HOST]",
    "[--open=PATH]",
    "[--no-browser]",
    "[--browser=BROWSER]",
    "[--watch=PATH]",
    "[--ignore=PATH]",
    "[--ignorePattern=RGXP]",
    "[--no-css-inject]",
    "[--entry-file=PATH]",
    "[--spa]",
    "[--mount=ROUTE:PATH]",
    "[--wait=MILLISECONDS]",
    "[--htpasswd=PATH]",
    "[--cors]",
    "[--https=PATH]",
    "[--https-module=MODULE_NAME]",
    "[--proxy=PATH]",
    "[--middleware=NAME]",
    "[--mimetypes=JSON]",
    "[--index=FILE]",
    "[PATH]",
];

/// One-line usage summary
pub fn usage() -> String {
    format!("Usage: {} {}", NAME, FLAGS.join(" "))
}

/// `<name> <version>`
pub fn version_line() -> String {
    format!("{} {}", NAME, VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_lists_flags() {
        let usage = usage();
        assert!(usage.starts_with("Usage: alive-server "));
        assert!(usage.contains("[--mount=ROUTE:PATH]"));
        assert!(usage.ends_with("[PATH]"));
    }

    #[test]
    fn test_version_line() {
        assert_eq!(version_line(), format!("alive-server {}", VERSION));
    }
}
