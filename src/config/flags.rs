//! Command-Line Flags
//!
//! Resolution runs in two phases:
//!
//! 1. [`Invocation::parse`] recognises every token, in invocation order,
//!    without interpreting values.
//! 2. [`FlagSet::apply`] folds the collected flags onto a [`Config`] with
//!    explicit precedence rules:
//!    - scalar options: the earliest occurrence wins
//!    - `--mount`, `--proxy`, `--middleware`, `--spa`: appended latest
//!      occurrence first
//!    - `--open`: accumulated latest occurrence first, unless `--no-browser`
//!      appears anywhere
//!    - `--mimetypes`: merged; on duplicate keys the earliest occurrence wins
//!
//! Tokens that match nothing are ignored.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::coerce;
use super::paths;
use super::types::{Config, Mount, OpenTarget, Proxy};
use crate::constants::{log_level, middleware};
use crate::types::{CoerceResultExt, Result};

/// Action that ends the process before any configuration is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalAction {
    /// `--help` / `-h`
    Help,
    /// `--version` / `-v`
    Version,
}

/// One recognised flag with its raw value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flag {
    Port(String),
    Wait(String),
    Host(String),
    Browser(Vec<String>),
    Https(String),
    HttpsModule(String),
    Htpasswd(String),
    Index(String),
    Open(String),
    NoBrowser,
    Watch(Vec<String>),
    Ignore(Vec<String>),
    IgnorePattern(String),
    NoCssInject,
    Spa,
    Quiet,
    Verbose,
    Mount(String),
    Proxy(String),
    Middleware(String),
    MimeTypes(String),
    EntryFile(String),
    Cors,
    /// Hidden: shut the server down shortly after startup
    Test,
}

/// Classification of a single token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Flag(Flag),
    Terminal(TerminalAction),
    Ignored,
}

impl Token {
    /// Classify one token; flags are case-sensitive and need an exact prefix
    pub fn parse(arg: &str) -> Self {
        match arg {
            "--help" | "-h" => return Self::Terminal(TerminalAction::Help),
            "--version" | "-v" => return Self::Terminal(TerminalAction::Version),
            "--no-css-inject" => return Self::Flag(Flag::NoCssInject),
            "--no-browser" => return Self::Flag(Flag::NoBrowser),
            "--spa" => return Self::Flag(Flag::Spa),
            "--quiet" | "-q" => return Self::Flag(Flag::Quiet),
            "--verbose" | "-V" => return Self::Flag(Flag::Verbose),
            "--cors" => return Self::Flag(Flag::Cors),
            "--test" => return Self::Flag(Flag::Test),
            _ => {}
        }

        let Some((name, value)) = arg.split_once('=') else {
            return Self::Ignored;
        };
        let value = value.to_string();

        let flag = match name {
            "--port" => Flag::Port(value),
            "--wait" => Flag::Wait(value),
            "--host" => Flag::Host(value),
            "--browser" => Flag::Browser(coerce::split_list(&value)),
            "--https" => Flag::Https(value),
            "--https-module" => Flag::HttpsModule(value),
            "--htpasswd" => Flag::Htpasswd(value),
            "--index" => Flag::Index(value),
            "--open" => Flag::Open(value),
            "--watch" => Flag::Watch(coerce::split_list(&value)),
            "--ignore" => Flag::Ignore(coerce::split_list(&value)),
            "--ignorePattern" => Flag::IgnorePattern(value),
            "--mount" => Flag::Mount(value),
            "--proxy" => Flag::Proxy(value),
            "--middleware" => Flag::Middleware(value),
            "--mimetypes" => Flag::MimeTypes(value),
            "--entry-file" if !value.is_empty() => Flag::EntryFile(value),
            _ => return Self::Ignored,
        };
        Self::Flag(flag)
    }
}

// =============================================================================
// Invocation
// =============================================================================

/// Parsed command line: the positional root plus every recognised flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Leading positional directory, if any
    pub root: Option<String>,
    pub flags: FlagSet,
}

impl Invocation {
    /// Parse the arguments that follow the program name
    ///
    /// The first argument is the root directory only when it does not start
    /// with `-`; otherwise there is no root and it is scanned as a flag like
    /// every other token.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let root = match args.first().map(AsRef::as_ref) {
            Some(first) if !first.starts_with('-') => Some(first.to_string()),
            Some(first) => {
                debug!("No positional root: leading argument {} is a flag", first);
                None
            }
            None => None,
        };

        let skip = usize::from(root.is_some());
        let flags = FlagSet::collect(args.iter().skip(skip).map(AsRef::as_ref));

        Self { root, flags }
    }

    /// Root directory as a path (`""` when absent)
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(self.root.as_deref().unwrap_or_default())
    }
}

// =============================================================================
// Flag Set
// =============================================================================

/// Value of the earliest `Flag::$variant` occurrence
macro_rules! first_value {
    ($set:expr, $variant:ident) => {
        $set.first(|flag| match flag {
            Flag::$variant(value) => Some(value.clone()),
            _ => None,
        })
    };
}

/// Flags in invocation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: Vec<Flag>,
    terminal: Option<TerminalAction>,
}

impl FlagSet {
    /// Classify every token, keeping invocation order
    ///
    /// When several terminal flags are present the latest one is kept.
    pub fn collect<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = Self::default();
        for token in tokens {
            match Token::parse(token) {
                Token::Flag(flag) => set.flags.push(flag),
                Token::Terminal(action) => set.terminal = Some(action),
                Token::Ignored => {}
            }
        }
        set
    }

    pub fn terminal(&self) -> Option<TerminalAction> {
        self.terminal
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// True when the hidden `--test` flag was given
    pub fn shutdown_requested(&self) -> bool {
        self.flags.contains(&Flag::Test)
    }

    /// Apply every flag to `config`
    ///
    /// `cwd` is the base for `--mount` paths; `--proxy` targets are left as
    /// given.
    pub fn apply(&self, config: &mut Config, cwd: &Path) -> Result<()> {
        self.apply_scalars(config)?;
        self.apply_open(config);
        self.apply_composites(config, cwd)?;
        self.apply_mimetypes(config)?;
        Ok(())
    }

    /// First occurrence in invocation order
    fn first<T>(&self, select: impl Fn(&Flag) -> Option<T>) -> Option<T> {
        self.flags.iter().find_map(select)
    }

    /// First occurrence that coerces; malformed values are skipped
    fn first_integer(
        &self,
        field: &'static str,
        select: impl Fn(&Flag) -> Option<&str>,
    ) -> Result<Option<i64>> {
        for raw in self.flags.iter().filter_map(select) {
            if let Some(value) = coerce::strict_int(field, raw).or_recover()? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn apply_scalars(&self, config: &mut Config) -> Result<()> {
        if let Some(port) = self.first_integer("port", |f| match f {
            Flag::Port(raw) => Some(raw.as_str()),
            _ => None,
        })? {
            config.port = Some(port);
        }
        if let Some(wait) = self.first_integer("wait", |f| match f {
            Flag::Wait(raw) => Some(raw.as_str()),
            _ => None,
        })? {
            config.wait = Some(wait);
        }

        // Every pattern must compile, even the ones that lose precedence.
        let mut patterns = Vec::new();
        for flag in &self.flags {
            if let Flag::IgnorePattern(raw) = flag {
                patterns.push(coerce::compile_pattern("ignorePattern", raw)?);
            }
        }
        if let Some(pattern) = patterns.into_iter().next() {
            config.ignore_pattern = Some(pattern);
        }

        if let Some(host) = first_value!(self, Host) {
            config.host = Some(host);
        }
        if let Some(https) = first_value!(self, Https) {
            config.https = Some(https);
        }
        if let Some(module) = first_value!(self, HttpsModule) {
            config.https_module = Some(module);
        }
        if let Some(htpasswd) = first_value!(self, Htpasswd) {
            config.htpasswd = Some(htpasswd);
        }
        if let Some(file) = first_value!(self, EntryFile) {
            config.entry_file = Some(file);
        }
        if let Some(index) = first_value!(self, Index) {
            config.index = index;
        }
        if let Some(browser) = first_value!(self, Browser) {
            config.browser = Some(browser);
        }
        if let Some(watch) = first_value!(self, Watch) {
            config.watch = Some(to_paths(&watch));
        }
        if let Some(ignore) = first_value!(self, Ignore) {
            config.ignore = Some(to_paths(&ignore));
        }
        if let Some(level) = self.first(|f| match f {
            Flag::Quiet => Some(log_level::QUIET),
            Flag::Verbose => Some(log_level::VERBOSE),
            _ => None,
        }) {
            config.log_level = level;
        }

        if self.flags.contains(&Flag::NoCssInject) {
            config.no_css_inject = true;
        }
        if self.flags.contains(&Flag::Cors) {
            config.cors = true;
        }
        Ok(())
    }

    fn apply_open(&self, config: &mut Config) {
        if self.flags.contains(&Flag::NoBrowser) {
            config.open = OpenTarget::Enabled(false);
            return;
        }
        for flag in self.flags.iter().rev() {
            if let Flag::Open(path) = flag {
                config.open = std::mem::take(&mut config.open).push(path.clone());
            }
        }
    }

    fn apply_composites(&self, config: &mut Config, cwd: &Path) -> Result<()> {
        for flag in self.flags.iter().rev() {
            match flag {
                Flag::Mount(raw) => {
                    let (route, path) = coerce::split_route_pair("mount", raw)?;
                    config.mount.push(Mount {
                        route,
                        path: paths::resolve(cwd, path),
                    });
                }
                Flag::Proxy(raw) => {
                    let (prefix, target) = coerce::split_route_pair("proxy", raw)?;
                    config.proxy.push(Proxy { prefix, target });
                }
                Flag::Middleware(name) => config.middleware.push(name.clone()),
                Flag::Spa => config.middleware.push(middleware::SPA.to_string()),
                _ => {}
            }
        }
        Ok(())
    }

    fn apply_mimetypes(&self, config: &mut Config) -> Result<()> {
        for flag in self.flags.iter().rev() {
            if let Flag::MimeTypes(raw) = flag {
                let incoming = coerce::parse_mimetypes("mimetypes", raw)?;
                config.mimetypes = Some(coerce::merge_mimetypes(config.mimetypes.take(), incoming));
            }
        }
        Ok(())
    }
}

fn to_paths(list: &[String]) -> Vec<PathBuf> {
    list.iter().map(PathBuf::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AliveError;

    fn resolve(args: &[&str]) -> Result<Config> {
        let invocation = Invocation::parse(args);
        let mut config = Config::default();
        invocation.flags.apply(&mut config, Path::new("/work"))?;
        Ok(config)
    }

    #[test]
    fn test_token_parse() {
        assert_eq!(Token::parse("--port=8080"), Token::Flag(Flag::Port("8080".into())));
        assert_eq!(Token::parse("-h"), Token::Terminal(TerminalAction::Help));
        assert_eq!(Token::parse("--https-module=spdy"), Token::Flag(Flag::HttpsModule("spdy".into())));
        assert_eq!(Token::parse("--https=conf.js"), Token::Flag(Flag::Https("conf.js".into())));
        assert_eq!(
            Token::parse("--ignorePattern=x"),
            Token::Flag(Flag::IgnorePattern("x".into()))
        );
        assert_eq!(Token::parse("--PORT=8080"), Token::Ignored);
        assert_eq!(Token::parse("--unknown"), Token::Ignored);
        assert_eq!(Token::parse("--entry-file="), Token::Ignored);
    }

    #[test]
    fn test_root_is_leading_positional() {
        let invocation = Invocation::parse(&["public", "--port=1"]);
        assert_eq!(invocation.root.as_deref(), Some("public"));
        assert_eq!(invocation.flags.flags(), &[Flag::Port("1".into())]);
    }

    #[test]
    fn test_leading_flag_is_not_root() {
        let invocation = Invocation::parse(&["--port=1", "public"]);
        assert_eq!(invocation.root, None);
        assert_eq!(invocation.root_path(), PathBuf::from(""));
        assert_eq!(invocation.flags.flags(), &[Flag::Port("1".into())]);
    }

    #[test]
    fn test_port_valid_and_malformed() {
        assert_eq!(resolve(&["--port=8080"]).unwrap().port, Some(8080));
        assert_eq!(resolve(&["--port=8o80"]).unwrap().port, None);
        assert_eq!(resolve(&["--port="]).unwrap().port, None);
        assert_eq!(resolve(&["--wait=-1"]).unwrap().wait, Some(-1));
    }

    #[test]
    fn test_malformed_port_keeps_prior_value() {
        let mut config = Config {
            port: Some(3000),
            ..Config::default()
        };
        Invocation::parse(&["--port=abc"])
            .flags
            .apply(&mut config, Path::new("/work"))
            .unwrap();
        assert_eq!(config.port, Some(3000));
    }

    #[test]
    fn test_first_valid_port_wins() {
        assert_eq!(resolve(&["--port=abc", "--port=9000"]).unwrap().port, Some(9000));
        assert_eq!(resolve(&["--port=1", "--port=2"]).unwrap().port, Some(1));
    }

    #[test]
    fn test_earliest_scalar_wins() {
        let config = resolve(&["--host=X", "--host=Y"]).unwrap();
        assert_eq!(config.host.as_deref(), Some("X"));

        let config = resolve(&["--index=a.html", "--index=b.html"]).unwrap();
        assert_eq!(config.index, "a.html");
    }

    #[test]
    fn test_quiet_verbose_earliest_wins() {
        assert_eq!(resolve(&["--quiet", "--verbose"]).unwrap().log_level, 0);
        assert_eq!(resolve(&["-V", "-q"]).unwrap().log_level, 3);
        assert_eq!(resolve(&[]).unwrap().log_level, 2);
    }

    #[test]
    fn test_open_accumulates_latest_first() {
        let config = resolve(&["--open=a", "--open=b"]).unwrap();
        assert_eq!(config.open, OpenTarget::Paths(vec!["b".into(), "a".into()]));

        let config = resolve(&["--open=only"]).unwrap();
        assert_eq!(config.open, OpenTarget::Path("only".into()));
    }

    #[test]
    fn test_no_browser_overrides_open() {
        let config = resolve(&["--open=a", "--no-browser", "--open=b"]).unwrap();
        assert_eq!(config.open, OpenTarget::Enabled(false));

        let config = resolve(&["--no-browser"]).unwrap();
        assert!(config.open.is_disabled());
    }

    #[test]
    fn test_open_extends_file_value() {
        let mut config = Config {
            open: OpenTarget::Path("/docs".into()),
            ..Config::default()
        };
        Invocation::parse(&["--open=/api"])
            .flags
            .apply(&mut config, Path::new("/work"))
            .unwrap();
        assert_eq!(
            config.open,
            OpenTarget::Paths(vec!["/docs".into(), "/api".into()])
        );
    }

    #[test]
    fn test_mount_resolved_against_cwd() {
        let config = resolve(&["--mount=/components:./node_modules"]).unwrap();
        assert_eq!(config.mount[0].route, "/components");
        assert_eq!(config.mount[0].path, PathBuf::from("/work/node_modules"));
    }

    #[test]
    fn test_mount_keeps_colons_in_path() {
        let config = resolve(&[r"--mount=/docs:C:\files"]).unwrap();
        assert_eq!(config.mount[0].route, "/docs");
        assert!(config.mount[0].path.is_absolute());
        assert!(config.mount[0].path.ends_with(r"C:\files"));
    }

    #[test]
    fn test_proxy_target_is_opaque() {
        let config = resolve(&["--proxy=/api:http://host:1234"]).unwrap();
        assert_eq!(config.proxy[0].prefix, "/api");
        assert_eq!(config.proxy[0].target, "http://host:1234");
    }

    #[test]
    fn test_composites_append_latest_first() {
        let config = resolve(&[
            "--mount=/a:a",
            "--middleware=first",
            "--spa",
            "--mount=/b:b",
            "--middleware=last",
        ])
        .unwrap();

        let routes: Vec<_> = config.mount.iter().map(|m| m.route.as_str()).collect();
        assert_eq!(routes, vec!["/b", "/a"]);
        assert_eq!(config.middleware, vec!["last", "spa", "first"]);
    }

    #[test]
    fn test_middleware_appends_to_existing() {
        let mut config = Config {
            middleware: vec!["logger".into()],
            ..Config::default()
        };
        Invocation::parse(&["--spa", "--spa"])
            .flags
            .apply(&mut config, Path::new("/work"))
            .unwrap();
        assert_eq!(config.middleware, vec!["logger", "spa", "spa"]);
    }

    #[test]
    fn test_malformed_mount_is_fatal() {
        let err = resolve(&["--mount=/nowhere"]).unwrap_err();
        assert!(matches!(err, AliveError::Coerce(_)));
    }

    #[test]
    fn test_mimetypes_merge() {
        let config = resolve(&["--mimetypes={'a/b':['.x']}", "--mimetypes={'c/d':['.y']}"]).unwrap();
        let mime = config.mimetypes.unwrap();
        assert!(mime.contains_key("a/b"));
        assert!(mime.contains_key("c/d"));
    }

    #[test]
    fn test_mimetypes_duplicate_key_earliest_wins() {
        let config = resolve(&["--mimetypes={'a/b':['.x']}", "--mimetypes={'a/b':['.z']}"]).unwrap();
        assert_eq!(config.mimetypes.unwrap()["a/b"], vec![".x"]);
    }

    #[test]
    fn test_mimetypes_merge_onto_file_value() {
        let mut config = Config {
            mimetypes: Some([("a/b".to_string(), vec![".old".to_string()])].into()),
            ..Config::default()
        };
        Invocation::parse(&["--mimetypes={'a/b':['.new'],'c/d':['.y']}"])
            .flags
            .apply(&mut config, Path::new("/work"))
            .unwrap();
        let mime = config.mimetypes.unwrap();
        assert_eq!(mime["a/b"], vec![".new"]);
        assert_eq!(mime["c/d"], vec![".y"]);
    }

    #[test]
    fn test_mimetypes_malformed_is_fatal() {
        assert!(resolve(&["--mimetypes={'a/b'"]).is_err());
    }

    #[test]
    fn test_ignore_pattern_flag() {
        let config = resolve(&["--ignorePattern=\\.tmp$"]).unwrap();
        assert!(config.ignore_pattern.unwrap().is_match("a.tmp"));

        let err = resolve(&["--ignorePattern=ok", "--ignorePattern=("]).unwrap_err();
        assert!(matches!(err, AliveError::Coerce(_)));
    }

    #[test]
    fn test_lists_and_booleans() {
        let config = resolve(&[
            "--watch=src,css",
            "--ignore=dist",
            "--browser=firefox,chrome",
            "--no-css-inject",
            "--cors",
            "--entry-file=404.html",
            "--htpasswd=.htpasswd",
        ])
        .unwrap();

        assert_eq!(
            config.watch,
            Some(vec![PathBuf::from("src"), PathBuf::from("css")])
        );
        assert_eq!(config.ignore, Some(vec![PathBuf::from("dist")]));
        assert_eq!(
            config.browser,
            Some(vec!["firefox".to_string(), "chrome".to_string()])
        );
        assert!(config.no_css_inject);
        assert!(config.cors);
        assert_eq!(config.entry_file.as_deref(), Some("404.html"));
        assert_eq!(config.htpasswd.as_deref(), Some(".htpasswd"));
    }

    #[test]
    fn test_terminal_latest_wins() {
        let set = FlagSet::collect(["--version", "--port=1", "--help"]);
        assert_eq!(set.terminal(), Some(TerminalAction::Help));
        assert_eq!(FlagSet::collect(["--port=1"]).terminal(), None);
    }

    #[test]
    fn test_shutdown_requested() {
        assert!(FlagSet::collect(["--test"]).shutdown_requested());
        assert!(!FlagSet::collect(["--port=1"]).shutdown_requested());
    }
}
