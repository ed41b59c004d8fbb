//! Configuration Layers
//!
//! One layer per source (built-in defaults, user file, project file). Every
//! field is optional: a layer only overrides what it actually specifies, and
//! a specified field replaces the lower value wholesale (no element-wise
//! merge of lists or maps). JSON `null` counts as unspecified.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::coerce;
use super::types::{Config, MimeTypes, Mount, OpenTarget, Proxy};
use crate::constants::{config as config_constants, log_level};
use crate::types::{CoerceError, CoerceKind, CoerceResultExt, Result};

/// A value given either as a string or as a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    Single(String),
    List(Vec<String>),
}

impl StringOrList {
    /// Comma-split a single string, keep a list as is
    pub fn split(self) -> Vec<String> {
        match self {
            Self::Single(s) => coerce::split_list(&s),
            Self::List(list) => list,
        }
    }

    /// Wrap a single string without splitting
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(s) => vec![s],
            Self::List(list) => list,
        }
    }
}

/// An integer given either as a JSON number or as a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i64),
    /// Fractional or out-of-range numbers, e.g. `8080.0`
    Float(f64),
    Text(String),
}

impl IntOrString {
    fn coerce(self, field: &'static str) -> Result<Option<i64>> {
        match self {
            Self::Int(n) => Ok(Some(n)),
            Self::Float(n) => coerce::whole_number(field, n).or_recover(),
            Self::Text(raw) => coerce::strict_int(field, &raw).or_recover(),
        }
    }
}

/// Values seeded from the process environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    pub host: Option<String>,
    pub port: Option<String>,
}

impl EnvDefaults {
    /// Read `IP` and `PORT`
    pub fn from_process() -> Self {
        use crate::constants::env;
        Self {
            host: std::env::var(env::HOST).ok(),
            port: std::env::var(env::PORT).ok(),
        }
    }
}

/// One configuration source, as written in `.alive-server.json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLayer {
    pub host: Option<String>,
    pub port: Option<IntOrString>,
    pub open: Option<OpenTarget>,
    pub browser: Option<StringOrList>,
    pub watch: Option<StringOrList>,
    pub ignore: Option<StringOrList>,
    pub ignore_pattern: Option<String>,
    pub no_css_inject: Option<bool>,
    #[serde(rename = "file")]
    pub entry_file: Option<String>,
    pub mount: Option<Vec<Mount>>,
    pub proxy: Option<Vec<Proxy>>,
    pub middleware: Option<Vec<String>>,
    /// Kept raw: anything but an object is discarded at conversion
    pub mimetypes: Option<Value>,
    pub index: Option<String>,
    pub log_level: Option<u8>,
    pub wait: Option<IntOrString>,
    pub htpasswd: Option<String>,
    pub cors: Option<bool>,
    pub https: Option<String>,
    pub https_module: Option<String>,

    /// Keys this version does not understand
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

impl ConfigLayer {
    /// The built-in bottom layer
    pub fn defaults(env: &EnvDefaults) -> Self {
        Self {
            host: env.host.clone(),
            port: env.port.clone().map(IntOrString::Text),
            open: Some(OpenTarget::Enabled(true)),
            mount: Some(Vec::new()),
            proxy: Some(Vec::new()),
            middleware: Some(Vec::new()),
            index: Some(config_constants::DEFAULT_INDEX.to_string()),
            log_level: Some(log_level::DEFAULT),
            ..Self::default()
        }
    }

    /// Parse a layer from JSON text
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Lay `upper` over `self`; every field `upper` specifies wins
    pub fn overlay(self, upper: ConfigLayer) -> ConfigLayer {
        let mut unknown = self.unknown;
        unknown.extend(upper.unknown);

        ConfigLayer {
            host: upper.host.or(self.host),
            port: upper.port.or(self.port),
            open: upper.open.or(self.open),
            browser: upper.browser.or(self.browser),
            watch: upper.watch.or(self.watch),
            ignore: upper.ignore.or(self.ignore),
            ignore_pattern: upper.ignore_pattern.or(self.ignore_pattern),
            no_css_inject: upper.no_css_inject.or(self.no_css_inject),
            entry_file: upper.entry_file.or(self.entry_file),
            mount: upper.mount.or(self.mount),
            proxy: upper.proxy.or(self.proxy),
            middleware: upper.middleware.or(self.middleware),
            mimetypes: upper.mimetypes.or(self.mimetypes),
            index: upper.index.or(self.index),
            log_level: upper.log_level.or(self.log_level),
            wait: upper.wait.or(self.wait),
            htpasswd: upper.htpasswd.or(self.htpasswd),
            cors: upper.cors.or(self.cors),
            https: upper.https.or(self.https),
            https_module: upper.https_module.or(self.https_module),
            unknown,
        }
    }

    /// Coerce the merged layers into a working [`Config`]
    ///
    /// `ignorePattern` is compiled and `watch`/`ignore` strings are split
    /// here, once, before any flag is applied.
    pub fn into_config(self) -> Result<Config> {
        for key in self.unknown.keys() {
            warn!("Ignoring unknown config key: {}", key);
        }

        let defaults = Config::default();

        let port = match self.port {
            Some(port) => port.coerce("port")?,
            None => None,
        };
        let wait = match self.wait {
            Some(wait) => wait.coerce("wait")?,
            None => None,
        };
        let ignore_pattern = self
            .ignore_pattern
            .map(|raw| coerce::compile_pattern("ignorePattern", &raw))
            .transpose()?;

        Ok(Config {
            root: PathBuf::new(),
            host: self.host,
            port,
            open: self.open.unwrap_or(defaults.open),
            browser: self.browser.map(StringOrList::into_vec),
            watch: self.watch.map(to_paths),
            ignore: self.ignore.map(to_paths),
            ignore_pattern,
            no_css_inject: self.no_css_inject.unwrap_or(false),
            entry_file: self.entry_file.filter(|file| !file.is_empty()),
            mount: self.mount.unwrap_or_default(),
            proxy: self.proxy.unwrap_or_default(),
            middleware: self.middleware.unwrap_or_default(),
            mimetypes: self.mimetypes.map(mimetypes_from_value).transpose()?.flatten(),
            index: self.index.unwrap_or(defaults.index),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            wait,
            htpasswd: self.htpasswd,
            cors: self.cors.unwrap_or(false),
            https: self.https,
            https_module: self.https_module,
        })
    }
}

fn to_paths(value: StringOrList) -> Vec<PathBuf> {
    value.split().into_iter().map(PathBuf::from).collect()
}

/// Objects must map to extension lists; any other JSON type is dropped
fn mimetypes_from_value(value: Value) -> Result<Option<MimeTypes>> {
    if !value.is_object() {
        warn!("Ignoring mimetypes: expected an object, got {}", value);
        return Ok(None);
    }
    debug!("Loaded mimetypes from config file");
    let raw = value.to_string();
    let mimetypes = serde_json::from_value(value).map_err(|e| {
        CoerceError::new("mimetypes", CoerceKind::MimeTypes, raw, e.to_string())
    })?;
    Ok(Some(mimetypes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AliveError;

    fn layer(json: &str) -> ConfigLayer {
        ConfigLayer::from_json(json).unwrap()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ConfigLayer::defaults(&EnvDefaults::default())
            .into_config()
            .unwrap();

        assert_eq!(config.host, None);
        assert_eq!(config.port, None);
        assert_eq!(config.open, OpenTarget::Enabled(true));
        assert!(config.mount.is_empty());
        assert!(config.proxy.is_empty());
        assert!(config.middleware.is_empty());
        assert_eq!(config.index, "index.html");
        assert_eq!(config.log_level, 2);
    }

    #[test]
    fn test_defaults_from_env() {
        let env = EnvDefaults {
            host: Some("0.0.0.0".into()),
            port: Some("9000".into()),
        };
        let config = ConfigLayer::defaults(&env).into_config().unwrap();
        assert_eq!(config.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.port, Some(9000));
    }

    #[test]
    fn test_env_port_malformed_is_ignored() {
        let env = EnvDefaults {
            host: None,
            port: Some("80eighty".into()),
        };
        let config = ConfigLayer::defaults(&env).into_config().unwrap();
        assert_eq!(config.port, None);
    }

    #[test]
    fn test_overlay_upper_wins_and_absent_keeps_lower() {
        let lower = layer(r#"{"host": "a", "port": 1000, "index": "home.html"}"#);
        let upper = layer(r#"{"host": "b", "index": null}"#);
        let merged = lower.overlay(upper).into_config().unwrap();

        assert_eq!(merged.host.as_deref(), Some("b"));
        assert_eq!(merged.port, Some(1000));
        assert_eq!(merged.index, "home.html");
    }

    #[test]
    fn test_overlay_replaces_lists_wholesale() {
        let lower = layer(r#"{"mount": [["/a", "./a"], ["/b", "./b"]]}"#);
        let upper = layer(r#"{"mount": [["/c", "./c"]]}"#);
        let merged = lower.overlay(upper).into_config().unwrap();

        assert_eq!(merged.mount.len(), 1);
        assert_eq!(merged.mount[0].route, "/c");
    }

    #[test]
    fn test_watch_and_ignore_strings_are_split() {
        let config = layer(r#"{"watch": "src,css", "ignore": ["dist", "tmp,x"]}"#)
            .into_config()
            .unwrap();

        assert_eq!(
            config.watch,
            Some(vec![PathBuf::from("src"), PathBuf::from("css")])
        );
        assert_eq!(
            config.ignore,
            Some(vec![PathBuf::from("dist"), PathBuf::from("tmp,x")])
        );
    }

    #[test]
    fn test_ignore_pattern_compiled() {
        let config = layer(r#"{"ignorePattern": "\\.map$"}"#).into_config().unwrap();
        assert!(config.ignore_pattern.unwrap().is_match("app.js.map"));
    }

    #[test]
    fn test_ignore_pattern_invalid_is_fatal() {
        let err = layer(r#"{"ignorePattern": "(["}"#).into_config().unwrap_err();
        assert!(matches!(err, AliveError::Coerce(_)));
    }

    #[test]
    fn test_file_port_as_string_or_number() {
        assert_eq!(layer(r#"{"port": 8181}"#).into_config().unwrap().port, Some(8181));
        assert_eq!(layer(r#"{"port": "8181"}"#).into_config().unwrap().port, Some(8181));
        assert_eq!(layer(r#"{"port": "81x"}"#).into_config().unwrap().port, None);
        assert_eq!(layer(r#"{"port": " 8181 "}"#).into_config().unwrap().port, Some(8181));
    }

    #[test]
    fn test_file_port_as_float() {
        assert_eq!(layer(r#"{"port": 8080.0}"#).into_config().unwrap().port, Some(8080));
        assert_eq!(layer(r#"{"wait": 250.0}"#).into_config().unwrap().wait, Some(250));
        assert_eq!(layer(r#"{"port": 8080.5}"#).into_config().unwrap().port, None);
        assert_eq!(
            layer(r#"{"port": 18446744073709551615}"#).into_config().unwrap().port,
            None
        );
    }

    #[test]
    fn test_mimetypes_non_object_is_discarded() {
        let config = layer(r#"{"mimetypes": ["text/plain"]}"#).into_config().unwrap();
        assert!(config.mimetypes.is_none());

        let config = layer(r#"{"mimetypes": {"a/b": [".x"]}}"#).into_config().unwrap();
        assert_eq!(config.mimetypes.unwrap()["a/b"], vec![".x"]);
    }

    #[test]
    fn test_mimetypes_bad_shape_is_fatal() {
        let err = layer(r#"{"mimetypes": {"a/b": 3}}"#).into_config().unwrap_err();
        assert!(matches!(err, AliveError::Coerce(_)));
    }

    #[test]
    fn test_browser_string_is_not_split() {
        let config = layer(r#"{"browser": "google chrome"}"#).into_config().unwrap();
        assert_eq!(config.browser, Some(vec!["google chrome".to_string()]));
    }

    #[test]
    fn test_file_middleware_and_proxy() {
        let config = layer(r#"{"middleware": ["logger"], "proxy": [["/api", "http://localhost:3000"]]}"#)
            .into_config()
            .unwrap();
        assert_eq!(config.middleware, vec!["logger"]);
        assert_eq!(config.proxy[0].prefix, "/api");
        assert_eq!(config.proxy[0].target, "http://localhost:3000");
    }

    #[test]
    fn test_unknown_keys_are_collected() {
        let parsed = layer(r#"{"host": "x", "livereloadPort": 35729}"#);
        assert!(parsed.unknown.contains_key("livereloadPort"));
        assert!(parsed.into_config().is_ok());
    }
}
