//! Run configuration
//!
//! A [`Config`] is built once per run, from a TOML file and/or command line
//! values, and handed to [`crate::batch::run`]. Nothing reads configuration
//! from global state.
//!
//! ```toml
//! [prompt]
//! remove_string = "Secret , (c) ACME"
//! input_dir = "./in"
//! output_dir = "./out"
//! strict = false
//! itxt_mode = "simple"
//! ```

use crate::{
    codec::DecodeMode,
    error::{Error, Result},
    rewrite::{ItxtMode, Rewriter},
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// File name looked up next to the executable when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Complete configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Literal strings removed from text values, in application order
    pub remove_strings: Vec<String>,
    /// Directory scanned recursively for `.png` files
    pub input_dir: PathBuf,
    /// Destination directory, created if absent
    pub output_dir: PathBuf,
    pub decode_mode: DecodeMode,
    pub itxt_mode: ItxtMode,
}

impl Config {
    /// Create a configuration with no removal strings and default modes
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            remove_strings: Vec::new(),
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            decode_mode: DecodeMode::default(),
            itxt_mode: ItxtMode::default(),
        }
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        ConfigBuilder::from_file(path)?.build()
    }

    /// Build the rewriter this configuration describes
    pub fn rewriter(&self) -> Rewriter {
        Rewriter::new(&self.remove_strings).with_itxt_mode(self.itxt_mode)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    prompt: ConfigBuilder,
}

/// Partially specified configuration
///
/// Values from several sources are layered with [`ConfigBuilder::merge`];
/// [`ConfigBuilder::build`] checks that the required directories are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigBuilder {
    /// Comma-separated removal list as written in the file
    #[serde(alias = "removeString")]
    pub remove_string: Option<String>,
    #[serde(alias = "inputDir")]
    pub input_dir: Option<PathBuf>,
    #[serde(alias = "outputDir")]
    pub output_dir: Option<PathBuf>,
    pub strict: Option<bool>,
    #[serde(alias = "itxtMode")]
    pub itxt_mode: Option<ItxtMode>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `[prompt]` section of a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse the `[prompt]` section of a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        Ok(file.prompt)
    }

    pub fn remove_string(mut self, list: impl Into<String>) -> Self {
        self.remove_string = Some(list.into());
        self
    }

    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(dir.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn itxt_mode(mut self, mode: ItxtMode) -> Self {
        self.itxt_mode = Some(mode);
        self
    }

    /// Layer `overrides` on top of `self`; set values in `overrides` win
    pub fn merge(self, overrides: ConfigBuilder) -> Self {
        Self {
            remove_string: overrides.remove_string.or(self.remove_string),
            input_dir: overrides.input_dir.or(self.input_dir),
            output_dir: overrides.output_dir.or(self.output_dir),
            strict: overrides.strict.or(self.strict),
            itxt_mode: overrides.itxt_mode.or(self.itxt_mode),
        }
    }

    /// Check required values and produce a [`Config`]
    pub fn build(self) -> Result<Config> {
        let input_dir = non_empty(self.input_dir, "input_dir")?;
        let output_dir = non_empty(self.output_dir, "output_dir")?;

        Ok(Config {
            remove_strings: self
                .remove_string
                .as_deref()
                .map(parse_remove_list)
                .unwrap_or_default(),
            input_dir,
            output_dir,
            decode_mode: if self.strict.unwrap_or(false) {
                DecodeMode::Strict
            } else {
                DecodeMode::Lenient
            },
            itxt_mode: self.itxt_mode.unwrap_or_default(),
        })
    }
}

fn non_empty(dir: Option<PathBuf>, key: &str) -> Result<PathBuf> {
    match dir {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir),
        _ => Err(Error::Config(format!("{} is not set", key))),
    }
}

/// Split a comma-separated removal list, trimming each entry
///
/// Entries that are empty after trimming are dropped.
pub fn parse_remove_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// `config.toml` in the directory holding the running executable
pub fn default_config_path() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| Error::Config("executable has no parent directory".into()))?;
    Ok(dir.join(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remove_list() {
        assert_eq!(
            parse_remove_list(" Secret , (c) ACME,  draft "),
            vec!["Secret", "(c) ACME", "draft"]
        );
        assert!(parse_remove_list("").is_empty());
        assert_eq!(parse_remove_list("a,, ,b"), vec!["a", "b"]);
    }

    #[test]
    fn test_from_toml_str() {
        let config = ConfigBuilder::from_toml_str(
            r#"
            [prompt]
            remove_string = "foo, bar"
            input_dir = "in"
            output_dir = "out"
            strict = true
            itxt_mode = "structured"
            "#,
        )
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(config.remove_strings, vec!["foo", "bar"]);
        assert_eq!(config.input_dir, PathBuf::from("in"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.decode_mode, DecodeMode::Strict);
        assert_eq!(config.itxt_mode, ItxtMode::Structured);
    }

    #[test]
    fn test_camel_case_keys() {
        let config = ConfigBuilder::from_toml_str(
            r#"
            [prompt]
            removeString = "x"
            inputDir = "a"
            outputDir = "b"
            "#,
        )
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(config.remove_strings, vec!["x"]);
        assert_eq!(config.decode_mode, DecodeMode::Lenient);
        assert_eq!(config.itxt_mode, ItxtMode::Simple);
    }

    #[test]
    fn test_missing_dirs() {
        let err = ConfigBuilder::from_toml_str("[prompt]\ninput_dir = \"in\"\n")
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("output_dir")));

        let err = ConfigBuilder::new()
            .input_dir("")
            .output_dir("out")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("input_dir")));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ConfigBuilder::from_toml_str("[prompt\n"),
            Err(Error::ConfigParse(_))
        ));
        assert!(matches!(
            ConfigBuilder::from_toml_str("[prompt]\nitxt_mode = \"fancy\"\n"),
            Err(Error::ConfigParse(_))
        ));
        assert!(matches!(
            ConfigBuilder::from_toml_str("[prompt]\nunknown = 1\n"),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_merge_precedence() {
        let file = ConfigBuilder::new()
            .remove_string("a")
            .input_dir("file_in")
            .output_dir("file_out");
        let cli = ConfigBuilder::new().output_dir("cli_out").strict(true);

        let config = file.merge(cli).build().unwrap();
        assert_eq!(config.remove_strings, vec!["a"]);
        assert_eq!(config.input_dir, PathBuf::from("file_in"));
        assert_eq!(config.output_dir, PathBuf::from("cli_out"));
        assert_eq!(config.decode_mode, DecodeMode::Strict);
    }

    #[test]
    fn test_rewriter_from_config() {
        let mut config = Config::new("in", "out");
        config.remove_strings = vec!["b".into(), "ac".into()];
        config.itxt_mode = ItxtMode::Structured;

        let rewriter = config.rewriter();
        assert_eq!(rewriter.scrub(b"abc"), b"");
        assert_eq!(rewriter.itxt_mode(), ItxtMode::Structured);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/png-scrub/config.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
