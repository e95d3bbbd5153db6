use crate::config::model::{
    Config, ConfigError, DebugConfig, ExtractionBackend, ExtractionConfig, OpenAiConfig,
    OutputConfig, OutputLayout,
};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1/";
const DEFAULT_MAX_CONTENT_CHARS: u64 = 60_000;
const DEFAULT_PAGE_DELAY_MS: u64 = 1500;

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn load_config(backend_override: Option<ExtractionBackend>) -> Result<Config, ConfigError> {
    load_config_from(&|name: &str| env::var(name).ok(), backend_override)
}

/// Builds the config from `lookup`; empty values count as unset
pub fn load_config_from(
    lookup: Lookup,
    backend_override: Option<ExtractionBackend>,
) -> Result<Config, ConfigError> {
    let lookup: Lookup = &|name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    let backend = match backend_override {
        Some(backend) => backend,
        None => load_enum_config(lookup, "EXTRACTION_BACKEND", ExtractionBackend::Llm)?,
    };
    let extraction = match backend {
        ExtractionBackend::Heuristic => ExtractionConfig::Heuristic,
        ExtractionBackend::Llm => ExtractionConfig::OpenAi(OpenAiConfig {
            api_key: load_required_config(lookup, "OPENAI_API_KEY")?,
            model: load_string_config(lookup, "OPENAI_MODEL", DEFAULT_MODEL),
            api_base: load_string_config(lookup, "OPENAI_BASE_URL", DEFAULT_API_BASE),
            max_content_chars: load_u64_config(
                lookup,
                "MAX_CONTENT_CHARS",
                DEFAULT_MAX_CONTENT_CHARS,
            )? as usize,
        }),
    };

    Ok(Config {
        debug_config: DebugConfig {
            url_limit: load_i32_config(lookup, "DEBUG_URL_LIMIT")?,
        },
        extraction,
        websites_file: PathBuf::from(load_string_config(
            lookup,
            "WEBSITES_FILE",
            "websites_list.txt",
        )),
        output: OutputConfig {
            data_dir: PathBuf::from(load_string_config(lookup, "DATA_DIR", "data")),
            layout: load_enum_config(lookup, "OUTPUT_LAYOUT", OutputLayout::All)?,
            emit_link_alias: load_bool_config(lookup, "EMIT_LINK_ALIAS", false)?,
        },
        page_delay: Duration::from_millis(load_u64_config(
            lookup,
            "PAGE_DELAY_MS",
            DEFAULT_PAGE_DELAY_MS,
        )?),
    })
}

fn load_required_config(lookup: Lookup, name: &str) -> Result<String, ConfigError> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .ok_or_else(|| ConfigError::Missing(name.to_string()))
}

fn load_string_config(lookup: Lookup, name: &str, default: &str) -> String {
    lookup(name)
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| default.to_string())
}

fn load_bool_config(lookup: Lookup, name: &str, default: bool) -> Result<bool, ConfigError> {
    lookup(name)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| invalid(name, "either 'true' or 'false'"))
}

fn load_i32_config(lookup: Lookup, name: &str) -> Result<Option<i32>, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(name, "an integer number")),
        None => Ok(None),
    }
}

fn load_u64_config(lookup: Lookup, name: &str, default: u64) -> Result<u64, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| invalid(name, "a positive integer number")),
        None => Ok(default),
    }
}

fn load_enum_config<T: FromStr>(lookup: Lookup, name: &str, default: T) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| invalid(name, "one of the supported values")),
        None => Ok(default),
    }
}

fn invalid(name: &str, expected: &'static str) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(
        vars: &[(&str, &str)],
        backend: Option<ExtractionBackend>,
    ) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        load_config_from(&|name: &str| vars.get(name).cloned(), backend)
    }

    #[test_log::test]
    fn when_api_key_is_missing_should_fail() {
        let result = load(&[], None);

        assert!(
            matches!(result, Err(ConfigError::Missing(ref name)) if name == "OPENAI_API_KEY"),
            "{:?}",
            result
        );
    }

    #[test_log::test]
    fn when_api_key_is_blank_should_fail() {
        let result = load(&[("OPENAI_API_KEY", "  ")], None);

        assert!(matches!(result, Err(ConfigError::Missing(_))));
    }

    #[test_log::test]
    fn should_load_defaults() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")], None).unwrap();

        match config.extraction {
            ExtractionConfig::OpenAi(openai) => {
                assert_eq!(openai.api_key, "sk-test");
                assert_eq!(openai.model, DEFAULT_MODEL);
                assert_eq!(openai.api_base, DEFAULT_API_BASE);
            }
            other => panic!("Unexpected extraction config {:?}", other),
        }
        assert_eq!(config.websites_file, PathBuf::from("websites_list.txt"));
        assert_eq!(config.output.data_dir, PathBuf::from("data"));
        assert_eq!(config.output.layout, OutputLayout::All);
        assert!(!config.output.emit_link_alias);
        assert_eq!(config.page_delay, Duration::from_millis(DEFAULT_PAGE_DELAY_MS));
        assert_eq!(config.debug_config.url_limit, None);
    }

    #[test_log::test]
    fn heuristic_backend_should_not_need_api_key() {
        let config = load(&[("EXTRACTION_BACKEND", "Heuristic")], None).unwrap();

        assert!(matches!(config.extraction, ExtractionConfig::Heuristic));
    }

    #[test_log::test]
    fn backend_override_should_win_over_environment() {
        let config = load(
            &[("EXTRACTION_BACKEND", "llm")],
            Some(ExtractionBackend::Heuristic),
        )
        .unwrap();

        assert!(matches!(config.extraction, ExtractionConfig::Heuristic));
    }

    #[test_log::test]
    fn should_reject_malformed_values() {
        let base = [("OPENAI_API_KEY", "sk-test")];

        for (name, value) in [
            ("EMIT_LINK_ALIAS", "yes"),
            ("DEBUG_URL_LIMIT", "ten"),
            ("OUTPUT_LAYOUT", "xml"),
            ("PAGE_DELAY_MS", "-1"),
            ("EXTRACTION_BACKEND", "magic"),
        ] {
            let mut vars = base.to_vec();
            vars.push((name, value));

            let result = load(&vars, None);

            assert!(
                matches!(
                    result,
                    Err(ConfigError::Invalid { name: ref invalid, .. }) if invalid == name
                ),
                "{}: {:?}",
                name,
                result
            );
        }
    }

    #[test_log::test]
    fn should_load_overrides() {
        let config = load(
            &[
                ("OPENAI_API_KEY", "sk-test"),
                ("OPENAI_MODEL", "gpt-4o"),
                ("OUTPUT_LAYOUT", "split"),
                ("EMIT_LINK_ALIAS", "true"),
                ("DEBUG_URL_LIMIT", "2"),
                ("PAGE_DELAY_MS", "0"),
                ("DATA_DIR", "site/_data"),
            ],
            None,
        )
        .unwrap();

        assert!(
            matches!(config.extraction, ExtractionConfig::OpenAi(ref c) if c.model == "gpt-4o")
        );
        assert_eq!(config.output.layout, OutputLayout::Split);
        assert!(config.output.emit_link_alias);
        assert_eq!(config.debug_config.url_limit, Some(2));
        assert_eq!(config.page_delay, Duration::ZERO);
        assert_eq!(config.output.data_dir, PathBuf::from("site/_data"));
    }
}
