use crate::config::model::ConfigError;
use std::fs;
use std::path::Path;
use tracing::info;

/// URLs listed one per line; blank lines and `#` comments are ignored
pub fn parse_site_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn load_site_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::SiteList {
        path: path.to_path_buf(),
        source,
    })?;
    let sites = parse_site_list(&text);

    info!("Loaded {} sites from {}", sites.len(), path.display());

    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn should_ignore_blank_lines_and_comments() {
        let sites = parse_site_list(
            "# Wisconsin\nhttps://example.com/events\n\n   \n  https://example.org/calendar  \n  # https://disabled.example.com\n",
        );

        assert_eq!(
            sites,
            vec!["https://example.com/events", "https://example.org/calendar"]
        );
    }

    #[test_log::test]
    fn when_file_is_missing_should_fail() {
        let result = load_site_list(Path::new("does/not/exist.txt"));

        assert!(matches!(result, Err(ConfigError::SiteList { .. })));
    }
}
