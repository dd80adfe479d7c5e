use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct HeaderConfig {
    /// Quiescence window between the last keystroke and the search request
    pub debounce: Duration,
    /// Paths that already show the home view
    pub home_paths: Vec<String>,
}

impl HeaderConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn is_home(&self, path: &str) -> bool {
        self.home_paths.iter().any(|p| p == path)
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            home_paths: vec![nh_core::HOME_PATH.to_string(), "/".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_paths() {
        let config = HeaderConfig::default();
        assert!(config.is_home("/home"));
        assert!(config.is_home("/"));
        assert!(!config.is_home("/news/abc"));
        assert_eq!(config.debounce, Duration::from_millis(500));
    }
}
