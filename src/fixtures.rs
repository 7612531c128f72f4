#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::Deserialize;

    use crate::error::KConfigError;
    use crate::remote::Fetcher;

    /// A provider's view of the merged config.
    #[derive(Deserialize, Debug, Default, PartialEq)]
    #[serde(default)]
    pub struct ProviderConfig {
        pub kairos: KairosSection,
    }

    #[derive(Deserialize, Debug, Default, PartialEq)]
    #[serde(default)]
    pub struct KairosSection {
        pub network_token: String,
        pub other_key: String,
    }

    /// Remote document carrying a header and one bundle.
    pub const REMOTE_BUNDLES: &str =
        "#kairos-config\nbundles:\n  - targets:\n      - package:utils/edgevpn\n";

    // -- In-memory fetcher -------------------------------------------------------

    /// Serves bodies from a map. Unknown URLs fail like a 404.
    #[derive(Default)]
    pub struct MapFetcher {
        bodies: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl MapFetcher {
        pub fn with(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.to_string());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Fetcher for MapFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, KConfigError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .get(url)
                .map(|body| body.clone().into_bytes())
                .ok_or_else(|| KConfigError::RemoteFetch {
                    url: url.to_string(),
                    reason: "404 Not Found".into(),
                })
        }
    }

    #[test]
    fn map_fetcher_serves_known_urls() {
        let fetcher = MapFetcher::default().with("https://a/b", "x: 1\n");
        assert_eq!(fetcher.fetch("https://a/b").unwrap(), b"x: 1\n".to_vec());
        assert!(fetcher.fetch("https://a/c").is_err());
        assert_eq!(fetcher.calls(), 2);
    }
}
