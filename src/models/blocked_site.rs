use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedSite {
    pub id: u64,
    pub name: String,
    /// Host name, e.g. `reddit.com`
    pub url: String,
    pub is_blocked: bool,
}

impl BlockedSite {
    pub fn new(id: u64, name: &str, url: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            url: url.to_string(),
            is_blocked: true,
        }
    }

    /// Whether `host` is this site or one of its subdomains.
    pub fn matches_host(&self, host: &str) -> bool {
        host == self.url
            || host
                .strip_suffix(self.url.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}
