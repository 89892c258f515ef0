use serde::{Deserialize, Serialize};

/// A link to reading or reference material kept beside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyMaterial {
    pub id: u64,
    pub name: String,
    /// Full http(s) URL
    pub url: String,
}
