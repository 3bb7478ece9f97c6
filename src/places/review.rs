use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const GLUTEN_FREE_PATTERNS: &[&str] = &["gluten free", "gluten-free"];

const CELIAC_PATTERNS: &[&str] = &[
    "celiac",
    "coeliac",
    "celíaco",
    "celiaco",
    "celíaca",
    "celiaca",
    "cœliaque",
    "coeliaque",
    "céliaque",
    "zöliakie",
    "zoeliakie",
    "coeliakie",
    "celiachia",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author_name: String,
    pub text: String,
    /// Unix seconds.
    pub time: i64,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Review {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }

    pub fn mentions_gluten_free(&self) -> bool {
        contains_any(&self.text, GLUTEN_FREE_PATTERNS)
    }

    pub fn mentions_celiac(&self) -> bool {
        contains_any(&self.text, CELIAC_PATTERNS)
    }
}

fn contains_any(text: &str, patterns: &[&str]) -> bool {
    let lower = text.to_lowercase();
    patterns.iter().any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(text: &str) -> Review {
        Review {
            author_name: "Ana".into(),
            text: text.into(),
            time: 1_700_000_000,
            rating: Some(5),
        }
    }

    #[test]
    fn test_gluten_free_any_case() {
        assert!(review("Great GLUTEN FREE menu").mentions_gluten_free());
        assert!(review("gluten-free pasta!").mentions_gluten_free());
        assert!(review("Gluten Free buns").mentions_gluten_free());
        assert!(!review("glutenfree? not sure").mentions_gluten_free());
        assert!(!review("").mentions_gluten_free());
    }

    #[test]
    fn test_celiac_variants() {
        for text in [
            "safe for CELIAC folks",
            "my coeliac daughter",
            "apto para celíacos",
            "Cœliaque bienvenue",
            "ZÖLIAKIE freundlich",
            "ottimo per la celiachia",
            "geschikt bij coeliakie",
        ] {
            assert!(review(text).mentions_celiac(), "{text}");
        }
        assert!(!review("gluten free options").mentions_celiac());
    }

    #[test]
    fn test_published_at() {
        let r = review("x");
        assert_eq!(r.published_at().map(|d| d.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_deserialize_without_rating() {
        let r: Review =
            serde_json::from_str(r#"{"author_name":"B","text":"ok","time":0}"#).unwrap();
        assert_eq!(r.rating, None);
    }
}
