//! Market categorization
//!
//! Tags win; keyword heuristics are the fallback.

use super::NormalizedMarket;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category label attached to every processed market
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Politics,
    Sports,
    Crypto,
    Entertainment,
    Technology,
    Finance,
    Weather,
    /// Upstream tag label outside the built-in set
    Tagged(String),
    Other,
}

impl Category {
    /// Map a lower-cased label onto a category
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "politics" => Category::Politics,
            "sports" => Category::Sports,
            "crypto" => Category::Crypto,
            "entertainment" => Category::Entertainment,
            "technology" => Category::Technology,
            "finance" => Category::Finance,
            "weather" => Category::Weather,
            "other" | "" => Category::Other,
            other => Category::Tagged(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Politics => "politics",
            Category::Sports => "sports",
            Category::Crypto => "crypto",
            Category::Entertainment => "entertainment",
            Category::Technology => "technology",
            Category::Finance => "finance",
            Category::Weather => "weather",
            Category::Tagged(label) => label,
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::from_label(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

/// One row of the keyword table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Ordered category -> keywords table; the first matching row wins
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryKeywords {
    rules: Vec<(Category, Vec<String>)>,
}

impl CategoryKeywords {
    /// Build from configuration rows; keywords are lower-cased
    pub fn from_rules(rules: &[CategoryRule]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|rule| {
                    (
                        Category::from_label(&rule.category),
                        rule.keywords
                            .iter()
                            .map(|k| k.trim().to_lowercase())
                            .filter(|k| !k.is_empty())
                            .collect(),
                    )
                })
                .collect(),
        }
    }

    /// First category with a keyword contained in `haystack` (already lower-cased)
    fn classify(&self, haystack: &str) -> Option<&Category> {
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k.as_str())))
            .map(|(category, _)| category)
    }
}

impl Default for CategoryKeywords {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            (
                "politics",
                &[
                    "election", "president", "trump", "biden", "harris", "senate", "congress",
                    "governor", "democrat", "republican", "parliament", "prime minister", "vote",
                ],
            ),
            (
                "sports",
                &[
                    "nba", "nfl", "mlb", "nhl", "soccer", "football", "basketball", "baseball",
                    "tennis", "golf", "super bowl", "world cup", "olympics", "championship",
                    "premier league", "ufc",
                ],
            ),
            (
                "crypto",
                &[
                    "bitcoin", "btc", "ethereum", "crypto", "solana", "blockchain", "dogecoin",
                    "stablecoin", "token",
                ],
            ),
            (
                "entertainment",
                &[
                    "movie", "film", "oscar", "grammy", "emmy", "album", "box office",
                    "celebrity", "netflix", "taylor swift", "music",
                ],
            ),
            (
                "technology",
                &[
                    "openai", "artificial intelligence", "apple", "google", "tesla", "spacex",
                    "microsoft", "nvidia", "iphone", "software", "tech",
                ],
            ),
            (
                "finance",
                &[
                    "stock", "the fed", "federal reserve", "interest rate", "inflation", "gdp",
                    "recession", "s&p", "nasdaq", "dow jones", "earnings", "market cap",
                ],
            ),
            (
                "weather",
                &[
                    "hurricane", "temperature", "weather", "climate", "storm", "snow",
                    "rainfall", "heat wave",
                ],
            ),
        ];

        let rules: Vec<CategoryRule> = table
            .iter()
            .map(|(category, keywords)| CategoryRule {
                category: category.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            })
            .collect();
        Self::from_rules(&rules)
    }
}

/// Assigns categories using tags first, then the keyword table
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    keywords: CategoryKeywords,
}

impl Categorizer {
    pub fn new(keywords: CategoryKeywords) -> Self {
        Self { keywords }
    }

    /// Categorize a normalized market
    pub fn categorize(&self, market: &NormalizedMarket) -> Category {
        if let Some(tag) = market
            .tags
            .iter()
            .map(|t| t.trim().to_lowercase())
            .find(|t| !t.is_empty() && t != "all" && t != "other")
        {
            return Category::from_label(&tag);
        }

        let haystack = format!(
            "{} {} {}",
            market.question,
            market.description,
            market.tags.join(" ")
        )
        .to_lowercase();

        self.keywords
            .classify(&haystack)
            .cloned()
            .unwrap_or(Category::Other)
    }
}
