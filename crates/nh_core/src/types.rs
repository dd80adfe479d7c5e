use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Label shown for the default category until the user picks another one.
pub const DEFAULT_CATEGORY_NAME: &str = "Tổng hợp";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub source: Source,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleList {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl ArticleList {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            status: "ok".to_string(),
            total_results: articles.len() as u64,
            articles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Country {
    #[default]
    Us,
    Jp,
    Ar,
    Au,
    Ca,
    Fr,
    Cn,
    Hk,
    Id,
    Ie,
    In,
    It,
    Gb,
}

impl Country {
    /// Countries in the order the header lists them.
    pub const ALL: [Country; 13] = [
        Country::Us,
        Country::Jp,
        Country::Ar,
        Country::Au,
        Country::Ca,
        Country::Fr,
        Country::Cn,
        Country::Hk,
        Country::Id,
        Country::Ie,
        Country::In,
        Country::It,
        Country::Gb,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Country::Us => "us",
            Country::Jp => "jp",
            Country::Ar => "ar",
            Country::Au => "au",
            Country::Ca => "ca",
            Country::Fr => "fr",
            Country::Cn => "cn",
            Country::Hk => "hk",
            Country::Id => "id",
            Country::Ie => "ie",
            Country::In => "in",
            Country::It => "it",
            Country::Gb => "gb",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Country::Us => "Hoa Kỳ",
            Country::Jp => "Nhật Bản",
            Country::Ar => "Argentina",
            Country::Au => "Australia",
            Country::Ca => "Canada",
            Country::Fr => "Pháp",
            Country::Cn => "Trung Quốc",
            Country::Hk => "Hồng Kông",
            Country::Id => "Indonesia",
            Country::Ie => "Ireland",
            Country::In => "Ấn độ",
            Country::It => "Italia",
            Country::Gb => "Anh",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Country::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| Error::InvalidCountry(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelection {
    pub category: Category,
    pub display_name: String,
}

impl Default for CategorySelection {
    fn default() -> Self {
        Self {
            category: Category::default(),
            display_name: DEFAULT_CATEGORY_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountrySelection {
    pub country: Country,
}

/// A trimmed, non-empty search term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Returns `None` when the input is blank after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let term = raw.trim();
        if term.is_empty() {
            None
        } else {
            Some(Self(term.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
