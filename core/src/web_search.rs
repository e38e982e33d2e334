//! Web search capability offered to the structure prompt.
//!
//! Real search engines plug in through [`WebSearch`]; [`PlaceholderWebSearch`]
//! answers deterministically with picsum.photos image links.

use async_trait::async_trait;
use pptmaker_common::SearchResult;

use crate::error::Result;

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Stand-in search that fabricates stable image links for any query.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderWebSearch;

/// Percent-encoded seed used in placeholder links: every whitespace run,
/// leading and trailing ones included, becomes a single `-`.
pub fn query_seed(query: &str) -> String {
    let mut dashed = String::with_capacity(query.len());
    let mut in_whitespace = false;
    for c in query.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                dashed.push('-');
            }
            in_whitespace = true;
        } else {
            dashed.push(c);
            in_whitespace = false;
        }
    }
    urlencoding::encode(&dashed.to_lowercase()).into_owned()
}

#[async_trait]
impl WebSearch for PlaceholderWebSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        tracing::info!("Performing placeholder web search for image: {query}");
        let seed = query_seed(query);
        Ok(vec![
            SearchResult {
                title: format!("Image Result for {query}"),
                link: format!("https://picsum.photos/seed/{seed}/400/300"),
                snippet: Some(format!("An image related to {query}.")),
            },
            SearchResult {
                title: format!("Web page about {query}"),
                link: format!("https://example.com/info/{seed}"),
                snippet: Some(format!("Information about {query}.")),
            },
            SearchResult {
                title: format!("Another Image Result for {query}"),
                link: format!("https://picsum.photos/seed/{seed}-alt/400/300"),
                snippet: Some(format!("Alternative image for {query}.")),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_dashed_and_encoded() {
        assert_eq!(query_seed("Team  Photo"), "team-photo");
        assert_eq!(query_seed("R&D lab"), "r%26d-lab");
    }

    #[test]
    fn edge_whitespace_is_kept_as_dashes() {
        assert_eq!(query_seed(" team photo "), "-team-photo-");
        assert_eq!(query_seed("\tteam\n\nphoto"), "-team-photo");
    }

    #[tokio::test]
    async fn placeholder_results_are_deterministic() {
        let search = PlaceholderWebSearch;
        let first = search.search("team photo").await.unwrap();
        let second = search.search("team photo").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].link, "https://picsum.photos/seed/team-photo/400/300");
        assert_eq!(first[2].link, "https://picsum.photos/seed/team-photo-alt/400/300");
    }
}
