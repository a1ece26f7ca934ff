//! Mock Content Service Implementation
//!
//! Serves a fixed in-process catalog. Tag lookup walks the requested tags
//! in order and yields every catalog item carrying that tag, so repeated
//! tags yield repeated items.

use crate::{ContentError, ContentItem, ContentService};

/// Mock content service backed by an in-memory catalog
#[derive(Debug, Clone)]
pub struct MockContentService {
    catalog: Vec<ContentItem>,
}

impl MockContentService {
    /// Create a mock serving the built-in sample catalog
    pub fn new() -> Self {
        Self {
            catalog: sample_catalog(),
        }
    }

    /// Create a mock serving the given items
    pub fn with_items(catalog: Vec<ContentItem>) -> Self {
        Self { catalog }
    }

    /// Create a mock with no content at all
    pub fn empty() -> Self {
        Self {
            catalog: Vec::new(),
        }
    }
}

impl Default for MockContentService {
    fn default() -> Self {
        Self::new()
    }
}

fn item(id: &str, tag: &str, problem: &str, answer: &str, explanation: &str) -> ContentItem {
    ContentItem {
        content_id: id.to_string(),
        usmos: vec![tag.to_string()],
        problem: problem.to_string(),
        answer: answer.to_string(),
        explanation: Some(explanation.to_string()),
    }
}

/// Built-in sample catalog used for local development
pub fn sample_catalog() -> Vec<ContentItem> {
    vec![
        item(
            "content123",
            "MATH.ALG.1",
            "Solve for x: x + 5 = 10",
            "x = 5",
            "Subtract 5 from both sides to isolate x.",
        ),
        item(
            "content456",
            "MATH.ALG.2",
            "Solve the system of equations: x + y = 10, x - y = 4",
            "x = 7, y = 3",
            "Add the equations to eliminate y and solve for x, then substitute to find y.",
        ),
        item(
            "content789",
            "SCIENCE.PHYS.1",
            "A ball is thrown upward with an initial velocity of 20 m/s. How high will it go?",
            "20.4 meters",
            "Use the formula h = v²/(2g) where g = 9.8 m/s².",
        ),
    ]
}

#[async_trait::async_trait]
impl ContentService for MockContentService {
    async fn get_content_by_tags(&self, tags: &[String]) -> Result<Vec<ContentItem>, ContentError> {
        let items: Vec<ContentItem> = tags
            .iter()
            .flat_map(|tag| self.catalog.iter().filter(move |c| c.usmos.contains(tag)))
            .cloned()
            .collect();

        tracing::debug!(tags = ?tags, count = items.len(), "Mock content lookup by tags");
        Ok(items)
    }

    async fn get_content_by_id(
        &self,
        content_id: &str,
    ) -> Result<Option<ContentItem>, ContentError> {
        Ok(self
            .catalog
            .iter()
            .find(|c| c.content_id == content_id)
            .cloned())
    }
}
