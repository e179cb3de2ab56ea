//! Extractor registry and site classification.
//!
//! An explicit registry object constructed once at startup from a list of
//! extractor constructors; no load-time self-registration.

use std::sync::Arc;

use super::{NexusAudiencesExtractor, NexusPhpExtractor, SiteExtractor, YemaExtractor};

/// Ordered collection of registered site extractors.
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn SiteExtractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create a registry with every built-in site family registered.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(NexusAudiencesExtractor::new()));
        registry.register(Arc::new(YemaExtractor));
        registry.register(Arc::new(NexusPhpExtractor));
        registry
    }

    /// Register an extractor, keeping the collection sorted by ascending
    /// order. The sort is stable, so ties keep registration order.
    pub fn register(&mut self, extractor: Arc<dyn SiteExtractor>) {
        self.extractors.push(extractor);
        self.extractors.sort_by_key(|e| e.order());
    }

    /// Classify a site from its landing page content.
    ///
    /// Returns the lowest-order extractor whose predicate matches, or `None`
    /// when the site is unsupported.
    pub fn classify(&self, page: &str) -> Option<Arc<dyn SiteExtractor>> {
        self.extractors.iter().find(|e| e.matches(page)).cloned()
    }

    /// Schemes in classification order.
    pub fn schemes(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.scheme()).collect()
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
