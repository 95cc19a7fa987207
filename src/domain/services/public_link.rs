use crate::domain::ports::PublicLinkRepository;
use crate::error::EngineError;
use std::sync::Arc;

/// Maps an opaque public code, optionally prefixed by a vanity slug, to a
/// tenant. Unknown codes resolve to `None` so callers can render a generic
/// invalid-link response without leaking which part was wrong.
pub struct PublicLinkResolver {
    link_repo: Arc<dyn PublicLinkRepository>,
}

impl PublicLinkResolver {
    pub fn new(link_repo: Arc<dyn PublicLinkRepository>) -> Self {
        Self { link_repo }
    }

    pub async fn resolve(&self, code_or_slug_code: &str) -> Result<Option<String>, EngineError> {
        if let Some(link) = self.link_repo.find_by_code(code_or_slug_code).await? {
            return Ok(Some(link.business_id));
        }

        // "{slug}-{code}" composite: the code is the segment after the last
        // dash; the stripped prefix must match the stored slug.
        if let Some((prefix, code)) = code_or_slug_code.rsplit_once('-')
            && !code.is_empty()
            && let Some(link) = self.link_repo.find_by_code(code).await?
            && link.slug.as_deref() == Some(prefix)
        {
            return Ok(Some(link.business_id));
        }

        Ok(None)
    }
}
