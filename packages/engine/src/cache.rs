use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::rewrite::{rewrite_statement, RewrittenStatement};
use crate::PrepareError;

/// Memoizes rewrites per raw SQL text. The rewrite is a deterministic
/// function of its input, so a cached entry never goes stale; failures are
/// not cached.
#[derive(Default)]
pub(crate) struct StatementCache {
    statements: RwLock<HashMap<String, Arc<RewrittenStatement>>>,
}

impl StatementCache {
    pub(crate) fn rewrite_cached(&self, sql: &str) -> Result<Arc<RewrittenStatement>, PrepareError> {
        if let Some(found) = self
            .statements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(sql)
        {
            return Ok(found.clone());
        }

        tracing::debug!(sql, "statement cache miss");
        let rewritten = Arc::new(rewrite_statement(sql)?);
        self.statements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sql.to_string(), rewritten.clone());
        Ok(rewritten)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.statements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::StatementCache;

    #[test]
    fn second_rewrite_of_the_same_text_is_memoized() {
        let cache = StatementCache::default();

        let first = cache.rewrite_cached("select :id").expect("rewrite should succeed");
        let second = cache.rewrite_cached("select :id").expect("rewrite should succeed");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_texts_get_distinct_entries() {
        let cache = StatementCache::default();

        cache.rewrite_cached("select :a").expect("rewrite should succeed");
        cache.rewrite_cached("select :b").expect("rewrite should succeed");

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_rewrites_are_not_cached() {
        let cache = StatementCache::default();

        cache
            .rewrite_cached("select :")
            .expect_err("malformed statement should fail");

        assert_eq!(cache.len(), 0);
    }
}
