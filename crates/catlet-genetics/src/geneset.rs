//! # Geneset Reference Resolution
//!
//! A geneset tag may redirect to another tag through the `ref` field of its
//! manifest (`dbosoft/ubuntu/latest -> dbosoft/ubuntu/22.04`). The
//! [`GenesetResolver`] follows the redirects to the concrete tag.
//!
//! ## Guards
//!
//! - A tag that appears twice on the chain fails with
//!   [`GeneticsError::CircularReference`].
//! - A chain visiting more tags than the configured maximum (the starting
//!   tag included) fails with [`GeneticsError::ReferenceChainTooLong`].
//!
//! Failures are wrapped with the chain followed so far, rendered
//! `a -> b -> c`.
//!
//! Results are memoized for the lifetime of the resolver, which is one
//! build. Every tag on a successful chain is memoized, so each manifest is
//! read at most once.

use std::collections::HashMap;

use catlet_core::GeneSetIdentifier;
use catlet_genepool::GenePoolReader;
use tokio_util::sync::CancellationToken;

use crate::error::{GeneticsError, GeneticsResult};

/// Follows geneset tag redirects, memoizing results.
pub struct GenesetResolver<'a> {
    reader: &'a dyn GenePoolReader,
    cancel: &'a CancellationToken,
    max_depth: usize,
    resolved: HashMap<GeneSetIdentifier, GeneSetIdentifier>,
}

fn render_chain(chain: &[GeneSetIdentifier]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl<'a> GenesetResolver<'a> {
    /// Create a resolver reading from `reader`.
    pub fn new(
        reader: &'a dyn GenePoolReader,
        cancel: &'a CancellationToken,
        max_depth: usize,
    ) -> Self {
        Self {
            reader,
            cancel,
            max_depth,
            resolved: HashMap::new(),
        }
    }

    /// Every resolution made so far, keyed by the unresolved tag.
    pub fn resolved(&self) -> &HashMap<GeneSetIdentifier, GeneSetIdentifier> {
        &self.resolved
    }

    /// Resolve `id` to its concrete geneset tag.
    ///
    /// # Errors
    ///
    /// Circular or overlong chains, and gene pool failures, each wrapped
    /// with the chain followed so far.
    pub async fn resolve(&mut self, id: &GeneSetIdentifier) -> GeneticsResult<GeneSetIdentifier> {
        if let Some(hit) = self.resolved.get(id) {
            return Ok(hit.clone());
        }

        let mut chain = vec![id.clone()];
        let target = loop {
            let Some(current) = chain.last() else {
                return Err(GeneticsError::Internal("empty reference chain".into()));
            };
            if let Some(hit) = self.resolved.get(current) {
                break hit.clone();
            }
            let next = match self
                .reader
                .resolve_geneset_reference(current, self.cancel)
                .await
            {
                Ok(next) => next,
                Err(e) => return Err(self.chain_error(id, &chain, e.into())),
            };
            let Some(next) = next else {
                break current.clone();
            };
            if chain.contains(&next) {
                chain.push(next.clone());
                return Err(self.chain_error(id, &chain, GeneticsError::CircularReference(next)));
            }
            chain.push(next);
            if chain.len() > self.max_depth {
                let err = GeneticsError::ReferenceChainTooLong {
                    max: self.max_depth,
                };
                return Err(self.chain_error(id, &chain, err));
            }
        };

        tracing::debug!(
            geneset = %id,
            resolved = %target,
            chain = %render_chain(&chain),
            "resolved gene set reference"
        );
        for visited in chain {
            self.resolved.insert(visited, target.clone());
        }
        Ok(target)
    }

    fn chain_error(
        &self,
        id: &GeneSetIdentifier,
        chain: &[GeneSetIdentifier],
        err: GeneticsError,
    ) -> GeneticsError {
        let context = if chain.len() > 1 {
            format!(
                "could not resolve the gene set tag '{id}' ({})",
                render_chain(chain)
            )
        } else {
            format!("could not resolve the gene set tag '{id}'")
        };
        err.context(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catlet_genepool::{GenePoolError, MemoryGenePool};

    fn set(value: &str) -> GeneSetIdentifier {
        GeneSetIdentifier::parse(value).unwrap()
    }

    fn chain_pool(length: usize) -> MemoryGenePool {
        let mut pool = MemoryGenePool::new();
        for i in 0..length {
            let from = set(&format!("acme/base/t{i}"));
            let to = set(&format!("acme/base/t{}", i + 1));
            pool = pool.with_reference(&from, &to);
        }
        pool.with_geneset(&set(&format!("acme/base/t{length}")))
    }

    #[tokio::test]
    async fn concrete_tag_resolves_to_itself() {
        let pool = MemoryGenePool::new().with_geneset(&set("acme/base/1.0"));
        let cancel = CancellationToken::new();
        let mut resolver = GenesetResolver::new(&pool, &cancel, 5);
        assert_eq!(resolver.resolve(&set("acme/base/1.0")).await.unwrap(), set("acme/base/1.0"));
    }

    #[tokio::test]
    async fn follows_reference_chain_and_memoizes() {
        let pool = MemoryGenePool::new()
            .with_reference(&set("acme/base/latest"), &set("acme/base/stable"))
            .with_reference(&set("acme/base/stable"), &set("acme/base/1.0"))
            .with_geneset(&set("acme/base/1.0"));
        let cancel = CancellationToken::new();
        let mut resolver = GenesetResolver::new(&pool, &cancel, 5);

        let target = resolver.resolve(&set("acme/base/latest")).await.unwrap();
        assert_eq!(target, set("acme/base/1.0"));
        assert_eq!(resolver.resolve(&set("acme/base/latest")).await.unwrap(), target);
        assert_eq!(resolver.resolve(&set("acme/base/stable")).await.unwrap(), target);

        assert_eq!(pool.lookups(&set("acme/base/latest")), 1);
        assert_eq!(pool.lookups(&set("acme/base/stable")), 1);
        assert_eq!(pool.lookups(&set("acme/base/1.0")), 1);
    }

    #[tokio::test]
    async fn self_reference_is_circular() {
        let pool =
            MemoryGenePool::new().with_reference(&set("acme/x/latest"), &set("acme/x/latest"));
        let cancel = CancellationToken::new();
        let mut resolver = GenesetResolver::new(&pool, &cancel, 5);
        let err = resolver.resolve(&set("acme/x/latest")).await.unwrap_err();
        assert!(matches!(err.root_cause(), GeneticsError::CircularReference(_)));
        assert!(format!("{err}").contains("acme/x/latest -> acme/x/latest"));
    }

    #[tokio::test]
    async fn chains_up_to_the_maximum_succeed() {
        // t0 -> t1 -> t2 -> t3 -> t4 visits five tags.
        let pool = chain_pool(4);
        let cancel = CancellationToken::new();
        let mut resolver = GenesetResolver::new(&pool, &cancel, 5);
        assert_eq!(resolver.resolve(&set("acme/base/t0")).await.unwrap(), set("acme/base/t4"));
    }

    #[tokio::test]
    async fn chains_beyond_the_maximum_fail() {
        let pool = chain_pool(5);
        let cancel = CancellationToken::new();
        let mut resolver = GenesetResolver::new(&pool, &cancel, 5);
        let err = resolver.resolve(&set("acme/base/t0")).await.unwrap_err();
        assert!(matches!(
            err.root_cause(),
            GeneticsError::ReferenceChainTooLong { max: 5 }
        ));
    }

    #[tokio::test]
    async fn missing_target_names_the_tag() {
        let pool = MemoryGenePool::new()
            .with_reference(&set("acme/base/latest"), &set("acme/base/2.0"));
        let cancel = CancellationToken::new();
        let mut resolver = GenesetResolver::new(&pool, &cancel, 5);
        let err = resolver.resolve(&set("acme/base/latest")).await.unwrap_err();
        let msg = format!("{err}");
        assert!(msg.starts_with("could not resolve the gene set tag 'acme/base/latest'"));
        assert!(matches!(
            err.root_cause(),
            GeneticsError::Pool(GenePoolError::GenesetNotFound(_))
        ));
    }
}
