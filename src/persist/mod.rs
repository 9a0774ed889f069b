//! Durable token storage hook.
//!
//! The manager calls [`Persist::persist`] after every successful token
//! mutation, with the token lock already released. Any `Fn(Token) -> impl Future<Output = anyhow::Result<()>>`
//! closure is a persister; [`file::FilePersist`] stores the token as JSON.

use std::future::Future;

use async_trait::async_trait;

use crate::token::Token;

pub mod file;

pub use file::FilePersist;

#[async_trait]
pub trait Persist: Send + Sync {
    async fn persist(&self, token: &Token) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> Persist for F
where
    F: Fn(Token) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn persist(&self, token: &Token) -> anyhow::Result<()> {
        (self)(token.clone()).await
    }
}
