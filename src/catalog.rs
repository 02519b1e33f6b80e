//! Movie catalog collaborator
//!
//! The surface the agent consumes from the persistent catalog. Optional
//! capabilities (text search) are exposed through `capabilities()` and read
//! once when a consumer is constructed, never probed per call.

use crate::db::{Database, DbError, Movie, MovieFields};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Catalog does not support {0}")]
    Unsupported(&'static str),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Optional operations a catalog may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogCapabilities {
    pub text_search: bool,
}

/// Persistent movie catalog
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn get(&self, id: i64) -> CatalogResult<Option<Movie>>;

    async fn get_by_name(&self, name: &str) -> CatalogResult<Option<Movie>>;

    async fn all(&self) -> CatalogResult<Vec<Movie>>;

    /// Overwrite all non-id fields of the row with `movie.id`
    async fn save(&self, movie: &Movie) -> CatalogResult<()>;

    /// Persist a new row; returns the store-assigned id
    async fn create(&self, fields: &MovieFields) -> CatalogResult<i64>;

    /// Remove the row if present
    async fn delete(&self, id: i64) -> CatalogResult<()>;

    fn capabilities(&self) -> CatalogCapabilities {
        CatalogCapabilities::default()
    }

    /// Only called when `capabilities().text_search` is set
    async fn search_by_text(&self, _query: &str) -> CatalogResult<Vec<Movie>> {
        Err(CatalogError::Unsupported("text search"))
    }
}

#[async_trait]
impl<T: MovieCatalog + ?Sized> MovieCatalog for Arc<T> {
    async fn get(&self, id: i64) -> CatalogResult<Option<Movie>> {
        (**self).get(id).await
    }

    async fn get_by_name(&self, name: &str) -> CatalogResult<Option<Movie>> {
        (**self).get_by_name(name).await
    }

    async fn all(&self) -> CatalogResult<Vec<Movie>> {
        (**self).all().await
    }

    async fn save(&self, movie: &Movie) -> CatalogResult<()> {
        (**self).save(movie).await
    }

    async fn create(&self, fields: &MovieFields) -> CatalogResult<i64> {
        (**self).create(fields).await
    }

    async fn delete(&self, id: i64) -> CatalogResult<()> {
        (**self).delete(id).await
    }

    fn capabilities(&self) -> CatalogCapabilities {
        (**self).capabilities()
    }

    async fn search_by_text(&self, query: &str) -> CatalogResult<Vec<Movie>> {
        (**self).search_by_text(query).await
    }
}

/// Adapter to use `Database` as the movie catalog
#[derive(Clone)]
pub struct DatabaseCatalog {
    db: Database,
}

impl DatabaseCatalog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieCatalog for DatabaseCatalog {
    async fn get(&self, id: i64) -> CatalogResult<Option<Movie>> {
        Ok(self.db.get_movie(id)?)
    }

    async fn get_by_name(&self, name: &str) -> CatalogResult<Option<Movie>> {
        Ok(self.db.get_movie_by_name(name)?)
    }

    async fn all(&self) -> CatalogResult<Vec<Movie>> {
        Ok(self.db.list_movies()?)
    }

    async fn save(&self, movie: &Movie) -> CatalogResult<()> {
        if !self.db.save_movie(movie)? {
            tracing::debug!(id = movie.id, "Save skipped, movie no longer exists");
        }
        Ok(())
    }

    async fn create(&self, fields: &MovieFields) -> CatalogResult<i64> {
        let id = self.db.create_movie(fields)?;
        tracing::debug!(id, "Movie created");
        Ok(id)
    }

    async fn delete(&self, id: i64) -> CatalogResult<()> {
        let removed = self.db.delete_movie(id)?;
        tracing::debug!(id, removed, "Movie delete");
        Ok(())
    }

    fn capabilities(&self) -> CatalogCapabilities {
        CatalogCapabilities { text_search: true }
    }

    async fn search_by_text(&self, query: &str) -> CatalogResult<Vec<Movie>> {
        Ok(self.db.search_movies(query)?)
    }
}
