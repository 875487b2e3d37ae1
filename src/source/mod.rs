//! Article source collaborators: the capability trait, the Wikipedia
//! client, a raw-response cache, and the goal pool.

mod article_source;
mod cache;
mod error;
mod goal_pool;
mod wikipedia;

pub use article_source::ArticleSource;
pub use cache::CachedSource;
pub use error::{SourceError, SourceErrorKind};
pub use goal_pool::{EXCLUDED_TOP_TITLES, GoalPool, TopArticle, fetch_top_articles};
pub use wikipedia::WikipediaSource;
