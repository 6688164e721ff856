pub mod etl;
pub mod extract;
pub mod fetcher;
pub mod pipeline;
pub mod pool;
pub mod publisher;
pub mod resolver;
pub mod source;
pub mod writer;

pub use crate::domain::model::{ContentType, ParsedEntity, UrlTarget};
pub use crate::domain::ports::{Fetcher, Storage, UrlResolver};
pub use crate::utils::error::Result;
