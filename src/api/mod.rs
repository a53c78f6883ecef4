//! Movie catalog backend client.
//!
//! - `client` - `MovieApi`, one async method per REST endpoint
//! - `types` - serde wire types (`Movie`, `Genre`, `Pagination`, ...)

mod client;
mod types;

pub use client::{ApiError, MovieApi};
pub use types::{
    Genre, Movie, MovieQuery, MoviesResponse, NumberOrText, Pagination, ProductionCompany,
    RatingEntry, SortOrder,
};
