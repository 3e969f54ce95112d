//! Participation edges
//!
//! Stored with the canonical direction Person -> Movie, traversed in both
//! directions.

use super::types::Category;
use serde::{Deserialize, Serialize};

/// A typed participation of a person in a movie
///
/// Field order is the processed roles column order: `tconst,nconst,category`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipationEdge {
    #[serde(rename = "tconst")]
    pub movie_id: String,

    #[serde(rename = "nconst")]
    pub person_id: String,

    pub category: Category,
}

impl ParticipationEdge {
    pub fn new(
        person_id: impl Into<String>,
        movie_id: impl Into<String>,
        category: impl Into<Category>,
    ) -> Self {
        ParticipationEdge {
            movie_id: movie_id.into(),
            person_id: person_id.into(),
            category: category.into(),
        }
    }
}
