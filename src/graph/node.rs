//! Node records: people and movies
//!
//! `Person` and `Movie` double as the rows of the processed CSV files, so their
//! serde names follow the processed column contract.

use super::types::{NodeKind, NodeRef};
use serde::{Deserialize, Serialize};

/// A person retained from the name table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "nconst")]
    pub id: String,

    #[serde(rename = "primaryName")]
    pub name: String,

    #[serde(rename = "birthYear")]
    pub birth_year: Option<i32>,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>, birth_year: Option<i32>) -> Self {
        Person {
            id: id.into(),
            name: name.into(),
            birth_year,
        }
    }
}

/// A movie retained from the title table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "tconst")]
    pub id: String,

    #[serde(rename = "primaryTitle")]
    pub title: String,

    #[serde(rename = "startYear")]
    pub year: Option<i32>,
}

impl Movie {
    pub fn new(id: impl Into<String>, title: impl Into<String>, year: Option<i32>) -> Self {
        Movie {
            id: id.into(),
            title: title.into(),
            year,
        }
    }
}

/// A node of the built graph
///
/// People and movies share one node table so they can be addressed by a single
/// dense index; `kind` keeps the two namespaces apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,

    /// External identifier (`nm...` / `tt...`)
    pub id: String,

    /// Display name for people, title for movies
    pub name: String,

    /// Birth year for people, release year for movies
    pub year: Option<i32>,
}

impl Node {
    pub fn node_ref(&self) -> NodeRef {
        NodeRef::new(self.kind, self.id.clone())
    }

    pub fn is_person(&self) -> bool {
        self.kind == NodeKind::Person
    }

    pub fn is_movie(&self) -> bool {
        self.kind == NodeKind::Movie
    }
}

impl From<Person> for Node {
    fn from(person: Person) -> Self {
        Node {
            kind: NodeKind::Person,
            id: person.id,
            name: person.name,
            year: person.birth_year,
        }
    }
}

impl From<Movie> for Node {
    fn from(movie: Movie) -> Self {
        Node {
            kind: NodeKind::Movie,
            id: movie.id,
            name: movie.title,
            year: movie.year,
        }
    }
}
