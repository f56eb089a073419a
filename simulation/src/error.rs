//! Error types for the simulation engine

use thiserror::Error;

use crate::components::PersonId;

/// Failures surfaced by the engine. Normal outcomes (nobody to marry, no
/// conception this year) are never errors.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("no person with id {0:?} exists in this world")]
    UnknownPerson(PersonId),

    #[error("{0} cannot be related to themselves")]
    SelfRelationship(PersonId),

    #[error("entity is missing a required component: {0}")]
    Component(#[from] hecs::ComponentError),

    #[error("entity was already despawned")]
    Despawned(#[from] hecs::NoSuchEntity),

    #[error("{year:04}-{month:02}-{day:02} is not a valid calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Name(#[from] NameError),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Failures of the syllable name composer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("a name needs at least 1 syllable")]
    TooFewSyllables,

    #[error("syllable table has no prefixes (lines starting with '-')")]
    NoPrefixes,

    #[error("syllable table has no suffixes (lines starting with '+')")]
    NoSuffixes,

    #[error("a {syllables}-syllable name needs middle parts, but the table has none")]
    NoMiddleParts { syllables: usize },

    #[error("no {part} can follow \"{after}\" under the table's rules")]
    Unsatisfiable { part: &'static str, after: String },
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
