use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GtopError {
    #[error("there is no ligand with ID {0}")]
    NoSuchLigand(u64),

    #[error("there is no ligand with name {0}")]
    NoSuchLigandName(String),

    #[error("there is no target with ID {0}")]
    NoSuchTarget(u64),

    #[error("there is no target with name {0}")]
    NoSuchTargetName(String),

    #[error("there is no target family with ID {0}")]
    NoSuchFamily(u64),

    #[error("ligand {ligand_id} has no interaction {interaction_id}")]
    NoSuchInteraction { ligand_id: u64, interaction_id: u64 },

    #[error("retry attempts must be a positive integer, not {0:?}")]
    #[diagnostic(help("use a whole number of at least 1, e.g. 5"))]
    InvalidAttempts(String),

    #[error("structure codes cannot be empty")]
    InvalidStructureCode,

    #[error("invalid SMILES search mode: {0}")]
    InvalidSmilesMode(String),

    #[error("similarity cutoff must lie between 0 and 1, not {0}")]
    #[diagnostic(help("GtoP uses 0.8 when no cutoff is given"))]
    InvalidSimilarityCutoff(String),

    #[error("invalid name comparator: {0}")]
    InvalidNameComparator(String),

    #[error("invalid base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected payload: {0}")]
    Payload(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}
