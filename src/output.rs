use std::io::{self, Write};

use serde::Serialize;

use crate::domain::CodeSet;

/// Which part of the resolution a result covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Annotated,
    External,
    All,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResult {
    pub entity: &'static str,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    pub scope: Scope,
    pub count: usize,
    pub codes: CodeSet,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_result(result: &ResolveResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn render(result: &ResolveResult) -> io::Result<String> {
        serde_json::to_string_pretty(result).map_err(io::Error::other)
    }

    fn print_json(result: &ResolveResult) -> io::Result<()> {
        let json = Self::render(result)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
