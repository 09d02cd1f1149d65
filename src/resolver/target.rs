use tracing::debug;

use crate::domain::{CodeSet, Species, StrategyOutcome, Unavailable};
use crate::rcsb::{StructureSearch, UNIPROT_ACCESSION_QUERY};
use crate::resolver::PdbResolver;
use crate::transport::Transport;

/// Database name GtoP uses for UniProt cross-references.
pub const UNIPROT_DATABASE: &str = "UniProtKB";

pub struct TargetPdbs<'a, T: Transport, S: StructureSearch> {
    resolver: &'a PdbResolver<T, S>,
    target_id: u64,
    species: Option<Species>,
}

impl<'a, T: Transport, S: StructureSearch> TargetPdbs<'a, T, S> {
    pub(crate) fn new(
        resolver: &'a PdbResolver<T, S>,
        target_id: u64,
        species: Option<Species>,
    ) -> Self {
        Self {
            resolver,
            target_id,
            species,
        }
    }

    pub fn target_id(&self) -> u64 {
        self.target_id
    }

    pub fn species(&self) -> Option<&Species> {
        self.species.as_ref()
    }

    pub fn annotated_codes(&self) -> CodeSet {
        let records = self
            .resolver
            .repository()
            .target_pdb_records(self.target_id, self.species.as_ref());
        CodeSet::from_raw(records.iter().filter_map(|record| record.code()))
    }

    pub fn by_accession(&self) -> CodeSet {
        self.accession_outcome().into_codes()
    }

    /// One batched accession query for every UniProt link of the target.
    pub fn accession_outcome(&self) -> StrategyOutcome {
        let links = self
            .resolver
            .repository()
            .target_database_links(self.target_id, self.species.as_ref());
        let accessions: Vec<&str> = links
            .iter()
            .filter(|link| link.database == UNIPROT_DATABASE)
            .map(|link| link.accession.trim())
            .filter(|accession| !accession.is_empty())
            .collect();
        if accessions.is_empty() {
            return StrategyOutcome::Unavailable(Unavailable::MissingAttribute(
                "UniProt accession",
            ));
        }

        let joined = accessions.join(",");
        let outcome = match self
            .resolver
            .search()
            .advanced_search(UNIPROT_ACCESSION_QUERY, &[("accessionIdList", joined.as_str())])
        {
            // Accession hits come back as CODE:chain.
            Some(tokens) => StrategyOutcome::Found(CodeSet::from_raw(
                tokens
                    .iter()
                    .map(|token| token.split(':').next().unwrap_or_default()),
            )),
            None => StrategyOutcome::Unavailable(Unavailable::NoData),
        };
        debug!(
            target_id = self.target_id,
            species = ?self.species,
            accessions = accessions.len(),
            available = outcome.is_available(),
            "accession search finished"
        );
        outcome
    }

    pub fn all(&self) -> CodeSet {
        self.annotated_codes().union(&self.by_accession())
    }
}
