use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::domain::{LigandSmilesSearch, Species};
use crate::entities::{
    DatabaseLink, Gene, Interaction, Ligand, LigandComments, MolecularProperties, PdbRecord,
    Precursor, StructuralProperties, Synonym, Target, TargetFamily,
};
use crate::error::GtopError;
use crate::gtop::GtopClient;
use crate::transport::Transport;

/// Entity lookups plus the auxiliary reads the resolvers need.
///
/// Lookups by ID or name fail with a typed not-found error. Auxiliary reads
/// never fail: a missing or broken response becomes an empty default.
pub struct GtopRepository<T: Transport> {
    client: GtopClient<T>,
}

impl<T: Transport> GtopRepository<T> {
    pub fn new(client: GtopClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GtopClient<T> {
        &self.client
    }

    pub fn ligand(&self, ligand_id: u64) -> Result<Ligand, GtopError> {
        let json = self
            .client
            .fetch(&format!("ligands/{ligand_id}"))
            .ok_or(GtopError::NoSuchLigand(ligand_id))?;
        entity_from(json)
    }

    pub fn ligands_by(&self, criteria: &[(&str, &str)]) -> Vec<Ligand> {
        self.client.fetch_search_list("ligands", criteria)
    }

    /// Every ligand GtoP holds. One large response.
    pub fn all_ligands(&self) -> Vec<Ligand> {
        self.client.fetch_list("ligands")
    }

    /// Ligands matched by GtoP's own SMILES search.
    pub fn ligands_by_smiles(&self, smiles: &str, search: LigandSmilesSearch) -> Vec<Ligand> {
        let path = format!("ligands/{}/smiles", search.path_segment());
        match search {
            LigandSmilesSearch::Similarity(cutoff) => {
                let cutoff = cutoff.get().to_string();
                self.client.fetch_search_list(
                    &path,
                    &[("smiles", smiles), ("similarityGt", cutoff.as_str())],
                )
            }
            LigandSmilesSearch::Exact | LigandSmilesSearch::Substructure => {
                self.client.fetch_search_list(&path, &[("smiles", smiles)])
            }
        }
    }

    /// First ligand whose name matches; synonyms are not searched.
    pub fn ligand_by_name(&self, name: &str) -> Result<Ligand, GtopError> {
        self.ligands_by(&[("name", name)])
            .into_iter()
            .next()
            .ok_or_else(|| GtopError::NoSuchLigandName(name.to_string()))
    }

    pub fn target(&self, target_id: u64) -> Result<Target, GtopError> {
        let json = self
            .client
            .fetch(&format!("targets/{target_id}"))
            .ok_or(GtopError::NoSuchTarget(target_id))?;
        entity_from(json)
    }

    pub fn targets_by(&self, criteria: &[(&str, &str)]) -> Vec<Target> {
        self.client.fetch_search_list("targets", criteria)
    }

    pub fn all_targets(&self) -> Vec<Target> {
        self.client.fetch_list("targets")
    }

    pub fn target_by_name(&self, name: &str) -> Result<Target, GtopError> {
        self.targets_by(&[("name", name)])
            .into_iter()
            .next()
            .ok_or_else(|| GtopError::NoSuchTargetName(name.to_string()))
    }

    pub fn target_family(&self, family_id: u64) -> Result<TargetFamily, GtopError> {
        let json = self
            .client
            .fetch(&format!("targets/families/{family_id}"))
            .ok_or(GtopError::NoSuchFamily(family_id))?;
        entity_from(json)
    }

    /// One of the ligand's interactions, by interaction ID.
    pub fn interaction(&self, ligand_id: u64, interaction_id: u64) -> Result<Interaction, GtopError> {
        self.ligand_interactions(ligand_id)
            .into_iter()
            .find(|interaction| interaction.interaction_id() == interaction_id)
            .ok_or(GtopError::NoSuchInteraction {
                ligand_id,
                interaction_id,
            })
    }

    pub fn ligand_structure(&self, ligand_id: u64) -> StructuralProperties {
        self.client
            .fetch_object(&format!("ligands/{ligand_id}/structure"))
    }

    pub fn ligand_molecular_properties(&self, ligand_id: u64) -> MolecularProperties {
        self.client
            .fetch_object(&format!("ligands/{ligand_id}/molecularProperties"))
    }

    pub fn ligand_interactions(&self, ligand_id: u64) -> Vec<Interaction> {
        self.client
            .fetch_list(&format!("ligands/{ligand_id}/interactions"))
    }

    pub fn ligand_database_links(&self, ligand_id: u64) -> Vec<DatabaseLink> {
        self.client
            .fetch_list(&format!("ligands/{ligand_id}/databaseLinks"))
    }

    pub fn ligand_synonyms(&self, ligand_id: u64) -> Vec<String> {
        self.synonyms(&format!("ligands/{ligand_id}/synonyms"))
    }

    pub fn ligand_precursors(&self, ligand_id: u64) -> Vec<Precursor> {
        self.client
            .fetch_list(&format!("ligands/{ligand_id}/precursors"))
    }

    pub fn ligand_comments(&self, ligand_id: u64) -> LigandComments {
        self.client
            .fetch_object(&format!("ligands/{ligand_id}/comments"))
    }

    pub fn target_interactions(&self, target_id: u64) -> Vec<Interaction> {
        self.client
            .fetch_list(&format!("targets/{target_id}/interactions"))
    }

    /// Annotated structure records, optionally narrowed to one species.
    pub fn target_pdb_records(&self, target_id: u64, species: Option<&Species>) -> Vec<PdbRecord> {
        let records: Vec<PdbRecord> = self
            .client
            .fetch_list(&format!("targets/{target_id}/pdbStructure"));
        records
            .into_iter()
            .filter(|record| Species::admits(species, record.species.as_deref()))
            .collect()
    }

    pub fn target_database_links(
        &self,
        target_id: u64,
        species: Option<&Species>,
    ) -> Vec<DatabaseLink> {
        let links: Vec<DatabaseLink> = self
            .client
            .fetch_list(&format!("targets/{target_id}/databaseLinks"));
        links
            .into_iter()
            .filter(|link| Species::admits(species, link.species.as_deref()))
            .collect()
    }

    pub fn target_genes(&self, target_id: u64, species: Option<&Species>) -> Vec<Gene> {
        let genes: Vec<Gene> = self
            .client
            .fetch_list(&format!("targets/{target_id}/geneProteinInformation"));
        genes
            .into_iter()
            .filter(|gene| Species::admits(species, gene.species.as_deref()))
            .collect()
    }

    /// The target's interactions with one ligand, optionally in one species.
    pub fn interactions_between(
        &self,
        ligand_id: u64,
        target_id: u64,
        species: Option<&Species>,
    ) -> Vec<Interaction> {
        self.target_interactions(target_id)
            .into_iter()
            .filter(|interaction| interaction.ligand_id() == ligand_id)
            .filter(|interaction| Species::admits(species, interaction.species()))
            .collect()
    }

    pub fn target_synonyms(&self, target_id: u64) -> Vec<String> {
        self.synonyms(&format!("targets/{target_id}/synonyms"))
    }

    fn synonyms(&self, query: &str) -> Vec<String> {
        self.client
            .fetch_list::<Synonym>(query)
            .into_iter()
            .map(|synonym| synonym.name)
            .collect()
    }
}

fn entity_from<R: DeserializeOwned>(json: Value) -> Result<R, GtopError> {
    serde_json::from_value(json).map_err(|err| {
        debug!(error = %err, "entity payload did not match");
        GtopError::Payload(err.to_string())
    })
}
