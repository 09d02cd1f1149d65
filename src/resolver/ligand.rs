use std::cell::OnceCell;
use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::domain::{
    CodeSet, NameComparator, SmilesMode, StrategyOutcome, Unavailable, union_outcomes,
};
use crate::entities::{Ligand, StructuralProperties};
use crate::rcsb::{
    CHEM_COMP_ID_QUERY, DESCRIPTOR_QUERY, NAME_QUERY, SEQUENCE_QUERY, SMILES_QUERY,
    SearchDocument, StructureSearch,
};
use crate::resolver::PdbResolver;
use crate::transport::Transport;

const SEQUENCE_E_CUTOFF: &str = "0.01";
const SEQUENCE_SEARCH_TOOL: &str = "blast";
const SEQUENCE_IDENTITY_CUTOFF: &str = "100";

/// One way of finding a ligand in the structure database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LigandStrategy {
    StructureString(SmilesMode),
    Descriptor,
    Name(NameComparator),
    Sequence,
    DatabaseAccession,
}

impl LigandStrategy {
    /// The external strategies with their default parameters, in run order.
    pub const EXTERNAL: [LigandStrategy; 5] = [
        LigandStrategy::StructureString(SmilesMode::Exact),
        LigandStrategy::Descriptor,
        LigandStrategy::Name(NameComparator::Equals),
        LigandStrategy::Sequence,
        LigandStrategy::DatabaseAccession,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LigandStrategy::StructureString(_) => "smiles",
            LigandStrategy::Descriptor => "inchi",
            LigandStrategy::Name(_) => "name",
            LigandStrategy::Sequence => "sequence",
            LigandStrategy::DatabaseAccession => "pdb-link",
        }
    }
}

pub struct LigandPdbs<'a, T: Transport, S: StructureSearch> {
    resolver: &'a PdbResolver<T, S>,
    ligand: &'a Ligand,
}

impl<'a, T: Transport, S: StructureSearch> LigandPdbs<'a, T, S> {
    pub(crate) fn new(resolver: &'a PdbResolver<T, S>, ligand: &'a Ligand) -> Self {
        Self { resolver, ligand }
    }

    pub fn ligand(&self) -> &'a Ligand {
        self.ligand
    }

    /// Codes GtoP annotates for this ligand, across all of its interactions.
    pub fn annotated_codes(&self) -> CodeSet {
        let ligand_id = self.ligand.ligand_id();
        let pairs: BTreeSet<(u64, Option<String>)> = self
            .resolver
            .repository()
            .ligand_interactions(ligand_id)
            .iter()
            .map(|interaction| {
                (
                    interaction.target_id(),
                    interaction.species().map(str::to_lowercase),
                )
            })
            .collect();

        let mut codes = CodeSet::new();
        for (target_id, species) in &pairs {
            codes.absorb(
                self.resolver
                    .annotated_for(*target_id, ligand_id, species.as_deref()),
            );
        }
        debug!(ligand_id, count = codes.len(), "annotated ligand structures");
        codes
    }

    pub fn by_structure_string(&self, mode: SmilesMode) -> CodeSet {
        self.run(LigandStrategy::StructureString(mode)).into_codes()
    }

    pub fn by_descriptor(&self) -> CodeSet {
        self.run(LigandStrategy::Descriptor).into_codes()
    }

    pub fn by_name(&self, comparator: NameComparator) -> CodeSet {
        self.run(LigandStrategy::Name(comparator)).into_codes()
    }

    pub fn by_sequence(&self) -> CodeSet {
        self.run(LigandStrategy::Sequence).into_codes()
    }

    pub fn by_database_accession(&self) -> CodeSet {
        self.run(LigandStrategy::DatabaseAccession).into_codes()
    }

    /// Runs every external strategy, reading the ligand's structure at most
    /// once for the whole call.
    pub fn all_external(&self) -> CodeSet {
        let structure = OnceCell::new();
        let codes = union_outcomes(
            LigandStrategy::EXTERNAL
                .iter()
                .map(|strategy| self.run_with(*strategy, &structure)),
        );
        info!(
            ligand_id = self.ligand.ligand_id(),
            count = codes.len(),
            "external ligand structures"
        );
        codes
    }

    pub fn all(&self) -> CodeSet {
        self.annotated_codes().union(&self.all_external())
    }

    /// Runs one strategy, keeping "could not run" apart from "found nothing".
    pub fn run(&self, strategy: LigandStrategy) -> StrategyOutcome {
        self.run_with(strategy, &OnceCell::new())
    }

    fn run_with(
        &self,
        strategy: LigandStrategy,
        structure: &OnceCell<StructuralProperties>,
    ) -> StrategyOutcome {
        let outcome = match strategy {
            LigandStrategy::StructureString(mode) => {
                self.smiles_outcome(self.structure(structure), mode)
            }
            LigandStrategy::Descriptor => self.descriptor_outcome(self.structure(structure)),
            LigandStrategy::Name(comparator) => self.name_outcome(comparator),
            LigandStrategy::Sequence => self.sequence_outcome(self.structure(structure)),
            LigandStrategy::DatabaseAccession => self.database_accession_outcome(),
        };
        match &outcome {
            StrategyOutcome::Found(codes) => debug!(
                ligand_id = self.ligand.ligand_id(),
                strategy = strategy.label(),
                count = codes.len(),
                "strategy finished"
            ),
            StrategyOutcome::Unavailable(reason) => debug!(
                ligand_id = self.ligand.ligand_id(),
                strategy = strategy.label(),
                reason = %reason,
                "strategy unavailable"
            ),
        }
        outcome
    }

    fn smiles_outcome(
        &self,
        structure: &StructuralProperties,
        mode: SmilesMode,
    ) -> StrategyOutcome {
        let Some(smiles) = structure.smiles() else {
            return StrategyOutcome::Unavailable(Unavailable::MissingAttribute("smiles"));
        };
        let document = self.resolver.search().simple_search(
            SMILES_QUERY,
            &[("smiles", smiles), ("search_type", mode.as_str())],
        );
        match document {
            Some(document) => StrategyOutcome::Found(structure_ids(&document)),
            None => StrategyOutcome::Unavailable(Unavailable::NoData),
        }
    }

    fn descriptor_outcome(&self, structure: &StructuralProperties) -> StrategyOutcome {
        let Some(inchi) = structure.inchi() else {
            return StrategyOutcome::Unavailable(Unavailable::MissingAttribute("inchi"));
        };
        self.advanced(
            DESCRIPTOR_QUERY,
            &[("descriptor", inchi), ("descriptorType", "InChI")],
        )
    }

    fn name_outcome(&self, comparator: NameComparator) -> StrategyOutcome {
        let name = self.ligand.name_stripped();
        let name = name.trim();
        if name.is_empty() {
            return StrategyOutcome::Unavailable(Unavailable::MissingAttribute("name"));
        }
        self.advanced(
            NAME_QUERY,
            &[
                ("comparator", comparator.as_str()),
                ("name", name),
                ("polymericType", "Any"),
            ],
        )
    }

    fn sequence_outcome(&self, structure: &StructuralProperties) -> StrategyOutcome {
        let Some(sequence) = structure.one_letter_sequence() else {
            return StrategyOutcome::Unavailable(Unavailable::MissingAttribute("sequence"));
        };
        self.advanced(
            SEQUENCE_QUERY,
            &[
                ("sequence", sequence),
                ("eCutOff", SEQUENCE_E_CUTOFF),
                ("searchTool", SEQUENCE_SEARCH_TOOL),
                ("sequenceIdentityCutoff", SEQUENCE_IDENTITY_CUTOFF),
            ],
        )
    }

    fn database_accession_outcome(&self) -> StrategyOutcome {
        let links = self
            .resolver
            .repository()
            .ligand_database_links(self.ligand.ligand_id());
        let accessions: Vec<&str> = links
            .iter()
            .filter(|link| link.database.contains("PDB"))
            .map(|link| link.accession.trim())
            .filter(|accession| !accession.is_empty())
            .collect();
        if accessions.is_empty() {
            return StrategyOutcome::Unavailable(Unavailable::MissingAttribute("PDB link"));
        }

        let mut found: Option<CodeSet> = None;
        for accession in accessions {
            if let StrategyOutcome::Found(codes) =
                self.advanced(CHEM_COMP_ID_QUERY, &[("chemCompId", accession)])
            {
                found.get_or_insert_with(CodeSet::new).absorb(codes);
            }
        }
        match found {
            Some(codes) => StrategyOutcome::Found(codes),
            None => StrategyOutcome::Unavailable(Unavailable::NoData),
        }
    }

    fn structure<'c>(&self, cell: &'c OnceCell<StructuralProperties>) -> &'c StructuralProperties {
        cell.get_or_init(|| {
            self.resolver
                .repository()
                .ligand_structure(self.ligand.ligand_id())
        })
    }

    // Ligand-side advanced searches answer with bare codes.
    fn advanced(&self, kind: &str, criteria: &[(&str, &str)]) -> StrategyOutcome {
        match self.resolver.search().advanced_search(kind, criteria) {
            Some(tokens) => StrategyOutcome::Found(CodeSet::from_raw(tokens)),
            None => StrategyOutcome::Unavailable(Unavailable::NoData),
        }
    }
}

/// `structureId` attributes of the elements under the document's first child.
fn structure_ids(document: &SearchDocument) -> CodeSet {
    document
        .root()
        .first_child()
        .map(|info| {
            CodeSet::from_raw(
                info.children
                    .iter()
                    .filter_map(|element| element.attribute("structureId")),
            )
        })
        .unwrap_or_default()
}
