//! Resolution of GtoP entities to PDB structure codes.
//!
//! Each entity kind gets a short-lived view borrowing the resolver:
//! [`LigandPdbs`], [`TargetPdbs`] and [`InteractionPdbs`]. Every operation
//! builds a fresh [`CodeSet`](crate::domain::CodeSet) and never returns an
//! error; strategies that cannot run contribute nothing.

mod interaction;
mod ligand;
mod target;

pub use interaction::InteractionPdbs;
pub use ligand::{LigandPdbs, LigandStrategy};
pub use target::{TargetPdbs, UNIPROT_DATABASE};

use crate::domain::{CodeSet, Species};
use crate::entities::{Interaction, Ligand, SpeciesTarget, Target};
use crate::rcsb::StructureSearch;
use crate::repository::GtopRepository;
use crate::transport::Transport;

pub struct PdbResolver<T: Transport, S: StructureSearch> {
    repository: GtopRepository<T>,
    search: S,
}

impl<T: Transport, S: StructureSearch> PdbResolver<T, S> {
    pub fn new(repository: GtopRepository<T>, search: S) -> Self {
        Self { repository, search }
    }

    pub fn repository(&self) -> &GtopRepository<T> {
        &self.repository
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    pub fn ligand<'a>(&'a self, ligand: &'a Ligand) -> LigandPdbs<'a, T, S> {
        LigandPdbs::new(self, ligand)
    }

    /// All species.
    pub fn target(&self, target: &Target) -> TargetPdbs<'_, T, S> {
        TargetPdbs::new(self, target.target_id(), None)
    }

    pub fn species_target(&self, view: &SpeciesTarget<'_>) -> TargetPdbs<'_, T, S> {
        TargetPdbs::new(self, view.target_id(), Some(view.species().clone()))
    }

    pub fn interaction<'a>(&'a self, interaction: &'a Interaction) -> InteractionPdbs<'a, T, S> {
        InteractionPdbs::new(self, interaction)
    }

    /// Annotated codes on `target_id` recorded for `ligand_id` in `species`.
    /// Without a species only the ligand has to match.
    pub(crate) fn annotated_for(
        &self,
        target_id: u64,
        ligand_id: u64,
        species: Option<&str>,
    ) -> CodeSet {
        let filter = species.map(Species::new);
        let records = self.repository.target_pdb_records(target_id, filter.as_ref());
        CodeSet::from_raw(
            records
                .iter()
                .filter(|record| record.ligand_id == Some(ligand_id))
                .filter_map(|record| record.code()),
        )
    }
}
