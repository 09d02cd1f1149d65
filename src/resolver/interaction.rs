use tracing::warn;

use crate::domain::{CodeSet, Species};
use crate::entities::{Interaction, Ligand};
use crate::rcsb::StructureSearch;
use crate::resolver::{PdbResolver, TargetPdbs};
use crate::transport::Transport;

/// Structure codes for one ligand × target × species interaction.
///
/// External results are intersected: a structure only counts when both the
/// ligand-side and the target-side searches found it.
pub struct InteractionPdbs<'a, T: Transport, S: StructureSearch> {
    resolver: &'a PdbResolver<T, S>,
    interaction: &'a Interaction,
}

impl<'a, T: Transport, S: StructureSearch> InteractionPdbs<'a, T, S> {
    pub(crate) fn new(resolver: &'a PdbResolver<T, S>, interaction: &'a Interaction) -> Self {
        Self {
            resolver,
            interaction,
        }
    }

    pub fn annotated_codes(&self) -> CodeSet {
        self.resolver.annotated_for(
            self.interaction.target_id(),
            self.interaction.ligand_id(),
            self.interaction.species(),
        )
    }

    pub fn all_external(&self) -> CodeSet {
        let ligand_side = self
            .ligand()
            .map(|ligand| self.resolver.ligand(&ligand).all_external())
            .unwrap_or_default();
        let target_side = self.species_target().by_accession();
        ligand_side.intersection(&target_side)
    }

    pub fn all(&self) -> CodeSet {
        let ligand_side = self
            .ligand()
            .map(|ligand| self.resolver.ligand(&ligand).all())
            .unwrap_or_default();
        let target_side = self.species_target().all();
        ligand_side.intersection(&target_side)
    }

    /// The interaction's target restricted to the interaction's species.
    pub fn species_target(&self) -> TargetPdbs<'a, T, S> {
        TargetPdbs::new(
            self.resolver,
            self.interaction.target_id(),
            self.interaction.species().map(Species::new),
        )
    }

    fn ligand(&self) -> Option<Ligand> {
        match self.resolver.repository().ligand(self.interaction.ligand_id()) {
            Ok(ligand) => Some(ligand),
            Err(err) => {
                warn!(
                    interaction_id = self.interaction.interaction_id(),
                    error = %err,
                    "interaction ligand unavailable"
                );
                None
            }
        }
    }
}
