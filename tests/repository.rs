mod support;

use assert_matches::assert_matches;
use serde_json::json;

use gtop_xref::domain::{LigandSmilesSearch, SimilarityCutoff, Species};
use gtop_xref::entities::Affinity;
use gtop_xref::error::GtopError;

use support::{FakeGtop, repository};

fn gtop() -> FakeGtop {
    FakeGtop::new()
        .route(
            "ligands/1",
            json!({ "ligandId": 1, "name": "<i>S</i>-ketamine", "approved": true }),
        )
        .route(
            "ligands?name=ergotamine+tartrate",
            json!([{ "ligandId": 126, "name": "ergotamine tartrate" }]),
        )
        .route("ligands?name=nothing", json!([]))
        .route(
            "ligands",
            json!([
                { "ligandId": 1, "name": "<i>S</i>-ketamine" },
                { "ligandId": 126, "name": "ergotamine tartrate" },
                { "name": "no id" },
            ]),
        )
        .route("targets", json!([{ "targetId": 5, "name": "GluN1" }]))
        .route(
            "ligands/exact/smiles?smiles=CC%28%3DO%29O",
            json!([{ "ligandId": 1058, "name": "acetic acid" }]),
        )
        .route(
            "ligands/similarity/smiles?smiles=CCO&similarityGt=0.9",
            json!([{ "ligandId": 2299, "name": "ethanol" }]),
        )
        .route(
            "ligands/1/precursors",
            json!([{
                "precursorId": 12,
                "geneSymbol": "POMC",
                "proteinName": "proopiomelanocortin",
                "species": "Human",
                "synonyms": [{ "name": "ACTH" }],
            }]),
        )
        .route(
            "targets/5/geneProteinInformation",
            json!([
                { "targetId": 5, "species": "Human", "geneSymbol": "GRIN1", "aminoAcids": "938" },
                { "targetId": 5, "species": "Rat", "geneSymbol": "Grin1", "aminoAcids": null },
                { "targetId": 5, "species": "None", "geneSymbol": "grin1" },
            ]),
        )
        .route(
            "targets/5/interactions",
            json!([
                { "interactionId": 10, "ligandId": 1, "targetId": 5, "targetSpecies": "Human" },
                { "interactionId": 11, "ligandId": 1, "targetId": 5, "targetSpecies": "Rat" },
                { "interactionId": 12, "ligandId": 2, "targetId": 5, "targetSpecies": "Human" },
            ]),
        )
        .route(
            "ligands/1/interactions",
            json!([
                {
                    "interactionId": 79397,
                    "ligandId": 1,
                    "targetId": 5,
                    "targetSpecies": "Human",
                    "affinity": "7.2 &ndash; 8.0",
                },
                { "interactionId": 79398, "ligandId": 1, "targetId": 6, "affinity": "-" },
            ]),
        )
        .route(
            "ligands/1/synonyms",
            json!([{ "name": "esketamine" }, { "name": "S-ketamine" }]),
        )
        .route("targets/5", json!({ "targetId": 5, "name": "GluN1" }))
        .route(
            "targets/families/694",
            json!({ "familyId": 694, "name": "Adenosine receptors", "targetIds": [18, 19] }),
        )
        .route(
            "targets/5/databaseLinks",
            json!([
                { "accession": "Q05586", "database": "UniProtKB", "species": "Human" },
                { "accession": "P35439", "database": "UniProtKB", "species": "Rat" },
                { "accession": "GRIN1", "database": "HGNC", "species": "None" },
            ]),
        )
        .route(
            "targets/5/pdbStructure",
            json!([
                { "targetId": 5, "ligandId": 1, "pdbCode": "5UOW", "species": "Human" },
                { "targetId": 5, "pdbCode": "4PE5" },
                "not a record",
            ]),
        )
}

#[test]
fn ligand_lookup_by_id() {
    let gtop = gtop();
    let ligand = repository(&gtop).ligand(1).unwrap();
    assert_eq!(ligand.ligand_id(), 1);
    assert_eq!(ligand.name(), "<i>S</i>-ketamine");
    assert_eq!(ligand.name_stripped(), "S-ketamine");
    assert!(ligand.approved());
}

#[test]
fn missing_entities_raise_not_found() {
    let gtop = gtop();
    let repository = repository(&gtop);

    assert_matches!(repository.ligand(2), Err(GtopError::NoSuchLigand(2)));
    assert_matches!(repository.target(6), Err(GtopError::NoSuchTarget(6)));
    assert_matches!(repository.target_family(1), Err(GtopError::NoSuchFamily(1)));
    assert_matches!(
        repository.ligand_by_name("nothing"),
        Err(GtopError::NoSuchLigandName(name)) if name == "nothing"
    );
    assert_matches!(
        repository.interaction(1, 5),
        Err(GtopError::NoSuchInteraction { ligand_id: 1, interaction_id: 5 })
    );
}

#[test]
fn ligand_lookup_by_name_encodes_the_query() {
    let gtop = gtop();
    let ligand = repository(&gtop)
        .ligand_by_name("ergotamine tartrate")
        .unwrap();
    assert_eq!(ligand.ligand_id(), 126);
}

#[test]
fn target_and_family_lookup() {
    let gtop = gtop();
    let repository = repository(&gtop);

    let target = repository.target(5).unwrap();
    assert_eq!(target.name(), "GluN1");
    let human = target.for_species("Human");
    assert_eq!(human.target_id(), 5);
    assert_eq!(human.species().as_str(), "Human");

    let family = repository.target_family(694).unwrap();
    assert_eq!(family.target_ids(), &[18, 19]);
}

#[test]
fn interaction_lookup_and_affinity() {
    let gtop = gtop();
    let repository = repository(&gtop);

    let interaction = repository.interaction(1, 79397).unwrap();
    assert_eq!(interaction.target_id(), 5);
    assert_eq!(interaction.species(), Some("Human"));
    assert_eq!(
        interaction.affinity(),
        Affinity::Range {
            low: 7.2,
            high: 8.0
        }
    );
    let midpoint = interaction.affinity().value().unwrap();
    assert!((midpoint - 7.6).abs() < 1e-9);

    let other = repository.interaction(1, 79398).unwrap();
    assert_eq!(other.affinity(), Affinity::Absent);
    assert_eq!(other.species(), None);
}

#[test]
fn auxiliary_reads_default_when_missing() {
    let gtop = gtop();
    let repository = repository(&gtop);

    assert!(repository.ligand_database_links(1).is_empty());
    assert!(repository.ligand_comments(1).comments.is_none());
    assert!(repository.ligand_structure(1).smiles().is_none());
    assert!(repository.target_interactions(6).is_empty());
    assert!(repository.ligand_precursors(2).is_empty());
    assert!(repository.target_genes(6, None).is_empty());
    assert_eq!(repository.ligand_synonyms(1), vec!["esketamine", "S-ketamine"]);
}

#[test]
fn species_filters_links_and_records() {
    let gtop = gtop();
    let repository = repository(&gtop);
    let human = Species::new("human");

    let links = repository.target_database_links(5, Some(&human));
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].accession, "Q05586");
    assert_eq!(repository.target_database_links(5, None).len(), 3);
    assert_eq!(repository.target_database_links(5, None)[2].species, None);

    let records = repository.target_pdb_records(5, Some(&human));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].code(), Some("5UOW"));
    assert_eq!(repository.target_pdb_records(5, None).len(), 2);
}

#[test]
fn listing_every_entity_skips_malformed_entries() {
    let gtop = gtop();
    let repository = repository(&gtop);

    let ligands = repository.all_ligands();
    assert_eq!(
        ligands.iter().map(|ligand| ligand.ligand_id()).collect::<Vec<_>>(),
        vec![1, 126]
    );
    assert_eq!(repository.all_targets()[0].target_id(), 5);
}

#[test]
fn gtop_smiles_search_encodes_query_and_cutoff() {
    let gtop = gtop();
    let repository = repository(&gtop);

    let exact = repository.ligands_by_smiles("CC(=O)O", LigandSmilesSearch::Exact);
    assert_eq!(exact[0].ligand_id(), 1058);

    let cutoff = SimilarityCutoff::new(0.9).unwrap();
    let similar = repository.ligands_by_smiles("CCO", LigandSmilesSearch::Similarity(cutoff));
    assert_eq!(similar[0].ligand_id(), 2299);

    assert!(repository
        .ligands_by_smiles("CCO", LigandSmilesSearch::Substructure)
        .is_empty());
}

#[test]
fn ligand_precursors_are_typed() {
    let gtop = gtop();
    let precursors = repository(&gtop).ligand_precursors(1);
    assert_eq!(precursors.len(), 1);
    assert_eq!(precursors[0].precursor_id, 12);
    assert_eq!(precursors[0].gene_symbol.as_deref(), Some("POMC"));
    assert_eq!(precursors[0].synonym_names(), vec!["ACTH"]);
}

#[test]
fn target_genes_filter_by_species() {
    let gtop = gtop();
    let repository = repository(&gtop);

    let human = repository.target_genes(5, Some(&Species::new("HUMAN")));
    assert_eq!(human.len(), 1);
    assert_eq!(human[0].gene_symbol.as_deref(), Some("GRIN1"));
    assert_eq!(human[0].amino_acids, 938);

    let all = repository.target_genes(5, None);
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].amino_acids, 0);
    assert_eq!(all[2].species, None);
}

#[test]
fn interactions_between_ligand_and_target() {
    let gtop = gtop();
    let repository = repository(&gtop);

    let ids = |interactions: Vec<gtop_xref::entities::Interaction>| {
        interactions
            .iter()
            .map(|interaction| interaction.interaction_id())
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(repository.interactions_between(1, 5, None)), vec![10, 11]);
    assert_eq!(
        ids(repository.interactions_between(1, 5, Some(&Species::new("rat")))),
        vec![11]
    );
    assert!(repository.interactions_between(3, 5, None).is_empty());
}
