use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::Species;

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"));

/// Removes HTML tags such as `<sub>` from GtoP display strings.
pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// GtoP writes a missing species as the literal string "None".
fn species_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|species| !species.is_empty() && species != "None"))
}

/// GtoP sends counts as strings, numbers or null. Anything unreadable is 0.
fn count_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
    }

    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Number(count)) => count,
        Some(Count::Text(text)) => text.trim().parse().unwrap_or(0),
        None => 0,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ligand {
    ligand_id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(default)]
    inn: Option<String>,
    #[serde(default, rename = "type")]
    ligand_type: Option<String>,
    #[serde(default)]
    species: Option<String>,
    #[serde(default)]
    radioactive: bool,
    #[serde(default)]
    labelled: bool,
    #[serde(default)]
    approved: bool,
    #[serde(default)]
    withdrawn: bool,
    #[serde(default)]
    approval_source: Option<String>,
    #[serde(default)]
    subunit_ids: Vec<u64>,
    #[serde(default)]
    complex_ids: Vec<u64>,
    #[serde(default)]
    prodrug_ids: Vec<u64>,
    #[serde(default)]
    active_drug_ids: Vec<u64>,
}

impl Ligand {
    pub fn ligand_id(&self) -> u64 {
        self.ligand_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_stripped(&self) -> String {
        strip_markup(&self.name)
    }

    pub fn abbreviation(&self) -> Option<&str> {
        non_empty(&self.abbreviation)
    }

    pub fn inn(&self) -> Option<&str> {
        non_empty(&self.inn)
    }

    pub fn ligand_type(&self) -> Option<&str> {
        non_empty(&self.ligand_type)
    }

    pub fn species(&self) -> Option<&str> {
        non_empty(&self.species)
    }

    pub fn radioactive(&self) -> bool {
        self.radioactive
    }

    pub fn labelled(&self) -> bool {
        self.labelled
    }

    pub fn approved(&self) -> bool {
        self.approved
    }

    pub fn withdrawn(&self) -> bool {
        self.withdrawn
    }

    pub fn approval_source(&self) -> Option<&str> {
        non_empty(&self.approval_source)
    }

    pub fn subunit_ids(&self) -> &[u64] {
        &self.subunit_ids
    }

    pub fn complex_ids(&self) -> &[u64] {
        &self.complex_ids
    }

    pub fn prodrug_ids(&self) -> &[u64] {
        &self.prodrug_ids
    }

    pub fn active_drug_ids(&self) -> &[u64] {
        &self.active_drug_ids
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    target_id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(default)]
    systematic_name: Option<String>,
    #[serde(default, rename = "type")]
    target_type: Option<String>,
    #[serde(default)]
    family_ids: Vec<u64>,
    #[serde(default)]
    subunit_ids: Vec<u64>,
    #[serde(default)]
    complex_ids: Vec<u64>,
}

impl Target {
    pub fn target_id(&self) -> u64 {
        self.target_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_stripped(&self) -> String {
        strip_markup(&self.name)
    }

    pub fn abbreviation(&self) -> Option<&str> {
        non_empty(&self.abbreviation)
    }

    pub fn systematic_name(&self) -> Option<&str> {
        non_empty(&self.systematic_name)
    }

    pub fn target_type(&self) -> Option<&str> {
        non_empty(&self.target_type)
    }

    pub fn family_ids(&self) -> &[u64] {
        &self.family_ids
    }

    pub fn subunit_ids(&self) -> &[u64] {
        &self.subunit_ids
    }

    pub fn complex_ids(&self) -> &[u64] {
        &self.complex_ids
    }

    /// A view of this target restricted to one species.
    pub fn for_species(&self, species: impl Into<Species>) -> SpeciesTarget<'_> {
        SpeciesTarget {
            target: self,
            species: species.into(),
        }
    }
}

/// A target seen through one species. Reads go to the wrapped target; the
/// species is applied wherever records or links are filtered.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesTarget<'a> {
    target: &'a Target,
    species: Species,
}

impl<'a> SpeciesTarget<'a> {
    pub fn target(&self) -> &'a Target {
        self.target
    }

    pub fn species(&self) -> &Species {
        &self.species
    }

    pub fn target_id(&self) -> u64 {
        self.target.target_id()
    }

    pub fn name(&self) -> &str {
        self.target.name()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFamily {
    family_id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    target_ids: Vec<u64>,
    #[serde(default)]
    parent_family_ids: Vec<u64>,
    #[serde(default)]
    sub_family_ids: Vec<u64>,
}

impl TargetFamily {
    pub fn family_id(&self) -> u64 {
        self.family_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_stripped(&self) -> String {
        strip_markup(&self.name)
    }

    pub fn target_ids(&self) -> &[u64] {
        &self.target_ids
    }

    pub fn parent_family_ids(&self) -> &[u64] {
        &self.parent_family_ids
    }

    pub fn sub_family_ids(&self) -> &[u64] {
        &self.sub_family_ids
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    interaction_id: u64,
    ligand_id: u64,
    target_id: u64,
    #[serde(default, rename = "targetSpecies")]
    species: Option<String>,
    #[serde(default)]
    primary_target: bool,
    #[serde(default)]
    endogenous: bool,
    #[serde(default, rename = "type")]
    interaction_type: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    affinity: Option<String>,
    #[serde(default)]
    affinity_type: Option<String>,
    #[serde(default)]
    voltage_dependent: bool,
    #[serde(default)]
    voltage: Option<String>,
}

impl Interaction {
    pub fn interaction_id(&self) -> u64 {
        self.interaction_id
    }

    pub fn ligand_id(&self) -> u64 {
        self.ligand_id
    }

    pub fn target_id(&self) -> u64 {
        self.target_id
    }

    pub fn species(&self) -> Option<&str> {
        non_empty(&self.species)
    }

    pub fn primary_target(&self) -> bool {
        self.primary_target
    }

    pub fn endogenous(&self) -> bool {
        self.endogenous
    }

    pub fn interaction_type(&self) -> Option<&str> {
        non_empty(&self.interaction_type)
    }

    pub fn action(&self) -> Option<&str> {
        non_empty(&self.action)
    }

    pub fn affinity(&self) -> Affinity {
        Affinity::parse(self.affinity.as_deref().unwrap_or_default())
    }

    pub fn affinity_type(&self) -> Option<&str> {
        non_empty(&self.affinity_type)
    }

    pub fn voltage_dependent(&self) -> bool {
        self.voltage_dependent
    }

    pub fn voltage(&self) -> Affinity {
        Affinity::parse(self.voltage.as_deref().unwrap_or_default())
    }
}

/// A GtoP measurement field: absent, one value, or a low/high range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Affinity {
    #[default]
    Absent,
    Single { value: f64 },
    Range { low: f64, high: f64 },
}

impl Affinity {
    /// Accepts `"-"`, `"7.2"`, `"7.2 median"`, `"7.2 &ndash; 8.1"` and
    /// `"6.8 - 7.4"`. Anything else is `Absent`.
    pub fn parse(raw: &str) -> Self {
        let mut text = raw.trim();
        if text.is_empty() || text == "-" {
            return Affinity::Absent;
        }
        if text.contains("median") {
            text = text.split_whitespace().next().unwrap_or_default();
        }
        let normalized = text.replace("&ndash;", " - ").replace('\u{2013}', " - ");
        let mut values = Vec::new();
        for part in normalized.split(" - ") {
            let part = part
                .trim()
                .trim_start_matches(|ch| matches!(ch, '>' | '<' | '~' | '='))
                .trim();
            if part.is_empty() {
                continue;
            }
            match part.parse::<f64>() {
                Ok(value) => values.push(value),
                Err(_) => return Affinity::Absent,
            }
        }
        values.sort_by(|a, b| a.total_cmp(b));
        match values.as_slice() {
            [] => Affinity::Absent,
            [value] => Affinity::Single { value: *value },
            [low, .., high] => Affinity::Range {
                low: *low,
                high: *high,
            },
        }
    }

    /// The single value, or the midpoint of a range.
    pub fn value(&self) -> Option<f64> {
        match self {
            Affinity::Absent => None,
            Affinity::Single { value } => Some(*value),
            Affinity::Range { low, high } => Some((low + high) / 2.0),
        }
    }

    pub fn low(&self) -> Option<f64> {
        match self {
            Affinity::Absent => None,
            Affinity::Single { value } => Some(*value),
            Affinity::Range { low, .. } => Some(*low),
        }
    }

    pub fn high(&self) -> Option<f64> {
        match self {
            Affinity::Absent => None,
            Affinity::Single { value } => Some(*value),
            Affinity::Range { high, .. } => Some(*high),
        }
    }
}

/// A link from a GtoP entity to another database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseLink {
    #[serde(default)]
    pub accession: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "species_or_none")]
    pub species: Option<String>,
}

/// A structure GtoP itself has curated against a target.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdbRecord {
    #[serde(default)]
    pub target_id: Option<u64>,
    #[serde(default)]
    pub ligand_id: Option<u64>,
    #[serde(default)]
    pub pdb_code: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resolution: Option<f64>,
    #[serde(default)]
    pub endogenous: bool,
}

impl PdbRecord {
    pub fn code(&self) -> Option<&str> {
        non_empty(&self.pdb_code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuralProperties {
    iupac_name: Option<String>,
    smiles: Option<String>,
    inchi: Option<String>,
    inchi_key: Option<String>,
    #[serde(rename = "oneLetterSeq")]
    one_letter_sequence: Option<String>,
    #[serde(rename = "threeLetterSeq")]
    three_letter_sequence: Option<String>,
    post_translational_modifications: Option<String>,
    chemical_modifications: Option<String>,
}

impl StructuralProperties {
    pub fn iupac_name(&self) -> Option<&str> {
        non_empty(&self.iupac_name)
    }

    pub fn smiles(&self) -> Option<&str> {
        non_empty(&self.smiles)
    }

    pub fn inchi(&self) -> Option<&str> {
        non_empty(&self.inchi)
    }

    pub fn inchi_key(&self) -> Option<&str> {
        non_empty(&self.inchi_key)
    }

    pub fn one_letter_sequence(&self) -> Option<&str> {
        non_empty(&self.one_letter_sequence)
    }

    pub fn three_letter_sequence(&self) -> Option<&str> {
        non_empty(&self.three_letter_sequence)
    }

    pub fn post_translational_modifications(&self) -> Option<&str> {
        non_empty(&self.post_translational_modifications)
    }

    pub fn chemical_modifications(&self) -> Option<&str> {
        non_empty(&self.chemical_modifications)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MolecularProperties {
    pub hydrogen_bond_acceptors: Option<u32>,
    pub hydrogen_bond_donors: Option<u32>,
    pub rotatable_bonds: Option<u32>,
    pub topological_polar_surface_area: Option<f64>,
    pub molecular_weight: Option<f64>,
    pub log_p: Option<f64>,
    #[serde(rename = "lipinskisRuleOfFive")]
    pub lipinski_rules_broken: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LigandComments {
    pub comments: Option<String>,
    pub bioactivity_comments: Option<String>,
    pub clinical_use: Option<String>,
    pub mechanism_of_action: Option<String>,
    pub absorption_and_distribution: Option<String>,
    pub metabolism: Option<String>,
    pub elimination: Option<String>,
    pub population_pharmacokinetics: Option<String>,
    pub organ_function_impairment: Option<String>,
    pub mutations_and_pathophysiology: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Synonym {
    pub name: String,
}

/// Gene and protein facts GtoP records for a target in one species.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gene {
    #[serde(default)]
    pub target_id: Option<u64>,
    #[serde(default, deserialize_with = "species_or_none")]
    pub species: Option<String>,
    #[serde(default)]
    pub gene_symbol: Option<String>,
    #[serde(default)]
    pub gene_name: Option<String>,
    #[serde(default)]
    pub official_gene_id: Option<String>,
    #[serde(default)]
    pub genomic_location: Option<String>,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub amino_acids: u32,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub transmembrane_domains: u32,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub pore_loops: u32,
}

/// A gene product a peptide ligand is processed from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Precursor {
    pub precursor_id: u64,
    #[serde(default)]
    pub gene_symbol: Option<String>,
    #[serde(default)]
    pub gene_name: Option<String>,
    #[serde(default)]
    pub official_gene_id: Option<String>,
    #[serde(default)]
    pub protein_name: Option<String>,
    #[serde(default, deserialize_with = "species_or_none")]
    pub species: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<Synonym>,
}

impl Precursor {
    pub fn synonym_names(&self) -> Vec<&str> {
        self.synonyms
            .iter()
            .map(|synonym| synonym.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn affinity_variants() {
        assert_eq!(Affinity::parse("-"), Affinity::Absent);
        assert_eq!(Affinity::parse(""), Affinity::Absent);
        assert_eq!(Affinity::parse("7.2"), Affinity::Single { value: 7.2 });
        assert_eq!(Affinity::parse("7.2 median"), Affinity::Single { value: 7.2 });
        assert_eq!(
            Affinity::parse("8.1 &ndash; 7.2"),
            Affinity::Range { low: 7.2, high: 8.1 }
        );
        assert_eq!(
            Affinity::parse("-80 - -60"),
            Affinity::Range {
                low: -80.0,
                high: -60.0
            }
        );
        assert_eq!(Affinity::parse("-60"), Affinity::Single { value: -60.0 });
        assert_eq!(Affinity::parse("about seven"), Affinity::Absent);
    }

    #[test]
    fn affinity_range_value_is_midpoint() {
        let affinity = Affinity::parse("7.0 &ndash; 8.0");
        assert_eq!(affinity.value(), Some(7.5));
        assert_eq!(affinity.low(), Some(7.0));
        assert_eq!(affinity.high(), Some(8.0));
    }

    #[test]
    fn strips_markup_from_names() {
        let target: Target = serde_json::from_value(json!({
            "targetId": 1,
            "name": "5-HT<sub>1A</sub> receptor"
        }))
        .unwrap();
        assert_eq!(target.name(), "5-HT<sub>1A</sub> receptor");
        assert_eq!(target.name_stripped(), "5-HT1A receptor");
    }

    #[test]
    fn database_link_reads_none_species_as_absent() {
        let link: DatabaseLink = serde_json::from_value(json!({
            "accession": "CHEMBL1742477",
            "database": "ChEMBL Ligand",
            "url": "http://www.ebi.ac.uk/chembldb",
            "species": "None"
        }))
        .unwrap();
        assert_eq!(link.species, None);
    }

    #[test]
    fn interaction_reads_target_species() {
        let interaction: Interaction = serde_json::from_value(json!({
            "interactionId": 79397,
            "targetId": 1,
            "ligandId": 7191,
            "targetSpecies": "Human",
            "affinity": "7.2",
            "affinityType": "pKi"
        }))
        .unwrap();
        assert_eq!(interaction.species(), Some("Human"));
        assert_eq!(interaction.affinity(), Affinity::Single { value: 7.2 });
        assert_eq!(interaction.voltage(), Affinity::Absent);
    }

    #[test]
    fn gene_counts_accept_strings_and_null() {
        let gene: Gene = serde_json::from_value(json!({
            "targetId": 1,
            "species": "Human",
            "geneSymbol": "HTR1A",
            "officialGeneId": "5286",
            "aminoAcids": "422",
            "transmembraneDomains": 7,
            "poreLoops": null
        }))
        .unwrap();
        assert_eq!(gene.gene_symbol.as_deref(), Some("HTR1A"));
        assert_eq!(gene.amino_acids, 422);
        assert_eq!(gene.transmembrane_domains, 7);
        assert_eq!(gene.pore_loops, 0);
    }

    #[test]
    fn precursor_lists_synonym_names() {
        let precursor: Precursor = serde_json::from_value(json!({
            "precursorId": 2,
            "geneSymbol": "POMC",
            "proteinName": "proopiomelanocortin",
            "species": "Human",
            "synonyms": [{"name": "ACTH"}, {"name": "beta-LPH"}]
        }))
        .unwrap();
        assert_eq!(precursor.synonym_names(), vec!["ACTH", "beta-LPH"]);
    }

    #[test]
    fn structural_properties_treat_blank_as_missing() {
        let props: StructuralProperties =
            serde_json::from_value(json!({"smiles": "", "inchi": "InChI=1S/C6H6"})).unwrap();
        assert_eq!(props.smiles(), None);
        assert_eq!(props.inchi(), Some("InChI=1S/C6H6"));
    }
}
