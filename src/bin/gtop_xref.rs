use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gtop_xref::config::{ConfigLoader, ResolvedConfig};
use gtop_xref::domain::{Attempts, CodeSet, SmilesMode, Species};
use gtop_xref::error::GtopError;
use gtop_xref::output::{JsonOutput, ResolveResult, Scope};

#[derive(Parser)]
#[command(name = "gtop-xref")]
#[command(about = "Resolve Guide to PHARMACOLOGY ligands, targets and interactions to PDB codes")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    /// Overrides the configured number of tries per request.
    #[arg(long, global = true)]
    attempts: Option<Attempts>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "PDB codes for a ligand")]
    Ligand(LigandArgs),
    #[command(about = "PDB codes for a target, optionally for one species")]
    Target(TargetArgs),
    #[command(about = "PDB codes shared by both sides of a ligand interaction")]
    Interaction(InteractionArgs),
}

#[derive(Args, Clone, Copy)]
struct ScopeArgs {
    /// Only structures GtoP itself annotates.
    #[arg(long, conflicts_with = "external")]
    annotated: bool,

    /// Only structures found by searching RCSB.
    #[arg(long)]
    external: bool,
}

impl ScopeArgs {
    fn scope(self) -> Scope {
        if self.annotated {
            Scope::Annotated
        } else if self.external {
            Scope::External
        } else {
            Scope::All
        }
    }
}

#[derive(Args)]
struct LigandArgs {
    ligand_id: u64,

    /// Runs only the SMILES search, in this mode.
    #[arg(long, value_enum)]
    smiles_mode: Option<SmilesMode>,

    #[command(flatten)]
    scope: ScopeArgs,
}

#[derive(Args)]
struct TargetArgs {
    target_id: u64,

    #[arg(long)]
    species: Option<String>,

    #[command(flatten)]
    scope: ScopeArgs,
}

#[derive(Args)]
struct InteractionArgs {
    ligand_id: u64,
    interaction_id: u64,

    #[command(flatten)]
    scope: ScopeArgs,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<GtopError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GtopError) -> u8 {
    match error {
        GtopError::NoSuchLigand(_)
        | GtopError::NoSuchLigandName(_)
        | GtopError::NoSuchTarget(_)
        | GtopError::NoSuchTargetName(_)
        | GtopError::NoSuchFamily(_)
        | GtopError::NoSuchInteraction { .. } => 2,
        GtopError::Http(_) | GtopError::Status { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut resolved = ConfigLoader::resolve(cli.config.as_deref())?;
    if let Some(attempts) = cli.attempts {
        resolved.attempts = attempts;
    }

    let result = match cli.command {
        Commands::Ligand(args) => run_ligand(&resolved, args)?,
        Commands::Target(args) => run_target(&resolved, args)?,
        Commands::Interaction(args) => run_interaction(&resolved, args)?,
    };
    info!(entity = result.entity, count = result.count, "resolved");
    JsonOutput::print_result(&result).into_diagnostic()?;
    Ok(())
}

fn run_ligand(resolved: &ResolvedConfig, args: LigandArgs) -> Result<ResolveResult, GtopError> {
    let resolver = resolved.build_resolver()?;
    let ligand = resolver.repository().ligand(args.ligand_id)?;
    let pdbs = resolver.ligand(&ligand);
    let scope = args.scope.scope();
    let codes = match (args.smiles_mode, scope) {
        (Some(mode), _) => pdbs.by_structure_string(mode),
        (None, Scope::Annotated) => pdbs.annotated_codes(),
        (None, Scope::External) => pdbs.all_external(),
        (None, Scope::All) => pdbs.all(),
    };
    let scope = if args.smiles_mode.is_some() {
        Scope::External
    } else {
        scope
    };
    Ok(result("ligand", args.ligand_id, None, None, scope, codes))
}

fn run_target(resolved: &ResolvedConfig, args: TargetArgs) -> Result<ResolveResult, GtopError> {
    let resolver = resolved.build_resolver()?;
    let target = resolver.repository().target(args.target_id)?;
    let species = args.species.map(Species::new);
    let view = species.clone().map(|species| target.for_species(species));
    let pdbs = match &view {
        Some(view) => resolver.species_target(view),
        None => resolver.target(&target),
    };
    let scope = args.scope.scope();
    let codes = match scope {
        Scope::Annotated => pdbs.annotated_codes(),
        Scope::External => pdbs.by_accession(),
        Scope::All => pdbs.all(),
    };
    Ok(result(
        "target",
        args.target_id,
        None,
        species.map(|species| species.as_str().to_string()),
        scope,
        codes,
    ))
}

fn run_interaction(
    resolved: &ResolvedConfig,
    args: InteractionArgs,
) -> Result<ResolveResult, GtopError> {
    let resolver = resolved.build_resolver()?;
    let interaction = resolver
        .repository()
        .interaction(args.ligand_id, args.interaction_id)?;
    let pdbs = resolver.interaction(&interaction);
    let scope = args.scope.scope();
    let codes = match scope {
        Scope::Annotated => pdbs.annotated_codes(),
        Scope::External => pdbs.all_external(),
        Scope::All => pdbs.all(),
    };
    Ok(result(
        "interaction",
        args.ligand_id,
        Some(args.interaction_id),
        interaction.species().map(str::to_string),
        scope,
        codes,
    ))
}

fn result(
    entity: &'static str,
    id: u64,
    interaction_id: Option<u64>,
    species: Option<String>,
    scope: Scope,
    codes: CodeSet,
) -> ResolveResult {
    ResolveResult {
        entity,
        id,
        interaction_id,
        species,
        scope,
        count: codes.len(),
        codes,
    }
}
