use crate::cli::LatticeArgs;
use crate::config::{self, StudyFile};
use crate::error::Result;
use synchshield::core::selection::SelectionSet;
use synchshield::engine::config::ScenarioConfigBuilder;
use tracing::info;

/// Generate the lattice files (and the matching histogram specification)
/// for a single scenario, without running any trials.
pub fn run(args: LatticeArgs) -> Result<()> {
    let file = StudyFile::load(&args.config)?;
    let resolved = config::resolve_lattice(file, &args)?;

    let geometry = resolved
        .geometry
        .unwrap_or_else(|| resolved.variant.default_geometry());
    let scenario = ScenarioConfigBuilder::new()
        .material(&resolved.material)
        .events_per_run(resolved.events_per_run)
        .run_count(resolved.run_count)
        .thickness(resolved.thickness)
        .run_key(&resolved.run_key)
        .geometry(geometry)
        .build()
        .map_err(synchshield::engine::error::EngineError::from)?;

    std::fs::create_dir_all(&args.out_dir)?;
    let lattice = resolved.variant.build(&scenario, &args.out_dir)?;

    let selection = SelectionSet::for_study(&scenario.geometry, &resolved.variant.planes());
    let spec_path = args.out_dir.join(format!("analysis-{}.txt", scenario.run_key));
    let mut spec_file = std::fs::File::create(&spec_path)?;
    selection.write_analysis_spec(&mut spec_file)?;

    info!(main = %lattice.main_file.display(), "Lattice generated.");
    println!("Lattice written to: {}", lattice.main_file.display());
    for companion in &lattice.companion_files {
        println!("  with: {}", companion.display());
    }
    println!("Histogram spec:     {}", spec_path.display());
    Ok(())
}
