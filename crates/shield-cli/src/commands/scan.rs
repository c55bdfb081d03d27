use crate::cli::ScanArgs;
use crate::config::{self, StudyFile};
use crate::error::Result;
use crate::ui::UiManager;
use synchshield::engine::progress::ProgressReporter;
use synchshield::engine::sim::{ProcessEngine, ProcessReducer};
use synchshield::workflows::{self, scan::ScanResult};
use tracing::info;

pub fn run(args: ScanArgs) -> Result<()> {
    let file = StudyFile::load(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let resolved = config::resolve_scan(file, &args)?;

    let engine = ProcessEngine::new(&resolved.engine_executable);
    let reducer = ProcessReducer::new(&resolved.reducer_executable);

    let ui = UiManager::new();
    let reporter = ProgressReporter::with_callback(ui.callback());

    println!(
        "Scanning {} thicknesses of {} ({} trials each)...",
        resolved.scan.thicknesses.len(),
        resolved.scan.material,
        resolved.scan.run_count
    );
    let result = workflows::scan::run(
        &resolved.scan,
        resolved.variant.as_ref(),
        &engine,
        &reducer,
        &reporter,
    )?;
    drop(reporter);

    print_summary(&resolved.scan.material, &result);
    println!(
        "Tables written to: {}",
        resolved.scan.output_dir.display()
    );
    Ok(())
}

fn print_summary(material: &str, result: &ScanResult) {
    println!("\n{material}: absorbed fraction by barrier thickness");
    println!("{:>12}  {:>10}  {:>10}  {:>21}", "thickness/m", "mean", "err", "range");
    for row in &result.rows {
        let f = &row.summary.fraction_absorbed;
        let (lo, hi) = row.summary.fraction_range;
        println!(
            "{:>12.4}  {:>10.6}  {:>10.6}  [{:>8.6}, {:>8.6}]",
            row.thickness, f.mean, f.err, lo, hi
        );
    }
}
