use anyhow::{Context, Result};
use std::path::Path;

use check_view::cli::{self, Commands};
use check_view::db::ResultsDb;
use check_view::filter::KindFilter;
use check_view::report::FilteredCounts;
use check_view::tui::{App, run_tui};

fn main() -> Result<()> {
    let cli = cli::parse_args();

    match cli.command {
        Some(Commands::View(args)) => run_view(&args.db, args.kinds.as_deref()),
        Some(Commands::Status(args)) => run_status(&args.db, args.kinds.as_deref()),
        Some(Commands::Report(args)) => run_report(&args.db, args.file_id, args.kinds.as_deref()),
        None => {
            let db = cli
                .db
                .context("missing results database (try: check-view <results.db>)")?;
            if cli.status {
                run_status(&db, cli.kinds.as_deref())
            } else {
                run_view(&db, cli.kinds.as_deref())
            }
        }
    }
}

fn open_db(path: &Path) -> Result<ResultsDb> {
    ResultsDb::open(path)
        .with_context(|| format!("Failed to open results database: {}", path.display()))
}

fn run_view(path: &Path, kinds: Option<&str>) -> Result<()> {
    let db = open_db(path)?;
    let app = App::new(db, kinds)?;
    run_tui(app)
}

fn run_report(path: &Path, file_id: i64, kinds: Option<&str>) -> Result<()> {
    let db = open_db(path)?;
    let mut app = App::new(db, kinds)?;
    app.open_report(file_id)?;
    run_tui(app)
}

/// Print the file list as text, one row per analyzed file.
fn run_status(path: &Path, kinds: Option<&str>) -> Result<()> {
    let db = open_db(path)?;
    let catalog = db.check_kinds()?;
    let filter = KindFilter::from_mask(&catalog, kinds);
    let files = db.files()?;

    println!("{} files | k={}", files.len(), filter.encode());
    for file in &files {
        let counts = FilteredCounts::compute(&file.status_kinds, &filter);
        if counts.is_safe() {
            println!("{:>5}  {}  Safe", file.id, file.path);
        } else {
            println!(
                "{:>5}  {}  ok:{} warning:{} error:{} dead:{}",
                file.id, file.path, counts.ok, counts.warning, counts.error, counts.unreachable
            );
        }
    }
    Ok(())
}
