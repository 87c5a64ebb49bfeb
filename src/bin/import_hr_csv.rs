//! Utility to import a heart-rate CSV export from disk
//!
//! Reads the file, runs ingestion plus the series estimator, prints the
//! result, and stores a workout record unless --dry-run is given.
//!
//! Usage: import_hr_csv <file> [--dry-run] [--title <title>]

use std::path::PathBuf;

fn get_database_path() -> PathBuf {
    std::env::var("NAL_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            std::fs::create_dir_all(&path).ok();
            path.push("nal.db");
            path
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("Usage: import_hr_csv <file> [--dry-run] [--title <title>]");
        std::process::exit(1);
    }

    let file_path = &args[0];
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let title = args
        .iter()
        .position(|a| a == "--title")
        .and_then(|i| args.get(i + 1))
        .cloned();

    let raw = std::fs::read_to_string(file_path)?;

    let db_path = get_database_path();
    println!("Database path: {}", db_path.display());

    let database = nal::db::Database::new(&db_path)?;
    database.with_conn(|conn| {
        nal::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let response = nal::tools::imports::import_heart_rate_text(&database, &raw, !dry_run, title)
        .map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;

    println!("{}", response.message);
    println!(
        "  Rows: {} total, {} used, {} dropped",
        response.total_rows, response.used_rows, response.dropped_rows
    );
    if let (Some(time_col), Some(hr_col)) = (&response.time_column, &response.hr_column) {
        println!("  Columns: time = {:?}, heart rate = {:?}", time_col, hr_col);
    }
    if response.success {
        println!(
            "  Estimate: {} kcal over {:.1} min at {:.0} bpm average",
            response.estimate.kcal, response.estimate.minutes, response.estimate.avg_hr
        );
        if response.training_load > 0.0 {
            println!("  Training load: {:.1}", response.training_load);
        }
        match response.record_id {
            Some(id) => println!("  Stored as record {}", id),
            None => println!("  Dry run: nothing stored"),
        }
    }

    Ok(())
}
