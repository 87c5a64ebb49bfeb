//! Utility to set the estimator profile in the database
//!
//! Usage: set_profile <sex> <age_years> <weight_kg> [hr_rest hr_max] [cal_factor]

use std::path::PathBuf;

use nal::estimate::Sex;

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
    if args.len() < 3 {
        eprintln!("Usage: set_profile <sex> <age_years> <weight_kg> [hr_rest hr_max] [cal_factor]");
        std::process::exit(1);
    }

    let sex = Sex::from_str(&args[0]).ok_or("sex must be male or female")?;
    let age_years: f64 = args[1].parse()?;
    let weight_kg: f64 = args[2].parse()?;
    let (hr_rest, hr_max) = if args.len() >= 5 {
        (Some(args[3].parse()?), Some(args[4].parse()?))
    } else {
        (None, None)
    };
    let cal_factor: f64 = match args.len() {
        4 => args[3].parse()?,
        6 => args[5].parse()?,
        _ => 1.0,
    };

    let db_path = get_database_path();
    println!("Database path: {}", db_path.display());

    let database = nal::db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        nal::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    // Set the profile
    database.with_conn(|conn| {
        let profile =
            nal::models::Profile::set(conn, sex, age_years, weight_kg, hr_rest, hr_max, cal_factor)?;
        println!("Profile set:");
        println!("  Sex: {}", profile.sex.as_str());
        println!("  Age: {} years", profile.age_years);
        println!("  Weight: {} kg", profile.weight_kg);
        if let (Some(rest), Some(max)) = (profile.hr_rest, profile.hr_max) {
            println!("  Heart rate: {} resting / {} max", rest, max);
        }
        println!("  Calibration: {}", profile.cal_factor);
        println!("  Updated: {}", profile.updated_at);
        Ok(())
    })?;

    Ok(())
}
