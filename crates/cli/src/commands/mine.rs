//! `tmplminer mine`: run the generalization driver over one or more
//! segment-name patterns and write a [`PatternReport`] per pattern.

use std::fs;
use std::path::Path;

use tmplminer_core::{run_pattern, AclFlavor, Consistency, PrefixListFlavor, SegmentFlavor};
use tracing::info;

use crate::args::{Flavor, MineArgs};
use crate::config::MinerConfig;
use crate::devices::load_devices;
use crate::error::Result;
use crate::progress::BarMonitor;

fn flavor_for(flavor: Flavor) -> Box<dyn SegmentFlavor> {
    match flavor {
        Flavor::Acl => Box::new(AclFlavor),
        Flavor::PrefixList => Box::new(PrefixListFlavor),
    }
}

pub fn run(args: MineArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => MinerConfig::load(path)?,
        None => MinerConfig::default(),
    };
    let thresholds = config.thresholds();

    let devices = load_devices(&args.input)?;
    let flavor = flavor_for(args.flavor);

    if let Some(dir) = &args.output {
        fs::create_dir_all(dir)?;
    }

    for pattern in &args.patterns {
        let monitor = BarMonitor::new(args.quiet);
        let result = run_pattern(flavor.as_ref(), pattern, &devices, &monitor, &thresholds)?;
        monitor.finish();

        info!(pattern, consistency = ?result.consistency, "mined pattern");

        match &args.output {
            Some(dir) => write_report(dir, pattern, &result)?,
            None => print_report(pattern, &result),
        }
    }

    Ok(())
}

fn print_report(pattern: &str, result: &tmplminer_core::DriverResult) {
    println!("=== {pattern} ===");
    println!("consistency: {:?}", result.consistency);
    match &result.report {
        Some(report) => {
            println!("{}", report.meta_template_text);
            println!("{}", serde_json::to_string_pretty(report).unwrap_or_default());
        }
        None if result.consistency != Consistency::NotFound => {
            println!("(no differences to report — every matching device agreed)");
        }
        None => println!("(no matching segments found)"),
    }
}

fn write_report(dir: &Path, pattern: &str, result: &tmplminer_core::DriverResult) -> Result<()> {
    let stem = pattern.replace(['/', '\\', '*', '^', '$'], "_");
    if let Some(report) = &result.report {
        fs::write(dir.join(format!("{stem}.txt")), &report.meta_template_text)?;
        fs::write(
            dir.join(format!("{stem}.json")),
            serde_json::to_string_pretty(report).unwrap_or_default(),
        )?;
    } else {
        fs::write(
            dir.join(format!("{stem}.txt")),
            format!("consistency: {:?}\n(no differences to report)\n", result.consistency),
        )?;
    }
    Ok(())
}
