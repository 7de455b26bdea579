//! `tmplminer info`: list the segment names a flavor finds across a
//! fleet, with per-device counts, without templating anything — useful
//! for picking a `--pattern` to mine.

use indexmap::IndexMap;
use serde_json::Value;

use crate::args::{Flavor, InfoArgs};
use crate::devices::load_devices;
use crate::error::Result;

fn collection_key(flavor: Flavor) -> &'static str {
    match flavor {
        Flavor::Acl => "ipAccessLists",
        Flavor::PrefixList => "routeFilterLists",
    }
}

pub fn run(args: InfoArgs) -> Result<()> {
    let devices = load_devices(&args.input)?;
    let key = collection_key(args.flavor);

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for device_json in devices.values() {
        if let Some(segments) = device_json.get(key).and_then(Value::as_object) {
            for name in segments.keys() {
                *counts.entry(name.clone()).or_default() += 1;
            }
        }
    }

    counts.sort_by(|_, a, _, b| b.cmp(a));
    println!("{} devices, {} distinct segment names", devices.len(), counts.len());
    for (name, count) in &counts {
        println!("{count:>5}  {name}");
    }

    Ok(())
}
