//! End-to-end pipeline tests: ingest a small synthetic fleet, run the
//! full generalization driver, and check the reported consistency and
//! parameter groups.

use indexmap::IndexMap;
use serde_json::json;
use tmplminer_core::worker::NoopMonitor;
use tmplminer_core::{run_pattern, AclFlavor, Consistency, OutlierThresholds, PrefixListFlavor};

fn acl_device(src_prefix: &str) -> serde_json::Value {
    json!({
        "configurationFormat": "CISCO_IOS",
        "ipAccessLists": {
            "BLOCK-IN": {
                "lines": [{
                    "action": "PERMIT",
                    "matchCondition": {
                        "headerSpace": {
                            "ipProtocols": ["tcp"],
                            "srcIps": { "class": "...PrefixIpSpace", "prefix": src_prefix },
                            "dstIps": { "class": "...UniverseIpSpace" },
                            "srcPorts": [],
                            "dstPorts": ["443-443"]
                        }
                    }
                }]
            }
        }
    })
}

#[test]
fn identical_acls_report_as_consistent() {
    let mut devices = IndexMap::new();
    devices.insert("r1".to_string(), acl_device("10.0.0.0/24"));
    devices.insert("r2".to_string(), acl_device("10.0.0.0/24"));
    devices.insert("r3".to_string(), acl_device("10.0.0.0/24"));

    let flavor = AclFlavor;
    let monitor = NoopMonitor;
    let result = run_pattern(&flavor, "BLOCK-IN", &devices, &monitor, &OutlierThresholds::default()).unwrap();

    assert_eq!(result.consistency, Consistency::ExactConsistency);
    assert!(result.report.is_none());
}

#[test]
fn rare_outlier_prefix_is_flagged() {
    // 40 devices share a prefix, one device is a rare outlier — the
    // common case alone would just parameterize cleanly and report
    // consistent, as exercised by `common_values_parameterize_without_a_report`
    // below.
    let mut devices = IndexMap::new();
    for i in 0..40 {
        devices.insert(format!("r{i}"), acl_device("10.0.0.0/24"));
    }
    devices.insert("outlier".to_string(), acl_device("10.0.1.0/24"));

    let flavor = AclFlavor;
    let monitor = NoopMonitor;
    let result = run_pattern(&flavor, "BLOCK-IN", &devices, &monitor, &OutlierThresholds::default()).unwrap();

    assert_eq!(result.consistency, Consistency::Inconsistent);
    let report = result.report.expect("a rare outlier value produces a report");
    assert!(report.meta_template_text.contains('P'));
    assert!(!report.parameter_table.is_empty());
    assert!(!report.single_param_outliers.is_empty());
}

#[test]
fn common_values_parameterize_without_a_report() {
    // Three devices, three distinct (equally common) prefix values: the
    // parameter is real, but no single value is rare enough to flag as
    // an outlier, and the line's presence predicate is the same on every
    // device — nothing here is worth a human's attention.
    let mut devices = IndexMap::new();
    devices.insert("r1".to_string(), acl_device("10.0.0.0/24"));
    devices.insert("r2".to_string(), acl_device("10.0.1.0/24"));
    devices.insert("r3".to_string(), acl_device("10.0.2.0/24"));

    let flavor = AclFlavor;
    let monitor = NoopMonitor;
    let result = run_pattern(&flavor, "BLOCK-IN", &devices, &monitor, &OutlierThresholds::default()).unwrap();

    assert_eq!(result.consistency, Consistency::Consistent);
    assert!(result.report.is_none());
}

#[test]
fn pattern_not_found_reports_not_found() {
    let mut devices = IndexMap::new();
    devices.insert("r1".to_string(), acl_device("10.0.0.0/24"));

    let flavor = AclFlavor;
    let monitor = NoopMonitor;
    let result = run_pattern(&flavor, "NO-SUCH-ACL", &devices, &monitor, &OutlierThresholds::default()).unwrap();

    assert_eq!(result.consistency, Consistency::NotFound);
    assert!(result.report.is_none());
}

fn prefix_list_device(network: &str, length_range: &str) -> serde_json::Value {
    json!({
        "configurationFormat": "CISCO_IOS",
        "routeFilterLists": {
            "CUSTOMER-ROUTES": {
                "lines": [{ "action": "PERMIT", "ipWildcard": network, "lengthRange": length_range }]
            }
        }
    })
}

#[test]
fn prefix_list_reorder_is_consistent() {
    // Two distinct network/length lines on each device, emitted in
    // different orders — the aligner should fold them into one
    // meta-template with no parameters and no leftover differences.
    let json_a = json!({
        "configurationFormat": "CISCO_IOS",
        "routeFilterLists": {
            "CUSTOMER-ROUTES": {
                "lines": [
                    { "action": "PERMIT", "ipWildcard": "10.0.0.0/24", "lengthRange": "24-24" },
                    { "action": "PERMIT", "ipWildcard": "10.0.1.0/24", "lengthRange": "24-24" }
                ]
            }
        }
    });
    let json_b = json!({
        "configurationFormat": "CISCO_IOS",
        "routeFilterLists": {
            "CUSTOMER-ROUTES": {
                "lines": [
                    { "action": "PERMIT", "ipWildcard": "10.0.1.0/24", "lengthRange": "24-24" },
                    { "action": "PERMIT", "ipWildcard": "10.0.0.0/24", "lengthRange": "24-24" }
                ]
            }
        }
    });

    let mut devices = IndexMap::new();
    devices.insert("r1".to_string(), json_a);
    devices.insert("r2".to_string(), json_b);

    let flavor = PrefixListFlavor;
    let monitor = NoopMonitor;
    let result = run_pattern(&flavor, "CUSTOMER-ROUTES", &devices, &monitor, &OutlierThresholds::default()).unwrap();

    assert_eq!(result.consistency, Consistency::ReorderConsistency);
    assert!(result.report.is_none());
}

#[test]
fn prefix_list_length_range_difference_parameterizes() {
    let mut devices = IndexMap::new();
    for i in 0..40 {
        devices.insert(format!("r{i}"), prefix_list_device("10.0.0.0/24", "24-32"));
    }
    devices.insert("outlier".to_string(), prefix_list_device("10.0.0.0/24", "24-28"));

    let flavor = PrefixListFlavor;
    let monitor = NoopMonitor;
    let result = run_pattern(&flavor, "CUSTOMER-ROUTES", &devices, &monitor, &OutlierThresholds::default()).unwrap();

    assert_eq!(result.consistency, Consistency::Inconsistent);
    let report = result.report.expect("a rare outlier length range produces a report");
    assert!(!report.single_param_outliers.is_empty());
}

#[test]
fn prefix_list_falls_back_to_route6_filter_lists() {
    // Device with no matching name under `routeFilterLists` at all, only
    // under `route6FilterLists` — the secondary collection must still be
    // scanned for a matching pattern.
    let ipv6_only = json!({
        "configurationFormat": "CISCO_IOS",
        "route6FilterLists": {
            "CUSTOMER-ROUTES6": {
                "lines": [{ "action": "PERMIT", "ipWildcard": "2001:db8::/32", "lengthRange": "32-32" }]
            }
        }
    });
    let mut devices = IndexMap::new();
    devices.insert("r1".to_string(), ipv6_only.clone());
    devices.insert("r2".to_string(), ipv6_only);

    let flavor = PrefixListFlavor;
    let monitor = NoopMonitor;
    let result = run_pattern(&flavor, "CUSTOMER-ROUTES6", &devices, &monitor, &OutlierThresholds::default()).unwrap();

    assert_eq!(result.consistency, Consistency::ExactConsistency);
}

#[test]
fn prefix_list_prefers_primary_over_route6_filter_lists() {
    // A device carrying both collections, with a matching name only in
    // the primary: the primary's match must win even though a
    // `route6FilterLists` map is also present (just without that name).
    let device = json!({
        "configurationFormat": "CISCO_IOS",
        "routeFilterLists": {
            "CUSTOMER-ROUTES": {
                "lines": [{ "action": "PERMIT", "ipWildcard": "10.0.0.0/24", "lengthRange": "24-24" }]
            }
        },
        "route6FilterLists": {
            "OTHER-ROUTES6": {
                "lines": [{ "action": "PERMIT", "ipWildcard": "2001:db8::/32", "lengthRange": "32-32" }]
            }
        }
    });
    let mut devices = IndexMap::new();
    devices.insert("r1".to_string(), device.clone());
    devices.insert("r2".to_string(), device);

    let flavor = PrefixListFlavor;
    let monitor = NoopMonitor;
    let result = run_pattern(&flavor, "CUSTOMER-ROUTES", &devices, &monitor, &OutlierThresholds::default()).unwrap();

    assert_eq!(result.consistency, Consistency::ExactConsistency);
}
