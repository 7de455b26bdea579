//! Integration tests exercising the `tmplminer` binary end to end
//! against a small fixture fleet written to a temp directory.

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

fn acl_json(src_prefix: &str) -> String {
    format!(
        r#"{{
            "configurationFormat": "CISCO_IOS",
            "ipAccessLists": {{
                "BLOCK-IN": {{
                    "lines": [{{
                        "action": "PERMIT",
                        "matchCondition": {{
                            "headerSpace": {{
                                "ipProtocols": ["tcp"],
                                "srcIps": {{ "class": "...PrefixIpSpace", "prefix": "{src_prefix}" }},
                                "dstIps": {{ "class": "...UniverseIpSpace" }},
                                "srcPorts": [],
                                "dstPorts": ["443-443"]
                            }}
                        }}
                    }}]
                }}
            }}
        }}"#
    )
}

#[test]
fn info_lists_segment_names() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("r1.json"), acl_json("10.0.0.0/24")).unwrap();
    fs::write(dir.path().join("r2.json"), acl_json("10.0.0.0/24")).unwrap();

    Command::cargo_bin("tmplminer")
        .unwrap()
        .args(["info", dir.path().to_str().unwrap(), "-f", "acl"])
        .assert()
        .success()
        .stdout(contains("BLOCK-IN"))
        .stdout(contains("2 devices"));
}

#[test]
fn mine_reports_exact_consistency_for_identical_fleet() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("r1.json"), acl_json("10.0.0.0/24")).unwrap();
    fs::write(dir.path().join("r2.json"), acl_json("10.0.0.0/24")).unwrap();

    Command::cargo_bin("tmplminer")
        .unwrap()
        .args(["mine", dir.path().to_str().unwrap(), "-f", "acl", "-p", "BLOCK-IN", "--quiet"])
        .assert()
        .success()
        .stdout(contains("ExactConsistency"));
}

#[test]
fn mine_writes_reports_to_output_directory() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("r1.json"), acl_json("10.0.0.0/24")).unwrap();

    let out = tempdir().unwrap();

    Command::cargo_bin("tmplminer")
        .unwrap()
        .args([
            "mine",
            dir.path().to_str().unwrap(),
            "-f",
            "acl",
            "-p",
            "BLOCK-IN",
            "-o",
            out.path().to_str().unwrap(),
            "--quiet",
        ])
        .assert()
        .success();

    assert!(out.path().join("BLOCK-IN.txt").exists());
}

#[test]
fn mine_rejects_empty_input_directory() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("tmplminer")
        .unwrap()
        .args(["mine", dir.path().to_str().unwrap(), "-f", "acl", "-p", "BLOCK-IN"])
        .assert()
        .failure()
        .stderr(contains("no device configuration files found"));
}
