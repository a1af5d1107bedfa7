use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn audit() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("netcfg-audit"))
}

#[test]
fn classify_prints_active_body_lines() {
    audit()
        .args(["-z", "-n", "classify"])
        .arg(fixture("fixtures/edge-router.cfg"))
        .args(["--anchor", "^interface", "--body", r"^ip address (\S+)", "--active"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 blocks in "))
        .stdout(predicate::str::contains("active level 2\n"))
        .stdout(predicate::str::contains(
            "04:ip address 1.1.1.1 255.255.255.255\n\
             08:ip address 203.0.113.2 255.255.255.252\n\
             13:ip address 99.99.16.9/28\n\
             17:ip address 99.99.16.20 255.255.255.240",
        ))
        .stdout(predicate::str::contains("interface Loopback0").not());
}

#[test]
fn classify_separates_blocks() {
    audit()
        .args(["-z", "classify"])
        .arg(fixture("fixtures/edge-router.cfg"))
        .args(["--anchor", "^route-map", "--body", "^match", "--separators"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "route-map STATIC-TO-BGP permit 10\n\
             match ip address prefix-list STATIC-PL\n\
             \n\
             route-map FROM-WAN permit 10\n\
             match ip address prefix-list WAN-PL\n",
        ));
}

#[test]
fn classify_json_dumps_level_records() {
    audit()
        .args(["-j", "classify"])
        .arg(fixture("fixtures/edge-router.cfg"))
        .args(["--anchor", "^router bgp", "--body", "^neighbor", "--secondary", "^redistribute"])
        .args(["--policy", "until-mismatch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"level\": \"2.1\""))
        .stdout(predicate::str::contains("\"level\": \"2.2\""))
        .stdout(predicate::str::contains("\"active\": \"2.2\""));
}

#[test]
fn invalid_pattern_is_reported() {
    audit()
        .arg("classify")
        .arg(fixture("fixtures/edge-router.cfg"))
        .args(["--anchor", "(unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pattern"));
}

#[test]
fn networks_label_interface_addresses() {
    audit()
        .arg("-z")
        .arg("networks")
        .arg(fixture("fixtures/edge-router.cfg"))
        .args(["--pattern", "^ip address"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1.1.1.1/32 : ip address 1.1.1.1 255.255.255.255\n\
             203.0.113.0/30 : ip address 203.0.113.2 255.255.255.252\n\
             99.99.16.0/28 : ip address 99.99.16.9/28\n\
             99.99.16.16/28 : ip address 99.99.16.20 255.255.255.240\n\
             lines=4 networks=4 errors=0",
        ));
}

#[test]
fn strict_networks_reject_host_bits() {
    audit()
        .arg("-z")
        .arg("networks")
        .arg(fixture("fixtures/edge-router.cfg"))
        .args(["--pattern", "^ip address", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.1.1.1/32 : ip address 1.1.1.1"))
        .stdout(predicate::str::contains("error : ip address 99.99.16.9/28"))
        .stdout(predicate::str::contains("lines=4 networks=1 errors=3"));
}
