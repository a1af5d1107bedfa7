use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use regex::Regex;

use netcfg_core::format::{format_group, format_json};
use netcfg_core::project::{compare, difference, equals, networks};
use netcfg_core::{
    extract_addresses, Annotation, Classifier, ExtractOptions, Level, LeveledGroup,
    NetworkProjector, PatternProjector, TreeBuilder,
};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn config_lines() -> Vec<String> {
    fs::read_to_string(fixture("fixtures/edge-router.cfg"))
        .expect("fixture should be readable")
        .lines()
        .map(|line| line.trim_start().to_string())
        .collect()
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("pattern")
}

fn texts(group: &LeveledGroup) -> Vec<&str> {
    group.lines().iter().map(|l| l.text.as_str()).collect()
}

#[test]
fn permissive_extraction_reports_malformed_acl_entry() {
    let lines = config_lines();
    let options = ExtractOptions {
        strict: false,
        simple: true,
    };
    let invalid: Vec<&str> = lines
        .iter()
        .filter(|line| {
            extract_addresses(line, &options)
                .expect("extract")
                .iter()
                .any(|span| !span.validity.is_ok())
        })
        .map(String::as_str)
        .collect();
    assert_eq!(
        invalid,
        vec!["30 permit ip 999.100.8.20 0.0.0.3 any"]
    );
}

#[test]
fn acl_entries_are_checked_against_static_routes() {
    let lines = config_lines();
    let acl = Classifier::flat(re(r"^\d+ permit ip")).classify(&lines).expect("acl");
    let routes = Classifier::flat(re(r"^ip route ")).classify(&lines).expect("routes");
    let projector = NetworkProjector::default();

    let result = compare(&acl, &routes, &projector).expect("compare");
    assert!(result.missing.is_empty());
    assert_eq!(
        texts(&result.errors),
        vec!["not found: 30 permit ip 999.100.8.20 0.0.0.3 any"]
    );

    let extra = difference(&routes, &acl, &projector);
    assert_eq!(texts(&extra), vec!["ip route 0.0.0.0 0.0.0.0 203.0.113.1"]);
}

#[test]
fn lan_interfaces_are_labelled_with_networks() {
    let lines = config_lines();
    let lan = Classifier::nested(re(r"^interface GigabitEthernet0/[12]$"), re(r"^ip address"))
        .classify(&lines)
        .expect("lan");
    assert_eq!(lan.active(), Level::Body);

    let labelled = lan.with_network_labels(false).expect("labels");
    assert_eq!(
        texts(&labelled),
        vec![
            "99.99.16.0/28 : ip address 99.99.16.9/28",
            "99.99.16.16/28 : ip address 99.99.16.20 255.255.255.240",
        ]
    );
    assert_eq!(
        networks(&lan, false),
        vec![
            Some("99.99.16.0/28".to_string()),
            Some("99.99.16.16/28".to_string())
        ]
    );
    assert_eq!(networks(&lan, true), vec![None, None]);
}

#[test]
fn access_group_tree_lists_acl_entries() {
    let lines = config_lines();
    let roots = Classifier::flat(re(r"^ip access-group")).classify(&lines).expect("roots");
    let acls = Classifier::nested(re(r"^ip access-list"), re(r"^\d+ (permit|deny)"))
        .classify(&lines)
        .expect("acls");
    let key = re(r"(?:access-group|access-list extended) (\S+)");

    let tree = TreeBuilder::new(&roots, &key, &acls).render().expect("tree");
    assert_eq!(
        format_group(&tree, None),
        [
            "ip access-group EDGE-IN in",
            "├ 10 permit ip 100.100.8.0 0.0.0.3 any",
            "├ 20 permit ip 100.100.8.16 0.0.0.3 any",
            "├ 30 permit ip 999.100.8.20 0.0.0.3 any",
            "└ 40 deny ip any any",
        ]
        .join("\n")
    );
}

#[test]
fn redistribution_tree_reaches_prefix_lists() {
    let lines = config_lines();
    let roots = Classifier::flat(re(r"^redistribute static")).classify(&lines).expect("roots");
    let maps = Classifier::nested(re(r"^route-map"), re(r"^match"))
        .classify(&lines)
        .expect("maps");
    let lists = Classifier::flat(re(r"^ip prefix-list"))
        .classify(&lines)
        .expect("lists")
        .annotate(&Annotation::Addresses(ExtractOptions::default()))
        .expect("annotate");
    let root_key = re(r"route-map (\S+)");
    let child_key = re(r"prefix-list (\S+)");

    let tree = TreeBuilder::new(&roots, &root_key, &maps)
        .leaves(&lists, &child_key)
        .render()
        .expect("tree");
    assert_eq!(
        texts(&tree),
        vec![
            "redistribute static route-map STATIC-TO-BGP",
            "└ route-map STATIC-TO-BGP permit 10",
            " └ match ip address prefix-list STATIC-PL",
            "   ├ ip prefix-list STATIC-PL seq 5 permit 100.100.8.0/30",
            "   └ ip prefix-list STATIC-PL seq 10 permit 100.100.8.16/30",
        ]
    );

    let json = format_json(&tree);
    assert!(json.contains("\"kind\": \"key\""));
    assert!(json.contains("\"kind\": \"ipv4_network\""));
}

#[test]
fn prefix_lists_compare_by_pattern() {
    let lines = config_lines();
    let static_pl = Classifier::flat(re(r"^ip prefix-list STATIC-PL"))
        .classify(&lines)
        .expect("static");
    let wan_pl = Classifier::flat(re(r"^ip prefix-list WAN-PL"))
        .classify(&lines)
        .expect("wan");
    let projector = PatternProjector(re(r"permit (\S+)"));

    assert!(!equals(&static_pl, &wan_pl, &projector));
    assert_eq!(
        texts(&difference(&wan_pl, &static_pl, &projector)),
        vec!["ip prefix-list WAN-PL seq 10 permit 100.100.8.4/30"]
    );
}
