//! Instance table loading, request validation, and include-scanning tests.

use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use topostamp_core::{
    config::load_instance_table,
    scan::find_invocations,
    types::{InstanceName, InstanceSet, InstanceSpec, InstantiationRequest},
    RequestError, ScanError,
};

fn request(instances: InstanceSet) -> InstantiationRequest {
    InstantiationRequest {
        template_files: vec!["subsystem.fppt".into()],
        offset_multiple: 0x100,
        instances,
        search_locations: vec![],
        output_dir: None,
    }
}

// ---------------------------------------------------------------------------
// 1. Instance tables
// ---------------------------------------------------------------------------

#[test]
fn load_missing_table_returns_io_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = load_instance_table(&dir.path().join("instances.yaml")).unwrap_err();
    assert!(matches!(err, RequestError::Io { .. }), "got: {err}");
    assert!(err.to_string().contains("instances.yaml"));
}

#[test]
fn load_corrupt_table_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("instances.yaml");
    file.write_str("instances: [unclosed\n").expect("write");

    let err = load_instance_table(file.path()).unwrap_err();
    assert!(matches!(err, RequestError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("instances.yaml"));
}

#[test]
fn loaded_table_drives_context_order() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("instances.yaml");
    file.write_str(
        "instances:\n  - name: b\n    params:\n      depth: 4\n  - name: a\n",
    )
    .expect("write");

    let rows = load_instance_table(file.path()).expect("load");
    let ctxs = request(InstanceSet::Table(rows)).contexts().expect("contexts");
    assert_eq!(ctxs[0].name, InstanceName::from("b"));
    assert_eq!(ctxs[0].id_offset, 0);
    assert_eq!(ctxs[1].name, InstanceName::from("a"));
    assert_eq!(ctxs[1].id_offset, 0x100);
    assert_eq!(ctxs[0].params["depth"], 4);
}

// ---------------------------------------------------------------------------
// 2. Validation
// ---------------------------------------------------------------------------

#[rstest]
#[case("")]
#[case("has space")]
#[case("dotted.name")]
#[case("nested/name")]
fn invalid_instance_names_rejected(#[case] name: &str) {
    let err = request(InstanceSet::Table(vec![InstanceSpec::named(name)]))
        .validate()
        .unwrap_err();
    assert!(matches!(err, RequestError::InvalidInstanceName { .. }), "got: {err}");
}

#[rstest]
#[case(1, 7)]
#[case(5, 100)]
#[case(64, 0x1000)]
fn offsets_are_ordinal_times_multiple(#[case] count: usize, #[case] multiple: u64) {
    let mut req = request(InstanceSet::Count(count));
    req.offset_multiple = multiple;
    let ctxs = req.contexts().expect("contexts");
    assert_eq!(ctxs.len(), count);
    for (k, ctx) in ctxs.iter().enumerate() {
        assert_eq!(ctx.index, k);
        assert_eq!(ctx.id_offset, k as u64 * multiple);
    }
    assert!(ctxs.windows(2).all(|w| w[0].id_offset < w[1].id_offset));
}

#[test]
fn duplicate_template_rejected() {
    let mut req = request(InstanceSet::Count(1));
    req.template_files.push("subsystem.fppt".into());
    assert!(matches!(
        req.validate().unwrap_err(),
        RequestError::DuplicateTemplate { .. }
    ));
}

// ---------------------------------------------------------------------------
// 3. Include scanning
// ---------------------------------------------------------------------------

#[test]
fn scan_finds_invocations_through_plain_includes_and_definitions() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let lib = root.child("lib");
    lib.child("topology-templates/radio.fppt")
        .write_str("include \"antenna.main.fppt\"\n")
        .unwrap();
    lib.child("topology-templates/antenna.fppt").write_str("@ antenna\n").unwrap();

    let topo = root.child("deploy");
    topo.child("topology.fpp")
        .write_str("topology Main {\n  include \"radio.uhf.fppt\"\n  include \"extra.fpp\"\n}\n")
        .unwrap();
    topo.child("extra.fpp").write_str("include 'radio.sband.fppt'\n").unwrap();

    let found = find_invocations(
        &[topo.path().join("topology.fpp")],
        &[lib.path().to_path_buf()],
    )
    .expect("scan");

    let names: Vec<_> = found.iter().map(|i| i.instance.0.as_str()).collect();
    assert_eq!(names, ["uhf", "main", "sband"]);
    assert!(found[0].path.ends_with("deploy/radio.uhf.fppt"));
    assert!(found[1].path.ends_with("topology-templates/antenna.main.fppt"));
    assert!(found[2].template.ends_with("topology-templates/radio.fppt"));
}

#[test]
fn scan_reports_missing_definition() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let topo = root.child("topology.fpp");
    topo.write_str("include \"ghost.one.fppt\"\n").unwrap();

    let err = find_invocations(&[topo.path().to_path_buf()], &[root.path().to_path_buf()])
        .unwrap_err();
    assert!(matches!(err, ScanError::TemplateNotFound { .. }), "got: {err}");
    assert!(predicate::str::contains("ghost.fppt").eval(&err.to_string()));
}

#[test]
fn scan_reports_ambiguous_definition() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("a/topology-templates/dup.fppt").write_str("").unwrap();
    root.child("b/topology-templates/dup.fppt").write_str("").unwrap();
    let topo = root.child("topology.fpp");
    topo.write_str("include \"dup.x.fppt\"\n").unwrap();

    let err = find_invocations(
        &[topo.path().to_path_buf()],
        &[root.path().join("a"), root.path().join("b")],
    )
    .unwrap_err();
    assert!(matches!(err, ScanError::AmbiguousTemplate { .. }), "got: {err}");
}

#[test]
fn scan_rejects_include_cycles() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    root.child("a.fpp").write_str("include \"b.fpp\"\n").unwrap();
    root.child("b.fpp").write_str("include \"a.fpp\"\n").unwrap();

    let err = find_invocations(&[root.path().join("a.fpp")], &[]).unwrap_err();
    assert!(matches!(err, ScanError::IncludeCycle { .. }), "got: {err}");
}
