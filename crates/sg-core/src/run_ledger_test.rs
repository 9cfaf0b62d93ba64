use super::*;
use tempfile::TempDir;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct StubReport {
    passed: bool,
    rows: usize,
}

#[test]
fn test_ledger_layout() {
    let ledger = RunLedger::open(Path::new("/tmp/target"), RunId::new("abc"));
    assert_eq!(ledger.dir(), Path::new("/tmp/target/runs/abc"));
    assert_eq!(
        ledger.report_path("stg"),
        PathBuf::from("/tmp/target/runs/abc/stg.report.json")
    );
}

#[test]
fn test_save_and_load_report() {
    let target = TempDir::new().unwrap();
    let ledger = RunLedger::open(target.path(), RunId::new("r1"));
    let stage = StageName::new("stg");

    assert!(ledger.load_report::<StubReport>("stg").unwrap().is_none());

    let report = StubReport {
        passed: false,
        rows: 12,
    };
    let path = ledger.save_report(&stage, &report).unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let loaded: StubReport = ledger.load_report("stg").unwrap().unwrap();
    assert_eq!(loaded, report);
}

#[test]
fn test_reports_are_scoped_by_run() {
    let target = TempDir::new().unwrap();
    let first = RunLedger::open(target.path(), RunId::new("r1"));
    let second = RunLedger::open(target.path(), RunId::new("r2"));

    first
        .save_report(&StageName::new("stg"), &StubReport { passed: true, rows: 1 })
        .unwrap();

    assert!(second.load_report::<StubReport>("stg").unwrap().is_none());
    assert_eq!(first.reported_stages().unwrap(), vec![StageName::new("stg")]);
    assert!(second.reported_stages().unwrap().is_empty());
}

#[test]
fn test_raw_input_fingerprint_lifecycle() {
    let target = TempDir::new().unwrap();
    let raw_dir = TempDir::new().unwrap();
    let raw = raw_dir.path().join("inspections_raw.csv");
    fs::write(&raw, "serial_number\nPR1\n").unwrap();

    let ledger = RunLedger::open(target.path(), RunId::new("r1"));

    let first = ledger.check_raw_input(&raw).unwrap();
    assert!(matches!(first, RawCheck::Recorded { .. }));

    let second = ledger.check_raw_input(&raw).unwrap();
    assert!(matches!(second, RawCheck::Unchanged { .. }));

    fs::write(&raw, "serial_number\nPR1\nPR2\n").unwrap();
    let third = ledger.check_raw_input(&raw).unwrap();
    assert!(third.is_mutated());
}

#[test]
fn test_raw_fingerprints_are_per_run() {
    let target = TempDir::new().unwrap();
    let raw_dir = TempDir::new().unwrap();
    let raw = raw_dir.path().join("violations_raw.csv");
    fs::write(&raw, "a\n1\n").unwrap();

    RunLedger::open(target.path(), RunId::new("r1"))
        .check_raw_input(&raw)
        .unwrap();
    fs::write(&raw, "a\n2\n").unwrap();

    // A new run takes a fresh snapshot fingerprint
    let check = RunLedger::open(target.path(), RunId::new("r2"))
        .check_raw_input(&raw)
        .unwrap();
    assert!(matches!(check, RawCheck::Recorded { .. }));
}
