use super::*;
use crate::report::RuleKind;
use sg_core::{DatasetId, Record, RowCountRelation, RunId, StageName, Value};

fn dataset(stage: &str, records: Vec<Record>) -> Dataset {
    Dataset::from_records(
        DatasetId::new(StageName::new(stage), RunId::new("run1")),
        records,
    )
}

fn inspections(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            Record::new()
                .with("serial_number", format!("PR{:04}", i))
                .with("score", (90 - (i % 10)) as i64)
        })
        .collect()
}

fn kinds(report: &ValidationReport) -> Vec<RuleKind> {
    report.violations().iter().map(|v| v.rule).collect()
}

#[test]
fn test_clean_dataset_passes() {
    let contract = Contract::new(StageName::new("stg"))
        .require("serial_number", Some("VARCHAR"))
        .require("score", Some("BIGINT"))
        .null_rate("score", 0.0)
        .unique(&["serial_number"])
        .row_count(RowCountRelation::EqualToInput);

    let report = validate(&dataset("stg", inspections(20)), &contract, 20);

    assert!(report.passed(), "{:?}", report.violations());
    assert!(report.warnings().is_empty());
    assert_eq!(report.row_count_in(), Some(20));
    assert_eq!(report.row_count_out(), 20);
}

#[test]
fn test_missing_required_column() {
    let contract = Contract::new(StageName::new("stg")).require("facility_name", None);
    let report = validate(&dataset("stg", inspections(3)), &contract, 3);

    assert!(!report.passed());
    assert_eq!(kinds(&report), vec![RuleKind::SchemaViolation]);
    assert_eq!(report.violations()[0].column.as_deref(), Some("facility_name"));
}

#[test]
fn test_type_mismatch_counts_non_null_rows() {
    let records = vec![
        Record::new().with("score", "high"),
        Record::new().with("score", Value::Null),
        Record::new().with("score", "low"),
    ];
    let contract = Contract::new(StageName::new("stg")).require("score", Some("INTEGER"));
    let report = validate(&dataset("stg", records), &contract, 3);

    assert_eq!(kinds(&report), vec![RuleKind::SchemaViolation]);
    assert_eq!(report.violations()[0].count, 2);
}

#[test]
fn test_number_family_accepts_integers() {
    let contract = Contract::new(StageName::new("stg")).require("score", Some("NUMBER"));
    let report = validate(&dataset("stg", inspections(5)), &contract, 5);
    assert!(report.passed());
}

#[test]
fn test_all_null_column_type_is_a_warning() {
    let records = vec![
        Record::new().with("grade", Value::Null),
        Record::new().with("grade", Value::Null),
    ];
    let contract = Contract::new(StageName::new("stg")).require("grade", Some("VARCHAR"));
    let report = validate(&dataset("stg", records), &contract, 2);

    assert!(report.passed());
    assert_eq!(report.warnings().len(), 1);
}

#[test]
fn test_null_rate_equal_to_threshold_passes() {
    let records: Vec<Record> = (0..100)
        .map(|i| {
            let zip = if i < 2 { Value::Null } else { Value::from("90001") };
            Record::new().with("zip", zip)
        })
        .collect();
    let contract = Contract::new(StageName::new("stg")).null_rate("zip", 0.02);

    let report = validate(&dataset("stg", records), &contract, 100);
    assert!(report.passed(), "{:?}", report.violations());
}

#[test]
fn test_null_rate_above_threshold_fails() {
    let records: Vec<Record> = (0..100)
        .map(|i| {
            let zip = if i < 5 { Value::Null } else { Value::from("90001") };
            Record::new().with("zip", zip)
        })
        .collect();
    let contract = Contract::new(StageName::new("stg")).null_rate("zip", 0.0);

    let report = validate(&dataset("stg", records), &contract, 100);
    assert_eq!(kinds(&report), vec![RuleKind::NullRateViolation]);
    assert_eq!(report.violations()[0].count, 5);
}

#[test]
fn test_null_rate_on_empty_dataset_is_zero() {
    let empty = Dataset::new(
        DatasetId::new(StageName::new("stg"), RunId::new("run1")),
        vec![sg_core::ColumnSchema::new("zip", None)],
        Vec::new(),
    );
    let contract = Contract::new(StageName::new("stg")).null_rate("zip", 0.0);
    assert!(validate(&empty, &contract, 0).passed());
}

#[test]
fn test_duplicate_groups_are_counted() {
    // Three rows share PR1 and two share PR2: two duplicate groups
    let records = ["PR1", "PR1", "PR1", "PR2", "PR2", "PR3"]
        .iter()
        .map(|s| Record::new().with("serial_number", *s))
        .collect();
    let contract = Contract::new(StageName::new("stg")).unique(&["serial_number"]);

    let report = validate(&dataset("stg", records), &contract, 6);
    assert_eq!(kinds(&report), vec![RuleKind::UniquenessViolation]);
    assert_eq!(report.violations()[0].count, 2);
    assert!(report.violations()[0].detail.contains("5 rows"));
}

#[test]
fn test_composite_key_uniqueness() {
    let records = vec![
        Record::new().with("facility_id", "F1").with("date", "2024-01-01"),
        Record::new().with("facility_id", "F1").with("date", "2024-01-02"),
        Record::new().with("facility_id", "F2").with("date", "2024-01-01"),
    ];
    let contract = Contract::new(StageName::new("stg")).unique(&["facility_id", "date"]);
    assert!(validate(&dataset("stg", records), &contract, 3).passed());
}

#[test]
fn test_null_keys_collide() {
    let records = vec![
        Record::new().with("serial_number", Value::Null),
        Record::new().with("serial_number", Value::Null),
    ];
    let contract = Contract::new(StageName::new("stg")).unique(&["serial_number"]);
    let report = validate(&dataset("stg", records), &contract, 2);
    assert_eq!(kinds(&report), vec![RuleKind::UniquenessViolation]);
}

#[test]
fn test_uniqueness_on_missing_column_is_schema_violation() {
    let contract = Contract::new(StageName::new("stg")).unique(&["facility_id"]);
    let report = validate(&dataset("stg", inspections(2)), &contract, 2);
    assert_eq!(kinds(&report), vec![RuleKind::SchemaViolation]);
}

#[test]
fn test_equal_to_input_mismatch() {
    let contract = Contract::new(StageName::new("stg")).row_count(RowCountRelation::EqualToInput);
    let report = validate(&dataset("stg", inspections(8)), &contract, 10);

    assert_eq!(kinds(&report), vec![RuleKind::RowCountViolation]);
    assert_eq!(report.violations()[0].count, 2);
}

#[test]
fn test_lte_input() {
    let contract = Contract::new(StageName::new("stg")).row_count(RowCountRelation::LteInput);

    assert!(validate(&dataset("stg", inspections(8)), &contract, 10).passed());
    assert!(validate(&dataset("stg", inspections(10)), &contract, 10).passed());

    let report = validate(&dataset("stg", inspections(12)), &contract, 10);
    assert_eq!(kinds(&report), vec![RuleKind::RowCountViolation]);
    assert_eq!(report.violations()[0].count, 2);
}

#[test]
fn test_lte_input_boundaries_at_one_hundred() {
    let contract = Contract::new(StageName::new("stg")).row_count(RowCountRelation::LteInput);

    let empty = validate(&dataset("stg", Vec::new()), &contract, 100);
    assert!(empty.passed());
    assert_eq!(empty.row_count_out(), 0);
    assert_eq!(empty.row_count_in(), Some(100));

    assert!(validate(&dataset("stg", inspections(100)), &contract, 100).passed());

    let over = validate(&dataset("stg", inspections(101)), &contract, 100);
    assert_eq!(kinds(&over), vec![RuleKind::RowCountViolation]);
    assert_eq!(over.violations()[0].count, 1);
}

#[test]
fn test_any_relation_ignores_counts() {
    let contract = Contract::new(StageName::new("stg")).row_count(RowCountRelation::Any);
    assert!(validate(&dataset("stg", inspections(50)), &contract, 1).passed());
}

#[test]
fn test_missing_input_count_with_relation_fails() {
    let contract = Contract::new(StageName::new("stg")).row_count(RowCountRelation::LteInput);
    let report = ValidationGate::new(&contract).run(&dataset("stg", inspections(1)));

    assert_eq!(kinds(&report), vec![RuleKind::RowCountViolation]);
    assert_eq!(report.row_count_in(), None);
}

#[test]
fn test_all_violations_are_collected() {
    let records = vec![
        Record::new().with("serial_number", "PR1").with("score", Value::Null),
        Record::new().with("serial_number", "PR1").with("score", 120i64),
    ];
    let contract = Contract::new(StageName::new("stg"))
        .require("facility_name", None)
        .null_rate("score", 0.0)
        .unique(&["serial_number"])
        .range("score", Some(0.0), Some(100.0))
        .row_count(RowCountRelation::EqualToInput);

    let report = validate(&dataset("stg", records), &contract, 3);

    assert_eq!(
        kinds(&report),
        vec![
            RuleKind::SchemaViolation,
            RuleKind::NullRateViolation,
            RuleKind::UniquenessViolation,
            RuleKind::RangeViolation,
            RuleKind::RowCountViolation,
        ]
    );
    let row_count: Vec<_> = report.violations_of(RuleKind::RowCountViolation).collect();
    assert_eq!(row_count.len(), 1);
    assert_eq!(row_count[0].count, 1);
}

#[test]
fn test_range_counts_non_numeric_values() {
    let records = vec![
        Record::new().with("latitude", 34.05),
        Record::new().with("latitude", 91.0),
        Record::new().with("latitude", "n/a"),
        Record::new().with("latitude", Value::Null),
    ];
    let contract = Contract::new(StageName::new("stg")).range("latitude", Some(-90.0), Some(90.0));
    let report = validate(&dataset("stg", records), &contract, 4);

    assert_eq!(kinds(&report), vec![RuleKind::RangeViolation]);
    assert_eq!(report.violations()[0].count, 2);
}

#[test]
fn test_not_blank() {
    let records = vec![
        Record::new().with("facility_name", "Taqueria"),
        Record::new().with("facility_name", "   "),
        Record::new().with("facility_name", Value::Null),
    ];
    let mut contract = Contract::new(StageName::new("stg"));
    contract.not_blank.insert("facility_name".to_string());

    let report = validate(&dataset("stg", records), &contract, 3);
    assert_eq!(kinds(&report), vec![RuleKind::NullRateViolation]);
    assert_eq!(report.violations()[0].count, 2);
}

#[test]
fn test_min_rows() {
    let mut contract = Contract::new(StageName::new("stg"));
    contract.min_rows = Some(5);

    let report = validate(&dataset("stg", inspections(3)), &contract, 3);
    assert_eq!(kinds(&report), vec![RuleKind::RowCountViolation]);
    assert_eq!(report.violations()[0].count, 2);
}

#[test]
fn test_unexpected_columns_are_warnings() {
    let contract = Contract::new(StageName::new("stg")).require("serial_number", None);
    let report = validate(&dataset("stg", inspections(2)), &contract, 2);

    assert!(report.passed());
    assert_eq!(report.warnings().len(), 1);
    assert_eq!(report.warnings()[0].column.as_deref(), Some("score"));
}

#[test]
fn test_stage_mismatch_is_a_warning() {
    let contract = Contract::new(StageName::new("int_inspections"));
    let report = validate(&dataset("stg", Vec::new()), &contract, 0);
    assert!(report.passed());
    assert!(report.warnings()[0].detail.contains("int_inspections"));
}

#[test]
fn test_mutated_raw_input_fails_gate() {
    let contract = Contract::new(StageName::new("stg"));
    let checks = vec![
        RawCheck::Unchanged {
            path: "/data/raw/a.csv".to_string(),
            checksum: "aa".to_string(),
        },
        RawCheck::Mutated {
            path: "/data/raw/b.csv".to_string(),
            expected: "bb".to_string(),
            actual: "cc".to_string(),
        },
    ];

    let report = ValidationGate::new(&contract)
        .with_input_row_count(0)
        .with_raw_checks(checks)
        .run(&dataset("stg", Vec::new()));

    assert_eq!(kinds(&report), vec![RuleKind::ImmutabilityViolation]);
    assert!(report.violations()[0].detail.contains("b.csv"));
}

#[test]
fn test_report_serializes_rule_kinds_in_snake_case() {
    let contract = Contract::new(StageName::new("stg")).require("facility_name", None);
    let report = validate(&dataset("stg", inspections(1)), &contract, 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["passed"], false);
    assert_eq!(json["violations"][0]["rule"], "schema_violation");

    let back: ValidationReport = serde_json::from_value(json).unwrap();
    assert_eq!(back, report);
}
