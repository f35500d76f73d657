use as400_sync_core::config::TransformOptions;
use as400_sync_core::contract::LoadBatch;
use as400_sync_core::record::{FieldValue, RawRecord, RawValue, TargetRecord};
use as400_sync_core::target_record;
use as400_sync_core::transform::transform;

const LISTINI_QUERY: &str = "SELECT LSCODI, LSDESC, LSDATA FROM CISEUROF.FLISTINI";

// This crate does not depend on serde directly.
target_record! {
    pub struct ListinoRow {
        table: "listino",
        query: LISTINI_QUERY,
        fields: {
            codice: int_required <= "LSCODI",
            descrizione: trimmed <= "LSDESC",
            data_validita: date <= "LSDATA",
        }
    }
}

#[test]
fn record_declared_in_a_downstream_crate_transforms_and_serialises() {
    let raw = RawRecord::from_iter([
        ("LSCODI", RawValue::from("7")),
        ("LSDESC", RawValue::from(" Ingrosso ")),
        ("LSDATA", RawValue::from("20240115")),
    ]);

    let rows = transform::<ListinoRow>(&[raw], &TransformOptions::default()).unwrap();
    assert_eq!(ListinoRow::TABLE, "listino");
    assert_eq!(rows[0].descrizione.as_deref(), Some("Ingrosso"));

    let json = serde_json::to_value(&rows[0]).unwrap();
    assert_eq!(json["codice"], 7);
    assert_eq!(json["data_validita"], "2024-01-15");

    let batch = LoadBatch::from_records(rows);
    assert_eq!(batch.columns, vec!["codice", "descrizione", "data_validita"]);
    assert_eq!(batch.rows[0][0], FieldValue::Int(7));
}
