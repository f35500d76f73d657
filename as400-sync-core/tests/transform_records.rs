use as400_sync_core::config::TransformOptions;
use as400_sync_core::contract::LoadBatch;
use as400_sync_core::error::TransformError;
use as400_sync_core::jobs::{AgenteRow, ArticoloRow, ClienteRow, VenditaRow};
use as400_sync_core::record::{FieldValue, RawRecord, RawValue, TargetRecord};
use as400_sync_core::transform::{transform, unmapped_columns};
use chrono::NaiveDate;

/// A `vendita` source row as the ODBC driver hands it over: every value as text.
fn vendita_raw(date: &str, dcoart: &str, dpezsp: &str, dvensp: &str) -> RawRecord {
    RawRecord::from_iter([
        ("TCOMAG", RawValue::from("001")),
        ("TTIPMO", RawValue::from("V")),
        ("CCOCODV", RawValue::from("SDI0001")),
        ("TNUMRE", RawValue::from("4711")),
        ("TLISCE", RawValue::from("1")),
        ("TLISVE", RawValue::from("2")),
        ("DATADOC", RawValue::from(date)),
        ("TNUMDO", RawValue::from("  123")),
        ("TLETDO", RawValue::from("A")),
        ("TCODAG", RawValue::from("AG01")),
        ("TPROAG", RawValue::from("5.5")),
        ("TTOTME", RawValue::from("37.50")),
        ("TTOTDO", RawValue::from("45.75")),
        ("DCOART", RawValue::from(dcoart)),
        ("DDEART", RawValue::from("Detersivo 1L")),
        ("DPEZSP", RawValue::from(dpezsp)),
        ("DCESSP", RawValue::Null),
        ("DVENSP", RawValue::from(dvensp)),
        ("DALIVA", RawValue::from("22")),
    ])
}

#[test]
fn vendita_row_is_renamed_and_coerced() {
    let raw = vec![vendita_raw("20230215", "0012345", "3", "12.50")];
    let rows = transform::<VenditaRow>(&raw, &TransformOptions::default()).unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.pezzi_spediti, 3.0);
    assert_eq!(row.prezzo_vendita, Some(12.5));
    assert_eq!(row.codice_articolo, 12345);
    assert_eq!(row.numero_documento, Some(123));
    assert_eq!(row.data_documento, NaiveDate::from_ymd_opt(2023, 2, 15));
    assert_eq!(row.pezzi_cespiti, None);
    assert_eq!(row.codice_magazzino.as_deref(), Some("001"));
}

#[test]
fn zero_or_garbage_dates_become_null() {
    for bad in ["0", "00000000", "20230230", "2023-02-15", "", "abcdefgh", "202302150"] {
        let raw = vec![vendita_raw(bad, "1", "1", "1")];
        let rows = transform::<VenditaRow>(&raw, &TransformOptions::default())
            .expect("bad dates must not fail the transform");
        assert_eq!(rows[0].data_documento, None, "input {bad:?}");
    }

    let template = vendita_raw("x", "1", "1", "1");
    let numeric = RawRecord::new(
        template
            .names()
            .map(|n| {
                let v = if n == "DATADOC" {
                    RawValue::Int(0)
                } else {
                    template.get(n).unwrap().clone()
                };
                (n.to_string(), v)
            })
            .collect(),
    );
    let rows = transform::<VenditaRow>(&[numeric], &TransformOptions::default()).unwrap();
    assert_eq!(rows[0].data_documento, None);
}

#[test]
fn integer_dates_are_parsed() {
    let raw = RawRecord::from_iter([("AGEVDT", RawValue::Int(20240612))]);
    let date = as400_sync_core::record::coerce::date(
        raw.get("agevdt").unwrap(),
        &TransformOptions::default(),
    );
    assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 12));
}

#[test]
fn required_numerics_fall_back_to_configured_default() {
    let raw = vec![vendita_raw("20230215", "ART-X", "", "n/a")];

    let rows = transform::<VenditaRow>(&raw, &TransformOptions::default()).unwrap();
    assert_eq!(rows[0].codice_articolo, 0);
    assert_eq!(rows[0].pezzi_spediti, 0.0);
    // Optional decimals stay null instead of being defaulted.
    assert_eq!(rows[0].prezzo_vendita, None);

    let options = TransformOptions { numeric_default: -1 };
    let rows = transform::<VenditaRow>(&raw, &options).unwrap();
    assert_eq!(rows[0].codice_articolo, -1);
    assert_eq!(rows[0].pezzi_spediti, -1.0);
}

#[test]
fn column_names_match_case_insensitively_and_unmapped_are_dropped() {
    let mut fields: Vec<(String, RawValue)> = Vec::new();
    let template = vendita_raw("20230301", "7", "2", "1.25");
    for name in template.names() {
        fields.push((name.to_ascii_lowercase(), template.get(name).unwrap().clone()));
    }
    fields.push(("EXTRA_COL".to_string(), RawValue::from("ignored")));
    let raw = RawRecord::new(fields);

    assert_eq!(unmapped_columns::<VenditaRow>(&raw), vec!["EXTRA_COL"]);

    let rows = transform::<VenditaRow>(&[raw], &TransformOptions::default()).unwrap();
    let batch = LoadBatch::from_records(rows);
    assert_eq!(batch.table, "vendita");
    assert_eq!(batch.columns.len(), VenditaRow::COLUMNS.len());
    assert_eq!(batch.rows[0].len(), VenditaRow::COLUMNS.len());
    assert!(!batch.columns.contains(&"extra_col"));
    assert_eq!(batch.columns[15], "pezzi_spediti");
    assert_eq!(batch.rows[0][15], FieldValue::Decimal(2.0));
}

#[test]
fn missing_mapped_column_is_a_shape_error_with_row_index() {
    let good = vendita_raw("20230301", "7", "2", "1.25");
    let broken = RawRecord::from_iter(
        good.names()
            .filter(|n| *n != "DVENSP")
            .map(|n| (n.to_string(), good.get(n).unwrap().clone()))
            .collect::<Vec<_>>(),
    );

    let err = transform::<VenditaRow>(&[good.clone(), broken], &TransformOptions::default())
        .unwrap_err();
    assert_eq!(
        err,
        TransformError::MissingColumn {
            column: "DVENSP",
            row: 1
        }
    );
}

#[test]
fn transform_is_deterministic_and_length_preserving() {
    let raw: Vec<RawRecord> = (1..=5)
        .map(|i| vendita_raw(&format!("202302{:02}", i), &i.to_string(), "3", "12.50"))
        .collect();
    let options = TransformOptions::default();

    let first = transform::<VenditaRow>(&raw, &options).unwrap();
    let second = transform::<VenditaRow>(&raw, &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), raw.len());

    let empty = transform::<VenditaRow>(&[], &options).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn cliente_flags_are_trimmed() {
    let mut fields: Vec<(String, RawValue)> = ClienteRow::COLUMNS
        .iter()
        .map(|c| (c.source.to_string(), RawValue::from("  x ")))
        .collect();
    fields.retain(|(n, _)| n != "GGSCAD");
    fields.push(("GGSCAD".to_string(), RawValue::from(" 60 ")));
    let rows =
        transform::<ClienteRow>(&[RawRecord::new(fields)], &TransformOptions::default()).unwrap();

    assert_eq!(rows[0].cessato.as_deref(), Some("x"));
    assert_eq!(rows[0].vendita.as_deref(), Some("x"));
    assert_eq!(rows[0].blocco_sconti.as_deref(), Some("x"));
    // Non-flag text is kept verbatim.
    assert_eq!(rows[0].ragione_sociale.as_deref(), Some("  x "));
    assert_eq!(rows[0].giorni_scadenza, Some(60));
}

#[test]
fn articolo_without_stock_gets_default_giacenza() {
    let fields: Vec<(String, RawValue)> = ArticoloRow::COLUMNS
        .iter()
        .map(|c| {
            let v = match c.source {
                "GIACENZA" => RawValue::Null,
                "FDAT8I" => RawValue::from("20200101"),
                _ => RawValue::from("1"),
            };
            (c.source.to_string(), v)
        })
        .collect();
    let rows =
        transform::<ArticoloRow>(&[RawRecord::new(fields)], &TransformOptions::default()).unwrap();

    assert_eq!(rows[0].giacenza, 0.0);
    assert_eq!(rows[0].data_inserimento, NaiveDate::from_ymd_opt(2020, 1, 1));
}

#[test]
fn mapping_tables_have_unique_targets() {
    fn assert_unique<R: TargetRecord>() {
        let mut targets = R::target_columns();
        let n = targets.len();
        targets.sort_unstable();
        targets.dedup();
        assert_eq!(targets.len(), n, "duplicate target column in {}", R::TABLE);
    }
    assert_unique::<VenditaRow>();
    assert_unique::<AgenteRow>();
    assert_unique::<ArticoloRow>();
    assert_unique::<ClienteRow>();

    assert_eq!(VenditaRow::COLUMNS.len(), 19);
    assert_eq!(AgenteRow::COLUMNS.len(), 39);
    assert_eq!(ArticoloRow::COLUMNS.len(), 25);
    assert_eq!(ClienteRow::COLUMNS.len(), 17);
}
