//! Sales document lines (`vendita`), synced incrementally by document date.

use crate::target_record;

/// Document header joined with its detail lines, filtered to one inclusive `FDAT8I` range.
pub const VENDITE_QUERY: &str = "\
SELECT
    TCOMAG, TTIPMO, CCOCODV, TNUMRE, TLISCE, TLISVE, FDAT8I AS DATADOC,
    TNUMDO, TLETDO, TCODAG, TPROAG, TTOTME, TTOTDO, DCOART, DDEART,
    DPEZSP, DCESSP, DVENSP, DALIVA
FROM CISEUROF.FMOVITES, CISEUROF.FMOVIDET, CISEUROO.FSETTIMA, CISEUROF.LCONVCLI
WHERE DNUMRE = TNUMRE AND TCOINT = CCOCODN
  AND TDATDO = FDAT5G AND TINTER = 'C' AND TFLAG = ''
  AND DFLAG = '' AND DPEZSP > 0
  AND FDAT8I BETWEEN ? AND ?";

target_record! {
    /// One shipped line of a sales document.
    pub struct VenditaRow {
        table: "vendita",
        query: VENDITE_QUERY,
        fields: {
            codice_magazzino: text <= "TCOMAG",
            tipo_movimento: text <= "TTIPMO",
            codice_soggetto_sdi: text <= "CCOCODV",
            numero_registrazione: int <= "TNUMRE",
            listino_scelto: text <= "TLISCE",
            listino_vendita: text <= "TLISVE",
            data_documento: date <= "DATADOC",
            numero_documento: int <= "TNUMDO",
            lettera_documento: text <= "TLETDO",
            codice_agente: text <= "TCODAG",
            provvigione_agente: decimal <= "TPROAG",
            totale_merce: decimal <= "TTOTME",
            totale_documento: decimal <= "TTOTDO",
            codice_articolo: int_required <= "DCOART",
            descrizione_articolo: text <= "DDEART",
            pezzi_spediti: decimal_required <= "DPEZSP",
            pezzi_cespiti: decimal <= "DCESSP",
            prezzo_vendita: decimal <= "DVENSP",
            aliquota_iva: text <= "DALIVA",
        }
    }
}
