//! Client master data (`cliente`), fully replaced on every run.

use crate::target_record;

pub const CLIENTI_QUERY: &str = "\
SELECT
    FCODCL, FCODAG, FCOCON, CLISIDA.CCOCODV, FCATCL, FRAGCL,
    FINDCL, FLOCCL, FCAPCL, FPROCL, FTE1CL, FTE2CL, FCESCL,
    FVENCL, FCODDK, FBLXSC, TABSCADGG.TCAM14 AS GGSCAD
FROM CISEUROF.FANAGCLI
INNER JOIN CISEUROF.FCONVCLI AS CLISIDA ON (CLISIDA.CCOCODN = CISEUROF.FANAGCLI.FCODCL)
LEFT JOIN CISEUROF.FTABELLE AS TABSCADGG
    ON (TRIM(TABSCADGG.TCODTA) = FCODAS AND TABSCADGG.TKEYTA = 'TABASSOC')";

target_record! {
    /// One client with its agent, SDI code and payment terms.
    pub struct ClienteRow {
        table: "cliente",
        query: CLIENTI_QUERY,
        fields: {
            codice: text <= "FCODCL",
            codice_agente: text <= "FCODAG",
            codice_contabile: text <= "FCOCON",
            codice_soggetto_sdi: text <= "CCOCODV",
            categoria: text <= "FCATCL",
            ragione_sociale: text <= "FRAGCL",
            indirizzo: text <= "FINDCL",
            localita: text <= "FLOCCL",
            cap: text <= "FCAPCL",
            provincia: text <= "FPROCL",
            telefono1: text <= "FTE1CL",
            telefono2: text <= "FTE2CL",
            cessato: trimmed <= "FCESCL",
            vendita: trimmed <= "FVENCL",
            codice_dk: text <= "FCODDK",
            blocco_sconti: trimmed <= "FBLXSC",
            giorni_scadenza: int <= "GGSCAD",
        }
    }
}
