//! Article master data (`articolo`), fully replaced on every run.
//!
//! Stock (`GIACENZA`) is the latest movement per warehouse >= 90000, summed per article and
//! expressed in packs; articles without movements get the numeric default.

use crate::target_record;

pub const ARTICOLI_QUERY: &str = "\
SELECT DISTINCT
    FCOART, FDESAG, FDSTAT, FFORNI, FFORSC, FLEGAM, AMBITO.TCODTA AS CODAMBITO,
    AMBITO.TDESCO AS DESAMBITO, SETTORE.TCODTA AS CODSETTORE, SETTORE.TDESCO AS DESCSETTORE,
    COMP.FDCODI AS CODCOMP, COMP.FDDESC AS DESCOMP, FAM.FSCODI AS CODFAM,
    FAM.FSDESC AS DESFAM, SUBFAM.FGCODI AS COD_SUBFAM, SUBFAM.FGDESC AS DESSFAM,
    FUNMIS, FMPLCU, TABALIVA.TCAM16 AS IVA, FMPLPF, FMPLSF, FREPCA,
    REPCA.TDESCO AS DESREPCA, GIACART.GIACENZA / FMPLCU AS GIACENZA, A.FDAT8I
FROM CISEUROF.FSITART0
LEFT JOIN (
    SELECT GCOART, SUM(GTGIPZ) AS GIACENZA FROM CISEUROF.FMOVIGIA
    WHERE GMAGAZ >= 90000 AND (GMAGAZ, GCOART, GDATAG) IN (
        SELECT GMAGAZ, GCOART, MAX(GDATAG) AS GDATAG FROM CISEUROF.FMOVIGIA
        GROUP BY GMAGAZ, GCOART
    ) GROUP BY GCOART
) AS GIACART ON (GIACART.GCOART = CISEUROF.FSITART0.FCOART),
CISEUROF.FDIPARTM AS COMP, CISEUROF.FSUPARTM AS FAM, CISEUROF.FGRPARTM AS SUBFAM,
CISEUROF.FTABELLE AS SETTORE, CISEUROF.FFORNIMC, CISEUROF.FTABELLE AS TABALIVA,
CISEUROF.FTABELLE AS REPCA, CISEUROF.FTABELLE AS AMBITO, CISEUROO.FSETTIMA AS A
WHERE FCOGRM = SUBFAM.FGCODI
  AND SUBFAM.FSBDLE = FAM.FSCODI AND SUBFAM.FDIPLE = COMP.FDCODI
  AND COMP.FDSETT = SETTORE.TCODTA AND SETTORE.TKEYTA = 'SETTMERC'
  AND FFORNI = FFOCOD AND TABALIVA.TKEYTA = 'TABALIVA'
  AND TABALIVA.TCODTA = FIDIVA AND REPCA.TKEYTA = 'TABREPCA'
  AND CAST(REPCA.TCODTA AS INT) = FREPCA
  AND AMBITO.TKEYTA = 'TABFASAR' AND AMBITO.TCODTA = FCOFAS
  AND A.FDAT5G = FDATAI
ORDER BY SETTORE.TDESCO, COMP.FDDESC, FAM.FSDESC, SUBFAM.FGDESC, FDESAG";

target_record! {
    /// One article with its merchandise hierarchy, prices and current stock.
    pub struct ArticoloRow {
        table: "articolo",
        query: ARTICOLI_QUERY,
        fields: {
            codice: text <= "FCOART",
            descrizione: text <= "FDESAG",
            stato: text <= "FDSTAT",
            codice_fornitore: text <= "FFORNI",
            descrizione_fornitore: text <= "FFORSC",
            legame: text <= "FLEGAM",
            codice_ambito: text <= "CODAMBITO",
            descrizione_ambito: text <= "DESAMBITO",
            codice_settore: text <= "CODSETTORE",
            descrizione_settore: text <= "DESCSETTORE",
            codice_reparto: text <= "CODCOMP",
            descrizione_reparto: text <= "DESCOMP",
            codice_famiglia: text <= "CODFAM",
            descrizione_famiglia: text <= "DESFAM",
            codice_sottofamiglia: text <= "COD_SUBFAM",
            descrizione_sottofamiglia: text <= "DESSFAM",
            unita_misura: text <= "FUNMIS",
            pezzi_per_collo: decimal <= "FMPLCU",
            iva: decimal <= "IVA",
            prezzo_fornitore: decimal <= "FMPLPF",
            prezzo_scontrino: decimal <= "FMPLSF",
            codice_rep_cassa: int <= "FREPCA",
            descrizione_rep_cassa: text <= "DESREPCA",
            giacenza: decimal_required <= "GIACENZA",
            data_inserimento: date <= "FDAT8I",
        }
    }
}
