//! Agent master data (`agente`), fully replaced on every run.

use crate::target_record;

pub const AGENTI_QUERY: &str = "SELECT * FROM CISEUROF.FANAGAGE";

target_record! {
    /// One sales agent with contact data and commission settings.
    pub struct AgenteRow {
        table: "agente",
        query: AGENTI_QUERY,
        fields: {
            codice: text <= "AGECOD",
            ragione_sociale: text <= "AGERSC",
            prenotazione: text <= "AGEPRE",
            telefono: text <= "AGETEL",
            fax: text <= "AGEFAX",
            percentuale_provvigione: decimal <= "AGEPRC",
            cellulare: text <= "AGECEL",
            data_variazione: date <= "AGEVDT",
            inizio_validita: date <= "AGEVDI",
            note_commerciali: text <= "AGECOM",
            note_contabili: text <= "AGENCV",
            cap: text <= "AGECAP",
            indirizzo: text <= "AGEIND",
            localita: text <= "AGELOC",
            provincia: text <= "AGEPRO",
            zona: text <= "AGEZON",
            bp1: text <= "AGEBP1",
            bp2: text <= "AGEBP2",
            bp3: text <= "AGEBP3",
            bp4: text <= "AGEBP4",
            bp5: text <= "AGEBP5",
            bl1: text <= "AGEBL1",
            bl2: text <= "AGEBL2",
            bl3: text <= "AGEBL3",
            bl4: text <= "AGEBL4",
            bl5: text <= "AGEBL5",
            bu1: text <= "AGEBU1",
            bu2: text <= "AGEBU2",
            bu3: text <= "AGEBU3",
            bu4: text <= "AGEBU4",
            bu5: text <= "AGEBU5",
            provvigione_prodotto: decimal <= "AGEPRP",
            provvigione_linea: decimal <= "AGEPRL",
            li1: text <= "AGELI1",
            li2: text <= "AGELI2",
            li3: text <= "AGELI3",
            li4: text <= "AGELI4",
            li5: text <= "AGELI5",
            li6: text <= "AGELI6",
        }
    }
}
