//! Job catalogue: which records each sync job moves and how.
//!
//! `vendite` is incremental (watermarked, date-chunked, append-only). The reference jobs
//! `agenti`, `articoli` and `clienti` replace their table wholesale on every run.

use std::fmt;

pub mod agenti;
pub mod articoli;
pub mod clienti;
pub mod vendite;

pub use agenti::AgenteRow;
pub use articoli::ArticoloRow;
pub use clienti::ClienteRow;
pub use vendite::VenditaRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Vendite,
    Agenti,
    Articoli,
    Clienti,
}

impl JobKind {
    /// Job name, also the watermark key for incremental jobs.
    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Vendite => "sync_vendite",
            JobKind::Agenti => "sync_agenti",
            JobKind::Articoli => "sync_articoli",
            JobKind::Clienti => "sync_clienti",
        }
    }

    pub fn is_incremental(&self) -> bool {
        matches!(self, JobKind::Vendite)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
