//! Append-mode CSV output for harvested rows.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::records::EstablishmentRow;

/// CSV writer that appends to the dump file across resumed runs.
///
/// The header row is written only when the file is new or empty, so a resume
/// never drops a header in the middle of the data.
pub struct DumpWriter {
    writer: csv::Writer<std::fs::File>,
}

impl DumpWriter {
    pub fn append(path: &Path) -> Result<Self> {
        let fresh = std::fs::metadata(path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if fresh {
            writer.write_record([
                "activitePrincipaleEtablissement",
                "codeCommuneEtablissement",
                "libelleCommuneEtablissement",
            ])?;
            info!("Started new dump at {}", path.display());
        } else {
            info!("Appending to existing dump at {}", path.display());
        }

        Ok(Self { writer })
    }

    /// Write one page of rows. Flushed per page; a crash costs at most the
    /// in-flight page.
    pub fn write_rows(&mut self, rows: &[EstablishmentRow]) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(activite: &str, code: &str, libelle: &str) -> EstablishmentRow {
        EstablishmentRow {
            activite_principale: activite.to_string(),
            code_commune: code.to_string(),
            libelle_commune: libelle.to_string(),
        }
    }

    #[test]
    fn header_is_written_exactly_once_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.csv");

        {
            let mut writer = DumpWriter::append(&path).unwrap();
            writer
                .write_rows(&[row("49.31Z", "75056", "PARIS")])
                .unwrap();
        }
        {
            // Resumed run: appends, no second header.
            let mut writer = DumpWriter::append(&path).unwrap();
            writer
                .write_rows(&[row("49.10Z", "69123", "LYON")])
                .unwrap();
        }

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "activitePrincipaleEtablissement,codeCommuneEtablissement,libelleCommuneEtablissement"
        );
        assert_eq!(lines[1], "49.31Z,75056,PARIS");
        assert_eq!(lines[2], "49.10Z,69123,LYON");
    }
}
