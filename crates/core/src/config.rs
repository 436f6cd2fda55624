use crate::error::IngestError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Display metadata for one regulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LawEntry {
    pub name: String,
    pub tentang: String,
}

/// Maps a source file name to the regulation it renders. Files without an
/// entry are not ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct LawConfig {
    entries: BTreeMap<String, LawEntry>,
}

const BUILTIN: [(&str, &str, &str); 8] = [
    (
        "Nomor_5_Tahun_2020.pdf.txt",
        "Permenkominfo No 5 Tahun 2020",
        "Penyelenggara Sistem Elektronik Lingkup Privat",
    ),
    (
        "PP_Nomor_71_Tahun_2019.pdf.txt",
        "PP No 71 Tahun 2019",
        "Penyelenggaraan Sistem dan Transaksi Elektronik (PSTE)",
    ),
    (
        "PP_Nomor_80_Tahun_2019.pdf.txt",
        "PP No 80 Tahun 2019",
        "Perdagangan Melalui Sistem Elektronik (PMSE)",
    ),
    (
        "UU_Nomor_1_Tahun_2024.pdf.txt",
        "UU No 1 Tahun 2024",
        "Perubahan Kedua Atas UU ITE (Informasi & Transaksi Elektronik)",
    ),
    (
        "UU_Nomor_11_Tahun_2008.pdf.txt",
        "UU No 11 Tahun 2008",
        "Informasi dan Transaksi Elektronik (UU ITE Original)",
    ),
    (
        "UU_Nomor_19_Tahun_2016.pdf.txt",
        "UU No 19 Tahun 2016",
        "Perubahan Pertama Atas UU ITE",
    ),
    (
        "UU_Nomor_27_Tahun_2022.pdf.txt",
        "UU No 27 Tahun 2022",
        "Pelindungan Data Pribadi (PDP)",
    ),
    (
        "UU_Nomor_28_Tahun_2014.pdf.txt",
        "UU No 28 Tahun 2014",
        "Hak Cipta",
    ),
];

impl LawConfig {
    /// The regulations shipped with the electronic-transactions corpus.
    pub fn builtin() -> Self {
        BUILTIN
            .iter()
            .map(|(file, name, tentang)| {
                (
                    file.to_string(),
                    LawEntry {
                        name: name.to_string(),
                        tentang: tentang.to_string(),
                    },
                )
            })
            .collect()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, IngestError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn insert(&mut self, file_name: impl Into<String>, entry: LawEntry) {
        self.entries.insert(file_name.into(), entry);
    }

    pub fn lookup(&self, file_name: &str) -> Option<&LawEntry> {
        self.entries.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, LawEntry)> for LawConfig {
    fn from_iter<T: IntoIterator<Item = (String, LawEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_resolves_known_files() {
        let config = LawConfig::builtin();
        assert_eq!(config.len(), 8);

        let entry = config.lookup("UU_Nomor_27_Tahun_2022.pdf.txt").unwrap();
        assert_eq!(entry.name, "UU No 27 Tahun 2022");
        assert_eq!(entry.tentang, "Pelindungan Data Pribadi (PDP)");
        assert!(config.lookup("catatan.txt").is_none());
    }

    #[test]
    fn json_table_is_keyed_by_file_name() {
        let raw = r#"{ "uu.txt": { "name": "UU Contoh", "tentang": "Contoh" } }"#;
        let config = LawConfig::from_json_str(raw).unwrap();

        assert_eq!(
            config.lookup("uu.txt"),
            Some(&LawEntry {
                name: "UU Contoh".to_string(),
                tentang: "Contoh".to_string(),
            })
        );
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let result = LawConfig::from_json_str(r#"{ "uu.txt": { "name": 3 } }"#);
        assert!(matches!(result, Err(IngestError::Config(_))));
    }
}
