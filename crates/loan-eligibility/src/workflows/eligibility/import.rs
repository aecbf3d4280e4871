use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::coercion::CoercionPolicy;
use super::domain::ApplicantProfile;
use super::fields::ProfileField;

/// A profile read from one CSV row (1-based, header excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedProfile {
    pub row: usize,
    pub profile: ApplicantProfile,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse applicant CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV header has no recognised profile columns")]
    NoProfileColumns,
}

pub struct ProfileCsvImporter;

impl ProfileCsvImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<ImportedProfile>, ImportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Columns are matched to profile fields by name; blank cells keep the
    /// default and malformed numbers read as zero.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ImportedProfile>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<Option<ProfileField>> = csv_reader
            .headers()?
            .iter()
            .map(|header| {
                let field = ProfileField::from_name(header);
                if field.is_none() {
                    tracing::debug!(column = header, "ignoring unknown CSV column");
                }
                field
            })
            .collect();

        if columns.iter().all(Option::is_none) {
            return Err(ImportError::NoProfileColumns);
        }

        let mut profiles = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let mut profile = ApplicantProfile::default();

            for (field, cell) in columns.iter().zip(record.iter()) {
                let Some(field) = field else { continue };
                if cell.is_empty() {
                    continue;
                }
                if let Ok(value) = CoercionPolicy::DefaultOnError.apply(*field, cell) {
                    profile.set(*field, &value);
                }
            }

            profiles.push(ImportedProfile {
                row: index + 1,
                profile: profile.normalized(),
            });
        }

        Ok(profiles)
    }
}
