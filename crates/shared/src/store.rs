use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::models::{SearchCriteria, Vacancy};

/// What happened to an `add` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// A vacancy with the same link is already stored; nothing changed.
    Duplicate,
}

/// The saved-vacancy list, mirrored to a JSON file after every mutation.
///
/// Insertion order is preserved and is the one ordering used for listing,
/// querying and index-based deletion. Indices are only stable between a
/// listing call and the next mutating call.
pub struct VacancyStore {
    path: PathBuf,
    records: Vec<Vacancy>,
}

impl VacancyStore {
    /// Open the store at `path`. A missing, empty or unparseable file
    /// yields an empty store; construction never fails.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => match serde_json::from_str(&content) {
                Ok(records) => records,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "saved vacancies are not valid JSON, starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read saved vacancies, starting empty");
                Vec::new()
            }
        };
        Self { path, records }
    }

    /// Add a vacancy unless one with the same link is already stored.
    ///
    /// When `keyword` is given and not already part of the description, it
    /// is appended to the description as a tag of which search produced
    /// the entry. The file is rewritten before this returns.
    pub fn add(&mut self, mut vacancy: Vacancy, keyword: Option<&str>) -> Result<AddOutcome> {
        if self.records.iter().any(|v| v.link == vacancy.link) {
            info!(link = %vacancy.link, "vacancy already saved, skipping");
            return Ok(AddOutcome::Duplicate);
        }

        if let Some(keyword) = keyword {
            if !vacancy.description.contains(keyword) {
                vacancy.description.push(' ');
                vacancy.description.push_str(keyword);
            }
        }

        self.records.push(vacancy);
        self.persist()?;
        Ok(AddOutcome::Added)
    }

    /// Saved vacancies matching `criteria`, in store order.
    ///
    /// A salary bound keeps only records whose numeric salary view falls
    /// inside it; records without one are excluded. A description keyword
    /// matches case-insensitively. Both filters compose.
    pub fn query(&self, criteria: &SearchCriteria) -> Vec<Vacancy> {
        let keyword = criteria
            .description
            .as_deref()
            .map(|keyword| keyword.to_lowercase());

        self.records
            .iter()
            .filter(|vacancy| {
                let salary_ok = match criteria.salary {
                    Some(range) => vacancy
                        .salary
                        .comparable()
                        .is_some_and(|value| range.contains(value)),
                    None => true,
                };
                let description_ok = match &keyword {
                    Some(keyword) => vacancy.description.to_lowercase().contains(keyword),
                    None => true,
                };
                salary_ok && description_ok
            })
            .cloned()
            .collect()
    }

    /// Remove the vacancy at `index` (zero-based, in store order) and
    /// return it. Out of range returns `Ok(None)` and changes nothing.
    pub fn delete(&mut self, index: usize) -> Result<Option<Vacancy>> {
        if index >= self.records.len() {
            return Ok(None);
        }
        let removed = self.records.remove(index);
        self.persist()?;
        Ok(Some(removed))
    }

    /// The canonical listing view; `delete` indices address into this.
    pub fn all(&self) -> &[Vacancy] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Full rewrite through a sibling temp file so an interrupted write
    // cannot leave a truncated target behind.
    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records)
            .context("Failed to serialize saved vacancies")?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Salary, SalaryRange};
    use tempfile::tempdir;

    fn vacancy(n: u32, salary: Salary, description: &str) -> Vacancy {
        Vacancy::new(
            format!("Vacancy {}", n),
            format!("https://hh.ru/vacancy/{}", n),
            salary,
            description,
        )
    }

    fn store_in(dir: &tempfile::TempDir) -> (VacancyStore, PathBuf) {
        let path = dir.path().join("vacancies.json");
        (VacancyStore::load(&path), path)
    }

    #[test]
    fn test_add_persists_through_to_file() {
        let dir = tempdir().unwrap();
        let (mut store, path) = store_in(&dir);

        let outcome = store
            .add(vacancy(1, Salary::Exact(1000), "Python dev"), None)
            .unwrap();
        assert_eq!(outcome, AddOutcome::Added);

        let on_disk: Vec<Vacancy> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, store.all());
    }

    #[test]
    fn test_duplicate_link_leaves_store_and_file_unchanged() {
        let dir = tempdir().unwrap();
        let (mut store, path) = store_in(&dir);

        store
            .add(vacancy(1, Salary::Exact(1000), "first copy"), None)
            .unwrap();
        let before = fs::read(&path).unwrap();

        let outcome = store
            .add(vacancy(1, Salary::Exact(9999), "second copy"), None)
            .unwrap();
        assert_eq!(outcome, AddOutcome::Duplicate);
        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].description, "first copy");
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_round_trip_preserves_records_and_order() {
        let dir = tempdir().unwrap();
        let (mut store, path) = store_in(&dir);

        for n in 1..=3 {
            store
                .add(vacancy(n, Salary::Exact(1000 * n as i64), "dev"), None)
                .unwrap();
        }

        let reloaded = VacancyStore::load(&path);
        assert_eq!(reloaded.all(), store.all());
    }

    #[test]
    fn test_restart_after_two_adds_reproduces_collection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vacancies.json");

        let mut store = VacancyStore::load(&path);
        store.add(vacancy(1, Salary::Exact(1000), "dev"), None).unwrap();
        store.add(vacancy(2, Salary::Unspecified, "ops"), None).unwrap();
        let before_restart = store.all().to_vec();
        drop(store);

        let store = VacancyStore::load(&path);
        assert_eq!(store.all(), before_restart);
    }

    #[test]
    fn test_query_by_salary_range_is_inclusive_and_skips_unspecified() {
        let dir = tempdir().unwrap();
        let (mut store, _) = store_in(&dir);

        store.add(vacancy(1, Salary::Exact(1000), ""), None).unwrap();
        store.add(vacancy(2, Salary::Exact(5000), ""), None).unwrap();
        store.add(vacancy(3, Salary::Exact(9000), ""), None).unwrap();
        store.add(vacancy(4, Salary::Unspecified, ""), None).unwrap();

        let criteria = SearchCriteria {
            salary: Some(SalaryRange::parse("2000-6000").unwrap()),
            description: None,
        };
        let matches = store.query(&criteria);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].salary, Salary::Exact(5000));
    }

    #[test]
    fn test_query_matches_range_salaries_by_midpoint() {
        let dir = tempdir().unwrap();
        let (mut store, _) = store_in(&dir);

        store
            .add(
                vacancy(
                    1,
                    Salary::Range {
                        min: 3000,
                        max: 5000,
                    },
                    "",
                ),
                None,
            )
            .unwrap();

        let inside = SearchCriteria {
            salary: Some(SalaryRange::parse("3500-4500").unwrap()),
            description: None,
        };
        assert_eq!(store.query(&inside).len(), 1);

        let outside = SearchCriteria {
            salary: Some(SalaryRange::parse("4500-6000").unwrap()),
            description: None,
        };
        assert!(store.query(&outside).is_empty());
    }

    #[test]
    fn test_query_by_description_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let (mut store, _) = store_in(&dir);

        store
            .add(vacancy(1, Salary::Unspecified, "Python dev"), None)
            .unwrap();
        store
            .add(vacancy(2, Salary::Unspecified, "Go backend"), None)
            .unwrap();

        let criteria = SearchCriteria {
            salary: None,
            description: Some("python".to_string()),
        };
        let matches = store.query(&criteria);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].description, "Python dev");
    }

    #[test]
    fn test_query_composes_both_filters() {
        let dir = tempdir().unwrap();
        let (mut store, _) = store_in(&dir);

        store
            .add(vacancy(1, Salary::Exact(5000), "Python dev"), None)
            .unwrap();
        store
            .add(vacancy(2, Salary::Exact(5000), "Go backend"), None)
            .unwrap();
        store
            .add(vacancy(3, Salary::Exact(500), "Python intern"), None)
            .unwrap();

        let criteria = SearchCriteria {
            salary: Some(SalaryRange::parse("2000-6000").unwrap()),
            description: Some("PYTHON".to_string()),
        };
        let matches = store.query(&criteria);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].link, "https://hh.ru/vacancy/1");
    }

    #[test]
    fn test_delete_by_index_returns_removed_and_keeps_order() {
        let dir = tempdir().unwrap();
        let (mut store, path) = store_in(&dir);

        for n in 1..=3 {
            store.add(vacancy(n, Salary::Unspecified, ""), None).unwrap();
        }

        let removed = store.delete(1).unwrap().unwrap();
        assert_eq!(removed.link, "https://hh.ru/vacancy/2");
        assert_eq!(store.len(), 2);
        assert_eq!(store.all()[0].link, "https://hh.ru/vacancy/1");
        assert_eq!(store.all()[1].link, "https://hh.ru/vacancy/3");

        // Removal is written through
        let reloaded = VacancyStore::load(&path);
        assert_eq!(reloaded.all(), store.all());
    }

    #[test]
    fn test_delete_out_of_range_is_not_found() {
        let dir = tempdir().unwrap();
        let (mut store, _) = store_in(&dir);

        store.add(vacancy(1, Salary::Unspecified, ""), None).unwrap();
        store.add(vacancy(2, Salary::Unspecified, ""), None).unwrap();

        assert_eq!(store.delete(5).unwrap(), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_corrupt_file_loads_as_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vacancies.json");
        fs::write(&path, "{ this is not json").unwrap();

        let store = VacancyStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_file_loads_as_empty_store() {
        let dir = tempdir().unwrap();
        let store = VacancyStore::load(dir.path().join("nope.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_tags_description_with_search_keyword() {
        let dir = tempdir().unwrap();
        let (mut store, _) = store_in(&dir);

        store
            .add(vacancy(1, Salary::Unspecified, "Backend role"), Some("rust"))
            .unwrap();
        assert_eq!(store.all()[0].description, "Backend role rust");

        // Already-present keyword is not appended twice
        store
            .add(vacancy(2, Salary::Unspecified, "rust services"), Some("rust"))
            .unwrap();
        assert_eq!(store.all()[1].description, "rust services");
    }

    #[test]
    fn test_cyrillic_text_is_stored_literally() {
        let dir = tempdir().unwrap();
        let (mut store, path) = store_in(&dir);

        store
            .add(
                Vacancy::new(
                    "Разработчик",
                    "https://hh.ru/vacancy/42",
                    Salary::Unspecified,
                    "Опыт от трёх лет",
                ),
                None,
            )
            .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Разработчик"));
        assert!(raw.contains("Опыт от трёх лет"));
        assert!(!raw.contains("\\u"));
    }
}
