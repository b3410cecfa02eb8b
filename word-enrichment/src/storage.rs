use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;

use crate::utilities::{contains_ignore_case, fold_word, word_name};
use crate::words::CefrLevel;

const MAX_SUGGESTIONS: usize = 5;
const SUGGESTION_THRESHOLD: f64 = 0.85;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Word '{word}' not found")]
    NotFound { word: String },
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("stored record {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Level name to the sorted words stored under it.
pub type Catalog = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLanguage {
    En,
    Tr,
    All,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unknown search language '{0}', expected en, tr or all")]
pub struct UnknownSearchLanguage(pub String);

impl FromStr for SearchLanguage {
    type Err = UnknownSearchLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_ascii_lowercase()[..] {
            "en" => Ok(SearchLanguage::En),
            "tr" => Ok(SearchLanguage::Tr),
            "all" => Ok(SearchLanguage::All),
            _ => Err(UnknownSearchLanguage(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Lowercased search text.
    pub text: String,
    pub level: Option<CefrLevel>,
    pub language: SearchLanguage,
    pub limit: usize,
    pub skip: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub word: String,
    pub cefr: CefrLevel,
    pub record: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub total: usize,
    pub results: Vec<SearchHit>,
    pub page: usize,
    pub total_pages: usize,
}

/// Read-only view over `<root>/<level>/<word>.json`.
pub struct WordStore {
    root: PathBuf,
}

impl WordStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, level: CefrLevel, word: &str) -> PathBuf {
        self.root.join(level.dir_name()).join(format!("{word}.json"))
    }
}

impl WordStore {
    /// Returns the stored record for `word` unmodified.
    /// Without a level every level is probed in order.
    pub async fn lookup(&self, word: &str, level: Option<CefrLevel>) -> Result<Value, StoreError> {
        let not_found = || StoreError::NotFound {
            word: word.to_owned(),
        };
        let name = fold_word(word).ok_or_else(not_found)?;
        let levels = level.map_or_else(|| CefrLevel::ALL.to_vec(), |level| vec![level]);
        for level in levels {
            let path = self.record_path(level, &name);
            match tokio::fs::read(&path).await {
                Ok(bytes) => return parse_record(path, &bytes),
                Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }
        tracing::debug!(word = %name, ?level, "word not in store");
        Err(not_found())
    }

    /// Lists one level (empty if its directory is absent) or every level directory in the store.
    pub async fn list(&self, level: Option<CefrLevel>) -> Result<Catalog, StoreError> {
        if let Some(level) = level {
            let words = self.level_words(level.dir_name()).await?;
            return Ok(Catalog::from([(level.dir_name().to_owned(), words)]));
        }

        let levels = self.level_dirs().await?;
        let words = try_join_all(levels.iter().map(|level| self.level_words(level))).await?;
        Ok(levels.into_iter().zip(words).collect())
    }

    /// Catalog words closest to `word`, best first.
    pub async fn suggest(&self, word: &str) -> Vec<String> {
        let Some(name) = fold_word(word) else {
            return Vec::new();
        };
        let catalog = match self.list(None).await {
            Ok(catalog) => catalog,
            Err(error) => {
                tracing::warn!(%error, "cannot build suggestions");
                return Vec::new();
            }
        };
        let mut candidates = catalog
            .into_values()
            .flatten()
            .map(|candidate| (strsim::jaro_winkler(&name, &candidate), candidate))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect::<Vec<(f64, String)>>();
        // most similar at the start
        candidates.sort_by(|(a, a_word), (b, b_word)| {
            b.total_cmp(a).then_with(|| a_word.cmp(b_word))
        });
        candidates.dedup_by(|(_, a), (_, b)| a == b);
        candidates
            .into_iter()
            .map(|(_, candidate)| candidate)
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage, StoreError> {
        let levels = query
            .level
            .map_or_else(|| CefrLevel::ALL.to_vec(), |level| vec![level]);
        let mut hits = Vec::new();
        for level in levels {
            for word in self.level_words(level.dir_name()).await? {
                let Some(record) = self.scan_record(level, &word).await else {
                    continue;
                };
                if record_matches(&word, &record, query) {
                    hits.push(SearchHit {
                        word,
                        cefr: level,
                        record,
                    });
                }
            }
        }
        hits.sort_by(|a, b| a.word.cmp(&b.word).then(a.cefr.cmp(&b.cefr)));

        let total = hits.len();
        let results = hits
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .collect();
        Ok(SearchPage {
            total,
            results,
            page: query.skip / query.limit + 1,
            total_pages: total.div_ceil(query.limit),
        })
    }

    /// Reads one record during a scan. Entry-level failures are logged and skipped.
    async fn scan_record(&self, level: CefrLevel, word: &str) -> Option<Value> {
        let path = self.record_path(level, word);
        let record = match tokio::fs::read(&path).await {
            Ok(bytes) => parse_record(path, &bytes),
            Err(source) => Err(StoreError::Io { path, source }),
        };
        record
            .map_err(|error| tracing::warn!(%error, "skipping unreadable record"))
            .ok()
    }

    async fn level_dirs(&self) -> Result<Vec<String>, StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.root.clone(),
            source,
        };
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(io_error)?;
        let mut levels = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            if !skip_unreadable(&entry).await.is_some_and(|kind| kind.is_dir()) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                levels.push(name.to_owned());
            }
        }
        levels.sort();
        Ok(levels)
    }

    async fn level_words(&self, level: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.root.join(level);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };
        let mut words = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => return Err(StoreError::Io { path: dir, source }),
            };
            let Some(kind) = skip_unreadable(&entry).await else {
                continue;
            };
            if let Some(word) = word_name(&entry.path()).filter(|_| !kind.is_dir()) {
                words.push(word);
            }
        }
        words.sort();
        Ok(words)
    }
}

/// File type of a directory entry, or `None` (logged) if it can't be read.
async fn skip_unreadable(entry: &tokio::fs::DirEntry) -> Option<std::fs::FileType> {
    match entry.file_type().await {
        Ok(kind) => Some(kind),
        Err(error) => {
            tracing::warn!(path = %entry.path().display(), %error, "skipping unreadable entry");
            None
        }
    }
}

fn parse_record(path: PathBuf, bytes: &[u8]) -> Result<Value, StoreError> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Corrupt { path, source })
}

fn record_matches(word: &str, record: &Value, query: &SearchQuery) -> bool {
    let field = |name: &str| record.get(name).and_then(Value::as_str);
    let matches =
        |text: Option<&str>| text.is_some_and(|text| contains_ignore_case(text, &query.text));
    let turkish = field("Turkish")
        .or_else(|| record.pointer("/translations/tr/word").and_then(Value::as_str));
    let english_matches = matches(Some(word)) || matches(field("English"));
    let turkish_matches = matches(turkish);
    match query.language {
        SearchLanguage::En => english_matches,
        SearchLanguage::Tr => turkish_matches,
        SearchLanguage::All => {
            english_matches || turkish_matches || matches(field("definition"))
        }
    }
}
