use std::path::Path;



/// Case-folds a requested word, or returns `None` if it can't name a file inside a level directory.
pub fn fold_word(word: &str) -> Option<String> {
    let word = word.to_lowercase();
    let unsafe_name = word.is_empty()
        || word.starts_with('.')
        || word.contains(['/', '\\', '\0']);
    (!unsafe_name).then_some(word)
}

/// File stem of a `*.json` entry, the word it stores.
pub fn word_name(path: &Path) -> Option<String> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_owned)
}

pub fn contains_ignore_case(haystack: &str, needle_lowercase: &str) -> bool {
    haystack.to_lowercase().contains(needle_lowercase)
}
