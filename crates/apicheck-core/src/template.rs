//! Payload template resolution — positional `%s` substitution
//!
//! Templates live under a root directory, addressed by feature area plus an
//! optional flavor sub-path (POST/PUT/user/location variants of the same
//! payload). Resolution is a pure function of the template file and the
//! substitution list.

use std::path::{Path, PathBuf};

/// Logical address of a body template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplatePath {
    /// Feature area directory, e.g. `hearings`.
    pub area: String,
    /// Optional flavor sub-path, e.g. `put` or `user`.
    pub flavor: Option<String>,
    /// Template file name, e.g. `standard-request.json`.
    pub file: String,
}

impl TemplatePath {
    #[must_use]
    pub fn new(area: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            area: area.into(),
            flavor: None,
            file: file.into(),
        }
    }

    #[must_use]
    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = Some(flavor.into());
        self
    }

    fn relative(&self) -> PathBuf {
        let mut p = PathBuf::from(&self.area);
        if let Some(flavor) = &self.flavor {
            p.push(flavor);
        }
        p.push(&self.file);
        p
    }
}

impl std::fmt::Display for TemplatePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.relative().display())
    }
}

/// One positional substitution value. `Nil` is the suite-file `NIL` token:
/// substitute JSON `null`, which is distinct from the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    Text(String),
    Nil,
}

impl Substitution {
    /// Parse a suite-file token: the literal `NIL` means null.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token == "NIL" {
            Self::Nil
        } else {
            Self::Text(token.to_string())
        }
    }
}

impl From<&str> for Substitution {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

const PLACEHOLDER: &str = "%s";

/// Path-addressable store of request-body templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load a template and fill its `%s` placeholders positionally.
    ///
    /// # Errors
    ///
    /// `TemplateError::NotFound` if the file is missing,
    /// `TemplateError::Mismatch` if the placeholder count differs from
    /// `substitutions.len()`. Both are fatal to the scenario.
    pub fn resolve(
        &self,
        path: &TemplatePath,
        substitutions: &[Substitution],
    ) -> Result<String, TemplateError> {
        let text = self.load(path)?;
        let expected = text.matches(PLACEHOLDER).count();
        if expected != substitutions.len() {
            return Err(TemplateError::Mismatch {
                path: path.to_string(),
                expected,
                actual: substitutions.len(),
            });
        }

        Ok(fill_all(&text, substitutions))
    }

    /// Replace an exact substring with a computed literal.
    ///
    /// For fields whose JSON type is non-string (bool, integer) and cannot
    /// go through quoted `%s` substitution.
    ///
    /// # Errors
    ///
    /// `TemplateError::NotFound` if the file is missing,
    /// `TemplateError::MissingToken` if the token does not occur.
    pub fn resolve_with_literal(
        &self,
        path: &TemplatePath,
        token: &str,
        literal: &str,
    ) -> Result<String, TemplateError> {
        let text = self.load(path)?;
        if !text.contains(token) {
            return Err(TemplateError::MissingToken {
                path: path.to_string(),
                token: token.to_string(),
            });
        }
        Ok(text.replace(token, literal))
    }

    fn load(&self, path: &TemplatePath) -> Result<String, TemplateError> {
        let full = self.root.join(path.relative());
        std::fs::read_to_string(&full).map_err(|e| TemplateError::NotFound {
            path: full.display().to_string(),
            source: e,
        })
    }
}

/// Fill the template's placeholders left to right. The scan cursor always
/// moves past inserted text, so a substitution value containing `%s` is
/// never re-scanned as a placeholder. A `Nil` substitution consumes the
/// surrounding quotes when the placeholder is quoted, so `"%s"` becomes a
/// bare JSON `null`.
fn fill_all(text: &str, substitutions: &[Substitution]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for sub in substitutions {
        let Some(rel) = text[cursor..].find(PLACEHOLDER) else {
            break;
        };
        let idx = cursor + rel;

        match sub {
            Substitution::Text(value) => {
                out.push_str(&text[cursor..idx]);
                out.push_str(value);
                cursor = idx + PLACEHOLDER.len();
            }
            Substitution::Nil => {
                let quoted = idx > cursor
                    && text.as_bytes()[idx - 1] == b'"'
                    && text.as_bytes().get(idx + PLACEHOLDER.len()) == Some(&b'"');
                let start = if quoted { idx - 1 } else { idx };
                out.push_str(&text[cursor..start]);
                out.push_str("null");
                cursor = idx + PLACEHOLDER.len() + usize::from(quoted);
            }
        }
    }

    out.push_str(&text[cursor..]);
    out
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template not found: {path}: {source}")]
    NotFound {
        path: String,
        source: std::io::Error,
    },
    #[error("template {path}: expected {expected} substitutions, got {actual}")]
    Mismatch {
        path: String,
        expected: usize,
        actual: usize,
    },
    #[error("template {path}: token {token:?} not present")]
    MissingToken { path: String, token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(files: &[(&str, &str)]) -> (tempfile::TempDir, TemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            let full = dir.path().join(rel);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(&full, content).unwrap();
        }
        let store = TemplateStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn positional_substitution_in_order() {
        let (_d, store) = store_with(&[(
            "hearings/request.json",
            r#"{"caseId": "%s", "venue": "%s"}"#,
        )]);
        let body = store
            .resolve(
                &TemplatePath::new("hearings", "request.json"),
                &["C-1".into(), "Leeds".into()],
            )
            .unwrap();
        assert_eq!(body, r#"{"caseId": "C-1", "venue": "Leeds"}"#);
    }

    #[test]
    fn substituted_value_containing_placeholder_is_not_rescanned() {
        let (_d, store) = store_with(&[("a/t.json", r#"{"a": "%s", "b": "%s"}"#)]);
        let body = store
            .resolve(
                &TemplatePath::new("a", "t.json"),
                &["literal %s text".into(), "second".into()],
            )
            .unwrap();
        assert_eq!(body, r#"{"a": "literal %s text", "b": "second"}"#);
    }

    #[test]
    fn nil_value_before_placeholder_containing_text() {
        let (_d, store) = store_with(&[("a/t.json", r#"{"a": "%s", "b": "%s"}"#)]);
        let body = store
            .resolve(
                &TemplatePath::new("a", "t.json"),
                &[Substitution::Nil, Substitution::Text("%s".into())],
            )
            .unwrap();
        assert_eq!(body, r#"{"a": null, "b": "%s"}"#);
    }

    #[test]
    fn resolution_is_deterministic() {
        let (_d, store) = store_with(&[("a/t.json", r#"{"id": "%s"}"#)]);
        let path = TemplatePath::new("a", "t.json");
        let subs: Vec<Substitution> = vec!["42".into()];
        assert_eq!(
            store.resolve(&path, &subs).unwrap(),
            store.resolve(&path, &subs).unwrap()
        );
    }

    #[test]
    fn flavor_subpath_is_honored() {
        let (_d, store) = store_with(&[("sessions/put/request.json", r#"{"n": "%s"}"#)]);
        let path = TemplatePath::new("sessions", "request.json").with_flavor("put");
        assert_eq!(
            store.resolve(&path, &["1".into()]).unwrap(),
            r#"{"n": "1"}"#
        );
    }

    #[test]
    fn arity_mismatch_fails_with_counts() {
        let (_d, store) = store_with(&[("a/t.json", r#"{"a": "%s", "b": "%s"}"#)]);
        let err = store
            .resolve(&TemplatePath::new("a", "t.json"), &["only-one".into()])
            .unwrap_err();
        match err {
            TemplateError::Mismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected Mismatch, got {other}"),
        }
    }

    #[test]
    fn missing_template_fails_with_path() {
        let (_d, store) = store_with(&[]);
        let err = store
            .resolve(&TemplatePath::new("a", "missing.json"), &[])
            .unwrap_err();
        assert!(matches!(err, TemplateError::NotFound { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn nil_in_quoted_position_yields_bare_null() {
        let (_d, store) = store_with(&[("a/t.json", r#"{"id": "%s"}"#)]);
        let body = store
            .resolve(&TemplatePath::new("a", "t.json"), &[Substitution::Nil])
            .unwrap();
        assert_eq!(body, r#"{"id": null}"#);
    }

    #[test]
    fn nil_differs_from_empty_string() {
        let (_d, store) = store_with(&[("a/t.json", r#"{"id": "%s"}"#)]);
        let path = TemplatePath::new("a", "t.json");
        let nil = store.resolve(&path, &[Substitution::Nil]).unwrap();
        let blank = store.resolve(&path, &["".into()]).unwrap();
        assert_eq!(nil, r#"{"id": null}"#);
        assert_eq!(blank, r#"{"id": ""}"#);
    }

    #[test]
    fn nil_in_unquoted_position_substitutes_null() {
        let (_d, store) = store_with(&[("a/t.json", r#"{"count": %s}"#)]);
        let body = store
            .resolve(&TemplatePath::new("a", "t.json"), &[Substitution::Nil])
            .unwrap();
        assert_eq!(body, r#"{"count": null}"#);
    }

    #[test]
    fn literal_replacement_for_non_string_fields() {
        let (_d, store) = store_with(&[("a/t.json", r#"{"active": "FLAG"}"#)]);
        let body = store
            .resolve_with_literal(&TemplatePath::new("a", "t.json"), r#""FLAG""#, "true")
            .unwrap();
        assert_eq!(body, r#"{"active": true}"#);
    }

    #[test]
    fn literal_replacement_missing_token_fails() {
        let (_d, store) = store_with(&[("a/t.json", r#"{"active": false}"#)]);
        let err = store
            .resolve_with_literal(&TemplatePath::new("a", "t.json"), "NO-SUCH", "true")
            .unwrap_err();
        assert!(matches!(err, TemplateError::MissingToken { .. }));
    }

    #[test]
    fn substitution_token_parsing() {
        assert_eq!(Substitution::from_token("NIL"), Substitution::Nil);
        assert_eq!(
            Substitution::from_token("nil"),
            Substitution::Text("nil".to_string())
        );
        assert_eq!(
            Substitution::from_token(""),
            Substitution::Text(String::new())
        );
    }
}
