//! Accession token resolution
//!
//! Turns `ACCESSION` or `ACCESSION.VERSION` into a concrete [`Reference`].

use crate::error::RetrieverError;
use crate::reference::{AnnotationStore, Reference};

/// Split an accession token on its first `.`
///
/// Surrounding whitespace is ignored. An empty version (`"NC_1."`) counts as
/// no version.
///
/// ```
/// use ferro_retriever::resolve::accession::parse_token;
///
/// assert_eq!(parse_token("NC_000011.10"), ("NC_000011", Some("10")));
/// assert_eq!(parse_token("NC_000011"), ("NC_000011", None));
/// ```
pub fn parse_token(token: &str) -> (&str, Option<&str>) {
    let token = token.trim();
    match token.split_once('.') {
        Some((accession, version)) if !version.is_empty() => (accession, Some(version)),
        Some((accession, _)) => (accession, None),
        None => (token, None),
    }
}

/// Resolves accession tokens against an annotation store
#[derive(Debug)]
pub struct AccessionResolver<'a, S: AnnotationStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: AnnotationStore + ?Sized> AccessionResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolve a token to a reference
    ///
    /// # Errors
    ///
    /// - [`RetrieverError::UnknownAccession`] if the store holds no version
    ///   of the accession, or the accession is empty
    /// - [`RetrieverError::AmbiguousVersion`] if no version was given
    /// - [`RetrieverError::UnknownVersion`] if the given version is not stored
    pub fn resolve(&self, token: &str) -> Result<Reference, RetrieverError> {
        let (accession, version) = parse_token(token);
        if accession.is_empty() {
            return Err(RetrieverError::UnknownAccession {
                accession: token.trim().to_string(),
            });
        }

        let versions = self.store.list_versions(accession)?;
        if versions.is_empty() {
            return Err(RetrieverError::UnknownAccession {
                accession: accession.to_string(),
            });
        }

        let Some(version) = version else {
            return Err(RetrieverError::AmbiguousVersion {
                accession: accession.to_string(),
                versions,
            });
        };

        match self.store.find_reference(accession, Some(version))? {
            Some(reference) => {
                log::debug!(
                    "Resolved {} to reference id {} ({} bp)",
                    reference.versioned(),
                    reference.id,
                    reference.length
                );
                Ok(reference)
            }
            None => Err(RetrieverError::UnknownVersion {
                accession: accession.to_string(),
                version: version.to_string(),
                versions,
            }),
        }
    }
}
