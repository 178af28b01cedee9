use uuid::Uuid;

use super::error::DatabaseError;
use super::query::Query;

/// Split and check a slash-separated path; collections have an odd number
/// of segments, documents an even number.
fn segments(path: &str) -> Result<Vec<&str>, DatabaseError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(DatabaseError::invalid_argument("Path must not be empty"));
    }
    let parts: Vec<&str> = trimmed.split('/').collect();
    if let Some(bad) = parts.iter().find(|s| s.is_empty() || **s == "." || **s == "..") {
        return Err(DatabaseError::invalid_argument(format!(
            "Invalid path segment '{}' in '{}'",
            bad, path
        )));
    }
    Ok(parts)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    path: String,
}

impl CollectionRef {
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let parts = segments(path)?;
        if parts.len() % 2 == 0 {
            return Err(DatabaseError::invalid_argument(format!(
                "'{}' is a document path, not a collection path",
                path
            )));
        }
        Ok(Self { path: parts.join("/") })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn document(&self, id: &str) -> Result<DocumentRef, DatabaseError> {
        if id.is_empty() || id.contains('/') {
            return Err(DatabaseError::invalid_argument(format!(
                "Invalid document id '{}'",
                id
            )));
        }
        DocumentRef::new(&format!("{}/{}", self.path, id))
    }

    /// Reference to a new document with a generated id.
    pub fn new_document(&self) -> DocumentRef {
        DocumentRef {
            path: format!("{}/{}", self.path, Uuid::new_v4().simple()),
        }
    }

    pub fn query(&self) -> Query {
        Query::new(self.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    path: String,
}

impl DocumentRef {
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let parts = segments(path)?;
        if parts.len() % 2 == 1 {
            return Err(DatabaseError::invalid_argument(format!(
                "'{}' is a collection path, not a document path",
                path
            )));
        }
        Ok(Self { path: parts.join("/") })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn parent(&self) -> CollectionRef {
        let (parent, _) = self.path.rsplit_once('/').unwrap_or(("", &self.path));
        CollectionRef {
            path: parent.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_and_document_parity() {
        assert!(CollectionRef::new("users").is_ok());
        assert!(CollectionRef::new("users/abc/posts").is_ok());
        assert!(CollectionRef::new("users/abc").is_err());
        assert!(DocumentRef::new("users/abc").is_ok());
        assert!(DocumentRef::new("users").is_err());
    }

    #[test]
    fn surrounding_slashes_are_ignored() {
        let col = CollectionRef::new("/users/").unwrap();
        assert_eq!(col.path(), "users");
    }

    #[test]
    fn empty_segments_are_rejected() {
        let err = DocumentRef::new("users//abc").unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert!(CollectionRef::new("").is_err());
    }

    #[test]
    fn document_navigation() {
        let col = CollectionRef::new("users/abc/posts").unwrap();
        let doc = col.document("p1").unwrap();
        assert_eq!(doc.path(), "users/abc/posts/p1");
        assert_eq!(doc.id(), "p1");
        assert_eq!(doc.parent(), col);
        assert_eq!(col.id(), "posts");
        assert!(col.document("a/b").is_err());
    }

    #[test]
    fn generated_ids_are_unique() {
        let col = CollectionRef::new("users").unwrap();
        let a = col.new_document();
        let b = col.new_document();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.parent(), col);
    }
}
