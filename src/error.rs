use std::fmt;

/// Failure while populating a catalog from its source file. The
/// underlying cause is preserved; scheduling never starts on a
/// partially loaded catalog.
#[derive(Debug)]
pub enum DataLoadingError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    Xml(roxmltree::Error),
    Database(rusqlite::Error),
    Malformed(String),
}

impl fmt::Display for DataLoadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataLoadingError::Io(e) => write!(f, "i/o error: {}", e),
            DataLoadingError::Csv(e) => write!(f, "malformed CSV: {}", e),
            DataLoadingError::Json(e) => write!(f, "malformed JSON: {}", e),
            DataLoadingError::Xml(e) => write!(f, "malformed XML: {}", e),
            DataLoadingError::Database(e) => write!(f, "database error: {}", e),
            DataLoadingError::Malformed(msg) => write!(f, "malformed data: {}", msg),
        }
    }
}

impl std::error::Error for DataLoadingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataLoadingError::Io(e) => Some(e),
            DataLoadingError::Csv(e) => Some(e),
            DataLoadingError::Json(e) => Some(e),
            DataLoadingError::Xml(e) => Some(e),
            DataLoadingError::Database(e) => Some(e),
            DataLoadingError::Malformed(_) => None,
        }
    }
}

impl From<std::io::Error> for DataLoadingError {
    fn from(e: std::io::Error) -> Self {
        DataLoadingError::Io(e)
    }
}

impl From<csv::Error> for DataLoadingError {
    fn from(e: csv::Error) -> Self {
        DataLoadingError::Csv(e)
    }
}

impl From<serde_json::Error> for DataLoadingError {
    fn from(e: serde_json::Error) -> Self {
        DataLoadingError::Json(e)
    }
}

impl From<roxmltree::Error> for DataLoadingError {
    fn from(e: roxmltree::Error) -> Self {
        DataLoadingError::Xml(e)
    }
}

impl From<rusqlite::Error> for DataLoadingError {
    fn from(e: rusqlite::Error) -> Self {
        DataLoadingError::Database(e)
    }
}
