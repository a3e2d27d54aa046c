use thiserror::Error;

pub type Result<T> = std::result::Result<T, HotspotError>;

#[derive(Error, Debug)]
pub enum HotspotError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Repository access error: {0}")]
    RepositoryAccess(String),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HotspotError {
    /// True for errors raised while reading history, as opposed to bad input
    /// or failures of the reporting side.
    pub fn is_repository_access(&self) -> bool {
        matches!(
            self,
            HotspotError::RepositoryAccess(_)
                | HotspotError::GitDiscover(_)
                | HotspotError::RefFind(_)
                | HotspotError::HeadPeel(_)
                | HotspotError::ObjectFindConv(_)
                | HotspotError::ObjectDecode(_)
                | HotspotError::Commit(_)
                | HotspotError::DiffTreeToTree(_)
        )
    }
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::discover::Error> for HotspotError {
    fn from(err: gix::discover::Error) -> Self {
        HotspotError::GitDiscover(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for HotspotError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        HotspotError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for HotspotError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        HotspotError::HeadPeel(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for HotspotError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        HotspotError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for HotspotError {
    fn from(err: gix::objs::decode::Error) -> Self {
        HotspotError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for HotspotError {
    fn from(err: gix::object::commit::Error) -> Self {
        HotspotError::Commit(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for HotspotError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        HotspotError::DiffTreeToTree(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_is_not_repository_access() {
        let err = HotspotError::Configuration("bad date".to_string());
        assert!(!err.is_repository_access());
        assert_eq!(err.to_string(), "Invalid configuration: bad date");
    }

    #[test]
    fn repository_access_is_classified() {
        let err = HotspotError::RepositoryAccess("corrupt object".to_string());
        assert!(err.is_repository_access());
    }
}
