use crate::security::AclClass;

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The hierarchy loader has no tree holding objects of this class
    #[error("class not supported for permission loading: {0}")]
    UnsupportedClass(AclClass),
    /// No single-entity loader was registered for this class
    #[error("class not supported: {0}")]
    ClassNotSupported(AclClass),
    #[error("{class} not found: {identifier}")]
    EntityNotFound { class: AclClass, identifier: String },
    /// A tree provider, permission lookup or entity loader failed.
    ///  Never retried here.
    #[error("provider error: {0}")]
    Provider(#[from] anyhow::Error),
}
