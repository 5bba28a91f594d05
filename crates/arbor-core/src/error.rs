use thiserror::Error;

/// Errors produced at the textual boundaries of the tree model.
///
/// Tree construction itself never fails: invalid node combinations are not
/// representable. Only parsing raw name text can go wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("empty module name")]
    EmptyModuleName,

    #[error("empty library name")]
    EmptyLibraryName,
}
