/// The availability page no longer labels its courts the way we expect.
///
/// Raised instead of returning a partial slot list: it means the site layout
/// changed and someone has to look at it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Court container has no data-resource-name")]
    MissingCourtName,
    #[error("Court container has a blank data-resource-name")]
    BlankCourtName,
    #[error("Could not parse court number from data-resource-name: {0}")]
    InvalidCourtNumber(String),
}
