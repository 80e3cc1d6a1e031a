use thiserror::Error;

use crate::{regions::BuildError, remote::FetchError};

/// An error returned by a [`RegionCollection`](super::RegionCollection)
/// accessor. Both variants pass the collaborator's error through unchanged.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Build(#[from] BuildError),
}
