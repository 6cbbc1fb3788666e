use thiserror::Error;
use url::Url;

use crate::model::ids::ChallengeSlug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteError {
    #[error("invalid site url: {0}")]
    Parse(#[from] url::ParseError),

    #[error("site url cannot be used as a base: {0}")]
    NotABase(String),
}

/// Builds page URLs for challenges under a site base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRoutes {
    base: Url,
}

impl ChallengeRoutes {
    /// Parse the site base URL. A missing trailing slash is added so that
    /// challenge paths nest under the base path instead of replacing it.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the URL is invalid or cannot carry a path.
    pub fn new(base: &str) -> Result<Self, RouteError> {
        let mut base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            return Err(RouteError::NotABase(base.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL of the challenge page.
    ///
    /// # Errors
    ///
    /// Returns `RouteError::Parse` if joining fails.
    pub fn challenge(&self, slug: &ChallengeSlug) -> Result<Url, RouteError> {
        Ok(self.base.join(&format!("challenges/{slug}"))?)
    }
}
