use crate::{
    query::Limit,
    result::{Cache, ResultModifierCollection},
    Error,
};
use serde::Deserialize;
use std::time::Duration;

/// Defaults a repository applies to every query, before the caller's specification and
/// result modifier.
///
/// ```
/// use specula::RepositoryConfig;
///
/// let config: RepositoryConfig = serde_json::from_str(r#"{"maxResults": 100}"#).unwrap();
/// assert_eq!(config.max_results, Some(100));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// Limit the number of rows, unless the specification sets a limit itself.
    pub max_results: Option<u64>,
    /// Request caching results for the given number of seconds.
    pub cache_lifetime: Option<u64>,
    /// Round date/time parameters down to the given number of seconds.
    pub round_date_time: Option<u64>,
}

impl RepositoryConfig {
    pub(crate) fn query_modifier(&self) -> Option<Limit> {
        self.max_results.map(Limit)
    }

    pub(crate) fn result_modifiers(&self) -> Result<ResultModifierCollection, Error> {
        let mut result = ResultModifierCollection::default();

        if let Some(lifetime) = self.cache_lifetime {
            result.push(Cache {
                lifetime: Some(Duration::from_secs(lifetime)),
            });
        }

        if let Some(seconds) = self.round_date_time {
            result.push(round_date_time(seconds)?);
        }

        Ok(result)
    }
}

#[cfg(feature = "time")]
fn round_date_time(seconds: u64) -> Result<impl crate::component::Component, Error> {
    crate::result::RoundDateTime::new(seconds)
}

#[cfg(not(feature = "time"))]
fn round_date_time(_: u64) -> Result<Cache, Error> {
    Err(Error::InvalidArgument(
        "rounding date/time parameters requires the 'time' feature".into(),
    ))
}
