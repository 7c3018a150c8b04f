use thiserror::Error;

use crate::model::{AssetError, ParseKeyError};
use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    ParseKey(#[from] ParseKeyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerKey, CacheVersion};

    fn parse_then_version(key: &str, tag: &str) -> Result<(AnswerKey, CacheVersion), Error> {
        Ok((key.parse()?, CacheVersion::new(tag)?))
    }

    #[test]
    fn domain_errors_convert_into_umbrella() {
        assert!(parse_then_version("akk", "v1").is_ok());
        assert!(matches!(parse_then_version("gen", "v1"), Err(Error::ParseKey(_))));
        assert!(matches!(
            parse_then_version("nom", " "),
            Err(Error::Asset(AssetError::EmptyVersion))
        ));
    }
}
