use super::FragmentError;
use super::schemes::MonomerScheme;
use std::fmt;
use std::str::FromStr;

/// A parsed fragmentizer key: `scheme` or `scheme@truncation`.
///
/// Examples: `null`, `atomic`, `bonded@3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmenterKey {
    pub scheme: MonomerScheme,
    pub truncation: Option<usize>,
}

impl FromStr for FragmenterKey {
    type Err = FragmentError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| FragmentError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        let (scheme_str, truncation_str) = match key.split_once('@') {
            Some((scheme, truncation)) => (scheme, Some(truncation)),
            None => (key, None),
        };

        let scheme_str = scheme_str.trim();
        if scheme_str.is_empty() {
            return Err(invalid("the scheme name cannot be empty"));
        }
        let scheme: MonomerScheme = scheme_str.parse()?;

        let truncation = match truncation_str.map(str::trim) {
            None => None,
            Some("") => return Err(invalid("the truncation order after '@' cannot be empty")),
            Some(value) => {
                let order: usize = value
                    .parse()
                    .map_err(|_| invalid("the truncation order must be a positive integer"))?;
                if order == 0 {
                    return Err(invalid("the truncation order must be at least 1"));
                }
                Some(order)
            }
        };

        Ok(Self { scheme, truncation })
    }
}

impl fmt::Display for FragmenterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.truncation {
            Some(n) => write!(f, "{}@{}", self.scheme, n),
            None => write!(f, "{}", self.scheme),
        }
    }
}
