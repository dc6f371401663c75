use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A contract identifier, either a bare name or fully qualified as
/// `path/to/Source.sol:Name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSpec {
    pub path: Option<PathBuf>,
    pub name: String,
}

impl ContractSpec {
    pub fn path_name(path: PathBuf, name: impl ToString) -> Self {
        Self {
            path: Some(path),
            name: name.to_string(),
        }
    }

    pub fn name(name: impl ToString) -> Self {
        Self {
            path: None,
            name: name.to_string(),
        }
    }
}

impl From<&str> for ContractSpec {
    fn from(s: &str) -> Self {
        let s = s.trim();

        match s.rsplit_once(':') {
            Some((path, name)) if !path.is_empty() => {
                Self::path_name(PathBuf::from(path), name)
            }
            _ => Self::name(s.trim_start_matches(':')),
        }
    }
}

impl FromStr for ContractSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ContractSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = self.path.as_deref() {
            write!(f, "{}:{}", path.display(), self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}
