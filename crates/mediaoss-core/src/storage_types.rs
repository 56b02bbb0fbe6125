use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Object storage providers
///
/// Names are matched case-insensitively so both the historical camel-case
/// spelling (`aliYun`, `qiNiu`) and lowercase forms are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(alias = "aliYun")]
    AliYun,
    #[serde(alias = "qiNiu")]
    QiNiu,
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aliyun" => Ok(Provider::AliYun),
            "qiniu" => Ok(Provider::QiNiu),
            _ => Err(anyhow::anyhow!("Unknown storage provider: {}", s)),
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Provider::AliYun => write!(f, "aliYun"),
            Provider::QiNiu => write!(f, "qiNiu"),
        }
    }
}
