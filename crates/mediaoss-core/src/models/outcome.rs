use serde::{Serialize, Serializer};

/// Uniform result of every public driver operation.
///
/// Serializes to the `{status: 0|1, msg, data?}` shape callers branch on.
/// `message` is diagnostic text only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    #[serde(rename = "status", serialize_with = "serialize_status")]
    pub success: bool,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

fn serialize_status<S: Serializer>(success: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*success))
}

impl<T> Outcome<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Outcome {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Success that carries no payload.
    pub fn done(message: impl Into<String>) -> Self {
        Outcome {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Outcome {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Failure that still reports data, e.g. the subset of a batch that went through.
    pub fn failed_with(message: impl Into<String>, data: T) -> Self {
        Outcome {
            success: false,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn status(&self) -> u8 {
        u8::from(self.success)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Location of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub url: String,
    pub key: String,
}

pub type UploadOutcome = Outcome<StoredObject>;

impl Outcome<StoredObject> {
    pub fn url(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.url.as_str())
    }

    pub fn key(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.key.as_str())
    }
}
