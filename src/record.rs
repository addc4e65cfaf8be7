use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata written next to every stored image as `{filename}.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// Name of the image file inside the upload directory
    pub filename: String,
    /// Label exactly as submitted
    pub text: String,
    #[serde(with = "iso_millis")]
    pub uploaded_at: DateTime<Utc>,
}

impl UploadRecord {
    pub fn new<F: Into<String>, T: Into<String>>(
        filename: F,
        text: T,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        UploadRecord { filename: filename.into(), text: text.into(), uploaded_at }
    }

    /// Two-space indented JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `2024-05-01T12:34:56.789Z`
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)).map_err(de::Error::custom)
    }
}
