use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

// ISO-8601 in UTC with millisecond precision, e.g. 2026-10-19T08:30:00.123Z.
// Use with #[serde(with = "crate::util::iso_date")]

pub fn to_iso_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
{
    serializer.serialize_str(&to_iso_string(date))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = String::deserialize(deserializer)?;
    let date = DateTime::parse_from_rfc3339(&value).map_err(Error::custom)?;
    Ok(date.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Stamp {
        #[serde(with = "crate::util::iso_date")]
        date: DateTime<Utc>,
    }

    #[test]
    fn test_millisecond_format() {
        let date = Utc.with_ymd_and_hms(2024, 4, 22, 9, 5, 7).unwrap()
            + chrono::Duration::milliseconds(42);
        let json = serde_json::to_string(&Stamp { date }).unwrap();
        assert_eq!(json, r#"{"date":"2024-04-22T09:05:07.042Z"}"#);

        let back: Stamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date, date);
    }

    #[test]
    fn test_accepts_offsets() {
        let stamp: Stamp = serde_json::from_str(r#"{"date":"2024-04-22T11:05:07+02:00"}"#).unwrap();
        assert_eq!(stamp.date, Utc.with_ymd_and_hms(2024, 4, 22, 9, 5, 7).unwrap());

        let res = serde_json::from_str::<Stamp>(r#"{"date":"yesterday"}"#);
        assert!(res.is_err());
    }
}
