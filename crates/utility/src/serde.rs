pub mod date_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize as _, Deserializer};

    /// Accepts either an RFC 3339 timestamp or a bare
    /// `%Y-%m-%dT%H:%M:%S` value, which is interpreted as UTC.
    pub fn deserialize_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_utc(&s).map_err(Error::custom)
    }

    pub fn deserialize_utc_option<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            Some(s) => parse_utc(&s).map(Some).map_err(Error::custom),
            None => Ok(None),
        }
    }

    fn parse_utc(s: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(|naive| naive.and_utc())
            .map_err(|why| format!("invalid timestamp '{}': {}", s, why))
    }

    #[cfg(test)]
    mod tests {
        use chrono::{TimeZone, Utc};

        #[test]
        fn parses_rfc3339_and_naive() {
            let expected = Utc.with_ymd_and_hms(2025, 7, 1, 12, 30, 0).unwrap();
            assert_eq!(super::parse_utc("2025-07-01T12:30:00Z").unwrap(), expected);
            assert_eq!(super::parse_utc("2025-07-01T12:30:00").unwrap(), expected);
            assert!(super::parse_utc("yesterday").is_err());
        }
    }
}
