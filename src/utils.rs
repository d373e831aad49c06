use chrono::{NaiveDate, TimeZone};

/// Convert a `YYYYMMDD` trade date into the epoch second of local midnight.
///
/// Returns 0.0 for any token that is not an 8-digit valid calendar date;
/// the row is kept and stored with the zero stamp.
pub fn to_timestamp(date_token: &str) -> f64 {
    if date_token.len() != 8 || !date_token.bytes().all(|b| b.is_ascii_digit()) {
        return 0.0;
    }

    let Ok(date) = NaiveDate::parse_from_str(date_token, "%Y%m%d") else {
        return 0.0;
    };

    let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
        return 0.0;
    };

    // DST gaps where local midnight does not exist also stamp 0.0.
    match chrono::Local.from_local_datetime(&midnight).earliest() {
        Some(stamp) => stamp.timestamp() as f64,
        None => 0.0,
    }
}
