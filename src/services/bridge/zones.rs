use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;
use std::sync::LazyLock;

/// EIC → display name for every bidding zone the bridge expects to see
static ZONE_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        // --- West & North Europe ---
        ("10YNL----------L", "Netherlands"),
        ("10YBE----------2", "Belgium"),
        ("10YFR-RTE------C", "France"),
        ("10Y1001A1001A82H", "Germany-Luxembourg"),
        ("10Y1001A1001A59C", "Germany (Amprion Area)"),
        ("10YAT-APG------L", "Austria"),
        ("10YCH-SWISSGRIDZ", "Switzerland"),
        ("10Y1001A1001A92E", "United Kingdom"),
        ("10Y1001A1001A016", "Ireland (SEM)"),
        // --- Scandinavia & Baltics ---
        ("10YDK-1--------W", "Denmark DK1"),
        ("10YDK-2--------M", "Denmark DK2"),
        ("10YFI-1--------U", "Finland"),
        ("10YNO-1--------2", "Norway NO1 (Oslo)"),
        ("10YNO-2--------T", "Norway NO2 (Kristiansand)"),
        ("10YNO-3--------J", "Norway NO3 (Trondheim)"),
        ("10YNO-4--------9", "Norway NO4 (Tromso)"),
        ("10YNO-5--------E", "Norway NO5 (Bergen)"),
        ("10Y1001A1001A48H", "Norway NO5 (Bergen)"),
        ("50Y0JVU59B4JWQCU", "Norway NO2 North Sea Link"),
        ("10Y1001A1001A44P", "Sweden SE1"),
        ("10Y1001A1001A45N", "Sweden SE2"),
        ("10Y1001A1001A46L", "Sweden SE3"),
        ("10Y1001A1001A47J", "Sweden SE4"),
        ("10Y1001A1001A39I", "Estonia"),
        ("10YLV-1001A00074", "Latvia"),
        ("10YLT-1001A0008Q", "Lithuania"),
        // --- South Europe ---
        ("10YES-REE------0", "Spain"),
        ("10YPT-REN------W", "Portugal"),
        ("10YGR-HTSO-----Y", "Greece"),
        ("10YIT-GRTN-----B", "Italy (National)"),
        ("10Y1001A1001A73I", "Italy North"),
        ("10Y1001A1001A70O", "Italy Centre-North"),
        ("10Y1001A1001A71M", "Italy Centre-South"),
        ("10Y1001A1001A74G", "Italy South"),
        ("10Y1001A1001A75E", "Italy Sicily"),
        ("10Y1001A1001A885", "Italy Sardinia"),
        ("10Y1001A1001A893", "Italy Rossano"),
        // --- Central & East Europe ---
        ("10YPL-AREA-----S", "Poland"),
        ("10YCZ-CEPS-----N", "Czech Republic"),
        ("10YSK-SEPS-----K", "Slovakia"),
        ("10YHU-MAVIR----U", "Hungary"),
        ("10YRO-TEL------P", "Romania"),
        ("10YSI-ELES-----O", "Slovenia"),
        ("10YHR-HEP------M", "Croatia"),
        ("10YCA-BULGARIA-R", "Bulgaria"),
        ("10YCS-CG-TSO---S", "Montenegro"),
        ("10YCS-SERBIATSOV", "Serbia"),
        ("10YMK-MEPSO----8", "North Macedonia"),
        ("10YBA-JPCC-----D", "Bosnia and Herzegovina"),
        ("10YAL-KESH-----5", "Albania"),
        ("10Y1001C--00100H", "Kosovo"),
        ("10Y1001C--00096J", "Moldova"),
        ("10Y1001C--000182", "Ukraine (IPS)"),
        ("10YTR-TEIAS----W", "Turkey"),
    ])
});

/// Zones whose civil day follows UTC+0 (UTC+1 in summer)
const WESTERN_ZONES: &[&str] = &[
    "10Y1001A1001A92E", // United Kingdom
    "10Y1001A1001A016", // Ireland (SEM)
    "10YPT-REN------W", // Portugal
];

/// Zones whose civil day follows UTC+2 (UTC+3 in summer)
const EASTERN_ZONES: &[&str] = &[
    "10YFI-1--------U", // Finland
    "10Y1001A1001A39I", // Estonia
    "10YLV-1001A00074", // Latvia
    "10YLT-1001A0008Q", // Lithuania
    "10YGR-HTSO-----Y", // Greece
    "10YRO-TEL------P", // Romania
    "10YCA-BULGARIA-R", // Bulgaria
    "10Y1001C--000182", // Ukraine (IPS)
    "10Y1001C--00096J", // Moldova
    "10YTR-TEIAS----W", // Turkey
];

pub fn lookup_zone_name(eic: &str) -> Option<&'static str> {
    ZONE_NAMES.get(eic).copied()
}

/// Ordered fallback chain: static table, then the name carried by the
/// document, then the raw EIC code. First non-empty source wins.
pub fn resolve_zone_name(eic: &str, provided: Option<&str>) -> String {
    lookup_zone_name(eic)
        .map(str::to_string)
        .or_else(|| {
            provided
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| eic.to_string())
}

/// Heuristic UTC offset in minutes for a zone's civil day. Zones are
/// grouped into three geographic buckets (western, eastern, central
/// European), not looked up in a timezone database — good enough for
/// the day-boundary completeness check.
pub fn zone_utc_offset_minutes(eic: &str, at: DateTime<Utc>) -> i32 {
    let base = if WESTERN_ZONES.contains(&eic) {
        0
    } else if EASTERN_ZONES.contains(&eic) {
        120
    } else {
        60
    };
    if is_eu_summer_time(at) { base + 60 } else { base }
}

/// Next local midnight (end of "today") and the midnight after it
/// (end of "tomorrow") for the given zone, expressed as UTC instants
pub fn day_end_targets(eic: &str, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let offset_min = zone_utc_offset_minutes(eic, now) as i64;
    let local_now = now + Duration::minutes(offset_min);
    let local_date = local_now.date_naive();
    let next_day = local_date.succ_opt().unwrap_or(local_date);
    let today_end = next_day.and_time(NaiveTime::MIN).and_utc() - Duration::minutes(offset_min);
    (today_end, today_end + Duration::days(1))
}

/// EU daylight saving: last Sunday of March 01:00 UTC until last Sunday
/// of October 01:00 UTC
fn is_eu_summer_time(at: DateTime<Utc>) -> bool {
    let year = at.year();
    let one_am = NaiveTime::from_hms_opt(1, 0, 0).unwrap_or(NaiveTime::MIN);
    let start = last_sunday(year, 3).and_time(one_am).and_utc();
    let end = last_sunday(year, 10).and_time(one_am).and_utc();
    at >= start && at < end
}

fn last_sunday(year: i32, month: u32) -> NaiveDate {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last_day = first_of_next
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MIN);
    last_day - Duration::days(last_day.weekday().num_days_from_sunday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_name_fallback_chain() {
        assert_eq!(resolve_zone_name("10YNL----------L", None), "Netherlands");
        // Table wins over the provided name
        assert_eq!(
            resolve_zone_name("10YNL----------L", Some("NL hub")),
            "Netherlands"
        );
        assert_eq!(
            resolve_zone_name("10XUNKNOWN-----X", Some("Mystery Zone")),
            "Mystery Zone"
        );
        assert_eq!(resolve_zone_name("10XUNKNOWN-----X", Some("  ")), "10XUNKNOWN-----X");
        assert_eq!(resolve_zone_name("10XUNKNOWN-----X", None), "10XUNKNOWN-----X");
    }

    #[test]
    fn test_last_sunday() {
        // 2026: DST starts March 29, ends October 25
        assert_eq!(last_sunday(2026, 3), NaiveDate::from_ymd_opt(2026, 3, 29).unwrap());
        assert_eq!(last_sunday(2026, 10), NaiveDate::from_ymd_opt(2026, 10, 25).unwrap());
    }

    #[test]
    fn test_eu_summer_time_window() {
        let winter = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();
        let just_before = Utc.with_ymd_and_hms(2026, 3, 29, 0, 59, 59).unwrap();
        let just_after = Utc.with_ymd_and_hms(2026, 3, 29, 1, 0, 0).unwrap();
        assert!(!is_eu_summer_time(winter));
        assert!(is_eu_summer_time(summer));
        assert!(!is_eu_summer_time(just_before));
        assert!(is_eu_summer_time(just_after));
    }

    #[test]
    fn test_offset_buckets() {
        let winter = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();
        // United Kingdom: western bucket
        assert_eq!(zone_utc_offset_minutes("10Y1001A1001A92E", winter), 0);
        assert_eq!(zone_utc_offset_minutes("10Y1001A1001A92E", summer), 60);
        // Finland: eastern bucket
        assert_eq!(zone_utc_offset_minutes("10YFI-1--------U", winter), 120);
        assert_eq!(zone_utc_offset_minutes("10YFI-1--------U", summer), 180);
        // Netherlands: central default
        assert_eq!(zone_utc_offset_minutes("10YNL----------L", winter), 60);
        assert_eq!(zone_utc_offset_minutes("10YNL----------L", summer), 120);
    }

    #[test]
    fn test_day_end_targets_central_winter() {
        // CET in January: local midnight of Jan 16 is 23:00 UTC Jan 15
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let (today_end, tomorrow_end) = day_end_targets("10YNL----------L", now);
        assert_eq!(today_end, Utc.with_ymd_and_hms(2026, 1, 15, 23, 0, 0).unwrap());
        assert_eq!(tomorrow_end, Utc.with_ymd_and_hms(2026, 1, 16, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_day_end_targets_eastern_summer() {
        // EEST in July: local midnight of Jul 2 is 21:00 UTC Jul 1
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap();
        let (today_end, _) = day_end_targets("10YFI-1--------U", now);
        assert_eq!(today_end, Utc.with_ymd_and_hms(2026, 7, 1, 21, 0, 0).unwrap());
    }
}
