/// Canonical timezone for deriving calendar dates (delivery days, raid
/// windows, ranking `last_updated`).
///
/// Keeping this in a single constant avoids scattering string literals across
/// SQL definitions and application queries.
pub const RAID_DATE_TIMEZONE: &str = "Asia/Seoul";
