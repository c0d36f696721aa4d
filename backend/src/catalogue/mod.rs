//! Resource catalogue: room/slot lifecycle and CSV ingest.
//!
//! CSV ingest is the only way this crate acquires a catalogue without a
//! database (§6); it is a small, self-contained parser, not a persistence
//! layer. It also folds observed `(location, weekday, hour, status)` rows
//! into the admin config's learned popularity maps (§4.2).

use crate::error::{MarketError, MarketResult};
use crate::models::{AdminConfig, Resource, SlotStatus, TimeSlot};
use crate::store::Store;
use std::collections::BTreeMap;

/// One parsed row of the CSV ingest format.
#[derive(Debug, Clone)]
pub struct IngestRow {
    pub building: String,
    pub room_name: String,
    pub capacity: u32,
    /// Seconds since the Unix epoch, UTC.
    pub start: i64,
    pub booked: bool,
}

/// Outcome of an ingest call.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct IngestReport {
    pub resources_created: usize,
    pub slots_created: usize,
}

/// Parse CSV text in the required format:
/// `Building, Room Name, Capacity, Date (YYYY-MM-DD), Time (HH:MM), Status`.
/// Column order is insensitive; unknown columns are ignored.
pub fn parse_csv(csv: &str) -> MarketResult<Vec<IngestRow>> {
    let mut lines = csv.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().ok_or_else(|| MarketError::Validation("empty CSV".into()))?;
    let columns: Vec<String> = header.split(',').map(|c| c.trim().to_lowercase()).collect();

    let index_of = |name: &str| -> MarketResult<usize> {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| MarketError::Validation(format!("missing column: {name}")))
    };
    let building_idx = index_of("building")?;
    let room_idx = index_of("room name")?;
    let capacity_idx = index_of("capacity")?;
    let date_idx = index_of("date (yyyy-mm-dd)")?;
    let time_idx = index_of("time (hh:mm)")?;
    let status_idx = index_of("status")?;

    let mut rows = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();
        let max_idx = [building_idx, room_idx, capacity_idx, date_idx, time_idx, status_idx]
            .into_iter()
            .max()
            .unwrap();
        if fields.len() <= max_idx {
            return Err(MarketError::Validation(format!("row {} has too few columns", line_no + 2)));
        }

        let capacity: u32 = fields[capacity_idx]
            .parse()
            .map_err(|_| MarketError::Validation(format!("row {}: malformed capacity", line_no + 2)))?;
        let start = parse_date_time(fields[date_idx], fields[time_idx])
            .ok_or_else(|| MarketError::Validation(format!("row {}: malformed date/time", line_no + 2)))?;
        let booked = match fields[status_idx].to_lowercase().as_str() {
            "available" => false,
            "booked" => true,
            other => return Err(MarketError::Validation(format!("row {}: unknown status '{other}'", line_no + 2))),
        };

        rows.push(IngestRow {
            building: fields[building_idx].to_string(),
            room_name: fields[room_idx].to_string(),
            capacity,
            start,
            booked,
        });
    }
    Ok(rows)
}

/// Parse `YYYY-MM-DD` and `HH:MM` into seconds-since-epoch (UTC).
fn parse_date_time(date: &str, time: &str) -> Option<i64> {
    let date = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = chrono::NaiveTime::parse_from_str(time, "%H:%M").ok()?;
    Some(date.and_time(time).and_utc().timestamp())
}

/// Ingest parsed rows: create any missing `Resource`/`TimeSlot` entities and
/// fold demand ratios into `config`'s popularity maps. Slots attached to a
/// newly-created resource start `IN_AUCTION`-eligible, i.e. `AVAILABLE`
/// unless the row says `Booked` — pricing/auction creation is a separate
/// step (§9 open question: slots start AVAILABLE here; the pricing engine
/// is what transitions a slot to IN_AUCTION once it attaches an auction).
pub fn import_resources(store: &mut Store, config: &mut AdminConfig, rows: &[IngestRow]) -> IngestReport {
    let mut report = IngestReport::default();
    let mut resource_by_key: BTreeMap<(String, String), crate::models::Id> = BTreeMap::new();
    for resource in store.resources() {
        resource_by_key.insert(
            (resource.location().to_string(), resource.name().to_string()),
            resource.id(),
        );
    }

    for row in rows {
        let key = (row.building.clone(), row.room_name.clone());
        let resource_id = *resource_by_key.entry(key).or_insert_with(|| {
            let resource = Resource::new(row.room_name.clone(), row.building.clone(), row.capacity);
            let id = resource.id();
            store.put_resource(resource);
            report.resources_created += 1;
            id
        });

        let mut slot = TimeSlot::new(resource_id, row.start, row.start + 1800);
        if row.booked {
            slot.set_status(SlotStatus::Booked);
        }
        store.put_slot(slot);
        report.slots_created += 1;
    }

    learn_popularity(config, rows);
    report
}

/// Fold a batch of observations into `location_popularity`/`time_popularity`
/// as the Laplace-smoothed ratio of `Booked` rows to total rows per key, so
/// a single observation doesn't saturate a map entry at 0.0 or 1.0.
pub fn learn_popularity(config: &mut AdminConfig, rows: &[IngestRow]) {
    let mut location_counts: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    let mut time_counts: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for row in rows {
        let entry = location_counts.entry(row.building.clone()).or_insert((0.0, 0.0));
        entry.1 += 1.0;
        if row.booked {
            entry.0 += 1.0;
        }

        let days_since_epoch = row.start.div_euclid(86_400);
        let weekday = ((days_since_epoch + 3).rem_euclid(7)) as u32;
        let hour = row.start.rem_euclid(86_400).div_euclid(3600) as u32;
        let key = crate::models::config::time_key(weekday, hour);
        let entry = time_counts.entry(key).or_insert((0.0, 0.0));
        entry.1 += 1.0;
        if row.booked {
            entry.0 += 1.0;
        }
    }

    for (location, (booked, total)) in location_counts {
        let score = (booked + 1.0) / (total + 2.0);
        config.location_popularity.insert(location, score);
    }
    for (key, (booked, total)) in time_counts {
        let score = (booked + 1.0) / (total + 2.0);
        config.time_popularity.insert(key, score);
    }
}
