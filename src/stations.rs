//! Client-side station query layer.
//!
//! Fetched stations are held in memory and sorted/filtered here; the list and
//! map views read the same ordering.

use serde::{Deserialize, Serialize};

use crate::models::FuelStation;

/// Sort orders for the station list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum SortBy {
    Distance,
    Price,
    Name,
    Availability,
}

/// In-memory station list with a sort order and an optional selection.
#[derive(Debug, Clone)]
pub struct StationList {
    stations: Vec<FuelStation>,
    sort: SortBy,
    selected: Option<String>,
}

impl Default for StationList {
    fn default() -> Self {
        Self::new()
    }
}

impl StationList {
    pub fn new() -> Self {
        Self {
            stations: Vec::new(),
            sort: SortBy::Distance,
            selected: None,
        }
    }

    /// Replace the backing list, keeping the sort order. A selection that no
    /// longer resolves is dropped.
    pub fn set_stations(&mut self, stations: Vec<FuelStation>) {
        self.stations = stations;
        if let Some(ref id) = self.selected {
            if !self.stations.iter().any(|s| &s.id == id) {
                self.selected = None;
            }
        }
    }

    pub fn sort_by(&mut self, sort: SortBy) {
        self.sort = sort;
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// The stations under the current sort order.
    pub fn sorted(&self) -> Vec<FuelStation> {
        let mut list = self.stations.clone();
        match self.sort {
            SortBy::Distance => {
                list.sort_by(|a, b| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            }
            SortBy::Price => {
                // stations without a known price level sort last
                list.sort_by(|a, b| match (a.price_level, b.price_level) {
                    (None, None) => std::cmp::Ordering::Equal,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (Some(x), Some(y)) => x.cmp(&y),
                });
            }
            SortBy::Name => {
                list.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
            }
            SortBy::Availability => {
                // stations currently selling fuel come first
                list.sort_by(|a, b| b.is_currently_selling.cmp(&a.is_currently_selling));
            }
        }
        list
    }

    /// Case-insensitive name/address search over the sorted list. An empty
    /// query returns everything.
    pub fn search(&self, query: &str) -> Vec<FuelStation> {
        let query = query.trim();
        if query.is_empty() {
            return self.sorted();
        }
        self.sorted()
            .into_iter()
            .filter(|s| {
                contains_ignore_case(&s.name, query) || contains_ignore_case(&s.address, query)
            })
            .collect()
    }

    /// Select a station by id; returns whether it resolved.
    pub fn select(&mut self, id: &str) -> bool {
        if self.stations.iter().any(|s| s.id == id) {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&FuelStation> {
        let id = self.selected.as_ref()?;
        self.stations.iter().find(|s| &s.id == id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn station(id: &str, name: &str, distance_km: f64) -> FuelStation {
        FuelStation {
            id: id.to_string(),
            name: name.to_string(),
            coordinates: Coordinates {
                latitude: 6.45,
                longitude: 3.43,
            },
            address: "Admiralty Way, Lekki".to_string(),
            is_currently_selling: true,
            distance_km,
            rating: None,
            open_now: None,
            price_level: None,
        }
    }

    fn sample_list() -> StationList {
        let mut a = station("a", "Total Ikoyi", 2.5);
        a.price_level = Some(3);
        let mut b = station("b", "Mobil Lekki", 0.8);
        b.price_level = Some(1);
        let mut c = station("c", "NNPC Yaba", 5.1);
        c.is_currently_selling = false;

        let mut list = StationList::new();
        list.set_stations(vec![a, b, c]);
        list
    }

    #[test]
    fn test_sort_by_distance_default() {
        let ids: Vec<String> = sample_list().sorted().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn test_sort_by_price_puts_unknown_last() {
        let mut list = sample_list();
        list.sort_by(SortBy::Price);
        let ids: Vec<String> = list.sorted().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let mut list = sample_list();
        list.sort_by(SortBy::Name);
        let names: Vec<String> = list.sorted().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["Mobil Lekki", "NNPC Yaba", "Total Ikoyi"]);
    }

    #[test]
    fn test_sort_by_availability_puts_closed_last() {
        let mut list = sample_list();
        list.sort_by(SortBy::Availability);
        let last = list.sorted().pop().unwrap();
        assert_eq!(last.id, "c");
    }

    #[test]
    fn test_search_matches_name_and_address() {
        let list = sample_list();
        let hits = list.search("mobil");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");

        // all three share the sample address
        assert_eq!(list.search("admiralty").len(), 3);
        assert!(list.search("nonexistent").is_empty());
        assert_eq!(list.search("  ").len(), 3);
    }

    #[test]
    fn test_selection_follows_station_set() {
        let mut list = sample_list();
        assert!(list.select("a"));
        assert_eq!(list.selected().unwrap().id, "a");

        assert!(!list.select("zzz"));
        assert_eq!(list.selected().unwrap().id, "a");

        // replacing the list drops a selection that no longer resolves
        list.set_stations(vec![station("x", "Oando Surulere", 1.0)]);
        assert!(list.selected().is_none());

        list.select("x");
        list.clear_selection();
        assert!(list.selected().is_none());
    }
}
