//! Stadium catalog

use std::sync::OnceLock;

use crate::error::EngineError;
use crate::models::{Drainage, Stadium};

static STADIUMS: OnceLock<Vec<Stadium>> = OnceLock::new();

fn stadium(
    id: &str,
    name: &str,
    city: &str,
    (lat, lon): (f64, f64),
    capacity: u32,
    drainage: Drainage,
    covered_percent: u8,
) -> Stadium {
    Stadium {
        id: id.to_string(),
        name: name.to_string(),
        city: city.to_string(),
        lat,
        lon,
        capacity,
        drainage,
        covered_percent,
    }
}

/// All supported venues, in display order
pub fn stadiums() -> &'static [Stadium] {
    STADIUMS.get_or_init(|| {
        vec![
            stadium(
                "blr",
                "M. Chinnaswamy Stadium",
                "Bengaluru",
                (12.9788, 77.5996),
                40_000,
                Drainage::Excellent,
                15,
            ),
            stadium("mum", "Wankhede Stadium", "Mumbai", (18.9389, 72.8258), 33_000, Drainage::Good, 20),
            stadium("kol", "Eden Gardens", "Kolkata", (22.5646, 88.3433), 66_000, Drainage::Average, 25),
            stadium(
                "ahm",
                "Narendra Modi Stadium",
                "Ahmedabad",
                (23.0904, 72.5975),
                132_000,
                Drainage::Excellent,
                30,
            ),
            stadium(
                "che",
                "M. A. Chidambaram Stadium",
                "Chennai",
                (13.0628, 80.2793),
                50_000,
                Drainage::Good,
                10,
            ),
            stadium("del", "Arun Jaitley Stadium", "Delhi", (28.6379, 77.2432), 41_000, Drainage::Good, 18),
            stadium(
                "dha",
                "HPCA Stadium",
                "Dharamshala",
                (32.1976, 76.3259),
                23_000,
                Drainage::Excellent,
                5,
            ),
        ]
    })
}

/// Look up a stadium by id
pub fn find_stadium(stadium_id: &str) -> Result<&'static Stadium, EngineError> {
    stadiums()
        .iter()
        .find(|s| s.id == stadium_id)
        .ok_or_else(|| EngineError::UnknownStadium { stadium_id: stadium_id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_has_seven_unique_venues() {
        let ids: HashSet<&str> = stadiums().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(stadiums().len(), 7);
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn test_covered_percent_in_range() {
        assert!(stadiums().iter().all(|s| s.covered_percent <= 100));
    }

    #[test]
    fn test_find_stadium() {
        let wankhede = find_stadium("mum").unwrap();
        assert_eq!(wankhede.city, "Mumbai");
        assert_eq!(wankhede.drainage, Drainage::Good);
        assert_eq!(wankhede.covered_percent, 20);

        match find_stadium("xyz") {
            Err(EngineError::UnknownStadium { stadium_id }) => assert_eq!(stadium_id, "xyz"),
            other => panic!("Expected UnknownStadium, got {:?}", other),
        }
    }
}
