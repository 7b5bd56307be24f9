// Static geography for the nine administrative regions.
//
// Each region is represented by one fixed point used for map placement;
// coordinates are compile-time constants, never derived from the exports.

/// (name, latitude, longitude) for each administrative region.
pub const REGIONS: [(&str, f64, f64); 9] = [
    ("Barreiro", -19.974, -44.022),
    ("Centro Sul", -19.933, -43.938),
    ("Leste", -19.919, -43.901),
    ("Nordeste", -19.889, -43.911),
    ("Noroeste", -19.909, -43.960),
    ("Norte", -19.833, -43.914),
    ("Oeste", -19.952, -43.982),
    ("Pampulha", -19.851, -43.973),
    ("Venda Nova", -19.815, -43.952),
];

/// Coordinates for a region by exact name.
pub fn coordinates(region: &str) -> Option<(f64, f64)> {
    REGIONS
        .iter()
        .find(|(name, _, _)| *name == region)
        .map(|(_, lat, lon)| (*lat, *lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_regions_with_unique_names() {
        let mut names: Vec<&str> = REGIONS.iter().map(|(n, _, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(coordinates("Barreiro"), Some((-19.974, -44.022)));
        assert_eq!(coordinates("Atlantida"), None);
    }
}
