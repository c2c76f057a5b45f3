use serde_json::json;

use super::*;

// -----------------------------------------------------------------------
// map-point records
// -----------------------------------------------------------------------

#[test]
fn map_point_builds_address_and_programs() {
    let record = json!({
        "id": 12,
        "latitude": 7.5563,
        "longitude": 99.6114,
        "name_local": "Tha Yang shophouse",
        "house_no": "45/2",
        "road": "Rama VI",
        "subdistrict": "  ",
        "district": "Mueang",
        "province": "Trang",
        "postcode": 92000,
        "buildingControl": {
            "building_type": "Commercial",
            "use_purpose": "Retail",
            "year": 2022
        }
    });
    let loc = normalize_record(&record, 2030).unwrap();

    assert_eq!(loc.id.as_str(), "12");
    assert_eq!(loc.name, "Tha Yang shophouse");
    assert_eq!(loc.address, "45/2 Rama VI Mueang Trang 92000");
    assert_eq!(loc.coordinates, Some(Coordinates::new(7.5563, 99.6114)));
    assert_eq!(loc.kind, "Commercial");
    assert_eq!(loc.programs, vec!["Commercial", "Retail"]);
    assert_eq!(loc.description, "Building type: Commercial, purpose: Retail");
    assert_eq!(loc.year, Some(2022));
    assert_eq!(loc.distance, "0 km");
    assert!(loc.rating.abs() < f64::EPSILON);
    assert!(loc.phone.is_none());
    assert!(loc.images.is_empty());
}

#[test]
fn map_point_without_building_control_uses_unknown_and_current_year() {
    let record = json!({
        "id": "a-1",
        "latitude": "7.5",
        "longitude": "99.6",
        "name_local": "Vacant lot"
    });
    let loc = normalize_record(&record, 2030).unwrap();
    assert_eq!(loc.programs, vec!["Unknown", "Unknown"]);
    assert_eq!(loc.kind, "Unknown");
    assert_eq!(loc.year, Some(2030));
    assert_eq!(loc.address, "");
}

#[test]
fn map_point_with_out_of_range_coordinates_keeps_record_without_position() {
    let record = json!({ "id": 3, "latitude": 99.6, "longitude": 7.5, "name_local": "Swapped" });
    let loc = normalize_record(&record, 2030).unwrap();
    assert!(loc.coordinates.is_none());
}

// -----------------------------------------------------------------------
// portal records
// -----------------------------------------------------------------------

#[test]
fn portal_record_is_copied_with_defaults() {
    let record = json!({
        "id": 7,
        "name": "Kantang pier",
        "address": "Kantang waterfront",
        "type": "riskZone",
        "coordinates": [7.40, 99.51],
        "description": "Seasonal flooding"
    });
    let loc = normalize_record(&record, 2030).unwrap();
    assert_eq!(loc.name, "Kantang pier");
    assert_eq!(loc.kind, "riskZone");
    assert_eq!(loc.coordinates, Some(Coordinates::new(7.40, 99.51)));
    assert_eq!(loc.distance, "0 km");
    assert!(loc.programs.is_empty());
    assert!(loc.year.is_none());
}

#[test]
fn portal_record_reads_every_optional_field() {
    let record = json!({
        "id": "z-9",
        "name": "Zone R2",
        "phone": "075-000-000",
        "distance": "3.2 km",
        "programs": ["Residential", 5, null],
        "rating": "4.5",
        "establishedYear": "2019",
        "openingHours": "08:30-16:30",
        "documentUrl": "https://example.org/r2.pdf",
        "image": "https://example.org/r2.jpg",
        "images": [
            { "url": "https://example.org/1.jpg", "caption": "north" },
            "https://example.org/not-an-object.jpg",
            { "caption": "no url" }
        ],
        "coordinates": { "lat": 7.56, "lng": 99.61 }
    });
    let loc = normalize_record(&record, 2030).unwrap();
    assert_eq!(loc.phone.as_deref(), Some("075-000-000"));
    assert_eq!(loc.distance_km(), Some(3.2));
    assert_eq!(loc.programs, vec!["Residential", "5"]);
    assert!((loc.rating - 4.5).abs() < f64::EPSILON);
    assert_eq!(loc.year, Some(2019), "falls back to establishedYear");
    assert_eq!(loc.opening_hours.as_deref(), Some("08:30-16:30"));
    assert_eq!(loc.images.len(), 1);
    assert_eq!(loc.images[0].caption.as_deref(), Some("north"));
    assert_eq!(loc.coordinates, Some(Coordinates::new(7.56, 99.61)));
}

#[test]
fn numeric_distance_is_formatted_in_km() {
    let record = json!({ "id": 1, "name": "x", "distance": 12.5 });
    let loc = normalize_record(&record, 2030).unwrap();
    assert_eq!(loc.distance, "12.5 km");
}

#[test]
fn malformed_coordinates_become_none() {
    for coordinates in [
        json!([7.5]),
        json!([7.5, 99.6, 10.0]),
        json!(["north", 99.6]),
        json!([91.0, 0.0]),
        json!(null),
    ] {
        let record = json!({ "id": 1, "name": "x", "coordinates": coordinates });
        let loc = normalize_record(&record, 2030).unwrap();
        assert!(loc.coordinates.is_none(), "{record}");
    }
}

// -----------------------------------------------------------------------
// rejection
// -----------------------------------------------------------------------

#[test]
fn records_without_id_are_rejected() {
    for record in [json!({ "name": "anonymous" }), json!({ "id": "  " }), json!({ "id": null })] {
        assert!(matches!(
            normalize_record(&record, 2030),
            Err(ClientError::Normalization { .. })
        ));
    }
}

#[test]
fn non_objects_are_rejected() {
    let err = normalize_record(&json!([1, 2]), 2030).unwrap_err();
    assert!(err.to_string().contains("an array"));
}

#[test]
fn normalize_records_skips_bad_entries() {
    let records = vec![
        json!({ "id": 1, "name": "kept" }),
        json!("garbage"),
        json!({ "name": "no id" }),
        json!({ "id": 2, "name": "also kept" }),
    ];
    let locations = normalize_records(&records);
    let ids: Vec<&str> = locations.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}
