use ami_helper::address::{dimension_index, dimension_name, TagAddress};
use ami_helper::AmiError;

#[test]
fn row_construction_binds_the_named_dimension_only() {
    let pmgl1 = TagAddress::from_row("mc16", "PMGL1", "hash123").unwrap();
    assert_eq!(pmgl1.scope(), "mc16");
    assert_eq!(pmgl1.slots(), &[Some("hash123".to_string()), None, None, None]);

    let pmgl4 = TagAddress::from_row("mc23", "PMGL4", "hashABC").unwrap();
    assert_eq!(pmgl4.slots(), &[None, None, None, Some("hashABC".to_string())]);
    assert_eq!(pmgl4.first_unbound_index(), Some(0));
}

#[test]
fn unknown_dimension_names_the_legal_ones() {
    let err = TagAddress::from_row("mc16", "INVALID_SCOPE", "hash123").unwrap_err();
    assert!(matches!(err, AmiError::UnknownDimension(ref d) if d == "INVALID_SCOPE"));
    assert!(err.to_string().contains("legal ones"));
    assert!(dimension_index("PMGL0").is_err());
    assert!(dimension_index("PMGL5").is_err());
}

#[test]
fn dimension_names_round_trip() {
    for index in 0..4 {
        assert_eq!(dimension_index(&dimension_name(index)).unwrap(), index);
    }
}

#[test]
fn binding_returns_a_new_address() {
    let partial = TagAddress::new("mc16_13TeV", [Some("Top".into()), None, None, None]);
    let bound = partial.with_slot_bound(1, "TTbar").unwrap();
    assert_eq!(partial.slot(1), None, "original address must be untouched");
    assert_eq!(bound.slot(1), Some("TTbar"));
    assert_eq!(bound.scope(), partial.scope());
    assert_eq!(bound.unbound_count(), partial.unbound_count() - 1);
    assert_eq!(bound.first_unbound_index(), Some(2));
}

#[test]
fn binding_a_bound_or_missing_slot_is_rejected() {
    let partial = TagAddress::new("mc16_13TeV", [Some("Top".into()), None, None, None]);
    assert!(matches!(
        partial.with_slot_bound(0, "Other"),
        Err(AmiError::InvalidIndex { index: 0 })
    ));
    assert!(matches!(
        partial.with_slot_bound(4, "Other"),
        Err(AmiError::InvalidIndex { index: 4 })
    ));
}

#[test]
fn completeness_and_display() {
    let complete = TagAddress::complete("mc16_13TeV", ["Top", "TTbar", "Baseline", "PowhegPythia"]);
    assert!(complete.is_complete());
    assert_eq!(complete.first_unbound_index(), None);
    assert_eq!(complete.to_string(), "Top TTbar Baseline PowhegPythia");

    let partial = TagAddress::new("mc16_13TeV", [None, Some("TTbar".into()), None, None]);
    assert!(!partial.is_complete());
    assert_eq!(partial.to_string(), "- TTbar - -");
    assert_eq!(partial.bound_slots().collect::<Vec<_>>(), vec![(1, "TTbar")]);
}
