//! Integration coverage for swapping station resolution strategies.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use station_codes::{CodeSource, LookupTableResolver, StationCode, StationCodeResolver};

fn resolve_with(resolver: &dyn StationCodeResolver, label: &str) -> StationCode {
    resolver.resolve(label).expect("label is not blank")
}

#[test]
fn closures_act_as_resolvers() {
    let external = |label: &str| Some(StationCode::new(label.to_uppercase(), CodeSource::External));
    let code = resolve_with(&external, "blr");
    assert_eq!(code.as_str(), "BLR");
    assert!(!code.source().is_heuristic());
}

#[test]
fn explicit_fragment_beats_parenthesised_code() {
    let code = resolve_with(&LookupTableResolver::default(), "Bengaluru (SBC)");
    assert_eq!(code.to_string(), "BLR");
}

#[test]
fn empty_table_falls_back_to_heuristics() {
    let resolver = LookupTableResolver::builder().build();
    assert!(resolver.is_empty());
    let code = resolve_with(&resolver, "Bengaluru (SBC)");
    assert_eq!(code.as_str(), "SBC");
    assert_eq!(code.source(), CodeSource::Parenthesized);
}
