use proptest::prelude::*;

/// Valid batch ids: non-empty, no `:`
pub fn batch_id_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.-]{1,24}"
}

/// Record ids as they appear for events and mentions
pub fn record_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i64>().prop_map(|id| id.to_string()),
        (any::<i64>(), "[A-Za-z0-9:/._-]{1,40}").prop_map(|(id, ident)| format!("{id}_{ident}")),
    ]
}

/// Distinct event ids staged in shuffled order
pub fn distinct_event_ids_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::hash_set(any::<i64>(), 0..40)
        .prop_map(|ids| ids.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}
