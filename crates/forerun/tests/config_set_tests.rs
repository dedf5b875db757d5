//! Integration tests driving the config-set engine the way a prediction
//! loop does: insert during closure, read the aggregates to decide
//! resolution, freeze and cache.

use forerun::testing::{GatePredicate, SiteContext};
use forerun::{Config, ConfigSet, ConfigSetError, ContextMode, NonePredicate};
use std::collections::HashMap;

fn config(state: u32, alt: u32, sites: &[u32]) -> Config<SiteContext, GatePredicate> {
    Config::new(
        state,
        alt,
        SiteContext::of(sites.iter().copied()),
        GatePredicate::Always,
    )
}

#[test]
fn closure_converges_through_changed_flags() {
    // A toy closure: every changed insert spawns a successor configuration
    // in the same merge family until the context stops growing.
    let mut set = ConfigSet::new(ContextMode::Local);
    let mut worklist = vec![config(5, 1, &[0])];

    let mut steps = 0;
    while let Some(next) = worklist.pop() {
        steps += 1;
        assert!(steps < 64, "closure failed to converge");

        let site = next.context.sites().max().unwrap_or(0);
        if set.insert(next).unwrap() && site < 4 {
            worklist.push(config(5, 1, &[site + 1]));
        }
    }

    // Everything merged into one configuration covering all visited sites.
    assert_eq!(set.len(), 1);
    assert_eq!(set.get(0).unwrap().context, SiteContext::of([0, 1, 2, 3, 4]));
    assert_eq!(set.unique_alt(), Some(1));
}

#[test]
fn resolved_prediction_reads_clean_aggregates() {
    let mut set = ConfigSet::new(ContextMode::Local);
    set.insert_all([
        config(5, 1, &[10]),
        config(6, 1, &[10, 20]),
        config(7, 1, &[30]),
    ])
    .unwrap();

    assert_eq!(set.unique_alt(), Some(1));
    assert!(!set.has_semantic_context());
    assert!(!set.dips_outer_context());
}

#[test]
fn conflicted_prediction_escalates_and_records_conflict() {
    let mut set = ConfigSet::new(ContextMode::Local);
    set.insert(config(5, 1, &[10])).unwrap();
    set.insert(config(5, 2, &[10])).unwrap();

    let mut escaping = config(8, 1, &[20]);
    escaping.reaches_outer_context = 1;
    set.insert(escaping).unwrap();

    // The simulator sees no unique alternative plus an outer-context escape
    // and escalates to full-context prediction with a fresh set.
    assert_eq!(set.unique_alt(), None);
    assert!(set.dips_outer_context());

    let full = ConfigSet::<SiteContext, GatePredicate>::new(ContextMode::Full);
    assert_eq!(full.mode(), ContextMode::Full);

    // Conflict analysis happens outside; the set stores its verdict.
    set.set_conflicting_alts([1, 2]);
    assert_eq!(set.conflicting_alts(), Some(&[1, 2][..]));
}

#[test]
fn frozen_snapshots_key_a_decision_cache() {
    let mut cache: HashMap<ConfigSet<SiteContext, GatePredicate>, u32> = HashMap::new();

    let mut first = ConfigSet::new(ContextMode::Local);
    first.insert(config(5, 1, &[10])).unwrap();
    first.insert(config(6, 2, &[20])).unwrap();
    cache.insert(first.snapshot(true), 41);

    // An identically built set (frozen or not) hits the same cache entry.
    let mut second = ConfigSet::new(ContextMode::Local);
    second.insert(config(5, 1, &[10])).unwrap();
    second.insert(config(6, 2, &[20])).unwrap();
    assert_eq!(cache.get(&second), Some(&41));
    assert_eq!(cache.get(&second.snapshot(true)), Some(&41));

    // A different context mode misses even with the same configurations.
    let mut full = ConfigSet::new(ContextMode::Full);
    full.insert(config(5, 1, &[10])).unwrap();
    full.insert(config(6, 2, &[20])).unwrap();
    assert_eq!(cache.get(&full), None);

    // Insertion order is significant for cache identity.
    let mut reordered = ConfigSet::new(ContextMode::Local);
    reordered.insert(config(6, 2, &[20])).unwrap();
    reordered.insert(config(5, 1, &[10])).unwrap();
    assert_eq!(cache.get(&reordered), None);
}

#[test]
fn published_snapshot_is_isolated_from_further_closure() {
    let mut set = ConfigSet::new(ContextMode::Local);
    set.insert(config(5, 1, &[10])).unwrap();
    set.outer_context_depth = 2;

    let frozen = set.snapshot(true);
    assert_eq!(frozen.outer_context_depth, 2);

    // The producer keeps mutating; the published snapshot must not move.
    set.insert(config(5, 1, &[20])).unwrap();
    set.insert(config(9, 2, &[30])).unwrap();

    assert_eq!(frozen.len(), 1);
    assert_eq!(frozen.get(0).unwrap().context, SiteContext::of([10]));
    assert_eq!(frozen.unique_alt(), Some(1));
    assert_eq!(set.unique_alt(), None);
}

#[test]
fn predicate_free_grammars_use_the_none_predicate() {
    let mut set: ConfigSet<SiteContext, NonePredicate> = ConfigSet::new(ContextMode::Local);
    set.insert(Config::new(5, 1, SiteContext::of([10]), NonePredicate))
        .unwrap();
    set.insert(Config::new(5, 1, SiteContext::of([20]), NonePredicate))
        .unwrap();

    assert_eq!(set.len(), 1);
    assert!(!set.has_semantic_context());
}

#[test]
fn cursor_is_the_only_bulk_filter() {
    // Drop every configuration for alternative 2, retain the rest.
    let mut set = ConfigSet::new(ContextMode::Local);
    set.insert_all([
        config(5, 1, &[10]),
        config(6, 2, &[20]),
        config(7, 2, &[30]),
        config(8, 1, &[40]),
    ])
    .unwrap();

    let mut cursor = set.cursor();
    while let Ok(current) = cursor.advance() {
        if current.alt == 2 {
            cursor.remove().unwrap();
        }
    }
    drop(cursor);

    assert_eq!(set.len(), 2);
    assert!(set.iter().all(|c| c.alt == 1));
    let states: Vec<u32> = set.iter().map(|c| c.state).collect();
    assert_eq!(states, vec![5, 8]);
}

#[test]
fn frozen_set_surfaces_read_only_everywhere() {
    let mut set = ConfigSet::new(ContextMode::Local);
    set.insert(config(5, 1, &[10])).unwrap();
    let mut frozen = set.snapshot(true);

    assert_eq!(frozen.insert(config(6, 1, &[10])), Err(ConfigSetError::ReadOnly));
    assert_eq!(frozen.clear(), Err(ConfigSetError::ReadOnly));
    assert_eq!(frozen.remove(0), Err(ConfigSetError::ReadOnly));

    // Reads keep working.
    assert_eq!(frozen.len(), 1);
    assert!(frozen.contains(&config(5, 1, &[10])));
    assert_eq!(frozen.states().len(), 1);
    assert!(!frozen.to_string().is_empty());
}
