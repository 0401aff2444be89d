//! Integration tests for the change trigger
//!
//! Synthetic change batches → ResourceChangeProcessor → refresh signal →
//! RuleBasedMapping selection

use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use testmap_core::{
    InMemoryClassIndex, MappingConfig, ResourceMapping, RuleBasedMapping, RuleStore,
};
use testmap_watch::{
    ChangeEvent, ChangeEventKind, DeltaKind, ResourceChangeProcessor, ResourceDelta,
    SuffixFilter,
};

#[derive(Default)]
struct CountingTrigger {
    hits: AtomicUsize,
}

impl testmap_core::RefreshTrigger for CountingTrigger {
    fn resource_change_detected(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

impl CountingTrigger {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn nested_batch(files: &[&str]) -> ChangeEvent {
    let children = files.iter().map(|f| ResourceDelta::changed(format!("/proj/src/{}", f)));
    ChangeEvent::post_change(vec![ResourceDelta::changed("/proj")
        .with_child(ResourceDelta::changed("/proj/src").with_children(children))])
}

#[test]
fn test_feature_change_deep_in_tree_signals_once() {
    let processor =
        ResourceChangeProcessor::new(SuffixFilter::default(), CountingTrigger::default());

    assert!(processor.process(&nested_batch(&["Login.java", "login.feature", "cart.feature"])));
    assert!(!processor.process(&nested_batch(&["Login.java", "README.md"])));

    assert_eq!(processor.trigger().hits(), 1);
}

#[test]
fn test_suffixes_from_config() {
    let config = MappingConfig::from_yaml_str(
        "version: 1\nrule_file: tests.mapping\nresource_suffixes: [\".story\", \".feature\"]\n",
    )
    .unwrap();
    let processor = ResourceChangeProcessor::new(
        SuffixFilter::from_config(&config),
        CountingTrigger::default(),
    );

    assert!(processor.process(&nested_batch(&["checkout.story"])));
    assert!(processor.process(&nested_batch(&["checkout.feature"])));
    assert!(!processor.process(&nested_batch(&["checkout.txt"])));
    assert_eq!(processor.trigger().hits(), 2);
}

#[test]
fn test_only_post_change_batches_are_processed() {
    let processor =
        ResourceChangeProcessor::new(SuffixFilter::default(), CountingTrigger::default());
    let deltas = vec![ResourceDelta::new("/proj/a.feature", DeltaKind::Removed)];

    let kinds = [
        ChangeEventKind::PreBuild,
        ChangeEventKind::PostBuild,
        ChangeEventKind::PostChange,
        ChangeEventKind::PreClose,
        ChangeEventKind::PreDelete,
    ];
    let processed: Vec<bool> = kinds
        .iter()
        .map(|kind| processor.process(&ChangeEvent::new(*kind, deltas.clone())))
        .collect();

    assert_eq!(processed, vec![false, true, true, false, false]);
    assert_eq!(processor.trigger().hits(), 2);
}

#[test]
fn test_rule_file_edit_reloads_store_and_signals() {
    let dir = TempDir::new().unwrap();
    let rule_file = dir.path().join("tests.mapping");
    fs::write(&rule_file, "login\\.feature=com\\.acme\\.LoginSteps\n").unwrap();

    let store = Arc::new(RuleStore::open(&rule_file).unwrap());
    let mapping = RuleBasedMapping::new(Arc::clone(&store));
    let processor =
        ResourceChangeProcessor::new(SuffixFilter::default(), CountingTrigger::default())
            .with_rule_store(Arc::clone(&store));

    let index = InMemoryClassIndex::new();
    index.add_class("com.acme.LoginSteps");
    index.add_class("com.acme.CartSteps");
    let changed = vec![PathBuf::from("cart.feature")];

    assert!(mapping.select_tests(&changed, &index).is_empty());

    fs::write(
        &rule_file,
        "login\\.feature=com\\.acme\\.LoginSteps\ncart\\.feature=com\\.acme\\.CartSteps\n",
    )
    .unwrap();
    let edit = ChangeEvent::post_change(vec![ResourceDelta::changed(dir.path())
        .with_child(ResourceDelta::changed(&rule_file))]);

    assert!(processor.process(&edit));
    assert_eq!(processor.trigger().hits(), 1);
    assert_eq!(
        mapping.select_tests(&changed, &index).sorted_names(),
        vec!["com.acme.CartSteps"]
    );
}

#[test]
fn test_malformed_rule_file_keeps_previous_rules() {
    let dir = TempDir::new().unwrap();
    let rule_file = dir.path().join("tests.mapping");
    fs::write(&rule_file, "login\\.feature=com\\.acme\\.LoginSteps\n").unwrap();

    let store = Arc::new(RuleStore::open(&rule_file).unwrap());
    let processor =
        ResourceChangeProcessor::new(SuffixFilter::default(), CountingTrigger::default())
            .with_rule_store(Arc::clone(&store));

    fs::write(&rule_file, "login\\.feature=com\\.acme\\.(Login\n").unwrap();
    let edit = ChangeEvent::post_change(vec![ResourceDelta::changed(&rule_file)]);

    // The edit itself is still a relevant change
    assert!(processor.process(&edit));
    assert_eq!(store.snapshot().len(), 1);
    assert!(store.snapshot().get("login\\.feature").is_some());
}

#[test]
fn test_closure_trigger_drives_selection() {
    let dir = TempDir::new().unwrap();
    let rule_file = dir.path().join("tests.mapping");
    fs::write(&rule_file, ".*\\.feature=com\\.acme\\..*Steps\n").unwrap();

    let mapping = Arc::new(RuleBasedMapping::new(Arc::new(
        RuleStore::open(&rule_file).unwrap(),
    )));
    let index = Arc::new(InMemoryClassIndex::new());
    index.add_class("com.acme.LoginSteps");
    index.add_class("com.acme.LoginSuite");
    index.add_dependency("com.acme.LoginSuite", "com.acme.LoginSteps");

    let selections = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let trigger = {
        let mapping = Arc::clone(&mapping);
        let index = Arc::clone(&index);
        let selections = Arc::clone(&selections);
        move || {
            let changed = vec![PathBuf::from("/proj/src/login.feature")];
            let selected = mapping.select_tests(&changed, index.as_ref());
            let names: Vec<String> = selected.sorted_names().into_iter().map(String::from).collect();
            selections.lock().push(names);
        }
    };
    let processor = ResourceChangeProcessor::new(SuffixFilter::default(), trigger);

    assert!(processor.process(&nested_batch(&["login.feature"])));
    assert_eq!(
        *selections.lock(),
        vec![vec![
            "com.acme.LoginSteps".to_string(),
            "com.acme.LoginSuite".to_string()
        ]]
    );
}
