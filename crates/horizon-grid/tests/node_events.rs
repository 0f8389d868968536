//! Integration tests for node state setters and their local and grid-wide
//! events.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use horizon_grid::{
    CellChangedEvent, CellValue, ColumnId, ColumnValues, ExtractorValueService, GridContext,
    GridEvent, GridEventKind, GridOptions, RowSelectedEvent, RowTree, SelectionState,
    SelectionSettings,
};
use parking_lot::Mutex;

type Row = BTreeMap<String, i64>;

fn row(values: &[(&str, i64)]) -> Row {
    values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn tree() -> RowTree<Row> {
    let values = ExtractorValueService::new(|row: &Row, column| {
        CellValue::from(row.get(column.as_str()).copied())
    })
    .with_setter(|row: &mut Row, column, value| match value.as_int() {
        Some(n) => {
            row.insert(column.to_string(), n);
            true
        }
        None => false,
    });
    let options = GridOptions::new().row_id_getter(|row: &Row| {
        row.get("id").map(|id| id.to_string()).unwrap_or_default()
    });
    RowTree::new(GridContext::new(options).with_value_service(values))
}

fn agg(values: &[(&str, i64)]) -> ColumnValues {
    values
        .iter()
        .map(|(k, v)| (ColumnId::from(*k), CellValue::Int(*v)))
        .collect()
}

#[test]
fn test_agg_data_notifies_removed_columns() {
    let mut tree = tree();
    let node = tree.create_node(Some(row(&[("id", 1), ("a", 10), ("b", 20)])), None);
    tree.set_agg_data(node, Some(agg(&[("a", 1), ("b", 2)])))
        .unwrap();

    let events: Arc<Mutex<Vec<CellChangedEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    tree.node_signals(node)
        .unwrap()
        .cell_changed
        .connect(move |e| events_clone.lock().push(e.clone()));

    tree.set_agg_data(node, Some(agg(&[("a", 1)]))).unwrap();

    let events = events.lock();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].column, ColumnId::from("a"));
    assert_eq!(events[0].new_value, CellValue::Int(10));
    assert_eq!(events[1].column, ColumnId::from("b"));
    assert_eq!(events[1].new_value, CellValue::Int(20));
}

#[test]
fn test_agg_data_without_listeners_is_silent() {
    let mut tree = tree();
    let node = tree.create_node(Some(row(&[("id", 1)])), None);
    tree.set_agg_data(node, Some(agg(&[("a", 1)]))).unwrap();
    assert!(!tree.node(node).unwrap().has_listeners());
    assert_eq!(
        tree.node(node).unwrap().agg_data().unwrap().get(&ColumnId::from("a")),
        Some(&CellValue::Int(1))
    );
}

#[test]
fn test_data_value_round_trip_through_service() {
    let mut tree = tree();
    let node = tree.create_node(Some(row(&[("id", 1), ("price", 5)])), None);
    let column = ColumnId::from("price");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    tree.node_signals(node)
        .unwrap()
        .cell_changed
        .connect(move |e| seen_clone.lock().push(e.new_value.clone()));

    tree.set_data_value(node, &column, CellValue::Int(8)).unwrap();
    assert_eq!(tree.node(node).unwrap().data().unwrap()["price"], 8);
    assert!(tree.set_data_value(node, &column, CellValue::Bool(true)).is_err());
    assert_eq!(*seen.lock(), vec![CellValue::Int(8)]);
}

#[test]
fn test_ids_come_from_data() {
    let mut tree = tree();
    let node = tree.create_node(Some(row(&[("id", 42)])), Some("ignored".into()));
    assert_eq!(tree.node(node).unwrap().id(), Some("42"));

    tree.set_data_and_id(node, Some(row(&[("id", 43)])), None)
        .unwrap();
    assert_eq!(tree.node(node).unwrap().id(), Some("43"));

    tree.set_data_and_id(node, None, Some("manual".into())).unwrap();
    assert_eq!(tree.node(node).unwrap().id(), None);
}

#[test]
fn test_set_data_and_id_fires_data_changed() {
    let mut tree = tree();
    let node = tree.create_node(Some(row(&[("id", 1)])), None);
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    tree.node_signals(node)
        .unwrap()
        .data_changed
        .connect(move |e| events_clone.lock().push(e.clone()));

    tree.set_data_and_id(node, Some(row(&[("id", 2)])), None)
        .unwrap();
    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].old_data, Some(row(&[("id", 1)])));
    assert_eq!(events[0].new_data, Some(row(&[("id", 2)])));
    assert!(!events[0].is_bulk_update);
}

#[test]
fn test_row_selected_local_and_global() {
    let mut tree = tree();
    let root = tree.root();
    let node = tree.create_node(Some(row(&[("id", 1)])), None);
    tree.add_child(root, node).unwrap();

    let local = Arc::new(Mutex::new(Vec::new()));
    let local_clone = local.clone();
    tree.node_signals(node)
        .unwrap()
        .row_selected
        .connect(move |e| local_clone.lock().push(e.clone()));

    let global = Arc::new(Mutex::new(Vec::new()));
    let global_clone = global.clone();
    tree.event_service()
        .add_event_listener(GridEventKind::RowSelected, move |e| {
            global_clone.lock().push(e.clone())
        });

    tree.set_selected(node, true);

    let expected = RowSelectedEvent {
        node,
        id: Some("1".to_string()),
        selected: SelectionState::Selected,
    };
    assert_eq!(*local.lock(), vec![expected.clone()]);
    assert_eq!(*global.lock(), vec![GridEvent::RowSelected(expected)]);
}

#[test]
fn test_structure_changes_notify_children() {
    let mut tree = tree();
    let root = tree.root();
    let first = tree.create_node(Some(row(&[("id", 1)])), None);
    tree.add_child(root, first).unwrap();

    let last_flags = Arc::new(Mutex::new(Vec::new()));
    let flags_clone = last_flags.clone();
    tree.node_signals(first)
        .unwrap()
        .last_child_changed
        .connect(move |last| flags_clone.lock().push(*last));

    let second = tree.create_node(Some(row(&[("id", 2)])), None);
    tree.add_child(root, second).unwrap();
    tree.set_children_after_sort(root, vec![second, first]).unwrap();

    assert_eq!(*last_flags.lock(), vec![false, true]);
}

#[test]
fn test_expand_collapse_events() {
    let mut tree = tree();
    let root = tree.root();
    let group = tree.create_group("g", None, "g");
    tree.add_child(root, group).unwrap();

    let local = Arc::new(AtomicUsize::new(0));
    let local_clone = local.clone();
    tree.node_signals(group)
        .unwrap()
        .expanded_changed
        .connect(move |_| {
            local_clone.fetch_add(1, Ordering::SeqCst);
        });
    let global = Arc::new(AtomicUsize::new(0));
    let global_clone = global.clone();
    tree.event_service()
        .add_event_listener(GridEventKind::RowGroupOpened, move |_| {
            global_clone.fetch_add(1, Ordering::SeqCst);
        });

    tree.set_expanded(group, true).unwrap();
    tree.set_expanded(group, true).unwrap();
    tree.set_expanded(group, false).unwrap();
    assert_eq!(local.load(Ordering::SeqCst), 2);
    assert_eq!(global.load(Ordering::SeqCst), 2);
}

#[test]
fn test_row_height_is_not_deduplicated() {
    let mut tree = tree();
    let node = tree.create_node(Some(row(&[("id", 1)])), None);
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = count.clone();
    tree.node_signals(node)
        .unwrap()
        .height_changed
        .connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

    for _ in 0..3 {
        tree.set_row_height(node, Some(30.0)).unwrap();
    }
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn test_settings_from_toml_drive_selection() {
    let settings = SelectionSettings::from_toml_str(
        r#"
        row_selection = "multiple"
        group_selects_children = true
        "#,
    )
    .unwrap();
    let mut tree = RowTree::new(GridContext::new(GridOptions::<u8>::new().with_settings(settings)));
    let root = tree.root();
    let group = tree.create_group("g", None, "g");
    tree.add_child(root, group).unwrap();
    let a = tree.create_node(Some(1), Some("a".into()));
    let b = tree.create_node(Some(2), Some("b".into()));
    tree.add_child(group, a).unwrap();
    tree.add_child(group, b).unwrap();

    tree.set_selected(a, true);
    tree.set_selected(b, true);
    assert_eq!(tree.is_selected(group), Some(SelectionState::Selected));
}
