use gift_shop_admin::history::{HistoryLog, HistoryRecord};

fn record(id: i64, student: &str, teacher: &str, group: &str, coins: u32) -> HistoryRecord {
    HistoryRecord {
        id,
        student: student.to_string(),
        teacher: teacher.to_string(),
        group: group.to_string(),
        date: "12.10.2025".to_string(),
        coins,
    }
}

fn sample_log() -> HistoryLog {
    HistoryLog::new(vec![
        record(1, "Ivanov Artem", "Petrov Petr", "Robotics", 10),
        record(2, "Kosse Ivan", "Petrov Petr", "Chess", 5),
        record(3, "Sokolov Mikhail", "Orlova Anna", "Robotics", 7),
    ])
}

fn visible_ids(log: &HistoryLog) -> Vec<i64> {
    log.visible().iter().map(|r| r.id).collect()
}

#[test]
fn test_everything_selected_initially() {
    let log = sample_log();
    assert_eq!(visible_ids(&log), vec![1, 2, 3]);
    assert_eq!(log.groups(), vec!["Chess", "Robotics"]);
    assert_eq!(log.teachers(), vec!["Orlova Anna", "Petrov Petr"]);
    assert_eq!(log.total_coins(), 22);
}

#[test]
fn test_facets_combine_independently() {
    let mut log = sample_log();
    assert!(!log.toggle_group("Chess"));
    assert_eq!(visible_ids(&log), vec![1, 3]);

    assert!(!log.toggle_teacher("Orlova Anna"));
    assert_eq!(visible_ids(&log), vec![1]);
    assert_eq!(log.total_coins(), 10);
}

#[test]
fn test_toggle_twice_restores_visible_set() {
    let mut log = sample_log();
    let before = visible_ids(&log);
    let filter = log.filter().clone();

    log.toggle_group("Robotics");
    log.toggle_group("Robotics");

    assert_eq!(visible_ids(&log), before);
    assert_eq!(log.filter(), &filter);
}

#[test]
fn test_empty_facet_hides_everything() {
    let mut log = sample_log();
    log.toggle_teacher("Petrov Petr");
    log.toggle_teacher("Orlova Anna");
    assert!(log.visible().is_empty());
    assert_eq!(log.total_coins(), 0);
}

#[test]
fn test_append_selects_new_facet_values_only() {
    let mut log = sample_log();
    log.toggle_group("Chess");

    let id = log.append("Kosse Ivan", "Petrov Petr", "Chess", "13.10.2025", 3);
    assert_eq!(id, 4);
    assert!(!visible_ids(&log).contains(&4));

    let id = log.append("Kosse Ivan", "Smirnova Olga", "Drawing", "14.10.2025", 8);
    assert_eq!(id, 5);
    assert!(visible_ids(&log).contains(&5));
    assert_eq!(log.records().len(), 5);
}
