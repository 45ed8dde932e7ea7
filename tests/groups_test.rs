use gift_shop_admin::groups::{Group, GroupFilter, GroupForm};
use gift_shop_admin::manager::{Change, CommitError, EntityManager};
use gift_shop_admin::models::GroupDto;

mod common;
use common::*;

fn group(id: i64, name: &str) -> Group {
    Group {
        id,
        name: name.to_string(),
        teacher: person(3, "Petrov Petr"),
        participants: Vec::new(),
    }
}

fn visible_names(groups: &EntityManager<Group>) -> Vec<String> {
    groups.visible().iter().map(|g| g.name.clone()).collect()
}

#[test]
fn test_create_group_requires_name_and_teacher() {
    let mut groups = EntityManager::<Group>::default();
    groups.open_create();

    let Err(CommitError::Invalid(errors)) = groups.commit() else {
        panic!("empty group form must be rejected");
    };
    assert_eq!(errors.get("name"), Some("Group name is required"));
    assert_eq!(errors.get("teacher"), Some("Select a teacher"));
    assert!(groups.is_empty());

    let form = groups.form_mut().expect("form stays open after rejection");
    form.name = "  Robotics  ".to_string();
    form.teacher = Some(person(3, "Petrov Petr"));
    assert_eq!(groups.commit(), Ok(Change::Created(1)));

    let created = groups.get(1).unwrap();
    assert_eq!(created.name, "Robotics");
    assert_eq!(created.teacher.id, 3);
}

#[test]
fn test_participants_are_unique_and_removable() {
    let mut form = GroupForm {
        name: "Chess".to_string(),
        teacher: Some(person(3, "Petrov Petr")),
        participants: Vec::new(),
    };
    assert!(form.add_participant(person(1, "Ivanov Artem")));
    assert!(!form.add_participant(person(1, "Ivanov Artem")));
    assert!(form.add_participant(person(2, "Kosse Ivan")));
    assert_eq!(form.participants.len(), 2);

    assert!(form.remove_participant(1));
    assert!(!form.remove_participant(1));

    let mut groups = EntityManager::<Group>::default();
    groups.commit_create(form).unwrap();
    assert!(groups.get(1).unwrap().has_participant(2));
    assert!(!groups.get(1).unwrap().has_participant(1));
}

#[test]
fn test_duplicate_participants_fail_validation() {
    let groups = EntityManager::<Group>::default();
    let form = GroupForm {
        name: "Chess".to_string(),
        teacher: Some(person(3, "Petrov Petr")),
        participants: vec![person(1, "Ivanov Artem"), person(1, "Ivanov Artem")],
    };
    assert!(groups.validate(&form).contains("participants"));
}

#[test]
fn test_candidate_search_needs_three_characters() {
    let roster = vec![
        person(1, "Ivanov Artem"),
        person(2, "Kosse Ivan"),
        person(4, "Sokolov Mikhail"),
    ];
    let mut form = GroupForm::default();
    assert!(form.candidates(&roster, "iv").is_empty());

    let found: Vec<i64> = form.candidates(&roster, "iva").iter().map(|p| p.id).collect();
    assert_eq!(found, vec![1, 2]);

    form.add_participant(person(2, "Kosse Ivan"));
    let found: Vec<i64> = form.candidates(&roster, "IVA").iter().map(|p| p.id).collect();
    assert_eq!(found, vec![1]);
}

#[test]
fn test_groups_sort_letters_before_digits() {
    let groups = EntityManager::new(vec![
        group(1, "10B"),
        group(2, "Group 10"),
        group(3, "2A"),
        group(4, "Group 2"),
        group(5, "art"),
    ]);
    assert_eq!(
        visible_names(&groups),
        vec!["art", "Group 2", "Group 10", "2A", "10B"]
    );
}

#[test]
fn test_group_search_filters_by_name() {
    let mut groups = EntityManager::new(vec![group(1, "Robotics"), group(2, "Chess club")]);
    groups.set_filter(GroupFilter {
        query: "CHESS".to_string(),
    });
    assert_eq!(visible_names(&groups), vec!["Chess club"]);
}

#[test]
fn test_edit_keeps_teacher_and_sorts_participants() {
    let mut groups = EntityManager::new(vec![group(1, "Robotics")]);
    groups.open_edit(1);
    let form = groups.form_mut().unwrap();
    form.add_participant(person(4, "Sokolov Mikhail"));
    form.add_participant(person(1, "Ivanov Artem"));
    groups.commit().unwrap();

    let edited = groups.get(1).unwrap();
    assert_eq!(edited.teacher, person(3, "Petrov Petr"));
    let names: Vec<&str> = edited
        .sorted_participants()
        .iter()
        .map(|p| p.full_name.as_str())
        .collect();
    assert_eq!(names, vec!["Ivanov Artem", "Sokolov Mikhail"]);
}

#[test]
fn test_group_from_backend_payload() {
    let json = r#"{
        "id": 9,
        "group_name": "Robotics",
        "teacher": {
            "id": 3, "login": "petrov", "role": "TEACHER",
            "first_name": "Petr", "last_name": "Petrov",
            "email": "petrov@school.ru", "date_of_birth": "01.01.1980"
        },
        "students": [
            {
                "id": 1, "login": "ivanov", "role": "STUDENT",
                "first_name": "Artem", "last_name": "Ivanov",
                "email": "ivanov@school.ru", "date_of_birth": "12.09.2002"
            }
        ]
    }"#;
    let dto: GroupDto = serde_json::from_str(json).unwrap();
    let group = Group::from_dto(dto).unwrap();
    assert_eq!(group.teacher.full_name, "Petrov Petr");
    assert_eq!(group.teacher.login, "petrov");
    assert_eq!(group.participants.len(), 1);
    assert_eq!(group.participants[0].full_name, "Ivanov Artem");

    let bare: GroupDto =
        serde_json::from_str(r#"{"id": 2, "group_name": "Chess", "teacher_id": 5}"#).unwrap();
    let group = Group::from_dto(bare).unwrap();
    assert_eq!(group.teacher.id, 5);
    assert!(group.participants.is_empty());
}
