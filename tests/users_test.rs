use gift_shop_admin::manager::{Change, CommitError, EntityManager, Phase};
use gift_shop_admin::models::UserDto;
use gift_shop_admin::users::{Role, User, UserFilter, UserSort};

mod common;
use common::*;

fn manager() -> EntityManager<User> {
    EntityManager::new(sample_users())
}

fn visible_ids(manager: &EntityManager<User>) -> Vec<i64> {
    manager.visible().iter().map(|u| u.id).collect()
}

#[test]
fn test_create_user_assigns_unique_id_and_derives_full_name() {
    let mut users = manager();
    let mut form = user_form("smirnova", "smirnova@mail.ru");
    form.middle_name = "Maksimovna".to_string();

    let change = users.commit_create(form).expect("valid form commits");
    assert_eq!(change, Change::Created(5));

    let created = users.get(5).expect("created user is stored");
    assert_eq!(created.full_name, "Smirnova Anna Maksimovna");
    assert_eq!(created.coins, 0);
    assert_eq!(users.items().iter().filter(|u| u.id == 5).count(), 1);
}

#[test]
fn test_duplicate_login_is_rejected() {
    let mut users = manager();
    let before = users.items().to_vec();

    let result = users.commit_create(user_form("ivanov", "fresh@mail.ru"));

    let Err(CommitError::Invalid(errors)) = result else {
        panic!("expected validation failure, got {:?}", result);
    };
    assert_eq!(errors.get("login"), Some("Login is already taken"));
    assert_eq!(errors.len(), 1);
    assert_eq!(users.items(), before.as_slice());
}

#[test]
fn test_duplicate_email_is_rejected() {
    let mut users = manager();
    let result = users.commit_create(user_form("fresh", "petrov@mail.ru"));
    assert!(matches!(result, Err(CommitError::Invalid(ref e)) if e.contains("email")));
}

#[test]
fn test_editing_user_may_keep_own_login_and_email() {
    let mut users = manager();
    assert!(users.open_edit(1));
    let form = users.form_mut().expect("edit form is open");
    form.first_name = "Artyom".to_string();

    assert_eq!(users.commit(), Ok(Change::Updated(1)));
    let edited = users.get(1).unwrap();
    assert_eq!(edited.login, "ivanov");
    assert_eq!(edited.full_name, "Ivanov Artyom");
}

#[test]
fn test_editing_user_to_taken_login_fails() {
    let mut users = manager();
    users.open_edit(1);
    users.form_mut().unwrap().login = "kosse".to_string();

    assert!(users.commit().is_err());
    assert_eq!(users.errors().get("login"), Some("Login is already taken"));
    assert!(matches!(users.phase(), Phase::Editing { id: 1, .. }));
    assert_eq!(users.get(1).unwrap().login, "ivanov");
}

#[test]
fn test_empty_form_reports_every_invalid_field() {
    let users = manager();
    let errors = users.validate(&Default::default());
    let fields: Vec<&str> = errors.fields().collect();
    assert_eq!(
        fields,
        vec!["login", "password", "first_name", "last_name", "email", "birth_date"]
    );
}

#[test]
fn test_password_only_required_on_create() {
    let mut users = manager();
    let mut form = user_form("newbie", "newbie@mail.ru");
    form.password = "abc".to_string();
    let errors = users.validate(&form);
    assert!(errors.get("password").unwrap().contains("at least 4"));

    users.open_edit(2);
    let mut edit = users.form().unwrap().clone();
    edit.password.clear();
    assert!(users.validate(&edit).is_empty());
}

#[test]
fn test_format_rules() {
    let users = manager();
    let mut form = user_form("bad login!", "not-an-email");
    form.first_name = "Anna1".to_string();
    form.middle_name = "M.".to_string();
    form.birth_date = "31.02.2020".to_string();

    let errors = users.validate(&form);
    assert!(errors.contains("login"));
    assert!(errors.contains("first_name"));
    assert!(errors.contains("middle_name"));
    assert_eq!(errors.get("email"), Some("Invalid email format"));
    assert_eq!(errors.get("birth_date"), Some("Birth date is not a valid calendar date"));

    let mut cyrillic = user_form("ivan2", "ivan2@mail.ru");
    cyrillic.first_name = "Иван".to_string();
    cyrillic.last_name = "Коссе".to_string();
    assert!(users.validate(&cyrillic).is_empty());
}

#[test]
fn test_update_preserves_server_owned_coins() {
    let mut users = manager();
    users.open_edit(4);
    users.form_mut().unwrap().role = Role::Teacher;
    users.commit().unwrap();

    let edited = users.get(4).unwrap();
    assert_eq!(edited.coins, 23);
    assert_eq!(edited.role, Role::Teacher);
}

#[test]
fn test_filter_by_role_query_and_sort() {
    let mut users = manager();
    assert_eq!(visible_ids(&users), vec![1, 2, 4]);

    users.filter_mut().query = "IVA".to_string();
    assert_eq!(visible_ids(&users), vec![1, 2]);

    users.set_filter(UserFilter {
        role: Role::Teacher,
        ..UserFilter::default()
    });
    assert_eq!(visible_ids(&users), vec![3]);

    users.set_filter(UserFilter {
        sort: UserSort::Added,
        ..UserFilter::default()
    });
    users.commit_create(user_form("abramov", "abramov@mail.ru")).unwrap();
    assert_eq!(visible_ids(&users), vec![1, 2, 4, 5]);

    users.filter_mut().sort = UserSort::Name;
    assert_eq!(visible_ids(&users), vec![1, 2, 5, 4]);
}

#[test]
fn test_same_filter_twice_yields_same_subset() {
    let mut users = manager();
    let filter = UserFilter {
        query: "ov".to_string(),
        ..UserFilter::default()
    };
    users.set_filter(filter.clone());
    let first = visible_ids(&users);
    users.set_filter(filter);
    assert_eq!(visible_ids(&users), first);
}

#[test]
fn test_delete_user_clears_selection() {
    let mut users = manager();
    users.select(2);
    assert_eq!(users.commit_delete(2), Ok(Change::Deleted(2)));
    assert!(users.get(2).is_none());
    assert!(users.selected().is_none());
    assert_eq!(users.len(), 3);
}

#[test]
fn test_user_dto_round_trip_with_backend_shapes() {
    let json = r#"{
        "id": 7,
        "login": "teacher1",
        "role": "TEACHER",
        "first_name": "Petr",
        "last_name": "Petrov",
        "middle_name": "",
        "email": "petrov@school.ru",
        "date_of_birth": "01.01.1980",
        "coins": 12
    }"#;
    let dto: UserDto = serde_json::from_str(json).expect("backend user parses");
    let user = User::from_dto(dto).expect("persisted user has an id");
    assert_eq!(user.role, Role::Teacher);
    assert_eq!(user.full_name, "Petrov Petr");
    assert_eq!(user.middle_name, None);
    assert_eq!(user.coins, 12);

    let outgoing = serde_json::to_value(user_form("anna", "anna@mail.ru").to_dto()).unwrap();
    assert_eq!(outgoing["role"], "STUDENT");
    assert_eq!(outgoing["date_of_birth"], "01.03.2005");
    assert!(outgoing.get("id").is_none());
    assert!(outgoing.get("middle_name").is_none());
}

#[test]
fn test_blank_middle_name_is_dropped() {
    let mut users = manager();
    let mut form = user_form("smirnova", "smirnova@mail.ru");
    form.middle_name = "   ".to_string();

    assert_eq!(users.commit_create(form), Ok(Change::Created(5)));
    let created = users.get(5).unwrap();
    assert_eq!(created.middle_name, None);
    assert_eq!(created.full_name, "Smirnova Anna");
}
