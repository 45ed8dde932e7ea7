use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::filter::{Filter, matches_query};
use crate::manager::{Entity, FieldRule, RuleContext};
use crate::models::{Id, PersonRef, UserDto};
use crate::utils::{
    cmp_ignore_case, email_regex, login_regex, validate_date, validate_pattern,
    validate_person_name, validate_required,
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Admin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Id,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub full_name: String,
    pub email: String,
    pub birth_date: String,
    pub role: Role,
    /// Server-owned coin balance.
    pub coins: u32,
}

/// "last first[ middle]"
pub fn full_name(first: &str, last: &str, middle: Option<&str>) -> String {
    match middle.filter(|m| !m.is_empty()) {
        Some(middle) => format!("{} {} {}", last, first, middle),
        None => format!("{} {}", last, first),
    }
}

impl User {
    pub fn to_person(&self) -> PersonRef {
        PersonRef {
            id: self.id,
            full_name: self.full_name.clone(),
            login: self.login.clone(),
        }
    }

    /// Converts a backend user. Records without an id are not yet persisted
    /// and are skipped.
    pub fn from_dto(dto: UserDto) -> Option<User> {
        let id = dto.id?;
        let middle_name = dto.middle_name.filter(|m| !m.is_empty());
        let full_name = dto.full_name.unwrap_or_else(|| {
            full_name(&dto.first_name, &dto.last_name, middle_name.as_deref())
        });
        Some(User {
            id,
            login: dto.login,
            first_name: dto.first_name,
            last_name: dto.last_name,
            middle_name,
            full_name,
            email: dto.email,
            birth_date: dto.date_of_birth,
            role: dto.role,
            coins: dto.coins.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserForm {
    pub login: String,
    /// Only checked when creating; edits never change the password.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub role: Role,
    pub email: String,
    pub birth_date: String,
}

impl UserForm {
    pub fn to_dto(&self) -> UserDto {
        UserDto {
            id: None,
            login: self.login.clone(),
            password: Some(self.password.clone()).filter(|p| !p.is_empty()),
            role: self.role,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            middle_name: Some(self.middle_name.clone()).filter(|m| !m.is_empty()),
            full_name: None,
            email: self.email.clone(),
            date_of_birth: self.birth_date.clone(),
            coins: None,
        }
    }
}

fn check_login(form: &UserForm, ctx: &RuleContext<'_, User>) -> Result<(), String> {
    validate_required(&form.login, "Login")?;
    validate_pattern(
        &form.login,
        login_regex(),
        "Login may contain only Latin letters and digits",
    )?;
    if ctx.others().any(|u| u.login == form.login) {
        return Err("Login is already taken".to_string());
    }
    Ok(())
}

fn check_password(form: &UserForm, ctx: &RuleContext<'_, User>) -> Result<(), String> {
    if !ctx.is_creating() {
        return Ok(());
    }
    validate_required(&form.password, "Password")?;
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

fn check_first_name(form: &UserForm, _ctx: &RuleContext<'_, User>) -> Result<(), String> {
    validate_person_name(&form.first_name, "First name")
}

fn check_last_name(form: &UserForm, _ctx: &RuleContext<'_, User>) -> Result<(), String> {
    validate_person_name(&form.last_name, "Last name")
}

fn check_middle_name(form: &UserForm, _ctx: &RuleContext<'_, User>) -> Result<(), String> {
    if form.middle_name.trim().is_empty() {
        return Ok(());
    }
    validate_person_name(&form.middle_name, "Middle name")
}

fn check_email(form: &UserForm, ctx: &RuleContext<'_, User>) -> Result<(), String> {
    validate_required(&form.email, "Email")?;
    validate_pattern(&form.email, email_regex(), "Invalid email format")?;
    if ctx.others().any(|u| u.email == form.email) {
        return Err("Email is already taken".to_string());
    }
    Ok(())
}

fn check_birth_date(form: &UserForm, _ctx: &RuleContext<'_, User>) -> Result<(), String> {
    validate_date(&form.birth_date, "Birth date")
}

static USER_RULES: [FieldRule<User>; 7] = [
    FieldRule { field: "login", check: check_login },
    FieldRule { field: "password", check: check_password },
    FieldRule { field: "first_name", check: check_first_name },
    FieldRule { field: "last_name", check: check_last_name },
    FieldRule { field: "middle_name", check: check_middle_name },
    FieldRule { field: "email", check: check_email },
    FieldRule { field: "birth_date", check: check_birth_date },
];

impl Entity for User {
    const KIND: &'static str = "user";
    type Form = UserForm;
    type Filter = UserFilter;

    fn id(&self) -> Id {
        self.id
    }

    fn rules() -> &'static [FieldRule<Self>] {
        &USER_RULES
    }

    fn to_form(&self) -> UserForm {
        UserForm {
            login: self.login.clone(),
            password: String::new(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            middle_name: self.middle_name.clone().unwrap_or_default(),
            role: self.role,
            email: self.email.clone(),
            birth_date: self.birth_date.clone(),
        }
    }

    fn create(id: Id, form: UserForm) -> Self {
        let mut user = User {
            id,
            login: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            middle_name: None,
            full_name: String::new(),
            email: String::new(),
            birth_date: String::new(),
            role: Role::default(),
            coins: 0,
        };
        user.apply(form);
        user
    }

    fn apply(&mut self, form: UserForm) {
        let middle_name = Some(form.middle_name.trim().to_string()).filter(|m| !m.is_empty());
        self.full_name = full_name(&form.first_name, &form.last_name, middle_name.as_deref());
        self.login = form.login;
        self.first_name = form.first_name;
        self.last_name = form.last_name;
        self.middle_name = middle_name;
        self.email = form.email;
        self.birth_date = form.birth_date;
        self.role = form.role;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserSort {
    #[default]
    Name,
    /// Order of creation.
    Added,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub role: Role,
    pub query: String,
    pub sort: UserSort,
}

impl Filter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        user.role == self.role && matches_query(&self.query, &[user.full_name.as_str(), user.login.as_str()])
    }

    fn compare(&self, a: &User, b: &User) -> Ordering {
        match self.sort {
            UserSort::Name => cmp_ignore_case(&a.full_name, &b.full_name),
            UserSort::Added => a.id.cmp(&b.id),
        }
    }
}
