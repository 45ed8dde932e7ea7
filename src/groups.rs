use std::cmp::Ordering;
use std::collections::HashSet;

use crate::constants::MIN_PARTICIPANT_QUERY_LENGTH;
use crate::filter::{Filter, matches_query};
use crate::manager::{Entity, FieldRule, RuleContext};
use crate::models::{GroupDto, Id, PersonRef};
use crate::users::User;
use crate::utils::{cmp_ignore_case, contains_ignore_case, natural_cmp, validate_required};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub id: Id,
    pub name: String,
    pub teacher: PersonRef,
    pub participants: Vec<PersonRef>,
}

impl Group {
    /// Participants ordered by full name.
    pub fn sorted_participants(&self) -> Vec<&PersonRef> {
        let mut sorted: Vec<&PersonRef> = self.participants.iter().collect();
        sorted.sort_by(|a, b| cmp_ignore_case(&a.full_name, &b.full_name));
        sorted
    }

    pub fn has_participant(&self, id: Id) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }

    pub fn from_dto(dto: GroupDto) -> Option<Group> {
        let id = dto.id?;
        let teacher = match (dto.teacher.and_then(User::from_dto), dto.teacher_id) {
            (Some(user), _) => user.to_person(),
            (None, Some(teacher_id)) => PersonRef::new(teacher_id, ""),
            (None, None) => PersonRef::default(),
        };
        let participants = dto
            .students
            .unwrap_or_default()
            .into_iter()
            .filter_map(User::from_dto)
            .map(|user| user.to_person())
            .collect();
        Some(Group {
            id,
            name: dto.group_name,
            teacher,
            participants,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupForm {
    pub name: String,
    pub teacher: Option<PersonRef>,
    pub participants: Vec<PersonRef>,
}

impl GroupForm {
    /// Adds a participant unless already present; returns whether it was added.
    pub fn add_participant(&mut self, person: PersonRef) -> bool {
        if self.participants.iter().any(|p| p.id == person.id) {
            return false;
        }
        self.participants.push(person);
        true
    }

    pub fn remove_participant(&mut self, id: Id) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != id);
        self.participants.len() != before
    }

    /// Roster entries matching `query` that are not yet participants.
    /// Queries shorter than three characters return nothing.
    pub fn candidates<'a>(&self, roster: &'a [PersonRef], query: &str) -> Vec<&'a PersonRef> {
        let query = query.trim();
        if query.chars().count() < MIN_PARTICIPANT_QUERY_LENGTH {
            return Vec::new();
        }
        roster
            .iter()
            .filter(|s| contains_ignore_case(&s.full_name, query))
            .filter(|s| !self.participants.iter().any(|p| p.id == s.id))
            .collect()
    }
}

fn check_name(form: &GroupForm, _ctx: &RuleContext<'_, Group>) -> Result<(), String> {
    validate_required(&form.name, "Group name")
}

fn check_teacher(form: &GroupForm, _ctx: &RuleContext<'_, Group>) -> Result<(), String> {
    match form.teacher {
        Some(_) => Ok(()),
        None => Err("Select a teacher".to_string()),
    }
}

fn check_participants(form: &GroupForm, _ctx: &RuleContext<'_, Group>) -> Result<(), String> {
    let mut seen = HashSet::new();
    if form.participants.iter().all(|p| seen.insert(p.id)) {
        Ok(())
    } else {
        Err("A student can join a group only once".to_string())
    }
}

static GROUP_RULES: [FieldRule<Group>; 3] = [
    FieldRule { field: "name", check: check_name },
    FieldRule { field: "teacher", check: check_teacher },
    FieldRule { field: "participants", check: check_participants },
];

impl Entity for Group {
    const KIND: &'static str = "group";
    type Form = GroupForm;
    type Filter = GroupFilter;

    fn id(&self) -> Id {
        self.id
    }

    fn rules() -> &'static [FieldRule<Self>] {
        &GROUP_RULES
    }

    fn to_form(&self) -> GroupForm {
        GroupForm {
            name: self.name.clone(),
            teacher: Some(self.teacher.clone()),
            participants: self.participants.clone(),
        }
    }

    fn create(id: Id, form: GroupForm) -> Self {
        let mut group = Group {
            id,
            ..Group::default()
        };
        group.apply(form);
        group
    }

    fn apply(&mut self, form: GroupForm) {
        self.name = form.name.trim().to_string();
        if let Some(teacher) = form.teacher {
            self.teacher = teacher;
        }
        self.participants = form.participants;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupFilter {
    pub query: String,
}

fn starts_with_digit(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_digit())
}

impl Filter<Group> for GroupFilter {
    fn matches(&self, group: &Group) -> bool {
        matches_query(&self.query, &[group.name.as_str()])
    }

    /// Names starting with a letter first, then names starting with a digit.
    fn compare(&self, a: &Group, b: &Group) -> Ordering {
        starts_with_digit(&a.name)
            .cmp(&starts_with_digit(&b.name))
            .then_with(|| natural_cmp(&a.name, &b.name))
    }
}
