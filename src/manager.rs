//! Generic list-management core shared by every admin screen.
//!
//! An [`EntityManager`] owns one collection of records together with the
//! filter, the current selection and the transient form being edited. All
//! mutations go through validated commits; a commit either writes the whole
//! record or changes nothing.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::filter::Filter;
use crate::models::Id;

/// A record type the manager can hold.
pub trait Entity: Clone + 'static {
    /// Human-readable kind used in logs and errors.
    const KIND: &'static str;

    type Form: Clone + Default + fmt::Debug;
    type Filter: Filter<Self>;

    fn id(&self) -> Id;

    /// Field rules, evaluated in order on every validation.
    fn rules() -> &'static [FieldRule<Self>];

    fn to_form(&self) -> Self::Form;

    fn create(id: Id, form: Self::Form) -> Self;

    /// Overwrites the form-owned fields, leaving every other field intact.
    fn apply(&mut self, form: Self::Form);
}

/// One entry of an entity's rule table.
///
/// `check` reports the first failing condition for its field.
pub struct FieldRule<E: Entity> {
    pub field: &'static str,
    pub check: fn(&E::Form, &RuleContext<'_, E>) -> Result<(), String>,
}

/// What a rule can see besides the form: the committed records and the
/// record under edit, if any.
pub struct RuleContext<'a, E> {
    items: &'a [E],
    editing: Option<Id>,
}

impl<'a, E: Entity> RuleContext<'a, E> {
    pub fn new(items: &'a [E], editing: Option<Id>) -> Self {
        Self { items, editing }
    }

    pub fn editing(&self) -> Option<Id> {
        self.editing
    }

    pub fn is_creating(&self) -> bool {
        self.editing.is_none()
    }

    /// Every committed record except the one being edited.
    pub fn others(&self) -> impl Iterator<Item = &'a E> {
        let editing = self.editing;
        self.items
            .iter()
            .filter(move |item| Some(item.id()) != editing)
    }
}

/// Field name to message, in rule order. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<(&'static str, String)>);

impl ValidationErrors {
    pub fn insert(&mut self, field: &'static str, message: String) {
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = message,
            None => self.0.push((field, message)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(name, message)| (*name, message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

/// Runs every rule of `E` against `form`. Rules never short-circuit each other.
pub fn validate_form<E: Entity>(form: &E::Form, ctx: &RuleContext<'_, E>) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    for rule in E::rules() {
        if let Err(message) = (rule.check)(form, ctx) {
            errors.insert(rule.field, message);
        }
    }
    errors
}

/// Edit state of the manager.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<F> {
    Idle,
    Creating(F),
    Editing { id: Id, form: F },
}

/// Emitted after every successful mutation of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Created(Id),
    Updated(Id),
    Deleted(Id),
    Replaced(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommitError {
    #[error("validation failed: {0}")]
    Invalid(ValidationErrors),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Id },
    #[error("no {kind} form is open")]
    NoOpenForm { kind: &'static str },
    #[error("another {kind} form is open")]
    FormOpen { kind: &'static str },
}

type Listener = Box<dyn FnMut(&Change)>;

pub struct EntityManager<E: Entity> {
    items: Vec<E>,
    filter: E::Filter,
    selection: Option<Id>,
    phase: Phase<E::Form>,
    errors: ValidationErrors,
    listeners: Vec<Listener>,
}

impl<E: Entity> Default for EntityManager<E> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<E: Entity> EntityManager<E> {
    pub fn new(items: Vec<E>) -> Self {
        Self {
            items,
            filter: E::Filter::default(),
            selection: None,
            phase: Phase::Idle,
            errors: ValidationErrors::default(),
            listeners: Vec::new(),
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Id) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn position(&self, id: Id) -> Result<usize, CommitError> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(CommitError::NotFound { kind: E::KIND, id })
    }

    pub fn next_id(&self) -> Id {
        self.items.iter().map(|item| item.id()).max().unwrap_or(0) + 1
    }

    /// Registers a callback invoked after each committed change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Change) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, change: Change) {
        debug!(kind = E::KIND, ?change, "collection changed");
        for listener in self.listeners.iter_mut() {
            listener(&change);
        }
    }

    // Filtering

    pub fn filter(&self) -> &E::Filter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut E::Filter {
        &mut self.filter
    }

    pub fn set_filter(&mut self, filter: E::Filter) {
        self.filter = filter;
    }

    /// Records passing the current filter, in the filter's order.
    pub fn visible(&self) -> Vec<&E> {
        let mut visible: Vec<&E> = self
            .items
            .iter()
            .filter(|item| self.filter.matches(item))
            .collect();
        visible.sort_by(|a, b| self.filter.compare(a, b));
        visible
    }

    // Selection

    /// Selects `id`; unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: Id) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selection = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<Id> {
        self.selection
    }

    pub fn selected(&self) -> Option<&E> {
        self.selection.and_then(|id| self.get(id))
    }

    // Form state

    pub fn phase(&self) -> &Phase<E::Form> {
        &self.phase
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn form(&self) -> Option<&E::Form> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Creating(form) | Phase::Editing { form, .. } => Some(form),
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut E::Form> {
        match &mut self.phase {
            Phase::Idle => None,
            Phase::Creating(form) | Phase::Editing { form, .. } => Some(form),
        }
    }

    fn editing_id(&self) -> Option<Id> {
        match &self.phase {
            Phase::Editing { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Whether a commit for `target` (`None` for a new record) may take over
    /// the open form. An idle manager accepts any commit.
    fn accepts(&self, target: Option<Id>) -> bool {
        match (&self.phase, target) {
            (Phase::Idle, _) | (Phase::Creating(_), None) => true,
            (Phase::Editing { id, .. }, Some(target)) => *id == target,
            _ => false,
        }
    }

    pub fn open_create(&mut self) {
        self.phase = Phase::Creating(E::Form::default());
        self.errors = ValidationErrors::default();
    }

    /// Loads the record into the form and selects it. Unknown ids are ignored.
    pub fn open_edit(&mut self, id: Id) -> bool {
        let Some(item) = self.get(id) else {
            return false;
        };
        let form = item.to_form();
        self.selection = Some(id);
        self.phase = Phase::Editing { id, form };
        self.errors = ValidationErrors::default();
        true
    }

    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
        self.errors = ValidationErrors::default();
    }

    /// Validates `form` against the collection, excluding the record
    /// currently open for editing from uniqueness checks.
    pub fn validate(&self, form: &E::Form) -> ValidationErrors {
        validate_form(form, &RuleContext::new(&self.items, self.editing_id()))
    }

    fn reject(&mut self, editing: Option<Id>, form: E::Form, errors: ValidationErrors) -> CommitError {
        debug!(kind = E::KIND, ?editing, %errors, "commit rejected");
        self.phase = match editing {
            Some(id) => Phase::Editing { id, form },
            None => Phase::Creating(form),
        };
        self.errors = errors.clone();
        CommitError::Invalid(errors)
    }

    fn settle(&mut self) {
        self.phase = Phase::Idle;
        self.errors = ValidationErrors::default();
    }

    // Commits

    /// Validates and appends a new record. Refused with `FormOpen` while a
    /// record is open for editing, so that edit is never overwritten.
    pub fn commit_create(&mut self, form: E::Form) -> Result<Change, CommitError> {
        if !self.accepts(None) {
            return Err(CommitError::FormOpen { kind: E::KIND });
        }
        let errors = validate_form(&form, &RuleContext::new(&self.items, None));
        if !errors.is_empty() {
            return Err(self.reject(None, form, errors));
        }

        let id = self.next_id();
        self.items.push(E::create(id, form));
        self.settle();
        self.notify(Change::Created(id));
        Ok(Change::Created(id))
    }

    /// Validates and applies `form` to record `id`. Refused with `FormOpen`
    /// while a different form is open.
    pub fn commit_update(&mut self, id: Id, form: E::Form) -> Result<Change, CommitError> {
        let pos = self.position(id)?;
        if !self.accepts(Some(id)) {
            return Err(CommitError::FormOpen { kind: E::KIND });
        }
        let errors = validate_form(&form, &RuleContext::new(&self.items, Some(id)));
        if !errors.is_empty() {
            return Err(self.reject(Some(id), form, errors));
        }

        self.items[pos].apply(form);
        self.settle();
        self.notify(Change::Updated(id));
        Ok(Change::Updated(id))
    }

    /// Commits whichever form is open.
    pub fn commit(&mut self) -> Result<Change, CommitError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => Err(CommitError::NoOpenForm { kind: E::KIND }),
            Phase::Creating(form) => self.commit_create(form),
            Phase::Editing { id, form } => {
                let result = self.commit_update(id, form.clone());
                if matches!(result, Err(CommitError::NotFound { .. })) {
                    self.phase = Phase::Editing { id, form };
                }
                result
            }
        }
    }

    pub fn commit_delete(&mut self, id: Id) -> Result<Change, CommitError> {
        let pos = self.position(id)?;
        self.items.remove(pos);
        if self.selection == Some(id) {
            self.selection = None;
        }
        if self.editing_id() == Some(id) {
            self.settle();
        }
        self.notify(Change::Deleted(id));
        Ok(Change::Deleted(id))
    }

    /// Applies a direct field change that bypasses the form, such as a
    /// workflow transition.
    pub fn modify<F>(&mut self, id: Id, f: F) -> Result<Change, CommitError>
    where
        F: FnOnce(&mut E),
    {
        let pos = self.position(id)?;
        f(&mut self.items[pos]);
        self.notify(Change::Updated(id));
        Ok(Change::Updated(id))
    }

    /// Inserts or replaces a record whose identifier was assigned elsewhere.
    pub fn upsert(&mut self, record: E) -> Change {
        let id = record.id();
        let change = match self.items.iter().position(|item| item.id() == id) {
            Some(pos) => {
                self.items[pos] = record;
                Change::Updated(id)
            }
            None => {
                self.items.push(record);
                Change::Created(id)
            }
        };
        self.notify(change);
        change
    }

    /// Swaps in a freshly loaded collection, dropping a stale selection.
    pub fn replace_all(&mut self, items: Vec<E>) -> Change {
        self.items = items;
        if self.selection.is_some_and(|id| self.get(id).is_none()) {
            self.selection = None;
        }
        if self.editing_id().is_some_and(|id| self.get(id).is_none()) {
            self.settle();
        }
        let change = Change::Replaced(self.items.len());
        self.notify(change);
        change
    }
}
