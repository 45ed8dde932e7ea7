//! Read-only redemption history with group and teacher facets.

use std::collections::BTreeSet;

use crate::filter::Facet;
use crate::models::Id;

/// One coin award. Records are never edited or removed once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: Id,
    pub student: String,
    pub teacher: String,
    pub group: String,
    /// `DD.MM.YYYY`
    pub date: String,
    pub coins: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub groups: Facet<String>,
    pub teachers: Facet<String>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &HistoryRecord) -> bool {
        self.groups.contains(&record.group) && self.teachers.contains(&record.teacher)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    records: Vec<HistoryRecord>,
    filter: HistoryFilter,
}

impl HistoryLog {
    /// Starts with every known group and teacher selected.
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        let filter = HistoryFilter {
            groups: Facet::all_of(records.iter().map(|r| r.group.clone())),
            teachers: Facet::all_of(records.iter().map(|r| r.teacher.clone())),
        };
        Self { records, filter }
    }

    /// Appends a record under the next free id. Facet values seen for the
    /// first time start out selected.
    pub fn append(
        &mut self,
        student: impl Into<String>,
        teacher: impl Into<String>,
        group: impl Into<String>,
        date: impl Into<String>,
        coins: u32,
    ) -> Id {
        let record = HistoryRecord {
            id: self.records.iter().map(|r| r.id).max().unwrap_or(0) + 1,
            student: student.into(),
            teacher: teacher.into(),
            group: group.into(),
            date: date.into(),
            coins,
        };
        if !self.records.iter().any(|r| r.group == record.group) {
            self.filter.groups.select(record.group.clone());
        }
        if !self.records.iter().any(|r| r.teacher == record.teacher) {
            self.filter.teachers.select(record.teacher.clone());
        }
        let id = record.id;
        self.records.push(record);
        id
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn filter(&self) -> &HistoryFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: HistoryFilter) {
        self.filter = filter;
    }

    pub fn toggle_group(&mut self, group: &str) -> bool {
        self.filter.groups.toggle(group.to_string())
    }

    pub fn toggle_teacher(&mut self, teacher: &str) -> bool {
        self.filter.teachers.toggle(teacher.to_string())
    }

    /// Distinct group names, sorted.
    pub fn groups(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.group.as_str()).collect();
        set.into_iter().collect()
    }

    /// Distinct teacher names, sorted.
    pub fn teachers(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.teacher.as_str()).collect();
        set.into_iter().collect()
    }

    pub fn visible(&self) -> Vec<&HistoryRecord> {
        self.records
            .iter()
            .filter(|record| self.filter.matches(record))
            .collect()
    }

    pub fn total_coins(&self) -> u64 {
        self.visible().iter().map(|r| u64::from(r.coins)).sum()
    }
}
