//! The catalog of list screens: which fields each entity filters, searches
//! and sorts on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tally_query::{AliasTable, Condition, SortSpec, StatusValue, Timestamp, ALL_STATUSES};
use thiserror::Error;

use crate::state::ListState;

/// An entity name that is not in the catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown entity '{0}' (expected one of: invoice, project, task, employee, customer)")]
pub struct UnknownEntity(pub String);

/// A status value that the entity does not accept.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid status '{value}' for {entity} (expected one of: {expected})")]
pub struct InvalidStatus {
    pub entity: EntityKind,
    pub value: String,
    pub expected: String,
}

/// The collections that have list screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Invoice,
    Project,
    Task,
    Employee,
    Customer,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Invoice,
        EntityKind::Project,
        EntityKind::Task,
        EntityKind::Employee,
        EntityKind::Customer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Invoice => "invoice",
            EntityKind::Project => "project",
            EntityKind::Task => "task",
            EntityKind::Employee => "employee",
            EntityKind::Customer => "customer",
        }
    }

    /// Plural label used in messages ("Failed to load invoices").
    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Invoice => "invoices",
            EntityKind::Project => "projects",
            EntityKind::Task => "tasks",
            EntityKind::Employee => "employees",
            EntityKind::Customer => "customers",
        }
    }

    /// Backend list endpoint.
    pub fn api_path(self) -> &'static str {
        match self {
            EntityKind::Invoice => "/invoices",
            EntityKind::Project => "/projects",
            EntityKind::Task => "/notion/tasks",
            EntityKind::Employee => "/team/employees",
            EntityKind::Customer => "/customers",
        }
    }

    /// Field the status filter applies to, if the entity has one.
    pub fn status_field(self) -> Option<&'static str> {
        match self {
            EntityKind::Invoice | EntityKind::Project | EntityKind::Task => Some("status"),
            EntityKind::Employee => Some("isActive"),
            EntityKind::Customer => None,
        }
    }

    /// Known status values. Empty when statuses are free-form.
    pub fn statuses(self) -> &'static [&'static str] {
        match self {
            EntityKind::Invoice => &["draft", "sent", "paid", "overdue"],
            EntityKind::Task => &["Todo", "In Progress", "Done", "Blocked"],
            EntityKind::Employee => &["active", "inactive"],
            EntityKind::Project | EntityKind::Customer => &[],
        }
    }

    pub fn search_fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::Invoice => &["invoiceNumber", "customerName", "customerEmail", "projectName"],
            EntityKind::Project => &["projectName", "projectNumber", "customerName", "description"],
            EntityKind::Task => &["title", "description"],
            EntityKind::Employee => &["fullName", "email", "role"],
            EntityKind::Customer => &["name", "email", "companyName"],
        }
    }

    /// Date field the `--from`/`--to` range applies to.
    pub fn range_field(self) -> &'static str {
        match self {
            EntityKind::Invoice => "issueDate",
            EntityKind::Project => "startDate",
            EntityKind::Task => "dueDate",
            EntityKind::Employee | EntityKind::Customer => "createdAt",
        }
    }

    pub fn default_sort(self) -> SortSpec {
        match self {
            EntityKind::Invoice => SortSpec::new().desc("issueDate"),
            EntityKind::Project => SortSpec::new().desc("createdAt"),
            EntityKind::Task => SortSpec::new().asc("dueDate"),
            EntityKind::Employee => SortSpec::new().desc("createdAt"),
            EntityKind::Customer => SortSpec::new().desc("createdAt"),
        }
    }

    /// Field holding the owning project's id, for entities listed per project.
    pub fn project_field(self) -> Option<&'static str> {
        match self {
            EntityKind::Invoice | EntityKind::Task => Some("projectId"),
            _ => None,
        }
    }

    /// Field holding the customer's id, for entities listed per customer.
    pub fn customer_field(self) -> Option<&'static str> {
        match self {
            EntityKind::Invoice => Some("customerId"),
            _ => None,
        }
    }

    /// Conditions for the overdue view: due before `today` and not done.
    ///
    /// Only tasks have one; invoices track overdue as a status.
    pub fn overdue(self, today: Timestamp) -> Option<[Condition; 2]> {
        match self {
            EntityKind::Task => Some([
                Condition::before("dueDate", today),
                Condition::not_equals("status", "Done"),
            ]),
            _ => None,
        }
    }

    /// Fields shown as table columns, in order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            EntityKind::Invoice => &["invoiceNumber", "customerName", "status", "issueDate", "total"],
            EntityKind::Project => &["projectNumber", "projectName", "customerName", "status", "startDate"],
            EntityKind::Task => &["title", "status", "priority", "dueDate"],
            EntityKind::Employee => &["fullName", "email", "role", "isActive"],
            EntityKind::Customer => &["name", "companyName", "email", "createdAt"],
        }
    }

    /// camelCase/snake_case aliases for every field this entity touches.
    pub fn aliases(self) -> AliasTable {
        let sort = self.default_sort();
        let mut fields: Vec<&str> = Vec::new();
        fields.extend(self.search_fields());
        fields.extend(self.columns());
        fields.extend(self.status_field());
        fields.extend(self.project_field());
        fields.extend(self.customer_field());
        fields.extend([self.range_field(), "createdAt", "updatedAt"]);
        fields.extend(sort.keys().iter().map(|key| key.field.as_str()));
        AliasTable::new().with_case_variants(fields)
    }

    /// Parses a user-supplied status for this entity.
    ///
    /// `all` always disables the filter. Employee statuses are booleans
    /// (`active`/`inactive`, or `true`/`false`). Entities with a fixed set of
    /// statuses accept them case-insensitively and normalize the spelling.
    pub fn parse_status(self, raw: &str) -> Result<StatusValue, InvalidStatus> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case(ALL_STATUSES) {
            return Ok(StatusValue::from(ALL_STATUSES));
        }
        let invalid = || InvalidStatus {
            entity: self,
            value: raw.to_string(),
            expected: std::iter::once(ALL_STATUSES)
                .chain(self.statuses().iter().copied())
                .collect::<Vec<_>>()
                .join(", "),
        };

        match self {
            EntityKind::Employee => match raw.to_ascii_lowercase().as_str() {
                "active" | "true" => Ok(StatusValue::Bool(true)),
                "inactive" | "false" => Ok(StatusValue::Bool(false)),
                _ => Err(invalid()),
            },
            EntityKind::Customer => Err(invalid()),
            EntityKind::Project => Ok(StatusValue::from(raw)),
            EntityKind::Invoice | EntityKind::Task => self
                .statuses()
                .iter()
                .find(|known| known.eq_ignore_ascii_case(raw))
                .map(|known| StatusValue::from(*known))
                .ok_or_else(invalid),
        }
    }

    /// Default list state for this entity's screen.
    pub fn list_state(self, page_size: usize) -> ListState {
        ListState::new(page_size).sorted_by(self.default_sort())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    /// Accepts singular and plural names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted || kind.plural() == wanted)
            .ok_or_else(|| UnknownEntity(s.to_string()))
    }
}
