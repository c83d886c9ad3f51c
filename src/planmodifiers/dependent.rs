//! Invalidation of server-computed fields.
//!
//! A dependent field is rendered by the server from one or more source
//! fields, e.g. `description_html` from `description`. When a source
//! changes between prior state and the baseline plan, the dependent becomes
//! unknown. Bookkeeping fields such as `updated_at` become unknown whenever
//! anything changes at all.
//!
//! Edge tables are `const` and checked acyclic at compile time. Several
//! edges may share a dependent; every write is the same unknown, so the
//! order of edges does not matter.

use tracing::debug;

use crate::models::{ComponentModel, GroupModel, IssueModel, IssueTemplateModel, IssueUpdateModel};
use crate::value::Value;

/// Largest edge table [`is_acyclic`] can check.
pub const MAX_EDGES: usize = 32;

/// One source to dependent relation.
pub struct Edge<R> {
    /// Source field name.
    pub source: &'static str,
    /// Dependent field name.
    pub dependent: &'static str,
    /// Whether the source differs between `(state, baseline)`.
    pub changed: fn(&R, &R) -> bool,
    /// Marks the dependent unknown in the plan.
    pub invalidate: fn(&mut R),
}

/// A field invalidated by any change to the resource.
pub struct Bookkeeping<R> {
    /// Field name.
    pub field: &'static str,
    /// Marks the field unknown in the plan.
    pub invalidate: fn(&mut R),
}

/// Per-resource invalidation rules.
pub struct Invalidator<R: 'static> {
    /// Source to dependent edges.
    pub edges: &'static [Edge<R>],
    /// Fields invalidated by any change.
    pub bookkeeping: &'static [Bookkeeping<R>],
}

impl<R: PartialEq + 'static> Invalidator<R> {
    /// Runs every edge in a single pass, then the bookkeeping rule.
    ///
    /// Sources are read from `state` and `baseline` only; `plan` is
    /// written. Returns the names of the fields marked unknown.
    pub fn apply(&self, state: &R, baseline: &R, plan: &mut R) -> Vec<&'static str> {
        let mut invalidated = Vec::new();

        for edge in self.edges {
            if (edge.changed)(state, baseline) {
                debug!(
                    source = edge.source,
                    dependent = edge.dependent,
                    "Source changed, dependent becomes unknown"
                );
                (edge.invalidate)(plan);
                if !invalidated.contains(&edge.dependent) {
                    invalidated.push(edge.dependent);
                }
            }
        }

        if state != baseline {
            for field in self.bookkeeping {
                (field.invalidate)(plan);
                if !invalidated.contains(&field.field) {
                    invalidated.push(field.field);
                }
            }
        }

        invalidated
    }
}

/// Whether a source changed, ignoring a plan value that is not known yet.
#[must_use]
pub fn source_changed<T: PartialEq>(state: &Value<T>, baseline: &Value<T>) -> bool {
    !baseline.is_unknown() && state != baseline
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Checks that an edge table has no cycle.
///
/// Repeatedly removes edges whose source is not the dependent of any
/// remaining edge; a table is acyclic when every edge can be removed.
#[must_use]
pub const fn is_acyclic<R>(edges: &[Edge<R>]) -> bool {
    assert!(edges.len() <= MAX_EDGES, "edge table too large");

    let mut removed = [false; MAX_EDGES];
    let mut remaining = edges.len();

    while remaining > 0 {
        let mut progressed = false;
        let mut i = 0;
        while i < edges.len() {
            if !removed[i] {
                let mut fed = false;
                let mut j = 0;
                while j < edges.len() {
                    if !removed[j] && str_eq(edges[j].dependent, edges[i].source) {
                        fed = true;
                    }
                    j += 1;
                }
                if !fed {
                    removed[i] = true;
                    remaining -= 1;
                    progressed = true;
                }
            }
            i += 1;
        }
        if !progressed {
            return false;
        }
    }

    true
}

/// Component rules.
pub const COMPONENT: Invalidator<ComponentModel> = Invalidator {
    edges: &[
        Edge {
            source: "description",
            dependent: "description_html",
            changed: |s, p| source_changed(&s.description, &p.description),
            invalidate: |p| p.description_html.set_unknown(),
        },
        Edge {
            source: "description",
            dependent: "description_html_translations",
            changed: |s, p| source_changed(&s.description, &p.description),
            invalidate: |p| p.description_html_translations.set_unknown(),
        },
        Edge {
            source: "description_translations",
            dependent: "description_html",
            changed: |s, p| {
                source_changed(&s.description_translations, &p.description_translations)
            },
            invalidate: |p| p.description_html.set_unknown(),
        },
        Edge {
            source: "description_translations",
            dependent: "description_html_translations",
            changed: |s, p| {
                source_changed(&s.description_translations, &p.description_translations)
            },
            invalidate: |p| p.description_html_translations.set_unknown(),
        },
    ],
    bookkeeping: &[
        Bookkeeping {
            field: "updated_at",
            invalidate: |p| p.updated_at.set_unknown(),
        },
        Bookkeeping {
            field: "last_event_at",
            invalidate: |p| p.last_event_at.set_unknown(),
        },
        Bookkeeping {
            field: "percent_uptime",
            invalidate: |p| p.percent_uptime.set_unknown(),
        },
    ],
};

/// Group rules.
pub const GROUP: Invalidator<GroupModel> = Invalidator {
    edges: &[
        Edge {
            source: "description",
            dependent: "description_html",
            changed: |s, p| source_changed(&s.description, &p.description),
            invalidate: |p| p.description_html.set_unknown(),
        },
        Edge {
            source: "description",
            dependent: "description_html_translations",
            changed: |s, p| source_changed(&s.description, &p.description),
            invalidate: |p| p.description_html_translations.set_unknown(),
        },
        Edge {
            source: "description_translations",
            dependent: "description_html",
            changed: |s, p| {
                source_changed(&s.description_translations, &p.description_translations)
            },
            invalidate: |p| p.description_html.set_unknown(),
        },
        Edge {
            source: "description_translations",
            dependent: "description_html_translations",
            changed: |s, p| {
                source_changed(&s.description_translations, &p.description_translations)
            },
            invalidate: |p| p.description_html_translations.set_unknown(),
        },
    ],
    bookkeeping: &[Bookkeeping {
        field: "updated_at",
        invalidate: |p| p.updated_at.set_unknown(),
    }],
};

fn starts_at(issue: &IssueModel) -> Value<&String> {
    issue
        .schedule
        .as_ref()
        .map_or(Value::Null, |schedule| schedule.starts_at.as_ref())
}

/// Issue rules.
pub const ISSUE: Invalidator<IssueModel> = Invalidator {
    edges: &[
        Edge {
            source: "body",
            dependent: "body_html",
            changed: |s, p| source_changed(&s.body, &p.body),
            invalidate: |p| p.body_html.set_unknown(),
        },
        Edge {
            source: "body",
            dependent: "body_html_translations",
            changed: |s, p| source_changed(&s.body, &p.body),
            invalidate: |p| p.body_html_translations.set_unknown(),
        },
        Edge {
            source: "body_translations",
            dependent: "body_html",
            changed: |s, p| source_changed(&s.body_translations, &p.body_translations),
            invalidate: |p| p.body_html.set_unknown(),
        },
        Edge {
            source: "body_translations",
            dependent: "body_html_translations",
            changed: |s, p| source_changed(&s.body_translations, &p.body_translations),
            invalidate: |p| p.body_html_translations.set_unknown(),
        },
        Edge {
            source: "schedule.starts_at",
            dependent: "began_at",
            changed: |s, p| source_changed(&starts_at(s), &starts_at(p)),
            invalidate: |p| p.began_at.set_unknown(),
        },
    ],
    bookkeeping: &[
        Bookkeeping {
            field: "updated_at",
            invalidate: |p| p.updated_at.set_unknown(),
        },
        Bookkeeping {
            field: "duration",
            invalidate: |p| p.duration.set_unknown(),
        },
    ],
};

/// Issue update rules.
pub const ISSUE_UPDATE: Invalidator<IssueUpdateModel> = Invalidator {
    edges: &[
        Edge {
            source: "body",
            dependent: "body_html",
            changed: |s, p| source_changed(&s.body, &p.body),
            invalidate: |p| p.body_html.set_unknown(),
        },
        Edge {
            source: "body",
            dependent: "body_html_translations",
            changed: |s, p| source_changed(&s.body, &p.body),
            invalidate: |p| p.body_html_translations.set_unknown(),
        },
        Edge {
            source: "body_translations",
            dependent: "body_html",
            changed: |s, p| source_changed(&s.body_translations, &p.body_translations),
            invalidate: |p| p.body_html.set_unknown(),
        },
        Edge {
            source: "body_translations",
            dependent: "body_html_translations",
            changed: |s, p| source_changed(&s.body_translations, &p.body_translations),
            invalidate: |p| p.body_html_translations.set_unknown(),
        },
        Edge {
            source: "effective_after",
            dependent: "effective",
            changed: |s, p| source_changed(&s.effective_after, &p.effective_after),
            invalidate: |p| p.effective.set_unknown(),
        },
    ],
    bookkeeping: &[Bookkeeping {
        field: "updated_at",
        invalidate: |p| p.updated_at.set_unknown(),
    }],
};

/// Issue template rules.
pub const ISSUE_TEMPLATE: Invalidator<IssueTemplateModel> = Invalidator {
    edges: &[],
    bookkeeping: &[Bookkeeping {
        field: "updated_at",
        invalidate: |p| p.updated_at.set_unknown(),
    }],
};

const _: () = assert!(is_acyclic(COMPONENT.edges));
const _: () = assert!(is_acyclic(GROUP.edges));
const _: () = assert!(is_acyclic(ISSUE.edges));
const _: () = assert!(is_acyclic(ISSUE_UPDATE.edges));
const _: () = assert!(is_acyclic(ISSUE_TEMPLATE.edges));

#[cfg(test)]
mod tests {
    use super::*;

    fn component() -> ComponentModel {
        ComponentModel {
            description: Value::Known(String::from("Old")),
            description_html: Value::Known(String::from("<p>Old</p>")),
            updated_at: Value::Known(String::from("2024-01-01T00:00:00Z")),
            percent_uptime: Value::Known(99.0),
            ..ComponentModel::default()
        }
    }

    #[test]
    fn test_description_change_invalidates_html() {
        let state = component();
        let baseline = ComponentModel {
            description: Value::Known(String::from("New")),
            ..state.clone()
        };
        let mut plan = baseline.clone();

        let invalidated = COMPONENT.apply(&state, &baseline, &mut plan);

        assert!(plan.description_html.is_unknown());
        assert!(plan.description_html_translations.is_unknown());
        assert!(plan.updated_at.is_unknown());
        assert!(plan.percent_uptime.is_unknown());
        assert_eq!(plan.description, Value::Known(String::from("New")));
        assert!(invalidated.contains(&"description_html"));
        assert_eq!(
            invalidated.iter().filter(|f| **f == "description_html").count(),
            1
        );
    }

    #[test]
    fn test_no_change_keeps_prior_values() {
        let state = component();
        let baseline = state.clone();
        let mut plan = baseline.clone();

        assert!(COMPONENT.apply(&state, &baseline, &mut plan).is_empty());
        assert_eq!(plan, state);
    }

    #[test]
    fn test_unknown_source_does_not_propagate() {
        let state = component();
        let baseline = ComponentModel {
            description: Value::Unknown,
            ..state.clone()
        };
        let mut plan = baseline.clone();

        COMPONENT.apply(&state, &baseline, &mut plan);
        assert_eq!(plan.description_html, state.description_html);
        assert!(plan.updated_at.is_unknown());
    }

    #[test]
    fn test_schedule_start_invalidates_began_at() {
        let state = IssueModel {
            began_at: Value::Known(String::from("2024-05-01T10:00:00Z")),
            schedule: Some(crate::models::ScheduleModel {
                starts_at: Value::Known(String::from("2024-05-01T10:00:00Z")),
                ..Default::default()
            }),
            ..IssueModel::default()
        };
        let mut baseline = state.clone();
        if let Some(schedule) = baseline.schedule.as_mut() {
            schedule.starts_at = Value::Known(String::from("2024-05-02T10:00:00Z"));
        }
        let mut plan = baseline.clone();

        ISSUE.apply(&state, &baseline, &mut plan);
        assert!(plan.began_at.is_unknown());
        assert!(plan.duration.is_unknown());
    }

    #[test]
    fn test_cycle_detection() {
        fn never(_: &GroupModel, _: &GroupModel) -> bool {
            false
        }
        fn noop(_: &mut GroupModel) {}

        let chain = [
            Edge { source: "a", dependent: "b", changed: never, invalidate: noop },
            Edge { source: "b", dependent: "c", changed: never, invalidate: noop },
        ];
        assert!(is_acyclic(&chain));

        let cycle = [
            Edge { source: "a", dependent: "b", changed: never, invalidate: noop },
            Edge { source: "b", dependent: "a", changed: never, invalidate: noop },
        ];
        assert!(!is_acyclic(&cycle));
    }
}
