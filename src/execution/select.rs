//! SELECT statement execution
//!
//! Pipeline: source rows → WHERE filter → aggregation or projection →
//! ORDER BY → LIMIT. Aggregation is triggered by a GROUP BY clause or by
//! any aggregate call in the projection; groups keep first-seen order.

use super::{resolve_input, ResultSet, Row};
use crate::error::{Error, Result};
use crate::scope::Scope;
use crate::sources::DataResource;
use crate::types::{Condition, Expression, Field, SortOrder, Value};
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    pub fields: Vec<Expression>,
    pub source: DataResource,
    pub condition: Option<Condition>,
    pub group_by: Option<Vec<Field>>,
    pub order_by: Option<Vec<(Field, SortOrder)>>,
    pub limit: Option<usize>,
}

impl Select {
    pub(crate) fn execute(&self, scope: &mut Scope) -> Result<ResultSet> {
        tracing::debug!(source = %self.source.path, "executing select");
        let input = resolve_input(scope, &self.source)?;
        let statistics = input.statistics;

        // Filter first; both aggregation and projection see only the rows
        // the condition admits.
        let mut kept = Vec::new();
        for row in input {
            let row = row?;
            if let Some(condition) = &self.condition {
                let row_scope = scope.with_row(&row);
                if !condition.is_satisfied(&row_scope)? {
                    continue;
                }
            }
            kept.push(row);
        }

        let aggregated = self.group_by.is_some()
            || self.fields.iter().any(|f| contains_aggregate(f, scope));
        let mut rows = if aggregated {
            self.aggregate(kept, scope)?
        } else {
            let mut rows = Vec::with_capacity(kept.len());
            for row in &kept {
                let row_scope = scope.with_row(row);
                rows.push(project(&self.fields, row, &row_scope)?);
            }
            rows
        };

        if let Some(order_by) = &self.order_by {
            // Sort keys resolve against the projected columns.
            if let Some(row) = rows.first() {
                for (field, _) in order_by {
                    if row.get(&field.name).is_none() {
                        return Err(Error::Resolution(format!(
                            "unresolved sort field: {}",
                            field.name
                        )));
                    }
                }
            }
            rows.sort_by(|a, b| {
                for (field, order) in order_by {
                    let left = a.get(&field.name).unwrap_or(&Value::Null);
                    let right = b.get(&field.name).unwrap_or(&Value::Null);
                    let ordering = match order {
                        SortOrder::Ascending => left.compare(right),
                        SortOrder::Descending => right.compare(left),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        let mut result = ResultSet::from_rows(rows);
        result.statistics = statistics;
        Ok(result)
    }

    /// Groups the filtered rows and folds aggregate projections over each
    /// group. Scalar projections evaluate against the group's first row.
    fn aggregate(&self, rows: Vec<Row>, scope: &Scope) -> Result<Vec<Row>> {
        let projections = classify(&self.fields, scope)?;
        let group_fields = self.group_by.as_deref().unwrap_or(&[]);

        struct Group {
            key: Vec<Value>,
            first_row: Row,
            accumulators: Vec<Option<Accumulator>>,
        }

        let new_accumulators = |projections: &[Projection]| -> Result<Vec<Option<Accumulator>>> {
            projections
                .iter()
                .map(|p| match p {
                    Projection::Aggregate { name, .. } => Accumulator::new(name).map(Some),
                    Projection::Scalar { .. } => Ok(None),
                })
                .collect()
        };

        let mut groups: Vec<Group> = Vec::new();
        for row in rows {
            let row_scope = scope.with_row(&row);
            let key = group_fields
                .iter()
                .map(|f| {
                    row_scope.lookup_field(&f.name).ok_or_else(|| {
                        Error::Resolution(format!("unresolved group field: {}", f.name))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let position = groups
                .iter()
                .position(|g| keys_equal(&g.key, &key));
            let group = match position {
                Some(i) => &mut groups[i],
                None => {
                    groups.push(Group {
                        key,
                        first_row: row.clone(),
                        accumulators: new_accumulators(&projections)?,
                    });
                    groups.last_mut().unwrap()
                }
            };

            for (projection, accumulator) in projections.iter().zip(&mut group.accumulators) {
                if let (Projection::Aggregate { arg, .. }, Some(accumulator)) =
                    (projection, accumulator)
                {
                    let value = arg
                        .as_ref()
                        .map(|expr| expr.evaluate(&row_scope))
                        .transpose()?;
                    accumulator.update(value)?;
                }
            }
        }

        // An aggregate over an empty, ungrouped input still yields one row.
        if groups.is_empty() && group_fields.is_empty() {
            let accumulators = new_accumulators(&projections)?;
            let mut cells = Vec::new();
            for (projection, accumulator) in projections.iter().zip(accumulators) {
                let value = match (projection, accumulator) {
                    (Projection::Aggregate { .. }, Some(accumulator)) => accumulator.finish()?,
                    _ => Value::Null,
                };
                cells.push((projection.label().to_string(), value));
            }
            return Ok(vec![Row::new(cells)]);
        }

        let mut out = Vec::with_capacity(groups.len());
        for group in groups {
            let row_scope = scope.with_row(&group.first_row);
            let mut cells = Vec::new();
            for (projection, accumulator) in projections.iter().zip(group.accumulators) {
                let value = match (projection, accumulator) {
                    (Projection::Aggregate { .. }, Some(accumulator)) => accumulator.finish()?,
                    (Projection::Scalar { expr, .. }, _) => expr.evaluate(&row_scope)?,
                    (Projection::Aggregate { .. }, None) => {
                        return Err(Error::Internal("missing accumulator".into()));
                    }
                };
                cells.push((projection.label().to_string(), value));
            }
            out.push(Row::new(cells));
        }
        Ok(out)
    }
}

/// Projects a row through the field list. `*` copies the source row's
/// cells; everything else evaluates and takes the expression's label.
fn project(fields: &[Expression], row: &Row, scope: &Scope) -> Result<Row> {
    let mut cells = Vec::new();
    for field in fields {
        match field {
            Expression::All => cells.extend(row.iter().cloned()),
            other => cells.push((other.label(), other.evaluate(scope)?)),
        }
    }
    Ok(Row::new(cells))
}

enum Projection {
    Aggregate {
        name: String,
        arg: Option<Expression>,
        label: String,
    },
    Scalar {
        expr: Expression,
        label: String,
    },
}

impl Projection {
    fn label(&self) -> &str {
        match self {
            Projection::Aggregate { label, .. } => label,
            Projection::Scalar { label, .. } => label,
        }
    }
}

/// Splits the projection into aggregate calls and scalar expressions.
/// Aggregates must be bare (possibly aliased) calls; an aggregate nested
/// inside arithmetic has no per-group meaning and is rejected.
fn classify(fields: &[Expression], scope: &Scope) -> Result<Vec<Projection>> {
    let mut projections = Vec::new();
    for field in fields {
        let (inner, label) = match field {
            Expression::Alias(inner, name) => (inner.as_ref(), name.clone()),
            other => (other, other.label()),
        };
        match inner {
            Expression::Function(name, args) if field.is_aggregate(scope) => {
                if args.len() > 1 {
                    return Err(Error::Runtime(format!(
                        "{} takes at most one argument",
                        name
                    )));
                }
                let arg = match args.first() {
                    Some(Expression::All) | None => None,
                    Some(expr) => Some(expr.clone()),
                };
                projections.push(Projection::Aggregate {
                    name: name.clone(),
                    arg,
                    label,
                });
            }
            other if contains_aggregate(other, scope) => {
                return Err(Error::Runtime(
                    "aggregate calls can't be nested inside expressions".into(),
                ));
            }
            other => projections.push(Projection::Scalar {
                expr: other.clone(),
                label,
            }),
        }
    }
    Ok(projections)
}

/// Whether the expression contains an aggregate call anywhere in its tree.
fn contains_aggregate(expr: &Expression, scope: &Scope) -> bool {
    use Expression::*;
    match expr {
        Function(..) => expr.is_aggregate(scope),
        Add(a, b) | Subtract(a, b) | Multiply(a, b) | Divide(a, b) => {
            contains_aggregate(a, scope) || contains_aggregate(b, scope)
        }
        Negate(e) | Identity(e) | Alias(e, _) => contains_aggregate(e, scope),
        _ => false,
    }
}

fn keys_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.compare(y) == Ordering::Equal)
}

/// Folds rows into a single value per group. The scalar per-row forms of
/// the aggregate functions live in the function registry; this is where
/// the actual accumulation happens.
enum Accumulator {
    Count(i64),
    Sum(Value),
    Avg { sum: Value, count: i64 },
    Min(Value),
    Max(Value),
}

impl Accumulator {
    fn new(name: &str) -> Result<Accumulator> {
        Ok(match name.to_ascii_uppercase().as_str() {
            "COUNT" => Accumulator::Count(0),
            "SUM" => Accumulator::Sum(Value::Null),
            "AVG" => Accumulator::Avg {
                sum: Value::Null,
                count: 0,
            },
            "MIN" => Accumulator::Min(Value::Null),
            "MAX" => Accumulator::Max(Value::Null),
            other => {
                return Err(Error::Runtime(format!(
                    "unsupported aggregate function: {}",
                    other
                )));
            }
        })
    }

    /// Feeds one row's argument value; `None` is the count(*) form, which
    /// counts rows rather than non-null values.
    fn update(&mut self, value: Option<Value>) -> Result<()> {
        match self {
            Accumulator::Count(n) => {
                if value.as_ref().map_or(true, |v| !v.is_null()) {
                    *n += 1;
                }
            }
            Accumulator::Sum(sum) => {
                if let Some(value) = value.filter(|v| !v.is_null()) {
                    *sum = if sum.is_null() {
                        value
                    } else {
                        sum.checked_add(&value)?
                    };
                }
            }
            Accumulator::Avg { sum, count } => {
                if let Some(value) = value.filter(|v| !v.is_null()) {
                    *sum = if sum.is_null() {
                        value
                    } else {
                        sum.checked_add(&value)?
                    };
                    *count += 1;
                }
            }
            Accumulator::Min(min) => {
                if let Some(value) = value.filter(|v| !v.is_null()) {
                    if min.is_null() || value.compare(min) == Ordering::Less {
                        *min = value;
                    }
                }
            }
            Accumulator::Max(max) => {
                if let Some(value) = value.filter(|v| !v.is_null()) {
                    if max.is_null() || value.compare(max) == Ordering::Greater {
                        *max = value;
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        Ok(match self {
            Accumulator::Count(n) => Value::Integer(n),
            Accumulator::Sum(sum) => sum,
            Accumulator::Avg { sum, count } => {
                if count == 0 {
                    Value::Null
                } else {
                    sum.checked_div(&Value::Integer(count))?
                }
            }
            Accumulator::Min(value) => value,
            Accumulator::Max(value) => value,
        })
    }
}
