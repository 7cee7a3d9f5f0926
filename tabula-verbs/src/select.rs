//! Column selection and renaming.

use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

use itertools::Itertools;
use regex::Regex;
use tabula_array::Table;
use tabula_dtype::{DisplayFieldNames, FieldName};
use tabula_error::{TabulaResult, tabula_bail, tabula_err};

/// Picks columns of a table by name, position range or name pattern.
#[derive(Debug, Clone)]
pub enum Selector {
    /// A single column.
    Name(FieldName),
    /// Every column from the first to the second, inclusive, in table order. Reversed bounds
    /// select the span in reverse.
    Range(FieldName, FieldName),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    /// Columns whose name matches the regular expression.
    Matches(Regex),
    /// An indexed family such as `x1, x2, x3`, or `x01, x02` with a zero-padding `width`.
    NumRange {
        prefix: String,
        indices: RangeInclusive<usize>,
        width: Option<usize>,
    },
    Everything,
    /// Remove the matches of the inner selector from the selection.
    Not(Box<Selector>),
    /// Select the column `old`, renamed to `new`.
    Rename { new: FieldName, old: FieldName },
}

impl Selector {
    pub fn name(name: impl Into<FieldName>) -> Self {
        Self::Name(name.into())
    }

    pub fn range(from: impl Into<FieldName>, to: impl Into<FieldName>) -> Self {
        Self::Range(from.into(), to.into())
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        Self::StartsWith(prefix.into())
    }

    pub fn ends_with(suffix: impl Into<String>) -> Self {
        Self::EndsWith(suffix.into())
    }

    pub fn contains(infix: impl Into<String>) -> Self {
        Self::Contains(infix.into())
    }

    /// Select columns whose name matches `pattern`.
    ///
    /// ## Errors
    ///
    /// Fails when `pattern` is not a valid regular expression.
    pub fn matches(pattern: &str) -> TabulaResult<Self> {
        Ok(Self::Matches(Regex::new(pattern)?))
    }

    pub fn num_range(prefix: impl Into<String>, indices: RangeInclusive<usize>) -> Self {
        Self::NumRange {
            prefix: prefix.into(),
            indices,
            width: None,
        }
    }

    /// Like [`Selector::num_range`], with indices zero-padded to `width` digits.
    pub fn num_range_padded(
        prefix: impl Into<String>,
        indices: RangeInclusive<usize>,
        width: usize,
    ) -> Self {
        Self::NumRange {
            prefix: prefix.into(),
            indices,
            width: Some(width),
        }
    }

    pub fn everything() -> Self {
        Self::Everything
    }

    pub fn not(selector: Selector) -> Self {
        Self::Not(Box::new(selector))
    }

    pub fn rename(new: impl Into<FieldName>, old: impl Into<FieldName>) -> Self {
        Self::Rename {
            new: new.into(),
            old: old.into(),
        }
    }

    /// The positions of the matching columns, in match order.
    fn resolve(&self, names: &[FieldName]) -> TabulaResult<Vec<usize>> {
        let position = |name: &FieldName| {
            names.iter().position(|n| n == name).ok_or_else(|| {
                tabula_err!(
                    Schema: "unknown column {}, available columns are [{}]",
                    name,
                    DisplayFieldNames(names)
                )
            })
        };
        let matching = |predicate: &dyn Fn(&str) -> bool| {
            names
                .iter()
                .positions(|name| predicate(name.as_ref()))
                .collect_vec()
        };
        let positions = match self {
            Self::Name(name) | Self::Rename { old: name, .. } => vec![position(name)?],
            Self::Range(from, to) => {
                let (from, to) = (position(from)?, position(to)?);
                if from <= to {
                    (from..=to).collect()
                } else {
                    (to..=from).rev().collect()
                }
            }
            Self::StartsWith(prefix) => matching(&|name| name.starts_with(prefix.as_str())),
            Self::EndsWith(suffix) => matching(&|name| name.ends_with(suffix.as_str())),
            Self::Contains(infix) => matching(&|name| name.contains(infix.as_str())),
            Self::Matches(regex) => matching(&|name| regex.is_match(name)),
            Self::NumRange {
                prefix,
                indices,
                width,
            } => indices
                .clone()
                .filter_map(|idx| {
                    let name = match width {
                        Some(width) => format!("{prefix}{idx:0width$}"),
                        None => format!("{prefix}{idx}"),
                    };
                    names.iter().position(|n| n.as_ref() == name)
                })
                .collect(),
            Self::Everything => return Ok((0..names.len()).collect()),
            Self::Not(inner) => {
                let excluded = inner.resolve(names)?;
                return Ok((0..names.len())
                    .filter(|idx| !excluded.contains(idx))
                    .collect());
            }
        };
        if positions.is_empty() {
            tabula_bail!(
                Schema: "selector {} matches none of [{}]",
                self,
                DisplayFieldNames(names)
            );
        }
        Ok(positions)
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Range(from, to) => write!(f, "{from}:{to}"),
            Self::StartsWith(prefix) => write!(f, "starts_with({prefix:?})"),
            Self::EndsWith(suffix) => write!(f, "ends_with({suffix:?})"),
            Self::Contains(infix) => write!(f, "contains({infix:?})"),
            Self::Matches(regex) => write!(f, "matches({:?})", regex.as_str()),
            Self::NumRange {
                prefix,
                indices,
                width,
            } => {
                write!(f, "num_range({prefix:?}, {}..={}", indices.start(), indices.end())?;
                if let Some(width) = width {
                    write!(f, ", width = {width}")?;
                }
                write!(f, ")")
            }
            Self::Everything => write!(f, "everything()"),
            Self::Not(inner) => write!(f, "!{inner}"),
            Self::Rename { new, old } => write!(f, "{new} = {old}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

/// Keep, reorder and rename columns.
///
/// Selectors are applied left to right: positive selectors append the columns they match that
/// are not selected yet, [`Selector::Not`] removes its matches. A leading `Not` starts from
/// every column. Grouping columns are always kept, at the front when not selected explicitly.
pub fn select(table: &Table, selectors: &[Selector]) -> TabulaResult<Table> {
    log::debug!(
        "select: [{}] from {} columns",
        selectors.iter().format(", "),
        table.ncols()
    );
    let names = table.names();
    let mut selected: Vec<(usize, FieldName)> = Vec::new();
    if matches!(selectors.first(), Some(Selector::Not(_))) {
        selected.extend(names.iter().cloned().enumerate());
    }
    for selector in selectors {
        match selector {
            Selector::Not(_) => {
                let keep = selector.resolve(names)?;
                selected.retain(|(idx, _)| keep.contains(idx));
            }
            Selector::Rename { new, .. } => {
                let idx = selector.resolve(names)?[0];
                match selected.iter_mut().find(|(selected, _)| *selected == idx) {
                    Some((_, name)) => *name = new.clone(),
                    None => selected.push((idx, new.clone())),
                }
            }
            _ => {
                for idx in selector.resolve(names)? {
                    if !selected.iter().any(|(selected, _)| *selected == idx) {
                        selected.push((idx, names[idx].clone()));
                    }
                }
            }
        }
    }

    let missing_keys = table
        .group_keys()
        .iter()
        .filter_map(|key| table.column_index(key))
        .filter(|idx| !selected.iter().any(|(selected, _)| selected == idx))
        .collect_vec();
    if !missing_keys.is_empty() {
        log::debug!(
            "select: adding grouping columns [{}]",
            missing_keys.iter().map(|&idx| &names[idx]).format(", ")
        );
        selected.splice(
            0..0,
            missing_keys.into_iter().map(|idx| (idx, names[idx].clone())),
        );
    }
    project(table, &selected)
}

/// Rename columns in place; every selector must be a [`Selector::Rename`].
pub fn rename(table: &Table, renames: &[Selector]) -> TabulaResult<Table> {
    log::debug!("rename: [{}]", renames.iter().format(", "));
    let mut selected = table.names().iter().cloned().enumerate().collect_vec();
    for selector in renames {
        let Selector::Rename { new, .. } = selector else {
            tabula_bail!("rename only accepts new = old pairs, got {}", selector);
        };
        let idx = selector.resolve(table.names())?[0];
        selected[idx].1 = new.clone();
    }
    project(table, &selected)
}

/// Build the table of the given `(source position, output name)` columns, carrying the group
/// index over with renamed keys.
fn project(table: &Table, selected: &[(usize, FieldName)]) -> TabulaResult<Table> {
    let projected = Table::try_with_len(
        selected.iter().map(|(_, name)| name.clone()).collect(),
        selected
            .iter()
            .map(|&(idx, _)| table.columns()[idx].clone())
            .collect(),
        table.nrows(),
    )?;
    let Some(index) = table.group_index() else {
        return Ok(projected);
    };
    let mut index = index.clone();
    for key in table.group_keys() {
        let renamed = table.column_index(key).and_then(|source| {
            selected
                .iter()
                .find(|(idx, _)| *idx == source)
                .map(|(_, name)| name.clone())
        });
        if let Some(renamed) = renamed {
            if &renamed != key {
                index = index.rename_key(key, renamed);
            }
        }
    }
    projected.with_group_index(index)
}
