use itertools::Itertools;
use rstest::rstest;
use tabula::expr::{add, col, dense_rank, gt, is_missing, lit, min_rank, mul, n, or, sum};
use tabula::{Column, Pipeline, Selector, SortKey, Table, TableVerbs, assign};

fn scores() -> Table {
    Table::try_from_columns([
        ("team", Column::from(vec!["red", "blue", "red", "green", "blue", "red"])),
        ("round", Column::from(vec![1i64, 1, 2, 1, 2, 1])),
        (
            "points",
            Column::from(vec![Some(3i64), None, Some(5), Some(1), Some(3), Some(2)]),
        ),
        ("bonus", Column::from(vec![0.5, 1.5, 0.0, 2.0, 0.25, 1.0])),
    ])
    .unwrap()
}

#[test]
fn filter_drops_false_and_missing() {
    let table = Table::try_from_columns([("x", Column::from(vec![Some(1i64), None, Some(3)]))])
        .unwrap();

    let result = table.filter([gt(col("x"), lit(1i64))]).unwrap();
    assert_eq!(result.require("x").unwrap(), &Column::from(vec![3i64]));

    let result = table
        .filter([or(is_missing(col("x")), gt(col("x"), lit(1i64)))])
        .unwrap();
    assert_eq!(
        result.require("x").unwrap(),
        &Column::from(vec![None, Some(3i64)])
    );
}

#[test]
fn filter_is_idempotent() {
    let predicate = gt(col("points"), lit(1i64));
    let once = scores().filter([predicate.clone()]).unwrap();
    let twice = once.filter([predicate]).unwrap();
    assert_eq!(once, twice);

    let grouped = scores().group_by(["team"]).unwrap();
    let predicate = gt(col("bonus"), lit(0.25));
    let once = grouped.filter([predicate.clone()]).unwrap();
    assert_eq!(once.filter([predicate]).unwrap(), once);
}

#[test]
fn arrange_is_stable() {
    let result = scores().arrange([SortKey::asc(col("round"))]).unwrap();
    // rows of round 1 keep their input order, then the rows of round 2
    assert_eq!(
        result.require("team").unwrap(),
        &Column::from(vec!["red", "blue", "green", "red", "red", "blue"])
    );
    assert_eq!(
        result.require("bonus").unwrap(),
        &Column::from(vec![0.5, 1.5, 2.0, 1.0, 0.0, 0.25])
    );
}

#[rstest]
#[case::ascending(SortKey::asc(col("points")), vec![Some(1i64), Some(2), Some(3), Some(3), Some(5), None])]
#[case::descending(SortKey::desc(col("points")), vec![Some(5i64), Some(3), Some(3), Some(2), Some(1), None])]
fn arrange_puts_missing_last(#[case] key: SortKey, #[case] expected: Vec<Option<i64>>) {
    let result = scores().arrange([key]).unwrap();
    assert_eq!(result.require("points").unwrap(), &Column::from(expected));
}

#[test]
fn grouped_counts_sum_to_rows() {
    for keys in [vec!["team"], vec!["round"], vec!["team", "round"]] {
        let counts = scores()
            .group_by(keys.clone())
            .unwrap()
            .summarise([assign("count", n())])
            .unwrap();
        let total: i64 = counts
            .require("count")
            .unwrap()
            .i64_iter()
            .unwrap()
            .flatten()
            .sum();
        assert_eq!(total, 6, "grouping by {}", keys.iter().join(", "));
    }
}

#[test]
fn ranks_with_ties_and_missing() {
    let table = Table::try_from_columns([(
        "x",
        Column::from(vec![Some(1i64), Some(2), Some(2), None, Some(3), Some(4)]),
    )])
    .unwrap();
    let result = table
        .mutate([
            assign("min", min_rank(col("x"))),
            assign("dense", dense_rank(col("x"))),
        ])
        .unwrap();
    assert_eq!(
        result.require("min").unwrap(),
        &Column::from(vec![Some(1i64), Some(2), Some(2), None, Some(4), Some(5)])
    );
    assert_eq!(
        result.require("dense").unwrap(),
        &Column::from(vec![Some(1i64), Some(2), Some(2), None, Some(3), Some(4)])
    );
}

#[test]
fn rollup_of_sums_is_exact() {
    let by_team_and_round = Pipeline::new(scores())
        .group_by(["team", "round"])
        .summarise([assign("bonus", sum(col("bonus")))])
        .summarise([assign("bonus", sum(col("bonus")))])
        .execute()
        .unwrap();
    let by_team = Pipeline::new(scores())
        .group_by(["team"])
        .summarise([assign("bonus", sum(col("bonus")))])
        .execute()
        .unwrap();
    assert_eq!(by_team_and_round, by_team);
}

#[test]
fn select_composes() {
    let table = scores();
    let twice = table
        .select([Selector::not(Selector::name("bonus"))])
        .unwrap()
        .select([Selector::name("points"), Selector::name("team")])
        .unwrap();
    let once = table
        .select([Selector::name("points"), Selector::name("team")])
        .unwrap();
    assert_eq!(twice, once);
}

#[test]
fn mutate_scopes_sequentially() {
    let table = Table::try_from_columns([("x", Column::from(vec![1i64, 2]))]).unwrap();
    let result = table
        .mutate([
            assign("y", mul(col("x"), lit(2i64))),
            assign("z", add(col("y"), lit(1i64))),
        ])
        .unwrap();
    let expected = Table::try_from_columns([
        ("x", Column::from(vec![1i64, 2])),
        ("y", Column::from(vec![2i64, 4])),
        ("z", Column::from(vec![3i64, 5])),
    ])
    .unwrap();
    assert_eq!(result, expected);
}

#[test]
fn verbs_leave_their_input_untouched() {
    let table = scores().group_by(["team"]).unwrap();
    let before = table.clone();
    let _ = table.filter([gt(col("round"), lit(1i64))]).unwrap();
    let _ = table.mutate([assign("points", sum(col("points")))]).unwrap();
    assert!(table.mutate([assign("team", lit("x"))]).is_err());
    assert_eq!(table, before);
}
