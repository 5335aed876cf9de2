use policy_ingest::tables::tables_from_markdown;

fn row(cells: &[&str]) -> Vec<Option<String>> {
    cells.iter().map(|c| Some(c.to_string())).collect()
}

#[test]
fn reads_pipe_table_without_separator() {
    let md = "Schedule of benefits\n\n| Service | Copay |\n|---|:---:|\n| Office visit | $20 |\n| ER | $150 |\n\nNotes follow.";
    let tables = tables_from_markdown(md);
    assert_eq!(tables.len(), 1);
    assert_eq!(
        tables[0],
        vec![
            row(&["Service", "Copay"]),
            row(&["Office visit", "$20"]),
            row(&["ER", "$150"]),
        ]
    );
}

#[test]
fn separate_blocks_are_separate_tables() {
    let md = "| a | b |\n| 1 | 2 |\ntext between\n| c | d |";
    let tables = tables_from_markdown(md);
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[1], vec![row(&["c", "d"])]);
}

#[test]
fn headings_and_plain_text_are_ignored() {
    let md = "# Plan | Gold\nNo tables here.\n## Another | heading";
    assert!(tables_from_markdown(md).is_empty());
}

#[test]
fn rows_without_edge_pipes() {
    let md = "Deductible | $500\nOut-of-pocket max | $3000";
    let tables = tables_from_markdown(md);
    assert_eq!(
        tables,
        vec![vec![
            row(&["Deductible", "$500"]),
            row(&["Out-of-pocket max", "$3000"])
        ]]
    );
}

#[test]
fn empty_cells_are_kept() {
    let md = "| a |  | c |";
    let tables = tables_from_markdown(md);
    assert_eq!(tables, vec![vec![row(&["a", "", "c"])]]);
}
