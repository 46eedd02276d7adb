use folio_editor::rows::{
    add_row, block_inserted, block_removed, delete_row, reorder_rows, row_of, row_range,
    row_start, set_row_layout,
};
use folio_editor::{BlockTreeEditor, EditorConfig};
use folio_model::{is_contiguous, BlockType, ContentBlock, Document, RowConfig};
use folio_types::SequentialIdGenerator;
use pretty_assertions::assert_eq;

fn config(counts: &[(u8, usize)]) -> Vec<RowConfig> {
    counts
        .iter()
        .map(|&(layout, block_count)| RowConfig {
            layout,
            block_count,
        })
        .collect()
}

fn counts(rows: &[RowConfig]) -> Vec<usize> {
    rows.iter().map(|r| r.block_count).collect()
}

fn editor_with_rows(n: usize, layouts: &[u8]) -> BlockTreeEditor {
    let blocks = (1..=n)
        .map(|i| ContentBlock::with_id(format!("x{i}"), BlockType::Text, 0))
        .collect();
    let mut ed = BlockTreeEditor::with_document(Document::new(blocks), EditorConfig::default())
        .with_id_generator(SequentialIdGenerator::default());
    ed.enable_rows(layouts);
    ed
}

fn row_ids(ed: &BlockTreeEditor) -> Vec<Vec<&str>> {
    ed.rows()
        .iter()
        .map(|row| row.iter().map(|b| b.id.as_str()).collect())
        .collect()
}

// ── Row arithmetic ───────────────────────────────────────────────

#[test]
fn locating_rows() {
    let rows = config(&[(1, 1), (3, 3), (2, 2)]);
    assert_eq!(row_of(&rows, 0), Some(0));
    assert_eq!(row_of(&rows, 3), Some(1));
    assert_eq!(row_of(&rows, 5), Some(2));
    assert_eq!(row_of(&rows, 6), None);
    assert_eq!(row_start(&rows, 2), 4);
    assert_eq!(row_range(&rows, 1), 1..4);
    assert_eq!(row_range(&rows, 9), 6..6);
}

#[test]
fn adding_and_relayouting_rows() {
    let mut rows = config(&[(1, 1)]);
    add_row(&mut rows, 7);
    assert_eq!(rows[1], RowConfig { layout: 3, block_count: 0 });
    assert!(set_row_layout(&mut rows, 0, 2));
    assert!(!set_row_layout(&mut rows, 5, 2));
    assert_eq!(rows[0].layout, 2);
}

#[test]
fn deleting_rows_merges_counts() {
    let mut rows = config(&[(1, 1), (2, 2), (3, 3)]);
    assert!(delete_row(&mut rows, 1));
    assert_eq!(counts(&rows), vec![3, 3]);
    assert!(delete_row(&mut rows, 0));
    assert_eq!(counts(&rows), vec![6]);
    assert!(!delete_row(&mut rows, 0));
}

#[test]
fn insert_and_remove_accounting() {
    let mut rows = config(&[(1, 1), (2, 2)]);
    assert!(block_inserted(&mut rows, 1));
    assert_eq!(counts(&rows), vec![2, 2]);
    assert!(!block_inserted(&mut rows, 10));

    block_removed(&mut rows, 0);
    block_removed(&mut rows, 0);
    assert_eq!(counts(&rows), vec![2]);
    block_removed(&mut rows, 0);
    block_removed(&mut rows, 0);
    assert_eq!(counts(&rows), vec![0]);
}

#[test]
fn row_reorder_reports_block_permutation() {
    let mut rows = config(&[(1, 1), (3, 3), (2, 2)]);
    let (range, insert_at) = reorder_rows(&mut rows, 2, 0).unwrap();
    assert_eq!(range, 4..6);
    assert_eq!(insert_at, 0);
    assert_eq!(counts(&rows), vec![2, 1, 3]);
    assert!(reorder_rows(&mut rows, 1, 1).is_none());
    assert!(reorder_rows(&mut rows, 0, 3).is_none());
}

// ── Editor with rows ─────────────────────────────────────────────

#[test]
fn enabling_rows_partitions_blocks() {
    let ed = editor_with_rows(6, &[1, 3, 2]);
    assert_eq!(
        row_ids(&ed),
        vec![vec!["x1"], vec!["x2", "x3", "x4"], vec!["x5", "x6"]]
    );
}

#[test]
fn add_block_to_row_lands_at_row_end() {
    let mut ed = editor_with_rows(3, &[1, 2]);
    let id = ed.add_block_to_row(BlockType::Image, 0);
    assert_eq!(row_ids(&ed), vec![vec!["x1", id.as_str()], vec!["x2", "x3"]]);
    assert!(is_contiguous(ed.blocks()));

    let id = ed.add_block_to_row(BlockType::Image, 9);
    assert_eq!(ed.rows().last().unwrap()[0].id, id);
    assert_eq!(ed.row_config().unwrap().last().unwrap().layout, 1);
}

#[test]
fn add_after_joins_predecessor_row() {
    let mut ed = editor_with_rows(3, &[1, 2]);
    let id = ed.add_block(BlockType::Text, Some("x1"));
    assert_eq!(row_ids(&ed), vec![vec!["x1", id.as_str()], vec!["x2", "x3"]]);
}

#[test]
fn deleting_last_block_of_row_drops_row() {
    let mut ed = editor_with_rows(3, &[1, 2]);
    ed.delete_block("x1");
    assert_eq!(row_ids(&ed), vec![vec!["x2", "x3"]]);
    ed.undo();
    assert_eq!(row_ids(&ed), vec![vec!["x1"], vec!["x2", "x3"]]);
}

#[test]
fn moving_block_between_rows() {
    let mut ed = editor_with_rows(4, &[2, 2]);
    assert!(ed.move_block_to_row("x4", 0, 1));
    assert_eq!(row_ids(&ed), vec![vec!["x1", "x4", "x2"], vec!["x3"]]);
    assert!(ed.move_block_to_row("x1", 1, 5));
    assert_eq!(row_ids(&ed), vec![vec!["x4", "x2"], vec!["x3", "x1"]]);
    assert!(is_contiguous(ed.blocks()));
}

#[test]
fn moving_out_of_single_block_row_removes_it() {
    let mut ed = editor_with_rows(3, &[1, 2]);
    assert!(ed.move_block_to_row("x1", 1, 0));
    assert_eq!(ed.row_config().unwrap().len(), 1);
    assert_eq!(row_ids(&ed), vec![vec!["x1", "x2", "x3"]]);
}

#[test]
fn moving_within_row_keeps_counts() {
    let mut ed = editor_with_rows(3, &[3]);
    assert!(ed.move_block_to_row("x3", 0, 0));
    assert_eq!(row_ids(&ed), vec![vec!["x3", "x1", "x2"]]);
    assert!(!ed.move_block_to_row("x3", 4, 0));
    assert!(!ed.move_block_to_row("zz", 0, 0));
}

#[test]
fn reordering_rows_moves_blocks() {
    let mut ed = editor_with_rows(6, &[1, 3, 2]);
    assert!(ed.reorder_rows(2, 0));
    assert_eq!(
        row_ids(&ed),
        vec![vec!["x5", "x6"], vec!["x1"], vec!["x2", "x3", "x4"]]
    );
    assert!(is_contiguous(ed.blocks()));
}

#[test]
fn row_config_survives_document_round_trip() {
    let mut ed = editor_with_rows(2, &[2]);
    ed.add_row(1);
    ed.set_row_layout(0, 3);
    let doc = ed.document();
    assert_eq!(doc.row_config.as_deref().map(<[RowConfig]>::len), Some(2));
    let reopened = BlockTreeEditor::with_document(doc.clone(), EditorConfig::default());
    assert_eq!(reopened.document(), doc);
}

#[test]
fn reset_blocks_drops_row_layout() {
    let mut ed = editor_with_rows(4, &[2, 2]);
    let blocks = (1..=3)
        .map(|i| ContentBlock::with_id(format!("y{i}"), BlockType::Text, 0))
        .collect();

    ed.reset_blocks(blocks);

    assert!(ed.row_config().is_none());
    assert_eq!(row_ids(&ed), vec![vec!["y1", "y2", "y3"]]);
    assert!(ed.document().row_config.is_none());
    assert!(!ed.can_undo());
}

#[test]
fn reset_document_keeps_its_row_layout() {
    let mut ed = editor_with_rows(4, &[2, 2]);
    let blocks: Vec<ContentBlock> = (1..=3)
        .map(|i| ContentBlock::with_id(format!("y{i}"), BlockType::Text, 0))
        .collect();
    let mut doc = Document::new(blocks);
    doc.row_config = Some(config(&[(1, 1), (2, 2)]));

    ed.reset_document(doc);

    assert_eq!(counts(ed.row_config().unwrap()), vec![1, 2]);
    assert_eq!(row_ids(&ed), vec![vec!["y1"], vec!["y2", "y3"]]);
}

#[test]
fn delete_row_keeps_blocks() {
    let mut ed = editor_with_rows(3, &[1, 2]);
    assert!(ed.delete_row(1));
    assert_eq!(row_ids(&ed), vec![vec!["x1", "x2", "x3"]]);
    assert!(!ed.delete_row(0));
}
