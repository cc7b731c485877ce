//! Rules checked over many random games against a naive grid implementation.

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use recall_othello::{Board, Cell, Color, Location, EDGE_LENGTH, NUM_SPACES};

const DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

fn grid(board: Board) -> Vec<Vec<Cell>> {
    let cells: Vec<Cell> = board.cells().collect();
    cells.chunks(EDGE_LENGTH).map(|row| row.to_vec()).collect()
}

/// Length of the opponent run starting next to (row, col) in a direction,
/// if it is closed by one of `color`'s disks.
fn closed_run(grid: &[Vec<Cell>], color: Color, row: usize, col: usize, dir: (isize, isize)) -> usize {
    let mine = Cell::from(color);
    let theirs = Cell::from(!color);
    let mut run = 0;
    let (mut r, mut c) = (row as isize + dir.0, col as isize + dir.1);

    while (0..8).contains(&r) && (0..8).contains(&c) {
        let cell = grid[r as usize][c as usize];
        if cell == theirs {
            run += 1;
        } else if cell == mine {
            return run;
        } else {
            return 0;
        }
        r += dir.0;
        c += dir.1;
    }

    0
}

fn naive_is_legal(board: Board, color: Color, row: usize, col: usize) -> bool {
    let grid = grid(board);
    grid[row][col] == Cell::Empty
        && DIRECTIONS
            .iter()
            .any(|&dir| closed_run(&grid, color, row, col, dir) > 0)
}

fn naive_apply(board: Board, color: Color, row: usize, col: usize) -> Board {
    let before = grid(board);
    let mut after = board.with_cell(Location::from_coords(row, col).unwrap(), color.into());

    for &dir in DIRECTIONS.iter() {
        let run = closed_run(&before, color, row, col, dir);
        for step in 1..=run as isize {
            let r = (row as isize + dir.0 * step) as usize;
            let c = (col as isize + dir.1 * step) as usize;
            after = after.with_cell(Location::from_coords(r, c).unwrap(), color.into());
        }
    }

    after
}

fn check_position(board: Board, color: Color) {
    let score = board.score();
    assert_eq!(
        score.black as usize + score.white as usize + board.count_empty() as usize,
        NUM_SPACES
    );

    let legal = board.legal_moves(color);
    for row in 0..EDGE_LENGTH {
        for col in 0..EDGE_LENGTH {
            let loc = Location::from_coords(row, col).unwrap();
            let expected = naive_is_legal(board, color, row, col);
            assert_eq!(legal.contains(loc), expected, "{} at {}\n{}", color, loc, board);

            if expected {
                let copy = board;
                let first = board.apply_move(color, loc).unwrap();
                let second = copy.apply_move(color, loc).unwrap();
                assert_eq!(first, second);
                assert_eq!(first, naive_apply(board, color, row, col));
            } else {
                assert!(board.apply_move(color, loc).is_err());
            }
        }
    }
}

#[test]
fn random_games_match_naive_rules() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..40 {
        let mut board = Board::new();
        let mut color = Color::Black;

        loop {
            check_position(board, color);
            let snapshot = board;

            match board.legal_moves(color).choose(&mut rng) {
                Some(mv) => {
                    board = board.apply_move(color, mv).unwrap();
                    assert_ne!(board, snapshot);
                }
                None => {
                    // A position is terminal iff both colors have no moves.
                    if !board.has_moves(!color) {
                        assert!(board.is_finished());
                        break;
                    }
                    assert!(!board.is_finished());
                }
            }

            color = !color;
        }
    }
}
