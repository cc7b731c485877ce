//! Miscellaneous project utilities.

use crate::{EDGE_LENGTH, NUM_SPACES};
use std::fmt::{self, Formatter};

/// Format one character per square into a labelled grid.
/// `cells` must yield exactly 64 items, in row-major order.
pub fn format_grid<T: IntoIterator<Item = char>>(cells: T, f: &mut Formatter) -> fmt::Result {
    let cells: Vec<char> = cells.into_iter().collect();
    if cells.len() != NUM_SPACES {
        return Err(fmt::Error);
    }

    write!(f, "  A B C D E F G H")?;
    for (row, chunk) in cells.chunks(EDGE_LENGTH).enumerate() {
        write!(f, "\n{}", row + 1)?;
        for cell in chunk {
            write!(f, " {}", cell)?;
        }
    }

    Ok(())
}
